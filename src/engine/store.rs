use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::sync::{PoisonError, RwLock};

/// Strips exactly one trailing root-label separator.
pub fn canonical_name(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

fn lookup_key(name: &str) -> Cow<'_, str> {
    let name = canonical_name(name);
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// The set of blocked domain names consulted on the query path.
///
/// Append-only: once merged, a name stays blocked for the lifetime of the store.
/// Names are compared case-insensitively (ASCII) and without the trailing root dot.
#[derive(Debug, Default)]
pub struct MembershipStore {
    domains: RwLock<FxHashSet<Box<str>>>,
}

impl MembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every domain under a single write lock. Returns how many were new.
    pub fn merge<I, S>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.domains.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for domain in domains {
            let key = lookup_key(domain.as_ref());
            if key.is_empty() || guard.contains(key.as_ref()) {
                continue;
            }
            guard.insert(key.into_owned().into_boxed_str());
            added += 1;
        }
        added
    }

    pub fn contains(&self, domain: &str) -> bool {
        let key = lookup_key(domain);
        self.domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
