use super::fingerprint::Fingerprint;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

/// Subscribed list URLs and the fingerprint seen on their last successful fetch.
///
/// `None` means the subscription has never been fetched successfully.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<String, Option<Fingerprint>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `url`. Returns `false` if it was already subscribed, in which case its
    /// fingerprint is left untouched.
    pub fn add(&self, url: impl Into<String>) -> bool {
        let mut guard = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let url = url.into();
        if guard.contains_key(&url) {
            return false;
        }
        guard.insert(url, None);
        true
    }

    /// Copies the current state so callers can do network I/O without holding the lock.
    pub fn snapshot(&self) -> BTreeMap<String, Option<Fingerprint>> {
        let guard = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .map(|(url, fingerprint)| (url.clone(), *fingerprint))
            .collect()
    }

    /// Records the fingerprint of a successful, changed fetch. Unknown URLs are ignored.
    pub fn update_fingerprint(&self, url: &str, fingerprint: Fingerprint) {
        let mut guard = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = guard.get_mut(url) {
            *slot = Some(fingerprint);
        }
    }

    pub fn fingerprint(&self, url: &str) -> Option<Fingerprint> {
        let guard = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(url).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.add("https://lists.example/ads.txt"));

        let fp = Fingerprint::of(b"ads.example.com\n");
        registry.update_fingerprint("https://lists.example/ads.txt", fp);

        // Re-subscribing must not reset the fingerprint
        assert!(!registry.add("https://lists.example/ads.txt"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.fingerprint("https://lists.example/ads.txt"), Some(fp));
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let registry = SubscriptionRegistry::new();
        registry.add("https://a.example/list");

        let snapshot = registry.snapshot();
        registry.update_fingerprint("https://a.example/list", Fingerprint::of(b"x"));
        registry.add("https://b.example/list");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["https://a.example/list"], None);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn test_update_unknown_url_is_ignored() {
        let registry = SubscriptionRegistry::new();
        registry.update_fingerprint("https://nowhere.example/", Fingerprint::of(b"x"));
        assert!(registry.is_empty());
        assert_eq!(registry.fingerprint("https://nowhere.example/"), None);
    }
}
