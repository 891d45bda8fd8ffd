mod blacklist;
pub mod fetcher;
mod filter;
mod fingerprint;
mod refresh;
mod registry;
mod store;
mod traits;

pub use blacklist::{Blacklist, RefreshSettings};
pub use fetcher::HttpFetcher;
pub use filter::{blockable_question, Question, QueryView};
pub use fingerprint::Fingerprint;
pub use refresh::{RefreshLoop, RefreshReport};
pub use registry::SubscriptionRegistry;
pub use store::{canonical_name, MembershipStore};
pub use traits::{FetchedList, ListFetcher};
