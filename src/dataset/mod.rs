//! The user agent dataset: records, JSON Lines persistence, and loading.
//!
//! Data flows from [`Scraper`] (or the cache server through
//! [`decode_remote_payload`]) into [`normalize`], and from there into a
//! [`Dataset`] that [`DatasetLoader`] persists as JSON Lines. The file is
//! only ever replaced whole.

mod error;
mod loader;
mod normalizer;
mod record;
mod remote;
mod scrape;
mod store;

pub use error::{DataUnavailable, DatasetError, SourceError};
pub use loader::{CacheState, DatasetLoader};
pub use normalizer::{RawUserAgent, normalize};
pub use record::BrowserUserAgentRecord;
pub use remote::decode_remote_payload;
pub use scrape::Scraper;
pub use store::Dataset;

pub use crate::classifier::PlatformType;

pub(crate) use normalizer::{classify_raw, dedup_records};
