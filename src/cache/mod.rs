//! Quire Cache System
//!
//! Rendered output (HTML pages, Atom feed, sitemap) is expensive to produce and
//! depends only on the content tree and the templates. The response cache
//! memoizes it per request identity and throws an entry away as soon as the
//! generation token (newest modification time across content and templates)
//! differs from the one the entry was computed under.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! http_cache = true
//! ```

mod config;
mod keys;
mod store;

pub use config::CacheConfig;
pub use keys::{GenerationToken, OutputFormat, ResponseKey, normalize_query};
pub use store::ResponseCache;
