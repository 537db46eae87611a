//! URL handling module
//!
//! This module is the crawl's canonicalizer: it normalizes URLs into the form
//! used for deduplication and resolves hrefs found on a page against that
//! page's URL, enforcing the same-host constraint.

mod normalize;
mod resolve;

// Re-export main functions
pub use normalize::{canonical_host, normalize_url};
pub use resolve::resolve_reference;
