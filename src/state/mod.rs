//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedSet`: the canonical URLs already claimed for processing
//! - `EngineState`: lifecycle of the traversal driver (running, draining, terminated)

mod engine_state;
mod visited;

// Re-export main types
pub use engine_state::EngineState;
pub use visited::VisitedSet;
