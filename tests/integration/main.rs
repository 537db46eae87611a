//! Integration tests for the crawler

mod crawl_tests;
mod graph_tests;
