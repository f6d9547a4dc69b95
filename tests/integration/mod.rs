//! Integration tests for incremental package mirroring

mod cache_fallback;
mod sync_flow;
mod test_utils;
