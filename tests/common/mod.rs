//! Common test infrastructure
//!
//! Builds on-disk data trees and warehouses for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{DataTree, SONG_1_ID};
//!
//! #[test]
//! fn test_load() {
//!     let tree = DataTree::standard();
//!     let summary = tree.load_into(&tree.open_warehouse()).unwrap();
//!     assert!(summary.is_clean());
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::DataTree;
