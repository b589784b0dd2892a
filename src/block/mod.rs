//! Block Addressing Module
//!
//! Shared vocabulary of the cluster: who stores data (`NodeId`, `NodeEntry`),
//! what is stored (`BlockId`), and where it goes (`BlockAssignment`).
//!
//! ## Core Concepts
//! - **Block Identifier**: `"<file_name>_block_<index>"`. The index is all digits, so the last
//!   `_block_` separator is unambiguous and identifiers never collide across files or positions.
//! - **Block Geometry**: A file of `S` bytes cut at block size `B` has `ceil(S / B)` blocks;
//!   every block is `B` bytes except possibly the last one.

pub mod types;
