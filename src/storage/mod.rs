//! Storage Node Module
//!
//! A storage node keeps opaque block payloads keyed by block identifier. It knows nothing about
//! files, plans, or other nodes: the client pushes and pulls blocks, and the directory only
//! records which node holds which identifier.
//!
//! ## Core Concepts
//! - **Idempotent Writes**: Writing an identifier again replaces its payload.
//! - **Independent Keys**: Blocks share no state, so writes to different identifiers never
//!   wait on each other. Concurrent writes to one identifier are last-writer-wins.
//! - **Backends**: `DiskBlockStore` (one file per block) and `MemoryBlockStore`, both behind the
//!   `BlockStore` trait.

pub mod disk;
pub mod handlers;
pub mod memory;
pub mod node;
pub mod protocol;
pub mod store;
