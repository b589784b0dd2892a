//! Directory Service Module
//!
//! The metadata coordinator of the cluster. It never touches block payloads; it only decides
//! where blocks go and remembers where they went.
//!
//! ## Core Concepts
//! - **Registry**: The static, ordered list of storage nodes fixed at start-up.
//! - **Placement**: Round-robin. Block `i` lands on registry entry `i mod N`, a pure function of
//!   the block index and the node count, so identical requests get identical plans.
//! - **Write Plan**: Advisory assignment handed to the client. Nothing is recorded until commit.
//! - **Commit**: Validates the assignments and swaps the whole file record in at once; readers
//!   observe the previous record or the new one, never a mix.
//! - **Read Plan**: The committed record, returned verbatim.
//!
//! ## Submodules
//! - **`registry`**: The storage node registry.
//! - **`placement`**: The round-robin placement policy.
//! - **`table`**: The file record table.
//! - **`service`**: `DirectoryService`, the operation interface over registry, policy and table.
//! - **`handlers`** / **`protocol`**: The HTTP surface.

pub mod handlers;
pub mod placement;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod table;
pub mod types;

#[cfg(test)]
mod tests;
