//! Client Coordinator Module
//!
//! File-level logic of the cluster. The directory and the storage nodes only ever see plans and
//! blocks; this module is where files are cut into blocks and put back together.
//!
//! ## Protocol
//! - **Write**: ask the directory for a write plan, push every block to its assigned node
//!   (node-parallel, one transfer in flight per node), then commit. Any failed transfer aborts
//!   the write before the commit, so the directory keeps whatever record it had.
//! - **Read**: ask for the read plan, pull every block (same dispatch rule), concatenate in plan
//!   order and truncate to the recorded size. Any failed fetch aborts the whole read.
//!
//! ## Submodules
//! - **`transport`**: Typed HTTP clients for the directory and for storage nodes.
//! - **`coordinator`**: `ClientCoordinator`, the write and read paths.

pub mod coordinator;
pub mod transport;
