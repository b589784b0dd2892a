//! Distributed Block Storage Cluster Library
//!
//! This library crate defines the core modules of a simulated block-storage cluster.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of three services plus shared helpers:
//!
//! - **`block`**: Block addressing. Block identifiers, node identities, and the
//!   arithmetic that cuts a byte length into fixed-size blocks.
//! - **`directory`**: The metadata coordinator. Owns the static storage node registry,
//!   the round-robin placement policy, and the file record table. Hands out write
//!   plans, accepts commits, and answers read plans.
//! - **`storage`**: The storage node. Stores and serves opaque block payloads keyed
//!   by block identifier, on disk or in memory.
//! - **`client`**: The client coordinator. Splits files into blocks, drives the
//!   plan -> push -> commit write protocol and the plan -> pull -> reassemble read protocol.
//! - **`config`**, **`error`**, **`protocol`**: Cluster configuration, the typed error
//!   kinds, and the wire records shared by every service.

pub mod block;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod protocol;
pub mod storage;
