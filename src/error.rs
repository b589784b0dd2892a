//! Cluster Error Kinds
//!
//! Every service operation fails with a `ClusterError`. Services return it to callers as an
//! `ErrorResponse` body carrying the snake_case `ErrorKind`, and the client rebuilds the typed
//! error from that body, so a `FileNotFound` raised by the directory is still a `FileNotFound`
//! when it reaches the code that asked for the read plan.

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::ErrorResponse;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// No committed file record exists under this name.
    #[error("file not found: {0}")]
    FileNotFound(String),
    /// The storage node never received a block under this identifier.
    #[error("block not found: {0}")]
    BlockNotFound(String),
    /// Transport failure reaching a storage node or the directory.
    #[error("node unreachable: {0}")]
    NodeUnreachable(String),
    /// The storage node could not persist a block.
    #[error("write failure: {0}")]
    WriteFailure(String),
    /// A commit referenced an assignment the directory cannot accept.
    #[error("commit mismatch: {0}")]
    CommitMismatch(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Reassembled data does not match the recorded file size.
    #[error("corrupt data: {0}")]
    Corrupt(String),
    /// A peer answered with something that is not part of the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire form of the error variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FileNotFound,
    BlockNotFound,
    NodeUnreachable,
    WriteFailure,
    CommitMismatch,
    InvalidRequest,
    Corrupt,
    Protocol,
    Io,
}

pub type ClusterResult<T> = Result<T, ClusterError>;

impl ClusterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClusterError::FileNotFound(_) => ErrorKind::FileNotFound,
            ClusterError::BlockNotFound(_) => ErrorKind::BlockNotFound,
            ClusterError::NodeUnreachable(_) => ErrorKind::NodeUnreachable,
            ClusterError::WriteFailure(_) => ErrorKind::WriteFailure,
            ClusterError::CommitMismatch(_) => ErrorKind::CommitMismatch,
            ClusterError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ClusterError::Corrupt(_) => ErrorKind::Corrupt,
            ClusterError::Protocol(_) => ErrorKind::Protocol,
            ClusterError::Io(_) => ErrorKind::Io,
        }
    }

    /// Rebuilds an error from the kind and message of an `ErrorResponse`.
    pub fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::FileNotFound => ClusterError::FileNotFound(message),
            ErrorKind::BlockNotFound => ClusterError::BlockNotFound(message),
            ErrorKind::NodeUnreachable => ClusterError::NodeUnreachable(message),
            ErrorKind::WriteFailure => ClusterError::WriteFailure(message),
            ErrorKind::CommitMismatch => ClusterError::CommitMismatch(message),
            ErrorKind::InvalidRequest => ClusterError::InvalidRequest(message),
            ErrorKind::Corrupt => ClusterError::Corrupt(message),
            ErrorKind::Protocol => ClusterError::Protocol(message),
            ErrorKind::Io => ClusterError::Io(std::io::Error::other(message)),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ClusterError::FileNotFound(_) | ClusterError::BlockNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ClusterError::CommitMismatch(_) => StatusCode::CONFLICT,
            ClusterError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ClusterError::NodeUnreachable(_) | ClusterError::Protocol(_) => {
                StatusCode::BAD_GATEWAY
            }
            ClusterError::WriteFailure(_) | ClusterError::Corrupt(_) | ClusterError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The `(status, body)` pair a handler returns for this error.
    pub fn to_reply(&self) -> (StatusCode, Json<ErrorResponse>) {
        let message = match self {
            ClusterError::FileNotFound(m)
            | ClusterError::BlockNotFound(m)
            | ClusterError::NodeUnreachable(m)
            | ClusterError::WriteFailure(m)
            | ClusterError::CommitMismatch(m)
            | ClusterError::InvalidRequest(m)
            | ClusterError::Corrupt(m)
            | ClusterError::Protocol(m) => m.clone(),
            ClusterError::Io(e) => e.to_string(),
        };
        (
            self.status_code(),
            Json(ErrorResponse {
                kind: self.kind(),
                message,
            }),
        )
    }
}
