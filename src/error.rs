//! Error type for editing operations.
//!
//! A simulation tick never fails: degenerate geometry contributes nothing.
//! Errors only come from edits that reference something that does not exist
//! or from configuration the host could not decode.

use thiserror::Error;

use crate::force::ForceKind;
use crate::graph::{LinkId, NodeId};

/// Errors raised by graph edits, tuning and configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("{0} does not exist")]
    UnknownNode(NodeId),

    #[error("{0} does not exist")]
    UnknownLink(LinkId),

    #[error("{kind} has no setting named `{name}`")]
    UnknownSetting { kind: ForceKind, name: String },

    #[error("unknown force kind index {0}")]
    UnknownForceKind(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
