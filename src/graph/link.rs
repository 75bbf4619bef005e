//! Link type and related structures.
//!
//! Links are the connections between nodes. Each link has:
//! - A stable unique identifier
//! - Start and end nodes (held by the graph arena, not by the link)
//! - Preferred angles for the discrete-angle moment force
//! - A bending offset separating parallel links
//! - A label footprint that can serve as the spring rest length

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable link identifier.
///
/// This ID remains valid even after other links are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl LinkId {
    /// Create a new LinkId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.0)
    }
}

impl From<u32> for LinkId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<LinkId> for u32 {
    #[inline]
    fn from(id: LinkId) -> Self {
        id.0
    }
}

/// Link state flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkState {
    flags: u8,
}

impl LinkState {
    const HIDDEN: u8 = 0b0000_0001;

    /// Create a new default link state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the link is hidden.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    /// Set the hidden state.
    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.flags |= Self::HIDDEN;
        } else {
            self.flags &= !Self::HIDDEN;
        }
    }
}

/// The payload stored on each graph edge.
#[derive(Debug, Clone)]
pub struct Link {
    id: LinkId,
    /// Target bearings in degrees. Empty disables the moment force.
    pub preferred_angles: Vec<f32>,
    /// Lateral offset of the link's apex from the straight chord.
    pub bending_offset: f32,
    /// Width and height of the link label; zero when unlabeled.
    pub label_size: Vec2,
    state: LinkState,
}

impl Link {
    pub(crate) fn new(id: LinkId) -> Self {
        Self {
            id,
            preferred_angles: Vec::new(),
            bending_offset: 0.0,
            label_size: Vec2::ZERO,
            state: LinkState::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> LinkId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.state.is_hidden()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.set_hidden(!visible);
    }

    /// Diagonal of the label box, the room the label needs along the link.
    pub fn label_footprint(&self) -> f32 {
        self.label_size.max(Vec2::ZERO).length()
    }
}
