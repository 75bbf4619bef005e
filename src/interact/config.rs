//! Interactor configuration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// What a pointer gesture does in edit mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Drag nodes around.
    #[default]
    Move,
    /// Drag from one node to another to connect them.
    CreateLink,
    /// Click or drag on empty space to place a node.
    CreateNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractorConfig {
    /// Pointer travel in pixels before a press becomes a drag (default: 5).
    pub drag_threshold: f32,
    /// Enables the creation tools (default: false).
    pub edit_mode: bool,
    pub tool: Tool,
    /// Size of rectangles placed by [`Tool::CreateNode`] (default: 40x30).
    pub new_node_size: Vec2,
}

impl Default for InteractorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            edit_mode: false,
            tool: Tool::Move,
            new_node_size: Vec2::new(40.0, 30.0),
        }
    }
}

impl InteractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "dragThreshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        if !self.new_node_size.is_finite() || self.new_node_size.cmple(Vec2::ZERO).any() {
            return Err(LayoutError::InvalidConfig(format!(
                "newNodeSize must be positive, got {}",
                self.new_node_size
            )));
        }
        Ok(())
    }

    /// The tool in effect: creation tools only apply in edit mode.
    pub fn active_tool(&self) -> Tool {
        if self.edit_mode { self.tool } else { Tool::Move }
    }
}
