//! Pointer-driven drag state machine.
//!
//! ```text
//! Idle -> DownOnNode --(threshold)--> MovingNode | CreatingLink -> Idle
//!      \-> DownOnEmptySpace [CreatingNode with the CreateNode tool] -> Idle
//! ```
//!
//! Pressing on a node takes it out of the simulation by marking it
//! position-controlled; while it is dragged the interactor is the only writer
//! of its position. Releasing restores whatever pin state the node had before
//! the press.

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::config::{InteractorConfig, Tool};
use crate::error::Result;
use crate::graph::{Graph, LinkId, NodeId, NodeShape};

/// Where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Idle,
    DownOnNode { node: NodeId, origin: Vec2 },
    DownOnEmptySpace { origin: Vec2 },
}

/// A link being drawn from `source` toward the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalLink {
    pub source: NodeId,
    pub free_end: Vec2,
}

/// What the current gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    None,
    MovingNode { node: NodeId, offset: Vec2 },
    CreatingNode { position: Vec2 },
    CreatingLink(ProvisionalLink),
}

/// Outcome of a completed gesture, queued for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InteractionEvent {
    NodeClicked { node: NodeId },
    NodeMoved { node: NodeId, position: Vec2 },
    LinkCreated { link: LinkId, start: NodeId, end: NodeId },
    LinkDiscarded { source: NodeId },
    NodeCreated { node: NodeId },
    EmptySpaceClicked { position: Vec2 },
}

/// Pick radius around [`NodeShape::Point`] nodes, which have no outline.
pub const POINT_PICK_RADIUS: f32 = 4.0;

/// The topmost visible node whose outline contains `point`.
///
/// Point nodes are hit within [`POINT_PICK_RADIUS`]. Overlaps resolve to the
/// node whose centre is closest, then the one lying higher in depth, then the
/// most recently added.
pub fn hit_test(graph: &Graph, point: Vec2) -> Option<NodeId> {
    graph
        .nodes()
        .filter(|node| node.is_visible())
        .filter(|node| match node.shape {
            NodeShape::Point => node.position_2d().distance(point) <= POINT_PICK_RADIUS,
            shape => shape.contains(node.position_2d(), point),
        })
        .min_by(|a, b| {
            let da = a.position_2d().distance_squared(point);
            let db = b.position_2d().distance_squared(point);
            da.total_cmp(&db)
                .then(b.position.z.total_cmp(&a.position.z))
                .then(b.id().cmp(&a.id()))
        })
        .map(|node| node.id())
}

/// Translates pointer input into node drags and edits.
#[derive(Debug)]
pub struct Interactor {
    config: InteractorConfig,
    pointer: PointerState,
    drag: DragMode,
    /// Pointer minus node position at press time.
    press_offset: Vec2,
    /// Position control of the pressed node before the press.
    was_pinned: bool,
    events: Vec<InteractionEvent>,
}

impl Interactor {
    pub fn new() -> Self {
        Self {
            config: InteractorConfig::default(),
            pointer: PointerState::Idle,
            drag: DragMode::None,
            press_offset: Vec2::ZERO,
            was_pinned: false,
            events: Vec::new(),
        }
    }

    pub fn with_config(config: InteractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &InteractorConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next press.
    pub fn set_config(&mut self, config: InteractorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.config.edit_mode = edit_mode;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.config.tool = tool;
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag
    }

    /// The node currently being moved, if any.
    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.drag {
            DragMode::MovingNode { node, .. } => Some(node),
            _ => None,
        }
    }

    /// The link being drawn, for rendering a rubber band.
    pub fn provisional_link(&self) -> Option<ProvisionalLink> {
        match self.drag {
            DragMode::CreatingLink(link) => Some(link),
            _ => None,
        }
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Pointer Handling
    // =========================================================================

    /// Returns whether the press was consumed.
    pub fn handle_pointer_down(&mut self, graph: &mut Graph, point: Vec2) -> bool {
        if self.pointer != PointerState::Idle {
            log::debug!("pointer down while {:?}, cancelling the previous gesture", self.pointer);
            self.cancel(graph);
        }

        let pressed = hit_test(graph, point).and_then(|id| graph.node_mut(id));
        if let Some(node) = pressed {
            self.was_pinned = node.is_position_controlled();
            self.press_offset = point - node.position_2d();
            node.set_position_controlled(true);
            self.pointer = PointerState::DownOnNode {
                node: node.id(),
                origin: point,
            };
            log::trace!("pointer down on {}", node.id());
            return true;
        }

        self.pointer = PointerState::DownOnEmptySpace { origin: point };
        if self.config.active_tool() == Tool::CreateNode {
            self.drag = DragMode::CreatingNode { position: point };
            log::trace!("creating node at {point}");
            return true;
        }
        false
    }

    /// Returns whether the move was consumed.
    pub fn handle_pointer_move(&mut self, graph: &mut Graph, point: Vec2) -> bool {
        match self.pointer {
            PointerState::Idle => false,
            PointerState::DownOnEmptySpace { .. } => match &mut self.drag {
                DragMode::CreatingNode { position } => {
                    *position = point;
                    true
                }
                _ => false,
            },
            PointerState::DownOnNode { node, origin } => {
                if self.drag == DragMode::None {
                    if point.distance(origin) <= self.config.drag_threshold {
                        return true;
                    }
                    self.drag = match self.config.active_tool() {
                        Tool::CreateLink => DragMode::CreatingLink(ProvisionalLink {
                            source: node,
                            free_end: point,
                        }),
                        _ => DragMode::MovingNode {
                            node,
                            offset: self.press_offset,
                        },
                    };
                    log::trace!("drag started: {:?}", self.drag);
                }
                self.track(graph, point)
            }
        }
    }

    /// Returns whether the release completed a gesture.
    pub fn handle_pointer_up(&mut self, graph: &mut Graph, point: Vec2) -> bool {
        let vanished = matches!(
            self.pointer,
            PointerState::DownOnNode { node, .. } if graph.node(node).is_none()
        );
        if vanished {
            log::debug!("pressed node was removed before release");
            self.cancel(graph);
            return false;
        }

        let handled = match (self.pointer, self.drag) {
            (PointerState::Idle, _) => false,
            (PointerState::DownOnNode { node, .. }, DragMode::None) => {
                self.release(graph, node);
                self.events.push(InteractionEvent::NodeClicked { node });
                true
            }
            (PointerState::DownOnNode { node, .. }, DragMode::MovingNode { .. }) => {
                self.track(graph, point);
                if let Some(moved) = graph.node(node) {
                    self.events.push(InteractionEvent::NodeMoved {
                        node,
                        position: moved.position_2d(),
                    });
                }
                self.release(graph, node);
                true
            }
            (PointerState::DownOnNode { node, .. }, DragMode::CreatingLink(link)) => {
                self.release(graph, node);
                self.finish_link(graph, link, point);
                true
            }
            (PointerState::DownOnEmptySpace { .. }, DragMode::CreatingNode { .. }) => {
                let size = self.config.new_node_size;
                let shape = NodeShape::Rectangle {
                    width: size.x,
                    height: size.y,
                };
                let node = graph.add_node(point, shape);
                log::debug!("created {node} at {point}");
                self.events.push(InteractionEvent::NodeCreated { node });
                true
            }
            (PointerState::DownOnEmptySpace { origin }, _) => {
                if point.distance(origin) <= self.config.drag_threshold {
                    self.events.push(InteractionEvent::EmptySpaceClicked { position: point });
                }
                false
            }
            (PointerState::DownOnNode { node, .. }, DragMode::CreatingNode { .. }) => {
                self.release(graph, node);
                true
            }
        };

        self.reset();
        handled
    }

    /// Abandon the current gesture, restoring pin state and discarding any
    /// provisional link.
    pub fn cancel(&mut self, graph: &mut Graph) {
        if let PointerState::DownOnNode { node, .. } = self.pointer {
            self.release(graph, node);
        }
        if let DragMode::CreatingLink(link) = self.drag {
            self.events.push(InteractionEvent::LinkDiscarded { source: link.source });
        }
        self.reset();
    }

    /// Abandon the current gesture if it involves `node`, which is about to
    /// be removed. Returns whether a gesture was cancelled.
    pub fn forget_node(&mut self, graph: &mut Graph, node: NodeId) -> bool {
        let pressed = matches!(
            self.pointer,
            PointerState::DownOnNode { node: pressed, .. } if pressed == node
        );
        let drawing = self.provisional_link().is_some_and(|link| link.source == node);
        if !(pressed || drawing || self.dragged_node() == Some(node)) {
            return false;
        }
        log::debug!("cancelling gesture on removed {node}");
        self.cancel(graph);
        true
    }

    /// Apply the pointer position to the active drag.
    fn track(&mut self, graph: &mut Graph, point: Vec2) -> bool {
        match &mut self.drag {
            &mut DragMode::MovingNode { node, offset } => match graph.node_mut(node) {
                Some(dragged) => {
                    dragged.set_position_2d(point - offset);
                    dragged.velocity = Vec3::ZERO;
                    true
                }
                None => {
                    log::debug!("{node} was removed while dragged");
                    self.reset();
                    false
                }
            },
            DragMode::CreatingLink(link) => {
                link.free_end = point;
                true
            }
            DragMode::CreatingNode { position } => {
                *position = point;
                true
            }
            DragMode::None => true,
        }
    }

    fn finish_link(&mut self, graph: &mut Graph, link: ProvisionalLink, point: Vec2) {
        let target = hit_test(graph, point).filter(|&target| target != link.source);
        let created = target.and_then(|end| match graph.add_link(link.source, end) {
            Ok(id) => Some((id, end)),
            Err(err) => {
                log::warn!("could not create link: {err}");
                None
            }
        });
        match created {
            Some((id, end)) => {
                log::debug!("created {id} from {} to {end}", link.source);
                self.events.push(InteractionEvent::LinkCreated {
                    link: id,
                    start: link.source,
                    end,
                });
            }
            None => self.events.push(InteractionEvent::LinkDiscarded {
                source: link.source,
            }),
        }
    }

    fn release(&self, graph: &mut Graph, node: NodeId) {
        if let Some(released) = graph.node_mut(node) {
            released.set_position_controlled(self.was_pinned);
        }
    }

    fn reset(&mut self) {
        self.pointer = PointerState::Idle;
        self.drag = DragMode::None;
        self.press_offset = Vec2::ZERO;
        self.was_pinned = false;
    }
}

impl Default for Interactor {
    fn default() -> Self {
        Self::new()
    }
}
