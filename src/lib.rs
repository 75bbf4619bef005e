//! Force Diagram - WASM Module
//!
//! This module provides the force-directed layout core of an interactive
//! diagram editor. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the host owns rendering, the
//! viewport and the frame loop and calls [`ForceLayoutWasm::simulate`] once
//! per frame.
//!
//! # Architecture
//!
//! - `graph`: Node/link arena using petgraph's StableGraph
//! - `force`: Force contributors accumulating per-kind forces
//! - `sim`: The per-tick reset, accumulate, integrate and recentre loop
//! - `interact`: Pointer hit testing and the drag state machine
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `geometry`: Angle, segment and curve helpers

use glam::Vec2;
use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod force;
pub mod geometry;
pub mod graph;
pub mod interact;
pub mod logging;
pub mod sim;
pub mod spatial;

use error::LayoutError;
use force::{AttractionForce, ForceContributor, ForceKind, ForceSetting, RestLength};
use graph::{Graph, LinkId, NodeId, NodeShape};
use interact::{Interactor, InteractorConfig, Tool};
use sim::{SimulationConfig, Simulator};
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Change the console log level (`"error"` .. `"trace"`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    log::set_max_level(logging::parse_level(level));
}

fn to_js(err: LayoutError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn force_kind(kind: u8) -> Result<ForceKind, JsValue> {
    ForceKind::try_from(kind).map_err(to_js)
}

/// A contributor's tuning table as seen by the host UI.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContributorSettings<'a> {
    kind: u8,
    name: String,
    enabled: bool,
    settings: Vec<&'a ForceSetting>,
}

/// Main entry point for the layout engine.
///
/// Bundles the diagram graph, the simulator and the pointer interactor and
/// provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct ForceLayoutWasm {
    graph: Graph,
    simulator: Simulator,
    interactor: Interactor,
}

#[wasm_bindgen]
impl ForceLayoutWasm {
    /// Create an empty diagram with default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            simulator: Simulator::new(),
            interactor: Interactor::new(),
        }
    }

    /// Create an empty diagram with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, link_capacity: usize) -> Self {
        Self {
            graph: Graph::with_capacity(node_capacity, link_capacity),
            ..Self::new()
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the simulation configuration from a (partial) JS object.
    #[wasm_bindgen(js_name = setSimulationConfig)]
    pub fn set_simulation_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: SimulationConfig = serde_wasm_bindgen::from_value(config)?;
        self.simulator.set_config(config).map_err(to_js)
    }

    #[wasm_bindgen(js_name = getSimulationConfig)]
    pub fn get_simulation_config(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.simulator.config())?)
    }

    /// Replace the interactor configuration from a (partial) JS object.
    #[wasm_bindgen(js_name = setInteractorConfig)]
    pub fn set_interactor_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: InteractorConfig = serde_wasm_bindgen::from_value(config)?;
        self.interactor.set_config(config).map_err(to_js)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a rectangular node centred at (x, y).
    ///
    /// A zero width or height adds a dimensionless point node.
    /// Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32, width: f32, height: f32) -> u32 {
        let shape = if width > 0.0 && height > 0.0 {
            NodeShape::Rectangle { width, height }
        } else {
            NodeShape::Point
        };
        self.graph.add_node(Vec2::new(x, y), shape).0
    }

    /// Add a circular node centred at (x, y).
    #[wasm_bindgen(js_name = addCircleNode)]
    pub fn add_circle_node(&mut self, x: f32, y: f32, radius: f32) -> u32 {
        let shape = NodeShape::Circle {
            radius: radius.max(0.0),
        };
        self.graph.add_node(Vec2::new(x, y), shape).0
    }

    /// Remove a node and every link attached to it.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.interactor.forget_node(&mut self.graph, NodeId(node_id));
        self.graph.remove_node(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// IDs of all nodes, in the order [`Self::get_positions`] reports them.
    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&self) -> Vec<u32> {
        self.graph.nodes().map(|node| node.id().0).collect()
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32) -> Result<(), JsValue> {
        self.graph
            .set_node_position(NodeId(node_id), Vec2::new(x, y))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = setNodeVisible)]
    pub fn set_node_visible(&mut self, node_id: u32, visible: bool) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_visible(visible);
        Ok(())
    }

    #[wasm_bindgen(js_name = setNodeAcceptsForces)]
    pub fn set_node_accepts_forces(&mut self, node_id: u32, accepts: bool) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_accepts_forces(accepts);
        Ok(())
    }

    #[wasm_bindgen(js_name = setNodeExertsForces)]
    pub fn set_node_exerts_forces(&mut self, node_id: u32, exerts: bool) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_exerts_forces(exerts);
        Ok(())
    }

    /// Pin a node in place (or release it) from editing logic.
    ///
    /// A node pinned this way stays pinned after being dragged.
    #[wasm_bindgen(js_name = setNodePinned)]
    pub fn set_node_pinned(&mut self, node_id: u32, pinned: bool) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_position_controlled(pinned);
        Ok(())
    }

    /// Toggle fade animation; when off, visibility changes snap.
    #[wasm_bindgen(js_name = setNodeAnimated)]
    pub fn set_node_animated(&mut self, node_id: u32, animated: bool) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_animated(animated);
        Ok(())
    }

    #[wasm_bindgen(js_name = setNodeMass)]
    pub fn set_node_mass(&mut self, node_id: u32, mass: f32) -> Result<(), JsValue> {
        self.node_mut(node_id)?.set_mass(mass);
        Ok(())
    }

    /// Recompute every node's mass using the configured mass mode.
    #[wasm_bindgen(js_name = deriveMasses)]
    pub fn derive_masses(&mut self) {
        self.graph.derive_masses(self.simulator.config().mass_mode);
    }

    /// Tag a node with a lane, or clear it with `undefined`.
    #[wasm_bindgen(js_name = setNodeLane)]
    pub fn set_node_lane(&mut self, node_id: u32, lane: Option<String>) -> Result<(), JsValue> {
        self.node_mut(node_id)?.lane = lane;
        Ok(())
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Connect two nodes. Returns the stable link ID.
    #[wasm_bindgen(js_name = addLink)]
    pub fn add_link(&mut self, start: u32, end: u32) -> Result<u32, JsValue> {
        self.graph
            .add_link(NodeId(start), NodeId(end))
            .map(|id| id.0)
            .map_err(to_js)
    }

    /// Returns true if the link existed and was removed.
    #[wasm_bindgen(js_name = removeLink)]
    pub fn remove_link(&mut self, link_id: u32) -> bool {
        self.graph.remove_link(LinkId(link_id))
    }

    #[wasm_bindgen(js_name = linkCount)]
    pub fn link_count(&self) -> u32 {
        self.graph.link_count() as u32
    }

    /// Set the bearings (degrees) the link prefers to settle at.
    #[wasm_bindgen(js_name = setLinkPreferredAngles)]
    pub fn set_link_preferred_angles(&mut self, link_id: u32, angles: &[f32]) -> Result<(), JsValue> {
        self.link_mut(link_id)?.preferred_angles = angles.to_vec();
        Ok(())
    }

    #[wasm_bindgen(js_name = setLinkBendingOffset)]
    pub fn set_link_bending_offset(&mut self, link_id: u32, offset: f32) -> Result<(), JsValue> {
        self.link_mut(link_id)?.bending_offset = offset;
        Ok(())
    }

    #[wasm_bindgen(js_name = setLinkLabelSize)]
    pub fn set_link_label_size(&mut self, link_id: u32, width: f32, height: f32) -> Result<(), JsValue> {
        self.link_mut(link_id)?.label_size = Vec2::new(width, height);
        Ok(())
    }

    #[wasm_bindgen(js_name = setLinkVisible)]
    pub fn set_link_visible(&mut self, link_id: u32, visible: bool) -> Result<(), JsValue> {
        self.link_mut(link_id)?.set_visible(visible);
        Ok(())
    }

    /// Spread links sharing the same pair of nodes into symmetric bends.
    #[wasm_bindgen(js_name = assignParallelOffsets)]
    pub fn assign_parallel_offsets(&mut self, spacing: f32) {
        self.graph.assign_parallel_offsets(spacing);
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Run one tick. Returns the kinetic energy of the simulated nodes.
    pub fn simulate(&mut self, dt: f32, viewport_width: f32, viewport_height: f32) -> f32 {
        self.simulator
            .simulate(&mut self.graph, dt, viewport_width, viewport_height)
    }

    #[wasm_bindgen(js_name = setPaused)]
    pub fn set_paused(&mut self, paused: bool) {
        self.simulator.set_paused(paused);
    }

    #[wasm_bindgen(js_name = kineticEnergy)]
    pub fn kinetic_energy(&self) -> f32 {
        self.simulator.kinetic_energy()
    }

    // =========================================================================
    // Pointer Handling
    // =========================================================================

    #[wasm_bindgen(js_name = handlePointerDown)]
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.interactor
            .handle_pointer_down(&mut self.graph, Vec2::new(x, y))
    }

    #[wasm_bindgen(js_name = handlePointerMove)]
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.interactor
            .handle_pointer_move(&mut self.graph, Vec2::new(x, y))
    }

    #[wasm_bindgen(js_name = handlePointerUp)]
    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.interactor
            .handle_pointer_up(&mut self.graph, Vec2::new(x, y))
    }

    #[wasm_bindgen(js_name = setEditMode)]
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.interactor.set_edit_mode(edit_mode);
    }

    /// Select `"move"`, `"createLink"` or `"createNode"`.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, tool: JsValue) -> Result<(), JsValue> {
        let tool: Tool = serde_wasm_bindgen::from_value(tool)?;
        self.interactor.set_tool(tool);
        Ok(())
    }

    /// Interaction events since the last call, as an array of tagged objects.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.interactor.drain_events())?)
    }

    /// The link being drawn, as `{ source, freeEnd }`, or `undefined`.
    #[wasm_bindgen(js_name = getProvisionalLink)]
    pub fn get_provisional_link(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.interactor.provisional_link())?)
    }

    // =========================================================================
    // Read-back
    // =========================================================================

    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.graph.node(NodeId(node_id)).map(|node| node.position.x)
    }

    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.graph.node(NodeId(node_id)).map(|node| node.position.y)
    }

    /// Depth coordinate, for perspective-style rendering of crossings.
    #[wasm_bindgen(js_name = getNodeZ)]
    pub fn get_node_z(&self, node_id: u32) -> Option<f32> {
        self.graph.node(NodeId(node_id)).map(|node| node.position.z)
    }

    /// Current fade-in/out opacity in [0, 1].
    #[wasm_bindgen(js_name = getNodeOpacity)]
    pub fn get_node_opacity(&self, node_id: u32) -> Option<f32> {
        self.graph.node(NodeId(node_id)).map(|node| node.opacity())
    }

    /// Positions as [x0, y0, z0, x1, y1, z1, ...] in [`Self::get_node_ids`] order.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        let positions: Vec<f32> = self
            .graph
            .nodes()
            .flat_map(|node| node.position.to_array())
            .collect();
        Float32Array::from(&positions[..])
    }

    /// The force of one kind on a node as [x, y, z], for debug overlays.
    #[wasm_bindgen(js_name = getNodeForce)]
    pub fn get_node_force(&self, node_id: u32, kind: u8) -> Result<Option<Vec<f32>>, JsValue> {
        let kind = force_kind(kind)?;
        Ok(self
            .graph
            .node(NodeId(node_id))
            .map(|node| node.force(kind).to_array().to_vec()))
    }

    /// Bounding box of all visible nodes as [min_x, min_y, max_x, max_y].
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.graph
            .bounds()
            .map(|(min, max)| vec![min.x, min.y, max.x, max.y])
    }

    /// IDs of visible nodes whose bounding box intersects the rectangle
    /// spanned by (x0, y0) and (x1, y1), for rubber-band selection.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<u32> {
        let mut ids = SpatialIndex::from_graph(&self.graph)
            .in_rect(Vec2::new(x0, y0), Vec2::new(x1, y1));
        ids.sort();
        ids.into_iter().map(|id| id.0).collect()
    }

    /// Remove all nodes and links.
    pub fn clear(&mut self) {
        self.interactor.cancel(&mut self.graph);
        self.graph.clear();
    }

    // =========================================================================
    // Tuning
    // =========================================================================

    /// Every contributor's settings table.
    #[wasm_bindgen(js_name = getSettings)]
    pub fn get_settings(&self) -> Result<JsValue, JsValue> {
        let tables: Vec<ContributorSettings<'_>> = self
            .simulator
            .contributors()
            .map(|contributor| ContributorSettings {
                kind: contributor.kind() as u8,
                name: contributor.kind().to_string(),
                enabled: contributor.is_enabled(),
                settings: contributor.settings().iter().collect(),
            })
            .collect();
        Ok(serde_wasm_bindgen::to_value(&tables)?)
    }

    /// Change a setting. Returns the value stored after clamping and rounding.
    #[wasm_bindgen(js_name = setSetting)]
    pub fn set_setting(&mut self, kind: u8, name: &str, value: f32) -> Result<f32, JsValue> {
        let kind = force_kind(kind)?;
        self.simulator.set_setting(kind, name, value).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setForceEnabled)]
    pub fn set_force_enabled(&mut self, kind: u8, enabled: bool) -> Result<(), JsValue> {
        let kind = force_kind(kind)?;
        self.simulator.set_enabled(kind, enabled).map_err(to_js)
    }

    /// Measure attraction rest length from link label footprints instead of
    /// the fixed `restLength` setting.
    #[wasm_bindgen(js_name = setRestLengthFromLabels)]
    pub fn set_rest_length_from_labels(&mut self, from_labels: bool) {
        let mode = if from_labels {
            RestLength::LabelFootprint
        } else {
            RestLength::Fixed
        };
        let mut attraction = AttractionForce::default();
        if let Some(current) = self.simulator.contributor(ForceKind::Attraction) {
            *attraction.settings_mut() = current.settings().clone();
            attraction.set_enabled(current.is_enabled());
        }
        attraction.set_rest_length_mode(mode);
        self.simulator.replace_contributor(Box::new(attraction));
    }
}

impl ForceLayoutWasm {
    fn node_mut(&mut self, node_id: u32) -> Result<&mut graph::Node, JsValue> {
        self.graph.try_node_mut(NodeId(node_id)).map_err(to_js)
    }

    fn link_mut(&mut self, link_id: u32) -> Result<&mut graph::Link, JsValue> {
        self.graph.try_link_mut(LinkId(link_id)).map_err(to_js)
    }

    /// The diagram graph, for native callers.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }
}

impl Default for ForceLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}
