//! The per-tick simulation loop.
//!
//! One call to [`Simulator::simulate`] runs a complete tick:
//! 1. **Reset**: advance fade ramps and zero every node's force accumulator.
//! 2. **Accumulate**: run each enabled contributor in a fixed order.
//! 3. **Time scale**: pick a calm or energetic `dt` multiplier from the
//!    previous tick's kinetic energy.
//! 4. **Integrate**: `a = F / m`, `v = (v + a * dt) * damping`, `x += v * dt`
//!    for simulated nodes, summing `0.5 * m * |v|^2`.
//! 5. **Recentre**: translate simulated nodes so the layout's top-left corner
//!    sits at the origin, unless some node is under position control.
//!
//! All forces are accumulated before any node moves, so results never depend
//! on the order nodes are visited. While paused, steps 3-5 are skipped.

use glam::{Vec2, Vec3};

use super::config::SimulationConfig;
use crate::error::{LayoutError, Result};
use crate::force::{ForceContributor, ForceKind, ForceSetting, ForceSettings, default_contributors};
use crate::graph::{Graph, Node};

/// Callback invoked after a contributor setting changes.
pub type SettingObserver = Box<dyn FnMut(ForceKind, &ForceSetting)>;

/// Drives the force contributors and integrates node motion.
pub struct Simulator {
    config: SimulationConfig,
    contributors: Vec<Box<dyn ForceContributor>>,
    observers: Vec<SettingObserver>,
    kinetic_energy: f32,
    energetic: bool,
}

impl Simulator {
    /// A simulator with the default configuration and contributor set.
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            contributors: default_contributors(),
            observers: Vec::new(),
            kinetic_energy: 0.0,
            energetic: false,
        }
    }

    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Replace the contributor set, e.g. to plug in a custom force.
    pub fn with_contributors(mut self, contributors: Vec<Box<dyn ForceContributor>>) -> Self {
        self.contributors = contributors;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.config.paused {
            log::debug!("simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.config.paused = paused;
    }

    /// Kinetic energy after the most recent tick.
    pub fn kinetic_energy(&self) -> f32 {
        self.kinetic_energy
    }

    // =========================================================================
    // Contributors and Settings
    // =========================================================================

    pub fn contributors(&self) -> impl Iterator<Item = &dyn ForceContributor> {
        self.contributors.iter().map(|contributor| contributor.as_ref())
    }

    pub fn contributor(&self, kind: ForceKind) -> Option<&dyn ForceContributor> {
        self.contributors().find(|contributor| contributor.kind() == kind)
    }

    fn contributor_mut(&mut self, kind: ForceKind) -> Option<&mut Box<dyn ForceContributor>> {
        self.contributors
            .iter_mut()
            .find(|contributor| contributor.kind() == kind)
    }

    /// Swap in `contributor` for the one of the same kind, or append it.
    pub fn replace_contributor(&mut self, contributor: Box<dyn ForceContributor>) {
        match self.contributor_mut(contributor.kind()) {
            Some(slot) => *slot = contributor,
            None => self.contributors.push(contributor),
        }
    }

    /// Enable or disable the contributor of `kind`.
    pub fn set_enabled(&mut self, kind: ForceKind, enabled: bool) -> Result<()> {
        let contributor = self.contributor_mut(kind).ok_or(LayoutError::UnknownSetting {
            kind,
            name: "enabled".into(),
        })?;
        if contributor.is_enabled() != enabled {
            log::info!("{kind} {}", if enabled { "enabled" } else { "disabled" });
        }
        contributor.set_enabled(enabled);
        Ok(())
    }

    /// All settings tables, keyed by contributor kind.
    pub fn settings(&self) -> Vec<(ForceKind, &ForceSettings)> {
        self.contributors()
            .map(|contributor| (contributor.kind(), contributor.settings()))
            .collect()
    }

    /// Change a contributor setting and notify observers.
    ///
    /// Returns the value actually stored after clamping and rounding.
    pub fn set_setting(&mut self, kind: ForceKind, name: &str, value: f32) -> Result<f32> {
        let unknown = || LayoutError::UnknownSetting {
            kind,
            name: name.to_string(),
        };
        let contributor = self.contributor_mut(kind).ok_or_else(unknown)?;
        let stored = contributor.settings_mut().set(name, value).ok_or_else(unknown)?;
        log::info!("{kind}.{name} = {stored}");

        if let Some(setting) = contributor.settings().get(name).cloned() {
            for observer in &mut self.observers {
                observer(kind, &setting);
            }
        }
        Ok(stored)
    }

    /// Register a callback run synchronously after every setting change.
    pub fn on_setting_change(&mut self, observer: impl FnMut(ForceKind, &ForceSetting) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Run one tick and return the resulting kinetic energy.
    pub fn simulate(
        &mut self,
        graph: &mut Graph,
        dt: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        graph.advance_fades(dt);
        graph.reset_forces();
        for contributor in &self.contributors {
            if contributor.is_enabled() {
                contributor.update_forces(graph, viewport_width, viewport_height);
            }
        }

        if self.config.paused {
            self.kinetic_energy = 0.0;
            return 0.0;
        }

        let step = dt * self.time_scale();
        let energy = integrate(graph, step, self.config.damping);

        if self.config.recentre && !graph.has_position_controlled_node() {
            recentre(graph);
        }

        self.kinetic_energy = energy;
        energy
    }

    /// Pick the `dt` multiplier from the previous tick's energy.
    fn time_scale(&mut self) -> f32 {
        let energetic = self.kinetic_energy > self.config.energy_threshold;
        if energetic != self.energetic {
            log::debug!(
                "kinetic energy {} crossed {}, switching to {} time scale",
                self.kinetic_energy,
                self.config.energy_threshold,
                if energetic { "energetic" } else { "calm" }
            );
            self.energetic = energetic;
        }
        if energetic {
            self.config.energetic_time_scale
        } else {
            self.config.calm_time_scale
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Kinetic energy of one node.
#[inline]
pub fn kinetic_energy_of(node: &Node) -> f32 {
    0.5 * node.mass() * node.velocity.length_squared()
}

/// Integrate simulated nodes over `step` and return their kinetic energy.
pub fn integrate(graph: &mut Graph, step: f32, damping: f32) -> f32 {
    let mut energy = 0.0;
    for node in graph.nodes_mut() {
        if !node.is_simulated() {
            node.acceleration = Vec3::ZERO;
            continue;
        }
        node.acceleration = node.total_force() / node.mass();
        node.velocity = (node.velocity + node.acceleration * step) * damping;
        if !node.velocity.is_finite() {
            log::warn!("{} reached a non-finite velocity, stopping it", node.id());
            node.velocity = Vec3::ZERO;
        }
        node.position += node.velocity * step;
        energy += kinetic_energy_of(node);
    }
    energy
}

/// Translate simulated nodes so the top-left corner of all visible or
/// force-exerting outlines sits at the origin. Returns the applied offset.
pub fn recentre(graph: &mut Graph) -> Option<Vec2> {
    let corner = graph
        .nodes()
        .filter(|node| node.is_visible() || node.exerts_forces())
        .map(|node| node.bounding_box().0)
        .reduce(Vec2::min)?;
    if corner == Vec2::ZERO {
        return None;
    }

    let offset = -corner;
    for node in graph.nodes_mut().filter(|node| node.is_simulated()) {
        node.position += offset.extend(0.0);
    }
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, NodeShape};
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet() -> Simulator {
        let mut sim = Simulator::with_config(SimulationConfig {
            calm_time_scale: 1.0,
            recentre: false,
            ..Default::default()
        })
        .unwrap();
        for kind in ForceKind::ALL {
            sim.set_enabled(kind, false).unwrap();
        }
        sim
    }

    fn two_nodes(distance: f32) -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node(Vec2::new(0.0, 0.0), NodeShape::Point);
        let b = graph.add_node(Vec2::new(distance, 0.0), NodeShape::Point);
        (graph, a, b)
    }

    #[test]
    fn test_zero_dt_keeps_positions_but_damps_velocity() {
        let (mut graph, a, _) = two_nodes(50.0);
        graph.try_node_mut(a).unwrap().velocity = Vec3::new(10.0, 0.0, 0.0);

        let mut sim = Simulator::new();
        sim.simulate(&mut graph, 0.0, 800.0, 600.0);

        let node = graph.node(a).unwrap();
        assert_eq!(node.position_2d(), Vec2::ZERO);
        assert!(approx_eq!(f32, node.velocity.x, 8.5, epsilon = 1e-5));
    }

    #[test]
    fn test_isolated_node_comes_to_rest() {
        let mut graph = Graph::new();
        let id = graph.add_node(Vec2::new(5.0, 5.0), NodeShape::Point);
        graph.try_node_mut(id).unwrap().velocity = Vec3::new(3.0, -4.0, 0.0);

        let mut sim = quiet();
        let mut energy = f32::INFINITY;
        for _ in 0..200 {
            energy = sim.simulate(&mut graph, 0.1, 800.0, 600.0);
        }
        assert!(energy < 1e-10);
        assert!(graph.node(id).unwrap().velocity.length() < 1e-5);
    }

    #[test]
    fn test_energy_matches_formula() {
        let (mut graph, a, b) = two_nodes(50.0);
        graph.try_node_mut(a).unwrap().set_mass(2.0);
        let mut sim = Simulator::new();
        let energy = sim.simulate(&mut graph, 0.01, 800.0, 600.0);

        let expected: f32 = [a, b]
            .iter()
            .map(|&id| kinetic_energy_of(graph.node(id).unwrap()))
            .sum();
        assert!(energy > 0.0);
        assert!(approx_eq!(f32, energy, expected, ulps = 4));
        assert_eq!(sim.kinetic_energy(), energy);
    }

    #[test]
    fn test_integration_step() {
        let (mut graph, a, b) = two_nodes(50.0);
        let mut sim = quiet();
        sim.set_enabled(ForceKind::Repulsion, true).unwrap();
        sim.simulate(&mut graph, 0.1, 800.0, 600.0);

        // F = 200, m = 1: v = 200 * 0.1 * 0.85 = 17, x = 1.7
        let node = graph.node(a).unwrap();
        assert!(approx_eq!(f32, node.acceleration.x, -200.0, epsilon = 1e-2));
        assert!(approx_eq!(f32, node.velocity.x, -17.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, node.position.x, -1.7, epsilon = 1e-4));
        assert!(graph.node(b).unwrap().position.x > 50.0);
    }

    #[test]
    fn test_heavier_node_moves_less() {
        let (mut graph, a, b) = two_nodes(50.0);
        graph.try_node_mut(a).unwrap().set_mass(4.0);
        let mut sim = quiet();
        sim.set_enabled(ForceKind::Repulsion, true).unwrap();
        sim.simulate(&mut graph, 0.1, 800.0, 600.0);

        let heavy = graph.node(a).unwrap().position.x.abs();
        let light = graph.node(b).unwrap().position.x - 50.0;
        assert!(approx_eq!(f32, heavy * 4.0, light, epsilon = 1e-3));
    }

    #[test]
    fn test_position_controlled_node_does_not_integrate() {
        let (mut graph, a, _) = two_nodes(50.0);
        graph.try_node_mut(a).unwrap().set_position_controlled(true);
        let mut sim = Simulator::new();
        sim.simulate(&mut graph, 0.1, 800.0, 600.0);

        let node = graph.node(a).unwrap();
        assert_eq!(node.position_2d(), Vec2::ZERO);
        // forces are still available for overlays
        assert!(node.force(ForceKind::Repulsion).x < 0.0);
    }

    #[test]
    fn test_paused_computes_forces_without_motion() {
        let (mut graph, a, _) = two_nodes(50.0);
        let mut sim = Simulator::new();
        sim.set_paused(true);
        let energy = sim.simulate(&mut graph, 0.1, 800.0, 600.0);

        assert_eq!(energy, 0.0);
        let node = graph.node(a).unwrap();
        assert_eq!(node.position_2d(), Vec2::ZERO);
        assert!(node.total_force().length() > 0.0);
    }

    #[test]
    fn test_time_scale_follows_energy() {
        let (mut graph, a, _) = two_nodes(50.0);
        let mut sim = Simulator::with_config(SimulationConfig {
            energy_threshold: 10.0,
            recentre: false,
            ..Default::default()
        })
        .unwrap();
        for kind in ForceKind::ALL {
            sim.set_enabled(kind, false).unwrap();
        }

        // calm: dt scaled by 10
        graph.try_node_mut(a).unwrap().velocity = Vec3::new(10.0, 0.0, 0.0);
        sim.simulate(&mut graph, 0.1, 0.0, 0.0);
        let calm_step = graph.node(a).unwrap().position.x;
        assert!(approx_eq!(f32, calm_step, 8.5, epsilon = 1e-4));

        // previous energy 0.5 * 8.5^2 > 10: energetic, dt unscaled
        let before = graph.node(a).unwrap().position.x;
        sim.simulate(&mut graph, 0.1, 0.0, 0.0);
        let moved = graph.node(a).unwrap().position.x - before;
        assert!(approx_eq!(f32, moved, 8.5 * 0.85 * 0.1, epsilon = 1e-4));
    }

    #[test]
    fn test_recentre_skipped_while_dragging() {
        let mut graph = Graph::new();
        let a = graph.add_node(Vec2::new(100.0, 100.0), NodeShape::Point);
        graph.add_node(Vec2::new(200.0, 150.0), NodeShape::Point);
        graph.try_node_mut(a).unwrap().set_position_controlled(true);

        let mut sim = Simulator::new();
        for kind in ForceKind::ALL {
            sim.set_enabled(kind, false).unwrap();
        }
        sim.simulate(&mut graph, 0.0, 0.0, 0.0);
        assert_eq!(graph.node(a).unwrap().position_2d(), Vec2::new(100.0, 100.0));

        graph.try_node_mut(a).unwrap().set_position_controlled(false);
        sim.simulate(&mut graph, 0.0, 0.0, 0.0);
        assert_eq!(graph.node(a).unwrap().position_2d(), Vec2::ZERO);
    }

    #[test]
    fn test_recentre_uses_outlines() {
        let mut graph = Graph::new();
        let a = graph.add_node(
            Vec2::new(50.0, 40.0),
            NodeShape::Rectangle {
                width: 20.0,
                height: 10.0,
            },
        );
        let offset = recentre(&mut graph);
        assert_eq!(offset, Some(Vec2::new(-40.0, -35.0)));
        assert_eq!(graph.node(a).unwrap().position_2d(), Vec2::new(10.0, 5.0));
        assert_eq!(recentre(&mut graph), None);
    }

    #[test]
    fn test_setting_observer_is_notified() {
        let mut sim = Simulator::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sim.on_setting_change(move |kind, setting| {
            sink.borrow_mut().push((kind, setting.name.clone(), setting.value()));
        });

        let stored = sim.set_setting(ForceKind::Attraction, "constant", 0.12345).unwrap();
        assert_eq!(stored, 0.123);
        assert_eq!(
            seen.borrow().as_slice(),
            &[(ForceKind::Attraction, "constant".to_string(), 0.123)]
        );

        assert!(sim.set_setting(ForceKind::Attraction, "bogus", 1.0).is_err());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_settings_listing() {
        let sim = Simulator::new();
        let settings = sim.settings();
        assert_eq!(settings.len(), ForceKind::COUNT);
        let (kind, repulsion) = &settings[0];
        assert_eq!(*kind, ForceKind::Repulsion);
        assert_eq!(repulsion.value("constant"), 5e5);
    }

    #[test]
    fn test_replace_contributor_keeps_order() {
        let mut sim = Simulator::new();
        let mut attraction = crate::force::AttractionForce::default();
        attraction.set_enabled(false);
        sim.replace_contributor(Box::new(attraction));

        let kinds: Vec<ForceKind> = sim.contributors().map(|c| c.kind()).collect();
        assert_eq!(kinds, ForceKind::ALL.to_vec());
        assert!(!sim.contributor(ForceKind::Attraction).unwrap().is_enabled());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            damping: -0.1,
            ..Default::default()
        };
        assert!(Simulator::with_config(config).is_err());
    }

    proptest! {
        #[test]
        fn prop_recentre_is_a_translation(
            points in proptest::collection::vec((-1000.0f32..1000.0, -1000.0f32..1000.0), 2..8)
        ) {
            let mut graph = Graph::new();
            let ids: Vec<NodeId> = points
                .iter()
                .map(|&(x, y)| graph.add_node(Vec2::new(x, y), NodeShape::Point))
                .collect();
            let before: Vec<Vec2> = ids.iter().map(|&id| graph.node(id).unwrap().position_2d()).collect();

            recentre(&mut graph);

            let after: Vec<Vec2> = ids.iter().map(|&id| graph.node(id).unwrap().position_2d()).collect();
            for i in 0..ids.len() {
                for j in 0..ids.len() {
                    let delta = (after[i] - after[j]) - (before[i] - before[j]);
                    prop_assert!(delta.length() < 1e-2);
                }
            }
            let corner = after.iter().copied().reduce(Vec2::min).unwrap();
            prop_assert!(corner.length() < 1e-3);
        }

        #[test]
        fn prop_energy_is_non_negative_and_matches(
            velocities in proptest::collection::vec((-100.0f32..100.0, -100.0f32..100.0, 1.0f32..10.0), 1..6)
        ) {
            let mut graph = Graph::new();
            for (i, &(vx, vy, mass)) in velocities.iter().enumerate() {
                let id = graph.add_node(Vec2::new(i as f32 * 100.0, 0.0), NodeShape::Point);
                let node = graph.try_node_mut(id).unwrap();
                node.velocity = Vec3::new(vx, vy, 0.0);
                node.set_mass(mass);
            }
            let energy = integrate(&mut graph, 0.0, 0.85);
            let expected: f32 = graph.nodes().map(kinetic_energy_of).sum();
            prop_assert!(energy >= 0.0);
            prop_assert!((energy - expected).abs() <= 1e-3 * expected.max(1.0));
        }
    }
}
