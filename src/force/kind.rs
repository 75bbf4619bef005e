//! Force categories and the per-node force accumulator.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// The category a force vector is accumulated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ForceKind {
    Repulsion = 0,
    Attraction = 1,
    DiscreteAngles = 2,
    NeighbourConnectorRepulsion = 3,
    Node2LinkRepulsion = 4,
    Link2LinkRepulsion = 5,
    LaneCapture = 6,
}

impl ForceKind {
    /// Number of kinds; the size of [`ForceVectors`].
    pub const COUNT: usize = 7;

    /// Every kind, in index order.
    pub const ALL: [ForceKind; Self::COUNT] = [
        ForceKind::Repulsion,
        ForceKind::Attraction,
        ForceKind::DiscreteAngles,
        ForceKind::NeighbourConnectorRepulsion,
        ForceKind::Node2LinkRepulsion,
        ForceKind::Link2LinkRepulsion,
        ForceKind::LaneCapture,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ForceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl TryFrom<u8> for ForceKind {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(LayoutError::UnknownForceKind(value))
    }
}

/// Fixed-size per-kind force accumulator for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceVectors([Vec3; ForceKind::COUNT]);

impl ForceVectors {
    /// Force accumulated under `kind` this tick.
    #[inline]
    pub fn get(&self, kind: ForceKind) -> Vec3 {
        self.0[kind.index()]
    }

    /// Add into the accumulator for `kind`.
    #[inline]
    pub fn add(&mut self, kind: ForceKind, force: Vec3) {
        self.0[kind.index()] += force;
    }

    /// Sum over all kinds.
    pub fn total(&self) -> Vec3 {
        self.0.iter().fold(Vec3::ZERO, |sum, &force| sum + force)
    }

    pub fn reset(&mut self) {
        self.0 = [Vec3::ZERO; ForceKind::COUNT];
    }

    pub fn iter(&self) -> impl Iterator<Item = (ForceKind, Vec3)> + '_ {
        ForceKind::ALL.iter().map(|&kind| (kind, self.get(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_index() {
        for kind in ForceKind::ALL {
            assert_eq!(ForceKind::try_from(kind as u8), Ok(kind));
        }
        assert_eq!(
            ForceKind::try_from(7),
            Err(LayoutError::UnknownForceKind(7))
        );
    }

    #[test]
    fn test_accumulate_and_total() {
        let mut forces = ForceVectors::default();
        forces.add(ForceKind::Repulsion, Vec3::new(1.0, 0.0, 0.0));
        forces.add(ForceKind::Repulsion, Vec3::new(1.0, 2.0, 0.0));
        forces.add(ForceKind::LaneCapture, Vec3::new(-0.5, 0.0, 1.0));

        assert_eq!(forces.get(ForceKind::Repulsion), Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(forces.total(), Vec3::new(1.5, 2.0, 1.0));

        forces.reset();
        assert_eq!(forces.total(), Vec3::ZERO);
    }
}
