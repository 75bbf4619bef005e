//! The simulation loop: reset, accumulate, integrate, recentre.

mod config;
mod simulator;

pub use config::SimulationConfig;
pub use simulator::{SettingObserver, Simulator, integrate, kinetic_energy_of, recentre};
