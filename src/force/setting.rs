//! Tunable scalar settings owned by force contributors.
//!
//! Settings are plain data. Whoever owns a contributor calls [`ForceSettings::set`]
//! and then notifies its own observers; there is no implicit change tracking.

use serde::{Deserialize, Serialize};

/// A named tunable scalar with bounds and display precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceSetting {
    pub name: String,
    pub min: f32,
    pub max: f32,
    /// Number of decimal places values are rounded to.
    pub precision: u32,
    value: f32,
}

impl ForceSetting {
    pub fn new(name: impl Into<String>, min: f32, max: f32, precision: u32, value: f32) -> Self {
        let mut setting = Self {
            name: name.into(),
            min: min.min(max),
            max: max.max(min),
            precision,
            value: 0.0,
        };
        setting.set(value);
        setting
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Store `value` clamped to `[min, max]` and rounded to `precision`.
    ///
    /// Non-finite input is ignored. Returns the value actually stored.
    pub fn set(&mut self, value: f32) -> f32 {
        if value.is_finite() {
            let scale = 10f32.powi(self.precision.min(9) as i32);
            let rounded = (value * scale).round() / scale;
            self.value = rounded.clamp(self.min, self.max);
        }
        self.value
    }
}

/// The settings table of one contributor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceSettings {
    entries: Vec<ForceSetting>,
}

impl ForceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a setting.
    pub fn with(mut self, setting: ForceSetting) -> Self {
        self.entries.push(setting);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ForceSetting> {
        self.entries.iter().find(|setting| setting.name == name)
    }

    /// Current value of `name`, or 0 if there is no such setting.
    pub fn value(&self, name: &str) -> f32 {
        self.get(name).map(ForceSetting::value).unwrap_or(0.0)
    }

    /// Set `name`; `None` if there is no such setting.
    pub fn set(&mut self, name: &str, value: f32) -> Option<f32> {
        self.entries
            .iter_mut()
            .find(|setting| setting.name == name)
            .map(|setting| setting.set(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForceSetting> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_and_round() {
        let mut setting = ForceSetting::new("constant", 0.0, 10.0, 2, 1.0);
        assert_eq!(setting.set(3.14159), 3.14);
        assert_eq!(setting.set(42.0), 10.0);
        assert_eq!(setting.set(-1.0), 0.0);
        assert_eq!(setting.set(f32::NAN), 0.0);
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let setting = ForceSetting::new("horizon", 0.0, 100.0, 0, 500.0);
        assert_eq!(setting.value(), 100.0);
    }

    #[test]
    fn test_table_lookup() {
        let mut settings = ForceSettings::new()
            .with(ForceSetting::new("a", 0.0, 1.0, 1, 0.5))
            .with(ForceSetting::new("b", 0.0, 1000.0, 0, 10.0));

        assert_eq!(settings.len(), 2);
        assert_eq!(settings.value("b"), 10.0);
        assert_eq!(settings.set("a", 0.26), Some(0.3));
        assert_eq!(settings.set("missing", 1.0), None);
        assert_eq!(settings.value("missing"), 0.0);
    }
}
