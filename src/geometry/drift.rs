use serde::Deserialize;

/// Tick ↔ drift-coordinate conversion.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftModel {
    /// Tick at which charge from `x = 0` arrives.
    pub trigger_tick: f32,
    /// Drift distance covered per tick (cm).
    pub cm_per_tick: f32,
}

impl Default for DriftModel {
    fn default() -> Self {
        // 0.111436 cm/us drift velocity, 0.5 us ticks
        Self {
            trigger_tick: 3200.0,
            cm_per_tick: 0.111436 * 0.5,
        }
    }
}

impl DriftModel {
    #[inline]
    pub fn tick_to_x(&self, tick: f32) -> f32 {
        (tick - self.trigger_tick) * self.cm_per_tick
    }

    #[inline]
    pub fn x_to_tick(&self, x: f32) -> f32 {
        x / self.cm_per_tick + self.trigger_tick
    }
}
