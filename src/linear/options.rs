use serde::Deserialize;

/// Parameters of the straight-line charge tracer.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinearTracerOptions {
    /// Distance between consecutive samples along the line (cm).
    pub step_size: f32,
    /// Pixel value a plane needs near a sample to count as charged.
    pub min_adc_value: f32,
    /// Half-size (pixels) of the window searched around each sample.
    pub neighborhood: usize,
}

impl Default for LinearTracerOptions {
    fn default() -> Self {
        Self {
            step_size: 1.5,
            min_adc_value: 10.0,
            neighborhood: 5,
        }
    }
}
