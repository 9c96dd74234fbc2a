//! metric samples and their smoothing.

use std::collections::BTreeMap;

/// a named reading from a metric source.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub name: String,
    /// the current value, or `None` if the source could not provide one.
    pub value: Option<f64>,
    /// the largest value this metric can take, if known.
    pub max_value: Option<f64>,
    pub unit: Unit,
    /// the hardware this sample was read from, shown as a heading above its samples.
    pub device: Option<String>,
}

/// the unit a sample's value and maximum are expressed in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unit {
    /// percentage points, from 0 to 100.
    Percent,
    /// degrees celsius.
    Celsius,
    Bytes,
    Hertz,
}

/// exponentially decaying averages of metric values, keyed by metric name.
///
/// each update moves a metric's average toward the new sample by `1 - weight`, which keeps
/// noisy instantaneous readings from flickering on screen. a history is threaded through
/// ticks by value: [`MetricHistory::update()`] consumes it and returns the next one.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricHistory {
    weight: f64,
    averages: BTreeMap<String, f64>,
}

// === impl MetricSample ===

impl MetricSample {
    /// returns a sample holding `value`.
    pub fn new(name: impl Into<String>, value: f64, max_value: Option<f64>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            value: Some(value).filter(|v| v.is_finite()),
            max_value,
            unit,
            device: None,
        }
    }

    /// returns a sample whose value could not be read.
    pub fn unavailable(name: impl Into<String>, max_value: Option<f64>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            value: None,
            max_value,
            unit,
            device: None,
        }
    }

    /// attributes this sample to `device`.
    pub fn with_device(self, device: impl Into<String>) -> Self {
        Self {
            device: Some(device.into()),
            ..self
        }
    }

    /// returns the value as a fraction of the maximum, clamped to `[0, 1]`.
    ///
    /// this is `None` if either the value or a positive maximum is missing.
    pub fn ratio(&self) -> Option<f64> {
        let value = self.value?;
        let max = self.max_value.filter(|max| *max > 0.0)?;
        Some((value / max).clamp(0.0, 1.0))
    }
}

// === impl MetricHistory ===

impl MetricHistory {
    /// the default weight given to a metric's previous average.
    pub const WEIGHT: f64 = 0.9;

    pub fn new() -> Self {
        Self::with_weight(Self::WEIGHT)
    }

    /// returns an empty history that weighs previous averages by `weight`.
    ///
    /// the weight is clamped to `[0, 1]`. a weight of zero disables smoothing.
    pub fn with_weight(weight: f64) -> Self {
        let weight = if weight.is_nan() { Self::WEIGHT } else { weight.clamp(0.0, 1.0) };
        Self {
            weight,
            averages: BTreeMap::new(),
        }
    }

    /// folds `samples` into the history, returning the next history and smoothed samples.
    ///
    /// the first sample of a metric is taken as is. unavailable samples are passed through
    /// and leave that metric's average untouched.
    pub fn update(self, samples: Vec<MetricSample>) -> (Self, Vec<MetricSample>) {
        let Self {
            weight,
            mut averages,
        } = self;

        let smoothed = samples
            .into_iter()
            .map(|mut sample| {
                if let Some(value) = sample.value {
                    let average = match averages.get(&sample.name) {
                        Some(old) => old * weight + value * (1.0 - weight),
                        None => value,
                    };
                    averages.insert(sample.name.clone(), average);
                    sample.value = Some(average);
                }
                sample
            })
            .collect();

        (Self { weight, averages }, smoothed)
    }

    /// returns the current average of the named metric.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.averages.get(name).copied()
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new()
    }
}
