use super::prelude::PI;
use serde::{Deserialize, Serialize};

/// Scale applied to the sine curve before dividing by the Q ratio.
const SINE_SCALE: f32 = 600.0;
/// Depth of the inverse-sine dip.
const INV_SINE_DIP_DEPTH: f32 = 6000.0;
/// Span the inverse-sine curve normalises against.
const INV_SINE_SPAN_HZ: (f32, f32) = (60.0, 18_000.0);
/// Smallest Q ratio the mapping will divide by.
pub const MIN_Q_RATIO: f32 = 1e-3;

/// Selects how a harmonic's frequency maps to filter resonance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QCurve {
    /// Narrow notches mid-band, wider towards the spectral extremes.
    #[default]
    Sine,
    /// Complementary curve with its dip centred in the audible span.
    InverseSine,
}

impl QCurve {
    pub const ALL: [QCurve; 2] = [QCurve::Sine, QCurve::InverseSine];

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => QCurve::InverseSine,
            _ => QCurve::Sine,
        }
    }

    pub fn index(self) -> usize {
        match self {
            QCurve::Sine => 0,
            QCurve::InverseSine => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QCurve::Sine => "Sine",
            QCurve::InverseSine => "Inv Sine",
        }
    }

    /// Inclusive (min, max) of the values this curve can return.
    pub fn range(self) -> (f32, f32) {
        match self {
            QCurve::Sine => (1.0, 40.0),
            QCurve::InverseSine => (0.5, 30.0),
        }
    }

    /// Map a harmonic frequency to a resonance value, always finite and within `range()`.
    pub fn map(self, frequency: f32, q_ratio: f32, sample_rate: f32) -> f32 {
        let (min, max) = self.range();
        if !frequency.is_finite() {
            return min;
        }
        let q_ratio = if q_ratio.is_finite() {
            q_ratio.max(MIN_Q_RATIO)
        } else {
            MIN_Q_RATIO
        };

        let raw = match self {
            QCurve::Sine => {
                let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
                    sample_rate
                } else {
                    44_100.0
                };
                SINE_SCALE * (PI * frequency / sample_rate).sin() / q_ratio
            }
            QCurve::InverseSine => {
                let (low, high) = INV_SINE_SPAN_HZ;
                let normalized = ((frequency - low) / (high - low)).clamp(0.0, 1.0);
                let dip = 1.0 - (PI * normalized).sin();
                (frequency / 2.0 - dip * INV_SINE_DIP_DEPTH) / q_ratio
            }
        };

        if raw.is_finite() {
            raw.clamp(min, max)
        } else {
            min
        }
    }
}
