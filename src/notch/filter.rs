use super::prelude::{MAX_CHANNELS, PI};

/// Resonance values accepted by the coefficient design.
pub const Q_SAFE_RANGE: (f32, f32) = (0.2, 40.0);

/// Normalised biquad coefficients (a0 divided out).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Coefficients that leave the signal untouched.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Band-reject design from the RBJ Audio EQ Cookbook.
    ///
    /// Centre frequency and Q are clamped into a stable range first; if the
    /// result still is not finite the passthrough set is returned instead, so
    /// a bad input can never poison a filter's delay line.
    pub fn notch(sample_rate: f32, frequency: f32, q: f32) -> Self {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Self::PASSTHROUGH;
        }
        let frequency = if frequency.is_finite() {
            frequency.clamp(1.0, sample_rate * 0.49)
        } else {
            return Self::PASSTHROUGH;
        };
        let q = if q.is_finite() {
            q.clamp(Q_SAFE_RANGE.0, Q_SAFE_RANGE.1)
        } else {
            Q_SAFE_RANGE.0
        };

        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let a0 = 1.0 + alpha;
        let coefficients = Self {
            b0: 1.0 / a0,
            b1: -2.0 * cos_omega / a0,
            b2: 1.0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        };

        if coefficients.is_finite() {
            coefficients
        } else {
            Self::PASSTHROUGH
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }

    pub fn is_passthrough(&self) -> bool {
        *self == Self::PASSTHROUGH
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Direct Form I history for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadState {
    pub fn is_quiescent(&self) -> bool {
        *self == Self::default()
    }
}

/// A second-order section with independent history per channel.
#[derive(Clone, Debug, Default)]
pub struct Biquad {
    coefficients: BiquadCoefficients,
    states: [BiquadState; MAX_CHANNELS],
}

impl Biquad {
    pub fn new(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            states: [BiquadState::default(); MAX_CHANNELS],
        }
    }

    pub fn passthrough() -> Self {
        Self::new(BiquadCoefficients::PASSTHROUGH)
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    /// Swap coefficients while keeping the delay line intact.
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    pub fn states(&self) -> &[BiquadState; MAX_CHANNELS] {
        &self.states
    }

    pub fn copy_state_from(&mut self, other: &Biquad) {
        self.states = other.states;
    }

    pub fn reset(&mut self) {
        self.states = [BiquadState::default(); MAX_CHANNELS];
    }

    /// Run one sample of `channel` through the filter.
    /// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    #[inline]
    pub fn process(&mut self, channel: usize, input: f32) -> f32 {
        let c = &self.coefficients;
        let s = &mut self.states[channel];
        let output = c.b0 * input + c.b1 * s.x1 + c.b2 * s.x2 - c.a1 * s.y1 - c.a2 * s.y2;

        s.x2 = s.x1;
        s.x1 = input;
        s.y2 = s.y1;
        s.y1 = output;

        output
    }
}
