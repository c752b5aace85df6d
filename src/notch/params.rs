use super::error::ParamError;
use super::harmonics::{Note, NOTE_COUNT};
use super::qmap::QCurve;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Which filter layout the controller publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChainMode {
    /// One notch per in-bounds harmonic of every engaged note.
    #[default]
    Dynamic,
    /// Seven fixed slots following the `key` parameter.
    SingleKey,
}

/// Host-facing parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Q,
    Mix,
    Makeup,
    Key,
    QFunction,
}

impl ParamId {
    pub const ALL: [ParamId; 5] = [
        ParamId::Q,
        ParamId::Mix,
        ParamId::Makeup,
        ParamId::Key,
        ParamId::QFunction,
    ];

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn spec(self) -> &'static ParamSpec {
        match self {
            ParamId::Q => &PARAM_SPECS[0],
            ParamId::Mix => &PARAM_SPECS[1],
            ParamId::Makeup => &PARAM_SPECS[2],
            ParamId::Key => &PARAM_SPECS[3],
            ParamId::QFunction => &PARAM_SPECS[4],
        }
    }

    /// Only the output stage reads these; everything else reshapes the filters.
    pub fn needs_rebuild(self) -> bool {
        !matches!(self, ParamId::Mix | ParamId::Makeup)
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|param| param.id() == s)
            .ok_or_else(|| ParamError::UnknownParameter(s.to_string()))
    }
}

/// Range, step and default for one parameter.
#[derive(Debug)]
pub struct ParamSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

impl ParamSpec {
    /// Clamp into range and snap to the nearest step.
    pub fn constrain(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if self.step > 0.0 {
            let steps = ((clamped - self.min) / self.step).round();
            (self.min + steps * self.step).clamp(self.min, self.max)
        } else {
            clamped
        }
    }
}

pub const PARAM_SPECS: [ParamSpec; 5] = [
    ParamSpec {
        id: "q",
        name: "Q",
        min: 10.0,
        max: 300.0,
        step: 2.0,
        default: 120.0,
    },
    ParamSpec {
        id: "mix",
        name: "Mix",
        min: 0.0,
        max: 100.0,
        step: 0.1,
        default: 100.0,
    },
    ParamSpec {
        id: "makeup",
        name: "Makeup",
        min: -60.0,
        max: 6.0,
        step: 0.1,
        default: 0.0,
    },
    ParamSpec {
        id: "key",
        name: "Key",
        min: 0.0,
        max: (NOTE_COUNT - 1) as f32,
        step: 1.0,
        default: 0.0,
    },
    ParamSpec {
        id: "qFunction",
        name: "Q Function",
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 0.0,
    },
];

pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// The full set of control values, in host units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSnapshot {
    #[serde(rename = "q")]
    pub q_ratio: f32,
    /// Wet proportion in percent.
    pub mix: f32,
    #[serde(rename = "makeup")]
    pub makeup_db: f32,
    pub key: Note,
    #[serde(rename = "qFunction")]
    pub q_function: QCurve,
    pub mode: ChainMode,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            q_ratio: ParamId::Q.spec().default,
            mix: ParamId::Mix.spec().default,
            makeup_db: ParamId::Makeup.spec().default,
            key: Note::from_midi(0),
            q_function: QCurve::Sine,
            mode: ChainMode::Dynamic,
        }
    }
}

impl ParameterSnapshot {
    pub fn get(&self, param: ParamId) -> f32 {
        match param {
            ParamId::Q => self.q_ratio,
            ParamId::Mix => self.mix,
            ParamId::Makeup => self.makeup_db,
            ParamId::Key => self.key.index() as f32,
            ParamId::QFunction => self.q_function.index() as f32,
        }
    }

    /// Store a value after constraining it. Returns whether anything changed.
    pub fn set(&mut self, param: ParamId, value: f32) -> Result<bool, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotANumber { id: param.id() });
        }
        let value = param.spec().constrain(value);
        let before = *self;
        match param {
            ParamId::Q => self.q_ratio = value,
            ParamId::Mix => self.mix = value,
            ParamId::Makeup => self.makeup_db = value,
            ParamId::Key => self.key = Note::from_midi(value as u8),
            ParamId::QFunction => self.q_function = QCurve::from_index(value as usize),
        }
        Ok(before != *self)
    }

    /// Clamp every field into its documented range, replacing non-finite values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for (param, fallback) in [
            (ParamId::Q, defaults.q_ratio),
            (ParamId::Mix, defaults.mix),
            (ParamId::Makeup, defaults.makeup_db),
        ] {
            let current = self.get(param);
            let value = if current.is_finite() { current } else { fallback };
            // Finite by construction, so `set` cannot fail here.
            let _ = self.set(param, value);
        }
        self
    }

    pub fn wet(&self) -> f32 {
        (self.mix / 100.0).clamp(0.0, 1.0)
    }

    pub fn makeup_gain(&self) -> f32 {
        db_to_gain(self.makeup_db)
    }
}

/// Output-stage values the audio context reads without locking.
#[derive(Debug)]
pub struct OutputStage {
    wet: AtomicU32,
    gain: AtomicU32,
}

/// One consistent-enough read of the output stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputLevels {
    pub wet: f32,
    pub dry: f32,
    pub gain: f32,
}

impl OutputStage {
    pub fn new(params: &ParameterSnapshot) -> Self {
        Self {
            wet: AtomicU32::new(params.wet().to_bits()),
            gain: AtomicU32::new(params.makeup_gain().to_bits()),
        }
    }

    pub fn store(&self, params: &ParameterSnapshot) {
        self.wet.store(params.wet().to_bits(), Ordering::Relaxed);
        self.gain
            .store(params.makeup_gain().to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self) -> OutputLevels {
        let wet = f32::from_bits(self.wet.load(Ordering::Relaxed));
        OutputLevels {
            wet,
            dry: 1.0 - wet,
            gain: f32::from_bits(self.gain.load(Ordering::Relaxed)),
        }
    }
}
