// ScheduleConfig — The immutable parameters of a one-cycle schedule
//
// Four durations (warmup, idling, annealing, decay) and four rates (warmup
// start, peak, annealing floor, decay floor) plus the warmup shape. The
// config is checked when a scheduler is built from it, and when it is
// deserialized. Rates are only queried through a OneCycleLR, so every rate
// query runs on a checked config and is total.
//
// Configs can be loaded with serde. The field aliases also accept the older
// parameter names (`lr_idling_iters`, `max_lr`, `annealing_lr_min`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::phase::{self, Phase, PhaseBoundaries};

/// Default starting rate of the warmup phase.
pub const DEFAULT_WARMUP_START_RATE: f64 = 0.001;

// WarmupShape

/// How the warmup phase interpolates from the start rate to the peak rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmupShape {
    /// `start + (peak - start) * t / T`
    Linear,
    /// `start * (peak / start)^(t / T)`. Requires `start > 0`.
    #[default]
    #[serde(alias = "exp")]
    Exponential,
}

impl FromStr for WarmupShape {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(WarmupShape::Linear),
            "exp" | "exponential" => Ok(WarmupShape::Exponential),
            other => Err(ScheduleError::UnknownWarmupShape(other.to_string())),
        }
    }
}

impl fmt::Display for WarmupShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupShape::Linear => f.write_str("linear"),
            WarmupShape::Exponential => f.write_str("exponential"),
        }
    }
}

// ScheduleConfig

/// Parameters of a four-phase schedule.
///
/// ```text
/// step:   0 ........ B1 ........ B2 ............ B3 ............ B4 ......
/// phase:  warmup     idling      annealing       decay           terminal
/// rate:   start→peak peak        peak→ann_floor  ann_floor→dec_floor  dec_floor
/// ```
///
/// # Example
/// ```
/// use shrew_onecycle::{ScheduleConfig, WarmupShape};
///
/// let config = ScheduleConfig::new(6, 8, 56, 100, 0.01, 0.001, 0.0001)
///     .warmup_start_rate(0.0001)
///     .warmup_shape(WarmupShape::Exponential);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.total_iters(), 170);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScheduleConfig")]
pub struct ScheduleConfig {
    warmup_iters: u64,
    idling_iters: u64,
    annealing_iters: u64,
    decay_iters: u64,
    peak_rate: f64,
    annealing_floor_rate: f64,
    decay_floor_rate: f64,
    warmup_start_rate: f64,
    warmup_shape: WarmupShape,
}

// Deserialized form, validated before it becomes a ScheduleConfig.
#[derive(Deserialize)]
struct RawScheduleConfig {
    warmup_iters: u64,
    #[serde(alias = "lr_idling_iters")]
    idling_iters: u64,
    annealing_iters: u64,
    decay_iters: u64,
    #[serde(alias = "max_lr")]
    peak_rate: f64,
    #[serde(alias = "annealing_lr_min")]
    annealing_floor_rate: f64,
    #[serde(alias = "decay_lr_min")]
    decay_floor_rate: f64,
    #[serde(default = "default_warmup_start_rate", alias = "warmup_start_lr")]
    warmup_start_rate: f64,
    #[serde(default, alias = "warmup_type")]
    warmup_shape: WarmupShape,
}

fn default_warmup_start_rate() -> f64 {
    DEFAULT_WARMUP_START_RATE
}

impl TryFrom<RawScheduleConfig> for ScheduleConfig {
    type Error = ScheduleError;

    fn try_from(raw: RawScheduleConfig) -> Result<Self> {
        let config = ScheduleConfig {
            warmup_iters: raw.warmup_iters,
            idling_iters: raw.idling_iters,
            annealing_iters: raw.annealing_iters,
            decay_iters: raw.decay_iters,
            peak_rate: raw.peak_rate,
            annealing_floor_rate: raw.annealing_floor_rate,
            decay_floor_rate: raw.decay_floor_rate,
            warmup_start_rate: raw.warmup_start_rate,
            warmup_shape: raw.warmup_shape,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ScheduleConfig {
    /// Create a config with the default warmup start rate (0.001) and
    /// exponential warmup.
    ///
    /// # Arguments
    /// - `warmup_iters`: steps spent ramping from the start rate to the peak
    /// - `idling_iters`: steps held at the peak
    /// - `annealing_iters`: steps of cosine annealing down to `annealing_floor_rate`
    /// - `decay_iters`: steps of linear decay down to `decay_floor_rate`
    pub fn new(
        warmup_iters: u64,
        idling_iters: u64,
        annealing_iters: u64,
        decay_iters: u64,
        peak_rate: f64,
        annealing_floor_rate: f64,
        decay_floor_rate: f64,
    ) -> Self {
        ScheduleConfig {
            warmup_iters,
            idling_iters,
            annealing_iters,
            decay_iters,
            peak_rate,
            annealing_floor_rate,
            decay_floor_rate,
            warmup_start_rate: DEFAULT_WARMUP_START_RATE,
            warmup_shape: WarmupShape::default(),
        }
    }

    /// Set the rate at step 0 (default: 0.001).
    pub fn warmup_start_rate(mut self, rate: f64) -> Self {
        self.warmup_start_rate = rate;
        self
    }

    /// Set the warmup interpolation shape (default: exponential).
    pub fn warmup_shape(mut self, shape: WarmupShape) -> Self {
        self.warmup_shape = shape;
        self
    }

    /// Check every construction-time invariant.
    pub fn validate(&self) -> Result<()> {
        require_positive("peak_rate", self.peak_rate)?;
        require_positive("annealing_floor_rate", self.annealing_floor_rate)?;
        require_positive("decay_floor_rate", self.decay_floor_rate)?;
        require_positive("warmup_start_rate", self.warmup_start_rate)?;

        [self.idling_iters, self.annealing_iters, self.decay_iters]
            .iter()
            .try_fold(self.warmup_iters, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| {
                ScheduleError::invalid("decay_iters", "total schedule length overflows u64")
            })?;

        Ok(())
    }

    pub fn warmup_iters(&self) -> u64 {
        self.warmup_iters
    }
    pub fn idling_iters(&self) -> u64 {
        self.idling_iters
    }
    pub fn annealing_iters(&self) -> u64 {
        self.annealing_iters
    }
    pub fn decay_iters(&self) -> u64 {
        self.decay_iters
    }
    pub fn peak_rate(&self) -> f64 {
        self.peak_rate
    }
    pub fn annealing_floor_rate(&self) -> f64 {
        self.annealing_floor_rate
    }
    pub fn decay_floor_rate(&self) -> f64 {
        self.decay_floor_rate
    }
    pub fn start_rate(&self) -> f64 {
        self.warmup_start_rate
    }
    pub fn shape(&self) -> WarmupShape {
        self.warmup_shape
    }

    /// Cumulative phase boundaries B1..B4.
    pub fn boundaries(&self) -> PhaseBoundaries {
        PhaseBoundaries::from_config(self)
    }

    /// The step at which the decay phase ends (B4). Every later step holds
    /// `decay_floor_rate`.
    pub fn total_iters(&self) -> u64 {
        self.boundaries().decay_end
    }

    /// The phase that owns `step`.
    pub fn phase_at(&self, step: u64) -> Phase {
        self.boundaries().phase_at(step)
    }

    /// The learning rate at `step`. Only meaningful on a validated config.
    pub(crate) fn rate_at(&self, step: u64) -> f64 {
        phase::rate_at(self, step)
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScheduleError::invalid(
            field,
            format!("must be finite and > 0, got {value}"),
        ))
    }
}
