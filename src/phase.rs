// Phases — Boundary arithmetic and the per-phase interpolation formulas
//
// The step axis is cut by the cumulative sums
//
//   B1 = warmup, B2 = B1 + idling, B3 = B2 + annealing, B4 = B3 + decay
//
// into five regions, each closed on the right:
//
//   warmup [0, B1]   idling (B1, B2]   annealing (B2, B3]   decay (B3, B4]   terminal (B4, ∞)
//
// A step that lands exactly on a boundary is the last step of the phase
// ending there.
//
// Every formula below maps a local step t ∈ [0, T] onto [start, end] and
// returns the endpoints exactly at t = 0 and t = T (they are special-cased
// rather than left to float rounding). Steps past T clamp to the end value.
// A zero-length phase has the single point t = 0 = T.

use std::f64::consts::PI;
use std::fmt;

use crate::config::{ScheduleConfig, WarmupShape};

/// The five regions of a one-cycle schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Idling,
    Annealing,
    Decay,
    /// Past the end of decay; the rate holds at the decay floor forever.
    Terminal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Warmup => "warmup",
            Phase::Idling => "idling",
            Phase::Annealing => "annealing",
            Phase::Decay => "decay",
            Phase::Terminal => "terminal",
        };
        f.pad(name)
    }
}

/// Cumulative phase boundaries B1..B4 (each inclusive on the right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub warmup_end: u64,
    pub idling_end: u64,
    pub annealing_end: u64,
    pub decay_end: u64,
}

impl PhaseBoundaries {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        // Saturating so an unvalidated config still yields ordered boundaries;
        // validate() rejects the overflowing ones.
        let warmup_end = config.warmup_iters();
        let idling_end = warmup_end.saturating_add(config.idling_iters());
        let annealing_end = idling_end.saturating_add(config.annealing_iters());
        let decay_end = annealing_end.saturating_add(config.decay_iters());
        PhaseBoundaries {
            warmup_end,
            idling_end,
            annealing_end,
            decay_end,
        }
    }

    /// Locate `step`. Ties go to the earlier phase.
    pub fn phase_at(&self, step: u64) -> Phase {
        if step <= self.warmup_end {
            Phase::Warmup
        } else if step <= self.idling_end {
            Phase::Idling
        } else if step <= self.annealing_end {
            Phase::Annealing
        } else if step <= self.decay_end {
            Phase::Decay
        } else {
            Phase::Terminal
        }
    }
}

/// Warmup from `start` to `peak` over `duration` steps.
///
/// ```text
/// linear:       lr = start + (peak - start) * t / T
/// exponential:  lr = start * (peak / start)^(t / T)
/// ```
///
/// Exponential warmup is geometric interpolation and needs `start > 0`.
/// With `duration == 0` the phase is the single step 0 and the peak is
/// returned.
pub fn warmup_lr(step: u64, duration: u64, start: f64, peak: f64, shape: WarmupShape) -> f64 {
    if duration == 0 || step >= duration {
        return peak;
    }
    if step == 0 {
        return start;
    }
    let progress = step as f64 / duration as f64;
    match shape {
        WarmupShape::Linear => start + (peak - start) * progress,
        WarmupShape::Exponential => start * (peak / start).powf(progress),
    }
}

/// Cosine annealing from `start` down to `floor` over `duration` steps.
///
/// ```text
/// lr = floor + (start - floor) * (1 + cos(π * t / T)) / 2
/// ```
///
/// With `duration == 0` the start value is returned.
pub fn annealing_lr(step: u64, duration: u64, start: f64, floor: f64) -> f64 {
    if duration == 0 || step == 0 {
        return start;
    }
    if step >= duration {
        return floor;
    }
    let progress = step as f64 / duration as f64;
    floor + (start - floor) * (1.0 + (PI * progress).cos()) / 2.0
}

/// Linear decay from `start` down to `floor` over `duration` steps.
///
/// ```text
/// lr = start - (t / T) * (start - floor)
/// ```
///
/// With `duration == 0` the start value is returned.
pub fn decay_lr(step: u64, duration: u64, start: f64, floor: f64) -> f64 {
    if duration == 0 || step == 0 {
        return start;
    }
    if step >= duration {
        return floor;
    }
    let progress = step as f64 / duration as f64;
    start - progress * (start - floor)
}

/// The learning rate of `config` at `step`. `config` must be validated.
pub(crate) fn rate_at(config: &ScheduleConfig, step: u64) -> f64 {
    let b = config.boundaries();
    match b.phase_at(step) {
        Phase::Warmup => warmup_lr(
            step,
            b.warmup_end,
            config.start_rate(),
            config.peak_rate(),
            config.shape(),
        ),
        Phase::Idling => config.peak_rate(),
        Phase::Annealing => annealing_lr(
            step - b.idling_end,
            config.annealing_iters(),
            config.peak_rate(),
            config.annealing_floor_rate(),
        ),
        Phase::Decay => decay_lr(
            step - b.annealing_end,
            config.decay_iters(),
            config.annealing_floor_rate(),
            config.decay_floor_rate(),
        ),
        Phase::Terminal => config.decay_floor_rate(),
    }
}
