// Learning Rate Scheduler — Four-phase one-cycle schedule
//
// OneCycleLR walks a training run through four phases and then holds:
//
//   warmup     start → peak        (linear or exponential)
//   idling     peak                (plateau)
//   annealing  peak → ann_floor    (cosine)
//   decay      ann_floor → floor   (linear)
//   terminal   floor               (forever)
//
// The scheduler owns its step counter and the rate holder (usually an
// optimizer, or `&mut` to one). Every advance() moves the counter by one,
// computes the rate for the new step and writes it into every parameter
// group of the holder.
//
// Before the first advance() the scheduler has not taken control yet:
// current_rate() passes through whatever the holder already had.
//
// USAGE:
//   let config = ScheduleConfig::new(6, 8, 56, 100, 0.01, 0.001, 0.0001)
//       .warmup_start_rate(0.0001);
//   let mut sched = OneCycleLR::new(&mut optimizer, config)?;
//   for batch in batches {
//       sched.advance();
//       // ... training step ...
//   }

use log::{debug, trace};

use crate::config::ScheduleConfig;
use crate::error::{Result, ScheduleError};
use crate::optimizer::RateHolder;
use crate::phase::{Phase, PhaseBoundaries};

// Scheduler Trait

/// Trait for step-driven learning rate schedulers.
///
/// Each call to `advance()` moves the internal counter forward by one and
/// returns the new learning rate.
pub trait LrScheduler {
    /// Advance by one step, apply and return the new learning rate.
    fn advance(&mut self) -> f64;

    /// Get the current learning rate without advancing.
    fn current_rate(&self) -> f64;

    /// Get the current step, or `None` if the scheduler has not started.
    fn current_step(&self) -> Option<u64>;

    /// Return to the not-started state. The next `advance()` yields step 0.
    fn reset(&mut self);

    /// Jump to a specific step and apply its rate (for checkpoint restore).
    fn set_step(&mut self, step: u64);
}

// OneCycleLR

/// Warmup → idling → cosine annealing → linear decay → hold.
///
/// # Example
/// ```
/// use shrew_onecycle::{LrScheduler, OneCycleLR, ParamGroups, ScheduleConfig, WarmupShape};
///
/// let config = ScheduleConfig::new(10, 0, 10, 10, 0.01, 0.001, 0.0001)
///     .warmup_shape(WarmupShape::Linear);
/// let mut sched = OneCycleLR::new(ParamGroups::single(0.5), config).unwrap();
///
/// // Not started: the holder's own rate passes through.
/// assert_eq!(sched.current_rate(), 0.5);
///
/// assert_eq!(sched.advance(), 0.001); // step 0
/// assert_eq!(sched.holder().lr(0), Some(0.001));
/// ```
pub struct OneCycleLR<H: RateHolder> {
    config: ScheduleConfig,
    boundaries: PhaseBoundaries,
    holder: H,
    /// `None` until the first advance.
    step: Option<u64>,
    /// Last applied rate; the holder's first group rate before that.
    last_lr: f64,
}

impl<H: RateHolder> OneCycleLR<H> {
    /// Create a scheduler in the not-started state.
    ///
    /// Nothing is written into `holder` until the first `advance()`.
    ///
    /// Fails with `InvalidConfiguration` if `config` violates an invariant
    /// or `holder` has no parameter groups.
    pub fn new(holder: H, config: ScheduleConfig) -> Result<Self> {
        config.validate()?;

        let last_lr = holder.learning_rates().first().copied().ok_or_else(|| {
            ScheduleError::invalid("rate_holder", "must expose at least one parameter group")
        })?;

        let boundaries = config.boundaries();
        debug!(
            "one-cycle schedule: warmup ..={} ({}), idling ..={}, annealing ..={}, decay ..={}",
            boundaries.warmup_end,
            config.shape(),
            boundaries.idling_end,
            boundaries.annealing_end,
            boundaries.decay_end,
        );

        Ok(OneCycleLR {
            config,
            boundaries,
            holder,
            step: None,
            last_lr,
        })
    }

    /// Create a scheduler resuming at `step`.
    ///
    /// The rate for `step` is written into the holder immediately and the
    /// next `advance()` yields `step + 1`.
    pub fn with_start_step(holder: H, config: ScheduleConfig, step: u64) -> Result<Self> {
        let mut sched = Self::new(holder, config)?;
        sched.set_step(step);
        Ok(sched)
    }

    /// The rate of every parameter group.
    ///
    /// Before the first advance these are the holder's own values, which
    /// may differ per group; afterwards all groups share one rate.
    pub fn current_rates(&self) -> Vec<f64> {
        match self.step {
            None => self.holder.learning_rates(),
            Some(_) => vec![self.last_lr; self.holder.num_groups()],
        }
    }

    /// The learning rate at `step`, without moving the counter or touching
    /// the holder.
    pub fn rate_at(&self, step: u64) -> f64 {
        self.config.rate_at(step)
    }

    /// Rates for steps `0..len`, e.g. for plotting a whole schedule.
    pub fn schedule(&self, len: u64) -> Vec<f64> {
        (0..len).map(|step| self.rate_at(step)).collect()
    }

    /// Phase of the current step, or `None` if not started.
    pub fn phase(&self) -> Option<Phase> {
        self.step.map(|s| self.boundaries.phase_at(s))
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn boundaries(&self) -> PhaseBoundaries {
        self.boundaries
    }

    pub fn holder(&self) -> &H {
        &self.holder
    }

    pub fn holder_mut(&mut self) -> &mut H {
        &mut self.holder
    }

    /// Give the rate holder back.
    pub fn into_holder(self) -> H {
        self.holder
    }

    fn apply(&mut self, step: u64) -> f64 {
        let lr = self.config.rate_at(step);
        let phase = self.boundaries.phase_at(step);
        if self.phase() != Some(phase) {
            debug!("step {step}: entering {phase} phase (lr={lr:.6e})");
        }
        trace!("step {step}: lr={lr:.6e}");

        self.holder.set_learning_rate(lr);
        self.step = Some(step);
        self.last_lr = lr;
        lr
    }
}

impl<H: RateHolder> LrScheduler for OneCycleLR<H> {
    fn advance(&mut self) -> f64 {
        let next = match self.step {
            None => 0,
            Some(s) => s.saturating_add(1),
        };
        self.apply(next)
    }

    fn current_rate(&self) -> f64 {
        match self.step {
            None => self
                .holder
                .learning_rates()
                .first()
                .copied()
                .unwrap_or(self.last_lr),
            Some(_) => self.last_lr,
        }
    }

    fn current_step(&self) -> Option<u64> {
        self.step
    }

    fn reset(&mut self) {
        self.step = None;
    }

    fn set_step(&mut self, step: u64) {
        self.apply(step);
    }
}
