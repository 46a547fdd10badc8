//! # shrew-onecycle
//!
//! A four-phase one-cycle learning rate scheduler.
//!
//! The rate is a pure function of the training step:
//!
//! 1. **Warmup**: start rate → peak (linear or exponential)
//! 2. **Idling**: hold at the peak
//! 3. **Annealing**: cosine from the peak down to the annealing floor
//! 4. **Decay**: linear from the annealing floor down to the decay floor
//!
//! after which the rate holds at the decay floor.
//!
//! The scheduler does not update parameters. It drives any [`RateHolder`]
//! (an optimizer, or [`ParamGroups`]) by overwriting the learning rate of
//! every parameter group once per [`LrScheduler::advance`] call.

pub mod config;
pub mod error;
pub mod optimizer;
pub mod phase;
pub mod scheduler;

pub use config::{ScheduleConfig, WarmupShape, DEFAULT_WARMUP_START_RATE};
pub use error::{Result, ScheduleError};
pub use optimizer::{ParamGroups, RateHolder};
pub use phase::{annealing_lr, decay_lr, warmup_lr, Phase, PhaseBoundaries};
pub use scheduler::{LrScheduler, OneCycleLR};
