// Rate holders — The seam between a scheduler and whatever owns the rates
//
// A scheduler never updates parameters itself. It only needs something that
// exposes one learning rate per parameter group and lets it overwrite all of
// them with a single scalar. Optimizers implement RateHolder; the scheduler
// takes one by value (or a `&mut` to one) at construction.
//
//   let mut opt = MyOptimizer::new(...);
//   let mut sched = OneCycleLR::new(&mut opt, config)?;
//   for batch in batches {
//       sched.advance();
//       // ... training step with sched.holder_mut() ...
//   }

/// Anything whose per-group learning rates a scheduler can drive.
pub trait RateHolder {
    /// Current learning rate of every parameter group, in group order.
    fn learning_rates(&self) -> Vec<f64>;

    /// Overwrite the learning rate of every parameter group with `lr`.
    fn set_learning_rate(&mut self, lr: f64);

    /// Number of parameter groups.
    fn num_groups(&self) -> usize {
        self.learning_rates().len()
    }
}

impl<H: RateHolder + ?Sized> RateHolder for &mut H {
    fn learning_rates(&self) -> Vec<f64> {
        (**self).learning_rates()
    }

    fn set_learning_rate(&mut self, lr: f64) {
        (**self).set_learning_rate(lr)
    }

    fn num_groups(&self) -> usize {
        (**self).num_groups()
    }
}

// ParamGroups — A bare list of per-group rates

/// The simplest rate holder: one learning rate per parameter group and
/// nothing else.
///
/// Useful for driving a schedule without a real optimizer, e.g. to print
/// or plot it, and in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGroups {
    lrs: Vec<f64>,
}

impl ParamGroups {
    /// Create holders for the given initial rates (one per group).
    pub fn new(lrs: Vec<f64>) -> Self {
        ParamGroups { lrs }
    }

    /// A single parameter group with rate `lr`.
    pub fn single(lr: f64) -> Self {
        ParamGroups { lrs: vec![lr] }
    }

    /// Rate of group `index`, if it exists.
    pub fn lr(&self, index: usize) -> Option<f64> {
        self.lrs.get(index).copied()
    }
}

impl RateHolder for ParamGroups {
    fn learning_rates(&self) -> Vec<f64> {
        self.lrs.clone()
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.lrs.iter_mut().for_each(|slot| *slot = lr);
    }

    fn num_groups(&self) -> usize {
        self.lrs.len()
    }
}
