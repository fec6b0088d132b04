//! Generation loop shared by every strategy
//!
//! The driver owns nothing but the loop: each generation it asks the active
//! [`Stepper`] to fill `next` from `current`, swaps the buffers, and stops as
//! soon as a generation reports no change.

use tracing::{debug, info};

use crate::io::error::{Result, WithContext};
use crate::spatial::grid::{DoubleBuffer, Grid};

/// One way of computing a full generation
pub trait Stepper {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Forget any state carried over from a previous run
    fn reset(&mut self) {}

    /// Evaluate every interior cell of `current` into `next`
    ///
    /// Returns true when at least one cell changed. Border cells of `next`
    /// must not be written.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers do not match the strategy's
    /// configuration or a backend fails mid-generation
    fn run_generation(&mut self, current: &Grid, next: &mut Grid) -> Result<bool>;
}

impl<S: Stepper + ?Sized> Stepper for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn run_generation(&mut self, current: &Grid, next: &mut Grid) -> Result<bool> {
        (**self).run_generation(current, next)
    }
}

/// Where the driver currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Not started, or generations still being computed
    #[default]
    Running,
    /// A generation produced no change; holds its index
    Stabilized(u32),
    /// The generation bound was reached without stabilizing
    Exhausted,
}

impl DriverState {
    /// Generation at which the grid stabilized, or 0
    pub const fn generation(&self) -> u32 {
        match self {
            Self::Stabilized(generation) => *generation,
            Self::Running | Self::Exhausted => 0,
        }
    }
}

/// Runs a [`Stepper`] until the grid stabilizes or the bound is reached
#[derive(Debug)]
pub struct Driver<S> {
    stepper: S,
    state: DriverState,
}

impl<S: Stepper> Driver<S> {
    /// Wrap a stepper
    pub const fn new(stepper: S) -> Self {
        Self {
            stepper,
            state: DriverState::Running,
        }
    }

    /// State reached by the last run
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Borrow the wrapped stepper
    pub const fn stepper(&self) -> &S {
        &self.stepper
    }

    /// Unwrap the stepper
    pub fn into_inner(self) -> S {
        self.stepper
    }

    /// Run up to `nb_iter` generations
    ///
    /// Returns the generation at which no cell changed, or 0 if the grid was
    /// still changing after `nb_iter` generations.
    ///
    /// # Errors
    ///
    /// Propagates the first stepper failure, tagged with its generation
    pub fn run(&mut self, buffers: &mut DoubleBuffer, nb_iter: u32) -> Result<u32> {
        self.run_with(buffers, nb_iter, |_, _| {})
    }

    /// Run like [`Driver::run`], calling `observer(generation, changed)` after every swap
    ///
    /// # Errors
    ///
    /// Propagates the first stepper failure, tagged with its generation
    pub fn run_with<F>(&mut self, buffers: &mut DoubleBuffer, nb_iter: u32, mut observer: F) -> Result<u32>
    where
        F: FnMut(u32, bool),
    {
        self.state = DriverState::Running;
        self.stepper.reset();

        for generation in 1..=nb_iter {
            let (current, next) = buffers.split();
            let changed = self
                .stepper
                .run_generation(current, next)
                .with_generation(generation)?;

            buffers.swap();
            debug!(strategy = self.stepper.name(), generation, changed, "generation complete");
            observer(generation, changed);

            if !changed {
                info!(strategy = self.stepper.name(), generation, "grid stabilized");
                self.state = DriverState::Stabilized(generation);
                return Ok(generation);
            }
        }

        info!(strategy = self.stepper.name(), nb_iter, "generation bound reached");
        self.state = DriverState::Exhausted;
        Ok(0)
    }
}
