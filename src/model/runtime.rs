//! Model struct and the stepping protocol.

use log::debug;

use super::results::ResultSnapshot;
use crate::clock::{SimulationClock, Time};
use crate::errors::{ModelError, ModelResult};
use crate::kernel::{Kernel, ReferenceKernel};
use crate::params::{ParamValue, ParameterStore};

/// A parameterised simulation advanced one discrete time unit at a time.
///
/// The model composes a [`ParameterStore`], a [`SimulationClock`], and a
/// simulation kernel. Stepping is single-threaded and synchronous: each
/// [`Model::one_time_step`] call executes the kernel to completion before
/// returning, and steps run strictly in call order. Between steps the
/// caller may read parameters and mutate the runtime-mutable ones through
/// [`Model::update_running_params`]; the next step observes the new values.
///
/// The store is sealed on the first step-advance. From that point the
/// construction-only parameter class is frozen for the life of the model.
pub struct Model {
    params: ParameterStore,
    clock: SimulationClock,
    kernel: Box<dyn Kernel>,
    latest: Option<ResultSnapshot>,
    end_time: Time,
}

impl Model {
    /// Create a model driven by the bundled [`ReferenceKernel`].
    pub fn new(params: ParameterStore) -> ModelResult<Self> {
        let kernel = ReferenceKernel::new(&params)?;
        Self::with_kernel(params, Box::new(kernel))
    }

    /// Create a model driven by the given kernel.
    ///
    /// Used to plug in a full external kernel, or a scripted fake in tests.
    pub fn with_kernel(params: ParameterStore, kernel: Box<dyn Kernel>) -> ModelResult<Self> {
        let end_time = params.get("end_time")? as Time;
        Ok(Self {
            params,
            clock: SimulationClock::new(),
            kernel,
            latest: None,
            end_time,
        })
    }

    /// Execute exactly one discrete time unit of simulation.
    ///
    /// Seals the store on the first call, runs the kernel under the store's
    /// current values, then advances the clock and records the new result
    /// snapshot. A kernel failure is fatal: it is surfaced as
    /// [`ModelError::KernelFailure`] with the index the failed step would
    /// have had, the clock does not advance, and the previous snapshot (if
    /// any) remains the latest.
    pub fn one_time_step(&mut self) -> ModelResult<()> {
        if !self.params.is_sealed() {
            debug!("first step-advance; sealing parameter store");
            self.params.seal();
        }

        let outcome =
            self.kernel
                .advance_one_step(&self.params)
                .map_err(|err| ModelError::KernelFailure {
                    step: self.clock.current() + 1,
                    details: err.details,
                })?;

        let time = self.clock.advance();
        self.latest = Some(self.kernel.snapshot_results(&outcome, time));
        Ok(())
    }

    /// Result snapshot of the most recently completed step.
    ///
    /// Fails with [`ModelError::NoStepExecuted`] before the first successful
    /// [`Model::one_time_step`] call.
    pub fn one_time_step_results(&self) -> ModelResult<ResultSnapshot> {
        self.latest.clone().ok_or(ModelError::NoStepExecuted)
    }

    /// Change a runtime-mutable parameter between steps.
    ///
    /// Legal at any point in the model's lifetime, including before the
    /// first step; the change has no observable effect until the next step
    /// executes.
    pub fn update_running_params(&mut self, name: &str, value: ParamValue) -> ModelResult<()> {
        self.params.update(name, value)
    }

    /// Current value of a parameter.
    pub fn get_param(&self, name: &str) -> ModelResult<ParamValue> {
        self.params.get(name)
    }

    /// Construction-time setter.
    ///
    /// Equivalent to supplying an override at store construction. Fails
    /// with [`ModelError::ImmutableParameter`] once stepping has begun.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> ModelResult<()> {
        self.params.set(name, value)
    }

    /// Number of completed steps.
    pub fn current_time(&self) -> Time {
        self.clock.current()
    }

    /// Whether the run has reached the configured `end_time`.
    pub fn finished(&self) -> bool {
        self.clock.current() >= self.end_time
    }

    /// Step until [`Model::finished`] is true.
    pub fn run(&mut self) -> ModelResult<()> {
        while !self.finished() {
            self.one_time_step()?;
        }
        Ok(())
    }
}
