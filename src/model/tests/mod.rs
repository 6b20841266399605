//! Shared test kernels for model tests.

mod stepping;

use std::cell::RefCell;
use std::rc::Rc;

use crate::clock::Time;
use crate::errors::FatalKernelError;
use crate::kernel::{Kernel, StepOutcome};
use crate::model::ResultSnapshot;
use crate::params::{ParamValue, ParameterStore};

/// Scripted kernel: counts calls, records the parameter values it was given
/// at each step, and can be told to fail on a particular call.
pub(crate) struct FakeKernel {
    pub calls: u64,
    pub fail_on_call: Option<u64>,
    /// `(lockdown_on, traceable_interaction_fraction)` seen at each step.
    pub observed: Rc<RefCell<Vec<(ParamValue, ParamValue)>>>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self {
            calls: 0,
            fail_on_call: None,
            observed: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing_on(call: u64) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }
}

impl Kernel for FakeKernel {
    fn advance_one_step(
        &mut self,
        params: &ParameterStore,
    ) -> Result<StepOutcome, FatalKernelError> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(FatalKernelError::new("injected kernel failure"));
        }

        self.observed.borrow_mut().push((
            params.get("lockdown_on").unwrap(),
            params.get("traceable_interaction_fraction").unwrap(),
        ));

        Ok(StepOutcome {
            new_infected: 10,
            total_infected: self.calls * 10,
            total_death: 0,
            n_symptoms: self.calls * 5,
            n_quarantine: 2,
            n_tests: self.calls,
            lockdown: params.get("lockdown_on").unwrap() == 1.0,
            app_turned_on: params.get("app_turned_on").unwrap() == 1.0,
        })
    }

    fn snapshot_results(&self, outcome: &StepOutcome, time: Time) -> ResultSnapshot {
        ResultSnapshot {
            time,
            lockdown: outcome.lockdown,
            app_turned_on: outcome.app_turned_on,
            total_infected: outcome.total_infected,
            total_death: outcome.total_death,
            n_symptoms: outcome.n_symptoms,
            n_quarantine: outcome.n_quarantine,
            n_tests: outcome.n_tests,
        }
    }
}
