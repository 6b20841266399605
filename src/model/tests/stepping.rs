//! Stepping protocol tests: clock, results, kernel failure, run loop.

use super::FakeKernel;
use crate::errors::ModelError;
use crate::model::Model;
use crate::params::ParameterStore;

fn small_store() -> ParameterStore {
    ParameterStore::from_baseline([
        ("n_total", 500.0),
        ("n_seed_infection", 10.0),
        ("end_time", 5.0),
    ])
    .unwrap()
}

fn fake_model() -> Model {
    Model::with_kernel(small_store(), Box::new(FakeKernel::new())).unwrap()
}

#[test]
fn results_before_any_step_fails() {
    let model = fake_model();
    assert!(matches!(
        model.one_time_step_results(),
        Err(ModelError::NoStepExecuted)
    ));
}

#[test]
fn clock_advances_by_one_per_step() {
    let mut model = fake_model();
    assert_eq!(model.current_time(), 0);

    for expected in 1..=4 {
        model.one_time_step().unwrap();
        assert_eq!(model.current_time(), expected);
        assert_eq!(model.one_time_step_results().unwrap().time, expected);
    }
}

#[test]
fn snapshot_reflects_latest_step_only() {
    let mut model = fake_model();
    model.one_time_step().unwrap();
    let first = model.one_time_step_results().unwrap();
    model.one_time_step().unwrap();
    let second = model.one_time_step_results().unwrap();

    assert_eq!(first.time, 1);
    assert_eq!(second.time, 2);
    assert!(second.total_infected > first.total_infected);
}

#[test]
fn kernel_failure_is_fatal_and_leaves_clock_alone() {
    let kernel = FakeKernel::failing_on(3);
    let mut model = Model::with_kernel(small_store(), Box::new(kernel)).unwrap();

    model.one_time_step().unwrap();
    model.one_time_step().unwrap();

    let err = model.one_time_step().unwrap_err();
    match err {
        ModelError::KernelFailure { step, details } => {
            assert_eq!(step, 3);
            assert!(details.contains("injected"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The failed step never completed: clock and latest snapshot unchanged.
    assert_eq!(model.current_time(), 2);
    assert_eq!(model.one_time_step_results().unwrap().time, 2);
}

#[test]
fn run_steps_until_end_time() {
    let mut model = fake_model();
    assert!(!model.finished());
    model.run().unwrap();
    assert!(model.finished());
    assert_eq!(model.current_time(), 5);
}

#[test]
fn update_between_steps_visible_to_next_step() {
    let kernel = FakeKernel::new();
    let observed = kernel.observed.clone();
    let mut model = Model::with_kernel(small_store(), Box::new(kernel)).unwrap();

    model.one_time_step().unwrap();
    model.update_running_params("lockdown_on", 1.0).unwrap();
    model.one_time_step().unwrap();

    let seen = observed.borrow();
    assert_eq!(seen[0].0, 0.0);
    assert_eq!(seen[1].0, 1.0);
}

#[test]
fn update_before_first_step_is_inert_until_it_runs() {
    let kernel = FakeKernel::new();
    let observed = kernel.observed.clone();
    let mut model = Model::with_kernel(small_store(), Box::new(kernel)).unwrap();

    model
        .update_running_params("traceable_interaction_fraction", 0.30)
        .unwrap();
    // Nothing has executed yet, so no kernel call has seen the value.
    assert!(observed.borrow().is_empty());

    model.one_time_step().unwrap();
    assert_eq!(observed.borrow()[0].1, 0.30);
}

#[test]
fn default_kernel_steps_end_to_end() {
    let mut model = Model::new(small_store()).unwrap();
    model.one_time_step().unwrap();
    let res = model.one_time_step_results().unwrap();
    assert_eq!(res.time, 1);
    assert!(res.total_infected >= 10);
}
