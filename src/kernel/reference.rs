//! Bundled reference kernel.
//!
//! A reduced stand-in for a full individual-based epidemic kernel: the
//! population is tracked as aggregate compartments rather than discrete
//! agents, but every governed parameter feeds the dynamics the same way it
//! would in the full model. Lockdown and tracing settings scale the
//! effective contact rate, quarantine settings drain the transmitting pool,
//! testing settings accumulate test counts. Runs are reproducible: the same
//! `rng_seed` and the same parameter history give identical outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Kernel, StepOutcome};
use crate::clock::Time;
use crate::errors::{FatalKernelError, ModelResult};
use crate::model::ResultSnapshot;
use crate::params::{HouseholdDemographics, ParameterStore};

/// Mean days spent infectious before recovery or death.
const MEAN_INFECTIOUS_DAYS: f64 = 7.0;

/// Aggregate-compartment kernel with parameter-governed dynamics.
#[derive(Debug)]
pub struct ReferenceKernel {
    rng: ChaCha8Rng,
    n_total: u64,
    susceptible: u64,
    infectious: u64,
    // Cumulative counters; never decremented.
    total_infected: u64,
    total_death: u64,
    n_symptoms: u64,
    n_tests: u64,
    // Contact multiplier from household structure (1.0 without demographics).
    household_factor: f64,
}

impl ReferenceKernel {
    /// Build a kernel from construction-time parameters.
    pub fn new(params: &ParameterStore) -> ModelResult<Self> {
        Self::build(params, 1.0)
    }

    /// Build a kernel whose contact structure reflects a household-size
    /// distribution: larger households add within-household contacts on top
    /// of the mean daily interactions.
    pub fn with_demographics(
        params: &ParameterStore,
        demographics: &HouseholdDemographics,
    ) -> ModelResult<Self> {
        let mean_size = demographics.mean_household_size();
        Self::build(params, 1.0 + (mean_size - 1.0) / MEAN_INFECTIOUS_DAYS)
    }

    fn build(params: &ParameterStore, household_factor: f64) -> ModelResult<Self> {
        let n_total = params.get("n_total")? as u64;
        let n_seed = (params.get("n_seed_infection")? as u64).min(n_total);
        let seed = params.get("rng_seed")? as u64;

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            n_total,
            susceptible: n_total - n_seed,
            infectious: n_seed,
            total_infected: n_seed,
            total_death: 0,
            n_symptoms: 0,
            n_tests: 0,
            household_factor,
        })
    }

    /// Count of successes over `trials` independent draws at probability `p`.
    fn sample(&mut self, trials: u64, p: f64) -> u64 {
        if trials == 0 || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return trials;
        }
        (0..trials).filter(|_| self.rng.gen_bool(p)).count() as u64
    }

    fn check_invariants(&self) -> Result<(), FatalKernelError> {
        let accounted = self
            .susceptible
            .checked_add(self.infectious)
            .filter(|total| *total <= self.n_total);
        match accounted {
            Some(_) => Ok(()),
            None => Err(FatalKernelError::new(format!(
                "population accounting broken: susceptible={} infectious={} n_total={}",
                self.susceptible, self.infectious, self.n_total
            ))),
        }
    }
}

impl Kernel for ReferenceKernel {
    fn advance_one_step(
        &mut self,
        params: &ParameterStore,
    ) -> Result<StepOutcome, FatalKernelError> {
        self.check_invariants()?;

        let read = |name: &str| -> Result<f64, FatalKernelError> {
            params
                .get(name)
                .map_err(|err| FatalKernelError::new(err.to_string()))
        };

        let lockdown = read("lockdown_on")? == 1.0;
        let app_turned_on = read("app_turned_on")? == 1.0;
        let app_users = read("app_users_fraction")?;
        let traceable = read("traceable_interaction_fraction")?;
        let tracing_depth = read("tracing_network_depth")?;
        let quarantine_on_traced = read("quarantine_on_traced")? == 1.0;
        let test_on_symptoms = read("test_on_symptoms")? == 1.0;
        let test_on_traced = read("test_on_traced")? == 1.0;
        let self_quarantine = read("self_quarantine_fraction")?;
        let household_quarantine = read("quarantine_household_on_positive")? == 1.0
            || read("quarantine_household_on_symptoms")? == 1.0
            || read("quarantine_household_on_traced")? == 1.0
            || read("quarantine_household_contacts_on_positive")? == 1.0;

        let fraction_asymptomatic = read("fraction_asymptomatic")?;
        let asymptomatic_factor = read("asymptomatic_infectious_factor")?;
        let infection_prob = read("infection_prob_per_contact")?;
        let mut contacts = read("mean_daily_interactions")? * self.household_factor;
        if lockdown {
            contacts *= read("lockdown_multiplier")?;
        }

        // Symptomatic cases self-isolate; traced app users are quarantined on
        // top of that when the app and the quarantine-on-trace policy are on.
        // Deeper tracing recovers a larger share of interactions.
        let mut isolated = (1.0 - fraction_asymptomatic) * self_quarantine;
        if app_turned_on && quarantine_on_traced {
            let depth_cover = 1.0 - (1.0 - traceable).powf(tracing_depth.max(1.0));
            isolated += (1.0 - isolated) * app_users * app_users * depth_cover;
        }
        if household_quarantine {
            isolated += (1.0 - isolated) * 0.5;
        }

        let transmitting_weight = fraction_asymptomatic * asymptomatic_factor
            + (1.0 - fraction_asymptomatic) * (1.0 - isolated);

        let susceptible_fraction = self.susceptible as f64 / self.n_total as f64;
        let p_infect =
            (infection_prob * transmitting_weight * susceptible_fraction).clamp(0.0, 1.0);
        let exposures = (self.infectious as f64 * contacts).round() as u64;
        let new_infected = self.sample(exposures, p_infect).min(self.susceptible);

        let new_symptomatic = self.sample(new_infected, 1.0 - fraction_asymptomatic);

        // Recoveries and deaths resolve a geometric infectious period.
        let resolved = self.sample(self.infectious, 1.0 / MEAN_INFECTIOUS_DAYS);
        let new_deaths = self.sample(resolved, read("case_fatality_fraction")?);

        self.susceptible -= new_infected;
        self.infectious = self.infectious + new_infected - resolved;
        self.total_infected += new_infected;
        self.total_death += new_deaths;
        self.n_symptoms += new_symptomatic;

        if test_on_symptoms {
            self.n_tests += new_symptomatic;
        }
        if test_on_traced && app_turned_on {
            let traced = (new_infected as f64 * app_users * traceable).round() as u64;
            self.n_tests += traced;
        }

        let n_quarantine = (self.infectious as f64 * isolated).round() as u64;

        Ok(StepOutcome {
            new_infected,
            total_infected: self.total_infected,
            total_death: self.total_death,
            n_symptoms: self.n_symptoms,
            n_quarantine,
            n_tests: self.n_tests,
            lockdown,
            app_turned_on,
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
