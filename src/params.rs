//! src/params.rs
//!
//! Bundelt alle afstembare parameters voor de oplosser.

use crate::error::{Result, SolverError};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Alle afstembare besturingselementen voor de lokale zoektocht en de populatie.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Tijdsbudget in seconden, gemeten vanaf de start van de run.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub time_limit: f64,
    /// Grootte van de populatie (alleen full-modus).
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub n_solutions: usize,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub seed: u64,
    /// Optioneel maximum aantal rondes; maakt een run klokonafhankelijk.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub max_rounds: Option<usize>,
    /// Perturbatie-stappen per lid per ronde.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub ils_iterations: usize,
    /// Maximaal aantal knopen dat per perturbatie geforceerd wordt.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub perturbation_strength: usize,
    /// Aantal swaps met winst 0 per lokale-zoektocht traject.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub plateau_budget: usize,
    /// Maximaal aantal kandidaten in de (1,2)-swap paarzoektocht.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub pair_scan_limit: usize,
    /// Exponent van de rang-gewogen ouderselectie; 0 is uniform.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub selection_pressure: f64,
}

#[cfg(feature = "python")]
#[pymethods]
impl Params {
    #[new]
    #[pyo3(signature = (
        time_limit = 10.0,
        n_solutions = 16,
        seed = 0,
        max_rounds = None,
        ils_iterations = 64,
        perturbation_strength = 4,
        plateau_budget = 32,
        pair_scan_limit = 32,
        selection_pressure = 2.0,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        time_limit: f64,
        n_solutions: usize,
        seed: u64,
        max_rounds: Option<usize>,
        ils_iterations: usize,
        perturbation_strength: usize,
        plateau_budget: usize,
        pair_scan_limit: usize,
        selection_pressure: f64,
    ) -> Self {
        Self {
            time_limit,
            n_solutions,
            seed,
            max_rounds,
            ils_iterations,
            perturbation_strength,
            plateau_budget,
            pair_scan_limit,
            selection_pressure,
        }
    }

    /// Kopie voor Python-gebruikers.
    fn copy(&self) -> Self {
        self.clone()
    }
}

impl Default for Params {
    fn default() -> Self {
        Params {
            time_limit: 10.0,
            n_solutions: 16,
            seed: 0,
            max_rounds: None,
            ils_iterations: 64,
            perturbation_strength: 4,
            plateau_budget: 32,
            pair_scan_limit: 32,
            selection_pressure: 2.0,
        }
    }
}

impl Params {
    /// Standaardparameters met de drie argumenten van de boundary-API.
    pub fn with_run(time_limit: f64, n_solutions: usize, seed: u64) -> Self {
        Self {
            time_limit,
            n_solutions,
            seed,
            ..Self::default()
        }
    }

    /// Beperkt de run tot `rounds` rondes.
    pub fn limit_rounds(&mut self, rounds: usize) -> &mut Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Controleert de contractvoorwaarden van een run.
    pub fn validate(&self) -> Result<()> {
        if !self.time_limit.is_finite() || self.time_limit < 0.0 {
            return Err(SolverError::InvalidTimeLimit(self.time_limit));
        }
        if self.n_solutions == 0 {
            return Err(SolverError::InvalidPopulation);
        }
        Ok(())
    }
}
