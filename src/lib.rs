// src/lib.rs

//! CHILS – gewogen onafhankelijke verzamelingen met een populatie van
//! parallelle iterated-local-search runs en componentgewijze combinatie.

// Publieke modules voor gebruik binnen de Rust-crate
pub mod construct;
pub mod controller;
pub mod crossover;
pub mod diversify;
pub mod error;
pub mod graph;
pub mod incumbent;
pub mod neighbour;
pub mod params;
pub mod population;
pub mod solution;
pub mod solver;
pub mod stop;

// Her-exporteer de belangrijkste types voor Rust-gebruikers
pub use controller::{RunState, StopReason};
pub use error::{Result, SolverError};
pub use graph::Graph;
pub use incumbent::BestRecord;
pub use params::Params;
pub use solution::Solution;
pub use solver::Solver;
pub use stop::{request_stop, StopHandle};

#[cfg(feature = "python")]
mod python {
    use super::{Graph, Params, Solver};
    use pyo3::prelude::*;
    use std::fs::File;
    use std::io::BufReader;
    use std::time::Duration;

    /// Hoe vaak een lopende run op Python-signalen (Ctrl-C) controleert.
    const SIGNAL_POLL: Duration = Duration::from_millis(50);

    /// Python-handle rond één `Solver`.
    #[pyclass(name = "CHILS")]
    struct PySolver {
        inner: Solver,
    }

    #[pymethods]
    impl PySolver {
        #[new]
        fn new() -> Self {
            Self {
                inner: Solver::new(),
            }
        }

        /// Leest een METIS-bestand in een nieuwe solver.
        #[staticmethod]
        fn from_metis(instance_path: String) -> PyResult<Self> {
            let file = File::open(&instance_path)
                .map_err(|e| PyErr::new::<pyo3::exceptions::PyIOError, _>(e.to_string()))?;
            let graph = Graph::parse_metis(BufReader::new(file))?;
            Ok(Self {
                inner: Solver::from_graph(graph),
            })
        }

        fn add_vertex(&mut self, weight: u64) -> PyResult<usize> {
            Ok(self.inner.add_vertex(weight)?)
        }

        fn add_edge(&mut self, u: usize, v: usize) -> PyResult<()> {
            Ok(self.inner.add_edge(u, v)?)
        }

        fn run_full(
            &mut self,
            py: Python<'_>,
            time_limit: f64,
            n_solutions: usize,
            seed: u64,
        ) -> PyResult<()> {
            self.run_interruptible(py, move |s| s.run_full(time_limit, n_solutions, seed))
        }

        fn run_full_with(&mut self, py: Python<'_>, params: Params) -> PyResult<()> {
            self.run_interruptible(py, move |s| s.run_full_with(&params))
        }

        fn run_local_search_only(&mut self, py: Python<'_>, time_limit: f64, seed: u64) -> PyResult<()> {
            self.run_interruptible(py, move |s| s.run_local_search_only(time_limit, seed))
        }

        fn get_solution_size(&self) -> usize {
            self.inner.solution_size()
        }

        fn get_solution_weight(&self) -> u64 {
            self.inner.solution_weight()
        }

        fn get_solution_time(&self) -> f64 {
            self.inner.solution_time()
        }

        fn get_solution_vertex_configuration(&self, u: usize) -> PyResult<u8> {
            Ok(self.inner.solution_vertex_configuration(u)?)
        }
    }

    impl PySolver {
        /// Draait zonder GIL; intussen worden Python-signalen afgehandeld. Een
        /// `KeyboardInterrupt` stopt de run en wordt daarna doorgegeven.
        fn run_interruptible<F>(&mut self, py: Python<'_>, run: F) -> PyResult<()>
        where
            F: FnOnce(&mut Solver) -> crate::Result<()> + Send,
        {
            let inner = &mut self.inner;
            py.allow_threads(move || {
                inner.run_supervised(
                    SIGNAL_POLL,
                    || Python::with_gil(|py| py.check_signals()),
                    run,
                )
            })
        }
    }

    /// Stopt alle lopende runs in dit proces.
    #[pyfunction]
    fn request_stop() {
        super::request_stop();
    }

    /// Helperfunctie om een METIS-bestand te parsen en (n, m) terug te geven.
    #[pyfunction]
    fn parse_metis_py(instance_path: String) -> PyResult<(usize, usize)> {
        let file = File::open(&instance_path)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyIOError, _>(e.to_string()))?;
        let graph = Graph::parse_metis(BufReader::new(file))?;
        Ok((graph.n(), graph.m()))
    }

    /// Definieert de Python-module `_native`.
    #[pymodule]
    fn _native(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<Params>()?;
        m.add_class::<PySolver>()?;
        m.add_function(wrap_pyfunction!(request_stop, m)?)?;
        m.add_function(wrap_pyfunction!(parse_metis_py, m)?)?;
        Ok(())
    }
}
