//! src/solver.rs
//!
//! De boundary-handle: één `Solver` bezit een graaf en de controller van
//! precies één run. Vrijgeven gebeurt via `Drop`.

use crate::{
    controller::{Controller, RunState, StopReason},
    error::{Result, SolverError},
    graph::Graph,
    incumbent::BestRecord,
    params::Params,
    stop::StopHandle,
};
use std::time::Duration;

/// Opaque handle voor het opbouwen van een graaf en het draaien van een run.
#[derive(Debug, Default)]
pub struct Solver {
    graph: Graph,
    controller: Controller,
}

impl Solver {
    /*────────── Constructors ──────────*/

    pub fn new() -> Self {
        Self::default()
    }

    /// Neemt een bestaande (bijvoorbeeld geparste) graaf over.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            controller: Controller::new(),
        }
    }

    /*────────── Graafopbouw ──────────*/

    /// Voegt een knoop toe en geeft zijn id terug (0, 1, 2, ...).
    pub fn add_vertex(&mut self, weight: u64) -> Result<usize> {
        self.graph.add_vertex(weight)
    }

    /// Voegt een ongerichte kant toe. Zie [`Graph::add_edge`] voor het beleid
    /// rond zelf-lussen en dubbele kanten.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.graph.add_edge(u, v)
    }

    /*────────── Runs ──────────*/

    /// Volledige run: populatie van `n_solutions` leden met combinatie.
    pub fn run_full(&mut self, time_limit: f64, n_solutions: usize, seed: u64) -> Result<()> {
        self.run_full_with(&Params::with_run(time_limit, n_solutions, seed))
    }

    pub fn run_full_with(&mut self, p: &Params) -> Result<()> {
        let _registration = self.controller.enlist();
        self.prepare(p)?;
        self.controller.run_full(&self.graph, p)
    }

    /// Run met alleen lokale zoektocht op één oplossing.
    pub fn run_local_search_only(&mut self, time_limit: f64, seed: u64) -> Result<()> {
        self.run_local_search_only_with(&Params::with_run(time_limit, 1, seed))
    }

    pub fn run_local_search_only_with(&mut self, p: &Params) -> Result<()> {
        let _registration = self.controller.enlist();
        self.prepare(p)?;
        self.controller.run_local_search_only(&self.graph, p)
    }

    /// Valideert vóór het bevriezen, zodat een geweigerde run niets verandert.
    fn prepare(&mut self, p: &Params) -> Result<()> {
        if self.controller.state() != RunState::Idle {
            return Err(SolverError::AlreadyTerminated);
        }
        p.validate()?;
        self.graph.freeze();
        Ok(())
    }

    /// Draait `run` op een eigen thread en roept intussen elke `poll` `watch` aan
    /// op de aanroepende thread. Geeft `watch` een fout, dan wordt de run gestopt
    /// en afgewacht, en komt die fout terug. Anders volgt het resultaat van `run`.
    pub fn run_supervised<E, W, F>(&mut self, poll: Duration, mut watch: W, run: F) -> std::result::Result<(), E>
    where
        E: From<SolverError>,
        W: FnMut() -> std::result::Result<(), E>,
        F: FnOnce(&mut Solver) -> Result<()> + Send,
    {
        let handle = self.stop_handle();
        std::thread::scope(|scope| {
            let worker = scope.spawn(move || run(self));
            let mut interrupt = None;
            while !worker.is_finished() {
                std::thread::sleep(poll);
                if interrupt.is_none() {
                    if let Err(e) = watch() {
                        log::info!("run interrupted by caller, stopping");
                        handle.stop();
                        interrupt = Some(e);
                    }
                }
            }
            let outcome = match worker.join() {
                Ok(outcome) => outcome,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            match interrupt {
                Some(e) => Err(e),
                None => outcome.map_err(E::from),
            }
        })
    }

    /// Handle waarmee een andere thread de run van deze solver kan stoppen.
    pub fn stop_handle(&self) -> StopHandle {
        self.controller.stop_handle()
    }

    /*────────── Resultaat ──────────*/

    pub fn state(&self) -> RunState {
        self.controller.state()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.controller.stop_reason()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Het beste record; vóór een run de lege verzameling.
    pub fn best(&self) -> &BestRecord {
        self.controller.best()
    }

    pub fn history(&self) -> &[(f64, u64)] {
        self.controller.history()
    }

    pub fn solution_size(&self) -> usize {
        self.best().size()
    }

    pub fn solution_weight(&self) -> u64 {
        self.best().weight()
    }

    /// Seconden sinds de start van de run waarop de beste oplossing gevonden werd.
    pub fn solution_time(&self) -> f64 {
        self.best().time()
    }

    /// 1 als `v` in de beste oplossing zit, anders 0.
    pub fn solution_vertex_configuration(&self, v: usize) -> Result<u8> {
        let n = self.graph.n();
        if v >= n {
            return Err(SolverError::VertexOutOfRange { vertex: v, n });
        }
        Ok(u8::from(self.best().contains(v).unwrap_or(false)))
    }
}
