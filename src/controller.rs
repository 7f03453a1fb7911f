//! src/controller.rs
//!
//! Stuurt een run aan: tijdsbudget, seeding en annulering rond de populatie
//! (full-modus) of rond één lid (local-search-only). De toestand loopt
//! `Idle → Running → Stopped(reden) → Terminal` en kan niet terug naar `Running`;
//! daarna zijn alleen de accessors van het beste record nog bruikbaar.

use crate::{
    error::{Result, SolverError},
    graph::Graph,
    incumbent::{BestRecord, Incumbent},
    params::Params,
    population::{splitmix64, Member, Population},
    stop::{Registration, StopHandle, StopSignal},
};
use std::time::Instant;

/// Waarom een run stopte. Geen van deze redenen is een fout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    TimeLimit,
    Cancelled,
    /// `Params::max_rounds` bereikt.
    RoundLimit,
    /// Het beste gewicht is gelijk aan de som van alle gewichten.
    UpperBoundReached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped(StopReason),
    Terminal,
}

/// Welke van de twee runmodi.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Full,
    LocalSearchOnly,
}

/// Levenscyclus en resultaat van precies één run.
#[derive(Debug)]
pub struct Controller {
    state: RunState,
    handle: StopHandle,
    best: BestRecord,
    history: Vec<(f64, u64)>,
    reason: Option<StopReason>,
    rounds: usize,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            handle: StopHandle::new(),
            best: BestRecord::default(),
            history: Vec::new(),
            reason: None,
            rounds: 0,
        }
    }

    /*────────── Getters ──────────*/

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Handle waarmee een andere thread deze run kan annuleren.
    pub fn stop_handle(&self) -> StopHandle {
        self.handle.clone()
    }

    pub fn best(&self) -> &BestRecord {
        &self.best
    }

    /// (tijd, gewicht) van elke verbetering van het beste record.
    pub fn history(&self) -> &[(f64, u64)] {
        &self.history
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.reason
    }

    /// Schrijft de run in bij `request_stop` voordat de graaf voorbereid wordt.
    pub(crate) fn enlist(&self) -> Registration {
        self.handle.register()
    }

    /// Aantal voltooide rondes (populatierondes of ILS-batches).
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /*────────── Runs ──────────*/

    /// Draait de volledige populatie-zoektocht op een bevroren graaf.
    pub fn run_full(&mut self, graph: &Graph, p: &Params) -> Result<()> {
        self.run(graph, p, Mode::Full)
    }

    /// Draait alleen de lokale zoektocht (met ILS-herstarts) op één oplossing.
    pub fn run_local_search_only(&mut self, graph: &Graph, p: &Params) -> Result<()> {
        let p = Params {
            n_solutions: 1,
            ..p.clone()
        };
        self.run(graph, &p, Mode::LocalSearchOnly)
    }

    fn run(&mut self, graph: &Graph, p: &Params, mode: Mode) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(SolverError::AlreadyTerminated);
        }
        // Inschrijven vóór de validatie: een `request_stop` vanaf hier gaat niet verloren.
        let _registration = self.handle.register();
        p.validate()?;
        debug_assert!(graph.is_frozen(), "graph must be frozen before a run");

        self.state = RunState::Running;
        let start = Instant::now();
        let mut stop = StopSignal::new(&self.handle, start, p.time_limit);
        let incumbent = Incumbent::new(graph.n(), start);
        let upper = graph.total_weight();

        log::info!(
            "{:?} run: n={} m={} n_solutions={} seed={} time_limit={}s",
            mode,
            graph.n(),
            graph.m(),
            p.n_solutions,
            p.seed,
            p.time_limit
        );

        let (reason, rounds) = match mode {
            Mode::Full => drive_population(graph, p, &mut stop, &incumbent, upper),
            Mode::LocalSearchOnly => drive_single(graph, p, &mut stop, &incumbent, upper),
        };
        self.state = RunState::Stopped(reason);
        self.reason = Some(reason);
        self.rounds = rounds;

        let (best, history) = incumbent.into_parts();
        self.best = best;
        self.history = history;
        log::info!(
            "run stopped ({:?}) after {} round(s), {:.3}s: best weight {} size {} found at {:.3}s",
            reason,
            rounds,
            start.elapsed().as_secs_f64(),
            self.best.weight(),
            self.best.size(),
            self.best.time()
        );
        self.state = RunState::Terminal;
        Ok(())
    }
}

/// Controleert op een rondegrens of de run moet stoppen.
fn check_stop(
    stop: &mut StopSignal,
    rounds: usize,
    p: &Params,
    incumbent: &Incumbent,
    upper: u64,
) -> Option<StopReason> {
    if stop.cancelled() {
        return Some(StopReason::Cancelled);
    }
    if stop.check_now() {
        // De vlag kan net tussen beide controles gezet zijn.
        return Some(if stop.cancelled() {
            StopReason::Cancelled
        } else {
            StopReason::TimeLimit
        });
    }
    if incumbent.weight() >= upper {
        return Some(StopReason::UpperBoundReached);
    }
    match p.max_rounds {
        Some(max) if rounds >= max => Some(StopReason::RoundLimit),
        _ => None,
    }
}

fn drive_population(
    graph: &Graph,
    p: &Params,
    stop: &mut StopSignal,
    incumbent: &Incumbent,
    upper: u64,
) -> (StopReason, usize) {
    let mut pop = Population::new(graph, p, stop);
    pop.initialise(incumbent);
    loop {
        if let Some(reason) = check_stop(stop, pop.rounds(), p, incumbent, upper) {
            return (reason, pop.rounds());
        }
        pop.round(incumbent);
    }
}

fn drive_single(
    graph: &Graph,
    p: &Params,
    stop: &mut StopSignal,
    incumbent: &Incumbent,
    upper: u64,
) -> (StopReason, usize) {
    let mut member = Member::new(graph, p, splitmix64(p.seed), stop);
    member.descend();
    incumbent.offer(&member.sol);
    let mut rounds = 0;
    loop {
        if let Some(reason) = check_stop(stop, rounds, p, incumbent, upper) {
            return (reason, rounds);
        }
        member.improve(p.ils_iterations, p.perturbation_strength, incumbent);
        rounds += 1;
    }
}
