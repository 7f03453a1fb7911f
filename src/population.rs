//! src/population.rs
//!
//! Beheert een populatie van `n_solutions` oplossingen. Elke ronde voert ieder
//! lid een aantal ILS-stappen uit (parallel met Rayon), waarna paren van leden
//! gecombineerd worden. Een kind vervangt het zwakste lid alleen als het
//! strikt zwaarder is.
//!
//! Elk lid heeft een eigen RNG, afgeleid van de seed en zijn index, dus de
//! uitkomst van een ronde hangt niet af van de volgorde waarin threads draaien.

use crate::{
    construct::greedy_random,
    crossover::combine,
    diversify::ils_step,
    graph::Graph,
    incumbent::Incumbent,
    neighbour::{Convergence, LocalSearch},
    params::Params,
    solution::Solution,
    stop::StopSignal,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Zout voor de RNG van de populatie zelf, los van de leden.
const POPULATION_STREAM: u64 = 0x5EED_0F_C0_FFEE;

/// SplitMix64-mixer om per lid een seed af te leiden van de basisseed.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Eén lid: een oplossing met eigen RNG, werkruimte en stopsignaal.
pub struct Member<'g> {
    pub sol: Solution<'g>,
    rng: ChaCha8Rng,
    ls: LocalSearch,
    stop: StopSignal,
}

impl<'g> Member<'g> {
    pub fn new(graph: &'g Graph, p: &Params, seed: u64, stop: &StopSignal) -> Self {
        Self {
            sol: Solution::new(graph),
            rng: ChaCha8Rng::seed_from_u64(seed),
            ls: LocalSearch::new(graph.n(), p),
            stop: stop.clone(),
        }
    }

    #[inline]
    pub fn weight(&self) -> u64 {
        self.sol.weight()
    }

    /// Lokale zoektocht over de hele graaf vanuit de huidige toestand.
    pub fn descend(&mut self) -> Convergence {
        let n = self.sol.graph().n();
        self.ls.enqueue_all(n, &mut self.rng);
        let outcome = self.ls.run(&mut self.sol, &mut self.rng, &mut self.stop);
        self.sol.commit();
        outcome
    }

    /// Greedy start (alleen annuleerbaar, niet door de deadline) gevolgd door
    /// een lokale zoektocht.
    pub fn initialise(&mut self, incumbent: &Incumbent) -> Convergence {
        let mut flag_only = self.stop.without_deadline();
        greedy_random(&mut self.sol, &mut self.rng, &mut flag_only);
        self.sol.commit();
        incumbent.offer(&self.sol);
        let outcome = self.descend();
        incumbent.offer(&self.sol);
        outcome
    }

    /// Voert tot `iterations` ILS-stappen uit. Geeft `false` als de run moet stoppen.
    pub fn improve(&mut self, iterations: usize, strength: usize, incumbent: &Incumbent) -> bool {
        for _ in 0..iterations {
            if self.stop.should_stop() {
                return false;
            }
            let out = ils_step(
                &mut self.sol,
                &mut self.ls,
                &mut self.rng,
                &mut self.stop,
                strength,
            );
            if out.improved {
                incumbent.offer(&self.sol);
            }
            if out.interrupted {
                return false;
            }
        }
        true
    }
}

/// Samenvatting van één ronde.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    pub interrupted: bool,
    pub offspring: usize,
    pub replacements: usize,
}

/// De populatie en haar combinatie-werkruimte.
pub struct Population<'g> {
    members: Vec<Member<'g>>,
    rng: ChaCha8Rng,
    child: Solution<'g>,
    child_ls: LocalSearch,
    stop: StopSignal,
    params: Params,
    /// Index van het zwaarste lid; bij gelijke stand het eerst gevonden lid.
    best: usize,
    rounds: usize,
}

impl<'g> Population<'g> {
    /// Creëert `p.n_solutions` lege leden. Vereist `n_solutions >= 1`.
    pub fn new(graph: &'g Graph, p: &Params, stop: &StopSignal) -> Self {
        debug_assert!(p.n_solutions >= 1);
        let members = (0..p.n_solutions.max(1))
            .map(|i| Member::new(graph, p, splitmix64(p.seed ^ i as u64), stop))
            .collect();
        Self {
            members,
            rng: ChaCha8Rng::seed_from_u64(splitmix64(p.seed ^ POPULATION_STREAM)),
            child: Solution::new(graph),
            child_ls: LocalSearch::new(graph.n(), p),
            stop: stop.clone(),
            params: p.clone(),
            best: 0,
            rounds: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Member<'g>] {
        &self.members
    }

    pub fn best(&self) -> &Solution<'g> {
        &self.members[self.best].sol
    }

    pub fn best_weight(&self) -> u64 {
        self.members[self.best].weight()
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Index van het lichtste lid; bij gelijke stand het laatste.
    pub fn weakest(&self) -> usize {
        let mut idx = 0;
        for (i, m) in self.members.iter().enumerate() {
            if m.weight() <= self.members[idx].weight() {
                idx = i;
            }
        }
        idx
    }

    fn refresh_best(&mut self) {
        for i in 0..self.members.len() {
            if self.members[i].weight() > self.members[self.best].weight() {
                self.best = i;
            }
        }
    }

    /// Construeert en verfijnt alle leden. Geeft `true` bij onderbreking.
    pub fn initialise(&mut self, incumbent: &Incumbent) -> bool {
        #[cfg(feature = "parallel")]
        let interrupted = self
            .members
            .par_iter_mut()
            .map(|m| m.initialise(incumbent) == Convergence::Interrupted)
            .reduce(|| false, |a, b| a || b);
        #[cfg(not(feature = "parallel"))]
        let interrupted = self
            .members
            .iter_mut()
            .map(|m| m.initialise(incumbent) == Convergence::Interrupted)
            .fold(false, |a, b| a || b);

        self.refresh_best();
        interrupted
    }

    /// Eén ronde: ILS per lid, daarna `len / 2` combinaties.
    pub fn round(&mut self, incumbent: &Incumbent) -> RoundOutcome {
        let iterations = self.params.ils_iterations;
        let strength = self.params.perturbation_strength;

        #[cfg(feature = "parallel")]
        let all_finished = self
            .members
            .par_iter_mut()
            .map(|m| m.improve(iterations, strength, incumbent))
            .reduce(|| true, |a, b| a && b);
        #[cfg(not(feature = "parallel"))]
        let all_finished = self
            .members
            .iter_mut()
            .map(|m| m.improve(iterations, strength, incumbent))
            .fold(true, |a, b| a && b);

        self.refresh_best();
        let mut outcome = RoundOutcome {
            interrupted: !all_finished,
            ..RoundOutcome::default()
        };

        if self.len() >= 2 && !outcome.interrupted {
            for _ in 0..self.len() / 2 {
                if self.stop.check_now() {
                    outcome.interrupted = true;
                    break;
                }
                outcome.offspring += 1;
                if self.combine_once(incumbent) {
                    outcome.replacements += 1;
                }
            }
        }

        self.rounds += 1;
        log::debug!(
            "round {}: best {} (member {}), offspring {}, replaced {}",
            self.rounds,
            self.best_weight(),
            self.best,
            outcome.offspring,
            outcome.replacements
        );
        outcome
    }

    /// Combineert twee geselecteerde ouders; geeft `true` als het kind een lid verving.
    fn combine_once(&mut self, incumbent: &Incumbent) -> bool {
        let a = self.select_parent(None);
        let b = self.select_parent(Some(a));

        combine(
            &self.members[a].sol,
            &self.members[b].sol,
            &mut self.child,
            &mut self.child_ls,
            &mut self.rng,
            &mut self.stop,
        );

        let weakest = self.weakest();
        if self.child.weight() <= self.members[weakest].weight() {
            return false;
        }
        log::debug!(
            "offspring of {} and {} (weight {}) replaces member {} (weight {})",
            a,
            b,
            self.child.weight(),
            weakest,
            self.members[weakest].weight()
        );
        self.members[weakest].sol.assign_from(&self.child);
        if weakest == self.best || self.child.weight() > self.best_weight() {
            // Na vervanging kan een ander lid zwaarder zijn dan het nieuwe.
            self.best = weakest;
            self.refresh_best();
        }
        incumbent.offer(&self.members[weakest].sol);
        true
    }

    /// Rang-gewogen ouderselectie: rang `r` (0 = zwaarst) krijgt gewicht
    /// `(len - r)^selection_pressure`.
    fn select_parent(&mut self, exclude: Option<usize>) -> usize {
        let n = self.members.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&x, &y| {
            self.members[y]
                .weight()
                .cmp(&self.members[x].weight())
                .then(x.cmp(&y))
        });
        let pressure = self.params.selection_pressure.max(0.0);
        let weights: Vec<f64> = order
            .iter()
            .enumerate()
            .map(|(rank, &idx)| {
                if Some(idx) == exclude {
                    0.0
                } else {
                    ((n - rank) as f64).powf(pressure)
                }
            })
            .collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => order[dist.sample(&mut self.rng)],
            // Alle gewichten nul: val terug op uniform buiten `exclude`.
            Err(_) => {
                let pick = self.rng.gen_range(0..n);
                match exclude {
                    Some(e) if e == pick && n > 1 => (pick + 1) % n,
                    _ => pick,
                }
            }
        }
    }
}
