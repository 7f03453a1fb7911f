//! src/neighbour.rs
//!
//! Lokale zoektocht voor gewogen onafhankelijke verzamelingen. Drijft één
//! `Solution` naar een lokaal optimum met drie soorten moves, in prioriteitsvolgorde:
//!
//! 1. *force*: voeg een knoop met tightness 0 toe;
//! 2. *(1,1)-swap*: verwijder een knoop `u ∈ S` en voeg een buur toe wiens enige
//!    buur in `S` de knoop `u` was;
//! 3. *(1,2)-swap*: verwijder `u` en voeg twee niet-buren uit die 1-tight buurt toe.
//!
//! Swaps worden alleen uitgevoerd als de winst positief is, of 0 zolang het
//! plateau-budget van het traject strekt. Het gewicht daalt dus nooit.
//! Een werklijst bevat de knopen die na een move opnieuw bekeken moeten worden;
//! het traject eindigt wanneer die leeg is.

use crate::{graph::Graph, params::Params, solution::Solution, stop::StopSignal};
use bitvec::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Uitkomst van een traject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// Werklijst leeg: geen enkele move levert nog winst op.
    LocalOptimum,
    /// Gestopt op een move-grens door annulering of deadline.
    Interrupted,
}

/// Tellers per move-soort voor één traject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveStats {
    pub force: usize,
    pub one_one: usize,
    pub one_two: usize,
    pub plateau: usize,
}

/// Herbruikbare werkruimte van de lokale zoektocht.
#[derive(Clone, Debug)]
pub struct LocalSearch {
    queue: VecDeque<u32>,
    /// `queued[v]` voorkomt dat `v` dubbel in de werklijst staat.
    queued: BitVec,
    /// Knopen die tight 0 werden; gaan voor op de werklijst.
    force: Vec<u32>,
    /// Scratch-buffer voor de 1-tight buren van een knoop.
    candidates: Vec<u32>,
    plateau_budget: usize,
    pair_scan_limit: usize,
    stats: MoveStats,
}

impl LocalSearch {
    pub fn new(n: usize, p: &Params) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: bitvec![0; n],
            force: Vec::new(),
            candidates: Vec::new(),
            plateau_budget: p.plateau_budget,
            pair_scan_limit: p.pair_scan_limit.max(2),
            stats: MoveStats::default(),
        }
    }

    /// Statistieken van het laatste traject.
    pub fn stats(&self) -> MoveStats {
        self.stats
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.force.is_empty()
    }

    /*────────── Werklijst ──────────*/

    #[inline]
    pub fn enqueue(&mut self, v: usize) {
        if !self.queued[v] {
            self.queued.set(v, true);
            self.queue.push_back(v as u32);
        }
    }

    /// Zet alle knopen in willekeurige volgorde op de werklijst.
    pub fn enqueue_all<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) {
        let mut order: Vec<u32> = (0..n as u32).collect();
        order.shuffle(rng);
        for v in order {
            self.enqueue(v as usize);
        }
    }

    /// Zet `v` en al zijn buren op de werklijst.
    pub fn enqueue_around(&mut self, graph: &Graph, v: usize) {
        self.enqueue(v);
        for &u in graph.neighbours(v) {
            self.enqueue(u as usize);
        }
    }

    /// Leegt de werklijst, bijvoorbeeld na een onderbreking.
    pub fn clear(&mut self) {
        while let Some(v) = self.queue.pop_front() {
            self.queued.set(v as usize, false);
        }
        self.force.clear();
    }

    /*────────── Traject ──────────*/

    /// Past moves toe tot de werklijst leeg is of `stop` afgaat.
    ///
    /// Bij terugkeer is `sol` altijd een onafhankelijke verzameling en is het
    /// gewicht niet lager dan bij aanroep.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        sol: &mut Solution<'_>,
        rng: &mut R,
        stop: &mut StopSignal,
    ) -> Convergence {
        self.stats = MoveStats::default();
        let mut plateau_left = self.plateau_budget;
        let start_weight = sol.weight();

        let outcome = loop {
            if stop.should_stop() {
                self.clear();
                break Convergence::Interrupted;
            }
            if !self.step(sol, rng, &mut plateau_left) {
                break Convergence::LocalOptimum;
            }
        };

        debug_assert!(sol.weight() >= start_weight);
        log::trace!(
            "local search {:?}: weight {} -> {}, moves {:?}",
            outcome,
            start_weight,
            sol.weight(),
            self.stats
        );
        outcome
    }

    /// Eén stap van het traject: een force-move of het beoordelen van één knoop
    /// van de werklijst. `false` als er niets meer te doen is.
    fn step<R: Rng + ?Sized>(
        &mut self,
        sol: &mut Solution<'_>,
        rng: &mut R,
        plateau_left: &mut usize,
    ) -> bool {
        if let Some(v) = self.force.pop() {
            let v = v as usize;
            if !sol.contains(v) && sol.tightness(v) == 0 {
                sol.add(v);
                self.stats.force += 1;
                self.touch(sol, v);
            }
            return true;
        }

        let Some(x) = self.queue.pop_front() else {
            return false;
        };
        let x = x as usize;
        self.queued.set(x, false);

        if sol.contains(x) {
            self.try_swap(sol, x, rng, plateau_left);
        } else {
            match sol.tightness(x) {
                0 => self.force.push(x as u32),
                1 => {
                    if let Some(u) = sol.solution_neighbour(x) {
                        self.try_swap(sol, u, rng, plateau_left);
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Zet de buurt van een aangeraakte knoop klaar voor herbeoordeling.
    fn touch(&mut self, sol: &Solution<'_>, v: usize) {
        let graph = sol.graph();
        self.enqueue(v);
        for &w in graph.neighbours(v) {
            let w = w as usize;
            if !sol.contains(w) && sol.tightness(w) == 0 {
                self.force.push(w as u32);
            } else {
                self.enqueue(w);
            }
        }
    }

    /// Probeert een (1,1)- of (1,2)-swap rond `u ∈ S`. Geeft `true` bij een move.
    fn try_swap<R: Rng + ?Sized>(
        &mut self,
        sol: &mut Solution<'_>,
        u: usize,
        rng: &mut R,
        plateau_left: &mut usize,
    ) -> bool {
        let graph = sol.graph();
        let wu = graph.weight(u);

        self.candidates.clear();
        for &v in graph.neighbours(u) {
            let vi = v as usize;
            if !sol.contains(vi) && sol.tightness(vi) == 1 {
                self.candidates.push(v);
            }
        }
        if self.candidates.is_empty() {
            return false;
        }

        // (1,1): zwaarste kandidaat, gelijke stand willekeurig.
        let mut best_single = self.candidates[0] as usize;
        let mut ties = 1u32;
        for &v in &self.candidates[1..] {
            let v = v as usize;
            let (wv, wb) = (graph.weight(v), graph.weight(best_single));
            if wv > wb {
                best_single = v;
                ties = 1;
            } else if wv == wb {
                ties += 1;
                if rng.gen_range(0..ties) == 0 {
                    best_single = v;
                }
            }
        }
        let w_single = graph.weight(best_single);
        if w_single > wu {
            self.apply_swap(sol, u, &[best_single]);
            self.stats.one_one += 1;
            return true;
        }

        // (1,2): zwaarste niet-aangrenzende paar onder de zwaarste kandidaten.
        let pair = self.best_pair(graph, rng);
        if let Some((a, b, w_pair)) = pair {
            if w_pair > wu {
                self.apply_swap(sol, u, &[a, b]);
                self.stats.one_two += 1;
                return true;
            }
        }

        if *plateau_left == 0 {
            return false;
        }
        if let Some((a, b, w_pair)) = pair {
            if w_pair == wu {
                *plateau_left -= 1;
                self.apply_swap(sol, u, &[a, b]);
                self.stats.plateau += 1;
                return true;
            }
        }
        if w_single == wu {
            *plateau_left -= 1;
            self.apply_swap(sol, u, &[best_single]);
            self.stats.plateau += 1;
            return true;
        }
        false
    }

    /// Zoekt het zwaarste paar niet-buren in `self.candidates`.
    fn best_pair<R: Rng + ?Sized>(&mut self, graph: &Graph, rng: &mut R) -> Option<(usize, usize, u64)> {
        if self.candidates.len() < 2 {
            return None;
        }
        self.candidates
            .sort_unstable_by(|&a, &b| graph.weight(b as usize).cmp(&graph.weight(a as usize)));
        let limit = self.candidates.len().min(self.pair_scan_limit);
        let scan = &self.candidates[..limit];

        let mut best: Option<(usize, usize, u64)> = None;
        let mut ties = 0u32;
        for i in 0..scan.len() {
            let a = scan[i] as usize;
            for &b in &scan[i + 1..] {
                let b = b as usize;
                let w = graph.weight(a) + graph.weight(b);
                // Gesorteerd: verdere paren met deze `a` worden alleen lichter.
                if let Some((_, _, bw)) = best {
                    if w < bw {
                        break;
                    }
                }
                if graph.is_adjacent(a, b) {
                    continue;
                }
                match best {
                    Some((_, _, bw)) if w == bw => {
                        ties += 1;
                        if rng.gen_range(0..ties) == 0 {
                            best = Some((a, b, w));
                        }
                    }
                    _ => {
                        best = Some((a, b, w));
                        ties = 1;
                    }
                }
            }
        }
        best
    }

    /// Verwijdert `u` en voegt `inserted` toe; alle betrokken knopen worden aangeraakt.
    fn apply_swap(&mut self, sol: &mut Solution<'_>, u: usize, inserted: &[usize]) {
        sol.remove(u);
        for &v in inserted {
            debug_assert_eq!(sol.tightness(v), 0);
            sol.add(v);
        }
        self.touch(sol, u);
        for &v in inserted {
            self.touch(sol, v);
        }
    }
}
