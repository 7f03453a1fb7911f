//! src/construct.rs
//!
//! Greedy-random constructie van een startoplossing: knopen worden bekeken in
//! aflopende volgorde van `w(v) / (deg(v) + 1)` en toegevoegd zolang ze nog
//! tight 0 zijn. Gelijke scores worden willekeurig geordend, zodat leden van de
//! populatie met verschillende seeds verschillend beginnen.

use crate::{graph::Graph, solution::Solution, stop::StopSignal};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// Vergelijkt `w(a)/(deg(a)+1)` met `w(b)/(deg(b)+1)` zonder floating point.
fn ratio_cmp(graph: &Graph, a: usize, b: usize) -> Ordering {
    let lhs = graph.weight(a) as u128 * (graph.degree(b) as u128 + 1);
    let rhs = graph.weight(b) as u128 * (graph.degree(a) as u128 + 1);
    lhs.cmp(&rhs)
}

/// Vult `sol` greedy aan. Stopt vroegtijdig alleen als `stop` afgaat; de
/// oplossing blijft dan onafhankelijk. Geeft het aantal toegevoegde knopen terug.
pub fn greedy_random<R>(sol: &mut Solution<'_>, rng: &mut R, stop: &mut StopSignal) -> usize
where
    R: Rng + ?Sized,
{
    let graph = sol.graph();
    let mut order: Vec<usize> = (0..graph.n()).collect();
    order.shuffle(rng);
    // Stabiel sorteren behoudt de willekeurige volgorde binnen gelijke scores.
    order.sort_by(|&a, &b| ratio_cmp(graph, b, a));

    let mut added = 0;
    for v in order {
        if stop.should_stop() {
            break;
        }
        if !sol.contains(v) && sol.tightness(v) == 0 {
            sol.add(v);
            added += 1;
        }
    }
    added
}
