//! src/diversify.rs
//!
//! Iterated local search: een perturbatie dwingt een paar willekeurige knopen
//! in de oplossing (hun buren in `S` verdwijnen), waarna de lokale zoektocht
//! de schade repareert. Valt het resultaat lichter uit dan de start, dan wordt
//! via het journaal teruggerold. Het gewicht van een lid daalt dus nooit.

use crate::{
    neighbour::{Convergence, LocalSearch},
    solution::Solution,
    stop::StopSignal,
};
use rand::Rng;

/// Maximaal aantal pogingen om een knoop buiten `S` te trekken.
const DRAW_ATTEMPTS: usize = 8;

/// Resultaat van één ILS-stap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IlsOutcome {
    /// Het gewicht is strikt gestegen.
    pub improved: bool,
    /// De lokale zoektocht werd onderbroken.
    pub interrupted: bool,
}

/// Forceert `1..=strength` willekeurige knopen buiten `S` in de oplossing.
///
/// Na afloop is `sol` weer onafhankelijk; alle aangeraakte buurten staan op de
/// werklijst van `ls`. Geeft het aantal geforceerde knopen terug.
pub fn force_random<R>(
    sol: &mut Solution<'_>,
    ls: &mut LocalSearch,
    rng: &mut R,
    strength: usize,
) -> usize
where
    R: Rng + ?Sized,
{
    let graph = sol.graph();
    let n = graph.n();
    if n == 0 || sol.size() == n {
        return 0;
    }

    let k = rng.gen_range(1..=strength.max(1));
    let mut forced = 0;
    for _ in 0..k {
        let Some(v) = (0..DRAW_ATTEMPTS)
            .map(|_| rng.gen_range(0..n))
            .find(|&v| !sol.contains(v))
        else {
            continue;
        };

        for &u in graph.neighbours(v) {
            let u = u as usize;
            if sol.contains(u) {
                sol.remove(u);
                ls.enqueue_around(graph, u);
            }
        }
        sol.add(v);
        ls.enqueue_around(graph, v);
        forced += 1;
    }
    forced
}

/// Eén perturbatie-plus-reparatiestap met terugrollen bij verslechtering.
pub fn ils_step<R>(
    sol: &mut Solution<'_>,
    ls: &mut LocalSearch,
    rng: &mut R,
    stop: &mut StopSignal,
    strength: usize,
) -> IlsOutcome
where
    R: Rng + ?Sized,
{
    let before = sol.weight();
    sol.commit();
    let cp = sol.checkpoint();

    force_random(sol, ls, rng, strength);
    let convergence = ls.run(sol, rng, stop);

    if sol.weight() < before {
        sol.rollback(cp);
    }
    sol.commit();

    IlsOutcome {
        improved: sol.weight() > before,
        interrupted: convergence == Convergence::Interrupted,
    }
}
