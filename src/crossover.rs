//! src/crossover.rs
//!
//! Combinatie van twee oplossingen. De knopen waarop de ouders `A` en `B`
//! verschillen vormen het *disagreement*-gebied `D`; per samenhangende component
//! van `G[D]` neemt het kind de toewijzing over van de ouder die binnen die
//! component het zwaarst is (gelijke stand: muntworp). Omdat een kant tussen twee
//! knopen van `D` altijd binnen één component ligt, blijft het kind onafhankelijk;
//! de reparatiestap controleert dat en verwijdert eventuele conflicten. Tot slot
//! maakt de lokale zoektocht het kind af, beginnend bij `D` en zijn buren.

use crate::{
    neighbour::{Convergence, LocalSearch},
    solution::Solution,
    stop::StopSignal,
};
use bitvec::prelude::*;
use rand::Rng;

/// Wat een combinatie heeft opgeleverd.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrossoverReport {
    /// Grootte van het disagreement-gebied.
    pub disagreement: usize,
    pub components: usize,
    /// Aantal componenten waarvoor `B` gekozen werd.
    pub taken_from_b: usize,
    /// Knopen die de reparatie moest verwijderen.
    pub repaired: usize,
    pub interrupted: bool,
}

/// Bouwt in `child` een kind van `a` en `b`.
///
/// De ouders worden alleen gelezen; `child` wordt volledig overschreven.
pub fn combine<'g, R>(
    a: &Solution<'g>,
    b: &Solution<'g>,
    child: &mut Solution<'g>,
    ls: &mut LocalSearch,
    rng: &mut R,
    stop: &mut StopSignal,
) -> CrossoverReport
where
    R: Rng + ?Sized,
{
    let graph = a.graph();
    let n = graph.n();
    child.assign_from(a);

    let disagreement: Vec<usize> = (0..n).filter(|&v| a.contains(v) != b.contains(v)).collect();
    let mut report = CrossoverReport {
        disagreement: disagreement.len(),
        ..CrossoverReport::default()
    };
    if disagreement.is_empty() {
        return report;
    }

    let mut in_d = bitvec![0; n];
    for &v in &disagreement {
        in_d.set(v, true);
    }
    let mut visited = bitvec![0; n];
    let mut component = Vec::new();
    let mut stack = Vec::new();

    for &root in &disagreement {
        if visited[root] {
            continue;
        }
        // Verzamel de component via DFS binnen `D`.
        component.clear();
        visited.set(root, true);
        stack.push(root);
        while let Some(v) = stack.pop() {
            component.push(v);
            for &u in graph.neighbours(v) {
                let u = u as usize;
                if in_d[u] && !visited[u] {
                    visited.set(u, true);
                    stack.push(u);
                }
            }
        }
        report.components += 1;

        let (mut wa, mut wb) = (0u64, 0u64);
        for &v in &component {
            if a.contains(v) {
                wa += graph.weight(v);
            } else {
                wb += graph.weight(v);
            }
        }
        let take_b = wb > wa || (wb == wa && rng.gen_bool(0.5));
        if take_b {
            report.taken_from_b += 1;
            for &v in &component {
                child.remove(v);
            }
            for &v in &component {
                if b.contains(v) {
                    child.add(v);
                }
            }
        }
    }

    report.repaired = repair(child, &disagreement);

    for &v in &disagreement {
        ls.enqueue_around(graph, v);
    }
    report.interrupted = ls.run(child, rng, stop) == Convergence::Interrupted;
    child.commit();

    log::trace!("crossover: {:?}, child weight {}", report, child.weight());
    report
}

/// Verwijdert knopen uit `candidates` die een buur in `S` hebben.
/// Geeft het aantal verwijderde knopen terug.
pub fn repair(sol: &mut Solution<'_>, candidates: &[usize]) -> usize {
    let mut removed = 0;
    for &v in candidates {
        if sol.contains(v) && sol.tightness(v) > 0 {
            sol.remove(v);
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::Graph, params::Params, stop::StopHandle};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(g: &Graph) -> (LocalSearch, ChaCha8Rng, StopHandle) {
        (
            LocalSearch::new(g.n(), &Params::default()),
            ChaCha8Rng::seed_from_u64(8),
            StopHandle::new(),
        )
    }

    #[test]
    fn test_picks_heavier_side_per_component() {
        // Twee losse paden 0-1 en 2-3. A = {0, 2}, B = {1, 3}.
        let g = Graph::from_edge_list(&[5, 1, 1, 5], &[(0, 1), (2, 3)]).unwrap();
        let mut a = Solution::new(&g);
        a.add(0);
        a.add(2);
        let mut b = Solution::new(&g);
        b.add(1);
        b.add(3);
        let (mut ls, mut rng, handle) = setup(&g);
        let mut stop = StopSignal::unbounded(&handle);
        let mut child = Solution::new(&g);
        let report = combine(&a, &b, &mut child, &mut ls, &mut rng, &mut stop);
        assert_eq!(report.disagreement, 4);
        assert_eq!(report.components, 2);
        assert_eq!(report.repaired, 0);
        assert_eq!(child.vertices().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(child.weight(), 10);
        assert!(child.is_independent());
    }

    #[test]
    fn test_child_is_at_least_as_heavy_as_both_parents() {
        let n = 40;
        let edges: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| [(i, (i + 1) % n), (i, (i + 5) % n)])
            .collect();
        let weights: Vec<u64> = (0..n).map(|i| (i * 13 % 17) as u64 + 1).collect();
        let g = Graph::from_edge_list(&weights, &edges).unwrap();
        let (mut ls, mut rng, handle) = setup(&g);
        let mut stop = StopSignal::unbounded(&handle);

        for round in 0..10 {
            let mut a = Solution::new(&g);
            let mut b = Solution::new(&g);
            ls.enqueue_all(n, &mut rng);
            ls.run(&mut a, &mut rng, &mut stop);
            ls.enqueue_all(n, &mut rng);
            ls.run(&mut b, &mut rng, &mut stop);
            let mut child = Solution::new(&g);
            let report = combine(&a, &b, &mut child, &mut ls, &mut rng, &mut stop);
            assert_eq!(report.repaired, 0, "round {}", round);
            assert!(child.is_independent());
            assert!(child.weight() >= a.weight().max(b.weight()));
        }
    }

    #[test]
    fn test_reused_child_carries_nothing_over() {
        let n = 40;
        let edges: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| [(i, (i + 1) % n), (i, (i + 7) % n)])
            .collect();
        let weights: Vec<u64> = (0..n).map(|i| (i * 11 % 19) as u64 + 1).collect();
        let g = Graph::from_edge_list(&weights, &edges).unwrap();
        let (mut ls, mut rng, handle) = setup(&g);
        let mut stop = StopSignal::unbounded(&handle);

        let mut child = Solution::new(&g);
        for round in 0..12 {
            let mut a = Solution::new(&g);
            let mut b = Solution::new(&g);
            ls.enqueue_all(n, &mut rng);
            ls.run(&mut a, &mut rng, &mut stop);
            ls.enqueue_all(n, &mut rng);
            ls.run(&mut b, &mut rng, &mut stop);
            combine(&a, &b, &mut child, &mut ls, &mut rng, &mut stop);
            assert!(child.is_independent(), "round {}", round);
            assert!(child.weight() >= a.weight().max(b.weight()));
            let weight: u64 = child.vertices().map(|v| g.weight(v)).sum();
            assert_eq!(weight, child.weight());

            // Zelfde ouders: het kind is exact `a`, ongeacht de vorige inhoud.
            combine(&a, &a.clone(), &mut child, &mut ls, &mut rng, &mut stop);
            assert_eq!(child.bitset(), a.bitset(), "round {}", round);
            assert_eq!(child.weight(), a.weight());
        }
    }

    #[test]
    fn test_identical_parents_give_identical_child() {
        let g = Graph::from_edge_list(&[1, 2, 3], &[(0, 1)]).unwrap();
        let mut a = Solution::new(&g);
        a.add(1);
        a.add(2);
        let (mut ls, mut rng, handle) = setup(&g);
        let mut stop = StopSignal::unbounded(&handle);
        let mut child = Solution::new(&g);
        let report = combine(&a, &a.clone(), &mut child, &mut ls, &mut rng, &mut stop);
        assert_eq!(report.disagreement, 0);
        assert_eq!(child.bitset(), a.bitset());
    }

    #[test]
    fn test_repair_removes_conflicts() {
        let g = Graph::from_edge_list(&[1, 1], &[(0, 1)]).unwrap();
        let mut s = Solution::new(&g);
        s.add(0);
        s.add(1);
        assert_eq!(repair(&mut s, &[0, 1]), 1);
        assert!(s.is_independent());
        assert_eq!(s.size(), 1);
    }
}
