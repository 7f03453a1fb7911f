// tests/common/mod.rs
//! Gedeelde hulpfuncties voor de integratietests.

#![allow(dead_code)]

use chils::{BestRecord, Graph, Solver};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Erdős–Rényi graaf G(n, p) met gewichten in `1..=max_weight`.
pub fn random_solver(n: usize, p: f64, max_weight: u64, seed: u64) -> Solver {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut s = Solver::new();
    for _ in 0..n {
        s.add_vertex(rng.gen_range(1..=max_weight)).unwrap();
    }
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen_bool(p) {
                s.add_edge(u, v).unwrap();
            }
        }
    }
    s
}

/// Controleert dat het record een onafhankelijke verzameling met het juiste gewicht is.
pub fn assert_valid(graph: &Graph, best: &BestRecord) {
    let members: Vec<usize> = best.vertices().collect();
    for &u in &members {
        for &v in graph.neighbours(u) {
            assert!(
                best.contains(v as usize) != Some(true),
                "vertices {} and {} are adjacent",
                u,
                v
            );
        }
    }
    let weight: u64 = members.iter().map(|&v| graph.weight(v)).sum();
    assert_eq!(weight, best.weight());
    assert_eq!(members.len(), best.size());
}
