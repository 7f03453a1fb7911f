// tests/scenarios.rs
//! Eind-tot-eind scenario's via de publieke `Solver`-API.

mod common;

use approx::assert_relative_eq;
use chils::{Params, RunState, Solver, SolverError, StopReason};
use common::{assert_valid, init_logging, random_solver};
use std::time::{Duration, Instant};

fn triangle_solver() -> Solver {
    let mut s = Solver::new();
    assert_eq!(s.add_vertex(10).unwrap(), 0);
    assert_eq!(s.add_vertex(10).unwrap(), 1);
    assert_eq!(s.add_vertex(20).unwrap(), 2);
    s.add_edge(0, 1).unwrap();
    s.add_edge(0, 2).unwrap();
    s
}

#[test]
fn test_triangle_full_run_finds_optimum() {
    init_logging();
    let mut s = triangle_solver();
    s.run_full(0.2, 4, 0).unwrap();
    assert_eq!(s.solution_weight(), 30);
    assert_eq!(s.solution_size(), 2);
    assert_eq!(s.solution_vertex_configuration(0), Ok(0));
    assert_eq!(s.solution_vertex_configuration(1), Ok(1));
    assert_eq!(s.solution_vertex_configuration(2), Ok(1));
    assert_eq!(s.state(), RunState::Terminal);
    assert_eq!(s.stop_reason(), Some(StopReason::TimeLimit));
}

#[test]
fn test_triangle_local_search_only_finds_optimum() {
    let mut s = triangle_solver();
    s.run_local_search_only(0.1, 7).unwrap();
    assert_eq!(s.solution_weight(), 30);
    assert_valid(s.graph(), s.best());
}

#[test]
fn test_empty_graph_yields_empty_solution() {
    for time_limit in [0.0, 5.0] {
        let mut s = Solver::new();
        let started = Instant::now();
        s.run_full(time_limit, 3, 1).unwrap();
        assert_eq!(s.solution_weight(), 0);
        assert_eq!(s.solution_size(), 0);
        assert!(started.elapsed() < Duration::from_secs(2));

        let mut s = Solver::new();
        s.run_local_search_only(time_limit, 1).unwrap();
        assert_eq!(s.solution_weight(), 0);
    }
}

#[test]
fn test_two_disjoint_edges() {
    let mut s = Solver::new();
    for _ in 0..4 {
        s.add_vertex(5).unwrap();
    }
    s.add_edge(0, 1).unwrap();
    s.add_edge(2, 3).unwrap();
    s.run_full(0.1, 2, 3).unwrap();
    assert_eq!(s.solution_weight(), 10);
    assert_eq!(s.solution_size(), 2);
    let picked: u8 = (0..2).map(|v| s.solution_vertex_configuration(v).unwrap()).sum();
    assert_eq!(picked, 1);
}

#[test]
fn test_zero_time_limit_terminates_quickly() {
    let mut s = random_solver(300, 0.05, 50, 2);
    let started = Instant::now();
    s.run_full(0.0, 4, 0).unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_valid(s.graph(), s.best());
    // Full-modus doet altijd een greedy constructie.
    assert!(s.solution_weight() > 0);

    let mut s = random_solver(300, 0.05, 50, 2);
    s.run_local_search_only(0.0, 0).unwrap();
    assert_valid(s.graph(), s.best());
}

#[test]
fn test_random_graphs_give_independent_sets() {
    for seed in 0..6 {
        let mut s = random_solver(120, 0.08, 100, seed);
        let mut p = Params::with_run(5.0, 4, seed);
        p.limit_rounds(3);
        s.run_full_with(&p).unwrap();
        assert_valid(s.graph(), s.best());

        let mut s = random_solver(120, 0.08, 100, seed);
        s.run_local_search_only_with(&p).unwrap();
        assert_valid(s.graph(), s.best());
    }
}

#[test]
fn test_best_weight_history_is_monotone() {
    let mut s = random_solver(400, 0.03, 1000, 11);
    s.run_full(0.3, 6, 5).unwrap();
    let history = s.history();
    assert!(!history.is_empty());
    for w in history.windows(2) {
        assert!(w[0].1 < w[1].1, "weights must strictly increase");
        assert!(w[0].0 <= w[1].0, "times must not go backwards");
    }
    let (last_time, last_weight) = *history.last().unwrap();
    assert_eq!(last_weight, s.solution_weight());
    assert_relative_eq!(last_time, s.solution_time());
    assert!(s.solution_time() <= 0.3 + 1.0);
}

#[test]
fn test_fixed_seed_reproduces_weight() {
    let run = |full: bool| {
        let mut s = random_solver(200, 0.05, 100, 21);
        let mut p = Params::with_run(60.0, 4, 99);
        p.limit_rounds(4);
        if full {
            s.run_full_with(&p).unwrap();
        } else {
            s.run_local_search_only_with(&p).unwrap();
        }
        assert_eq!(s.stop_reason(), Some(StopReason::RoundLimit));
        s.solution_weight()
    };
    assert_eq!(run(true), run(true));
    assert_eq!(run(false), run(false));
}

#[test]
fn test_duplicate_edges_do_not_change_result() {
    let build = |dupes: bool| {
        let mut s = Solver::new();
        for w in [3, 4, 5, 6] {
            s.add_vertex(w).unwrap();
        }
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0)];
        for &(u, v) in &edges {
            s.add_edge(u, v).unwrap();
            if dupes {
                s.add_edge(v, u).unwrap();
                s.add_edge(u, v).unwrap();
            }
        }
        s.run_full(0.05, 2, 0).unwrap();
        assert_eq!(s.graph().m(), 4);
        s.solution_weight()
    };
    // Cykel van vier: {1, 3} weegt 10, {0, 2} weegt 8.
    assert_eq!(build(false), 10);
    assert_eq!(build(true), 10);
}

#[test]
fn test_self_loops_are_rejected() {
    let mut s = Solver::new();
    s.add_vertex(1).unwrap();
    s.add_vertex(1).unwrap();
    assert_eq!(s.add_edge(1, 1), Err(SolverError::SelfLoop { vertex: 1 }));
    s.run_local_search_only(0.05, 0).unwrap();
    assert_eq!(s.solution_weight(), 2);
}

#[test]
fn test_contract_violations_are_reported() {
    let mut s = Solver::new();
    s.add_vertex(1).unwrap();
    assert_eq!(
        s.add_edge(0, 5),
        Err(SolverError::VertexOutOfRange { vertex: 5, n: 1 })
    );
    assert_eq!(s.run_full(1.0, 0, 0), Err(SolverError::InvalidPopulation));
    assert!(matches!(
        s.run_local_search_only(-1.0, 0),
        Err(SolverError::InvalidTimeLimit(_))
    ));
    s.run_local_search_only(0.01, 0).unwrap();
    assert_eq!(s.run_full(0.01, 1, 0), Err(SolverError::AlreadyTerminated));
    assert_eq!(s.add_vertex(1), Err(SolverError::GraphFrozen));
    assert_eq!(s.solution_weight(), 1);
}

#[test]
fn test_stop_handle_cancels_only_its_own_run() {
    let mut a = random_solver(2000, 0.004, 100, 4);
    let mut b = random_solver(50, 0.1, 10, 5);
    let handle = a.stop_handle();
    std::thread::scope(|scope| {
        let worker = scope.spawn(|| a.run_full(600.0, 4, 1));
        std::thread::sleep(Duration::from_millis(50));
        b.run_full(0.1, 2, 0).unwrap();
        handle.stop();
        handle.stop();
        worker.join().unwrap().unwrap();
    });
    assert_eq!(a.stop_reason(), Some(StopReason::Cancelled));
    assert_valid(a.graph(), a.best());
    assert_eq!(b.stop_reason(), Some(StopReason::TimeLimit));
}

#[test]
fn test_metis_instance_runs_end_to_end() {
    // Pad 1-2-3-4-5 met gewichten; optimum {1, 3, 5} = 2 + 9 + 2 of {2, 4} = 7 + 7.
    let input = "% pad\n5 4 10\n2 2\n7 1 3\n9 2 4\n7 3 5\n2 4\n";
    let graph = chils::Graph::parse_metis(input.as_bytes()).unwrap();
    let mut s = Solver::from_graph(graph);
    s.run_full(0.1, 4, 0).unwrap();
    assert_eq!(s.solution_weight(), 14);
    assert_valid(s.graph(), s.best());
}

#[test]
fn test_heavy_weights_are_bounded_by_total() {
    let mut s = Solver::new();
    s.add_vertex(u64::MAX / 2).unwrap();
    s.add_vertex(u64::MAX / 2).unwrap();
    assert!(matches!(
        s.add_vertex(2),
        Err(SolverError::WeightOverflow { weight: 2, .. })
    ));
    assert_eq!(s.graph().n(), 2);
    s.run_local_search_only(0.05, 0).unwrap();
    assert_eq!(s.solution_weight(), u64::MAX - 1);
    assert_eq!(s.stop_reason(), Some(StopReason::UpperBoundReached));
}

#[test]
fn test_reused_members_stay_independent_across_rounds() {
    // Veel rondes met kleine populatie: kinderen en vervangen leden worden hergebruikt.
    for seed in 0..4 {
        let mut s = random_solver(150, 0.06, 100, 30 + seed);
        let mut p = Params::with_run(60.0, 4, seed);
        p.limit_rounds(12);
        s.run_full_with(&p).unwrap();
        assert_valid(s.graph(), s.best());
        let (_, last_weight) = *s.history().last().unwrap();
        assert_eq!(last_weight, s.solution_weight());
    }
}
