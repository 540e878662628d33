//! Jonker-Volgenant against exhaustive enumeration
//!
//! Small instances are solved by enumerating every partial matching; the
//! sparse solver must reach the same objective on each of them.

mod helpers;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sparse_lap_tracker::{
    AlternativeCostPolicy, AssignmentSolver, JonkerVolgenant, LapProblem, SparseCostMatrix,
};

use helpers::assertions::{assert_valid_assignment, brute_force_objective};

const TOLERANCE: f64 = 1e-9;

fn assert_optimal(problem: &LapProblem) {
    let assignment = JonkerVolgenant.solve(problem).expect("solvable");
    assert_valid_assignment(problem, &assignment);

    let expected = brute_force_objective(problem);
    assert!(
        (assignment.objective - expected).abs() < TOLERANCE,
        "objective {} but brute force found {} for {:?}",
        assignment.objective,
        expected,
        problem
    );
}

/// Sparse instance with `density` chance of each entry being a candidate
fn random_problem(rng: &mut StdRng, n_rows: usize, n_cols: usize, density: f64) -> LapProblem {
    let rows = (0..n_rows)
        .map(|_| {
            (0..n_cols)
                .filter_map(|j| rng.gen_bool(density).then(|| (j, rng.gen_range(0.0..10.0))))
                .collect()
        })
        .collect();
    let matrix = SparseCostMatrix::from_rows(n_cols, rows).unwrap();
    let row_alternative = rng.gen_range(0.5..8.0);
    let col_alternative = rng.gen_range(0.5..8.0);
    LapProblem::with_alternatives(matrix, row_alternative, col_alternative)
}

#[test]
fn test_dense_three_by_three() {
    let rows = vec![
        vec![(0, 4.0), (1, 1.0), (2, 3.0)],
        vec![(0, 2.0), (1, 0.0), (2, 5.0)],
        vec![(0, 3.0), (1, 2.0), (2, 2.0)],
    ];
    let problem =
        LapProblem::with_alternatives(SparseCostMatrix::from_rows(3, rows).unwrap(), 100.0, 100.0);

    let assignment = JonkerVolgenant.solve(&problem).unwrap();

    assert_eq!(assignment.num_matched(), 3);
    assert!((assignment.total_cost - 5.0).abs() < TOLERANCE);
    assert_optimal(&problem);
}

#[test]
fn test_random_small_instances() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        let n_rows = rng.gen_range(0..=5);
        let n_cols = rng.gen_range(0..=5);
        let density = rng.gen_range(0.2..1.0);
        let problem = random_problem(&mut rng, n_rows, n_cols, density);
        assert_optimal(&problem);
    }
}

#[test]
fn test_random_instances_with_derived_alternatives() {
    let mut rng = StdRng::seed_from_u64(7);
    let policies = [
        AlternativeCostPolicy::linking_default(),
        AlternativeCostPolicy::segment_default(),
        AlternativeCostPolicy::Fixed(3.0),
    ];
    for policy in policies {
        for _ in 0..100 {
            let fixed = random_problem(&mut rng, 4, 5, 0.5);
            let problem = LapProblem::new(fixed.matrix, policy);
            assert_optimal(&problem);
        }
    }
}

#[test]
fn test_random_instances_with_ties() {
    // Integer costs make equal-cost optima common
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..200 {
        let rows = (0..4)
            .map(|_| {
                (0..4)
                    .filter_map(|j| rng.gen_bool(0.6).then(|| (j, rng.gen_range(0..4) as f64)))
                    .collect()
            })
            .collect();
        let problem =
            LapProblem::with_alternatives(SparseCostMatrix::from_rows(4, rows).unwrap(), 2.0, 2.0);
        assert_optimal(&problem);

        let first = JonkerVolgenant.solve(&problem).unwrap();
        let second = JonkerVolgenant.solve(&problem).unwrap();
        assert_eq!(first, second);
    }
}
