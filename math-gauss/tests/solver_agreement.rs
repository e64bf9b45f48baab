//! Sequential and parallel solvers must agree
//!
//! Forward elimination is bit-identical on both paths, so pivot choices and
//! omitted-row counts match exactly; only the back-substitution sums may
//! differ by rounding.

use approx::assert_relative_eq;
use math_gauss::elimination::{find_pivot, forward_eliminate};
use math_gauss::{
    AppConfig, ForkJoin, Inline, Matrix, MenuState, ParallelConfig, SchedulePolicy, solve_both,
    solve_parallel, solve_sequential,
};
use ndarray::{Array2, array};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random diagonally dominant system with known solution `x[i] = i + 1`
fn dominant_system(n: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            a[[i, j]] = rng.random_range(-1.0..1.0);
        }
        a[[i, i]] += n as f64;
    }
    for i in 0..n {
        a[[i, n]] = (0..n).map(|j| a[[i, j]] * (j + 1) as f64).sum();
    }
    Matrix::from_array(a)
}

/// Small integers: many pivot ties and frequent singular stages
fn integer_system(n: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = Array2::from_shape_fn((n, n + 1), |_| rng.random_range(-2i32..=2) as f64);
    Matrix::from_array(a)
}

fn configs() -> Vec<ParallelConfig> {
    let mut out = Vec::new();
    for schedule in SchedulePolicy::ALL {
        for (chunk, workers) in [(1, 2), (4, 3), (100, 8), (2, 5)] {
            let mut config = ParallelConfig::new(schedule, chunk, workers).unwrap();
            out.push(config.clone());
            config.set_parallel_elimination(true);
            out.push(config);
        }
    }
    out
}

#[test]
fn solutions_agree_across_configurations() {
    let input = dominant_system(60, 11);
    let seq = solve_sequential(&input).unwrap();
    assert!(!seq.degenerate());
    for (i, xi) in seq.x.iter().enumerate() {
        assert_relative_eq!(*xi, (i + 1) as f64, max_relative = 1e-9);
    }

    for config in configs() {
        let par = solve_parallel(&input, &config).unwrap();
        assert!(!par.degenerate());
        assert_eq!(par.pivot_rows, seq.pivot_rows, "{config}");
        for (a, b) in seq.x.iter().zip(par.x.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-9, epsilon = 1e-12);
        }
    }
}

#[test]
fn pivot_choices_and_omitted_rows_agree() {
    for seed in 0..20 {
        let input = integer_system(12, seed);
        let seq = solve_sequential(&input).unwrap();
        for config in configs() {
            let par = solve_parallel(&input, &config).unwrap();
            assert_eq!(par.pivot_rows, seq.pivot_rows, "seed {seed}, {config}");
            assert_eq!(par.omitted_rows, seq.omitted_rows, "seed {seed}, {config}");
            assert_eq!(par.degenerate(), seq.degenerate());
        }
    }
}

#[test]
fn pivot_search_matches_at_every_stage() {
    let input = integer_system(16, 99);
    let config = ParallelConfig::new(SchedulePolicy::Guided, 1, 4).unwrap();
    let exec = ForkJoin::new(&config).unwrap();

    let mut a = input.data().clone();
    for stage in 0..a.nrows() {
        assert_eq!(
            find_pivot(a.view(), stage, &exec),
            find_pivot(a.view(), stage, &Inline),
            "stage {stage}"
        );
        // Advance by one stage on the inline path.
        let p = find_pivot(a.view(), stage, &Inline);
        if p != stage {
            for k in 0..a.ncols() {
                a.swap([stage, k], [p, k]);
            }
        }
        let pivot = a[[stage, stage]];
        if pivot != 0.0 {
            for j in stage + 1..a.nrows() {
                let m = a[[j, stage]] / pivot;
                for k in stage..a.ncols() {
                    let delta = m * a[[stage, k]];
                    a[[j, k]] -= delta;
                }
            }
        }
    }
}

#[test]
fn row_reduction_toggle_is_bit_identical() {
    let input = dominant_system(40, 5);
    let config = ParallelConfig::new(SchedulePolicy::Static, 3, 4).unwrap();
    let exec = ForkJoin::new(&config).unwrap();

    let mut a = input.data().clone();
    let mut b = input.data().clone();
    let sa = forward_eliminate(&mut a, &exec, false);
    let sb = forward_eliminate(&mut b, &exec, true);
    assert_eq!(a, b);
    assert_eq!(sa, sb);
}

#[test]
fn repeated_solves_are_identical() {
    let input = dominant_system(25, 3);
    let config = ParallelConfig::new(SchedulePolicy::Static, 2, 4).unwrap();
    let first = solve_both(&input, &config).unwrap();
    let second = solve_both(&input, &config).unwrap();
    assert_eq!(first.sequential.x, second.sequential.x);
    assert_eq!(first.degenerate(), second.degenerate());
    for (a, b) in first.parallel.x.iter().zip(second.parallel.x.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12, epsilon = 1e-14);
    }
}

#[test]
fn scenario_two_equations() {
    let input = Matrix::parse(["2", "2;1;3", "1;-1;0"]).unwrap();
    let report = solve_both(&input, &ParallelConfig::default()).unwrap();
    assert!(!report.degenerate());
    let x = &report.solution_matrix();
    assert_relative_eq!(x[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(x[[0, 1]], 1.0, epsilon = 1e-12);
}

#[test]
fn scenario_unopenable_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = MenuState::new(AppConfig {
        input: dir.path().join("absent.csv"),
        log_path: dir.path().join("DataLog.txt"),
        ..AppConfig::default()
    });
    state.read_input();
    let m = state.matrix.as_ref().unwrap();
    assert!(m.error_flag);
    assert_eq!((m.height(), m.width()), (1, 1));
    assert!(solve_both(m, &ParallelConfig::default()).is_err());
}

#[test]
fn scenario_zero_leading_column() {
    let input = Matrix::from_array(array![
        [0.0, 1.0, 2.0, 3.0],
        [0.0, 2.0, 1.0, 3.0],
        [0.0, 1.0, 1.0, 2.0]
    ]);
    let report = solve_both(&input, &ParallelConfig::default()).unwrap();
    assert!(report.degenerate());
    assert!(report.sequential.omitted_rows >= 1);
    assert_eq!(report.sequential.omitted_rows, report.parallel.omitted_rows);
}

#[test]
fn scenario_single_worker_matches_sequential() {
    let input = dominant_system(30, 17);
    let seq = solve_sequential(&input).unwrap();
    for schedule in SchedulePolicy::ALL {
        let mut config = ParallelConfig::new(schedule, 3, 1).unwrap();
        config.set_parallel_elimination(true);
        let par = solve_parallel(&input, &config).unwrap();
        assert_eq!(par.x, seq.x, "{schedule}");
    }
}

#[test]
fn timings_are_recorded() {
    let input = dominant_system(20, 1);
    let report = solve_both(&input, &ParallelConfig::default()).unwrap();
    let m = report.solution_matrix();
    assert_eq!(m.sequential_duration, report.sequential.elapsed);
    assert_eq!(m.parallel_duration, report.parallel.elapsed);
}
