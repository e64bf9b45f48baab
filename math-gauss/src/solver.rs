//! Sequential and parallel solvers, and the paired run that compares them
//!
//! Each solver works on its own copy of the input. [`solve_both`] runs the
//! sequential solver and then the parallel one on a second copy of the same
//! input, and reports both wall-clock times.

use crate::elimination::eliminate_and_solve;
use crate::error::{GaussError, Result};
use crate::matrix::Matrix;
use crate::parallel::{ForkJoin, Inline, ParallelConfig};
use ndarray::Array1;
use std::fmt;
use std::time::{Duration, Instant};

/// Result of one solver run
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution vector
    pub x: Array1<f64>,
    /// Wall-clock time of elimination and back substitution
    pub elapsed: Duration,
    /// Number of stages skipped on a zero pivot
    pub omitted_rows: usize,
    /// Pivot row chosen at each stage
    pub pivot_rows: Vec<usize>,
}

impl Solution {
    /// `true` if some stage met a zero pivot; the values are then unreliable
    pub fn degenerate(&self) -> bool {
        self.omitted_rows > 0
    }
}

/// Both runs of a [`solve_both`] call
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Sequential baseline
    pub sequential: Solution,
    /// Parallel run; this is the solution handed back to callers
    pub parallel: Solution,
    /// Configuration the parallel run used
    pub config: ParallelConfig,
}

impl SolveReport {
    /// `true` if either run met a zero pivot
    pub fn degenerate(&self) -> bool {
        self.sequential.degenerate() || self.parallel.degenerate()
    }

    /// Parallel solution as a `1 x n` matrix carrying both durations
    pub fn solution_matrix(&self) -> Matrix {
        let mut m = Matrix::row_vector(&self.parallel.x);
        m.sequential_duration = self.sequential.elapsed;
        m.parallel_duration = self.parallel.elapsed;
        m
    }
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequence time: {:.6}, {} rows omitted in sequence part, parallel time: {:.6}, {} rows omitted in parallel part, ",
            self.sequential.elapsed.as_secs_f64(),
            self.sequential.omitted_rows,
            self.parallel.elapsed.as_secs_f64(),
            self.parallel.omitted_rows,
        )?;
        if self.degenerate() {
            f.write_str("...OK - some rows were omitted, so the result is incorrect.")
        } else {
            f.write_str("...OK")
        }
    }
}

/// Run `f` and measure its wall-clock time
pub fn timed<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Reject input that cannot be solved: flagged matrices and shapes other
/// than `n x (n + 1)`.
pub fn check_system(matrix: &Matrix) -> Result<()> {
    if matrix.error_flag {
        return Err(GaussError::InvalidInput);
    }
    if !matrix.is_augmented() {
        return Err(GaussError::DimensionMismatch {
            height: matrix.height(),
            width: matrix.width(),
        });
    }
    Ok(())
}

/// Single-threaded Gaussian elimination on a private copy of `matrix`
pub fn solve_sequential(matrix: &Matrix) -> Result<Solution> {
    check_system(matrix)?;
    let mut work = matrix.data().clone();

    let ((x, stats), elapsed) = timed(|| eliminate_and_solve(&mut work, &Inline, false));

    log::debug!(
        "sequential solve: n={}, {:.6}s, {} rows omitted",
        matrix.height(),
        elapsed.as_secs_f64(),
        stats.omitted_rows
    );
    Ok(Solution {
        x,
        elapsed,
        omitted_rows: stats.omitted_rows,
        pivot_rows: stats.pivot_rows,
    })
}

/// Fork-join Gaussian elimination on a private copy of `matrix`.
///
/// `config` is copied before work starts. The worker pool is built before
/// the timer starts, so `elapsed` covers only the solve itself.
pub fn solve_parallel(matrix: &Matrix, config: &ParallelConfig) -> Result<Solution> {
    check_system(matrix)?;
    let exec = ForkJoin::new(config)?;
    let parallel_rows = exec.config().parallel_elimination();
    let mut work = matrix.data().clone();

    let ((x, stats), elapsed) = timed(|| eliminate_and_solve(&mut work, &exec, parallel_rows));

    log::debug!(
        "parallel solve: n={}, {}, {:.6}s, {} rows omitted",
        matrix.height(),
        exec.config(),
        elapsed.as_secs_f64(),
        stats.omitted_rows
    );
    Ok(Solution {
        x,
        elapsed,
        omitted_rows: stats.omitted_rows,
        pivot_rows: stats.pivot_rows,
    })
}

/// Solve sequentially, then in parallel, on independent copies of `matrix`
pub fn solve_both(matrix: &Matrix, config: &ParallelConfig) -> Result<SolveReport> {
    let config = config.clone();
    check_system(matrix)?;
    config.validate()?;

    let sequential = solve_sequential(matrix)?;
    let parallel = solve_parallel(matrix, &config)?;

    let report = SolveReport {
        sequential,
        parallel,
        config,
    };
    if report.degenerate() {
        log::warn!(
            "{} equations: zero pivot met, result is unreliable ({} / {} rows omitted)",
            matrix.height(),
            report.sequential.omitted_rows,
            report.parallel.omitted_rows
        );
    } else {
        log::info!(
            "{} equations solved: sequential {:.6}s, parallel {:.6}s",
            matrix.height(),
            report.sequential.elapsed.as_secs_f64(),
            report.parallel.elapsed.as_secs_f64()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SchedulePolicy;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn two_by_two() -> Matrix {
        Matrix::from_array(array![[2.0, 1.0, 3.0], [1.0, -1.0, 0.0]])
    }

    #[test]
    fn test_solve_both_two_by_two() {
        let report = solve_both(&two_by_two(), &ParallelConfig::default()).unwrap();
        assert!(!report.degenerate());
        for x in [&report.sequential.x, &report.parallel.x] {
            assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
            assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        }

        let m = report.solution_matrix();
        assert_eq!((m.height(), m.width()), (1, 2));
        assert_eq!(m.sequential_duration, report.sequential.elapsed);
        assert_eq!(m.parallel_duration, report.parallel.elapsed);
        assert!(report.to_string().ends_with("...OK"));
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = two_by_two();
        let before = input.clone();
        solve_both(&input, &ParallelConfig::default()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_flagged_input_is_rejected() {
        let err = solve_sequential(&Matrix::degenerate()).unwrap_err();
        assert!(matches!(err, GaussError::InvalidInput));
        let err = solve_both(&Matrix::degenerate(), &ParallelConfig::default()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let square = Matrix::zeros(3, 3);
        let err = solve_parallel(&square, &ParallelConfig::default()).unwrap_err();
        assert!(err.is_dimension_error());
    }

    #[test]
    fn test_single_worker_is_bit_identical() {
        let input = Matrix::from_array(array![
            [0.3, -1.7, 2.2, 0.9],
            [1.1, 0.4, -0.6, 2.5],
            [-2.3, 0.8, 1.9, -1.2]
        ]);
        let seq = solve_sequential(&input).unwrap();
        for schedule in SchedulePolicy::ALL {
            let config = ParallelConfig::new(schedule, 1, 1).unwrap();
            let par = solve_parallel(&input, &config).unwrap();
            assert_eq!(seq.x, par.x, "{schedule}");
            assert_eq!(seq.pivot_rows, par.pivot_rows);
        }
    }

    #[test]
    fn test_degenerate_report_message() {
        let input = Matrix::from_array(array![
            [2.0, 4.0, 1.0, 7.0],
            [1.0, 2.0, 3.0, 6.0],
            [4.0, 8.0, 6.0, 14.0]
        ]);
        let report = solve_both(&input, &ParallelConfig::default()).unwrap();
        assert!(report.degenerate());
        assert_eq!(report.sequential.omitted_rows, report.parallel.omitted_rows);
        assert!(report.to_string().contains("some rows were omitted"));
    }
}
