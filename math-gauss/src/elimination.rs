//! Gaussian elimination with partial pivoting
//!
//! One implementation serves both solvers. Pivot search, pivot-row swap and
//! the back-substitution dot product always go through the
//! [`RegionExecutor`]; the row reduction below the pivot does so only when
//! `parallel_rows` is set, and otherwise runs in row order on the caller.

use crate::parallel::RegionExecutor;
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut1, Axis, s};

/// Bookkeeping from the forward elimination phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EliminationStats {
    /// Stages skipped because the best available pivot was exactly zero
    pub omitted_rows: usize,
    /// Row chosen as pivot at each stage, before the swap
    pub pivot_rows: Vec<usize>,
}

impl EliminationStats {
    /// `true` if any stage met a zero pivot
    pub fn degenerate(&self) -> bool {
        self.omitted_rows > 0
    }
}

/// Index of the row in `stage..n` with the largest magnitude in column
/// `stage`. Equal magnitudes resolve to the lowest row index.
pub fn find_pivot<E: RegionExecutor>(a: ArrayView2<'_, f64>, stage: usize, exec: &E) -> usize {
    let n = a.nrows();
    let column = a.column(stage);
    let start = (stage, column[stage].abs());

    let (row, _) = exec.run_region(
        (stage..n).collect(),
        || start,
        |best, j| {
            let v = column[j].abs();
            if v > best.1 {
                *best = (j, v);
            }
        },
        |best, local| {
            if local.1 > best.1 || (local.1 == best.1 && local.0 < best.0) {
                *best = local;
            }
        },
    );
    row
}

/// Exchange two whole rows, distributing the columns across workers
pub fn swap_rows<E: RegionExecutor>(a: &mut Array2<f64>, r1: usize, r2: usize, exec: &E) {
    if r1 == r2 {
        return;
    }
    let (mut first, mut second) = a.multi_slice_mut((s![r1, ..], s![r2, ..]));
    let pairs: Vec<(&mut f64, &mut f64)> = first.iter_mut().zip(second.iter_mut()).collect();
    exec.run_region(pairs, || (), |_, (x, y)| std::mem::swap(x, y), |_, _| ());
}

/// Forward elimination over an augmented `n x (n + 1)` matrix, in place.
///
/// A stage whose pivot is exactly zero after the swap is counted in
/// [`EliminationStats::omitted_rows`] and left unreduced.
pub fn forward_eliminate<E: RegionExecutor>(
    a: &mut Array2<f64>,
    exec: &E,
    parallel_rows: bool,
) -> EliminationStats {
    let n = a.nrows();
    let mut stats = EliminationStats {
        omitted_rows: 0,
        pivot_rows: Vec::with_capacity(n),
    };

    for i in 0..n {
        let p = find_pivot(a.view(), i, exec);
        stats.pivot_rows.push(p);
        swap_rows(a, i, p, exec);

        let pivot = a[[i, i]];
        if pivot == 0.0 {
            log::debug!("zero pivot at stage {}, row omitted", i);
            stats.omitted_rows += 1;
            continue;
        }

        let (top, mut below) = a.view_mut().split_at(Axis(0), i + 1);
        let pivot_row = top.row(i);
        let pivot_tail = pivot_row.slice(s![i..]);
        let reduce = |row: &mut ArrayViewMut1<f64>| {
            let m = row[i] / pivot;
            row.slice_mut(s![i..]).scaled_add(-m, &pivot_tail);
        };

        if parallel_rows {
            let rows: Vec<ArrayViewMut1<f64>> = below.outer_iter_mut().collect();
            exec.run_region(rows, || (), |_, mut row| reduce(&mut row), |_, _| ());
        } else {
            for mut row in below.outer_iter_mut() {
                reduce(&mut row);
            }
        }
    }

    stats
}

/// Back substitution over an upper-triangular augmented matrix.
///
/// Stages run from the last row upwards; the dot product of each stage is
/// a reduction region.
pub fn back_substitute<E: RegionExecutor>(a: ArrayView2<'_, f64>, exec: &E) -> Array1<f64> {
    let n = a.nrows();
    let mut x = Array1::<f64>::zeros(n);

    for i in (0..n).rev() {
        let row = a.row(i);
        let solved = &x;
        let sum = exec.run_region(
            ((i + 1)..n).collect(),
            || 0.0,
            |acc, k| *acc += row[k] * solved[k],
            |acc, local| *acc += local,
        );
        x[i] = (a[[i, n]] - sum) / a[[i, i]];
    }

    x
}

/// Eliminate and back-substitute, returning the solution and stage stats
pub fn eliminate_and_solve<E: RegionExecutor>(
    a: &mut Array2<f64>,
    exec: &E,
    parallel_rows: bool,
) -> (Array1<f64>, EliminationStats) {
    let stats = forward_eliminate(a, exec, parallel_rows);
    let x = back_substitute(a.view(), exec);
    (x, stats)
}
