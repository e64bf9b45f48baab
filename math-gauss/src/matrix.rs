//! Dense rectangular matrix used both for augmented systems and solutions
//!
//! A [`Matrix`] owns its storage: cloning it produces an independent copy,
//! which is how each solver gets a private working buffer.

use crate::error::{GaussError, Result};
use ndarray::{Array1, Array2, Axis};
use std::ops::{Index, IndexMut};
use std::time::Duration;

/// Owned, bounds-checked matrix of `f64` values.
///
/// Holds either an augmented system (`height = n`, `width = n + 1`) or a
/// solution row vector (`height = 1`, `width = n`).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Array2<f64>,
    /// Set when the matrix could not be populated from its source
    pub error_flag: bool,
    /// Wall-clock time of the sequential solve that produced this matrix
    pub sequential_duration: Duration,
    /// Wall-clock time of the parallel solve that produced this matrix
    pub parallel_duration: Duration,
}

impl Matrix {
    /// Zero-filled matrix of the given shape
    pub fn zeros(height: usize, width: usize) -> Self {
        Self::from_array(Array2::zeros((height, width)))
    }

    /// Wrap an existing array
    pub fn from_array(data: Array2<f64>) -> Self {
        Self {
            data,
            error_flag: false,
            sequential_duration: Duration::ZERO,
            parallel_duration: Duration::ZERO,
        }
    }

    /// Build a `1 x n` row vector from solution values
    pub fn row_vector(values: &Array1<f64>) -> Self {
        Self::from_array(values.clone().insert_axis(Axis(0)))
    }

    /// The 1x1 zero placeholder substituted for input that failed to load
    pub fn degenerate() -> Self {
        let mut m = Self::zeros(1, 1);
        m.error_flag = true;
        m
    }

    /// Parse an augmented system from text rows.
    ///
    /// The first row holds the equation count `n`; each of the next `n` rows
    /// holds `n + 1` values separated by `;`.
    pub fn parse<I, S>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows = rows.into_iter();

        let first = rows.next().ok_or_else(|| GaussError::InvalidHeight {
            line: String::new(),
        })?;
        let first = first.as_ref().trim();
        let height: usize = first.parse().map_err(|_| GaussError::InvalidHeight {
            line: first.to_string(),
        })?;
        let width = height
            .checked_add(1)
            .ok_or_else(|| GaussError::InvalidHeight {
                line: first.to_string(),
            })?;

        // Grows with the rows actually present, not the declared count.
        let mut values: Vec<f64> = Vec::new();
        for i in 0..height {
            let line = rows.next().ok_or(GaussError::MissingRow { row: i })?;
            let line = line.as_ref().trim();
            let mut tokens: Vec<&str> = line.split(';').map(str::trim).collect();
            while tokens.last().is_some_and(|t| t.is_empty()) {
                tokens.pop();
            }

            if tokens.len() < width {
                return Err(GaussError::ShortRow {
                    row: i,
                    expected: width,
                    got: tokens.len(),
                });
            }
            if tokens.len() > width {
                log::debug!(
                    "row {} has {} values, ignoring the last {}",
                    i,
                    tokens.len(),
                    tokens.len() - width
                );
            }

            for (j, token) in tokens.iter().take(width).enumerate() {
                values.push(token.parse().map_err(|_| GaussError::InvalidToken {
                    row: i,
                    column: j,
                    token: token.to_string(),
                })?);
            }
        }

        let data = Array2::from_shape_vec((height, width), values)
            .map_err(|_| GaussError::DimensionMismatch { height, width })?;
        Ok(Self::from_array(data))
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// `true` when the shape is `n x (n + 1)`
    pub fn is_augmented(&self) -> bool {
        self.width() == self.height() + 1
    }

    /// Underlying array
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}

impl Index<[usize; 2]> for Matrix {
    type Output = f64;

    fn index(&self, index: [usize; 2]) -> &f64 {
        &self.data[index]
    }
}

impl IndexMut<[usize; 2]> for Matrix {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut f64 {
        &mut self.data[index]
    }
}
