//! Delimited text files for systems and solutions
//!
//! Input: a line with the equation count `n`, then `n` lines of `n + 1`
//! values separated by `;`. Output: a line with the matrix width, then one
//! line per row with values printed to 6 decimals, then an empty line.

use crate::error::{GaussError, Result};
use crate::matrix::Matrix;
use ndarray::Array2;
use std::ffi::OsString;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GaussError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an augmented system from `path`
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let matrix = Matrix::parse(text.lines())?;
    log::info!(
        "read {}: {} equations",
        path.display(),
        matrix.height()
    );
    Ok(matrix)
}

/// Render a matrix in the output layout
pub fn format_matrix(matrix: &Matrix) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", matrix.width());
    for row in matrix.data().rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        let _ = writeln!(out, "{}", line.join(";"));
    }
    out.push('\n');
    out
}

/// `<base>_<sequential seconds>_<parallel seconds>.csv`
pub fn output_path(base: impl AsRef<Path>, sequential: Duration, parallel: Duration) -> PathBuf {
    let mut name = OsString::from(base.as_ref().as_os_str());
    name.push(format!(
        "_{:.6}_{:.6}.csv",
        sequential.as_secs_f64(),
        parallel.as_secs_f64()
    ));
    PathBuf::from(name)
}

/// Write a solution next to `base`, naming the file after its durations.
/// Returns the path written.
pub fn write_solution(base: impl AsRef<Path>, solution: &Matrix) -> Result<PathBuf> {
    let path = output_path(
        base,
        solution.sequential_duration,
        solution.parallel_duration,
    );
    fs::write(&path, format_matrix(solution)).map_err(|source| GaussError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Parse the output layout back into a matrix
pub fn parse_solution<I, S>(lines: I) -> Result<Matrix>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let first = lines.next().ok_or_else(|| GaussError::InvalidHeight {
        line: String::new(),
    })?;
    let first = first.as_ref().trim();
    let width: usize = first.parse().map_err(|_| GaussError::InvalidHeight {
        line: first.to_string(),
    })?;

    let mut values: Vec<f64> = Vec::new();
    let mut height = 0;
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split(';').map(str::trim).collect();
        if tokens.len() != width {
            return Err(GaussError::ShortRow {
                row: height,
                expected: width,
                got: tokens.len(),
            });
        }
        for (column, token) in tokens.iter().enumerate() {
            values.push(token.parse().map_err(|_| GaussError::InvalidToken {
                row: height,
                column,
                token: token.to_string(),
            })?);
        }
        height += 1;
    }

    let data = Array2::from_shape_vec((height, width), values).map_err(|_| {
        GaussError::DimensionMismatch { height, width }
    })?;
    Ok(Matrix::from_array(data))
}

/// Read a solution file written by [`write_solution`]
pub fn read_solution(path: impl AsRef<Path>) -> Result<Matrix> {
    let text = read_text(path.as_ref())?;
    parse_solution(text.lines())
}
