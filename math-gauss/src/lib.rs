//! Dense Gaussian elimination, sequential and fork-join parallel
//!
//! This crate solves `n x (n + 1)` augmented linear systems by Gaussian
//! elimination with partial pivoting. Every solve runs twice on independent
//! copies of the input: once on the calling thread and once on a rayon pool
//! shaped by a [`ParallelConfig`], so the two strategies can be timed
//! against each other.
//!
//! # Features
//!
//! - **One algorithm, two executors**: [`elimination`] is written against
//!   [`RegionExecutor`]; [`Inline`] and [`ForkJoin`] provide the two paths
//! - **Work sharing**: static, dynamic, guided and automatic schedules with
//!   a configurable chunk size and worker count
//! - **Degenerate systems**: zero pivots are counted and flagged instead of
//!   aborting the solve
//! - **Plumbing**: `;`-delimited file I/O, JSON configuration, an append-only
//!   run log and a terminal-free menu dispatcher
//!
//! # Example
//!
//! ```
//! use math_gauss::{Matrix, ParallelConfig, solve_both};
//!
//! let system = Matrix::parse(["2", "2;1;3", "1;-1;0"]).unwrap();
//! let report = solve_both(&system, &ParallelConfig::default()).unwrap();
//! assert!(!report.degenerate());
//! assert!((report.parallel.x[0] - 1.0).abs() < 1e-12);
//! ```

pub mod config;
pub mod elimination;
pub mod error;
pub mod io;
pub mod matrix;
pub mod menu;
pub mod parallel;
pub mod run_log;
pub mod solver;

pub use config::{AppConfig, Overrides};
pub use elimination::EliminationStats;
pub use error::{GaussError, Result};
pub use matrix::Matrix;
pub use menu::{MenuState, Prompt, Reply};
pub use parallel::{ForkJoin, Inline, ParallelConfig, RegionExecutor, SchedulePolicy};
pub use run_log::RunLog;
pub use solver::{Solution, SolveReport, solve_both, solve_parallel, solve_sequential};
