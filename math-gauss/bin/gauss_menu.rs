//! Interactive front end for the Gaussian elimination solvers
//!
//! Usage:
//!     cargo run --release --bin gauss-menu -- --input C.csv --workers 4
//!     cargo run --release --bin gauss-menu -- --config gauss.json --once

use anyhow::Context;
use clap::Parser;
use math_gauss::{AppConfig, MenuState, Overrides, Reply, SchedulePolicy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gauss-menu",
    about = "Solve a linear system sequentially and in parallel, and compare the timings"
)]
struct Args {
    /// JSON configuration file (defaults are used for missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Augmented system to read (`n` on the first line, then `n` rows of `n + 1` values)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Base name of the solution file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run log file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Scheduling policy: static, dynamic, guided or auto
    #[arg(long)]
    schedule: Option<SchedulePolicy>,

    /// Number of items handed to a worker at a time
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Also run the row reduction below each pivot in parallel
    #[arg(long)]
    parallel_elimination: bool,

    /// Read, solve and write once, then exit without showing the menu
    #[arg(long)]
    once: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            input: self.input.clone(),
            output_base: self.output.clone(),
            log_path: self.log.clone(),
            schedule: self.schedule,
            chunk_size: self.chunk_size,
            workers: self.workers,
            parallel_elimination: self.parallel_elimination,
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    config
        .apply(&args.overrides())
        .context("invalid command-line option")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    log::info!(
        "input {}, output base {}, {}",
        config.input.display(),
        config.output_base.display(),
        config.parallel
    );

    let mut state = MenuState::new(config);

    if args.once {
        let mut reply = state.solve_and_write();
        state.flush_log(&mut reply);
        println!("{}", reply.message);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("{}", state.prompt_text());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let reply = state.handle(&line?);
        if !reply.message.is_empty() {
            println!("{}", reply.message);
        }
        if reply.exit {
            return Ok(());
        }
    }

    // stdin closed without choosing "exit"
    let mut reply = Reply {
        message: "End of program.".to_string(),
        exit: true,
    };
    state.flush_log(&mut reply);
    println!("{}", reply.message);
    Ok(())
}
