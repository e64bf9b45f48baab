//! Text menu as a command dispatcher
//!
//! [`MenuState`] holds everything the menu touches: the configuration, the
//! last matrix read, the run log and the current prompt. [`MenuState::handle`]
//! takes one line of user input and returns the text to show, so the menu
//! can be driven without a terminal.

use crate::config::AppConfig;
use crate::io::{read_matrix, write_solution};
use crate::matrix::Matrix;
use crate::parallel::{ParallelConfig, SchedulePolicy};
use crate::run_log::RunLog;
use crate::solver::{SolveReport, solve_both};

const INVALID_CHOICE: &str = "Choose a correct value.";

/// What the menu is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Top-level option 1-5
    Main,
    /// Scheduling policy 1-4
    Schedule,
    /// Positive chunk size
    ChunkSize,
    /// Positive worker count
    Workers,
}

/// Text to display after handling one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    /// The user asked to leave
    pub exit: bool,
}

impl Reply {
    fn show(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: false,
        }
    }
}

/// Menu state: configuration, loaded data and the pending prompt
#[derive(Debug)]
pub struct MenuState {
    pub config: AppConfig,
    /// Matrix from the most recent read, if any
    pub matrix: Option<Matrix>,
    /// Report from the most recent solve, if any
    pub last_report: Option<SolveReport>,
    pub log: RunLog,
    prompt: Prompt,
    draft: ParallelConfig,
}

impl MenuState {
    pub fn new(config: AppConfig) -> Self {
        let log = RunLog::new(config.log_path.clone());
        let draft = config.parallel.clone();
        Self {
            config,
            matrix: None,
            last_report: None,
            log,
            prompt: Prompt::Main,
            draft,
        }
    }

    pub fn prompt(&self) -> Prompt {
        self.prompt
    }

    /// Text asking for the next input
    pub fn prompt_text(&self) -> String {
        match self.prompt {
            Prompt::Main => [
                "*******************************",
                "Choose 1 to see the run log:",
                "Choose 2 to exit:",
                "Choose 3 to read a file:",
                "Choose 4 to perform task:",
                "Choose 5 to change parallel execution options:",
            ]
            .join("\n"),
            Prompt::Schedule => {
                let mut lines = vec!["*******************************".to_string()];
                for policy in SchedulePolicy::ALL {
                    lines.push(format!(
                        "Choose {} to set a {} scheduling:",
                        policy.code(),
                        policy
                    ));
                }
                lines.join("\n")
            }
            Prompt::ChunkSize => "Choose size of chunks:".to_string(),
            Prompt::Workers => "Choose a desired number of threads:".to_string(),
        }
    }

    /// Handle one line of input
    pub fn handle(&mut self, input: &str) -> Reply {
        let input = input.trim();
        match self.prompt {
            Prompt::Main => self.handle_main(input),
            Prompt::Schedule => match self.draft.set_schedule_str(input) {
                Ok(()) => {
                    self.prompt = Prompt::ChunkSize;
                    Reply::show("")
                }
                Err(_) => Reply::show(INVALID_CHOICE),
            },
            Prompt::ChunkSize => match parse_count(input).map(|v| self.draft.set_chunk_size(v)) {
                Some(Ok(())) => {
                    self.prompt = Prompt::Workers;
                    Reply::show("")
                }
                _ => Reply::show(INVALID_CHOICE),
            },
            Prompt::Workers => match parse_count(input).map(|v| self.draft.set_workers(v)) {
                Some(Ok(())) => {
                    self.config.parallel = self.draft.clone();
                    self.log.record_config_change(&self.config.parallel);
                    log::info!("parallel options changed: {}", self.config.parallel);
                    self.prompt = Prompt::Main;
                    let mut reply = Reply::show(format!("{}", self.config.parallel));
                    self.flush_log(&mut reply);
                    reply
                }
                _ => Reply::show(INVALID_CHOICE),
            },
        }
    }

    fn handle_main(&mut self, input: &str) -> Reply {
        let mut reply = match input {
            "1" => return self.show_log(),
            "2" => Reply {
                message: "End of program.".to_string(),
                exit: true,
            },
            "3" => {
                let mut reply = self.read_input();
                if self.matrix.as_ref().is_some_and(|m| m.error_flag) {
                    reply.message.push_str("\nError.");
                }
                reply
            }
            "4" => self.solve_and_write(),
            "5" => {
                self.draft = self.config.parallel.clone();
                self.prompt = Prompt::Schedule;
                return Reply::show("");
            }
            _ => return Reply::show(INVALID_CHOICE),
        };
        self.flush_log(&mut reply);
        reply
    }

    fn show_log(&self) -> Reply {
        match self.log.contents() {
            Ok(text) => Reply::show(text),
            Err(_) => Reply::show("Cannot open data files."),
        }
    }

    /// Read the configured input file and keep the matrix
    pub fn read_input(&mut self) -> Reply {
        let path = self.config.input.clone();
        let outcome = read_matrix(&path);
        self.log.record_read(&path, &outcome);
        match outcome {
            Ok(m) => {
                self.matrix = Some(m);
                Reply::show("File reading: OK")
            }
            Err(e) => {
                log::error!("{}", e);
                self.matrix = Some(Matrix::degenerate());
                Reply::show(format!("Cannot read files. {e}"))
            }
        }
    }

    /// Read, solve with both solvers, and write the parallel solution
    pub fn solve_and_write(&mut self) -> Reply {
        let read = self.read_input();
        let Some(matrix) = self.matrix.as_ref() else {
            return read;
        };

        let outcome = solve_both(matrix, &self.config.parallel);
        self.log
            .record_solve(matrix.height(), &self.config.parallel, &outcome);

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                log::error!("{}", e);
                let mut message = read.message;
                if e.is_dimension_error() {
                    message.push_str("\nDimension mismatch. Elimination.");
                } else if e.is_input_error() {
                    message.push_str("\nInput error.");
                }
                message.push_str("\nError.");
                return Reply::show(message);
            }
        };

        let mut lines = vec![
            read.message,
            format!("Sequence time: {:.6}", report.sequential.elapsed.as_secs_f64()),
            format!("Parallel time: {:.6}", report.parallel.elapsed.as_secs_f64()),
        ];
        if report.degenerate() {
            lines.push(
                "Gaussian elimination: OK - some rows were omitted, so the result is incorrect."
                    .to_string(),
            );
        } else {
            lines.push("Gaussian elimination: OK".to_string());
        }

        let written = write_solution(&self.config.output_base, &report.solution_matrix());
        self.log.record_write(&written);
        match written {
            Ok(path) => lines.push(format!("Solution written to {}", path.display())),
            Err(e) => {
                log::error!("{}", e);
                lines.push(format!("Cannot write solution: {e}\nError."));
            }
        }

        self.last_report = Some(report);
        Reply::show(lines.join("\n"))
    }

    /// Append buffered log entries to the log file
    pub fn flush_log(&mut self, reply: &mut Reply) {
        if let Err(e) = self.log.flush() {
            log::warn!("{}", e);
            reply.message.push_str("\nUnable to open file");
        }
    }
}

fn parse_count(input: &str) -> Option<usize> {
    input.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn state_in(dir: &Path) -> MenuState {
        let config = AppConfig {
            input: dir.join("C.csv"),
            output_base: dir.join("X"),
            log_path: dir.join("DataLog.txt"),
            ..AppConfig::default()
        };
        MenuState::new(config)
    }

    #[test]
    fn test_invalid_main_choice() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        for input in ["", "0", "6", "abc"] {
            let reply = state.handle(input);
            assert_eq!(reply.message, INVALID_CHOICE);
            assert!(!reply.exit);
            assert_eq!(state.prompt(), Prompt::Main);
        }
    }

    #[test]
    fn test_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let reply = state.handle("2");
        assert!(reply.exit);
        assert_eq!(reply.message, "End of program.");
    }

    #[test]
    fn test_change_options_reprompts_on_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        state.handle("5");
        assert_eq!(state.prompt(), Prompt::Schedule);
        assert_eq!(state.handle("9").message, INVALID_CHOICE);
        assert_eq!(state.prompt(), Prompt::Schedule);
        state.handle("2");

        assert_eq!(state.prompt(), Prompt::ChunkSize);
        assert_eq!(state.handle("0").message, INVALID_CHOICE);
        assert_eq!(state.handle("-3").message, INVALID_CHOICE);
        state.handle("16");

        assert_eq!(state.prompt(), Prompt::Workers);
        // Nothing is committed until the last prompt succeeds.
        assert_eq!(state.config.parallel, ParallelConfig::default());
        assert_eq!(state.handle("x").message, INVALID_CHOICE);
        state.handle("3");

        assert_eq!(state.prompt(), Prompt::Main);
        assert_eq!(state.config.parallel.schedule(), SchedulePolicy::Dynamic);
        assert_eq!(state.config.parallel.chunk_size(), 16);
        assert_eq!(state.config.parallel.workers(), 3);

        let log = fs::read_to_string(dir.path().join("DataLog.txt")).unwrap();
        assert!(log.contains("Changing parallel options"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let reply = state.handle("3");
        assert!(reply.message.ends_with("Error."));
        assert!(state.matrix.as_ref().unwrap().error_flag);
    }

    #[test]
    fn test_solve_and_write() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("C.csv"), "2\n2;1;3\n1;-1;0\n").unwrap();
        let mut state = state_in(dir.path());

        let reply = state.handle("4");
        assert!(reply.message.contains("Gaussian elimination: OK"));
        assert!(!reply.message.contains("omitted"));

        let report = state.last_report.as_ref().unwrap();
        let written: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("X_"))
            .collect();
        assert_eq!(written.len(), 1);
        let body = fs::read_to_string(dir.path().join(&written[0])).unwrap();
        assert!(body.starts_with("2\n1.000000;1.000000"));
        assert!(!report.degenerate());

        let shown = state.handle("1");
        assert!(shown.message.contains("Reading file"));
        assert!(shown.message.contains("Gaussian elimination time"));
        assert!(shown.message.contains("File writing"));
    }

    #[test]
    fn test_solve_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("C.csv"), "2\n2;1;3\n1;oops;0\n").unwrap();
        let mut state = state_in(dir.path());
        let reply = state.handle("4");
        assert!(reply.message.contains("Input error."));
        assert!(state.last_report.is_none());
    }

    #[test]
    fn test_huge_declared_height_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("C.csv"), "4000000000\n1;2\n").unwrap();
        let mut state = state_in(dir.path());
        let reply = state.handle("4");
        assert!(reply.message.contains("Cannot read files."));
        assert!(reply.message.contains("Input error."));
        assert!(state.matrix.as_ref().unwrap().error_flag);
        assert!(state.last_report.is_none());
    }
}
