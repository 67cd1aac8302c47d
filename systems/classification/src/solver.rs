//! Solver seam and the out-of-process adapter.

use std::{
    io::{self, ErrorKind, Read, Write},
    panic,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};
use roboyard_core::Level;
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Answer produced by a solver for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverOutcome {
    /// Optimal solution length in moves.
    Solved(u32),
    /// No solution exists, or none was found in time.
    Unsolvable,
}

impl SolverOutcome {
    /// Interprets the solver's standard output.
    ///
    /// A non-negative integer is a move count and a negative one signals an
    /// unsolvable level. Surrounding whitespace is ignored.
    pub fn from_output(stdout: &str) -> Result<Self, SolverError> {
        let trimmed = stdout.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| SolverError::InvalidOutput(trimmed.to_owned()))?;
        if value < 0 {
            return Ok(Self::Unsolvable);
        }
        u32::try_from(value)
            .map(Self::Solved)
            .map_err(|_| SolverError::InvalidOutput(trimmed.to_owned()))
    }
}

/// Failures while consulting a solver. Callers reject the candidate.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver process could not be started.
    #[error("failed to start solver `{program}`")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// Talking to the running solver failed.
    #[error("solver pipe failed")]
    Io(#[from] io::Error),
    /// The solver exited unsuccessfully.
    #[error("solver exited with {0}")]
    Failed(ExitStatus),
    /// The solver printed something other than an integer.
    #[error("solver printed `{0}` instead of a move count")]
    InvalidOutput(String),
}

/// Computes optimal move counts. Implementations must be shareable across
/// campaign workers.
pub trait Solver {
    /// Solves `level`.
    fn solve(&self, level: &Level) -> Result<SolverOutcome, SolverError>;
}

/// Runs a solver program per level, feeding the artifact on stdin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalSolver {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalSolver {
    /// Time a solver may run before it is killed.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates an adapter for `program` with no arguments and the default timeout.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Splits a whitespace-separated command line into program and arguments.
    #[must_use]
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).with_args(words))
    }

    /// Appends arguments passed to every invocation.
    #[must_use]
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the per-level timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program launched per level.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Per-level timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn wait_until_deadline(&self, child: &mut Child) -> Result<Option<ExitStatus>, SolverError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Solver for ExternalSolver {
    fn solve(&self, level: &Level) -> Result<SolverOutcome, SolverError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        // Drained concurrently so a chatty solver never stalls on a full pipe.
        let stdout = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                pipe.read_to_string(&mut text).map(|_| text)
            })
        });

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(level.to_artifact().as_bytes()) {
                Ok(()) => {}
                // The solver may answer without consuming its input.
                Err(error) if error.kind() == ErrorKind::BrokenPipe => {}
                Err(error) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(error.into());
                }
            }
        }

        let Some(status) = self.wait_until_deadline(&mut child)? else {
            warn!(
                "solver `{}` exceeded {:?}, treating level as unsolvable",
                self.program, self.timeout
            );
            return Ok(SolverOutcome::Unsolvable);
        };
        if !status.success() {
            return Err(SolverError::Failed(status));
        }

        let stdout = match stdout {
            Some(reader) => reader
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))?,
            None => String::new(),
        };
        let outcome = SolverOutcome::from_output(&stdout)?;
        debug!("solver `{}` answered {outcome:?}", self.program);
        Ok(outcome)
    }
}
