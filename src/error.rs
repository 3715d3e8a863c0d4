use std::fmt;
use std::io;

/// The error taxonomy from the harness design: every kind here is surfaced to the
/// caller except `TraceParseMalformed`, which is recovered locally (see
/// [`crate::gc_trace::parse_gc_line`]) and never constructed as an [`Error`].
#[derive(Debug)]
pub enum Error {
    /// Conflicting or missing options were supplied, e.g. both `baseline_dir` and
    /// `baseline_variant`, or neither `max_time_ms` nor `max_iterations`.
    ConfigInvalid { message: String },
    /// The measurement loop produced zero samples.
    EmptySamples { name: String },
    /// The user-supplied callable raised inside the worker.
    BenchmarkFailed {
        name: String,
        message: String,
        stack: Option<String>,
    },
    /// No reply was received from the worker within the hard timeout.
    BenchmarkTimeout { name: String, timeout_ms: u64 },
    /// The worker process exited without sending a result.
    WorkerCrashed {
        name: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },
    /// A filter matched no benchmarks, cases, or variants.
    FilterNoMatch { filter: String },
    /// Transport-level failure talking to the worker (spawn, io, (de)serialization).
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigInvalid { message } => write!(f, "invalid configuration: {}", message),
            Error::EmptySamples { name } => {
                write!(f, "benchmark '{}' produced zero samples", name)
            }
            Error::BenchmarkFailed {
                name,
                message,
                stack,
            } => match stack {
                Some(stack) => write!(f, "benchmark '{}' failed: {}\n{}", name, message, stack),
                None => write!(f, "benchmark '{}' failed: {}", name, message),
            },
            Error::BenchmarkTimeout { name, timeout_ms } => write!(
                f,
                "benchmark '{}' timed out after {} ms",
                name, timeout_ms
            ),
            Error::WorkerCrashed {
                name,
                exit_code,
                stderr_tail,
            } => write!(
                f,
                "worker for benchmark '{}' crashed (exit code {:?}):\n{}",
                name, exit_code, stderr_tail
            ),
            Error::FilterNoMatch { filter } => {
                write!(f, "filter '{}' matched nothing", filter)
            }
            Error::Io(inner) => write!(f, "i/o error: {}", inner),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Error {
        Error::Io(other)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
