//! The worker orchestrator (§4.5): executes a single benchmark in an isolated child
//! process, because in-process execution would cross-contaminate code caches,
//! allocation arenas and runtime statistics between benchmarks (§4.5 opening).

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::gc_trace::{parse_gc_line, GcEvent};
use crate::result::MeasuredResults;
use crate::spec::{BenchmarkSpec, RunnerOptions};
use crate::worker::protocol::{read_framed, write_framed, ChildReply, RunMessage, WireSpec};

/// Hard timeout from send, per §4.5 point 5.
pub const WORKER_TIMEOUT: Duration = Duration::from_secs(60);
/// The flag the parent passes to re-invoke itself as a worker child.
pub const WORKER_FLAG: &str = "--worker";

/// Spawns and supervises a single isolated worker child for one benchmark run.
pub struct WorkerOrchestrator {
    worker_exe: std::path::PathBuf,
}

impl WorkerOrchestrator {
    /// Uses the current executable re-invoked with [`WORKER_FLAG`] as the child.
    pub fn new() -> Result<Self> {
        Ok(WorkerOrchestrator {
            worker_exe: std::env::current_exe()?,
        })
    }

    pub fn with_executable(path: impl Into<std::path::PathBuf>) -> Self {
        WorkerOrchestrator {
            worker_exe: path.into(),
        }
    }

    /// Runs `spec` in a fresh child process and returns its [`MeasuredResults`].
    pub fn run(
        &self,
        spec: &BenchmarkSpec,
        runner_name: &str,
        options: &RunnerOptions,
        params: Option<&str>,
    ) -> Result<Vec<MeasuredResults>> {
        let wire_spec = WireSpec::try_from_spec(spec)?;

        log::debug!("spawning worker for benchmark '{}'", spec.name);
        let mut child = Command::new(&self.worker_exe)
            .arg(WORKER_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child.stdin.take().expect("child stdin was piped");
        let stdout = child.stdout.take().expect("child stdout was piped");
        let stderr = child.stderr.take().expect("child stderr was piped");

        let message = RunMessage::Run {
            spec: wire_spec,
            runner_name: runner_name.to_string(),
            options: options.clone(),
            params: params.map(str::to_string),
        };
        write_framed(&mut stdin, &message)?;
        drop(stdin);

        let gc_stats = options.gc_stats;
        let stdout_handle = thread::spawn(move || drain_stdout(stdout, gc_stats));

        let (tx, rx) = mpsc::channel();
        let stderr_handle = thread::spawn(move || {
            let _ = tx.send(read_stderr_channel(stderr));
        });

        let outcome = match rx.recv_timeout(WORKER_TIMEOUT) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!(
                    "worker for benchmark '{}' did not reply within {:?}, killing",
                    spec.name,
                    WORKER_TIMEOUT
                );
                let _ = kill_and_reap(&mut child);
                return Err(Error::BenchmarkTimeout {
                    name: spec.name.clone(),
                    timeout_ms: WORKER_TIMEOUT.as_millis() as u64,
                });
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = kill_and_reap(&mut child);
                return Err(Error::WorkerCrashed {
                    name: spec.name.clone(),
                    exit_code: None,
                    stderr_tail: String::new(),
                });
            }
        };

        let status = child.wait()?;
        log::debug!(
            "worker for benchmark '{}' exited with status {:?}",
            spec.name,
            status.code()
        );
        let gc_stats_captured = stdout_handle.join().ok();
        let _ = stderr_handle.join();

        match outcome {
            StderrOutcome::Reply(ChildReply::Result {
                mut results,
                heap_profile,
            }) => {
                if let (Some(first), Some(hp)) = (results.first_mut(), heap_profile) {
                    first.heap_profile = Some(hp);
                }
                if let (Some(first), Some(gc_stats)) = (results.first_mut(), gc_stats_captured.flatten()) {
                    first.gc_stats = Some(gc_stats);
                }
                Ok(results)
            }
            StderrOutcome::Reply(ChildReply::Error { error, stack }) => {
                Err(Error::BenchmarkFailed {
                    name: spec.name.clone(),
                    message: error,
                    stack,
                })
            }
            StderrOutcome::NoReply(tail) => Err(Error::WorkerCrashed {
                name: spec.name.clone(),
                exit_code: status.code(),
                stderr_tail: tail,
            }),
        }
    }
}

enum StderrOutcome {
    Reply(ChildReply),
    NoReply(String),
}

fn read_stderr_channel(mut stderr: impl Read) -> StderrOutcome {
    // Buffer the whole stream: either it decodes as exactly one framed reply, or the
    // child crashed and every byte on this stream is diagnostic text for the crash
    // report (§7 `WorkerCrashed`).
    let mut bytes = Vec::new();
    if stderr.read_to_end(&mut bytes).is_err() {
        return StderrOutcome::NoReply(String::new());
    }
    let mut cursor = std::io::Cursor::new(&bytes);
    match read_framed::<_, ChildReply>(&mut cursor) {
        Ok(reply) => StderrOutcome::Reply(reply),
        Err(_) => StderrOutcome::NoReply(String::from_utf8_lossy(&bytes).to_string()),
    }
}

/// Line-buffers the child's stdout: GC-trace lines (when `gc_stats` is requested) are
/// parsed and aggregated; every non-matching line is re-emitted to the parent's own
/// stdout unchanged, per §4.5 point 2. Returns `None` when `gc_stats` is disabled, so
/// the result's `gc_stats` block stays absent rather than carrying an all-zero
/// placeholder (§6: optional blocks are present only when requested by options).
fn drain_stdout(stdout: impl Read, gc_stats: bool) -> Option<crate::gc_trace::GcStats> {
    let reader = BufReader::new(stdout);
    let mut events: Vec<(GcEvent, bool)> = Vec::new();
    let stdout_handle = std::io::stdout();

    for line in reader.lines().map_while(std::result::Result::ok) {
        match parse_gc_line(&line) {
            Some(event) if gc_stats => {
                events.push((event, line.contains("allocated=")));
            }
            _ => {
                let mut lock = stdout_handle.lock();
                let _ = writeln!(lock, "{}", line);
            }
        }
    }

    if gc_stats {
        Some(crate::gc_trace::aggregate_gc_stats(&events))
    } else {
        None
    }
}

fn kill_and_reap(child: &mut Child) -> std::io::Result<()> {
    child.kill()?;
    child.wait()?;
    Ok(())
}

/// Self-kill backstop for the worker child (§4.5 "Child lifetime"): the child
/// terminates itself after this long regardless of whether it has replied.
pub const CHILD_SELF_TERMINATE: Duration = Duration::from_secs(5 * 60);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn worker_timeout_is_sixty_seconds() {
        assert_eq!(WORKER_TIMEOUT, Duration::from_secs(60));
    }

    #[test]
    fn child_self_terminate_is_five_minutes() {
        assert_eq!(CHILD_SELF_TERMINATE, Duration::from_secs(300));
    }
}
