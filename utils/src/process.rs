//! Running external engines under a deadline.
//!
//! The child is fed its input on a writer thread while two reader threads
//! drain stdout and stderr, so neither side can wedge on a full pipe. The
//! calling thread owns the `Child` and polls `try_wait` until the child exits
//! or the deadline passes; every early return kills and reaps the child.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Time limit for one engine invocation unless configured otherwise.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output readers may lag behind the child's exit. A descendant
/// still holding a pipe open past this is abandoned.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("cannot start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program}: {reason}")]
    Io { program: String, reason: String },

    #[error("{program} did not finish within {}ms", .timeout.as_millis())]
    TimedOut { program: String, timeout: Duration },
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `program` with `input` on stdin and collect its output.
///
/// Fails with `TimedOut` once `timeout` elapses, and with `Io` if the input
/// cannot be delivered while the child is still running.
pub fn run_with_input(
    program: &Path,
    args: &[String],
    input: &[u8],
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let name = program.display().to_string();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProcessError::Spawn {
            program: name.clone(),
            reason: e.to_string(),
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let mut writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                reap(&mut child);
                return Err(ProcessError::Io {
                    program: name,
                    reason: format!("waiting for exit: {e}"),
                });
            }
        }
        if writer.as_ref().is_some_and(|w| w.is_finished()) {
            if let Some(Err(e)) = writer.take().map(join_writer) {
                reap(&mut child);
                return Err(ProcessError::Io {
                    program: name,
                    reason: format!("writing input: {e}"),
                });
            }
        }
        if Instant::now() >= deadline {
            reap(&mut child);
            warn!(program = %name, timeout_ms = timeout.as_millis() as u64, "engine timed out, killed");
            return Err(ProcessError::TimedOut {
                program: name,
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    // The child is gone, so a pending write ends with a broken pipe.
    if let Some(writer) = writer {
        let _ = join_writer(writer);
    }
    Ok(ProcessOutput {
        status,
        stdout: collect(stdout, &name),
        stderr: collect(stderr, &name),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>, program: &str) -> Vec<u8> {
    let Some(reader) = reader else {
        return Vec::new();
    };
    let give_up = Instant::now() + DRAIN_GRACE;
    while !reader.is_finished() {
        if Instant::now() >= give_up {
            debug!(program, "output pipe held open after exit, abandoning reader");
            return Vec::new();
        }
        thread::sleep(POLL_INTERVAL);
    }
    reader.join().unwrap_or_default()
}

fn join_writer(writer: JoinHandle<io::Result<()>>) -> io::Result<()> {
    writer
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("input writer panicked")))
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> (&'static Path, Vec<String>) {
        (Path::new("/bin/sh"), vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn echoes_input_through_cat() {
        let output = run_with_input(
            Path::new("cat"),
            &[],
            b"NIN CF12345678901",
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"NIN CF12345678901");
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn nonzero_exit_is_reported_with_stderr() {
        let (program, args) = sh("echo broken >&2; exit 3");
        let output = run_with_input(program, &args, b"", Duration::from_secs(5)).unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stderr, b"broken\n");
    }

    #[test]
    fn hung_child_is_killed_at_the_deadline() {
        let (program, args) = sh("sleep 30");
        let started = Instant::now();
        let err = run_with_input(program, &args, b"", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn refused_input_kills_the_child() {
        // Closes stdin without reading, then stays alive.
        let (program, args) = sh("exec 0<&-; sleep 30");
        let input = vec![0u8; 4 * 1024 * 1024];
        let started = Instant::now();
        let err = run_with_input(program, &args, &input, Duration::from_secs(20)).unwrap_err();
        match err {
            ProcessError::Io { reason, .. } => assert!(reason.starts_with("writing input")),
            other => panic!("expected input failure, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run_with_input(
            Path::new("/nonexistent/boda-engine"),
            &[],
            b"",
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
