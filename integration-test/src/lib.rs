//! Test driver for the parg smoke tests.
//!
//! Spawns a binary with:
//! - stdin: null
//! - stdout and stderr: pipes, drained by background threads and captured
//!   for assertions

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

/// A running child process.
pub struct TestSession {
    child: Child,
    /// Captured stdout, populated by background thread.
    stdout_capture: Arc<Mutex<Vec<u8>>>,
    /// Captured stderr, populated by background thread.
    stderr_capture: Arc<Mutex<Vec<u8>>>,
    stdout_thread: thread::JoinHandle<()>,
    stderr_thread: thread::JoinHandle<()>,
}

/// Copy everything from `pipe` into `capture` until EOF.
fn drain<R: Read + Send + 'static>(
    name: &'static str,
    mut pipe: R,
    capture: Arc<Mutex<Vec<u8>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    capture.lock().unwrap().extend_from_slice(&buf[..n]);
                }
                Err(e) => {
                    eprintln!("{name} drain error: {e}");
                    break;
                }
            }
        }
    })
}

impl TestSession {
    /// Spawn `binary` with the given arguments.
    ///
    /// `env` are additional environment variables to set; `remove_env` are
    /// removed so the parent's settings cannot leak into assertions.
    pub fn spawn(
        binary: &str,
        args: &[&str],
        env: &[(&str, &str)],
        remove_env: &[&str],
    ) -> std::io::Result<TestSession> {
        let mut cmd = Command::new(binary);
        cmd.args(args);
        for key in remove_env {
            cmd.env_remove(key);
        }
        for (k, v) in env {
            cmd.env(k, v);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        let stdout_capture = Arc::new(Mutex::new(Vec::new()));
        let stdout_pipe = child.stdout.take().unwrap();
        let stdout_thread = drain("stdout", stdout_pipe, Arc::clone(&stdout_capture));

        let stderr_capture = Arc::new(Mutex::new(Vec::new()));
        let stderr_pipe = child.stderr.take().unwrap();
        let stderr_thread = drain("stderr", stderr_pipe, Arc::clone(&stderr_capture));

        Ok(TestSession {
            child,
            stdout_capture,
            stderr_capture,
            stdout_thread,
            stderr_thread,
        })
    }

    /// Wait for the child to exit and assert the exit code.
    pub fn wait_exit(mut self, expected_code: i32) -> SessionOutput {
        let status = self.child.wait().expect("failed to wait for child");
        let code = status.code().unwrap_or(-1);

        // Capture threads finish once the child's pipes close.
        let _ = self.stdout_thread.join();
        let _ = self.stderr_thread.join();

        let stdout = String::from_utf8_lossy(&self.stdout_capture.lock().unwrap()).to_string();
        let stderr = String::from_utf8_lossy(&self.stderr_capture.lock().unwrap()).to_string();

        assert_eq!(
            code, expected_code,
            "expected exit code {expected_code}, got {code}\nstdout:\n{stdout}\nstderr:\n{stderr}"
        );

        SessionOutput { stdout, stderr }
    }
}

/// Output captured from a completed session.
pub struct SessionOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `binary` to completion with a clean logging environment.
pub fn run(binary: &str, args: &[&str], expected_code: i32) -> SessionOutput {
    TestSession::spawn(binary, args, &[], &["PARG_LOG"])
        .expect("failed to spawn")
        .wait_exit(expected_code)
}
