//! Execution gateway
//!
//! One request, one classify-then-run cycle, at most one spawned process.
//! Failures never escape as errors; every outcome is an [`ExecutionResult`]
//! so the caller can keep its virtual session going.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::classify::{classify, CommandKind};
use crate::shell::{select_shell, ShellKind, ShellMode};

/// Default main-command timeout: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Probe timeout, independent of the main timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Output cap per stream: 1 MiB. Exceeding it is an execution failure.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Gateway tuning knobs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub shell_mode: ShellMode,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            shell_mode: ShellMode::Auto,
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// One command to run against a caller-owned virtual working directory.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub command: String,
    pub cwd: String,
}

/// Outcome of one request. `cwd` is the directory the caller should send on
/// its next call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
    pub cwd: String,
}

impl ExecutionResult {
    fn ok(cwd: String) -> Self {
        Self {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
            cwd,
        }
    }

    fn inaccessible(target: &str, error: String, cwd: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: format!("cannot access: {}", target),
            error: Some(error),
            cwd,
        }
    }
}

/// Stateless per-request command gateway.
pub struct ExecGateway {
    config: GatewayConfig,
    host_is_windows: bool,
}

impl ExecGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            host_is_windows: cfg!(windows),
        }
    }

    #[cfg(test)]
    fn with_platform(config: GatewayConfig, host_is_windows: bool) -> Self {
        Self {
            config,
            host_is_windows,
        }
    }

    /// Classify and run one command. Never returns an error; failures are
    /// carried inside the result payload.
    pub async fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        match classify(&request.command) {
            CommandKind::VolumeSwitch { drive } => {
                self.switch_volume(drive, &request.cwd).await
            }
            CommandKind::ChangeDir { target } => self.change_dir(&target, &request.cwd).await,
            CommandKind::Ordinary => self.run_ordinary(&request.command, &request.cwd).await,
        }
    }

    /// Probe a drive root (`X:\`). The probe runs *inside* the target volume
    /// so an unmounted or missing drive fails to spawn.
    async fn switch_volume(&self, drive: char, cwd: &str) -> ExecutionResult {
        let root = format!("{}:\\", drive);
        let script = if self.host_is_windows { "cd" } else { "pwd" };
        match self.probe(script, &root).await {
            Ok(_) => ExecutionResult::ok(root),
            Err(err) => ExecutionResult::inaccessible(&root, err, cwd.to_string()),
        }
    }

    /// Resolve a `cd` target lexically against the caller cwd, then verify it
    /// with a probe process that prints the shell's canonical path.
    async fn change_dir(&self, target: &str, cwd: &str) -> ExecutionResult {
        let resolved = if Path::new(target).is_absolute() {
            target.to_string()
        } else {
            Path::new(cwd).join(target).to_string_lossy().into_owned()
        };

        // `cd` as a builtin prints the current directory on cmd.exe; POSIX
        // shells need an explicit pwd.
        let report = if self.host_is_windows { "cd" } else { "pwd" };
        let script = format!("cd \"{}\" && {}", resolved, report);

        match self.probe(&script, cwd).await {
            Ok(stdout) => {
                let canonical = stdout.trim();
                let cwd = if canonical.is_empty() {
                    resolved
                } else {
                    canonical.to_string()
                };
                ExecutionResult::ok(cwd)
            }
            Err(err) => ExecutionResult::inaccessible(&resolved, err, cwd.to_string()),
        }
    }

    /// Run an ordinary command under the configured shell. The returned cwd
    /// is always the caller's: the process exits before the next request, so
    /// any `cd` buried in the command text has no lasting effect.
    async fn run_ordinary(&self, command: &str, cwd: &str) -> ExecutionResult {
        let shell = select_shell(self.config.shell_mode, self.host_is_windows);
        let script = shell.wrap(command);
        let outcome = self
            .spawn_capped(shell, &script, cwd, self.config.timeout)
            .await;
        ExecutionResult {
            success: outcome.error.is_none(),
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            error: outcome.error,
            cwd: cwd.to_string(),
        }
    }

    /// Short-lived validation process. Success means the script ran to a zero
    /// exit within the probe timeout; its stdout is returned for canonical
    /// path reporting.
    async fn probe(&self, script: &str, cwd: &str) -> Result<String, String> {
        let shell = if self.host_is_windows {
            ShellKind::Cmd
        } else {
            ShellKind::Posix
        };
        let outcome = self.spawn_capped(shell, script, cwd, PROBE_TIMEOUT).await;
        match outcome.error {
            None => Ok(outcome.stdout),
            Some(err) => Err(err),
        }
    }

    /// Spawn one process and await it with a deadline and per-stream output
    /// cap. Reader tasks drain the pipes so the child can never block on a
    /// full pipe; overflow is recorded and reported as a failure.
    async fn spawn_capped(
        &self,
        shell: ShellKind,
        script: &str,
        cwd: &str,
        timeout: Duration,
    ) -> CommandOutcome {
        log::debug!("spawn {} in {}: {}", shell.program(), cwd, script);
        let mut child = match Command::new(shell.program())
            .arg(shell.script_flag())
            .arg(script)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::failed(format!(
                    "failed to spawn {}: {}",
                    shell.program(),
                    e
                ));
            }
        };

        let cap = self.config.max_output_bytes;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        // Readers signal overflow so the child can be killed immediately
        // instead of running on against a full buffer.
        let (overflow_tx, mut overflow_rx) = tokio::sync::mpsc::channel::<()>(2);
        let stdout_reader = tokio::spawn(read_capped(stdout, cap, overflow_tx.clone()));
        let stderr_reader = tokio::spawn(read_capped(stderr, cap, overflow_tx));

        let waited = tokio::time::timeout(timeout, async {
            tokio::select! {
                status = child.wait() => Some(status),
                _ = overflow_rx.recv() => None,
            }
        })
        .await;

        let (status, timed_out) = match waited {
            Ok(Some(Ok(status))) => (Some(status), false),
            Ok(Some(Err(e))) => {
                return CommandOutcome::failed(format!("failed to await command: {}", e));
            }
            // Overflow: kill and let the error come from the reader flags.
            Ok(None) => {
                let _ = child.kill().await;
                (None, false)
            }
            Err(_) => {
                let _ = child.kill().await;
                (None, true)
            }
        };

        // Pipes close once the child is gone, so the readers finish promptly.
        let (stdout, stdout_overflow) = stdout_reader.await.unwrap_or_default();
        let (stderr, stderr_overflow) = stderr_reader.await.unwrap_or_default();

        let error = if timed_out {
            Some(format!(
                "command timed out after {} seconds",
                timeout.as_secs()
            ))
        } else if stdout_overflow || stderr_overflow {
            Some(format!("output exceeded maximum buffer size ({} bytes)", cap))
        } else {
            match status {
                Some(status) if status.success() => None,
                Some(status) => Some(format!("command failed: {}", status)),
                None => Some("command terminated".to_string()),
            }
        };

        CommandOutcome {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            error,
        }
    }
}

struct CommandOutcome {
    stdout: String,
    stderr: String,
    error: Option<String>,
}

impl CommandOutcome {
    fn failed(error: String) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
        }
    }
}

/// Read a stream keeping at most `cap` bytes. Past the cap the stream is
/// still drained (and discarded) so the producing child never stalls on a
/// full pipe; the overflow flag marks the execution as failed.
async fn read_capped<R>(
    reader: Option<R>,
    cap: usize,
    overflow_tx: tokio::sync::mpsc::Sender<()>,
) -> (Vec<u8>, bool)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut reader = match reader {
        Some(reader) => reader,
        None => return (Vec::new(), false),
    };
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut overflow = false;
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if overflow {
                    continue;
                }
                let remaining = cap - buf.len();
                if n > remaining {
                    buf.extend_from_slice(&chunk[..remaining]);
                    overflow = true;
                    let _ = overflow_tx.try_send(());
                } else {
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
            Err(_) => break,
        }
    }
    (buf, overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posix_gateway(config: GatewayConfig) -> ExecGateway {
        ExecGateway::with_platform(config, false)
    }

    fn request(command: &str, cwd: &str) -> ExecutionRequest {
        ExecutionRequest {
            command: command.to_string(),
            cwd: cwd.to_string(),
        }
    }

    #[tokio::test]
    async fn ordinary_command_captures_stdout() {
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway.run(&request("echo hello", "/tmp")).await;
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.cwd, "/tmp");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn ordinary_command_never_moves_the_cwd() {
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway.run(&request("cd / && ls", "/tmp")).await;
        assert!(result.success);
        // Known-lossy by design: the cd inside the compound command is
        // invisible to the next request.
        assert_eq!(result.cwd, "/tmp");
    }

    #[tokio::test]
    async fn failing_command_reports_error_in_payload() {
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway.run(&request("exit 3", "/tmp")).await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.cwd, "/tmp");
    }

    #[tokio::test]
    async fn timeout_kills_and_reports_failure() {
        let config = GatewayConfig {
            timeout: Duration::from_millis(200),
            ..GatewayConfig::default()
        };
        let gateway = posix_gateway(config);
        let result = gateway.run(&request("echo early && sleep 5", "/tmp")).await;
        assert!(!result.success);
        let error = result.error.expect("timeout must produce an error");
        assert!(error.contains("timed out"));
        // Output captured before the kill is preserved.
        assert_eq!(result.stdout.trim(), "early");
    }

    #[tokio::test]
    async fn output_overflow_is_a_failure() {
        let config = GatewayConfig {
            max_output_bytes: 1024,
            ..GatewayConfig::default()
        };
        let gateway = posix_gateway(config);
        let result = gateway
            .run(&request("head -c 4096 /dev/zero | tr '\\0' 'x'", "/tmp"))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("buffer"));
        assert!(result.stdout.len() <= 1024);
    }

    #[tokio::test]
    async fn cd_resolves_relative_target_lexically_then_probes() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("My Files");
        std::fs::create_dir(&sub).unwrap();

        let gateway = posix_gateway(GatewayConfig::default());
        let cwd = dir.path().to_string_lossy().into_owned();
        let result = gateway.run(&request("cd \"My Files\"", &cwd)).await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert!(result.cwd.ends_with("My Files"), "cwd: {}", result.cwd);
    }

    #[tokio::test]
    async fn cd_to_missing_directory_keeps_cwd() {
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway
            .run(&request("cd no-such-dir-here", "/tmp"))
            .await;
        assert!(!result.success);
        assert!(result.stderr.contains("cannot access"));
        assert_eq!(result.cwd, "/tmp");
    }

    #[tokio::test]
    async fn cd_absolute_target_ignores_caller_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().to_string_lossy().into_owned();
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway.run(&request(&format!("cd {}", target), "/")).await;
        assert!(result.success);
        // The probe may canonicalize symlinks (e.g. /tmp on macOS), so only
        // the terminal component is asserted.
        let name = Path::new(&target).file_name().unwrap().to_string_lossy();
        assert!(result.cwd.ends_with(name.as_ref()));
    }

    #[tokio::test]
    async fn volume_switch_on_posix_host_reports_inaccessible() {
        let gateway = posix_gateway(GatewayConfig::default());
        let result = gateway.run(&request("D:", "/tmp")).await;
        assert!(!result.success);
        assert!(result.stderr.contains("D:\\"));
        assert_eq!(result.cwd, "/tmp");
    }
}
