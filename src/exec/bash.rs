//! Bounded shell command execution
//!
//! [`BashFeature`] runs `cmd` through the shell, captures stdout and stderr
//! as one stream into `{res_dir}/{case_name}.log`, and kills the whole process group once
//! `max_duration` elapses.

use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{Instrument, Span};

use super::feature::{case_span, Execution, Feature};
use super::params::Params;
use super::testcase::TestCase;
use crate::common::config::Timeouts;
use crate::common::{paths, Error, Result};

/// Fallback bound in seconds for a malformed `max_duration`
pub const DEFAULT_TIMEOUT: u64 = 180;

/// How long the child may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Wait for the child however long it takes
    Unbounded,
    /// Bound taken from the caller's `max_duration`
    Requested(Duration),
    /// `max_duration` was absent and the configuration supplies a bound
    Configured(Duration),
    /// `max_duration` was malformed
    Fallback(Duration),
}

impl Deadline {
    pub fn duration(self) -> Option<Duration> {
        match self {
            Deadline::Unbounded => None,
            Deadline::Requested(d) | Deadline::Configured(d) | Deadline::Fallback(d) => Some(d),
        }
    }
}

/// Interpret a `max_duration` value as whole seconds
///
/// Accepts integers, numbers (truncated) and strings holding an integer.
/// Negative bounds clamp to zero and expire immediately. Everything else is
/// malformed.
pub fn parse_max_duration(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|_| 0))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<i64>().ok().map(|_| 0))
        }
        _ => None,
    }
}

/// Test case running a shell command under a deadline
pub struct BashFeature {
    case: TestCase,
    span: Span,
    result_file: PathBuf,
    fallback_timeout: Duration,
    absent_timeout: Option<Duration>,
    env: Vec<(String, String)>,
}

impl BashFeature {
    pub fn new(case: TestCase) -> Self {
        let result_file = case.res_dir().join(format!("{}.log", case.case_name()));
        let span = case_span(&case);
        Self {
            case,
            span,
            result_file,
            fallback_timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            absent_timeout: None,
            env: Vec::new(),
        }
    }

    /// Apply configured bounds
    pub fn with_timeouts(mut self, timeouts: &Timeouts) -> Self {
        self.fallback_timeout = Duration::from_secs(timeouts.default_max_duration_secs);
        self.absent_timeout = timeouts.absent_max_duration_secs.map(Duration::from_secs);
        self
    }

    /// Extra environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// `{res_dir}/{case_name}.log`
    pub fn result_file(&self) -> &Path {
        &self.result_file
    }

    /// Turn the raw `max_duration` parameter into a deadline
    pub fn resolve_deadline(&self, raw: Option<&Value>) -> Deadline {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return match self.absent_timeout {
                Some(d) => Deadline::Configured(d),
                None => Deadline::Unbounded,
            };
        };

        match parse_max_duration(raw) {
            Some(secs) => Deadline::Requested(Duration::from_secs(secs)),
            None => {
                tracing::info!(
                    "Wrong value for max_duration: {}, defaulting to {}s.",
                    raw,
                    self.fallback_timeout.as_secs()
                );
                Deadline::Fallback(self.fallback_timeout)
            }
        }
    }

    fn spawn(&self, cmd: &str) -> Result<Child> {
        let mut command = shell_command(cmd);
        command
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Own process group so a timeout kill reaches grandchildren too
        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map_err(|e| Error::spawn(cmd, e))
    }

    async fn supervise(&self, cmd: &str, console: bool, deadline: Deadline) -> Result<Execution> {
        paths::ensure_dir(self.case.res_dir())
            .map_err(|e| Error::create_dir(self.case.res_dir(), e))?;

        let file = File::create(&self.result_file)
            .await
            .map_err(|e| Error::result_file(&self.result_file, e))?;
        let mut sink = OutputSink::new(file, console);

        tracing::info!("Calling {}", cmd);
        if let Deadline::Requested(d) = deadline {
            tracing::info!("Parameter 'max_duration' set to {}s.", d.as_secs());
        }

        let mut child = self.spawn(cmd)?;
        let output = child.stdout.take();

        let waited = {
            let completion = async {
                pump(output, &mut sink).await?;
                Ok::<_, io::Error>(child.wait().await?)
            };
            match deadline.duration() {
                Some(limit) => tokio::time::timeout(limit, completion).await.ok(),
                None => Some(completion.await),
            }
        };

        let Some(waited) = waited else {
            let limit = deadline.duration().unwrap_or_default();
            kill_tree(&mut child);
            if let Err(e) = child.wait().await {
                tracing::warn!("Failed to reap killed process: {}", e);
            }
            if let Err(e) = sink.close().await {
                tracing::warn!("Failed to flush partial output: {}", e);
            }
            tracing::info!("Killing process after {} second(s).", limit.as_secs());
            return Ok(Execution::TimedOut { after: limit });
        };

        sink.close()
            .await
            .map_err(|e| Error::result_file(&self.result_file, e))?;
        let status = waited.map_err(|e| Error::result_file(&self.result_file, e))?;

        self.log_result_file(cmd).await;

        Ok(Execution::from_code(exit_code(status)))
    }

    async fn log_result_file(&self, cmd: &str) {
        match tokio::fs::read(&self.result_file).await {
            Ok(bytes) => {
                tracing::debug!("$ {}\n{}", cmd, String::from_utf8_lossy(&bytes).trim_end());
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot read back '{}': {}",
                    self.result_file.display(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl Feature for BashFeature {
    fn case(&self) -> &TestCase {
        &self.case
    }

    fn case_mut(&mut self) -> &mut TestCase {
        &mut self.case
    }

    fn span(&self) -> &Span {
        &self.span
    }

    async fn execute(&mut self, params: &Params) -> Result<Execution> {
        let Some(cmd) = params.get_str("cmd") else {
            tracing::error!("Please give cmd as arg. params: {}", params);
            return Ok(Execution::MissingCommand);
        };
        let console = params.flag("console");
        let deadline = self.resolve_deadline(params.get("max_duration"));

        let span = self.span.clone();
        self.supervise(cmd, console, deadline).instrument(span).await
    }
}

/// Destination of captured output: the result file, optionally echoed to stdout
struct OutputSink {
    file: File,
    console: Option<tokio::io::Stdout>,
}

impl OutputSink {
    fn new(file: File, console: bool) -> Self {
        Self {
            file,
            console: console.then(tokio::io::stdout),
        }
    }

    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        if let Some(out) = self.console.as_mut() {
            out.write_all(chunk).await?;
            out.flush().await?;
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}

/// Drain the merged output pipe into the sink until EOF
async fn pump<R: AsyncRead + Unpin>(output: Option<R>, sink: &mut OutputSink) -> io::Result<()> {
    let Some(mut output) = output else {
        return Ok(());
    };

    let mut buf = [0u8; 8192];
    loop {
        match output.read(&mut buf).await? {
            0 => return Ok(()),
            n => sink.write(&buf[..n]).await?,
        }
    }
}

#[cfg(unix)]
fn shell_command(cmd: &str) -> Command {
    // stderr shares the stdout pipe so both streams keep their write order
    let mut command = Command::new("sh");
    command.arg("-c").arg(format!("exec 2>&1\n{}", cmd));
    command
}

#[cfg(windows)]
fn shell_command(cmd: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(format!("({}) 2>&1", cmd));
    command
}

/// Forcibly terminate the child and everything in its process group
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The child leads its own group (see `spawn`)
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc == 0 {
            return;
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::warn!("Failed to kill process: {}", e);
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
