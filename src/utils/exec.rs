//! External command execution utilities.
//!
//! Provides a Builder-based API for describing commands, and a [`Runner`]
//! that executes them. The exporter runs with a timeout; rasterizers run
//! until they exit on their own.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::{Cmd, Runner, System};
//!
//! // Simple command
//! let output = System.run(&Cmd::new("rsvg-convert").args(["-z", "2"]))?;
//!
//! // With a timeout and an output filter
//! let cmd = Cmd::from_slice(&["npx", "excalidraw_export"])
//!     .args([input, output])
//!     .timeout(Duration::from_secs(60))
//!     .filter(&NPM_FILTER);
//! System.run(&cmd)?;
//! ```

use crate::debug;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::{self, Read},
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::{
        OnceLock,
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;

/// How often a child with a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Errors
// ============================================================================

/// Failure to run an external command to completion.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("`{program}` not found")]
    NotFound { program: String },

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("failed to run `{program}`")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("{0}")]
    Failed(String),
}

impl ExecError {
    fn from_spawn(program: String, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { program }
        } else {
            Self::Io { program, source }
        }
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
///
/// Provides a fluent API for configuring commands. A `Cmd` only describes
/// the process; a [`Runner`] executes it.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["rsvg-convert"]` or `["npx", "excalidraw_export"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Kill the process if it has not exited after `limit`.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn get_program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Render the command line for logging.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes commands.
///
/// `run` returns the captured output whatever the exit status; use
/// [`check_status`] when a non-zero exit should be an error.
pub trait Runner {
    /// Run the command to completion (or until its timeout).
    fn run(&self, cmd: &Cmd) -> Result<Output, ExecError>;

    /// Whether `program` can be found on `PATH`.
    fn is_available(&self, program: &OsStr) -> bool;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct System;

impl Runner for System {
    fn run(&self, cmd: &Cmd) -> Result<Output, ExecError> {
        debug!("exec"; "`{}`", cmd.display());
        let filter = cmd.filter.unwrap_or(&EMPTY_FILTER);

        let output = match cmd.get_timeout() {
            Some(limit) => run_with_timeout(cmd, limit)?,
            None => run_simple(cmd)?,
        };

        filter.log(&cmd.program_name(), String::from_utf8_lossy(&output.stderr).trim());
        Ok(output)
    }

    fn is_available(&self, program: &OsStr) -> bool {
        which::which(program).is_ok()
    }
}

/// Simple execution, blocking until the process exits.
fn run_simple(cmd: &Cmd) -> Result<Output, ExecError> {
    cmd.command()
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ExecError::from_spawn(cmd.program_name(), e))
}

/// Execution bounded by `limit`.
///
/// Pipes are drained on helper threads so a chatty child cannot block on a
/// full pipe while we poll. The deadline covers both the child's exit and
/// the pipes closing, since a grandchild may inherit them and outlive the
/// child. On expiry the child is killed and the reader threads detached.
fn run_with_timeout(cmd: &Cmd, limit: Duration) -> Result<Output, ExecError> {
    let name = cmd.program_name();
    let mut child = cmd
        .command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecError::from_spawn(name.clone(), e))?;

    let deadline = Instant::now() + limit;
    let timeout = |program: String| ExecError::Timeout {
        program,
        after: limit,
    };

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_until(&mut child, deadline).map_err(|source| ExecError::Io {
        program: name.clone(),
        source,
    })?;

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(timeout(name));
    };

    let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline))
    else {
        debug!("exec"; "`{}` exited but its output pipes are still open", name);
        return Err(timeout(name));
    };

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

/// Poll `child` until it exits or `deadline` passes (`None`).
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(remaining));
    }
}

/// Read `pipe` to the end on a helper thread, delivering the bytes once.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
    }
    rx
}

/// Wait for a reader's bytes until `deadline`. `None` if the pipe is still open.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

/// Turn a non-zero exit into [`ExecError::Failed`].
pub fn check_status(cmd: &Cmd, output: Output) -> Result<Output, ExecError> {
    if output.status.success() {
        Ok(output)
    } else {
        let filter = cmd.filter.unwrap_or(&EMPTY_FILTER);
        Err(ExecError::Failed(format_error(
            &cmd.program_name(),
            &output,
            filter,
        )))
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
#[derive(Debug)]
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, ANSI codes removed.
    pub fn apply(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }

    /// Log output lines that pass the filter (verbose mode only).
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.apply(output);
        if !lines.is_empty() {
            debug!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// npm chatter printed by `npx` around the actual tool output.
pub const NPM_FILTER: FilterRule = FilterRule::new(&["npm WARN", "npm notice", "npm warn"]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    re.replace_all(s, "")
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    let error_lines = filter.apply(&stderr);
    if !error_lines.is_empty() {
        msg.push('\n');
        msg.push_str(&error_lines.join("\n"));
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}

/// Build an `ExitStatus` from an exit code (for fake runners in tests).
#[cfg(test)]
#[allow(clippy::cast_sign_loss)]
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("echo")
            .arg("hello")
            .args(["world", "!"]);

        assert_eq!(cmd.program, OsString::from("echo"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.get_timeout(), None);
        assert_eq!(cmd.display(), "echo hello world !");
    }

    #[test]
    fn test_from_slice_splits_program() {
        let cmd = Cmd::from_slice(&["npx", "excalidraw_export"]).arg("a.excalidraw");
        assert_eq!(cmd.get_program(), OsStr::new("npx"));
        assert_eq!(cmd.get_args(), &["excalidraw_export", "a.excalidraw"]);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "INFO:"]);
        assert!(filter.should_skip("WARN: something"));
        assert!(filter.should_skip("INFO: something"));
        assert!(!filter.should_skip("ERROR: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_npm_filter_keeps_tool_errors() {
        let lines = NPM_FILTER.apply("npm WARN exec foo\n\x1b[31mError: bad file\x1b[0m\n\n");
        assert_eq!(lines, vec!["Error: bad file".to_string()]);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_check_status() {
        let cmd = Cmd::new("convert");
        let ok = Output {
            status: exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        assert!(check_status(&cmd, ok).is_ok());

        let failed = Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: b"no decode delegate".to_vec(),
        };
        let err = check_status(&cmd, failed).unwrap_err();
        assert!(matches!(err, ExecError::Failed(ref msg) if msg.contains("no decode delegate")));
    }

    #[cfg(unix)]
    #[test]
    fn test_simple_command() {
        let output = System.run(&Cmd::new("echo").arg("hello")).unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let output = System.run(&Cmd::new("false")).unwrap();
        assert!(!output.status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_finishes_in_time() {
        let cmd = Cmd::new("echo").arg("done").timeout(Duration::from_secs(5));
        let output = System.run(&cmd).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "done");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let cmd = Cmd::new("sleep").arg("5").timeout(Duration::from_millis(200));
        let start = Instant::now();
        let err = System.run(&cmd).unwrap_err();
        assert!(matches!(err, ExecError::Timeout { ref program, .. } if program == "sleep"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_covers_inherited_pipes() {
        // the shell exits at once; the backgrounded sleep keeps stdout open
        let cmd = Cmd::new("sh")
            .args(["-c", "sleep 6 & echo started"])
            .timeout(Duration::from_secs(1));
        let start = Instant::now();
        let err = System.run(&cmd).unwrap_err();
        assert!(matches!(err, ExecError::Timeout { ref program, .. } if program == "sh"));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_missing_program() {
        let cmd = Cmd::new("diagram-export-no-such-program-xyz");
        let err = System.run(&cmd).unwrap_err();
        assert!(matches!(err, ExecError::NotFound { .. }));

        let err = System.run(&cmd.timeout(Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, ExecError::NotFound { .. }));
    }

    #[test]
    fn test_is_available() {
        assert!(!System.is_available(OsStr::new("diagram-export-no-such-program-xyz")));
    }
}
