use crate::{
    error::Result,
    navigator::{
        pattern::{LocationPattern, scan},
        sink::{OutputSink, Stream},
    },
    types::{Invocation, RunState, SourceLocation},
};
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Output collected so far, shared with the reader threads.
#[derive(Debug, Default)]
struct Captured {
    text: Mutex<String>,
    discarded: AtomicBool,
}

impl Captured {
    fn push_line(&self, line: &str) {
        let mut text = self.text.lock().unwrap_or_else(|p| p.into_inner());
        // checked under the lock so nothing lands after discard()
        if self.discarded.load(Ordering::Acquire) {
            return;
        }
        text.push_str(line);
        text.push('\n');
    }

    fn snapshot(&self) -> String {
        self.text.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn discard(&self) {
        let mut text = self.text.lock().unwrap_or_else(|p| p.into_inner());
        self.discarded.store(true, Ordering::Release);
        text.clear();
    }
}

/// A running (or finished) jest process.
pub struct ProcessHandle {
    invocation: Invocation,
    child: Child,
    captured: Arc<Captured>,
    readers: Vec<JoinHandle<()>>,
    patterns: Arc<Vec<LocationPattern>>,
    state: RunState,
}

fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

fn spawn_reader<R>(
    stream: Stream,
    source: R,
    captured: Arc<Captured>,
    sink: Arc<dyn OutputSink>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    if !captured.discarded.load(Ordering::Acquire) {
                        sink.write_line(stream, line);
                    }
                    captured.push_line(line);
                }
                Err(e) => {
                    warn!("Failed to read runner {:?}: {}", stream, e);
                    break;
                }
            }
        }
    })
}

impl ProcessHandle {
    pub(crate) fn spawn(
        invocation: Invocation,
        sink: Arc<dyn OutputSink>,
        patterns: Arc<Vec<LocationPattern>>,
    ) -> Result<Self> {
        info!("Running: {}", invocation.command);
        debug!("Working directory: {}", invocation.working_dir.display());

        let mut cmd = shell_command(invocation.command.as_str());
        cmd.current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Stays in the caller's process group so a terminal Ctrl-C reaches it
        let mut child = cmd.spawn()?;
        let captured = Arc::new(Captured::default());
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(
                Stream::Stdout,
                stdout,
                Arc::clone(&captured),
                Arc::clone(&sink),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(
                Stream::Stderr,
                stderr,
                Arc::clone(&captured),
                sink,
            ));
        }

        Ok(Self {
            invocation,
            child,
            captured,
            readers,
            patterns,
            state: RunState::Running,
        })
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Current state without blocking.
    pub fn state(&mut self) -> Result<RunState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if let Some(status) = self.child.try_wait()? {
            self.finish(status);
        }
        Ok(self.state)
    }

    /// Block until the process exits and all of its output has been read.
    pub fn wait(&mut self) -> Result<RunState> {
        if !self.state.is_terminal() {
            let status = self.child.wait()?;
            self.finish(status);
        }
        self.join_readers();
        Ok(self.state)
    }

    /// Kill the process and drop whatever output it produced.
    ///
    /// A process that already finished keeps its terminal state.
    pub fn cancel(&mut self) -> Result<RunState> {
        if self.state()?.is_terminal() {
            return Ok(self.state);
        }

        self.captured.discard();
        self.kill_descendants();
        if let Err(e) = self.child.kill() {
            debug!("kill runner shell: {}", e);
        }
        self.child.wait()?;
        // Readers are left to drain pipes still held by grandchildren.
        self.readers.clear();
        self.state = RunState::Cancelled;
        info!("Cancelled: {}", self.invocation.command);
        Ok(self.state)
    }

    /// Output received so far, stdout and stderr interleaved by arrival.
    pub fn output(&self) -> String {
        self.captured.snapshot()
    }

    /// Locations found in the output received so far.
    pub fn locations(&self) -> Vec<SourceLocation> {
        scan(&self.patterns, &self.output())
    }

    fn finish(&mut self, status: ExitStatus) {
        self.state = if status.success() {
            RunState::Succeeded
        } else {
            RunState::Failed {
                code: status.code(),
            }
        };
        debug!("{} finished: {:?}", self.invocation.command, self.state);
    }

    fn join_readers(&mut self) {
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                warn!("Output reader thread panicked");
            }
        }
    }

    /// SIGTERM everything the shell started, deepest processes first.
    #[cfg(unix)]
    fn kill_descendants(&self) {
        let mut pids = Vec::new();
        collect_descendants(self.child.id(), &mut pids);
        if pids.is_empty() {
            return;
        }
        pids.reverse();
        debug!("Terminating {} descendant(s) of {}", pids.len(), self.child.id());

        for pid in pids {
            // SAFETY: plain syscall; a pid that already exited just yields ESRCH.
            if unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } != 0 {
                debug!("kill {}: {}", pid, std::io::Error::last_os_error());
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_descendants(&self) {}
}

/// Children of `pid`, then their children, and so on.
#[cfg(unix)]
fn collect_descendants(pid: u32, out: &mut Vec<u32>) {
    for child in child_pids(pid) {
        if out.contains(&child) {
            continue;
        }
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Parent pid and process group from the contents of `/proc/<pid>/stat`.
#[cfg(target_os = "linux")]
fn parse_stat(stat: &str) -> Option<(u32, u32)> {
    // comm may contain spaces and parens; fields resume after the last ')'
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace().skip(1);
    let ppid = fields.next()?.parse().ok()?;
    let pgrp = fields.next()?.parse().ok()?;
    Some((ppid, pgrp))
}

#[cfg(target_os = "linux")]
fn child_pids(pid: u32) -> Vec<u32> {
    let entries = match std::fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list /proc: {}", e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<u32>().ok())
        .filter(|candidate| {
            std::fs::read_to_string(format!("/proc/{candidate}/stat"))
                .ok()
                .and_then(|stat| parse_stat(&stat))
                .is_some_and(|(ppid, _)| ppid == pid)
        })
        .collect()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn child_pids(pid: u32) -> Vec<u32> {
    match Command::new("pgrep")
        .args(["-P", &pid.to_string()])
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect(),
        Err(e) => {
            debug!("pgrep -P {} failed: {}", pid, e);
            Vec::new()
        }
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("invocation", &self.invocation)
            .field("pid", &self.child.id())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::navigator::sink::MemorySink;
    use crate::{command::CommandBuilder, types::OptionSet};
    use tempfile::TempDir;

    fn invocation(line: &str, dir: &TempDir) -> Invocation {
        let command = CommandBuilder::default().build(line, &OptionSet::default(), "");
        Invocation::new(command, dir.path())
    }

    fn jest_patterns() -> Arc<Vec<LocationPattern>> {
        Arc::new(vec![LocationPattern::jest()])
    }

    #[test]
    fn test_streams_output_and_succeeds() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::new());
        let mut handle = ProcessHandle::spawn(
            invocation("echo one; echo two >&2", &dir),
            sink.clone(),
            jest_patterns(),
        )
        .unwrap();

        assert_eq!(handle.wait().unwrap(), RunState::Succeeded);
        let output = handle.output();
        assert!(output.contains("one\n"));
        assert!(output.contains("two\n"));

        let lines = sink.lines();
        assert!(lines.contains(&(Stream::Stdout, "one".to_string())));
        assert!(lines.contains(&(Stream::Stderr, "two".to_string())));
    }

    #[test]
    fn test_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let mut handle = ProcessHandle::spawn(
            invocation("cat marker.txt", &dir),
            Arc::new(MemorySink::new()),
            jest_patterns(),
        )
        .unwrap();

        handle.wait().unwrap();
        assert_eq!(handle.output(), "here\n");
    }

    #[test]
    fn test_failure_still_yields_locations() {
        let dir = TempDir::new().unwrap();
        let script = "echo '    at Object.<anonymous> (src/sum.test.js:4:17)'; exit 1";
        let mut handle =
            ProcessHandle::spawn(invocation(script, &dir), Arc::new(MemorySink::new()), jest_patterns())
                .unwrap();

        assert_eq!(handle.wait().unwrap(), RunState::Failed { code: Some(1) });
        assert_eq!(
            handle.locations(),
            vec![SourceLocation::new("src/sum.test.js", 4, 17)]
        );
    }

    #[test]
    fn test_cancel_running_process() {
        let dir = TempDir::new().unwrap();
        let mut handle = ProcessHandle::spawn(
            invocation("echo '    at f (a.js:1:1)'; sleep 30", &dir),
            Arc::new(MemorySink::new()),
            jest_patterns(),
        )
        .unwrap();

        assert_eq!(handle.state().unwrap(), RunState::Running);
        assert_eq!(handle.cancel().unwrap(), RunState::Cancelled);
        assert_eq!(handle.state().unwrap(), RunState::Cancelled);
        assert!(handle.output().is_empty());
        assert!(handle.locations().is_empty());
    }

    #[cfg(target_os = "linux")]
    fn stat_of(pid: u32) -> Option<String> {
        std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()
    }

    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        stat_of(pid).is_some_and(|stat| {
            let state = stat[stat.rfind(')').unwrap() + 1..].split_whitespace().next();
            state != Some("Z")
        })
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_parse_stat_with_spaces_in_name() {
        let stat = "4242 (node (jest) worker) S 4200 4100 4100 0 -1 4194560";
        assert_eq!(parse_stat(stat), Some((4200, 4100)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_runner_shares_callers_process_group() {
        let dir = TempDir::new().unwrap();
        let mut handle = ProcessHandle::spawn(
            invocation("sleep 30", &dir),
            Arc::new(MemorySink::new()),
            jest_patterns(),
        )
        .unwrap();

        let ours = parse_stat(&stat_of(std::process::id()).unwrap()).unwrap().1;
        let theirs = parse_stat(&stat_of(handle.id()).unwrap()).unwrap().1;
        handle.cancel().unwrap();
        assert_eq!(theirs, ours);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_cancel_reaches_grandchildren() {
        let dir = TempDir::new().unwrap();
        let mut handle = ProcessHandle::spawn(
            invocation("sleep 30 & echo $!; wait", &dir),
            Arc::new(MemorySink::new()),
            jest_patterns(),
        )
        .unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let grandchild: u32 = loop {
            if let Some(pid) = handle.output().lines().next().and_then(|l| l.parse().ok()) {
                break pid;
            }
            assert!(std::time::Instant::now() < deadline, "no pid printed");
            std::thread::sleep(std::time::Duration::from_millis(20));
        };
        assert!(is_running(grandchild));

        assert_eq!(handle.cancel().unwrap(), RunState::Cancelled);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while is_running(grandchild) {
            assert!(std::time::Instant::now() < deadline, "sleep survived cancel");
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
    }

    #[test]
    fn test_cancel_after_exit_keeps_result() {
        let dir = TempDir::new().unwrap();
        let mut handle = ProcessHandle::spawn(
            invocation("true", &dir),
            Arc::new(MemorySink::new()),
            jest_patterns(),
        )
        .unwrap();

        handle.wait().unwrap();
        assert_eq!(handle.cancel().unwrap(), RunState::Succeeded);
    }
}
