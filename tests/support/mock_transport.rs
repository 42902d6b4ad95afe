// ABOUTME: Scripted transport that plays back connect results and channel output.
// ABOUTME: Records every connect attempt, command, stdin write and shell send.

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use sshexec::ssh::{
    ClientConfig, CommandChannel, Result, ShellChannel, Transport, TransportError,
    TransportSession,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Everything the code under test did against the transport.
#[derive(Debug, Default)]
pub struct Recorded {
    pub connect_attempts: Vec<String>,
    pub commands: Vec<String>,
    pub stdin: Vec<String>,
    pub shell_sends: Vec<String>,
    pub shells_opened: usize,
    pub shells_closed: usize,
    pub disconnects: usize,
}

/// Playback for every command run on a session.
#[derive(Debug, Clone, Default)]
pub struct CommandScript {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u32,
}

/// Playback for shells: one burst per poll-receive, in order.
#[derive(Debug, Clone, Default)]
pub struct ShellScript {
    pub bursts: Vec<String>,
    /// Report the channel as closed once the bursts run out.
    pub close_when_exhausted: bool,
}

#[derive(Default)]
pub struct MockTransport {
    failures: HashMap<String, TransportError>,
    command: CommandScript,
    shell: ShellScript,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make connecting to `host` fail with `err`.
    pub fn fail(mut self, host: &str, err: TransportError) -> Self {
        self.failures.insert(host.to_string(), err);
        self
    }

    pub fn command(mut self, script: CommandScript) -> Self {
        self.command = script;
        self
    }

    pub fn shell(mut self, script: ShellScript) -> Self {
        self.shell = script;
        self
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock()
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Session = MockSession;

    async fn connect(
        &self,
        host: &str,
        _config: &ClientConfig,
    ) -> std::result::Result<MockSession, TransportError> {
        self.recorded.lock().connect_attempts.push(host.to_string());
        if let Some(err) = self.failures.get(host) {
            return Err(err.clone());
        }
        Ok(MockSession {
            command: self.command.clone(),
            shell: self.shell.clone(),
            recorded: Arc::clone(&self.recorded),
        })
    }
}

pub struct MockSession {
    command: CommandScript,
    shell: ShellScript,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl TransportSession for MockSession {
    type Command = MockCommand;
    type Shell = MockShell;

    async fn exec(&self, command: &str) -> Result<MockCommand> {
        self.recorded.lock().commands.push(command.to_string());
        Ok(MockCommand {
            script: self.command.clone(),
            recorded: Arc::clone(&self.recorded),
        })
    }

    async fn open_shell(&self) -> Result<MockShell> {
        self.recorded.lock().shells_opened += 1;
        Ok(MockShell {
            bursts: self
                .shell
                .bursts
                .iter()
                .map(|b| b.as_bytes().to_vec())
                .collect(),
            pending: Vec::new(),
            burst_open: false,
            close_when_exhausted: self.shell.close_when_exhausted,
            closed: false,
            recorded: Arc::clone(&self.recorded),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        self.recorded.lock().disconnects += 1;
        Ok(())
    }
}

pub struct MockCommand {
    script: CommandScript,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl CommandChannel for MockCommand {
    async fn write_stdin(&mut self, data: &[u8]) -> Result<()> {
        self.recorded
            .lock()
            .stdin
            .push(String::from_utf8_lossy(data).into_owned());
        Ok(())
    }

    async fn read_stdout_to_end(&mut self) -> Result<Vec<u8>> {
        Ok(self.script.stdout.as_bytes().to_vec())
    }

    async fn read_stderr_to_end(&mut self) -> Result<Vec<u8>> {
        Ok(self.script.stderr.as_bytes().to_vec())
    }

    async fn exit_status(&mut self) -> Result<u32> {
        Ok(self.script.exit_status)
    }
}

/// Each burst becomes ready on the first readiness check after the previous
/// burst was fully read; the check in between reports nothing ready.
pub struct MockShell {
    bursts: VecDeque<Vec<u8>>,
    pending: Vec<u8>,
    burst_open: bool,
    close_when_exhausted: bool,
    closed: bool,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl ShellChannel for MockShell {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.recorded
            .lock()
            .shell_sends
            .push(String::from_utf8_lossy(data).into_owned());
        Ok(())
    }

    async fn data_ready(&mut self) -> Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        if self.burst_open {
            self.burst_open = false;
            return Ok(false);
        }
        match self.bursts.pop_front() {
            Some(burst) => {
                self.pending = burst;
                self.burst_open = true;
                Ok(!self.pending.is_empty())
            }
            None => {
                if self.close_when_exhausted {
                    self.closed = true;
                }
                Ok(false)
            }
        }
    }

    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let n = max_bytes.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.recorded.lock().shells_closed += 1;
        Ok(())
    }
}
