// ABOUTME: Interactive execution over a PTY shell channel.
// ABOUTME: Sends a command and queued inputs, polling for output after each send.

use super::criteria::{SuccessCriterion, check_success};
use super::error::{Error, Result};
use super::transport::{ShellChannel, TransportSession};
use std::time::{Duration, Instant};

/// Bytes requested per read while draining a burst of shell output.
pub const RECEIVE_CHUNK_SIZE: usize = 16 * 1024;

/// Polling behaviour for shell output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellOptions {
    /// Delay between readiness checks.
    pub poll_interval: Duration,
    /// Longest wait for the first byte of a burst; `None` waits forever.
    pub max_wait: Option<Duration>,
}

/// Where a shell conversation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Unopened,
    AwaitingBanner,
    AwaitingCommandEcho,
    /// Waiting on output for the input at this index.
    AwaitingInputEcho(usize),
    AwaitingTrailing,
    Closed,
}

/// Lines received from a shell.
///
/// Bytes of a UTF-8 sequence cut off at the end of a burst are held back and
/// decoded together with the next burst.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<String>,
    partial: Vec<u8>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Finish the transcript. Held-back bytes that never completed are
    /// decoded lossily onto the last line.
    pub fn into_lines(mut self) -> Vec<String> {
        if !self.partial.is_empty() {
            let rest = String::from_utf8_lossy(&self.partial).into_owned();
            match self.lines.last_mut() {
                Some(last) => last.push_str(&rest),
                None => self.lines.push(rest),
            }
        }
        self.lines
    }

    fn decode(&mut self, data: &[u8]) -> String {
        self.partial.extend_from_slice(data);
        let keep = incomplete_tail_len(&self.partial);
        let held = self.partial.split_off(self.partial.len() - keep);
        let text = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial = held;
        text
    }

    fn push_burst(&mut self, data: &[u8]) -> String {
        let text = self.decode(data);
        self.lines.extend(text.split("\r\n").map(str::to_string));
        text
    }
}

/// Length of a truncated UTF-8 sequence at the end of `bytes`, if any.
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    let mut start = 0;
    loop {
        match std::str::from_utf8(&bytes[start..]) {
            Ok(_) => return 0,
            Err(e) => match e.error_len() {
                None => return bytes.len() - start - e.valid_up_to(),
                Some(invalid) => start += e.valid_up_to() + invalid,
            },
        }
    }
}

struct Conversation {
    state: ShellState,
    transcript: Transcript,
}

impl Conversation {
    fn advance(&mut self, next: ShellState) {
        tracing::trace!(from = ?self.state, to = ?next, "shell state");
        self.state = next;
    }
}

/// Run `command` in a shell, feed `inputs` in order, and return every line
/// received. Output is split on `"\r\n"`; criteria see the lines joined with
/// no separator.
pub async fn shell_execute<S, I>(
    session: &S,
    hostname: &str,
    command: &str,
    inputs: &[I],
    success_criteria: &[SuccessCriterion],
    options: &ShellOptions,
) -> Result<Vec<String>>
where
    S: TransportSession,
    I: AsRef<str> + Sync,
{
    tracing::debug!("executing shell command \"{}\" on host {}", command, hostname);

    let mut conversation = Conversation {
        state: ShellState::Unopened,
        transcript: Transcript::new(),
    };
    let mut shell = session.open_shell().await?;

    let driven = drive(&mut shell, &mut conversation, command, inputs, options).await;
    let closed = shell.close().await;
    conversation.advance(ShellState::Closed);
    driven?;
    closed?;

    let lines = conversation.transcript.into_lines();
    tracing::debug!("{}", lines.join("\r\n"));

    if success_criteria.is_empty() {
        return Ok(lines);
    }

    let contents = lines.concat();
    tracing::debug!(
        "checking stdout for success responses {:?}",
        success_criteria
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
    if check_success(&contents, success_criteria) {
        Ok(lines)
    } else {
        Err(Error::Execution(
            "success responses not found in stdout".to_string(),
        ))
    }
}

async fn drive<C, I>(
    shell: &mut C,
    conversation: &mut Conversation,
    command: &str,
    inputs: &[I],
    options: &ShellOptions,
) -> Result<()>
where
    C: ShellChannel,
    I: AsRef<str> + Sync,
{
    conversation.advance(ShellState::AwaitingBanner);
    poll_receive(shell, &mut conversation.transcript, options).await?;

    conversation.advance(ShellState::AwaitingCommandEcho);
    shell.send(format!("{}\n", command).as_bytes()).await?;
    poll_receive(shell, &mut conversation.transcript, options).await?;

    for (index, input) in inputs.iter().enumerate() {
        conversation.advance(ShellState::AwaitingInputEcho(index));
        shell.send(format!("{}\n", input.as_ref()).as_bytes()).await?;
        poll_receive(shell, &mut conversation.transcript, options).await?;
    }

    conversation.advance(ShellState::AwaitingTrailing);
    poll_receive(shell, &mut conversation.transcript, options).await?;
    Ok(())
}

/// Wait until the shell has data, then read everything available and append
/// it to `transcript`. Returns the text of the burst.
///
/// A channel closed by the remote ends the wait with nothing appended.
pub async fn poll_receive<C: ShellChannel>(
    shell: &mut C,
    transcript: &mut Transcript,
    options: &ShellOptions,
) -> Result<String> {
    let started = Instant::now();
    while !shell.data_ready().await? {
        if shell.is_closed() {
            tracing::debug!("shell channel closed while waiting for output");
            return Ok(String::new());
        }
        if let Some(max_wait) = options.max_wait {
            if started.elapsed() >= max_wait {
                return Err(Error::ReceiveTimeout(max_wait));
            }
        }
        tokio::time::sleep(options.poll_interval).await;
    }

    let mut data = Vec::new();
    while shell.data_ready().await? {
        data.extend_from_slice(&shell.read(RECEIVE_CHUNK_SIZE).await?);
    }

    Ok(transcript.push_burst(&data))
}
