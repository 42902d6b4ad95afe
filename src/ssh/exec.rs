// ABOUTME: One-shot command execution over a session.
// ABOUTME: Optional stdin line, then success criteria or exit-code checking.

use super::criteria::{SuccessCriterion, check_success};
use super::error::{Error, Result};
use super::transport::{CommandChannel, TransportSession};
use crate::output::print_lines;

/// How a single command is run and judged.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Line written to stdin (newline appended) before output is read.
    pub input: Option<String>,
    /// When non-empty, these decide success and the exit code is ignored.
    pub success_criteria: Vec<SuccessCriterion>,
    /// Print stdout instead of returning it.
    pub print_output: bool,
    /// Exit code counted as success when no criteria are given.
    pub expected_exit_code: u32,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, line: impl Into<String>) -> Self {
        self.input = Some(line.into());
        self
    }

    pub fn success(mut self, criterion: SuccessCriterion) -> Self {
        self.success_criteria.push(criterion);
        self
    }

    pub fn success_criteria(mut self, criteria: impl IntoIterator<Item = SuccessCriterion>) -> Self {
        self.success_criteria.extend(criteria);
        self
    }

    pub fn print_output(mut self, print: bool) -> Self {
        self.print_output = print;
        self
    }

    pub fn expected_exit_code(mut self, code: u32) -> Self {
        self.expected_exit_code = code;
        self
    }
}

/// Run `command` and return its stdout lines.
///
/// Lines keep their terminators, so joining them gives back stdout exactly.
/// With `print_output` set and no criteria, the lines are printed and an
/// empty vector is returned.
pub async fn execute<S: TransportSession>(
    session: &S,
    hostname: &str,
    command: &str,
    options: &ExecOptions,
) -> Result<Vec<String>> {
    tracing::debug!("executing command \"{}\" on host {}", command, hostname);
    let mut channel = session.exec(command).await?;

    if let Some(input) = &options.input {
        tracing::debug!("sending stdin");
        channel.write_stdin(format!("{}\n", input).as_bytes()).await?;
    }

    let stdout = channel.read_stdout_to_end().await?;
    let contents = String::from_utf8_lossy(&stdout).into_owned();
    tracing::debug!("\r\n{}", contents);
    let lines = split_lines(&contents);

    if !options.success_criteria.is_empty() {
        tracing::debug!(
            "checking stdout for success responses {:?}",
            options
                .success_criteria
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
        if check_success(&contents, &options.success_criteria) {
            return Ok(lines);
        }
        return Err(Error::Execution(
            "success responses not found in stdout".to_string(),
        ));
    }

    let exit_code = channel.exit_status().await?;
    if exit_code != options.expected_exit_code {
        let stderr = channel.read_stderr_to_end().await?;
        return Err(Error::Execution(format!(
            "{}exit code: {}",
            String::from_utf8_lossy(&stderr),
            exit_code
        )));
    }

    if options.print_output {
        print_lines(&lines);
        return Ok(Vec::new());
    }

    Ok(lines)
}

fn split_lines(contents: &str) -> Vec<String> {
    contents.split_inclusive('\n').map(str::to_string).collect()
}
