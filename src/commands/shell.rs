// ABOUTME: Shell command implementation.
// ABOUTME: Drives an interactive shell through a command and its queued inputs.

use futures::FutureExt;
use sshexec::error::Result;
use sshexec::output::Output;
use sshexec::ssh::{Client, ClientConfig, SuccessCriterion};

/// Run `command` in a shell on the configured host, sending `inputs` in order.
pub async fn shell_command(
    config: ClientConfig,
    command: String,
    inputs: Vec<String>,
    success_criteria: Vec<SuccessCriterion>,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();
    let client = Client::connect(config).await?;
    let hostname = client.hostname().to_string();

    let lines = client
        .scoped(|c| {
            async move {
                c.shell_execute(&command, &inputs, &success_criteria)
                    .await
            }
            .boxed()
        })
        .await?;

    output.result(&hostname, &lines);
    Ok(())
}
