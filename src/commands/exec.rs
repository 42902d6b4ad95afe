// ABOUTME: Exec command implementation.
// ABOUTME: Connects, runs one command, reports its output, and disconnects.

use futures::FutureExt;
use sshexec::error::Result;
use sshexec::output::Output;
use sshexec::ssh::{Client, ClientConfig, ExecOptions};

/// Run `command` on the configured host.
pub async fn exec_command(
    config: ClientConfig,
    command: String,
    options: ExecOptions,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();
    let client = Client::connect(config).await?;
    let hostname = client.hostname().to_string();

    let lines = client
        .scoped(|c| async move { c.execute(&command, &options).await }.boxed())
        .await?;

    output.result(&hostname, &lines);
    Ok(())
}
