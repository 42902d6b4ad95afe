// ABOUTME: Entry point for the sshexec CLI application.
// ABOUTME: Parses arguments, sets up logging, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use sshexec::error::Result;
use sshexec::output::{Output, OutputMode};
use sshexec::ssh::ExecOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("sshexec=debug,warn")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let config = commands::client_config(&cli.connection)?;

    match cli.command {
        Commands::Exec {
            command,
            input,
            success,
            expect_exit,
            print,
        } => {
            let options = ExecOptions {
                input,
                success_criteria: commands::parse_criteria(&success)?,
                print_output: print,
                expected_exit_code: expect_exit,
            };
            commands::exec_command(config, command, options, output).await
        }
        Commands::Shell {
            command,
            inputs,
            success,
        } => {
            let criteria = commands::parse_criteria(&success)?;
            commands::shell_command(config, command, inputs, criteria, output).await
        }
    }
}
