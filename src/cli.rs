// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Connection flags plus the exec and shell subcommands.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sshexec")]
#[command(about = "Run commands on a remote host over SSH and check their outcome")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only remote output
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Connection file (defaults to ./sshexec.yml when --host is not given)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target as [user@]host[:port]; password is read from SSHEXEC_PASSWORD
    #[arg(long, conflicts_with = "config")]
    pub host: Option<String>,

    /// Remote user (when not part of --host)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Domain suffix to try after the host name, in order (repeatable)
    #[arg(long = "domain")]
    pub domains: Vec<String>,

    /// Connection timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Accept and remember host keys missing from known_hosts
    #[arg(long)]
    pub accept_unknown_host_key: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a command and check its exit code or output
    Exec {
        /// Command line to run
        command: String,

        /// Line to write to the command's stdin
        #[arg(long)]
        input: Option<String>,

        /// Success criterion: literal text, or {regex}PATTERN (repeatable)
        #[arg(long = "success")]
        success: Vec<String>,

        /// Exit code that counts as success
        #[arg(long, default_value_t = 0)]
        expect_exit: u32,

        /// Print output as it is returned instead of as a result
        #[arg(long)]
        print: bool,
    },

    /// Run a command in an interactive shell, feeding inputs in order
    Shell {
        /// Command line to run
        command: String,

        /// Input line sent after the command (repeatable, in order)
        #[arg(long = "send")]
        inputs: Vec<String>,

        /// Success criterion: literal text, or {regex}PATTERN (repeatable)
        #[arg(long = "success")]
        success: Vec<String>,
    },
}
