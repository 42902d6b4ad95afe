// ABOUTME: Library root for sshexec - remote command execution over SSH.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod error;
pub mod output;
pub mod ssh;
