//! CLI module for the signup service
//!
//! Provides subcommands:
//! - `serve`: HTTP server (default)
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Signup Service - user registration over HTTP
#[derive(Parser)]
#[command(name = "signup-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}
