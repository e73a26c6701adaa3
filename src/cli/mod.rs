//! CLI module for the HireHub API
//!
//! - `serve`: run the HTTP server and the session sweeper
//! - `migrate`: apply PostgreSQL schema migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// HireHub API - accounts, sessions and profiles
#[derive(Parser)]
#[command(name = "hirehub-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,
}
