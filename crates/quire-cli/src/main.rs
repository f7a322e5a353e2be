//! `Quire` CLI: manage the users file read by the `Quire` server.
//!
//! Works directly on the JSON users file; the server does not need to be
//! running, and picks up changes on the next sign-in attempt.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quire_core::credentials::{UsersFile, hash_password};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

// ── CLI structure ────────────────────────────────────────────────────

/// Quire: a small markdown and text document manager.
#[derive(Parser)]
#[command(
    name = "quire",
    version,
    about = "Quire CLI: hash passwords and manage users",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         QUIRE_USERS_FILE   Users file (default: ./users.json)\n\n\
         {DIM}Examples:{RESET}\n  \
         quire hash-password 'correct horse'\n  \
         quire add-user admin 'correct horse'\n  \
         quire list-users --users-file /etc/quire/users.json"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an Argon2id hash of a password.
    HashPassword {
        /// The password to hash.
        password: String,
    },
    /// Add a user to the users file, or replace their password.
    AddUser {
        /// Users file to update (created if missing).
        #[arg(long, env = "QUIRE_USERS_FILE", default_value = "./users.json")]
        users_file: PathBuf,
        /// Username to add.
        username: String,
        /// The user's password. Only its hash is stored.
        password: String,
    },
    /// List the usernames in the users file.
    ListUsers {
        /// Users file to read.
        #[arg(long, env = "QUIRE_USERS_FILE", default_value = "./users.json")]
        users_file: PathBuf,
    },
}

// ── Entry point ──────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{RED}{BOLD}✗ Error:{RESET} {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::HashPassword { password } => cmd_hash_password(&password),
        Commands::AddUser {
            users_file,
            username,
            password,
        } => cmd_add_user(users_file, &username, &password).await,
        Commands::ListUsers { users_file } => cmd_list_users(users_file).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

fn cmd_hash_password(password: &str) -> Result<()> {
    let hash = hash_password(password).context("failed to hash password")?;
    // Bare output so it can be pasted or piped.
    println!("{hash}");
    Ok(())
}

async fn cmd_add_user(users_file: PathBuf, username: &str, password: &str) -> Result<()> {
    let hash = hash_password(password).context("failed to hash password")?;
    let users = UsersFile::new(users_file);

    let replaced = users
        .upsert(username, &hash)
        .await
        .with_context(|| format!("failed to update {}", users.path().display()))?;

    let verb = if replaced { "updated" } else { "added" };
    println!(
        "{GREEN}{BOLD}✓{RESET} {verb} user {username} in {}",
        users.path().display()
    );
    Ok(())
}

async fn cmd_list_users(users_file: PathBuf) -> Result<()> {
    let users = UsersFile::new(users_file);
    let known = users
        .load()
        .await
        .with_context(|| format!("failed to read {}", users.path().display()))?;

    if known.is_empty() {
        eprintln!("{DIM}no users in {}{RESET}", users.path().display());
        return Ok(());
    }

    let mut names: Vec<_> = known.into_iter().map(|u| u.username).collect();
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}
