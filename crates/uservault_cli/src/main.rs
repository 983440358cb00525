//! Command-line front end for the vault core.
//!
//! # Responsibility
//! - Map subcommands onto `AuthenticatedDataService` calls.
//! - Print successful results as JSON on stdout.
//! - Report failures on stderr with an exit code derived from the status class.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use uservault_core::{init_logging, AuthenticatedDataService, ServiceConfig, ServiceError};

#[derive(Debug, Parser)]
#[command(name = "uservault", version, about = "Per-user named value storage")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides the configured `db_path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Version,
    #[command(flatten)]
    Data(DataCommand),
}

/// Subcommands served by the data service.
#[derive(Debug, Subcommand)]
enum DataCommand {
    /// Create an account.
    Register { username: String, password: String },
    /// Check a username/password pair.
    Login { username: String, password: String },
    /// Store or replace a named value.
    Put {
        username: String,
        password: String,
        name: String,
        value: String,
    },
    /// Read a named value.
    Get {
        username: String,
        password: String,
        name: String,
    },
    /// Remove a named value (no password required).
    Delete { username: String, name: String },
    /// List every stored name of an account (no password required).
    Names { username: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Version => {
            println!("uservault_core version={}", uservault_core::core_version());
            return ExitCode::SUCCESS;
        }
        Command::Data(command) => command,
    };

    let mut config = match ServiceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let service = match AuthenticatedDataService::from_config(&config) {
        Ok(service) => service,
        Err(err) => return report(&err),
    };
    info!("event=cli_command module=cli status=start");

    match run(&service, command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => report(&err),
    }
}

fn run(service: &AuthenticatedDataService, command: DataCommand) -> Result<String, ServiceError> {
    let output = match command {
        DataCommand::Register { username, password } => {
            let id = service.register(&username, &password)?;
            serde_json::json!({ "status": 201, "accountId": id })
        }
        DataCommand::Login { username, password } => {
            let id = service.login(&username, &password)?;
            serde_json::json!({ "status": 200, "accountId": id })
        }
        DataCommand::Put {
            username,
            password,
            name,
            value,
        } => {
            let outcome = service.put(&username, &password, &name, &value)?;
            serde_json::json!({ "status": 200, "outcome": outcome })
        }
        DataCommand::Get {
            username,
            password,
            name,
        } => serde_json::json!(service.get(&username, &password, &name)?),
        DataCommand::Delete { username, name } => {
            service.delete(&username, &name)?;
            serde_json::json!({ "status": 200 })
        }
        DataCommand::Names { username } => serde_json::json!(service.list_names(&username)?),
    };
    Ok(output.to_string())
}

fn report(err: &ServiceError) -> ExitCode {
    eprintln!(
        "error: status={} code={} message={}",
        err.status_code(),
        err.code(),
        err
    );
    // 4xx -> 4, 5xx -> 5
    ExitCode::from((err.status_code() / 100) as u8)
}
