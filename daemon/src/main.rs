//! boda-verifier: command line entry point to the rider identity pipeline.

mod config;
mod directory;
mod services;

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use boda_crypto::{generate_key_hex, generate_salt_hex, KeyMaterial};
use boda_identity::Access;
use boda_types::{Actor, ReviewDecision, RiderId};
use boda_utils::{init_logging, LogFormat};
use clap::Parser;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::config::VerifierConfig;
use crate::services::Services;

#[derive(Parser)]
#[command(name = "boda-verifier", about = "Rider identity store and photo verification")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "BODA_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file).
    #[arg(long, env = "BODA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BODA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BODA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Caller identity: "system", "admin:<user>", "agent:<id>" or "rider:<id>".
    #[arg(long, env = "BODA_ACTOR", default_value = "system")]
    actor: Actor,

    /// Why the caller needs the data; recorded in the audit log.
    #[arg(long, default_value = "command line access")]
    reason: String,

    /// Client address recorded in the audit log.
    #[arg(long)]
    client_ip: Option<IpAddr>,

    /// Active encryption key, hex, optionally prefixed with "<key id>:".
    #[arg(long, env = "BODA_ID_ENCRYPTION_KEY", hide_env_values = true)]
    encryption_key: Option<String>,

    /// Retired keys still accepted for decryption, comma separated.
    #[arg(
        long,
        env = "BODA_ID_RETIRED_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    retired_keys: Vec<String>,

    /// Verification hash salt, hex.
    #[arg(long, env = "BODA_ID_HASH_SALT", hide_env_values = true)]
    hash_salt: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a fresh encryption key and hash salt.
    Keygen,
    /// Print the effective configuration as TOML.
    ShowConfig,
    /// Store a rider's national ID.
    SetId {
        #[arg(long)]
        rider: RiderId,
        #[arg(long)]
        id: String,
    },
    /// Reveal a rider's national ID.
    GetId {
        #[arg(long)]
        rider: RiderId,
    },
    /// Show a rider's masked national ID.
    Masked {
        #[arg(long)]
        rider: RiderId,
    },
    /// Reveal the IDs of several riders, skipping those the actor may not see.
    Export {
        #[arg(long, value_delimiter = ',', required = true)]
        riders: Vec<RiderId>,
    },
    /// Record a decision on the national ID itself.
    ReviewId {
        #[arg(long)]
        rider: RiderId,
        #[arg(long)]
        decision: ReviewDecision,
    },
    /// Re-seal a rider's ID under the active key.
    Rotate {
        #[arg(long)]
        rider: RiderId,
    },
    /// Run photo verification.
    Verify {
        #[arg(long)]
        rider: RiderId,
    },
    /// Run photo verification, replacing a reviewer decision.
    Reverify {
        #[arg(long)]
        rider: RiderId,
    },
    /// Record a reviewer decision on photo verification.
    Override {
        #[arg(long)]
        rider: RiderId,
        #[arg(long)]
        decision: ReviewDecision,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Show stored verification results without running anything.
    Report {
        #[arg(long)]
        rider: RiderId,
    },
    /// Show the audit trail for a rider, newest first. Administrators only.
    Audit {
        #[arg(long)]
        rider: RiderId,
    },
    /// List riders awaiting review.
    Pending,
    /// Fleet-wide verification figures.
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VerifierConfig::from_toml_file(path)?,
        None => VerifierConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format, &config.log_level);

    match &cli.command {
        Command::Keygen => {
            let key = Zeroizing::new(generate_key_hex());
            println!("BODA_ID_ENCRYPTION_KEY={}", key.as_str());
            println!("BODA_ID_HASH_SALT={}", generate_salt_hex());
            return Ok(());
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        _ => {}
    }

    let keys = key_material(&cli)?;
    let services = services::build(&config, keys)?;
    tracing::debug!(actor = %cli.actor, data_dir = %config.data_dir.display(), "services ready");
    run(&cli, &services)
}

fn key_material(cli: &Cli) -> anyhow::Result<KeyMaterial> {
    let (Some(key), Some(salt)) = (&cli.encryption_key, &cli.hash_salt) else {
        bail!(
            "BODA_ID_ENCRYPTION_KEY and BODA_ID_HASH_SALT must be set \
             (generate them with `boda-verifier keygen`)"
        );
    };
    let key = Zeroizing::new(key.clone());
    let retired = Zeroizing::new(cli.retired_keys.clone());
    KeyMaterial::from_config(&key, &retired, salt).context("invalid key material")
}

fn run(cli: &Cli, services: &Services) -> anyhow::Result<()> {
    let actor = &cli.actor;
    let access = Access::new(actor.clone(), cli.reason.clone()).with_client(cli.client_ip, None);
    let identity = &services.identity;
    let orchestrator = &services.orchestrator;

    match &cli.command {
        Command::Keygen | Command::ShowConfig => {}
        Command::SetId { rider, id } => {
            let id = Zeroizing::new(id.clone());
            identity.set(rider, &id, &access)?;
            println!("stored national ID for {rider}");
        }
        Command::GetId { rider } => {
            let id = identity.get(rider, &access)?;
            println!("{}", id.as_str());
        }
        Command::Masked { rider } => match identity.masked(rider)? {
            Some(masked) => println!("{masked}"),
            None => println!("no national ID on record for {rider}"),
        },
        Command::Export { riders } => {
            for exported in identity.export(riders, &access)? {
                println!("{}\t{}", exported.rider, exported.national_id.as_str());
            }
        }
        Command::ReviewId { rider, decision } => {
            identity.review(rider, &access, decision.status())?;
            println!("national ID for {rider} marked {}", decision.status());
        }
        Command::Rotate { rider } => {
            if identity.rotate(rider, &access)? {
                println!("resealed national ID for {rider}");
            } else {
                println!("national ID for {rider} already uses the active key");
            }
        }
        Command::Verify { rider } => print_json(&orchestrator.verify(rider, actor)?)?,
        Command::Reverify { rider } => print_json(&orchestrator.reverify(rider, actor)?)?,
        Command::Override {
            rider,
            decision,
            notes,
        } => print_json(&orchestrator.override_decision(rider, actor, *decision, notes)?)?,
        Command::Report { rider } => print_json(&orchestrator.report(rider, actor)?)?,
        Command::Audit { rider } => {
            if !matches!(actor, Actor::Administrator(_)) {
                bail!("{actor} may not read the audit log");
            }
            print_json(&identity.audit_log().entries_for(rider)?)?;
        }
        Command::Pending => print_json(&orchestrator.pending_reviews(actor)?)?,
        Command::Stats => print_json(&orchestrator.statistics(actor)?)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
