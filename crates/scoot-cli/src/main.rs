//! `scoot`: command-line client for the ScootScoot onboarding API.
//!
//! # Usage
//!
//! ```
//! scoot --url http://localhost:8080 create --shop shop-1
//! scoot activate 483920 --rider rider-7
//! scoot step <session-id> basic-info
//! scoot --config ~/.config/scoot/config.toml shop shop-1
//! ```

mod client;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use scoot_core::{
  session::{NewNotification, NotificationChannel, SessionStatus},
  step::OnboardingStep,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "scoot", about = "Command-line client for ScootScoot rider onboarding")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the scoot server (default: http://localhost:8080).
  #[arg(long, env = "SCOOT_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Start an onboarding session for a shop.
  Create {
    #[arg(long)]
    shop:  String,
    /// Session lifetime in hours (server default if omitted).
    #[arg(long)]
    hours: Option<u32>,
  },
  /// Show one session.
  Show { id: Uuid },
  /// Look a session up by activation code.
  Code { code: String },
  /// List a shop's sessions.
  Shop { shop_id: String },
  /// List a rider's sessions.
  Rider { rider_id: String },
  /// Activate a session with a typed code or a scanned link.
  Activate {
    code_or_link: String,
    #[arg(long)]
    rider:        String,
  },
  /// Mark a step complete (or incomplete with --undo).
  Step {
    id:   Uuid,
    step: OnboardingStep,
    #[arg(long)]
    undo: bool,
  },
  /// Move a session to another status.
  Status { id: Uuid, status: SessionStatus },
  /// Record a notification sent for a session.
  Notify {
    id:        Uuid,
    #[arg(long)]
    channel:   NotificationChannel,
    #[arg(long)]
    recipient: String,
    #[arg(long)]
    template:  String,
    /// Record the delivery as failed.
    #[arg(long)]
    failed:    bool,
  },
  /// Push a session's deadline back.
  Extend { id: Uuid, hours: u32 },
  /// Merge `key=value` pairs into a session's metadata. Values that parse as
  /// JSON are stored as JSON, anything else as a string.
  Meta {
    id:      Uuid,
    #[arg(required = true, value_parser = parse_pair)]
    entries: Vec<(String, Value)>,
  },
  /// Expire every overdue session now.
  Sweep,
}

fn parse_pair(raw: &str) -> Result<(String, Value)> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| anyhow!("expected key=value, got {raw:?}"))?;
  let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
  Ok((key.to_owned(), value))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Create { shop, hours } => print(&client.create(&shop, hours).await?),
    Command::Show { id } => print(&client.get(id).await?),
    Command::Code { code } => print(&client.by_code(&code).await?),
    Command::Shop { shop_id } => print(&client.by_shop(&shop_id).await?),
    Command::Rider { rider_id } => print(&client.by_rider(&rider_id).await?),
    Command::Activate { code_or_link, rider } => {
      print(&client.activate(&code_or_link, &rider).await?)
    }
    Command::Step { id, step, undo } => print(&client.step(id, step, !undo).await?),
    Command::Status { id, status } => print(&client.status(id, status).await?),
    Command::Notify { id, channel, recipient, template, failed } => {
      let notification = NewNotification { channel, recipient, template, successful: !failed };
      print(&client.notify(id, &notification).await?)
    }
    Command::Extend { id, hours } => print(&client.extend(id, hours).await?),
    Command::Meta { id, entries } => {
      let entries: Map<String, Value> = entries.into_iter().collect();
      print(&client.metadata(id, &entries).await?)
    }
    Command::Sweep => print(&client.sweep().await?),
  }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("serialising response")?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pairs_parse_json_or_fall_back_to_string() {
    assert_eq!(parse_pair("fleet=3").unwrap(), ("fleet".into(), Value::from(3)));
    assert_eq!(parse_pair("kiosk=front-desk").unwrap(), ("kiosk".into(), Value::from("front-desk")));
    assert!(parse_pair("no-equals").is_err());
  }

  #[test]
  fn step_and_status_arguments_parse() {
    let id = Uuid::nil().to_string();

    let args = Args::try_parse_from(["scoot", "step", id.as_str(), "face-verification"]).unwrap();
    assert!(matches!(
      args.command,
      Command::Step { step: OnboardingStep::FaceVerification, undo: false, .. }
    ));

    let args = Args::try_parse_from(["scoot", "status", id.as_str(), "in_progress"]).unwrap();
    assert!(matches!(args.command, Command::Status { status: SessionStatus::InProgress, .. }));

    assert!(Args::try_parse_from(["scoot", "step", id.as_str(), "selfie"]).is_err());
  }
}
