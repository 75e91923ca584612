use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use emotion_nudge::config::{default_data_dir, AppConfig, CONFIG_FILE};
use emotion_nudge::{logging, App, EmotionScores};

#[derive(Parser, Debug)]
#[command(name = "emotion-nudge")]
#[command(about = "Speaks short supportive nudges for the emotion the camera sees")]
struct Cli {
    /// Config file; defaults to config.json in the data directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `data_dir` from the config file.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user account.
    Register {
        username: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and run a detector session until the source ends or Ctrl-C.
    Run {
        username: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// One selection from a JSON score map such as '{"happy": 0.8}'.
    Select {
        scores: String,
        #[arg(long, default_value = "cli")]
        user: String,
        #[arg(long)]
        language: Option<String>,
    },
    /// Print a user's logged nudges.
    History { username: String },
    /// Delete a user's logged nudges.
    ClearHistory { username: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| cli.data_dir.as_ref().map(|dir| dir.join(CONFIG_FILE)))
        .unwrap_or_else(|| default_data_dir().join(CONFIG_FILE));
    let mut config = AppConfig::load(&config_path);
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    logging::init(&config.log);

    let app = App::new(config).context("failed to start")?;

    match cli.command {
        Command::Register { username, password } => {
            let password = match password {
                Some(password) => password,
                None => {
                    let first = prompt_password("Password: ")?;
                    let second = prompt_password("Confirm password: ")?;
                    confirm_password(first, &second)?
                }
            };
            app.register(&username, &password)?;
            println!("Registered {}", username);
        }
        Command::Run {
            username,
            password,
            language,
        } => {
            let password = password_or_prompt(password)?;
            app.login(&username, &password).context("login failed")?;

            let session = app.session(&username, language.as_deref())?;
            let stop = session.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("[Main] Ctrl-C received, stopping");
                    stop.stop();
                }
            });

            let report = session.run().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Select {
            scores,
            user,
            language,
        } => {
            let scores: EmotionScores =
                serde_json::from_str(&scores).context("scores must be a JSON object of numbers")?;
            let nudge = app.select(Some(&scores), language.as_deref(), &user)?;
            println!("{}", serde_json::to_string_pretty(&nudge)?);
        }
        Command::History { username } => {
            let records = app.history(&username)?;
            if records.is_empty() {
                println!("No history for {}", username);
            }
            for r in records {
                println!(
                    "{}  {:<9} {:>5.1}%  {}",
                    r.timestamp,
                    r.emotion,
                    r.confidence * 100.0,
                    r.response
                );
            }
        }
        Command::ClearHistory { username } => {
            let removed = app.clear_history(&username)?;
            println!("Removed {} records for {}", removed, username);
        }
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_password("Password: "),
    }
}

fn confirm_password(password: String, confirmation: &str) -> Result<String> {
    if password != confirmation {
        bail!("passwords do not match");
    }
    Ok(password)
}

fn prompt_password(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_confirmation_is_rejected() {
        assert!(confirm_password("s3cret".to_string(), "s3cret").is_ok());
        let err = confirm_password("s3cret".to_string(), "secret").unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn register_accepts_password_flag() {
        let cli = Cli::try_parse_from(["emotion-nudge", "register", "alice", "--password", "pw"]).unwrap();
        match cli.command {
            Command::Register { username, password } => {
                assert_eq!(username, "alice");
                assert_eq!(password.as_deref(), Some("pw"));
            }
            other => panic!("expected register, got {:?}", other),
        }
    }
}
