//! voxbridge command-line client.

mod cli;
mod config;
mod live;
mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use voxbridge_client::ApiClient;
use voxbridge_protocol::languages::{display_name, supported_targets};
use voxbridge_protocol::messages::SyncTranslateRequest;
use voxbridge_session::{InputMode, SessionController, SessionEvent, SessionSettings};
use voxbridge_upload::FileUploader;

use cli::{Cli, Command};
use config::Config;

const EVENT_BUFFER: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let mut cfg = Config::load(&config_path)?
        .with_api_key_override(std::env::var(config::API_KEY_ENV).ok());
    if let Some(server) = &cli.server {
        cfg.server_url = server.clone();
    }
    tracing::debug!(server = %cfg.server_url, config = %config_path.display(), "configuration loaded");

    let client = Arc::new(ApiClient::new(&cfg.client_config())?);
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let printer = tokio::spawn(render::render(events_rx, cfg.upload_options().chunk_size));

    let result = run(cli.command, &cfg, &config_path, client, events_tx).await;
    // Every sender is gone once `run` returns; let the printer drain.
    let _ = printer.await;
    result
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

async fn run(
    command: Command,
    cfg: &Config,
    config_path: &Path,
    client: Arc<ApiClient>,
    events: mpsc::Sender<SessionEvent>,
) -> anyhow::Result<()> {
    let controller = || {
        SessionController::new(Arc::clone(&client), cfg.controller_options(), events.clone())
    };

    match command {
        Command::Languages => {
            for (code, name) in controller().load_languages().await {
                println!("{code:<5} {name}");
            }
        }

        Command::Targets { source } => {
            let targets = supported_targets(&source);
            if targets.is_empty() {
                bail!("unknown source language: {source}");
            }
            for code in targets {
                println!("{code:<5} {}", display_name(code));
            }
        }

        Command::SaveKey { key, local_only } => {
            let saved = Config {
                api_key: key.clone(),
                ..cfg.clone()
            };
            saved
                .save(config_path)
                .with_context(|| format!("writing {}", config_path.display()))?;
            println!("API key stored in {}", config_path.display());
            if !local_only {
                controller().save_api_key(&key).await?;
            }
        }

        Command::Live(args) => {
            let input = match (args.file, args.file_mode) {
                (Some(path), _) => InputMode::File(Some(path)),
                (None, true) => InputMode::File(None),
                (None, false) => InputMode::Microphone,
            };
            let settings = SessionSettings {
                api_key: cfg.api_key.clone(),
                source_language: args.languages.source,
                target_languages: args.languages.targets,
                input,
            };
            let export_dir = args.export.unwrap_or_else(|| cfg.export_dir.clone());
            live::run(&mut controller(), settings, &export_dir).await?;
        }

        Command::TranslateFile { path, languages } => {
            let request = SyncTranslateRequest {
                api_key: cfg.api_key.clone(),
                source_language: languages.source,
                target_languages: languages.targets,
            };
            let result = controller().translate_file(&request, &path).await?;
            for line in &result.transcriptions {
                println!("[{}] {line}", request.source_language);
            }
            for (language, lines) in &result.translations {
                for line in lines {
                    println!("[{language}] {line}");
                }
            }
        }

        Command::Upload { path, session } => {
            let (upload_tx, mut upload_rx) = mpsc::channel(64);
            let forward_to = events.clone();
            let forward = tokio::spawn(async move {
                while let Some(event) = upload_rx.recv().await {
                    let _ = forward_to.send(SessionEvent::Upload(event)).await;
                }
            });
            let report = FileUploader::new(&*client, cfg.upload_options())
                .upload_file(&path, &session, &upload_tx)
                .await;
            drop(upload_tx);
            let _ = forward.await;

            let report = report?;
            match report.message {
                Some(message) => println!("uploaded {}: {message}", report.filename),
                None => println!("uploaded {}", report.filename),
            }
        }
    }
    Ok(())
}
