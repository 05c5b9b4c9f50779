//! Composer CLI - runs the composer pipeline from the command line.
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use composer_engine::{
    CliAssistantBridge, Composer, ComposerConfig, StaticWorkspaces, StreamEvent, stream_channel,
};
use composer_protocol::{PrepareRequest, SuggestRequest};

/// Composer pipeline
#[derive(Parser)]
#[command(name = "composer")]
#[command(about = "Parse, suggest and execute composer input")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root directory
    #[arg(short, long, global = true, env = "COMPOSER_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Id under which the workspace is registered
    #[arg(long, global = true, default_value = "default")]
    workspace_id: String,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest commands or mentions at the cursor
    Suggest {
        /// Composer text
        input: String,

        /// Byte offset of the cursor (defaults to the end of the input)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Parse the input and resolve its mentions
    Prepare(RequestArgs),

    /// Prepare and execute the input
    Execute {
        #[command(flatten)]
        request: RequestArgs,

        /// Print output chunks as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// List built-in and discovered commands
    Commands,
}

#[derive(Args)]
struct RequestArgs {
    /// Composer text
    input: String,

    /// Selected mention id, e.g. `file:src/main.rs` (repeatable)
    #[arg(long = "select", value_name = "ID")]
    selected: Vec<String>,

    /// Model override forwarded to the assistant
    #[arg(long)]
    model: Option<String>,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ComposerConfig> {
    match path {
        Some(path) => {
            let mut config = ComposerConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env();
            Ok(config)
        }
        None => Ok(ComposerConfig::from_env()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

impl RequestArgs {
    fn into_request(self, workspace_id: Option<&str>) -> PrepareRequest {
        let mut request = PrepareRequest::new(self.input).with_selected(self.selected);
        request.workspace_id = workspace_id.map(str::to_string);
        request.model_override = self.model;
        request
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_ref())?;

    let workspaces = StaticWorkspaces::new();
    let workspace_path = match &cli.workspace {
        Some(path) => {
            let path = path
                .canonicalize()
                .with_context(|| format!("Workspace {} is not accessible", path.display()))?;
            debug!("Registered workspace '{}' at {:?}", cli.workspace_id, path);
            workspaces.insert(cli.workspace_id.as_str(), path.clone());
            Some(path)
        }
        None => None,
    };
    let workspace_id = workspace_path.as_ref().map(|_| cli.workspace_id.as_str());

    let bridge = Arc::new(CliAssistantBridge::from_config(&config.assistant));
    let composer = Composer::new(config, Arc::new(workspaces), bridge);

    match cli.command {
        Command::Suggest { input, cursor } => {
            let cursor = cursor.unwrap_or(input.len());
            let mut request = SuggestRequest::new(input, cursor);
            request.workspace_id = workspace_id.map(str::to_string);
            print_json(&composer.suggest(&request).await)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Prepare(args) => {
            let result = composer.prepare(&args.into_request(workspace_id)).await;
            print_json(&result)?;
            Ok(if result.blocking {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Execute { request, stream } => {
            let request = request.into_request(workspace_id);

            let result = if stream {
                let (tx, mut rx) = stream_channel();
                let printer = tokio::spawn(async move {
                    let mut stdout = std::io::stdout();
                    while let Some(event) = rx.recv().await {
                        match event {
                            StreamEvent::Chunk(text) => {
                                let _ = stdout.write_all(text.as_bytes());
                                let _ = stdout.flush();
                            }
                            StreamEvent::End => break,
                        }
                    }
                    let _ = writeln!(stdout);
                });
                let result = composer.execute(&request, Some(tx)).await;
                printer.await.context("Stream printer failed")?;
                result
            } else {
                composer.execute(&request, None).await
            };

            print_json(&result)?;
            Ok(if result.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Commands => {
            let commands = composer.refresh_commands(workspace_path.as_deref()).await;
            print_json(&commands.list())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_request_args() {
        let cli = Cli::parse_from([
            "composer",
            "--workspace",
            "/tmp",
            "execute",
            "/review @src/lib.rs",
            "--select",
            "file:src/lib.rs",
            "--model",
            "opus",
            "--stream",
        ]);
        let Command::Execute { request, stream } = cli.command else {
            panic!("expected execute");
        };
        assert!(stream);
        let request = request.into_request(Some("default"));
        assert_eq!(request.cursor, request.raw_input.len());
        assert_eq!(request.selected_mention_ids, vec!["file:src/lib.rs"]);
        assert_eq!(request.model_override.as_deref(), Some("opus"));
        assert_eq!(request.workspace_id.as_deref(), Some("default"));
    }
}
