mod cli;

use anyhow::Context;
use clap::Parser;
use ecocred_client::config::Config;
use ecocred_client::core::form_state::FormState;
use ecocred_client::core::models::{Attachment, DocumentKind};
use ecocred_client::integrations::prediction_client::PredictionClient;
use ecocred_client::workflow::{ChatSession, PredictionSurface, PredictionWorkflow};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

/// Main entry point for the client.
///
/// Initializes logging, loads configuration and runs one surface:
/// the manual form, the document upload, or the chat.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout only carries rendered results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecocred_client=info,ecocred=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }

    let client = PredictionClient::new(config.api_url.clone())?;
    tracing::info!("✓ Prediction client initialized: {}", client.base_url());

    match cli.command {
        Command::Predict { set } => {
            let mut form = FormState::new();
            for (field, value) in &set {
                form.set(*field, value);
            }

            let workflow = PredictionWorkflow::new(client, config.capabilities);
            let mut surface = PredictionSurface::new();
            workflow.submit_manual(&mut surface, &form.snapshot()).await;
            print_surface(&surface, cli.json)
        }
        Command::Ocr {
            rc_image,
            bill_image,
        } => {
            let mut form = FormState::new();
            for (kind, path) in [
                (DocumentKind::RcImage, rc_image),
                (DocumentKind::BillImage, bill_image),
            ] {
                if let Some(path) = path {
                    form.select_document(kind, load_attachment(&path).await?);
                }
            }

            let workflow = PredictionWorkflow::new(client, config.capabilities);
            let mut surface = PredictionSurface::new();
            workflow.submit_ocr(&mut surface, &form.documents()).await;
            print_surface(&surface, cli.json)
        }
        Command::Chat { message } => {
            let session = ChatSession::new(client, config.capabilities);
            match message {
                Some(message) => {
                    session.send(&message).await;
                    print_transcript(&session, cli.json)?;
                }
                None => run_chat(&session).await?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_attachment(path: &Path) -> anyhow::Result<Attachment> {
    Attachment::from_path(path)
        .await
        .with_context(|| format!("failed to read document: {}", path.display()))
}

fn print_surface(surface: &PredictionSurface, json: bool) -> anyhow::Result<ExitCode> {
    if let Some(error) = surface.error() {
        eprintln!("error: {}", error);
        return Ok(ExitCode::FAILURE);
    }

    if let Some(result) = surface.result() {
        if json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            print!("{}", result);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_transcript(session: &ChatSession, json: bool) -> anyhow::Result<()> {
    let transcript = session.transcript();
    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    } else if let Some(reply) = transcript.last() {
        println!("{}", reply.text);
    }
    Ok(())
}

async fn run_chat(session: &ChatSession) -> anyhow::Result<()> {
    if let Some(greeting) = session.transcript().first() {
        println!("{}", greeting.text);
    }
    println!("Type exit to finish.");

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin.read_line(&mut line).await? == 0 {
            println!("Good Bye!");
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit" | "/exit" | "/quit") {
            println!("Good Bye!");
            break;
        }

        eprintln!("Thinking...");
        if let Some(reply) = session.send(input).await {
            println!("{}", reply.text);
        }
    }
    Ok(())
}
