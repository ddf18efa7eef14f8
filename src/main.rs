use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::chat::{Outcome, Session};
use crate::error::ChatError;
use crate::llm::config::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::llm::models::generation_models;
use crate::llm::{GeminiClient, LLMConfig, ModelProvider, ModelSelection};
use crate::utils::secrets::{ChainedSecrets, EnvSecrets, SecretStore, TomlSecrets, API_KEY_NAME};
use crate::utils::terminal::Terminal;

mod chat;
mod error;
mod llm;
mod utils;

/// Roland Culé: pose une question, le modèle répond.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Identifiant du modèle (ex. gemini-1.5-flash)
    #[arg(short, long, default_value = DEFAULT_MODEL, conflicts_with = "discover_model")]
    model: String,

    /// Choisir le premier modèle capable de générer du contenu
    #[arg(long)]
    discover_model: bool,

    /// URL de base de l'API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Instruction système envoyée avec chaque requête
    #[arg(long, conflicts_with = "system_instruction_file")]
    system_instruction: Option<String>,

    /// Lire l'instruction système depuis un fichier
    #[arg(long)]
    system_instruction_file: Option<PathBuf>,

    /// Température d'échantillonnage (0.0 - 2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Fichier de secrets contenant GOOGLE_API_KEY
    #[arg(long, default_value = ".streamlit/secrets.toml")]
    secrets: PathBuf,

    /// Poser une seule question puis quitter
    #[arg(short, long)]
    prompt: Option<String>,

    /// Afficher les modèles disponibles puis quitter
    #[arg(long)]
    list_models: bool,

    /// Titre affiché au démarrage
    #[arg(long, default_value = "Roland Culé")]
    title: String,

    /// Icône affichée à côté du titre
    #[arg(long, default_value = "⚽")]
    icon: String,

    /// Niveau de log
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let mut terminal = Terminal::stdout();
    terminal
        .banner(&args.icon, &args.title)
        .context("Failed to write banner")?;

    let llm_config = match setup_llm_config(&args) {
        Ok(config) => config,
        Err(e) => return disabled(&mut terminal, e),
    };
    let secrets = setup_secrets(&args);

    if args.list_models {
        return list_models(&secrets, &llm_config, &mut terminal).await;
    }

    let handler = match chat::initialize(&secrets, &llm_config, |credential| {
        GeminiClient::new(&llm_config.api_url, credential)
    })
    .await
    {
        Ok(handler) => handler,
        Err(e) if e.is_fatal() => return disabled(&mut terminal, e),
        Err(e) => return Err(e).context("Failed to start chat session"),
    };
    info!("Session ready with model {}", handler.model());

    let mut session = Session::new(&handler, &mut terminal);

    if let Some(prompt) = &args.prompt {
        let outcome = session.ask(prompt).await?;
        return Ok(match outcome {
            Outcome::Answered(_) => ExitCode::SUCCESS,
            Outcome::Rejected | Outcome::Failed(_) => ExitCode::FAILURE,
        });
    }

    session.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(ExitCode::SUCCESS)
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}

fn setup_llm_config(args: &Args) -> Result<LLMConfig, ChatError> {
    let selection = if args.discover_model {
        ModelSelection::Discover
    } else {
        ModelSelection::Fixed(args.model.clone())
    };

    let system_instruction = match &args.system_instruction_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            ChatError::invalid_config(format!("{}: {}", path.display(), e))
        })?),
        None => args.system_instruction.clone(),
    };

    let config = LLMConfig::new(args.api_url.clone(), selection)
        .with_system_instruction(system_instruction)
        .with_temperature(args.temperature);
    config.validate()?;
    Ok(config)
}

fn setup_secrets(args: &Args) -> ChainedSecrets {
    ChainedSecrets::new(vec![
        Box::new(TomlSecrets::new(args.secrets.clone())),
        Box::new(EnvSecrets),
    ])
}

/// Render the static setup error; the input is never offered.
fn disabled<W: std::io::Write>(terminal: &mut Terminal<W>, e: ChatError) -> Result<ExitCode> {
    error!("Chat disabled: {}", e);
    terminal
        .setup_error(&e)
        .context("Failed to write setup error")?;
    Ok(ExitCode::FAILURE)
}

async fn list_models<W: std::io::Write>(
    secrets: &dyn SecretStore,
    config: &LLMConfig,
    terminal: &mut Terminal<W>,
) -> Result<ExitCode> {
    let credential = match secrets.get(API_KEY_NAME) {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            let e = ChatError::MissingCredential { key: API_KEY_NAME.to_string() };
            return disabled(terminal, e);
        }
        Err(e) => return disabled(terminal, e),
    };

    let client = GeminiClient::new(&config.api_url, credential);
    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => return disabled(terminal, ChatError::Discovery(e.to_string())),
    };

    let capable = generation_models(&models);
    if capable.is_empty() {
        return disabled(terminal, ChatError::NoGenerationModel);
    }
    terminal
        .models(&capable)
        .context("Failed to write model list")?;
    Ok(ExitCode::SUCCESS)
}
