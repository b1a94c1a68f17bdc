use anyhow::{Context, Result};
use clap::Parser;
use doc_chat::doc_processor::with_quiet_panics;
use doc_chat::settings::{ProviderKind, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use doc_chat::{Role, Session, SessionError, Settings, UploadReport, UploadedFile};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Chat with your documents through a hosted LLM.
#[derive(Parser, Debug)]
#[command(name = "doc-chat", version, about, long_about = None)]
struct Cli {
    /// Generation service: gemini or openai
    #[arg(long, default_value = "gemini")]
    provider: ProviderKind,

    /// API key (defaults to GEMINI_API_KEY / GOOGLE_API_KEY, or OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name (defaults to the provider's first model)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature, 0.0 - 1.0
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Output ceiling, 50 - 2000
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_tokens: u32,

    /// Alternative endpoint for the generation service
    #[arg(long, env = "DOC_CHAT_BASE_URL")]
    base_url: Option<String>,

    /// PDF or text files to load into the knowledge base
    files: Vec<PathBuf>,
}

const HELP: &str = "\
Commands:
  /add <path>...        add PDF / text files to the knowledge base
  /docs                 list knowledge base size
  /clear-kb             clear the knowledge base
  /clear-chat           clear the conversation
  /history              print the conversation
  /key <api-key>        set the API key for this session
  /provider <name>      switch service (gemini, openai)
  /model <name>         switch model
  /temperature <0-1>    set sampling temperature
  /max-tokens <n>       set output ceiling
  /help                 show this help
  /quit                 exit
Anything else is sent as a question.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("doc_chat=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut session = Session::new(settings_from(&cli)?);

    if !cli.files.is_empty() {
        match with_quiet_panics(|| session.add_files(read_files(&cli.files))) {
            Ok(report) => print_report(&report),
            Err(e) => println!("warning: {e}"),
        }
    }

    if session.settings().api_key().is_none() {
        let vars = session.settings().provider().api_key_env_vars().join(" / ");
        println!("Please set your API key with /key <api-key> (or {vars}).");
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('/') {
            if !run_command(&mut session, line) {
                break;
            }
            continue;
        }
        ask(&mut session, line).await;
    }
    Ok(())
}

fn settings_from(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::from_env_for(cli.provider);
    if let Some(key) = &cli.api_key {
        settings.set_api_key(key.as_str());
    }
    if let Some(model) = &cli.model {
        settings.set_model(model)?;
    }
    settings.set_temperature(cli.temperature)?;
    settings.set_max_output_tokens(cli.max_tokens)?;
    settings.set_base_url(cli.base_url.clone());
    Ok(settings)
}

async fn ask(session: &mut Session, question: &str) {
    let provider = match session.provider() {
        Ok(p) => p,
        Err(e) => {
            println!("warning: {e}. Set one with /key <api-key>.");
            return;
        }
    };
    match session.ask(&provider, question).await {
        Ok(answer) => println!("AI: {answer}\n"),
        Err(SessionError::Generation(e)) => println!("error: {e}"),
        Err(e) => println!("warning: {e}"),
    }
}

/// Returns `false` when the user asked to quit.
fn run_command(session: &mut Session, line: &str) -> bool {
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "/quit" | "/exit" => return false,
        "/help" => println!("{HELP}"),
        "/add" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            match with_quiet_panics(|| session.add_files(read_files(&paths))) {
                Ok(report) => print_report(&report),
                Err(e) => println!("warning: {e}"),
            }
        }
        "/docs" => println!("{} document(s) in the knowledge base.", session.documents().len()),
        "/clear-kb" => {
            session.clear_documents();
            println!("Knowledge base cleared.");
        }
        "/clear-chat" => {
            session.clear_chat();
            println!("Chat cleared.");
        }
        "/history" => {
            for msg in session.messages() {
                let who = match msg.role {
                    Role::User => "You",
                    Role::Assistant => "AI",
                };
                println!("{who}: {}\n", msg.content);
            }
        }
        "/key" => {
            session.settings_mut().set_api_key(rest);
            match session.settings().api_key() {
                Some(key) => println!("API key set ({key})."),
                None => println!("API key cleared."),
            }
        }
        "/provider" => match rest.parse::<ProviderKind>() {
            Ok(kind) => {
                session.settings_mut().set_provider(kind);
                println!("Provider: {kind}, model: {}", session.settings().model());
            }
            Err(e) => println!("warning: {e}"),
        },
        "/model" => match session.settings_mut().set_model(rest) {
            Ok(()) => println!("Model: {rest}"),
            Err(e) => println!("warning: {e}"),
        },
        "/temperature" => match rest.parse::<f32>() {
            Ok(t) => report_setting(session.settings_mut().set_temperature(t), "Temperature", rest),
            Err(_) => println!("warning: not a number: {rest}"),
        },
        "/max-tokens" => match rest.parse::<u32>() {
            Ok(n) => report_setting(session.settings_mut().set_max_output_tokens(n), "Max tokens", rest),
            Err(_) => println!("warning: not a number: {rest}"),
        },
        other => println!("Unknown command {other}. Type /help."),
    }
    true
}

fn report_setting(result: Result<(), doc_chat::SettingsError>, name: &str, value: &str) {
    match result {
        Ok(()) => println!("{name}: {value}"),
        Err(e) => println!("warning: {e}"),
    }
}

/// Unreadable paths are reported and left out of the batch.
fn read_files(paths: &[PathBuf]) -> Vec<UploadedFile> {
    paths
        .iter()
        .filter_map(|path| match read_file(path) {
            Ok(file) => Some(file),
            Err(e) => {
                println!("warning: {e:#}");
                None
            }
        })
        .collect()
}

fn read_file(path: &Path) -> Result<UploadedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(UploadedFile::new(filename, bytes))
}

fn print_report(report: &UploadReport) {
    println!("Added {} file(s) to the knowledge base.", report.added);
    for name in &report.skipped_empty {
        println!("  skipped {name}: no text found");
    }
    for (name, err) in &report.failed {
        println!("  skipped {name}: {err}");
    }
}
