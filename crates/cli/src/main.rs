//! KB Chat CLI
//!
//! A command-line front-end for the knowledge-grounded chat assistant.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kbchat_agent::{ChatController, GeminiClient, SessionFactory};
use kbchat_core::MessageRole;
use kbchat_store::KnowledgeStore;
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// KB Chat - answer questions from a directory of text files
#[derive(Parser)]
#[command(name = "kbchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Knowledge base directory
    #[arg(short, long, default_value = "knowledge_base")]
    kb_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat
    Chat,

    /// Ask a single question and exit
    Ask {
        /// The question
        question: String,
    },

    /// Manage knowledge files
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },
}

#[derive(Subcommand)]
enum FilesCommands {
    /// List knowledge files
    List,

    /// Add a text file to the knowledge base
    Add {
        /// Path to a .txt file
        path: PathBuf,
    },

    /// Print a knowledge file
    Show {
        /// File name (e.g. facts.txt)
        name: String,
    },

    /// Remove a knowledge file
    Remove {
        /// File name (e.g. facts.txt)
        name: String,
    },
}

/// `~/.kbchat/secrets.toml`
#[derive(Deserialize, Default)]
struct Secrets {
    gemini_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // The credential is required before any command runs; absence halts
    // startup here, never mid-conversation.
    let api_key = resolve_api_key()?;

    let store = KnowledgeStore::open(&cli.kb_dir)
        .with_context(|| format!("Failed to open knowledge base at {}", cli.kb_dir.display()))?;
    info!("Using knowledge base at: {}", store.dir().display());

    match cli.command {
        Commands::Chat => {
            let controller = controller(store, api_key);
            cmd_chat(controller).await?;
        }
        Commands::Ask { question } => {
            let controller = controller(store, api_key);
            cmd_ask(controller, &question).await?;
        }
        Commands::Files { command } => match command {
            FilesCommands::List => cmd_files_list(&store)?,
            FilesCommands::Add { path } => cmd_files_add(&store, &path)?,
            FilesCommands::Show { name } => cmd_files_show(&store, &name)?,
            FilesCommands::Remove { name } => cmd_files_remove(&store, &name)?,
        },
    }

    Ok(())
}

fn controller(store: KnowledgeStore, api_key: String) -> ChatController {
    let client = GeminiClient::new(api_key);
    ChatController::new(store, SessionFactory::new(client))
}

/// Resolve the Gemini API key: secrets file, then environment, then a
/// manual prompt. Empty everywhere means startup fails.
fn resolve_api_key() -> Result<String> {
    if let Some(key) = secrets_file_key() {
        return Ok(key);
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    eprint!("Enter your Gemini API key: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let key = line.trim().to_string();
    if !key.is_empty() {
        return Ok(key);
    }

    anyhow::bail!(
        "GEMINI_API_KEY is not set. Add it to ~/.kbchat/secrets.toml, \
         set the environment variable, or enter it at the prompt."
    )
}

fn secrets_file_key() -> Option<String> {
    let mut path = dirs::home_dir()?;
    path.push(".kbchat");
    path.push("secrets.toml");

    let raw = std::fs::read_to_string(path).ok()?;
    let secrets: Secrets = toml::from_str(&raw).ok()?;
    secrets
        .gemini_api_key
        .filter(|key| !key.trim().is_empty())
}

async fn cmd_chat(mut controller: ChatController) -> Result<()> {
    println!("KB Chat - ask questions about your knowledge base");
    println!("Type /help for commands, /quit to exit");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("you> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !slash_command(&mut controller, command)? {
                break;
            }
            println!();
            continue;
        }

        let outcome = controller.submit(line).await;
        for skipped in &outcome.skipped {
            eprintln!("warning: skipped {}: {}", skipped.name, skipped.reason);
        }
        println!("{}", outcome.reply);
        println!();
    }

    Ok(())
}

/// Handle an in-chat slash command. Returns false on /quit.
fn slash_command(controller: &mut ChatController, command: &str) -> Result<bool> {
    let parts: Vec<&str> = command.splitn(2, ' ').collect();
    let cmd = parts.first().copied().unwrap_or("");
    let arg = parts.get(1).copied().unwrap_or("").trim();

    match cmd {
        "files" | "f" => {
            cmd_files_list(controller.store())?;
        }

        "add" => {
            if arg.is_empty() {
                println!("Usage: /add <path>");
            } else {
                cmd_files_add(controller.store(), &PathBuf::from(arg))?;
            }
        }

        "rm" => {
            if arg.is_empty() {
                println!("Usage: /rm <name>");
            } else {
                cmd_files_remove(controller.store(), arg)?;
            }
        }

        "clear" => {
            controller.clear();
            println!("✓ Chat history cleared");
        }

        "export" => match controller.export_json() {
            Ok(Some(json)) => {
                let filename = format!(
                    "chat_export_{}.json",
                    chrono::Local::now().format("%Y%m%d_%H%M%S")
                );
                match std::fs::write(&filename, json) {
                    Ok(()) => println!("✓ Exported chat history to {}", filename),
                    Err(e) => println!("Error writing {}: {}", filename, e),
                }
            }
            Ok(None) => println!("No chat history to export"),
            Err(e) => println!("Error: {}", e),
        },

        "stats" => {
            let files = controller.store().list().map(|f| f.len()).unwrap_or(0);
            let user_turns = controller
                .messages()
                .iter()
                .filter(|m| m.role == MessageRole::User)
                .count();
            println!("Total messages: {}", controller.messages().len());
            println!("  • Questions asked: {}", user_turns);
            println!("Active knowledge files: {}", files);
        }

        "help" | "h" | "?" => {
            println!("Commands:");
            println!("  /files          - List knowledge files");
            println!("  /add <path>     - Add a text file to the knowledge base");
            println!("  /rm <name>      - Remove a knowledge file");
            println!("  /clear          - Clear chat history");
            println!("  /export         - Export chat history as JSON");
            println!("  /stats          - Show session statistics");
            println!("  /quit           - Exit");
            println!();
            println!("Anything else is sent to the assistant as a question.");
        }

        "quit" | "q" | "exit" => {
            println!("Goodbye!");
            return Ok(false);
        }

        _ => {
            println!("Unknown command: /{}. Type /help for available commands.", cmd);
        }
    }

    Ok(true)
}

async fn cmd_ask(mut controller: ChatController, question: &str) -> Result<()> {
    let outcome = controller.submit(question).await;
    for skipped in &outcome.skipped {
        eprintln!("warning: skipped {}: {}", skipped.name, skipped.reason);
    }
    println!("{}", outcome.reply);
    Ok(())
}

fn cmd_files_list(store: &KnowledgeStore) -> Result<()> {
    // Match the chat path: an empty store presents its seed document.
    if let Err(e) = store.ensure_seeded() {
        println!("Error: {}", e);
        return Ok(());
    }

    match store.list() {
        Ok(files) => {
            println!("Knowledge files ({}):", files.len());
            for name in files {
                println!("  • {}", name);
            }
        }
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}

fn cmd_files_add(store: &KnowledgeStore, path: &PathBuf) -> Result<()> {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => {
            println!("Error: {} has no usable file name", path.display());
            return Ok(());
        }
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Error reading {}: {}", path.display(), e);
            return Ok(());
        }
    };

    match store.write(&name, &bytes) {
        Ok(()) => println!("✓ Saved {}", name),
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}

fn cmd_files_show(store: &KnowledgeStore, name: &str) -> Result<()> {
    match store.read(name) {
        Ok(file) => {
            println!("--- {} ---", file.name);
            println!("{}", file.content);
        }
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}

fn cmd_files_remove(store: &KnowledgeStore, name: &str) -> Result<()> {
    match store.delete(name) {
        Ok(()) => println!("✓ Deleted {}", name),
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}
