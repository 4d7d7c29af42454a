mod cli;

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use redrix_config::{Config, CredentialStore, FileCredentialStore};
use redrix_core::{ChatSession, RenderSurface, SendOutcome};
use redrix_model::{catalog, CompletionClient, ImageAttachment, Role};
use redrix_store::{Backend, StoreCoordinator};
use redrix_voice::{NullVoice, VoiceAdapter, VoiceError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Catalog-only command; needs no configuration.
    if let Some(Commands::ListModels { json }) = &cli.command {
        return list_models(*json);
    }

    let mut config = redrix_config::load(cli.config.as_deref())?;
    let credentials = FileCredentialStore::default_location();
    apply_stored_credentials(&mut config, &credentials)?;

    match cli.command {
        Some(Commands::ShowConfig) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::TestConnection) => test_connection(&config).await,
        Some(Commands::Export { ref output }) => export(&config, output.as_deref()).await,
        Some(Commands::Clear { yes }) => clear(&config, yes).await,
        Some(Commands::ListModels { .. }) => unreachable!("handled above"),
        None => chat(cli, config).await,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("REDRIX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Plain stdout rendering for terminal use.
struct StdoutRender;

impl RenderSurface for StdoutRender {
    fn render_message(
        &self,
        role: Role,
        content: &str,
        model: Option<&str>,
        images: &[ImageAttachment],
    ) {
        match role {
            Role::User => {
                if !images.is_empty() {
                    println!("you> {content} [{} image(s)]", images.len());
                } else {
                    println!("you> {content}");
                }
            }
            Role::Assistant => {
                let tag = model.unwrap_or("assistant");
                println!("{tag}> {content}");
            }
        }
    }

    fn render_typing(&self, show: bool) {
        if show {
            eprintln!("…thinking");
        }
    }
}

// ─── Chat loop ───────────────────────────────────────────────────────────────

async fn chat(cli: Cli, config: Config) -> anyhow::Result<()> {
    let backend = Arc::new(CompletionClient::from_config(&config.llm));
    let store = StoreCoordinator::connect(&config.store, &config.history).await;
    if store.backend() == Backend::Local {
        eprintln!("note: history is stored locally (no remote store connected)");
    }

    let session = ChatSession::new(store, backend, Arc::new(StdoutRender));
    if let Some(model) = &cli.model {
        session.select_model(model)?;
    }

    // One-shot mode: send a single prompt, skip history replay.
    if let Some(prompt) = &cli.prompt {
        session.send(prompt).await?;
        return Ok(());
    }

    session.load_history(config.history.context_messages * 2).await?;
    let voice = NullVoice;

    eprintln!("redrix — /model <id>, /models, /image <path>, /images, /clear-images, /voice, /quit");
    let stdin = std::io::stdin();
    loop {
        eprint!("you> ");
        std::io::stderr().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b)) {
            ("/quit", _) | ("/exit", _) => return Ok(()),
            ("/models", _) => list_models(false)?,
            ("/model", id) => match session.select_model(id.trim()) {
                Ok(entry) => eprintln!("model switched to {}", entry.display_name),
                Err(e) => eprintln!("error: {e}"),
            },
            ("/image", path) => match attachment_from_file(Path::new(path.trim())) {
                Ok(attachment) => {
                    session.attach_image(attachment);
                    let active = session.current_model();
                    if session.auto_switched() {
                        eprintln!("auto-switched to {} for images", active.display_name);
                    }
                    eprintln!("{} image(s) attached", session.images().len());
                }
                Err(e) => eprintln!("error: {e:#}"),
            },
            ("/images", _) => {
                for (i, img) in session.images().iter().enumerate() {
                    eprintln!("  [{i}] {}", img.name);
                }
            }
            ("/clear-images", _) => session.clear_images(),
            ("/voice", _) => match voice.start_listening().await {
                Ok(transcript) => {
                    session.send(&transcript).await?;
                }
                Err(VoiceError::NotSupported) => {
                    eprintln!("voice input is not available in the terminal build");
                }
                Err(e) => eprintln!("voice error: {e}"),
            },
            _ => match session.send(line).await? {
                SendOutcome::Busy => eprintln!("still waiting on the previous message"),
                SendOutcome::Ignored | SendOutcome::Sent | SendOutcome::Failed => {}
            },
        }
    }
}

/// Fill credential gaps in the merged config from the credential store.
/// Values already present in the config win.
fn apply_stored_credentials(
    config: &mut Config,
    credentials: &dyn CredentialStore,
) -> anyhow::Result<()> {
    if config.llm.resolve_api_key().is_none() {
        if let Some(key) = credentials.get(redrix_config::KEY_LLM_API)? {
            config.llm.api_key = Some(key);
        }
    }
    if !config.store.is_complete() {
        if let Some(raw) = credentials.get(redrix_config::KEY_STORE_DESCRIPTOR)? {
            config.store = serde_json::from_str(&raw)
                .context("parsing stored remote-store descriptor")?;
        }
    }
    Ok(())
}

/// Build an attachment from an image file on disk.
fn attachment_from_file(path: &Path) -> anyhow::Result<ImageAttachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => anyhow::bail!("unsupported image type: {}", path.display()),
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".into());
    Ok(ImageAttachment::new(
        name,
        format!("data:{mime};base64,{encoded}"),
    ))
}

// ─── Subcommands ─────────────────────────────────────────────────────────────

fn list_models(json: bool) -> anyhow::Result<()> {
    let models = catalog::static_catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }
    for m in models {
        let vision = if m.supports_images { "  [vision]" } else { "" };
        println!("{:<50} {}{}", m.id, m.display_name, vision);
    }
    Ok(())
}

async fn test_connection(config: &Config) -> anyhow::Result<()> {
    let client = CompletionClient::from_config(&config.llm);
    let outcome = client.test_connection(&catalog::default_model()).await;
    match (&outcome.response, &outcome.error) {
        (Some(reply), _) => println!("completion API: ok ({})", first_line(reply)),
        (_, Some(err)) => println!("completion API: FAILED ({err})"),
        _ => println!("completion API: FAILED"),
    }

    let store = StoreCoordinator::connect(&config.store, &config.history).await;
    let report = store.test_connection().await;
    if report.ok {
        println!("remote store: ok");
    } else {
        println!("remote store: FAILED ({})", report.detail);
    }
    Ok(())
}

async fn export(config: &Config, output: Option<&Path>) -> anyhow::Result<()> {
    let store = StoreCoordinator::connect(&config.store, &config.history).await;
    let history = store.fetch_all_for_export().await?;
    if history.is_empty() {
        eprintln!("no chat history to export");
        return Ok(());
    }
    let transcript = redrix_core::render_transcript(&history);
    match output {
        Some(path) => {
            std::fs::write(path, transcript)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("transcript written to {}", path.display());
        }
        None => print!("{transcript}"),
    }
    Ok(())
}

async fn clear(config: &Config, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("refusing to delete history without --yes");
    }
    let store = StoreCoordinator::connect(&config.store, &config.history).await;
    store.clear_all().await?;
    eprintln!("chat history cleared");
    Ok(())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
