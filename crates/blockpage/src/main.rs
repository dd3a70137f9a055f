//! BlockPage - headless page layout editor
//!
//! Command-line front end: runs the reference layout service, inspects and
//! edits stored layouts, and drives scripted editor sessions.

mod logging_setup;

use anyhow::{bail, Context, Result};
use blockpage_control::{
    HttpLayoutStore, LayoutServer, LayoutServerConfig, LayoutStore, StoreOperation,
};
use blockpage_core::{BlockId, BlockLayoutRecord, Geometry};
use blockpage_ui::{BlockRegistry, Editor, EditorAction, EditorConfig, HostEvent};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "blockpage", version, about = "Headless page layout editor")]
struct Cli {
    /// Layout service base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (defaults to <config dir>/BlockPage/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the in-memory reference layout service
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Disable CORS headers
        #[arg(long)]
        no_cors: bool,
        /// JSON file with records to start with
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// List the blocks stored for a page
    List {
        /// Page path, e.g. /home
        page: String,
    },
    /// Store a new block record
    Add {
        /// Page path
        page: String,
        /// Block type, e.g. cup_preview
        kind: String,
        #[arg(long)]
        x: Option<i32>,
        #[arg(long)]
        y: Option<i32>,
        #[arg(long)]
        width: Option<i32>,
        #[arg(long)]
        height: Option<i32>,
    },
    /// Delete a stored block record
    Delete {
        /// Block uuid
        uuid: String,
    },
    /// Open a page in an editor session, optionally replaying a script
    Session {
        /// Page to open (defaults to the configured start page)
        #[arg(long)]
        page: Option<String>,
        /// JSON file with a list of editor actions
        #[arg(long)]
        script: Option<PathBuf>,
        /// Start in developer mode
        #[arg(long)]
        dev: bool,
    },
    /// Print the effective configuration
    Config {
        /// Also write it back to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from(path),
        None => EditorConfig::load(),
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    let _log_guard = logging_setup::init(&config.log)?;

    match cli.command {
        Command::Serve {
            host,
            port,
            no_cors,
            seed,
        } => serve(host, port, !no_cors, seed.as_deref()).await,
        Command::List { page } => list(&config, &page).await,
        Command::Add {
            page,
            kind,
            x,
            y,
            width,
            height,
        } => {
            let size = BlockRegistry::with_defaults()
                .get(&kind)
                .map(|spec| spec.default_size)
                .with_context(|| format!("Unknown block type '{}'", kind))?;
            let geometry = Geometry::new(
                x.unwrap_or(config.default_position.x),
                y.unwrap_or(config.default_position.y),
                width.unwrap_or(size.x),
                height.unwrap_or(size.y),
            );
            geometry.validate()?;
            add(&config, &page, &kind, geometry).await
        }
        Command::Delete { uuid } => delete(&config, &uuid).await,
        Command::Session { page, script, dev } => {
            if dev {
                config.developer_mode = true;
            }
            let page = page.unwrap_or_else(|| config.start_page.clone());
            session(&config, &page, script.as_deref()).await
        }
        Command::Config { save } => show_config(&config, save, cli.config.as_deref()),
    }
}

fn connect(config: &EditorConfig) -> Result<HttpLayoutStore> {
    HttpLayoutStore::with_timeout(&config.api_base_url, config.request_timeout())
        .with_context(|| format!("Cannot use layout service at {}", config.api_base_url))
}

async fn serve(host: String, port: u16, cors: bool, seed: Option<&Path>) -> Result<()> {
    let records: Vec<BlockLayoutRecord> = match seed {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid seed file {:?}", path))?
        }
        None => Vec::new(),
    };
    info!("Starting layout service with {} record(s)", records.len());

    let config = LayoutServerConfig::new(port).with_host(host).with_cors(cors);
    LayoutServer::new(config).with_records(records).run().await?;
    Ok(())
}

async fn list(config: &EditorConfig, page: &str) -> Result<()> {
    let store = connect(config)?;
    let records = store
        .list_by_page_path(page)
        .await
        .with_context(|| format!("Failed to list {}", page))?;
    if records.is_empty() {
        println!("No blocks on {}", page);
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

async fn add(config: &EditorConfig, page: &str, kind: &str, geometry: Geometry) -> Result<()> {
    let store = connect(config)?;
    let record = BlockLayoutRecord::new(BlockId::generate(), page, kind, geometry);
    let stored = store.create(record).await.context("Failed to store block")?;
    print_record(&stored);
    Ok(())
}

async fn delete(config: &EditorConfig, uuid: &str) -> Result<()> {
    let store = connect(config)?;
    store
        .delete_by_uuid(&BlockId::new(uuid))
        .await
        .with_context(|| format!("Failed to delete {}", uuid))?;
    println!("Deleted {}", uuid);
    Ok(())
}

async fn session(config: &EditorConfig, page: &str, script: Option<&Path>) -> Result<()> {
    let actions: Vec<EditorAction> = match script {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {:?}", path))?;
            serde_json::from_str(&content).with_context(|| format!("Invalid script {:?}", path))?
        }
        None => Vec::new(),
    };

    let store = Arc::new(connect(config)?);
    let mut editor = Editor::new(store, BlockRegistry::with_defaults(), config);
    editor.navigate(page);
    let events = editor.settle().await;
    report(&events);
    let load_failed = events.iter().any(|e| {
        matches!(
            e,
            HostEvent::PersistFailed {
                operation: StoreOperation::List,
                ..
            }
        )
    });
    if load_failed {
        bail!("Page {} could not be loaded", page);
    }

    for action in actions {
        info!("Applying {:?}", action);
        let mut events = editor.apply(action);
        events.extend(editor.settle().await);
        report(&events);
    }

    println!(
        "{} block(s) on {} (developer mode {})",
        editor.host().len(),
        editor.current_route(),
        if editor.coordinator().is_developer_mode() {
            "on"
        } else {
            "off"
        }
    );
    for instance in editor.host().instances() {
        print_record(&instance.record());
    }
    Ok(())
}

fn show_config(config: &EditorConfig, save: bool, path: Option<&Path>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let saved = match path {
            Some(path) => config.save_to(path),
            None => config.save(),
        };
        saved.context("Failed to save config")?;
        info!("Configuration saved");
    }
    Ok(())
}

fn report(events: &[HostEvent]) {
    for event in events {
        match event {
            HostEvent::PersistFailed {
                id,
                operation,
                message,
            } => warn!(
                "{} failed for {}: {}",
                operation,
                id.as_ref().map_or("page".to_string(), ToString::to_string),
                message
            ),
            HostEvent::IntentRejected(reason) => warn!("{}", reason),
            other => info!("{:?}", other),
        }
    }
}

fn print_record(record: &BlockLayoutRecord) {
    let geometry = record.geometry();
    println!(
        "{}  {:<14} {:>5},{:<5} {:>5}x{:<5} {}",
        record.uuid,
        record.component_type,
        geometry.x(),
        geometry.y(),
        geometry.width(),
        geometry.height(),
        record.page_path
    );
}
