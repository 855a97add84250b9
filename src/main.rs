use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use retroflix::app::{App, AppEvent, StreamTarget};
use retroflix::config::Config;
use retroflix::keybindings::KeybindingRegistry;
use retroflix::net::{build_client, Fetch, HttpFetcher};
use retroflix::preferences::PreferenceManager;
use retroflix::storage::{Database, DatabaseError};
use retroflix::ui;
use retroflix::worker::{self, CacheWorker, WorkerConfig, WorkerHandle};

/// Get the config directory path (~/.config/retroflix/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("retroflix"))
}

/// Create the config directory if needed and restrict it to the user.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(config_dir, std::fs::Permissions::from_mode(0o700))
        {
            eprintln!(
                "Warning: could not set permissions on {}: {e}",
                config_dir.display()
            );
        }
    }
    Ok(())
}

/// Send logs to `retroflix.log`; the terminal belongs to the TUI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("retroflix.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "retroflix",
    about = "Terminal directory of Live TV and OTT partners with an offline cache"
)]
struct Args {
    /// Site root serving content.json, tv.json and ott.json (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Config file (default: ~/.config/retroflix/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initial location fragment, e.g. "#ott" or "#live-tv/abc123"
    #[arg(long, value_name = "FRAGMENT")]
    route: Option<String>,

    /// Reset database (preferences and offline cache)
    #[arg(long)]
    reset_db: bool,

    /// Install/activate the offline cache, print its status and exit
    #[arg(long)]
    cache_status: bool,

    /// Treat the network as unreachable so every request takes the cache path
    #[arg(long)]
    offline: bool,
}

async fn print_cache_status(handle: &WorkerHandle) -> Result<()> {
    let state = handle.wait_until_settled().await;
    let status = handle
        .status()
        .await
        .context("Failed to read cache status")?;

    println!("Cache worker: {state}");
    println!(
        "Current cache: {} ({} entries, {} bytes)",
        status.cache_name, status.entries, status.total_bytes
    );
    match &status.serving {
        Some(name) if *name != status.cache_name => {
            println!("Offline requests served from: {name} (kept from an earlier run)")
        }
        Some(name) => println!("Offline requests served from: {name}"),
        None => println!("Offline requests served from: none"),
    }
    if status.stores.is_empty() {
        println!("Stores: none");
    } else {
        println!("Stores: {}", status.stores.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    prepare_config_dir(&config_dir)?;
    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    let base_url = config.base_url().context("Invalid base URL")?;

    let db_path = config_dir.join("retroflix.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of retroflix appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    // Network layer, wrapped by the cache worker
    let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let network = HttpFetcher::new(client.clone(), config.request_timeout()).offline(args.offline);
    let cache_worker = CacheWorker::new(
        db.clone(),
        Arc::new(network),
        WorkerConfig {
            cache_name: config.cache_name.clone(),
            base_url: base_url.clone(),
            runtime_caching: config.runtime_caching,
        },
    );
    let handle = worker::spawn(cache_worker);

    if args.cache_status {
        return print_cache_status(&handle).await;
    }

    let prefs = PreferenceManager::load(&config, &db)
        .await
        .context("Failed to load preferences")?;

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {warning}");
    }

    // The push channel talks to the network directly; there is nothing to
    // serve from cache for it.
    let stream_target = if args.offline {
        None
    } else {
        match base_url.join(&config.notification_stream) {
            Ok(url) => Some(StreamTarget { client, url }),
            Err(e) => {
                tracing::warn!(
                    endpoint = %config.notification_stream,
                    error = %e,
                    "Invalid notification stream endpoint"
                );
                None
            }
        }
    };

    let fetch: Arc<dyn Fetch> = Arc::new(handle.clone());
    let route = args.route.unwrap_or_default();
    let mut app = App::new(prefs, fetch, base_url, keybindings, &route);
    app.stream_target = stream_target;
    app.worker = Some(handle);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    if let Err(e) = app.prefs.flush().await {
        tracing::warn!(error = %e, "Some preferences may not have been saved");
    }

    println!("Goodbye!");
    Ok(())
}
