use clap::{Args, Parser, Subcommand, ValueEnum};
use coinlist_compat::import_coins_from_path;
use coinlist_core::{
    filter::FilterState,
    model::Coin,
    traits::{CacheQuery, CoinStore},
    validate::{normalize_type, parse_toggles},
};
use coinlist_network::{HttpCoinSource, HttpSourceOptions, DEFAULT_COINS_URL, DEFAULT_TIMEOUT_SECS};
use coinlist_session::CoinListSession;
use coinlist_storage_ephemeral::EphemeralStorage;
use coinlist_storage_local::LocalStorage;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ROOT: &str = "./data";

#[derive(Clone, Debug, ValueEnum, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Backend {
    Local,
    Ephemeral,
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "coinlist", version, about = "Browse and filter a cached coin list")]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the coin list and cache it.
    Fetch(FetchArgs),
    /// Show the cached list through the filter toggles and search.
    List(ListArgs),
    /// Run the cache's own AND filter.
    Query(QueryArgs),
    /// Cache coins from a JSON array or JSONL file.
    Import(ImportArgs),
    /// Remove every cached coin.
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    #[arg(long)]
    url: Option<String>,
    #[arg(long = "timeout", value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct FetchArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Storage backend [default: local, or `default.backend` from config]
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    /// Cache root [default: ./data, or `default.root` from config]
    #[arg(long)]
    root: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Storage backend [default: local, or `default.backend` from config]
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    /// Cache root [default: ./data, or `default.root` from config]
    #[arg(long)]
    root: Option<String>,
    /// Refetch before listing (local backend).
    #[arg(long, default_value_t = false)]
    refresh: bool,
    #[arg(
        long = "filter",
        value_name = "LABEL",
        help = "Filter toggle, repeatable: \"Active Coins\", \"Inactive Coins\", \"Only Tokens\", \
                \"Only Coins\", \"New Coins\""
    )]
    filters: Vec<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    root: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    #[arg(long)]
    new: Option<bool>,
    #[arg(long = "type")]
    coin_type: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(long)]
    from: String,
    #[arg(long)]
    root: Option<String>,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ClearArgs {
    #[arg(long)]
    root: Option<String>,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Fetch(args) => fetch_cmd(args, cfg.as_ref()).await?,
        Commands::List(args) => list_cmd(args, cfg.as_ref()).await?,
        Commands::Query(args) => query_cmd(args, cfg.as_ref())?,
        Commands::Import(args) => import_cmd(args, cfg.as_ref())?,
        Commands::Clear(args) => clear_cmd(args, cfg.as_ref())?,
    }
    Ok(())
}

/// Flag, then `default.root` from config, then `./data`.
fn resolve_root(root: Option<String>, cfg: Option<&AppConfig>) -> PathBuf {
    let root = root
        .or_else(|| cfg.and_then(|c| c.default.as_ref()).and_then(|d| d.root.clone()))
        .unwrap_or_else(|| DEFAULT_ROOT.to_string());
    expand_path(&root)
}

fn resolve_backend(backend: Option<Backend>, cfg: Option<&AppConfig>) -> Backend {
    backend
        .or_else(|| {
            cfg.and_then(|c| c.default.as_ref())
                .and_then(|d| d.backend.clone())
        })
        .unwrap_or(Backend::Local)
}

fn build_source(args: &SourceArgs, cfg: Option<&AppConfig>) -> Result<HttpCoinSource> {
    let section = cfg.and_then(|c| c.source.as_ref());
    let url = args
        .url
        .clone()
        .or_else(|| section.and_then(|s| s.url.clone()))
        .unwrap_or_else(|| DEFAULT_COINS_URL.to_string());
    let timeout_secs = args
        .timeout_secs
        .or_else(|| section.and_then(|s| s.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    info!(url = %url, timeout_secs, "using coin source");
    HttpCoinSource::new(HttpSourceOptions {
        url,
        timeout: Duration::from_secs(timeout_secs),
    })
    .map_err(|e| eyre!("source setup failed: {}", e))
}

async fn fetch_cmd(args: FetchArgs, cfg: Option<&AppConfig>) -> Result<()> {
    let source = build_source(&args.source, cfg)?;
    match resolve_backend(args.backend, cfg) {
        Backend::Local => {
            let root = resolve_root(args.root, cfg);
            let mut session = CoinListSession::new(source, LocalStorage::new(&root));
            let count = session.refresh().await?;
            println!("Cached: {} coins in {}", count, root.display());
        }
        Backend::Ephemeral => {
            let mut session = CoinListSession::new(source, EphemeralStorage::new());
            let count = session.refresh().await?;
            println!("Fetched: {} coins (not cached)", count);
        }
    }
    Ok(())
}

async fn list_cmd(args: ListArgs, cfg: Option<&AppConfig>) -> Result<()> {
    let toggles = parse_toggles(&args.filters).map_err(|e| eyre!("{}", e))?;
    let mut state = FilterState::from_toggles(toggles);
    state.query = args.search.clone();
    let source = build_source(&args.source, cfg)?;
    match resolve_backend(args.backend, cfg) {
        Backend::Local => {
            let root = resolve_root(args.root, cfg);
            let session = CoinListSession::new(source, LocalStorage::new(&root));
            show_list(session, &state, args.refresh, &args.format).await
        }
        Backend::Ephemeral => {
            let session = CoinListSession::new(source, EphemeralStorage::new());
            show_list(session, &state, true, &args.format).await
        }
    }
}

async fn show_list<C: CoinStore>(
    mut session: CoinListSession<HttpCoinSource, C>,
    state: &FilterState,
    refresh: bool,
    format: &OutputFormat,
) -> Result<()> {
    if refresh {
        session.refresh().await?;
    } else if session.restore_from_cache() == 0 {
        warn!("coin cache is empty; run `coinlist fetch` or `coinlist import` first");
    }
    let view = session.show(state);
    print_coins(view, format)
}

fn query_cmd(args: QueryArgs, cfg: Option<&AppConfig>) -> Result<()> {
    let coin_type = normalize_type(args.coin_type.as_deref()).map_err(|e| eyre!("{}", e))?;
    let query = CacheQuery {
        is_active: args.active,
        is_new: args.new,
        coin_type,
    };
    let store = LocalStorage::new(resolve_root(args.root, cfg));
    let coins = store
        .load_filtered(&query)
        .map_err(|e| eyre!("cache query failed: {}", e))?;
    print_coins(&coins, &args.format)
}

fn import_cmd(args: ImportArgs, cfg: Option<&AppConfig>) -> Result<()> {
    let from = expand_path(&args.from);
    let coins = import_coins_from_path(&from).map_err(|e| eyre!("import failed: {}", e))?;
    info!(from = %from.display(), count = coins.len(), "parsed import file");
    if args.dry_run {
        println!("Parsed: {} (dry run)", coins.len());
        return Ok(());
    }
    let store = LocalStorage::new(resolve_root(args.root, cfg));
    store
        .save(&coins)
        .map_err(|e| eyre!("cache write failed: {}", e))?;
    println!("Imported: {}", coins.len());
    Ok(())
}

fn clear_cmd(args: ClearArgs, cfg: Option<&AppConfig>) -> Result<()> {
    let store = LocalStorage::new(resolve_root(args.root, cfg));
    store
        .clear_all()
        .map_err(|e| eyre!("cache clear failed: {}", e))?;
    println!("Cleared");
    Ok(())
}

fn print_coins(coins: &[Coin], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(coins)?);
        }
        OutputFormat::Table => {
            for coin in coins {
                println!("{}", format_row(coin));
            }
            println!("({} shown)", coins.len());
        }
    }
    Ok(())
}

/// One table row: symbol, name, kind, and a badge for new listings.
/// Inactive coins show `inactive` in place of their type.
fn format_row(coin: &Coin) -> String {
    let kind = if coin.is_active {
        coin.r#type.as_str()
    } else {
        "inactive"
    };
    let badge = if coin.is_new { "NEW" } else { "" };
    format!("{:<8} {:<24} {:<8} {}", coin.symbol, coin.name, kind, badge)
        .trim_end()
        .to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SectionDefaults {
    backend: Option<Backend>,
    root: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SourceSection {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default)]
    default: Option<SectionDefaults>,
    #[serde(default)]
    source: Option<SourceSection>,
}

fn load_config(path: Option<&str>) -> Result<Option<AppConfig>> {
    let mut builder = config::Config::builder()
        .add_source(config::Environment::with_prefix("COINLIST").separator("__"));

    let mut has_sources = false;
    if let Some(raw) = path {
        let expanded = expand_path(raw);
        has_sources = true;
        if !expanded.exists() {
            tracing::warn!(
                path = expanded.display().to_string(),
                "config file not found; continuing with defaults and env overrides"
            );
        }
        builder = builder.add_source(config::File::from(expanded).required(false));
    }

    let cfg = builder
        .build()
        .map_err(|e| eyre!("config load error: {}", e))?;
    let parsed: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| eyre!("config parse error: {}", e))?;
    if has_sources || parsed_has_values(&parsed) {
        return Ok(Some(parsed));
    }
    Ok(None)
}

fn parsed_has_values(cfg: &AppConfig) -> bool {
    cfg.default.is_some() || cfg.source.is_some()
}

fn expand_path(input: &str) -> PathBuf {
    if input == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from(input));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        return home_dir()
            .map(|mut base| {
                base.push(rest);
                base
            })
            .unwrap_or_else(|| PathBuf::from(rest));
    }
    PathBuf::from(input)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
}
