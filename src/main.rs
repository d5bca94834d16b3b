use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetfeed::{NormalizedRecord, Presenter, SheetConfig, Sheets};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_CACHE_DIR: &str = "./cache";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fetch published spreadsheet CSVs and print normalized records"
)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
    /// YAML file mapping sheet keys to published CSV URLs.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Cache directory; overrides the config file. Defaults to ./cache.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    /// Keep cached rows in memory only.
    #[arg(long, global = true)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Records for the category selection flow.
    Category { sheet: String },
    /// Records for the subject detail view.
    Detail { sheet: String },
}

/// Records as JSON on stdout, everything else on stderr.
struct ConsolePresenter;

impl ConsolePresenter {
    fn print(&self, records: &[NormalizedRecord]) {
        match serde_json::to_string_pretty(records) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("could not encode records: {}", e),
        }
    }
}

impl Presenter for ConsolePresenter {
    fn loading_start(&self, message: &str) {
        info!("{}", message);
    }

    fn loading_end(&self) {
        info!("done");
    }

    fn start_category(&self, records: &[NormalizedRecord], sheet_key: &str) {
        info!(sheet = sheet_key, records = records.len(), "category records");
        self.print(records);
    }

    fn render_detail(&self, records: &[NormalizedRecord]) {
        info!(records = records.len(), "detail records");
        self.print(records);
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // ─── 2) configure sheets + cache ─────────────────────────────────
    let mut config = match &args.config {
        Some(path) => SheetConfig::from_yaml_file(path)
            .with_context(|| format!("loading sheet config {}", path.display()))?,
        None => SheetConfig::default(),
    };
    config.resolve_cache_dir(args.cache_dir.clone(), args.no_cache, DEFAULT_CACHE_DIR);
    info!(sheets = ?config.keys().collect::<Vec<_>>(), cache_dir = ?config.cache_dir, "startup");

    let sheets = Sheets::from_config(config)?.with_presenter(Arc::new(ConsolePresenter));

    // ─── 3) run the requested flow ───────────────────────────────────
    let ok = match &args.mode {
        Mode::Category { sheet } => sheets.start_category(sheet).await,
        Mode::Detail { sheet } => sheets.load_subjects(sheet).await,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
