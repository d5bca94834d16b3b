// src/sheets.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::cache::{cache_key, CsvCache, FileStorage, MemoryStorage, Storage};
use crate::config::SheetConfig;
use crate::error::SheetError;
use crate::fetch::CsvFetcher;
use crate::process::RawRow;
use crate::schema::{normalize, NormalizedRecord};

/// Callbacks into whatever displays the records.
///
/// Every method has a default, so implementors override only the hooks they have.
pub trait Presenter: Send + Sync {
    fn loading_start(&self, _message: &str) {}

    fn loading_end(&self) {}

    /// Drives the category selection flow.
    fn start_category(&self, records: &[NormalizedRecord], sheet_key: &str) {
        warn!(
            sheet = sheet_key,
            records = records.len(),
            "no category consumer wired; records dropped"
        );
    }

    /// Drives the subject detail view.
    fn render_detail(&self, records: &[NormalizedRecord]) {
        warn!(
            records = records.len(),
            "no detail consumer wired; records dropped"
        );
    }

    /// The single user-facing failure message.
    fn alert(&self, message: &str) {
        error!("{}", message);
    }
}

/// Presenter with every hook left at its default.
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}

/// Calls `loading_end` however the entry operation exits.
struct LoadingGuard<'a>(&'a dyn Presenter);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.loading_end();
    }
}

/// Entry point for loading configured sheets.
pub struct Sheets {
    config: SheetConfig,
    cache: CsvCache,
    fetcher: CsvFetcher,
    presenter: Arc<dyn Presenter>,
}

impl Sheets {
    pub fn new(
        config: SheetConfig,
        cache: CsvCache,
        fetcher: CsvFetcher,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            config,
            cache,
            fetcher,
            presenter,
        }
    }

    /// Cache on disk under `config.cache_dir`, in memory when none is set.
    pub fn from_config(config: SheetConfig) -> Result<Self> {
        let storage: Box<dyn Storage> = match &config.cache_dir {
            Some(dir) => Box::new(FileStorage::new(dir)),
            None => Box::new(MemoryStorage::new()),
        };
        let cache = CsvCache::new(storage, config.cache_ttl_ms);
        let fetcher = CsvFetcher::new()?;
        Ok(Self::new(config, cache, fetcher, Arc::new(NoopPresenter)))
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Cleaned rows for `sheet_key`, from cache when fresh.
    ///
    /// An unknown key fails before the cache or network is touched.
    pub async fn fetch_rows(&self, sheet_key: &str) -> Result<Vec<RawRow>, SheetError> {
        let base = self.config.url_for(sheet_key)?;
        let key = cache_key(sheet_key);

        if let Some(rows) = self.cache.get(&key) {
            debug!(sheet = sheet_key, rows = rows.len(), "serving from cache");
            return Ok(rows);
        }

        let rows = self.fetcher.fetch(base).await?;
        self.cache.set(&key, &rows);
        Ok(rows)
    }

    pub async fn fetch_and_normalize(
        &self,
        sheet_key: &str,
    ) -> Result<Vec<NormalizedRecord>, SheetError> {
        let rows = self.fetch_rows(sheet_key).await?;
        Ok(normalize(&rows))
    }

    /// Load `sheet_key` and hand the records to the category selection flow.
    /// Returns whether the records were delivered.
    pub async fn start_category(&self, sheet_key: &str) -> bool {
        self.run_entry(sheet_key, "Loading data…", |records| {
            self.presenter.start_category(records, sheet_key)
        })
        .await
    }

    /// Load `sheet_key` and hand the records to the subject detail view.
    /// Returns whether the records were delivered.
    pub async fn load_subjects(&self, sheet_key: &str) -> bool {
        self.run_entry(sheet_key, "Loading subject data…", |records| {
            self.presenter.render_detail(records)
        })
        .await
    }

    async fn run_entry<F>(&self, sheet_key: &str, message: &str, deliver: F) -> bool
    where
        F: FnOnce(&[NormalizedRecord]),
    {
        self.presenter.loading_start(message);
        let _guard = LoadingGuard(self.presenter.as_ref());

        match self.fetch_and_normalize(sheet_key).await {
            Ok(records) => {
                deliver(&records);
                true
            }
            Err(e) => {
                self.presenter.alert(&format!("Failed to load: {}", e));
                error!(sheet = sheet_key, error = ?e, "sheet load failed");
                false
            }
        }
    }
}
