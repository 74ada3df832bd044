//! Pipeline orchestration across categories
//!
//! For each configured category, in order:
//! 1. Discover sub-category links and write them to the links CSV
//! 2. Read the links back and scrape every sub-category through the API
//! 3. Record each target's outcome in the run ledger
//! 4. Flatten the category's bronze files and append them to the silver CSV
//!
//! A failure inside one category is logged and the pipeline moves on to the
//! next one. Only run bookkeeping errors abort the run.

use crate::config::{CategoryEntry, Config};
use crate::discovery::discover_links;
use crate::flatten::extract_category;
use crate::output::{CategorySummary, PipelineSummary};
use crate::scrape::{build_http_client, run_batch, ApiFetcher, LoopSettings, RetryPolicy, TokioPacer};
use crate::storage::{
    append_to_silver, count_silver_rows, read_links_csv, write_links_csv, BronzeStore, Ledger,
    RunStatus, SqliteLedger, SILVER_FILE_NAME,
};
use crate::url::Target;
use crate::{HarvestError, Result, UrlError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Selects the categories named in `filter`, keeping configuration order
///
/// An empty filter selects every category. Unknown names are an input error.
pub fn select_categories<'a>(config: &'a Config, filter: &[String]) -> Result<Vec<&'a CategoryEntry>> {
    if let Some(unknown) = filter
        .iter()
        .find(|name| !config.categories.iter().any(|c| &c.name == *name))
    {
        return Err(HarvestError::Input(format!("unknown category '{}'", unknown)));
    }

    Ok(config
        .categories
        .iter()
        .filter(|c| filter.is_empty() || filter.contains(&c.name))
        .collect())
}

/// Path of a category's links CSV
pub fn links_csv_path(bronze_root: &Path, category: &str) -> PathBuf {
    bronze_root
        .join(category)
        .join(format!("{}_links.csv", category))
}

/// Runs the three stages for the configured categories
pub struct Pipeline {
    config: Config,
    config_hash: String,
    client: Client,
    ledger: SqliteLedger,
}

impl Pipeline {
    /// Builds the shared HTTP client and opens the run ledger
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `config_hash` - Hash of the configuration file, stored with each run
    pub fn new(config: Config, config_hash: String) -> Result<Self> {
        let client = build_http_client(&config.client)?;
        let ledger = SqliteLedger::new(Path::new(&config.output.ledger_path))?;

        Ok(Self {
            config,
            config_hash,
            client,
            ledger,
        })
    }

    pub fn ledger(&self) -> &SqliteLedger {
        &self.ledger
    }

    /// Runs the pipeline over the selected categories
    pub async fn run(&mut self, filter: &[String]) -> Result<PipelineSummary> {
        let categories: Vec<CategoryEntry> = select_categories(&self.config, filter)?
            .into_iter()
            .cloned()
            .collect();

        let run_id = self.ledger.create_run(&self.config_hash)?;
        tracing::info!(run_id, categories = categories.len(), "Starting pipeline run");

        let summary = match self.run_categories(run_id, &categories).await {
            Ok(summary) => summary,
            Err(e) => {
                if let Err(finish_err) = self.ledger.finish_run(run_id, RunStatus::Failed) {
                    tracing::error!(run_id, error = %finish_err, "Failed to mark run as failed");
                }
                return Err(e);
            }
        };

        self.ledger.finish_run(run_id, RunStatus::Completed)?;

        let total = summary.total();
        tracing::info!(
            run_id,
            unique_products = total.unique_products,
            outages = total.outages,
            silver_rows = summary.silver_total_rows,
            "Pipeline finished"
        );

        Ok(summary)
    }

    async fn run_categories(
        &mut self,
        run_id: i64,
        categories: &[CategoryEntry],
    ) -> Result<PipelineSummary> {
        let mut summary = PipelineSummary {
            run_id,
            categories: Vec::with_capacity(categories.len()),
            silver_total_rows: count_silver_rows(&self.silver_file())?,
        };

        for entry in categories {
            tracing::info!(category = %entry.name, "Processing category");

            let mut category = CategorySummary {
                name: entry.name.clone(),
                ..CategorySummary::default()
            };

            match self.process_category(run_id, entry, &mut category).await {
                Ok(Some(total_rows)) => summary.silver_total_rows = total_rows,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(category = %entry.name, error = %e, "Category failed, moving to next");
                    category.skipped = Some(e.to_string());
                }
            }

            summary.categories.push(category);
        }

        Ok(summary)
    }

    /// Runs all stages for one category
    ///
    /// Returns the silver file's row count when rows were appended.
    async fn process_category(
        &mut self,
        run_id: i64,
        entry: &CategoryEntry,
        summary: &mut CategorySummary,
    ) -> Result<Option<usize>> {
        let page_url =
            Url::parse(&entry.url).map_err(|e| UrlError::Parse(format!("{}: {}", entry.url, e)))?;
        let bronze_root = PathBuf::from(&self.config.output.bronze_path);
        let category_dir = bronze_root.join(&entry.name);
        let links_path = links_csv_path(&bronze_root, &entry.name);

        // Stage 1: discovery
        let discovery_timeout = Duration::from_secs(self.config.client.discovery_timeout_secs);
        let links = discover_links(&self.client, &page_url, discovery_timeout).await;
        if links.is_empty() {
            summary.skipped = Some("no sub-category links found".to_string());
            return Ok(None);
        }
        write_links_csv(&links_path, &links)?;

        // Stage 2: scrape
        let targets = load_targets(&links_path)?;
        summary.links = targets.len();

        let fetcher = ApiFetcher::new(self.client.clone(), &self.config.api)
            .map_err(|e| UrlError::Parse(format!("{}: {}", self.config.api.base_url, e)))?;
        let mut store = BronzeStore::new(&category_dir)?;
        let report = run_batch(
            &targets,
            &fetcher,
            &TokioPacer,
            &mut store,
            LoopSettings::from_config(&self.config),
            RetryPolicy::from_config(&self.config),
        )
        .await;

        summary.tally = report.tally;
        for target in &report.targets {
            self.ledger.record_target(run_id, &entry.name, target)?;
        }

        if report.records.is_empty() {
            tracing::warn!(category = %entry.name, "Scraper returned no data");
            summary.skipped = Some("scraper returned no data".to_string());
            return Ok(None);
        }

        // Stage 3: flatten and consolidate
        let rows = extract_category(&category_dir, &entry.name, &self.config.api.site_root)?;
        if rows.is_empty() {
            tracing::warn!(category = %entry.name, "No product records to consolidate");
            return Ok(None);
        }

        let total_rows = append_to_silver(&self.silver_file(), &rows)?;
        summary.flattened_rows = rows.len();
        tracing::info!(
            category = %entry.name,
            appended = rows.len(),
            total_rows,
            "Appended to silver file"
        );

        Ok(Some(total_rows))
    }

    fn silver_file(&self) -> PathBuf {
        Path::new(&self.config.output.silver_path).join(SILVER_FILE_NAME)
    }
}

/// Reads the links CSV and builds one target per valid link
fn load_targets(links_path: &Path) -> Result<Vec<Target>> {
    let links = read_links_csv(links_path)?;

    let targets: Vec<Target> = links
        .iter()
        .filter_map(|link| match Target::from_url(link) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::warn!(link = %link, error = %e, "Skipping invalid sub-category link");
                None
            }
        })
        .collect();

    if targets.is_empty() {
        return Err(HarvestError::Input(format!(
            "no usable links in {}",
            links_path.display()
        )));
    }
    Ok(targets)
}
