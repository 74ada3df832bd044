//! Run summary produced by the pipeline

use crate::state::BatchTally;
use std::fmt::Write;

/// How one category went
#[derive(Debug, Clone, Default)]
pub struct CategorySummary {
    pub name: String,
    /// Sub-category links discovered on the listing page
    pub links: usize,
    pub tally: BatchTally,
    /// Rows flattened and appended to the silver file
    pub flattened_rows: usize,
    /// Why the category stopped early, if it did
    pub skipped: Option<String>,
}

/// Results of a full pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub run_id: i64,
    pub categories: Vec<CategorySummary>,
    /// Rows in the silver file after the last append
    pub silver_total_rows: usize,
}

impl PipelineSummary {
    /// Counters summed across categories
    pub fn total(&self) -> BatchTally {
        let mut total = BatchTally::default();
        for category in &self.categories {
            total.absorb(&category.tally);
        }
        total
    }

    /// Categories that produced silver rows
    pub fn categories_consolidated(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| c.flattened_rows > 0)
            .count()
    }
}

/// Formats the run summary as plain text
pub fn format_run_summary(summary: &PipelineSummary) -> String {
    let mut out = String::new();
    let total = summary.total();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Pipeline Run {} ===\n", summary.run_id);

    for category in &summary.categories {
        let _ = writeln!(out, "{}:", category.name);
        if let Some(reason) = &category.skipped {
            let _ = writeln!(out, "  Skipped: {}", reason);
        }
        if category.links == 0 {
            continue;
        }

        let _ = writeln!(out, "  Links discovered: {}", category.links);
        let _ = writeln!(
            out,
            "  Unique products scraped: {}",
            category.tally.unique_products
        );
        let _ = writeln!(out, "  API outages: {}", category.tally.outages);
        let _ = writeln!(out, "  Retries: {}", category.tally.retries);
        if category.tally.persist_failures > 0 {
            let _ = writeln!(
                out,
                "  Persist failures: {}",
                category.tally.persist_failures
            );
        }
        let _ = writeln!(out, "  Rows appended: {}", category.flattened_rows);
    }

    let _ = writeln!(out, "\nTotals:");
    let _ = writeln!(out, "  Total unique products scraped: {}", total.unique_products);
    let _ = writeln!(out, "  Total API outages/failures: {}", total.outages);
    let _ = writeln!(out, "  Retries: {}", total.retries);
    let _ = writeln!(
        out,
        "  Categories consolidated: {} / {}",
        summary.categories_consolidated(),
        summary.categories.len()
    );
    let _ = writeln!(out, "  Rows in silver file: {}", summary.silver_total_rows);

    out
}

/// Prints the run summary to stdout
pub fn print_run_summary(summary: &PipelineSummary) {
    print!("{}", format_run_summary(summary));
}
