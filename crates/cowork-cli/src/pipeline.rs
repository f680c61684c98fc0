//! The two-stage run: collect listings once, then visit each detail page in
//! order, checkpointing as rows accumulate.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use cowork_core::{AppConfig, CombinedRecord};
use cowork_scraper::driver::pause;
use cowork_scraper::{ListingOptions, PageDriver, Timings};

use crate::export::{checkpoint_file_name, RecordSink};

#[derive(Debug, Clone)]
pub(crate) struct PipelineOptions {
    pub listing_url: String,
    pub listing: ListingOptions,
    pub limit: Option<usize>,
    pub checkpoint_every: usize,
    pub inter_request_delay: Duration,
    pub output_file: String,
}

impl PipelineOptions {
    pub(crate) fn from_config(config: &AppConfig, limit: Option<usize>) -> Self {
        let timings = Timings::default()
            .with_page_load_timeout(Duration::from_secs(config.page_load_timeout_secs));
        Self {
            listing_url: config.listing_url.clone(),
            listing: ListingOptions {
                timings,
                max_pagination_clicks: config.max_pagination_clicks,
            },
            limit,
            checkpoint_every: config.checkpoint_every.max(1),
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
            output_file: config.output_file.clone(),
        }
    }

    fn timings(&self) -> &Timings {
        &self.listing.timings
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub entries: usize,
    pub detail_fetches: usize,
    pub checkpoints_written: usize,
    pub final_saved: bool,
}

/// Runs both stages against `driver`, writing checkpoints and the final
/// workbook through `sink`.
///
/// # Errors
///
/// Returns an error if the listing stage fails or leaves no entries after the
/// limit is applied. Nothing is saved in that case. Detail and save failures are logged and do not
/// abort the run.
pub(crate) async fn run_pipeline<D, S>(
    driver: &mut D,
    sink: &mut S,
    options: &PipelineOptions,
) -> anyhow::Result<RunSummary>
where
    D: PageDriver,
    S: RecordSink,
{
    tracing::info!(url = %options.listing_url, "stage 1: collecting listings");
    let mut entries = cowork_scraper::collect(driver, &options.listing_url, &options.listing)
        .await
        .context("failed to collect listings")?;
    if let Some(limit) = options.limit {
        entries.truncate(limit);
    }
    if entries.is_empty() {
        anyhow::bail!("no listings found at {}", options.listing_url);
    }

    let total = entries.len();
    let mut summary = RunSummary {
        entries: total,
        ..RunSummary::default()
    };
    let mut rows: Vec<CombinedRecord> = Vec::with_capacity(total);

    tracing::info!(total, "stage 2: scraping details");
    for (index, entry) in entries.into_iter().enumerate() {
        let processed = index + 1;
        tracing::info!(name = %entry.name, "Processing {processed}/{total}");

        let record = if entry.has_link() {
            let details = cowork_scraper::extract(driver, &entry.link, options.timings()).await;
            summary.detail_fetches += 1;
            CombinedRecord::new(entry, details)
        } else {
            tracing::warn!(name = %entry.name, "entry has no link, skipping detail page");
            CombinedRecord::pass_through(entry)
        };
        rows.push(record);

        if processed % options.checkpoint_every == 0 {
            let filename = checkpoint_file_name(processed);
            if sink.save(&rows, &filename) {
                summary.checkpoints_written += 1;
            } else {
                tracing::warn!(filename = %filename, "checkpoint not written, continuing");
            }
        }

        pause(options.inter_request_delay).await;
    }

    summary.final_saved = sink.save(&rows, &options.output_file);
    tracing::info!(
        entries = summary.entries,
        detail_fetches = summary.detail_fetches,
        checkpoints = summary.checkpoints_written,
        final_saved = summary.final_saved,
        "run complete"
    );
    Ok(summary)
}

/// How a session ended.
#[derive(Debug)]
pub(crate) enum SessionOutcome {
    Finished(RunSummary),
    Failed(anyhow::Error),
    Interrupted,
}

/// Runs the pipeline until it finishes or `interrupt` resolves, then closes
/// `driver`. The driver is closed exactly once on every path. An interrupted
/// run skips the final save.
pub(crate) async fn run_until_interrupted<D, S, F>(
    driver: &mut D,
    sink: &mut S,
    options: &PipelineOptions,
    interrupt: F,
) -> SessionOutcome
where
    D: PageDriver,
    S: RecordSink,
    F: Future<Output = ()>,
{
    let outcome = tokio::select! {
        biased;
        () = interrupt => SessionOutcome::Interrupted,
        result = run_pipeline(driver, sink, options) => match result {
            Ok(summary) => SessionOutcome::Finished(summary),
            Err(err) => SessionOutcome::Failed(err),
        },
    };

    match &outcome {
        SessionOutcome::Finished(summary) => tracing::info!(
            entries = summary.entries,
            checkpoints = summary.checkpoints_written,
            final_saved = summary.final_saved,
            "scraping finished"
        ),
        SessionOutcome::Failed(err) => tracing::error!(error = ?err, "run failed"),
        SessionOutcome::Interrupted => tracing::warn!("interrupted, skipping final save"),
    }

    if let Err(err) = driver.close().await {
        tracing::warn!(error = %err, "failed to close browser");
    }
    outcome
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
