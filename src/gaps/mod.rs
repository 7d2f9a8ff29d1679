//! Block Gaps
//! ==========
//! Finds block numbers missing from the `blocks` table between zero and the stored head. The
//! number space is scanned in fixed width windows so the table is never read in full.

mod report;
mod scan;
mod store;
mod window;

use std::{future::Future, io};

use anyhow::Result;
use tracing::{info, warn};

use crate::{config::Config, db};

pub use report::{GapReport, REPORTING_LIMIT};
pub use scan::{evaluate_window, scan_gaps, ScanError, ScanOptions, ScanOutcome, ScanSummary};
pub use store::{BlockNumbersStore, BlockNumbersStorePostgres, MockBlockNumbersStore, QueryError};
pub use window::{window_count, windows, BlockNumber, Window};

/// Scans the configured database and writes the gap report to stdout. Resolves with the
/// outcome once the head has been passed, or earlier when `shutdown` completes.
pub async fn check_blocks_gaps(
    config: &Config,
    shutdown: impl Future<Output = ()>,
) -> Result<ScanOutcome> {
    info!(
        database = %db::redact_db_url(&config.database_url),
        page_size = config.page_size,
        concurrency = config.concurrency,
        "checking for gaps in blocks"
    );

    tokio::pin!(shutdown);

    let db_pool = tokio::select! {
        biased;

        _ = &mut shutdown => {
            warn!("interrupted while connecting to db");
            return Ok(ScanOutcome::Interrupted(None));
        }
        db_pool = db::get_db_pool("check-blocks-gaps", config) => db_pool?,
    };
    let store = BlockNumbersStorePostgres::new(db_pool.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = scan_gaps(&store, &ScanOptions::from(config), &mut out, &mut shutdown).await;

    db_pool.close().await;

    let outcome = outcome?;

    match &outcome {
        ScanOutcome::NoBlocks => info!("done checking blocks for gaps, blocks table is empty"),
        ScanOutcome::Completed(summary) => info!(
            head = summary.head,
            windows = summary.windows_scanned,
            missing = summary.missing_total,
            missing_runs = summary.missing_runs.len(),
            "done checking blocks for gaps"
        ),
        ScanOutcome::Interrupted(Some(summary)) => warn!(
            head = summary.head,
            windows = summary.windows_scanned,
            missing = summary.missing_total,
            "interrupted while checking blocks for gaps"
        ),
        ScanOutcome::Interrupted(None) => {
            warn!("interrupted before the head block number was resolved")
        }
    }

    Ok(outcome)
}
