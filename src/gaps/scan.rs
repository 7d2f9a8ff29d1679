//! Scan Driver
//! ===========
//! Walks fixed width windows from block zero up to the head, counting and, where useful,
//! enumerating the missing block numbers of each window. One line is written per window that
//! holds at least one stored block. Any failing query ends the scan.

use std::{future::Future, io::Write};

use futures::{stream, StreamExt};
use pit_wall::Progress;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    report::GapReport,
    store::{BlockNumbersStore, QueryError},
    window::{window_count, windows, BlockNumber, Window},
};
use crate::config::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub page_size: u32,
    /// Windows evaluated in flight, reports are still written in window order.
    pub concurrency: usize,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            concurrency: config.concurrency as usize,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub head: BlockNumber,
    pub windows_scanned: u64,
    /// Includes numbers above the head that fall within the last window.
    pub missing_total: i64,
    /// Ranges of consecutive windows without a single stored block.
    pub missing_runs: Vec<Window>,
}

impl ScanSummary {
    fn end_missing_run(&mut self, run: &mut Option<Window>) {
        if let Some(run) = run.take() {
            warn!(
                start = run.start,
                end = run.end,
                missing = run.size(),
                "no blocks stored in range"
            );
            self.missing_runs.push(run);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The blocks table holds no block numbers to scan.
    NoBlocks,
    Completed(ScanSummary),
    /// Stopped by a termination request, `None` when that happened before the head was
    /// resolved.
    Interrupted(Option<ScanSummary>),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("failed to write gap report")]
    Write(#[from] std::io::Error),
}

/// Counts the gaps in a window. Windows that are complete or entirely missing are not
/// enumerated.
pub async fn evaluate_window<S>(store: &S, window: Window) -> Result<GapReport, QueryError>
where
    S: BlockNumbersStore,
{
    let present = store.count_present(&window).await?;
    let missing_count = window.size() - present;

    let missing_numbers = if missing_count > 0 && missing_count < window.size() {
        store.missing_numbers(&window).await?
    } else {
        Vec::new()
    };

    Ok(GapReport {
        window,
        missing_count,
        missing_numbers,
    })
}

pub async fn scan_gaps<S, W>(
    store: &S,
    options: &ScanOptions,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<ScanOutcome, ScanError>
where
    S: BlockNumbersStore,
    W: Write,
{
    tokio::pin!(shutdown);

    let head = tokio::select! {
        biased;

        _ = &mut shutdown => return Ok(ScanOutcome::Interrupted(None)),
        head = store.head() => head?,
    };

    let head = match head {
        Some(head) if head >= 0 => head,
        Some(head) => {
            warn!(head, "only negative block numbers stored, nothing to scan");
            return Ok(ScanOutcome::NoBlocks);
        }
        None => {
            warn!("no blocks stored, nothing to scan");
            return Ok(ScanOutcome::NoBlocks);
        }
    };

    let total_windows = window_count(options.page_size, head);
    debug!(head, total_windows, "resolved head");

    let mut progress = Progress::new("check blocks gaps", total_windows);
    let mut summary = ScanSummary {
        head,
        ..ScanSummary::default()
    };
    // Consecutive entirely missing windows are logged as one range.
    let mut missing_run: Option<Window> = None;

    let reports = stream::iter(windows(options.page_size, head))
        .map(|window| evaluate_window(store, window))
        .buffered(options.concurrency.max(1));

    tokio::pin!(reports);

    loop {
        let report = tokio::select! {
            biased;

            _ = &mut shutdown => {
                summary.end_missing_run(&mut missing_run);
                return Ok(ScanOutcome::Interrupted(Some(summary)));
            }
            report = reports.next() => match report {
                Some(report) => report?,
                None => break,
            },
        };

        summary.windows_scanned += 1;
        summary.missing_total += report.missing_count;

        if report.is_fully_missing() {
            missing_run = Some(match missing_run {
                Some(run) => Window {
                    start: run.start,
                    end: report.window.end,
                },
                None => report.window,
            });
        } else {
            summary.end_missing_run(&mut missing_run);
            writeln!(out, "{}", report.truncated())?;
            out.flush()?;
        }

        progress.inc_work_done();
        if progress.work_done % 100 == 0 {
            debug!("{}", progress.get_progress_string());
        }
    }

    summary.end_missing_run(&mut missing_run);

    Ok(ScanOutcome::Completed(summary))
}
