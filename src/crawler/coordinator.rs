//! Crawler coordinator - frontier engine
//!
//! This module contains the crawl loop that drives terms through their
//! lifecycle:
//! - Picking the next pending term from the ledger
//! - Resuming from the page cursor when it names that term
//! - Paging through results, storing quotes and queueing discovered terms
//! - Deciding per page whether the run stops (cutoff, interrupt) or the term
//!   is exhausted
//! - Recording every operation as a run
//!
//! Exactly one page is in flight at any time. That is what allows a single
//! cursor to describe where to resume.

use crate::config::Config;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::politeness::Politeness;
use crate::output::{load_statistics, CrawlStatistics};
use crate::quote::extract_terms;
use crate::state::PageCursor;
use crate::storage::{RunStatus, Storage};
use crate::TrailError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal, checked at page boundaries only
///
/// A fetch in flight always completes (or fails) before the engine looks at
/// the flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the engine to stop at the next page boundary
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// How paging through a term ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOutcome {
    /// Every page was fetched; the term is now Done
    Exhausted,

    /// The run's quota was reached; the term stays Pending and the cursor
    /// points at the last page processed
    Cutoff,

    /// An interrupt was observed; handled like a cutoff
    Interrupted,
}

/// Result of paging through one term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermProgress {
    pub term: String,

    /// New quotes stored while paging this term
    pub collected: u64,

    /// Fetch calls made for this term
    pub pages_fetched: u32,

    pub outcome: TermOutcome,
}

impl TermProgress {
    /// True if the term reached Exhausted (and is now Done)
    pub fn completed(&self) -> bool {
        self.outcome == TermOutcome::Exhausted
    }
}

/// Running totals for one invocation; never persisted
#[derive(Debug, Default)]
struct RunTally {
    collected: u64,
    interrupted: bool,
    /// Set once the first fetch of the invocation went out
    fetched_any: bool,
}

/// Main crawler coordinator structure
///
/// Owns the storage handle for its whole lifetime; dropping the coordinator
/// closes the store.
pub struct Coordinator<S: Storage, F: PageFetcher> {
    storage: S,
    fetcher: F,
    politeness: Politeness,
    max_pages: u32,
    punctuation: String,
    config_hash: String,
    interrupt: InterruptHandle,
}

impl<S: Storage, F: PageFetcher> Coordinator<S, F> {
    /// Creates a new coordinator instance
    ///
    /// When the ledger holds no terms at all, the configured seed terms are
    /// enqueued.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `storage` - Opened store backing the ledger, quotes and cursor
    /// * `fetcher` - Source of search result pages
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(TrailError)` - Failed to seed the ledger
    pub fn new(config: &Config, storage: S, fetcher: F) -> Result<Self, TrailError> {
        let mut coordinator = Self {
            storage,
            fetcher,
            politeness: Politeness::from_config(&config.politeness),
            max_pages: config.source.max_pages,
            punctuation: config.terms.punctuation.clone(),
            config_hash: String::new(),
            interrupt: InterruptHandle::new(),
        };
        coordinator.seed_if_empty(&config.terms.seeds)?;
        Ok(coordinator)
    }

    /// Records `hash` on every run this coordinator starts
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    /// Returns a handle that stops the engine at the next page boundary
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Consumes the coordinator, handing back the store
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn seed_if_empty(&mut self, seeds: &[String]) -> Result<(), TrailError> {
        if self.storage.count_pending_terms()? > 0 || self.storage.count_done_terms()? > 0 {
            return Ok(());
        }

        let seeds: Vec<String> = seeds
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let queued = self.storage.enqueue_terms(&seeds)?;
        tracing::info!("Seeded empty ledger with {} terms", queued);
        Ok(())
    }

    /// Collects quotes until at least `quota` new ones were stored or no
    /// pending term remains
    ///
    /// The term that pushes the total past the quota is cut off right after
    /// that page: it stays Pending and the cursor remembers the page, so the
    /// next run picks up exactly there.
    ///
    /// # Returns
    ///
    /// The number of new quotes stored (may exceed `quota` by up to one page)
    pub async fn collect_up_to(&mut self, quota: u64) -> Result<u64, TrailError> {
        let run_id = self.storage.create_run("collect", &self.config_hash)?;
        tracing::info!("Starting run {}: collecting {} quotes", run_id, quota);

        let mut tally = RunTally::default();
        let result = self.collect_loop(quota, &mut tally).await;
        self.close_run(run_id, &tally, result)?;
        Ok(tally.collected)
    }

    async fn collect_loop(&mut self, quota: u64, tally: &mut RunTally) -> Result<(), TrailError> {
        while tally.collected < quota {
            if self.interrupt.is_triggered() {
                tally.interrupted = true;
                break;
            }

            let Some(term) = self.storage.next_pending_term()? else {
                tracing::info!("No pending terms left; frontier exhausted");
                break;
            };

            let progress = self.page_through(&term, Some(quota), tally).await?;
            tracing::info!(
                "Progress: {}/{} quotes collected (\"{}\": +{}, {:?})",
                tally.collected,
                quota,
                progress.term,
                progress.collected,
                progress.outcome
            );

            if tally.interrupted {
                break;
            }
        }
        Ok(())
    }

    /// Pages the next `count` pending terms through to exhaustion, ignoring
    /// any quota
    ///
    /// Stops early when the frontier runs dry.
    ///
    /// # Returns
    ///
    /// The total number of new quotes stored across those terms
    pub async fn process_terms(&mut self, count: u32) -> Result<u64, TrailError> {
        let run_id = self.storage.create_run("process-terms", &self.config_hash)?;
        tracing::info!("Starting run {}: processing {} terms", run_id, count);

        let mut tally = RunTally::default();
        let result = self.process_terms_loop(count, &mut tally).await;
        self.close_run(run_id, &tally, result)?;
        Ok(tally.collected)
    }

    async fn process_terms_loop(
        &mut self,
        count: u32,
        tally: &mut RunTally,
    ) -> Result<(), TrailError> {
        for _ in 0..count {
            if self.interrupt.is_triggered() {
                tally.interrupted = true;
                break;
            }

            let Some(term) = self.storage.next_pending_term()? else {
                tracing::info!("No pending terms left; frontier exhausted");
                break;
            };

            let progress = self.page_through(&term, None, tally).await?;
            tracing::info!("{} quotes collected for \"{}\"", progress.collected, term);

            if tally.interrupted {
                break;
            }
        }
        Ok(())
    }

    /// Pages one caller-chosen term through to exhaustion
    ///
    /// The term is enqueued first if it has never been seen. A term that is
    /// already Done is fetched again on request; its quotes are deduplicated
    /// as usual and its state does not change.
    pub async fn process_term(&mut self, term: &str) -> Result<TermProgress, TrailError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(TrailError::InvalidArgument(
                "term must not be empty".to_string(),
            ));
        }

        let run_id = self.storage.create_run("process-term", &self.config_hash)?;
        tracing::info!("Starting run {}: processing \"{}\"", run_id, term);

        let mut tally = RunTally::default();
        let result = match self.storage.enqueue_terms(&[term.to_string()]) {
            Ok(_) => self.page_through(term, None, &mut tally).await,
            Err(e) => Err(e.into()),
        };
        self.close_run(run_id, &tally, result)
    }

    /// Returns quote and term counts
    pub fn stats(&self) -> Result<CrawlStatistics, TrailError> {
        load_statistics(&self.storage)
    }

    /// Clears every term, quote, run and the cursor
    ///
    /// The ledger is not re-seeded here; the next coordinator built on this
    /// store seeds it.
    pub fn reset(&mut self) -> Result<(), TrailError> {
        self.storage.reset()?;
        tracing::warn!("Cleared all terms, quotes and runs");
        Ok(())
    }

    /// Runs one term through Start → Paging → {Exhausted, Cutoff}
    ///
    /// With a quota, the run total is checked after every page before the
    /// exhaustion check, so a quota met on a term's last page still leaves the
    /// term Pending.
    async fn page_through(
        &mut self,
        term: &str,
        quota: Option<u64>,
        tally: &mut RunTally,
    ) -> Result<TermProgress, TrailError> {
        let cursor = self.storage.load_cursor()?;
        let mut page = PageCursor::start_page(cursor.as_ref(), term);
        if page > 1 {
            tracing::info!("Resuming \"{}\" at page {}", term, page);
        } else {
            tracing::info!("Collecting quotes for \"{}\"", term);
        }

        let mut progress = TermProgress {
            term: term.to_string(),
            collected: 0,
            pages_fetched: 0,
            outcome: TermOutcome::Exhausted,
        };
        let mut total_pages: Option<u32> = None;

        loop {
            // Every fetch but the first of the run waits, across term boundaries too
            if tally.fetched_any {
                self.politeness.wait().await;
            }
            tally.fetched_any = true;

            let fetched = self.fetcher.fetch_page(term, page).await?;
            progress.pages_fetched += 1;

            let total =
                *total_pages.get_or_insert_with(|| fetched.total_pages.min(self.max_pages));
            if page > total {
                tracing::debug!("\"{}\" has {} pages; nothing at page {}", term, total, page);
                break;
            }

            let new_quotes = self.storage.insert_quotes(&fetched.quotes, term)?;
            let candidates: Vec<String> = extract_terms(&fetched.quotes, &self.punctuation)
                .into_iter()
                .collect();
            let new_terms = self.storage.enqueue_terms(&candidates)?;

            progress.collected += new_quotes;
            tally.collected += new_quotes;
            tracing::debug!(
                "\"{}\" page {}/{}: {} quotes, {} new, {} new terms",
                term,
                page,
                total,
                fetched.quotes.len(),
                new_quotes,
                new_terms
            );

            if quota.is_some_and(|quota| tally.collected >= quota) {
                self.storage.save_cursor(&PageCursor::new(term, page))?;
                tracing::info!("Quota reached; \"{}\" paused at page {}", term, page);
                progress.outcome = TermOutcome::Cutoff;
                return Ok(progress);
            }

            if self.interrupt.is_triggered() {
                self.storage.save_cursor(&PageCursor::new(term, page))?;
                tracing::warn!("Interrupted; \"{}\" paused at page {}", term, page);
                tally.interrupted = true;
                progress.outcome = TermOutcome::Interrupted;
                return Ok(progress);
            }

            if page >= total {
                break;
            }
            page += 1;
        }

        self.storage.mark_term_done(term)?;
        if self
            .storage
            .load_cursor()?
            .is_some_and(|cursor| cursor.term == term)
        {
            self.storage.clear_cursor()?;
        }
        tracing::debug!("\"{}\" exhausted after {} fetches", term, progress.pages_fetched);

        Ok(progress)
    }

    /// Closes a run record on every exit path
    ///
    /// On failure the original error is returned even if recording the
    /// failure itself fails.
    fn close_run<T>(
        &mut self,
        run_id: i64,
        tally: &RunTally,
        result: Result<T, TrailError>,
    ) -> Result<T, TrailError> {
        match result {
            Ok(value) => {
                let status = if tally.interrupted {
                    RunStatus::Interrupted
                } else {
                    RunStatus::Completed
                };
                self.storage.finish_run(run_id, status, tally.collected)?;
                tracing::info!(
                    "Run {} {}: {} new quotes",
                    run_id,
                    status.to_db_string(),
                    tally.collected
                );
                Ok(value)
            }
            Err(e) => {
                tracing::error!("Run {} failed: {}", run_id, e);
                if let Err(close) =
                    self.storage
                        .finish_run(run_id, RunStatus::Failed, tally.collected)
                {
                    tracing::error!("Could not record failure of run {}: {}", run_id, close);
                }
                Err(e)
            }
        }
    }
}
