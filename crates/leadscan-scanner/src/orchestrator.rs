//! Discovery orchestrator for resumable zone/category scans.
//!
//! This module provides the `DiscoveryOrchestrator`, which runs search units
//! strictly one at a time: navigate, page through results, extract each
//! candidate, gate and dedup, persist, then mark the unit complete. Failures
//! never escape a unit; they become [`UnitOutcome`] values.

use crate::error::{Result, ScanError};
use crate::extractor::{extract_record, is_blank, read_detail_view, ExtractionRules};
use crate::url_builder::build_search_url;
use chrono::{DateTime, Utc};
use leadscan_browser::BrowserActions;
use leadscan_core::{
    AppConfig, BusinessRecord, DedupKey, ScanningConfig, SearchConfig, SearchUnit, SelectorsConfig, Zone,
};
use leadscan_store::{CompletionLedger, DedupIndex, RecordSink};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Terminal state of one search unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Already recorded in the ledger; nothing was attempted
    Skipped,
    /// Completed and this many new leads were written
    CompletedWithLeads(usize),
    /// Completed without new leads (no results, or none acceptable)
    CompletedEmpty,
    /// Navigation, paging or persistence failed; retried on the next run
    FailedRecoverable(String),
}

impl UnitOutcome {
    /// Whether the unit is recorded as finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::FailedRecoverable(_))
    }
}

/// Totals for one run.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Units skipped because the ledger already held them
    pub skipped: usize,
    /// Units that produced at least one lead
    pub with_leads: usize,
    /// Units that completed without leads
    pub empty: usize,
    /// Units left for a later run
    pub failed: usize,
    /// Leads appended to the sink
    pub leads_written: usize,
}

impl ScanSummary {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            skipped: 0,
            with_leads: 0,
            empty: 0,
            failed: 0,
            leads_written: 0,
        }
    }

    fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Skipped => self.skipped += 1,
            UnitOutcome::CompletedWithLeads(n) => {
                self.with_leads += 1;
                self.leads_written += n;
            }
            UnitOutcome::CompletedEmpty => self.empty += 1,
            UnitOutcome::FailedRecoverable(_) => self.failed += 1,
        }
    }

    /// Units that were actually searched.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.with_leads + self.empty + self.failed
    }
}

/// Mutable scan state, owned by the caller and threaded through every unit.
#[derive(Debug)]
pub struct ScanState<L, S> {
    /// Keys of every lead seen so far
    pub dedup: DedupIndex,
    /// Completed units
    pub ledger: L,
    /// Lead output
    pub sink: S,
}

impl<L: CompletionLedger, S: RecordSink> ScanState<L, S> {
    /// Bundle the three state objects.
    pub fn new(dedup: DedupIndex, ledger: L, sink: S) -> Self {
        Self {
            dedup,
            ledger,
            sink,
        }
    }
}

/// Runs search units against a browser.
pub struct DiscoveryOrchestrator {
    /// Page capabilities
    browser: Arc<dyn BrowserActions>,
    /// Paging, retry and pacing policy
    scanning: ScanningConfig,
    /// Query construction
    search: SearchConfig,
    /// Page selectors
    selectors: SelectorsConfig,
    /// Field policies for the extractor
    rules: ExtractionRules,
    /// Per-attempt navigation limit
    navigation_timeout: Duration,
}

impl DiscoveryOrchestrator {
    /// Create an orchestrator from a validated configuration.
    pub fn new(browser: Arc<dyn BrowserActions>, config: &AppConfig) -> Result<Self> {
        let rules = ExtractionRules::new(&config.selectors, config.search.pincode_matcher()?);

        Ok(Self {
            browser,
            scanning: config.scanning.clone(),
            search: config.search.clone(),
            selectors: config.selectors.clone(),
            rules,
            navigation_timeout: config.browser.navigation_timeout(),
        })
    }

    /// Process `units` in order, skipping any the ledger already holds.
    ///
    /// Never fails as a whole: unit failures are logged and counted.
    pub async fn run<L, S>(&self, units: &[SearchUnit], state: &mut ScanState<L, S>) -> ScanSummary
    where
        L: CompletionLedger,
        S: RecordSink,
    {
        let mut summary = ScanSummary::start();
        let zone_total = units.iter().map(|u| &u.zone).collect::<HashSet<_>>().len();
        let mut current_zone: Option<&Zone> = None;
        let mut zone_index = 0;

        for unit in units {
            if current_zone != Some(&unit.zone) {
                current_zone = Some(&unit.zone);
                zone_index += 1;
                info!(zone = %unit.zone, "Scanning zone [{}/{}]", zone_index, zone_total);
            }

            if state.ledger.is_complete(unit) {
                summary.record(&UnitOutcome::Skipped);
                continue;
            }

            let attempted = summary.attempted();
            if attempted > 0 {
                if attempted % self.scanning.restart_every.max(1) == 0 {
                    self.recycle_session().await;
                }
                self.pause_between_units().await;
            }

            let outcome = self.process_unit(unit, state).await;
            summary.record(&outcome);
        }

        summary.finished_at = Some(Utc::now());
        info!(
            skipped = summary.skipped,
            with_leads = summary.with_leads,
            empty = summary.empty,
            failed = summary.failed,
            leads = summary.leads_written,
            "scan complete"
        );
        summary
    }

    /// Run one unit to a terminal outcome.
    pub async fn process_unit<L, S>(
        &self,
        unit: &SearchUnit,
        state: &mut ScanState<L, S>,
    ) -> UnitOutcome
    where
        L: CompletionLedger,
        S: RecordSink,
    {
        if state.ledger.is_complete(unit) {
            return UnitOutcome::Skipped;
        }

        let outcome = match self.search_unit(unit, state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(zone = %unit.zone, category = %unit.category, "search failed: {}", e);
                UnitOutcome::FailedRecoverable(e.to_string())
            }
        };

        match &outcome {
            UnitOutcome::CompletedWithLeads(n) => {
                info!(zone = %unit.zone, category = %unit.category, leads = n, "saved new leads");
            }
            UnitOutcome::CompletedEmpty => {
                info!(zone = %unit.zone, category = %unit.category, "0 new leads");
            }
            UnitOutcome::Skipped | UnitOutcome::FailedRecoverable(_) => {}
        }
        outcome
    }

    async fn search_unit<L, S>(
        &self,
        unit: &SearchUnit,
        state: &mut ScanState<L, S>,
    ) -> Result<UnitOutcome>
    where
        L: CompletionLedger,
        S: RecordSink,
    {
        let url = build_search_url(&self.search.base_url, &self.search.query_template, unit)?;
        info!(zone = %unit.zone, category = %unit.category, "searching: {}", unit);
        self.navigate_with_retry(&url).await?;

        let mut markers = vec![self.selectors.result_link.clone()];
        if let Some(no_results) = &self.selectors.no_results {
            markers.push(no_results.clone());
        }

        let (leads, keys) = match self
            .browser
            .wait_for_any(&markers, self.scanning.results_timeout())
            .await?
        {
            Some(0) => {
                let count = self.load_results().await?;
                debug!(count, "extracting listings");
                self.harvest(unit, count, &state.dedup).await
            }
            Some(_) => {
                info!(zone = %unit.zone, category = %unit.category, "no results");
                (Vec::new(), Vec::new())
            }
            None => {
                info!(zone = %unit.zone, category = %unit.category, "no results (timeout)");
                (Vec::new(), Vec::new())
            }
        };

        let written = state.sink.append(&leads)?;
        for key in keys {
            state.dedup.insert(key);
        }
        state.ledger.mark_complete(unit)?;

        Ok(if written > 0 {
            UnitOutcome::CompletedWithLeads(written)
        } else {
            UnitOutcome::CompletedEmpty
        })
    }

    /// Navigate with linear backoff between attempts.
    async fn navigate_with_retry(&self, url: &str) -> Result<()> {
        let attempts = self.scanning.navigation_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.browser.navigate(url, self.navigation_timeout).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt < attempts {
                        let delay = self.scanning.retry_delay()
                            * u32::try_from(attempt).unwrap_or(u32::MAX);
                        warn!(
                            "navigation failed (attempt {}/{}), retrying in {:?}: {}",
                            attempt, attempts, delay, e
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(ScanError::Navigation {
            url: url.to_string(),
            attempts,
            reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// Scroll the feed until the result count reaches the cap, stops
    /// changing for `stable_polls` observations, or `max_scroll_polls` runs out.
    async fn load_results(&self) -> Result<usize> {
        let cap = self.scanning.max_results_per_search;
        let link = &self.selectors.result_link;
        let mut count = self.browser.count_matches(link).await?;
        let mut unchanged = 0;

        for _ in 0..self.scanning.max_scroll_polls {
            if count >= cap {
                break;
            }
            if let Err(e) = self.browser.scroll_feed(&self.selectors.result_feed).await {
                debug!("stopped scrolling: {}", e);
                break;
            }
            sleep(self.scanning.poll_interval()).await;

            let current = match self.browser.count_matches(link).await {
                Ok(n) => n,
                Err(e) => {
                    debug!("stopped counting results: {}", e);
                    break;
                }
            };
            if current == count {
                unchanged += 1;
                if unchanged >= self.scanning.stable_polls {
                    break;
                }
            } else {
                unchanged = 0;
                count = current;
            }
        }

        Ok(count.min(cap))
    }

    /// Extract, gate and dedup each of the first `count` candidates.
    ///
    /// Returns the accepted records with their keys. The index is left
    /// untouched; keys are committed once the batch is persisted.
    async fn harvest(
        &self,
        unit: &SearchUnit,
        count: usize,
        dedup: &DedupIndex,
    ) -> (Vec<BusinessRecord>, Vec<DedupKey>) {
        let policy = dedup.policy();
        let mut accepted = Vec::new();
        let mut batch_keys = HashSet::new();

        for index in 0..count {
            let record = match self.extract_candidate(index, &unit.zone).await {
                Ok(record) => record,
                Err(e) => {
                    debug!(index, "skipping candidate: {}", e);
                    continue;
                }
            };

            let Some(key) = policy.key_for(&record) else {
                if is_blank(&record) {
                    debug!(index, "detail panel did not load");
                } else {
                    debug!(index, name = %record.name, "discarded: incomplete record");
                }
                continue;
            };
            if dedup.contains(&key) || !batch_keys.insert(key) {
                debug!(index, name = %record.name, "discarded: duplicate");
                continue;
            }

            info!(name = %record.name, contact = %record.contact_number, "new lead");
            accepted.push(record);
        }

        (accepted, batch_keys.into_iter().collect())
    }

    async fn extract_candidate(&self, index: usize, zone: &Zone) -> Result<BusinessRecord> {
        self.browser.click(&self.selectors.result_link, index).await?;

        let title = [self.selectors.detail_title.clone()];
        match self
            .browser
            .wait_for_any(&title, self.scanning.detail_timeout())
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => debug!(index, "detail title not shown, reading anyway"),
            Err(e) => debug!(index, "waiting for detail title failed: {}", e),
        }

        let view = read_detail_view(self.browser.as_ref(), &self.selectors).await;
        Ok(extract_record(&view, zone, &self.rules))
    }

    /// Close and reopen the browsing session; failures are logged only.
    async fn recycle_session(&self) {
        info!("recycling browser session");
        if let Err(e) = self.browser.close_session().await {
            warn!("closing browser session failed: {}", e);
        }
        if let Err(e) = self.browser.new_session().await {
            warn!("opening browser session failed: {}", e);
        }
    }

    async fn pause_between_units(&self) {
        let base = self.scanning.unit_delay_ms;
        if base == 0 {
            return;
        }
        let jitter = rand::thread_rng().gen_range(0..=base);
        sleep(Duration::from_millis(base + jitter)).await;
    }
}
