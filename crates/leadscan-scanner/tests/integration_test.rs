use leadscan_browser::{BrowserActions, BrowserEngine};
use leadscan_core::{AppConfig, DedupPolicy, SearchUnit, Zone};
use leadscan_scanner::{DiscoveryOrchestrator, ScanState, UnitOutcome};
use leadscan_store::{DedupIndex, LeadSink, ProgressLedger};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
#[ignore = "Requires Chrome browser and network access"]
async fn test_single_unit_scan() {
    let tmp = TempDir::new().expect("create temp dir");
    let leads = tmp.path().join("leads.csv");
    let progress = tmp.path().join("progress.txt");

    let mut config = AppConfig::default();
    config.scanning.max_results_per_search = 5;

    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .expect("launch browser"),
    );
    let browser: Arc<dyn BrowserActions> = engine.clone();
    let orchestrator = DiscoveryOrchestrator::new(browser, &config).expect("create orchestrator");

    let mut state = ScanState::new(
        DedupIndex::bootstrap(&leads, DedupPolicy::Phone),
        ProgressLedger::open(&progress).expect("open ledger"),
        LeadSink::open(&leads).expect("open sink"),
    );
    let unit = SearchUnit::new(Zone::new("576101").expect("valid zone"), "Bakery");

    let outcome = orchestrator.process_unit(&unit, &mut state).await;
    assert!(outcome.is_complete(), "unexpected outcome: {outcome:?}");
    assert!(matches!(
        outcome,
        UnitOutcome::CompletedWithLeads(_) | UnitOutcome::CompletedEmpty
    ));

    let ledger = std::fs::read_to_string(&progress).expect("read ledger");
    assert_eq!(ledger, "576101,Bakery\n");
}
