mod common;

use common::FakeApi;
use role_scout::{BatchOrchestrator, BatchRow, BatchState, InputError, ProgressEvent, ScoutError};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_test::{assert_err, assert_ok};

const THREE_ROWS: &str = "Title,Company Name\nCTO,Acme\nCFO,Globex\nCEO,Initech\n";

fn drain(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_failed_row_does_not_stop_batch() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new().failing("Globex"), 5);

    let tokens = assert_ok!(orchestrator.start(THREE_ROWS).await);
    assert_eq!(tokens.pdf.as_str(), "token-1");

    let outcomes: Vec<bool> = orchestrator
        .results()
        .entries()
        .iter()
        .map(|e| e.outcome.is_success())
        .collect();
    assert_eq!(outcomes, vec![true, false, true]);
    assert_eq!(
        orchestrator.results().entries()[1].outcome.error_message(),
        Some("Lookup failed")
    );
    assert_eq!(orchestrator.state(), BatchState::Ready);
    assert_eq!(orchestrator.progress().fraction, 1.0);
}

#[tokio::test]
async fn test_report_receives_full_ordered_result_once() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new().failing("Acme"), 5);
    assert_ok!(orchestrator.start(THREE_ROWS).await);

    let api = orchestrator.api();
    assert_eq!(api.report_count(), 1);

    let reports = api.reports.lock().unwrap();
    let companies: Vec<&str> = reports[0]
        .entries()
        .iter()
        .map(|e| e.company_name.as_str())
        .collect();
    assert_eq!(companies, vec!["Acme", "Globex", "Initech"]);
    assert_eq!(&reports[0], orchestrator.results());
}

#[tokio::test]
async fn test_lookups_are_sequential_and_in_order() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 5);
    assert_ok!(orchestrator.start(THREE_ROWS).await);

    let api = orchestrator.api();
    assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 1);

    let roles: Vec<String> = api
        .lookups
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.role.clone())
        .collect();
    assert_eq!(roles, vec!["CTO", "CFO", "CEO"]);
}

#[tokio::test]
async fn test_progress_events() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new().failing("Initech"), 5);
    let mut rx = orchestrator.subscribe();

    assert_ok!(orchestrator.start(THREE_ROWS).await);
    let events = drain(&mut rx);

    assert_eq!(
        events.first(),
        Some(&ProgressEvent::Started {
            total: 3,
            lines_beyond_cap: 0
        })
    );
    assert_eq!(events[1], ProgressEvent::Processing { index: 0, total: 3 });

    let fractions: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::RowFinished { fraction, .. } => Some(*fraction),
            _ => None,
        })
        .collect();
    assert_eq!(fractions.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(fractions.last(), Some(&1.0));

    let n = events.len();
    assert_eq!(events[n - 2], ProgressEvent::SubmittingReport { total: 3 });
    assert!(matches!(
        &events[n - 1],
        ProgressEvent::ReportReady { token } if token.as_str() == "token-1"
    ));
}

#[tokio::test]
async fn test_no_rows_keeps_idle() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 5);

    let err = assert_err!(orchestrator.start("Title,Company Name\n , \n").await);
    assert!(matches!(err, ScoutError::Input(InputError::NoValidRows)));
    assert_eq!(orchestrator.state(), BatchState::Idle);
    assert_eq!(orchestrator.progress().message, InputError::NoValidRows.to_string());

    let err = assert_err!(orchestrator.start("Role,Company Name\nCTO,Acme\n").await);
    assert!(matches!(
        err,
        ScoutError::Input(InputError::MissingColumns {
            title: true,
            company: false
        })
    ));

    let err = assert_err!(orchestrator.run_batch(Vec::new()).await);
    assert!(err.is_input());

    assert_eq!(orchestrator.api().lookup_count(), 0);
    assert_eq!(orchestrator.api().report_count(), 0);
}

#[tokio::test]
async fn test_row_cap_is_surfaced() {
    let mut text = String::from("Title,Company Name\n");
    for i in 0..7 {
        text.push_str(&format!("Role {},Company {}\n", i, i));
    }

    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 5);
    let mut rx = orchestrator.subscribe();
    assert_ok!(orchestrator.start(&text).await);

    assert_eq!(orchestrator.results().len(), 5);
    assert_eq!(orchestrator.api().lookup_count(), 5);
    assert_eq!(
        drain(&mut rx).first(),
        Some(&ProgressEvent::Started {
            total: 5,
            lines_beyond_cap: 2
        })
    );
}

#[tokio::test]
async fn test_report_token_redeemed_only_when_ready() {
    let api = FakeApi::new().report_replies(vec![Ok("abc123")]);
    let mut orchestrator = BatchOrchestrator::new(api, 5);

    assert!(orchestrator.redeem_report().is_none());
    assert!(!orchestrator.session().is_view_enabled());

    assert_ok!(orchestrator.start(THREE_ROWS).await);

    let url = orchestrator.redeem_report().unwrap();
    assert_eq!(url, "http://scout.test/pdf-download/abc123");
    // 兑换不消耗令牌
    assert_eq!(orchestrator.redeem_report(), Some(url));
    assert!(orchestrator.redeem_csv().is_none());
}

#[tokio::test]
async fn test_report_failure_then_retry() {
    let api = FakeApi::new().report_replies(vec![Err("PDF renderer unavailable"), Ok("second")]);
    let mut orchestrator = BatchOrchestrator::new(api, 5);

    let err = assert_err!(orchestrator.start(THREE_ROWS).await);
    assert!(matches!(err, ScoutError::Report { .. }));
    assert_eq!(orchestrator.state(), BatchState::Failed);
    assert_eq!(orchestrator.progress().message, "PDF renderer unavailable");
    assert!(orchestrator.redeem_report().is_none());
    assert_eq!(orchestrator.results().len(), 3);

    let tokens = assert_ok!(orchestrator.start(THREE_ROWS).await);
    assert_eq!(tokens.pdf.as_str(), "second");
    assert_eq!(orchestrator.state(), BatchState::Ready);
    assert_eq!(orchestrator.api().lookup_count(), 6);
}

#[tokio::test]
async fn test_new_run_discards_previous_token() {
    let api = FakeApi::new().report_replies(vec![Ok("first"), Err("boom")]);
    let mut orchestrator = BatchOrchestrator::new(api, 5);

    assert_ok!(orchestrator.start(THREE_ROWS).await);
    assert!(orchestrator.token().is_some());

    assert_err!(orchestrator.start(THREE_ROWS).await);
    assert!(orchestrator.token().is_none());
    assert!(orchestrator.redeem_report().is_none());
}

#[tokio::test]
async fn test_reopen_resets_before_next_run() {
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 5);
    let mut rx = orchestrator.subscribe();

    assert_ok!(orchestrator.start(THREE_ROWS).await);
    drain(&mut rx);

    orchestrator.open();
    assert_eq!(orchestrator.state(), BatchState::Idle);
    assert!(orchestrator.token().is_none());
    assert!(orchestrator.results().is_empty());
    assert_eq!(orchestrator.progress().fraction, 0.0);
    assert!(orchestrator.progress().message.is_empty());
    assert_eq!(drain(&mut rx), vec![ProgressEvent::Reset]);

    // 未经 open 直接开始新一轮时，Reset 同样先于任何行
    assert_ok!(orchestrator.start(THREE_ROWS).await);
    assert_ok!(orchestrator.start(THREE_ROWS).await);
    let events = drain(&mut rx);
    let reset_at = events.iter().rposition(|e| *e == ProgressEvent::Reset).unwrap();
    assert!(matches!(events[reset_at + 1], ProgressEvent::Started { .. }));
}

#[tokio::test]
async fn test_rerun_is_reproducible() {
    let mut first = BatchOrchestrator::new(FakeApi::new().failing("Globex"), 5);
    let mut second = BatchOrchestrator::new(FakeApi::new().failing("Globex"), 5);

    assert_ok!(first.start(THREE_ROWS).await);
    assert_ok!(second.start(THREE_ROWS).await);

    assert_eq!(first.results(), second.results());
}

#[tokio::test]
async fn test_run_batch_with_prepared_rows() {
    let rows = vec![BatchRow::new("VP, Eng", "Acme Inc"), BatchRow::new("", "Globex")];
    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 5);

    assert_ok!(orchestrator.run_batch(rows).await);

    let lookups = orchestrator.api().lookups.lock().unwrap().clone();
    assert_eq!(lookups[0].role, "VP, Eng");
    assert_eq!(lookups[0].company, "Acme Inc");
    assert_eq!(lookups[1].role, "");
}

#[tokio::test]
async fn test_run_batch_applies_cap_and_drops_blank_rows() {
    let mut rows = vec![BatchRow::new("  ", "")];
    for i in 0..4 {
        rows.push(BatchRow::new(format!("Role {}", i), format!("Company {}", i)));
    }

    let mut orchestrator = BatchOrchestrator::new(FakeApi::new(), 3);
    let mut rx = orchestrator.subscribe();
    assert_ok!(orchestrator.run_batch(rows).await);

    assert_eq!(orchestrator.api().lookup_count(), 3);
    assert_eq!(orchestrator.results().entries()[0].company_name, "Company 0");
    assert_eq!(
        drain(&mut rx).first(),
        Some(&ProgressEvent::Started {
            total: 3,
            lines_beyond_cap: 1
        })
    );

    let err = assert_err!(orchestrator.run_batch(vec![BatchRow::new("", " ")]).await);
    assert!(matches!(err, ScoutError::Input(InputError::NoValidRows)));
}
