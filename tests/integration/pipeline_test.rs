//! Integration tests for the scrape pipeline: chain ordering,
//! short-circuiting, exception recovery and output validation.

mod helpers;

use std::sync::Arc;

use futures::future::join_all;

use spiderline_core::{AppError, ErrorKind};
use spiderline_core::types::{CallbackOutput, Request, ResultItem};
use spiderline_middleware::{ClosureMiddleware, HookResult};

use helpers::{CallLog, OnException, OnInput, Recorder, item, trails};

#[tokio::test]
async fn test_input_hooks_run_in_order_then_callback_once() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("a", &log).input(OnInput::Continue).into_arc(),
        Recorder::new("b", &log).input(OnInput::Continue).into_arc(),
        Recorder::new("c", &log).input(OnInput::Continue).into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["a.input", "b.input", "c.input", "callback"]);
    assert_eq!(trails(&results), vec!["x"]);
}

#[tokio::test]
async fn test_input_short_circuit_skips_rest_and_callback() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("a", &log).input(OnInput::Continue).output().into_arc(),
        Recorder::new("b", &log)
            .input(OnInput::ShortCircuit(vec![item("from-b")]))
            .into_arc(),
        Recorder::new("c", &log).input(OnInput::Continue).into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["a.input", "b.input", "a.output"]);
    // The short-circuit result still goes through the output chain.
    assert_eq!(trails(&results), vec!["from-b>a"]);
}

#[tokio::test]
async fn test_empty_input_result_still_short_circuits() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("only", &log)
            .input(OnInput::ShortCircuit(Vec::new()))
            .into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["only.input"]);
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_output_hooks_run_in_reverse_load_order() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("A", &log).output().into_arc(),
        Recorder::new("B", &log).output().into_arc(),
        Recorder::new("C", &log).output().into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["callback", "C.output", "B.output", "A.output"]
    );
    // Each hook wrapped the stream returned by the previous one.
    assert_eq!(trails(&results), vec!["x>C>B>A"]);
}

#[tokio::test]
async fn test_output_hook_returning_continue_fails_scrape() {
    let log = CallLog::new();
    let broken = ClosureMiddleware::new("broken")
        .on_output(|_, _, _| async { Ok(HookResult::Continue) })
        .into_arc();
    let manager = helpers::manager_with(vec![
        Recorder::new("first", &log).output().into_arc(),
        broken,
        Recorder::new("last", &log).output().into_arc(),
    ])
    .await;

    let err = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ContractViolation);
    assert!(err.message.contains("broken"));
    // "last" ran before the violation, "first" never did.
    assert_eq!(log.entries(), vec!["callback", "last.output"]);
}

#[tokio::test]
async fn test_contract_violation_bypasses_exception_chain() {
    let log = CallLog::new();
    let broken = ClosureMiddleware::new("broken")
        .on_output(|_, _, _| async { Ok(HookResult::Continue) })
        .into_arc();
    let manager = helpers::manager_with(vec![
        Recorder::new("guard", &log)
            .exception(OnException::Recover(vec![item("recovered")]))
            .into_arc(),
        broken,
    ])
    .await;

    let err = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ContractViolation);
    assert_eq!(log.entries(), vec!["callback"]);
}

#[tokio::test]
async fn test_callback_error_recovered_by_exception_chain() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("A", &log)
            .exception(OnException::Continue)
            .output()
            .into_arc(),
        Recorder::new("B", &log)
            .exception(OnException::Recover(vec![item("r")]))
            .into_arc(),
        Recorder::new("C", &log)
            .exception(OnException::Continue)
            .into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_failing(&log, "parse failed"))
        .await
        .unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "callback",
            "C.exception(parse failed)",
            "B.exception(parse failed)",
            "A.output",
        ]
    );
    assert_eq!(trails(&results), vec!["r>A"]);
}

#[tokio::test]
async fn test_unrecovered_error_propagates_after_every_exception_hook() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("A", &log).exception(OnException::Continue).into_arc(),
        Recorder::new("B", &log).exception(OnException::Continue).into_arc(),
    ])
    .await;

    let err = helpers::scrape(&manager, helpers::request_failing(&log, "boom"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Processing);
    assert_eq!(err.message, "boom");
    assert_eq!(
        log.entries(),
        vec!["callback", "B.exception(boom)", "A.exception(boom)"]
    );
}

#[tokio::test]
async fn test_output_hook_error_skips_exception_chain() {
    let log = CallLog::new();
    let failing = ClosureMiddleware::new("failing")
        .on_output(|_, _, _| async { Err(AppError::processing("out boom")) })
        .into_arc();
    let manager = helpers::manager_with(vec![
        Recorder::new("guard", &log)
            .exception(OnException::Recover(vec![item("recovered")]))
            .into_arc(),
        failing,
    ])
    .await;

    let err = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Processing);
    assert_eq!(err.message, "out boom");
    assert_eq!(log.entries(), vec!["callback"]);
}

#[tokio::test]
async fn test_exception_hook_error_stops_exception_chain() {
    let log = CallLog::new();
    let failing = ClosureMiddleware::new("failing")
        .on_exception(|_, _, _| async { Err(AppError::internal("exc boom")) })
        .into_arc();
    let manager = helpers::manager_with(vec![
        Recorder::new("rescuer", &log)
            .exception(OnException::Recover(vec![item("recovered")]))
            .into_arc(),
        failing,
    ])
    .await;

    let err = helpers::scrape(&manager, helpers::request_failing(&log, "parse failed"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.message, "exc boom");
    // "failing" runs first in the reversed chain; "rescuer" is never asked.
    assert_eq!(log.entries(), vec!["callback"]);
}

#[tokio::test]
async fn test_suspended_input_hook_awaited_before_next() {
    let log = CallLog::new();
    let slow = {
        let log = log.clone();
        ClosureMiddleware::new("slow")
            .on_input(move |_, _| {
                let log = log.clone();
                async move {
                    log.push("slow.start");
                    for _ in 0..3 {
                        tokio::task::yield_now().await;
                    }
                    log.push("slow.end");
                    Ok(HookResult::Continue)
                }
            })
            .into_arc()
    };
    let manager = helpers::manager_with(vec![
        slow,
        Recorder::new("next", &log).input(OnInput::Continue).into_arc(),
    ])
    .await;

    helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["slow.start", "slow.end", "next.input", "callback"]
    );
}

#[tokio::test]
async fn test_input_hook_error_routed_to_exception_chain() {
    let log = CallLog::new();
    let manager = helpers::manager_with(vec![
        Recorder::new("guard", &log)
            .exception(OnException::Recover(vec![item("fallback")]))
            .into_arc(),
        Recorder::new("strict", &log)
            .input(OnInput::Fail("rejected".to_string()))
            .into_arc(),
    ])
    .await;

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["strict.input", "guard.exception(rejected)"]
    );
    assert_eq!(trails(&results), vec!["fallback"]);
}

#[tokio::test]
async fn test_requests_without_callback_dropped_with_warning() {
    let (logs, _guard) = helpers::capture_logs(tracing::Level::WARN);

    let log = CallLog::new();
    let followed = Request::new("https://example.com/followed")
        .with_callback_fn("parse", |_| async { Ok(CallbackOutput::Nothing) });
    let orphan = Request::new("https://example.com/orphan");
    let manager = helpers::manager_with(vec![Recorder::new("A", &log).output().into_arc()]).await;

    let results = helpers::scrape(
        &manager,
        helpers::request_yielding(
            &log,
            vec![orphan.into(), item("x"), followed.into()],
        ),
    )
    .await
    .unwrap();

    let urls: Vec<&str> = results
        .iter()
        .filter_map(ResultItem::as_request)
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(urls, vec!["https://example.com/followed"]);
    assert_eq!(trails(&results), vec!["x>A"]);

    let logs = logs.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("https://example.com/orphan"));
    assert!(logs.contains("https://example.com/start"));
}

#[tokio::test]
async fn test_concurrent_scrapes_share_manager() {
    let log = CallLog::new();
    let manager = Arc::new(
        helpers::manager_with(vec![
            Recorder::new("A", &log).input(OnInput::Continue).output().into_arc(),
        ])
        .await,
    );

    let runs = (0..8).map(|n| {
        let manager = manager.clone();
        let request = helpers::request_yielding(&log, vec![item(&format!("r{n}"))]);
        async move { helpers::scrape(&manager, request).await }
    });
    let outputs = join_all(runs).await;

    for (n, output) in outputs.into_iter().enumerate() {
        assert_eq!(trails(&output.unwrap()), vec![format!("r{n}>A")]);
    }
    assert_eq!(
        log.entries().iter().filter(|e| *e == "callback").count(),
        8
    );
}
