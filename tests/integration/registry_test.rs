//! Integration tests for middleware loading, catalog resolution and reload.

mod helpers;

use std::sync::Arc;

use tokio::sync::Notify;

use spiderline_core::ErrorKind;
use spiderline_core::config::AppConfig;
use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::types::{CallbackOutput, Request};
use spiderline_middleware::{
    BuildError, Hook, MiddlewareCatalog, MiddlewareManager, MiddlewareSpec,
};

use helpers::{CallLog, OnException, OnInput, Recorder, item, trails};

fn declining(name: &str, reason: Option<&'static str>) -> MiddlewareSpec {
    MiddlewareSpec::new(name, move |_| {
        Err(match reason {
            Some(reason) => BuildError::not_configured(reason),
            None => BuildError::disabled(),
        })
    })
}

fn recorder_spec(name: &str, log: &CallLog) -> MiddlewareSpec {
    MiddlewareSpec::from_instance(
        Recorder::new(name, log)
            .input(OnInput::Continue)
            .output()
            .exception(OnException::Continue)
            .into_arc(),
    )
}

#[tokio::test]
async fn test_not_configured_middlewares_never_invoked() {
    let log = CallLog::new();
    let specs = vec![
        recorder_spec("a", &log),
        declining("missing_key", Some("API key not set")),
        declining("off", None),
        recorder_spec("b", &log),
    ];
    let manager = MiddlewareManager::new();
    manager
        .load(&specs, &SpiderMiddlewareConfig::default())
        .await
        .unwrap();

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.enabled_names(), vec!["a", "b"]);
    let disabled: Vec<_> = snapshot
        .disabled()
        .iter()
        .map(|d| (d.name.as_str(), d.reason.as_deref()))
        .collect();
    assert_eq!(
        disabled,
        vec![("missing_key", Some("API key not set")), ("off", None)]
    );
    for hook in [Hook::Input, Hook::Output, Hook::Exception] {
        let names = snapshot.chains().names(hook);
        assert!(!names.contains(&"missing_key".to_string()));
        assert!(!names.contains(&"off".to_string()));
    }

    helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("x")]))
        .await
        .unwrap();
    assert_eq!(
        log.entries(),
        vec!["a.input", "b.input", "callback", "b.output", "a.output"]
    );
}

#[tokio::test]
async fn test_load_logs_disabled_reason_and_enabled_names() {
    let (logs, _guard) = helpers::capture_logs(tracing::Level::DEBUG);
    let log = CallLog::new();
    let specs = vec![
        recorder_spec("alpha", &log),
        declining("beta", Some("why not")),
        declining("delta", None),
        recorder_spec("gamma", &log),
    ];

    MiddlewareManager::new()
        .load(&specs, &SpiderMiddlewareConfig::default())
        .await
        .unwrap();

    let disabled = logs
        .line_with("Spider middleware not configured")
        .expect("missing not-configured log line");
    assert!(disabled.contains("INFO"));
    assert!(disabled.contains("beta"));
    assert!(disabled.contains("why not"));
    // A middleware that gives no reason is disabled silently.
    assert!(!logs.contents().contains("delta"));

    let enabled = logs
        .line_with("Enabled spider middlewares")
        .expect("missing enabled middlewares log line");
    assert!(enabled.contains("DEBUG"));
    assert!(enabled.contains("alpha, gamma"));
}

#[tokio::test]
async fn test_chains_follow_capabilities() {
    let log = CallLog::new();
    let specs = vec![
        MiddlewareSpec::from_instance(Recorder::new("in", &log).input(OnInput::Continue).into_arc()),
        MiddlewareSpec::from_instance(Recorder::new("out", &log).output().into_arc()),
        MiddlewareSpec::from_instance(
            Recorder::new("exc", &log)
                .exception(OnException::Continue)
                .into_arc(),
        ),
        recorder_spec("all", &log),
    ];
    let manager = MiddlewareManager::new();
    manager
        .load(&specs, &SpiderMiddlewareConfig::default())
        .await
        .unwrap();

    let snapshot = manager.snapshot().await;
    let chains = snapshot.chains();
    assert_eq!(chains.names(Hook::Input), vec!["in", "all"]);
    assert_eq!(chains.names(Hook::Output), vec!["all", "out"]);
    assert_eq!(chains.names(Hook::Exception), vec!["all", "exc"]);
}

#[tokio::test]
async fn test_fatal_build_error_aborts_load() {
    let log = CallLog::new();
    let manager = MiddlewareManager::new();
    manager
        .load(&[recorder_spec("a", &log)], &SpiderMiddlewareConfig::default())
        .await
        .unwrap();

    let broken = MiddlewareSpec::new("broken", |_| {
        Err(BuildError::Fatal(spiderline_core::AppError::internal(
            "cannot open database",
        )))
    });
    let err = manager
        .load(
            &[recorder_spec("b", &log), broken],
            &SpiderMiddlewareConfig::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Middleware);
    assert!(err.message.contains("broken"));
    assert_eq!(manager.snapshot().await.enabled_names(), vec!["a"]);
}

#[tokio::test]
async fn test_reload_does_not_disturb_in_flight_scrape() {
    let log = CallLog::new();
    let manager = MiddlewareManager::new();
    let settings = SpiderMiddlewareConfig::default();
    manager
        .load(
            &[MiddlewareSpec::from_instance(Recorder::new("old", &log).output().into_arc())],
            &settings,
        )
        .await
        .unwrap();

    let started = Arc::new(Notify::new());
    let resume = Arc::new(Notify::new());
    let request = {
        let started = started.clone();
        let resume = resume.clone();
        Request::new("https://example.com/slow").with_callback_fn("parse", move |_| {
            let started = started.clone();
            let resume = resume.clone();
            async move {
                started.notify_one();
                resume.notified().await;
                Ok(CallbackOutput::from(item("x")))
            }
        })
    };

    let reload = async {
        started.notified().await;
        manager
            .load(
                &[MiddlewareSpec::from_instance(Recorder::new("new", &log).output().into_arc())],
                &settings,
            )
            .await
            .unwrap();
        resume.notify_one();
    };
    let (results, ()) = tokio::join!(helpers::scrape(&manager, request), reload);

    assert_eq!(trails(&results.unwrap()), vec!["x>old"]);
    assert_eq!(manager.snapshot().await.enabled_names(), vec!["new"]);

    let results = helpers::scrape(&manager, helpers::request_yielding(&log, vec![item("y")]))
        .await
        .unwrap();
    assert_eq!(trails(&results), vec!["y>new"]);
}

#[tokio::test]
async fn test_from_config_resolves_catalog_order() {
    let log = CallLog::new();
    let mut catalog = MiddlewareCatalog::with_builtins();
    {
        let log = log.clone();
        catalog.register("stats", move |_| {
            Ok(Recorder::new("stats", &log).input(OnInput::Continue).into_arc())
        });
    }

    let mut config = AppConfig::default();
    config.spider_middleware.custom.insert("stats".to_string(), 10);
    config.spider_middleware.disabled.push("depth".to_string());
    config.spider_middleware.urllength_limit = 0;

    let manager = MiddlewareManager::from_config(&catalog, &config)
        .await
        .unwrap();
    let snapshot = manager.snapshot().await;

    assert_eq!(
        snapshot.enabled_names(),
        vec!["stats", "http_error", "offsite"]
    );
    assert!(snapshot.is_disabled("url_length"));
    assert!(!snapshot.is_enabled("depth"));
    assert_eq!(
        snapshot.chains().names(Hook::Input),
        vec!["stats", "http_error"]
    );
}

#[tokio::test]
async fn test_from_config_rejects_unknown_middleware() {
    let mut config = AppConfig::default();
    config
        .spider_middleware
        .custom
        .insert("does_not_exist".to_string(), 100);

    let err = MiddlewareManager::from_config(&MiddlewareCatalog::with_builtins(), &config)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.message.contains("does_not_exist"));
}
