// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Enumeration Agent Tests
 * Source selection, stream merging, statistics, skipping and cancellation
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use futures::StreamExt;
use lonkero_recon::discovery::{
    Agent, EventKind, EventPayload, ResultCollector, ScrapeScope, SessionConfig, Source,
    SourceEvent, SourceSelection, SourceState,
};
use lonkero_recon::errors::ReconError;
use lonkero_recon::registry::SourceRegistry;
use lonkero_recon::sources::{Crtsh, Hunter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

/// Emits a fixed host list, optionally after a delay
struct FakeSource {
    name: &'static str,
    default: bool,
    recursive: bool,
    hosts: Vec<&'static str>,
    delay: Duration,
    finished: Arc<AtomicBool>,
    state: SourceState,
}

impl FakeSource {
    fn new(name: &'static str, default: bool, recursive: bool) -> Self {
        Self {
            name,
            default,
            recursive,
            hosts: Vec::new(),
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
            state: SourceState::new(),
        }
    }

    fn with_hosts(mut self, hosts: Vec<&'static str>) -> Self {
        self.hosts = hosts;
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Source for FakeSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_default(&self) -> bool {
        self.default
    }

    fn has_recursive_support(&self) -> bool {
        self.recursive
    }

    fn needs_key(&self) -> bool {
        false
    }

    fn state(&self) -> &SourceState {
        &self.state
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        if scope.pause(self.delay).await {
            for host in &self.hosts {
                if !scope.subdomain(*host).await {
                    break;
                }
            }
        }
        self.finished.store(true, Ordering::SeqCst);
    }
}

fn fake_registry() -> SourceRegistry {
    SourceRegistry::new(vec![
        Arc::new(FakeSource::new("alpha", true, false)),
        Arc::new(FakeSource::new("bravo", true, true)),
        Arc::new(FakeSource::new("charlie", false, true)),
    ])
    .unwrap()
}

fn select(include: &[&str], exclude: &[&str], use_all: bool, recursive_only: bool) -> SourceSelection {
    SourceSelection {
        sources: include.iter().map(|s| s.to_string()).collect(),
        exclude: exclude.iter().map(|s| s.to_string()).collect(),
        use_all,
        recursive_only,
    }
}

async fn drain(agent: &Agent, config: &SessionConfig) -> Vec<SourceEvent> {
    agent
        .enumerate("example.com", config, CancellationToken::new())
        .unwrap()
        .collect()
        .await
}

#[test]
fn test_default_selection_skips_non_default_sources() {
    let agent = Agent::new(&fake_registry(), &SourceSelection::default()).unwrap();
    assert_eq!(agent.source_names(), vec!["alpha", "bravo"]);
}

#[test]
fn test_use_all_selects_everything() {
    let agent = Agent::new(&fake_registry(), &select(&["alpha"], &[], true, false)).unwrap();
    assert_eq!(agent.source_names(), vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn test_include_is_case_insensitive_and_skips_unknown() {
    let agent = Agent::new(&fake_registry(), &select(&["CHARLIE", "zulu"], &[], false, false)).unwrap();
    assert_eq!(agent.source_names(), vec!["charlie"]);
}

#[test]
fn test_unknown_include_only_is_refused() {
    let result = Agent::new(&fake_registry(), &select(&["zulu"], &[], false, false));
    assert!(matches!(result, Err(ReconError::NoSourcesSelected)));
}

#[test]
fn test_exclude_dominates_include() {
    let agent = Agent::new(
        &fake_registry(),
        &select(&["alpha", "bravo"], &["Bravo", "not-registered"], false, false),
    )
    .unwrap();
    assert_eq!(agent.source_names(), vec!["alpha"]);

    let result = Agent::new(&fake_registry(), &select(&[], &["alpha", "bravo"], false, false));
    assert!(matches!(result, Err(ReconError::NoSourcesSelected)));
}

#[test]
fn test_recursive_only_narrows_after_name_selection() {
    let agent = Agent::new(&fake_registry(), &select(&[], &[], true, true)).unwrap();
    assert_eq!(agent.source_names(), vec!["bravo", "charlie"]);

    let result = Agent::new(&fake_registry(), &select(&["alpha"], &[], false, true));
    assert!(matches!(result, Err(ReconError::NoSourcesSelected)));
}

#[tokio::test]
async fn test_empty_domain_is_rejected() {
    let agent = Agent::new(&fake_registry(), &SourceSelection::default()).unwrap();
    let result = agent.enumerate("  ", &SessionConfig::default(), CancellationToken::new());
    assert!(matches!(result, Err(ReconError::Configuration(_))));
}

#[tokio::test]
async fn test_partial_failure_keeps_other_sources() {
    let registry = SourceRegistry::new(vec![
        Arc::new(FakeSource::new("alpha", true, false).with_hosts(vec!["a.example.com", "b.example.com"])),
        Arc::new(Crtsh::new().with_base_url("http://127.0.0.1:1")),
    ])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let config = SessionConfig {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let events = drain(&agent, &config).await;

    let alpha_hosts: Vec<&str> = events
        .iter()
        .filter(|e| e.source == "alpha")
        .filter_map(|e| e.subdomain())
        .collect();
    assert_eq!(alpha_hosts, vec!["a.example.com", "b.example.com"]);

    let crtsh_errors = events
        .iter()
        .filter(|e| e.source == "crtsh" && e.kind() == EventKind::Error)
        .count();
    assert_eq!(crtsh_errors, 1);

    let stats = agent.statistics();
    assert_eq!(stats["alpha"].results, 2);
    assert_eq!(stats["alpha"].errors, 0);
    assert_eq!(stats["crtsh"].errors, 1);
    assert_eq!(stats["crtsh"].results, 0);
    assert!(!stats["crtsh"].skipped);
}

#[tokio::test]
async fn test_statistics_reset_at_start_of_run() {
    let registry = SourceRegistry::new(vec![Arc::new(
        FakeSource::new("alpha", true, false).with_hosts(vec!["a.example.com"]),
    )])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();
    let config = SessionConfig::default();

    drain(&agent, &config).await;
    assert_eq!(agent.statistics()["alpha"].results, 1);

    let enumeration = agent
        .enumerate("example.com", &config, CancellationToken::new())
        .unwrap();
    let stats = agent.statistics();
    assert_eq!(stats["alpha"].results, 0);
    assert_eq!(stats["alpha"].errors, 0);

    let events: Vec<SourceEvent> = enumeration.collect().await;
    assert_eq!(events.len(), 1);
    assert_eq!(agent.statistics()["alpha"].results, 1);
}

#[tokio::test]
async fn test_merged_stream_waits_for_slowest_source() {
    let registry = SourceRegistry::new(vec![
        Arc::new(FakeSource::new("fast", true, false).with_hosts(vec!["fast.example.com"])),
        Arc::new(
            FakeSource::new("slow", true, false)
                .with_hosts(vec!["slow.example.com"])
                .with_delay(Duration::from_millis(300)),
        ),
    ])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let events = drain(&agent, &SessionConfig::default()).await;
    let hosts: Vec<&str> = events.iter().filter_map(|e| e.subdomain()).collect();
    assert_eq!(hosts, vec!["fast.example.com", "slow.example.com"]);
}

#[tokio::test]
async fn test_keyless_source_is_skipped_without_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let registry = SourceRegistry::new(vec![Arc::new(
        Hunter::new().with_base_url(mock_server.uri()),
    )])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let events = drain(&agent, &SessionConfig::default()).await;
    assert!(events.iter().all(|e| e.subdomain().is_none()));
    assert!(events
        .iter()
        .any(|e| matches!(&e.payload, EventPayload::Info(msg) if msg.contains("hunter"))));

    let stats = agent.statistics()["hunter"];
    assert!(stats.skipped);
    assert_eq!(stats.results, 0);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_cancellation_closes_streams_promptly() {
    let registry = SourceRegistry::new(vec![Arc::new(
        FakeSource::new("slow", true, false)
            .with_hosts(vec!["late.example.com"])
            .with_delay(Duration::from_secs(60)),
    )])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let cancel = CancellationToken::new();
    let enumeration = agent
        .enumerate("example.com", &SessionConfig::default(), cancel.clone())
        .unwrap();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let events: Vec<SourceEvent> = enumeration.collect().await;
    assert!(events.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_run_deadline_cancels_sources() {
    let registry = SourceRegistry::new(vec![
        Arc::new(FakeSource::new("fast", true, false).with_hosts(vec!["fast.example.com"])),
        Arc::new(
            FakeSource::new("slow", true, false)
                .with_hosts(vec!["late.example.com"])
                .with_delay(Duration::from_secs(60)),
        ),
    ])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let config = SessionConfig {
        max_enumeration_time: Duration::from_millis(300),
        ..Default::default()
    };
    let started = Instant::now();
    let events = drain(&agent, &config).await;

    let hosts: Vec<&str> = events.iter().filter_map(|e| e.subdomain()).collect();
    assert_eq!(hosts, vec!["fast.example.com"]);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_dropping_enumeration_stops_sources() {
    let slow = FakeSource::new("slow", true, false)
        .with_hosts(vec!["late.example.com"])
        .with_delay(Duration::from_secs(60));
    let finished = Arc::clone(&slow.finished);

    let registry = SourceRegistry::new(vec![Arc::new(slow)]).unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let enumeration = agent
        .enumerate("example.com", &SessionConfig::default(), CancellationToken::new())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(enumeration);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !finished.load(Ordering::SeqCst) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_responses_are_archived_per_source() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"name_value":"www.example.com\nmail.example.com"},{"name_value":"*.example.com"}]"#,
        ))
        .mount(&mock_server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let registry = SourceRegistry::new(vec![Arc::new(
        Crtsh::new().with_base_url(mock_server.uri()),
    )])
    .unwrap();
    let agent = Agent::new(&registry, &SourceSelection::default()).unwrap();

    let config = SessionConfig {
        response_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let enumeration = agent
        .enumerate("example.com", &config, CancellationToken::new())
        .unwrap();
    let results = ResultCollector::new("example.com").collect(enumeration).await;

    assert_eq!(results.len(), 3);
    assert!(results.hosts.contains_key("example.com"));

    let archived = std::fs::read_to_string(tmp.path().join("crtsh.json")).unwrap();
    assert_eq!(archived.lines().count(), 1);
    assert_eq!(agent.statistics()["crtsh"].results, 3);
}
