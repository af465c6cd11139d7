#![cfg(test)]
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::utils::{settings, AllowListProbe, RecordingPublisher, StaticFetcher, TimeoutProbe};
use proxysift_common::network::candidate::CandidateSet;
use proxysift_core::pipeline::{Pipeline, PipelineSettings};
use proxysift_core::progress::{ProgressCallback, ProgressReport};
use proxysift_core::publish::FileWriter;
use proxysift_core::source::HttpSourceFetcher;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE: &str = "1.1.1.1\n#comment\n2.2.2.2:8080\nnot-an-ip\n";

/// The canonical run: one source, limit 2, only 1.1.1.1 passes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn end_to_end_single_source() {
    let publisher = RecordingPublisher::default();
    let pipeline = Pipeline::new(
        settings(&["list"], 2, Duration::from_secs(1)),
        Box::new(StaticFetcher::new(&[("list", SOURCE)])),
        Arc::new(AllowListProbe::new(&["1.1.1.1"])),
        Box::new(publisher.clone()),
    );

    let (candidates, failed) = pipeline.collect_candidates().await;
    let expected: CandidateSet = ["1.1.1.1", "2.2.2.2:8080"]
        .iter()
        .map(|c| c.parse().unwrap())
        .collect();
    assert_eq!(failed, 0);
    assert_eq!(candidates, expected);

    let summary = pipeline.run(None).await;
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.results, vec!["1.1.1.1".to_string()]);
    assert_eq!(publisher.written(), vec![vec!["1.1.1.1".to_string()]]);
    assert_eq!(publisher.publishes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unresponsive_endpoints_yield_an_empty_list() {
    let publisher = RecordingPublisher::default();
    let body = "10.0.0.1\n10.0.0.2\n10.0.0.3:8080\n10.0.0.4\n10.0.0.5\n";
    let pipeline = Pipeline::new(
        settings(&["list"], 2, Duration::from_millis(50)),
        Box::new(StaticFetcher::new(&[("list", body)])),
        Arc::new(TimeoutProbe),
        Box::new(publisher.clone()),
    );

    let summary = pipeline.run(None).await;
    assert_eq!(summary.candidates, 5);
    assert_eq!(summary.passed, 0);
    assert_eq!(summary.failed + summary.errored, 5);
    assert_eq!(publisher.written(), vec![Vec::<String>::new()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_runs_agree() {
    let body = "1.1.1.1\n2.2.2.2\n3.3.3.3:80\n4.4.4.4\n5.5.5.5\n";
    let mut runs: Vec<HashSet<String>> = Vec::new();

    for _ in 0..2 {
        let pipeline = Pipeline::new(
            settings(&["list"], 3, Duration::from_secs(1)),
            Box::new(StaticFetcher::new(&[("list", body)])),
            Arc::new(AllowListProbe::new(&["1.1.1.1", "3.3.3.3", "5.5.5.5"]).with_delay(Duration::from_millis(5))),
            Box::new(RecordingPublisher::default()),
        );
        runs.push(pipeline.run(None).await.results.into_iter().collect());
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].len(), 3);
}

#[tokio::test]
async fn failing_source_does_not_block_others() {
    let publisher = RecordingPublisher::default();
    let pipeline = Pipeline::new(
        settings(&["down", "up", "also-down"], 4, Duration::from_secs(1)),
        Box::new(StaticFetcher::new(&[("up", "8.8.8.8\n8.8.4.4\n")])),
        Arc::new(AllowListProbe::new(&["8.8.8.8", "8.8.4.4"])),
        Box::new(publisher.clone()),
    );

    let summary = pipeline.run(None).await;
    assert_eq!(summary.sources_attempted, 3);
    assert_eq!(summary.sources_failed, 2);
    let results: HashSet<String> = summary.results.into_iter().collect();
    assert_eq!(results, HashSet::from(["8.8.8.8".to_string(), "8.8.4.4".to_string()]));
}

#[tokio::test]
async fn overlapping_sources_are_probed_once() {
    let probe = Arc::new(AllowListProbe::new(&[]));
    let pipeline = Pipeline::new(
        settings(&["a", "b"], 4, Duration::from_secs(1)),
        Box::new(StaticFetcher::new(&[
            ("a", "1.1.1.1\n2.2.2.2\n"),
            ("b", "2.2.2.2\n1.1.1.1 # again\n3.3.3.3\n"),
        ])),
        probe.clone(),
        Box::new(RecordingPublisher::default()),
    );

    let summary = pipeline.run(None).await;
    assert_eq!(summary.candidates, 3);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrency_limit_and_progress_reports() {
    let body: String = (1..=20).map(|i| format!("10.1.0.{i}\n")).collect();
    let probe = Arc::new(AllowListProbe::new(&["10.1.0.1", "10.1.0.2"]).with_delay(Duration::from_millis(10)));

    let reports: Arc<Mutex<Vec<ProgressReport>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    let on_progress: ProgressCallback = Arc::new(move |report| sink.lock().unwrap().push(report));

    let pipeline = Pipeline::new(
        settings(&["list"], 3, Duration::from_secs(1)),
        Box::new(StaticFetcher::new(&[("list", body.as_str())])),
        probe.clone(),
        Box::new(RecordingPublisher::default()),
    );

    let summary = pipeline.run(Some(on_progress)).await;
    assert_eq!(summary.candidates, 20);
    assert!(probe.peak.load(Ordering::SeqCst) <= 3);

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 20);
    assert!(reports.iter().all(|r| r.total == 20 && r.valid <= r.processed));
    let last = reports.iter().max_by_key(|r| r.processed).unwrap();
    assert_eq!((last.processed, last.percent, last.valid), (20, 100, 2));
}

/// Real fetcher and writer: sources served over HTTP, results land on disk.
#[tokio::test]
async fn http_source_to_output_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SOURCE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pyip.txt");
    let broken = format!("{}/broken.txt", server.uri());
    let proxies = format!("{}/proxies.txt", server.uri());
    let pipeline_settings = PipelineSettings {
        output_path: output.clone(),
        ..settings(&[broken.as_str(), proxies.as_str()], 2, Duration::from_secs(1))
    };

    let pipeline = Pipeline::new(
        pipeline_settings,
        Box::new(HttpSourceFetcher::new(Duration::from_secs(5))),
        Arc::new(AllowListProbe::new(&["1.1.1.1", "2.2.2.2"])),
        Box::new(FileWriter),
    );

    let summary = pipeline.run(None).await;
    assert_eq!(summary.sources_failed, 1);
    assert!(summary.write_error.is_none());

    let written = std::fs::read_to_string(&output).unwrap();
    let hosts: HashSet<&str> = written.split('\n').collect();
    assert_eq!(hosts, HashSet::from(["1.1.1.1", "2.2.2.2"]));
    assert!(!written.ends_with('\n'));
}
