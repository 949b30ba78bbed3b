mod common;

use common::{CLOSED_PORT_URL, StaticProbe, create_test_resolver, record_line};
use link_resolver::application::services::{RepairOptions, RepairService};
use link_resolver::infrastructure::cache::MemoryCache;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn setup_dirs() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let root = TempDir::new().unwrap();
    let input = root.path().join("extracted");
    let output = root.path().join("fixed");
    std::fs::create_dir_all(&input).unwrap();
    (root, input, output)
}

fn read_records(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_repairs_directory_against_live_redirects() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let short = server
        .mock("HEAD", "/s1")
        .with_status(301)
        .with_header("location", "/article")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("HEAD", "/article")
        .with_status(200)
        .create_async()
        .await;

    let (_root, input, output) = setup_dirs();
    let raw = format!("{}/s1", base);
    std::fs::write(
        input.join("day1.json"),
        [
            record_line("1", &[raw.as_str()]),
            r#"["2", [{"words": ["quiet"]}, {}]]"#.to_string(),
            record_line("3", &[raw.as_str()]),
        ]
        .join("\n"),
    )
    .unwrap();

    let resolver = create_test_resolver(Arc::new(MemoryCache::new()), Arc::new(StaticProbe::up()));
    let service = RepairService::new(Arc::new(resolver), RepairOptions::default());

    let summary = service.process(&input, &output).await.unwrap();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.records_fixed, 2);
    assert_eq!(summary.records_passed_through, 1);
    // The shared RawUrl was requested once; the second record hit the cache.
    short.assert_async().await;

    let records = read_records(&output.join("day1.json"));
    assert_eq!(records.len(), 3);
    assert_eq!(records[0][1][0]["urls"], json!([format!("{}/article", base)]));
    // IP hosts carry no domain.
    assert_eq!(records[0][1][0]["domains"], json!([null]));
    assert_eq!(records[1], json!(["2", [{"words": ["quiet"]}, {}]]));
}

#[tokio::test]
async fn test_rerun_skips_finished_files_and_redoes_partial_ones() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/ok")
        .with_status(200)
        .create_async()
        .await;

    let (_root, input, output) = setup_dirs();
    let raw = format!("{}/ok", server.url());
    std::fs::write(input.join("a.json"), record_line("1", &[raw.as_str()])).unwrap();
    std::fs::write(input.join("b.json"), record_line("2", &[raw.as_str()])).unwrap();

    // a.json finished in an earlier run, b.json was interrupted half way.
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("a.json"), "kept as-is\n").unwrap();
    std::fs::write(output.join(".b.json.partial"), "stale half-written line").unwrap();

    let resolver = create_test_resolver(Arc::new(MemoryCache::new()), Arc::new(StaticProbe::up()));
    let service = RepairService::new(Arc::new(resolver), RepairOptions::default());

    let summary = service.process(&input, &output).await.unwrap();

    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.files_processed, 1);
    assert_eq!(
        std::fs::read_to_string(output.join("a.json")).unwrap(),
        "kept as-is\n"
    );
    assert!(!output.join(".b.json.partial").exists());
    let records = read_records(&output.join("b.json"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0][1][0]["urls"], json!([raw]));

    // Nothing left to do on a third pass.
    let summary = service.process(&input, &output).await.unwrap();
    assert_eq!(summary.files_processed, 0);
    assert_eq!(summary.files_skipped, 2);
}

#[tokio::test]
async fn test_lost_connectivity_leaves_no_finished_marker() {
    let (_root, input, output) = setup_dirs();
    let raw = format!("{}/gone", CLOSED_PORT_URL);
    std::fs::write(input.join("a.json"), record_line("1", &[raw.as_str()])).unwrap();

    let cache = Arc::new(MemoryCache::new());
    let resolver = create_test_resolver(cache.clone(), Arc::new(StaticProbe::down()));
    let service = RepairService::new(Arc::new(resolver), RepairOptions::default());

    let err = service.process(&input, &output).await.unwrap_err();

    assert!(err.is_connectivity_lost());
    assert!(!output.join("a.json").exists());
    assert!(cache.is_empty().await);
}
