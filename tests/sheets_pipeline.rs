//! End-to-end facade behaviour: config lookup, cache, fetch, normalization, hooks.
use mockito::{Matcher, Server};
use sheetfeed::cache::{cache_key, CsvCache, FileStorage, MemoryStorage, DEFAULT_TTL_MS};
use sheetfeed::fetch::CsvFetcher;
use sheetfeed::{NoopPresenter, NormalizedRecord, Presenter, SheetConfig, SheetError, Sheets};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const BODY: &str = "ID,전공,계열, ,과목1\n10,법학,사회,ignored,헌법\n,물리학,자연,x,역학\n";

fn config_for(server: &Server) -> SheetConfig {
    SheetConfig::new([(
        "inmun",
        format!("{}/sheet/pub?gid=1&single=true&output=csv", server.url()),
    )])
}

#[derive(Default)]
struct Collect {
    records: Mutex<Vec<NormalizedRecord>>,
    alerts: Mutex<Vec<String>>,
    ended: Mutex<usize>,
}

impl Presenter for Collect {
    fn loading_end(&self) {
        *self.ended.lock().unwrap() += 1;
    }
    fn start_category(&self, records: &[NormalizedRecord], _sheet_key: &str) {
        self.records.lock().unwrap().extend_from_slice(records);
    }
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn fetches_normalizes_and_caches() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("GET", Matcher::Regex("^/sheet/pub".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(BODY)
        .expect(1)
        .create_async()
        .await;

    let sheets = Sheets::new(
        config_for(&server),
        CsvCache::in_memory(),
        CsvFetcher::new().unwrap(),
        Arc::new(NoopPresenter),
    );

    let first = sheets.fetch_and_normalize("inmun").await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, Some(10));
    assert_eq!(first[0].major, "법학");
    assert_eq!(first[0].major_type, "사회");
    assert_eq!(first[0].sub1, "헌법");
    // empty ID cell falls back to position
    assert_eq!(first[1].id, Some(2));

    let raw = sheets.fetch_rows("inmun").await.unwrap();
    assert!(raw.iter().all(|r| !r.contains_key("")));

    // second call is served from cache
    let second = sheets.fetch_and_normalize("inmun").await.unwrap();
    assert_eq!(first, second);
    primary.assert_async().await;
}

#[tokio::test]
async fn expired_cache_refetches() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("GET", Matcher::Regex("^/sheet/pub".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("major\nfresh\n")
        .expect(1)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let stale = CsvCache::new(Box::new(storage.clone()), DEFAULT_TTL_MS);
    let mut row = sheetfeed::RawRow::new();
    row.insert("major".into(), "stale".into());
    let long_ago = chrono::Utc::now().timestamp_millis() - DEFAULT_TTL_MS - 1;
    stale.set_at(&cache_key("inmun"), &[row], long_ago);

    let sheets = Sheets::new(
        config_for(&server),
        CsvCache::new(Box::new(storage), DEFAULT_TTL_MS),
        CsvFetcher::new().unwrap(),
        Arc::new(NoopPresenter),
    );
    let records = sheets.fetch_and_normalize("inmun").await.unwrap();
    assert_eq!(records[0].major, "fresh");
    primary.assert_async().await;
}

#[tokio::test]
async fn unknown_sheet_makes_no_requests() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let collect = Arc::new(Collect::default());
    let sheets = Sheets::new(
        config_for(&server),
        CsvCache::in_memory(),
        CsvFetcher::new().unwrap(),
        collect.clone(),
    );

    assert!(!sheets.start_category("jayeon").await);
    assert_eq!(
        *collect.alerts.lock().unwrap(),
        vec!["Failed to load: no CSV URL configured for sheet `jayeon`".to_string()]
    );
    assert_eq!(*collect.ended.lock().unwrap(), 1);
    assert!(matches!(
        sheets.fetch_rows("jayeon").await,
        Err(SheetError::Config { .. })
    ));
    any.assert_async().await;
}

#[tokio::test]
async fn fetch_failure_surfaces_single_alert() {
    let mut server = Server::new_async().await;
    let _all = server
        .mock("GET", Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let collect = Arc::new(Collect::default());
    let sheets = Sheets::new(
        config_for(&server),
        CsvCache::in_memory(),
        CsvFetcher::new().unwrap(),
        collect.clone(),
    );

    assert!(!sheets.start_category("inmun").await);
    let alerts = collect.alerts.lock().unwrap().clone();
    assert_eq!(alerts, vec!["Failed to load: CSV request failed: HTTP 503".to_string()]);
    assert!(collect.records.lock().unwrap().is_empty());
    assert_eq!(*collect.ended.lock().unwrap(), 1);
}

#[tokio::test]
async fn file_cache_persists_between_instances() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("GET", Matcher::Regex("^/sheet/pub".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("id,major\n1,Law\n")
        .expect(1)
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let config = config_for(&server).with_cache_dir(tmp.path());

    let collect = Arc::new(Collect::default());
    let first = Sheets::from_config(config.clone())
        .unwrap()
        .with_presenter(collect.clone());
    assert!(first.start_category("inmun").await);
    assert_eq!(collect.records.lock().unwrap().len(), 1);

    let json = std::fs::read_to_string(tmp.path().join("csv%3Ainmun.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(v["ts"].as_i64().unwrap() > 0);
    assert_eq!(v["data"][0]["major"], "Law");

    // a fresh instance over the same directory reads the file, not the network
    let second = Sheets::new(
        config,
        CsvCache::new(Box::new(FileStorage::new(tmp.path())), DEFAULT_TTL_MS),
        CsvFetcher::new().unwrap(),
        Arc::new(NoopPresenter),
    );
    let records = second.fetch_and_normalize("inmun").await.unwrap();
    assert_eq!(records[0].major, "Law");
    primary.assert_async().await;
}
