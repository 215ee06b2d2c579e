//! Batch job tests: resolve homepages, then crawl them for imprints

use crate::{mount_page, page};
use imprint_scout::config::{load_config, CrawlerConfig, HttpConfig};
use imprint_scout::crawler::SiteCrawler;
use imprint_scout::jobs::{refresh_imprint, refresh_imprints, update_homepages, Paging};
use imprint_scout::problems::ProblemKind;
use imprint_scout::resolver::{ResolvedUrl, Resolver, Scheme};
use imprint_scout::storage::{SqliteStorage, Storage};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

fn http_config() -> HttpConfig {
    HttpConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        ..HttpConfig::default()
    }
}

#[tokio::test]
async fn test_homepage_then_imprint() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/verein", "/impressum.html"])).await;

    let mut store = SqliteStorage::new_in_memory().unwrap();
    let address = server.address().to_string();
    store
        .upsert_association("11152A001", "Musikverein Beispiel", Some(&address))
        .unwrap();

    let resolver = Resolver::new(&http_config()).unwrap();
    let cancel = CancellationToken::new();
    let summary = update_homepages(&mut store, &resolver, &cancel).await.unwrap();
    assert_eq!(summary.updated, 1);

    let record = store.get_association("11152A001").unwrap();
    assert_eq!(record.homepage, Some(format!("http://{}", address)));
    assert_eq!(record.homepage_scheme, Some(Scheme::Http));
    // The mock server speaks plain HTTP only
    assert_eq!(summary.problems, 1);
    let problems = store.list_problems(Some("11152A001")).unwrap();
    assert_eq!(problems[0].kind, ProblemKind::HomepageInsecure);

    let crawler = SiteCrawler::new(&http_config()).unwrap();
    let summary = refresh_imprints(
        &mut store,
        &crawler,
        &CrawlerConfig::default(),
        Paging::default(),
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.problems, 0);

    let record = store.get_association("11152A001").unwrap();
    assert_eq!(
        record.imprint,
        Some(format!("{}/impressum.html", server.uri()))
    );
    assert_eq!(store.count_problems().unwrap(), 1);
}

#[tokio::test]
async fn test_problems_are_recorded_per_association() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/termine"])).await;
    let address = server.address().to_string();

    let mut store = SqliteStorage::new_in_memory().unwrap();
    store
        .upsert_association("11152A001", "MV Ohne Impressum", Some(&address))
        .unwrap();
    store
        .upsert_association("11152A002", "MV Mail", Some("vorstand@mv-mail.de"))
        .unwrap();
    let unreachable = format!("localhost:{}", server.address().port());
    store
        .upsert_association("11152A003", "MV Lokal", Some(&unreachable))
        .unwrap();

    let cancel = CancellationToken::new();
    let resolver = Resolver::new(&http_config()).unwrap();
    let summary = update_homepages(&mut store, &resolver, &cancel).await.unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.problems, 3);

    let crawler = SiteCrawler::new(&http_config()).unwrap();
    let summary = refresh_imprints(
        &mut store,
        &crawler,
        &CrawlerConfig::default(),
        Paging::default(),
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.problems, 1);

    let kinds = |number: &str| -> Vec<ProblemKind> {
        store
            .list_problems(Some(number))
            .unwrap()
            .into_iter()
            .map(|p| p.kind)
            .collect()
    };
    assert_eq!(
        kinds("11152A001"),
        vec![ProblemKind::HomepageInsecure, ProblemKind::ImprintNotFound]
    );
    assert_eq!(kinds("11152A002"), vec![ProblemKind::HomepageInvalid]);
    assert_eq!(kinds("11152A003"), vec![ProblemKind::HomepageUnreachable]);
}

#[tokio::test]
async fn test_paging_limits_imprint_refresh() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", page(&["/impressum"])).await;
    mount_page(&second, "/", page(&["/impressum"])).await;

    let mut store = SqliteStorage::new_in_memory().unwrap();
    let cancel = CancellationToken::new();
    let resolver = Resolver::new(&http_config()).unwrap();
    for (number, server) in [("11152A001", &first), ("11152A002", &second)] {
        store
            .upsert_association(number, "MV", Some(&server.address().to_string()))
            .unwrap();
    }
    update_homepages(&mut store, &resolver, &cancel).await.unwrap();

    let crawler = SiteCrawler::new(&http_config()).unwrap();
    let paging = Paging {
        skip: 1,
        limit: Some(1),
    };
    let summary = refresh_imprints(
        &mut store,
        &crawler,
        &CrawlerConfig::default(),
        paging,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(summary.processed, 1);
    assert!(store.get_association("11152A001").unwrap().imprint.is_none());
    assert!(store.get_association("11152A002").unwrap().imprint.is_some());
}

#[tokio::test]
async fn test_configured_keywords_drive_single_refresh() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/impressum", "/rechtliches"])).await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max-pages = 1
keywords = ["rechtliches"]
"#
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.crawler.max_pages, 1);

    let mut store = SqliteStorage::new_in_memory().unwrap();
    let address = server.address().to_string();
    store
        .upsert_association("11152A001", "MV", Some(&address))
        .unwrap();
    let cancel = CancellationToken::new();
    let resolver = Resolver::new(&http_config()).unwrap();
    update_homepages(&mut store, &resolver, &cancel).await.unwrap();

    let crawler = SiteCrawler::new(&http_config()).unwrap();
    let summary = refresh_imprint(&mut store, &crawler, &config.crawler, "11152A001", &cancel)
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(
        store.get_association("11152A001").unwrap().imprint,
        Some(format!("{}/rechtliches", server.uri()))
    );
}

#[tokio::test]
async fn test_invalid_imprint_link_keeps_stored_imprint() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["http://intranet/impressum"])).await;

    let mut store = SqliteStorage::new_in_memory().unwrap();
    store
        .upsert_association("11152A001", "MV Intranet", Some("mv-intranet.de"))
        .unwrap();
    store
        .set_homepage("11152A001", &ResolvedUrl::Http(server.uri()))
        .unwrap();
    store
        .set_imprint("11152A001", "https://mv-intranet.de/impressum")
        .unwrap();

    let crawler = SiteCrawler::new(&http_config()).unwrap();
    let summary = refresh_imprint(
        &mut store,
        &crawler,
        &CrawlerConfig::default(),
        "11152A001",
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.problems, 1);

    let problems = store.list_problems(Some("11152A001")).unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].kind, ProblemKind::ImprintInvalidUrl);
    assert_eq!(problems[0].data["imprint"], "http://intranet/impressum");
    assert_eq!(
        store.get_association("11152A001").unwrap().imprint.as_deref(),
        Some("https://mv-intranet.de/impressum")
    );
}
