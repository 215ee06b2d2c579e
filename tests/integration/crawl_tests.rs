//! Crawl tests: keyword discovery across real HTTP round trips

use crate::{mount_page, page};
use imprint_scout::config::{HttpConfig, DEFAULT_KEYWORDS};
use imprint_scout::crawler::SiteCrawler;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_crawler() -> SiteCrawler {
    let config = HttpConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        ..HttpConfig::default()
    };
    SiteCrawler::new(&config).expect("Failed to build crawler")
}

fn root_of(server: &MockServer) -> Url {
    Url::parse(&server.uri()).expect("Failed to parse mock server URI")
}

#[tokio::test]
async fn test_impressum_on_root_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(&["/verein", "/impressum.html", "/kontakt"]),
    )
    .await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), DEFAULT_KEYWORDS, 5)
        .await
        .expect("Imprint should be found");

    assert_eq!(found.as_str(), format!("{}/impressum.html", server.uri()));
}

#[tokio::test]
async fn test_external_match_when_no_internal_match() {
    let site = MockServer::start().await;
    let partner = MockServer::start().await;
    let external = format!("{}/kontakt", partner.uri());

    mount_page(&site, "/", page(&["/verein", "/termine", external.as_str()])).await;
    mount_page(&site, "/verein", page(&["/"])).await;
    mount_page(&site, "/termine", page(&["/verein"])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&site), DEFAULT_KEYWORDS, 5)
        .await
        .expect("External contact link should be found");

    assert_eq!(found.as_str(), external);
    // External links are recorded, never fetched
    assert!(partner.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_internal_match_beats_external_for_same_keyword() {
    let site = MockServer::start().await;
    let partner = MockServer::start().await;
    let external = format!("{}/impressum", partner.uri());

    mount_page(&site, "/", page(&[external.as_str(), "/impressum"])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&site), &["impressum"], 1)
        .await
        .unwrap();

    assert_eq!(found.as_str(), format!("{}/impressum", site.uri()));
}

#[tokio::test]
async fn test_keyword_priority_beats_link_scope() {
    let site = MockServer::start().await;
    let partner = MockServer::start().await;
    let external = format!("{}/impressum", partner.uri());

    mount_page(&site, "/", page(&["/kontakt", external.as_str()])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&site), &["impressum", "kontakt"], 1)
        .await
        .unwrap();

    assert_eq!(found.as_str(), external);
}

#[tokio::test]
async fn test_imprint_found_on_second_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/verein"])).await;
    mount_page(&server, "/verein", page(&["/", "/verein/impressum"])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), &["impressum"], 5)
        .await
        .unwrap();

    assert_eq!(found.as_str(), format!("{}/verein/impressum", server.uri()));
}

#[tokio::test]
async fn test_page_budget_caps_requests() {
    let server = MockServer::start().await;

    let mut links: Vec<String> = (1..=10).map(|i| format!("/seite{}", i)).collect();
    links.push("/impressum".to_string());
    let hrefs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", page(&hrefs)).await;
    for i in 1..=10 {
        mount_page(&server, &format!("/seite{}", i), page(&["/"])).await;
    }

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), &["impressum"], 5)
        .await;

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() <= 5,
        "Budget exceeded: {} requests",
        requests.len()
    );
    // Discovered on the root page, so found without being fetched
    assert_eq!(
        found.unwrap().as_str(),
        format!("{}/impressum", server.uri())
    );
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page(&["/a", "/a#top", "/a?ref=nav", "/", "./"]), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page(&["/", "/a"]), "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), DEFAULT_KEYWORDS, 5)
        .await;

    assert!(found.is_none());
    // Expectations are verified when the server drops
}

#[tokio::test]
async fn test_root_fetch_failure_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let crawler = test_crawler();
    let root = root_of(&server);

    let state = crawler.crawl(&root, 5, &CancellationToken::new()).await;
    assert_eq!(state.visited_count(), 1);
    assert!(state.internal().is_empty());
    assert!(crawler
        .find_link_by_keyword(&root, DEFAULT_KEYWORDS, 5)
        .await
        .is_none());
}

#[tokio::test]
async fn test_non_html_root_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"link": "/impressum"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), DEFAULT_KEYWORDS, 5)
        .await;

    assert!(found.is_none());
}

#[tokio::test]
async fn test_relative_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/home/"))
        .mount(&server)
        .await;
    mount_page(&server, "/home/", page(&["impressum"])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), &["impressum"], 5)
        .await
        .unwrap();

    assert_eq!(found.as_str(), format!("{}/home/impressum", server.uri()));
}

#[tokio::test]
async fn test_percent_encoded_umlaut_matches() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/%C3%9Cber-uns"])).await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&server), &["über"], 1)
        .await
        .unwrap();

    assert!(found.as_str().ends_with("/%C3%9Cber-uns"));
}

#[tokio::test]
async fn test_repeated_crawls_agree() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/news", "/ueber-uns", "/contact"])).await;
    mount_page(&server, "/news", page(&["/kontakt"])).await;

    let crawler = test_crawler();
    let root = root_of(&server);

    let first = crawler.find_link_by_keyword(&root, DEFAULT_KEYWORDS, 5).await;
    let second = crawler.find_link_by_keyword(&root, DEFAULT_KEYWORDS, 5).await;

    assert_eq!(first, second);
    assert_eq!(
        first.unwrap().as_str(),
        format!("{}/kontakt", server.uri())
    );
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/impressum"])).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let found = test_crawler()
        .find_link_by_keyword_with_cancel(&root_of(&server), DEFAULT_KEYWORDS, 5, &cancel)
        .await;

    assert!(found.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

async fn mount_trailing_slash_redirect(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/impressum"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/impressum/"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/impressum/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page(&["/"]), "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirect_target_fetched_once() {
    for root_links in [["/impressum", "/impressum/"], ["/impressum/", "/impressum"]] {
        let server = MockServer::start().await;
        mount_page(&server, "/", page(&root_links)).await;
        mount_trailing_slash_redirect(&server).await;

        let state = test_crawler()
            .crawl(&root_of(&server), 5, &CancellationToken::new())
            .await;

        // Root, the redirecting URL and its target
        assert_eq!(state.visited_count(), 3);
        let target_fetches = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/impressum/")
            .count();
        assert_eq!(target_fetches, 1, "order {:?}", root_links);
    }
}

#[tokio::test]
async fn test_redirect_to_other_site_is_recorded_not_fetched() {
    let site = MockServer::start().await;
    let partner = MockServer::start().await;
    let moved = format!("{}/impressum", partner.uri());

    mount_page(&site, "/", page(&["/rechtliches"])).await;
    Mock::given(method("GET"))
        .and(path("/rechtliches"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", moved.as_str()))
        .mount(&site)
        .await;

    let found = test_crawler()
        .find_link_by_keyword(&root_of(&site), &["impressum"], 5)
        .await
        .unwrap();

    assert_eq!(found.as_str(), moved);
    assert!(partner.received_requests().await.unwrap().is_empty());
}
