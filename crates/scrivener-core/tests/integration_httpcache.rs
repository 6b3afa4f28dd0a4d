//! HTTP cache proxy invariants against a mock server: request coalescing
//! and robots compliance.

use scrivener_core::{Error, Globals};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn concurrent_retrieves_of_the_same_url_coalesce_to_one_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello").set_delay(std::time::Duration::from_millis(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let globals = Globals::with_builtins().unwrap();
    let url = format!("{}/slow.txt", mock_server.uri());

    let (first, second) = tokio::join!(
        scrivener_core::httpcache::retrieve_text(&globals, &url, "utf-8"),
        scrivener_core::httpcache::retrieve_text(&globals, &url, "utf-8"),
    );

    assert_eq!(first.unwrap(), "hello");
    assert_eq!(second.unwrap(), "hello");
    // `.expect(1)` above is verified when `mock_server` drops at end of scope.
}

#[tokio::test]
async fn robots_disallow_blocks_the_request_before_it_reaches_the_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /api/\n"))
        .mount(&mock_server)
        .await;
    // No mock registered for /api/x: if the engine ever requested it,
    // wiremock would return an unmatched-request 404 rather than panic,
    // so the real assertion is on the returned error variant below.
    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("should never be seen"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let globals = Globals::with_builtins().unwrap();
    let url = format!("{}/api/x", mock_server.uri());

    let result = scrivener_core::httpcache::retrieve_text(&globals, &url, "utf-8").await;
    assert!(matches!(result, Err(Error::RobotsTxtBlockedUrl { .. })));
}

#[tokio::test]
async fn unexpired_probe_cache_entry_avoids_a_second_network_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/exists.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let globals = Globals::with_builtins().unwrap();
    let url = format!("{}/exists.txt", mock_server.uri());

    assert!(scrivener_core::httpcache::probe(&globals, &url).await.unwrap());
    assert!(scrivener_core::httpcache::probe(&globals, &url).await.unwrap());
}
