//! Page loads that fail, and what they leave behind

use page_mirror::config::{Config, FailurePolicy};
use page_mirror::{load_page, ErrorKind, FetchError, LoadError, PageLoader};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// A page with four same-host resources, one of which is missing
async fn serve_page_with_missing_resource() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/post",
        200,
        r#"<html><head>
<link rel="stylesheet" href="/one.css">
<script src="/two.js"></script>
</head><body><img src="/three.png"><img src="/four.png"></body></html>"#,
    )
    .await;
    mount(&server, "/one.css", 200, "1").await;
    mount(&server, "/two.js", 404, "").await;
    mount(&server, "/three.png", 200, "3").await;
    mount(&server, "/four.png", 200, "4").await;
    server
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_root_error_status_is_fetch_error() {
    for status in [404u16, 500, 503] {
        let server = MockServer::start().await;
        mount(&server, "/page", status, "nope").await;
        let output = tempfile::tempdir().unwrap();

        let err = load_page(&format!("{}/page", server.uri()), output.path())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch, "status {}", status);
        assert!(matches!(
            err,
            LoadError::Fetch(FetchError::Status { status: s, .. }) if s == status
        ));
        assert_eq!(entries(output.path()), 0, "status {}", status);
    }
}

#[tokio::test]
async fn test_unreachable_root_is_fetch_error() {
    let output = tempfile::tempdir().unwrap();

    // Nothing listens on port 9 of localhost
    let err = load_page("http://127.0.0.1:9/page", output.path())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(entries(output.path()), 0);
}

#[tokio::test]
async fn test_missing_output_directory_is_filesystem_error() {
    let server = MockServer::start().await;
    mount(&server, "/page", 200, r#"<img src="/a.png">"#).await;
    mount(&server, "/a.png", 200, "A").await;

    let parent = tempfile::tempdir().unwrap();
    let output = parent.path().join("does").join("not").join("exist");

    let err = load_page(&format!("{}/page", server.uri()), &output)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Filesystem);
    assert!(matches!(err, LoadError::Filesystem { .. }));
    assert_eq!(entries(parent.path()), 0);
}

#[tokio::test]
async fn test_existing_resource_directory_is_filesystem_error() {
    let server = MockServer::start().await;
    mount(&server, "/page", 200, "<p>hi</p>").await;

    let output = tempfile::tempdir().unwrap();
    let url = format!("{}/page", server.uri());
    let dir_name =
        page_mirror::name_for(&url, page_mirror::NameRole::ResourceDirectory).unwrap();
    std::fs::create_dir(output.path().join(&dir_name)).unwrap();

    let err = load_page(&url, output.path()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Filesystem);
    assert_eq!(entries(output.path()), 1);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    for input in ["", "not a url", "/relative/page", "ftp://example.com/file"] {
        let err = load_page(input, output.path()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl, "input {:?}", input);
    }
    assert_eq!(entries(output.path()), 0);
}

#[tokio::test]
async fn test_fail_fast_resource_failure_fails_the_load() {
    let server = serve_page_with_missing_resource().await;
    let output = tempfile::tempdir().unwrap();

    let err = load_page(&format!("{}/post", server.uri()), output.path())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(err.to_string().contains("/two.js"));

    // The resource directory exists, the HTML file was never written
    let names: Vec<String> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("_files"));
}

#[tokio::test]
async fn test_best_effort_resource_failure_is_reported() {
    let server = serve_page_with_missing_resource().await;
    let output = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.loader.failure_policy = FailurePolicy::BestEffort;
    let loader = PageLoader::new(config).unwrap();

    let result = loader
        .load(&format!("{}/post", server.uri()), output.path())
        .await
        .unwrap();

    assert!(result.filepath.is_file());
    assert!(!result.report.is_complete());
    assert_eq!(result.report.succeeded().count(), 3);

    let failed: Vec<String> = result
        .report
        .failed()
        .map(|o| o.resource.url.path().to_string())
        .collect();
    assert_eq!(failed, vec!["/two.js".to_string()]);
    assert_eq!(entries(&result.resource_dir), 3);

    // The reference still points into the resource directory
    let html = std::fs::read_to_string(&result.filepath).unwrap();
    assert!(!html.contains(r#"src="/two.js""#));
}
