//! End-to-end page loads that succeed

use page_mirror::config::Config;
use page_mirror::naming::{name_for, NameRole};
use page_mirror::{load_page, PageLoader};
use scraper::{Html, Selector};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>About</title>
    <link rel="stylesheet" media="all" href="/blog/about/assets/styles.css" />
    <link href="https://cdn.example.com/fonts.css" rel="stylesheet">
    <script src='https://cdn.example.com/analytics.js'></script>
  </head>
  <body>
    <!-- hero image -->
    <img src="/photos/me.jpg" alt="me">
    <p>Written  by   hand &amp; kept <em>exactly</em>.</p>
    <img src="/photos/me.jpg" alt="me again">
    <script src="/assets/scripts.js"></script>
  </body>
</html>
"#;

async fn mount(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves PAGE at /blog/about and its three same-host resources
async fn serve_page() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, "/blog/about", PAGE).await;
    mount(&server, "/blog/about/assets/styles.css", "body { color: red; }").await;
    mount(&server, "/assets/scripts.js", "console.log('hi');").await;
    mount(&server, "/photos/me.jpg", "JPEGDATA").await;
    server
}

/// Local name of `route` on the mock server
fn file_name(server: &MockServer, route: &str) -> String {
    name_for(&format!("{}{}", server.uri(), route), NameRole::ResourceFile).unwrap()
}

fn host_slug(server: &MockServer) -> String {
    server
        .uri()
        .trim_start_matches("http://")
        .replace(|c: char| c == '.' || c == ':', "-")
}

#[tokio::test]
async fn test_mirrors_page_and_resources() {
    let server = serve_page().await;
    let output = tempfile::tempdir().unwrap();
    let page_url = format!("{}/blog/about", server.uri());

    let result = load_page(&page_url, output.path()).await.unwrap();

    let slug = host_slug(&server);
    let dir_name = format!("{}-blog-about_files", slug);
    assert_eq!(
        result.filepath,
        output.path().join(format!("{}-blog-about.html", slug))
    );
    assert_eq!(result.resource_dir, output.path().join(&dir_name));
    assert!(result.report.is_complete());
    assert_eq!(result.report.outcomes.len(), 3);

    let mut files: Vec<String> = std::fs::read_dir(&result.resource_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            format!("{}-assets-scripts.js", slug),
            format!("{}-blog-about-assets-styles.css", slug),
            format!("{}-photos-me.jpg", slug),
        ]
    );

    let image = result
        .resource_dir
        .join(file_name(&server, "/photos/me.jpg"));
    assert_eq!(std::fs::read_to_string(image).unwrap(), "JPEGDATA");
}

#[tokio::test]
async fn test_rewritten_html_changes_only_local_references() {
    let server = serve_page().await;
    let output = tempfile::tempdir().unwrap();

    let result = load_page(&format!("{}/blog/about", server.uri()), output.path())
        .await
        .unwrap();
    let html = std::fs::read_to_string(&result.filepath).unwrap();

    let dir_name = name_for(
        &format!("{}/blog/about", server.uri()),
        NameRole::ResourceDirectory,
    )
    .unwrap();
    let expected = PAGE
        .replace(
            "\"/blog/about/assets/styles.css\"",
            &format!(
                "\"{}/{}\"",
                dir_name,
                file_name(&server, "/blog/about/assets/styles.css")
            ),
        )
        .replace(
            "\"/photos/me.jpg\"",
            &format!("\"{}/{}\"", dir_name, file_name(&server, "/photos/me.jpg")),
        )
        .replace(
            "\"/assets/scripts.js\"",
            &format!("\"{}/{}\"", dir_name, file_name(&server, "/assets/scripts.js")),
        );

    assert_eq!(html, expected);
    assert!(html.contains(r#"<link href="https://cdn.example.com/fonts.css" rel="stylesheet">"#));
    assert!(html.contains("<script src='https://cdn.example.com/analytics.js'></script>"));
}

#[tokio::test]
async fn test_every_rewritten_reference_points_at_a_file() {
    let server = serve_page().await;
    let output = tempfile::tempdir().unwrap();

    let result = load_page(&format!("{}/blog/about", server.uri()), output.path())
        .await
        .unwrap();
    let html = std::fs::read_to_string(&result.filepath).unwrap();
    let document = Html::parse_document(&html);
    let html_dir = result.filepath.parent().unwrap();

    let selector = Selector::parse("link[href], script[src], img[src]").unwrap();
    let mut local = 0;
    for element in document.select(&selector) {
        let value = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("src"))
            .unwrap();
        if value.starts_with("https://cdn.example.com/") {
            continue;
        }
        assert!(
            html_dir.join(Path::new(value)).is_file(),
            "{} does not exist",
            value
        );
        local += 1;
    }

    // two of the four local references point at the same image
    assert_eq!(local, 4);
}

#[tokio::test]
async fn test_root_path_page() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        r#"<html><head><link rel="stylesheet" href="/styles/style.css"></head>
<body><img src="images/banner.png"><script src="/scripts/index.js"></script></body></html>"#,
    )
    .await;
    mount(&server, "/styles/style.css", "h1 {}").await;
    mount(&server, "/scripts/index.js", "run();").await;
    mount(&server, "/images/banner.png", "PNG").await;

    let output = tempfile::tempdir().unwrap();
    let result = load_page(&format!("{}/", server.uri()), output.path())
        .await
        .unwrap();

    let slug = host_slug(&server);
    assert_eq!(result.filepath, output.path().join(format!("{}.html", slug)));

    let resource_dir = output.path().join(format!("{}_files", slug));
    assert_eq!(
        std::fs::read_to_string(resource_dir.join(format!("{}-styles-style.css", slug))).unwrap(),
        "h1 {}"
    );
    assert_eq!(
        std::fs::read_to_string(resource_dir.join(format!("{}-scripts-index.js", slug))).unwrap(),
        "run();"
    );
    assert_eq!(
        std::fs::read_to_string(resource_dir.join(format!("{}-images-banner.png", slug))).unwrap(),
        "PNG"
    );
}

#[tokio::test]
async fn test_page_without_resources() {
    let server = MockServer::start().await;
    let body = "<html><body><a href=\"/elsewhere\">plain</a></body></html>";
    mount(&server, "/plain", body).await;

    let output = tempfile::tempdir().unwrap();
    let result = load_page(&format!("{}/plain", server.uri()), output.path())
        .await
        .unwrap();

    assert!(result.report.outcomes.is_empty());
    assert!(result.resource_dir.is_dir());
    assert_eq!(std::fs::read_to_string(&result.filepath).unwrap(), body);
}

#[tokio::test]
async fn test_duplicate_references_are_fetched_once() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/gallery",
        r#"<img src="/a.png"><img src="a.png"><img src="/a.png#again">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("A"))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let result = load_page(&format!("{}/gallery", server.uri()), output.path())
        .await
        .unwrap();

    assert_eq!(result.report.outcomes.len(), 1);
    assert_eq!(std::fs::read_dir(&result.resource_dir).unwrap().count(), 1);

    let html = std::fs::read_to_string(&result.filepath).unwrap();
    let local = format!(
        "{}_files/{}",
        host_slug(&server) + "-gallery",
        file_name(&server, "/a.png")
    );
    assert_eq!(html.matches(&local).count(), 3);
}

#[tokio::test]
async fn test_loader_with_small_worker_pool() {
    let server = MockServer::start().await;
    let images: String = (0..12)
        .map(|i| format!("<img src=\"/img/{}.png\">", i))
        .collect();
    mount(&server, "/many", &images).await;
    for i in 0..12 {
        mount(&server, &format!("/img/{}.png", i), &i.to_string()).await;
    }

    let mut config = Config::default();
    config.loader.max_concurrent_fetches = 2;
    let loader = PageLoader::new(config).unwrap();

    let output = tempfile::tempdir().unwrap();
    let result = loader
        .load(&format!("{}/many", server.uri()), output.path())
        .await
        .unwrap();

    assert!(result.report.is_complete());
    assert_eq!(std::fs::read_dir(&result.resource_dir).unwrap().count(), 12);
}

#[tokio::test]
async fn test_non_utf8_page_is_saved_byte_for_byte() {
    let server = MockServer::start().await;
    let body: &[u8] =
        b"<html><head><meta charset=\"iso-8859-1\"></head><body>caf\xe9 <img src=\"/a.png\"> \xff</body></html>";
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=iso-8859-1")
                .set_body_bytes(body.to_vec()),
        )
        .mount(&server)
        .await;
    mount(&server, "/a.png", "PNG").await;

    let output = tempfile::tempdir().unwrap();
    let page_url = format!("{}/latin", server.uri());
    let result = load_page(&page_url, output.path()).await.unwrap();

    let dir_name = name_for(&page_url, NameRole::ResourceDirectory).unwrap();
    let local = format!("{}/{}", dir_name, file_name(&server, "/a.png"));
    let mut expected = b"<html><head><meta charset=\"iso-8859-1\"></head><body>caf\xe9 <img src=\"".to_vec();
    expected.extend_from_slice(local.as_bytes());
    expected.extend_from_slice(b"\"> \xff</body></html>");

    assert_eq!(std::fs::read(&result.filepath).unwrap(), expected);
    assert_eq!(
        std::fs::read_to_string(result.resource_dir.join(file_name(&server, "/a.png"))).unwrap(),
        "PNG"
    );
}
