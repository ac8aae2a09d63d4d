//! HTTP-backed sources against a local mock server.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use subdomain_finder_sources::{
    AggregatorOptions, DescriptorSource, DnsDumpsterSource, PassiveAggregator, PassiveSource,
    Result, SourceCredentials, SourceDescriptor, SourceStatus, create_default_sources,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn line_parser(body: &str, _domain: &str) -> Result<HashSet<String>> {
    Ok(body.lines().map(str::to_string).collect())
}

fn mock_descriptor(server: &MockServer, name: &'static str, route: &str) -> SourceDescriptor {
    SourceDescriptor {
        name,
        url_template: Cow::Owned(format!("{}{route}", server.uri())),
        parse: line_parser,
    }
}

fn aggregator(sources: Vec<Arc<dyn PassiveSource>>) -> PassiveAggregator {
    PassiveAggregator::new(
        sources,
        AggregatorOptions {
            source_timeout: Duration::from_secs(5),
            ..AggregatorOptions::default()
        },
    )
}

#[tokio::test]
async fn descriptor_source_substitutes_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hosts"))
        .and(query_param("q", "example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a.example.com\nb.example.com"))
        .expect(1)
        .mount(&server)
        .await;

    let source = DescriptorSource::new(mock_descriptor(&server, "mock", "/hosts?q={domain}"), None);
    let result = aggregator(vec![Arc::new(source)])
        .scan("example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.contains("a.example.com"));
}

#[tokio::test]
async fn server_error_marks_source_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200).set_body_string("up.example.com"))
        .mount(&server)
        .await;

    let down = DescriptorSource::new(mock_descriptor(&server, "down", "/down"), None);
    let up = DescriptorSource::new(mock_descriptor(&server, "up", "/up"), None);
    let result = aggregator(vec![Arc::new(down), Arc::new(up)])
        .scan_detailed("example.com")
        .await
        .unwrap();

    assert_eq!(result.reports[0].status, SourceStatus::Failed);
    assert!(result.reports[0].error.as_deref().unwrap().contains("HTTP 503"));
    assert_eq!(result.reports[1].status, SourceStatus::Success);
    assert_eq!(result.hostnames.len(), 1);
}

#[tokio::test]
async fn api_key_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .and(query_param("apikey", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("k.example.com"))
        .expect(1)
        .mount(&server)
        .await;

    let source = DescriptorSource::new(
        mock_descriptor(&server, "keyed", "/report?apikey={api_key}&domain={domain}"),
        Some("secret".to_string()),
    );
    let result = aggregator(vec![Arc::new(source)])
        .scan("example.com")
        .await
        .unwrap();

    assert!(result.contains("k.example.com"));
}

#[tokio::test]
async fn keyed_source_without_key_is_skipped_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = DescriptorSource::new(
        mock_descriptor(&server, "keyed", "/report?apikey={api_key}"),
        None,
    );
    let result = aggregator(vec![Arc::new(source)])
        .scan_detailed("example.com")
        .await
        .unwrap();

    assert_eq!(result.reports[0].status, SourceStatus::Skipped);
}

#[tokio::test]
async fn dnsdumpster_replays_csrf_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form method="post"><input type="hidden" name="csrfmiddlewaretoken" value="tok3n"></form>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("Cookie", "csrftoken=tok3n"))
        .and(body_string_contains("targetip=example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table><tr><td class="col-md-4">ns1.example.com<br></td></tr>
               <tr><td class="col-md-4">ftp.example.com<br></td></tr></table>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let source = DnsDumpsterSource::with_base_url(format!("{}/", server.uri()));
    let result = aggregator(vec![Arc::new(source)])
        .scan("example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.contains("ns1.example.com"));
}

#[tokio::test]
#[ignore = "requires network access"]
async fn default_sources_against_live_services() {
    let sources = create_default_sources(&SourceCredentials::default());
    let result = aggregator(sources).scan_detailed("example.com").await.unwrap();
    assert_eq!(result.reports.len(), 8);
    for report in &result.reports {
        println!("{}: {:?} ({})", report.source, report.status, report.count);
    }
}
