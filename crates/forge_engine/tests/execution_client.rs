use forge_core::{OutputFormat, RunRequest, MAX_PAGES};
use forge_engine::{ClientSettings, ExecutionClient, FailureKind, ReqwestExecutionClient, RunOutput};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_request(format: OutputFormat) -> RunRequest {
    RunRequest {
        script: "print('scrape')".into(),
        url: "https://shop.example/list".into(),
        format,
        max_pages: MAX_PAGES,
    }
}

fn client_for(server: &MockServer) -> ReqwestExecutionClient {
    ReqwestExecutionClient::new(ClientSettings::with_base_url(server.uri()))
}

#[tokio::test]
async fn json_run_returns_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-scraper"))
        .and(body_json(json!({
            "script": "print('scrape')",
            "url": "https://shop.example/list",
            "format": "json",
            "max_pages": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scraped_data": [
                {"title": "Shoe", "url": "https://shop.example/shoe", "image_url": null, "price": "$10"},
                {"title": "Hat"}
            ],
            "count": 2,
            "output": "done"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = client_for(&server)
        .run(&run_request(OutputFormat::Json))
        .await
        .expect("run ok");

    let RunOutput::Records(records) = output else {
        panic!("expected records");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Shoe"));
    assert_eq!(records[0].image_url, None);
    assert_eq!(records[1].price, None);
}

#[tokio::test]
async fn csv_run_returns_raw_bytes() {
    let server = MockServer::start().await;
    let csv = "title,url,image_url,price\r\nShoe,https://shop.example/shoe,,$10\r\n";
    Mock::given(method("POST"))
        .and(path("/run-scraper"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(csv, "text/csv"))
        .mount(&server)
        .await;

    let output = client_for(&server)
        .run(&run_request(OutputFormat::Csv))
        .await
        .expect("run ok");

    assert_eq!(output, RunOutput::Csv(csv.as_bytes().to_vec()));
}

#[tokio::test]
async fn failed_run_keeps_traceback_and_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-scraper"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Error executing script: NameError",
            "traceback": "Traceback (most recent call last): ...",
            "errors": "NameError: name 'soup' is not defined",
            "output": ""
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .run(&run_request(OutputFormat::Json))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    let failure = err.into_failure();
    assert_eq!(failure.message_or("Error running scraper"), "Error executing script: NameError");
    assert_eq!(failure.detail(), "Traceback (most recent call last): ...");
}

#[tokio::test]
async fn failed_run_with_only_errors_uses_them_as_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-scraper"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "No data was scraped",
            "errors": "container matched nothing",
            "output": ""
        })))
        .mount(&server)
        .await;

    let failure = client_for(&server)
        .run(&run_request(OutputFormat::Csv))
        .await
        .unwrap_err()
        .into_failure();

    assert_eq!(failure.detail(), "container matched nothing");
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-scraper"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .run(&run_request(OutputFormat::Json))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}
