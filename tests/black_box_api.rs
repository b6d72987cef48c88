use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use invoice_generator::{router, AppConfig, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const TOKEN: &str = "test-token";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    /// Fake workflow endpoint answering every run with `status` and `body`.
    async fn upstream(status: StatusCode, body: Value) -> Self {
        let app = Router::new().route(
            "/workflows/run",
            post(move |headers: HeaderMap, Json(req): Json<Value>| {
                let body = body.clone();
                async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer test-token");
                    if !authorized || req["mode"] != "blocking" {
                        return (StatusCode::UNAUTHORIZED, Json(json!({})));
                    }
                    (status, Json(body))
                }
            }),
        );
        Self::spawn(app).await
    }

    async fn app(upstream_url: Option<&str>) -> Self {
        let mut config = AppConfig::default();
        config.upstream.url = upstream_url.map(str::to_string);
        config.upstream.key = Some(TOKEN.to_string());
        config.upstream.timeout_secs = 5;
        let state = AppState::from_config(&config).expect("failed to build state");
        Self::spawn(router(state)).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn fenced_payload() -> Value {
    json!({
        "data": {
            "outputs": {
                "결과": "```json\n{\"outputs\":{\"결과\":[{\"회사명\":\"A\",\"최종금액\":None}]}}\n```"
            }
        }
    })
}

fn two_records() -> Value {
    json!([
        {"id": "1", "company": "가나상사", "amount": 40000, "contactName": "김철수",
         "contactEmail": "kim@example.com", "issueDate": "2025.03.31", "description": ""},
        {"id": "2", "company": "다라전자", "amount": 1200000, "contactName": "",
         "contactEmail": "", "issueDate": "", "description": "연간 구독"}
    ])
}

#[tokio::test]
async fn records_endpoint_normalizes_fenced_payload() {
    let upstream = TestServer::upstream(StatusCode::OK, fenced_payload()).await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let res = reqwest::get(format!("{}/api/records", app.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!([{
            "id": "1",
            "company": "A",
            "amount": 0,
            "contactName": "",
            "contactEmail": "",
            "issueDate": "",
            "description": ""
        }])
    );
}

#[tokio::test]
async fn unrecognized_payload_yields_empty_list() {
    let upstream = TestServer::upstream(StatusCode::OK, json!({"data": {"outputs": {}}})).await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let body: Value = reqwest::get(format!("{}/api/records", app.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn missing_credentials_are_a_reported_error() {
    let app = TestServer::app(None).await;

    let res = reqwest::get(format!("{}/api/records", app.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": "MISO 인증 정보가 설정되지 않았습니다. 환경변수를 확인해주세요."})
    );
}

#[tokio::test]
async fn upstream_status_is_echoed_with_message() {
    let upstream = TestServer::upstream(StatusCode::BAD_REQUEST, json!({"code": "invalid_param"})).await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let res = reqwest::get(format!("{}/api/records", app.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "error": "잘못된 요청입니다. 워크플로우가 발행되었는지 확인해주세요.",
            "status": 400,
            "detail": {"code": "invalid_param"}
        })
    );
}

#[tokio::test]
async fn unreachable_upstream_is_a_connectivity_error() {
    // nothing listens on the discard port
    let app = TestServer::app(Some("http://127.0.0.1:9")).await;

    let res = reqwest::get(format!("{}/api/records", app.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "MISO API 연결에 실패했습니다. 네트워크 연결을 확인해주세요."
    );
}

#[tokio::test]
async fn preview_renders_requested_page() {
    let app = TestServer::app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/invoices/preview", app.base_url))
        .json(&json!({"records": two_records(), "page": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let html = res.text().await.unwrap();
    assert!(html.contains("다라전자"));
    assert!(html.contains("연간 구독"));
    assert!(html.contains("1,200,000원"));
    assert!(!html.contains("가나상사"));
}

#[tokio::test]
async fn preview_of_nothing_is_rejected() {
    let app = TestServer::app(None).await;

    let res = reqwest::Client::new()
        .post(format!("{}/api/invoices/preview", app.base_url))
        .json(&json!({"records": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn print_job_lifecycle() {
    let app = TestServer::app(None).await;
    let client = reqwest::Client::new();

    let staged: Value = client
        .post(format!("{}/api/invoices/print", app.base_url))
        .json(&json!({"records": two_records()}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(staged["pages"], 2);
    assert!(staged["fileName"].as_str().unwrap().starts_with("invoices_"));

    let url = format!("{}{}", app.base_url, staged["url"].as_str().unwrap());
    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let html = res.text().await.unwrap();
    assert_eq!(html.matches("class=\"invoice-page\"").count(), 2);
    assert!(html.find("가나상사").unwrap() < html.find("다라전자").unwrap());

    for _ in 0..2 {
        let done = client.post(format!("{}/done", url)).send().await.unwrap();
        assert_eq!(done.status(), reqwest::StatusCode::NO_CONTENT);
    }

    let gone = client.get(&url).send().await.unwrap();
    assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn print_of_nothing_is_rejected() {
    let app = TestServer::app(None).await;

    let res = reqwest::Client::new()
        .post(format!("{}/api/invoices/print", app.base_url))
        .json(&json!({"records": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "인보이스를 생성할 계약을 선택해주세요.");
}

#[tokio::test]
async fn records_page_lists_sorted_rows() {
    let upstream = TestServer::upstream(
        StatusCode::OK,
        json!({"data": {"outputs": {"결과": [
            {"회사명": "하나상사", "최종금액": 40000},
            {"회사명": "가나전자", "최종금액": 1000}
        ]}}}),
    )
    .await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let html = reqwest::get(format!("{}/?sort=amount&order=desc", app.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("총 2개 계약"));
    assert!(html.contains("사만원"));
    assert!(html.find("하나상사").unwrap() < html.find("가나전자").unwrap());
}

#[tokio::test]
async fn unknown_sort_falls_back_to_company_order() {
    let upstream = TestServer::upstream(
        StatusCode::OK,
        json!({"data": {"outputs": {"결과": [
            {"회사명": "하나상사", "최종금액": 40000},
            {"회사명": "가나전자", "최종금액": 1000}
        ]}}}),
    )
    .await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let res = reqwest::get(format!("{}/?sort=bogus&order=sideways", app.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.find("가나전자").unwrap() < html.find("하나상사").unwrap());
    assert!(html.contains(r#"name="current_sort" value="company""#));
}

#[tokio::test]
async fn selection_survives_resubmits() {
    let upstream = TestServer::upstream(
        StatusCode::OK,
        json!({"data": {"outputs": {"결과": [
            {"회사명": "하나상사", "최종금액": 40000},
            {"회사명": "가나전자", "최종금액": 1000}
        ]}}}),
    )
    .await;
    let app = TestServer::app(Some(&upstream.base_url)).await;

    let sorted = reqwest::get(format!(
        "{}/?current_sort=company&current_order=asc&id=1&sort=amount",
        app.base_url
    ))
    .await
    .unwrap()
    .text()
    .await
    .unwrap();
    assert!(sorted.contains(r#"value="1" aria-label="Select 하나상사" checked />"#));
    assert!(sorted.contains(r#"value="2" aria-label="Select 가나전자" />"#));
    assert!(sorted.find("가나전자").unwrap() < sorted.find("하나상사").unwrap());

    let all = reqwest::get(format!("{}/?current_sort=company&id=1&toggle_all=1", app.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(all.contains(r#"aria-label="Select all" checked />"#));
    assert!(all.contains(r#"<span id="selected-count">2</span>"#));

    let none = reqwest::get(format!(
        "{}/?current_sort=company&id=1&id=2&toggle_all=1",
        app.base_url
    ))
    .await
    .unwrap()
    .text()
    .await
    .unwrap();
    assert!(none.contains(r#"<span id="selected-count">0</span>"#));
}

#[tokio::test]
async fn records_page_survives_fetch_errors() {
    let app = TestServer::app(None).await;

    let res = reqwest::get(format!("{}/", app.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("데이터를 불러오는데 실패했습니다."));
    assert!(html.contains("등록된 계약이 없습니다."));
}

#[tokio::test]
async fn form_print_redirects_to_staged_job() {
    let upstream = TestServer::upstream(
        StatusCode::OK,
        json!({"data": {"outputs": {"결과": [
            {"회사명": "하나상사", "최종금액": 40000},
            {"회사명": "가나전자", "최종금액": 1000}
        ]}}}),
    )
    .await;
    let app = TestServer::app(Some(&upstream.base_url)).await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .post(format!("{}/invoices", app.base_url))
        .form(&[("id", "2"), ("action", "print")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::SEE_OTHER);

    let location = res.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/print/"));

    let html = client
        .get(format!("{}{}", app.base_url, location))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("가나전자"));
    assert!(!html.contains("하나상사"));
}

#[tokio::test]
async fn form_without_selection_is_rejected() {
    let app = TestServer::app(None).await;

    let res = reqwest::Client::new()
        .post(format!("{}/invoices", app.base_url))
        .form(&[("action", "preview")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("미리보기할 계약을 선택해주세요."));
}
