use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use keyword_suggest::clients::{ClientError, CrawlResult, CrawlTarget, Crawler, TextGenerator};
use keyword_suggest::config::Config;
use keyword_suggest::constants::DEFAULT_API_KEY;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct OfflineCrawler;

#[async_trait]
impl Crawler for OfflineCrawler {
    async fn crawl(&self, _target: &CrawlTarget) -> Result<CrawlResult, ClientError> {
        Err(ClientError::Connection {
            service: "Firecrawl",
            message: "offline".into(),
        })
    }
}

/// Returns a fixed model response, or a credentials failure when `None`.
struct FixedGenerator(Option<&'static str>);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate_text(&self, _system: &str, _prompt: &str) -> Result<String, ClientError> {
        self.0
            .map(str::to_string)
            .ok_or(ClientError::MissingApiKey {
                service: "OpenRouter",
            })
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config
}

async fn spawn_app_with(config: Config, output: Option<&'static str>) -> Router {
    let state = keyword_suggest::api::create_app_state_with_clients(
        config,
        Arc::new(OfflineCrawler),
        Arc::new(FixedGenerator(output)),
        None,
    )
    .await
    .expect("Failed to create app state");
    keyword_suggest::api::router(state)
}

async fn spawn_app() -> Router {
    spawn_app_with(test_config(), None).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = send_raw(app, method, uri, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY);

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn create_facility(app: &Router, body: Value) -> i64 {
    let (status, json) = send(app, "POST", "/api/facilities", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_missing_facility_is_404() {
    let app = spawn_app().await;

    let (status, json) = send(&app, "GET", "/api/facilities/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Not Found");

    let (status, _) = send(&app, "GET", "/api/keywords/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "GET", "/api/export/csv/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_invalid_facility_id_is_400() {
    let app = spawn_app().await;

    let (status, json) = send(&app, "GET", "/api/facilities/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation Error");
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let app = spawn_app().await;

    for (method, uri) in [
        ("POST", "/api/facilities"),
        ("PUT", "/api/facilities/1"),
        ("DELETE", "/api/facilities/1"),
        ("PUT", "/api/keywords/1"),
        ("POST", "/api/keywords/generate/1"),
        ("DELETE", "/api/keywords/1"),
        ("GET", "/api/auth/me"),
    ] {
        for key in [None, Some("wrong-key")] {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
            if let Some(key) = key {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
            }
            let response = app
                .clone()
                .oneshot(builder.body(Body::from("{}")).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/facilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_list_facilities() {
    let app = spawn_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/facilities",
        Some(json!({"business_type": "restaurant"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("facility_name"));

    create_facility(
        &app,
        json!({"facility_name": "Sample Diner", "business_type": "restaurant", "address": "東京都渋谷区"}),
    )
    .await;
    create_facility(
        &app,
        json!({"facility_name": "Hair Salon Luna", "business_type": "salon", "address": "大阪府大阪市"}),
    )
    .await;
    create_facility(&app, json!({"facility_name": "Corner Bistro", "business_type": "restaurant"})).await;

    let (status, json) = send(&app, "GET", "/api/facilities?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["meta"], json!({"total": 3, "limit": 2, "offset": 0}));
    assert_eq!(json["data"][0]["facility_name"], "Corner Bistro");

    let (_, json) = send(&app, "GET", "/api/facilities?business_type=restaurant", None).await;
    assert_eq!(json["meta"]["total"], 2);

    let (_, json) = send(&app, "GET", "/api/facilities?search=SALON", None).await;
    assert_eq!(json["meta"]["total"], 1);

    let (_, json) = send(&app, "GET", "/api/facilities?search=%25", None).await;
    assert_eq!(json["meta"]["total"], 0);

    let (status, _) = send(&app, "GET", "/api/facilities?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/api/facilities?limit=5000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&app, "GET", "/api/facilities/business-types/list", None).await;
    assert_eq!(json["data"], json!(["restaurant", "salon"]));

    let (_, json) = send(&app, "GET", "/api/facilities/stats/summary", None).await;
    assert_eq!(
        json["data"],
        json!({"totalCount": 3, "businessTypeCounts": {"restaurant": 2, "salon": 1}})
    );
}

#[tokio::test]
async fn test_update_facility_overwrites_supplied_fields() {
    let app = spawn_app().await;
    let id = create_facility(
        &app,
        json!({"facility_name": "Cafe Mori", "business_type": "cafe", "phone": "03-1234-5678"}),
    )
    .await;

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/facilities/{id}"),
        Some(json!({"address": "京都府京都市", "phone": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["facility_name"], "Cafe Mori");
    assert_eq!(json["data"]["address"], "京都府京都市");
    assert_eq!(json["data"]["phone"], Value::Null);
    assert_eq!(json["data"]["updated_by"], 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/facilities/{id}"),
        Some(json!({"gbp_url": "ftp://example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/api/facilities/999", Some(json!({"address": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "PUT", &format!("/api/facilities/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation Error");

    let (_, json) = send(&app, "GET", "/api/facilities?search=%EF%BC%A3%EF%BC%A1%EF%BC%A6%EF%BC%A5", None).await;
    assert_eq!(json["meta"]["total"], 0);
    send(
        &app,
        "PUT",
        &format!("/api/facilities/{id}"),
        Some(json!({"facility_name": "ＣＡＦＥ ＭＯＲＩ"})),
    )
    .await;
    let (_, json) = send(&app, "GET", "/api/facilities?search=%EF%BD%83%EF%BD%81%EF%BD%86%EF%BD%85", None).await;
    assert_eq!(json["meta"]["total"], 1);
}

#[tokio::test]
async fn test_keyword_update_rules() {
    let app = spawn_app().await;
    let id = create_facility(&app, json!({"facility_name": "Cafe Mori"})).await;
    let uri = format!("/api/keywords/{id}");

    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"],
        json!({"menu_service": [], "environment_facility": [], "recommended_scene": []})
    );

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"menu_service": ["a".repeat(150)]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"menu_service": [" ランチ ", "", "ランチ"], "recommended_scene": ["デート"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let expected = json!({
        "menu_service": ["ランチ", "ランチ"],
        "environment_facility": [],
        "recommended_scene": ["デート"]
    });
    assert_eq!(json["data"], expected);

    let (_, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(json["data"], expected);

    let (_, json) = send(&app, "GET", "/api/keywords/stats/summary", None).await;
    assert_eq!(json["data"]["totalKeywords"], 3);
    assert_eq!(json["data"]["facilitiesWithKeywords"], 1);
    assert_eq!(json["data"]["categoryCounts"]["menu_service"], 2);

    let (status, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["message"].is_string());

    let (_, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(json["data"]["menu_service"], json!([]));
}

#[tokio::test]
async fn test_generate_falls_back_without_ai() {
    let app = spawn_app().await;
    let id = create_facility(
        &app,
        json!({"facility_name": "Sample Diner", "business_type": "restaurant", "official_site_url": "https://diner.example"}),
    )
    .await;

    let (status, json) = send(&app, "POST", &format!("/api/keywords/generate/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    for key in ["menu_service", "environment_facility", "recommended_scene"] {
        assert!(!data[key].as_array().unwrap().is_empty(), "{key}");
    }
    let mentions_name = ["menu_service", "environment_facility", "recommended_scene"]
        .iter()
        .flat_map(|key| data[*key].as_array().unwrap())
        .any(|k| k.as_str().unwrap().contains("Sample Diner"));
    assert!(mentions_name);

    let (_, stored) = send(&app, "GET", &format!("/api/keywords/{id}"), None).await;
    assert_eq!(&stored["data"], data);

    let (status, _) = send(&app, "POST", "/api/keywords/generate/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_uses_model_output() {
    let app = spawn_app_with(
        test_config(),
        Some("```json\n{\"menu_service\":[\"つけ麺\"],\"environment_facility\":[\"カウンター\"],\"recommended_scene\":[\"深夜\"]}\n```"),
    )
    .await;
    let id = create_facility(&app, json!({"facility_name": "Noodle Bar"})).await;

    let (status, json) = send(&app, "POST", &format!("/api/keywords/generate/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["menu_service"], json!(["つけ麺"]));
}

#[tokio::test]
async fn test_generate_without_fallback_returns_500() {
    let mut config = test_config();
    config.keywords.fallback_on_error = false;
    let app = spawn_app_with(config, None).await;
    let id = create_facility(&app, json!({"facility_name": "Sample Diner"})).await;

    let (status, json) = send(&app, "POST", &format!("/api/keywords/generate/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "External API Error");
}

#[tokio::test]
async fn test_csv_export_rows() {
    let app = spawn_app().await;
    let id = create_facility(
        &app,
        json!({"facility_name": "Cafe Mori", "business_type": "cafe", "address": "東京都港区1-2-3, 2F"}),
    )
    .await;

    send(
        &app,
        "PUT",
        &format!("/api/keywords/{id}"),
        Some(json!({
            "menu_service": ["ランチ", "ケーキ"],
            "environment_facility": ["テラス席"],
            "recommended_scene": ["デート", "女子会", "作業"]
        })),
    )
    .await;

    let response = send_raw(&app, "GET", &format!("/api/export/csv/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"keywords_{id}.csv\"").as_str()
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();

    assert_eq!(rows.len(), 2 + 1 + 3);
    assert!(rows.iter().all(|r| r.starts_with("Cafe Mori,cafe,\"東京都港区1-2-3, 2F\",")));
    assert_eq!(rows.iter().filter(|r| r.contains(",メニュー・サービス,")).count(), 2);
    assert_eq!(rows.iter().filter(|r| r.contains(",環境・設備,")).count(), 1);
    assert_eq!(rows.iter().filter(|r| r.contains(",おすすめの利用シーン,")).count(), 3);

    let response = send_raw(&app, "GET", &format!("/api/export/json/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["facility"]["facility_name"], "Cafe Mori");
    assert_eq!(json["keywords"]["environment_facility"], json!(["テラス席"]));

    let (_, json) = send(&app, "GET", "/api/export/stats", None).await;
    assert_eq!(
        json["data"],
        json!({"totalFacilities": 1, "totalKeywords": 6, "exportableFacilities": 1})
    );
}

#[tokio::test]
async fn test_delete_facility_cascades() {
    let app = spawn_app().await;
    let id = create_facility(&app, json!({"facility_name": "Cafe Mori"})).await;

    send(
        &app,
        "PUT",
        &format!("/api/keywords/{id}"),
        Some(json!({"menu_service": ["ランチ"], "recommended_scene": ["デート"]})),
    )
    .await;

    let (status, json) = send(&app, "DELETE", &format!("/api/facilities/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = send(&app, "GET", &format!("/api/facilities/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = send(&app, "GET", "/api/keywords/stats/summary", None).await;
    assert_eq!(json["data"]["totalKeywords"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/api/facilities/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_and_key_rotation() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(r#"{"username":"admin","password":"wrong"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"username": "admin", "password": "password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["api_key"], DEFAULT_API_KEY);

    let (_, json) = send(&app, "GET", "/api/auth/me", None).await;
    assert_eq!(json["data"]["username"], "admin");

    let (status, json) = send(&app, "POST", "/api/auth/api-key/regenerate", None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = json["data"]["api_key"].as_str().unwrap().to_string();
    assert_ne!(fresh, DEFAULT_API_KEY);

    let (status, _) = send(&app, "GET", "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {fresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
