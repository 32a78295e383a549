use serde_json::{json, Value};
use std::sync::Arc;

use proteus::backends::Backends;
use proteus::config::Config;
use proteus_core::backend::memory::InMemoryBackend;
use proteus_core::models::ActionKind;
use proteus::server::{router, ServerState};

fn fixture() -> Value {
    json!([
        { "id": "1", "type": "project", "repo": "/data/tika", "name": "Tika",
          "description": "Content detection", "license_Apache": 40, "license_GPL": 0,
          "mime_text/plain": 12, "mime_image/png": 3 },
        { "id": "2", "type": "project", "repo": "/data/oodt", "name": "OODT",
          "description": "Data management", "license_Apache": 10, "license_MIT": 5,
          "mime_text/plain": 1, "mime_application/xml": 7 },
        { "id": "/data/tika", "type": "software", "license_Standards": 1, "license_Apache": 40 },
        { "id": "/data/oodt", "type": "software", "license_Apache": 10, "license_Unknown": 2 },
        { "id": "/data/tika/README", "parent": "/data/tika", "mimetype": "text/plain",
          "license": "Apache" }
    ])
}

async fn start() -> (String, Arc<InMemoryBackend>) {
    let memory = Arc::new(InMemoryBackend::from_json(fixture()).unwrap());
    let backends = Backends {
        search: memory.clone(),
        actions: memory.clone(),
    };
    let app = router(ServerState::new(&Config::minimal(), backends));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), memory)
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_version() {
    let (base, _) = start().await;
    let (status, body) = get_json(&format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn projects_are_filtered() {
    let (base, _) = start().await;
    let (status, body) =
        get_json(&format!("{}/api/projects?search=MANAGEMENT&selected=/data/oodt", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["name"], "OODT");
    assert_eq!(body["selected"]["repo"], "/data/oodt");
}

#[tokio::test]
async fn license_pie_skips_zero_totals() {
    let (base, _) = start().await;
    let (status, body) = get_json(&format!("{}/api/licenses", base)).await;
    assert_eq!(status, 200);
    let keys: Vec<&str> = body["slices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["Apache", "MIT"]);
    assert_eq!(body["total"], 55.0);
}

#[tokio::test]
async fn top_mime_count_rules() {
    let (base, _) = start().await;

    let (_, body) = get_json(&format!("{}/api/mime/top?count=1", base)).await;
    assert_eq!(body["kind"], "pie");
    assert_eq!(body["chart"]["slices"].as_array().unwrap().len(), 1);
    assert_eq!(body["chart"]["slices"][0]["key"], "text/plain");

    let (_, body) = get_json(&format!("{}/api/mime/top?count=", base)).await;
    assert_eq!(body["kind"], "empty");

    // Out of range falls back to 25, which covers all three types.
    let (_, body) = get_json(&format!("{}/api/mime/top?count=99", base)).await;
    assert_eq!(body["chart"]["slices"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn bubble_and_audit_charts() {
    let (base, _) = start().await;

    let (_, body) = get_json(&format!("{}/api/mime/all", base)).await;
    assert_eq!(body["name"], "root");
    assert_eq!(body["children"].as_array().unwrap().len(), 3);

    let (_, body) = get_json(&format!("{}/api/audit", base)).await;
    assert_eq!(body["data"]["labels"], json!(["oodt", "tika"]));
    assert_eq!(body["data"]["max"], 40.0);
    assert_eq!(body["bars"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn files_require_repo() {
    let (base, _) = start().await;

    let (status, body) = get_json(&format!("{}/api/files?repo=", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = get_json(&format!("{}/api/files?repo=/data/tika", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["location"], "/data/tika/README");
    assert_eq!(body[0]["mime_type"], "text/plain");
}

#[tokio::test]
async fn actions_update_session_state() {
    let (base, memory) = start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/actions", base))
        .json(&json!({ "repo": "", "action": "crawl" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert!(memory.actions().is_empty());

    let response = client
        .post(format!("{}/api/actions", base))
        .json(&json!({ "repo": "/data/tika", "name": "Tika", "action": "crawl" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["current_view"], "analyze");
    assert_eq!(state["current_repo"], "/data/tika");
    assert_eq!(state["current_action"], "crawl");
    assert_eq!(state["progress"], true);

    let actions = memory.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, ActionKind::Crawl);
}
