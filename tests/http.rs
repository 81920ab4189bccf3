use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanDisplay {
    total_pages: u32,
    per_day: u64,
    per_session: u64,
    per_salah: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PlanPreviewResponse {
    display: PlanDisplay,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressState {
    pages_completed: u32,
    last_updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
    progress: ProgressState,
    ambiguous_page_warning: bool,
    track: Value,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("khatm_planner_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_khatm_planner"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post_json(client: &Client, url: String, body: Value) -> Value {
    let response = client.post(url).json(&body).send().await.unwrap();
    assert!(response.status().is_success(), "status {}", response.status());
    response.json().await.unwrap()
}

async fn reset(client: &Client, server: &TestServer) -> Value {
    client
        .post(format!("{}/api/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_plan_preview_and_save() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    let preview: PlanPreviewResponse = client
        .post(format!("{}/api/plan/preview", server.base_url))
        .json(&json!({ "goal": 1, "days": "30", "sessions": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(preview.display.total_pages, 604);
    assert_eq!(preview.display.per_day, 20);
    assert_eq!(preview.display.per_session, 10);
    assert_eq!(preview.display.per_salah, None);

    let before = post_json(&client, format!("{}/api/track/day", server.base_url), json!({ "day": 3 })).await;
    assert!(before["savedPlan"].is_null());
    assert_eq!(before["track"]["totalPages"], 604);

    let saved = post_json(
        &client,
        format!("{}/api/plan/save", server.base_url),
        json!({ "goal": 2, "days": 29, "sessions": 5 }),
    )
    .await;
    assert_eq!(saved["planSaved"], true);
    assert_eq!(saved["savedPlan"]["goalKhatmah"], 2);
    assert_eq!(saved["planDisplay"]["perSalah"], 8);
    assert_eq!(saved["track"]["totalPages"], 1208);
}

#[tokio::test]
async fn http_progress_update_and_history() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    post_json(
        &client,
        format!("{}/api/plan/save", server.base_url),
        json!({ "goal": 2, "days": 30, "sessions": 1 }),
    )
    .await;

    let update: ProgressResponse = client
        .post(format!("{}/api/track/progress", server.base_url))
        .json(&json!({ "mode": "onPage", "value": 100 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update.progress.pages_completed, 99);
    assert!(update.progress.last_updated_at.is_some());
    assert!(update.ambiguous_page_warning);
    assert_eq!(update.track["completed"], 99);

    for read in 1..=11 {
        post_json(
            &client,
            format!("{}/api/track/progress", server.base_url),
            json!({ "mode": "readPages", "value": read * 10 }),
        )
        .await;
    }

    let state: Value = client
        .get(format!("{}/api/state", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let history = state["history"].as_array().unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0]["pagesCompleted"], 110);
    assert_eq!(state["progress"]["pagesCompleted"], 110);
}

#[tokio::test]
async fn http_unknown_mode_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/track/progress", server.base_url))
        .json(&json!({ "mode": "chapters", "value": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_reset_removes_persisted_keys() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_json(&client, format!("{}/api/plan/save", server.base_url), json!({})).await;
    post_json(&client, format!("{}/api/track/day", server.base_url), json!({ "day": 4 })).await;
    post_json(
        &client,
        format!("{}/api/track/progress", server.base_url),
        json!({ "mode": "readPages", "value": 50 }),
    )
    .await;

    let after = reset(&client, &server).await;
    assert!(after["savedPlan"].is_null());
    assert_eq!(after["ramadanDay"], 1);
    assert_eq!(after["progress"]["pagesCompleted"], 0);
    assert_eq!(after["history"].as_array().map(Vec::len), Some(0));

    let file: Value = serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    for key in ["plan", "progress", "history", "ramadanDay"] {
        assert!(file.get(key).is_none(), "{key} still persisted");
    }
}

#[tokio::test]
async fn http_form_posts_redirect_to_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    let response = client
        .post(format!("{}/track/progress", server.base_url))
        .form(&[("mode", "readPages"), ("value", "abc")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Day 1: 0 pages read"));
}
