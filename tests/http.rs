use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct MoodCount {
    mood: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct TodayResponse {
    date: String,
    counts: Vec<MoodCount>,
    total: u64,
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoodEntry {
    timestamp: String,
    mood: String,
    note: String,
}

impl TodayResponse {
    fn count(&self, mood: &str) -> u64 {
        self.counts
            .iter()
            .find(|entry| entry.mood == mood)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

struct TestServer {
    base_url: String,
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

fn unique_sheet_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mood_queue_http_{}_{}.csv", std::process::id(), nanos));
    std::fs::write(&path, "timestamp,mood,note\n").expect("create sheet file");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
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
    let sheet_path = unique_sheet_path();
    let child = Command::new(env!("CARGO_BIN_EXE_mood_queue"))
        .env("HOST", "127.0.0.1")
        .env("PORT", port.to_string())
        .env("MOOD_STORE", "file")
        .env("MOOD_SHEET_PATH", sheet_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
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

async fn fetch_today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_logged_mood_shows_up_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_today(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/moods", server.base_url))
        .json(&serde_json::json!({ "mood": "😕", "note": "slow day" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let entry: MoodEntry = response.json().await.unwrap();
    assert_eq!(entry.mood, "😕");
    assert_eq!(entry.note, "slow day");
    assert_eq!(entry.timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());

    let today = fetch_today(&client, &server.base_url).await;
    assert_eq!(today.count("😕"), before.count("😕") + 1);
    assert_eq!(today.total, before.total + 1);
    assert!(today.warning.is_none());
    assert!(entry.timestamp.starts_with(&today.date));
}

#[tokio::test]
async fn http_form_submit_redirects_with_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_today(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/moods", server.base_url))
        .form(&[("mood", "🎉"), ("note", "release, shipped"), ("refresh", "1")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.url().as_str().ends_with("/?logged=1&refresh=1"));
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"data-type="ok">Mood logged successfully!"#));
    assert!(page.contains("Mood Counts Today"));

    let today = fetch_today(&client, &server.base_url).await;
    assert_eq!(today.count("🎉"), before.count("🎉") + 1);
}

#[tokio::test]
async fn http_rejects_unknown_mood() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_today(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/moods", server.base_url))
        .json(&serde_json::json!({ "mood": "🙂" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let today = fetch_today(&client, &server.base_url).await;
    assert_eq!(today.total, before.total);
}

#[tokio::test]
async fn http_today_fragment_renders_section() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = fetch_today(&client, &server.base_url).await;
    let fragment = client
        .get(format!("{}/today", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    if today.total == 0 {
        assert!(fragment.contains("No moods logged today yet."));
    } else {
        assert!(fragment.contains("<svg"));
    }
    assert!(!fragment.contains("<html"));
}
