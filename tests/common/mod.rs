#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use axum::body::Bytes;
use axum::extract::{Form, Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use regex::Regex;

use tudochain::config::ChainConfig;
use tudochain::listener::{ChannelOpener, ChannelStatus};

pub const VICTIM: &str = "user1";
pub const VICTIM_UID: u32 = 3;
pub const ORIGINAL_PASSWORD: &str = "hunter2";
pub const RESET_TOKEN: &str = "9f86d081884c7d659a2feaa0c55ad015";
pub const ADMIN_SESSION: &str = "admin-session-0001";

static ORACLE_PAYLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^admin' and (.+)([=<>])'(-?\d+)$").unwrap());
static UID_SUBQUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(select uid from users where username='([^']*)'\)$").unwrap());
static TOKEN_SUBQUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(select ascii\(substr\(token, (\d+), 1\)\) from tokens where uid=(\d+) limit 1\)$").unwrap()
});
static UPLOAD_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="image"; filename="([^"]+)""#).unwrap());

/// Knobs for one simulated TUDO instance.
#[derive(Clone)]
pub struct MockOptions {
    /// The forgot-username form is injectable.
    pub vulnerable: bool,
    /// The forgot-password form confirms with "Email sent!".
    pub sends_reset_email: bool,
    /// A token the reset form accepts without a prior reset request.
    pub guessable_token: Option<String>,
    /// A successful login answers with `Set-Cookie: PHPSESSID=...`.
    pub sets_session_cookie: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            vulnerable: true,
            sends_reset_email: true,
            guessable_token: None,
            sets_session_cookie: true,
        }
    }
}

#[derive(Default)]
pub struct Recorded {
    pub password: String,
    pub reset_requested: bool,
    pub sessions: HashSet<String>,
    pub description: Option<String>,
    pub motd: Option<String>,
    pub motd_session: Option<String>,
    /// Raw `Cookie` header of every MoTD update attempt.
    pub motd_cookies: Vec<Option<String>>,
    pub uploads: Vec<Upload>,
    pub imports: Vec<String>,
    pub hits: Vec<String>,
}

#[derive(Clone)]
pub struct Upload {
    pub filename: String,
    pub body: String,
}

pub struct MockState {
    options: MockOptions,
    pub oracle_probes: AtomicU64,
    pub reset_requests: AtomicU64,
    pub recorded: Mutex<Recorded>,
}

impl MockState {
    fn new(options: MockOptions) -> Self {
        let mut recorded = Recorded {
            password: ORIGINAL_PASSWORD.to_string(),
            ..Default::default()
        };
        recorded.sessions.insert(ADMIN_SESSION.to_string());
        Self {
            options,
            oracle_probes: AtomicU64::new(0),
            reset_requests: AtomicU64::new(0),
            recorded: Mutex::new(recorded),
        }
    }

    pub fn probes(&self) -> u64 {
        self.oracle_probes.load(Ordering::SeqCst)
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.lock().unwrap())
    }

    fn session_from(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        let id = cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == "PHPSESSID")
            .map(|(_, v)| v.to_string())?;
        self.recorded.lock().unwrap().sessions.contains(&id).then_some(id)
    }

    /// Value of the left side of an injected comparison, `None` for SQL NULL.
    fn evaluate(&self, left: &str) -> Option<i64> {
        if let Ok(n) = left.parse() {
            return Some(n);
        }
        if let Some(caps) = UID_SUBQUERY.captures(left) {
            return (&caps[1] == VICTIM).then_some(VICTIM_UID as i64);
        }
        if let Some(caps) = TOKEN_SUBQUERY.captures(left) {
            let pos: usize = caps[1].parse().ok()?;
            let uid: u32 = caps[2].parse().ok()?;
            let pending = self.recorded.lock().unwrap().reset_requested;
            if uid != VICTIM_UID || !pending || pos == 0 {
                return None;
            }
            return RESET_TOKEN.as_bytes().get(pos - 1).map(|b| *b as i64);
        }
        None
    }

    fn oracle(&self, payload: &str) -> bool {
        let Some(caps) = ORACLE_PAYLOAD.captures(payload) else {
            return false;
        };
        let Some(left) = self.evaluate(&caps[1]) else {
            return false;
        };
        let right: i64 = caps[3].parse().unwrap_or(i64::MIN);
        match &caps[2] {
            "=" => left == right,
            ">" => left > right,
            "<" => left < right,
            _ => false,
        }
    }
}

pub struct MockTudo {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockTudo {
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.addr.port())
    }
}

pub async fn spawn(options: MockOptions) -> MockTudo {
    let state = Arc::new(MockState::new(options));
    let app = Router::new()
        .route("/forgotpassword.php", post(forgot_password))
        .route("/forgotusername.php", post(forgot_username))
        .route("/resetpassword.php", post(reset_password))
        .route("/login.php", post(login))
        .route("/profile.php", post(profile))
        .route("/admin/update_motd.php", post(update_motd))
        .route("/admin/upload_image.php", post(upload_image))
        .route("/admin/import_user.php", post(import_user))
        .route("/images/:name", get(image))
        .route("/", get(home))
        .fallback(fallback)
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockTudo { addr, state }
}

type Shared = State<Arc<MockState>>;
type Fields = Form<HashMap<String, String>>;

fn field<'a>(form: &'a HashMap<String, String>, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or_default()
}

async fn forgot_password(State(state): Shared, Form(form): Fields) -> &'static str {
    state.reset_requests.fetch_add(1, Ordering::SeqCst);
    if field(&form, "username") == VICTIM && state.options.sends_reset_email {
        state.recorded.lock().unwrap().reset_requested = true;
        "Email sent!"
    } else {
        "Something went wrong"
    }
}

async fn forgot_username(State(state): Shared, Form(form): Fields) -> &'static str {
    state.oracle_probes.fetch_add(1, Ordering::SeqCst);
    if state.options.vulnerable && state.oracle(field(&form, "username")) {
        "User exists!"
    } else {
        "User doesn't exist."
    }
}

async fn reset_password(State(state): Shared, Form(form): Fields) -> &'static str {
    let token = field(&form, "token");
    let mut recorded = state.recorded.lock().unwrap();
    let valid = (recorded.reset_requested && token == RESET_TOKEN)
        || state.options.guessable_token.as_deref() == Some(token);
    if valid && field(&form, "password1") == field(&form, "password2") {
        recorded.password = field(&form, "password1").to_string();
        recorded.reset_requested = false;
        "Password changed!"
    } else {
        "Invalid token"
    }
}

async fn login(State(state): Shared, Form(form): Fields) -> Response {
    let mut recorded = state.recorded.lock().unwrap();
    if field(&form, "username") != VICTIM || field(&form, "password") != recorded.password {
        return "Login failed".into_response();
    }
    let id = format!("sess-{:04}", recorded.sessions.len());
    recorded.sessions.insert(id.clone());
    if !state.options.sets_session_cookie {
        return "[MoTD] Welcome back, user1 | Logout".into_response();
    }
    (
        [(header::SET_COOKIE, format!("PHPSESSID={}; Path=/", id))],
        "[MoTD] Welcome back, user1 | Logout",
    )
        .into_response()
}

async fn profile(State(state): Shared, headers: HeaderMap, Form(form): Fields) -> Response {
    if state.session_from(&headers).is_none() {
        return (StatusCode::FORBIDDEN, "Not logged in").into_response();
    }
    state.recorded.lock().unwrap().description = Some(field(&form, "description").to_string());
    "Success".into_response()
}

async fn update_motd(State(state): Shared, headers: HeaderMap, Form(form): Fields) -> Response {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.recorded.lock().unwrap().motd_cookies.push(cookie);
    let Some(session) = state.session_from(&headers) else {
        return (StatusCode::FORBIDDEN, "Not an admin").into_response();
    };
    let mut recorded = state.recorded.lock().unwrap();
    recorded.motd = Some(field(&form, "message").to_string());
    recorded.motd_session = Some(session);
    "Message set!".into_response()
}

async fn upload_image(State(state): Shared, headers: HeaderMap, body: Bytes) -> Response {
    if state.session_from(&headers).is_none() {
        return (StatusCode::FORBIDDEN, "Not an admin").into_response();
    }
    let body = String::from_utf8_lossy(&body).to_string();
    let Some(filename) = UPLOAD_FILENAME.captures(&body).map(|c| c[1].to_string()) else {
        return (StatusCode::BAD_REQUEST, "No image").into_response();
    };
    state.recorded.lock().unwrap().uploads.push(Upload { filename, body });
    "Success".into_response()
}

async fn import_user(State(state): Shared, headers: HeaderMap, Form(form): Fields) -> Response {
    if state.session_from(&headers).is_none() {
        return (StatusCode::FORBIDDEN, "Not an admin").into_response();
    }
    state.recorded.lock().unwrap().imports.push(field(&form, "userobj").to_string());
    "User imported".into_response()
}

async fn image(State(state): Shared, Path(name): Path<String>) -> &'static str {
    state.recorded.lock().unwrap().hits.push(format!("/images/{}", name));
    "GIF98a;"
}

async fn home(State(state): Shared) -> String {
    let mut recorded = state.recorded.lock().unwrap();
    recorded.hits.push("/".to_string());
    recorded.motd.clone().unwrap_or_default()
}

async fn fallback(State(state): Shared, uri: Uri) -> StatusCode {
    state.recorded.lock().unwrap().hits.push(uri.path().to_string());
    StatusCode::OK
}

/// Records requested ports instead of spawning anything.
#[derive(Clone, Default)]
pub struct RecordingOpener {
    pub ports: Arc<Mutex<Vec<u16>>>,
}

impl ChannelOpener for RecordingOpener {
    fn open(&self, port: u16) -> ChannelStatus {
        self.ports.lock().unwrap().push(port);
        ChannelStatus::Requested
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Defaults with the trigger and settle waits removed.
pub fn fast_config() -> ChainConfig {
    ChainConfig {
        trigger_delay_ms: 0,
        settle_delay_ms: 0,
        request_timeout_secs: 5,
        trigger_timeout_secs: 2,
        ..Default::default()
    }
}
