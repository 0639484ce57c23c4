use std::sync::Arc;
use std::time::Duration;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::COOKIE;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Url};
use crate::config::ChainConfig;
use crate::errors::ChainError;
use tracing::{debug, trace};

/// Status and body of one response.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn contains(&self, marker: &str) -> bool {
        self.body.contains(marker)
    }

    pub fn contains_any(&self, markers: &[String]) -> bool {
        markers.iter().any(|m| !m.is_empty() && self.body.contains(m.as_str()))
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// First `max` characters of the body, for log lines.
    pub fn preview(&self, max: usize) -> String {
        self.body.chars().take(max).collect()
    }
}

/// Cookie jar plus the session identifier captured from it. One session is
/// owned by one run and handed explicitly to the stages that need it.
///
/// Privileged requests go through clients without the jar and carry only
/// the `session_id` cookie, so a supplied identifier is never shadowed by
/// whatever the jar holds.
pub struct Session {
    client: Client,
    privileged: Client,
    no_redirect: Client,
    jar: Arc<Jar>,
    base_url: Url,
    timeout: Duration,
    cookie_name: String,
    session_id: Option<String>,
}

impl Session {
    pub fn new(base_url: &str, config: &ChainConfig) -> Result<Self, ChainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ChainError::InvalidTarget(format!("{}: {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ChainError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let privileged = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ChainError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let no_redirect = Client::builder()
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ChainError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            privileged,
            no_redirect,
            jar,
            base_url,
            timeout: config.request_timeout(),
            cookie_name: config.session_cookie.clone(),
            session_id: None,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Use an identifier obtained elsewhere, e.g. an exfiltrated admin cookie.
    pub fn set_session_id(&mut self, id: &str) {
        self.session_id = Some(id.to_string());
    }

    /// Look up a cookie the target has set on this session.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    /// Copy the session cookie from the jar into `session_id`.
    pub fn capture_session_id(&mut self) -> Option<&str> {
        if let Some(value) = self.cookie(&self.cookie_name) {
            self.session_id = Some(value);
        }
        self.session_id.as_deref()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpReply, ChainError> {
        let request = self.client.post(self.url(path)).form(form);
        self.send(path, request).await
    }

    /// POST carrying the session cookie explicitly.
    pub async fn post_form_privileged(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpReply, ChainError> {
        let request = self.with_session_cookie(self.privileged.post(self.url(path)).form(form));
        self.send(path, request).await
    }

    /// Multipart POST that does not follow redirects.
    pub async fn post_multipart_privileged(&self, path: &str, form: Form) -> Result<HttpReply, ChainError> {
        let request = self.with_session_cookie(self.no_redirect.post(self.url(path)).multipart(form));
        self.send(path, request).await
    }

    pub async fn get_privileged(&self, path: &str, timeout: Duration) -> Result<HttpReply, ChainError> {
        let request = self.with_session_cookie(self.privileged.get(self.url(path)).timeout(timeout));
        self.send(path, request).await
    }

    fn with_session_cookie(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_id {
            Some(id) => request.header(COOKIE, format!("{}={}", self.cookie_name, id)),
            None => request,
        }
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<HttpReply, ChainError> {
        trace!(path, timeout_secs = self.timeout.as_secs(), "Sending request");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(path, status, body_len = body.len(), "Response received");
        Ok(HttpReply { status, body })
    }
}
