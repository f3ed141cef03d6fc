//! Blocking WebDriver HTTP client.

use std::time::Duration;

use log::debug;
use reqwest::Method;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value as Json, json};
use tzweb::{Cookie, Locator};

use crate::error::WireError;
use crate::types::{
    ElementRef, FindRequest, NewSession, ScriptRequest, WindowRect, parse_response,
};

/// One WebDriver session on one driver endpoint.
pub struct WireClient {
    http: Client,
    base_url: String,
    session_id: Option<String>,
}

impl WireClient {
    /// A client for the driver listening at `base_url`, with no session yet.
    pub fn new(base_url: &str) -> Result<Self, WireError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| WireError::Http(format!("client setup failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// True once the driver answers `GET /status` with `ready: true`.
    pub fn is_ready(&self) -> bool {
        self.call::<Json>(Method::GET, "/status".to_string(), None)
            .map(|v| v.get("ready").and_then(Json::as_bool).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Start a browser session (POST /session).
    pub fn new_session(&mut self, capabilities: Json) -> Result<NewSession, WireError> {
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let session: NewSession = self.call(Method::POST, "/session".to_string(), Some(body))?;
        debug!("webdriver session {} started", session.session_id);
        self.session_id = Some(session.session_id.clone());
        Ok(session)
    }

    /// End the session (DELETE /session/{id}).
    pub fn delete_session(&mut self) -> Result<(), WireError> {
        let path = self.session_path("")?;
        self.session_id = None;
        self.call::<Json>(Method::DELETE, path, None).map(drop)
    }

    pub fn navigate(&self, url: &str) -> Result<(), WireError> {
        self.session_cmd(Method::POST, "/url", Some(json!({ "url": url })))
    }

    pub fn refresh(&self) -> Result<(), WireError> {
        self.session_cmd(Method::POST, "/refresh", Some(json!({})))
    }

    pub fn set_window_rect(&self, rect: &WindowRect) -> Result<(), WireError> {
        self.session_cmd(Method::POST, "/window/rect", Some(json!(rect)))
    }

    pub fn close_window(&self) -> Result<(), WireError> {
        self.session_cmd(Method::DELETE, "/window", None)
    }

    pub fn find_element(&self, locator: &Locator) -> Result<ElementRef, WireError> {
        let path = self.session_path("/element")?;
        self.call(Method::POST, path, Some(json!(FindRequest::new(locator))))
    }

    pub fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>, WireError> {
        let path = self.session_path("/elements")?;
        self.call(Method::POST, path, Some(json!(FindRequest::new(locator))))
    }

    /// Search below `parent`.
    pub fn find_elements_from(
        &self,
        parent: &ElementRef,
        request: &FindRequest,
    ) -> Result<Vec<ElementRef>, WireError> {
        let path = self.session_path(&format!("/element/{}/elements", parent.id))?;
        self.call(Method::POST, path, Some(json!(request)))
    }

    pub fn element_text(&self, el: &ElementRef) -> Result<String, WireError> {
        let path = self.session_path(&format!("/element/{}/text", el.id))?;
        self.call(Method::GET, path, None)
    }

    pub fn element_click(&self, el: &ElementRef) -> Result<(), WireError> {
        let path = self.session_path(&format!("/element/{}/click", el.id))?;
        self.call::<Json>(Method::POST, path, Some(json!({}))).map(drop)
    }

    pub fn element_clear(&self, el: &ElementRef) -> Result<(), WireError> {
        let path = self.session_path(&format!("/element/{}/clear", el.id))?;
        self.call::<Json>(Method::POST, path, Some(json!({}))).map(drop)
    }

    pub fn element_send_keys(&self, el: &ElementRef, text: &str) -> Result<(), WireError> {
        let path = self.session_path(&format!("/element/{}/value", el.id))?;
        self.call::<Json>(Method::POST, path, Some(json!({ "text": text })))
            .map(drop)
    }

    /// Run a synchronous script and decode what it returns.
    pub fn execute<T: DeserializeOwned>(
        &self,
        script: &str,
        args: Vec<Json>,
    ) -> Result<T, WireError> {
        let path = self.session_path("/execute/sync")?;
        let body = json!(ScriptRequest { script, args });
        self.call(Method::POST, path, Some(body))
    }

    pub fn cookies(&self) -> Result<Vec<Cookie>, WireError> {
        let path = self.session_path("/cookie")?;
        self.call(Method::GET, path, None)
    }

    pub fn add_cookie(&self, cookie: &Cookie) -> Result<(), WireError> {
        self.session_cmd(Method::POST, "/cookie", Some(json!({ "cookie": cookie })))
    }

    fn session_path(&self, suffix: &str) -> Result<String, WireError> {
        let id = self.session_id.as_deref().ok_or(WireError::NoSession)?;
        Ok(format!("/session/{id}{suffix}"))
    }

    fn session_cmd(&self, method: Method, suffix: &str, body: Option<Json>) -> Result<(), WireError> {
        let path = self.session_path(suffix)?;
        self.call::<Json>(method, path, body).map(drop)
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<Json>,
    ) -> Result<T, WireError> {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .map_err(|e| WireError::Http(format!("{method} {path} failed: {e}")))?;
        let success = resp.status().is_success();
        let text = resp
            .text()
            .map_err(|e| WireError::Http(format!("{method} {path} body: {e}")))?;
        parse_response(success, &text)
    }
}
