//! HTTP surface of the app: one endpoint serving the stored-collection
//! list (GET) and submissions (POST).
//!
//! The [`GeoJsonApi`] trait is the seam: the browser build talks to the
//! backend through [`HttpApi`], host tests drive the flow through
//! [`InMemoryApi`].

use std::cell::RefCell;

use catalog::NamedCollection;
use formats::GeoJsonDocument;
use serde::{Deserialize, Serialize};

/// Backend endpoint, same path for GET (list) and POST (submit).
pub const API_PATH: &str = "/api";

/// Last-resort dialog text when an error carries no usable message.
pub const FALLBACK_ERROR_TEXT: &str = "Something went wrong!";

/// Per-request deadlines in milliseconds. Fixed at startup, no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    pub list_timeout_ms: u32,
    pub submit_timeout_ms: u32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            list_timeout_ms: 5_000,
            submit_timeout_ms: 30_000,
        }
    }
}

/// POST payload: the user-chosen name and the validated document, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitBody {
    pub name: String,
    pub geojson: GeoJsonDocument,
}

/// Success response of a submission. Servers may answer with an empty or
/// non-JSON body; both decode to "no message".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitAck {
    pub fn from_body_text(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }
}

/// Pulls the optional `message` field out of an error response body.
pub fn server_message_from_body(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response within the configured deadline.
    Timeout { ms: u32 },
    /// Non-success HTTP status; the body may have carried a server message.
    Http { status: u16, message: Option<String> },
    /// Connection or protocol failure before any HTTP status arrived.
    Transport(String),
    /// Success status but the body could not be used.
    Payload(String),
}

impl ApiError {
    /// Message as the HTTP layer reports it, ignoring any server body.
    /// The list-fetch dialog shows exactly this text.
    pub fn transport_message(&self) -> String {
        match self {
            ApiError::Timeout { ms } => format!("timeout of {ms}ms exceeded"),
            ApiError::Http { status, .. } => {
                format!("Request failed with status code {status}")
            }
            ApiError::Transport(m) | ApiError::Payload(m) => m.clone(),
        }
    }

    /// Dialog text for a failed submission: the server's `message` field
    /// when the response carried one, else the transport message, else the
    /// generic fallback.
    pub fn user_message(&self) -> String {
        if let ApiError::Http {
            message: Some(m), ..
        } = self
        {
            return m.clone();
        }
        let text = self.transport_message();
        if text.is_empty() {
            FALLBACK_ERROR_TEXT.to_string()
        } else {
            text
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Timeout { ms } => write!(f, "timeout of {ms}ms exceeded"),
            ApiError::Http {
                status,
                message: Some(m),
            } => write!(f, "HTTP {status}: {m}"),
            ApiError::Http {
                status,
                message: None,
            } => write!(f, "HTTP {status}"),
            ApiError::Transport(m) => write!(f, "network error: {m}"),
            ApiError::Payload(m) => write!(f, "unusable response body: {m}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Backend surface as the app consumes it.
///
/// Implementations resolve on the browser event loop; [`InMemoryApi`]
/// resolves immediately so host tests can drive it with a trivial executor.
#[allow(async_fn_in_trait)]
pub trait GeoJsonApi {
    async fn fetch_list(&self) -> Result<NamedCollection, ApiError>;
    async fn submit(&self, body: &SubmitBody) -> Result<SubmitAck, ApiError>;
}

#[derive(Debug, Default)]
struct InMemoryInner {
    collection: NamedCollection,
    fail_next_list: Option<ApiError>,
    fail_next_submit: Option<ApiError>,
    submit_message: Option<String>,
    submissions: Vec<SubmitBody>,
    list_calls: usize,
}

/// In-memory backend for host tests: serves a seeded collection, stores
/// successful submissions back into it and records every request it saw.
#[derive(Debug, Default)]
pub struct InMemoryApi {
    inner: RefCell<InMemoryInner>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(collection: NamedCollection) -> Self {
        let api = Self::new();
        api.inner.borrow_mut().collection = collection;
        api
    }

    /// Makes the next `fetch_list` fail with `err`, then recover.
    pub fn fail_next_list(&self, err: ApiError) {
        self.inner.borrow_mut().fail_next_list = Some(err);
    }

    /// Makes the next `submit` fail with `err`, then recover.
    pub fn fail_next_submit(&self, err: ApiError) {
        self.inner.borrow_mut().fail_next_submit = Some(err);
    }

    /// Sets the `message` field returned by successful submissions.
    pub fn set_submit_message(&self, message: Option<&str>) {
        self.inner.borrow_mut().submit_message = message.map(str::to_string);
    }

    pub fn submissions(&self) -> Vec<SubmitBody> {
        self.inner.borrow().submissions.clone()
    }

    pub fn submit_count(&self) -> usize {
        self.inner.borrow().submissions.len()
    }

    pub fn list_call_count(&self) -> usize {
        self.inner.borrow().list_calls
    }

    pub fn collection(&self) -> NamedCollection {
        self.inner.borrow().collection.clone()
    }
}

impl GeoJsonApi for InMemoryApi {
    async fn fetch_list(&self) -> Result<NamedCollection, ApiError> {
        let mut inner = self.inner.borrow_mut();
        inner.list_calls += 1;
        if let Some(err) = inner.fail_next_list.take() {
            return Err(err);
        }
        Ok(inner.collection.clone())
    }

    async fn submit(&self, body: &SubmitBody) -> Result<SubmitAck, ApiError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(err) = inner.fail_next_submit.take() {
            return Err(err);
        }
        inner.submissions.push(body.clone());
        inner
            .collection
            .upsert(body.name.clone(), body.geojson.clone());
        Ok(SubmitAck {
            message: inner.submit_message.clone(),
        })
    }
}

#[cfg(target_arch = "wasm32")]
mod http_wasm {
    use catalog::NamedCollection;
    use futures::future::{Either, select};
    use gloo_net::http::Request;
    use wasm_bindgen_futures::JsFuture;

    use super::{
        API_PATH, ApiError, GeoJsonApi, RequestConfig, SubmitAck, SubmitBody,
        server_message_from_body,
    };

    /// Browser-backed API client. Cheap to clone into spawned futures.
    #[derive(Debug, Clone)]
    pub struct HttpApi {
        base_path: String,
        config: RequestConfig,
    }

    impl HttpApi {
        pub fn new(config: RequestConfig) -> Self {
            Self::with_base_path(API_PATH, config)
        }

        /// Point the client elsewhere, e.g. a dev-server proxy prefix.
        pub fn with_base_path(base_path: impl Into<String>, config: RequestConfig) -> Self {
            Self {
                base_path: base_path.into(),
                config,
            }
        }

        pub fn config(&self) -> RequestConfig {
            self.config
        }
    }

    /// Resolves after `ms` on the browser event loop.
    async fn sleep_ms(ms: u32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let window = web_sys::window().unwrap();
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32);
        });
        let _ = JsFuture::from(promise).await;
    }

    /// Races a request against its deadline. The fetch is not aborted on
    /// timeout; its eventual result is dropped.
    async fn with_deadline<T>(
        fut: impl Future<Output = Result<T, ApiError>>,
        ms: u32,
    ) -> Result<T, ApiError> {
        let fut = std::pin::pin!(fut);
        let deadline = std::pin::pin!(sleep_ms(ms));
        match select(fut, deadline).await {
            Either::Left((out, _)) => out,
            Either::Right(((), _)) => Err(ApiError::Timeout { ms }),
        }
    }

    async fn error_for_status(resp: gloo_net::http::Response) -> ApiError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        ApiError::Http {
            status,
            message: server_message_from_body(&body),
        }
    }

    impl GeoJsonApi for HttpApi {
        async fn fetch_list(&self) -> Result<NamedCollection, ApiError> {
            let path = self.base_path.clone();
            with_deadline(
                async move {
                    let resp = Request::get(&path)
                        .send()
                        .await
                        .map_err(|e| ApiError::Transport(e.to_string()))?;
                    if !resp.ok() {
                        return Err(error_for_status(resp).await);
                    }
                    let text = resp
                        .text()
                        .await
                        .map_err(|e| ApiError::Transport(e.to_string()))?;
                    NamedCollection::from_response_text(&text)
                        .map_err(|e| ApiError::Payload(e.to_string()))
                },
                self.config.list_timeout_ms,
            )
            .await
        }

        async fn submit(&self, body: &SubmitBody) -> Result<SubmitAck, ApiError> {
            let path = self.base_path.clone();
            let payload =
                serde_json::to_string(body).map_err(|e| ApiError::Payload(e.to_string()))?;
            with_deadline(
                async move {
                    let resp = Request::post(&path)
                        .header("Content-Type", "application/json")
                        .body(payload)
                        .map_err(|e| ApiError::Transport(e.to_string()))?
                        .send()
                        .await
                        .map_err(|e| ApiError::Transport(e.to_string()))?;
                    if !resp.ok() {
                        return Err(error_for_status(resp).await);
                    }
                    let text = resp.text().await.unwrap_or_default();
                    Ok(SubmitAck::from_body_text(&text))
                },
                self.config.submit_timeout_ms,
            )
            .await
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use http_wasm::HttpApi;

/// Stub so host builds compile; browser fetch only exists on wasm32.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct HttpApi {
    config: RequestConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpApi {
    pub fn new(config: RequestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RequestConfig {
        self.config
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GeoJsonApi for HttpApi {
    async fn fetch_list(&self) -> Result<NamedCollection, ApiError> {
        Err(ApiError::Transport(
            "browser fetch is only available on wasm32".to_string(),
        ))
    }

    async fn submit(&self, _body: &SubmitBody) -> Result<SubmitAck, ApiError> {
        Err(ApiError::Transport(
            "browser fetch is only available on wasm32".to_string(),
        ))
    }
}
