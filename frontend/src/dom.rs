//! Browser side of the widget: timers, HTTP, cookies and page lookups.

use std::time::Duration;

use chrono::Utc;
use common::{
    cookie_value, ids, ApiRequest, ApiResponse, ChallengeClient, CredentialProvider, Method,
    Scheduler, TickHandle, Transport, Widget, WidgetCell, WidgetConfig, WidgetError,
};
use dioxus::prelude::*;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

pub type BrowserClient = ChallengeClient<BrowserTransport, CookieJar>;

/// The repeating countdown task.
pub struct TaskTicker(Task);

impl TickHandle for TaskTicker {
    fn cancel(self) {
        self.0.cancel();
    }
}

/// The widget as held by the app. Copy, like the signal inside it.
#[derive(Clone, Copy)]
pub struct WidgetSignal(pub Signal<Widget<TaskTicker>>);

impl WidgetCell for WidgetSignal {
    type Handle = TaskTicker;

    fn update<R>(&self, f: impl FnOnce(&mut Widget<TaskTicker>) -> R) -> R {
        let mut signal = self.0;
        let mut widget = signal.write();
        f(&mut *widget)
    }
}

impl Scheduler for WidgetSignal {
    type Handle = TaskTicker;

    fn start(&self, period: Duration) -> TaskTicker {
        let widget = *self;
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        TaskTicker(spawn(async move {
            loop {
                TimeoutFuture::new(millis).await;
                widget.update(|w| w.tick(Utc::now()));
            }
        }))
    }
}

pub struct BrowserTransport;

impl Transport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, WidgetError> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

/// Reads the CSRF token from `document.cookie` on every request.
pub struct CookieJar {
    name: String,
}

impl CredentialProvider for CookieJar {
    fn csrf_token(&self) -> Option<String> {
        let cookies = web_sys::window()?
            .document()?
            .dyn_into::<HtmlDocument>()
            .ok()?
            .cookie()
            .ok()?;
        cookie_value(&cookies, &self.name)
    }
}

fn page_url() -> String {
    #[cfg(feature = "dev")]
    {
        "http://localhost:8000/problem/dev".to_string()
    }
    #[cfg(not(feature = "dev"))]
    {
        web_sys::window()
            .and_then(|window| window.location().href().ok())
            .unwrap_or_default()
    }
}

pub fn browser_client(config: &WidgetConfig) -> Result<BrowserClient, WidgetError> {
    let cookies = CookieJar {
        name: config.csrf_cookie.clone(),
    };
    ChallengeClient::new(&page_url(), BrowserTransport, cookies, config)
}

/// Widget settings embedded in the page as JSON, if any.
pub fn read_config() -> WidgetConfig {
    let embedded = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(ids::CONFIG))
        .and_then(|element| element.text_content());

    match embedded {
        Some(json) => WidgetConfig::from_json(&json).unwrap_or_else(|e| {
            warn!("ignoring malformed #{}: {}", ids::CONFIG, e);
            WidgetConfig::default()
        }),
        None => WidgetConfig::default(),
    }
}
