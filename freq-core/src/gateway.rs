//! Outbound data requests with shared busy-indicator accounting.
//!
//! Every request increments a [`BusyCounter`]; the indicator is shown when the
//! count leaves zero and hidden when it returns to zero. The count is held by a
//! [`BusyToken`] that travels with the delivered response, so the indicator
//! stays up until the response has actually been applied to the page.
//!
//! Cookies are always sent. The CSRF header is only attached to requests
//! aimed at the dashboard's own origin.

use crate::error::{FreqError, Result};
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

/// Prefix of the message shown when a request fails.
pub const LOAD_ERROR_PREFIX: &str = "Error loading chart data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully prepared request, handed to the [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Query parameters for GET, form fields for POST.
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub with_credentials: bool,
    pub timeout_secs: u64,
}

/// The HTTP black box. Implementations resolve to the response body or fail
/// with a [`FreqError`] describing the transport or status problem.
pub trait Transport {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<String>>;

    /// The page's `document.cookie` string.
    fn cookies(&self) -> String {
        String::new()
    }
}

/// Busy indicator widget.
pub trait BusyIndicator {
    fn show(&self);
    fn hide(&self);
}

/// Counts outstanding requests and drives a [`BusyIndicator`].
#[derive(Clone)]
pub struct BusyCounter {
    count: Rc<Cell<usize>>,
    indicator: Rc<dyn BusyIndicator>,
}

impl BusyCounter {
    pub fn new(indicator: Rc<dyn BusyIndicator>) -> Self {
        Self {
            count: Rc::new(Cell::new(0)),
            indicator,
        }
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Register an outstanding request; the returned token settles it on drop.
    pub fn begin(&self) -> BusyToken {
        let next = self.count.get() + 1;
        self.count.set(next);
        if next == 1 {
            self.indicator.show();
        }
        BusyToken {
            counter: Some(self.clone()),
        }
    }

    fn settle(&self) {
        let next = self.count.get().saturating_sub(1);
        self.count.set(next);
        if next == 0 {
            self.indicator.hide();
        }
    }
}

/// One outstanding request. Dropping it (or calling [`BusyToken::settle`])
/// decrements the counter exactly once.
pub struct BusyToken {
    counter: Option<BusyCounter>,
}

impl BusyToken {
    /// A token not tied to any counter.
    pub fn detached() -> Self {
        Self { counter: None }
    }

    pub fn settle(mut self) {
        if let Some(counter) = self.counter.take() {
            counter.settle();
        }
    }
}

impl Drop for BusyToken {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            counter.settle();
        }
    }
}

impl std::fmt::Debug for BusyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyToken")
            .field("attached", &self.counter.is_some())
            .finish()
    }
}

/// A successful response together with its busy token.
#[derive(Debug)]
pub struct Delivered<T> {
    pub body: T,
    pub busy: BusyToken,
}

/// Decides which requests carry the CSRF header.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrfPolicy {
    /// Configured API host, bare (`demo.lizard.net`) or with a scheme.
    pub api_host: String,
    pub cookie_name: String,
    pub header_name: String,
}

impl CsrfPolicy {
    /// Relative URLs are always same-origin; absolute URLs must match the
    /// configured host (and its scheme, when one is configured).
    pub fn is_same_origin(&self, url: &str) -> bool {
        let Some((scheme, host)) = split_origin(url) else {
            return true;
        };
        match split_origin(&self.api_host) {
            Some((api_scheme, api_host)) => {
                api_scheme.eq_ignore_ascii_case(scheme) && api_host.eq_ignore_ascii_case(host)
            }
            None => {
                let bare = self.api_host.trim_end_matches('/');
                bare.eq_ignore_ascii_case(host)
            }
        }
    }

    /// The header to attach to `url`, if any.
    pub fn header_for(&self, url: &str, cookies: &str) -> Option<(String, String)> {
        if !self.is_same_origin(url) {
            return None;
        }
        let token = cookie_value(cookies, &self.cookie_name)?;
        Some((self.header_name.clone(), token))
    }
}

/// `(scheme, host[:port])` of an absolute http(s) URL.
fn split_origin(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return None;
    }
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    Some((scheme, host))
}

/// Look up `name` in a `document.cookie` style string.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
    })
}

/// Issues requests through a [`Transport`], keeping the busy counter and the
/// user-visible error message current.
pub struct Gateway<T> {
    transport: T,
    busy: BusyCounter,
    csrf: CsrfPolicy,
    timeout_secs: u64,
    last_error: Rc<RefCell<Option<String>>>,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T, busy: BusyCounter, csrf: CsrfPolicy, timeout_secs: u64) -> Self {
        Self {
            transport,
            busy,
            csrf,
            timeout_secs,
            last_error: Rc::new(RefCell::new(None)),
        }
    }

    pub fn busy(&self) -> &BusyCounter {
        &self.busy
    }

    /// The most recent failure message, until dismissed.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    pub fn dismiss_error(&self) {
        self.last_error.borrow_mut().take();
    }

    /// Attach credentials and, for same-origin targets, the CSRF header.
    pub fn prepare(&self, method: Method, url: &str, params: Vec<(String, String)>) -> ApiRequest {
        let headers = self
            .csrf
            .header_for(url, &self.transport.cookies())
            .into_iter()
            .collect();
        ApiRequest {
            method,
            url: url.to_string(),
            params,
            headers,
            with_credentials: true,
            timeout_secs: self.timeout_secs,
        }
    }

    /// Send one request. No retries; a failure settles the busy count and
    /// records a message for the user.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<Delivered<String>> {
        let request = self.prepare(method, url, params);
        log::debug!("{:?} {}", request.method, request.url);
        let busy = self.busy.begin();
        match self.transport.execute(request).await {
            Ok(body) => Ok(Delivered { body, busy }),
            Err(e) => {
                drop(busy);
                Err(self.fail(url, e))
            }
        }
    }

    /// [`Gateway::send`], then decode the body into an endpoint schema.
    pub async fn fetch_json<R: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<Delivered<R>> {
        let delivered = self.send(method, url, params).await?;
        match serde_json::from_str::<R>(&delivered.body) {
            Ok(body) => Ok(Delivered {
                body,
                busy: delivered.busy,
            }),
            Err(e) => {
                drop(delivered);
                Err(self.fail(url, FreqError::ResponseParse(e)))
            }
        }
    }

    fn fail(&self, url: &str, error: FreqError) -> FreqError {
        log::warn!("Request to {} failed: {}", url, error);
        *self.last_error.borrow_mut() = Some(format!("{}: {}", LOAD_ERROR_PREFIX, error));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingIndicator {
        events: RefCell<Vec<&'static str>>,
    }

    impl BusyIndicator for RecordingIndicator {
        fn show(&self) {
            self.events.borrow_mut().push("show");
        }
        fn hide(&self) {
            self.events.borrow_mut().push("hide");
        }
    }

    struct FakeTransport {
        reply: Result<String>,
        cookies: String,
        seen: RefCell<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        fn ok(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                cookies: "sessionid=abc; csrftoken=tok%3D1".to_string(),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(FreqError::Timeout(60)),
                ..Self::ok("")
            }
        }
    }

    impl Transport for FakeTransport {
        async fn execute(&self, request: ApiRequest) -> Result<String> {
            self.seen.borrow_mut().push(request);
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(FreqError::Transport(e.to_string())),
            }
        }

        fn cookies(&self) -> String {
            self.cookies.clone()
        }
    }

    fn policy(api_host: &str) -> CsrfPolicy {
        CsrfPolicy {
            api_host: api_host.to_string(),
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
        }
    }

    fn gateway(transport: FakeTransport) -> (Gateway<FakeTransport>, Rc<RecordingIndicator>) {
        let indicator = Rc::new(RecordingIndicator::default());
        let busy = BusyCounter::new(indicator.clone());
        (Gateway::new(transport, busy, policy("demo.lizard.net"), 60), indicator)
    }

    #[test]
    fn test_overlapping_tokens_settle_in_any_order() {
        let indicator = Rc::new(RecordingIndicator::default());
        let counter = BusyCounter::new(indicator.clone());
        for reverse in [false, true] {
            let a = counter.begin();
            let b = counter.begin();
            assert_eq!(counter.count(), 2);
            let (first, second) = if reverse { (b, a) } else { (a, b) };
            drop(first);
            assert!(counter.is_busy());
            second.settle();
            assert_eq!(counter.count(), 0);
        }
        assert_eq!(
            *indicator.events.borrow(),
            vec!["show", "hide", "show", "hide"]
        );
    }

    #[test]
    fn test_detached_token_never_underflows() {
        let indicator = Rc::new(RecordingIndicator::default());
        let counter = BusyCounter::new(indicator.clone());
        BusyToken::detached().settle();
        assert_eq!(counter.count(), 0);
        assert!(indicator.events.borrow().is_empty());
    }

    #[test]
    fn test_cookie_value_decodes() {
        let cookies = "a=1; csrftoken=x%2By ;b=2";
        assert_eq!(cookie_value(cookies, "csrftoken"), Some("x+y".to_string()));
        assert_eq!(cookie_value(cookies, "missing"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }

    #[test]
    fn test_same_origin_rules() {
        let bare = policy("demo.lizard.net");
        assert!(bare.is_same_origin("/trend_detection_data/"));
        assert!(bare.is_same_origin("https://demo.lizard.net/api/v2/"));
        assert!(!bare.is_same_origin("https://raster.lizard.net/wms"));

        let absolute = policy("https://demo.lizard.net");
        assert!(absolute.is_same_origin("https://demo.lizard.net/x"));
        assert!(!absolute.is_same_origin("http://demo.lizard.net/x"));
        assert!(absolute.is_same_origin("/locations/"));
    }

    #[tokio::test]
    async fn test_send_attaches_credentials_and_csrf() {
        let (gw, indicator) = gateway(FakeTransport::ok("{}"));
        let delivered = gw.send(Method::Get, "/map__data/", Vec::new()).await.unwrap();
        assert!(gw.busy().is_busy());
        drop(delivered);
        assert!(!gw.busy().is_busy());
        let seen = gw.transport.seen.borrow();
        assert!(seen[0].with_credentials);
        assert_eq!(seen[0].timeout_secs, 60);
        assert_eq!(
            seen[0].headers,
            vec![("X-CSRFToken".to_string(), "tok=1".to_string())]
        );
        assert_eq!(*indicator.events.borrow(), vec!["show", "hide"]);
    }

    #[tokio::test]
    async fn test_cross_origin_request_has_no_csrf_header() {
        let (gw, _) = gateway(FakeTransport::ok("{}"));
        gw.send(Method::Get, "https://raster.lizard.net/wms", Vec::new())
            .await
            .unwrap();
        assert!(gw.transport.seen.borrow()[0].headers.is_empty());
    }

    #[tokio::test]
    async fn test_failure_settles_and_records_message() {
        let (gw, indicator) = gateway(FakeTransport::failing());
        let err = gw.send(Method::Post, "/locations/", Vec::new()).await.unwrap_err();
        assert!(matches!(err, FreqError::Transport(_)));
        assert_eq!(gw.busy().count(), 0);
        let message = gw.last_error().unwrap();
        assert!(message.starts_with(LOAD_ERROR_PREFIX));
        assert!(message.contains("timed out"));
        assert_eq!(*indicator.events.borrow(), vec!["show", "hide"]);
        gw.dismiss_error();
        assert!(gw.last_error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_json_parse_error_settles() {
        let (gw, _) = gateway(FakeTransport::ok("not json"));
        let result = gw
            .fetch_json::<crate::api::StageResponse>(Method::Get, "/x_data/", Vec::new())
            .await;
        assert!(matches!(result, Err(FreqError::ResponseParse(_))));
        assert_eq!(gw.busy().count(), 0);
    }

    #[tokio::test]
    async fn test_two_outstanding_responses_keep_indicator() {
        let (gw, indicator) = gateway(FakeTransport::ok("{}"));
        let first = gw.send(Method::Get, "/a/", Vec::new()).await.unwrap();
        let second = gw.send(Method::Get, "/b/", Vec::new()).await.unwrap();
        drop(first);
        assert!(gw.busy().is_busy());
        drop(second);
        assert!(!gw.busy().is_busy());
        assert_eq!(*indicator.events.borrow(), vec!["show", "hide"]);
    }
}
