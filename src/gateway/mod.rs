//! Outbound HR backend calls. Every call is one GET carrying two
//! JSON-encoded query parameters: `OfficeContent` (caller identity,
//! forwarded verbatim) and `Commonparam` (call parameters).

pub mod client;
pub mod queries;
pub mod submission;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use strum_macros::AsRefStr;

use crate::error::AppError;
use crate::models::Envelope;

pub use client::HrGateway;

#[derive(Debug, Copy, Clone, Eq, PartialEq, AsRefStr)]
pub enum Endpoint {
    SaveLeaveApplication,
    GetLeaveBalance,
    GetHolidayList,
    GetPayrollPeriodList,
    GetSalarySlip,
    GetLeavePolicy,
}

/// Per-request backend target plus the blobs to forward.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    /// API root, e.g. `http://10.25.25.124:82/api/AjaxAPI`
    pub root: String,
    pub identity: Map<String, Value>,
    /// Caller's call parameters, minus `Domain`
    pub params: Map<String, Value>,
}

impl CallContext {
    /// Resolves `Domain` from the call parameters. A bare host gets `api_path`
    /// appended; a full API root is used as given.
    pub fn resolve(
        identity: Map<String, Value>,
        mut params: Map<String, Value>,
        api_path: &str,
    ) -> Result<Self, AppError> {
        let domain = params
            .remove("Domain")
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingDomain)?;

        let with_scheme = if domain.contains("://") {
            domain.clone()
        } else {
            format!("http://{domain}")
        };

        let url = Url::parse(&with_scheme).map_err(|e| AppError::InvalidDomain(format!("{domain}: {e}")))?;
        match url.host_str() {
            Some(host) if !host.is_empty() && host != url.scheme() => {}
            _ => return Err(AppError::InvalidDomain(domain)),
        }

        let mut root = with_scheme.trim_end_matches('/').to_string();
        if url.path().is_empty() || url.path() == "/" {
            root.push_str(api_path);
        }

        Ok(Self {
            root,
            identity,
            params,
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.root.trim_end_matches('/'), endpoint.as_ref())
    }
}

/// A backend call that did not yield usable JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub code: &'static str,
    pub summary: String,
    /// Raw response text or transport error, for diagnostics
    pub details: String,
}

impl From<BackendFailure> for Envelope {
    fn from(failure: BackendFailure) -> Self {
        Envelope::failure(failure.code, failure.summary).with("details", failure.details)
    }
}

#[async_trait]
pub trait HrBackend: Send + Sync {
    /// `params` (a JSON object) is merged over the caller's call parameters
    /// to form `Commonparam`. Attempted exactly once.
    async fn call(
        &self,
        ctx: &CallContext,
        endpoint: Endpoint,
        params: Value,
    ) -> Result<Value, BackendFailure>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records calls and replays queued replies (default: `{}`).
    #[derive(Default)]
    pub struct FakeBackend {
        pub calls: Mutex<Vec<(Endpoint, Value)>>,
        replies: Mutex<VecDeque<Result<Value, BackendFailure>>>,
    }

    impl FakeBackend {
        pub fn reply(&self, reply: Result<Value, BackendFailure>) -> &Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn calls(&self) -> Vec<(Endpoint, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HrBackend for FakeBackend {
        async fn call(
            &self,
            _ctx: &CallContext,
            endpoint: Endpoint,
            params: Value,
        ) -> Result<Value, BackendFailure> {
            self.calls.lock().unwrap().push((endpoint, params));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Value::Object(Map::new())))
        }
    }

    pub fn context() -> CallContext {
        CallContext {
            root: "http://hr.test/api/AjaxAPI".into(),
            identity: Map::new(),
            params: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(domain: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("Domain".into(), domain);
        map.insert("CompanyID".into(), json!(7));
        map
    }

    #[test]
    fn bare_host_gets_api_path() {
        let ctx = CallContext::resolve(Map::new(), params(json!("10.25.25.124:82")), "/api/AjaxAPI").unwrap();
        assert_eq!(ctx.root, "http://10.25.25.124:82/api/AjaxAPI");
        assert_eq!(
            ctx.endpoint_url(Endpoint::SaveLeaveApplication),
            "http://10.25.25.124:82/api/AjaxAPI/SaveLeaveApplication"
        );
    }

    #[test]
    fn full_api_root_is_kept() {
        let ctx =
            CallContext::resolve(Map::new(), params(json!("https://hr.example.com/api/AjaxAPI/")), "/api/AjaxAPI")
                .unwrap();
        assert_eq!(ctx.root, "https://hr.example.com/api/AjaxAPI");
    }

    #[test]
    fn domain_is_not_forwarded() {
        let ctx = CallContext::resolve(Map::new(), params(json!("http://hr.local")), "/api/AjaxAPI").unwrap();
        assert!(ctx.params.get("Domain").is_none());
        assert_eq!(ctx.params["CompanyID"], 7);
    }

    #[test]
    fn missing_or_blank_domain_fails_fast() {
        for domain in [json!(""), json!("   "), json!(42), Value::Null] {
            let err = CallContext::resolve(Map::new(), params(domain), "/api/AjaxAPI").unwrap_err();
            assert!(matches!(err, AppError::MissingDomain));
        }
        let err = CallContext::resolve(Map::new(), Map::new(), "/api/AjaxAPI").unwrap_err();
        assert!(matches!(err, AppError::MissingDomain));
    }

    #[test]
    fn unparsable_domain_is_rejected() {
        for domain in ["http://", "https:///", "http:", "http://http:"] {
            let err = CallContext::resolve(Map::new(), params(json!(domain)), "/api/AjaxAPI").unwrap_err();
            assert!(matches!(err, AppError::InvalidDomain(_)), "{domain} accepted");
        }
    }

    #[test]
    fn failure_becomes_envelope_with_details() {
        let envelope: Envelope = BackendFailure {
            code: crate::models::codes::BACKEND_STATUS,
            summary: "HTTP 500".into(),
            details: "oops".into(),
        }
        .into();
        assert_eq!(envelope.response_code, "1001");
        assert_eq!(envelope.extra["details"], "oops");
    }
}
