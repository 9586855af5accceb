use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::gateway::{BackendFailure, CallContext, Endpoint, HrBackend};
use crate::models::codes;

/// reqwest-backed HR backend client. No retries.
#[derive(Debug, Clone)]
pub struct HrGateway {
    client: reqwest::Client,
    read_timeout: Duration,
    submit_timeout: Duration,
}

impl HrGateway {
    pub fn new(read_timeout: Duration, submit_timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            read_timeout,
            submit_timeout,
        })
    }

    fn timeout_for(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::SaveLeaveApplication => self.submit_timeout,
            _ => self.read_timeout,
        }
    }
}

#[async_trait]
impl HrBackend for HrGateway {
    async fn call(
        &self,
        ctx: &CallContext,
        endpoint: Endpoint,
        params: Value,
    ) -> Result<Value, BackendFailure> {
        let mut common = ctx.params.clone();
        if let Value::Object(extra) = params {
            common.extend(extra);
        }
        let office_content = Value::Object(ctx.identity.clone()).to_string();
        let common_param = Value::Object(common).to_string();

        let url = ctx.endpoint_url(endpoint);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(&[("OfficeContent", office_content), ("Commonparam", common_param)])
            .timeout(self.timeout_for(endpoint))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = endpoint.as_ref(), "HR backend call failed");
                transport_failure(&e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, endpoint = endpoint.as_ref(), "Failed to read HR backend response");
            transport_failure(&e)
        })?;

        debug!(
            endpoint = endpoint.as_ref(),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HR backend responded"
        );

        normalize(status, &body)
    }
}

fn transport_failure(e: &reqwest::Error) -> BackendFailure {
    let (code, summary) = if e.is_timeout() {
        (codes::BACKEND_TIMEOUT, "The HR system took too long to respond")
    } else if e.is_connect() {
        (codes::BACKEND_UNREACHABLE, "Unable to connect to the HR system")
    } else {
        (codes::BACKEND_TRANSPORT, "HR system request failed")
    };
    BackendFailure {
        code,
        summary: summary.to_string(),
        details: e.to_string(),
    }
}

/// 200 + JSON is success. A JSON string body is decoded once more, since
/// the backend sometimes double-encodes; a string that is not itself JSON
/// is kept as a plain string value.
pub fn normalize(status: u16, body: &str) -> Result<Value, BackendFailure> {
    if status != 200 {
        return Err(BackendFailure {
            code: codes::BACKEND_STATUS,
            summary: format!("HR system returned HTTP {status}"),
            details: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| BackendFailure {
        code: codes::BACKEND_DECODE,
        summary: format!("HR system returned an unreadable response: {e}"),
        details: body.to_string(),
    })?;

    match value {
        Value::String(inner) => Ok(serde_json::from_str(&inner).unwrap_or(Value::String(inner))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway() -> HrGateway {
        HrGateway::new(Duration::from_secs(2), Duration::from_millis(300)).unwrap()
    }

    fn context(server: &MockServer) -> CallContext {
        context_at(&server.uri())
    }

    fn context_at(domain: &str) -> CallContext {
        let mut identity = Map::new();
        identity.insert("ApiKey".into(), json!("k"));
        identity.insert("uid".into(), json!("u-1"));
        let mut params = Map::new();
        params.insert("Domain".into(), json!(domain));
        params.insert("CompanyID".into(), json!(3));
        CallContext::resolve(identity, params, "/api/AjaxAPI").unwrap()
    }

    fn query_json(request: &wiremock::Request, key: &str) -> Value {
        let raw = request
            .url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn normalize_accepts_plain_and_double_encoded_json() {
        assert_eq!(normalize(200, r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(normalize(200, r#""{\"a\":1}""#).unwrap(), json!({"a": 1}));
        assert_eq!(normalize(200, r#""Saved""#).unwrap(), json!("Saved"));
    }

    #[test]
    fn normalize_rejects_bad_status_and_bodies() {
        let err = normalize(500, "boom").unwrap_err();
        assert_eq!(err.code, codes::BACKEND_STATUS);
        assert_eq!(err.details, "boom");

        let err = normalize(200, "<html>").unwrap_err();
        assert_eq!(err.code, codes::BACKEND_DECODE);
        assert_eq!(err.details, "<html>");
    }

    #[tokio::test]
    async fn sends_both_blobs_as_json_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/AjaxAPI/GetHolidayList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"HolidayName": "Diwali"}])))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let value = gateway()
            .call(&ctx, Endpoint::GetHolidayList, json!({"Year": 2026}))
            .await
            .unwrap();
        assert_eq!(value, json!([{"HolidayName": "Diwali"}]));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(query_json(&requests[0], "OfficeContent"), json!({"ApiKey": "k", "uid": "u-1"}));
        assert_eq!(query_json(&requests[0], "Commonparam"), json!({"CompanyID": 3, "Year": 2026}));
    }

    #[tokio::test]
    async fn double_encoded_body_is_decoded() {
        let server = MockServer::start().await;
        let inner = json!({"Status": "Saved"}).to_string();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(inner)))
            .mount(&server)
            .await;

        let value = gateway()
            .call(&context(&server), Endpoint::GetLeavePolicy, json!({}))
            .await
            .unwrap();
        assert_eq!(value, json!({"Status": "Saved"}));
    }

    #[tokio::test]
    async fn non_200_carries_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = gateway()
            .call(&context(&server), Endpoint::GetLeaveBalance, json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::BACKEND_STATUS);
        assert_eq!(err.details, "maintenance");
    }

    #[tokio::test]
    async fn submission_is_bounded_by_its_own_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(1)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = gateway()
            .call(&context(&server), Endpoint::SaveLeaveApplication, json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::BACKEND_TIMEOUT);
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_not_raised() {
        // nothing listens on a port released by the OS
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let ctx = context_at(&format!("http://127.0.0.1:{port}"));

        let err = gateway()
            .call(&ctx, Endpoint::GetLeaveBalance, json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::BACKEND_UNREACHABLE, "{err:?}");
    }
}
