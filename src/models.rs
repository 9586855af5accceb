use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

/// Stable `responseCode` values. `"0000"` is the only success code.
pub mod codes {
    pub const SUCCESS: &str = "0000";

    pub const BACKEND_STATUS: &str = "1001";
    pub const BACKEND_DECODE: &str = "1002";
    pub const BACKEND_TIMEOUT: &str = "1003";
    pub const BACKEND_UNREACHABLE: &str = "1004";
    pub const BACKEND_TRANSPORT: &str = "1005";

    pub const MISSING_IDENTITY: &str = "4001";
    pub const MISSING_DOMAIN: &str = "4002";
    pub const INVALID_DOMAIN: &str = "4003";
    pub const EMPTY_UTTERANCE: &str = "4004";
    pub const BAD_PAYLOAD: &str = "4005";

    pub const CLASSIFIER_UNAVAILABLE: &str = "5001";
    pub const TRANSCRIPTION_FAILED: &str = "5002";
    pub const AUDIO_DISABLED: &str = "5003";

    pub const INTERNAL: &str = "9999";
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[schema(example = "I need casual leave from 20/08/2025 to 22/08/2025 because of a family function")]
    pub text: String,
    /// Opaque identity blob forwarded to the backend; must carry `uid`
    #[serde(default, rename = "callerIdentity", alias = "OfficeContent")]
    #[schema(value_type = Object, example = json!({"ApiKey": "key", "uid": "E558947D-CBE0-4896-9C8F-4DD9628F6FEE"}))]
    pub caller_identity: Map<String, Value>,
    /// Call parameters; must carry `Domain`
    #[serde(default, rename = "callParams", alias = "Commonparam")]
    #[schema(value_type = Object, example = json!({"Domain": "http://10.25.25.124:82"}))]
    pub call_params: Map<String, Value>,
}

/// Query string of the audio endpoint: both blobs JSON-encoded.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AudioQuery {
    /// JSON-encoded caller identity
    #[serde(rename = "callerIdentity", alias = "OfficeContent")]
    pub caller_identity: Option<String>,
    /// JSON-encoded call parameters
    #[serde(rename = "callParams", alias = "Commonparam")]
    pub call_params: Option<String>,
}

/// Uniform response returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub response_code: String,
    pub response_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    pub fn success(data: impl Into<String>) -> Self {
        Self::failure(codes::SUCCESS, data)
    }

    pub fn failure(code: &str, data: impl Into<String>) -> Self {
        Self {
            response_code: code.to_string(),
            response_data: data.into(),
            message: None,
            extra: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.response_code == codes::SUCCESS
    }
}
