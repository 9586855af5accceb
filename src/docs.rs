use crate::models::AnalyzeRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Assistant API",
        version = "1.0.0",
        description = r#"
## HR Conversational Assistant

Accepts a free-form HR request as text or speech, classifies its intent and
either answers it or walks the employee through a short leave application.

### 🔹 What it understands
- **Leave applications**
  - Type, dates and reason are collected over as many messages as needed
  - Submitted to the HR system once all three are known
- **Leave balance**, overall or per leave type
- **Upcoming holidays**
- **Payslips**, latest or for a named month
- **Leave policy**

### 📦 Response Format
Every response is an envelope:
`{ "responseCode": "0000", "responseData": "...", "message": "...", ... }`.
`"0000"` is success; any other code is a failure with a stable meaning.

### 🔗 Caller blobs
- `callerIdentity` must carry `uid`; it is forwarded to the HR system verbatim
- `callParams` must carry `Domain`, the HR system's host or API root

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::assistant::analyze,
        crate::api::assistant::analyze_audio
    ),
    components(schemas(AnalyzeRequest)),
    tags(
        (name = "Assistant", description = "Conversational HR requests"),
    )
)]
pub struct ApiDoc;
