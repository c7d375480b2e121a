//! The API's standard response wrapper.
//!
//! Every enveloped response has the shape
//! `{"success": bool, "errors": [...], "messages": [...], "result": ...}`.
//! Decoding happens in two steps: the outer shape first, then `result` as the
//! caller's type, only once `success` is known to be true. A failed envelope
//! may carry a `null` or malformed result, which must not mask its errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZarazError};

/// A diagnostic entry from `errors` or `messages`. Never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ResponseInfo {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A decoded response envelope around a result of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub errors: Vec<ResponseInfo>,
    pub messages: Vec<ResponseInfo>,
    pub result: T,
}

/// Outer shape only; `result` stays untyped until `success` is checked.
#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    errors: Vec<ResponseInfo>,
    #[serde(default)]
    messages: Vec<ResponseInfo>,
    #[serde(default)]
    result: serde_json::Value,
}

/// Decodes an enveloped body received with `status`.
///
/// `success: false` becomes `ZarazError::Api`. A body that is not JSON or has
/// no `success` field becomes `ZarazError::Decode`.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Envelope<T>> {
    let raw: RawEnvelope =
        serde_json::from_slice(body).map_err(|e| ZarazError::Decode(e.to_string()))?;

    if !raw.success {
        return Err(ZarazError::Api {
            status,
            errors: raw.errors,
            messages: raw.messages,
        });
    }

    let result = serde_json::from_value(raw.result)
        .map_err(|e| ZarazError::Decode(format!("result: {e}")))?;

    Ok(Envelope {
        success: true,
        errors: raw.errors,
        messages: raw.messages,
        result,
    })
}

/// Decodes a body that may or may not be enveloped.
///
/// A JSON object carrying `success` goes through `decode_envelope`. Any other
/// JSON body is decoded as a bare `T` and wrapped in a successful envelope
/// with empty `errors` and `messages`. Non-JSON is still `ZarazError::Decode`.
pub fn decode_envelope_or_bare<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<Envelope<T>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ZarazError::Decode(e.to_string()))?;
    if value.get("success").is_some() {
        return decode_envelope(status, body);
    }
    let result = serde_json::from_value(value).map_err(|e| ZarazError::Decode(e.to_string()))?;
    Ok(Envelope {
        success: true,
        errors: Vec::new(),
        messages: Vec::new(),
        result,
    })
}

/// Builds the `Api` error for a non-2xx response.
///
/// When the body is an envelope its `errors` are kept; otherwise a single
/// entry carrying the status and raw body stands in for them.
pub fn api_error_from_status(status: u16, body: &[u8]) -> ZarazError {
    match serde_json::from_slice::<RawEnvelope>(body) {
        Ok(raw) if !raw.errors.is_empty() => ZarazError::Api {
            status,
            errors: raw.errors,
            messages: raw.messages,
        },
        _ => ZarazError::Api {
            status,
            errors: vec![ResponseInfo::new(
                i64::from(status),
                String::from_utf8_lossy(body).into_owned(),
            )],
            messages: Vec::new(),
        },
    }
}

/// Serializes a request body. Strings become JSON string literals.
pub fn encode_body<B: Serialize + ?Sized>(payload: &B) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| ZarazError::Serialization(e.to_string()))
}
