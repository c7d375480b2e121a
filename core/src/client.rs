//! Stateless HTTP request builder and response parser for the Zaraz API.
//!
//! # Design
//! `ZarazClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! `Dispatcher` joins the two around a transport; hosts that do their own I/O
//! can call the halves directly.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::Document;
use crate::envelope::{
    api_error_from_status, decode_envelope, decode_envelope_or_bare, encode_body, Envelope,
};
use crate::error::{Result, ZarazError};
use crate::history::{HistoryEntry, HistoryPage, HistoryParams, PageInfo};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::identifier::Identifier;

pub const CONFIG_PATH: &str = "/settings/zaraz/v2/config";
pub const WORKFLOW_PATH: &str = "/settings/zaraz/v2/workflow";
pub const PUBLISH_PATH: &str = "/settings/zaraz/v2/publish";
pub const HISTORY_PATH: &str = "/settings/zaraz/v2/history";
pub const DEFAULT_PATH: &str = "/settings/zaraz/v2/default";
pub const EXPORT_PATH: &str = "/settings/zaraz/v2/export";

/// A configuration body returned outside the standard envelope.
///
/// The `default` and `export` endpoints do not promise JSON (they have been
/// seen answering `text/plain`), so the bytes are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    pub content_type: Option<String>,
    bytes: Vec<u8>,
}

impl RawConfig {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            content_type,
            bytes,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Best-effort decode of the body as a JSON object.
    pub fn to_document(&self) -> Result<Document> {
        serde_json::from_slice(&self.bytes).map_err(|e| ZarazError::Decode(e.to_string()))
    }
}

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct ZarazClient {
    base_url: String,
}

impl ZarazClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a request for an already identifier-prefixed `path`.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<HttpRequest> {
        let (headers, body) = match body {
            Some(payload) => (
                vec![("content-type".to_string(), "application/json".to_string())],
                Some(encode_body(payload)?),
            ),
            None => (Vec::new(), None),
        };
        let path = path.trim_start_matches('/');
        Ok(HttpRequest {
            method,
            url: format!("{}/{path}", self.base_url),
            query: query.to_vec(),
            headers,
            body,
        })
    }

    fn build_bodyless(&self, method: HttpMethod, path: &str) -> Result<HttpRequest> {
        self.build_request::<()>(method, path, &[], None)
    }

    pub fn build_get_config(&self, id: &Identifier) -> Result<HttpRequest> {
        self.build_bodyless(HttpMethod::Get, &id.resource_path(CONFIG_PATH)?)
    }

    pub fn build_update_config(&self, id: &Identifier, config: &Document) -> Result<HttpRequest> {
        self.build_request(HttpMethod::Put, &id.resource_path(CONFIG_PATH)?, &[], Some(config))
    }

    pub fn build_get_workflow(&self, id: &Identifier) -> Result<HttpRequest> {
        self.build_bodyless(HttpMethod::Get, &id.resource_path(WORKFLOW_PATH)?)
    }

    pub fn build_update_workflow(&self, id: &Identifier, workflow: &str) -> Result<HttpRequest> {
        self.build_request(HttpMethod::Put, &id.resource_path(WORKFLOW_PATH)?, &[], Some(workflow))
    }

    pub fn build_publish_config(&self, id: &Identifier, description: &str) -> Result<HttpRequest> {
        self.build_request(
            HttpMethod::Post,
            &id.resource_path(PUBLISH_PATH)?,
            &[],
            Some(description),
        )
    }

    pub fn build_list_history(&self, id: &Identifier, params: &HistoryParams) -> Result<HttpRequest> {
        let path = id.resource_path(HISTORY_PATH)?;
        let query = params.query_pairs()?;
        self.build_request::<()>(HttpMethod::Get, &path, &query, None)
    }

    pub fn build_get_default_config(&self, id: &Identifier) -> Result<HttpRequest> {
        self.build_bodyless(HttpMethod::Get, &id.resource_path(DEFAULT_PATH)?)
    }

    pub fn build_export_config(&self, id: &Identifier) -> Result<HttpRequest> {
        self.build_bodyless(HttpMethod::Get, &id.resource_path(EXPORT_PATH)?)
    }

    /// Checks the status, then decodes the envelope around `T`.
    pub fn parse_envelope<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Envelope<T>> {
        check_status(&response)?;
        decode_envelope(response.status, &response.body)
    }

    pub fn parse_config(&self, response: HttpResponse) -> Result<Envelope<Document>> {
        self.parse_envelope(response)
    }

    pub fn parse_workflow(&self, response: HttpResponse) -> Result<Envelope<String>> {
        self.parse_envelope(response)
    }

    pub fn parse_publish_config(&self, response: HttpResponse) -> Result<Envelope<String>> {
        self.parse_envelope(response)
    }

    /// Decodes one history page; `params` must be the ones the request was built with.
    ///
    /// The service has been seen answering with a bare `{count, data}` body as
    /// well as the enveloped form, so both are accepted.
    pub fn parse_list_history(
        &self,
        response: HttpResponse,
        params: &HistoryParams,
    ) -> Result<(Vec<HistoryEntry>, PageInfo)> {
        let (page, per_page) = params.resolve()?;
        check_status(&response)?;
        let envelope: Envelope<HistoryPage> =
            decode_envelope_or_bare(response.status, &response.body)?;
        let info = PageInfo::new(page, per_page, envelope.result.count);
        Ok((envelope.result.data, info))
    }

    /// Passes the body through after the status check, without envelope decoding.
    pub fn parse_raw(&self, response: HttpResponse) -> Result<RawConfig> {
        check_status(&response)?;
        let content_type = response.header("content-type").map(str::to_string);
        Ok(RawConfig::new(response.body, content_type))
    }
}

/// Map non-2xx responses to `ZarazError::Api`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(api_error_from_status(response.status, &response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Value;
    use crate::envelope::ResponseInfo;

    fn client() -> ZarazClient {
        ZarazClient::new("https://api.example.com/client/v4")
    }

    fn zone() -> Identifier {
        Identifier::zone("023e105f4ecef8ad9ca31a8372d0c353")
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn build_get_config_produces_correct_request() {
        let req = client().build_get_config(&zone()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://api.example.com/client/v4/zones/023e105f4ecef8ad9ca31a8372d0c353/settings/zaraz/v2/config"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
        assert!(req.query.is_empty());
    }

    #[test]
    fn build_update_config_sends_document() {
        let config: Document = [("debugKey", Value::from("cheese")), ("zarazVersion", 44.0.into())]
            .into_iter()
            .collect();
        let req = client().build_update_config(&zone(), &config).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["debugKey"], "cheese");
        assert_eq!(body["zarazVersion"], 44);
    }

    #[test]
    fn build_update_workflow_quotes_the_string() {
        let req = client().build_update_workflow(&zone(), "realtime").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.url.ends_with("/settings/zaraz/v2/workflow"));
        assert_eq!(req.body.as_deref(), Some("\"realtime\""));
    }

    #[test]
    fn build_publish_config_quotes_the_description() {
        let req = client()
            .build_publish_config(&zone(), "test description")
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.url.ends_with("/settings/zaraz/v2/publish"));
        assert_eq!(req.body.as_deref(), Some("\"test description\""));
    }

    #[test]
    fn build_list_history_carries_page_query() {
        let req = client()
            .build_list_history(&zone(), &HistoryParams::new(2, 25))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.url.ends_with("/settings/zaraz/v2/history"));
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("perPage".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn build_list_history_rejects_zero_page() {
        let err = client()
            .build_list_history(&zone(), &HistoryParams::new(0, 25))
            .unwrap_err();
        assert!(matches!(err, ZarazError::InvalidPagination(_)));
    }

    #[test]
    fn build_for_account_uses_account_prefix() {
        let req = client()
            .build_export_config(&Identifier::account("acc"))
            .unwrap();
        assert_eq!(
            req.url,
            "https://api.example.com/client/v4/accounts/acc/settings/zaraz/v2/export"
        );
    }

    #[test]
    fn build_with_blank_identifier_fails() {
        let err = client().build_get_default_config(&Identifier::zone("")).unwrap_err();
        assert!(matches!(err, ZarazError::MissingIdentifier));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ZarazClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        let req = client.build_get_workflow(&Identifier::zone("z")).unwrap();
        assert_eq!(req.url, "http://localhost:3000/zones/z/settings/zaraz/v2/workflow");
    }

    #[test]
    fn parse_config_success() {
        let response = json_response(
            200,
            r#"{"errors":[],"messages":[],"success":true,"result":{"zarazVersion":44,"dataLayer":true}}"#,
        );
        let envelope = client().parse_config(response).unwrap();
        assert!(envelope.success);
        assert!(envelope.errors.is_empty());
        assert!(envelope.messages.is_empty());
        assert_eq!(envelope.result.get("zarazVersion"), Some(&Value::Number(44.0)));
        assert_eq!(envelope.result.get("dataLayer"), Some(&Value::Bool(true)));
    }

    #[test]
    fn parse_workflow_failure_envelope() {
        let response = json_response(
            200,
            r#"{"errors":[{"code":1001,"message":"invalid workflow"}],"messages":[],"success":false,"result":null}"#,
        );
        let err = client().parse_workflow(response).unwrap_err();
        assert_eq!(err.api_errors(), &[ResponseInfo::new(1001, "invalid workflow")]);
    }

    #[test]
    fn parse_publish_wrong_status() {
        let response = json_response(500, "internal error");
        let err = client().parse_publish_config(response).unwrap_err();
        assert!(matches!(err, ZarazError::Api { status: 500, .. }));
    }

    #[test]
    fn parse_list_history_computes_page_info() {
        let response = json_response(
            200,
            r#"{"errors":[],"messages":[],"success":true,"result":{"count":1,"data":[
                {"createdAt":"2023-12-19T19:24:42.779683Z","description":"Moving to Preview & Publish workflow",
                 "id":1005135,"updatedAt":"2023-12-19T19:24:42.779683Z","userId":"9ceddf6f117afe04c64716c83468d3a4"}
            ]}}"#,
        );
        let (entries, info) = client()
            .parse_list_history(response, &HistoryParams::default())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1005135);
        assert_eq!(info.count, 1);
        assert!(!info.has_more);
    }

    #[test]
    fn parse_list_history_accepts_bare_page() {
        let response = json_response(
            200,
            r#"{"count":1,"data":[{"createdAt":"2023-12-19T19:24:42.779683Z","description":"Moving to Preview & Publish workflow","id":1005135,"updatedAt":"2023-12-19T19:24:42.779683Z","userId":"9ceddf6f117afe04c64716c83468d3a4"}]}"#,
        );
        let (entries, info) = client()
            .parse_list_history(response, &HistoryParams::default())
            .unwrap();
        assert_eq!(entries[0].id, 1005135);
        assert_eq!(info.count, 1);
        assert!(!info.has_more);
    }

    #[test]
    fn parse_list_history_failure_envelope_is_api_error() {
        let response = json_response(
            200,
            r#"{"success":false,"errors":[{"code":1002,"message":"no history"}],"result":null}"#,
        );
        let err = client()
            .parse_list_history(response, &HistoryParams::default())
            .unwrap_err();
        assert_eq!(err.api_errors(), &[ResponseInfo::new(1002, "no history")]);
    }

    #[test]
    fn parse_raw_passes_text_plain_through() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: br#"{"someTestKeyThatRepsTheConfig": "test"}"#.to_vec(),
        };
        let raw = client().parse_raw(response).unwrap();
        assert_eq!(raw.content_type.as_deref(), Some("text/plain"));
        let doc = raw.to_document().unwrap();
        assert_eq!(
            doc.get("someTestKeyThatRepsTheConfig").and_then(Value::as_str),
            Some("test")
        );
    }

    #[test]
    fn parse_raw_not_found() {
        let response = json_response(404, "");
        let err = client().parse_raw(response).unwrap_err();
        assert!(matches!(err, ZarazError::Api { status: 404, .. }));
    }

    #[test]
    fn parse_config_bad_json() {
        let response = json_response(200, "not json");
        let err = client().parse_config(response).unwrap_err();
        assert!(matches!(err, ZarazError::Decode(_)));
    }
}
