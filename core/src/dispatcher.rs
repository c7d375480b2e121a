//! Issues one HTTP call per logical operation and decodes the result.
//!
//! # Design
//! `Dispatcher` pairs the stateless `ZarazClient` with a `Transport`. The only
//! await point is the transport call, raced against the caller's cancellation
//! token and deadline; whichever loses is dropped, so a cancelled request never
//! yields a partially decoded result. No retries, no caching.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::{RawConfig, ZarazClient};
use crate::config::ClientConfig;
use crate::context::Context;
use crate::envelope::Envelope;
use crate::error::{Result, TransportError, ZarazError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};

/// Request dispatcher bound to one base URL and one transport.
///
/// Holds no per-call state, so a single instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    client: ZarazClient,
    transport: T,
}

impl Dispatcher<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(ZarazClient::new(&config.base_url), transport))
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(client: ZarazClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ZarazClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `body` (if any) to `path` and decodes the enveloped `R` result.
    ///
    /// `path` must already carry the identifier prefix.
    pub async fn send<R, B>(
        &self,
        ctx: Context,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<Envelope<R>>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.build_request(method, path, query, body)?;
        let response = self.execute(ctx, request).await?;
        self.client.parse_envelope(response).inspect_err(log_api_failure)
    }

    /// Like `send` without a body, returning the raw bytes instead of an envelope.
    pub async fn send_raw(&self, ctx: Context, method: HttpMethod, path: &str) -> Result<RawConfig> {
        let request = self.client.build_request::<()>(method, path, &[], None)?;
        let response = self.execute(ctx, request).await?;
        self.client.parse_raw(response).inspect_err(log_api_failure)
    }

    /// Runs one prepared request through the transport under `ctx`.
    pub async fn execute(&self, ctx: Context, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        if ctx.is_cancelled() {
            debug!(%method, %url, "request cancelled before dispatch");
            return Err(TransportError::Cancelled.into());
        }
        if ctx.is_expired() {
            debug!(%method, %url, "deadline passed before dispatch");
            return Err(TransportError::Timeout.into());
        }

        debug!(%method, %url, query = ?request.query, "dispatching request");
        let outcome = tokio::select! {
            biased;
            _ = ctx.token().cancelled() => Err(TransportError::Cancelled),
            _ = ctx.expired() => Err(TransportError::Timeout),
            result = self.transport.execute(request) => result,
        };

        match outcome {
            Ok(response) => {
                debug!(%method, %url, status = response.status, bytes = response.body.len(), "received response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "request did not complete");
                Err(ZarazError::Transport(err))
            }
        }
    }
}

pub(crate) fn log_api_failure(err: &ZarazError) {
    match err {
        ZarazError::Api { status, errors, .. } => {
            warn!(status, errors = ?errors, "API reported failure");
        }
        ZarazError::Decode(reason) => {
            warn!(%reason, "response could not be decoded");
        }
        _ => {}
    }
}
