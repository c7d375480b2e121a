//! Typed client core for the Zaraz configuration API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values with a
//! stateless `ZarazClient`, and joins the two around a pluggable `Transport`
//! in `Dispatcher`, which also exposes the Zaraz v2 operations (config,
//! workflow, publish, history, default, export).
//!
//! # Design
//! - Responses arrive in the standard `{success, errors, messages, result}`
//!   envelope; `success: false` and non-2xx statuses become `ZarazError::Api`.
//! - The Zaraz config itself is an opaque `Document` whose numbers are always
//!   `f64`, so it round-trips without a schema.
//! - Each operation awaits exactly once, on the transport, raced against the
//!   caller's `Context` (cancellation token and deadline).
//! - Authentication and connection management belong to the `reqwest::Client`
//!   the caller hands to `ReqwestTransport`.
//!
//! # Example
//!
//! ```no_run
//! use zaraz_core::{ClientConfig, Context, Dispatcher, Identifier};
//!
//! # async fn example() -> Result<(), zaraz_core::ZarazError> {
//! let dispatcher = Dispatcher::from_config(&ClientConfig::new("https://api.cloudflare.com/client/v4"))?;
//! let zone = Identifier::zone("023e105f4ecef8ad9ca31a8372d0c353");
//!
//! let workflow = dispatcher.update_workflow(Context::background(), &zone, "preview").await?;
//! assert_eq!(workflow.result, "preview");
//!
//! dispatcher
//!     .publish_config(Context::background(), &zone, "Enable Google Analytics")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod document;
pub mod envelope;
pub mod error;
pub mod history;
pub mod http;
pub mod identifier;
pub mod transport;
pub mod zaraz;

pub use client::{RawConfig, ZarazClient};
pub use config::ClientConfig;
pub use context::Context;
pub use dispatcher::Dispatcher;
pub use document::{Document, Value};
pub use envelope::{decode_envelope, decode_envelope_or_bare, encode_body, Envelope, ResponseInfo};
pub use error::{Result, TransportError, ZarazError};
pub use history::{HistoryEntry, HistoryPage, HistoryParams, PageInfo};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use identifier::Identifier;
pub use transport::{ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
