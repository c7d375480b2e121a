//! Zaraz v2 resource operations.
//!
//! Each operation is the client's `build_*` half, one `execute`, then the
//! matching `parse_*` half, so the paths and payload shapes live only in
//! `ZarazClient`. None of them validate payloads: the service rejects malformed
//! input and the rejection comes back as `ZarazError::Api`.

use tracing::debug;

use crate::client::RawConfig;
use crate::context::Context;
use crate::dispatcher::{log_api_failure, Dispatcher};
use crate::document::Document;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::history::{HistoryEntry, HistoryParams, PageInfo};
use crate::identifier::Identifier;
use crate::transport::Transport;

impl<T: Transport> Dispatcher<T> {
    /// Fetch the current Zaraz configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use zaraz_core::{ClientConfig, Context, Dispatcher, Identifier};
    /// # async fn example() -> Result<(), zaraz_core::ZarazError> {
    /// let dispatcher = Dispatcher::from_config(&ClientConfig::from_env()?)?;
    /// let zone = Identifier::zone("023e105f4ecef8ad9ca31a8372d0c353");
    /// let config = dispatcher.get_config(Context::background(), &zone).await?;
    /// println!("version {:?}", config.result.get("zarazVersion"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_config(&self, ctx: Context, id: &Identifier) -> Result<Envelope<Document>> {
        let request = self.client().build_get_config(id)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_config(response).inspect_err(log_api_failure)
    }

    /// Replace the configuration. The service answers with the stored config.
    pub async fn update_config(
        &self,
        ctx: Context,
        id: &Identifier,
        config: &Document,
    ) -> Result<Envelope<Document>> {
        let request = self.client().build_update_config(id, config)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_config(response).inspect_err(log_api_failure)
    }

    /// Fetch the workflow mode (`realtime` or `preview`).
    pub async fn get_workflow(&self, ctx: Context, id: &Identifier) -> Result<Envelope<String>> {
        let request = self.client().build_get_workflow(id)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_workflow(response).inspect_err(log_api_failure)
    }

    /// Switch the workflow mode. The mode goes on the wire as a JSON string literal.
    pub async fn update_workflow(
        &self,
        ctx: Context,
        id: &Identifier,
        workflow: &str,
    ) -> Result<Envelope<String>> {
        let request = self.client().build_update_workflow(id, workflow)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_workflow(response).inspect_err(log_api_failure)
    }

    /// Publish the preview configuration with a description for the history.
    pub async fn publish_config(
        &self,
        ctx: Context,
        id: &Identifier,
        description: &str,
    ) -> Result<Envelope<String>> {
        let request = self.client().build_publish_config(id, description)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_publish_config(response).inspect_err(log_api_failure)
    }

    /// Fetch one page of publish history, in the order the service returns it.
    pub async fn list_history(
        &self,
        ctx: Context,
        id: &Identifier,
        params: HistoryParams,
    ) -> Result<(Vec<HistoryEntry>, PageInfo)> {
        let request = self.client().build_list_history(id, &params)?;
        let response = self.execute(ctx, request).await?;
        self.client()
            .parse_list_history(response, &params)
            .inspect_err(log_api_failure)
    }

    /// Walk every history page from the first, concatenating entries.
    ///
    /// Stops when the count says there is nothing left or a page comes back
    /// empty. Returns the `PageInfo` of the last page fetched.
    pub async fn list_history_all(
        &self,
        ctx: Context,
        id: &Identifier,
        per_page: Option<u32>,
    ) -> Result<(Vec<HistoryEntry>, PageInfo)> {
        let mut params = HistoryParams {
            page: Some(1),
            per_page,
        };
        let mut entries = Vec::new();
        loop {
            let (mut page_entries, info) = self.list_history(ctx.clone(), id, params).await?;
            let empty = page_entries.is_empty();
            entries.append(&mut page_entries);
            debug!(page = info.page, fetched = entries.len(), count = info.count, "history page fetched");

            match info.next() {
                Some(next) if !empty => params = next,
                _ => return Ok((entries, info)),
            }
        }
    }

    /// Fetch the service's default configuration as an unenveloped body.
    pub async fn get_default_config(&self, ctx: Context, id: &Identifier) -> Result<RawConfig> {
        let request = self.client().build_get_default_config(id)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_raw(response).inspect_err(log_api_failure)
    }

    /// Export the current configuration as an unenveloped body.
    pub async fn export_config(&self, ctx: Context, id: &Identifier) -> Result<RawConfig> {
        let request = self.client().build_export_config(id)?;
        let response = self.execute(ctx, request).await?;
        self.client().parse_raw(response).inspect_err(log_api_failure)
    }
}
