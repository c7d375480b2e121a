//! Zone or account reference used to prefix resource paths.

use std::fmt;

use crate::error::{Result, ZarazError};

/// The container a Zaraz resource lives under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Zone(String),
    Account(String),
}

impl Identifier {
    pub fn zone(id: impl Into<String>) -> Self {
        Identifier::Zone(id.into())
    }

    pub fn account(id: impl Into<String>) -> Self {
        Identifier::Account(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            Identifier::Zone(id) | Identifier::Account(id) => id,
        }
    }

    fn segment(&self) -> &'static str {
        match self {
            Identifier::Zone(_) => "zones",
            Identifier::Account(_) => "accounts",
        }
    }

    /// `/zones/{id}` or `/accounts/{id}`. Fails when the id is blank.
    pub fn path_prefix(&self) -> Result<String> {
        let id = self.id().trim();
        if id.is_empty() {
            return Err(ZarazError::MissingIdentifier);
        }
        Ok(format!("/{}/{id}", self.segment()))
    }

    /// The prefix joined with a resource suffix such as `/settings/zaraz/v2/config`.
    pub fn resource_path(&self, suffix: &str) -> Result<String> {
        let prefix = self.path_prefix()?;
        let suffix = suffix.trim_start_matches('/');
        Ok(format!("{prefix}/{suffix}"))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.segment(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_prefix() {
        let id = Identifier::zone("023e105f4ecef8ad9ca31a8372d0c353");
        assert_eq!(
            id.path_prefix().unwrap(),
            "/zones/023e105f4ecef8ad9ca31a8372d0c353"
        );
    }

    #[test]
    fn account_resource_path() {
        let id = Identifier::account("01a7362d577a6c3019a474fd6f485823");
        assert_eq!(
            id.resource_path("/settings/zaraz/v2/config").unwrap(),
            "/accounts/01a7362d577a6c3019a474fd6f485823/settings/zaraz/v2/config"
        );
        assert_eq!(
            id.resource_path("settings/zaraz/v2/config").unwrap(),
            "/accounts/01a7362d577a6c3019a474fd6f485823/settings/zaraz/v2/config"
        );
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(matches!(
            Identifier::zone("").path_prefix(),
            Err(ZarazError::MissingIdentifier)
        ));
        assert!(matches!(
            Identifier::account("  ").resource_path("/settings/zaraz/v2/config"),
            Err(ZarazError::MissingIdentifier)
        ));
    }

    #[test]
    fn display_names_container() {
        assert_eq!(Identifier::zone("abc").to_string(), "zones/abc");
    }
}
