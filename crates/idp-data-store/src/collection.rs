//! Entity collections held by the server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity collection of the persisted server state.
///
/// The serialized form is the member name used inside a data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Registered clients.
    Clients,
    /// Approved sites (user grants).
    Grants,
    /// Administrator-approved sites.
    WhitelistedSites,
    /// Blocked redirect URIs.
    BlacklistedSites,
    /// Authentication holders referenced by tokens.
    AuthenticationHolders,
    /// Access tokens.
    AccessTokens,
    /// Refresh tokens.
    RefreshTokens,
    /// System scopes.
    SystemScopes,
}

impl Collection {
    /// All collections, in export order.
    pub const ALL: [Collection; 8] = [
        Collection::Clients,
        Collection::Grants,
        Collection::WhitelistedSites,
        Collection::BlacklistedSites,
        Collection::AuthenticationHolders,
        Collection::AccessTokens,
        Collection::RefreshTokens,
        Collection::SystemScopes,
    ];

    /// Member name of the collection inside a data section.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Grants => "grants",
            Collection::WhitelistedSites => "whitelistedSites",
            Collection::BlacklistedSites => "blacklistedSites",
            Collection::AuthenticationHolders => "authenticationHolders",
            Collection::AccessTokens => "accessTokens",
            Collection::RefreshTokens => "refreshTokens",
            Collection::SystemScopes => "systemScopes",
        }
    }

    /// Parses a member name; exact, case-sensitive match.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
