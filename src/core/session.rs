//! Session context, roles and dashboard access
//!
//! Identity comes from an external auth provider. The only thing the rest of
//! the crate relies on is a stable user email plus display fields once the
//! user is signed in. The session is passed explicitly to whatever needs it.

use crate::core::error::StoreError;
use crate::core::store::RoleDirectory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display fields of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl UserIdentity {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            photo_url: None,
        }
    }
}

/// Who is using the client right now
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionContext {
    #[default]
    Anonymous,
    SignedIn(UserIdentity),
}

impl SessionContext {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionContext::SignedIn(user) => Some(user),
            SessionContext::Anonymous => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user().map(|user| user.email.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionContext::SignedIn(_))
    }
}

/// Marketplace role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Buyer,
    Seller,
    Admin,
}

impl Role {
    /// Parse a role name from the API; unknown names are buyers
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "seller" => Role::Seller,
            _ => Role::Buyer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Look up the role of the current session
///
/// Anonymous sessions have no role and trigger no network call.
pub async fn resolve_role<D>(
    directory: &D,
    session: &SessionContext,
) -> Result<Option<Role>, StoreError>
where
    D: RoleDirectory + ?Sized,
{
    let Some(email) = session.email() else {
        return Ok(None);
    };

    let role = directory.fetch_role(email).await?;
    tracing::debug!(email = %email, role = %role, "Resolved session role");
    Ok(Some(role))
}

/// Access policy for a page or operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone, signed in or not
    Public,

    /// Any signed-in user
    SignedIn,

    /// Signed-in user holding one of these roles
    HasRole(Vec<Role>),
}

impl AccessPolicy {
    pub fn check(&self, session: &SessionContext, role: Option<Role>) -> bool {
        match self {
            AccessPolicy::Public => true,
            AccessPolicy::SignedIn => session.is_signed_in(),
            AccessPolicy::HasRole(roles) => {
                session.is_signed_in() && role.is_some_and(|r| roles.contains(&r))
            }
        }
    }
}

/// Which dashboard a user lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    Buyer,
    Seller,
    Admin,
}

impl DashboardKind {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => DashboardKind::Admin,
            Role::Seller => DashboardKind::Seller,
            Role::Buyer => DashboardKind::Buyer,
        }
    }

    /// Policy guarding this dashboard
    pub fn policy(&self) -> AccessPolicy {
        match self {
            DashboardKind::Admin => AccessPolicy::HasRole(vec![Role::Admin]),
            DashboardKind::Seller => AccessPolicy::HasRole(vec![Role::Seller, Role::Admin]),
            DashboardKind::Buyer => AccessPolicy::SignedIn,
        }
    }
}
