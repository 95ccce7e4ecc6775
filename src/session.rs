//! Explicit session context for role-dependent behaviour.
//!
//! Callers pass a `Session` in instead of reading ambient storage. Role checks
//! here only shape what the interface offers; the backend enforces access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Listingadmin,
    Compatibilityadmin,
    Lister,
    Compatibilityeditor,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Listingadmin => "listingadmin",
            Self::Compatibilityadmin => "compatibilityadmin",
            Self::Lister => "lister",
            Self::Compatibilityeditor => "compatibilityeditor",
            Self::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Superadmin => "Super Admin",
            Self::Listingadmin => "Listing Admin",
            Self::Compatibilityadmin => "Compatibility Admin",
            Self::Lister => "Lister",
            Self::Compatibilityeditor => "Compatibility Editor",
            Self::Other => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, alias = "_id")]
    pub user_id: Option<String>,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: None,
            username: username.into(),
            role,
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn is_super(&self) -> bool {
        self.role == Role::Superadmin
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.role,
            Role::Superadmin | Role::Listingadmin | Role::Compatibilityadmin
        )
    }

    /// Role a newly created account receives when this session asks for
    /// `requested`.
    ///
    /// Superadmins get what they ask for, compatibility admins create
    /// compatibility editors, everyone else creates listers.
    pub fn creatable_role(&self, requested: Role) -> Role {
        match self.role {
            Role::Superadmin => requested,
            Role::Compatibilityadmin => Role::Compatibilityeditor,
            _ => Role::Lister,
        }
    }

    /// "username (role)" header text.
    pub fn badge(&self) -> String {
        format!("{} ({})", self.username, self.role)
    }
}
