//! Well-known role names and the [`Role`] enum.
//!
//! The string constants must match the `role` claim issued by the identity
//! provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_SUPPLIER: &str = "supplier";
pub const ROLE_SD: &str = "sd";
pub const ROLE_MANAGER: &str = "manager";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Supplier,
    #[serde(rename = "sd")]
    SD,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Supplier => ROLE_SUPPLIER,
            Role::SD => ROLE_SD,
            Role::Manager => ROLE_MANAGER,
        }
    }

    /// SD staff and managers share every review power.
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::SD | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SUPPLIER => Ok(Role::Supplier),
            ROLE_SD => Ok(Role::SD),
            ROLE_MANAGER => Ok(Role::Manager),
            other => Err(CoreError::Unauthorized(format!("Unknown role '{other}'"))),
        }
    }
}
