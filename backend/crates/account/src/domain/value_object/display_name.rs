//! Display Name Value Object

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, AccountResult};

/// Trimmed, non-empty, printable display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{value}")]
pub struct DisplayName {
    value: String,
}

impl DisplayName {
    pub fn new(raw: &str, max_chars: usize) -> AccountResult<Self> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(AccountError::Validation("Display name cannot be empty".into()));
        }
        if value.chars().count() > max_chars {
            return Err(AccountError::Validation(format!(
                "Display name must be at most {} characters",
                max_chars
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(AccountError::Validation(
                "Display name contains control characters".into(),
            ));
        }

        Ok(Self {
            value: value.to_string(),
        })
    }

    pub fn from_db(value: String) -> Self {
        Self { value }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}
