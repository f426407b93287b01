//! Institution constants written into every NC file.

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// Identity of the institution submitting the files.
///
/// Defaults match the values the desk has always used; a JSON file can
/// override any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssuerProfile {
    /// Participant name in the NC header (up to 20 characters).
    pub participant_name: String,
    /// Registrar account of the issuer (8 digits).
    pub registrar_account: String,
    /// Bookkeeper account (8 digits).
    pub bookkeeper_account: String,
    /// Guarantor written when the row leaves it blank.
    pub default_guarantor: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            participant_name: "LIMINETRUSTDTVM".to_string(),
            registrar_account: "33738404".to_string(),
            bookkeeper_account: "33738002".to_string(),
            default_guarantor: "NAO HA".to_string(),
        }
    }
}

impl IssuerProfile {
    /// Reject values that cannot fit their fields.
    pub fn validate(&self) -> Result<()> {
        let account = |name: &str, value: &str| {
            if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
                Ok(())
            } else {
                Err(FormatError::invalid_value(name, value, "expected 8 digits"))
            }
        };
        account("registrar_account", &self.registrar_account)?;
        account("bookkeeper_account", &self.bookkeeper_account)?;

        let name = self.participant_name.trim();
        if name.is_empty() || !name.is_ascii() || name.len() > 20 {
            return Err(FormatError::invalid_value(
                "participant_name",
                name,
                "expected 1 to 20 ASCII characters",
            ));
        }
        Ok(())
    }
}
