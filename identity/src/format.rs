//! National ID shape rules for the issuing country.

use crate::IdentityError;
use boda_types::NationalId;
use serde::{Deserialize, Serialize};

/// Fixed-prefix, bounded-length ID format. Defaults to Ugandan national IDs:
/// `CF` or `CM` followed by digits, 13 to 15 characters in total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdFormat {
    pub prefixes: Vec<String>,
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for IdFormat {
    fn default() -> Self {
        Self {
            prefixes: vec!["CF".into(), "CM".into()],
            min_len: 13,
            max_len: 15,
        }
    }
}

impl IdFormat {
    /// Trim and check `raw`. The error message never echoes the value.
    pub fn validate(&self, raw: &str) -> Result<NationalId, IdentityError> {
        let id = NationalId::new(raw);
        let value = id.as_str();

        if value.is_empty() {
            return Err(IdentityError::InvalidFormat("empty".into()));
        }
        if value.len() < self.min_len || value.len() > self.max_len {
            return Err(IdentityError::InvalidFormat(format!(
                "length {} outside {}..={}",
                value.len(),
                self.min_len,
                self.max_len
            )));
        }
        let Some(prefix) = self.prefixes.iter().find(|p| value.starts_with(p.as_str())) else {
            return Err(IdentityError::InvalidFormat(format!(
                "must start with one of {}",
                self.prefixes.join(", ")
            )));
        };
        if !value[prefix.len()..].bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentityError::InvalidFormat(
                "characters after the prefix must be digits".into(),
            ));
        }
        Ok(id)
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_prefixes() {
        let format = IdFormat::default();
        assert!(format.is_valid("CF12345678901"));
        assert!(format.is_valid("CM98765432109"));
        assert!(format.is_valid("  CM123456789012  "));
        assert_eq!(
            format.validate(" CF12345678901 ").unwrap().as_str(),
            "CF12345678901"
        );
    }

    #[test]
    fn rejects_bad_shapes() {
        let format = IdFormat::default();
        for bad in [
            "",
            "CF1234",
            "CF12345678901234",
            "XX12345678901",
            "cf12345678901",
            "CF1234567890A",
            "CF 2345678901",
        ] {
            assert!(
                matches!(format.validate(bad), Err(IdentityError::InvalidFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn error_does_not_echo_value() {
        let err = IdFormat::default().validate("XX12345678901").unwrap_err();
        assert!(!err.to_string().contains("XX12345678901"));
    }

    #[test]
    fn custom_format() {
        let format = IdFormat {
            prefixes: vec!["KE".into()],
            min_len: 10,
            max_len: 10,
        };
        assert!(format.is_valid("KE12345678"));
        assert!(!format.is_valid("CF12345678"));
    }
}
