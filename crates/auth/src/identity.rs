//! Identity claims as handed over by the sign-in provider.

use serde::{Deserialize, Serialize};

/// What we know about a principal after a successful sign-in. The
/// `principal_id` is the provider's opaque subject identifier and is
/// the only field guaranteed to be present and stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub principal_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
}

impl IdentityClaims {
    /// Split the provider display name into first/last parts for a
    /// fresh profile. A single-word name becomes the first name with an
    /// empty last name.
    pub fn name_parts(&self) -> (String, String) {
        let full = self.display_name.as_deref().unwrap_or_default().trim();
        match full.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (full.to_string(), String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(name: Option<&str>) -> IdentityClaims {
        IdentityClaims {
            principal_id: "principal-1".to_string(),
            email: None,
            display_name: name.map(str::to_string),
            photo_url: None,
            phone: None,
        }
    }

    #[test]
    fn test_name_parts() {
        assert_eq!(
            claims(Some("Asha Patel")).name_parts(),
            ("Asha".to_string(), "Patel".to_string())
        );
        assert_eq!(
            claims(Some("Asha Meera Patel")).name_parts(),
            ("Asha".to_string(), "Meera Patel".to_string())
        );
        assert_eq!(claims(Some("Asha")).name_parts(), ("Asha".to_string(), String::new()));
        assert_eq!(claims(None).name_parts(), (String::new(), String::new()));
    }
}
