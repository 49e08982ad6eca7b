use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// Periodic report subscription of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub weekly: bool,
    pub monthly: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub weekly: bool,
    #[serde(default)]
    pub monthly: bool,
}

/// Validate a report address and normalize it to lowercase.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(DomainError::ValidationError(
            "Invalid email format. Must be in format user@domain.tld".to_string(),
        ));
    }

    // Require a TLD after the @
    let has_tld = trimmed
        .rsplit_once('@')
        .map_or(false, |(_, domain)| domain.contains('.'));
    if !has_tld {
        return Err(DomainError::ValidationError(
            "Invalid email format. Domain must include a TLD".to_string(),
        ));
    }

    Ok(trimmed.to_lowercase())
}
