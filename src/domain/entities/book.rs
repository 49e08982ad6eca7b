use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum book title length in characters.
pub const BOOK_TITLE_MAX_CHARS: usize = 10;
pub const DEFAULT_BOOK_TITLE: &str = "Daily";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Book {
    pub fn new(owner_id: String, title: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A book as seen by one of its members.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub admin: bool,
    pub owner_id: String,
    pub owner_nickname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookMember {
    pub id: String,
    pub nickname: String,
    pub avatar: String,
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteCode {
    pub code: String,
    pub expires_in: i64,
}

/// Public information behind an invite code.
#[derive(Debug, Clone, Serialize)]
pub struct InviteInfo {
    pub book_id: String,
    pub title: String,
    pub nickname: String,
}

/// Result of joining a book through an invite code.
#[derive(Debug, Clone, Serialize)]
pub struct AttendResult {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Approved => write!(f, "approved"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(format!("Invalid application status: {}", s)),
        }
    }
}

/// Request to join a book, examined by the book owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookApplication {
    pub id: String,
    pub book_id: String,
    pub owner_id: String,
    pub applicant_id: String,
    pub comment: String,
    pub status: ApplicationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl BookApplication {
    pub fn new(book_id: String, owner_id: String, applicant_id: String, comment: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            book_id,
            owner_id,
            applicant_id,
            comment,
            status: ApplicationStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// DTOs for API requests

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModifyBookRequest {
    pub title: String,
    /// Members to keep. Members can only be removed this way, never added.
    #[serde(default)]
    pub member_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamineRequest {
    pub approve: bool,
}

/// Validate and normalize a book title
pub fn validate_book_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    let length = title.chars().count();
    if length == 0 || length > BOOK_TITLE_MAX_CHARS {
        return Err(DomainError::ValidationError(format!(
            "Book title must be between 1 and {} characters",
            BOOK_TITLE_MAX_CHARS
        )));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_book_title() {
        assert_eq!(validate_book_title("  Travel ").unwrap(), "Travel");
        assert!(matches!(
            validate_book_title(""),
            Err(DomainError::ValidationError(msg)) if msg.contains("between 1 and 10")
        ));
        assert!(validate_book_title("   ").is_err());
        assert!(validate_book_title("A very long book title").is_err());
        // Counted in characters, not bytes
        assert!(validate_book_title("家庭日常开销账本").is_ok());
    }

    #[test]
    fn test_application_status_round_trip() {
        let status: ApplicationStatus = "approved".parse().unwrap();
        assert_eq!(status, ApplicationStatus::Approved);
        assert_eq!(status.to_string(), "approved");
        assert!("accepted".parse::<ApplicationStatus>().is_err());
    }
}
