use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used for `oper_date` columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Income => write!(f, "income"),
            EntryKind::Expense => write!(f, "expense"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            "other" => Ok(EntryKind::Other),
            _ => Err(format!("Invalid entry kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub book_id: String,
    pub category_id: String,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub oper_date: String,
    pub comment: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated record content shared by create and edit.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub book_id: String,
    pub category_id: String,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub oper_date: chrono::NaiveDate,
    pub comment: String,
    pub images: Vec<String>,
}

impl RecordDraft {
    pub fn into_record(self, user_id: String) -> (Record, Vec<String>) {
        let now = chrono::Utc::now().to_rfc3339();
        let record = Record {
            id: Uuid::new_v4().to_string(),
            book_id: self.book_id,
            category_id: self.category_id,
            user_id,
            kind: self.kind,
            amount_cents: self.amount_cents,
            oper_date: self.oper_date.format(DATE_FORMAT).to_string(),
            comment: self.comment,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        (record, self.images)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAnnex {
    pub id: String,
    pub record_id: String,
    pub asset: String,
    pub created_at: String,
}

impl RecordAnnex {
    pub fn new(record_id: &str, asset: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            record_id: record_id.to_string(),
            asset,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Record with its category and author resolved, as shown on the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetail {
    pub id: String,
    pub book_id: String,
    pub category_id: String,
    pub category_title: String,
    pub icon: String,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub oper_date: String,
    pub date_text: String,
    pub comment: String,
    pub user_id: String,
    pub user: String,
    pub images: Vec<String>,
}

/// Compact record row used in day lists and rankings.
#[derive(Debug, Clone, Serialize)]
pub struct RecordListItem {
    pub id: String,
    pub amount_cents: i64,
    pub comment: String,
    pub kind: EntryKind,
    pub icon: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordRequest {
    pub book_id: String,
    pub category_id: String,
    pub kind: EntryKind,
    pub amount_cents: i64,
    /// `YYYY-MM-DD`, today when absent
    pub date: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
}


/// Human-readable form of a stored `YYYY-MM-DD` date, e.g. `Mar 07, Thursday`.
pub fn describe_date(date: &str) -> String {
    chrono::NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(|d| d.format("%b %d, %A").to_string())
        .unwrap_or_else(|_| date.to_string())
}
