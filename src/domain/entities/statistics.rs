use super::record::{RecordListItem, DATE_FORMAT};
use crate::domain::errors::{DomainError, DomainResult};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of months covered by the trend line, including the requested month.
pub const TREND_MONTHS: u32 = 6;
/// Number of records in the per-month ranking.
pub const RANKING_LIMIT: i64 = 10;

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    pub fn parse(value: &str) -> DomainResult<Self> {
        let first_day = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
            .map_err(|_| {
                DomainError::ValidationError(format!("Invalid month '{}', expected YYYY-MM", value))
            })?;
        Ok(Self { first_day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    /// Inclusive `oper_date` bounds for range queries
    pub fn date_range(&self) -> (String, String) {
        (
            self.first_day.format(DATE_FORMAT).to_string(),
            self.last_day().format(DATE_FORMAT).to_string(),
        )
    }

    pub fn months_back(&self, count: u32) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(count))
                .unwrap_or(self.first_day),
        }
    }

    /// `YYYY-MM`
    pub fn label(&self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }

    /// The `count` months ending with this one, oldest first.
    pub fn trailing(&self, count: u32) -> Vec<Month> {
        (0..count).rev().map(|back| self.months_back(back)).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DayTotals {
    pub date: String,
    pub revenue_cents: i64,
    pub pay_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: String,
    pub date_text: String,
    pub revenue_cents: i64,
    pub pay_cents: i64,
    pub list: Vec<RecordListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthList {
    /// Month totals, only filled on the first page
    pub revenue_cents: i64,
    pub pay_cents: i64,
    pub days: Vec<DayGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub ranking: Vec<RecordListItem>,
    pub categories: Vec<CategoryShare>,
    pub trend: Vec<TrendPoint>,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthListQuery {
    pub month: String,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsQuery {
    pub kind: super::record::EntryKind,
    pub month: String,
}

/// `MM-DD` label of a stored `YYYY-MM-DD` date
pub fn day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}
