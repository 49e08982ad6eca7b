use crate::application::services::book_service::BookService;
use crate::domain::entities::{
    day_label, DayGroup, Month, MonthList, MonthListQuery, Statistics, StatisticsQuery,
    TrendPoint, RANKING_LIMIT, TREND_MONTHS,
};
use crate::domain::ports::record_repository::RecordRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Clone)]
pub struct StatisticsService {
    record_repo: Arc<dyn RecordRepository>,
    books: BookService,
}

impl StatisticsService {
    pub fn new(record_repo: Arc<dyn RecordRepository>, books: BookService) -> Self {
        Self { record_repo, books }
    }

    /// Records of one month grouped by day, newest day first. Month totals
    /// are only computed for the first page.
    pub async fn month_list(
        &self,
        user_id: &str,
        book_id: &str,
        query: &MonthListQuery,
    ) -> ApiResult<MonthList> {
        let month = Month::parse(&query.month)?;
        if query.page < 0 {
            return Err(ApiError::BadRequest("Page must not be negative".to_string()));
        }
        if query.page_size < 1 || query.page_size > MAX_PAGE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let offset = query
            .page
            .checked_mul(query.page_size)
            .ok_or_else(|| ApiError::BadRequest("Page is out of range".to_string()))?;

        self.books.member_book(user_id, book_id).await?;
        let (from, to) = month.date_range();

        let (revenue_cents, pay_cents) = if query.page == 0 {
            let totals = self.record_repo.range_totals(book_id, &from, &to).await?;
            (totals.revenue_cents, totals.pay_cents)
        } else {
            (0, 0)
        };

        let days = self
            .record_repo
            .day_totals(book_id, &from, &to, query.page_size, offset)
            .await?;

        let mut groups = Vec::with_capacity(days.len());
        for day in days {
            let list = self.record_repo.records_on(book_id, &day.date).await?;
            groups.push(DayGroup {
                date_text: day_label(&day.date),
                date: day.date,
                revenue_cents: day.revenue_cents,
                pay_cents: day.pay_cents,
                list,
            });
        }

        Ok(MonthList {
            revenue_cents,
            pay_cents,
            days: groups,
        })
    }

    pub async fn statistics(
        &self,
        user_id: &str,
        book_id: &str,
        query: &StatisticsQuery,
    ) -> ApiResult<Statistics> {
        let month = Month::parse(&query.month)?;
        self.books.member_book(user_id, book_id).await?;

        let (from, to) = month.date_range();
        let ranking = self
            .record_repo
            .top_records(book_id, query.kind, &from, &to, RANKING_LIMIT)
            .await?;
        let categories = self
            .record_repo
            .category_shares(book_id, query.kind, &from, &to)
            .await?;

        let mut trend = Vec::with_capacity(TREND_MONTHS as usize);
        for point in month.trailing(TREND_MONTHS) {
            let (start, end) = point.date_range();
            let amount_cents = self
                .record_repo
                .sum_kind(book_id, query.kind, &start, &end)
                .await?;
            trend.push(TrendPoint {
                month: point.label(),
                amount_cents,
            });
        }

        // The requested month closes the trend line
        let total_cents = trend.last().map_or(0, |p| p.amount_cents);

        Ok(Statistics {
            ranking,
            categories,
            trend,
            total_cents,
        })
    }
}
