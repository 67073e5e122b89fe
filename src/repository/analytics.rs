use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{
    AnalyticsDailySummary, AssistantPerformanceDaily, CallSentimentAnalysis,
    NewAnalyticsDailySummary, NewAssistantPerformanceDaily, NewCallSentimentAnalysis,
};
use crate::schema::{analytics_daily_summary, assistant_performance_daily, call_sentiment_analysis};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupWriteOutcome {
    pub summary_written: bool,
    pub sentiment_written: bool,
    pub assistant_rows_written: usize,
}

impl RollupWriteOutcome {
    pub fn already_existed(&self) -> bool {
        !self.summary_written && !self.sentiment_written && self.assistant_rows_written == 0
    }
}

/// Rollups are written once per tenant and day; rows that already exist are
/// left untouched.
pub fn insert_daily_rollup(
    pool: &PgPool,
    summary: &NewAnalyticsDailySummary,
    sentiment: &NewCallSentimentAnalysis,
    performance: &[NewAssistantPerformanceDaily],
) -> Result<RollupWriteOutcome, DbError> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, DbError, _>(|conn| {
        let summary_rows = diesel::insert_into(analytics_daily_summary::table)
            .values(summary)
            .on_conflict_do_nothing()
            .execute(conn)?;

        let sentiment_rows = diesel::insert_into(call_sentiment_analysis::table)
            .values(sentiment)
            .on_conflict_do_nothing()
            .execute(conn)?;

        let assistant_rows = if performance.is_empty() {
            0
        } else {
            diesel::insert_into(assistant_performance_daily::table)
                .values(performance)
                .on_conflict_do_nothing()
                .execute(conn)?
        };

        Ok(RollupWriteOutcome {
            summary_written: summary_rows > 0,
            sentiment_written: sentiment_rows > 0,
            assistant_rows_written: assistant_rows,
        })
    })
}

pub fn list_daily_summaries(
    pool: &PgPool,
    tenant_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AnalyticsDailySummary>, DbError> {
    let conn = &mut pool.get()?;

    Ok(analytics_daily_summary::table
        .filter(analytics_daily_summary::tenant_id.eq(tenant_id))
        .filter(analytics_daily_summary::date.ge(from))
        .filter(analytics_daily_summary::date.le(to))
        .order(analytics_daily_summary::date.asc())
        .load::<AnalyticsDailySummary>(conn)?)
}

pub fn list_sentiment(
    pool: &PgPool,
    tenant_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<CallSentimentAnalysis>, DbError> {
    let conn = &mut pool.get()?;

    Ok(call_sentiment_analysis::table
        .filter(call_sentiment_analysis::tenant_id.eq(tenant_id))
        .filter(call_sentiment_analysis::date.ge(from))
        .filter(call_sentiment_analysis::date.le(to))
        .order(call_sentiment_analysis::date.asc())
        .load::<CallSentimentAnalysis>(conn)?)
}

pub fn list_assistant_performance(
    pool: &PgPool,
    tenant_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AssistantPerformanceDaily>, DbError> {
    let conn = &mut pool.get()?;

    Ok(assistant_performance_daily::table
        .filter(assistant_performance_daily::tenant_id.eq(tenant_id))
        .filter(assistant_performance_daily::date.ge(from))
        .filter(assistant_performance_daily::date.le(to))
        .order(assistant_performance_daily::date.asc())
        .load::<AssistantPerformanceDaily>(conn)?)
}
