use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Europe::London;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::domain::enums::{CallResult, Sentiment};
use crate::models::{
    Appointment, CallLog, NewAnalyticsDailySummary, NewAssistantPerformanceDaily,
    NewCallSentimentAnalysis,
};
use crate::repository::analytics::{insert_daily_rollup, RollupWriteOutcome};
use crate::repository::appointments::list_appointments_booked_between;
use crate::repository::call_logs::list_call_logs_between;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRollup {
    pub summary: NewAnalyticsDailySummary,
    pub sentiment: NewCallSentimentAnalysis,
    pub performance: Vec<NewAssistantPerformanceDaily>,
}

#[derive(Default)]
struct AssistantTally {
    calls: i64,
    passed: i64,
    duration: i64,
    booked: i64,
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}

fn average(total: i64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// UTC bounds `[start, end)` of a UK calendar day.
pub fn uk_day_bounds(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let to_utc = |day: NaiveDate| {
        day.and_hms_opt(0, 0, 0)?
            .and_local_timezone(London)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    };
    Some((to_utc(date)?, to_utc(date.succ_opt()?)?))
}

/// Builds the three daily rollups from one day's raw history.
///
/// `success_rate` is a fraction in `0.0..=1.0`. Cancelled appointments are
/// not counted as bookings.
pub fn compute_daily_rollup(
    tenant_id: Uuid,
    date: NaiveDate,
    calls: &[CallLog],
    appointments: &[Appointment],
) -> DailyRollup {
    let mut successful = 0i64;
    let mut failed = 0i64;
    let mut total_duration = 0i64;
    let (mut positive, mut neutral, mut negative) = (0i64, 0i64, 0i64);
    let mut per_assistant: BTreeMap<Uuid, AssistantTally> = BTreeMap::new();

    for call in calls {
        let duration = i64::from(call.duration.max(0));
        total_duration += duration;

        let tally = per_assistant.entry(call.assistant_id).or_default();
        tally.calls += 1;
        tally.duration += duration;

        match call.result_enum() {
            Some(CallResult::Pass) => {
                successful += 1;
                tally.passed += 1;
            }
            Some(CallResult::Fail) => failed += 1,
            None => {}
        }

        match call.sentiment_enum() {
            Some(Sentiment::Positive) => positive += 1,
            Some(Sentiment::Neutral) => neutral += 1,
            Some(Sentiment::Negative) => negative += 1,
            None => {}
        }
    }

    let mut booked = 0i64;
    for appointment in appointments {
        let is_booking = appointment
            .status_enum()
            .map_or(true, |status| status.is_booking());
        if is_booking {
            booked += 1;
            per_assistant.entry(appointment.assistant_id).or_default().booked += 1;
        }
    }

    let total_calls = calls.len() as i64;

    let performance = per_assistant
        .into_iter()
        .map(|(assistant_id, tally)| NewAssistantPerformanceDaily {
            tenant_id,
            assistant_id,
            date,
            calls_handled: clamp_i32(tally.calls),
            success_rate: average(tally.passed, tally.calls),
            average_duration: average(tally.duration, tally.calls),
            appointments_booked: clamp_i32(tally.booked),
        })
        .collect();

    DailyRollup {
        summary: NewAnalyticsDailySummary {
            tenant_id,
            date,
            total_calls: clamp_i32(total_calls),
            successful_calls: clamp_i32(successful),
            failed_calls: clamp_i32(failed),
            total_duration: clamp_i32(total_duration),
            average_duration: average(total_duration, total_calls),
            appointments_booked: clamp_i32(booked),
        },
        sentiment: NewCallSentimentAnalysis {
            tenant_id,
            date,
            positive_count: clamp_i32(positive),
            neutral_count: clamp_i32(neutral),
            negative_count: clamp_i32(negative),
        },
        performance,
    }
}

/// Loads the tenant's calls and bookings for `date` (UK day), computes the
/// rollups and stores them unless that day was already rolled up.
pub fn write_daily_rollup(
    pool: &PgPool,
    tenant_id: Uuid,
    date: NaiveDate,
) -> Result<RollupWriteOutcome, DbError> {
    let (start, end) = uk_day_bounds(date).ok_or_else(|| {
        DbError::Precondition(format!("{} has no UK midnight", date))
    })?;

    let calls = list_call_logs_between(pool, tenant_id, start, end)?;
    let appointments = list_appointments_booked_between(pool, tenant_id, start, end)?;
    let rollup = compute_daily_rollup(tenant_id, date, &calls, &appointments);

    let outcome = insert_daily_rollup(pool, &rollup.summary, &rollup.sentiment, &rollup.performance)?;

    if outcome.already_existed() {
        tracing::debug!("Rollup for tenant {} on {} already stored", tenant_id, date);
    } else {
        tracing::info!(
            "Rolled up {} call(s) and {} booking(s) for tenant {} on {}",
            rollup.summary.total_calls,
            rollup.summary.appointments_booked,
            tenant_id,
            date
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn call(assistant_id: Uuid, duration: i32, result: Option<&str>, sentiment: Option<&str>) -> CallLog {
        let started_at = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        CallLog {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            assistant_id,
            vapi_call_id: Uuid::new_v4().to_string(),
            caller_number: None,
            duration,
            result: result.map(str::to_string),
            sentiment: sentiment.map(str::to_string),
            summary: None,
            transcript: None,
            started_at,
            ended_at: None,
            created_at: started_at,
        }
    }

    fn appointment(assistant_id: Uuid, status: &str) -> Appointment {
        let start_time = Utc.with_ymd_and_hms(2024, 7, 3, 9, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            assistant_id,
            calendar_event_id: Uuid::new_v4().to_string(),
            customer_name: "Jane".to_string(),
            customer_phone: None,
            customer_email: None,
            service_name: None,
            start_time,
            end_time: start_time + Duration::minutes(30),
            status: status.to_string(),
            notes: None,
            created_at: start_time,
            synced_at: start_time,
        }
    }

    #[test]
    fn test_empty_day() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let rollup = compute_daily_rollup(Uuid::nil(), date, &[], &[]);

        assert_eq!(rollup.summary.total_calls, 0);
        assert_eq!(rollup.summary.average_duration, 0.0);
        assert_eq!(rollup.sentiment.positive_count, 0);
        assert!(rollup.performance.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let assistant = Uuid::new_v4();
        let calls = vec![
            call(assistant, 120, Some("pass"), Some("positive")),
            call(assistant, 60, Some("fail"), Some("negative")),
            call(assistant, 30, None, None),
            call(assistant, 90, Some("pass"), Some("positive")),
        ];
        let appointments = vec![
            appointment(assistant, "confirmed"),
            appointment(assistant, "cancelled"),
            appointment(assistant, "rescheduled"),
        ];
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let rollup = compute_daily_rollup(Uuid::nil(), date, &calls, &appointments);

        assert_eq!(rollup.summary.total_calls, 4);
        assert_eq!(rollup.summary.successful_calls, 2);
        assert_eq!(rollup.summary.failed_calls, 1);
        assert_eq!(rollup.summary.total_duration, 300);
        assert_eq!(rollup.summary.average_duration, 75.0);
        assert_eq!(rollup.summary.appointments_booked, 2);

        assert_eq!(rollup.sentiment.positive_count, 2);
        assert_eq!(rollup.sentiment.neutral_count, 0);
        assert_eq!(rollup.sentiment.negative_count, 1);
    }

    #[test]
    fn test_per_assistant_performance() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let calls = vec![
            call(a, 100, Some("pass"), None),
            call(a, 50, Some("fail"), None),
            call(b, 40, Some("pass"), None),
        ];
        let appointments = vec![appointment(b, "confirmed")];
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let rollup = compute_daily_rollup(Uuid::nil(), date, &calls, &appointments);

        assert_eq!(rollup.performance.len(), 2);
        let first = &rollup.performance[0];
        assert_eq!(first.assistant_id, a);
        assert_eq!(first.calls_handled, 2);
        assert_eq!(first.success_rate, 0.5);
        assert_eq!(first.average_duration, 75.0);
        assert_eq!(first.appointments_booked, 0);

        let second = &rollup.performance[1];
        assert_eq!(second.assistant_id, b);
        assert_eq!(second.success_rate, 1.0);
        assert_eq!(second.appointments_booked, 1);
    }

    #[test]
    fn test_uk_day_bounds_follow_bst() {
        let summer = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let (start, end) = uk_day_bounds(summer).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 7, 1, 23, 0, 0).unwrap());

        // Clocks go forward on 31 March 2024: a 23 hour day.
        let spring = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, end) = uk_day_bounds(spring).unwrap();
        assert_eq!(end - start, Duration::hours(23));
    }

    #[test]
    fn test_uk_day_bounds_at_calendar_edge() {
        assert!(uk_day_bounds(NaiveDate::MAX).is_none());
    }
}
