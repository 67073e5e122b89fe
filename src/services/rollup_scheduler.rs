use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Europe::London;

use crate::db::{DbError, PgPool};
use crate::observability::metrics::Metrics;
use crate::repository::tenants::get_active_tenant_ids;
use crate::services::analytics::write_daily_rollup;

const FALLBACK_WAIT: std::time::Duration = std::time::Duration::from_secs(3600);

/// Time left until the next midnight on the UK wall clock. Midnight always
/// exists in Europe/London; the clocks change at 01:00 and 02:00.
pub fn duration_until_next_uk_midnight(now: DateTime<Utc>) -> Option<std::time::Duration> {
    let tomorrow = now.with_timezone(&London).date_naive().succ_opt()?;
    let midnight = tomorrow
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(London)
        .earliest()?;
    (midnight.with_timezone(&Utc) - now).to_std().ok()
}

/// Rolls up the previous UK day for every active tenant, once a day, shortly
/// after midnight `Europe/London`.
pub async fn run_rollup_scheduler(pool: PgPool, metrics: Arc<Metrics>) {
    tracing::info!("Starting analytics rollup scheduler...");

    loop {
        let wait = duration_until_next_uk_midnight(Utc::now()).unwrap_or(FALLBACK_WAIT);
        tracing::info!(
            "Rollup scheduler: next run in {} hours {} minutes",
            wait.as_secs() / 3600,
            (wait.as_secs() % 3600) / 60
        );

        tokio::time::sleep(wait).await;

        let today = Utc::now().with_timezone(&London).date_naive();
        let Some(yesterday) = today.pred_opt() else {
            continue;
        };
        let pool = pool.clone();
        let metrics = metrics.clone();

        match tokio::task::spawn_blocking(move || roll_up_all_tenants(&pool, &metrics, yesterday)).await {
            Ok(Ok(written)) => {
                tracing::info!("Rollups for {} written for {} tenant(s)", yesterday, written)
            }
            Ok(Err(e)) => tracing::error!("Rollup run for {} failed: {}", yesterday, e),
            Err(e) => tracing::error!("Rollup task panicked: {}", e),
        }
    }
}

/// A failing tenant is logged and skipped so the others still get their rollup.
pub fn roll_up_all_tenants(
    pool: &PgPool,
    metrics: &Metrics,
    date: NaiveDate,
) -> Result<usize, DbError> {
    let tenant_ids = get_active_tenant_ids(pool)?;
    let mut written = 0;

    for tenant_id in tenant_ids {
        match write_daily_rollup(pool, tenant_id, date) {
            Ok(outcome) if !outcome.already_existed() => {
                written += 1;
                metrics.increment_rollups_written();
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Rollup for tenant {} on {} failed: {}", tenant_id, date, e);
                metrics.increment_errors();
            }
        }
    }

    Ok(written)
}
