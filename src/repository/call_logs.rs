use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{CallLog, NewCallLog};
use crate::schema::call_logs;

pub fn record_call_log(pool: &PgPool, new_call: NewCallLog) -> Result<CallLog, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(call_logs::table)
        .values(&new_call)
        .get_result(conn)?)
}

pub fn list_recent_call_logs(
    pool: &PgPool,
    tenant_id: Uuid,
    limit: i64,
) -> Result<Vec<CallLog>, DbError> {
    let conn = &mut pool.get()?;

    Ok(call_logs::table
        .filter(call_logs::tenant_id.eq(tenant_id))
        .order(call_logs::started_at.desc())
        .limit(limit)
        .load::<CallLog>(conn)?)
}

/// Calls that started inside `[start, end)`.
pub fn list_call_logs_between(
    pool: &PgPool,
    tenant_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<CallLog>, DbError> {
    let conn = &mut pool.get()?;

    Ok(call_logs::table
        .filter(call_logs::tenant_id.eq(tenant_id))
        .filter(call_logs::started_at.ge(start))
        .filter(call_logs::started_at.lt(end))
        .order(call_logs::started_at.asc())
        .load::<CallLog>(conn)?)
}
