use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{CalendarToken, NewCalendarToken};
use crate::schema::calendar_tokens;

/// Replaces the tenant's active token for this provider. At most one token
/// per tenant and provider is ever active.
pub fn store_calendar_token(
    pool: &PgPool,
    new_token: NewCalendarToken,
) -> Result<CalendarToken, DbError> {
    let conn = &mut pool.get()?;
    let now = Utc::now();

    conn.transaction::<_, DbError, _>(|conn| {
        let replaced = diesel::update(
            calendar_tokens::table
                .filter(calendar_tokens::tenant_id.eq(new_token.tenant_id))
                .filter(calendar_tokens::provider.eq(new_token.provider))
                .filter(calendar_tokens::is_active.eq(true)),
        )
        .set((
            calendar_tokens::is_active.eq(false),
            calendar_tokens::updated_at.eq(now),
        ))
        .execute(conn)?;

        if replaced > 0 {
            tracing::debug!(
                "Replaced {} active {} token(s) for tenant {}",
                replaced,
                new_token.provider,
                new_token.tenant_id
            );
        }

        Ok(diesel::insert_into(calendar_tokens::table)
            .values(&new_token)
            .get_result(conn)?)
    })
}

pub fn list_active_calendar_tokens(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Vec<CalendarToken>, DbError> {
    let conn = &mut pool.get()?;

    Ok(calendar_tokens::table
        .filter(calendar_tokens::tenant_id.eq(tenant_id))
        .filter(calendar_tokens::is_active.eq(true))
        .order(calendar_tokens::provider.asc())
        .load::<CalendarToken>(conn)?)
}

pub fn disconnect_calendar(pool: &PgPool, tenant_id: Uuid, provider: &str) -> Result<bool, DbError> {
    let conn = &mut pool.get()?;

    let updated = diesel::update(
        calendar_tokens::table
            .filter(calendar_tokens::tenant_id.eq(tenant_id))
            .filter(calendar_tokens::provider.eq(provider))
            .filter(calendar_tokens::is_active.eq(true)),
    )
    .set((
        calendar_tokens::is_active.eq(false),
        calendar_tokens::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    Ok(updated > 0)
}
