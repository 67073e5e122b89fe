use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{NewTenant, Tenant, UpdateTenant};
use crate::schema::{assistants, calendar_tokens, knowledge_base, tenants, tools};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationSummary {
    pub tenant: Tenant,
    pub assistants: usize,
    pub calendar_tokens: usize,
    pub tools: usize,
    pub knowledge_entries: usize,
}

pub fn create_tenant(pool: &PgPool, new_tenant: NewTenant) -> Result<Tenant, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(tenants::table)
        .values(&new_tenant)
        .get_result(conn)?)
}

pub fn find_tenant_by_id(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Tenant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(tenants::table
        .find(tenant_id)
        .first::<Tenant>(conn)
        .optional()?)
}

pub fn find_tenant_by_email(pool: &PgPool, email: &str) -> Result<Option<Tenant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(tenants::table
        .filter(tenants::email.eq(email))
        .first::<Tenant>(conn)
        .optional()?)
}

pub fn update_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
    updates: UpdateTenant,
) -> Result<Option<Tenant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::update(tenants::table.find(tenant_id))
        .set((&updates, tenants::updated_at.eq(Utc::now())))
        .get_result(conn)
        .optional()?)
}

/// Soft-disables the tenant and everything it owns in one transaction.
/// Call logs, appointments and rollups are history and stay as they are.
pub fn deactivate_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Option<DeactivationSummary>, DbError> {
    let conn = &mut pool.get()?;
    let now = Utc::now();

    conn.transaction::<_, DbError, _>(|conn| {
        let tenant = diesel::update(tenants::table.find(tenant_id))
            .set((
                tenants::is_active.eq(false),
                tenants::deactivated_at.eq(Some(now)),
                tenants::updated_at.eq(now),
            ))
            .get_result::<Tenant>(conn)
            .optional()?;

        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let assistants = diesel::update(
            assistants::table
                .filter(assistants::tenant_id.eq(tenant_id))
                .filter(assistants::is_active.eq(true)),
        )
        .set((assistants::is_active.eq(false), assistants::updated_at.eq(now)))
        .execute(conn)?;

        let calendar_tokens = diesel::update(
            calendar_tokens::table
                .filter(calendar_tokens::tenant_id.eq(tenant_id))
                .filter(calendar_tokens::is_active.eq(true)),
        )
        .set((
            calendar_tokens::is_active.eq(false),
            calendar_tokens::updated_at.eq(now),
        ))
        .execute(conn)?;

        let tools = diesel::update(
            tools::table
                .filter(tools::tenant_id.eq(tenant_id))
                .filter(tools::is_active.eq(true)),
        )
        .set((tools::is_active.eq(false), tools::updated_at.eq(now)))
        .execute(conn)?;

        let knowledge_entries = diesel::update(
            knowledge_base::table
                .filter(knowledge_base::tenant_id.eq(tenant_id))
                .filter(knowledge_base::is_active.eq(true)),
        )
        .set((
            knowledge_base::is_active.eq(false),
            knowledge_base::updated_at.eq(now),
        ))
        .execute(conn)?;

        Ok(Some(DeactivationSummary {
            tenant,
            assistants,
            calendar_tokens,
            tools,
            knowledge_entries,
        }))
    })
}

/// Re-enables the tenant only. Children stay off until the owner turns them
/// back on, and calendars have to be connected again.
pub fn reactivate_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Tenant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::update(tenants::table.find(tenant_id))
        .set((
            tenants::is_active.eq(true),
            tenants::deactivated_at.eq(None::<DateTime<Utc>>),
            tenants::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)
        .optional()?)
}

pub fn get_active_tenant_ids(pool: &PgPool) -> Result<Vec<Uuid>, DbError> {
    let conn = &mut pool.get()?;

    Ok(tenants::table
        .filter(tenants::is_active.eq(true))
        .select(tenants::id)
        .load(conn)?)
}
