use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{Assistant, NewAssistant, UpdateAssistant};
use crate::schema::{assistants, business_info};

/// Inserts the assistant. The tenant's business info has to exist first.
pub fn create_assistant(pool: &PgPool, new_assistant: NewAssistant) -> Result<Assistant, DbError> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, DbError, _>(|conn| {
        let has_business_info: bool = diesel::select(diesel::dsl::exists(
            business_info::table.filter(business_info::tenant_id.eq(new_assistant.tenant_id)),
        ))
        .get_result(conn)?;

        if !has_business_info {
            return Err(DbError::Precondition(
                "business details must be saved before creating an assistant".to_string(),
            ));
        }

        Ok(diesel::insert_into(assistants::table)
            .values(&new_assistant)
            .get_result(conn)?)
    })
}

pub fn find_assistant_by_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Option<Assistant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(assistants::table
        .filter(assistants::tenant_id.eq(tenant_id))
        .first::<Assistant>(conn)
        .optional()?)
}

/// Looks the assistant up only within the tenant that claims to own it.
pub fn find_tenant_assistant(
    pool: &PgPool,
    tenant_id: Uuid,
    assistant_id: Uuid,
) -> Result<Option<Assistant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(assistants::table
        .filter(assistants::id.eq(assistant_id))
        .filter(assistants::tenant_id.eq(tenant_id))
        .first::<Assistant>(conn)
        .optional()?)
}

pub fn update_assistant(
    pool: &PgPool,
    tenant_id: Uuid,
    updates: UpdateAssistant,
) -> Result<Option<Assistant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(
        diesel::update(assistants::table.filter(assistants::tenant_id.eq(tenant_id)))
            .set((&updates, assistants::updated_at.eq(Utc::now())))
            .get_result(conn)
            .optional()?,
    )
}

pub fn deactivate_assistant(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Assistant>, DbError> {
    let conn = &mut pool.get()?;

    Ok(
        diesel::update(assistants::table.filter(assistants::tenant_id.eq(tenant_id)))
            .set((
                assistants::is_active.eq(false),
                assistants::updated_at.eq(Utc::now()),
            ))
            .get_result(conn)
            .optional()?,
    )
}
