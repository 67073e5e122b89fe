use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{NewTool, Tool};
use crate::schema::tools;

pub fn create_tool(pool: &PgPool, new_tool: NewTool) -> Result<Tool, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(tools::table)
        .values(&new_tool)
        .get_result(conn)?)
}

pub fn list_active_tools(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Tool>, DbError> {
    let conn = &mut pool.get()?;

    Ok(tools::table
        .filter(tools::tenant_id.eq(tenant_id))
        .filter(tools::is_active.eq(true))
        .order(tools::created_at.asc())
        .load::<Tool>(conn)?)
}

pub fn deactivate_tool(pool: &PgPool, tool_id: Uuid, owner_tenant_id: Uuid) -> Result<bool, DbError> {
    let conn = &mut pool.get()?;

    let updated = diesel::update(
        tools::table
            .filter(tools::id.eq(tool_id))
            .filter(tools::tenant_id.eq(owner_tenant_id)),
    )
    .set((tools::is_active.eq(false), tools::updated_at.eq(Utc::now())))
    .execute(conn)?;

    Ok(updated > 0)
}
