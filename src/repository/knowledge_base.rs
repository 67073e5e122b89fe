use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{KnowledgeEntry, NewKnowledgeEntry};
use crate::schema::knowledge_base;

pub fn create_knowledge_entry(
    pool: &PgPool,
    new_entry: NewKnowledgeEntry,
) -> Result<KnowledgeEntry, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(knowledge_base::table)
        .values(&new_entry)
        .get_result(conn)?)
}

/// Active entries for the tenant, optionally narrowed to one content type.
pub fn list_knowledge_entries(
    pool: &PgPool,
    tenant_id: Uuid,
    content_type: Option<&str>,
) -> Result<Vec<KnowledgeEntry>, DbError> {
    let conn = &mut pool.get()?;

    let mut query = knowledge_base::table
        .filter(knowledge_base::tenant_id.eq(tenant_id))
        .filter(knowledge_base::is_active.eq(true))
        .into_boxed();

    if let Some(content_type) = content_type {
        query = query.filter(knowledge_base::content_type.eq(content_type));
    }

    Ok(query
        .order(knowledge_base::created_at.asc())
        .load::<KnowledgeEntry>(conn)?)
}

pub fn update_knowledge_entry(
    pool: &PgPool,
    entry_id: Uuid,
    changes: NewKnowledgeEntry,
) -> Result<Option<KnowledgeEntry>, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::update(
        knowledge_base::table
            .filter(knowledge_base::id.eq(entry_id))
            .filter(knowledge_base::tenant_id.eq(changes.tenant_id)),
    )
    .set((&changes, knowledge_base::updated_at.eq(Utc::now())))
    .get_result(conn)
    .optional()?)
}

pub fn delete_knowledge_entry(
    pool: &PgPool,
    entry_id: Uuid,
    owner_tenant_id: Uuid,
) -> Result<bool, DbError> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(
        knowledge_base::table
            .filter(knowledge_base::id.eq(entry_id))
            .filter(knowledge_base::tenant_id.eq(owner_tenant_id)),
    )
    .execute(conn)?;

    Ok(deleted > 0)
}
