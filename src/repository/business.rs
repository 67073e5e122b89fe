use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{BusinessInfo, KnowledgeEntry, NewBusinessInfo, NewKnowledgeEntry};
use crate::schema::{business_info, knowledge_base};

fn upsert_business_info_conn(
    conn: &mut PgConnection,
    info: &NewBusinessInfo,
) -> Result<BusinessInfo, DbError> {
    Ok(diesel::insert_into(business_info::table)
        .values(info)
        .on_conflict(business_info::tenant_id)
        .do_update()
        .set((info, business_info::updated_at.eq(Utc::now())))
        .get_result(conn)?)
}

pub fn find_business_info_by_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Option<BusinessInfo>, DbError> {
    let conn = &mut pool.get()?;

    Ok(business_info::table
        .filter(business_info::tenant_id.eq(tenant_id))
        .first::<BusinessInfo>(conn)
        .optional()?)
}

/// Stores an onboarding submission: business info is upserted and the
/// scraped website text (if any) lands in the knowledge base. Submitting the
/// same site again refreshes the existing entry instead of adding another.
pub fn save_onboarding(
    pool: &PgPool,
    info: NewBusinessInfo,
    scraped: Option<NewKnowledgeEntry>,
) -> Result<(BusinessInfo, Option<KnowledgeEntry>), DbError> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, DbError, _>(|conn| {
        let saved = upsert_business_info_conn(conn, &info)?;

        let Some(entry) = scraped else {
            return Ok((saved, None));
        };

        let existing = knowledge_base::table
            .filter(knowledge_base::tenant_id.eq(entry.tenant_id))
            .filter(knowledge_base::source.eq(entry.source))
            .filter(knowledge_base::source_url.eq(entry.source_url))
            .select(knowledge_base::id)
            .first::<Uuid>(conn)
            .optional()?;

        let stored = match existing {
            Some(entry_id) => diesel::update(knowledge_base::table.find(entry_id))
                .set((
                    &entry,
                    knowledge_base::is_active.eq(true),
                    knowledge_base::updated_at.eq(Utc::now()),
                ))
                .get_result::<KnowledgeEntry>(conn)?,
            None => diesel::insert_into(knowledge_base::table)
                .values(&entry)
                .get_result::<KnowledgeEntry>(conn)?,
        };

        Ok((saved, Some(stored)))
    })
}
