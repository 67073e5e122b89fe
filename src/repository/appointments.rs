use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::models::{Appointment, AppointmentSyncChanges, NewAppointment};
use crate::schema::appointments;

/// Plain insert: a second appointment with the same calendar event id is a
/// conflict.
pub fn create_appointment(
    pool: &PgPool,
    new_appointment: NewAppointment,
) -> Result<Appointment, DbError> {
    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(appointments::table)
        .values(&new_appointment)
        .get_result(conn)?)
}

/// Upsert on the calendar event id. The update only applies to a row that
/// already belongs to the same tenant.
macro_rules! tenant_guarded_upsert {
    ($new_appointment:expr, $changes:expr) => {{
        use diesel::query_dsl::methods::FilterDsl;
        diesel::insert_into(appointments::table)
            .values($new_appointment)
            .on_conflict(appointments::calendar_event_id)
            .do_update()
            .set($changes)
            .filter(appointments::tenant_id.eq($new_appointment.tenant_id))
    }};
}

/// Calendar sync: upsert keyed on the calendar event id, so concurrent or
/// repeated syncs of the same event converge on one row. An event owned by
/// another tenant is a conflict, decided by the single upsert statement.
pub fn sync_appointment(
    pool: &PgPool,
    new_appointment: NewAppointment,
) -> Result<Appointment, DbError> {
    let conn = &mut pool.get()?;
    let changes = sync_changes(&new_appointment, Utc::now());

    tenant_guarded_upsert!(&new_appointment, &changes)
        .get_result(conn)
        .optional()?
        .ok_or_else(|| DbError::Conflict("appointments_calendar_event_id_key".to_string()))
}

fn sync_changes<'a>(
    new_appointment: &NewAppointment<'a>,
    synced_at: DateTime<Utc>,
) -> AppointmentSyncChanges<'a> {
    AppointmentSyncChanges {
        assistant_id: new_appointment.assistant_id,
        customer_name: new_appointment.customer_name,
        customer_phone: new_appointment.customer_phone,
        customer_email: new_appointment.customer_email,
        service_name: new_appointment.service_name,
        start_time: new_appointment.start_time,
        end_time: new_appointment.end_time,
        status: new_appointment.status,
        notes: new_appointment.notes,
        synced_at,
    }
}

/// Appointments starting inside `[from, to)`; open-ended on either side.
pub fn list_appointments(
    pool: &PgPool,
    tenant_id: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<Appointment>, DbError> {
    let conn = &mut pool.get()?;

    let mut query = appointments::table
        .filter(appointments::tenant_id.eq(tenant_id))
        .into_boxed();

    if let Some(from) = from {
        query = query.filter(appointments::start_time.ge(from));
    }
    if let Some(to) = to {
        query = query.filter(appointments::start_time.lt(to));
    }

    Ok(query
        .order(appointments::start_time.asc())
        .load::<Appointment>(conn)?)
}

/// Appointments booked (created) inside `[start, end)`.
pub fn list_appointments_booked_between(
    pool: &PgPool,
    tenant_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Appointment>, DbError> {
    let conn = &mut pool.get()?;

    Ok(appointments::table
        .filter(appointments::tenant_id.eq(tenant_id))
        .filter(appointments::created_at.ge(start))
        .filter(appointments::created_at.lt(end))
        .load::<Appointment>(conn)?)
}
