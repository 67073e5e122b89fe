use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::DatabaseErrorKind;
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
pub enum DbError {
    PoolError(PoolError),
    DieselError(diesel::result::Error),
    /// A unique constraint rejected the write (duplicate email, event id, ...).
    Conflict(String),
    /// The write is not allowed in the current state of the tenant's data.
    Precondition(String),
    TaskJoinError(String),
}

impl From<PoolError> for DbError {
    fn from(err: PoolError) -> Self {
        DbError::PoolError(err)
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let target = info
                    .constraint_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| info.message().to_string());
                DbError::Conflict(target)
            }
            other => DbError::DieselError(other),
        }
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::PoolError(e) => write!(f, "Pool error: {}", e),
            DbError::DieselError(e) => write!(f, "Database error: {}", e),
            DbError::Conflict(e) => write!(f, "Conflict: {}", e),
            DbError::Precondition(e) => write!(f, "Precondition failed: {}", e),
            DbError::TaskJoinError(e) => write!(f, "Task join error: {}", e),
        }
    }
}

impl std::error::Error for DbError {}

pub fn create_pool(database_url: &str) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager)
}

pub fn run_migrations(pool: &PgPool) -> Result<usize, String> {
    let conn = &mut pool.get().map_err(|e| e.to_string())?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|e| e.to_string())
}
