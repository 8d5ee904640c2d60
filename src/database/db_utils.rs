use diesel::{
    pg::PgConnection,
    r2d2::{ConnectionManager, Pool},
};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the connection pool for the hosted database.
///
/// # Example
/// ```ignore
/// let pool = psql_connect_to_db("postgres://localhost/blog", 10)?;
/// ```
pub fn psql_connect_to_db(database_url: &str, pool_size: u32) -> Result<PgPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().max_size(pool_size).build(manager)?;

    log::info!("database pool ready ({} connections)", pool_size);
    Ok(pool)
}
