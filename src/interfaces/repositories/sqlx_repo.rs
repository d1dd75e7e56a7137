use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxContactMessageRepo {
    pub pool: PgPool,
}
