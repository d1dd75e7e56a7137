pub mod contact_message;
pub mod sqlx_repo;
