use sqlx::PgPool;

use crate::app_error::AppError;

pub mod domain_attachment;

const STORE_KEY_CONSTRAINT: &str = "domain_attachments_pkey";
const DOMAIN_NAME_CONSTRAINT: &str = "domain_attachments_domain_name_key";

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    // Two attachment constraints can collide; tell them apart.
                    match db_err.constraint() {
                        Some(STORE_KEY_CONSTRAINT) => AppError::AlreadyConnected,
                        Some(DOMAIN_NAME_CONSTRAINT) => AppError::DomainTaken,
                        _ => AppError::InvalidInput("A record with this value already exists".into()),
                    }
                }
                // PostgreSQL not-null violation
                else if db_err.message().contains("violates not-null") {
                    AppError::InvalidInput("Required field is missing".into())
                } else {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                }
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
