use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{domain_attachment::DomainAttachment, domain_status::DomainStatus},
    use_cases::domain::DomainAttachmentRepo,
};

const COLUMNS: &str = "store_id, domain_name, status, verification_token, verified_at, error_message, \
     tls_enabled, redirect_https, redirect_www, last_checked_at, created_at, updated_at";

fn row_to_attachment(row: sqlx::postgres::PgRow) -> DomainAttachment {
    DomainAttachment {
        store_id: row.get("store_id"),
        domain_name: row.get("domain_name"),
        status: DomainStatus::from_db(row.get("status")),
        verification_token: row.get("verification_token"),
        verified_at: row.get("verified_at"),
        error_message: row.get("error_message"),
        tls_enabled: row.get("tls_enabled"),
        redirect_https: row.get("redirect_https"),
        redirect_www: row.get("redirect_www"),
        last_checked_at: row.get("last_checked_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl DomainAttachmentRepo for PostgresPersistence {
    async fn get_by_store(&self, store_id: Uuid) -> AppResult<Option<DomainAttachment>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM domain_attachments WHERE store_id = $1"
        ))
        .bind(store_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_attachment))
    }

    async fn get_by_domain(&self, domain_name: &str) -> AppResult<Option<DomainAttachment>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM domain_attachments WHERE domain_name = $1"
        ))
        .bind(domain_name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_attachment))
    }

    async fn create(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        let row = sqlx::query(&format!(
            r#"
                INSERT INTO domain_attachments
                    (store_id, domain_name, status, verification_token, tls_enabled, redirect_https, redirect_www)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {COLUMNS}
            "#
        ))
        .bind(attachment.store_id)
        .bind(&attachment.domain_name)
        .bind(attachment.status.as_str())
        .bind(&attachment.verification_token)
        .bind(attachment.tls_enabled)
        .bind(attachment.redirect_https)
        .bind(attachment.redirect_www)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_attachment(row))
    }

    async fn save(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE domain_attachments
                SET status = $2,
                    verified_at = $3,
                    error_message = $4,
                    tls_enabled = $5,
                    redirect_https = $6,
                    redirect_www = $7,
                    last_checked_at = $8,
                    updated_at = CURRENT_TIMESTAMP
                WHERE store_id = $1
                RETURNING {COLUMNS}
            "#
        ))
        .bind(attachment.store_id)
        .bind(attachment.status.as_str())
        .bind(attachment.verified_at)
        .bind(&attachment.error_message)
        .bind(attachment.tls_enabled)
        .bind(attachment.redirect_https)
        .bind(attachment.redirect_www)
        .bind(attachment.last_checked_at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        row.map(row_to_attachment).ok_or(AppError::NotFound)
    }

    async fn delete(&self, store_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM domain_attachments WHERE store_id = $1")
            .bind(store_id)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn list_by_status(&self, statuses: &[DomainStatus]) -> AppResult<Vec<DomainAttachment>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM domain_attachments WHERE status = ANY($1) ORDER BY last_checked_at ASC NULLS FIRST"
        ))
        .bind(statuses)
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_attachment).collect())
    }
}
