//! Postgres-backed repository. The `fingerprint` UNIQUE constraint makes
//! idempotent creation atomic; per-row mutation runs in a transaction that
//! locks the row with `SELECT .. FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::warn;
use uuid::Uuid;

use downpour_core::{
    DesiredStatus, Download, DownloadFile, Error, Mutation, Repository, Result, Status,
};

const PG_UNIQUE_VIOLATION: &str = "23505";

const SELECT_ALL: &str = r"
    SELECT id, gid, source, target_path, name, files, status, desired_status,
           created_at, fingerprint
    FROM downloads
    ORDER BY created_at, id
";

const SELECT_BY_ID: &str = r"
    SELECT id, gid, source, target_path, name, files, status, desired_status,
           created_at, fingerprint
    FROM downloads
    WHERE id = $1
";

const SELECT_BY_FINGERPRINT: &str = r"
    SELECT id, gid, source, target_path, name, files, status, desired_status,
           created_at, fingerprint
    FROM downloads
    WHERE fingerprint = $1
";

const SELECT_FOR_UPDATE: &str = r"
    SELECT id, gid, source, target_path, name, files, status, desired_status,
           created_at, fingerprint
    FROM downloads
    WHERE id = $1
    FOR UPDATE
";

const INSERT_ROW: &str = r"
    INSERT INTO downloads (id, gid, source, target_path, name, files, status,
                           desired_status, created_at, fingerprint)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
";

const INSERT_IF_ABSENT: &str = r"
    INSERT INTO downloads (id, gid, source, target_path, name, files, status,
                           desired_status, created_at, fingerprint)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (fingerprint) DO NOTHING
";

const UPDATE_ROW: &str = r"
    UPDATE downloads
    SET gid = $2, source = $3, target_path = $4, name = $5, files = $6,
        status = $7, desired_status = $8, fingerprint = $9
    WHERE id = $1
";

const DELETE_ROW: &str = r"DELETE FROM downloads WHERE id = $1";

/// Download repository backed by a Postgres pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Initialise the repository, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail or the database is unreachable.
    pub async fn new(pool: PgPool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| Error::transport("migrate", err))?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn list(&self) -> Result<Vec<Download>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| Error::transport("downloads.list", err))?;
        rows.iter().map(decode_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Download> {
        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| Error::transport("downloads.get", err))?;
        row.as_ref()
            .map(decode_row)
            .transpose()?
            .ok_or_else(|| Error::not_found("download", id.to_string()))
    }

    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Download> {
        let row = sqlx::query(SELECT_BY_FINGERPRINT)
            .bind(fingerprint)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| Error::transport("downloads.get_by_fingerprint", err))?;
        row.as_ref()
            .map(decode_row)
            .transpose()?
            .ok_or_else(|| Error::not_found("download", fingerprint.to_string()))
    }

    async fn add(&self, download: Download) -> Result<Download> {
        bind_row(sqlx::query(INSERT_ROW), &download)
            .execute(&self.pool)
            .await
            .map_err(|err| map_write_error("downloads.add", &download.fingerprint, err))?;
        Ok(download)
    }

    async fn add_if_absent(&self, download: Download) -> Result<(Download, bool)> {
        let outcome = bind_row(sqlx::query(INSERT_IF_ABSENT), &download)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::transport("downloads.add_if_absent", err))?;
        if outcome.rows_affected() == 1 {
            return Ok((download, true));
        }
        let existing = self.get_by_fingerprint(&download.fingerprint).await?;
        Ok((existing, false))
    }

    async fn update(&self, id: Uuid, mutate: Mutation) -> Result<Download> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::transport("downloads.update.begin", err))?;

        let row = sqlx::query(SELECT_FOR_UPDATE)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| Error::transport("downloads.update.lock", err))?;
        let current = row
            .as_ref()
            .map(decode_row)
            .transpose()?
            .ok_or_else(|| Error::not_found("download", id.to_string()))?;

        let mut working = current.clone();
        mutate(&mut working);
        working.id = id;

        if changed(&current, &working) {
            bind_update(sqlx::query(UPDATE_ROW), &working)
                .execute(&mut *tx)
                .await
                .map_err(|err| map_write_error("downloads.update", &working.fingerprint, err))?;
        }

        tx.commit()
            .await
            .map_err(|err| Error::transport("downloads.update.commit", err))?;
        Ok(working)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let outcome = sqlx::query(DELETE_ROW)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::transport("downloads.delete", err))?;
        if outcome.rows_affected() == 0 {
            return Err(Error::not_found("download", id.to_string()));
        }
        Ok(())
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn bind_row<'q>(query: PgQuery<'q>, download: &'q Download) -> PgQuery<'q> {
    query
        .bind(download.id)
        .bind(download.gid.as_deref())
        .bind(&download.source)
        .bind(&download.target_path)
        .bind(download.name.as_deref())
        .bind(Json(&download.files))
        .bind(download.status.as_str())
        .bind(download.desired_status.as_str())
        .bind(download.created_at)
        .bind(&download.fingerprint)
}

fn bind_update<'q>(query: PgQuery<'q>, download: &'q Download) -> PgQuery<'q> {
    query
        .bind(download.id)
        .bind(download.gid.as_deref())
        .bind(&download.source)
        .bind(&download.target_path)
        .bind(download.name.as_deref())
        .bind(Json(&download.files))
        .bind(download.status.as_str())
        .bind(download.desired_status.as_str())
        .bind(&download.fingerprint)
}

fn changed(current: &Download, working: &Download) -> bool {
    current.gid != working.gid
        || current.source != working.source
        || current.target_path != working.target_path
        || current.name != working.name
        || current.files != working.files
        || current.status != working.status
        || current.desired_status != working.desired_status
        || current.fingerprint != working.fingerprint
}

fn decode_row(row: &PgRow) -> Result<Download> {
    let status_label: String = column(row, "status")?;
    let desired_label: String = column(row, "desired_status")?;
    let Json(files): Json<Vec<DownloadFile>> = column(row, "files")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    Ok(Download {
        id: column(row, "id")?,
        gid: column(row, "gid")?,
        source: column(row, "source")?,
        target_path: column(row, "target_path")?,
        name: column(row, "name")?,
        files,
        status: decode_status(&status_label)?,
        desired_status: decode_desired(&desired_label)?,
        created_at,
        fingerprint: column(row, "fingerprint")?,
    })
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|err| Error::transport("downloads.decode", err))
}

fn decode_status(label: &str) -> Result<Status> {
    match label {
        "queued" => Ok(Status::Queued),
        "active" => Ok(Status::Active),
        "paused" => Ok(Status::Paused),
        "complete" => Ok(Status::Complete),
        "cancelled" => Ok(Status::Cancelled),
        "failed" => Ok(Status::Failed),
        other => Err(Error::Fatal {
            detail: format!("unknown status label {other}"),
        }),
    }
}

fn decode_desired(label: &str) -> Result<DesiredStatus> {
    match label {
        "queued" => Ok(DesiredStatus::Queued),
        "active" => Ok(DesiredStatus::Active),
        "paused" => Ok(DesiredStatus::Paused),
        "cancelled" => Ok(DesiredStatus::Cancelled),
        // Resume is a transient intent and is never written; tolerate it on
        // read from older rows by treating it as active.
        "resume" => {
            warn!("resume desired status found in store; treating as active");
            Ok(DesiredStatus::Active)
        }
        other => Err(Error::Fatal {
            detail: format!("unknown desired status label {other}"),
        }),
    }
}

fn map_write_error(operation: &'static str, fingerprint: &str, err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
    {
        return Error::conflict("fingerprint already exists", Some(fingerprint.to_string()));
    }
    Error::transport(operation, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in [
            Status::Queued,
            Status::Active,
            Status::Paused,
            Status::Complete,
            Status::Cancelled,
            Status::Failed,
        ] {
            assert_eq!(decode_status(status.as_str()).unwrap(), status);
        }
        assert!(decode_status("bogus").is_err());
    }

    #[test]
    fn desired_labels_round_trip_with_resume_tolerated() {
        for desired in [
            DesiredStatus::Queued,
            DesiredStatus::Active,
            DesiredStatus::Paused,
            DesiredStatus::Cancelled,
        ] {
            assert_eq!(decode_desired(desired.as_str()).unwrap(), desired);
        }
        assert_eq!(decode_desired("resume").unwrap(), DesiredStatus::Active);
        assert!(decode_desired("bogus").is_err());
    }

    #[test]
    fn changed_detects_field_mutations() {
        let base = Download {
            id: Uuid::new_v4(),
            source: "https://x/file".to_string(),
            target_path: "/data".to_string(),
            name: None,
            files: Vec::new(),
            status: Status::Queued,
            desired_status: DesiredStatus::Queued,
            gid: None,
            created_at: Utc::now(),
            fingerprint: "fp".to_string(),
        };
        let mut updated = base.clone();
        assert!(!changed(&base, &updated));
        updated.status = Status::Active;
        assert!(changed(&base, &updated));
    }
}
