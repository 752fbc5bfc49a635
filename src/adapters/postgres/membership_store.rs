//! PostgreSQL implementation of MembershipStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{MembershipOrigin, MembershipRecord, MembershipStatus};
use crate::domain::foundation::{DriverId, Timestamp};
use crate::ports::{InsertOutcome, MembershipStore, StoreError, UpdateOutcome};

/// PostgreSQL implementation of the MembershipStore port.
pub struct PostgresMembershipStore {
    pool: PgPool,
}

impl PostgresMembershipStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a membership.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    driver_id: String,
    status: String,
    origin: String,
    subscription_ref: Option<String>,
    expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<MembershipRow> for MembershipRecord {
    type Error = StoreError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(MembershipRecord {
            driver_id: DriverId::new(row.driver_id)
                .map_err(|e| StoreError::Corrupt(format!("invalid driver_id: {}", e)))?,
            status: parse_status(&row.status)?,
            origin: parse_origin(&row.origin)?,
            subscription_ref: row.subscription_ref,
            expires_at: Timestamp::from_datetime(row.expires_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn parse_status(s: &str) -> Result<MembershipStatus, StoreError> {
    match s {
        "active" => Ok(MembershipStatus::Active),
        "past_due" => Ok(MembershipStatus::PastDue),
        "canceled" => Ok(MembershipStatus::Canceled),
        _ => Err(StoreError::Corrupt(format!("invalid status value: {}", s))),
    }
}

fn parse_origin(s: &str) -> Result<MembershipOrigin, StoreError> {
    match s {
        "paid" => Ok(MembershipOrigin::Paid),
        "granted" => Ok(MembershipOrigin::Granted),
        _ => Err(StoreError::Corrupt(format!("invalid origin value: {}", s))),
    }
}

fn status_to_string(status: &MembershipStatus) -> &'static str {
    match status {
        MembershipStatus::Active => "active",
        MembershipStatus::PastDue => "past_due",
        MembershipStatus::Canceled => "canceled",
    }
}

fn origin_to_string(origin: &MembershipOrigin) -> &'static str {
    match origin {
        MembershipOrigin::Paid => "paid",
        MembershipOrigin::Granted => "granted",
    }
}

fn db_err(context: &str, e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {}", context, e))
}

const SELECT_COLUMNS: &str =
    "driver_id, status, origin, subscription_ref, expires_at, updated_at, version";

#[async_trait]
impl MembershipStore for PostgresMembershipStore {
    async fn find_by_driver_id(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM memberships WHERE driver_id = $1",
            SELECT_COLUMNS
        ))
        .bind(driver_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("failed to find membership", e))?;

        row.map(MembershipRecord::try_from).transpose()
    }

    async fn find_by_subscription_ref(
        &self,
        subscription_ref: &str,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM memberships WHERE subscription_ref = $1",
            SELECT_COLUMNS
        ))
        .bind(subscription_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("failed to find membership", e))?;

        row.map(MembershipRecord::try_from).transpose()
    }

    async fn insert(&self, record: &MembershipRecord) -> Result<InsertOutcome, StoreError> {
        // ON CONFLICT DO NOTHING turns a concurrent first activation into
        // an observable no-op instead of an error.
        let result = sqlx::query(
            r#"
            INSERT INTO memberships (
                driver_id, status, origin, subscription_ref, expires_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (driver_id) DO NOTHING
            "#,
        )
        .bind(record.driver_id.as_str())
        .bind(status_to_string(&record.status))
        .bind(origin_to_string(&record.origin))
        .bind(&record.subscription_ref)
        .bind(record.expires_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to insert membership", e))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn update(
        &self,
        record: &MembershipRecord,
        expected_version: i32,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships SET
                status = $2,
                origin = $3,
                subscription_ref = $4,
                expires_at = $5,
                updated_at = $6,
                version = version + 1
            WHERE driver_id = $1 AND version = $7
            "#,
        )
        .bind(record.driver_id.as_str())
        .bind(status_to_string(&record.status))
        .bind(origin_to_string(&record.origin))
        .bind(&record.subscription_ref)
        .bind(record.expires_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to update membership", e))?;

        if result.rows_affected() == 0 {
            Ok(UpdateOutcome::VersionConflict)
        } else {
            Ok(UpdateOutcome::Updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("active").unwrap(), MembershipStatus::Active);
        assert_eq!(parse_status("past_due").unwrap(), MembershipStatus::PastDue);
        assert_eq!(parse_status("canceled").unwrap(), MembershipStatus::Canceled);
    }

    #[test]
    fn parse_status_rejects_invalid_values() {
        assert!(parse_status("invalid").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn parse_origin_works_for_all_values() {
        assert_eq!(parse_origin("paid").unwrap(), MembershipOrigin::Paid);
        assert_eq!(parse_origin("granted").unwrap(), MembershipOrigin::Granted);
    }

    #[test]
    fn parse_origin_rejects_invalid_values() {
        assert!(parse_origin("comped").is_err());
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::PastDue,
            MembershipStatus::Canceled,
        ] {
            let s = status_to_string(&status);
            assert_eq!(parse_status(s).unwrap(), status);
        }
    }

    #[test]
    fn roundtrip_origin_conversion() {
        for origin in [MembershipOrigin::Paid, MembershipOrigin::Granted] {
            let s = origin_to_string(&origin);
            assert_eq!(parse_origin(s).unwrap(), origin);
        }
    }

    #[test]
    fn corrupt_row_maps_to_store_error() {
        let row = MembershipRow {
            driver_id: "drv_1".to_string(),
            status: "mystery".to_string(),
            origin: "paid".to_string(),
            subscription_ref: None,
            expires_at: Utc::now(),
            updated_at: Utc::now(),
            version: 1,
        };
        assert!(matches!(
            MembershipRecord::try_from(row),
            Err(StoreError::Corrupt(_))
        ));
    }
}
