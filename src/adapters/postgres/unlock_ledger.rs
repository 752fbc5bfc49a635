//! PostgreSQL implementation of UnlockLedger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entitlement::{ChargeStatus, ContactUnlock};
use crate::domain::foundation::{DriverId, PassengerId, Timestamp};
use crate::ports::{RecordOutcome, StoreError, UnlockLedger};

/// PostgreSQL implementation of the UnlockLedger port.
///
/// The `(driver_id, passenger_id)` primary key does the deduplication; no
/// lock and no read-before-write.
pub struct PostgresUnlockLedger {
    pool: PgPool,
}

impl PostgresUnlockLedger {
    /// Creates a new ledger with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UnlockRow {
    driver_id: String,
    passenger_id: Uuid,
    amount_cents: i64,
    currency: String,
    checkout_ref: String,
    charge: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<UnlockRow> for ContactUnlock {
    type Error = StoreError;

    fn try_from(row: UnlockRow) -> Result<Self, Self::Error> {
        Ok(ContactUnlock {
            driver_id: DriverId::new(row.driver_id)
                .map_err(|e| StoreError::Corrupt(format!("invalid driver_id: {}", e)))?,
            passenger_id: PassengerId::from_uuid(row.passenger_id),
            amount_cents: row.amount_cents,
            currency: row.currency,
            checkout_ref: row.checkout_ref,
            charge: parse_charge(&row.charge)?,
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        })
    }
}

fn parse_charge(s: &str) -> Result<ChargeStatus, StoreError> {
    match s {
        "completed" => Ok(ChargeStatus::Completed),
        "failed" => Ok(ChargeStatus::Failed),
        _ => Err(StoreError::Corrupt(format!("invalid charge value: {}", s))),
    }
}

fn charge_to_string(charge: &ChargeStatus) -> &'static str {
    match charge {
        ChargeStatus::Completed => "completed",
        ChargeStatus::Failed => "failed",
    }
}

#[async_trait]
impl UnlockLedger for PostgresUnlockLedger {
    async fn record(&self, unlock: &ContactUnlock) -> Result<RecordOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_unlocks (
                driver_id, passenger_id, amount_cents, currency, checkout_ref, charge, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (driver_id, passenger_id) DO NOTHING
            "#,
        )
        .bind(unlock.driver_id.as_str())
        .bind(unlock.passenger_id.as_uuid())
        .bind(unlock.amount_cents)
        .bind(&unlock.currency)
        .bind(&unlock.checkout_ref)
        .bind(charge_to_string(&unlock.charge))
        .bind(unlock.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to record unlock: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(RecordOutcome::AlreadyRecorded)
        } else {
            Ok(RecordOutcome::Recorded)
        }
    }

    async fn find(
        &self,
        driver_id: &DriverId,
        passenger_id: &PassengerId,
    ) -> Result<Option<ContactUnlock>, StoreError> {
        let row: Option<UnlockRow> = sqlx::query_as(
            r#"
            SELECT driver_id, passenger_id, amount_cents, currency, checkout_ref, charge, recorded_at
            FROM contact_unlocks
            WHERE driver_id = $1 AND passenger_id = $2
            "#,
        )
        .bind(driver_id.as_str())
        .bind(passenger_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to find unlock: {}", e)))?;

        row.map(ContactUnlock::try_from).transpose()
    }
}
