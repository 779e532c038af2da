//! PostgreSQL Network Store Implementation
//!
//! Implements the NetworkStore trait using SQLx for PostgreSQL. Segment keys
//! are reserved with `INSERT ... ON CONFLICT DO NOTHING` against the
//! `segment_allocations` primary key, so a concurrent reservation of the same
//! key waits for the other transaction and then loses cleanly. Each insert runs
//! under a savepoint: when two transactions wait on each other's keys the
//! deadlock victim rolls back to the savepoint and reports the key as taken.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::gateways::{NetworkStore, NetworkTransaction};
use crate::domain::models::network::{Network, NetworkId};
use crate::domain::models::segment::{NetworkSegment, SegmentKey, SegmentRange};
use crate::shared::errors::RepositoryError;

/// Attempts at picking a free pool id before giving up on a contended range
const MAX_ALLOCATION_ATTEMPTS: usize = 10;

/// SQLSTATE `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";

/// Whether `err` means this transaction lost a lock race to another one
fn is_lost_race(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == DEADLOCK_DETECTED || code == SERIALIZATION_FAILURE)
}

/// Database row representation for network table
#[derive(Debug, sqlx::FromRow)]
struct NetworkRow {
    id: Uuid,
    tenant_id: String,
    name: String,
    external: Option<bool>,
    mtu: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NetworkRow> for Network {
    type Error = RepositoryError;

    fn try_from(row: NetworkRow) -> Result<Self, Self::Error> {
        Ok(Network::restore(
            NetworkId::from_uuid(row.id),
            row.tenant_id,
            row.name,
            row.external,
            row.mtu.map(to_u32).transpose()?,
            row.created_at,
        ))
    }
}

/// Database row representation for network_segments table
#[derive(Debug, sqlx::FromRow)]
struct SegmentRow {
    network_id: Uuid,
    segment_index: i32,
    network_type: String,
    physical_network: Option<String>,
    segment_id: Option<i64>,
    mtu: Option<i32>,
}

impl TryFrom<SegmentRow> for NetworkSegment {
    type Error = RepositoryError;

    fn try_from(row: SegmentRow) -> Result<Self, Self::Error> {
        Ok(NetworkSegment {
            network_id: NetworkId::from_uuid(row.network_id),
            segment_index: to_u32(row.segment_index)?,
            network_type: row.network_type,
            physical_network: row.physical_network,
            segment_id: row.segment_id.map(to_u32).transpose()?,
            mtu: row.mtu.map(to_u32).transpose()?,
        })
    }
}

fn to_u32<T>(value: T) -> Result<u32, RepositoryError>
where
    T: TryInto<u32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| RepositoryError::Mapping(format!("value {value} out of range")))
}

fn to_i32(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Mapping(format!("value {value} out of range")))
}

/// PostgreSQL implementation of NetworkStore
pub struct PostgresNetworkStore {
    pool: PgPool,
}

impl PostgresNetworkStore {
    /// Create a new PostgresNetworkStore
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NetworkStore for PostgresNetworkStore {
    async fn begin(&self) -> Result<Box<dyn NetworkTransaction>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresNetworkTransaction { tx }))
    }

    async fn find_by_id(&self, id: &NetworkId) -> Result<Option<Network>, RepositoryError> {
        let row = sqlx::query_as::<_, NetworkRow>(
            r#"
            SELECT id, tenant_id, name, external, mtu, created_at
            FROM networks
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Network::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Network>, RepositoryError> {
        let rows = sqlx::query_as::<_, NetworkRow>(
            r#"
            SELECT id, tenant_id, name, external, mtu, created_at
            FROM networks
            ORDER BY name ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Network::try_from).collect()
    }

    async fn find_segments(
        &self,
        ids: &[NetworkId],
    ) -> Result<HashMap<NetworkId, Vec<NetworkSegment>>, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, SegmentRow>(
            r#"
            SELECT network_id, segment_index, network_type, physical_network, segment_id, mtu
            FROM network_segments
            WHERE network_id = ANY($1)
            ORDER BY network_id, segment_index ASC
            "#,
        )
        .bind(uuids)
        .fetch_all(&self.pool)
        .await?;

        let mut segments: HashMap<NetworkId, Vec<NetworkSegment>> = HashMap::new();
        for row in rows {
            let segment = NetworkSegment::try_from(row)?;
            segments.entry(segment.network_id).or_default().push(segment);
        }
        Ok(segments)
    }
}

/// Open PostgreSQL transaction; rolled back by sqlx when dropped uncommitted
pub struct PostgresNetworkTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresNetworkTransaction {
    /// Insert one reservation row. `false` when the key is already held or
    /// the insert lost a deadlock against another reservation.
    async fn insert_allocation(
        &mut self,
        network_type: &str,
        physical_network: &str,
        segment_id: i64,
    ) -> Result<bool, RepositoryError> {
        sqlx::query("SAVEPOINT segment_allocation")
            .execute(&mut *self.tx)
            .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO segment_allocations (network_type, physical_network, segment_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(network_type)
        .bind(physical_network)
        .bind(segment_id)
        .execute(&mut *self.tx)
        .await;

        match inserted {
            Ok(result) => {
                sqlx::query("RELEASE SAVEPOINT segment_allocation")
                    .execute(&mut *self.tx)
                    .await?;
                Ok(result.rows_affected() == 1)
            }
            Err(err) if is_lost_race(&err) => {
                tracing::debug!(
                    network_type = %network_type,
                    physical_network = %physical_network,
                    segment_id,
                    error = %err,
                    "Reservation lost a lock race"
                );
                sqlx::query("ROLLBACK TO SAVEPOINT segment_allocation")
                    .execute(&mut *self.tx)
                    .await?;
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl NetworkTransaction for PostgresNetworkTransaction {
    async fn insert_network(&mut self, network: &Network) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO networks (id, tenant_id, name, external, mtu, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(network.id().as_uuid())
        .bind(network.tenant_id())
        .bind(network.name())
        .bind(network.external())
        .bind(network.mtu().map(to_i32).transpose()?)
        .bind(network.created_at())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn set_network_mtu(&mut self, id: &NetworkId, mtu: Option<u32>) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE networks SET mtu = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(mtu.map(to_i32).transpose()?)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("network {id}")));
        }
        Ok(())
    }

    async fn reserve_segment(&mut self, key: &SegmentKey) -> Result<bool, RepositoryError> {
        let physical_network = key.physical_network.as_deref().unwrap_or_default();
        let segment_id = key.segment_id.map_or(0, i64::from);
        self.insert_allocation(&key.network_type, physical_network, segment_id)
            .await
    }

    async fn allocate_segment_id(
        &mut self,
        network_type: &str,
        physical_network: Option<&str>,
        range: SegmentRange,
    ) -> Result<Option<u32>, RepositoryError> {
        let physical_network = physical_network.unwrap_or_default();

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            // Lowest free id: either the range start or one past a held id
            let candidate = sqlx::query_scalar::<_, Option<i64>>(
                r#"
                SELECT MIN(c.candidate)
                FROM (
                    SELECT $3::BIGINT AS candidate
                    UNION ALL
                    SELECT a.segment_id + 1
                    FROM segment_allocations a
                    WHERE a.network_type = $1
                      AND a.physical_network = $2
                      AND a.segment_id >= $3
                      AND a.segment_id < $4
                ) AS c
                WHERE NOT EXISTS (
                    SELECT 1 FROM segment_allocations a
                    WHERE a.network_type = $1
                      AND a.physical_network = $2
                      AND a.segment_id = c.candidate
                )
                "#,
            )
            .bind(network_type)
            .bind(physical_network)
            .bind(i64::from(range.min))
            .bind(i64::from(range.max))
            .fetch_one(&mut *self.tx)
            .await?;

            let Some(candidate) = candidate else {
                return Ok(None);
            };
            if self
                .insert_allocation(network_type, physical_network, candidate)
                .await?
            {
                return to_u32(candidate).map(Some);
            }
            tracing::debug!(
                network_type = %network_type,
                physical_network = %physical_network,
                segment_id = candidate,
                "Pool candidate taken concurrently, retrying"
            );
        }

        tracing::warn!(
            network_type = %network_type,
            range = %range,
            "Segment pool allocation kept losing races"
        );
        Err(RepositoryError::Unavailable(format!(
            "could not allocate a {network_type} segment from {range} after {MAX_ALLOCATION_ATTEMPTS} attempts"
        )))
    }

    async fn add_network_segment(&mut self, segment: &NetworkSegment) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO network_segments (
                network_id, segment_index, network_type, physical_network, segment_id, mtu
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(segment.network_id.as_uuid())
        .bind(to_i32(segment.segment_index)?)
        .bind(&segment.network_type)
        .bind(segment.physical_network.as_deref())
        .bind(segment.segment_id.map(i64::from))
        .bind(segment.mtu.map(to_i32).transpose()?)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
