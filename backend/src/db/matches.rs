use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::matching::MatchStore;
use crate::models::{DateProposal, Match};

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
    created_at: DateTime<Utc>,
    active: bool,
    proposals: Json<Vec<DateProposal>>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            id: row.id,
            user_a: row.user_a,
            user_b: row.user_b,
            created_at: row.created_at,
            active: row.active,
            proposals: row.proposals.0,
        }
    }
}

/// Postgres-backed match store
#[derive(Debug, Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Proposal writes are read-modify-write over the JSONB column, so the
    // row is locked for the duration of the mutation.
    async fn lock_match(
        tx: &mut Transaction<'_, Postgres>,
        match_id: Uuid,
    ) -> Result<Match> {
        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT id, user_a, user_b, created_at, active, proposals \
             FROM matches WHERE id = $1 FOR UPDATE",
        )
        .bind(match_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| anyhow!("unknown match {match_id}"))?;

        Ok(row.into())
    }

    async fn store_proposals(
        tx: &mut Transaction<'_, Postgres>,
        record: &Match,
    ) -> Result<()> {
        sqlx::query("UPDATE matches SET proposals = $2 WHERE id = $1")
            .bind(record.id)
            .bind(Json(&record.proposals))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn insert_match(&self, record: &Match) -> Result<()> {
        sqlx::query(
            "INSERT INTO matches (id, user_a, user_b, created_at, active, proposals) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE \
             SET active = EXCLUDED.active, proposals = EXCLUDED.proposals",
        )
        .bind(record.id)
        .bind(record.user_a)
        .bind(record.user_b)
        .bind(record.created_at)
        .bind(record.active)
        .bind(Json(&record.proposals))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active_matches(&self) -> Result<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT id, user_a, user_b, created_at, active, proposals \
             FROM matches WHERE active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn find_match_for_user(&self, user_id: Uuid) -> Result<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT id, user_a, user_b, created_at, active, proposals \
             FROM matches WHERE active = TRUE AND (user_a = $1 OR user_b = $1)",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Match::from))
    }

    async fn deactivate_match(&self, match_id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE matches SET active = FALSE WHERE id = $1")
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("unknown match {match_id}"));
        }
        Ok(())
    }

    async fn append_proposal(
        &self,
        match_id: Uuid,
        made_by: u8,
        at: DateTime<Utc>,
        location: String,
    ) -> Result<Match> {
        let mut tx = self.pool.begin().await?;
        let mut record = Self::lock_match(&mut tx, match_id).await?;
        record.append_proposal(Utc::now(), made_by, at, location)?;
        Self::store_proposals(&mut tx, &record).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn accept_proposal(&self, match_id: Uuid, index: usize) -> Result<Match> {
        let mut tx = self.pool.begin().await?;
        let mut record = Self::lock_match(&mut tx, match_id).await?;
        record.accept_proposal(index)?;
        Self::store_proposals(&mut tx, &record).await?;
        tx.commit().await?;
        Ok(record)
    }
}
