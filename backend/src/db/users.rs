use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::matching::UserStore;
use crate::models::{Gender, MatchingPreference, Traits, User, UserState};

const USER_COLUMNS: &str = "id, email, first_name, last_name, age, gender, \
     sa_romance, sa_openness, sa_warmheartedness, \
     pref_gender, pref_min_age, pref_max_age, \
     pref_romance, pref_openness, pref_warmheartedness, \
     state, created_at, updated_at";

/// Raw users row; onboarding payloads are nullable until the user fills
/// them in, so they come back as column groups that either exist fully
/// or not at all.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    age: i32,
    gender: i16,
    sa_romance: Option<i16>,
    sa_openness: Option<i16>,
    sa_warmheartedness: Option<i16>,
    pref_gender: Option<i16>,
    pref_min_age: Option<i32>,
    pref_max_age: Option<i32>,
    pref_romance: Option<i16>,
    pref_openness: Option<i16>,
    pref_warmheartedness: Option<i16>,
    state: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_model(self) -> Result<User> {
        let gender = Gender::from_i16(self.gender)
            .ok_or_else(|| anyhow!("invalid gender {} for user {}", self.gender, self.id))?;
        let state = UserState::from_i16(self.state)
            .ok_or_else(|| anyhow!("invalid state {} for user {}", self.state, self.id))?;

        let self_assessment =
            match (self.sa_romance, self.sa_openness, self.sa_warmheartedness) {
                (Some(romance), Some(openness), Some(warmheartedness)) => Some(Traits {
                    romance: romance as i32,
                    openness: openness as i32,
                    warmheartedness: warmheartedness as i32,
                }),
                _ => None,
            };

        let matching_pref = match (
            self.pref_gender,
            self.pref_min_age,
            self.pref_max_age,
            self.pref_romance,
            self.pref_openness,
            self.pref_warmheartedness,
        ) {
            (Some(g), Some(min_age), Some(max_age), Some(romance), Some(openness), Some(warmheartedness)) => {
                Some(MatchingPreference {
                    gender: Gender::from_i16(g)
                        .ok_or_else(|| anyhow!("invalid preferred gender {g} for user {}", self.id))?,
                    min_age,
                    max_age,
                    traits: Traits {
                        romance: romance as i32,
                        openness: openness as i32,
                        warmheartedness: warmheartedness as i32,
                    },
                })
            }
            _ => None,
        };

        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            gender,
            self_assessment,
            matching_pref,
            state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Postgres-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fully-formed user row. Used by the admin test-data
    /// generator; real registration lives in the web tier upstream.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, age, gender, \
             sa_romance, sa_openness, sa_warmheartedness, \
             pref_gender, pref_min_age, pref_max_age, \
             pref_romance, pref_openness, pref_warmheartedness, \
             state, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.age)
        .bind(user.gender.as_i16())
        .bind(user.self_assessment.map(|t| t.romance as i16))
        .bind(user.self_assessment.map(|t| t.openness as i16))
        .bind(user.self_assessment.map(|t| t.warmheartedness as i16))
        .bind(user.matching_pref.map(|p| p.gender.as_i16()))
        .bind(user.matching_pref.map(|p| p.min_age))
        .bind(user.matching_pref.map(|p| p.max_age))
        .bind(user.matching_pref.map(|p| p.traits.romance as i16))
        .bind(user.matching_pref.map(|p| p.traits.openness as i16))
        .bind(user.matching_pref.map(|p| p.traits.warmheartedness as i16))
        .bind(user.state.as_i16())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_idle_by_gender_pair(
        &self,
        gender: Gender,
        desired: Gender,
    ) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE state = $1 AND gender = $2 AND pref_gender = $3"
        ))
        .bind(UserState::Idle.as_i16())
        .bind(gender.as_i16())
        .bind(desired.as_i16())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_model).collect()
    }

    async fn set_user_state(&self, user_id: Uuid, state: UserState) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET state = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(state.as_i16())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("unknown user {user_id}"));
        }
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_model).transpose()
    }
}
