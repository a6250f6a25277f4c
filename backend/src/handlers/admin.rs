use axum::{extract::State, http::HeaderMap, response::Json};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MIN_USER_AGE, TRAIT_SCALE_MAX, TRAIT_SCALE_MIN};
use crate::handlers::{
    AppState, ErrorResponse, bad_request, conflict, internal_error, not_found, unauthorized,
};
use crate::matching::{MatchingError, PassReport, UserStore};
use crate::models::{Gender, MatchingPreference, Traits, User, UserState};

/// The admin surface sits outside the normal authentication pipeline and is
/// guarded by a shared password passed in the Authorization header.
fn check_admin(headers: &HeaderMap, state: &AppState) -> Result<(), ErrorResponse> {
    let provided = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if provided != state.config.admin_password {
        return Err(unauthorized());
    }
    Ok(())
}

/// Trigger one matching pass and report what happened per pool
pub async fn do_match(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassReport>, ErrorResponse> {
    check_admin(&headers, &state)?;

    match state.engine.run_pass().await {
        Ok(report) => {
            if report.has_errors() {
                tracing::warn!("matching pass finished with pool errors");
            }
            Ok(Json(report))
        }
        Err(MatchingError::PassInFlight) => {
            Err(conflict("a matching pass is already running"))
        }
        Err(err) => {
            tracing::error!("matching pass failed: {err}");
            Err(internal_error())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub uid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub uid: Uuid,
    pub state: UserState,
}

/// "Approve" a registration: move a user with completed preferences into the
/// idle pool. Any other lifecycle state is rejected.
pub async fn activate_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, ErrorResponse> {
    check_admin(&headers, &state)?;

    let user = state
        .users
        .get_user(req.uid)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user {}: {err:#}", req.uid);
            internal_error()
        })?
        .ok_or_else(|| not_found(format!("no user {}", req.uid)))?;

    if user.state != UserState::MatchingPreferencesSet {
        return Err(bad_request("invalid state for approval"));
    }

    state
        .users
        .set_user_state(req.uid, UserState::Idle)
        .await
        .map_err(|err| {
            tracing::error!("failed to activate user {}: {err:#}", req.uid);
            internal_error()
        })?;

    Ok(Json(ActivateResponse {
        uid: req.uid,
        state: UserState::Idle,
    }))
}

#[derive(Debug, Serialize)]
pub struct GenerateUserResponse {
    pub uid: Uuid,
    pub email: String,
}

/// Create a random, fully onboarded idle user. Dev/test helper only.
pub async fn generate_random_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GenerateUserResponse>, ErrorResponse> {
    check_admin(&headers, &state)?;

    let user = random_user();
    let response = GenerateUserResponse {
        uid: user.id,
        email: user.email.clone(),
    };

    state.users.create_user(&user).await.map_err(|err| {
        tracing::error!("failed to insert random user: {err:#}");
        internal_error()
    })?;

    tracing::info!("generated random user {} ({})", response.uid, response.email);
    Ok(Json(response))
}

fn random_user() -> User {
    let mut rng = rand::rng();
    let tag: String = Uuid::new_v4().simple().to_string()[..8].to_string();
    let random_traits = |rng: &mut rand::rngs::ThreadRng| Traits {
        romance: rng.random_range(TRAIT_SCALE_MIN..=TRAIT_SCALE_MAX),
        openness: rng.random_range(TRAIT_SCALE_MIN..=TRAIT_SCALE_MAX),
        warmheartedness: rng.random_range(TRAIT_SCALE_MIN..=TRAIT_SCALE_MAX),
    };

    let min_age = rng.random_range(MIN_USER_AGE..60);
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: format!("{tag}@example.com"),
        first_name: tag.clone(),
        last_name: "Example".to_string(),
        age: rng.random_range(MIN_USER_AGE..60),
        gender: if rng.random_bool(0.5) { Gender::Male } else { Gender::Female },
        self_assessment: Some(random_traits(&mut rng)),
        matching_pref: Some(MatchingPreference {
            gender: if rng.random_bool(0.5) { Gender::Male } else { Gender::Female },
            min_age,
            max_age: rng.random_range(min_age..=60),
            traits: random_traits(&mut rng),
        }),
        state: UserState::Idle,
        created_at: now,
        updated_at: now,
    }
}
