use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::constants::{DEFAULT_MATCH_TTL_HOURS, STORE_OP_TIMEOUT_SECS};
use crate::matching::graph::{self, Candidate, Edge};
use crate::matching::store::{MatchStore, UserStore};
use crate::models::{Gender, Match, UserState};

/// Tuning knobs for the matchmaker
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Active matches older than this are released by the expiry sweep
    pub match_ttl: Duration,
    /// Ceiling on every individual store operation during a pass
    pub store_timeout: StdDuration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_ttl: Duration::hours(DEFAULT_MATCH_TTL_HOURS),
            store_timeout: StdDuration::from_secs(STORE_OP_TIMEOUT_SECS),
        }
    }
}

/// The three matching pools walked by one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortPool {
    MaleMale,
    FemaleFemale,
    /// Male-seeking-female and female-seeking-male, matched bipartitely
    Mixed,
}

impl fmt::Display for CohortPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CohortPool::MaleMale => write!(f, "male-male"),
            CohortPool::FemaleFemale => write!(f, "female-female"),
            CohortPool::Mixed => write!(f, "mixed"),
        }
    }
}

/// What happened in one pool during a pass
#[derive(Debug, Clone, Serialize)]
pub struct CohortOutcome {
    pub pool: CohortPool,
    /// Candidates that survived eligibility selection
    pub eligible: usize,
    /// Age-compatible edges the graph produced
    pub edges: usize,
    /// Matches committed
    pub matched: usize,
    /// Set when the pool was abandoned mid-way; committed matches stand
    pub error: Option<String>,
}

impl CohortOutcome {
    fn failed(pool: CohortPool, err: &anyhow::Error) -> Self {
        Self {
            pool,
            eligible: 0,
            edges: 0,
            matched: 0,
            error: Some(format!("{err:#}")),
        }
    }
}

/// Aggregated result of one matching pass, returned to the admin caller
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Matches released by the expiry sweep
    pub expired: usize,
    pub cohorts: Vec<CohortOutcome>,
}

impl PassReport {
    pub fn total_matched(&self) -> usize {
        self.cohorts.iter().map(|c| c.matched).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.cohorts.iter().any(|c| c.error.is_some())
    }
}

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("a matching pass is already running")]
    PassInFlight,
    #[error("expiry sweep failed: {0:#}")]
    ExpirySweep(anyhow::Error),
}

/// Periodic mutual matchmaker.
///
/// One pass: expire stale matches, then for each pool select the idle
/// cohort(s), build the weighted compatibility graph and resolve it
/// greedily. Store access goes through the injected trait objects only.
pub struct MatchEngine {
    users: Arc<dyn UserStore>,
    matches: Arc<dyn MatchStore>,
    config: EngineConfig,
    // Single-flight gate: a second pass started while one is running is
    // rejected, never queued.
    pass_gate: Mutex<()>,
}

impl MatchEngine {
    pub fn new(users: Arc<dyn UserStore>, matches: Arc<dyn MatchStore>, config: EngineConfig) -> Self {
        Self {
            users,
            matches,
            config,
            pass_gate: Mutex::new(()),
        }
    }

    /// Run one full matching pass.
    ///
    /// Pool failures are isolated: an error in one pool is recorded in the
    /// report and the remaining pools still run. Matches committed before a
    /// failure are not rolled back; the next pass reconciles naturally since
    /// unmatched users stay idle.
    pub async fn run_pass(&self) -> Result<PassReport, MatchingError> {
        let _running = self
            .pass_gate
            .try_lock()
            .map_err(|_| MatchingError::PassInFlight)?;

        info!("starting matching pass");
        let expired = self
            .expire_stale()
            .await
            .map_err(MatchingError::ExpirySweep)?;

        let mut cohorts = Vec::with_capacity(3);
        for pool in [CohortPool::MaleMale, CohortPool::FemaleFemale, CohortPool::Mixed] {
            match self.match_pool(pool).await {
                Ok(outcome) => {
                    info!(
                        "pool {pool}: {} eligible, {} edges, {} matched",
                        outcome.eligible, outcome.edges, outcome.matched
                    );
                    cohorts.push(outcome);
                }
                Err(err) => {
                    error!("pool {pool} abandoned: {err:#}");
                    cohorts.push(CohortOutcome::failed(pool, &err));
                }
            }
        }

        let report = PassReport { expired, cohorts };
        info!(
            "matching pass done: {} expired, {} matched",
            report.expired,
            report.total_matched()
        );
        Ok(report)
    }

    /// Deactivate every active match older than the ttl and return both of
    /// its users to the idle pool. Runs before selection so freshly-expired
    /// users are eligible in the same pass.
    async fn expire_stale(&self) -> Result<usize> {
        let now = Utc::now();
        let active = self.with_timeout(self.matches.find_active_matches()).await?;

        let mut expired = 0;
        for record in active {
            if !record.is_stale(now, self.config.match_ttl) {
                continue;
            }
            self.release(&record).await?;
            info!(
                "expired match {} ({} / {})",
                record.id, record.user_a, record.user_b
            );
            expired += 1;
        }
        Ok(expired)
    }

    /// Deactivate a match and return both users to `Idle`
    async fn release(&self, record: &Match) -> Result<()> {
        self.with_timeout(self.matches.deactivate_match(record.id)).await?;
        self.with_timeout(self.users.set_user_state(record.user_a, UserState::Idle))
            .await?;
        self.with_timeout(self.users.set_user_state(record.user_b, UserState::Idle))
            .await?;
        Ok(())
    }

    /// Explicitly unmatch a user: deactivate their active match (if any) and
    /// idle both sides. Returns the released match.
    pub async fn unmatch(&self, user_id: Uuid) -> Result<Option<Match>> {
        let Some(record) = self
            .with_timeout(self.matches.find_match_for_user(user_id))
            .await?
        else {
            return Ok(None);
        };
        self.release(&record).await?;
        info!(
            "unmatched {} ({} / {})",
            record.id, record.user_a, record.user_b
        );
        Ok(Some(record))
    }

    async fn match_pool(&self, pool: CohortPool) -> Result<CohortOutcome> {
        let (eligible, edges) = match pool {
            CohortPool::MaleMale => {
                let group = self.select(Gender::Male, Gender::Male).await?;
                (group.len(), graph::build_graph_within(&group))
            }
            CohortPool::FemaleFemale => {
                let group = self.select(Gender::Female, Gender::Female).await?;
                (group.len(), graph::build_graph_within(&group))
            }
            CohortPool::Mixed => {
                let seeking_f = self.select(Gender::Male, Gender::Female).await?;
                let seeking_m = self.select(Gender::Female, Gender::Male).await?;
                (
                    seeking_f.len() + seeking_m.len(),
                    graph::build_graph_between(&seeking_f, &seeking_m),
                )
            }
        };

        let edge_count = edges.len();
        let matched = self.resolve(edges).await?;
        Ok(CohortOutcome {
            pool,
            eligible,
            edges: edge_count,
            matched,
            error: None,
        })
    }

    async fn select(&self, gender: Gender, desired: Gender) -> Result<Vec<Candidate>> {
        let users = self
            .with_timeout(self.users.list_idle_by_gender_pair(gender, desired))
            .await?;
        Ok(users.iter().filter_map(Candidate::from_user).collect())
    }

    /// Greedy resolution: commit the lowest-weight edge, then drop every
    /// remaining edge touching either endpoint. Deliberately a greedy
    /// approximation of maximum matching, not a globally optimal one.
    async fn resolve(&self, mut edges: Vec<Edge>) -> Result<usize> {
        let mut committed = 0;
        while !edges.is_empty() {
            let best = edges.remove(0);

            // Re-check both users right before committing. Anyone matched
            // elsewhere since selection is silently skipped.
            if !self.still_idle(best.user_a).await? || !self.still_idle(best.user_b).await? {
                debug!(
                    "skipping edge {} / {}: no longer idle",
                    best.user_a, best.user_b
                );
                continue;
            }

            let record = Match::new(best.user_a, best.user_b, Utc::now());
            self.with_timeout(self.matches.insert_match(&record)).await?;
            self.with_timeout(self.users.set_user_state(best.user_a, UserState::Matched))
                .await?;
            self.with_timeout(self.users.set_user_state(best.user_b, UserState::Matched))
                .await?;
            committed += 1;
            info!(
                "matched {} / {} (weight {:.3})",
                best.user_a, best.user_b, best.weight
            );

            // Rebuild rather than splice in place
            edges.retain(|e| !e.touches(best.user_a) && !e.touches(best.user_b));
        }
        Ok(committed)
    }

    async fn still_idle(&self, user_id: Uuid) -> Result<bool> {
        let user = self.with_timeout(self.users.get_user(user_id)).await?;
        Ok(user.is_some_and(|u| u.state == UserState::Idle))
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "store operation timed out after {:?}",
                self.config.store_timeout
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    use crate::models::{MatchingPreference, Traits, User};

    /// In-memory store backing engine tests; implements both store traits.
    #[derive(Default)]
    struct MemoryStore {
        users: StdMutex<HashMap<Uuid, User>>,
        matches: StdMutex<Vec<Match>>,
        /// insert_match fails for matches touching any of these users
        fail_inserts_for: StdMutex<HashSet<Uuid>>,
        /// get_user reports these users as already matched
        report_matched: StdMutex<HashSet<Uuid>>,
        /// when set, find_active_matches signals `entered` then waits on `resume`
        entered: Option<Arc<Notify>>,
        resume: Option<Arc<Notify>>,
    }

    impl MemoryStore {
        fn add_user(&self, user: User) {
            self.users.lock().unwrap().insert(user.id, user);
        }

        fn add_match(&self, record: Match) {
            self.matches.lock().unwrap().push(record);
        }

        fn user_state(&self, id: Uuid) -> UserState {
            self.users.lock().unwrap()[&id].state
        }

        fn all_matches(&self) -> Vec<Match> {
            self.matches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn list_idle_by_gender_pair(
            &self,
            gender: Gender,
            desired: Gender,
        ) -> Result<Vec<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .filter(|u| {
                    u.state == UserState::Idle
                        && u.gender == gender
                        && u.matching_pref.is_some_and(|p| p.gender == desired)
                })
                .cloned()
                .collect())
        }

        async fn set_user_state(&self, user_id: Uuid, state: UserState) -> Result<()> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| anyhow!("unknown user {user_id}"))?;
            user.state = state;
            Ok(())
        }

        async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
            let mut user = self.users.lock().unwrap().get(&user_id).cloned();
            if self.report_matched.lock().unwrap().contains(&user_id) {
                if let Some(u) = user.as_mut() {
                    u.state = UserState::Matched;
                }
            }
            Ok(user)
        }
    }

    #[async_trait]
    impl MatchStore for MemoryStore {
        async fn insert_match(&self, record: &Match) -> Result<()> {
            let blocked = self.fail_inserts_for.lock().unwrap();
            if blocked.contains(&record.user_a) || blocked.contains(&record.user_b) {
                return Err(anyhow!("simulated storage failure"));
            }
            drop(blocked);
            self.matches.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn find_active_matches(&self) -> Result<Vec<Match>> {
            if let (Some(entered), Some(resume)) = (&self.entered, &self.resume) {
                entered.notify_one();
                resume.notified().await;
            }
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.active)
                .cloned()
                .collect())
        }

        async fn find_match_for_user(&self, user_id: Uuid) -> Result<Option<Match>> {
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.active && m.involves(user_id))
                .cloned())
        }

        async fn deactivate_match(&self, match_id: Uuid) -> Result<()> {
            let mut matches = self.matches.lock().unwrap();
            let record = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or_else(|| anyhow!("unknown match {match_id}"))?;
            record.active = false;
            Ok(())
        }

        async fn append_proposal(
            &self,
            match_id: Uuid,
            made_by: u8,
            at: DateTime<Utc>,
            location: String,
        ) -> Result<Match> {
            let mut matches = self.matches.lock().unwrap();
            let record = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or_else(|| anyhow!("unknown match {match_id}"))?;
            record.append_proposal(Utc::now(), made_by, at, location)?;
            Ok(record.clone())
        }

        async fn accept_proposal(&self, match_id: Uuid, index: usize) -> Result<Match> {
            let mut matches = self.matches.lock().unwrap();
            let record = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or_else(|| anyhow!("unknown match {match_id}"))?;
            record.accept_proposal(index)?;
            Ok(record.clone())
        }
    }

    fn idle_user(gender: Gender, desired: Gender, age: i32) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            first_name: "Test".into(),
            last_name: "User".into(),
            age,
            gender,
            self_assessment: Some(Traits {
                romance: 3,
                openness: 3,
                warmheartedness: 3,
            }),
            matching_pref: Some(MatchingPreference {
                gender: desired,
                min_age: 18,
                max_age: 60,
                traits: Traits {
                    romance: 3,
                    openness: 3,
                    warmheartedness: 3,
                },
            }),
            state: UserState::Idle,
            created_at: now,
            updated_at: now,
        }
    }

    fn engine_over(store: &Arc<MemoryStore>) -> MatchEngine {
        MatchEngine::new(store.clone(), store.clone(), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_mm_scenario_single_compatible_pair() {
        let store = Arc::new(MemoryStore::default());
        let mut a = idle_user(Gender::Male, Gender::Male, 25);
        a.matching_pref.as_mut().unwrap().min_age = 20;
        a.matching_pref.as_mut().unwrap().max_age = 30;
        let mut b = idle_user(Gender::Male, Gender::Male, 28);
        b.matching_pref.as_mut().unwrap().min_age = 22;
        b.matching_pref.as_mut().unwrap().max_age = 35;
        let mut c = idle_user(Gender::Male, Gender::Male, 40);
        c.matching_pref.as_mut().unwrap().min_age = 35;
        c.matching_pref.as_mut().unwrap().max_age = 45;
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        store.add_user(a);
        store.add_user(b);
        store.add_user(c);

        let report = engine_over(&store).run_pass().await.unwrap();

        assert_eq!(report.total_matched(), 1);
        assert!(!report.has_errors());
        let mm = &report.cohorts[0];
        assert_eq!(mm.pool, CohortPool::MaleMale);
        assert_eq!(mm.eligible, 3);
        assert_eq!(mm.edges, 1);
        assert_eq!(mm.matched, 1);

        assert_eq!(store.user_state(a_id), UserState::Matched);
        assert_eq!(store.user_state(b_id), UserState::Matched);
        assert_eq!(store.user_state(c_id), UserState::Idle);
        let committed = store.all_matches();
        assert_eq!(committed.len(), 1);
        assert!(committed[0].involves(a_id) && committed[0].involves(b_id));
        assert!(committed[0].active);
        assert!(committed[0].proposals.is_empty());
    }

    #[tokio::test]
    async fn test_greedy_commits_best_edge_first() {
        let store = Arc::new(MemoryStore::default());
        // m1 is a perfect mutual fit for f; m2 is further away on every trait
        let m1 = idle_user(Gender::Male, Gender::Female, 25);
        let mut m2 = idle_user(Gender::Male, Gender::Female, 25);
        m2.self_assessment = Some(Traits {
            romance: 1,
            openness: 1,
            warmheartedness: 1,
        });
        let f = idle_user(Gender::Female, Gender::Male, 25);
        let (m1_id, m2_id, f_id) = (m1.id, m2.id, f.id);
        store.add_user(m1);
        store.add_user(m2);
        store.add_user(f);

        let report = engine_over(&store).run_pass().await.unwrap();

        assert_eq!(report.total_matched(), 1);
        let committed = store.all_matches();
        assert!(committed[0].involves(m1_id) && committed[0].involves(f_id));
        assert_eq!(store.user_state(m2_id), UserState::Idle);
    }

    #[tokio::test]
    async fn test_no_user_in_two_matches_and_rerun_is_noop() {
        let store = Arc::new(MemoryStore::default());
        let ids: Vec<Uuid> = (0..4)
            .map(|i| {
                let user = idle_user(Gender::Female, Gender::Female, 24 + i);
                let id = user.id;
                store.add_user(user);
                id
            })
            .collect();

        let engine = engine_over(&store);
        let report = engine.run_pass().await.unwrap();
        assert_eq!(report.total_matched(), 2);

        let committed = store.all_matches();
        let mut seen = HashSet::new();
        for record in &committed {
            assert!(seen.insert(record.user_a), "user matched twice");
            assert!(seen.insert(record.user_b), "user matched twice");
        }
        for id in &ids {
            assert_eq!(store.user_state(*id), UserState::Matched);
        }

        // everyone is matched now, so a second pass commits nothing
        let report = engine.run_pass().await.unwrap();
        assert_eq!(report.total_matched(), 0);
        assert_eq!(store.all_matches().len(), 2);
    }

    #[tokio::test]
    async fn test_conflicting_edge_skipped_silently() {
        let store = Arc::new(MemoryStore::default());
        let a = idle_user(Gender::Male, Gender::Male, 25);
        let b = idle_user(Gender::Male, Gender::Male, 26);
        let (a_id, b_id) = (a.id, b.id);
        store.add_user(a);
        store.add_user(b);
        // b gets matched by a concurrent writer between selection and commit
        store.report_matched.lock().unwrap().insert(b_id);

        let report = engine_over(&store).run_pass().await.unwrap();

        assert!(!report.has_errors());
        assert_eq!(report.total_matched(), 0);
        assert!(store.all_matches().is_empty());
        assert_eq!(store.user_state(a_id), UserState::Idle);
    }

    #[tokio::test]
    async fn test_pool_failure_does_not_block_other_pools() {
        let store = Arc::new(MemoryStore::default());
        let a = idle_user(Gender::Male, Gender::Male, 25);
        let b = idle_user(Gender::Male, Gender::Male, 26);
        let m = idle_user(Gender::Male, Gender::Female, 30);
        let f = idle_user(Gender::Female, Gender::Male, 30);
        let (a_id, b_id, m_id, f_id) = (a.id, b.id, m.id, f.id);
        store.fail_inserts_for.lock().unwrap().insert(a_id);
        store.add_user(a);
        store.add_user(b);
        store.add_user(m);
        store.add_user(f);

        let report = engine_over(&store).run_pass().await.unwrap();

        let mm = &report.cohorts[0];
        assert!(mm.error.is_some());
        assert_eq!(mm.matched, 0);
        // the failed insert never flipped the users
        assert_eq!(store.user_state(a_id), UserState::Idle);
        assert_eq!(store.user_state(b_id), UserState::Idle);

        // the mixed pool still ran to completion
        let mixed = &report.cohorts[2];
        assert!(mixed.error.is_none());
        assert_eq!(mixed.matched, 1);
        assert_eq!(store.user_state(m_id), UserState::Matched);
        assert_eq!(store.user_state(f_id), UserState::Matched);
    }

    #[tokio::test]
    async fn test_expiry_releases_only_stale_matches() {
        let store = Arc::new(MemoryStore::default());
        // users without preferences so the pools stay empty after release
        let mut old_a = idle_user(Gender::Male, Gender::Female, 25);
        let mut old_b = idle_user(Gender::Female, Gender::Male, 25);
        let mut new_a = idle_user(Gender::Male, Gender::Female, 25);
        let mut new_b = idle_user(Gender::Female, Gender::Male, 25);
        for u in [&mut old_a, &mut old_b, &mut new_a, &mut new_b] {
            u.matching_pref = None;
            u.state = UserState::Matched;
        }
        let (old_a_id, old_b_id) = (old_a.id, old_b.id);
        let (new_a_id, new_b_id) = (new_a.id, new_b.id);
        store.add_user(old_a);
        store.add_user(old_b);
        store.add_user(new_a);
        store.add_user(new_b);

        let stale = Match::new(old_a_id, old_b_id, Utc::now() - Duration::hours(40));
        let fresh = Match::new(new_a_id, new_b_id, Utc::now() - Duration::hours(10));
        let stale_id = stale.id;
        store.add_match(stale);
        store.add_match(fresh.clone());

        let report = engine_over(&store).run_pass().await.unwrap();

        assert_eq!(report.expired, 1);
        // round trip: both released users idle again, no active match for them
        assert_eq!(store.user_state(old_a_id), UserState::Idle);
        assert_eq!(store.user_state(old_b_id), UserState::Idle);
        assert!(
            store
                .find_match_for_user(old_a_id)
                .await
                .unwrap()
                .is_none()
        );
        let all = store.all_matches();
        assert!(!all.iter().find(|m| m.id == stale_id).unwrap().active);

        // the 10h-old match is untouched
        assert!(all.iter().find(|m| m.id == fresh.id).unwrap().active);
        assert_eq!(store.user_state(new_a_id), UserState::Matched);
        assert_eq!(store.user_state(new_b_id), UserState::Matched);
    }

    #[tokio::test]
    async fn test_unmatch_round_trip() {
        let store = Arc::new(MemoryStore::default());
        let a = idle_user(Gender::Male, Gender::Female, 25);
        let f = idle_user(Gender::Female, Gender::Male, 25);
        let (a_id, f_id) = (a.id, f.id);
        store.add_user(a);
        store.add_user(f);

        let engine = engine_over(&store);
        engine.run_pass().await.unwrap();
        assert_eq!(store.user_state(a_id), UserState::Matched);

        let released = engine.unmatch(a_id).await.unwrap();
        assert!(released.is_some());
        assert_eq!(store.user_state(a_id), UserState::Idle);
        assert_eq!(store.user_state(f_id), UserState::Idle);
        assert!(store.find_match_for_user(f_id).await.unwrap().is_none());

        // nothing active anymore
        assert!(engine.unmatch(a_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_concurrent_pass_is_rejected() {
        let entered = Arc::new(Notify::new());
        let resume = Arc::new(Notify::new());
        let store = Arc::new(MemoryStore {
            entered: Some(entered.clone()),
            resume: Some(resume.clone()),
            ..MemoryStore::default()
        });

        let engine = Arc::new(engine_over(&store));
        let background = engine.clone();
        let first = tokio::spawn(async move { background.run_pass().await });

        // wait until the first pass holds the gate inside the expiry sweep
        entered.notified().await;
        let second = engine.run_pass().await;
        assert!(matches!(second, Err(MatchingError::PassInFlight)));

        resume.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.expired, 0);
    }

    #[tokio::test]
    async fn test_incomplete_idle_users_never_reach_the_graph() {
        let store = Arc::new(MemoryStore::default());
        let a = idle_user(Gender::Male, Gender::Male, 25);
        let mut broken = idle_user(Gender::Male, Gender::Male, 26);
        broken.self_assessment = None;
        let mut inverted = idle_user(Gender::Male, Gender::Male, 27);
        {
            let pref = inverted.matching_pref.as_mut().unwrap();
            pref.min_age = 40;
            pref.max_age = 20;
        }
        store.add_user(a);
        store.add_user(broken);
        store.add_user(inverted);

        let report = engine_over(&store).run_pass().await.unwrap();
        let mm = &report.cohorts[0];
        // selection returned three rows but only one survives validation
        assert_eq!(mm.eligible, 1);
        assert_eq!(mm.edges, 0);
        assert_eq!(mm.matched, 0);
    }
}
