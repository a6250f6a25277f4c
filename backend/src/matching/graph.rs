use tracing::warn;
use uuid::Uuid;

use crate::models::{MatchingPreference, Traits, User};

/// An eligible user projected down to the fields the graph needs
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: Uuid,
    pub age: i32,
    pub traits: Traits,
    pub pref: MatchingPreference,
}

impl Candidate {
    /// Project a stored user into a candidate.
    ///
    /// Users that reached `Idle` without a complete self-assessment or
    /// preference, or with an inverted age range, are dropped here so they
    /// never reach graph construction.
    pub fn from_user(user: &User) -> Option<Self> {
        let (Some(traits), Some(pref)) = (user.self_assessment, user.matching_pref) else {
            warn!("user {} is idle but not fully onboarded, skipping", user.id);
            return None;
        };
        if pref.min_age > pref.max_age {
            warn!(
                "user {} has an inverted age range {}..{}, skipping",
                user.id, pref.min_age, pref.max_age
            );
            return None;
        }
        if !traits.is_valid() || !pref.traits.is_valid() {
            warn!("user {} has trait values off the 1..=5 scale, skipping", user.id);
            return None;
        }
        Some(Self {
            id: user.id,
            age: user.age,
            traits,
            pref,
        })
    }
}

/// A candidate pairing and its compatibility score. Lower weight is better.
/// Edges only ever live inside a single matching pass.
#[derive(Debug, Clone)]
pub struct Edge {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub weight: f64,
}

impl Edge {
    pub fn touches(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }
}

/// Both sides must find the other's age acceptable
fn ages_compatible(u: &Candidate, v: &Candidate) -> bool {
    u.pref.accepts_age(v.age) && v.pref.accepts_age(u.age)
}

/// Six-dimensional Euclidean distance: how far u's self-assessment sits from
/// v's stated preference, and vice versa, over the three traits.
fn compatibility_weight(u: &Candidate, v: &Candidate) -> f64 {
    fn sq(a: i32, b: i32) -> f64 {
        let diff = (a - b) as f64;
        diff * diff
    }
    (sq(u.traits.openness, v.pref.traits.openness)
        + sq(u.traits.romance, v.pref.traits.romance)
        + sq(u.traits.warmheartedness, v.pref.traits.warmheartedness)
        + sq(v.traits.openness, u.pref.traits.openness)
        + sq(v.traits.romance, u.pref.traits.romance)
        + sq(v.traits.warmheartedness, u.pref.traits.warmheartedness))
    .sqrt()
}

fn try_edge(u: &Candidate, v: &Candidate) -> Option<Edge> {
    if u.id == v.id {
        return None;
    }
    if !ages_compatible(u, v) {
        return None;
    }
    Some(Edge {
        user_a: u.id,
        user_b: v.id,
        weight: compatibility_weight(u, v),
    })
}

/// Edges within one same-gender pool, each unordered pair considered once,
/// sorted ascending by weight.
pub fn build_graph_within(pool: &[Candidate]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, u) in pool.iter().enumerate() {
        for v in &pool[i + 1..] {
            if let Some(edge) = try_edge(u, v) {
                edges.push(edge);
            }
        }
    }
    sort_edges(&mut edges);
    edges
}

/// Edges between two disjoint pools (the male-seeking-female and
/// female-seeking-male cohorts), sorted ascending by weight.
pub fn build_graph_between(left: &[Candidate], right: &[Candidate]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for u in left {
        for v in right {
            if let Some(edge) = try_edge(u, v) {
                edges.push(edge);
            }
        }
    }
    sort_edges(&mut edges);
    edges
}

// Stable sort so equal weights keep insertion order and passes stay
// deterministic under a fixed input.
fn sort_edges(edges: &mut [Edge]) {
    edges.sort_by(|a, b| a.weight.total_cmp(&b.weight));
}
