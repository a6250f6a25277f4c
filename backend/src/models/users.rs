use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Biological gender of a user, also used for partner preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_i16(self) -> i16 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Gender::Male),
            1 => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Onboarding/matching lifecycle of a user
///
/// The order matters: states only ever advance through onboarding, and the
/// matchmaker moves users between `Idle` and `Matched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    /// Default state after registration
    Registered,
    /// After uploading minimum photos
    PhotoUploaded,
    /// After finishing self-assessment
    SelfAssessmentDone,
    /// After finishing setting preferences
    MatchingPreferencesSet,
    /// Approved and waiting to be matched
    Idle,
    /// Currently in an active match
    Matched,
}

impl UserState {
    pub fn as_i16(self) -> i16 {
        match self {
            UserState::Registered => 0,
            UserState::PhotoUploaded => 1,
            UserState::SelfAssessmentDone => 2,
            UserState::MatchingPreferencesSet => 3,
            UserState::Idle => 4,
            UserState::Matched => 5,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(UserState::Registered),
            1 => Some(UserState::PhotoUploaded),
            2 => Some(UserState::SelfAssessmentDone),
            3 => Some(UserState::MatchingPreferencesSet),
            4 => Some(UserState::Idle),
            5 => Some(UserState::Matched),
            _ => None,
        }
    }
}

/// The three personality traits on a 1..=5 scale
///
/// Used both as a self-assessment ("what I am") and inside a matching
/// preference ("what I want").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    pub romance: i32,
    pub openness: i32,
    pub warmheartedness: i32,
}

impl Traits {
    pub fn is_valid(&self) -> bool {
        crate::constants::is_valid_trait_value(self.romance)
            && crate::constants::is_valid_trait_value(self.openness)
            && crate::constants::is_valid_trait_value(self.warmheartedness)
    }
}

/// What the user expects their partner to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPreference {
    pub gender: Gender,
    pub min_age: i32,
    pub max_age: i32,
    #[serde(flatten)]
    pub traits: Traits,
}

impl MatchingPreference {
    /// Whether `age` falls inside the acceptable partner age range
    pub fn accepts_age(&self, age: i32) -> bool {
        self.min_age <= age && age <= self.max_age
    }
}

/// A registered user
///
/// Never returned directly by an API endpoint; handlers sanitize before
/// serializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub gender: Gender,
    pub self_assessment: Option<Traits>,
    pub matching_pref: Option<MatchingPreference>,
    pub state: UserState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for raw in 0..6i16 {
            let state = UserState::from_i16(raw).unwrap();
            assert_eq!(state.as_i16(), raw);
        }
        assert!(UserState::from_i16(6).is_none());
    }

    #[test]
    fn test_state_ordering() {
        assert!(UserState::Registered < UserState::Idle);
        assert!(UserState::Idle < UserState::Matched);
    }

    #[test]
    fn test_preference_age_bounds_inclusive() {
        let pref = MatchingPreference {
            gender: Gender::Female,
            min_age: 20,
            max_age: 30,
            traits: Traits { romance: 3, openness: 3, warmheartedness: 3 },
        };
        assert!(pref.accepts_age(20));
        assert!(pref.accepts_age(30));
        assert!(!pref.accepts_age(19));
        assert!(!pref.accepts_age(31));
    }
}
