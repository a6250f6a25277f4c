// =============================================================================
// Cupid Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// MATCHING CONFIGURATION
// =============================================================================

/// How long a match stays active before the expiry sweep releases both users
pub const DEFAULT_MATCH_TTL_HOURS: i64 = 36;

/// Timeout applied to every individual store operation during a matching pass
pub const STORE_OP_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// TRAIT SCALE
// =============================================================================

/// Lowest value on the self-assessment / preference trait scale
pub const TRAIT_SCALE_MIN: i32 = 1;

/// Highest value on the self-assessment / preference trait scale
pub const TRAIT_SCALE_MAX: i32 = 5;

// =============================================================================
// DATE PROPOSALS
// =============================================================================

/// A proposed date must fall within this many days of the proposal time
pub const PROPOSAL_WINDOW_DAYS: i64 = 14;

// =============================================================================
// REGISTRATION LIMITS
// =============================================================================

/// Minimum age accepted at registration
pub const MIN_USER_AGE: i32 = 18;

/// Maximum age accepted at registration
pub const MAX_USER_AGE: i32 = 99;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// =============================================================================
// HELPER FUNCTIONS FOR VALIDATION
// =============================================================================

/// Validates that a value sits on the 1..=5 trait scale
pub fn is_valid_trait_value(value: i32) -> bool {
    (TRAIT_SCALE_MIN..=TRAIT_SCALE_MAX).contains(&value)
}

/// Validates that an age is one we accept at registration
pub fn is_valid_user_age(age: i32) -> bool {
    (MIN_USER_AGE..=MAX_USER_AGE).contains(&age)
}
