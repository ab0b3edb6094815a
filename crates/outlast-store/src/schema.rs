//! Typed records, one per collection
//!
//! The wire-facing layers never see raw documents; everything is parsed into
//! these records at the store boundary and validated by construction.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use outlast_common::{
    AccountStatus, EliminationReason, MembershipRole, MembershipStatus, ObjectId, PickResult,
    PoolStatus,
};

use crate::Doc;

/// A user account
#[derive(Debug, Clone)]
pub struct UserDoc {
    /// Primary key
    pub id: ObjectId,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Self-describing password hash string
    pub password_hash: String,
    /// Account status
    pub account_status: AccountStatus,
    /// Whether the email address has been confirmed
    pub email_verified: bool,
    /// Outstanding email verification token
    pub verification_token: Option<String>,
    /// When the verification email went out
    pub verification_sent_at: Option<OffsetDateTime>,
    /// When the email was confirmed
    pub verification_verified_at: Option<OffsetDateTime>,
    /// Creation timestamp
    pub created_at: OffsetDateTime,
    /// The pool this user lands in by default
    pub default_pool: Option<ObjectId>,
    /// Consecutive failed login attempts
    pub failed_login_attempts: u32,
    /// Login lockout expiry
    pub locked_until: Option<OffsetDateTime>,
    /// Credentials issued at or before this instant are rejected
    pub token_invalidated_at: Option<OffsetDateTime>,
    /// Outstanding password reset token
    pub reset_token: Option<String>,
    /// Password reset token expiry
    pub reset_token_expires_at: Option<OffsetDateTime>,
}

impl UserDoc {
    /// Create a fresh account pending email verification
    pub fn new(
        id: ObjectId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        verification_token: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            account_status: AccountStatus::Active,
            email_verified: false,
            verification_token: Some(verification_token.into()),
            verification_sent_at: Some(now),
            verification_verified_at: None,
            created_at: now,
            default_pool: None,
            failed_login_attempts: 0,
            locked_until: None,
            token_invalidated_at: None,
            reset_token: None,
            reset_token_expires_at: None,
        }
    }

    /// Name shown for this user: username, falling back to email, then id
    pub fn display_name(&self) -> String {
        if !self.username.is_empty() {
            self.username.clone()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            self.id.to_hex()
        }
    }
}

impl Doc for UserDoc {
    fn id(&self) -> ObjectId {
        self.id
    }
}

/// A survivor pool
#[derive(Debug, Clone)]
pub struct PoolDoc {
    /// Primary key
    pub id: ObjectId,
    /// Pool name (trimmed, non-empty)
    pub name: String,
    /// The single owner
    pub owner_id: ObjectId,
    /// Season this pool plays against
    pub season_id: ObjectId,
    /// Creation timestamp
    pub created_at: OffsetDateTime,
    /// Week currently being played
    pub current_week: u32,
    /// Week the pool started at
    pub start_week: u32,
    /// Opaque pool settings
    pub settings: BTreeMap<String, String>,
    /// Pool-level status
    pub status: PoolStatus,
    /// Latches true once two memberships are active simultaneously
    pub is_competitive: bool,
    /// First week at which the pool was competitive
    pub competitive_since_week: Option<u32>,
    /// Week the pool completed at
    pub completed_week: Option<u32>,
    /// Completion timestamp
    pub completed_at: Option<OffsetDateTime>,
    /// Winner user ids (more than one on a tie)
    pub winners: Vec<ObjectId>,
}

impl PoolDoc {
    /// Create an open pool at its start week
    pub fn new(
        id: ObjectId,
        name: impl Into<String>,
        owner_id: ObjectId,
        season_id: ObjectId,
        start_week: u32,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            season_id,
            created_at: now,
            current_week: start_week,
            start_week,
            settings: BTreeMap::new(),
            status: PoolStatus::Open,
            is_competitive: false,
            competitive_since_week: None,
            completed_week: None,
            completed_at: None,
            winners: Vec::new(),
        }
    }
}

impl Doc for PoolDoc {
    fn id(&self) -> ObjectId {
        self.id
    }
}

/// One membership per (pool, user) pair
#[derive(Debug, Clone)]
pub struct MembershipDoc {
    /// Primary key
    pub id: ObjectId,
    /// The pool
    pub pool_id: ObjectId,
    /// The user
    pub user_id: ObjectId,
    /// Role within the pool
    pub role: MembershipRole,
    /// Lifecycle status
    pub status: MembershipStatus,
    /// When the user became active
    pub joined_at: Option<OffsetDateTime>,
    /// When the user was invited
    pub invited_at: Option<OffsetDateTime>,
    /// Why the membership was eliminated
    pub elimination_reason: Option<EliminationReason>,
    /// Week of elimination
    pub eliminated_week: Option<u32>,
    /// Elimination timestamp
    pub eliminated_date: Option<OffsetDateTime>,
    /// Final placement (1 for all co-winners)
    pub final_rank: Option<u32>,
    /// Week the pool finished for this member
    pub finished_week: Option<u32>,
    /// Finish timestamp
    pub finished_date: Option<OffsetDateTime>,
    /// Cached: size of `available_contestants` while active, 0 otherwise
    pub score: u32,
    /// Cached: contestant ids this member may still pick, sorted ascending
    pub available_contestants: Vec<String>,
}

impl MembershipDoc {
    /// Create the owner membership at pool creation
    pub fn owner(id: ObjectId, pool_id: ObjectId, user_id: ObjectId, now: OffsetDateTime) -> Self {
        Self {
            id,
            pool_id,
            user_id,
            role: MembershipRole::Owner,
            status: MembershipStatus::Active,
            joined_at: Some(now),
            invited_at: None,
            elimination_reason: None,
            eliminated_week: None,
            eliminated_date: None,
            final_rank: None,
            finished_week: None,
            finished_date: None,
            score: 0,
            available_contestants: Vec::new(),
        }
    }

    /// Create an invited member
    pub fn invited(id: ObjectId, pool_id: ObjectId, user_id: ObjectId, now: OffsetDateTime) -> Self {
        Self {
            id,
            pool_id,
            user_id,
            role: MembershipRole::Member,
            status: MembershipStatus::Invited,
            joined_at: None,
            invited_at: Some(now),
            elimination_reason: None,
            eliminated_week: None,
            eliminated_date: None,
            final_rank: None,
            finished_week: None,
            finished_date: None,
            score: 0,
            available_contestants: Vec::new(),
        }
    }
}

impl Doc for MembershipDoc {
    fn id(&self) -> ObjectId {
        self.id
    }
}

/// A contestant on a season
#[derive(Debug, Clone)]
pub struct Contestant {
    /// Season-scoped contestant id
    pub id: String,
    /// Display name
    pub name: String,
    /// Age, if published
    pub age: Option<u32>,
    /// Occupation, if published
    pub occupation: Option<String>,
    /// Hometown, if published
    pub hometown: Option<String>,
}

/// One vote-out record
#[derive(Debug, Clone)]
pub struct SeasonElimination {
    /// Week the elimination happened (1-based)
    pub week: u32,
    /// The eliminated contestant; `None` for weeks with no vote-out
    pub eliminated_contestant_id: Option<String>,
}

/// A tribe grouping
#[derive(Debug, Clone)]
pub struct Tribe {
    /// Tribe name
    pub name: String,
    /// Tribe color
    pub color: String,
    /// Contestant ids in this tribe
    pub members: Vec<String>,
}

/// The tribe layout in effect from a given week
#[derive(Debug, Clone)]
pub struct TribeWeek {
    /// Week this layout takes effect
    pub week: u32,
    /// Tribes for this span
    pub tribes: Vec<Tribe>,
}

/// An advantage held by a contestant
#[derive(Debug, Clone)]
pub struct Advantage {
    /// Advantage id
    pub id: String,
    /// Holder
    pub contestant_id: String,
    /// Display name ("Hidden Immunity Idol")
    pub display_name: String,
    /// Kind of advantage
    pub advantage_type: String,
    /// How it was obtained
    pub acquisition_notes: Option<String>,
    /// How it left play
    pub end_notes: Option<String>,
    /// Week it was obtained
    pub obtained_week: Option<u32>,
    /// Week it left play
    pub end_week: Option<u32>,
}

/// Season metadata, read-only to this system
#[derive(Debug, Clone)]
pub struct SeasonDoc {
    /// Primary key
    pub id: ObjectId,
    /// Season name
    pub season_name: String,
    /// Season number
    pub season_number: Option<u32>,
    /// Full cast
    pub contestants: Vec<Contestant>,
    /// Vote-outs by week
    pub eliminations: Vec<SeasonElimination>,
    /// Tribe layout timeline
    pub tribe_timeline: Vec<TribeWeek>,
    /// Advantages in play
    pub advantages: Vec<Advantage>,
}

impl Doc for SeasonDoc {
    fn id(&self) -> ObjectId {
        self.id
    }
}

/// A locked weekly pick
#[derive(Debug, Clone)]
pub struct PickDoc {
    /// Primary key
    pub id: ObjectId,
    /// The pool
    pub pool_id: ObjectId,
    /// The member who locked it
    pub user_id: ObjectId,
    /// The picked contestant
    pub contestant_id: String,
    /// Week the pick is for
    pub week: u32,
    /// Lock timestamp
    pub created_at: OffsetDateTime,
    /// Resolution state
    pub result: PickResult,
}

impl Doc for PickDoc {
    fn id(&self) -> ObjectId {
        self.id
    }
}
