//! Typed response views produced by the pool engine

use std::collections::BTreeMap;

use time::OffsetDateTime;

use outlast_common::{
    EliminationReason, MembershipRole, MembershipStatus, ObjectId, PoolStatus,
};
use outlast_store::schema::{MembershipDoc, PoolDoc, UserDoc};

/// Full pool view
#[derive(Debug, Clone)]
pub struct PoolView {
    pub id: ObjectId,
    pub name: String,
    pub owner_id: ObjectId,
    pub season_id: ObjectId,
    pub created_at: OffsetDateTime,
    pub current_week: u32,
    pub start_week: u32,
    pub settings: BTreeMap<String, String>,
    pub invited_user_ids: Vec<ObjectId>,
    pub status: PoolStatus,
    pub is_competitive: bool,
    pub competitive_since_week: Option<u32>,
    pub completed_week: Option<u32>,
    pub completed_at: Option<OffsetDateTime>,
    pub winner_user_ids: Vec<ObjectId>,
}

impl PoolView {
    /// Build from a pool document plus the ids invited in this request
    pub fn from_doc(pool: &PoolDoc, invited_user_ids: Vec<ObjectId>) -> Self {
        Self {
            id: pool.id,
            name: pool.name.clone(),
            owner_id: pool.owner_id,
            season_id: pool.season_id,
            created_at: pool.created_at,
            current_week: pool.current_week,
            start_week: pool.start_week,
            settings: pool.settings.clone(),
            invited_user_ids,
            status: pool.status,
            is_competitive: pool.is_competitive,
            competitive_since_week: pool.competitive_since_week,
            completed_week: pool.completed_week,
            completed_at: pool.completed_at,
            winner_user_ids: pool.winners.clone(),
        }
    }
}

/// A membership joined with its user profile
#[derive(Debug, Clone)]
pub struct MemberSummary {
    pub user_id: ObjectId,
    pub display_name: String,
    pub email: String,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub joined_at: Option<OffsetDateTime>,
    pub invited_at: Option<OffsetDateTime>,
    pub elimination_reason: Option<EliminationReason>,
    pub eliminated_week: Option<u32>,
    pub eliminated_date: Option<OffsetDateTime>,
    pub final_rank: Option<u32>,
    pub finished_week: Option<u32>,
    pub finished_date: Option<OffsetDateTime>,
}

impl MemberSummary {
    /// Build from a membership and its user document
    pub fn from_docs(membership: &MembershipDoc, user: &UserDoc) -> Self {
        Self {
            user_id: membership.user_id,
            display_name: user.display_name(),
            email: user.email.clone(),
            role: membership.role,
            status: membership.status,
            joined_at: membership.joined_at,
            invited_at: membership.invited_at,
            elimination_reason: membership.elimination_reason,
            eliminated_week: membership.eliminated_week,
            eliminated_date: membership.eliminated_date,
            final_rank: membership.final_rank,
            finished_week: membership.finished_week,
            finished_date: membership.finished_date,
        }
    }
}

/// Owner's membership listing
#[derive(Debug, Clone)]
pub struct MembershipList {
    pub pool_id: ObjectId,
    pub members: Vec<MemberSummary>,
}

/// A pending invite as shown to the invited user
#[derive(Debug, Clone)]
pub struct PendingInvite {
    pub pool_id: ObjectId,
    pub pool_name: String,
    pub owner_display_name: String,
    pub season_id: ObjectId,
    pub season_number: Option<u32>,
    pub invited_at: Option<OffsetDateTime>,
}

/// An active member who has not locked a pick for the current week
#[derive(Debug, Clone)]
pub struct AdvanceMissingMember {
    pub user_id: ObjectId,
    pub display_name: String,
}

/// Pre-advance readiness summary
#[derive(Debug, Clone)]
pub struct AdvanceStatus {
    pub current_week: u32,
    pub active_member_count: usize,
    pub locked_count: usize,
    pub missing_count: usize,
    pub missing_members: Vec<AdvanceMissingMember>,
    pub can_advance: bool,
}

/// A member eliminated by an advance
#[derive(Debug, Clone)]
pub struct EliminatedMember {
    pub user_id: ObjectId,
    pub display_name: String,
    pub reason: EliminationReason,
}

/// A pool winner
#[derive(Debug, Clone)]
pub struct WinnerSummary {
    pub user_id: ObjectId,
    pub display_name: String,
}

/// What an advance did
#[derive(Debug, Clone)]
pub struct AdvanceReport {
    pub new_current_week: u32,
    pub eliminations: Vec<EliminatedMember>,
    pub pool_completed: bool,
    pub winners: Vec<WinnerSummary>,
}

/// The caller's locked pick for the current week
#[derive(Debug, Clone)]
pub struct CurrentPick {
    pub pick_id: ObjectId,
    pub contestant_id: String,
    pub contestant_name: String,
    pub week: u32,
    pub locked_at: OffsetDateTime,
}

/// A contestant the caller may still pick
#[derive(Debug, Clone)]
pub struct AvailableContestant {
    pub id: String,
    pub name: String,
    pub tribe_name: Option<String>,
    pub tribe_color: Option<String>,
}

/// The picks screen for one member
#[derive(Debug, Clone)]
pub struct AvailableContestantsView {
    pub pool_id: ObjectId,
    pub user_id: ObjectId,
    pub current_week: u32,
    pub contestants: Vec<AvailableContestant>,
    pub score: u32,
    pub current_pick: Option<CurrentPick>,
    pub is_eliminated: bool,
    pub elimination_reason: Option<EliminationReason>,
    pub eliminated_week: Option<u32>,
    pub is_winner: bool,
    pub pool_status: PoolStatus,
    pub pool_completed_week: Option<u32>,
    pub pool_completed_at: Option<OffsetDateTime>,
    pub winners: Vec<WinnerSummary>,
    pub did_tie: bool,
}

/// An advantage as shown on the contestant detail screen
#[derive(Debug, Clone)]
pub struct ContestantAdvantageView {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// Contestant profile with tribe and advantages
#[derive(Debug, Clone)]
pub struct ContestantProfile {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub occupation: Option<String>,
    pub hometown: Option<String>,
    pub tribe_name: Option<String>,
    pub tribe_color: Option<String>,
    pub advantages: Vec<ContestantAdvantageView>,
}

/// Contestant detail for one member
#[derive(Debug, Clone)]
pub struct ContestantDetailView {
    pub pool_id: ObjectId,
    pub user_id: ObjectId,
    pub contestant: ContestantProfile,
    pub is_available: bool,
    pub eliminated_week: Option<u32>,
    pub already_picked_week: Option<u32>,
    pub current_pick: Option<CurrentPick>,
}

/// One leaderboard row
#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: ObjectId,
    pub display_name: String,
    pub score: u32,
    pub status: MembershipStatus,
    pub is_winner: bool,
    pub elimination_reason: Option<EliminationReason>,
    pub eliminated_week: Option<u32>,
    pub final_rank: Option<u32>,
    pub finished_week: Option<u32>,
    pub finished_date: Option<OffsetDateTime>,
}

/// The pool leaderboard
#[derive(Debug, Clone)]
pub struct LeaderboardView {
    pub pool_id: ObjectId,
    pub current_week: u32,
    pub pool_status: PoolStatus,
    pub pool_completed_week: Option<u32>,
    pub pool_completed_at: Option<OffsetDateTime>,
    pub entries: Vec<LeaderboardEntry>,
    pub winners: Vec<WinnerSummary>,
    pub did_tie: bool,
}

/// A freshly locked pick
#[derive(Debug, Clone)]
pub struct PickView {
    pub pick_id: ObjectId,
    pub pool_id: ObjectId,
    pub user_id: ObjectId,
    pub contestant_id: String,
    pub week: u32,
    pub locked_at: OffsetDateTime,
}

/// A season as listed for pool creation
#[derive(Debug, Clone)]
pub struct SeasonSummary {
    pub id: ObjectId,
    pub season_name: String,
    pub season_number: Option<u32>,
}
