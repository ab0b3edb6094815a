//! outlast-pool: the survivor pool lifecycle engine
//!
//! This crate owns every code path that may transition membership or
//! pool status fields:
//!
//! - **Pool management**: create and delete pools, owner membership,
//!   invited member seeding
//! - **Pick acceptance**: one pick per week, no repeats, no contestants
//!   already voted out
//! - **Week advance**: the staged elimination procedure (missed pick,
//!   contestant voted out, no options left), completion detection and
//!   tie resolution, the compare-and-swap week bump
//! - **Score cache**: the single writer of each membership's
//!   `score`/`available_contestants` pair
//! - **Invites**: invite, accept/decline, the competitive latch
//! - **Views**: leaderboard, available contestants, contestant detail
//!
//! # How a pool ends
//!
//! 1. A pool becomes *competitive* once two members are active at the
//!    same time; the flag never clears.
//! 2. Each advance resolves the current week's eliminations in order.
//! 3. When a competitive pool drops to one active member, that member
//!    wins. When it drops to zero in a single advance, everyone
//!    eliminated by that advance shares the win (a tie).
//! 4. A completed pool is frozen: no picks, no advances, no edits.

mod engine;
mod invite;
pub mod season;
#[cfg(test)]
pub(crate) mod test_support;
mod views;

pub use engine::PoolService;
pub use views::{
    AdvanceMissingMember, AdvanceReport, AdvanceStatus, AvailableContestant,
    AvailableContestantsView, ContestantAdvantageView, ContestantDetailView, ContestantProfile,
    CurrentPick, EliminatedMember, LeaderboardEntry, LeaderboardView, MemberSummary,
    MembershipList, PendingInvite, PickView, PoolView, SeasonSummary, WinnerSummary,
};
