//! Domain enums

use std::fmt;

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// Account may authenticate and act
    Active,
    /// Account is disabled
    Inactive,
}

impl AccountStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pool-level status (state machine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// Pool is running; members may pick and the week may advance
    Open,
    /// Pool finished; winners are set and nothing mutates further
    Completed,
}

impl PoolStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Open => "open",
            PoolStatus::Completed => "completed",
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PoolStatus::Completed)
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership role within a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRole {
    /// The single pool owner
    Owner,
    /// A regular member
    Member,
}

impl MembershipRole {
    /// Get role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Member => "member",
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership status (state machine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    /// Invited, decision pending
    Invited,
    /// Playing: may lock picks this week
    Active,
    /// Invite declined (terminal)
    Declined,
    /// Knocked out of the pool (terminal, except tie-closure promotion)
    Eliminated,
    /// Survived to the end (terminal)
    Winner,
}

impl MembershipStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Invited => "invited",
            MembershipStatus::Active => "active",
            MembershipStatus::Declined => "declined",
            MembershipStatus::Eliminated => "eliminated",
            MembershipStatus::Winner => "winner",
        }
    }

    /// Check if this status never returns to active
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MembershipStatus::Declined | MembershipStatus::Eliminated | MembershipStatus::Winner
        )
    }

    /// Statuses that count as having played in the pool
    pub fn is_participant(&self) -> bool {
        matches!(
            self,
            MembershipStatus::Active | MembershipStatus::Eliminated | MembershipStatus::Winner
        )
    }

    /// Validate a state transition
    pub fn can_transition_to(&self, target: MembershipStatus) -> bool {
        match (self, target) {
            (MembershipStatus::Invited, MembershipStatus::Active) => true,
            (MembershipStatus::Invited, MembershipStatus::Declined) => true,
            (MembershipStatus::Active, MembershipStatus::Eliminated) => true,
            (MembershipStatus::Active, MembershipStatus::Winner) => true,
            // Tie closure: every remaining player eliminated the same week
            (MembershipStatus::Eliminated, MembershipStatus::Winner) => true,
            _ => false,
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a membership was eliminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationReason {
    /// No pick was locked for the week being resolved
    MissedPick,
    /// The locked pick was voted out that week
    ContestantVotedOut,
    /// No eligible contestant remains for the next week
    NoOptionsLeft,
}

impl EliminationReason {
    /// Get reason as string
    pub fn as_str(&self) -> &'static str {
        match self {
            EliminationReason::MissedPick => "missed_pick",
            EliminationReason::ContestantVotedOut => "contestant_voted_out",
            EliminationReason::NoOptionsLeft => "no_options_left",
        }
    }
}

impl fmt::Display for EliminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick resolution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickResult {
    /// Not yet resolved by an advance
    Pending,
}

impl PickResult {
    /// Get result as string
    pub fn as_str(&self) -> &'static str {
        match self {
            PickResult::Pending => "pending",
        }
    }
}

/// Decision on a pending invite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteAction {
    /// Join the pool
    Accept,
    /// Turn the invite down
    Decline,
}

impl InviteAction {
    /// Parse a decision string (case-insensitive, trimmed)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "accept" => Some(InviteAction::Accept),
            "decline" => Some(InviteAction::Decline),
            _ => None,
        }
    }
}
