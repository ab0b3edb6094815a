//! View to JSON rendering
//!
//! Field names are the wire contract; timestamps are RFC3339 strings and
//! identifiers are 24-hex strings.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use outlast_common::ObjectId;
use outlast_core::{UserSearchResult, UserView};
use outlast_pool::{
    AdvanceReport, AdvanceStatus, AvailableContestantsView, ContestantDetailView, CurrentPick,
    LeaderboardView, MemberSummary, MembershipList, PendingInvite, PickView, PoolView,
    SeasonSummary, WinnerSummary,
};

use crate::json::Json;

fn id(value: ObjectId) -> Json {
    Json::str(value.to_hex())
}

fn opt_id(value: Option<ObjectId>) -> Json {
    value.map(id).unwrap_or(Json::Null)
}

fn timestamp(value: OffsetDateTime) -> Json {
    Json::str(value.format(&Rfc3339).unwrap_or_default())
}

fn opt_timestamp(value: Option<OffsetDateTime>) -> Json {
    value.map(timestamp).unwrap_or(Json::Null)
}

/// `UserView` to its response body
pub fn user_view(view: &UserView) -> Json {
    Json::obj(vec![
        ("id", id(view.id)),
        ("username", Json::str(view.username.clone())),
        ("email", Json::str(view.email.clone())),
        ("account_status", Json::str(view.account_status.as_str())),
        ("email_verified", Json::Bool(view.email_verified)),
        ("created_at", timestamp(view.created_at)),
        ("default_pool", opt_id(view.default_pool)),
        ("token", Json::opt_str(view.token.clone())),
    ])
}

/// Search hits to a response array
pub fn search_results(results: &[UserSearchResult]) -> Json {
    Json::Array(
        results
            .iter()
            .map(|r| {
                Json::obj(vec![
                    ("id", id(r.id)),
                    ("username", Json::str(r.username.clone())),
                    ("email", Json::str(r.email.clone())),
                    (
                        "membership_status",
                        Json::opt_str(r.membership_status.map(|s| s.as_str())),
                    ),
                ])
            })
            .collect(),
    )
}

/// `PoolView` to its response body
pub fn pool_view(view: &PoolView) -> Json {
    Json::obj(vec![
        ("id", id(view.id)),
        ("name", Json::str(view.name.clone())),
        ("owner_id", id(view.owner_id)),
        ("season_id", id(view.season_id)),
        ("created_at", timestamp(view.created_at)),
        ("current_week", Json::int(view.current_week)),
        ("start_week", Json::int(view.start_week)),
        (
            "settings",
            Json::Object(
                view.settings
                    .iter()
                    .map(|(k, v)| (k.clone(), Json::str(v.clone())))
                    .collect(),
            ),
        ),
        (
            "invited_user_ids",
            Json::Array(view.invited_user_ids.iter().map(|u| id(*u)).collect()),
        ),
        ("status", Json::str(view.status.as_str())),
        ("is_competitive", Json::Bool(view.is_competitive)),
        (
            "competitive_since_week",
            Json::opt_int(view.competitive_since_week),
        ),
        ("completed_week", Json::opt_int(view.completed_week)),
        ("completed_at", opt_timestamp(view.completed_at)),
        (
            "winner_user_ids",
            Json::Array(view.winner_user_ids.iter().map(|u| id(*u)).collect()),
        ),
    ])
}

/// A list of pools
pub fn pool_views(views: &[PoolView]) -> Json {
    Json::Array(views.iter().map(pool_view).collect())
}

/// A membership joined with its user
pub fn member_summary(member: &MemberSummary) -> Json {
    Json::obj(vec![
        ("user_id", id(member.user_id)),
        ("display_name", Json::str(member.display_name.clone())),
        ("email", Json::str(member.email.clone())),
        ("role", Json::str(member.role.as_str())),
        ("status", Json::str(member.status.as_str())),
        ("joined_at", opt_timestamp(member.joined_at)),
        ("invited_at", opt_timestamp(member.invited_at)),
        (
            "elimination_reason",
            Json::opt_str(member.elimination_reason.map(|r| r.as_str())),
        ),
        ("eliminated_week", Json::opt_int(member.eliminated_week)),
        ("eliminated_date", opt_timestamp(member.eliminated_date)),
        ("final_rank", Json::opt_int(member.final_rank)),
        ("finished_week", Json::opt_int(member.finished_week)),
        ("finished_date", opt_timestamp(member.finished_date)),
    ])
}

/// The owner's membership listing
pub fn membership_list(list: &MembershipList) -> Json {
    Json::obj(vec![
        ("pool_id", id(list.pool_id)),
        (
            "members",
            Json::Array(list.members.iter().map(member_summary).collect()),
        ),
    ])
}

/// Pending invites for a user
pub fn pending_invites(invites: &[PendingInvite]) -> Json {
    Json::obj(vec![(
        "invites",
        Json::Array(
            invites
                .iter()
                .map(|i| {
                    Json::obj(vec![
                        ("pool_id", id(i.pool_id)),
                        ("pool_name", Json::str(i.pool_name.clone())),
                        (
                            "owner_display_name",
                            Json::str(i.owner_display_name.clone()),
                        ),
                        ("season_id", id(i.season_id)),
                        ("season_number", Json::opt_int(i.season_number)),
                        ("invited_at", opt_timestamp(i.invited_at)),
                    ])
                })
                .collect(),
        ),
    )])
}

/// Pre-advance readiness
pub fn advance_status(status: &AdvanceStatus) -> Json {
    Json::obj(vec![
        ("current_week", Json::int(status.current_week)),
        (
            "active_member_count",
            Json::int(status.active_member_count as i64),
        ),
        ("locked_count", Json::int(status.locked_count as i64)),
        ("missing_count", Json::int(status.missing_count as i64)),
        (
            "missing_members",
            Json::Array(
                status
                    .missing_members
                    .iter()
                    .map(|m| {
                        Json::obj(vec![
                            ("user_id", id(m.user_id)),
                            ("display_name", Json::str(m.display_name.clone())),
                        ])
                    })
                    .collect(),
            ),
        ),
        ("can_advance", Json::Bool(status.can_advance)),
    ])
}

fn winner(summary: &WinnerSummary) -> Json {
    Json::obj(vec![
        ("user_id", id(summary.user_id)),
        ("display_name", Json::str(summary.display_name.clone())),
    ])
}

/// What an advance did
pub fn advance_report(report: &AdvanceReport) -> Json {
    Json::obj(vec![
        ("new_current_week", Json::int(report.new_current_week)),
        (
            "eliminations",
            Json::Array(
                report
                    .eliminations
                    .iter()
                    .map(|e| {
                        Json::obj(vec![
                            ("user_id", id(e.user_id)),
                            ("display_name", Json::str(e.display_name.clone())),
                            ("reason", Json::str(e.reason.as_str())),
                        ])
                    })
                    .collect(),
            ),
        ),
        ("pool_completed", Json::Bool(report.pool_completed)),
        (
            "winners",
            Json::Array(report.winners.iter().map(winner).collect()),
        ),
    ])
}

fn current_pick(pick: &Option<CurrentPick>) -> Json {
    match pick {
        Some(p) => Json::obj(vec![
            ("pick_id", id(p.pick_id)),
            ("contestant_id", Json::str(p.contestant_id.clone())),
            ("contestant_name", Json::str(p.contestant_name.clone())),
            ("week", Json::int(p.week)),
            ("locked_at", timestamp(p.locked_at)),
        ]),
        None => Json::Null,
    }
}

/// The picks screen
pub fn available_contestants(view: &AvailableContestantsView) -> Json {
    Json::obj(vec![
        ("pool_id", id(view.pool_id)),
        ("user_id", id(view.user_id)),
        ("current_week", Json::int(view.current_week)),
        (
            "contestants",
            Json::Array(
                view.contestants
                    .iter()
                    .map(|c| {
                        Json::obj(vec![
                            ("id", Json::str(c.id.clone())),
                            ("name", Json::str(c.name.clone())),
                            ("tribe_name", Json::opt_str(c.tribe_name.clone())),
                            ("tribe_color", Json::opt_str(c.tribe_color.clone())),
                        ])
                    })
                    .collect(),
            ),
        ),
        ("score", Json::int(view.score)),
        ("current_pick", current_pick(&view.current_pick)),
        ("is_eliminated", Json::Bool(view.is_eliminated)),
        (
            "elimination_reason",
            Json::opt_str(view.elimination_reason.map(|r| r.as_str())),
        ),
        ("eliminated_week", Json::opt_int(view.eliminated_week)),
        ("is_winner", Json::Bool(view.is_winner)),
        ("pool_status", Json::str(view.pool_status.as_str())),
        ("pool_completed_week", Json::opt_int(view.pool_completed_week)),
        ("pool_completed_at", opt_timestamp(view.pool_completed_at)),
        (
            "winners",
            Json::Array(view.winners.iter().map(winner).collect()),
        ),
        ("did_tie", Json::Bool(view.did_tie)),
    ])
}

/// Contestant detail
pub fn contestant_detail(view: &ContestantDetailView) -> Json {
    let c = &view.contestant;
    Json::obj(vec![
        ("pool_id", id(view.pool_id)),
        ("user_id", id(view.user_id)),
        (
            "contestant",
            Json::obj(vec![
                ("id", Json::str(c.id.clone())),
                ("name", Json::str(c.name.clone())),
                ("age", Json::opt_int(c.age)),
                ("occupation", Json::opt_str(c.occupation.clone())),
                ("hometown", Json::opt_str(c.hometown.clone())),
                ("tribe_name", Json::opt_str(c.tribe_name.clone())),
                ("tribe_color", Json::opt_str(c.tribe_color.clone())),
                (
                    "advantages",
                    Json::Array(
                        c.advantages
                            .iter()
                            .map(|a| {
                                Json::obj(vec![
                                    ("id", Json::str(a.id.clone())),
                                    ("label", Json::str(a.label.clone())),
                                    ("value", Json::str(a.value.clone())),
                                ])
                            })
                            .collect(),
                    ),
                ),
            ]),
        ),
        ("is_available", Json::Bool(view.is_available)),
        ("eliminated_week", Json::opt_int(view.eliminated_week)),
        ("already_picked_week", Json::opt_int(view.already_picked_week)),
        ("current_pick", current_pick(&view.current_pick)),
    ])
}

/// The leaderboard
pub fn leaderboard(view: &LeaderboardView) -> Json {
    Json::obj(vec![
        ("pool_id", id(view.pool_id)),
        ("current_week", Json::int(view.current_week)),
        ("pool_status", Json::str(view.pool_status.as_str())),
        ("pool_completed_week", Json::opt_int(view.pool_completed_week)),
        ("pool_completed_at", opt_timestamp(view.pool_completed_at)),
        (
            "entries",
            Json::Array(
                view.entries
                    .iter()
                    .map(|e| {
                        Json::obj(vec![
                            ("rank", Json::int(e.rank as i64)),
                            ("user_id", id(e.user_id)),
                            ("display_name", Json::str(e.display_name.clone())),
                            ("score", Json::int(e.score)),
                            ("status", Json::str(e.status.as_str())),
                            ("is_winner", Json::Bool(e.is_winner)),
                            (
                                "elimination_reason",
                                Json::opt_str(e.elimination_reason.map(|r| r.as_str())),
                            ),
                            ("eliminated_week", Json::opt_int(e.eliminated_week)),
                            ("final_rank", Json::opt_int(e.final_rank)),
                            ("finished_week", Json::opt_int(e.finished_week)),
                            ("finished_date", opt_timestamp(e.finished_date)),
                        ])
                    })
                    .collect(),
            ),
        ),
        (
            "winners",
            Json::Array(view.winners.iter().map(winner).collect()),
        ),
        ("did_tie", Json::Bool(view.did_tie)),
    ])
}

/// A freshly locked pick
pub fn pick_view(view: &PickView) -> Json {
    Json::obj(vec![
        ("pick_id", id(view.pick_id)),
        ("pool_id", id(view.pool_id)),
        ("user_id", id(view.user_id)),
        ("contestant_id", Json::str(view.contestant_id.clone())),
        ("week", Json::int(view.week)),
        ("locked_at", timestamp(view.locked_at)),
    ])
}

/// The seasons listing
pub fn season_summaries(seasons: &[SeasonSummary]) -> Json {
    Json::Array(
        seasons
            .iter()
            .map(|s| {
                Json::obj(vec![
                    ("id", id(s.id)),
                    ("season_name", Json::str(s.season_name.clone())),
                    ("season_number", Json::opt_int(s.season_number)),
                ])
            })
            .collect(),
    )
}
