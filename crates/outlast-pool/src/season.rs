//! Read-only season projections
//!
//! Pure helpers over season metadata. Eliminations filter strictly-prior
//! weeks: a contestant voted out in week W is still pickable in week W,
//! because that week's result is not yet resolved for the pool.

use std::collections::{BTreeSet, HashSet};

use outlast_store::schema::{Advantage, SeasonDoc};
use outlast_store::Collection;

use crate::views::SeasonSummary;

/// Contestant ids still in play at the given week (no vote-out before it),
/// sorted ascending.
pub fn active_contestants(season: &SeasonDoc, week: u32) -> BTreeSet<String> {
    let gone: HashSet<&str> = season
        .eliminations
        .iter()
        .filter(|e| e.week < week)
        .filter_map(|e| e.eliminated_contestant_id.as_deref())
        .collect();

    season
        .contestants
        .iter()
        .filter(|c| !gone.contains(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect()
}

/// The week a contestant was voted out, if any
pub fn eliminated_week(season: &SeasonDoc, contestant_id: &str) -> Option<u32> {
    season
        .eliminations
        .iter()
        .find(|e| e.eliminated_contestant_id.as_deref() == Some(contestant_id))
        .map(|e| e.week)
}

/// Whether the season records a resolvable elimination for the given week
pub fn has_elimination_for_week(season: &SeasonDoc, week: u32) -> bool {
    season
        .eliminations
        .iter()
        .any(|e| e.week == week && e.eliminated_contestant_id.is_some())
}

/// The tribe `(name, color)` a contestant belongs to at the given week.
///
/// Tribe layouts take effect at their entry week; the layout shown for
/// week W is the one in effect after week W-1 resolved (week 1 for W <= 1).
pub fn resolve_tribe<'a>(
    season: &'a SeasonDoc,
    contestant_id: &str,
    week: u32,
) -> Option<(&'a str, &'a str)> {
    let effective = if week <= 1 { 1 } else { week - 1 };

    let entry = season
        .tribe_timeline
        .iter()
        .filter(|t| t.week <= effective)
        .max_by_key(|t| t.week)?;

    entry
        .tribes
        .iter()
        .find(|t| t.members.iter().any(|m| m == contestant_id))
        .map(|t| (t.name.as_str(), t.color.as_str()))
}

/// Advantages held by a contestant that are public knowledge at the given
/// week (obtained at or before week-1; everything for week <= 1).
pub fn visible_advantages<'a>(
    season: &'a SeasonDoc,
    contestant_id: &str,
    current_week: u32,
) -> Vec<&'a Advantage> {
    season
        .advantages
        .iter()
        .filter(|a| a.contestant_id == contestant_id)
        .filter(|a| {
            current_week <= 1
                || a.obtained_week
                    .map(|w| w <= current_week - 1)
                    .unwrap_or(true)
        })
        .collect()
}

/// All seasons, newest first
pub fn list_seasons(seasons: &Collection<SeasonDoc>) -> Vec<SeasonSummary> {
    let mut all: Vec<SeasonSummary> = seasons
        .find(|_| true)
        .iter()
        .map(|s| SeasonSummary {
            id: s.id,
            season_name: s.season_name.clone(),
            season_number: s.season_number,
        })
        .collect();

    all.sort_by(|a, b| b.season_number.cmp(&a.season_number));
    all
}
