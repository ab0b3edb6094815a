//! Pool lifecycle engine
//!
//! Owns every transition of pool and membership status fields. The cached
//! `score`/`available_contestants` pair is written only by
//! `recalculate_pool_scores`, which keeps the invariant
//! `active ⇒ score == |available|` true by construction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::OffsetDateTime;

use outlast_common::{
    EliminationReason, Error, ErrorCode, MembershipRole, MembershipStatus, ObjectId, PickResult,
    PoolStatus, Result,
};
use outlast_store::schema::{MembershipDoc, PickDoc, PoolDoc, SeasonDoc};
use outlast_store::{Store, StoreError};

use crate::season;
use crate::views::{
    AdvanceMissingMember, AdvanceReport, AdvanceStatus, AvailableContestant,
    AvailableContestantsView, ContestantAdvantageView, ContestantDetailView, ContestantProfile,
    CurrentPick, EliminatedMember, LeaderboardEntry, LeaderboardView, PickView, PoolView,
    WinnerSummary,
};

/// Earliest and latest week a pool may start at
const START_WEEK_RANGE: std::ops::RangeInclusive<u32> = 1..=6;

/// The pool lifecycle service
#[derive(Clone)]
pub struct PoolService {
    store: Arc<Store>,
}

impl PoolService {
    /// Create a service over the shared store
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    // ------------------------------------------------------------------
    // Pool creation and deletion
    // ------------------------------------------------------------------

    /// Create a pool with its owner membership and invited members
    pub fn create_pool(
        &self,
        owner_id: ObjectId,
        name: &str,
        season_id: ObjectId,
        start_week: u32,
        invitees: &[ObjectId],
    ) -> Result<PoolView> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::bad_request("Pool name is required"));
        }
        if !START_WEEK_RANGE.contains(&start_week) {
            return Err(Error::bad_request("Start week must be between 1 and 6"));
        }

        if self.store.users.get(owner_id).is_none() {
            return Err(Error::new(ErrorCode::UserNotFound, "Owner not found"));
        }
        let season = self
            .store
            .seasons
            .get(season_id)
            .ok_or_else(|| Error::new(ErrorCode::SeasonNotFound, "Season not found"))?;

        let now = OffsetDateTime::now_utc();
        let pool = PoolDoc::new(ObjectId::new()?, name, owner_id, season_id, start_week, now);
        let pool_id = pool.id;

        self.store
            .pools
            .insert(pool.clone())
            .map_err(|_| Error::internal("Failed to create pool"))?;

        self.store
            .memberships
            .insert(MembershipDoc::owner(ObjectId::new()?, pool_id, owner_id, now))
            .map_err(|_| Error::internal("Failed to create pool membership"))?;

        let mut invited_user_ids: Vec<ObjectId> = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::from([owner_id]);
        for invitee in invitees {
            if !seen.insert(*invitee) {
                continue;
            }
            if self.store.users.get(*invitee).is_none() {
                return Err(Error::new(ErrorCode::UserNotFound, "Invited user not found"));
            }
            let member_id = ObjectId::new()?;
            self.store
                .memberships
                .upsert(
                    |m| m.pool_id == pool_id && m.user_id == *invitee,
                    |m| {
                        m.role = MembershipRole::Member;
                        m.status = MembershipStatus::Invited;
                        m.invited_at = Some(now);
                        m.joined_at = None;
                        m.elimination_reason = None;
                        m.eliminated_week = None;
                        m.eliminated_date = None;
                    },
                    || MembershipDoc::invited(member_id, pool_id, *invitee, now),
                )
                .map_err(|e| Error::internal(e.to_string()))?;
            invited_user_ids.push(*invitee);
        }

        let _ = self
            .store
            .users
            .update(owner_id, |u| u.default_pool = Some(pool_id));

        self.recalculate_pool_scores(&pool, &season, pool.current_week)?;

        tracing::info!(
            pool_id = %pool_id,
            owner_id = %owner_id,
            start_week,
            invited = invited_user_ids.len(),
            "Pool created"
        );

        Ok(PoolView::from_doc(&pool, invited_user_ids))
    }

    /// Delete a pool and everything hanging off it
    pub fn delete_pool(&self, pool_id: ObjectId, owner_id: ObjectId) -> Result<()> {
        self.require_pool_owner(pool_id, owner_id)?;

        self.store.picks.delete_many(|p| p.pool_id == pool_id);
        self.store.memberships.delete_many(|m| m.pool_id == pool_id);

        if !self.store.pools.delete(pool_id) {
            return Err(Error::new(ErrorCode::PoolNotFound, "Pool not found"));
        }

        self.store.users.update_many(
            |u| u.default_pool == Some(pool_id),
            |u| u.default_pool = None,
        );

        tracing::info!(pool_id = %pool_id, "Pool deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Picks
    // ------------------------------------------------------------------

    /// Lock the caller's pick for the pool's current week
    pub fn create_pick(
        &self,
        pool_id: ObjectId,
        user_id: ObjectId,
        contestant_id: &str,
    ) -> Result<PickView> {
        let pool = self.require_pool(pool_id)?;

        let membership = self
            .store
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == user_id);
        if !matches!(membership, Some(ref m) if m.status == MembershipStatus::Active) {
            return Err(Error::forbidden("User is not active in this pool"));
        }

        let season = self.require_season(&pool)?;
        let current_week = pool.current_week;

        if self
            .store
            .picks
            .exists(|p| p.pool_id == pool_id && p.user_id == user_id && p.week == current_week)
        {
            return Err(Error::bad_request("Pick already locked for this week"));
        }

        if !season.contestants.iter().any(|c| c.id == contestant_id) {
            return Err(Error::new(
                ErrorCode::ContestantNotFound,
                "Contestant not found",
            ));
        }

        let prior = self.store.picks.find_one(|p| {
            p.pool_id == pool_id && p.user_id == user_id && p.contestant_id == contestant_id
        });
        if let Some(prior) = prior {
            return Err(Error::bad_request(format!(
                "Contestant already picked in week {}",
                prior.week
            )));
        }

        if let Some(week) = season::eliminated_week(&season, contestant_id) {
            if week < current_week {
                return Err(Error::bad_request("Contestant already eliminated"));
            }
        }

        let now = OffsetDateTime::now_utc();
        let pick = PickDoc {
            id: ObjectId::new()?,
            pool_id,
            user_id,
            contestant_id: contestant_id.to_string(),
            week: current_week,
            created_at: now,
            result: PickResult::Pending,
        };
        let pick_id = pick.id;

        // The unique index on (pool, user, week) closes the window between
        // the existence check above and this insert.
        match self.store.picks.insert(pick) {
            Ok(()) => {}
            Err(StoreError::DuplicateKey("pool_user_week")) => {
                return Err(Error::bad_request("Pick already locked for this week"));
            }
            Err(_) => return Err(Error::internal("Failed to lock pick")),
        }

        tracing::debug!(
            pool_id = %pool_id,
            user_id = %user_id,
            contestant_id,
            week = current_week,
            "Pick locked"
        );

        Ok(PickView {
            pick_id,
            pool_id,
            user_id,
            contestant_id: contestant_id.to_string(),
            week: current_week,
            locked_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Score recomputation
    // ------------------------------------------------------------------

    /// Recompute every membership's cached score and available set against
    /// `target_week`. The only writer of those fields.
    pub(crate) fn recalculate_pool_scores(
        &self,
        pool: &PoolDoc,
        season: &SeasonDoc,
        target_week: u32,
    ) -> Result<()> {
        let eligible = season::active_contestants(season, target_week);
        let memberships = self.store.memberships.find(|m| m.pool_id == pool.id);

        for membership in memberships {
            if membership.status == MembershipStatus::Active {
                let used: HashSet<String> = self
                    .store
                    .picks
                    .find(|p| {
                        p.pool_id == pool.id
                            && p.user_id == membership.user_id
                            && p.week < target_week
                    })
                    .into_iter()
                    .map(|p| p.contestant_id)
                    .collect();

                // BTreeSet iteration keeps the cached list sorted ascending
                let remaining: Vec<String> = eligible
                    .iter()
                    .filter(|c| !used.contains(*c))
                    .cloned()
                    .collect();

                self.store
                    .memberships
                    .update(membership.id, |m| {
                        m.score = remaining.len() as u32;
                        m.available_contestants = remaining.clone();
                    })
                    .map_err(|e| Error::internal(e.to_string()))?;
            } else {
                self.store
                    .memberships
                    .update(membership.id, |m| {
                        m.score = 0;
                        m.available_contestants.clear();
                    })
                    .map_err(|e| Error::internal(e.to_string()))?;
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Advance
    // ------------------------------------------------------------------

    /// Pre-advance readiness for the owner's confirmation screen
    pub fn get_advance_status(&self, pool_id: ObjectId, user_id: ObjectId) -> Result<AdvanceStatus> {
        let pool = self.require_pool_owner(pool_id, user_id)?;
        let season = self.require_season(&pool)?;
        let (status, _) = self.compute_advance_status(&pool, &season);
        Ok(status)
    }

    /// Compute advance readiness plus the ids of active members with no
    /// pick for the current week.
    pub(crate) fn compute_advance_status(
        &self,
        pool: &PoolDoc,
        season: &SeasonDoc,
    ) -> (AdvanceStatus, Vec<ObjectId>) {
        let current_week = pool.current_week;
        let can_advance = season::has_elimination_for_week(season, current_week);

        let active_user_ids: Vec<ObjectId> = self
            .store
            .memberships
            .find(|m| m.pool_id == pool.id && m.status == MembershipStatus::Active)
            .into_iter()
            .map(|m| m.user_id)
            .collect();

        let locked: HashSet<ObjectId> = self
            .store
            .picks
            .find(|p| {
                p.pool_id == pool.id
                    && p.week == current_week
                    && active_user_ids.contains(&p.user_id)
            })
            .into_iter()
            .map(|p| p.user_id)
            .collect();

        let missing_ids: Vec<ObjectId> = active_user_ids
            .iter()
            .filter(|id| !locked.contains(id))
            .copied()
            .collect();

        let names = self.display_names(&missing_ids);
        let mut missing_members: Vec<AdvanceMissingMember> = missing_ids
            .iter()
            .map(|id| AdvanceMissingMember {
                user_id: *id,
                display_name: names.get(id).cloned().unwrap_or_else(|| id.to_hex()),
            })
            .collect();
        missing_members.sort_by_key(|m| m.display_name.to_lowercase());

        let status = AdvanceStatus {
            current_week,
            active_member_count: active_user_ids.len(),
            locked_count: active_user_ids.len() - missing_ids.len(),
            missing_count: missing_ids.len(),
            missing_members,
            can_advance,
        };

        (status, missing_ids)
    }

    /// Resolve the current week: run eliminations, detect completion, and
    /// either finish the pool or bump the week.
    pub fn advance_week(&self, pool_id: ObjectId, acting_user: ObjectId) -> Result<AdvanceReport> {
        let pool = self.require_pool_owner(pool_id, acting_user)?;
        if pool.status == PoolStatus::Completed {
            return Err(Error::bad_request("Pool already completed"));
        }

        let season = self.require_season(&pool)?;
        let current_week = pool.current_week;

        let (status, missing_ids) = self.compute_advance_status(&pool, &season);
        if !status.can_advance {
            return Err(Error::bad_request("Next week data unavailable"));
        }

        let now = OffsetDateTime::now_utc();
        let mut eliminated: Vec<(ObjectId, EliminationReason)> = Vec::new();

        // Stage 1: active members who never locked a pick
        for user_id in &missing_ids {
            let hit = self.store.memberships.find_one_and_update(
                |m| {
                    m.pool_id == pool_id
                        && m.user_id == *user_id
                        && m.status == MembershipStatus::Active
                },
                |m| eliminate(m, EliminationReason::MissedPick, current_week, now),
            );
            if hit.is_some() {
                eliminated.push((*user_id, EliminationReason::MissedPick));
            }
        }

        // Stage 2: picks that matched this week's vote-out
        let voted_out: HashSet<String> = season
            .eliminations
            .iter()
            .filter(|e| e.week == current_week)
            .filter_map(|e| e.eliminated_contestant_id.clone())
            .collect();

        let doomed = self.store.picks.find(|p| {
            p.pool_id == pool_id && p.week == current_week && voted_out.contains(&p.contestant_id)
        });
        for pick in doomed {
            let hit = self.store.memberships.find_one_and_update(
                |m| {
                    m.pool_id == pool_id
                        && m.user_id == pick.user_id
                        && m.status == MembershipStatus::Active
                },
                |m| eliminate(m, EliminationReason::ContestantVotedOut, current_week, now),
            );
            if hit.is_some() {
                eliminated.push((pick.user_id, EliminationReason::ContestantVotedOut));
            }
        }

        // Stage 3: members with no eligible contestant left for next week
        let eligible_next = season::active_contestants(&season, current_week + 1);
        let survivors = self
            .store
            .memberships
            .find(|m| m.pool_id == pool_id && m.status == MembershipStatus::Active);
        for membership in survivors {
            let used: HashSet<String> = self
                .store
                .picks
                .find(|p| p.pool_id == pool_id && p.user_id == membership.user_id)
                .into_iter()
                .map(|p| p.contestant_id)
                .collect();

            if eligible_next.iter().all(|c| used.contains(c)) {
                let hit = self.store.memberships.find_one_and_update(
                    |m| m.id == membership.id && m.status == MembershipStatus::Active,
                    |m| eliminate(m, EliminationReason::NoOptionsLeft, current_week, now),
                );
                if hit.is_some() {
                    eliminated.push((membership.user_id, EliminationReason::NoOptionsLeft));
                }
            }
        }

        // Stage 4: completion detection, competitive pools only
        let mut winner_ids: Vec<ObjectId> = Vec::new();
        let mut completed = false;
        if pool.is_competitive {
            let remaining: Vec<MembershipDoc> = self
                .store
                .memberships
                .find(|m| m.pool_id == pool_id && m.status == MembershipStatus::Active);

            if remaining.len() == 1 {
                winner_ids.push(remaining[0].user_id);
                completed = true;
            } else if remaining.is_empty() && !eliminated.is_empty() {
                // Everyone fell this week: they tie as co-winners
                winner_ids = eliminated.iter().map(|(id, _)| *id).collect();
                completed = true;
            }
        }

        // Stage 5: persist the outcome
        let new_current_week;
        if completed {
            for user_id in &winner_ids {
                self.store.memberships.find_one_and_update(
                    |m| m.pool_id == pool_id && m.user_id == *user_id,
                    |m| {
                        m.status = MembershipStatus::Winner;
                        m.final_rank = Some(1);
                        m.finished_week = Some(current_week);
                        m.finished_date = Some(now);
                        m.score = 0;
                        m.available_contestants.clear();
                    },
                );
            }

            let winners = winner_ids.clone();
            let updated = self
                .store
                .pools
                .update(pool_id, |p| {
                    p.status = PoolStatus::Completed;
                    p.completed_week = Some(current_week);
                    p.completed_at = Some(now);
                    p.winners = winners.clone();
                })
                .map_err(|e| Error::internal(e.to_string()))?;

            new_current_week = current_week;
            self.recalculate_pool_scores(&updated, &season, current_week)?;
        } else {
            let updated = self
                .store
                .pools
                .find_one_and_update(
                    |p| p.id == pool_id && p.current_week == current_week,
                    |p| p.current_week += 1,
                )
                .ok_or_else(|| Error::conflict("Pool week changed, retry"))?;

            new_current_week = updated.current_week;
            self.recalculate_pool_scores(&updated, &season, new_current_week)?;
        }

        // Stage 6: report
        let mut involved: Vec<ObjectId> = eliminated.iter().map(|(id, _)| *id).collect();
        involved.extend(&winner_ids);
        let names = self.display_names(&involved);
        let name_of = |id: &ObjectId| names.get(id).cloned().unwrap_or_else(|| id.to_hex());

        let winner_set: HashSet<ObjectId> = winner_ids.iter().copied().collect();
        let mut eliminations: Vec<EliminatedMember> = eliminated
            .iter()
            .filter(|(id, _)| !winner_set.contains(id))
            .map(|(id, reason)| EliminatedMember {
                user_id: *id,
                display_name: name_of(id),
                reason: *reason,
            })
            .collect();
        eliminations.sort_by_key(|m| m.display_name.to_lowercase());

        let mut winners: Vec<WinnerSummary> = winner_ids
            .iter()
            .map(|id| WinnerSummary {
                user_id: *id,
                display_name: name_of(id),
            })
            .collect();
        winners.sort_by_key(|w| w.display_name.to_lowercase());

        tracing::info!(
            pool_id = %pool_id,
            week = current_week,
            new_current_week,
            eliminated = eliminated.len(),
            pool_completed = completed,
            "Pool week advanced"
        );

        Ok(AdvanceReport {
            new_current_week,
            eliminations,
            pool_completed: completed,
            winners,
        })
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// The picks screen: cached available set plus pool completion state
    pub fn get_available_contestants(
        &self,
        pool_id: ObjectId,
        user_id: ObjectId,
    ) -> Result<AvailableContestantsView> {
        let pool = self.require_pool(pool_id)?;

        let membership = self
            .store
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == user_id)
            .filter(|m| m.status.is_participant())
            .ok_or_else(|| Error::forbidden("User is not a member of this pool"))?;

        let season = self.require_season(&pool)?;
        let current_week = pool.current_week;

        let catalog: HashMap<&str, &str> = season
            .contestants
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let current_pick = self.current_pick(&pool, &catalog, user_id);
        let winners = self.winner_summaries(&pool);
        let did_tie = winners.len() > 1;

        let mut view = AvailableContestantsView {
            pool_id,
            user_id,
            current_week,
            contestants: Vec::new(),
            score: 0,
            current_pick,
            is_eliminated: false,
            elimination_reason: None,
            eliminated_week: None,
            is_winner: false,
            pool_status: pool.status,
            pool_completed_week: pool.completed_week,
            pool_completed_at: pool.completed_at,
            winners,
            did_tie,
        };

        match membership.status {
            MembershipStatus::Eliminated => {
                view.is_eliminated = true;
                view.elimination_reason = membership.elimination_reason;
                view.eliminated_week = membership.eliminated_week;
            }
            MembershipStatus::Winner => {
                view.is_winner = true;
            }
            MembershipStatus::Active => {
                if membership.score as usize != membership.available_contestants.len() {
                    return Err(Error::new(
                        ErrorCode::CacheInvalid,
                        "Membership cache invalid",
                    ));
                }
                view.score = membership.score;
                view.contestants = membership
                    .available_contestants
                    .iter()
                    .map(|id| {
                        let tribe = season::resolve_tribe(&season, id, current_week);
                        AvailableContestant {
                            id: id.clone(),
                            name: catalog.get(id.as_str()).copied().unwrap_or(id).to_string(),
                            tribe_name: tribe.map(|(n, _)| n.to_string()),
                            tribe_color: tribe.map(|(_, c)| c.to_string()),
                        }
                    })
                    .collect();
            }
            _ => unreachable!("participant statuses only"),
        }

        Ok(view)
    }

    /// Contestant detail for an active member
    pub fn get_contestant_detail(
        &self,
        pool_id: ObjectId,
        contestant_id: &str,
        user_id: ObjectId,
    ) -> Result<ContestantDetailView> {
        let pool = self.require_pool(pool_id)?;

        let membership = self
            .store
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == user_id)
            .filter(|m| m.status == MembershipStatus::Active)
            .ok_or_else(|| Error::forbidden("User is not an active member of this pool"))?;

        let season = self.require_season(&pool)?;
        let current_week = pool.current_week;

        let target = season
            .contestants
            .iter()
            .find(|c| c.id == contestant_id)
            .ok_or_else(|| Error::new(ErrorCode::ContestantNotFound, "Contestant not found"))?;

        let eliminated_week = season::eliminated_week(&season, contestant_id);
        // Never leak eliminations the pool has not resolved yet
        let visible_eliminated_week = eliminated_week.filter(|w| *w < current_week);

        let already_picked_week = self
            .store
            .picks
            .find_one(|p| {
                p.pool_id == pool_id && p.user_id == user_id && p.contestant_id == contestant_id
            })
            .map(|p| p.week);

        let catalog: HashMap<&str, &str> = season
            .contestants
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        let current_pick = self.current_pick(&pool, &catalog, user_id);

        let is_available = current_pick.is_none()
            && already_picked_week.is_none()
            && !matches!(eliminated_week, Some(w) if w < current_week)
            && membership.status == MembershipStatus::Active;

        let tribe = season::resolve_tribe(&season, contestant_id, current_week);
        let advantages = season::visible_advantages(&season, contestant_id, current_week)
            .into_iter()
            .map(|a| ContestantAdvantageView {
                id: a.id.clone(),
                label: a.display_name.clone(),
                value: a.advantage_type.clone(),
            })
            .collect();

        Ok(ContestantDetailView {
            pool_id,
            user_id,
            contestant: ContestantProfile {
                id: target.id.clone(),
                name: target.name.clone(),
                age: target.age,
                occupation: target.occupation.clone(),
                hometown: target.hometown.clone(),
                tribe_name: tribe.map(|(n, _)| n.to_string()),
                tribe_color: tribe.map(|(_, c)| c.to_string()),
                advantages,
            },
            is_available,
            eliminated_week: visible_eliminated_week,
            already_picked_week,
            current_pick,
        })
    }

    /// Ranked standings for everyone who has played
    pub fn get_pool_leaderboard(
        &self,
        pool_id: ObjectId,
        viewer_id: ObjectId,
    ) -> Result<LeaderboardView> {
        let pool = self.require_pool(pool_id)?;

        let viewer = self
            .store
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == viewer_id);
        if !matches!(viewer, Some(ref m) if m.status.is_participant()) {
            return Err(Error::forbidden("User is not a member of this pool"));
        }

        let participants: Vec<MembershipDoc> = self
            .store
            .memberships
            .find(|m| m.pool_id == pool_id && m.status.is_participant());

        let ids: Vec<ObjectId> = participants.iter().map(|m| m.user_id).collect();
        let names = self.display_names(&ids);

        let mut rows: Vec<LeaderboardEntry> = participants
            .iter()
            .map(|m| LeaderboardEntry {
                rank: 0,
                user_id: m.user_id,
                display_name: names
                    .get(&m.user_id)
                    .cloned()
                    .unwrap_or_else(|| m.user_id.to_hex()),
                score: m.score,
                status: m.status,
                is_winner: m.status == MembershipStatus::Winner,
                elimination_reason: m.elimination_reason,
                eliminated_week: m.eliminated_week,
                final_rank: m.final_rank,
                finished_week: m.finished_week,
                finished_date: m.finished_date,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| {
                    a.display_name
                        .to_lowercase()
                        .cmp(&b.display_name.to_lowercase())
                })
        });

        // Ties share a rank; the next distinct score takes index + 1
        let mut prev_score = None;
        let mut prev_rank = 0;
        for (i, row) in rows.iter_mut().enumerate() {
            if prev_score == Some(row.score) {
                row.rank = prev_rank;
            } else {
                row.rank = i + 1;
                prev_rank = row.rank;
                prev_score = Some(row.score);
            }
        }

        let winners = self.winner_summaries(&pool);
        let did_tie = winners.len() > 1;

        Ok(LeaderboardView {
            pool_id,
            current_week: pool.current_week,
            pool_status: pool.status,
            pool_completed_week: pool.completed_week,
            pool_completed_at: pool.completed_at,
            entries: rows,
            winners,
            did_tie,
        })
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn require_pool(&self, pool_id: ObjectId) -> Result<PoolDoc> {
        self.store
            .pools
            .get(pool_id)
            .ok_or_else(|| Error::new(ErrorCode::PoolNotFound, "Pool not found"))
    }

    pub(crate) fn require_pool_owner(
        &self,
        pool_id: ObjectId,
        user_id: ObjectId,
    ) -> Result<PoolDoc> {
        let pool = self.require_pool(pool_id)?;
        if pool.owner_id != user_id {
            return Err(Error::forbidden("User is not the pool owner"));
        }
        Ok(pool)
    }

    pub(crate) fn require_season(&self, pool: &PoolDoc) -> Result<SeasonDoc> {
        self.store
            .seasons
            .get(pool.season_id)
            .ok_or_else(|| Error::internal("Pool season not configured"))
    }

    /// Display names for a set of users
    pub(crate) fn display_names(&self, ids: &[ObjectId]) -> HashMap<ObjectId, String> {
        let wanted: HashSet<ObjectId> = ids.iter().copied().collect();
        self.store
            .users
            .find(|u| wanted.contains(&u.id))
            .into_iter()
            .map(|u| (u.id, u.display_name()))
            .collect()
    }

    fn current_pick(
        &self,
        pool: &PoolDoc,
        catalog: &HashMap<&str, &str>,
        user_id: ObjectId,
    ) -> Option<CurrentPick> {
        let pick = self.store.picks.find_one(|p| {
            p.pool_id == pool.id && p.user_id == user_id && p.week == pool.current_week
        })?;

        Some(CurrentPick {
            pick_id: pick.id,
            contestant_name: catalog
                .get(pick.contestant_id.as_str())
                .copied()
                .unwrap_or(pick.contestant_id.as_str())
                .to_string(),
            contestant_id: pick.contestant_id,
            week: pick.week,
            locked_at: pick.created_at,
        })
    }

    fn winner_summaries(&self, pool: &PoolDoc) -> Vec<WinnerSummary> {
        let names = self.display_names(&pool.winners);
        let mut winners: Vec<WinnerSummary> = pool
            .winners
            .iter()
            .map(|id| WinnerSummary {
                user_id: *id,
                display_name: names.get(id).cloned().unwrap_or_else(|| id.to_hex()),
            })
            .collect();
        winners.sort_by_key(|w| w.display_name.to_lowercase());
        winners
    }
}

/// Flip an active membership to eliminated
fn eliminate(m: &mut MembershipDoc, reason: EliminationReason, week: u32, now: OffsetDateTime) {
    m.status = MembershipStatus::Eliminated;
    m.elimination_reason = Some(reason);
    m.eliminated_week = Some(week);
    m.eliminated_date = Some(now);
    m.score = 0;
    m.available_contestants.clear();
}
