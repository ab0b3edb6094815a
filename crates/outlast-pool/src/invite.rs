//! Invite lifecycle and the competitive latch

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;

use outlast_common::{
    Error, ErrorCode, InviteAction, MembershipRole, MembershipStatus, ObjectId, PoolStatus,
    Result,
};
use outlast_store::schema::MembershipDoc;

use crate::engine::PoolService;
use crate::views::{MemberSummary, MembershipList, PendingInvite};

impl PoolService {
    /// Invite a user into the pool (owner only)
    pub fn invite_user_to_pool(
        &self,
        pool_id: ObjectId,
        owner_id: ObjectId,
        invited_user_id: ObjectId,
    ) -> Result<MemberSummary> {
        let pool = self.require_pool_owner(pool_id, owner_id)?;
        if pool.status == PoolStatus::Completed {
            return Err(Error::bad_request("Pool already completed"));
        }

        if invited_user_id == owner_id {
            return Err(Error::bad_request("Owner is already in this pool"));
        }

        let target = self
            .store()
            .users
            .get(invited_user_id)
            .filter(|u| u.account_status == outlast_common::AccountStatus::Active)
            .ok_or_else(|| Error::new(ErrorCode::UserNotFound, "User not found"))?;

        let existing = self
            .store()
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == invited_user_id);
        if matches!(existing, Some(ref m) if m.status == MembershipStatus::Active) {
            return Err(Error::bad_request("User already in this pool"));
        }

        let now = OffsetDateTime::now_utc();
        let member_id = ObjectId::new()?;
        let updated = self
            .store()
            .memberships
            .upsert(
                |m| m.pool_id == pool_id && m.user_id == invited_user_id,
                |m| {
                    m.role = MembershipRole::Member;
                    m.status = MembershipStatus::Invited;
                    m.invited_at = Some(now);
                    m.joined_at = None;
                    m.elimination_reason = None;
                    m.eliminated_week = None;
                    m.eliminated_date = None;
                    m.final_rank = None;
                    m.finished_week = None;
                    m.finished_date = None;
                    m.score = 0;
                    m.available_contestants.clear();
                },
                || MembershipDoc::invited(member_id, pool_id, invited_user_id, now),
            )
            .map_err(|e| Error::internal(e.to_string()))?;

        tracing::info!(
            pool_id = %pool_id,
            invited_user_id = %invited_user_id,
            "User invited to pool"
        );

        Ok(MemberSummary::from_docs(&updated, &target))
    }

    /// Accept or decline a pending invite
    pub fn respond_to_invite(
        &self,
        pool_id: ObjectId,
        user_id: ObjectId,
        action: &str,
    ) -> Result<MemberSummary> {
        let action =
            InviteAction::parse(action).ok_or_else(|| Error::bad_request("Unsupported action"))?;

        let pool = self.require_pool(pool_id)?;
        if pool.status == PoolStatus::Completed {
            return Err(Error::bad_request("Pool already completed"));
        }

        let membership = self
            .store()
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == user_id);
        if !matches!(membership, Some(ref m) if m.status == MembershipStatus::Invited) {
            return Err(Error::new(ErrorCode::InviteNotFound, "Invite not found"));
        }

        let now = OffsetDateTime::now_utc();

        // Conditional on the invite still being pending: exactly one of two
        // racing decisions wins
        let updated = self
            .store()
            .memberships
            .find_one_and_update(
                |m| {
                    m.pool_id == pool_id
                        && m.user_id == user_id
                        && m.status == MembershipStatus::Invited
                },
                |m| match action {
                    InviteAction::Accept => {
                        m.status = MembershipStatus::Active;
                        m.joined_at = Some(now);
                        m.elimination_reason = None;
                        m.eliminated_week = None;
                        m.eliminated_date = None;
                    }
                    InviteAction::Decline => {
                        m.status = MembershipStatus::Declined;
                        m.joined_at = None;
                        m.score = 0;
                        m.available_contestants.clear();
                    }
                },
            )
            .ok_or_else(|| Error::conflict("Invite already handled"))?;

        if action == InviteAction::Accept {
            let season = self.require_season(&pool)?;
            self.recalculate_pool_scores(&pool, &season, pool.current_week)?;
            self.maybe_mark_pool_competitive(pool_id)?;
        }

        let user = self
            .store()
            .users
            .get(user_id)
            .ok_or_else(|| Error::new(ErrorCode::UserNotFound, "User not found"))?;

        tracing::info!(
            pool_id = %pool_id,
            user_id = %user_id,
            accepted = action == InviteAction::Accept,
            "Invite resolved"
        );

        Ok(MemberSummary::from_docs(&updated, &user))
    }

    /// Latch the pool competitive once two members are active at the same
    /// time. The conditional update keeps this idempotent under races.
    pub(crate) fn maybe_mark_pool_competitive(&self, pool_id: ObjectId) -> Result<()> {
        let Some(pool) = self.store().pools.get(pool_id) else {
            return Ok(());
        };
        if pool.is_competitive {
            return Ok(());
        }

        let active = self
            .store()
            .memberships
            .count(|m| m.pool_id == pool_id && m.status == MembershipStatus::Active);
        if active < 2 {
            return Ok(());
        }

        let latched = self.store().pools.find_one_and_update(
            |p| p.id == pool_id && !p.is_competitive,
            |p| {
                p.is_competitive = true;
                p.competitive_since_week = Some(p.current_week);
            },
        );

        if latched.is_some() {
            tracing::info!(pool_id = %pool_id, "Pool is now competitive");
        }
        Ok(())
    }

    /// Pending invites for a user, enriched with pool/owner/season context
    pub fn get_pending_invites_for_user(&self, user_id: ObjectId) -> Result<Vec<PendingInvite>> {
        let memberships = self
            .store()
            .memberships
            .find(|m| m.user_id == user_id && m.status == MembershipStatus::Invited);
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let pool_ids: HashSet<ObjectId> = memberships.iter().map(|m| m.pool_id).collect();
        let pools: HashMap<ObjectId, _> = self
            .store()
            .pools
            .find(|p| pool_ids.contains(&p.id))
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let owner_ids: Vec<ObjectId> = pools.values().map(|p| p.owner_id).collect();
        let owner_names = self.display_names(&owner_ids);

        let season_ids: HashSet<ObjectId> = pools.values().map(|p| p.season_id).collect();
        let season_numbers: HashMap<ObjectId, Option<u32>> = self
            .store()
            .seasons
            .find(|s| season_ids.contains(&s.id))
            .into_iter()
            .map(|s| (s.id, s.season_number))
            .collect();

        let mut invites: Vec<PendingInvite> = memberships
            .iter()
            .filter_map(|m| {
                let pool = pools.get(&m.pool_id)?;
                Some(PendingInvite {
                    pool_id: pool.id,
                    pool_name: pool.name.clone(),
                    owner_display_name: owner_names
                        .get(&pool.owner_id)
                        .cloned()
                        .unwrap_or_default(),
                    season_id: pool.season_id,
                    season_number: season_numbers.get(&pool.season_id).copied().flatten(),
                    invited_at: m.invited_at,
                })
            })
            .collect();

        invites.sort_by_key(|i| (i.invited_at.is_none(), i.pool_name.to_lowercase()));
        Ok(invites)
    }

    /// Every membership in the pool, joined with user profiles (owner only)
    pub fn list_pool_memberships(
        &self,
        pool_id: ObjectId,
        owner_id: ObjectId,
    ) -> Result<MembershipList> {
        self.require_pool_owner(pool_id, owner_id)?;

        let memberships = self.store().memberships.find(|m| m.pool_id == pool_id);

        let user_ids: HashSet<ObjectId> = memberships.iter().map(|m| m.user_id).collect();
        let users: HashMap<ObjectId, _> = self
            .store()
            .users
            .find(|u| user_ids.contains(&u.id))
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut members: Vec<MemberSummary> = memberships
            .iter()
            .filter_map(|m| users.get(&m.user_id).map(|u| MemberSummary::from_docs(m, u)))
            .collect();

        members.sort_by_key(|m| {
            (
                m.role != MembershipRole::Owner,
                !matches!(m.status, MembershipStatus::Active | MembershipStatus::Winner),
                m.display_name.to_lowercase(),
            )
        });

        Ok(MembershipList {
            pool_id,
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[test]
    fn test_invite_and_accept() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let season = f.season(&["A", "B"], &[(1, "A")]);
        let pool = f.pools.create_pool(alice, "Inv", season, 1, &[]).unwrap();

        let member = f.pools.invite_user_to_pool(pool.id, alice, bob).unwrap();
        assert_eq!(member.status, MembershipStatus::Invited);
        assert_eq!(member.role, MembershipRole::Member);
        assert!(member.invited_at.is_some());

        let joined = f.pools.respond_to_invite(pool.id, bob, "accept").unwrap();
        assert_eq!(joined.status, MembershipStatus::Active);
        assert!(joined.joined_at.is_some());

        // Accepting recomputed the new member's cache
        let m = f.membership(pool.id, bob);
        assert_eq!(m.score, 2);
        assert_eq!(m.available_contestants, vec!["A", "B"]);
    }

    #[test]
    fn test_invite_validations() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let season = f.season(&["A"], &[]);
        let pool = f.pools.create_pool(alice, "Inv", season, 1, &[]).unwrap();

        // Owner cannot invite themselves
        let own = f.pools.invite_user_to_pool(pool.id, alice, alice);
        assert_eq!(own.unwrap_err().http_status(), 400);

        // Unknown target
        let ghost = f
            .pools
            .invite_user_to_pool(pool.id, alice, ObjectId::new().unwrap());
        assert_eq!(ghost.unwrap_err().http_status(), 404);

        // Inactive target looks like a missing user
        let carol = f.user("carol");
        f.store
            .users
            .update(carol, |u| {
                u.account_status = outlast_common::AccountStatus::Inactive
            })
            .unwrap();
        let inactive = f.pools.invite_user_to_pool(pool.id, alice, carol);
        assert_eq!(inactive.unwrap_err().http_status(), 404);

        // Only the owner can invite
        let not_owner = f.pools.invite_user_to_pool(pool.id, bob, carol);
        assert_eq!(not_owner.unwrap_err().http_status(), 403);

        // Already-active members cannot be re-invited
        f.pools.invite_user_to_pool(pool.id, alice, bob).unwrap();
        f.pools.respond_to_invite(pool.id, bob, "accept").unwrap();
        let again = f.pools.invite_user_to_pool(pool.id, alice, bob);
        let err = again.unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.message, "User already in this pool");
    }

    #[test]
    fn test_decline_and_reinvite() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let season = f.season(&["A", "B"], &[]);
        let pool = f.pools.create_pool(alice, "Inv", season, 1, &[bob]).unwrap();

        let declined = f.pools.respond_to_invite(pool.id, bob, "decline").unwrap();
        assert_eq!(declined.status, MembershipStatus::Declined);
        let m = f.membership(pool.id, bob);
        assert_eq!(m.score, 0);
        assert!(m.available_contestants.is_empty());
        assert!(m.joined_at.is_none());

        // A declined member can be invited again
        let reinvited = f.pools.invite_user_to_pool(pool.id, alice, bob).unwrap();
        assert_eq!(reinvited.status, MembershipStatus::Invited);
    }

    #[test]
    fn test_invite_decision_races() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let season = f.season(&["A"], &[]);
        let pool = f.pools.create_pool(alice, "Race", season, 1, &[bob]).unwrap();

        f.pools.respond_to_invite(pool.id, bob, "accept").unwrap();

        // The invite is no longer pending, whichever way the second call
        // reads it
        let second = f.pools.respond_to_invite(pool.id, bob, "decline");
        let err = second.unwrap_err();
        assert_eq!(err.http_status(), 404);

        // With no membership at all the invite is simply missing
        let nobody = f.pools.respond_to_invite(pool.id, f.user("zed"), "accept");
        assert_eq!(nobody.unwrap_err().http_status(), 404);

        // Bad action strings are rejected before any lookup
        let bad = f.pools.respond_to_invite(pool.id, bob, "shrug");
        assert_eq!(bad.unwrap_err().http_status(), 400);
    }

    #[test]
    fn test_competitive_latch_is_monotonic() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let carol = f.user("carol");
        let season = f.season(&["A", "B", "C"], &[(1, "A"), (2, "B")]);
        let pool = f
            .pools
            .create_pool(alice, "Latch", season, 1, &[bob, carol])
            .unwrap();

        // One active member: not competitive
        assert!(!f.store.pools.get(pool.id).unwrap().is_competitive);

        f.accept_invite(pool.id, bob);
        let latched = f.store.pools.get(pool.id).unwrap();
        assert!(latched.is_competitive);
        assert_eq!(latched.competitive_since_week, Some(1));

        // A later accept does not move the latch week
        f.set_week(pool.id, 2);
        f.accept_invite(pool.id, carol);
        let still = f.store.pools.get(pool.id).unwrap();
        assert!(still.is_competitive);
        assert_eq!(still.competitive_since_week, Some(1));
    }

    #[test]
    fn test_pending_invites_enriched_and_sorted() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let zoe = f.user("zoe");
        let season = f.season(&["A"], &[]);

        let beach = f.pools.create_pool(alice, "Beach", season, 1, &[bob]).unwrap();
        let atoll = f.pools.create_pool(zoe, "atoll", season, 1, &[bob]).unwrap();

        let invites = f.pools.get_pending_invites_for_user(bob).unwrap();
        assert_eq!(invites.len(), 2);
        // Sorted by lowered pool name
        assert_eq!(invites[0].pool_id, atoll.id);
        assert_eq!(invites[0].owner_display_name, "zoe");
        assert_eq!(invites[0].season_number, Some(47));
        assert_eq!(invites[1].pool_id, beach.id);

        // Resolved invites vanish from the list
        f.accept_invite(beach.id, bob);
        let remaining = f.pools.get_pending_invites_for_user(bob).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].pool_id, atoll.id);
    }

    #[test]
    fn test_list_pool_memberships_sorted() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let carol = f.user("carol");
        let dave = f.user("dave");
        let season = f.season(&["A", "B"], &[(1, "A")]);
        let pool = f
            .pools
            .create_pool(alice, "List", season, 1, &[bob, carol, dave])
            .unwrap();
        f.accept_invite(pool.id, bob);
        f.pools.respond_to_invite(pool.id, carol, "decline").unwrap();

        let list = f.pools.list_pool_memberships(pool.id, alice).unwrap();
        assert_eq!(list.members.len(), 4);
        // Owner first, then active members, then the rest by name
        assert_eq!(list.members[0].display_name, "alice");
        assert_eq!(list.members[1].display_name, "bob");
        assert_eq!(list.members[2].display_name, "carol");
        assert_eq!(list.members[3].display_name, "dave");
        assert_eq!(list.members[2].status, MembershipStatus::Declined);
        assert_eq!(list.members[3].status, MembershipStatus::Invited);

        let not_owner = f.pools.list_pool_memberships(pool.id, bob);
        assert_eq!(not_owner.unwrap_err().http_status(), 403);
    }

    #[test]
    fn test_completed_pool_freezes_invites() {
        let f = Fixture::new();
        let alice = f.user("alice");
        let bob = f.user("bob");
        let carol = f.user("carol");
        let season = f.season(&["A", "B", "C"], &[(1, "A")]);
        let pool = f
            .pools
            .create_pool(alice, "Frozen", season, 1, &[bob, carol])
            .unwrap();
        f.accept_invite(pool.id, bob);
        f.lock_pick(pool.id, alice, "B", 1);
        f.lock_pick(pool.id, bob, "A", 1);
        f.pools.advance_week(pool.id, alice).unwrap();

        // Pool completed; carol's stale invite can no longer be resolved
        let accept = f.pools.respond_to_invite(pool.id, carol, "accept");
        assert_eq!(accept.unwrap_err().http_status(), 400);

        let invite = f.pools.invite_user_to_pool(pool.id, alice, f.user("erin"));
        assert_eq!(invite.unwrap_err().http_status(), 400);
    }
}
