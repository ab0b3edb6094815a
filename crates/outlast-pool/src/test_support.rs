//! Shared fixtures for engine and invite tests

use std::sync::Arc;

use time::OffsetDateTime;

use outlast_common::ObjectId;
use outlast_store::schema::{Contestant, MembershipDoc, SeasonDoc, SeasonElimination, UserDoc};
use outlast_store::Store;

use crate::PoolService;

pub struct Fixture {
    pub store: Arc<Store>,
    pub pools: PoolService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(Store::in_memory());
        let pools = PoolService::new(store.clone());
        Self { store, pools }
    }

    /// Insert a verified active user; the username doubles as display name
    pub fn user(&self, username: &str) -> ObjectId {
        let id = ObjectId::new().unwrap();
        let mut user = UserDoc::new(
            id,
            username,
            format!("{}@example.com", username),
            "$pbkdf2-sha256$1000$c2FsdA$aGFzaA",
            format!("verify-{}", username),
            OffsetDateTime::now_utc(),
        );
        user.email_verified = true;
        user.verification_token = None;
        self.store.users.insert(user).unwrap();
        id
    }

    /// Insert a season with the given contestant ids and (week, contestant)
    /// vote-outs
    pub fn season(&self, contestants: &[&str], eliminations: &[(u32, &str)]) -> ObjectId {
        let id = ObjectId::new().unwrap();
        self.store
            .seasons
            .insert(SeasonDoc {
                id,
                season_name: "Test Season".into(),
                season_number: Some(47),
                contestants: contestants
                    .iter()
                    .map(|c| Contestant {
                        id: c.to_string(),
                        name: c.to_string(),
                        age: None,
                        occupation: None,
                        hometown: None,
                    })
                    .collect(),
                eliminations: eliminations
                    .iter()
                    .map(|(week, contestant)| SeasonElimination {
                        week: *week,
                        eliminated_contestant_id: Some(contestant.to_string()),
                    })
                    .collect(),
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        id
    }

    pub fn membership(&self, pool_id: ObjectId, user_id: ObjectId) -> MembershipDoc {
        self.store
            .memberships
            .find_one(|m| m.pool_id == pool_id && m.user_id == user_id)
            .expect("membership exists")
    }

    pub fn accept_invite(&self, pool_id: ObjectId, user_id: ObjectId) {
        self.pools
            .respond_to_invite(pool_id, user_id, "accept")
            .expect("invite accepted");
    }

    /// Lock a pick, asserting it landed on the expected week
    pub fn lock_pick(&self, pool_id: ObjectId, user_id: ObjectId, contestant: &str, week: u32) {
        let pick = self
            .pools
            .create_pick(pool_id, user_id, contestant)
            .expect("pick locked");
        assert_eq!(pick.week, week);
    }

    /// Force the pool onto a week without running an advance
    pub fn set_week(&self, pool_id: ObjectId, week: u32) {
        self.store
            .pools
            .update(pool_id, |p| p.current_week = week)
            .expect("pool exists");
    }
}
