//! User account lifecycle

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use outlast_auth::{random_urlsafe_token, AuthError, PasswordHasher, Tokenizer};
use outlast_common::{
    AccountStatus, Error, ErrorCode, MembershipStatus, ObjectId, Result,
};
use outlast_pool::{PoolService, PoolView};
use outlast_store::schema::UserDoc;
use outlast_store::Store;

use crate::email::Mailer;

const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;
const LOCKOUT_MINUTES: i64 = 15;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

const SEARCH_MIN_QUERY_LEN: usize = 2;
const SEARCH_MAX_LIMIT: usize = 25;

/// User profile as returned to the caller (never includes the hash)
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub account_status: AccountStatus,
    pub email_verified: bool,
    pub created_at: OffsetDateTime,
    pub default_pool: Option<ObjectId>,
    /// Bearer credential, attached on login only
    pub token: Option<String>,
}

impl UserView {
    fn from_doc(user: &UserDoc, token: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            account_status: user.account_status,
            email_verified: user.email_verified,
            created_at: user.created_at,
            default_pool: user.default_pool,
            token,
        }
    }
}

/// One ranked user search hit
#[derive(Debug, Clone)]
pub struct UserSearchResult {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    /// The user's status in the queried pool, if one was supplied
    pub membership_status: Option<MembershipStatus>,
}

/// User account service
#[derive(Clone)]
pub struct UserService {
    store: Arc<Store>,
    hasher: Arc<PasswordHasher>,
    tokenizer: Arc<Tokenizer>,
    mailer: Arc<dyn Mailer>,
    pools: PoolService,
}

impl UserService {
    /// Create the service over the shared store
    pub fn new(
        store: Arc<Store>,
        hasher: Arc<PasswordHasher>,
        tokenizer: Arc<Tokenizer>,
        mailer: Arc<dyn Mailer>,
        pools: PoolService,
    ) -> Self {
        Self {
            store,
            hasher,
            tokenizer,
            mailer,
            pools,
        }
    }

    /// Sign up a new account and send the verification email
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> Result<UserView> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(Error::bad_request("Username is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(Error::bad_request("Invalid email address"));
        }

        if self.store.users.exists(|u| u.username == username) {
            return Err(Error::bad_request("Username already exists"));
        }
        if self.store.users.exists(|u| u.email == email) {
            return Err(Error::bad_request("Email already exists"));
        }

        let password_hash = self.hasher.hash(password).map_err(map_password_error)?;
        let verification_token =
            random_urlsafe_token().map_err(|e| Error::internal(e.to_string()))?;

        let user = UserDoc::new(
            ObjectId::new()?,
            username,
            email,
            password_hash,
            verification_token.clone(),
            OffsetDateTime::now_utc(),
        );

        self.store
            .users
            .insert(user.clone())
            .map_err(|_| Error::bad_request("Username or email already exists"))?;

        self.mailer.send_verification(email, &verification_token);

        tracing::info!(user_id = %user.id, username, "User created");
        Ok(UserView::from_doc(&user, None))
    }

    /// Authenticate by username or email. Unknown identifiers and wrong
    /// passwords are indistinguishable to the caller, in both message and
    /// timing (the dummy hash keeps the PBKDF2 cost on both paths).
    pub fn login_user(&self, identifier: &str, password: &str) -> Result<UserView> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::bad_request("Identifier is required"));
        }

        let mut user = self
            .store
            .users
            .find_one(|u| u.email == identifier || u.username == identifier);
        let now = OffsetDateTime::now_utc();

        let lockout = user.as_ref().and_then(|u| u.locked_until.map(|t| (u.id, t)));
        if let Some((user_id, locked_until)) = lockout {
            if locked_until > now {
                let remaining = (locked_until - now).whole_seconds();
                let minutes = ((remaining + 59) / 60).max(1);
                let plural = if minutes == 1 { "" } else { "s" };
                return Err(Error::rate_limited(format!(
                    "Account locked. Try again in {} minute{}.",
                    minutes, plural
                )));
            }
            // Lockout expired: reset the counters before verifying
            let reset = self
                .store
                .users
                .update(user_id, |doc| {
                    doc.failed_login_attempts = 0;
                    doc.locked_until = None;
                })
                .map_err(|e| Error::internal(e.to_string()))?;
            user = Some(reset);
        }

        let hashed = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.hasher.dummy_hash().to_string(),
        };

        let password_valid = self.hasher.verify(password, &hashed);

        let user = match user {
            Some(u) if password_valid => u,
            rejected => {
                if let Some(u) = rejected {
                    let after = self.store.users.find_one_and_update(
                        |doc| doc.id == u.id,
                        |doc| doc.failed_login_attempts += 1,
                    );
                    let failed = after.map(|doc| doc.failed_login_attempts).unwrap_or(0);
                    if failed >= MAX_FAILED_LOGIN_ATTEMPTS {
                        let _ = self.store.users.update(u.id, |doc| {
                            doc.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
                        });
                        tracing::warn!(user_id = %u.id, failed, "Account locked out");
                        return Err(Error::rate_limited(
                            "Account locked due to too many failed attempts",
                        ));
                    }
                }
                return Err(Error::unauthorized("Incorrect username/email or password"));
            }
        };

        if user.account_status != AccountStatus::Active {
            return Err(Error::forbidden("Account is not active"));
        }
        if !user.email_verified {
            return Err(Error::forbidden("Email not verified"));
        }

        if user.failed_login_attempts > 0 || user.locked_until.is_some() {
            let _ = self.store.users.update(user.id, |doc| {
                doc.failed_login_attempts = 0;
                doc.locked_until = None;
            });
        }

        let token = self
            .tokenizer
            .issue(user.id.to_hex())
            .map_err(|e| Error::internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(UserView::from_doc(&user, Some(token)))
    }

    /// Change the password, invalidating every outstanding credential
    pub fn update_password(
        &self,
        user_id: ObjectId,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let user = self.require_user(user_id)?;

        if new_password != confirm_password {
            return Err(Error::bad_request("Passwords do not match"));
        }
        if new_password.len() < 6 {
            return Err(Error::bad_request("Password must be at least 6 characters"));
        }
        if !self.hasher.verify(current_password, &user.password_hash) {
            return Err(Error::unauthorized("Current password is incorrect"));
        }

        let new_hash = self.hasher.hash(new_password).map_err(map_password_error)?;
        self.store
            .users
            .update(user_id, |doc| {
                doc.password_hash = new_hash.clone();
                doc.token_invalidated_at = Some(OffsetDateTime::now_utc());
            })
            .map_err(|e| Error::internal(e.to_string()))?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Start a password reset: mint a short-lived token and mail it
    pub fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::bad_request("Email is required"));
        }

        let user = self
            .store
            .users
            .find_one(|u| u.email == email)
            .ok_or_else(|| Error::new(ErrorCode::UserNotFound, "User not found"))?;

        let token = random_urlsafe_token().map_err(|e| Error::internal(e.to_string()))?;
        let expires_at = OffsetDateTime::now_utc() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.store
            .users
            .update(user.id, |doc| {
                doc.reset_token = Some(token.clone());
                doc.reset_token_expires_at = Some(expires_at);
            })
            .map_err(|e| Error::internal(e.to_string()))?;

        self.mailer.send_password_reset(email, &token);
        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Complete a password reset with the mailed token
    pub fn complete_password_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::bad_request("Reset token is required"));
        }
        if new_password != confirm_password {
            return Err(Error::bad_request("Passwords do not match"));
        }
        if new_password.len() < 6 {
            return Err(Error::bad_request("Password must be at least 6 characters"));
        }

        let user = self
            .store
            .users
            .find_one(|u| u.reset_token.as_deref() == Some(token))
            .ok_or_else(|| Error::new(ErrorCode::NotFound, "Reset token is invalid"))?;

        let expired = match user.reset_token_expires_at {
            Some(expires_at) => expires_at < OffsetDateTime::now_utc(),
            None => true,
        };
        if expired {
            return Err(Error::bad_request("Reset token has expired"));
        }

        let new_hash = self.hasher.hash(new_password).map_err(map_password_error)?;
        self.store
            .users
            .update(user.id, |doc| {
                doc.password_hash = new_hash.clone();
                doc.token_invalidated_at = Some(OffsetDateTime::now_utc());
                doc.reset_token = None;
                doc.reset_token_expires_at = None;
            })
            .map_err(|e| Error::internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Confirm an email address. Idempotent: a second call with the same
    /// token succeeds and changes nothing.
    pub fn verify_user_email(&self, token: &str) -> Result<UserView> {
        if token.is_empty() {
            return Err(Error::bad_request("Verification token is required"));
        }

        let user = self
            .store
            .users
            .find_one(|u| u.verification_token.as_deref() == Some(token))
            .ok_or_else(|| {
                Error::new(ErrorCode::NotFound, "Verification token is invalid or expired")
            })?;

        if user.email_verified {
            let _ = self
                .store
                .users
                .update(user.id, |doc| doc.verification_token = None);
            return Ok(UserView::from_doc(&user, None));
        }

        // The token survives the first pass so a repeated click on the
        // emailed link still lands on the already-verified branch above
        let updated = self
            .store
            .users
            .update(user.id, |doc| {
                doc.email_verified = true;
                doc.verification_verified_at = Some(OffsetDateTime::now_utc());
            })
            .map_err(|e| Error::internal(e.to_string()))?;

        tracing::info!(user_id = %updated.id, "Email verified");
        Ok(UserView::from_doc(&updated, None))
    }

    /// Set or clear the user's default pool
    pub fn update_default_pool(
        &self,
        user_id: ObjectId,
        default_pool: Option<ObjectId>,
    ) -> Result<UserView> {
        self.require_user(user_id)?;

        if let Some(pool_id) = default_pool {
            if self.store.pools.get(pool_id).is_none() {
                return Err(Error::new(ErrorCode::PoolNotFound, "Pool not found"));
            }
            let is_member = self
                .store
                .memberships
                .exists(|m| m.pool_id == pool_id && m.user_id == user_id);
            if !is_member {
                return Err(Error::forbidden("User is not a member of this pool"));
            }
        }

        let updated = self
            .store
            .users
            .update(user_id, |doc| doc.default_pool = default_pool)
            .map_err(|e| Error::internal(e.to_string()))?;

        Ok(UserView::from_doc(&updated, None))
    }

    /// Pools where the user has played: active, eliminated, or winner
    pub fn list_user_pools(&self, user_id: ObjectId) -> Result<Vec<PoolView>> {
        let pool_ids: HashSet<ObjectId> = self
            .store
            .memberships
            .find(|m| m.user_id == user_id && m.status.is_participant())
            .into_iter()
            .map(|m| m.pool_id)
            .collect();

        Ok(self
            .store
            .pools
            .find(|p| pool_ids.contains(&p.id))
            .iter()
            .map(|p| PoolView::from_doc(p, Vec::new()))
            .collect())
    }

    /// The user's own profile
    pub fn get_user_profile(&self, user_id: ObjectId) -> Result<UserView> {
        let user = self.require_user(user_id)?;
        Ok(UserView::from_doc(&user, None))
    }

    /// Delete the account: owned pools first (full cascade), then the
    /// user's memberships and picks, then the user itself.
    pub fn delete_user(&self, user_id: ObjectId) -> Result<()> {
        self.require_user(user_id)?;

        let owned: Vec<ObjectId> = self
            .store
            .pools
            .find(|p| p.owner_id == user_id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        for pool_id in owned {
            self.pools.delete_pool(pool_id, user_id)?;
        }

        self.store.memberships.delete_many(|m| m.user_id == user_id);
        self.store.picks.delete_many(|p| p.user_id == user_id);

        if !self.store.users.delete(user_id) {
            return Err(Error::internal("Failed to delete user"));
        }

        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Ranked substring search over active usernames.
    ///
    /// Rank 0 is an exact (case-folded) match, 1 a prefix match, 2 a
    /// substring match; ties break on the lowered username. When `pool_id`
    /// is given, users already active, invited, or eliminated there are
    /// excluded and the rest are annotated with their status.
    pub fn search_active_users(
        &self,
        query: &str,
        pool_id: Option<ObjectId>,
        limit: usize,
    ) -> Result<Vec<UserSearchResult>> {
        let trimmed = query.trim();
        if trimmed.len() < SEARCH_MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let effective_limit = limit.clamp(1, SEARCH_MAX_LIMIT);
        let normalized = trimmed.to_lowercase();

        let pool_status: HashMap<ObjectId, MembershipStatus> = match pool_id {
            Some(pool_id) => self
                .store
                .memberships
                .find(|m| m.pool_id == pool_id)
                .into_iter()
                .map(|m| (m.user_id, m.status))
                .collect(),
            None => HashMap::new(),
        };

        let fetch_limit = (effective_limit * 3).max(30);
        let mut candidates: Vec<UserDoc> = self
            .store
            .users
            .find(|u| {
                u.account_status == AccountStatus::Active
                    && u.username.to_lowercase().contains(&normalized)
            })
            .into_iter()
            .take(fetch_limit)
            .collect();

        candidates.sort_by_key(|u| {
            let lowered = u.username.to_lowercase();
            let rank = if lowered == normalized {
                0
            } else if lowered.starts_with(&normalized) {
                1
            } else {
                2
            };
            (rank, lowered)
        });

        let mut results = Vec::new();
        for user in candidates {
            let status = pool_status.get(&user.id).copied();
            if matches!(
                status,
                Some(
                    MembershipStatus::Active
                        | MembershipStatus::Invited
                        | MembershipStatus::Eliminated
                )
            ) {
                continue;
            }
            results.push(UserSearchResult {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                membership_status: status,
            });
            if results.len() >= effective_limit {
                break;
            }
        }

        Ok(results)
    }

    fn require_user(&self, user_id: ObjectId) -> Result<UserDoc> {
        self.store
            .users
            .get(user_id)
            .ok_or_else(|| Error::new(ErrorCode::UserNotFound, "User not found"))
    }
}

fn map_password_error(err: AuthError) -> Error {
    match err {
        AuthError::InvalidPasswordFormat(msg) => Error::bad_request(msg),
        other => Error::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::LogMailer;

    fn service() -> (Arc<Store>, UserService) {
        let store = Arc::new(Store::in_memory());
        let hasher = Arc::new(PasswordHasher::with_iterations(1000));
        let tokenizer = Arc::new(Tokenizer::new(
            b"user-service-secret",
            Duration::days(30),
            Duration::days(3),
        ));
        let pools = PoolService::new(store.clone());
        let users = UserService::new(store.clone(), hasher, tokenizer, Arc::new(LogMailer), pools);
        (store, users)
    }

    fn signup(users: &UserService, store: &Store, name: &str) -> ObjectId {
        let view = users
            .create_user(name, &format!("{}@example.com", name), "torches")
            .unwrap();
        // Verify through the mailed token
        let token = store
            .users
            .get(view.id)
            .unwrap()
            .verification_token
            .unwrap();
        users.verify_user_email(&token).unwrap();
        view.id
    }

    #[test]
    fn test_create_user_and_duplicates() {
        let (store, users) = service();

        let view = users
            .create_user("jeff", "jeff@example.com", "torches")
            .unwrap();
        assert_eq!(view.username, "jeff");
        assert!(!view.email_verified);
        assert!(view.token.is_none());

        // Stored with a verification token and a hashed password
        let doc = store.users.get(view.id).unwrap();
        assert!(doc.verification_token.is_some());
        assert!(doc.password_hash.starts_with("$pbkdf2-sha256$"));

        let dup_name = users.create_user("jeff", "other@example.com", "torches");
        assert_eq!(dup_name.unwrap_err().message, "Username already exists");

        let dup_email = users.create_user("other", "jeff@example.com", "torches");
        assert_eq!(dup_email.unwrap_err().message, "Email already exists");

        let short = users.create_user("shorty", "shorty@example.com", "abc");
        assert_eq!(short.unwrap_err().http_status(), 400);
    }

    #[test]
    fn test_verify_email_is_idempotent() {
        let (store, users) = service();
        let view = users
            .create_user("jeff", "jeff@example.com", "torches")
            .unwrap();
        let token = store.users.get(view.id).unwrap().verification_token.unwrap();

        let first = users.verify_user_email(&token).unwrap();
        assert!(first.email_verified);

        // Second click on the same link: succeeds, clears the token
        let second = users.verify_user_email(&token).unwrap();
        assert!(second.email_verified);
        assert!(store.users.get(view.id).unwrap().verification_token.is_none());

        // Once the token is gone the link is dead
        let third = users.verify_user_email(&token);
        assert_eq!(third.unwrap_err().http_status(), 404);

        let bogus = users.verify_user_email("nope");
        assert_eq!(bogus.unwrap_err().http_status(), 404);
    }

    #[test]
    fn test_login_by_username_or_email() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        let by_name = users.login_user("jeff", "torches").unwrap();
        assert_eq!(by_name.id, id);
        assert!(by_name.token.is_some());

        let by_email = users.login_user("jeff@example.com", "torches").unwrap();
        assert!(by_email.token.is_some());
    }

    #[test]
    fn test_login_failures_share_one_message() {
        let (store, users) = service();
        signup(&users, &store, "jeff");

        let wrong = users.login_user("jeff", "wrong-password").unwrap_err();
        let unknown = users.login_user("nobody", "wrong-password").unwrap_err();

        assert_eq!(wrong.http_status(), 401);
        assert_eq!(unknown.http_status(), 401);
        assert_eq!(wrong.message, unknown.message);
        assert_eq!(wrong.message, "Incorrect username/email or password");
    }

    #[test]
    fn test_login_requires_verified_active_account() {
        let (store, users) = service();
        let view = users
            .create_user("jeff", "jeff@example.com", "torches")
            .unwrap();

        let unverified = users.login_user("jeff", "torches").unwrap_err();
        assert_eq!(unverified.http_status(), 403);
        assert_eq!(unverified.message, "Email not verified");

        let token = store.users.get(view.id).unwrap().verification_token.unwrap();
        users.verify_user_email(&token).unwrap();
        store
            .users
            .update(view.id, |u| u.account_status = AccountStatus::Inactive)
            .unwrap();

        let inactive = users.login_user("jeff", "torches").unwrap_err();
        assert_eq!(inactive.http_status(), 403);
        assert_eq!(inactive.message, "Account is not active");
    }

    #[test]
    fn test_login_lockout_after_five_failures() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        for _ in 0..4 {
            let err = users.login_user("jeff", "wrong").unwrap_err();
            assert_eq!(err.http_status(), 401);
        }

        // Fifth consecutive failure locks the account
        let fifth = users.login_user("jeff", "wrong").unwrap_err();
        assert_eq!(fifth.http_status(), 429);
        assert_eq!(fifth.message, "Account locked due to too many failed attempts");
        let doc = store.users.get(id).unwrap();
        assert_eq!(doc.failed_login_attempts, 5);
        assert!(doc.locked_until.is_some());

        // Even the right password bounces during the window
        let sixth = users.login_user("jeff", "torches").unwrap_err();
        assert_eq!(sixth.http_status(), 429);
        assert!(sixth.message.starts_with("Account locked. Try again in"));

        // Once the window lapses, counters reset and login succeeds
        store
            .users
            .update(id, |u| {
                u.locked_until = Some(OffsetDateTime::now_utc() - Duration::seconds(1))
            })
            .unwrap();
        let back = users.login_user("jeff", "torches").unwrap();
        assert!(back.token.is_some());
        let doc = store.users.get(id).unwrap();
        assert_eq!(doc.failed_login_attempts, 0);
        assert!(doc.locked_until.is_none());
    }

    #[test]
    fn test_successful_login_clears_failures() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        users.login_user("jeff", "wrong").unwrap_err();
        users.login_user("jeff", "wrong").unwrap_err();
        assert_eq!(store.users.get(id).unwrap().failed_login_attempts, 2);

        users.login_user("jeff", "torches").unwrap();
        assert_eq!(store.users.get(id).unwrap().failed_login_attempts, 0);
    }

    #[test]
    fn test_update_password_invalidates_tokens() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        let mismatch = users.update_password(id, "torches", "newpass1", "newpass2");
        assert_eq!(mismatch.unwrap_err().message, "Passwords do not match");

        let short = users.update_password(id, "torches", "abc", "abc");
        assert_eq!(
            short.unwrap_err().message,
            "Password must be at least 6 characters"
        );

        let wrong = users.update_password(id, "nope", "newpass", "newpass");
        assert_eq!(wrong.unwrap_err().http_status(), 401);

        users.update_password(id, "torches", "newpass", "newpass").unwrap();
        let doc = store.users.get(id).unwrap();
        assert!(doc.token_invalidated_at.is_some());

        assert!(users.login_user("jeff", "newpass").is_ok());
        assert!(users.login_user("jeff", "torches").is_err());
    }

    #[test]
    fn test_password_reset_flow() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        let unknown = users.request_password_reset("nobody@example.com");
        assert_eq!(unknown.unwrap_err().http_status(), 404);

        users.request_password_reset("jeff@example.com").unwrap();
        let token = store.users.get(id).unwrap().reset_token.unwrap();

        let bad_token = users.complete_password_reset("bogus", "fresh-pass", "fresh-pass");
        assert_eq!(bad_token.unwrap_err().http_status(), 404);

        users
            .complete_password_reset(&token, "fresh-pass", "fresh-pass")
            .unwrap();

        let doc = store.users.get(id).unwrap();
        assert!(doc.reset_token.is_none());
        assert!(doc.reset_token_expires_at.is_none());
        assert!(doc.token_invalidated_at.is_some());
        assert!(users.login_user("jeff", "fresh-pass").is_ok());

        // The token is single-use
        let reuse = users.complete_password_reset(&token, "again", "again");
        assert_eq!(reuse.unwrap_err().http_status(), 404);
    }

    #[test]
    fn test_expired_reset_token() {
        let (store, users) = service();
        let id = signup(&users, &store, "jeff");

        users.request_password_reset("jeff@example.com").unwrap();
        let token = store.users.get(id).unwrap().reset_token.unwrap();
        store
            .users
            .update(id, |u| {
                u.reset_token_expires_at =
                    Some(OffsetDateTime::now_utc() - Duration::minutes(1))
            })
            .unwrap();

        let expired = users.complete_password_reset(&token, "fresh-pass", "fresh-pass");
        assert_eq!(expired.unwrap_err().message, "Reset token has expired");
    }

    #[test]
    fn test_default_pool_lifecycle() {
        let (store, users) = service();
        let alice = signup(&users, &store, "alice");
        let bob = signup(&users, &store, "bob");

        let pools = PoolService::new(store.clone());
        let season_id = ObjectId::new().unwrap();
        store
            .seasons
            .insert(outlast_store::schema::SeasonDoc {
                id: season_id,
                season_name: "S".into(),
                season_number: Some(1),
                contestants: Vec::new(),
                eliminations: Vec::new(),
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        let pool = pools.create_pool(alice, "Pool", season_id, 1, &[]).unwrap();

        // create_pool set it; clearing works
        assert_eq!(store.users.get(alice).unwrap().default_pool, Some(pool.id));
        let cleared = users.update_default_pool(alice, None).unwrap();
        assert_eq!(cleared.default_pool, None);

        // Setting it back requires membership
        let set = users.update_default_pool(alice, Some(pool.id)).unwrap();
        assert_eq!(set.default_pool, Some(pool.id));

        let outsider = users.update_default_pool(bob, Some(pool.id));
        assert_eq!(outsider.unwrap_err().http_status(), 403);

        let ghost = users.update_default_pool(alice, Some(ObjectId::new().unwrap()));
        assert_eq!(ghost.unwrap_err().http_status(), 404);
    }

    #[test]
    fn test_created_pool_round_trips_through_listing() {
        let (store, users) = service();
        let alice = signup(&users, &store, "alice");
        let bob = signup(&users, &store, "bob");

        let pools = PoolService::new(store.clone());
        let season_id = ObjectId::new().unwrap();
        store
            .seasons
            .insert(outlast_store::schema::SeasonDoc {
                id: season_id,
                season_name: "S".into(),
                season_number: Some(1),
                contestants: Vec::new(),
                eliminations: Vec::new(),
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        let pool = pools
            .create_pool(alice, "Round Trip", season_id, 1, &[bob])
            .unwrap();

        let listed = users.list_user_pools(alice).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, pool.id);
        assert_eq!(listed[0].name, "Round Trip");

        // Bob is merely invited and has not played yet
        assert!(users.list_user_pools(bob).unwrap().is_empty());
    }

    #[test]
    fn test_delete_user_cascades_owned_pools() {
        let (store, users) = service();
        let alice = signup(&users, &store, "alice");

        let pools = PoolService::new(store.clone());
        let season_id = ObjectId::new().unwrap();
        store
            .seasons
            .insert(outlast_store::schema::SeasonDoc {
                id: season_id,
                season_name: "S".into(),
                season_number: Some(1),
                contestants: vec![outlast_store::schema::Contestant {
                    id: "c1".into(),
                    name: "C1".into(),
                    age: None,
                    occupation: None,
                    hometown: None,
                }],
                eliminations: Vec::new(),
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        let pool = pools.create_pool(alice, "Mine", season_id, 1, &[]).unwrap();
        pools.create_pick(pool.id, alice, "c1").unwrap();

        users.delete_user(alice).unwrap();

        assert!(store.users.get(alice).is_none());
        assert!(store.pools.get(pool.id).is_none());
        assert_eq!(store.memberships.count(|m| m.user_id == alice), 0);
        assert_eq!(store.picks.count(|p| p.user_id == alice), 0);
    }

    #[test]
    fn test_search_ranking() {
        let (store, users) = service();
        signup(&users, &store, "ana");
        signup(&users, &store, "anabel");
        signup(&users, &store, "briana");
        signup(&users, &store, "chris");

        // Too short
        assert!(users.search_active_users(" a ", None, 10).unwrap().is_empty());

        let hits = users.search_active_users("ana", None, 10).unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.username.as_str()).collect();
        // Exact, then prefix, then substring
        assert_eq!(names, vec!["ana", "anabel", "briana"]);

        // Limit is honored
        let capped = users.search_active_users("ana", None, 1).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].username, "ana");
    }

    #[test]
    fn test_search_excludes_pool_members() {
        let (store, users) = service();
        let alice = signup(&users, &store, "alice");
        let bob = signup(&users, &store, "bobby");
        let carol = signup(&users, &store, "bobcat");
        signup(&users, &store, "bobsled");

        let pools = PoolService::new(store.clone());
        let season_id = ObjectId::new().unwrap();
        store
            .seasons
            .insert(outlast_store::schema::SeasonDoc {
                id: season_id,
                season_name: "S".into(),
                season_number: Some(1),
                contestants: Vec::new(),
                eliminations: Vec::new(),
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        let pool = pools
            .create_pool(alice, "Pool", season_id, 1, &[bob, carol])
            .unwrap();
        pools.respond_to_invite(pool.id, carol, "decline").unwrap();

        let hits = users
            .search_active_users("bob", Some(pool.id), 10)
            .unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.username.as_str()).collect();

        // Invited bobby is excluded; declined bobcat reappears, annotated
        assert_eq!(names, vec!["bobcat", "bobsled"]);
        let bobcat = &hits[0];
        assert_eq!(bobcat.membership_status, Some(MembershipStatus::Declined));
        assert_eq!(hits[1].membership_status, None);
    }
}
