//! The authentication service.
//!
//! Coordinates cache, database and cookies to keep sign-in state, device
//! tracking and failed-attempt lockout consistent. All reads go through the
//! cache mirror; every write goes to the database and refreshes the touched
//! table before the next step runs.

use std::sync::Arc;

use palaver_config::AuthSettings;
use palaver_core::entities::{LockoutRecord, Member};
use palaver_repo::{
    get_member_by_id, get_member_by_name, load_device_data_by_id, load_device_data_by_token,
    load_session_data_by_id,
};
use palaver_storage::{Backend, KeyedMutex, QueryRequest, SqlValue};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::boundary::{CookieJar, CookieOptions, SessionStore};
use crate::outcome::{AuthOutcome, Denial};
use crate::token::{new_bearer_token, new_device_id, verify_password};
use crate::{AuthError, AuthResult};

/// Session key holding the current bearer token.
pub const SESSION_TOKEN_KEY: &str = "authToken";

/// Device-identifier cookies outlive everything else on the device.
const DEVICE_COOKIE_DAYS: i64 = 3_650;

/// Terminal boundary effect of sign-in and sign-out: the HTTP layer issues
/// this redirect after the last state transition has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

/// Credential validation, lockout and session lifecycle.
pub struct AuthService {
    backend: Backend,
    settings: AuthSettings,
    locks: Arc<KeyedMutex>,
}

impl AuthService {
    /// Creates a service over the process's backend.
    #[must_use]
    pub fn new(backend: Backend, settings: AuthSettings) -> Self {
        Self {
            backend,
            settings,
            locks: Arc::new(KeyedMutex::new()),
        }
    }

    /// Checks a name/password pair, driving the lockout state machine.
    ///
    /// Expected failures come back as [`AuthOutcome::Denied`]. When the
    /// account is missing from the cache, lockout handling is skipped and
    /// the attempt is denied as plain invalid credentials.
    ///
    /// # Errors
    ///
    /// Returns an error only for storage or decode failures.
    pub async fn authenticate(&self, name: &str, password: &str) -> AuthResult<AuthOutcome> {
        let Some(member) = get_member_by_name(self.backend.cache.as_ref(), name)? else {
            debug!(name = %name, "sign-in attempt for unknown account");
            return Ok(AuthOutcome::Denied(Denial::invalid_credentials(None, None)));
        };

        // The whole read-modify-write on the lockout record runs under the
        // member's lock; re-read after acquiring it.
        let _guard = self.locks.lock(member.id).await;
        let Some(member) = get_member_by_id(self.backend.cache.as_ref(), member.id)? else {
            return Ok(AuthOutcome::Denied(Denial::invalid_credentials(None, None)));
        };

        let policy = &self.settings.lockout;
        if !policy.enabled {
            return Ok(self.check_credentials_only(&member, password));
        }

        let now = OffsetDateTime::now_utc();
        let lockout = member.lockout.clone().unwrap_or_default();

        if lockout.locked && !lockout.expired(now) {
            debug!(member_id = member.id, "sign-in attempt while locked");
            let expires = lockout.expires;
            return Ok(AuthOutcome::Denied(Denial::locked(member, expires)));
        }

        if !verify_password(password, member.password_hash.as_deref()) {
            return self.register_failure(&member, lockout, now).await;
        }

        // Successful check: an expired temporary lockout unlocks here, and
        // any accumulated attempts reset to zero.
        if lockout.locked || lockout.attempts > 0 {
            self.persist_lockout(member.id, &LockoutRecord::default())
                .await?;
        }
        let member = get_member_by_id(self.backend.cache.as_ref(), member.id)?
            .unwrap_or(member);
        info!(member_id = member.id, "credentials accepted");
        Ok(AuthOutcome::Granted { member })
    }

    /// Credential check with the lockout state machine bypassed.
    fn check_credentials_only(&self, member: &Member, password: &str) -> AuthOutcome {
        if verify_password(password, member.password_hash.as_deref()) {
            AuthOutcome::Granted {
                member: member.clone(),
            }
        } else {
            AuthOutcome::Denied(Denial::invalid_credentials(Some(member.clone()), None))
        }
    }

    async fn register_failure(
        &self,
        member: &Member,
        mut lockout: LockoutRecord,
        now: OffsetDateTime,
    ) -> AuthResult<AuthOutcome> {
        let policy = &self.settings.lockout;
        lockout.attempts += 1;

        if lockout.attempts >= policy.max_attempts {
            lockout.locked = true;
            lockout.expires = policy
                .expiration_minutes
                .map(|minutes| now.unix_timestamp() + (minutes as i64) * 60);
            self.persist_lockout(member.id, &lockout).await?;
            warn!(
                member_id = member.id,
                attempts = lockout.attempts,
                "account locked after repeated failures"
            );
            return Ok(AuthOutcome::Denied(Denial::locked(
                member.clone(),
                lockout.expires,
            )));
        }

        self.persist_lockout(member.id, &lockout).await?;
        let remaining = policy.max_attempts - lockout.attempts;
        debug!(
            member_id = member.id,
            attempts = lockout.attempts,
            remaining,
            "failed sign-in attempt"
        );
        Ok(AuthOutcome::Denied(Denial::invalid_credentials(
            Some(member.clone()),
            Some(remaining),
        )))
    }

    async fn persist_lockout(&self, member_id: i64, record: &LockoutRecord) -> AuthResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| palaver_core::DomainError::decode(format!("lockout: {e}")))?;
        self.backend
            .write_then_refresh(
                QueryRequest::new("UPDATE members SET lockout = $1 WHERE id = $2")
                    .bind(SqlValue::Json(json))
                    .bind(member_id),
                "members",
            )
            .await?;
        Ok(())
    }

    /// Completes sign-in for a validated member.
    ///
    /// Resolves or creates the device record keyed by the device-id cookie,
    /// rotates the bearer token, sets the auth-token cookie, associates the
    /// session row with the member and refreshes every touched table. The
    /// returned redirect is the terminal boundary effect; the HTTP layer must
    /// apply it last.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or decode failures; every completed write
    /// has already refreshed its table when the error surfaces.
    pub async fn complete_sign_in(
        &self,
        member: &Member,
        remember_me: bool,
        user_agent: Option<&str>,
        cookies: &mut dyn CookieJar,
        session: &mut dyn SessionStore,
        redirect_to: &str,
    ) -> AuthResult<Redirect> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let device_id = match cookies.get(&self.settings.cookies.device_name) {
            Some(id) => id,
            None => {
                let id = new_device_id();
                cookies.set(
                    &self.settings.cookies.device_name,
                    &id,
                    &self.cookie_options(Some(Duration::days(DEVICE_COOKIE_DAYS))),
                );
                id
            }
        };

        let token = new_bearer_token();
        let existing = load_device_data_by_id(self.backend.cache.as_ref(), &device_id);
        let request = if existing.is_some() {
            QueryRequest::new(
                "UPDATE member_devices SET memberId = $1, token = $2, userAgent = $3, lastUsedAt = $4 WHERE id = $5",
            )
            .bind(member.id)
            .bind(token.as_str())
            .bind(SqlValue::from(user_agent.map(str::to_string)))
            .bind(now)
            .bind(device_id.as_str())
        } else {
            QueryRequest::new(
                "INSERT INTO member_devices (id, memberId, token, userAgent, lastUsedAt) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(device_id.as_str())
            .bind(member.id)
            .bind(token.as_str())
            .bind(SqlValue::from(user_agent.map(str::to_string)))
            .bind(now)
        };
        self.backend
            .write_then_refresh(request, "member_devices")
            .await?;

        self.backend
            .write_then_refresh(
                QueryRequest::new("UPDATE members SET lastOnline = $1 WHERE id = $2")
                    .bind(now)
                    .bind(member.id),
                "members",
            )
            .await?;

        let session_id = session.id().to_string();
        let request =
            if load_session_data_by_id(self.backend.cache.as_ref(), &session_id).is_some() {
                QueryRequest::new("UPDATE sessions SET memberId = $1 WHERE id = $2")
                    .bind(member.id)
                    .bind(session_id.as_str())
            } else {
                QueryRequest::new("INSERT INTO sessions (id, memberId) VALUES ($1, $2)")
                    .bind(session_id.as_str())
                    .bind(member.id)
            };
        self.backend.write_then_refresh(request, "sessions").await?;

        let max_age = if remember_me {
            Duration::seconds(self.settings.sessions.remember_me_secs)
        } else {
            Duration::seconds(self.settings.sessions.duration_secs)
        };
        cookies.set(
            &self.settings.cookies.auth_name,
            &token,
            &self.cookie_options(Some(max_age)),
        );
        session.set(SESSION_TOKEN_KEY, &token);

        info!(member_id = member.id, remember_me, "sign-in completed");
        Ok(Redirect {
            location: redirect_to.to_string(),
        })
    }

    /// Tears down sign-in state for the current session.
    ///
    /// Revokes the device's bearer token when an auth-token cookie is
    /// present, touches the member's last-online timestamp, deletes the
    /// session row, destroys the underlying session and clears cookies.
    ///
    /// # Errors
    ///
    /// Returns an error for storage failures, and `SessionDestroy` if the
    /// underlying session cannot be destroyed.
    pub async fn sign_out(
        &self,
        cookies: &mut dyn CookieJar,
        session: &mut dyn SessionStore,
        referer: &str,
    ) -> AuthResult<Redirect> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let mut member_id: Option<i64> = None;

        if let Some(token) = cookies.get(&self.settings.cookies.auth_name) {
            if let Some(device) = load_device_data_by_token(self.backend.cache.as_ref(), &token) {
                let device_id = device.get_str("id")?.to_string();
                member_id = device.get_opt_i64("memberId")?;
                self.backend
                    .write_then_refresh(
                        QueryRequest::new(
                            "UPDATE member_devices SET token = $1, lastUsedAt = $2 WHERE id = $3",
                        )
                        .bind(SqlValue::Null)
                        .bind(now)
                        .bind(device_id.as_str()),
                        "member_devices",
                    )
                    .await?;
            }
        }

        let session_id = session.id().to_string();
        if member_id.is_none() {
            member_id = load_session_data_by_id(self.backend.cache.as_ref(), &session_id)
                .map(|row| row.get_opt_i64("memberId"))
                .transpose()?
                .flatten();
        }

        if let Some(id) = member_id {
            self.backend
                .write_then_refresh(
                    QueryRequest::new("UPDATE members SET lastOnline = $1 WHERE id = $2")
                        .bind(now)
                        .bind(id),
                    "members",
                )
                .await?;
        }

        self.backend
            .write_then_refresh(
                QueryRequest::new("DELETE FROM sessions WHERE id = $1")
                    .bind(session_id.as_str()),
                "sessions",
            )
            .await?;

        session
            .destroy()
            .map_err(AuthError::session_destroy)?;
        cookies.delete(&self.settings.cookies.auth_name);

        info!(member_id = ?member_id, "sign-out completed");
        Ok(Redirect {
            location: referer.to_string(),
        })
    }

    fn cookie_options(&self, max_age: Option<Duration>) -> CookieOptions {
        CookieOptions {
            http_only: true,
            secure: self.settings.cookies.secure,
            path: self.settings.cookies.path.clone(),
            domain: self.settings.cookies.domain.clone(),
            max_age,
            same_site: cookie::SameSite::Lax,
        }
    }
}
