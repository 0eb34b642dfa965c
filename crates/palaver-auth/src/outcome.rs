//! Authentication outcomes as data.

use palaver_core::entities::Member;

/// Why a sign-in attempt was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The name/password pair did not check out.
    InvalidCredentials,
    /// The account is locked out.
    Locked,
}

/// A denied sign-in attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub reason: DenyReason,
    /// User-facing message for the sign-in form.
    pub message: String,
    /// Failures left before lockout, when the policy is tracking them.
    pub attempts_remaining: Option<u32>,
    /// Lockout expiry as epoch seconds, when the expiry policy is enabled.
    pub expires: Option<i64>,
    /// The denied account, for rendering; `None` when the name matched no
    /// member.
    pub member: Option<Member>,
}

impl Denial {
    pub(crate) fn invalid_credentials(
        member: Option<Member>,
        attempts_remaining: Option<u32>,
    ) -> Self {
        let message = match attempts_remaining {
            Some(n) => format!("Invalid name or password. {n} attempts remaining."),
            None => "Invalid name or password.".to_string(),
        };
        Self {
            reason: DenyReason::InvalidCredentials,
            message,
            attempts_remaining,
            expires: None,
            member,
        }
    }

    pub(crate) fn locked(member: Member, expires: Option<i64>) -> Self {
        let message = match expires {
            Some(_) => "Account temporarily locked. Try again later.".to_string(),
            None => "Account locked. Contact an administrator.".to_string(),
        };
        Self {
            reason: DenyReason::Locked,
            message,
            attempts_remaining: Some(0),
            expires,
            member: Some(member),
        }
    }
}

/// The result of a credential check.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials check out; proceed to session completion.
    Granted {
        member: Member,
    },
    Denied(Denial),
}

impl AuthOutcome {
    /// Whether the attempt was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The denial, if the attempt was denied.
    #[must_use]
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Denied(denial) => Some(denial),
            Self::Granted { .. } => None,
        }
    }
}
