//! Phone OTP sign-in.
//!
//! Codes live in an in-memory session table; only their delivery goes
//! through the [`OtpProvider`] trait so deployments can plug in a real
//! SMS gateway while tests capture codes directly.

use crate::types::{AuthError, AuthResult};
use async_trait::async_trait;
use campusgig_config::OtpConfig;
use campusgig_database::ProfileRepository;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Delivers one-time codes to phones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn deliver(&self, phone: &str, code: &str) -> AuthResult<()>;
}

/// Development provider that only logs the code instead of sending it.
pub struct LocalOtpProvider;

#[async_trait]
impl OtpProvider for LocalOtpProvider {
    async fn deliver(&self, phone: &str, code: &str) -> AuthResult<()> {
        info!(phone = %phone, code = %code, "otp code (local delivery)");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct OtpSession {
    phone: String,
    code: String,
    expires_at: DateTime<Utc>,
    attempts_left: u32,
}

/// Receipt for a sent code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub session_id: String,
    pub expires_in_seconds: u64,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub phone: String,
    /// True when no profile is registered under this phone yet.
    pub is_new_user: bool,
}

/// Service running the send/verify OTP handshake
pub struct OtpService {
    provider: Arc<dyn OtpProvider>,
    profile_repository: ProfileRepository,
    config: OtpConfig,
    sessions: Mutex<HashMap<String, OtpSession>>,
    last_sent: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl OtpService {
    pub fn new(pool: SqlitePool, config: OtpConfig, provider: Arc<dyn OtpProvider>) -> Self {
        Self {
            provider,
            profile_repository: ProfileRepository::new(pool),
            config,
            sessions: Mutex::new(HashMap::new()),
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    fn generate_code() -> String {
        let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{code:06}")
    }

    /// Send a code to a phone and open a verification session.
    /// Re-sending to the same phone inside the resend interval is
    /// refused.
    pub async fn send_otp(&self, phone: &str) -> AuthResult<SendOutcome> {
        let phone = phone.trim();
        if phone.is_empty() || !phone.starts_with('+') {
            return Err(AuthError::InvalidPhone(
                "phone must be in E.164 form".to_string(),
            ));
        }

        let now = Utc::now();
        let resend_interval = Duration::seconds(self.config.resend_interval_seconds as i64);
        {
            let mut last_sent = self.last_sent.lock().unwrap_or_else(|e| e.into_inner());
            last_sent.retain(|_, sent| now.signed_duration_since(*sent) < resend_interval);
            if let Some(previous) = last_sent.get(phone) {
                let elapsed = now.signed_duration_since(*previous);
                if elapsed < resend_interval {
                    return Err(AuthError::ResendTooSoon {
                        retry_in_seconds: (self.config.resend_interval_seconds as i64
                            - elapsed.num_seconds())
                            .max(0) as u64,
                    });
                }
            }
        }

        let code = Self::generate_code();
        self.provider.deliver(phone, &code).await?;

        // Only a delivered code starts the resend clock; a failed
        // delivery must not lock the phone out.
        self.last_sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(phone.to_string(), now);

        let session_id = cuid2::cuid();
        let session = OtpSession {
            phone: phone.to_string(),
            code,
            expires_at: now + Duration::seconds(self.config.expiry_seconds as i64),
            attempts_left: self.config.max_attempts,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session_id.clone(), session);

        debug!(phone = %phone, session = %session_id, "otp session opened");
        Ok(SendOutcome {
            session_id,
            expires_in_seconds: self.config.expiry_seconds,
        })
    }

    /// Verify a code against its session. A correct code consumes the
    /// session; a wrong one burns an attempt, and the session dies after
    /// the last failed attempt or on expiry.
    pub async fn verify_otp(&self, session_id: &str, code: &str) -> AuthResult<VerifyOutcome> {
        let phone = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            let session = sessions
                .get_mut(session_id)
                .ok_or(AuthError::SessionNotFound)?;

            if session.expires_at <= Utc::now() {
                sessions.remove(session_id);
                return Err(AuthError::SessionExpired);
            }

            if session.code != code {
                session.attempts_left = session.attempts_left.saturating_sub(1);
                if session.attempts_left == 0 {
                    sessions.remove(session_id);
                    return Err(AuthError::TooManyAttempts);
                }
                return Err(AuthError::WrongCode {
                    attempts_left: session.attempts_left,
                });
            }

            let phone = session.phone.clone();
            sessions.remove(session_id);
            phone
        };

        let is_new_user = self
            .profile_repository
            .find_by_phone(&phone)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .is_none();

        info!(phone = %phone, is_new_user, "otp verified");
        Ok(VerifyOutcome { phone, is_new_user })
    }

    /// Drop every expired session and every stale resend timestamp.
    /// Both are also swept lazily on send, so this only matters for
    /// long-idle processes.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let resend_interval = Duration::seconds(self.config.resend_interval_seconds as i64);

        self.last_sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, sent| now.signed_duration_since(*sent) < resend_interval);

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    #[cfg(test)]
    fn resend_entries(&self) -> usize {
        self.last_sent.lock().unwrap().len()
    }
}
