use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

pub const SESSION_COOKIE: &str = "eventfan_session";
const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Admin email the token was issued for.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies admin session tokens. Constructed once at startup
/// from the configured signing secret and admin identity; the gate never
/// reads environment state itself.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    admin_email: String,
    admin_password: String,
}

impl SessionKeys {
    pub fn new(secret: &str, admin_email: String, admin_password: String) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            admin_email,
            admin_password,
        }
    }

    /// Checks the submitted login against the configured admin identity.
    /// Password comparison is constant-time; the caller gets the same
    /// answer shape for a wrong email and a wrong password.
    pub fn check_login(&self, email: &str, password: &str) -> bool {
        let email_ok = email == self.admin_email;
        let password_ok: bool = password
            .as_bytes()
            .ct_eq(self.admin_password.as_bytes())
            .into();
        email_ok && password_ok
    }

    /// Issues a signed session token valid for 24 hours.
    pub fn issue(&self) -> anyhow::Result<String> {
        self.issue_expiring_at(Utc::now() + Duration::hours(SESSION_TTL_HOURS))
    }

    fn issue_expiring_at(&self, exp: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: self.admin_email.clone(),
            iat: Utc::now().timestamp(),
            exp: exp.timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verifies a presented token. Absent, malformed, tampered, and
    /// expired tokens all come back as `None`; this never errors outward.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
            .filter(|claims| claims.sub == self.admin_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(
            "a-test-signing-secret-of-sufficient-length",
            "admin@example.com".to_string(),
            "hunter2hunter2".to_string(),
        )
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let token = keys.issue().unwrap();
        let claims = keys.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = keys();
        let mut token = keys.issue().unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = SessionKeys::new(
            "a-different-signing-secret-entirely!!",
            "admin@example.com".to_string(),
            "hunter2hunter2".to_string(),
        );
        let token = other.issue().unwrap();
        assert!(keys().verify(&token).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let token = keys
            .issue_expiring_at(Utc::now() - Duration::hours(1))
            .unwrap();
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(keys().verify("not-a-jwt").is_none());
        assert!(keys().verify("").is_none());
    }

    #[test]
    fn login_check_requires_both_fields_to_match() {
        let keys = keys();
        assert!(keys.check_login("admin@example.com", "hunter2hunter2"));
        assert!(!keys.check_login("admin@example.com", "wrong"));
        assert!(!keys.check_login("other@example.com", "hunter2hunter2"));
    }
}
