//! HS256 JWT session tokens

use gemm_domain::{
    Identity, LoginData, SessionClaims, TOKEN_ISSUER, TOKEN_TTL_SECS, TokenError, TokenService,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Issues and verifies session tokens signed with a shared secret
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl JwtTokenService {
    /// Service using the default issuer and a one hour lifetime
    pub fn new(secret: &SecretString) -> Self {
        Self::with_settings(secret, TOKEN_ISSUER, TOKEN_TTL_SECS)
    }

    pub fn with_settings(secret: &SecretString, issuer: &str, ttl_secs: i64) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            issuer: issuer.to_string(),
            ttl_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // The window is checked against the injected clock in `verify`
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, TokenError> {
        let iat = now.unix_timestamp();
        let login_time = identity
            .login_time
            .format(&Rfc3339)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        let claims = SessionClaims {
            iss: self.issuer.clone(),
            sub: identity.username.clone(),
            iat,
            exp: iat + self.ttl_secs,
            data: LoginData { login_time },
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, TokenError> {
        let claims = decode::<SessionClaims>(token, &self.decoding, &self.validation())
            .map_err(|e| TokenError::Invalid(e.to_string()))?
            .claims;

        let at = now.unix_timestamp();
        if at < claims.iat {
            return Err(TokenError::NotYetValid);
        }
        if at >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    fn service(secret: &str) -> JwtTokenService {
        JwtTokenService::new(&SecretString::new(secret.into()))
    }

    fn identity() -> Identity {
        Identity {
            username: "fred".to_string(),
            profile_name: "Fred".to_string(),
            country: "Singapore".to_string(),
            login_time: NOW,
        }
    }

    #[test]
    fn test_issued_claims() {
        let tokens = service("s3cret");
        let token = tokens.issue(&identity(), NOW).unwrap();
        let claims = tokens.verify(&token, NOW).unwrap();

        assert_eq!(claims.iss, "gemm");
        assert_eq!(claims.sub, "fred");
        assert_eq!(claims.iat, NOW.unix_timestamp());
        assert_eq!(claims.exp, claims.iat + 3600);
        assert_eq!(claims.data.login_time, "2024-01-15T12:00:00Z");
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service("s3cret");
        let token = tokens.issue(&identity(), NOW).unwrap();

        assert!(tokens.verify(&token, NOW + Duration::seconds(3599)).is_ok());
        assert!(matches!(
            tokens.verify(&token, NOW + Duration::seconds(3600)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_token_from_the_future_is_rejected() {
        let tokens = service("s3cret");
        let token = tokens.issue(&identity(), NOW).unwrap();

        assert!(matches!(
            tokens.verify(&token, NOW - Duration::seconds(1)),
            Err(TokenError::NotYetValid)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service("s3cret").issue(&identity(), NOW).unwrap();

        assert!(matches!(
            service("other").verify(&token, NOW),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let tokens = service("s3cret");
        let token = tokens.issue(&identity(), NOW).unwrap();
        let forged = service("s3cret")
            .issue(
                &Identity {
                    username: "wilma".to_string(),
                    ..identity()
                },
                NOW,
            )
            .unwrap();

        // Header and signature of one token, payload of another
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            tokens.verify(&spliced, NOW),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_is_invalid() {
        let secret = SecretString::new("s3cret".into());
        let token = JwtTokenService::with_settings(&secret, "someone-else", 3600)
            .issue(&identity(), NOW)
            .unwrap();

        assert!(matches!(
            JwtTokenService::new(&secret).verify(&token, NOW),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            service("s3cret").verify("not.a.token", NOW),
            Err(TokenError::Invalid(_))
        ));
    }
}
