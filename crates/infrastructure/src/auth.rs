//! JWT 令牌签发与校验
//!
//! HS256 签名，载荷为 `{ sub, email, iat, exp }`，有效期一小时。

use application::{Identity, IssuedToken, TokenError, TokenService};
use config::JwtConfig;
use domain::{EmailAddress, Employer, EmployerId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const TOKEN_TTL: Duration = Duration::hours(1);

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self::with_ttl(config, TOKEN_TTL)
    }

    pub fn with_ttl(config: &JwtConfig, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 过期即拒绝，不留宽限
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, employer: &Employer) -> Result<IssuedToken, TokenError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: employer.id.into(),
            email: employer.email.as_str().to_owned(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Issue(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenError::Invalid(err.to_string()))?;

        let email = EmailAddress::parse("email", claims.email)
            .map_err(|err| TokenError::Invalid(err.to_string()))?;
        Ok(Identity {
            employer_id: EmployerId::from(claims.sub),
            email,
        })
    }
}
