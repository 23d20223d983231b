//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::Config,
    constants::roles,
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
    utils::{generate_secure_token, hash_string, validation::validate_password},
};

const REFRESH_TOKEN_LENGTH: usize = 48;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Tokens handed out on login and refresh
#[derive(Debug)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Refresh tokens are stored hashed: `refresh_token:<sha256>` holds the user id
/// and `refresh_tokens:<user id>` collects the user's hashes for logout.
fn token_key(hash: &str) -> String {
    format!("refresh_token:{hash}")
}

fn user_tokens_key(user_id: &Uuid) -> String {
    format!("refresh_tokens:{user_id}")
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a new participant
    pub async fn register(
        pool: &PgPool,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        gdpr_consent: bool,
    ) -> AppResult<User> {
        if !gdpr_consent {
            return Err(AppError::InvalidField {
                field: "gdpr_consent".to_string(),
                message: "You must agree to the processing of personal data".to_string(),
            });
        }

        validate_password(password).map_err(|m| AppError::InvalidField {
            field: "password".to_string(),
            message: m.to_string(),
        })?;

        if UserRepository::find_by_email(pool, email).await?.is_some() {
            return Err(AppError::AlreadyExists("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(password)?;

        let user = UserRepository::create(
            pool,
            email,
            &password_hash,
            first_name,
            last_name,
            gdpr_consent,
            roles::PARTICIPANT,
        )
        .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with e-mail and password
    pub async fn login(
        pool: &PgPool,
        redis: ConnectionManager,
        config: &Config,
        email: &str,
        password: &str,
    ) -> AppResult<(User, IssuedTokens)> {
        let user = UserRepository::find_by_email(pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        UserRepository::update_last_login(pool, &user.id).await?;

        let tokens = Self::issue_tokens(redis, config, &user).await?;
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new token pair; the old one is consumed
    pub async fn refresh_token(
        pool: &PgPool,
        mut redis: ConnectionManager,
        config: &Config,
        refresh_token: &str,
    ) -> AppResult<IssuedTokens> {
        let hash = hash_string(refresh_token);
        let key = token_key(&hash);

        let stored: Option<String> = redis.get(&key).await?;
        let user_id = stored
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or(AppError::InvalidToken)?;

        redis.del::<_, ()>(&key).await?;
        redis.srem::<_, _, ()>(user_tokens_key(&user_id), &hash).await?;

        let user = UserRepository::find_by_id(pool, &user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Self::issue_tokens(redis, config, &user).await
    }

    /// Revoke one refresh token, or every token of the user
    pub async fn logout(
        mut redis: ConnectionManager,
        user_id: &Uuid,
        refresh_token: Option<&str>,
        all_sessions: bool,
    ) -> AppResult<()> {
        let set_key = user_tokens_key(user_id);

        if all_sessions {
            let hashes: Vec<String> = redis.smembers(&set_key).await?;
            for hash in &hashes {
                redis.del::<_, ()>(token_key(hash)).await?;
            }
            redis.del::<_, ()>(&set_key).await?;
        } else if let Some(token) = refresh_token {
            let hash = hash_string(token);
            redis.del::<_, ()>(token_key(&hash)).await?;
            redis.srem::<_, _, ()>(&set_key, &hash).await?;
        }

        Ok(())
    }

    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, user_id: &Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_id(pool, user_id).await
    }

    /// Verify JWT token and extract claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn issue_tokens(
        mut redis: ConnectionManager,
        config: &Config,
        user: &User,
    ) -> AppResult<IssuedTokens> {
        let (access_token, expires_in) = Self::generate_access_token(user, config)?;
        let refresh_token = generate_secure_token(REFRESH_TOKEN_LENGTH);

        let hash = hash_string(&refresh_token);
        let expiry = (config.jwt.refresh_token_expiry_days * 24 * 60 * 60) as u64;
        let set_key = user_tokens_key(&user.id);

        redis
            .set_ex::<_, _, ()>(token_key(&hash), user.id.to_string(), expiry)
            .await?;
        redis.sadd::<_, _, ()>(&set_key, &hash).await?;
        redis.expire::<_, ()>(&set_key, expiry as i64).await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// Hash password using Argon2
    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(hash)
    }

    /// Verify password against hash
    fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate access token
    fn generate_access_token(user: &User, config: &Config) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(config.jwt.expiry_hours);
        let expires_in = config.jwt.expiry_hours * 3600;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))?;

        Ok((token, expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = AuthService::hash_password("miodek123").unwrap();
        assert!(AuthService::verify_password("miodek123", &hash).unwrap());
        assert!(!AuthService::verify_password("miodek124", &hash).unwrap());
    }

    #[test]
    fn test_token_verification_uses_secret() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "judge@example.com".to_string(),
            role: roles::STAFF.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        let decoded = AuthService::verify_token(&token, "secret-a").unwrap();
        assert_eq!(decoded.email, "judge@example.com");
        assert!(AuthService::verify_token(&token, "secret-b").is_err());
    }

    #[test]
    fn test_refresh_keys_never_contain_raw_token() {
        let token = generate_secure_token(REFRESH_TOKEN_LENGTH);
        let key = token_key(&hash_string(&token));
        assert!(!key.contains(&token));
        assert!(key.starts_with("refresh_token:"));
    }
}
