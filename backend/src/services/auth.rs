//! Authentication service for user registration, login, and token management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{AuthResponse, AuthTokens, User, UserRole};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for creating a staff account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshInput {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// User info from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            role: UserRole::from_str(&row.role).unwrap_or_default(),
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, is_active, last_login_at, created_at, updated_at";

/// Decode and validate an access token
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Role a new account gets. The very first account is an admin; later
/// ones default to staff and need an admin caller for anything higher.
pub fn registration_role(
    has_users: bool,
    requested: Option<UserRole>,
    caller: Option<UserRole>,
) -> AppResult<UserRole> {
    if !has_users {
        return Ok(requested.unwrap_or(UserRole::Admin));
    }

    match requested.unwrap_or_default() {
        UserRole::Staff => Ok(UserRole::Staff),
        role if caller == Some(UserRole::Admin) => Ok(role),
        _ => Err(AppError::InsufficientPermissions),
    }
}

/// SHA-256 digest of a refresh token, as stored in the database
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Create an account and sign it in.
    ///
    /// The first account becomes an admin. After that, accounts above staff
    /// can only be created by an admin (`caller`).
    pub async fn register(&self, input: RegisterInput, caller: Option<UserRole>) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let has_users = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&self.db)
            .await?;
        let role = registration_role(has_users, input.role, caller)?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %row.id, role = role.as_str(), "User registered");

        let user = User::from(row);
        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthResponse { tokens, user })
    }

    /// Authenticate user with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !row.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let last_login_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING last_login_at",
        )
        .bind(row.id)
        .fetch_one(&self.db)
        .await?;

        let mut user = User::from(row);
        user.last_login_at = Some(last_login_at);

        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthResponse { tokens, user })
    }

    /// Exchange a refresh token for a new token pair. The presented token is
    /// revoked.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            RETURNING rt.user_id
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let user = User::from(row);
        let (tokens, new_refresh_hash) = self.generate_tokens(&user)?;
        self.store_refresh_token(&mut tx, user.id, &new_refresh_hash).await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Load the signed-in user
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(User::from(row))
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let (tokens, refresh_hash) = self.generate_tokens(user)?;
        let mut tx = self.db.begin().await?;
        self.store_refresh_token(&mut tx, user.id, &refresh_hash).await?;
        tx.commit().await?;
        Ok(tokens)
    }

    /// Generate access and refresh tokens; also returns the refresh token's
    /// storage hash
    fn generate_tokens(&self, user: &User) -> AppResult<(AuthTokens, String)> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let refresh_hash = hash_token(&refresh_token);

        Ok((
            AuthTokens::bearer(access_token, refresh_token, self.access_token_expiry),
            refresh_hash,
        ))
    }

    async fn store_refresh_token(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        token_hash: &str,
    ) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_and_opaque() {
        let a = hash_token("refresh-token");
        assert_eq!(a, hash_token("refresh-token"));
        assert_ne!(a, hash_token("refresh-token2"));
        assert!(!a.contains("refresh"));
        // 32 bytes, base64 without padding
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_access_token_round_trip() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Manager,
            exp: (Utc::now() + Duration::seconds(60)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let decoded = decode_access_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, UserRole::Manager);

        assert!(matches!(
            decode_access_token(&token, "other"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_access_token() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Staff,
            exp: (Utc::now() - Duration::seconds(3600)).timestamp(),
            iat: (Utc::now() - Duration::seconds(7200)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(
            decode_access_token(&token, "secret"),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: "Sam".to_string(),
            role: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_registration_roles() {
        // first account bootstraps the shop
        assert_eq!(registration_role(false, None, None).unwrap(), UserRole::Admin);
        assert_eq!(registration_role(true, None, None).unwrap(), UserRole::Staff);
        assert!(matches!(
            registration_role(true, Some(UserRole::Manager), Some(UserRole::Manager)),
            Err(AppError::InsufficientPermissions)
        ));
        assert_eq!(
            registration_role(true, Some(UserRole::Manager), Some(UserRole::Admin)).unwrap(),
            UserRole::Manager
        );
    }
}
