//! Authentication and authorization.
//!
//! JWT bearer tokens carry the user's role and its resolved permission set.
//! `auth_middleware` validates the token once at the request boundary and
//! stores an [`AuthUser`] in the request extensions; permission-gated route
//! groups check against that typed set via [`AuthRouterExt`].

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::user::{self, Entity as UserEntity};

mod rbac;

pub use rbac::{consts, permission_matches, permissions_for_role, Role, ROLES};

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        permission_matches(&self.permissions, permission)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Authentication service unavailable")]
    ServiceUnavailable,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "AUTH_MISSING_TOKEN"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_CREDENTIALS"),
            Self::InsufficientPermissions => (StatusCode::FORBIDDEN, "AUTH_FORBIDDEN"),
            Self::ServiceUnavailable | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL_ERROR")
            }
        };

        let message = match &self {
            Self::Database(_) => "Authentication failed".to_string(),
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": { "code": code, "message": message }
        }));

        (status, body).into_response()
    }
}

/// Issues and validates JWT tokens, and checks login credentials against
/// the users table.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(jwt_secret: &str, expiration_secs: usize, db: Arc<DbPool>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
            db,
        }
    }

    pub fn generate_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            role: user.role.clone(),
            permissions: permissions_for_role(&user.role),
            iat: now,
            exp: now + self.expiration_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            debug!("Failed to encode token: {}", e);
            AuthError::ServiceUnavailable
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Verifies username/password against the users table.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let found = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;

        match found {
            Some(u) if u.password_hash == hash_password(password) => Ok(u),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// SHA-256 hex digest used for stored passwords.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Seeds the default admin and mechanic accounts when the users table is
/// empty (first boot of a fresh database).
pub async fn ensure_default_users(db: &DbPool) -> Result<(), sea_orm::DbErr> {
    let count = UserEntity::find().count(db).await?;
    if count > 0 {
        return Ok(());
    }

    let defaults = [
        ("admin", "admin123", "Workshop Administrator", "admin"),
        ("mechanic", "mechanic123", "Shop Mechanic", "mechanic"),
    ];

    for (username, password, name, role) in defaults {
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)),
            name: Set(name.to_string()),
            role: Set(role.to_string()),
            created_at: Set(Utc::now()),
        };
        model.insert(db).await?;
    }

    info!("Seeded default users (admin, mechanic)");
    Ok(())
}

/// Authentication middleware: validates the bearer token and stores the
/// authenticated user in request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => return AuthError::ServiceUnavailable.into_response(),
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return AuthError::MissingToken.into_response(),
    };

    match auth_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
                name: claims.name,
                role: claims.role,
                permissions: claims.permissions,
            });
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Maps an HTTP method to the permission it needs on a resource.
pub fn required_permission(resource: &str, method: &axum::http::Method) -> String {
    use axum::http::Method;
    let action = match *method {
        Method::GET | Method::HEAD => "read",
        Method::DELETE => "delete",
        _ => "write",
    };
    format!("{}:{}", resource, action)
}

/// Permission middleware: derives the required permission for a resource
/// from the request method and checks it against the authenticated user.
/// Admins pass unconditionally.
pub async fn permission_middleware(
    State(resource): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingToken)?;

    let required = required_permission(&resource, request.method());
    if user.has_role("admin") || user.has_permission(&required) {
        return Ok(next.run(request).await);
    }

    Err(AuthError::InsufficientPermissions)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_resource(self, resource: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_resource(self, resource: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            resource.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: String,
}

/// Login handler: verifies credentials and issues a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let user = auth_service
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    let token = auth_service.generate_token(&user)?;

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
        },
    }))
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new().route("/login", axum::routing::post(login_handler))
}
