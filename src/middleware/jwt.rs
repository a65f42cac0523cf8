use std::env;

use jsonwebtoken::{decode, DecodingKey, Validation};
use rocket::{
    async_trait,
    request::{FromRequest, Outcome, Request},
};
use serde::{Deserialize, Serialize};

use crate::{bootstrap::settings, meltdown::*, middleware::reject, structs::{ROLE_ADMIN, ROLE_USER}};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default = "default_role")]
    pub role: i32,
}

fn default_role() -> i32 {
    ROLE_USER
}

/// The authenticated caller as carried by the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub role: i32,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Admins may touch anything, everyone else only what they own.
    pub fn can_modify(&self, owner_id: i32) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = MeltDown;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse::<i32>().map_err(|e| MeltDown::invalid_token(format!("Invalid user ID in JWT: {}", e)))?;
        Ok(AuthUser { id, role: claims.role })
    }
}

fn jwt_secret() -> Result<String, MeltDown> {
    env::var("JWT_SECRET").map_err(|e| MeltDown::new(MeltType::ConfigurationError, format!("JWT_SECRET environment variable not set: {}", e)))
}

fn bearer_token(request: &Request<'_>) -> Option<String> {
    if let Some(header) = request.headers().get_one("Authorization") {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    request.cookies().get("token").map(|cookie| cookie.value().to_string())
}

pub fn decode_token(token: &str) -> Result<AuthUser, MeltDown> {
    let secret = jwt_secret()?;

    let mut validation = Validation::default();
    validation.leeway = settings().jwt.token_leeway_secs;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)?;
    AuthUser::try_from(token_data.claims)
}

#[async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = MeltDown;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = match bearer_token(request) {
            Some(token) => token,
            None => return reject(request, MeltDown::missing_token()),
        };

        match decode_token(&token) {
            Ok(user) => Outcome::Success(user),
            Err(error) => reject(request, error),
        }
    }
}
