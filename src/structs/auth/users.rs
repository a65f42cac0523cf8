use crate::database::schema::users;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROLE_USER: i32 = 0;
pub const ROLE_ADMIN: i32 = 1;

#[derive(Queryable, Selectable, Debug, Identifiable, Serialize, Deserialize, Clone, Default)]
#[diesel(table_name = users)]
pub struct Users {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub updated_at: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
