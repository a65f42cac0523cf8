use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    database::{
        db::establish_connection,
        schema::users::dsl::{self as user_dsl},
    },
    meltdown::*,
    structs::*,
};

impl Users {
    pub async fn find(id: i32) -> Result<Option<Users>, MeltDown> {
        let mut conn = establish_connection().await?;

        user_dsl::users
            .filter(user_dsl::id.eq(id))
            .select(Users::as_select())
            .first::<Users>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_user").with_context("id", id.to_string()))
    }

    pub async fn get_by_id(id: i32) -> Result<Users, MeltDown> {
        Self::find(id).await?.ok_or_else(|| MeltDown::record_not_found("User").with_context("id", id.to_string()))
    }

    pub async fn update_by_id(id: i32, request: UpdateUserRequest) -> Result<Users, MeltDown> {
        let changes = UpdateUser::try_from(request)?;
        let mut conn = establish_connection().await?;

        diesel::update(user_dsl::users.filter(user_dsl::id.eq(id)))
            .set(&changes)
            .returning(Users::as_returning())
            .get_result::<Users>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "update_user").with_context("id", id.to_string()))?
            .ok_or_else(|| MeltDown::record_not_found("User").with_context("id", id.to_string()))
    }
}

impl TryFrom<UpdateUserRequest> for UpdateUser {
    type Error = MeltDown;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        let username = request.username.map(|name| name.trim().to_string());
        if username.as_deref() == Some("") {
            return Err(MeltDown::validation_failed("username cannot be empty"));
        }

        let email = request.email.map(|email| email.trim().to_lowercase());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(MeltDown::validation_failed("email is not valid"));
            }
        }

        let password_hash = match request.password {
            Some(password) if password.is_empty() => return Err(MeltDown::validation_failed("password cannot be empty")),
            Some(password) => Some(hash(password, DEFAULT_COST)?),
            None => None,
        };

        Ok(UpdateUser {
            username,
            email,
            password_hash,
            updated_at: Utc::now().timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use bcrypt::verify;

    use super::*;

    #[test]
    fn password_is_stored_hashed() {
        let request = UpdateUserRequest {
            password: Some("hunter22".into()),
            ..Default::default()
        };

        let changes = UpdateUser::try_from(request).unwrap();
        let stored = changes.password_hash.unwrap();
        assert_ne!(stored, "hunter22");
        assert!(verify("hunter22", &stored).unwrap());
    }

    #[test]
    fn fields_are_trimmed() {
        let request = UpdateUserRequest {
            username: Some("  ana ".into()),
            email: Some(" Ana@Example.com".into()),
            password: None,
        };

        let changes = UpdateUser::try_from(request).unwrap();
        assert_eq!(changes.username.as_deref(), Some("ana"));
        assert_eq!(changes.email.as_deref(), Some("ana@example.com"));
        assert!(changes.password_hash.is_none());
    }

    #[test]
    fn blank_values_are_rejected() {
        let blank_name = UpdateUserRequest {
            username: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(UpdateUser::try_from(blank_name).unwrap_err().melt_type, MeltType::ValidationFailed);

        let bad_email = UpdateUserRequest {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(UpdateUser::try_from(bad_email).unwrap_err().status_code().code, 400);
    }

    #[test]
    fn serialized_user_has_no_password() {
        let user = Users {
            id: 1,
            username: "ana".into(),
            password_hash: "$2b$12$secret".into(),
            ..Default::default()
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(!value.to_string().contains("secret"));
    }
}
