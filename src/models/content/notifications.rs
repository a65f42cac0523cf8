use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rocket::async_trait;

use crate::{
    database::{
        db::establish_connection,
        schema::notifications::dsl::{self as notification_dsl},
    },
    meltdown::*,
    middleware::{Owned, OwnedResource},
    structs::*,
};

impl Notifications {
    pub async fn find(id: i32) -> Result<Option<Notifications>, MeltDown> {
        let mut conn = establish_connection().await?;

        notification_dsl::notifications
            .filter(notification_dsl::id.eq(id))
            .select(Notifications::as_select())
            .first::<Notifications>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_notification").with_context("id", id.to_string()))
    }

    /// Newest first.
    pub async fn for_recipient(recipient_id: i32) -> Result<Vec<Notifications>, MeltDown> {
        let mut conn = establish_connection().await?;

        notification_dsl::notifications
            .filter(notification_dsl::recipient_id.eq(recipient_id))
            .order(notification_dsl::id.desc())
            .select(Notifications::as_select())
            .load::<Notifications>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "notifications_for_recipient").with_context("recipient_id", recipient_id.to_string()))
    }

    pub async fn mark_read(id: i32) -> Result<Notifications, MeltDown> {
        let mut conn = establish_connection().await?;

        diesel::update(notification_dsl::notifications.filter(notification_dsl::id.eq(id)))
            .set(notification_dsl::read.eq(true))
            .returning(Notifications::as_returning())
            .get_result::<Notifications>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "mark_notification_read").with_context("id", id.to_string()))?
            .ok_or_else(|| MeltDown::record_not_found("Notification").with_context("id", id.to_string()))
    }

    pub async fn delete_by_id(id: i32) -> Result<(), MeltDown> {
        let mut conn = establish_connection().await?;

        let deleted = diesel::delete(notification_dsl::notifications.filter(notification_dsl::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "delete_notification").with_context("id", id.to_string()))?;

        match deleted {
            0 => Err(MeltDown::record_not_found("Notification").with_context("id", id.to_string())),
            _ => Ok(()),
        }
    }
}

impl Owned for Notifications {
    const NAME: &'static str = "Notification";

    fn owner_id(&self) -> i32 {
        self.recipient_id
    }
}

#[async_trait]
impl OwnedResource for Notifications {
    async fn find(id: i32) -> Result<Option<Self>, MeltDown> {
        Notifications::find(id).await
    }
}
