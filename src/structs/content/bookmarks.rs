use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::database::schema::{bookmarks, post_views};

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = bookmarks)]
pub struct Bookmarks {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bookmarks)]
pub struct NewBookmarks {
    pub post_id: i32,
    pub user_id: i32,
    pub created_at: i64,
}

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Identifiable)]
#[diesel(table_name = post_views)]
pub struct PostViews {
    pub id: i32,
    pub post_id: i32,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = post_views)]
pub struct NewPostViews {
    pub post_id: i32,
    pub created_at: i64,
}
