pub mod bookmarks;
pub mod comments;
pub mod feed;
pub mod notifications;
pub mod posts;
pub mod tags;
pub mod views;
pub mod votes;
