pub mod bookmarks;
pub mod comments;
pub mod feed;
pub mod notifications;
pub mod posts;
pub mod tags;
pub mod votes;

pub use bookmarks::*;
pub use comments::*;
pub use feed::*;
pub use notifications::*;
pub use posts::*;
pub use tags::*;
pub use votes::*;
