pub mod auth;
pub mod content;

pub use auth::*;
pub use content::*;
