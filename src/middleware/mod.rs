pub mod catchers;
pub mod compress;
pub mod enforcer;
pub mod guards;
pub mod jwt;
pub mod permission;
pub mod request_logger;

pub use catchers::*;
pub use compress::*;
pub use enforcer::*;
pub use guards::*;
pub use jwt::*;
pub use permission::*;
pub use request_logger::*;
