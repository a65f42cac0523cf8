pub mod builders;
pub mod default;

pub use builders::*;
pub use default::*;
