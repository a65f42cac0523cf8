pub mod db;
pub mod schema;

pub use db::*;
