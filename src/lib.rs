mod api;
mod broadcast;
mod catalog;
mod config;
mod constants;
mod errors;
mod model;
mod storage;

pub use api::*;
pub use broadcast::*;
pub use catalog::*;
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use model::*;
pub use storage::*;
