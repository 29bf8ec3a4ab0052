mod query;
mod service;

#[cfg(test)]
mod service_test;

pub use query::*;
pub use service::*;
