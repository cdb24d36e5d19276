pub mod config;
pub mod export;
pub mod load;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod step;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
