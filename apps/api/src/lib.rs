pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod roast;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;
pub mod upload;

#[cfg(test)]
mod testing;
