pub mod api_utils;
pub mod config;
pub mod export;
pub mod filter_codec;
pub mod history;
pub mod schema_inference;
