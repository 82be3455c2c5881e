pub mod api;
pub mod history_sync;
pub mod projector;
pub mod report;
pub mod store;
pub mod ui;
