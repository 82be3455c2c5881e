mod context;
mod dashboard;
mod execution_picker;
mod filter_bar;
mod report_toolbar;
mod resource_table;
mod resources_chart;
mod resources_list;
mod statistics_bar;

pub use context::{use_dashboard, DashboardContext};
pub use dashboard::ResourceWasteDashboard;
