//! Contracts of the resource waste dashboard (d410).
//!
//! Everything here crosses a boundary: the resource feed, the URL/report
//! payloads, or the component props of the frontend.

pub mod filter;
pub mod report;
pub mod resource;
pub mod schema;
pub mod table_state;

pub use filter::{Filter, FilterKind};
pub use report::{SendReportRequest, SendReportResponse};
pub use resource::{Resource, ResourceStatus};
pub use schema::{ColumnDef, ColumnSchema, RenderKind};
pub use table_state::{SortDirection, TableViewState};
