pub mod d410_resource_waste;

pub use d410_resource_waste::ui::ResourceWasteDashboard;
