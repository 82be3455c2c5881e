pub mod d410_resource_waste;
