pub mod cell;
pub mod cell_compare;
pub mod csv_loader;
pub mod json_loader;
pub mod rows;
