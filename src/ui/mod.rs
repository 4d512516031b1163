pub mod circular;
pub mod columns;
pub mod controller;
pub mod renderer;
pub mod selection;
pub mod sorter;
pub mod surface;
