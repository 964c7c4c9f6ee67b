pub mod ballistics;
pub mod canvas;
pub mod chart;
pub mod driver;
pub mod lab;
pub mod render;
pub mod snapshot;
pub mod store;
pub mod window;
