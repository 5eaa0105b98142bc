pub mod connection;
pub mod figure;
pub mod frame;
pub mod params;
