mod exports;
pub use exports::*;

pub mod error;
pub mod types;
pub mod volume;
pub mod ray;
pub mod siddon;
pub mod projection;
pub mod interpolator;
pub mod detector;
pub mod config;
pub mod io;
pub mod utils;
