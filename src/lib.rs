pub mod config;
pub mod db;
mod env;
pub mod gaps;
pub mod log;

pub use gaps::check_blocks_gaps;
