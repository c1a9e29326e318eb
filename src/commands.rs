pub mod cache_clear;
pub mod packages;
pub mod sail;
