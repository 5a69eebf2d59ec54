pub mod api;
pub mod cluster;
pub mod config;
pub mod subscription;
pub mod validate;
