pub mod camera;
pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pose;
pub mod render;
