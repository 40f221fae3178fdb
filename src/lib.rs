pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod manifest;
pub mod ncbi;
pub mod output;
pub mod store;
