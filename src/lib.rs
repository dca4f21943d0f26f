pub mod access;
pub mod storage;
pub mod fixtures;
pub mod guard;
pub mod render;
pub mod demos;
pub mod config;
pub mod error;
pub mod shell;
