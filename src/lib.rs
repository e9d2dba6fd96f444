// src/lib.rs
pub mod client;
pub mod config;
pub mod engine;
pub mod gui;
pub mod scope;
pub mod stream;
pub mod types;
