// src/lib.rs

pub mod auth;
pub mod platforms;
pub mod services;

pub use raidbot_common::error::Error;
