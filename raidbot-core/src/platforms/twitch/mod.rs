// File: src/platforms/twitch/mod.rs

pub mod client;
pub mod requests;
pub mod resolver;

pub use client::TwitchHelixClient;
pub use resolver::HelixMetadataResolver;
