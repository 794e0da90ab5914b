//! HTTP client for the jocker engine REST API

mod client;

pub use client::EngineClient;
