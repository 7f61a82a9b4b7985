//! Adapters - Concrete implementations of ports.

#[cfg(any(feature = "dispatcher", feature = "worker"))]
pub mod aws;

pub mod ffmpeg;
