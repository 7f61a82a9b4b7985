//! Application layer - Generic services that use ports.

// Queue consumer launching one job per uploaded object
pub mod dispatcher;

// Single-shot download / encode / upload pipeline
pub mod worker;
