//! Domain layer - Pure business logic.

// Queue message bodies
pub mod events;

// Job submissions built from notification records
pub mod jobs;

// Rendition ladder
pub mod profiles;
