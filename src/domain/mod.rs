// Threshold conditions and comparison operators
pub mod condition;

// Domain-specific error types
pub mod errors;

// Raw player, season and game documents
pub mod game;

// Feature naming shared by the pipeline and its consumers
pub mod ml;

// Request and result contracts
pub mod prediction;

// Repository traits
pub mod repositories;
