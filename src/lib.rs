// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod metrics;

// Domain layer (business logic)
pub mod context;
pub mod records;
pub mod retention;
pub mod template;

// Application layer
pub mod api;
pub mod server;
