// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod drill;
pub mod generator;
pub mod pulse;
pub mod runtime;
pub mod store;
pub mod ui;
