// Library root: the orchestrator and terminal front-end, exposed so
// integration tests can drive the event loop directly.

pub mod app;
pub mod protocol;
pub mod tui;
