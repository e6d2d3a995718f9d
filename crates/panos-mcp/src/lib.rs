//! Command registry, dispatcher and stdio server for panos-mcp.
//!
//! Handler units are listed in [`handlers::UNITS`]. At startup
//! [`registry::discover`] runs each unit's `register` entry point in
//! isolation and returns the populated [`CommandRegistry`] with a
//! [`LoadSummary`]. The [`Dispatcher`] routes calls by name, injecting the
//! shared `ConnectionManager`, and turns every handler result, error or
//! panic into a marked [`Outcome`] text.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod registry;
pub mod server;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, RegistryError, ToolError};
pub use outcome::Outcome;
pub use registry::{Command, CommandRegistry, Context, HandlerUnit, LoadSummary, UnitState};
