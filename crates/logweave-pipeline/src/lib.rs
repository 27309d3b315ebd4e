//! Operator pipeline assembly for logweave.
//!
//! Turns an ordered list of operator build specifications into a wired
//! sequence of runtime operators:
//! build every specification -> default-route each operator to its successor
//! -> point plugin references at the plugin's entry operator -> validate.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod directed;
pub mod errors;
pub mod operator;
pub mod operators;
pub mod plugin;
pub mod registry;
pub mod routing;

pub use config::*;
pub use context::*;
pub use diagnostics::*;
pub use directed::*;
pub use errors::*;
pub use operator::*;
pub use plugin::*;
pub use registry::*;
pub use routing::*;
