//! # Codeflare Core
//!
//! Command registration and routing for the `codeflare` CLI.
//!
//! Feature modules register path templates such as
//! `"codeflare chart <metric> <paths...>"` together with a flag schema, a
//! handler and one line of help. The [`Dispatcher`] resolves each invocation
//! to exactly one entry by specificity, binds captures and typed flags, and
//! invokes the handler once. The help aggregator synthesizes usage text
//! from whatever is registered.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//! - No `todo!()` / `unimplemented!()` - complete implementations only
//!
//! ## Error Handling
//!
//! Registration, dispatch and configuration each have their own error type
//! and all of them convert into [`Error`]. Handler failures are not wrapped:
//! [`Dispatcher::dispatch`] returns `Result<HandlerResult, DispatchError>`
//! and the inner [`HandlerResult`] is exactly what the handler returned.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod args;
pub mod config;
pub mod dispatch;
mod error;
pub mod flags;
pub mod handler;
pub mod help;
pub mod invocation;
pub mod pattern;
pub mod registrar;
pub mod registry;

pub use args::{BoundArguments, Value};
pub use config::{load_config, Config, SuggestionConfig};
pub use dispatch::{DispatchStage, Dispatcher, Resolved};
pub use error::{
    ConfigError, ConflictError, DispatchError, Error, FlagSchemaError, PatternSyntaxError,
    RegistrationError, Result,
};
pub use flags::{define_flags, FlagArity, FlagSchema, FlagSpec, ValueType};
pub use handler::{
    handler_fn, ChartDescriptor, CommandContext, CommandOutput, Handler, HandlerResult, Table,
};
pub use help::{help_for, suggest};
pub use invocation::Invocation;
pub use pattern::{compile, Arity, CommandPattern, Segment};
pub use registrar::{install_modules, FeatureModule, ModuleFailure, Registrar, StartupReport};
pub use registry::{RegistrationId, Registry, RegistryEntry};
