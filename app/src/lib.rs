//! # Asset Bridge App
//!
//! Outer surfaces of the asset bridge.
//!
//! ## Overview
//!
//! - [`ffi`] - C ABI for native engines: entry point table and payload release
//! - [`ConsolePicker`] / [`ConsoleEngine`] - Console collaborators for the CLI
//! - [`commands`] - The `materialize` and `import` subcommands
//!
//! ## Example
//!
//! ```ignore
//! let engine = unsafe { FfiEngine::new(entry_points) };
//! let bridge = Bridge::start(&config, &bundle, &storage, files_dir, picker, engine);
//! ```

mod args;
pub mod commands;
pub mod ffi;
mod host;

pub use args::{BridgeDirs, Cli, CliPolicy, CliPurpose, Command};
pub use commands::AppError;
pub use ffi::{FfiEngine, NativeEntryPoints, assetbridge_release_payload};
pub use host::{ConsoleEngine, ConsolePicker, Delivery, Presentation};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
