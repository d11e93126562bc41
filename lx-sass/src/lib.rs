//! Sass and SCSS compilation for a site's static-asset build step.
//!
//! The compiling itself is all [`grass`]; this crate decides which options
//! to hand it (based on the site's config and whether we are building for
//! development or production), reads and writes the files, and generates
//! the little version stylesheet that lets styles reference the app version.

pub mod build;
pub mod config;
pub mod error;
pub mod options;
pub mod sass;
pub mod version;

pub use config::{Config, Mode};
pub use options::CompileOptions;
