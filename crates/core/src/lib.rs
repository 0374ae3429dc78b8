//! Core types for the cxxdoc C++ documentation extractor
//!
//! This crate holds everything that does not depend on a C++ front end:
//!
//! - **Entities**: the classified declaration model
//! - **Comments**: documentation comment sections and their command syntax
//! - **Configuration**: comment syntax overrides and walk options
//! - **Diagnostics**: non-fatal problems found while classifying
//! - **Error handling**: unified error types
//!
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod comment;
pub mod config;
pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod scope;

// Re-export main types for convenience
pub use comment::{Comment, CommentParser, CommentSyntax, Section, SectionKind};
pub use config::{CommentConfig, Config, ParserConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use entities::{
    Access, Class, ClassType, Entity, EntityBuilder, EntityKind, EntityType, FunctionSignature,
    TypeRef, Virtuality,
};
pub use error::{Error, Result, ResultExt};
pub use scope::ScopeContext;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::comment::{Comment, CommentSyntax};
    pub use crate::config::Config;
    pub use crate::diagnostics::Diagnostics;
    pub use crate::entities::{Entity, EntityKind, EntityType};
    pub use crate::error::{Result, ResultExt};
}
