//! C++ declaration classification for cxxdoc
//!
//! Turns a front end's cursor tree into the entity model of
//! [`cxxdoc_core::entities`]: every declaration classified, its comment
//! parsed into sections, overloads given distinct unique names and virtual
//! members resolved against their base classes.
//!
//! ```no_run
//! use std::path::Path;
//! use cxxdoc_core::Config;
//! use cxxdoc_cpp::Session;
//!
//! # fn main() -> cxxdoc_core::Result<()> {
//! let mut session = Session::new(&Config::load(None)?)?;
//! let json = std::fs::read_to_string("widget.hpp.json")?;
//! session.parse_dump(Path::new("widget.hpp"), &json)?;
//! session.for_each_type(|ty| println!("{}", ty.unique_name));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod cursor;
mod handlers;
pub mod memory;
pub mod overloads;
pub mod registry;
pub mod session;
pub mod tokens;
mod virtuals;

pub use cursor::{Cursor, CursorKind, TypeSpelling};
pub use memory::{MemoryTree, Node, NodeId, NodeRef};
pub use registry::{EntityPath, Registry, RegistryView};
pub use session::Session;
