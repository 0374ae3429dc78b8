//! Configuration module for cxxdoc
//!
//! Configuration covers the comment command syntax and a few walk options.
//! It can be loaded from TOML files and/or environment variables, and is
//! fixed before any translation unit is parsed.

mod defaults;
mod loading;


use crate::comment::CommentSyntax;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.cxxdoc/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Comment command syntax
    #[serde(default)]
    pub comment: CommentConfig,

    /// Walk options
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Comment command syntax overrides
///
/// Keys of `commands` and `headings` are section kind names such as
/// `notes` or `error_conditions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Character introducing a section command
    #[serde(default = "default_command_character")]
    pub command_character: char,

    /// Section kind -> command token
    #[serde(default)]
    pub commands: BTreeMap<String, String>,

    /// Section kind -> display heading
    #[serde(default)]
    pub headings: BTreeMap<String, String>,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            command_character: default_command_character(),
            commands: BTreeMap::new(),
            headings: BTreeMap::new(),
        }
    }
}

/// Options for the declaration walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Omit entities that have no comment and no documented children
    #[serde(default = "default_skip_undocumented")]
    pub skip_undocumented: bool,

    /// Skip class and enum declarations that are not definitions
    #[serde(default = "default_ignore_forward_declarations")]
    pub ignore_forward_declarations: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skip_undocumented: default_skip_undocumented(),
            ignore_forward_declarations: default_ignore_forward_declarations(),
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// Checks that the comment overrides name known section kinds and do not
    /// hand one command token to two kinds.
    pub fn validate(&self) -> Result<()> {
        CommentSyntax::from_config(&self.comment)
            .map(|_| ())
            .map_err(|e| Error::config(format!("Invalid comment configuration: {e}")))
    }

    /// Build the comment syntax described by this configuration
    pub fn comment_syntax(&self) -> Result<CommentSyntax> {
        CommentSyntax::from_config(&self.comment)
    }
}
