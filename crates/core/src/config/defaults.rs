//! Default values and functions for configuration

use crate::comment::DEFAULT_COMMAND_CHARACTER;

pub(crate) const CONFIG_DIR_NAME: &str = ".cxxdoc";
pub(crate) const CONFIG_FILE_NAME: &str = "config.toml";
pub(crate) const ENV_PREFIX: &str = "CXXDOC";

pub(crate) fn default_command_character() -> char {
    DEFAULT_COMMAND_CHARACTER
}

pub(crate) fn default_skip_undocumented() -> bool {
    false
}

pub(crate) fn default_ignore_forward_declarations() -> bool {
    true
}
