//! Command syntax for documentation comments

use std::collections::HashMap;
use std::str::FromStr;

use strum::IntoEnumIterator;

use super::SectionKind;
use crate::config::CommentConfig;
use crate::error::{Error, Result};

/// Default character introducing a section command
pub const DEFAULT_COMMAND_CHARACTER: char = '\\';

/// Command character, command tokens and headings used by the comment parser.
///
/// Every section kind is reachable through exactly one live command token.
/// Mutators validate their arguments so a bad configuration is rejected
/// before any comment is parsed.
#[derive(Debug, Clone)]
pub struct CommentSyntax {
    command_character: char,
    commands: HashMap<String, SectionKind>,
    headings: HashMap<SectionKind, String>,
}

impl Default for CommentSyntax {
    fn default() -> Self {
        let mut commands = HashMap::new();
        let mut headings = HashMap::new();
        for kind in SectionKind::iter() {
            commands.insert(kind.to_string(), kind);
            headings.insert(kind, kind.default_heading().to_string());
        }
        Self {
            command_character: DEFAULT_COMMAND_CHARACTER,
            commands,
            headings,
        }
    }
}

impl CommentSyntax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a syntax from configuration, applying overrides on top of the defaults
    pub fn from_config(config: &CommentConfig) -> Result<Self> {
        let mut syntax = Self::default();
        syntax.set_command_character(config.command_character)?;

        for (kind_name, token) in &config.commands {
            let kind = parse_kind(kind_name)?;
            syntax.set_section_command(kind, token)?;
        }
        for (kind_name, heading) in &config.headings {
            let kind = parse_kind(kind_name)?;
            syntax.set_section_heading(kind, heading.clone());
        }
        Ok(syntax)
    }

    pub fn command_character(&self) -> char {
        self.command_character
    }

    pub fn set_command_character(&mut self, c: char) -> Result<()> {
        if c.is_whitespace() || c == '/' || c.is_alphanumeric() {
            return Err(Error::invalid_argument(format!(
                "invalid command character '{}'",
                c.escape_default()
            )));
        }
        self.command_character = c;
        Ok(())
    }

    /// Resolve a command token to its section kind
    pub fn resolve(&self, token: &str) -> Option<SectionKind> {
        self.commands.get(token).copied()
    }

    /// The live command token of a kind
    pub fn command(&self, kind: SectionKind) -> &str {
        self.commands
            .iter()
            .find(|(_, k)| **k == kind)
            .map(|(token, _)| token.as_str())
            .unwrap_or_default()
    }

    pub fn heading(&self, kind: SectionKind) -> &str {
        self.headings
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_heading())
    }

    /// Give `kind` a new command token, retiring its previous one
    pub fn set_section_command(&mut self, kind: SectionKind, token: &str) -> Result<()> {
        let current = self.command(kind).to_string();
        self.rename_section_command(&current, token)
    }

    /// Rename the command token `old` to `new`; the kind it selects is unchanged
    pub fn rename_section_command(&mut self, old: &str, new: &str) -> Result<()> {
        validate_token(new)?;
        let kind = self.resolve(old).ok_or_else(|| {
            Error::invalid_argument(format!("invalid section command name '{old}'"))
        })?;
        if old == new {
            return Ok(());
        }
        if self.commands.contains_key(new) {
            return Err(Error::invalid_argument(format!(
                "section command name '{new}' already in use"
            )));
        }
        self.commands.remove(old);
        self.commands.insert(new.to_string(), kind);
        Ok(())
    }

    pub fn set_section_heading(&mut self, kind: SectionKind, heading: impl Into<String>) {
        self.headings.insert(kind, heading.into());
    }

    /// Set the heading of the kind currently selected by `token`
    pub fn set_section_heading_by_command(
        &mut self,
        token: &str,
        heading: impl Into<String>,
    ) -> Result<()> {
        let kind = self.resolve(token).ok_or_else(|| {
            Error::invalid_argument(format!("invalid section command name '{token}'"))
        })?;
        self.set_section_heading(kind, heading);
        Ok(())
    }
}

fn parse_kind(name: &str) -> Result<SectionKind> {
    SectionKind::from_str(name)
        .map_err(|_| Error::invalid_argument(format!("unknown section kind '{name}'")))
}

fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(Error::invalid_argument(format!(
            "invalid section command token '{token}'"
        )));
    }
    Ok(())
}
