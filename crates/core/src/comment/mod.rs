//! Documentation comment model and section parser
//!
//! A raw comment block is split into an ordered list of [`Section`]s. Which
//! command token selects which [`SectionKind`], and which heading each kind is
//! rendered with, is described by a [`CommentSyntax`] value that is fixed
//! before any parsing begins.

mod parser;
mod syntax;

pub use parser::CommentParser;
pub use syntax::{CommentSyntax, DEFAULT_COMMAND_CHARACTER};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Kind of a documentation section
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SectionKind {
    Brief,
    Details,
    Requires,
    Effects,
    Synchronization,
    Postconditions,
    Returns,
    Throws,
    Complexity,
    Remarks,
    ErrorConditions,
    Notes,
}

impl SectionKind {
    /// Heading used when no override is configured
    pub fn default_heading(self) -> &'static str {
        match self {
            SectionKind::Brief | SectionKind::Details => "",
            SectionKind::Requires => "Requires",
            SectionKind::Effects => "Effects",
            SectionKind::Synchronization => "Synchronization",
            SectionKind::Postconditions => "Postconditions",
            SectionKind::Returns => "Returns",
            SectionKind::Throws => "Throws",
            SectionKind::Complexity => "Complexity",
            SectionKind::Remarks => "Remarks",
            SectionKind::ErrorConditions => "Error conditions",
            SectionKind::Notes => "Notes",
        }
    }
}

/// One parsed section of a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: String,
    pub body: String,
}

/// A parsed documentation comment; never empty once attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    sections: Vec<Section>,
}

impl Comment {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Body of the first `brief` section, if any
    pub fn brief(&self) -> Option<&str> {
        self.of_kind(SectionKind::Brief)
            .next()
            .map(|s| s.body.as_str())
    }

    /// All sections of one kind, in encounter order
    pub fn of_kind(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }

    /// Render the sections back into a raw comment block.
    ///
    /// Parsing the result with the same syntax yields the same section list.
    pub fn to_source(&self, syntax: &CommentSyntax) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            if !(i == 0 && section.kind == SectionKind::Brief) {
                out.push(syntax.command_character());
                out.push_str(syntax.command(section.kind));
                out.push(' ');
            }
            out.push_str(&section.body);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_section_kind_names() {
        assert_eq!(SectionKind::ErrorConditions.to_string(), "error_conditions");
        assert_eq!(
            SectionKind::from_str("postconditions").unwrap(),
            SectionKind::Postconditions
        );
        assert!(SectionKind::from_str("remark").is_err());
    }

    #[test]
    fn test_default_headings() {
        assert_eq!(SectionKind::Brief.default_heading(), "");
        assert_eq!(SectionKind::Details.default_heading(), "");
        assert_eq!(
            SectionKind::ErrorConditions.default_heading(),
            "Error conditions"
        );
    }

    #[test]
    fn test_brief_accessor() {
        let comment = Comment::new(vec![
            Section {
                kind: SectionKind::Brief,
                heading: String::new(),
                body: "short".to_string(),
            },
            Section {
                kind: SectionKind::Notes,
                heading: "Notes".to_string(),
                body: "n".to_string(),
            },
        ]);
        assert_eq!(comment.brief(), Some("short"));
        assert_eq!(comment.of_kind(SectionKind::Notes).count(), 1);
    }
}
