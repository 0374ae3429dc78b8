//! Section parser for raw comment blocks

use super::{Comment, CommentSyntax, Section, SectionKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Character view over a raw comment that reads as a newline at index 0 and
/// at every index past the end.
///
/// Index `i` in `1..=len` maps to character `i - 1`, so a block always starts
/// and ends on a line break.
struct CommentStream {
    chars: Vec<char>,
}

impl CommentStream {
    fn new(raw: &str) -> Self {
        Self {
            chars: raw.chars().filter(|c| *c != '\r').collect(),
        }
    }

    fn size(&self) -> usize {
        self.chars.len() + 1
    }

    fn at(&self, i: usize) -> char {
        if i == 0 || i >= self.size() {
            '\n'
        } else {
            self.chars[i - 1]
        }
    }
}

/// Accumulates the body of the active section
struct SectionBuilder<'s> {
    syntax: &'s CommentSyntax,
    kind: SectionKind,
    body: String,
    sections: Vec<Section>,
}

impl<'s> SectionBuilder<'s> {
    fn finish_section(&mut self) {
        let body = self.body.trim();
        if body.is_empty() {
            self.body.clear();
            return;
        }

        self.sections.push(Section {
            kind: self.kind,
            heading: self.syntax.heading(self.kind).to_string(),
            body: body.to_string(),
        });
        self.body.clear();

        // brief only ever covers the first paragraph
        if self.kind == SectionKind::Brief {
            self.kind = SectionKind::Details;
        }
    }
}

/// Splits raw comment text into sections according to a [`CommentSyntax`]
#[derive(Debug, Clone, Copy)]
pub struct CommentParser<'a> {
    syntax: &'a CommentSyntax,
}

impl<'a> CommentParser<'a> {
    pub fn new(syntax: &'a CommentSyntax) -> Self {
        Self { syntax }
    }

    /// Parse one raw comment block.
    ///
    /// Returns `None` when nothing but whitespace and comment markers remains.
    /// Unknown commands are reported to `diagnostics` and parsing continues in
    /// the previously active section.
    pub fn parse(
        &self,
        entity_name: &str,
        raw: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Comment> {
        let stream = CommentStream::new(raw);
        let command_character = self.syntax.command_character();
        let mut builder = SectionBuilder {
            syntax: self.syntax,
            kind: SectionKind::Brief,
            body: String::new(),
            sections: Vec::new(),
        };

        let mut i = 0;
        let mut line = 0u32;
        let mut line_is_blank = true;
        while i < stream.size() {
            let c = stream.at(i);
            if c == '\n' {
                i += 1;
                line += 1;

                if line_is_blank {
                    builder.finish_section();
                } else {
                    builder.body.push('\n');
                }
                line_is_blank = true;

                while i < stream.size() && matches!(stream.at(i), ' ' | '/') {
                    i += 1;
                }
            } else if c == command_character {
                let mut token = String::new();
                i += 1;
                while i < stream.size() && !stream.at(i).is_whitespace() {
                    token.push(stream.at(i));
                    i += 1;
                }
                // the separator after the command belongs to neither section
                if i < stream.size() && matches!(stream.at(i), ' ' | '\t') {
                    i += 1;
                }
                line_is_blank = false;

                match self.syntax.resolve(&token) {
                    Some(kind) => {
                        builder.finish_section();
                        builder.kind = kind;
                    }
                    None => diagnostics.report(
                        DiagnosticKind::CommentParse,
                        entity_name,
                        line,
                        format!("invalid section name '{token}'"),
                    ),
                }
            } else {
                if !c.is_whitespace() {
                    line_is_blank = false;
                }
                builder.body.push(c);
                i += 1;
            }
        }
        builder.finish_section();

        if builder.sections.is_empty() {
            None
        } else {
            Some(Comment::new(builder.sections))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> (Vec<(SectionKind, String)>, Diagnostics) {
        let syntax = CommentSyntax::default();
        parse_with(&syntax, raw)
    }

    fn parse_with(syntax: &CommentSyntax, raw: &str) -> (Vec<(SectionKind, String)>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let sections = CommentParser::new(syntax)
            .parse("entity", raw, &mut diagnostics)
            .map(|c| {
                c.sections()
                    .iter()
                    .map(|s| (s.kind, s.body.clone()))
                    .collect()
            })
            .unwrap_or_default();
        (sections, diagnostics)
    }

    #[test]
    fn test_consecutive_lines_join_into_brief() {
        let (sections, diagnostics) = parse("/// a\n/// b");
        assert_eq!(sections, vec![(SectionKind::Brief, "a\nb".to_string())]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_blank_line_advances_to_details() {
        let (sections, _) = parse("/// Brief.\n///\n/// More text.\n///\n/// Even more.");
        assert_eq!(
            sections,
            vec![
                (SectionKind::Brief, "Brief.".to_string()),
                (SectionKind::Details, "More text.".to_string()),
                (SectionKind::Details, "Even more.".to_string()),
            ]
        );
    }

    #[test]
    fn test_commands_switch_sections() {
        let raw = "/// Does a thing.\n/// \\requires x > 0\n/// \\returns the value\n/// \\effects none";
        let (sections, _) = parse(raw);
        assert_eq!(
            sections,
            vec![
                (SectionKind::Brief, "Does a thing.".to_string()),
                (SectionKind::Requires, "x > 0".to_string()),
                (SectionKind::Returns, "the value".to_string()),
                (SectionKind::Effects, "none".to_string()),
            ]
        );
    }

    #[test]
    fn test_same_kind_not_merged() {
        let (sections, _) = parse("\\notes first\n\n\\notes second");
        assert_eq!(
            sections,
            vec![
                (SectionKind::Notes, "first".to_string()),
                (SectionKind::Notes, "second".to_string()),
            ]
        );
    }

    #[test]
    fn test_prose_after_command_section_stays_in_it() {
        let (sections, _) = parse("\\notes first\n\nsecond");
        assert_eq!(
            sections,
            vec![
                (SectionKind::Notes, "first".to_string()),
                (SectionKind::Notes, "second".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_command_continues_previous_section() {
        let (sections, diagnostics) = parse("/// \\returns a\n/// \\bogus b");
        assert_eq!(sections, vec![(SectionKind::Returns, "a\nb".to_string())]);
        let reported: Vec<_> = diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].line, 2);
        assert_eq!(reported[0].entity, "entity");
        assert!(reported[0].message.contains("'bogus'"));
    }

    #[test]
    fn test_unknown_command_inside_a_line() {
        let (sections, diagnostics) = parse("/// \\notes keep \\bogus  this");
        assert_eq!(
            sections,
            vec![(SectionKind::Notes, "keep  this".to_string())]
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_command_on_its_own_line() {
        let (sections, _) = parse("\\returns\nthe result");
        assert_eq!(
            sections,
            vec![(SectionKind::Returns, "the result".to_string())]
        );
    }

    #[test]
    fn test_empty_comment_yields_none() {
        let syntax = CommentSyntax::default();
        let mut diagnostics = Diagnostics::new();
        let parser = CommentParser::new(&syntax);
        assert!(parser.parse("e", "///\n///   \n//", &mut diagnostics).is_none());
        assert!(parser.parse("e", "", &mut diagnostics).is_none());
    }

    #[test]
    fn test_headings_attached() {
        let mut syntax = CommentSyntax::default();
        syntax.set_section_heading(SectionKind::Throws, "Exceptions");
        let mut diagnostics = Diagnostics::new();
        let comment = CommentParser::new(&syntax)
            .parse("e", "brief\n\\throws nothing", &mut diagnostics)
            .unwrap();
        let headings: Vec<&str> = comment
            .sections()
            .iter()
            .map(|s| s.heading.as_str())
            .collect();
        assert_eq!(headings, vec!["", "Exceptions"]);
    }

    #[test]
    fn test_remapped_command() {
        let mut syntax = CommentSyntax::default();
        syntax.rename_section_command("notes", "remark").unwrap();

        let (sections, diagnostics) = parse_with(&syntax, "\\notes lost\n\n\\remark kept");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("'notes'"));
        assert_eq!(
            sections,
            vec![
                (SectionKind::Brief, "lost".to_string()),
                (SectionKind::Notes, "kept".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_command_character() {
        let mut syntax = CommentSyntax::default();
        syntax.set_command_character('@').unwrap();
        let (sections, diagnostics) = parse_with(&syntax, "Brief\n@returns 42");
        assert!(diagnostics.is_empty());
        assert_eq!(
            sections,
            vec![
                (SectionKind::Brief, "Brief".to_string()),
                (SectionKind::Returns, "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_reserialization_reparses_identically() {
        let syntax = CommentSyntax::default();
        let raw = "/// Brief line\n/// continues.\n///\n/// Details here.\n/// \\notes n1\n///\n/// \\notes n2\n/// \\error_conditions when it fails";
        let mut diagnostics = Diagnostics::new();
        let parser = CommentParser::new(&syntax);
        let first = parser.parse("e", raw, &mut diagnostics).unwrap();
        let second = parser
            .parse("e", &first.to_source(&syntax), &mut diagnostics)
            .unwrap();
        assert_eq!(first, second);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_bodies_are_trimmed_idempotently() {
        let syntax = CommentSyntax::default();
        let mut diagnostics = Diagnostics::new();
        let comment = CommentParser::new(&syntax)
            .parse("e", "  lead  \n\n\\returns   x   ", &mut diagnostics)
            .unwrap();
        for section in comment.sections() {
            assert_eq!(section.body.trim(), section.body);
            assert!(!section.body.is_empty());
        }
    }
}
