use cxxdoc_core::comment::{CommentParser, SectionKind};
use cxxdoc_core::config::{CommentConfig, Config, ParserConfig};
use cxxdoc_core::diagnostics::{DiagnosticKind, Diagnostics};

/// Route reported diagnostics through a test-writer subscriber
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_parser_config_defaults() {
    let config = ParserConfig::default();
    assert!(!config.skip_undocumented);
    assert!(config.ignore_forward_declarations);
}

#[test]
fn test_comment_config_defaults() {
    let config = CommentConfig::default();
    assert_eq!(config.command_character, '\\');
    assert!(config.commands.is_empty());
    assert!(config.headings.is_empty());
}

#[test]
fn test_config_validation_command_character() {
    let mut config = Config::default();

    config.comment.command_character = '@';
    assert!(config.validate().is_ok());

    config.comment.command_character = ' ';
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid comment configuration"));

    config.comment.command_character = 'x';
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_commands() {
    let mut config = Config::default();

    config
        .comment
        .commands
        .insert("notes".to_string(), "remark".to_string());
    assert!(config.validate().is_ok());

    // a token already owned by another kind
    config
        .comment
        .commands
        .insert("effects".to_string(), "returns".to_string());
    assert!(config.validate().is_err());

    config.comment.commands.clear();
    config
        .comment
        .commands
        .insert("summary".to_string(), "sum".to_string());
    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("summary"));

    config.comment.commands.clear();
    config
        .comment
        .commands
        .insert("notes".to_string(), "two words".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_remapped_syntax_drives_the_parser() {
    init_tracing();
    let mut config = Config::default();
    config.comment.command_character = '@';
    config
        .comment
        .commands
        .insert("notes".to_string(), "remark".to_string());
    config
        .comment
        .headings
        .insert("notes".to_string(), "Remarks to the reader".to_string());
    let syntax = config.comment_syntax().unwrap();

    let mut diagnostics = Diagnostics::new();
    let comment = CommentParser::new(&syntax)
        .parse(
            "widget",
            "/// A widget.\n/// @remark Handle with care.\n/// @notes Not a command any more.",
            &mut diagnostics,
        )
        .unwrap();

    let notes: Vec<_> = comment.of_kind(SectionKind::Notes).collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].heading, "Remarks to the reader");
    assert_eq!(notes[0].body, "Handle with care.\nNot a command any more.");
    assert_eq!(comment.brief(), Some("A widget."));

    let reported: Vec<_> = diagnostics.of_kind(DiagnosticKind::CommentParse).collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].entity, "widget");
    assert!(reported[0].message.contains("notes"));
}
