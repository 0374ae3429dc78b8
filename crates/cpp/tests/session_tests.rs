mod common;

use std::path::Path;

use common::{child, child_names, file, Fixture};
use cxxdoc_core::comment::SectionKind;
use cxxdoc_core::config::Config;
use cxxdoc_core::diagnostics::DiagnosticKind;
use cxxdoc_core::entities::{EntityType, Virtuality};
use cxxdoc_core::error::Error;
use cxxdoc_cpp::{CursorKind, Node, Session};
use pretty_assertions::assert_eq;

fn documented_tree() -> Fixture {
    let mut f = Fixture::new();
    let root = f.root();

    let ns = f.namespace(root, "ns");
    f.add(
        ns,
        Node::new(CursorKind::FunctionDecl, "f")
            .source("void f();")
            .result_type("void", "void")
            .comment("/// Does it."),
    );
    f.add(
        ns,
        Node::new(CursorKind::VarDecl, "x")
            .source("int x;")
            .ty("int", "int"),
    );

    let hidden = f.class(root, CursorKind::ClassDecl, "hidden", "class hidden");
    f.decl(hidden, CursorKind::AccessSpecifier, "", "public:");
    f.add(
        hidden,
        Node::new(CursorKind::FieldDecl, "value")
            .source("int value;")
            .ty("int", "int"),
    );

    let e = f.add(
        root,
        Node::new(CursorKind::EnumDecl, "e")
            .source("enum class e { one, two };")
            .underlying_type("int", "int")
            .comment("/// An enum."),
    );
    f.decl(e, CursorKind::EnumConstantDecl, "one", "one");
    f.decl(e, CursorKind::EnumConstantDecl, "two", "two");
    f
}

#[test]
fn test_everything_kept_by_default() {
    let session = documented_tree().parse();
    assert_eq!(child_names(file(&session)), vec!["ns", "hidden", "e"]);
    assert_eq!(child_names(child(file(&session), "ns")), vec!["f", "x"]);
}

#[test]
fn test_skip_undocumented() {
    let mut config = Config::default();
    config.parser.skip_undocumented = true;
    let session = documented_tree().parse_with(&config);

    let file = file(&session);
    assert_eq!(child_names(file), vec!["ns", "e"]);
    assert_eq!(child_names(child(file, "ns")), vec!["f"]);
    assert_eq!(child_names(child(file, "e")), vec!["one", "two"]);

    assert!(session.lookup("ns::x").is_none());
    assert!(session.lookup_type("hidden", "").is_none());
    assert!(session.lookup("e::two").is_some());
}

#[test]
fn test_remapped_section_command() {
    let mut config = Config::default();
    config
        .comment
        .commands
        .insert("notes".to_string(), "remark".to_string());

    let mut f = Fixture::new();
    let root = f.root();
    f.add(
        root,
        Node::new(CursorKind::VarDecl, "stale")
            .source("int stale;")
            .ty("int", "int")
            .comment("/// Old.\n/// \\notes Retired command."),
    );
    f.add(
        root,
        Node::new(CursorKind::VarDecl, "fresh")
            .source("int fresh;")
            .ty("int", "int")
            .comment("/// New.\n/// \\remark Current command."),
    );

    let session = f.parse_with(&config);
    assert_eq!(
        session.syntax().resolve("remark"),
        Some(SectionKind::Notes)
    );
    assert_eq!(session.syntax().resolve("notes"), None);

    let file = file(&session);
    let fresh = child(file, "fresh").comment.as_ref().unwrap();
    let notes: Vec<&str> = fresh
        .of_kind(SectionKind::Notes)
        .map(|s| s.body.as_str())
        .collect();
    assert_eq!(notes, vec!["Current command."]);

    let stale = child(file, "stale").comment.as_ref().unwrap();
    assert_eq!(stale.of_kind(SectionKind::Notes).count(), 0);
    assert_eq!(stale.brief(), Some("Old.\nRetired command."));

    let reported: Vec<_> = session
        .diagnostics()
        .of_kind(DiagnosticKind::CommentParse)
        .collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].entity, "stale");
}

#[test]
fn test_invalid_comment_configuration_is_rejected() {
    let mut config = Config::default();
    config
        .comment
        .commands
        .insert("notes".to_string(), "returns".to_string());
    assert!(matches!(
        Session::new(&config),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_redeclarations_are_merged() {
    let mut f = Fixture::new();
    let root = f.root();
    let ns = f.namespace(root, "ns");

    let first = f.function(ns, CursorKind::FunctionDecl, "g", "void g(int x);", "void");
    f.param(first, "x", "int x", "int");
    let other = f.function(ns, CursorKind::FunctionDecl, "g", "void g(char x);", "void");
    f.param(other, "x", "char x", "char");
    let again = f.add(
        ns,
        Node::new(CursorKind::FunctionDecl, "g")
            .source("void g(int y);")
            .result_type("void", "void")
            .comment("/// Takes an int."),
    );
    f.param(again, "y", "int y", "int");

    let session = f.parse();
    let ns = child(file(&session), "ns");
    let unique: Vec<&str> = ns
        .children()
        .iter()
        .map(|g| g.unique_name.as_str())
        .collect();
    assert_eq!(unique, vec!["ns::g(int)", "ns::g(char)"]);

    let kept = &ns.children()[0];
    assert_eq!(
        kept.comment.as_ref().and_then(|c| c.brief()),
        Some("Takes an int.")
    );
    assert_eq!(kept.signature().unwrap().parameters[0].name, "x");

    let mut functions = Vec::new();
    session.for_each_of_type(EntityType::Function, |e| functions.push(e.unique_name.clone()));
    assert_eq!(functions, vec!["ns::g(int)", "ns::g(char)"]);
    assert!(session.lookup("ns::g(char)").is_some());
}

#[test]
fn test_dump_round_trip() {
    let mut f = Fixture::new();
    let root = f.root();
    let base = f.class(root, CursorKind::StructDecl, "base", "struct base");
    f.function(
        base,
        CursorKind::CxxMethod,
        "run",
        "virtual void run() = 0;",
        "void",
    );
    let derived = f.class(root, CursorKind::StructDecl, "derived", "struct derived : base");
    f.base(derived, "base", Some(base));
    f.add(
        derived,
        Node::new(CursorKind::CxxMethod, "run")
            .source("void run() override;")
            .result_type("void", "void")
            .comment("/// Runs.\n/// \\effects Something."),
    );

    let direct = f.parse();
    let json = f.tree.to_json().unwrap();

    let mut session = Session::new(&Config::default()).unwrap();
    let dumped = session.parse_dump(Path::new("test.hpp"), &json).unwrap();
    assert_eq!(dumped, file(&direct));

    let base = child(dumped, "base");
    assert!(base.as_class().unwrap().is_abstract);
    assert_eq!(
        child(base, "run").virtuality(),
        Some(Virtuality::Pure)
    );
    let derived = child(dumped, "derived");
    assert!(!derived.as_class().unwrap().is_abstract);
    assert_eq!(
        child(derived, "run").virtuality(),
        Some(Virtuality::Overridden)
    );
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_dump_without_semantic_parents() {
    // namespace ns {
    //     struct base { virtual void run(); };
    //     struct derived : base { void run(); };
    // }
    let json = r#"{"nodes": [
        {"kind": "translation_unit", "children": [1]},
        {"kind": "namespace", "spelling": "ns", "tokens": ["namespace", "ns", "{", "}"],
         "children": [2, 4]},
        {"kind": "struct_decl", "spelling": "base",
         "tokens": ["struct", "base", "{", "}", ";"], "children": [3]},
        {"kind": "cxx_method", "spelling": "run",
         "tokens": ["virtual", "void", "run", "(", ")", ";"],
         "result_type": {"spelling": "void", "canonical": "void"}},
        {"kind": "struct_decl", "spelling": "derived",
         "tokens": ["struct", "derived", ":", "base", "{", "}", ";"], "children": [5, 6]},
        {"kind": "base_specifier", "spelling": "base", "tokens": ["base"], "referenced": 2},
        {"kind": "cxx_method", "spelling": "run", "tokens": ["void", "run", "(", ")", ";"],
         "result_type": {"spelling": "void", "canonical": "void"}}
    ]}"#;
    let mut session = Session::new(&Config::default()).unwrap();
    let file = session.parse_dump(Path::new("dump.hpp"), json).unwrap();

    let ns = child(file, "ns");
    let base = child(ns, "base");
    assert_eq!(child(base, "run").virtuality(), Some(Virtuality::New));
    let derived = child(ns, "derived");
    let run = child(derived, "run");
    assert_eq!(run.unique_name, "ns::derived::run");
    assert_eq!(run.virtuality(), Some(Virtuality::Overridden));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_dump_must_hold_a_translation_unit() {
    let json = r#"{"nodes": [{"kind": "namespace", "spelling": "ns"}]}"#;
    let mut session = Session::new(&Config::default()).unwrap();
    let err = session.parse_dump(Path::new("ns.hpp"), json).unwrap_err();
    assert!(matches!(err, Error::FrontEnd(_)));
}

#[test]
fn test_take_diagnostics_drains() {
    let mut f = Fixture::new();
    let root = f.root();
    f.decl(root, CursorKind::AccessSpecifier, "", "public:");

    let mut session = f.parse();
    let taken = session.take_diagnostics();
    assert_eq!(taken.len(), 1);
    assert_eq!(taken[0].kind, DiagnosticKind::Classification);
    assert!(session.diagnostics().is_empty());
}
