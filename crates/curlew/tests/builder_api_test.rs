//! Integration tests for the TemplateBuilder API

use curlew::{
    CurlewError, TemplateBuilder,
    ast::Statement,
    config::{AppConfig, ParserConfig, SquareMode},
};

#[test]
fn test_parse_normalizes_whitespace() {
    let builder = TemplateBuilder::default();
    let program = builder
        .parse("{{#each items}}\n  {{name}}\n{{/each}}\n")
        .expect("Failed to parse template");

    assert_eq!(
        builder.print(&program),
        "BLOCK:\n  p%each [p%items]\n  PROGRAM:\n    CONTENT[ '  ' ]\n    {{ p%name [] }}\n    CONTENT[ '\n' ]\nCONTENT[ '' ]\n"
    );
}

#[test]
fn test_parse_without_processing_keeps_whitespace() {
    let builder = TemplateBuilder::default();
    let program = builder
        .parse_without_processing("{{#each items}}\n  {{name}}\n{{/each}}\n")
        .expect("Failed to parse template");

    let Statement::Block(block) = &program.body[0] else {
        panic!("Expected a block statement");
    };
    let first = block.program.as_ref().and_then(|p| p.body[0].as_content());
    assert_eq!(first.map(|c| c.value.as_str()), Some("\n  "));
}

#[test]
fn test_config_reaches_parser() {
    let config = AppConfig::new(ParserConfig::new(true, SquareMode::Node, None));
    let builder = TemplateBuilder::new(config);

    let program = builder.parse("  {{> row [1 2]}}\n").expect("Failed to parse template");
    assert_eq!(
        builder.print(&program),
        "CONTENT[ '  ' ]\n{{> PARTIAL:row ARRAY[n%1, n%2] }}\nCONTENT[ '\n' ]\n"
    );
}

#[test]
fn test_parse_error_keeps_source() {
    let builder = TemplateBuilder::default().with_source_name("broken.hbs");
    let err = builder.parse("{{#if x}}oops{{/each}}").unwrap_err();

    match err {
        CurlewError::Parse { err, src } => {
            assert_eq!(src, "{{#if x}}oops{{/each}}");
            let diag = &err.diagnostics()[0];
            assert_eq!(diag.message(), "if doesn't match each");
            let loc = diag.location().expect("diagnostic has a location");
            assert_eq!(loc.source.as_deref(), Some("broken.hbs"));
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}
