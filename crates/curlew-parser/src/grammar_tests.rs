//! Unit tests for the template grammar.
//!
//! These tests drive the lexer and grammar together and check the shape of
//! the built tree, its locations, and the diagnostics for malformed input.

use crate::{
    ParseOptions, SquareSyntax,
    ast::{Expression, PathHead, Program, Statement, StringLiteral},
    error::{Diagnostic, ErrorCode},
    parse_without_processing,
    span::SourceLocation,
};

/// Helper function to parse a source string and assert success
fn parse_ok(source: &str) -> Program {
    match parse_without_processing(source, &ParseOptions::default()) {
        Ok(program) => program,
        Err(e) => panic!("Expected parsing to succeed, but got error: {e}"),
    }
}

/// Helper function to parse a source string and return its first diagnostic
fn parse_err(source: &str) -> Diagnostic {
    match parse_without_processing(source, &ParseOptions::default()) {
        Ok(_) => panic!("Expected parsing to fail, but it succeeded"),
        Err(e) => e.diagnostics()[0].clone(),
    }
}

fn span_of(loc: &SourceLocation) -> (usize, usize, usize, usize) {
    (loc.start.line, loc.start.column, loc.end.line, loc.end.column)
}

mod statement_tests {
    use super::*;

    #[test]
    fn test_content_and_mustache() {
        let program = parse_ok("a {{foo}} b");
        let kinds: Vec<_> = program.body.iter().map(Statement::kind).collect();
        assert_eq!(kinds.len(), 3);

        let Statement::Mustache(mustache) = &program.body[1] else {
            panic!("expected a mustache");
        };
        assert_eq!(mustache.path.original(), Some("foo"));
        assert!(mustache.escaped);
        assert_eq!(span_of(&mustache.loc), (1, 2, 1, 9));
    }

    #[test]
    fn test_unescaped_mustaches() {
        for source in ["{{{foo}}}", "{{&foo}}"] {
            let program = parse_ok(source);
            let Statement::Mustache(mustache) = &program.body[0] else {
                panic!("expected a mustache for {source}");
            };
            assert!(!mustache.escaped, "{source} should be unescaped");
        }
    }

    #[test]
    fn test_strip_flags_on_mustache() {
        let program = parse_ok("{{~foo~}}");
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected a mustache");
        };
        assert!(mustache.strip.open);
        assert!(mustache.strip.close);
    }

    #[test]
    fn test_comment_value() {
        let program = parse_ok("{{!-- note --}}");
        let Statement::Comment(comment) = &program.body[0] else {
            panic!("expected a comment");
        };
        assert_eq!(comment.value, " note ");
    }

    #[test]
    fn test_multiline_content_location() {
        let program = parse_ok("a\nbc{{x}}");
        assert_eq!(span_of(program.body[0].loc()), (1, 0, 2, 2));
        assert_eq!(span_of(program.body[1].loc()), (2, 2, 2, 7));
    }

    #[test]
    fn test_source_name_on_every_location() {
        let options = ParseOptions::default().with_src_name("page.hbs");
        let program = parse_without_processing("x{{y}}", &options).unwrap();
        for statement in &program.body {
            assert_eq!(statement.loc().source.as_deref(), Some("page.hbs"));
        }
    }

    #[test]
    fn test_partial() {
        let program = parse_ok("{{> card item title=\"x\"}}");
        let Statement::Partial(partial) = &program.body[0] else {
            panic!("expected a partial");
        };
        assert_eq!(partial.name.original(), Some("card"));
        assert_eq!(partial.params.len(), 1);
        assert_eq!(partial.hash.as_ref().map(|h| h.pairs.len()), Some(1));
        assert!(partial.indent.is_empty());
    }
}

mod block_tests {
    use super::*;

    #[test]
    fn test_block_with_params_and_block_params() {
        let program = parse_ok("{{#each items key=\"id\" as |item idx|}}{{item}}{{/each}}");
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        assert_eq!(block.path.original(), Some("each"));
        assert_eq!(block.params.len(), 1);
        assert_eq!(block.hash.as_ref().map(|h| h.pairs[0].key.as_str()), Some("key"));

        let body = block.program.as_ref().expect("block has a program");
        assert_eq!(
            body.block_params,
            Some(vec!["item".to_string(), "idx".to_string()])
        );
        assert!(block.inverse.is_none());
    }

    #[test]
    fn test_inverted_block_swaps_program() {
        let program = parse_ok("{{^empty}}none{{/empty}}");
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        assert!(block.program.is_none());
        assert_eq!(block.inverse.as_ref().map(|p| p.body.len()), Some(1));
    }

    #[test]
    fn test_else_chain_structure() {
        let program = parse_ok("{{#if a}}A{{else if b}}B{{else}}C{{/if}}");
        let Statement::Block(outer) = &program.body[0] else {
            panic!("expected a block");
        };

        let chain = outer.inverse.as_ref().expect("outer block has an inverse");
        assert!(chain.chained);
        assert_eq!(chain.body.len(), 1);

        let Statement::Block(inner) = &chain.body[0] else {
            panic!("expected the chain to hold a block");
        };
        assert_eq!(inner.path.original(), Some("if"));
        assert_eq!(inner.params[0].original(), Some("b"));
        let else_body = inner.inverse.as_ref().expect("inner block has an inverse");
        assert!(!else_body.chained);
        assert_eq!(else_body.body[0].as_content().map(|c| c.value.as_str()), Some("C"));
    }

    #[test]
    fn test_else_chain_takes_outer_close_strip() {
        let program = parse_ok("{{#if a}}x{{else if b}}y{{~/if}}");
        let Statement::Block(outer) = &program.body[0] else {
            panic!("expected a block");
        };
        assert!(outer.close_strip.open);

        let chain = outer.inverse.as_ref().expect("outer block has an inverse");
        let Statement::Block(inner) = &chain.body[0] else {
            panic!("expected the chain to hold a block");
        };
        assert!(inner.close_strip.open);
    }

    #[test]
    fn test_inverse_strip_flags() {
        let program = parse_ok("{{#a}}x{{~else~}}y{{/a}}");
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        assert!(block.inverse_strip.open);
        assert!(block.inverse_strip.close);
    }

    #[test]
    fn test_decorator_block() {
        let program = parse_ok("{{#*inline \"row\"}}x{{/inline}}");
        assert!(matches!(program.body[0], Statement::DecoratorBlock(_)));
    }

    #[test]
    fn test_raw_block_keeps_body_verbatim() {
        let program = parse_ok("{{{{raw}}}} {{x}} {{{{/raw}}}}");
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        let body = block.program.as_ref().expect("raw block has a program");
        assert_eq!(body.body.len(), 1);
        assert_eq!(body.body[0].as_content().map(|c| c.value.as_str()), Some(" {{x}} "));
    }

    #[test]
    fn test_partial_block() {
        let program = parse_ok("{{#> layout}}body{{/layout}}");
        let Statement::PartialBlock(partial) = &program.body[0] else {
            panic!("expected a partial block");
        };
        assert_eq!(partial.name.original(), Some("layout"));
        assert_eq!(partial.program.body.len(), 1);
    }

    #[test]
    fn test_block_program_location() {
        let program = parse_ok("{{#a}}x{{y}}{{/a}}");
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        let body = block.program.as_ref().expect("block has a program");
        let loc = body.loc.as_ref().expect("non-empty program has a location");
        assert_eq!(span_of(loc), (1, 6, 1, 12));
        assert_eq!(span_of(&block.loc), (1, 0, 1, 18));
    }
}

mod expression_tests {
    use super::*;

    fn first_param(source: &str) -> Expression {
        let mut program = parse_ok(source);
        match program.body.remove(0) {
            Statement::Mustache(mut mustache) => mustache.params.remove(0),
            other => panic!("expected a mustache, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_sub_expression_original() {
        let Expression::SubExpression(sexpr) = first_param("{{foo (bar baz   1) }}") else {
            panic!("expected a sub-expression");
        };
        assert_eq!(sexpr.original, "(bar baz   1)");
        assert_eq!(sexpr.params.len(), 2);
    }

    #[test]
    fn test_dynamic_path_head() {
        let Expression::Path(path) = first_param("{{foo (lookup x).name}}") else {
            panic!("expected a path");
        };
        assert_eq!(path.original, "(lookup x).name");
        assert!(matches!(path.head, Some(PathHead::SubExpression(_))));
        assert_eq!(path.tail, vec!["name".to_string()]);
    }

    #[test]
    fn test_path_depth_and_data() {
        let Expression::Path(path) = first_param("{{foo ../../bar}}") else {
            panic!("expected a path");
        };
        assert_eq!(path.depth, 2);
        assert_eq!(path.original, "../../bar");

        let Expression::Path(data) = first_param("{{foo @root.name}}") else {
            panic!("expected a path");
        };
        assert!(data.data);
        assert_eq!(data.original, "@root.name");
    }

    #[test]
    fn test_literals() {
        assert!(matches!(first_param("{{f \"s\"}}"), Expression::String(s) if s.value == "s"));
        assert!(matches!(first_param("{{f -1.5}}"), Expression::Number(n) if n.value == -1.5));
        assert!(matches!(first_param("{{f false}}"), Expression::Boolean(b) if !b.value));
        assert!(matches!(first_param("{{f undefined}}"), Expression::Undefined(_)));
        assert!(matches!(first_param("{{f null}}"), Expression::Null(_)));
    }

    #[test]
    fn test_hash_literal() {
        let Expression::Hash(hash) = first_param("{{f (a=1 b=c)}}") else {
            panic!("expected a hash literal");
        };
        let keys: Vec<_> = hash.pairs.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_bracket_segments_are_literal() {
        let Expression::Path(path) = first_param("{{f foo.[bar baz]}}") else {
            panic!("expected a path");
        };
        assert_eq!(path.tail, vec!["bar baz".to_string()]);
        assert_eq!(path.original, "foo.bar baz");
    }

    #[test]
    fn test_array_literal_with_node_syntax() {
        let options = ParseOptions::default().with_square(SquareSyntax::Node);
        let program = parse_without_processing("{{f [1 two]}}", &options).unwrap();
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected a mustache");
        };
        let Expression::Array(array) = &mustache.params[0] else {
            panic!("expected an array literal");
        };
        assert_eq!(array.items.len(), 2);
    }

    #[test]
    fn test_array_literal_with_custom_syntax() {
        fn count(items: Vec<Expression>, loc: SourceLocation) -> Expression {
            let value = format!("{} items", items.len());
            Expression::String(StringLiteral {
                original: value.clone(),
                value,
                loc,
            })
        }

        let options = ParseOptions::default().with_square(SquareSyntax::Custom(count));
        let program = parse_without_processing("{{f [a b c]}}", &options).unwrap();
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected a mustache");
        };
        assert_eq!(mustache.params[0].original(), Some("3 items"));
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_mismatched_close() {
        let diag = parse_err("{{#foo}}x{{/bar}}");
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.message(), "foo doesn't match bar");
    }

    #[test]
    fn test_mismatched_raw_block_close() {
        let diag = parse_err("{{{{a}}}}x{{{{/b}}}}");
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.message(), "a doesn't match b");
    }

    #[test]
    fn test_mismatched_partial_block_close() {
        let diag = parse_err("{{#> a}}x{{/b}}");
        assert_eq!(diag.code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_block_opened_with_literal() {
        let diag = parse_err("{{#\"foo\"}}x{{/foo}}");
        assert_eq!(diag.code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_inverse_on_decorator_block() {
        let diag = parse_err("{{#*inline \"x\"}}a{{else}}b{{/inline}}");
        assert_eq!(diag.code(), Some(ErrorCode::E203));
        assert_eq!(diag.message(), "Unexpected inverse block on decorator");
    }

    #[test]
    fn test_invalid_path() {
        let diag = parse_err("{{foo/../bar}}");
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.message(), "Invalid path: foo/..");
    }

    #[test]
    fn test_missing_hash_value() {
        let diag = parse_err("{{foo bar=}}");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.message(), "unexpected token: expected expression");
        let loc = diag.location().expect("diagnostic has a location");
        assert_eq!((loc.start.column, loc.end.column), (10, 12));
    }

    #[test]
    fn test_stray_close_tag() {
        let diag = parse_err("a{{/foo}}");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.message(), "unexpected token: expected end of input");
    }

    #[test]
    fn test_unclosed_block() {
        let diag = parse_err("{{#foo}}bar");
        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert!(diag.message().starts_with("incomplete input"));
    }

    #[test]
    fn test_lexer_errors_surface() {
        let diag = parse_err("{{foo \"bar}}");
        assert_eq!(diag.code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_mismatched_raw_close_before_lexer_error() {
        let diag = parse_err("{{{{raw}}}}{{{{/notraw}}}}{{{{/raw}}}}");
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.message(), "raw doesn't match notraw");
    }

    #[test]
    fn test_mismatched_close_before_lexer_error() {
        let diag = parse_err("{{#if x}}{{/each}}{{\"x");
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.message(), "if doesn't match each");
    }

    #[test]
    fn test_open_block_before_lexer_error_stays_lexical() {
        let diag = parse_err("{{#if x}}{{\"x");
        assert_eq!(diag.code(), Some(ErrorCode::E003));
    }
}
