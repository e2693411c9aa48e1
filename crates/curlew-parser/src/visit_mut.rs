//! Mutating traversal of the syntax tree.
//!
//! A [`VisitorMut`] handler receives the node by mutable reference and
//! answers with an [`Action`]: keep the (possibly edited) node, remove it,
//! or replace it with another node. The engine rebuilds each container from
//! those answers, so removed list elements simply drop out and the
//! remaining ones stay contiguous.
//!
//! Two contracts are enforced while rebuilding:
//!
//! - A required field (a call's head, a hash pair's value, a partial
//!   block's program) cannot be removed.
//! - A replacement must be a node of the same family as the slot it lands
//!   in: a statement for a program body, an expression for a path or param,
//!   and so on.
//!
//! Violations stop the traversal with a [`VisitError`]. The tree is left
//! partially rebuilt and should be discarded.

use std::mem;

use thiserror::Error;

use crate::{
    ast::{
        ArrayLiteral, BlockStatement, BooleanLiteral, CommentStatement, ContentStatement,
        Expression, Hash, HashLiteral, HashPair, MustacheStatement, Node, NodeKind, NullLiteral,
        NumberLiteral, PartialBlockStatement, PartialStatement, PathExpression, Program, Statement,
        StringLiteral, SubExpression, UndefinedLiteral,
    },
    error::{Diagnostic, ErrorCode},
    span::SourceLocation,
    visit::Ancestors,
};

/// What a mutating handler wants done with the node it was given.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Action {
    /// Leave the node in place, including any edits made through the
    /// reference.
    #[default]
    Keep,
    /// Drop the node from its parent. Only legal for optional fields and
    /// list elements.
    Remove,
    /// Put another node in its place.
    Replace(Node),
}

pub type VisitResult = Result<Action, VisitError>;

/// A broken traversal contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisitError {
    #[error("Visitor removed `{field}` ({}) from {parent}, but `{field}` is required", position(.loc))]
    RequiredChildRemoved {
        field: &'static str,
        parent: NodeKind,
        /// Where the removed child was.
        loc: Option<SourceLocation>,
    },

    #[error("Unexpected visitor return value ({found}) when accepting {field} on {parent}")]
    UnexpectedReturn {
        field: &'static str,
        parent: NodeKind,
        found: NodeKind,
        /// Where the replaced child was.
        loc: Option<SourceLocation>,
    },
}

fn position(loc: &Option<SourceLocation>) -> String {
    match loc {
        Some(loc) => loc.start.to_string(),
        None => "unknown location".to_string(),
    }
}

impl VisitError {
    pub fn loc(&self) -> Option<&SourceLocation> {
        match self {
            VisitError::RequiredChildRemoved { loc, .. }
            | VisitError::UnexpectedReturn { loc, .. } => loc.as_ref(),
        }
    }
}

impl From<VisitError> for Diagnostic {
    fn from(err: VisitError) -> Self {
        let (code, label) = match &err {
            VisitError::RequiredChildRemoved { .. } => (ErrorCode::E300, "required child removed"),
            VisitError::UnexpectedReturn { .. } => (ErrorCode::E301, "replaced here"),
        };
        let loc = err.loc().cloned();
        let diag = Diagnostic::error(err.to_string()).with_code(code);
        match loc {
            Some(loc) => diag.with_label(loc, label),
            None => diag,
        }
    }
}

/// Run a mutating visitor over a whole tree.
///
/// The root may be replaced by another program but never removed.
pub fn visit_mut<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    program: &mut Program,
) -> Result<(), VisitError> {
    let mut ancestors = Ancestors::new();
    match accept_program(visitor, &mut ancestors, program)? {
        Action::Keep => Ok(()),
        Action::Remove => Err(VisitError::RequiredChildRemoved {
            field: "root",
            parent: NodeKind::Program,
            loc: program.loc.clone(),
        }),
        Action::Replace(node) => {
            *program = node.into_program().map_err(|other| VisitError::UnexpectedReturn {
                field: "root",
                parent: NodeKind::Program,
                found: other.kind(),
                loc: program.loc.clone(),
            })?;
            Ok(())
        }
    }
}

/// Mutating handlers, one per node shape.
///
/// Defaults walk the children and keep the node.
pub trait VisitorMut {
    fn visit_program(&mut self, cx: &mut Ancestors, program: &mut Program) -> VisitResult {
        walk_program(self, cx, program)?;
        Ok(Action::Keep)
    }

    fn visit_mustache(
        &mut self,
        cx: &mut Ancestors,
        mustache: &mut MustacheStatement,
    ) -> VisitResult {
        walk_mustache(self, cx, mustache)?;
        Ok(Action::Keep)
    }

    fn visit_decorator(
        &mut self,
        cx: &mut Ancestors,
        decorator: &mut MustacheStatement,
    ) -> VisitResult {
        walk_mustache(self, cx, decorator)?;
        Ok(Action::Keep)
    }

    fn visit_block(&mut self, cx: &mut Ancestors, block: &mut BlockStatement) -> VisitResult {
        walk_block(self, cx, block)?;
        Ok(Action::Keep)
    }

    fn visit_decorator_block(
        &mut self,
        cx: &mut Ancestors,
        block: &mut BlockStatement,
    ) -> VisitResult {
        walk_block(self, cx, block)?;
        Ok(Action::Keep)
    }

    fn visit_partial(&mut self, cx: &mut Ancestors, partial: &mut PartialStatement) -> VisitResult {
        walk_partial(self, cx, partial)?;
        Ok(Action::Keep)
    }

    fn visit_partial_block(
        &mut self,
        cx: &mut Ancestors,
        partial: &mut PartialBlockStatement,
    ) -> VisitResult {
        walk_partial_block(self, cx, partial)?;
        Ok(Action::Keep)
    }

    fn visit_content(
        &mut self,
        _cx: &mut Ancestors,
        _content: &mut ContentStatement,
    ) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_comment(
        &mut self,
        _cx: &mut Ancestors,
        _comment: &mut CommentStatement,
    ) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_sub_expression(
        &mut self,
        cx: &mut Ancestors,
        sexpr: &mut SubExpression,
    ) -> VisitResult {
        walk_sub_expression(self, cx, sexpr)?;
        Ok(Action::Keep)
    }

    fn visit_path(&mut self, _cx: &mut Ancestors, _path: &mut PathExpression) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_string(&mut self, _cx: &mut Ancestors, _string: &mut StringLiteral) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_number(&mut self, _cx: &mut Ancestors, _number: &mut NumberLiteral) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_boolean(&mut self, _cx: &mut Ancestors, _boolean: &mut BooleanLiteral) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_undefined(
        &mut self,
        _cx: &mut Ancestors,
        _undefined: &mut UndefinedLiteral,
    ) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_null(&mut self, _cx: &mut Ancestors, _null: &mut NullLiteral) -> VisitResult {
        Ok(Action::Keep)
    }

    fn visit_array_literal(&mut self, cx: &mut Ancestors, array: &mut ArrayLiteral) -> VisitResult {
        walk_expressions(self, cx, "items", &mut array.items)?;
        Ok(Action::Keep)
    }

    fn visit_hash_literal(&mut self, cx: &mut Ancestors, hash: &mut HashLiteral) -> VisitResult {
        walk_hash_pairs(self, cx, &mut hash.pairs)?;
        Ok(Action::Keep)
    }

    fn visit_hash(&mut self, cx: &mut Ancestors, hash: &mut Hash) -> VisitResult {
        walk_hash_pairs(self, cx, &mut hash.pairs)?;
        Ok(Action::Keep)
    }

    fn visit_hash_pair(&mut self, cx: &mut Ancestors, pair: &mut HashPair) -> VisitResult {
        required_expression(self, cx, "value", &mut pair.value)
    }
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn accept_program<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    program: &mut Program,
) -> VisitResult {
    cx.enter(NodeKind::Program, program.loc.as_ref());
    let result = visitor.visit_program(cx, program);
    cx.exit();
    result
}

pub fn accept_statement<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    statement: &mut Statement,
) -> VisitResult {
    cx.enter(statement.kind(), Some(statement.loc()));
    let result = match statement {
        Statement::Mustache(node) => visitor.visit_mustache(cx, node),
        Statement::Decorator(node) => visitor.visit_decorator(cx, node),
        Statement::Block(node) => visitor.visit_block(cx, node),
        Statement::DecoratorBlock(node) => visitor.visit_decorator_block(cx, node),
        Statement::Partial(node) => visitor.visit_partial(cx, node),
        Statement::PartialBlock(node) => visitor.visit_partial_block(cx, node),
        Statement::Content(node) => visitor.visit_content(cx, node),
        Statement::Comment(node) => visitor.visit_comment(cx, node),
    };
    cx.exit();
    result
}

pub fn accept_expression<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    expression: &mut Expression,
) -> VisitResult {
    cx.enter(expression.kind(), Some(expression.loc()));
    let result = match expression {
        Expression::Path(node) => visitor.visit_path(cx, node),
        Expression::SubExpression(node) => visitor.visit_sub_expression(cx, node),
        Expression::String(node) => visitor.visit_string(cx, node),
        Expression::Number(node) => visitor.visit_number(cx, node),
        Expression::Boolean(node) => visitor.visit_boolean(cx, node),
        Expression::Undefined(node) => visitor.visit_undefined(cx, node),
        Expression::Null(node) => visitor.visit_null(cx, node),
        Expression::Array(node) => visitor.visit_array_literal(cx, node),
        Expression::Hash(node) => visitor.visit_hash_literal(cx, node),
    };
    cx.exit();
    result
}

pub fn accept_hash<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    hash: &mut Hash,
) -> VisitResult {
    cx.enter(NodeKind::Hash, Some(&hash.loc));
    let result = visitor.visit_hash(cx, hash);
    cx.exit();
    result
}

pub fn accept_hash_pair<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    pair: &mut HashPair,
) -> VisitResult {
    cx.enter(NodeKind::HashPair, Some(&pair.loc));
    let result = visitor.visit_hash_pair(cx, pair);
    cx.exit();
    result
}

// ============================================================================
// Default Walks
// ============================================================================

/// Visit a program's body, rebuilding it from the handlers' answers.
pub fn walk_program<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    program: &mut Program,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    let body = mem::take(&mut program.body);
    let mut rebuilt = Vec::with_capacity(body.len());
    for mut statement in body {
        match accept_statement(visitor, cx, &mut statement)? {
            Action::Keep => rebuilt.push(statement),
            Action::Remove => {}
            Action::Replace(node) => rebuilt.push(node.into_statement().map_err(|other| {
                unexpected_return("body", parent, &other, Some(statement.loc()))
            })?),
        }
    }
    program.body = rebuilt;
    Ok(())
}

pub fn walk_mustache<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    mustache: &mut MustacheStatement,
) -> Result<(), VisitError> {
    required_expression(visitor, cx, "path", &mut mustache.path)?;
    walk_expressions(visitor, cx, "params", &mut mustache.params)?;
    optional_hash(visitor, cx, &mut mustache.hash)
}

pub fn walk_block<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    block: &mut BlockStatement,
) -> Result<(), VisitError> {
    required_expression(visitor, cx, "path", &mut block.path)?;
    walk_expressions(visitor, cx, "params", &mut block.params)?;
    optional_hash(visitor, cx, &mut block.hash)?;
    optional_program(visitor, cx, "program", &mut block.program)?;
    optional_program(visitor, cx, "inverse", &mut block.inverse)
}

pub fn walk_partial<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    partial: &mut PartialStatement,
) -> Result<(), VisitError> {
    required_expression(visitor, cx, "name", &mut partial.name)?;
    walk_expressions(visitor, cx, "params", &mut partial.params)?;
    optional_hash(visitor, cx, &mut partial.hash)
}

pub fn walk_partial_block<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    partial: &mut PartialBlockStatement,
) -> Result<(), VisitError> {
    required_expression(visitor, cx, "name", &mut partial.name)?;
    walk_expressions(visitor, cx, "params", &mut partial.params)?;
    optional_hash(visitor, cx, &mut partial.hash)?;
    required_program(visitor, cx, "program", &mut partial.program)
}

pub fn walk_sub_expression<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    sexpr: &mut SubExpression,
) -> Result<(), VisitError> {
    required_expression(visitor, cx, "path", &mut sexpr.path)?;
    walk_expressions(visitor, cx, "params", &mut sexpr.params)?;
    optional_hash(visitor, cx, &mut sexpr.hash)
}

/// Visit a list of expressions; removed elements drop out.
pub fn walk_expressions<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    field: &'static str,
    expressions: &mut Vec<Expression>,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    let items = mem::take(expressions);
    let mut rebuilt = Vec::with_capacity(items.len());
    for mut expression in items {
        match accept_expression(visitor, cx, &mut expression)? {
            Action::Keep => rebuilt.push(expression),
            Action::Remove => {}
            Action::Replace(node) => rebuilt.push(node.into_expression().map_err(|other| {
                unexpected_return(field, parent, &other, Some(expression.loc()))
            })?),
        }
    }
    *expressions = rebuilt;
    Ok(())
}

/// Visit a list of hash pairs; removed pairs drop out.
pub fn walk_hash_pairs<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    pairs: &mut Vec<HashPair>,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    let items = mem::take(pairs);
    let mut rebuilt = Vec::with_capacity(items.len());
    for mut pair in items {
        match accept_hash_pair(visitor, cx, &mut pair)? {
            Action::Keep => rebuilt.push(pair),
            Action::Remove => {}
            Action::Replace(node) => rebuilt.push(
                node.into_hash_pair()
                    .map_err(|other| unexpected_return("pairs", parent, &other, Some(&pair.loc)))?,
            ),
        }
    }
    *pairs = rebuilt;
    Ok(())
}

// ============================================================================
// Field Contracts
// ============================================================================

/// Visit an expression field that must stay present.
///
/// Returns [`Action::Keep`] so a handler can end with it directly.
pub fn required_expression<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    field: &'static str,
    slot: &mut Expression,
) -> VisitResult {
    let parent = cx.current_kind();
    match accept_expression(visitor, cx, slot)? {
        Action::Keep => {}
        Action::Remove => return Err(required_removed(field, parent, Some(slot.loc()))),
        Action::Replace(node) => {
            *slot = node
                .into_expression()
                .map_err(|other| unexpected_return(field, parent, &other, Some(slot.loc())))?;
        }
    }
    Ok(Action::Keep)
}

pub fn optional_hash<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    slot: &mut Option<Hash>,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    let Some(hash) = slot.as_mut() else {
        return Ok(());
    };
    match accept_hash(visitor, cx, hash)? {
        Action::Keep => {}
        Action::Remove => *slot = None,
        Action::Replace(node) => {
            let replacement = node
                .into_hash()
                .map_err(|other| unexpected_return("hash", parent, &other, Some(&hash.loc)))?;
            *slot = Some(replacement);
        }
    }
    Ok(())
}

pub fn optional_program<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    field: &'static str,
    slot: &mut Option<Program>,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    let Some(program) = slot.as_mut() else {
        return Ok(());
    };
    match accept_program(visitor, cx, program)? {
        Action::Keep => {}
        Action::Remove => *slot = None,
        Action::Replace(node) => {
            let replacement = node
                .into_program()
                .map_err(|other| unexpected_return(field, parent, &other, program.loc.as_ref()))?;
            *slot = Some(replacement);
        }
    }
    Ok(())
}

pub fn required_program<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    field: &'static str,
    slot: &mut Program,
) -> Result<(), VisitError> {
    let parent = cx.current_kind();
    match accept_program(visitor, cx, slot)? {
        Action::Keep => {}
        Action::Remove => return Err(required_removed(field, parent, slot.loc.as_ref())),
        Action::Replace(node) => {
            *slot = node
                .into_program()
                .map_err(|other| unexpected_return(field, parent, &other, slot.loc.as_ref()))?;
        }
    }
    Ok(())
}

fn required_removed(
    field: &'static str,
    parent: NodeKind,
    loc: Option<&SourceLocation>,
) -> VisitError {
    VisitError::RequiredChildRemoved {
        field,
        parent,
        loc: loc.cloned(),
    }
}

fn unexpected_return(
    field: &'static str,
    parent: NodeKind,
    found: &Node,
    loc: Option<&SourceLocation>,
) -> VisitError {
    VisitError::UnexpectedReturn {
        field,
        parent,
        found: found.kind(),
        loc: loc.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseOptions, ast::PathHead, parse_without_processing, print};

    fn tree(source: &str) -> Program {
        parse_without_processing(source, &ParseOptions::default()).unwrap()
    }

    struct RemoveComments;

    impl VisitorMut for RemoveComments {
        fn visit_comment(
            &mut self,
            _cx: &mut Ancestors,
            _comment: &mut CommentStatement,
        ) -> VisitResult {
            Ok(Action::Remove)
        }
    }

    #[test]
    fn test_removed_statements_drop_out() {
        let mut program = tree("a{{! one }}b{{#if x}}{{! two }}c{{/if}}");
        visit_mut(&mut RemoveComments, &mut program).unwrap();

        assert_eq!(program.body.len(), 3);
        let Statement::Block(block) = &program.body[2] else {
            panic!("expected block");
        };
        assert_eq!(block.program.as_ref().unwrap().body.len(), 1);
    }

    struct RemovePaths;

    impl VisitorMut for RemovePaths {
        fn visit_path(&mut self, _cx: &mut Ancestors, _path: &mut PathExpression) -> VisitResult {
            Ok(Action::Remove)
        }
    }

    #[test]
    fn test_removing_required_path_fails() {
        let mut program = tree("{{#foo}}x{{/foo}}");
        let path_loc = program_path_loc(&program);
        let err = visit_mut(&mut RemovePaths, &mut program).unwrap_err();

        assert_eq!(
            err,
            VisitError::RequiredChildRemoved {
                field: "path",
                parent: NodeKind::BlockStatement,
                loc: path_loc,
            }
        );
        assert_eq!(
            err.to_string(),
            "Visitor removed `path` (1:3) from BlockStatement, but `path` is required"
        );
    }

    fn program_path_loc(program: &Program) -> Option<SourceLocation> {
        match &program.body[0] {
            Statement::Block(block) => Some(block.path.loc().clone()),
            _ => None,
        }
    }

    #[test]
    fn test_removing_param_is_allowed() {
        struct RemoveStrings;
        impl VisitorMut for RemoveStrings {
            fn visit_string(
                &mut self,
                _cx: &mut Ancestors,
                _string: &mut StringLiteral,
            ) -> VisitResult {
                Ok(Action::Remove)
            }
        }

        let mut program = tree("{{foo \"a\" b \"c\"}}");
        visit_mut(&mut RemoveStrings, &mut program).unwrap();

        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected mustache");
        };
        assert_eq!(mustache.params.len(), 1);
        assert_eq!(mustache.params[0].kind(), NodeKind::PathExpression);
    }

    #[test]
    fn test_removing_hash_pair_value_fails() {
        struct RemoveNumbers;
        impl VisitorMut for RemoveNumbers {
            fn visit_number(
                &mut self,
                _cx: &mut Ancestors,
                _number: &mut NumberLiteral,
            ) -> VisitResult {
                Ok(Action::Remove)
            }
        }

        let mut program = tree("{{foo limit=3}}");
        let err = visit_mut(&mut RemoveNumbers, &mut program).unwrap_err();

        assert!(matches!(
            err,
            VisitError::RequiredChildRemoved {
                field: "value",
                parent: NodeKind::HashPair,
                ..
            }
        ));
    }

    #[test]
    fn test_replacement_of_wrong_family_fails() {
        struct ContentForPath;
        impl VisitorMut for ContentForPath {
            fn visit_path(
                &mut self,
                _cx: &mut Ancestors,
                path: &mut PathExpression,
            ) -> VisitResult {
                let content = ContentStatement::new("oops", path.loc.clone());
                Ok(Action::Replace(Statement::Content(content).into()))
            }
        }

        let mut program = tree("{{foo}}");
        let err = visit_mut(&mut ContentForPath, &mut program).unwrap_err();

        assert!(matches!(
            err,
            VisitError::UnexpectedReturn {
                field: "path",
                parent: NodeKind::MustacheStatement,
                found: NodeKind::ContentStatement,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Unexpected visitor return value (ContentStatement) when accepting path on MustacheStatement"
        );
    }

    #[test]
    fn test_replacement_is_installed() {
        struct Rename;
        impl VisitorMut for Rename {
            fn visit_path(
                &mut self,
                _cx: &mut Ancestors,
                path: &mut PathExpression,
            ) -> VisitResult {
                if path.original == "old" {
                    let mut renamed = path.clone();
                    renamed.original = "new".to_string();
                    renamed.head = Some(PathHead::Segment("new".to_string()));
                    return Ok(Action::Replace(Expression::Path(renamed).into()));
                }
                Ok(Action::Keep)
            }
        }

        let mut program = tree("{{old}} {{other}}");
        visit_mut(&mut Rename, &mut program).unwrap();

        assert_eq!(print(&program), "{{ p%new [] }}\nCONTENT[ ' ' ]\n{{ p%other [] }}\n");
    }

    #[test]
    fn test_removing_partial_block_program_fails() {
        struct RemoveNested;
        impl VisitorMut for RemoveNested {
            fn visit_program(&mut self, cx: &mut Ancestors, program: &mut Program) -> VisitResult {
                if cx.parent().is_some() {
                    return Ok(Action::Remove);
                }
                walk_program(self, cx, program)?;
                Ok(Action::Keep)
            }
        }

        let mut program = tree("{{#> layout}}x{{/layout}}");
        let err = visit_mut(&mut RemoveNested, &mut program).unwrap_err();
        assert!(matches!(
            err,
            VisitError::RequiredChildRemoved {
                field: "program",
                parent: NodeKind::PartialBlockStatement,
                ..
            }
        ));

        let mut program = tree("{{#if x}}y{{/if}}");
        visit_mut(&mut RemoveNested, &mut program).unwrap();
        let Statement::Block(block) = &program.body[0] else {
            panic!("expected block");
        };
        assert!(block.program.is_none());
    }

    #[test]
    fn test_removing_root_fails() {
        struct RemoveAll;
        impl VisitorMut for RemoveAll {
            fn visit_program(
                &mut self,
                _cx: &mut Ancestors,
                _program: &mut Program,
            ) -> VisitResult {
                Ok(Action::Remove)
            }
        }

        let mut program = tree("x");
        let err = visit_mut(&mut RemoveAll, &mut program).unwrap_err();
        assert!(matches!(err, VisitError::RequiredChildRemoved { field: "root", .. }));
    }

    #[test]
    fn test_visit_error_converts_to_diagnostic() {
        let mut program = tree("{{#foo}}x{{/foo}}");
        let err = visit_mut(&mut RemovePaths, &mut program).unwrap_err();
        let diag = Diagnostic::from(err);

        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert_eq!(
            diag.to_string(),
            "error[E300]: Visitor removed `path` (1:3) from BlockStatement, but `path` is required - 1:3"
        );
    }
}
