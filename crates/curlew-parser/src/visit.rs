//! Read-only traversal of the syntax tree.
//!
//! A [`Visitor`] overrides the `visit_*` methods for the node shapes it
//! cares about. Every default method walks the node's children in a fixed
//! order through the matching `walk_*` function, so an override that still
//! wants the children visited calls that function itself.
//!
//! Traversal is pre-order. Before a handler runs, the node is pushed onto
//! the [`Ancestors`] stack handed to every handler, and popped after it
//! returns.

use crate::{
    ast::{
        ArrayLiteral, BlockStatement, BooleanLiteral, CommentStatement, ContentStatement,
        Expression, Hash, HashLiteral, HashPair, MustacheStatement, NodeKind, NullLiteral,
        NumberLiteral, PartialBlockStatement, PartialStatement, PathExpression, Program, Statement,
        StringLiteral, SubExpression, UndefinedLiteral,
    },
    span::SourceLocation,
};

/// One entry of the ancestor stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    kind: NodeKind,
    loc: Option<SourceLocation>,
}

impl Frame {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn loc(&self) -> Option<&SourceLocation> {
        self.loc.as_ref()
    }
}

/// The chain of nodes enclosing the one being visited.
///
/// Owned by a single traversal; nodes never point back at their parents.
#[derive(Debug, Clone, Default)]
pub struct Ancestors {
    frames: Vec<Frame>,
}

impl Ancestors {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node whose handler is running.
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// The direct parent of the current node.
    pub fn parent(&self) -> Option<&Frame> {
        self.parents().next()
    }

    /// Enclosing nodes, nearest first, excluding the current one.
    pub fn parents(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev().skip(1)
    }

    /// Number of nodes on the stack, the current one included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn enter(&mut self, kind: NodeKind, loc: Option<&SourceLocation>) {
        self.frames.push(Frame {
            kind,
            loc: loc.cloned(),
        });
    }

    pub(crate) fn exit(&mut self) {
        self.frames.pop();
    }

    /// Kind of the current node; `Program` outside of any handler.
    pub(crate) fn current_kind(&self) -> NodeKind {
        self.current().map_or(NodeKind::Program, Frame::kind)
    }
}

/// Visit a whole tree, starting from its root program.
pub fn visit<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    let mut ancestors = Ancestors::new();
    accept_program(visitor, &mut ancestors, program);
}

/// Read-only handlers, one per node shape.
pub trait Visitor {
    fn visit_program(&mut self, cx: &mut Ancestors, program: &Program) {
        walk_program(self, cx, program);
    }

    fn visit_mustache(&mut self, cx: &mut Ancestors, mustache: &MustacheStatement) {
        walk_mustache(self, cx, mustache);
    }

    fn visit_decorator(&mut self, cx: &mut Ancestors, decorator: &MustacheStatement) {
        walk_mustache(self, cx, decorator);
    }

    fn visit_block(&mut self, cx: &mut Ancestors, block: &BlockStatement) {
        walk_block(self, cx, block);
    }

    fn visit_decorator_block(&mut self, cx: &mut Ancestors, block: &BlockStatement) {
        walk_block(self, cx, block);
    }

    fn visit_partial(&mut self, cx: &mut Ancestors, partial: &PartialStatement) {
        walk_partial(self, cx, partial);
    }

    fn visit_partial_block(&mut self, cx: &mut Ancestors, partial: &PartialBlockStatement) {
        walk_partial_block(self, cx, partial);
    }

    fn visit_content(&mut self, _cx: &mut Ancestors, _content: &ContentStatement) {}

    fn visit_comment(&mut self, _cx: &mut Ancestors, _comment: &CommentStatement) {}

    fn visit_sub_expression(&mut self, cx: &mut Ancestors, sexpr: &SubExpression) {
        walk_sub_expression(self, cx, sexpr);
    }

    fn visit_path(&mut self, _cx: &mut Ancestors, _path: &PathExpression) {}

    fn visit_string(&mut self, _cx: &mut Ancestors, _string: &StringLiteral) {}

    fn visit_number(&mut self, _cx: &mut Ancestors, _number: &NumberLiteral) {}

    fn visit_boolean(&mut self, _cx: &mut Ancestors, _boolean: &BooleanLiteral) {}

    fn visit_undefined(&mut self, _cx: &mut Ancestors, _undefined: &UndefinedLiteral) {}

    fn visit_null(&mut self, _cx: &mut Ancestors, _null: &NullLiteral) {}

    fn visit_array_literal(&mut self, cx: &mut Ancestors, array: &ArrayLiteral) {
        walk_expressions(self, cx, &array.items);
    }

    fn visit_hash_literal(&mut self, cx: &mut Ancestors, hash: &HashLiteral) {
        walk_hash_pairs(self, cx, &hash.pairs);
    }

    fn visit_hash(&mut self, cx: &mut Ancestors, hash: &Hash) {
        walk_hash_pairs(self, cx, &hash.pairs);
    }

    fn visit_hash_pair(&mut self, cx: &mut Ancestors, pair: &HashPair) {
        accept_expression(self, cx, &pair.value);
    }
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn accept_program<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut Ancestors, program: &Program) {
    cx.enter(NodeKind::Program, program.loc.as_ref());
    visitor.visit_program(cx, program);
    cx.exit();
}

pub fn accept_statement<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    statement: &Statement,
) {
    cx.enter(statement.kind(), Some(statement.loc()));
    match statement {
        Statement::Mustache(node) => visitor.visit_mustache(cx, node),
        Statement::Decorator(node) => visitor.visit_decorator(cx, node),
        Statement::Block(node) => visitor.visit_block(cx, node),
        Statement::DecoratorBlock(node) => visitor.visit_decorator_block(cx, node),
        Statement::Partial(node) => visitor.visit_partial(cx, node),
        Statement::PartialBlock(node) => visitor.visit_partial_block(cx, node),
        Statement::Content(node) => visitor.visit_content(cx, node),
        Statement::Comment(node) => visitor.visit_comment(cx, node),
    }
    cx.exit();
}

pub fn accept_expression<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    expression: &Expression,
) {
    cx.enter(expression.kind(), Some(expression.loc()));
    match expression {
        Expression::Path(node) => visitor.visit_path(cx, node),
        Expression::SubExpression(node) => visitor.visit_sub_expression(cx, node),
        Expression::String(node) => visitor.visit_string(cx, node),
        Expression::Number(node) => visitor.visit_number(cx, node),
        Expression::Boolean(node) => visitor.visit_boolean(cx, node),
        Expression::Undefined(node) => visitor.visit_undefined(cx, node),
        Expression::Null(node) => visitor.visit_null(cx, node),
        Expression::Array(node) => visitor.visit_array_literal(cx, node),
        Expression::Hash(node) => visitor.visit_hash_literal(cx, node),
    }
    cx.exit();
}

pub fn accept_hash<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut Ancestors, hash: &Hash) {
    cx.enter(NodeKind::Hash, Some(&hash.loc));
    visitor.visit_hash(cx, hash);
    cx.exit();
}

pub fn accept_hash_pair<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut Ancestors, pair: &HashPair) {
    cx.enter(NodeKind::HashPair, Some(&pair.loc));
    visitor.visit_hash_pair(cx, pair);
    cx.exit();
}

// ============================================================================
// Default Walks
// ============================================================================

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut Ancestors, program: &Program) {
    for statement in &program.body {
        accept_statement(visitor, cx, statement);
    }
}

/// Path, then params, then hash.
pub fn walk_mustache<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    mustache: &MustacheStatement,
) {
    walk_call(visitor, cx, &mustache.path, &mustache.params, mustache.hash.as_ref());
}

/// Path, params, hash, then program and inverse.
pub fn walk_block<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    block: &BlockStatement,
) {
    walk_call(visitor, cx, &block.path, &block.params, block.hash.as_ref());
    if let Some(program) = &block.program {
        accept_program(visitor, cx, program);
    }
    if let Some(inverse) = &block.inverse {
        accept_program(visitor, cx, inverse);
    }
}

pub fn walk_partial<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    partial: &PartialStatement,
) {
    walk_call(visitor, cx, &partial.name, &partial.params, partial.hash.as_ref());
}

pub fn walk_partial_block<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    partial: &PartialBlockStatement,
) {
    walk_call(visitor, cx, &partial.name, &partial.params, partial.hash.as_ref());
    accept_program(visitor, cx, &partial.program);
}

pub fn walk_sub_expression<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    sexpr: &SubExpression,
) {
    walk_call(visitor, cx, &sexpr.path, &sexpr.params, sexpr.hash.as_ref());
}

pub fn walk_expressions<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    expressions: &[Expression],
) {
    for expression in expressions {
        accept_expression(visitor, cx, expression);
    }
}

pub fn walk_hash_pairs<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    pairs: &[HashPair],
) {
    for pair in pairs {
        accept_hash_pair(visitor, cx, pair);
    }
}

fn walk_call<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Ancestors,
    head: &Expression,
    params: &[Expression],
    hash: Option<&Hash>,
) {
    accept_expression(visitor, cx, head);
    walk_expressions(visitor, cx, params);
    if let Some(hash) = hash {
        accept_hash(visitor, cx, hash);
    }
}
