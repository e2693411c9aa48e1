//! Syntax tree for templates.
//!
//! Every node is owned by its parent: a [`Program`] owns its statements,
//! call-shaped nodes own their path, params and hash. Nodes carry a
//! [`SourceLocation`]; only an empty [`Program`] has none.

use std::fmt;

use crate::span::SourceLocation;

/// Discriminant naming every node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    MustacheStatement,
    Decorator,
    BlockStatement,
    DecoratorBlock,
    PartialStatement,
    PartialBlockStatement,
    ContentStatement,
    CommentStatement,
    PathExpression,
    SubExpression,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    UndefinedLiteral,
    NullLiteral,
    ArrayLiteral,
    HashLiteral,
    Hash,
    HashPair,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::MustacheStatement => "MustacheStatement",
            NodeKind::Decorator => "Decorator",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::DecoratorBlock => "DecoratorBlock",
            NodeKind::PartialStatement => "PartialStatement",
            NodeKind::PartialBlockStatement => "PartialBlockStatement",
            NodeKind::ContentStatement => "ContentStatement",
            NodeKind::CommentStatement => "CommentStatement",
            NodeKind::PathExpression => "PathExpression",
            NodeKind::SubExpression => "SubExpression",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::NumberLiteral => "NumberLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
            NodeKind::UndefinedLiteral => "UndefinedLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::ArrayLiteral => "ArrayLiteral",
            NodeKind::HashLiteral => "HashLiteral",
            NodeKind::Hash => "Hash",
            NodeKind::HashPair => "HashPair",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tag whitespace trimming flags.
///
/// `open` and `close` record explicit `~` markers. The standalone flags are
/// candidacy bits consumed by the whitespace normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StripFlags {
    pub open: bool,
    pub close: bool,
    pub open_standalone: bool,
    pub close_standalone: bool,
    pub inline_standalone: bool,
}

impl StripFlags {
    pub fn new(open: bool, close: bool) -> Self {
        Self {
            open,
            close,
            ..Self::default()
        }
    }
}

/// An ordered list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
    pub block_params: Option<Vec<String>>,
    /// Set on the synthetic program wrapping an `{{else if}}` continuation.
    pub chained: bool,
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Mustache(MustacheStatement),
    Decorator(MustacheStatement),
    Block(BlockStatement),
    DecoratorBlock(BlockStatement),
    Partial(PartialStatement),
    PartialBlock(PartialBlockStatement),
    Content(ContentStatement),
    Comment(CommentStatement),
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::Mustache(_) => NodeKind::MustacheStatement,
            Statement::Decorator(_) => NodeKind::Decorator,
            Statement::Block(_) => NodeKind::BlockStatement,
            Statement::DecoratorBlock(_) => NodeKind::DecoratorBlock,
            Statement::Partial(_) => NodeKind::PartialStatement,
            Statement::PartialBlock(_) => NodeKind::PartialBlockStatement,
            Statement::Content(_) => NodeKind::ContentStatement,
            Statement::Comment(_) => NodeKind::CommentStatement,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Statement::Mustache(node) | Statement::Decorator(node) => &node.loc,
            Statement::Block(node) | Statement::DecoratorBlock(node) => &node.loc,
            Statement::Partial(node) => &node.loc,
            Statement::PartialBlock(node) => &node.loc,
            Statement::Content(node) => &node.loc,
            Statement::Comment(node) => &node.loc,
        }
    }

    pub fn as_content(&self) -> Option<&ContentStatement> {
        match self {
            Statement::Content(content) => Some(content),
            _ => None,
        }
    }
}

/// `{{path params hash}}`, also the shape of an inline decorator.
#[derive(Debug, Clone, PartialEq)]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// False for `{{{ }}}` and `{{& }}`.
    pub escaped: bool,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

/// `{{#path}}program{{else}}inverse{{/path}}`, also the shape of a
/// decorator block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub program: Option<Program>,
    pub inverse: Option<Program>,
    pub open_strip: StripFlags,
    pub inverse_strip: StripFlags,
    pub close_strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// Indentation preceding a standalone partial, replayed by renderers.
    pub indent: String,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialBlockStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub program: Program,
    pub open_strip: StripFlags,
    pub close_strip: StripFlags,
    pub loc: SourceLocation,
}

/// Literal template text.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStatement {
    /// Current text, possibly trimmed.
    pub value: String,
    /// Text as written in the source.
    pub original: String,
    /// Trailing whitespace has been trimmed.
    pub left_stripped: bool,
    /// Leading whitespace has been trimmed.
    pub right_stripped: bool,
    pub loc: SourceLocation,
}

impl ContentStatement {
    pub fn new(text: impl Into<String>, loc: SourceLocation) -> Self {
        let original = text.into();
        Self {
            value: original.clone(),
            original,
            left_stripped: false,
            right_stripped: false,
            loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentStatement {
    pub value: String,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Path(PathExpression),
    SubExpression(SubExpression),
    String(StringLiteral),
    Number(NumberLiteral),
    Boolean(BooleanLiteral),
    Undefined(UndefinedLiteral),
    Null(NullLiteral),
    Array(ArrayLiteral),
    Hash(HashLiteral),
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expression::Path(_) => NodeKind::PathExpression,
            Expression::SubExpression(_) => NodeKind::SubExpression,
            Expression::String(_) => NodeKind::StringLiteral,
            Expression::Number(_) => NodeKind::NumberLiteral,
            Expression::Boolean(_) => NodeKind::BooleanLiteral,
            Expression::Undefined(_) => NodeKind::UndefinedLiteral,
            Expression::Null(_) => NodeKind::NullLiteral,
            Expression::Array(_) => NodeKind::ArrayLiteral,
            Expression::Hash(_) => NodeKind::HashLiteral,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Expression::Path(node) => &node.loc,
            Expression::SubExpression(node) => &node.loc,
            Expression::String(node) => &node.loc,
            Expression::Number(node) => &node.loc,
            Expression::Boolean(node) => &node.loc,
            Expression::Undefined(node) => &node.loc,
            Expression::Null(node) => &node.loc,
            Expression::Array(node) => &node.loc,
            Expression::Hash(node) => &node.loc,
        }
    }

    pub fn as_path(&self) -> Option<&PathExpression> {
        match self {
            Expression::Path(path) => Some(path),
            _ => None,
        }
    }

    /// The source spelling of the expression, where it has one.
    pub fn original(&self) -> Option<&str> {
        match self {
            Expression::Path(node) => Some(&node.original),
            Expression::SubExpression(node) => Some(&node.original),
            Expression::String(node) => Some(&node.original),
            Expression::Number(node) => Some(&node.original),
            Expression::Boolean(node) => Some(&node.original),
            Expression::Undefined(_) => Some("undefined"),
            Expression::Null(_) => Some("null"),
            Expression::Array(_) | Expression::Hash(_) => None,
        }
    }
}

/// The head of a path: a plain segment or, for `(helper).segment`
/// paths, the sub-expression whose result is traversed.
#[derive(Debug, Clone, PartialEq)]
pub enum PathHead {
    Segment(String),
    SubExpression(Box<SubExpression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// `@`-prefixed data reference.
    pub data: bool,
    /// Written with an explicit `this.` prefix.
    pub this: bool,
    /// Number of leading `..` segments.
    pub depth: usize,
    pub head: Option<PathHead>,
    pub tail: Vec<String>,
    pub original: String,
    pub loc: SourceLocation,
}

impl PathExpression {
    /// The segment head followed by the tail. A sub-expression head is not
    /// a segment and is skipped.
    pub fn parts(&self) -> Vec<&str> {
        let head = match &self.head {
            Some(PathHead::Segment(head)) => Some(head.as_str()),
            _ => None,
        };
        head.into_iter()
            .chain(self.tail.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// Source text of the whole `( ... )` group.
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndefinedLiteral {
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteral {
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub items: Vec<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteral {
    pub pairs: Vec<HashPair>,
    pub loc: SourceLocation,
}

/// Named arguments of a call, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    pub loc: SourceLocation,
}

/// Shared shape of nodes that invoke a helper, partial or decorator: a head
/// expression with positional params and an optional hash.
pub trait CallNode {
    fn head(&self) -> &Expression;
    fn params(&self) -> &[Expression];
    fn hash(&self) -> Option<&Hash>;
}

macro_rules! impl_call_node {
    ($ty:ty, $head:ident) => {
        impl CallNode for $ty {
            fn head(&self) -> &Expression {
                &self.$head
            }

            fn params(&self) -> &[Expression] {
                &self.params
            }

            fn hash(&self) -> Option<&Hash> {
                self.hash.as_ref()
            }
        }
    };
}

impl_call_node!(MustacheStatement, path);
impl_call_node!(BlockStatement, path);
impl_call_node!(SubExpression, path);
impl_call_node!(PartialStatement, name);
impl_call_node!(PartialBlockStatement, name);

/// Any node, owned. Mutating visitors hand these back to replace the node
/// they were given.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Program),
    Statement(Statement),
    Expression(Expression),
    Hash(Hash),
    HashPair(HashPair),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program(_) => NodeKind::Program,
            Node::Statement(statement) => statement.kind(),
            Node::Expression(expression) => expression.kind(),
            Node::Hash(_) => NodeKind::Hash,
            Node::HashPair(_) => NodeKind::HashPair,
        }
    }

    pub fn into_program(self) -> Result<Program, Node> {
        match self {
            Node::Program(program) => Ok(program),
            other => Err(other),
        }
    }

    pub fn into_statement(self) -> Result<Statement, Node> {
        match self {
            Node::Statement(statement) => Ok(statement),
            other => Err(other),
        }
    }

    pub fn into_expression(self) -> Result<Expression, Node> {
        match self {
            Node::Expression(expression) => Ok(expression),
            other => Err(other),
        }
    }

    pub fn into_hash(self) -> Result<Hash, Node> {
        match self {
            Node::Hash(hash) => Ok(hash),
            other => Err(other),
        }
    }

    pub fn into_hash_pair(self) -> Result<HashPair, Node> {
        match self {
            Node::HashPair(pair) => Ok(pair),
            other => Err(other),
        }
    }
}

impl From<Program> for Node {
    fn from(program: Program) -> Self {
        Node::Program(program)
    }
}

impl From<Statement> for Node {
    fn from(statement: Statement) -> Self {
        Node::Statement(statement)
    }
}

impl From<Expression> for Node {
    fn from(expression: Expression) -> Self {
        Node::Expression(expression)
    }
}

impl From<Hash> for Node {
    fn from(hash: Hash) -> Self {
        Node::Hash(hash)
    }
}

impl From<HashPair> for Node {
    fn from(pair: HashPair) -> Self {
        Node::HashPair(pair)
    }
}
