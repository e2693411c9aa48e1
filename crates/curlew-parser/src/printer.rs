//! Debug rendering of a syntax tree.
//!
//! [`print`] renders one line per statement, indented two spaces per
//! nesting level. Expressions render inline: `p%` paths, `n%` numbers,
//! `b%` booleans, quoted strings, and call nodes as
//! `head [params] HASH{key=value}`.

use std::mem;

use crate::{
    ast::{
        ArrayLiteral, BlockStatement, BooleanLiteral, CallNode, CommentStatement, ContentStatement,
        Expression, Hash, HashLiteral, HashPair, MustacheStatement, NullLiteral, NumberLiteral,
        PartialBlockStatement, PartialStatement, PathExpression, PathHead, Program, StringLiteral,
        SubExpression, UndefinedLiteral,
    },
    visit::{
        self, Ancestors, Visitor, accept_expression, accept_hash, accept_hash_pair, accept_program,
    },
};

/// Render `program` in the debug format.
pub fn print(program: &Program) -> String {
    let mut printer = Printer::default();
    visit::visit(&mut printer, program);
    printer.out
}

#[derive(Debug, Default)]
struct Printer {
    out: String,
    padding: usize,
    /// Text of the expression being rendered.
    inline: String,
}

impl Printer {
    fn padded(&self, line: &str) -> String {
        format!("{}{line}\n", "  ".repeat(self.padding))
    }

    fn pad(&mut self, line: &str) {
        let line = self.padded(line);
        self.out.push_str(&line);
    }

    /// Run `f` against an empty inline buffer and return what it wrote.
    fn capture(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let saved = mem::take(&mut self.inline);
        f(self);
        mem::replace(&mut self.inline, saved)
    }

    fn render(&mut self, cx: &mut Ancestors, expression: &Expression) -> String {
        self.capture(|printer| accept_expression(printer, cx, expression))
    }

    fn render_hash(&mut self, cx: &mut Ancestors, hash: &Hash) -> String {
        self.capture(|printer| accept_hash(printer, cx, hash))
    }

    fn render_pairs(&mut self, cx: &mut Ancestors, pairs: &[HashPair]) -> String {
        let pairs: Vec<String> = pairs
            .iter()
            .map(|pair| self.capture(|printer| accept_hash_pair(printer, cx, pair)))
            .collect();
        format!("HASH{{{}}}", pairs.join(" "))
    }

    fn call_node(&mut self, cx: &mut Ancestors, node: &impl CallNode) -> String {
        let head = self.render(cx, node.head());
        let params: Vec<String> = node
            .params()
            .iter()
            .map(|param| self.render(cx, param))
            .collect();
        let hash = match node.hash() {
            Some(hash) => format!(" {}", self.render_hash(cx, hash)),
            None => String::new(),
        };
        format!("{head} [{}]{hash}", params.join(", "))
    }

    /// Name, first param and hash of a partial.
    fn partial_header(&mut self, cx: &mut Ancestors, node: &impl CallNode) -> String {
        let mut content = node.head().original().unwrap_or_default().to_string();
        if let Some(param) = node.params().first() {
            content.push(' ');
            content.push_str(&self.render(cx, param));
        }
        if let Some(hash) = node.hash() {
            content.push(' ');
            content.push_str(&self.render_hash(cx, hash));
        }
        content
    }

    fn nested(&mut self, cx: &mut Ancestors, program: &Program) {
        self.padding += 1;
        accept_program(self, cx, program);
        self.padding -= 1;
    }

    fn block(&mut self, cx: &mut Ancestors, block: &BlockStatement, directive: bool) {
        self.pad(if directive { "DIRECTIVE BLOCK:" } else { "BLOCK:" });
        self.padding += 1;

        let call = self.call_node(cx, block);
        self.pad(&call);
        if let Some(program) = &block.program {
            self.pad("PROGRAM:");
            self.nested(cx, program);
        }
        if let Some(inverse) = &block.inverse {
            self.pad("{{^}}");
            self.nested(cx, inverse);
        }

        self.padding -= 1;
    }
}

impl Visitor for Printer {
    fn visit_program(&mut self, cx: &mut Ancestors, program: &Program) {
        if let Some(params) = &program.block_params {
            let names: String = params.iter().map(|name| format!(" {name}")).collect();
            self.pad(&format!("BLOCK PARAMS: [{names} ]"));
        }
        visit::walk_program(self, cx, program);
    }

    fn visit_mustache(&mut self, cx: &mut Ancestors, mustache: &MustacheStatement) {
        let call = self.call_node(cx, mustache);
        self.pad(&format!("{{{{ {call} }}}}"));
    }

    fn visit_decorator(&mut self, cx: &mut Ancestors, decorator: &MustacheStatement) {
        let call = self.call_node(cx, decorator);
        self.pad(&format!("{{{{ DIRECTIVE {call} }}}}"));
    }

    fn visit_block(&mut self, cx: &mut Ancestors, block: &BlockStatement) {
        self.block(cx, block, false);
    }

    fn visit_decorator_block(&mut self, cx: &mut Ancestors, block: &BlockStatement) {
        self.block(cx, block, true);
    }

    fn visit_partial(&mut self, cx: &mut Ancestors, partial: &PartialStatement) {
        let header = self.partial_header(cx, partial);
        self.pad(&format!("{{{{> PARTIAL:{header} }}}}"));
    }

    /// The program is rendered inside the partial's own line.
    fn visit_partial_block(&mut self, cx: &mut Ancestors, partial: &PartialBlockStatement) {
        let header = self.partial_header(cx, partial);
        let program_line = self.padded("PROGRAM:");

        let saved = mem::take(&mut self.out);
        self.nested(cx, &partial.program);
        let body = mem::replace(&mut self.out, saved);

        self.pad(&format!("{{{{> PARTIAL BLOCK:{header} {program_line}{body} }}}}"));
    }

    fn visit_content(&mut self, _cx: &mut Ancestors, content: &ContentStatement) {
        self.pad(&format!("CONTENT[ '{}' ]", content.value));
    }

    fn visit_comment(&mut self, _cx: &mut Ancestors, comment: &CommentStatement) {
        self.pad(&format!("{{{{! '{}' }}}}", comment.value));
    }

    fn visit_sub_expression(&mut self, cx: &mut Ancestors, sexpr: &SubExpression) {
        let call = self.call_node(cx, sexpr);
        self.inline.push_str(&call);
    }

    fn visit_path(&mut self, cx: &mut Ancestors, path: &PathExpression) {
        let head = match &path.head {
            Some(PathHead::Segment(segment)) => segment.clone(),
            Some(PathHead::SubExpression(sexpr)) => format!("[{}]", self.call_node(cx, &**sexpr)),
            None => String::new(),
        };
        let prefix = if path.data {
            "@"
        } else if path.this {
            "this."
        } else {
            ""
        };

        let mut parts = vec![head];
        parts.extend(path.tail.iter().cloned());
        self.inline.push_str(&format!("p%{prefix}{}", parts.join("/")));
    }

    fn visit_string(&mut self, _cx: &mut Ancestors, string: &StringLiteral) {
        self.inline.push_str(&format!("\"{}\"", string.value));
    }

    fn visit_number(&mut self, _cx: &mut Ancestors, number: &NumberLiteral) {
        self.inline.push_str(&format!("n%{}", number.value));
    }

    fn visit_boolean(&mut self, _cx: &mut Ancestors, boolean: &BooleanLiteral) {
        self.inline.push_str(&format!("b%{}", boolean.value));
    }

    fn visit_undefined(&mut self, _cx: &mut Ancestors, _undefined: &UndefinedLiteral) {
        self.inline.push_str("UNDEFINED");
    }

    fn visit_null(&mut self, _cx: &mut Ancestors, _null: &NullLiteral) {
        self.inline.push_str("NULL");
    }

    fn visit_array_literal(&mut self, cx: &mut Ancestors, array: &ArrayLiteral) {
        let items: Vec<String> = array.items.iter().map(|item| self.render(cx, item)).collect();
        self.inline.push_str(&format!("ARRAY[{}]", items.join(", ")));
    }

    fn visit_hash_literal(&mut self, cx: &mut Ancestors, hash: &HashLiteral) {
        let rendered = self.render_pairs(cx, &hash.pairs);
        self.inline.push_str(&rendered);
    }

    fn visit_hash(&mut self, cx: &mut Ancestors, hash: &Hash) {
        let rendered = self.render_pairs(cx, &hash.pairs);
        self.inline.push_str(&rendered);
    }

    fn visit_hash_pair(&mut self, cx: &mut Ancestors, pair: &HashPair) {
        let value = self.render(cx, &pair.value);
        self.inline.push_str(&format!("{}={value}", pair.key));
    }
}
