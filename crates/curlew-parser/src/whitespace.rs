//! Standalone-tag and `~` whitespace trimming.
//!
//! [`WhitespaceControl`] walks a freshly built tree once. For every tag in a
//! program body it decides, from the content on either side, whether the tag
//! sits alone on its line, and trims the surrounding [`ContentStatement`]s
//! accordingly. Explicit `~` markers are applied first and greedily;
//! standalone trimming removes at most one line's worth of padding per edge.
//!
//! Block tags are normalized inside-out: a block's program and inverse are
//! processed before the block's own standalone candidacy is reported to the
//! enclosing program.
//!
//! Every trimmed edge is recorded on the content node, so running the pass
//! again over a normalized tree changes nothing.

use log::trace;

use crate::{
    ast::{ContentStatement, Program, Statement, StripFlags},
    visit::Ancestors,
    visit_mut::{self, Action, VisitError, VisitResult, VisitorMut},
};

/// The whitespace normalization pass.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceControl {
    ignore_standalone: bool,
    root_seen: bool,
}

impl WhitespaceControl {
    /// With `ignore_standalone` set only explicit `~` trimming is applied.
    pub fn new(ignore_standalone: bool) -> Self {
        Self {
            ignore_standalone,
            root_seen: false,
        }
    }

    /// Normalize a whole tree in place.
    pub fn normalize(&mut self, program: &mut Program) -> Result<(), VisitError> {
        visit_mut::visit_mut(self, program)
    }

    /// The strip flags a statement reports to its program, or `None` for
    /// content, which never affects its neighbors.
    fn statement_strip(
        &mut self,
        cx: &mut Ancestors,
        statement: &mut Statement,
    ) -> Result<Option<StripFlags>, VisitError> {
        cx.enter(statement.kind(), Some(statement.loc()));
        let strip = match statement {
            Statement::Mustache(node) | Statement::Decorator(node) => Ok(Some(node.strip)),
            Statement::Partial(node) => Ok(Some(inline_strip(node.strip))),
            Statement::Comment(node) => Ok(Some(inline_strip(node.strip))),
            Statement::Block(block) | Statement::DecoratorBlock(block) => self
                .block_strip(
                    cx,
                    block.program.as_mut(),
                    block.inverse.as_mut(),
                    BlockStrips {
                        open: block.open_strip,
                        inverse: block.inverse_strip,
                        close: block.close_strip,
                    },
                )
                .map(Some),
            Statement::PartialBlock(partial) => self
                .block_strip(
                    cx,
                    Some(&mut partial.program),
                    None,
                    BlockStrips {
                        open: partial.open_strip,
                        inverse: StripFlags::default(),
                        close: partial.close_strip,
                    },
                )
                .map(Some),
            Statement::Content(_) => Ok(None),
        };
        cx.exit();
        strip
    }

    /// Normalize a block's bodies, trim around its inner tags and report
    /// its standalone candidacy.
    fn block_strip(
        &mut self,
        cx: &mut Ancestors,
        mut program: Option<&mut Program>,
        mut inverse: Option<&mut Program>,
        strips: BlockStrips,
    ) -> Result<StripFlags, VisitError> {
        if let Some(program) = program.as_deref_mut() {
            visit_mut::accept_program(self, cx, program)?;
        }
        if let Some(inverse) = inverse.as_deref_mut() {
            visit_mut::accept_program(self, cx, inverse)?;
        }

        // The body next to the open tag, and the else section if both exist.
        let (program, mut inverse) = match (program, inverse) {
            (Some(program), inverse) => (program, inverse),
            (None, Some(inverse)) => (inverse, None),
            (None, None) => return Ok(StripFlags::new(strips.open.open, strips.close.close)),
        };

        let close_body = match inverse.as_deref_mut().and_then(first_inverse) {
            Some(first) => &first.body,
            None => &program.body,
        };
        let strip = StripFlags {
            open: strips.open.open,
            close: strips.close.close,
            open_standalone: is_next_whitespace(&program.body, None, false),
            close_standalone: is_prev_whitespace(close_body, None, false),
            inline_standalone: false,
        };

        if strips.open.close {
            omit_right(&mut program.body, None, true);
        }

        match inverse {
            Some(inverse) => {
                if strips.inverse.open {
                    omit_left(&mut program.body, None, true);
                }
                if strips.inverse.close {
                    if let Some(first) = first_inverse(inverse) {
                        omit_right(&mut first.body, None, true);
                    }
                }
                if strips.close.open {
                    if let Some(last) = last_inverse(inverse) {
                        omit_left(&mut last.body, None, true);
                    }
                }

                // An else tag alone on its line.
                if !self.ignore_standalone
                    && is_prev_whitespace(&program.body, None, false)
                    && first_inverse(inverse)
                        .is_some_and(|first| is_next_whitespace(&first.body, None, false))
                {
                    omit_left(&mut program.body, None, false);
                    if let Some(first) = first_inverse(inverse) {
                        omit_right(&mut first.body, None, false);
                    }
                }
            }
            None if strips.close.open => {
                omit_left(&mut program.body, None, true);
            }
            None => {}
        }

        Ok(strip)
    }
}

impl VisitorMut for WhitespaceControl {
    fn visit_program(&mut self, cx: &mut Ancestors, program: &mut Program) -> VisitResult {
        let is_root = !self.root_seen;
        self.root_seen = true;

        let body = &mut program.body;
        for i in 0..body.len() {
            let Some(strip) = self.statement_strip(cx, &mut body[i])? else {
                continue;
            };

            let prev_whitespace = is_prev_whitespace(body, Some(i), is_root);
            let next_whitespace = is_next_whitespace(body, Some(i), is_root);
            let open_standalone = strip.open_standalone && prev_whitespace;
            let close_standalone = strip.close_standalone && next_whitespace;
            let inline_standalone = strip.inline_standalone && prev_whitespace && next_whitespace;

            trace!(
                kind = body[i].kind().as_str(),
                open_standalone,
                close_standalone,
                inline_standalone;
                "Standalone candidacy",
            );

            if strip.close {
                omit_right(body, Some(i), true);
            }
            if strip.open {
                omit_left(body, Some(i), true);
            }

            if self.ignore_standalone {
                continue;
            }

            if inline_standalone {
                omit_right(body, Some(i), false);
                if omit_left(body, Some(i), false) {
                    let indent = match &body[i - 1] {
                        Statement::Content(prev) => trailing_blanks(&prev.original).to_string(),
                        _ => String::new(),
                    };
                    if let Statement::Partial(partial) = &mut body[i] {
                        partial.indent = indent;
                    }
                }
            }
            if open_standalone {
                if let Some(inner) = opening_body(&mut body[i]) {
                    omit_right(inner, None, false);
                }
                omit_left(body, Some(i), false);
            }
            if close_standalone {
                omit_right(body, Some(i), false);
                if let Some(inner) = closing_body(&mut body[i]) {
                    omit_left(inner, None, false);
                }
            }
        }

        Ok(Action::Keep)
    }
}

#[derive(Debug, Clone, Copy)]
struct BlockStrips {
    open: StripFlags,
    inverse: StripFlags,
    close: StripFlags,
}

/// Partials and comments may stand alone on a line.
fn inline_strip(strip: StripFlags) -> StripFlags {
    StripFlags {
        inline_standalone: true,
        ..StripFlags::new(strip.open, strip.close)
    }
}

/// The first program of an else chain.
fn first_inverse(inverse: &mut Program) -> Option<&mut Program> {
    if !inverse.chained {
        return Some(inverse);
    }
    match inverse.body.first_mut() {
        Some(Statement::Block(block) | Statement::DecoratorBlock(block)) => block.program.as_mut(),
        _ => None,
    }
}

/// Walk an else chain through each link's last block.
fn last_inverse(inverse: &mut Program) -> Option<&mut Program> {
    let mut current = inverse;
    while current.chained {
        match current.body.last_mut() {
            Some(Statement::Block(block) | Statement::DecoratorBlock(block)) => {
                current = block.program.as_mut()?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// The body right after a block's open tag.
fn opening_body(statement: &mut Statement) -> Option<&mut Vec<Statement>> {
    match statement {
        Statement::Block(block) | Statement::DecoratorBlock(block) => block
            .program
            .as_mut()
            .or(block.inverse.as_mut())
            .map(|program| &mut program.body),
        Statement::PartialBlock(partial) => Some(&mut partial.program.body),
        _ => None,
    }
}

/// The body right before a block's close tag.
fn closing_body(statement: &mut Statement) -> Option<&mut Vec<Statement>> {
    match statement {
        Statement::Block(block) | Statement::DecoratorBlock(block) => block
            .inverse
            .as_mut()
            .or(block.program.as_mut())
            .map(|program| &mut program.body),
        Statement::PartialBlock(partial) => Some(&mut partial.program.body),
        _ => None,
    }
}

fn trailing_whitespace(text: &str) -> &str {
    &text[text.trim_end().len()..]
}

fn leading_whitespace(text: &str) -> &str {
    &text[..text.len() - text.trim_start().len()]
}

fn trailing_blanks(text: &str) -> &str {
    &text[text.trim_end_matches([' ', '\t']).len()..]
}

/// Whether the statement before `i` (or the last statement, for `None`)
/// ends its line.
///
/// A missing neighbor counts only at the root. Content at the very start
/// of the root may also be entirely blank.
fn is_prev_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let i = i.unwrap_or(body.len());
    let Some(prev) = i.checked_sub(1).and_then(|index| body.get(index)) else {
        return is_root;
    };
    let Statement::Content(prev) = prev else {
        return false;
    };

    let trailing = trailing_whitespace(&prev.original);
    let has_sibling = i >= 2;
    if has_sibling || !is_root {
        trailing.contains('\n')
    } else {
        trailing.len() == prev.original.len() || trailing.contains('\n')
    }
}

/// Whether the statement after `i` (or the first statement, for `None`)
/// starts a new line.
fn is_next_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let index = i.map_or(0, |i| i + 1);
    let Some(next) = body.get(index) else {
        return is_root;
    };
    let Statement::Content(next) = next else {
        return false;
    };

    let leading = leading_whitespace(&next.original);
    let has_sibling = body.get(index + 1).is_some();
    if has_sibling || !is_root {
        leading.contains('\n')
    } else {
        leading.len() == next.original.len() || leading.contains('\n')
    }
}

/// Trim the start of the content after `i` (or the first statement, for
/// `None`).
///
/// With `multiple` all leading whitespace goes; otherwise blanks up to and
/// including one line break, and only once per node.
fn omit_right(body: &mut [Statement], i: Option<usize>, multiple: bool) {
    let index = i.map_or(0, |i| i + 1);
    let Some(Statement::Content(current)) = body.get_mut(index) else {
        return;
    };
    if !multiple && current.right_stripped {
        return;
    }

    let stripped = if multiple {
        current.value.trim_start()
    } else {
        strip_line_start(&current.value)
    };
    let changed = stripped.len() != current.value.len();
    if changed {
        current.value = stripped.to_string();
    }
    current.right_stripped |= changed;
}

/// Trim the end of the content before `i` (or the last statement, for
/// `None`). Returns whether anything was removed.
///
/// With `multiple` all trailing whitespace goes; otherwise trailing spaces
/// and tabs, and only once per node.
fn omit_left(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = match i {
        Some(i) => i.checked_sub(1),
        None => body.len().checked_sub(1),
    };
    let Some(Statement::Content(current)) = index.and_then(|index| body.get_mut(index)) else {
        return false;
    };
    if !multiple && current.left_stripped {
        return false;
    }

    trim_content_end(current, multiple)
}

fn trim_content_end(current: &mut ContentStatement, multiple: bool) -> bool {
    let stripped = if multiple {
        current.value.trim_end()
    } else {
        current.value.trim_end_matches([' ', '\t'])
    };
    let changed = stripped.len() != current.value.len();
    if changed {
        current.value = stripped.to_string();
    }
    current.left_stripped |= changed;
    changed
}

/// Remove leading spaces and tabs plus at most one line break.
fn strip_line_start(text: &str) -> &str {
    let rest = text.trim_start_matches([' ', '\t']);
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n').unwrap_or(rest)
}
