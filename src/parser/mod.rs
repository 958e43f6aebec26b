//! The parse expression algebra.
//!
//! Grammars are trees of [`Expr`] values, built from the constructor
//! functions here (or the operator sugar in [`ops`](self::ops)) and
//! evaluated against a [`ParseContext`]. Every expression follows one
//! contract: on success the cursor has moved past what was consumed and
//! matches may have been recorded; on failure the context is exactly as
//! it was before the attempt.

pub mod ops;
pub mod rule;

use std::fmt;

use tracing::trace;

use crate::context::ParseContext;
use crate::source::{Cursor, Position, Source};

use self::rule::Rule;

/// A parse expression over elements `E`, recording matches tagged `I`.
///
/// Expressions are plain values: build once, clone cheaply, reuse across
/// inputs and position strategies.
#[derive(Debug, Clone)]
pub enum Expr<E, I = &'static str> {
    /// One element, by equality.
    Terminal(E),
    /// A fixed run of elements, all or nothing.
    TerminalStr(Vec<E>),
    /// One element inside an inclusive range.
    Range(E, E),
    /// One element out of a set.
    Set(Vec<E>),
    /// Any one element.
    Any,
    /// End of input; consumes nothing.
    Eoi,
    /// Every child in order.
    Seq(Vec<Expr<E, I>>),
    /// The first child that matches, in declaration order.
    Choice(Vec<Expr<E, I>>),
    ZeroOrMore(Box<Expr<E, I>>),
    OneOrMore(Box<Expr<E, I>>),
    /// Between `min` and `max` repetitions; unbounded when `max` is `None`.
    Repeat {
        expr: Box<Expr<E, I>>,
        min: usize,
        max: Option<usize>,
    },
    Optional(Box<Expr<E, I>>),
    /// Lookahead: would the inner expression match here?
    And(Box<Expr<E, I>>),
    /// Negative lookahead.
    Not(Box<Expr<E, I>>),
    /// Left operand, provided the right would not match here.
    Diff(Box<Expr<E, I>>, Box<Expr<E, I>>),
    /// Record a childless match over whatever the inner expression consumes.
    Flat(Box<Expr<E, I>>, I),
    /// Record a match adopting the inner expression's matches as children.
    Tree(Box<Expr<E, I>>, I),
    /// A resynchronization anchor for the enclosing sequence.
    Resume(Box<Expr<E, I>>),
    /// A named recursion point.
    Rule(Rule<E, I>),
}

pub fn terminal<E, I>(value: E) -> Expr<E, I> {
    Expr::Terminal(value)
}

/// The characters of `s`, in order, all or nothing.
pub fn terminal_str<I>(s: &str) -> Expr<char, I> {
    Expr::TerminalStr(s.chars().collect())
}

/// Like [`terminal_str`] for arbitrary element types.
pub fn terminal_seq<E, I>(elems: impl IntoIterator<Item = E>) -> Expr<E, I> {
    Expr::TerminalStr(elems.into_iter().collect())
}

pub fn terminal_range<E, I>(lo: E, hi: E) -> Expr<E, I> {
    Expr::Range(lo, hi)
}

pub fn terminal_set<E, I>(values: impl IntoIterator<Item = E>) -> Expr<E, I> {
    Expr::Set(values.into_iter().collect())
}

pub fn any<E, I>() -> Expr<E, I> {
    Expr::Any
}

pub fn eoi<E, I>() -> Expr<E, I> {
    Expr::Eoi
}

/// A sequence of expressions. Nested sequences are flattened.
pub fn sequence<E, I>(children: Vec<Expr<E, I>>) -> Expr<E, I> {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Expr::Seq(kids) => flat.extend(kids),
            other => flat.push(other),
        }
    }
    Expr::Seq(flat)
}

/// An ordered choice. Nested choices are flattened.
pub fn choice<E, I>(children: Vec<Expr<E, I>>) -> Expr<E, I> {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Expr::Choice(kids) => flat.extend(kids),
            other => flat.push(other),
        }
    }
    Expr::Choice(flat)
}

pub fn zero_or_more<E, I>(expr: Expr<E, I>) -> Expr<E, I> {
    Expr::ZeroOrMore(Box::new(expr))
}

pub fn one_or_more<E, I>(expr: Expr<E, I>) -> Expr<E, I> {
    Expr::OneOrMore(Box::new(expr))
}

pub fn repeat<E, I>(expr: Expr<E, I>, min: usize, max: Option<usize>) -> Expr<E, I> {
    Expr::Repeat {
        expr: Box::new(expr),
        min,
        max,
    }
}

pub fn optional<E, I>(expr: Expr<E, I>) -> Expr<E, I> {
    Expr::Optional(Box::new(expr))
}

pub fn and_pred<E, I>(expr: Expr<E, I>) -> Expr<E, I> {
    Expr::And(Box::new(expr))
}

pub fn not_pred<E, I>(expr: Expr<E, I>) -> Expr<E, I> {
    Expr::Not(Box::new(expr))
}

pub fn difference<E, I>(keep: Expr<E, I>, minus: Expr<E, I>) -> Expr<E, I> {
    Expr::Diff(Box::new(keep), Box::new(minus))
}

pub fn match_flat<E, I>(expr: Expr<E, I>, id: I) -> Expr<E, I> {
    Expr::Flat(Box::new(expr), id)
}

pub fn match_tree<E, I>(expr: Expr<E, I>, id: I) -> Expr<E, I> {
    Expr::Tree(Box::new(expr), id)
}

/// Marks `anchor` as a resume point for the sequence it appears in.
pub fn error_resume<E, I>(anchor: Expr<E, I>) -> Expr<E, I> {
    Expr::Resume(Box::new(anchor))
}

impl<E, I> Expr<E, I> {
    /// Record a childless match over this expression's span.
    pub fn flat(self, id: I) -> Self {
        Expr::Flat(Box::new(self), id)
    }

    /// Record a match adopting this expression's matches as children.
    pub fn tree(self, id: I) -> Self {
        Expr::Tree(Box::new(self), id)
    }
}

impl<E: fmt::Debug, I> Expr<E, I> {
    /// A short human description, used in recoverable error records.
    pub fn describe(&self) -> String {
        match self {
            Expr::Terminal(v) => format!("{:?}", v),
            Expr::TerminalStr(vs) => vs
                .iter()
                .map(|v| format!("{:?}", v))
                .collect::<Vec<_>>()
                .join(" "),
            Expr::Range(lo, hi) => format!("{:?}..={:?}", lo, hi),
            Expr::Set(vs) => format!("one of {:?}", vs),
            Expr::Any => "any element".to_string(),
            Expr::Eoi => "end of input".to_string(),
            Expr::Seq(kids) => match kids.first() {
                Some(first) => first.describe(),
                None => "nothing".to_string(),
            },
            Expr::Choice(kids) => kids
                .iter()
                .map(|k| k.describe())
                .collect::<Vec<_>>()
                .join(" or "),
            Expr::ZeroOrMore(e) | Expr::OneOrMore(e) => e.describe(),
            Expr::Repeat { expr, .. } => expr.describe(),
            Expr::Optional(e) => e.describe(),
            Expr::And(e) => e.describe(),
            Expr::Not(e) => format!("not {}", e.describe()),
            Expr::Diff(keep, _) => keep.describe(),
            Expr::Flat(e, _) | Expr::Tree(e, _) => e.describe(),
            Expr::Resume(e) => e.describe(),
            Expr::Rule(r) => r.name().to_string(),
        }
    }
}

impl<E, I> Expr<E, I>
where
    E: Clone + PartialEq + PartialOrd + fmt::Debug,
    I: Clone + fmt::Debug,
{
    pub(crate) fn parse<S, P>(&self, ctx: &mut ParseContext<'_, S, I, P>) -> bool
    where
        S: Source<Elem = E> + ?Sized,
        P: Cursor<S>,
    {
        match self {
            Expr::Terminal(want) => match ctx.peek() {
                Some(e) if P::elem_eq(&e, want) => {
                    ctx.bump();
                    true
                }
                _ => false,
            },

            Expr::TerminalStr(want) => {
                let state = ctx.state();
                for w in want {
                    match ctx.peek() {
                        Some(e) if P::elem_eq(&e, w) => ctx.bump(),
                        _ => {
                            ctx.restore(state);
                            return false;
                        }
                    }
                }
                true
            }

            Expr::Range(lo, hi) => match ctx.peek() {
                Some(e) if P::elem_in_range(&e, lo, hi) => {
                    ctx.bump();
                    true
                }
                _ => false,
            },

            Expr::Set(values) => match ctx.peek() {
                Some(e) if values.iter().any(|w| P::elem_eq(&e, w)) => {
                    ctx.bump();
                    true
                }
                _ => false,
            },

            Expr::Any => match ctx.peek() {
                Some(_) => {
                    ctx.bump();
                    true
                }
                None => false,
            },

            Expr::Eoi => ctx.at_end(),

            Expr::Seq(kids) => self::parse_seq(kids, ctx),

            Expr::Choice(kids) => self::parse_choice(kids, ctx),

            Expr::ZeroOrMore(e) => {
                loop {
                    let before = ctx.position();
                    if !e.parse(ctx) {
                        break;
                    }
                    if ctx.position() == before {
                        break;
                    }
                }
                true
            }

            Expr::OneOrMore(e) => {
                let before = ctx.position();
                if !e.parse(ctx) {
                    return false;
                }
                if ctx.position() == before {
                    return true;
                }
                loop {
                    let before = ctx.position();
                    if !e.parse(ctx) {
                        break;
                    }
                    if ctx.position() == before {
                        break;
                    }
                }
                true
            }

            Expr::Repeat { expr, min, max } => {
                let state = ctx.state();
                let mut count = 0usize;
                loop {
                    if let Some(max) = max {
                        if count == *max {
                            break;
                        }
                    }
                    let before = ctx.position();
                    if !expr.parse(ctx) {
                        break;
                    }
                    count += 1;
                    if ctx.position() == before {
                        break;
                    }
                }
                if count >= *min {
                    true
                } else {
                    ctx.restore(state);
                    false
                }
            }

            Expr::Optional(e) => {
                let state = ctx.state();
                if !e.parse(ctx) {
                    ctx.restore(state);
                }
                true
            }

            Expr::And(e) => {
                let state = ctx.state();
                let matched = e.parse(ctx);
                ctx.restore(state);
                matched
            }

            Expr::Not(e) => {
                let state = ctx.state();
                let matched = e.parse(ctx);
                ctx.restore(state);
                !matched
            }

            Expr::Diff(keep, minus) => {
                let state = ctx.state();
                if minus.parse(ctx) {
                    ctx.restore(state);
                    return false;
                }
                ctx.restore(state);
                keep.parse(ctx)
            }

            Expr::Flat(e, id) => {
                let state = ctx.state();
                if !e.parse(ctx) {
                    return false;
                }
                ctx.truncate_matches(state.match_count());
                ctx.add_match(id.clone(), state.pos(), ctx.position());
                true
            }

            Expr::Tree(e, id) => {
                let state = ctx.state();
                if !e.parse(ctx) {
                    return false;
                }
                ctx.add_tree_match(id.clone(), state.pos(), ctx.position(), state.match_count());
                true
            }

            // Standalone, a resume point is transparent; sequences give
            // it its recovery meaning.
            Expr::Resume(anchor) => anchor.parse(ctx),

            Expr::Rule(rule) => rule.parse(ctx),
        }
    }
}

fn parse_seq<E, I, S, P>(kids: &[Expr<E, I>], ctx: &mut ParseContext<'_, S, I, P>) -> bool
where
    E: Clone + PartialEq + PartialOrd + fmt::Debug,
    I: Clone + fmt::Debug,
    S: Source<Elem = E> + ?Sized,
    P: Cursor<S>,
{
    let state = ctx.state();
    let err_state = ctx.error_state();
    let mut idx = 0;
    while idx < kids.len() {
        if kids[idx].parse(ctx) {
            idx += 1;
            continue;
        }

        // A failing element is fatal unless a resume point lies ahead.
        let resume_rel = kids[idx..]
            .iter()
            .position(|k| matches!(k, Expr::Resume(_)));
        let resume_idx = match resume_rel {
            Some(rel) => idx + rel,
            None => {
                ctx.restore(state);
                ctx.restore_errors(err_state);
                return false;
            }
        };
        let anchor = match &kids[resume_idx] {
            Expr::Resume(anchor) => anchor,
            _ => unreachable!(),
        };

        ctx.record_error(ctx.position(), kids[idx].describe());

        // Skip elements until the anchor parses. A missing anchor is
        // tolerated at end of input when nothing follows the resume
        // point (the unterminated-literal case); otherwise the whole
        // sequence fails.
        loop {
            if anchor.parse(ctx) {
                trace!(offset = ctx.position().offset(), "resumed at anchor");
                ctx.commit_errors();
                break;
            }
            if ctx.at_end() {
                if resume_idx + 1 == kids.len() {
                    trace!("anchor missing at end of input, tolerated");
                    ctx.commit_errors();
                    break;
                }
                ctx.restore(state);
                ctx.restore_errors(err_state);
                return false;
            }
            ctx.bump();
        }
        idx = resume_idx + 1;
    }
    true
}

fn parse_choice<E, I, S, P>(kids: &[Expr<E, I>], ctx: &mut ParseContext<'_, S, I, P>) -> bool
where
    E: Clone + PartialEq + PartialOrd + fmt::Debug,
    I: Clone + fmt::Debug,
    S: Source<Elem = E> + ?Sized,
    P: Cursor<S>,
{
    let at = ctx.position();
    match ctx.lr_grow_frame_at(at) {
        None => {
            for kid in kids {
                let state = ctx.state();
                if kid.parse(ctx) {
                    return true;
                }
                ctx.restore(state);
            }
            false
        }
        // A rule is growing a left-recursive match from this exact
        // position. Alternatives that succeed without consuming the
        // pending recursion cannot extend the match and are passed over.
        Some(frame) => {
            let entry_flag = ctx.lr_reentered(frame);
            for kid in kids {
                let state = ctx.state();
                ctx.lr_set_reentered(frame, false);
                if kid.parse(ctx) {
                    if entry_flag || ctx.lr_reentered(frame) {
                        ctx.lr_set_reentered(frame, true);
                        return true;
                    }
                    ctx.restore(state);
                } else {
                    ctx.restore(state);
                }
            }
            ctx.lr_set_reentered(frame, entry_flag);
            false
        }
    }
}
