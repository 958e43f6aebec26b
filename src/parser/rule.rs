//! Named recursion points and the left-recursion resolver.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::context::{LrPhase, ParseContext};
use crate::parser::Expr;
use crate::source::{Cursor, Position, Source};

struct RuleInner<E, I> {
    name: String,
    body: RefCell<Option<Expr<E, I>>>,
}

/// A named recursion carrier.
///
/// A rule is created empty, given a body with [`set`](Rule::set), and
/// referenced from expressions (its own body included) through
/// [`expr`](Rule::expr). Clones share identity: the engine recognizes a
/// rule by the allocation behind it, which is what makes re-entry
/// detectable.
///
/// A rule whose body mentions itself keeps itself alive through the
/// resulting reference cycle and is never reclaimed. Grammars are meant
/// to be built once and reused.
///
/// ```
/// use sprout::prelude::*;
///
/// let list = Rule::new("list");
/// list.set(terminal('x') >> optional(terminal(',') >> list.expr()));
///
/// let mut ctx = ParseContext::<str>::new("x,x,x");
/// assert!(ctx.parse(&list.expr()));
/// assert_eq!(ctx.completion(), ParseCompletion::Complete);
/// ```
pub struct Rule<E, I = &'static str> {
    inner: Rc<RuleInner<E, I>>,
}

impl<E, I> Rule<E, I> {
    pub fn new(name: impl Into<String>) -> Self {
        Rule {
            inner: Rc::new(RuleInner {
                name: name.into(),
                body: RefCell::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Installs or replaces the rule body.
    pub fn set(&self, body: Expr<E, I>) {
        *self.inner.body.borrow_mut() = Some(body);
    }

    /// An expression invoking this rule.
    pub fn expr(&self) -> Expr<E, I> {
        Expr::Rule(self.clone())
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}

impl<E, I> Clone for Rule<E, I> {
    fn clone(&self) -> Self {
        Rule {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E, I> fmt::Debug for Rule<E, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.inner.name).finish()
    }
}

impl<E, I> Rule<E, I>
where
    E: Clone + PartialEq + PartialOrd + fmt::Debug,
    I: Clone + fmt::Debug,
{
    /// Evaluates the rule at the current position.
    ///
    /// Plain invocations just run the body inside a fresh frame. What
    /// the frame buys is re-entry handling: if the body comes back to
    /// this rule at the same position, the first pass (seed) rejects the
    /// re-entry so a recursion-free alternative can produce a first
    /// match, and the following passes (grow) replay the best match so
    /// far in its place, extending it until a pass stops gaining input.
    pub(crate) fn parse<S, P>(&self, ctx: &mut ParseContext<'_, S, I, P>) -> bool
    where
        S: Source<Elem = E> + ?Sized,
        P: Cursor<S>,
    {
        let at = ctx.position();

        if let Some(frame) = ctx.lr_find(self.id(), at) {
            return match ctx.lr_phase(frame) {
                LrPhase::Seed => {
                    ctx.lr_mark_recursed(frame);
                    trace!(
                        rule = self.name(),
                        offset = at.offset(),
                        "left-recursive re-entry rejected while seeding"
                    );
                    false
                }
                LrPhase::Grow => {
                    let (best_end, replay) = ctx.lr_best(frame);
                    ctx.extend_matches(replay);
                    ctx.set_position(best_end);
                    ctx.lr_set_reentered(frame, true);
                    trace!(
                        rule = self.name(),
                        offset = best_end.offset(),
                        "left-recursive re-entry replayed best match"
                    );
                    true
                }
            };
        }

        if !ctx.enter_rule() {
            warn!(rule = self.name(), "recursion depth limit reached");
            return false;
        }

        let body_cell = self.inner.body.borrow();
        let body = match body_cell.as_ref() {
            Some(body) => body,
            None => panic!("rule `{}` was used before its body was set", self.name()),
        };

        let state = ctx.state();
        let frame = ctx.lr_push(self.id(), at);
        trace!(rule = self.name(), offset = at.offset(), "rule entered");

        if !body.parse(ctx) {
            ctx.lr_pop();
            ctx.restore(state);
            ctx.leave_rule();
            return false;
        }

        if !ctx.lr_recursed(frame) {
            ctx.lr_pop();
            ctx.leave_rule();
            return true;
        }

        // The seed pass matched a recursion-free prefix. Re-run the body
        // from the start, letting the re-entry stand for the best match
        // so far; each pass that ends strictly further becomes the new
        // best, and the first pass that does not ends the loop.
        let origin = state.match_count();
        let mut best_end = ctx.position();
        let mut best = ctx.clone_matches_from(origin);
        trace!(
            rule = self.name(),
            end = best_end.offset(),
            "seed matched, growing"
        );
        loop {
            ctx.truncate_matches(origin);
            ctx.set_position(at);
            ctx.lr_begin_grow(frame, best_end, best.clone());

            let matched = body.parse(ctx);
            if matched && ctx.lr_reentered(frame) && ctx.position() > best_end {
                best_end = ctx.position();
                best = ctx.clone_matches_from(origin);
                trace!(
                    rule = self.name(),
                    end = best_end.offset(),
                    "grew left-recursive match"
                );
            } else {
                break;
            }
        }

        ctx.lr_pop();
        ctx.truncate_matches(origin);
        ctx.extend_matches(best);
        ctx.set_position(best_end);
        ctx.leave_rule();
        trace!(
            rule = self.name(),
            end = best_end.offset(),
            "rule matched"
        );
        true
    }
}
