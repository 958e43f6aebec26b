use std::fmt;

use tracing::trace;

use crate::error::{ErrorRecord, ParseCompletion};
use crate::parser::Expr;
use crate::source::{Cursor, Pos, Position, Source};

/// A recognized production: an id chosen by the grammar, the source span
/// it covers, and the productions recognized inside it.
///
/// Children are ordered by their begin position, never overlap, and lie
/// fully inside the parent's span. Content is not stored; ask the
/// [`ParseContext`] that produced the match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<I, P> {
    id: I,
    begin: P,
    end: P,
    children: Vec<Match<I, P>>,
}

impl<I, P: Position> Match<I, P> {
    pub(crate) fn new(id: I, begin: P, end: P, children: Vec<Match<I, P>>) -> Self {
        Match {
            id,
            begin,
            end,
            children,
        }
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn begin(&self) -> P {
        self.begin
    }

    pub fn end(&self) -> P {
        self.end
    }

    pub fn children(&self) -> &[Match<I, P>] {
        &self.children
    }
}

/// An O(1) capture of the parse state, sufficient to back out of a
/// failed alternative: the cursor plus the match-list length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct State<P> {
    pos: P,
    match_count: usize,
}

impl<P: Position> State<P> {
    pub fn pos(&self) -> P {
        self.pos
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }
}

/// A capture of the error list length, restored when a sequence that
/// recorded a recoverable error fails after all.
#[derive(Debug, Copy, Clone)]
pub struct ErrorState {
    count: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum LrPhase {
    Seed,
    Grow,
}

/// Bookkeeping for one active rule invocation. Frames are pushed at rule
/// entry and popped at rule exit; re-entry of the owning rule at the
/// frame's start position is what left recursion looks like at runtime.
pub(crate) struct LrFrame<I, P> {
    rule: usize,
    start: P,
    phase: LrPhase,
    /// Seed evaluation rejected a re-entry, so the rule is left
    /// recursive at this position and growing is worthwhile.
    recursed: bool,
    /// The current grow iteration replayed the best match.
    reentered: bool,
    best_end: P,
    best_matches: Vec<Match<I, P>>,
}

impl<I, P: Position> LrFrame<I, P> {
    fn new(rule: usize, start: P) -> Self {
        LrFrame {
            rule,
            start,
            phase: LrPhase::Seed,
            recursed: false,
            reentered: false,
            best_end: start,
            best_matches: Vec::new(),
        }
    }
}

/// All mutable state of one parse: the cursor, the committed matches,
/// the active rule frames, and the recoverable errors.
///
/// A context is built per parse and surrendered to the caller when the
/// parse finishes; dropping it drops every match. The source must
/// outlive the context.
pub struct ParseContext<'s, S: Source + ?Sized, I = &'static str, P: Cursor<S> = Pos> {
    source: &'s S,
    pos: P,
    matches: Vec<Match<I, P>>,
    lr: Vec<LrFrame<I, P>>,
    errors: Vec<ErrorRecord<P>>,
    committed_errors: usize,
    depth: usize,
    max_depth: usize,
}

impl<'s, S, I, P> ParseContext<'s, S, I, P>
where
    S: Source + ?Sized,
    P: Cursor<S>,
{
    pub fn new(source: &'s S) -> Self {
        ParseContext {
            source,
            pos: P::start(),
            matches: Vec::new(),
            lr: Vec::new(),
            errors: Vec::new(),
            committed_errors: 0,
            depth: 0,
            max_depth: usize::MAX,
        }
    }

    /// Caps rule-invocation depth. Exceeding the cap makes the offending
    /// rule fail instead of overflowing the stack.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn source(&self) -> &'s S {
        self.source
    }

    pub fn position(&self) -> P {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.source.elem_at(self.pos.offset()).is_none()
    }

    /// The element under the cursor, if any.
    pub fn peek(&self) -> Option<S::Elem> {
        self.source.elem_at(self.pos.offset()).map(|(e, _)| e)
    }

    /// Moves the cursor past the current element.
    pub fn bump(&mut self) {
        self.pos = self.pos.advanced(self.source);
    }

    pub(crate) fn set_position(&mut self, pos: P) {
        self.pos = pos;
    }

    pub fn state(&self) -> State<P> {
        State {
            pos: self.pos,
            match_count: self.matches.len(),
        }
    }

    /// Rolls the context back to a snapshot. This is the only way
    /// tentative work is abandoned; every compound expression restores
    /// its entry state when it fails.
    pub fn restore(&mut self, state: State<P>) {
        self.pos = state.pos;
        self.matches.truncate(state.match_count);
    }

    pub fn matches(&self) -> &[Match<I, P>] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<Match<I, P>> {
        self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Appends a childless match.
    pub fn add_match(&mut self, id: I, begin: P, end: P) {
        self.matches.push(Match::new(id, begin, end, Vec::new()));
    }

    /// Appends a match that adopts every match recorded since `from`.
    pub fn add_tree_match(&mut self, id: I, begin: P, end: P, from: usize) {
        let children = self.matches.split_off(from.min(self.matches.len()));
        self.matches.push(Match::new(id, begin, end, children));
    }

    pub fn truncate_matches(&mut self, len: usize) {
        self.matches.truncate(len);
    }

    pub(crate) fn clone_matches_from(&self, from: usize) -> Vec<Match<I, P>>
    where
        I: Clone,
    {
        self.matches[from..].to_vec()
    }

    pub(crate) fn extend_matches(&mut self, extra: Vec<Match<I, P>>) {
        self.matches.extend(extra);
    }

    /// The recoverable errors recorded so far, in commit order.
    pub fn errors(&self) -> &[ErrorRecord<P>] {
        &self.errors
    }

    pub fn error_state(&self) -> ErrorState {
        ErrorState {
            count: self.errors.len(),
        }
    }

    /// Drops uncommitted errors recorded after the snapshot.
    pub fn restore_errors(&mut self, state: ErrorState) {
        self.errors
            .truncate(state.count.max(self.committed_errors));
    }

    /// Records a recoverable error. While an error is pending, only a
    /// failure further into the input replaces it; nearer failures are
    /// noise from alternatives that were going to backtrack anyway.
    pub fn record_error(&mut self, position: P, expected: String) {
        trace!(offset = position.offset(), %expected, "recoverable parse error");
        if self.errors.len() > self.committed_errors {
            if let Some(last) = self.errors.last_mut() {
                if position > last.position() {
                    *last = ErrorRecord::new(position, expected);
                }
            }
        } else {
            self.errors.push(ErrorRecord::new(position, expected));
        }
    }

    /// Marks every recorded error as kept, even if the enclosing
    /// expression later fails.
    pub fn commit_errors(&mut self) {
        self.committed_errors = self.errors.len();
    }

    /// Whether the parse stopped at the end of the input.
    pub fn completion(&self) -> ParseCompletion {
        if self.at_end() {
            ParseCompletion::Complete
        } else {
            ParseCompletion::Incomplete(self.pos.offset())
        }
    }

    /// The source text covered by a match.
    pub fn content(&self, m: &Match<I, P>) -> &'s S::Slice {
        self.source.slice(m.begin().offset(), m.end().offset())
    }

    // Rule frame plumbing. Frames are addressed by index because a rule
    // body can push and pop nested frames while an outer frame is live.

    pub(crate) fn lr_push(&mut self, rule: usize, start: P) -> usize {
        self.lr.push(LrFrame::new(rule, start));
        self.lr.len() - 1
    }

    pub(crate) fn lr_pop(&mut self) {
        self.lr.pop();
    }

    pub(crate) fn lr_find(&self, rule: usize, at: P) -> Option<usize> {
        self.lr
            .iter()
            .rposition(|f| f.rule == rule && f.start == at)
    }

    pub(crate) fn lr_grow_frame_at(&self, at: P) -> Option<usize> {
        self.lr
            .iter()
            .rposition(|f| f.phase == LrPhase::Grow && f.start == at)
    }

    pub(crate) fn lr_phase(&self, frame: usize) -> LrPhase {
        self.lr[frame].phase
    }

    pub(crate) fn lr_mark_recursed(&mut self, frame: usize) {
        self.lr[frame].recursed = true;
    }

    pub(crate) fn lr_recursed(&self, frame: usize) -> bool {
        self.lr[frame].recursed
    }

    pub(crate) fn lr_reentered(&self, frame: usize) -> bool {
        self.lr[frame].reentered
    }

    pub(crate) fn lr_set_reentered(&mut self, frame: usize, value: bool) {
        self.lr[frame].reentered = value;
    }

    pub(crate) fn lr_begin_grow(&mut self, frame: usize, best_end: P, best_matches: Vec<Match<I, P>>) {
        let f = &mut self.lr[frame];
        f.phase = LrPhase::Grow;
        f.reentered = false;
        f.best_end = best_end;
        f.best_matches = best_matches;
    }

    pub(crate) fn lr_best(&self, frame: usize) -> (P, Vec<Match<I, P>>)
    where
        I: Clone,
    {
        let f = &self.lr[frame];
        (f.best_end, f.best_matches.clone())
    }

    pub(crate) fn enter_rule(&mut self) -> bool {
        if self.depth >= self.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_rule(&mut self) {
        self.depth -= 1;
    }
}

impl<'s, S, I, P> ParseContext<'s, S, I, P>
where
    S: Source + ?Sized,
    I: Clone + fmt::Debug,
    P: Cursor<S>,
{
    /// Runs an expression from the current position.
    ///
    /// On `true` the cursor sits past everything the expression
    /// consumed and any recorded matches are in [`matches`](Self::matches).
    /// On `false` the cursor and match list are exactly as before the
    /// call.
    pub fn parse(&mut self, expr: &Expr<S::Elem, I>) -> bool {
        expr.parse(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Position as _;

    fn ctx(input: &str) -> ParseContext<'_, str> {
        ParseContext::new(input)
    }

    #[test]
    fn restore_resets_cursor_and_matches() {
        let mut c = ctx("abc");
        let state = c.state();
        c.bump();
        let begin = state.pos();
        c.add_match("a", begin, c.position());
        assert_eq!(c.match_count(), 1);
        c.restore(state);
        assert_eq!(c.position().offset(), 0);
        assert_eq!(c.match_count(), 0);
    }

    #[test]
    fn tree_match_adopts_tail() {
        let mut c = ctx("ab");
        let p0 = c.position();
        c.bump();
        let p1 = c.position();
        c.add_match("x", p0, p1);
        c.bump();
        let p2 = c.position();
        c.add_match("y", p1, p2);
        c.add_tree_match("pair", p0, p2, 0);
        assert_eq!(c.match_count(), 1);
        let m = &c.matches()[0];
        assert_eq!(*m.id(), "pair");
        assert_eq!(m.children().len(), 2);
        assert_eq!(*m.children()[0].id(), "x");
        assert_eq!(c.content(m), "ab");
    }

    #[test]
    fn pending_error_keeps_furthest_position() {
        let mut c = ctx("abcdef");
        let near = c.position();
        c.bump();
        c.bump();
        let far = c.position();
        c.record_error(near, "first".into());
        c.record_error(near, "nearer again".into());
        c.record_error(far, "further".into());
        assert_eq!(c.errors().len(), 1);
        assert_eq!(c.errors()[0].expected(), "further");

        // committed errors survive a rollback of the error state
        let saved = c.error_state();
        c.commit_errors();
        c.record_error(far, "pending".into());
        c.restore_errors(saved);
        assert_eq!(c.errors().len(), 1);
        assert_eq!(c.errors()[0].expected(), "further");
    }

    #[test]
    fn completion_reports_leftover_offset() {
        let mut c = ctx("ab");
        assert_eq!(c.completion(), ParseCompletion::Incomplete(0));
        c.bump();
        c.bump();
        assert_eq!(c.completion(), ParseCompletion::Complete);
    }

    #[test]
    fn peek_does_not_advance() {
        let c = ctx("z");
        assert_eq!(c.peek(), Some('z'));
        assert_eq!(c.position().offset(), 0);
    }
}
