//! Parser combinators with match recording, error recovery, and direct
//! left recursion.
//!
//! A grammar is a tree of [`Expr`] values built from small constructors
//! and operator sugar, applied to an input through a [`ParseContext`].
//! Expressions either consume input and record [`Match`]es, or fail and
//! leave the context untouched, so alternatives backtrack for free.
//! [`Rule`]s add named recursion points, and a rule whose body starts
//! with itself is handled rather than rejected: the engine first parses
//! a recursion-free seed, then regrows the match as many times as the
//! input allows.
//!
//! ```
//! use sprout::prelude::*;
//!
//! // expr := expr '+' num | num
//! let expr = Rule::new("expr");
//! let num = one_or_more(terminal_range('0', '9')).flat("num");
//! expr.set((expr.expr() >> terminal('+') >> num.clone()).tree("sum") | num);
//!
//! let mut ctx = ParseContext::<str>::new("1+2+3");
//! assert!(ctx.parse(&expr.expr()));
//! assert_eq!(ctx.completion(), ParseCompletion::Complete);
//!
//! // the match tree leans left, the way '+' associates
//! let root = &ctx.matches()[0];
//! assert_eq!(*root.id(), "sum");
//! assert_eq!(ctx.content(root), "1+2+3");
//! assert_eq!(*root.children()[0].id(), "sum");
//! assert_eq!(*root.children()[1].id(), "num");
//! ```
//!
//! Sequences can carry resume points for error recovery: when an element
//! fails, the engine records what it expected, skips to the anchor, and
//! keeps going, so one missing semicolon does not cost the rest of the
//! file.
//!
//! The input does not have to be text. Anything implementing
//! [`Source`](crate::source::Source) can be parsed, and the position
//! strategy (case-insensitive comparison, line and column tracking) is
//! picked per parse through the context's cursor type parameter.

pub mod context;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod source;

pub use context::{Match, ParseContext, State};
pub use error::{ErrorRecord, ParseCompletion};
pub use parser::rule::Rule;
pub use parser::Expr;
pub use source::{CaselessPos, Cursor, LineColPos, Pos, Position, Source};
