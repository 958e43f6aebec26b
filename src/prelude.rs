//! All the usual imports that a grammar author will need.
//!
//! Pull everything in with `use sprout::prelude::*;` and write the
//! grammar with the constructor functions and the operator sugar.

pub use crate::context::{Match, ParseContext, State};
pub use crate::error::{ErrorRecord, ParseCompletion};
pub use crate::parser::rule::Rule;
pub use crate::parser::{
    and_pred, any, choice, difference, eoi, error_resume, match_flat, match_tree, one_or_more,
    not_pred, optional, repeat, sequence, terminal, terminal_range, terminal_seq, terminal_set,
    terminal_str, zero_or_more, Expr,
};
pub use crate::source::{
    CaselessPos, Cursor, LineColPos, Pos, Position, Source, TextElem,
};
