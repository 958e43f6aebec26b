//! Input abstraction and source position strategies.
//!
//! A parse runs over anything implementing [`Source`]: `str` parses by
//! `char`, `[E]` parses by element. The position strategy is chosen by
//! picking a [`Cursor`] type for the parse context; it decides how
//! elements are compared and what bookkeeping happens on every advance.
//!
//! ```
//! use sprout::prelude::*;
//!
//! let keyword = terminal_str("select");
//! let mut ctx = ParseContext::<str, &str, CaselessPos>::new("SeLeCt");
//! assert!(ctx.parse(&keyword));
//! assert_eq!(ctx.completion(), ParseCompletion::Complete);
//! ```

use std::fmt;

/// An ordered sequence of elements that a parse context can walk.
///
/// The source is borrowed for the whole parse and never copied; matches
/// refer back into it by offset.
pub trait Source {
    /// The element the grammar's terminals are written in.
    type Elem: Clone + PartialEq + PartialOrd + fmt::Debug;

    /// The slice type handed out for match content.
    type Slice: ?Sized;

    /// The element at `offset`, along with the offset just past it.
    /// `None` once the source is exhausted.
    fn elem_at(&self, offset: usize) -> Option<(Self::Elem, usize)>;

    /// The offset one past the last element.
    fn end_offset(&self) -> usize;

    /// The content between two offsets.
    fn slice(&self, from: usize, to: usize) -> &Self::Slice;
}

impl Source for str {
    type Elem = char;
    type Slice = str;

    fn elem_at(&self, offset: usize) -> Option<(char, usize)> {
        self.get(offset..)
            .and_then(|rest| rest.chars().next())
            .map(|c| (c, offset + c.len_utf8()))
    }

    fn end_offset(&self) -> usize {
        self.len()
    }

    fn slice(&self, from: usize, to: usize) -> &str {
        &self[from..to]
    }
}

impl<E> Source for [E]
where
    E: Clone + PartialEq + PartialOrd + fmt::Debug,
{
    type Elem = E;
    type Slice = [E];

    fn elem_at(&self, offset: usize) -> Option<(E, usize)> {
        self.get(offset).map(|e| (e.clone(), offset + 1))
    }

    fn end_offset(&self) -> usize {
        self.len()
    }

    fn slice(&self, from: usize, to: usize) -> &[E] {
        &self[from..to]
    }
}

/// A point in the source, independent of any particular source value.
pub trait Position: Copy + fmt::Debug + PartialEq + PartialOrd {
    /// The position before the first element.
    fn start() -> Self;

    /// Offset into the source, in the source's native units.
    fn offset(&self) -> usize;

    /// Number of offset units between this position and a later one.
    fn distance(&self, later: &Self) -> usize {
        later.offset() - self.offset()
    }
}

/// A [`Position`] that knows how to move over a given source and how the
/// engine should compare elements while it is in use.
///
/// Folding the comparison policy into the cursor type keeps the policy a
/// zero-cost choice made once, at context construction.
pub trait Cursor<S: Source + ?Sized>: Position {
    /// The position after the element at `self`. Identity at end of input.
    fn advanced(self, src: &S) -> Self;

    /// Whether a source element matches a terminal value.
    fn elem_eq(have: &S::Elem, want: &S::Elem) -> bool {
        have == want
    }

    /// Whether a source element falls in an inclusive terminal range.
    fn elem_in_range(have: &S::Elem, lo: &S::Elem, hi: &S::Elem) -> bool {
        have >= lo && have <= hi
    }
}

/// Text-ish elements: the hooks needed by the case-insensitive and
/// line-counting cursors.
pub trait TextElem: Clone {
    fn lowered(&self) -> Self;
    fn is_newline(&self) -> bool;
}

impl TextElem for char {
    fn lowered(&self) -> Self {
        self.to_ascii_lowercase()
    }

    fn is_newline(&self) -> bool {
        *self == '\n'
    }
}

impl TextElem for u8 {
    fn lowered(&self) -> Self {
        self.to_ascii_lowercase()
    }

    fn is_newline(&self) -> bool {
        *self == b'\n'
    }
}

/// The default position: a bare offset with exact element comparison.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    offset: usize,
}

impl Position for Pos {
    fn start() -> Self {
        Pos { offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

impl<S: Source + ?Sized> Cursor<S> for Pos {
    fn advanced(self, src: &S) -> Self {
        match src.elem_at(self.offset) {
            Some((_, next)) => Pos { offset: next },
            None => self,
        }
    }
}

/// An offset position that compares elements ASCII-case-insensitively.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaselessPos {
    offset: usize,
}

impl Position for CaselessPos {
    fn start() -> Self {
        CaselessPos { offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

impl<S> Cursor<S> for CaselessPos
where
    S: Source + ?Sized,
    S::Elem: TextElem,
{
    fn advanced(self, src: &S) -> Self {
        match src.elem_at(self.offset) {
            Some((_, next)) => CaselessPos { offset: next },
            None => self,
        }
    }

    fn elem_eq(have: &S::Elem, want: &S::Elem) -> bool {
        have.lowered() == want.lowered()
    }

    fn elem_in_range(have: &S::Elem, lo: &S::Elem, hi: &S::Elem) -> bool {
        let have = have.lowered();
        have >= lo.lowered() && have <= hi.lowered()
    }
}

/// A position that tracks 1-based line and column alongside the offset.
///
/// Columns count elements, not display width. A `'\n'` element ends the
/// line; `"\r\n"` therefore counts once, on the `'\n'`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColPos {
    offset: usize,
    line: u32,
    column: u32,
}

impl LineColPos {
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl Position for LineColPos {
    fn start() -> Self {
        LineColPos {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

impl<S> Cursor<S> for LineColPos
where
    S: Source + ?Sized,
    S::Elem: TextElem,
{
    fn advanced(self, src: &S) -> Self {
        match src.elem_at(self.offset) {
            Some((e, next)) if e.is_newline() => LineColPos {
                offset: next,
                line: self.line + 1,
                column: 1,
            },
            Some((_, next)) => LineColPos {
                offset: next,
                line: self.line,
                column: self.column + 1,
            },
            None => self,
        }
    }
}
