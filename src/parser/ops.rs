//! Operator sugar over [`Expr`].
//!
//! `a >> b` sequences, `a | b` is ordered choice, `a - b` keeps `a`
//! where `b` would not match, unary `-` makes an expression optional and
//! `!` is negative lookahead. The remaining combinators have no Rust
//! operator and stay functions (`zero_or_more`, `one_or_more`,
//! `and_pred`, `error_resume`) or methods (`flat`, `tree`).

use std::ops::{BitOr, Neg, Not, Shr, Sub};

use crate::parser::Expr;

/// Sequencing. Chains of `>>` flatten into a single sequence, so a
/// resume point placed anywhere in the chain covers the whole of it.
impl<E, I> Shr for Expr<E, I> {
    type Output = Expr<E, I>;

    fn shr(self, rhs: Self) -> Self::Output {
        let mut kids = match self {
            Expr::Seq(kids) => kids,
            other => vec![other],
        };
        match rhs {
            Expr::Seq(more) => kids.extend(more),
            other => kids.push(other),
        }
        Expr::Seq(kids)
    }
}

/// Ordered choice. Chains of `|` flatten into a single choice.
impl<E, I> BitOr for Expr<E, I> {
    type Output = Expr<E, I>;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut kids = match self {
            Expr::Choice(kids) => kids,
            other => vec![other],
        };
        match rhs {
            Expr::Choice(more) => kids.extend(more),
            other => kids.push(other),
        }
        Expr::Choice(kids)
    }
}

/// Difference: `self`, provided `rhs` would not match at the same place.
impl<E, I> Sub for Expr<E, I> {
    type Output = Expr<E, I>;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Diff(Box::new(self), Box::new(rhs))
    }
}

/// Optional.
impl<E, I> Neg for Expr<E, I> {
    type Output = Expr<E, I>;

    fn neg(self) -> Self::Output {
        Expr::Optional(Box::new(self))
    }
}

/// Negative lookahead.
impl<E, I> Not for Expr<E, I> {
    type Output = Expr<E, I>;

    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use crate::context::ParseContext;
    use crate::parser::{terminal, terminal_str, Expr};
    use crate::source::Position;

    #[test]
    fn shr_flattens_sequences() {
        let g: Expr<char> = terminal('a') >> terminal('b') >> terminal('c');
        match g {
            Expr::Seq(kids) => assert_eq!(kids.len(), 3),
            other => panic!("expected a flattened sequence, got {:?}", other),
        }
    }

    #[test]
    fn bitor_flattens_choices() {
        let g: Expr<char> = terminal('a') | terminal('b') | terminal('c');
        match g {
            Expr::Choice(kids) => assert_eq!(kids.len(), 3),
            other => panic!("expected a flattened choice, got {:?}", other),
        }
    }

    #[test]
    fn unary_ops_wrap() {
        let opt: Expr<char> = -terminal('a');
        assert!(matches!(opt, Expr::Optional(_)));
        let neg: Expr<char> = !terminal('a');
        assert!(matches!(neg, Expr::Not(_)));
    }

    #[test]
    fn sugar_parses_like_the_constructors() {
        let g = -(terminal('+') | terminal('-')) >> terminal_str("12");
        let mut c = ParseContext::<str>::new("-12");
        assert!(c.parse(&g));
        assert_eq!(c.position().offset(), 3);
    }
}
