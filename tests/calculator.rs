//! A left-recursive four-operation calculator: the grammar is written
//! the way the arithmetic associates, and the match tree is folded into
//! a value after the parse.

use sprout::prelude::*;

/// add := add '+' mul | add '-' mul | mul
/// mul := mul '*' num | mul '/' num | num
/// num := digit+ | '(' add ')'
fn calculator() -> Rule<char> {
    let add = Rule::new("add");
    let mul = Rule::new("mul");
    let num = Rule::new("num");

    num.set(
        one_or_more(terminal_range('0', '9')).flat("num")
            | (terminal('(') >> add.expr() >> terminal(')')),
    );
    mul.set(
        (mul.expr() >> terminal('*') >> num.expr()).tree("mul")
            | (mul.expr() >> terminal('/') >> num.expr()).tree("mul")
            | num.expr(),
    );
    add.set(
        (add.expr() >> terminal('+') >> mul.expr()).tree("add")
            | (add.expr() >> terminal('-') >> mul.expr()).tree("add")
            | mul.expr(),
    );

    add
}

fn parse(input: &str) -> ParseContext<'_, str> {
    let mut ctx = ParseContext::new(input);
    assert!(ctx.parse(&calculator().expr()), "should accept {:?}", input);
    assert_eq!(
        ctx.completion(),
        ParseCompletion::Complete,
        "should consume all of {:?}",
        input
    );
    ctx
}

/// Folds a match tree into a value. Leaves are numbers; interior nodes
/// find their operator between their children's spans.
fn eval(src: &str, m: &Match<&'static str, Pos>) -> i64 {
    if m.children().is_empty() {
        return src[m.begin().offset()..m.end().offset()].parse().unwrap();
    }
    let lhs = &m.children()[0];
    let rhs = &m.children()[1];
    let a = eval(src, lhs);
    let b = eval(src, rhs);
    let between = &src[lhs.end().offset()..rhs.begin().offset()];
    let op = between.chars().find(|c| "+-*/".contains(*c)).unwrap();
    match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        '/' => a / b,
        _ => unreachable!(),
    }
}

#[test]
fn consumes_the_whole_expression() {
    parse("1+2*3");
    parse("10+200*3");
    parse("8/2/2-1");
    parse("(1+2)*3");
    parse("((7))");
}

#[test]
fn leaves_trailing_operators_alone() {
    let mut ctx = ParseContext::<str>::new("1+2+");
    assert!(ctx.parse(&calculator().expr()));
    assert_eq!(ctx.completion(), ParseCompletion::Incomplete(3));
}

#[test]
fn rejects_input_with_no_seed() {
    let mut ctx = ParseContext::<str>::new("+1");
    assert!(!ctx.parse(&calculator().expr()));
    assert_eq!(ctx.position().offset(), 0);
    assert!(ctx.matches().is_empty());
}

#[test]
fn precedence_falls_out_of_the_rule_nesting() {
    let ctx = parse("1+2*3");
    let root = &ctx.matches()[0];

    assert_eq!(*root.id(), "add");
    assert_eq!(ctx.content(root), "1+2*3");
    assert_eq!(root.children().len(), 2);
    assert_eq!(*root.children()[0].id(), "num");
    assert_eq!(ctx.content(&root.children()[0]), "1");

    let product = &root.children()[1];
    assert_eq!(*product.id(), "mul");
    assert_eq!(ctx.content(product), "2*3");
    assert_eq!(product.children().len(), 2);
}

#[test]
fn repeated_sums_lean_left() {
    let ctx = parse("1+2+3");
    let root = &ctx.matches()[0];

    assert_eq!(*root.id(), "add");
    let inner = &root.children()[0];
    assert_eq!(*inner.id(), "add");
    assert_eq!(ctx.content(inner), "1+2");
    assert_eq!(*root.children()[1].id(), "num");
    assert_eq!(ctx.content(&root.children()[1]), "3");
}

#[test]
fn parenthesized_groups_nest_in_the_tree() {
    let ctx = parse("(1+2)*3");
    let root = &ctx.matches()[0];

    assert_eq!(*root.id(), "mul");
    assert_eq!(*root.children()[0].id(), "add");
    assert_eq!(ctx.content(&root.children()[0]), "1+2");
    assert_eq!(ctx.content(&root.children()[1]), "3");
}

#[test]
fn evaluates_by_folding_the_match_tree() {
    for (input, value) in [
        ("1+2*3", 7),
        ("10+200*3", 610),
        ("8/2/2-1", 1),
        ("(1+2)*3", 9),
        ("2*3+4*5", 26),
        ("100-10-1", 89),
    ] {
        let ctx = parse(input);
        assert_eq!(eval(input, &ctx.matches()[0]), value, "for {:?}", input);
    }
}

#[test]
fn parses_are_repeatable() {
    let grammar = calculator();
    let mut first = ParseContext::<str>::new("4*(5+6)");
    let mut second = ParseContext::<str>::new("4*(5+6)");
    assert!(first.parse(&grammar.expr()));
    assert!(second.parse(&grammar.expr()));
    assert_eq!(first.matches(), second.matches());
}
