//! Parsed formulas.
//!
//! [`Formula`] is everything a cell needs from a formula: evaluation against
//! a cell lookup, the canonical expression text and the list of referenced
//! positions. Cells never look inside the parsed nodes.

use super::format::format_number;
use super::parser::{self, BinaryOp, Node, ParseError, UnaryOp};
use super::position::Position;
use super::value::FormulaError;

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Postfix order, as produced by the parser.
    nodes: Vec<Node>,
    references: Vec<Position>,
}

impl Formula {
    /// Parse formula text without the leading `=`.
    pub fn parse(expression: &str) -> Result<Formula, ParseError> {
        let nodes = parser::parse(expression)?;
        let mut references: Vec<Position> = nodes
            .iter()
            .filter_map(|node| match node {
                Node::Ref(pos) if pos.is_valid() => Some(*pos),
                _ => None,
            })
            .collect();
        references.sort_unstable();
        references.dedup();
        Ok(Formula { nodes, references })
    }

    /// Evaluate the formula, resolving cell references through `lookup`.
    ///
    /// Operands are resolved left to right and the first failure wins.
    /// References to invalid positions yield [`FormulaError::Ref`] without
    /// calling `lookup`. Non-finite results yield [`FormulaError::Arithmetic`].
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, FormulaError>
    where
        F: Fn(Position) -> Result<f64, FormulaError>,
    {
        let mut stack: Vec<f64> = Vec::new();
        for node in &self.nodes {
            let result = match *node {
                Node::Number(n) => n,
                Node::Ref(pos) if !pos.is_valid() => return Err(FormulaError::Ref),
                Node::Ref(pos) => lookup(pos)?,
                Node::Unary(op) => {
                    let n = pop_operand(&mut stack)?;
                    match op {
                        UnaryOp::Plus => n,
                        UnaryOp::Minus => -n,
                    }
                }
                Node::Binary(op) => {
                    let r = pop_operand(&mut stack)?;
                    let l = pop_operand(&mut stack)?;
                    match op {
                        BinaryOp::Add => l + r,
                        BinaryOp::Sub => l - r,
                        BinaryOp::Mul => l * r,
                        BinaryOp::Div => l / r,
                    }
                }
            };
            if !result.is_finite() {
                return Err(FormulaError::Arithmetic);
            }
            stack.push(result);
        }
        pop_operand(&mut stack)
    }

    /// Canonical expression text: no whitespace, no redundant parentheses.
    pub fn expression(&self) -> String {
        // Each entry is a rendered subexpression and its precedence.
        let mut stack: Vec<(String, u8)> = Vec::new();
        for node in &self.nodes {
            let entry = match *node {
                Node::Number(n) => (format_number(n), PREC_ATOM),
                Node::Ref(pos) => (pos.to_string(), PREC_ATOM),
                Node::Unary(op) => {
                    let (operand, prec) = stack.pop().unwrap_or_default();
                    let mut text = String::with_capacity(operand.len() + 3);
                    text.push(match op {
                        UnaryOp::Plus => '+',
                        UnaryOp::Minus => '-',
                    });
                    push_operand(&mut text, &operand, prec < PREC_UNARY);
                    (text, PREC_UNARY)
                }
                Node::Binary(op) => {
                    let (right, right_prec) = stack.pop().unwrap_or_default();
                    let (mut left, left_prec) = stack.pop().unwrap_or_default();
                    let own = binary_precedence(op);
                    if left_prec < own {
                        left.insert(0, '(');
                        left.push(')');
                    }
                    left.push(op.symbol());
                    // `a-(b-c)` and `a/(b*c)` keep their parentheses.
                    let keep = right_prec < own
                        || (right_prec == own && matches!(op, BinaryOp::Sub | BinaryOp::Div));
                    push_operand(&mut left, &right, keep);
                    (left, own)
                }
            };
            stack.push(entry);
        }
        stack.pop().map(|(text, _)| text).unwrap_or_default()
    }

    /// Valid positions referenced by the formula, deduplicated, in row-major order.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.references
    }
}

/// Parser output is well-formed postfix, so operands are always present.
fn pop_operand(stack: &mut Vec<f64>) -> Result<f64, FormulaError> {
    stack.pop().ok_or(FormulaError::Value)
}

const PREC_ADDITIVE: u8 = 1;
const PREC_MULTIPLICATIVE: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Sub => PREC_ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div => PREC_MULTIPLICATIVE,
    }
}

fn push_operand(out: &mut String, operand: &str, parenthesize: bool) {
    if parenthesize {
        out.push('(');
        out.push_str(operand);
        out.push(')');
    } else {
        out.push_str(operand);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(text: &str) -> String {
        Formula::parse(text).unwrap().expression()
    }

    fn eval(text: &str) -> Result<f64, FormulaError> {
        Formula::parse(text).unwrap().evaluate(|_| Ok(0.0))
    }

    #[test]
    fn test_canonical_drops_redundant_parentheses() {
        assert_eq!(canonical("(1 + 2) * 3"), "(1+2)*3");
        assert_eq!(canonical("1 + (2 * 3)"), "1+2*3");
        assert_eq!(canonical("((A1))"), "A1");
        assert_eq!(canonical("1 + (2 + 3)"), "1+2+3");
    }

    #[test]
    fn test_canonical_keeps_required_parentheses() {
        assert_eq!(canonical("1 - (2 - 3)"), "1-(2-3)");
        assert_eq!(canonical("8 / (4 * 2)"), "8/(4*2)");
        assert_eq!(canonical("-(1 + 2)"), "-(1+2)");
        assert_eq!(canonical("-(-A1)"), "--A1");
    }

    #[test]
    fn test_canonical_invalid_reference() {
        assert_eq!(canonical("ZZZZ1 + 1"), "#REF!+1");
    }

    #[test]
    fn test_referenced_cells_sorted_and_unique() {
        let formula = Formula::parse("C1 + A2 + B1 + A2 + ZZZZ9").unwrap();
        assert_eq!(
            formula.referenced_cells(),
            &[Position::new(0, 1), Position::new(0, 2), Position::new(1, 0)]
        );
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(7.0));
        assert_eq!(eval("(1 + 2) * 3"), Ok(9.0));
        assert_eq!(eval("-2 - -3"), Ok(1.0));
        assert_eq!(eval("7 / 2"), Ok(3.5));
    }

    #[test]
    fn test_evaluate_errors() {
        assert_eq!(eval("1 / 0"), Err(FormulaError::Arithmetic));
        assert_eq!(eval("0 / 0"), Err(FormulaError::Arithmetic));
        assert_eq!(eval("1e308 * 10"), Err(FormulaError::Arithmetic));
        assert_eq!(eval("ZZZZ1"), Err(FormulaError::Ref));
    }

    #[test]
    fn test_long_sum_walks_without_recursion() {
        let terms = 150_000;
        let formula = Formula::parse(&format!("A1{}", "+1".repeat(terms))).unwrap();
        assert_eq!(formula.referenced_cells(), &[Position::new(0, 0)]);
        assert_eq!(formula.evaluate(|_| Ok(2.0)), Ok(terms as f64 + 2.0));
        let text = formula.expression();
        assert_eq!(text.len(), 2 + 2 * terms);
        assert!(text.starts_with("A1+1+1"));

        let copy = formula.clone();
        assert_eq!(copy, formula);
    }

    #[test]
    fn test_evaluate_uses_lookup() {
        let formula = Formula::parse("A1 * B1").unwrap();
        let result = formula.evaluate(|pos| {
            if pos == Position::new(0, 0) {
                Ok(6.0)
            } else {
                Ok(7.0)
            }
        });
        assert_eq!(result, Ok(42.0));

        let failing = formula.evaluate(|_| Err(FormulaError::Value));
        assert_eq!(failing, Err(FormulaError::Value));
    }
}
