//! Formula Parser and Evaluator
//!
//! A recursive descent parser that computes the value of each production as
//! it returns, in a single left-to-right pass with no backtracking.
//!
//! Whitespace is dropped up front, but every remaining character keeps its
//! byte offset into the source text so reference spans point at the text
//! the user actually typed.

use std::ops::Range;

use super::functions::Function;
use super::reference::{FormulaRef, FormulaRefs, RefKind, ReferenceResolver};
use crate::error::{CoreError, Result};

/// Nesting bound for parentheses, unary signs and exponent chains.
const MAX_NESTING: usize = 256;

/// The outcome of evaluating a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The computed value. `NaN` and infinities are legal results.
    pub value: f64,

    /// Every reference that resolved, in source order.
    pub refs: FormulaRefs,
}

/// Evaluate `formula` (the text after the leading `=`).
///
/// # Example
///
/// ```rust,ignore
/// let evaluation = evaluate("2 + 3 * 4", &resolver)?;
/// assert_eq!(evaluation.value, 14.0);
/// ```
pub fn evaluate<R>(formula: &str, resolver: &R) -> Result<Evaluation>
where
    R: ReferenceResolver + ?Sized,
{
    let mut evaluator = Evaluator::new(formula, resolver);
    let value = evaluator.parse_expression()?;

    // Make sure we consumed all input
    if let Some(c) = evaluator.peek() {
        return Err(CoreError::parse(format!("Unexpected: {c}")));
    }

    Ok(Evaluation {
        value,
        refs: evaluator.refs,
    })
}

struct Evaluator<'a, R: ?Sized> {
    /// Non-whitespace characters with their byte offsets.
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
    resolver: &'a R,
    refs: FormulaRefs,
}

impl<'a, R> Evaluator<'a, R>
where
    R: ReferenceResolver + ?Sized,
{
    fn new(source: &str, resolver: &'a R) -> Self {
        Self {
            chars: source
                .char_indices()
                .filter(|(_, c)| !c.is_whitespace())
                .collect(),
            pos: 0,
            depth: 0,
            resolver,
            refs: FormulaRefs::new(),
        }
    }

    // === Scanning ===

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a run of characters matching `pred`, returning its position range.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> Range<usize> {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        start..self.pos
    }

    fn text(&self, run: &Range<usize>) -> String {
        self.chars[run.clone()].iter().map(|&(_, c)| c).collect()
    }

    /// Byte span in the source covering a non-empty run.
    fn byte_span(&self, run: &Range<usize>) -> Range<usize> {
        let (first, _) = self.chars[run.start];
        let (last, c) = self.chars[run.end - 1];
        first..last + c.len_utf8()
    }

    // === Productions ===

    fn parse_expression(&mut self) -> Result<f64> {
        let mut x = self.parse_term()?;
        loop {
            if self.eat('+') {
                x += self.parse_term()?;
            } else if self.eat('-') {
                x -= self.parse_term()?;
            } else {
                return Ok(x);
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64> {
        let mut x = self.parse_factor()?;
        loop {
            if self.eat('*') {
                x *= self.parse_factor()?;
            } else if self.eat('/') {
                x /= self.parse_factor()?;
            } else {
                return Ok(x);
            }
        }
    }

    fn parse_factor(&mut self) -> Result<f64> {
        if self.depth >= MAX_NESTING {
            return Err(CoreError::parse("Formula is nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_factor_inner();
        self.depth -= 1;
        result
    }

    fn parse_factor_inner(&mut self) -> Result<f64> {
        if self.eat('+') {
            return self.parse_factor();
        }
        if self.eat('-') {
            return Ok(-self.parse_factor()?);
        }

        let x = match self.peek() {
            Some('(') => {
                self.pos += 1;
                let x = self.parse_expression()?;
                if !self.eat(')') {
                    return Err(CoreError::parse("Missing ')'"));
                }
                x
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number()?,
            Some(c) if c.is_alphabetic() => self.parse_call()?,
            Some('@') => {
                self.pos += 1;
                self.parse_reference()?
            }
            Some(c) => return Err(CoreError::parse(format!("Unexpected character: {c}"))),
            None => return Err(CoreError::parse("Unexpected end of formula")),
        };

        // The exponent is itself a factor, so `2^3^2` is `2^(3^2)`.
        if self.eat('^') {
            return Ok(x.powf(self.parse_factor()?));
        }
        Ok(x)
    }

    fn parse_number(&mut self) -> Result<f64> {
        let run = self.take_while(|c| c.is_ascii_digit() || c == '.');
        let literal = self.text(&run);
        literal
            .parse::<f64>()
            .map_err(|_| CoreError::parse(format!("Malformed number: {literal}")))
    }

    fn parse_call(&mut self) -> Result<f64> {
        let run = self.take_while(char::is_alphabetic);
        let name = self.text(&run);

        let arg = if self.eat('(') {
            let x = self.parse_expression()?;
            if !self.eat(')') {
                return Err(CoreError::parse(format!(
                    "Missing ')' after argument of {name}"
                )));
            }
            x
        } else {
            self.parse_factor()?
        };

        Ok(Function::from_name(&name)?.apply(arg))
    }

    fn parse_reference(&mut self) -> Result<f64> {
        let (run, kind) = match self.peek() {
            Some(c) if c.is_alphabetic() => (self.take_while(char::is_alphabetic), RefKind::Name),
            Some(c) if c.is_ascii_digit() => {
                (self.take_while(|c| c.is_ascii_digit()), RefKind::Index)
            }
            _ => return Err(CoreError::reference("Invalid reference to node")),
        };

        let token = self.text(&run);
        let resolved = match kind {
            RefKind::Name => self.resolver.resolve_name(&token)?,
            RefKind::Index => self.resolver.resolve_index(&token)?,
        };

        self.refs.push(FormulaRef {
            span: self.byte_span(&run),
            kind,
            target: resolved.id,
        });
        Ok(resolved.value)
    }
}
