//! Formula Language
//!
//! A formula is the text after the leading `=` of a node's input. It is a
//! single arithmetic expression over numbers, the four basic operators, `^`,
//! parentheses, the functions `sqrt`, `sin`, `cos` and `tan` (degrees), and
//! references to other nodes written `@name` or `@index`.
//!
//! # Evaluation
//!
//! There is no separate AST. The parser evaluates as it descends, so a
//! formula is read exactly once. References are resolved through a
//! [`ReferenceResolver`] supplied by the caller, and every reference that
//! resolves is recorded as a [`FormulaRef`] together with the byte span of its
//! token in the source text. The graph uses those records both to build
//! dependency edges and to rewrite the text later when a referenced node is
//! renamed, deleted or moves to another index.
//!
//! # Grammar
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := ('+' | '-') factor
//!             | primary ('^' factor)?
//! primary    := '(' expression ')'
//!             | NUMBER
//!             | IDENT '(' expression ')'
//!             | IDENT factor
//!             | '@' (LETTERS | DIGITS)
//! ```
//!
//! Whitespace is ignored everywhere, including inside numbers and names.

mod functions;
mod parser;
mod reference;

pub use functions::Function;
pub use parser::{evaluate, Evaluation};
pub use reference::{FormulaRef, FormulaRefs, RefKind, ReferenceResolver, Resolved};
