//! pivot-lp: lp_solve-dialect text format for pivot models.
//!
//! Bidirectional translation between LP text and the structured
//! [`Model`](pivot_core::Model): [`parse`] / [`parse_lines`] consume a
//! program (objective first, then constraints, then `int` / `bin` /
//! `free` declarations, `//` comments allowed), and [`emit`] renders a
//! model back as one statement per line.
//!
//! # Example
//!
//! ```
//! let model = pivot_lp::parse(
//!     "max: 143 x + 60 y;\n\
//!      land: x + y <= 75;\n\
//!      budget: 110 x + 30 y <= 4000;",
//! )
//! .unwrap();
//!
//! let lines = pivot_lp::emit(&model);
//! assert_eq!(lines[0], "max: 143 x + 60 y;");
//! let again = pivot_lp::parse(&lines.join("\n")).unwrap();
//! assert_eq!(model, again);
//! ```

#![warn(missing_docs)]

pub mod emit;
pub mod error;
pub mod parse;
pub mod token;

pub use emit::emit;
pub use error::{ParseError, ParseErrorKind};
pub use parse::{parse, parse_lines, OBJECTIVE_NAME};
