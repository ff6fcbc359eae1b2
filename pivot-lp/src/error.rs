//! Parse errors with source positions.

use thiserror::Error;

/// What class of defect the parser hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that does not fit the grammar at this point.
    UnexpectedToken,

    /// A numeric literal that failed to parse.
    BadNumber,

    /// A declaration keyword the dialect does not know.
    UnknownDirective,

    /// A declaration names a variable that never appears in the program.
    UnknownName,

    /// The program does not start with an objective statement.
    MissingObjective,

    /// A constraint carries no variable term.
    ConstantRow,
}

/// Malformed LP text, with a 1-based source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, col {col}: expected {expected}")]
pub struct ParseError {
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub col: usize,
    /// What the parser was looking for.
    pub expected: String,
    /// Defect class.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(
        line: usize,
        col: usize,
        expected: impl Into<String>,
        kind: ParseErrorKind,
    ) -> Self {
        Self {
            line,
            col,
            expected: expected.into(),
            kind,
        }
    }
}
