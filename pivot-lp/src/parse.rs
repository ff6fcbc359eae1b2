//! Statement parser: LP text -> [`Model`].

use std::collections::BTreeMap;

use pivot_core::{ConstraintSpec, Model, OpType};

use crate::error::{ParseError, ParseErrorKind};
use crate::token::{tokenize, Token, TokenKind};

/// Name given to the objective combination.
pub const OBJECTIVE_NAME: &str = "_obj";

/// Parse a full LP program into a model.
///
/// The first statement must be the objective (`max:` / `min:`); constraint
/// statements follow, then `int` / `bin` / `free` declarations. Anonymous
/// rows are named `R_1, R_2, ...`. Every structural variable additionally
/// gets an identity output entry so solved values are reported by name.
/// Constant terms in the objective are dropped.
pub fn parse(source: &str) -> Result<Model, ParseError> {
    Parser::new(tokenize(source)?).run()
}

/// Parse a program supplied as individual lines (no trailing newlines).
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Model, ParseError> {
    let joined = lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    parse(&joined)
}

/// A linear expression accumulated during parsing.
#[derive(Debug, Default, Clone)]
struct Expr {
    coeffs: BTreeMap<String, f64>,
    constant: f64,
}

impl Expr {
    fn add_term(&mut self, name: Option<String>, value: f64) {
        match name {
            Some(name) => *self.coeffs.entry(name).or_insert(0.0) += value,
            None => self.constant += value,
        }
    }

    fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    model: Model,
    anon_rows: usize,
    var_order: Vec<String>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            model: Model::default(),
            anon_rows: 0,
            var_order: Vec::new(),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek2(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &str, kind: ParseErrorKind) -> ParseError {
        let tok = self.peek();
        ParseError::new(tok.line, tok.col, expected, kind)
    }

    fn run(mut self) -> Result<Model, ParseError> {
        self.skip_semis();
        self.objective()?;

        loop {
            self.skip_semis();
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            self.statement()?;
        }

        self.declare_identity_outputs();
        Ok(self.model)
    }

    fn skip_semis(&mut self) {
        while self.eat(TokenKind::Semi) {}
    }

    fn end_statement(&mut self) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::Semi => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.error("';'", ParseErrorKind::UnexpectedToken)),
        }
    }

    fn objective(&mut self) -> Result<(), ParseError> {
        let tok = self.peek().clone();
        let direction = if tok.kind == TokenKind::Ident {
            match tok.text.to_ascii_lowercase().as_str() {
                "max" | "maximize" | "maximise" => Some(OpType::Max),
                "min" | "minimize" | "minimise" => Some(OpType::Min),
                _ => None,
            }
        } else {
            None
        };
        let Some(direction) = direction else {
            return Err(self.error(
                "an objective ('max:' or 'min:')",
                ParseErrorKind::MissingObjective,
            ));
        };
        self.bump();
        if !self.eat(TokenKind::Colon) {
            return Err(self.error("':' after the objective keyword", ParseErrorKind::UnexpectedToken));
        }

        let expr = self.expr()?;
        self.end_statement()?;

        self.model.op_type = direction;
        self.model.optimize = OBJECTIVE_NAME.to_string();
        let combo = expr.coeffs;
        for name in combo.keys() {
            self.note_var(name);
        }
        self.model
            .variables
            .insert(OBJECTIVE_NAME.to_string(), combo);
        Ok(())
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        // Declaration shape: Ident Ident (no colon, no operator).
        if self.peek().kind == TokenKind::Ident && self.peek2().kind == TokenKind::Ident {
            return self.declaration();
        }
        self.constraint()
    }

    fn declaration(&mut self) -> Result<(), ParseError> {
        let keyword = self.peek().clone();
        let flag = match keyword.text.to_ascii_lowercase().as_str() {
            "int" => Flag::Int,
            "bin" | "binary" => Flag::Bin,
            "free" => Flag::Free,
            other => {
                return Err(ParseError::new(
                    keyword.line,
                    keyword.col,
                    format!("a known directive ('int', 'bin', 'free'), found '{}'", other),
                    ParseErrorKind::UnknownDirective,
                ));
            }
        };
        self.bump();

        let mut any = false;
        loop {
            match self.peek().kind {
                TokenKind::Ident => {
                    let tok = self.bump();
                    if !self.var_order.iter().any(|v| v == &tok.text) {
                        return Err(ParseError::new(
                            tok.line,
                            tok.col,
                            format!("a declared variable, found '{}'", tok.text),
                            ParseErrorKind::UnknownName,
                        ));
                    }
                    match flag {
                        Flag::Int => self.model.ints.insert(tok.text, true),
                        Flag::Bin => self.model.binaries.insert(tok.text, true),
                        Flag::Free => self.model.unrestricted.insert(tok.text, true),
                    };
                    any = true;
                    self.eat(TokenKind::Comma);
                }
                _ => break,
            }
        }
        if !any {
            return Err(self.error("a variable name", ParseErrorKind::UnexpectedToken));
        }
        self.end_statement()
    }

    fn constraint(&mut self) -> Result<(), ParseError> {
        // Optional label.
        let label = if self.peek().kind == TokenKind::Ident
            && self.peek2().kind == TokenKind::Colon
        {
            let tok = self.bump();
            self.bump();
            Some(tok.text)
        } else {
            None
        };

        // expr (relop expr)+; three segments form a range row.
        let first_pos = (self.peek().line, self.peek().col);
        let mut segments = vec![self.expr()?];
        let mut ops = Vec::new();
        while matches!(
            self.peek().kind,
            TokenKind::Le | TokenKind::Ge | TokenKind::Eq
        ) {
            ops.push(self.bump().kind);
            segments.push(self.expr()?);
        }
        self.end_statement()?;

        match (segments.len(), ops.as_slice()) {
            (2, [op]) => {
                let rhs = segments.pop().expect("two segments");
                let lhs = segments.pop().expect("two segments");
                let (coeffs, value) = normalize(lhs, rhs);
                if coeffs.is_empty() {
                    return Err(ParseError::new(
                        first_pos.0,
                        first_pos.1,
                        "a variable term in the constraint",
                        ParseErrorKind::ConstantRow,
                    ));
                }
                let spec = match op {
                    TokenKind::Le => ConstraintSpec::max(value),
                    TokenKind::Ge => ConstraintSpec::min(value),
                    _ => ConstraintSpec::equal(value),
                };
                self.record_row(label, coeffs, spec);
                Ok(())
            }
            (3, [lo_op, hi_op]) => {
                // lo <= expr <= hi (or the mirrored >= form).
                let hi = segments.pop().expect("three segments");
                let mid = segments.pop().expect("three segments");
                let lo = segments.pop().expect("three segments");
                if !lo.is_constant() || !hi.is_constant() || mid.is_constant() {
                    return Err(ParseError::new(
                        first_pos.0,
                        first_pos.1,
                        "a range of the form 'low <= expression <= high'",
                        ParseErrorKind::UnexpectedToken,
                    ));
                }
                let (lo_v, hi_v) = match (lo_op, hi_op) {
                    (TokenKind::Le, TokenKind::Le) => (lo.constant, hi.constant),
                    (TokenKind::Ge, TokenKind::Ge) => (hi.constant, lo.constant),
                    _ => {
                        return Err(ParseError::new(
                            first_pos.0,
                            first_pos.1,
                            "matching range operators",
                            ParseErrorKind::UnexpectedToken,
                        ));
                    }
                };
                let shift = mid.constant;
                let spec = ConstraintSpec {
                    min: Some(lo_v - shift),
                    max: Some(hi_v - shift),
                    equal: None,
                };
                self.record_row(label, mid.coeffs, spec);
                Ok(())
            }
            _ => Err(self.error(
                "a relational operator ('<=', '>=', '=')",
                ParseErrorKind::UnexpectedToken,
            )),
        }
    }

    /// Attach a parsed row to the model.
    ///
    /// Unnamed single-variable rows with unit coefficient become bound
    /// records on the raw variable; everything else becomes a named
    /// combination row.
    fn record_row(
        &mut self,
        label: Option<String>,
        coeffs: BTreeMap<String, f64>,
        spec: ConstraintSpec,
    ) {
        for name in coeffs.keys() {
            self.note_var(name);
        }

        let raw_bound = label.is_none()
            && coeffs.len() == 1
            && coeffs.values().next().copied() == Some(1.0);
        let name = if raw_bound {
            coeffs.keys().next().cloned().expect("one key")
        } else {
            label.unwrap_or_else(|| {
                self.anon_rows += 1;
                format!("R_{}", self.anon_rows)
            })
        };

        if !raw_bound {
            self.model.variables.insert(name.clone(), coeffs);
        }

        let entry = self.model.constraints.entry(name).or_default();
        if spec.min.is_some() {
            entry.min = spec.min;
        }
        if spec.max.is_some() {
            entry.max = spec.max;
        }
        if spec.equal.is_some() {
            entry.equal = spec.equal;
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = Expr::default();
        let mut sign = 1.0;
        let mut first = true;

        loop {
            match self.peek().kind {
                TokenKind::Plus => {
                    self.bump();
                }
                TokenKind::Minus => {
                    self.bump();
                    sign = -sign;
                }
                TokenKind::Number => {
                    let value = sign * self.bump().number()?;
                    if self.peek().kind == TokenKind::Ident {
                        let name = self.bump().text;
                        expr.add_term(Some(name), value);
                    } else {
                        expr.add_term(None, value);
                    }
                    sign = 1.0;
                    if !self.continues_with_term() {
                        break;
                    }
                }
                TokenKind::Ident => {
                    let name = self.bump().text;
                    expr.add_term(Some(name), sign);
                    sign = 1.0;
                    if !self.continues_with_term() {
                        break;
                    }
                }
                _ if first => {
                    return Err(self.error(
                        "a term (number or variable)",
                        ParseErrorKind::UnexpectedToken,
                    ));
                }
                _ => break,
            }
            first = false;
        }
        Ok(expr)
    }

    /// After a completed term, only `+`/`-` continue the expression.
    fn continues_with_term(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Plus | TokenKind::Minus)
    }

    fn note_var(&mut self, name: &str) {
        if !self.var_order.iter().any(|v| v == name) {
            self.var_order.push(name.to_string());
        }
    }

    /// Identity output entries for every structural variable, so a solve of
    /// parsed text reports variable values by name.
    fn declare_identity_outputs(&mut self) {
        for name in &self.var_order {
            if !self.model.variables.contains_key(name) {
                let mut combo = BTreeMap::new();
                combo.insert(name.clone(), 1.0);
                self.model.variables.insert(name.clone(), combo);
            }
        }
    }
}

enum Flag {
    Int,
    Bin,
    Free,
}

/// Move every variable term to the left and every constant to the right.
fn normalize(lhs: Expr, rhs: Expr) -> (BTreeMap<String, f64>, f64) {
    let mut coeffs = lhs.coeffs;
    for (name, value) in rhs.coeffs {
        *coeffs.entry(name).or_insert(0.0) -= value;
    }
    coeffs.retain(|_, v| *v != 0.0);
    (coeffs, rhs.constant - lhs.constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_objective_and_rows() {
        let m = parse(
            "max: x + 2y; // objective\n\
             c1: x + 2 y <= 14;\n\
             3 x - y >= 0;\n\
             x <= 9;",
        )
        .unwrap();

        assert_eq!(m.optimize, OBJECTIVE_NAME);
        assert_eq!(m.op_type, OpType::Max);
        assert_eq!(m.variables[OBJECTIVE_NAME]["y"], 2.0);
        // Named row keeps its label, the multi-term anonymous row gets R_1,
        // and the unit single-variable row becomes a raw bound.
        assert!(m.constraints.contains_key("c1"));
        assert_eq!(m.constraints["R_1"].min, Some(0.0));
        assert_eq!(m.constraints["x"].max, Some(9.0));
        assert!(!m.variables.contains_key("R_2"));
        // Identity outputs for both structural variables.
        assert_eq!(m.variables["x"]["x"], 1.0);
        assert_eq!(m.variables["y"]["y"], 1.0);
    }

    #[test]
    fn signs_bind_to_following_term() {
        let m = parse("min: -x + - y - -2z;").unwrap();
        let obj = &m.variables[OBJECTIVE_NAME];
        assert_eq!(obj["x"], -1.0);
        assert_eq!(obj["y"], -1.0);
        assert_eq!(obj["z"], 2.0);
    }

    #[test]
    fn duplicate_terms_merge() {
        let m = parse("min: x; c: 2x + 3x <= 10;").unwrap();
        assert_eq!(m.variables["c"]["x"], 5.0);
    }

    #[test]
    fn constants_migrate_to_the_rhs() {
        let m = parse("min: x; c: x + 3 <= 10 - 2;").unwrap();
        assert_eq!(m.constraints["c"].max, Some(5.0));
    }

    #[test]
    fn range_rows_set_both_bounds() {
        let m = parse("min: x + y; r: 2 <= x + y <= 8;").unwrap();
        assert_eq!(m.constraints["r"].min, Some(2.0));
        assert_eq!(m.constraints["r"].max, Some(8.0));
    }

    #[test]
    fn declarations_set_flags() {
        let m = parse("max: a + b + c; k: 2a + 3b + 4c <= 7; int a; bin b, c;").unwrap();
        assert_eq!(m.ints.get("a"), Some(&true));
        assert_eq!(m.binaries.get("b"), Some(&true));
        assert_eq!(m.binaries.get("c"), Some(&true));
    }

    #[test]
    fn free_declaration() {
        let m = parse("min: x + y; c: x + y >= 2; free y;").unwrap();
        assert_eq!(m.unrestricted.get("y"), Some(&true));
    }

    #[test]
    fn unknown_directive_is_rejected_with_kind() {
        let err = parse("max: x; c: x <= 1; sec x;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownDirective);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn missing_objective_is_rejected() {
        let err = parse("c: x <= 1;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingObjective);
    }

    #[test]
    fn declaration_of_unknown_variable_is_rejected() {
        let err = parse("max: x; c: x <= 1; int ghost;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownName);
    }

    #[test]
    fn constant_only_row_is_rejected() {
        let err = parse("max: x; 3 <= 5;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ConstantRow);
    }

    #[test]
    fn error_position_points_at_the_defect() {
        let err = parse("max: x;\nc1: x ! 3;").unwrap_err();
        assert_eq!((err.line, err.col), (2, 7));
    }

    #[test]
    fn parse_lines_joins_input() {
        let m = parse_lines(&["max: x;", "c: x <= 4;"]).unwrap();
        assert_eq!(m.constraints["c"].max, Some(4.0));
    }

    #[test]
    fn operator_aliases() {
        let m = parse("min: x + y; a: x + y > 2; b: x - y < 1;").unwrap();
        assert_eq!(m.constraints["a"].min, Some(2.0));
        assert_eq!(m.constraints["b"].max, Some(1.0));
    }
}
