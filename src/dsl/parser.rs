//! Parser for the score DSL.

use std::sync::Arc;

use indexmap::IndexMap;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::converters::{Converter, ConverterSet, UnknownConverterPolicy};
use crate::definitions::Definitions;
use crate::error::{CsgError, Result};

/// Keyword introducing an instrument block.
const INSTR_KEYWORD: &str = "instr";

/// Configuration for the parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Converter names the parser recognizes.
    pub converters: ConverterSet,
    /// What to do with converter calls outside the vocabulary.
    pub unknown_converters: UnknownConverterPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            converters: ConverterSet::csound(),
            unknown_converters: UnknownConverterPolicy::Record,
        }
    }
}

impl ParserConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the converter vocabulary.
    pub fn with_converters(mut self, converters: ConverterSet) -> Self {
        self.converters = converters;
        self
    }

    /// Set the policy for converter names outside the vocabulary.
    pub fn with_unknown_converters(mut self, policy: UnknownConverterPolicy) -> Self {
        self.unknown_converters = policy;
        self
    }

    /// Reject unknown converter names at parse time.
    pub fn strict(self) -> Self {
        self.with_unknown_converters(UnknownConverterPolicy::Reject)
    }
}

/// How an instrument block is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEnd {
    /// `do ... end`
    End,
    /// `{ ... }`
    Brace,
}

/// Parser for score DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
    config: ParserConfig,
    /// Open `(` nesting; newlines are insignificant while it is non-zero.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self::with_config(lexer, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(lexer: Lexer<'a>, config: ParserConfig) -> Self {
        // Start on a synthetic separator so the first real token is read by
        // `parse` and lexer errors surface there.
        let current = Token {
            kind: TokenKind::Newline,
            text: String::new(),
            line: 1,
            column: 1,
        };
        Self {
            lexer,
            current,
            peeked: None,
            config,
            depth: 0,
        }
    }

    /// Parse the entire score into instrument definitions.
    pub fn parse(&mut self) -> Result<Definitions> {
        let mut defs = Definitions::new();

        self.skip_separators()?;
        while self.current.kind != TokenKind::Eof {
            self.parse_block(&mut defs)?;

            match self.current.kind {
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => {}
                _ => return Err(self.error(format!("expected end of line, found {}", self.found()))),
            }
            self.skip_separators()?;
        }

        Ok(defs)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = if let Some(tok) = self.peeked.take() {
            tok
        } else {
            self.lexer.next_token()?
        };
        Ok(())
    }

    fn peek_kind(&mut self) -> Result<TokenKind> {
        let token = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        let kind = token.kind;
        self.peeked = Some(token);
        Ok(kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.found())))
        }
    }

    fn error(&self, message: impl Into<String>) -> CsgError {
        CsgError::syntax(self.current.line, self.current.column, message)
    }

    fn found(&self) -> String {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Integer | TokenKind::Float => {
                format!("'{}'", self.current.text)
            }
            TokenKind::Symbol => format!("':{}'", self.current.text),
            kind => kind.describe().to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.current.kind == TokenKind::Identifier && self.current.text == keyword
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        Ok(())
    }

    fn skip_separators(&mut self) -> Result<()> {
        while matches!(self.current.kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    fn at_block_end(&self, end: BlockEnd) -> bool {
        match end {
            BlockEnd::End => self.is_keyword("end"),
            BlockEnd::Brace => self.current.kind == TokenKind::CloseBrace,
        }
    }

    fn parse_block(&mut self, defs: &mut Definitions) -> Result<()> {
        if !self.is_keyword(INSTR_KEYWORD) {
            return Err(self.error(format!(
                "expected '{}' block, found {}",
                INSTR_KEYWORD,
                self.found()
            )));
        }
        let block_line = self.current.line;
        let block_column = self.current.column;
        self.advance()?;

        let mut keys: Vec<String> = Vec::new();
        loop {
            let tok = self.expect(TokenKind::Integer, "instrument number")?;
            let number: u32 = tok.text.parse().map_err(|_| {
                CsgError::syntax(
                    tok.line,
                    tok.column,
                    format!("instrument number {} is out of range", tok.text),
                )
            })?;
            let key = number.to_string();
            if keys.contains(&key) || defs.contains_key(&key) {
                return Err(CsgError::syntax(
                    tok.line,
                    tok.column,
                    format!("duplicate instrument {}", key),
                ));
            }
            keys.push(key);

            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
            self.skip_newlines()?;
        }

        let end = if self.is_keyword("do") {
            BlockEnd::End
        } else if self.current.kind == TokenKind::OpenBrace {
            BlockEnd::Brace
        } else {
            return Err(self.error(format!("expected 'do' or '{{', found {}", self.found())));
        };
        self.advance()?;

        let mut features = Vec::new();
        loop {
            self.skip_separators()?;
            if self.at_block_end(end) {
                self.advance()?;
                break;
            }
            if self.current.kind == TokenKind::Eof {
                return Err(self.error(format!(
                    "unterminated instrument block opened at line {}",
                    block_line
                )));
            }

            features.push(self.parse_feature()?);

            let ends_statement =
                matches!(self.current.kind, TokenKind::Newline | TokenKind::Semicolon);
            if !ends_statement && !self.at_block_end(end) {
                return Err(self.error(format!(
                    "expected end of statement, found {}",
                    self.found()
                )));
            }
        }

        if features.is_empty() {
            return Err(CsgError::syntax(
                block_line,
                block_column,
                "instrument block declares no features",
            ));
        }

        let instr = Arc::new(Instr::new(features));
        for key in keys {
            defs.insert(key, Arc::clone(&instr));
        }
        Ok(())
    }

    fn parse_feature(&mut self) -> Result<Feature> {
        if self.current.kind != TokenKind::Identifier {
            return Err(self.error(format!("expected a feature, found {}", self.found())));
        }
        let keyword = self.current.clone();
        let kind = FeatureKind::from_keyword(&keyword.text).ok_or_else(|| {
            CsgError::syntax(
                keyword.line,
                keyword.column,
                format!("unknown feature type '{}'", keyword.text),
            )
        })?;
        self.advance()?;

        let mut coordinates = Vec::with_capacity(kind.coordinate_count());
        let mut options: IndexMap<String, Expr> = IndexMap::new();

        let has_arguments = !matches!(
            self.current.kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::CloseBrace
        ) && !self.is_keyword("end");

        if has_arguments {
            loop {
                if self.at_option()? {
                    let name_tok = self.current.clone();
                    self.advance()?;
                    self.expect(TokenKind::FatArrow, "'=>'")?;
                    self.skip_newlines()?;
                    let value = self.parse_expr()?;
                    if options.contains_key(&name_tok.text) {
                        return Err(CsgError::syntax(
                            name_tok.line,
                            name_tok.column,
                            format!("duplicate option '{}'", name_tok.text),
                        ));
                    }
                    options.insert(name_tok.text, value);
                } else {
                    if !options.is_empty() {
                        return Err(self.error("positional argument after keyword options"));
                    }
                    coordinates.push(self.parse_expr()?);
                }

                if self.current.kind != TokenKind::Comma {
                    break;
                }
                self.advance()?;
                self.skip_newlines()?;
            }
        }

        let got = coordinates.len();
        let arity_error = || {
            CsgError::syntax(
                keyword.line,
                keyword.column,
                format!(
                    "'{}' expects {} coordinates, got {}",
                    kind.keyword(),
                    kind.coordinate_count(),
                    got
                ),
            )
        };

        match kind {
            FeatureKind::Line => {
                let [xstart, xend, ystart, yend] =
                    <[Expr; 4]>::try_from(coordinates).map_err(|_| arity_error())?;
                Ok(Feature::Line(Line {
                    xstart,
                    xend,
                    ystart,
                    yend,
                    options,
                }))
            }
        }
    }

    fn at_option(&mut self) -> Result<bool> {
        match self.current.kind {
            TokenKind::Symbol => Ok(true),
            TokenKind::Identifier => Ok(self.peek_kind()? == TokenKind::FatArrow),
            _ => Ok(false),
        }
    }

    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            if self.depth > 0 {
                self.skip_newlines()?;
            }
            let op = match self.current.kind {
                TokenKind::Plus => Operator::Plus,
                TokenKind::Minus => Operator::Minus,
                _ => break,
            };
            self.advance()?;
            self.skip_newlines()?;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            if self.depth > 0 {
                self.skip_newlines()?;
            }
            let op = match self.current.kind {
                TokenKind::Star => Operator::Times,
                TokenKind::Slash => Operator::Divide,
                _ => break,
            };
            self.advance()?;
            self.skip_newlines()?;
            let right = self.parse_unary()?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.current.kind != TokenKind::Minus {
            return self.parse_primary();
        }
        self.advance()?;
        match self.current.kind {
            // Parsed with its sign so that i64::MIN is representable.
            TokenKind::Integer => {
                let tok = self.current.clone();
                let text = format!("-{}", tok.text);
                let value = text.parse::<i64>().map_err(|_| {
                    CsgError::syntax(tok.line, tok.column, format!("invalid number {}", text))
                })?;
                self.advance()?;
                Ok(Expr::Constant(Number::Int(value)))
            }
            TokenKind::Float => {
                let number = self.parse_number()?;
                Ok(Expr::Constant(Number::Float(-number.as_f64())))
            }
            _ => Err(self.error(format!(
                "'-' must be followed by a number, found {}",
                self.found()
            ))),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.current.kind {
            TokenKind::Integer | TokenKind::Float => Ok(Expr::Constant(self.parse_number()?)),
            TokenKind::OpenParen => {
                self.advance()?;
                self.parse_parenthesized()
            }
            TokenKind::Identifier => {
                let tok = self.current.clone();
                let calls = self.peek_kind()? == TokenKind::OpenParen;
                if let Some(digits) = pfield_digits(&tok.text) {
                    if calls {
                        return Err(self.error(format!(
                            "p-field {} cannot be called as a converter",
                            tok.text
                        )));
                    }
                    let number = self.pfield_number(&tok, digits)?;
                    self.advance()?;
                    Ok(Expr::PField(PField::new(number)))
                } else if calls {
                    self.parse_converter_call()
                } else {
                    Err(self.error(format!("unexpected {} in expression", self.found())))
                }
            }
            _ => Err(self.error(format!("expected an expression, found {}", self.found()))),
        }
    }

    fn parse_converter_call(&mut self) -> Result<Expr> {
        let name = self.current.clone();
        if !self.config.converters.contains(&name.text)
            && self.config.unknown_converters == UnknownConverterPolicy::Reject
        {
            return Err(self.error(format!("unknown converter '{}'", name.text)));
        }
        self.advance()?;
        self.expect(TokenKind::OpenParen, "'('")?;
        let mut inner = self.parse_parenthesized()?;

        // Prepend: the outermost call ends up first.
        let attached = match inner.converters_mut() {
            Some(converters) => {
                converters.insert(0, Converter::new(name.text.clone()));
                true
            }
            None => false,
        };
        if !attached {
            return Err(CsgError::syntax(
                name.line,
                name.column,
                format!("converter '{}' cannot be applied to a constant", name.text),
            ));
        }
        Ok(inner)
    }

    /// Parse the expression after an opening `(` up to and including its `)`.
    fn parse_parenthesized(&mut self) -> Result<Expr> {
        self.depth += 1;
        self.skip_newlines()?;
        let expr = self.parse_expr();
        self.depth -= 1;
        let expr = expr?;
        self.skip_newlines()?;
        self.expect(TokenKind::CloseParen, "')'")?;
        Ok(expr)
    }

    fn parse_number(&mut self) -> Result<Number> {
        let tok = self.current.clone();
        let number = match tok.kind {
            TokenKind::Integer => tok.text.parse::<i64>().ok().map(Number::Int),
            _ => tok
                .text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Number::Float),
        }
        .ok_or_else(|| {
            CsgError::syntax(tok.line, tok.column, format!("invalid number {}", tok.text))
        })?;
        self.advance()?;
        Ok(number)
    }

    fn pfield_number(&self, tok: &Token, digits: &str) -> Result<u32> {
        match digits.parse::<u32>() {
            Ok(0) => Err(CsgError::syntax(
                tok.line,
                tok.column,
                "p-fields are numbered from p1",
            )),
            Ok(n) => Ok(n),
            Err(_) => Err(CsgError::syntax(
                tok.line,
                tok.column,
                format!("p-field {} is out of range", tok.text),
            )),
        }
    }
}

/// The digits of a p-field reference such as `p5`.
fn pfield_digits(text: &str) -> Option<&str> {
    let digits = text.strip_prefix('p')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Result<Definitions> {
        super::super::parse(input)
    }

    fn first_line(defs: &Definitions, key: &str) -> Line {
        let instr = defs.get(key).expect("instrument present");
        instr.features[0].as_line().expect("line feature").clone()
    }

    fn expr(input: &str) -> Expr {
        let source = format!("instr 1 do\n  line {}, 0, 0, 0\nend\n", input);
        first_line(&parse(&source).unwrap(), "1").xstart
    }

    #[test]
    fn test_parse_simple_line() {
        let defs = parse("instr 1, 2, 3, 4 do\n  line p2, p2+p3, 5, 5\nend\n").unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["1", "2", "3", "4"]);

        for (_, instr) in &defs {
            assert_eq!(instr.features.len(), 1);
            assert_eq!(instr.features[0].kind(), FeatureKind::Line);
            let line = instr.features[0].as_line().unwrap();
            assert_eq!(line.xstart, Expr::pfield(2));
            assert_eq!(
                line.xend,
                Expr::binary(Expr::pfield(2), Operator::Plus, Expr::pfield(3))
            );
            assert_eq!(line.ystart, Expr::Constant(Number::Int(5)));
            assert_eq!(line.yend, Expr::Constant(Number::Int(5)));
            assert!(line.options.is_empty());
        }
    }

    #[test]
    fn test_parse_adding_constants() {
        let defs = parse("instr 1, 10 do\n  line p2, p2+p3, 1000.2323 + p5, p5 + 990\nend\n").unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["1", "10"]);

        let line = first_line(&defs, "10");
        let ystart = line.ystart.as_binary().unwrap();
        assert_eq!(ystart.operator, Operator::Plus);
        let left = ystart.left.as_constant().unwrap();
        assert!(!left.is_int());
        assert_relative_eq!(left.as_f64(), 1000.2323);
        assert_eq!(*ystart.right, Expr::pfield(5));
        assert!(ystart.converters.is_empty());

        let yend = line.yend.as_binary().unwrap();
        assert_eq!(*yend.left, Expr::pfield(5));
        assert_eq!(yend.right.as_constant(), Some(Number::Int(990)));
    }

    #[test]
    fn test_parse_subtracting_constants() {
        let defs = parse("instr 1, 10 do\n  line p2, p2+p3, 1000.2323 - p5, p5 - 990\nend\n").unwrap();
        let line = first_line(&defs, "1");
        assert_eq!(line.xend.as_binary().unwrap().operator, Operator::Plus);

        let ystart = line.ystart.as_binary().unwrap();
        assert_eq!(ystart.operator, Operator::Minus);
        assert_relative_eq!(ystart.left.as_constant().unwrap().as_f64(), 1000.2323);
        assert_eq!(ystart.right.as_pfield().unwrap().number, 5);

        let yend = line.yend.as_binary().unwrap();
        assert_eq!(yend.operator, Operator::Minus);
        assert_eq!(yend.left.as_pfield().unwrap().number, 5);
        assert_relative_eq!(yend.right.as_constant().unwrap().as_f64(), 990.0);
    }

    #[test]
    fn test_parse_conversions() {
        let source = "instr 1, 2, 3, 4 do\n  line p2, p2+p3, cpspch(p5), cpspch(p5), :thickness => ampdb(p4)*3\nend\n";
        let defs = parse(source).unwrap();
        let line = first_line(&defs, "3");

        let ystart = line.ystart.as_pfield().unwrap();
        assert_eq!(ystart.number, 5);
        assert_eq!(ystart.converters, vec![Converter::new("cpspch")]);
        assert_eq!(line.yend.converters(), &[Converter::new("cpspch")]);

        let thickness = line.option("thickness").unwrap().as_binary().unwrap();
        assert_eq!(thickness.operator, Operator::Times);
        assert!(thickness.converters.is_empty());
        assert_eq!(thickness.left.converters(), &[Converter::new("ampdb")]);
        assert_eq!(thickness.left.as_pfield().unwrap().number, 4);
        assert_eq!(thickness.right.as_constant(), Some(Number::Int(3)));
    }

    #[test]
    fn test_parse_conversions_divide() {
        let source = "instr 1, 2, 3, 4 do\n  line p2, p2+p3, cpsoct(p5), cpsoct(p5), :thickness => ampdbfs(p4)/1000.0\nend\n";
        let line = first_line(&parse(source).unwrap(), "4");
        assert_eq!(line.ystart.converters(), &[Converter::new("cpsoct")]);

        let thickness = line.option("thickness").unwrap().as_binary().unwrap();
        assert_eq!(thickness.operator, Operator::Divide);
        assert!(thickness.converters.is_empty());
        assert_eq!(thickness.left.converters(), &[Converter::new("ampdbfs")]);
        assert_eq!(thickness.right.as_constant(), Some(Number::Float(1000.0)));
    }

    #[test]
    fn test_converter_on_composite_expression() {
        let e = expr("ampdb(p4 + 6)");
        let b = e.as_binary().unwrap();
        assert_eq!(b.converters, vec![Converter::new("ampdb")]);
        assert!(b.left.converters().is_empty());
    }

    #[test]
    fn test_nested_converters_outermost_first() {
        let e = expr("ampdb(cpspch(p5))");
        assert_eq!(
            e.converters(),
            &[Converter::new("ampdb"), Converter::new("cpspch")]
        );
        assert_eq!(e.as_pfield().unwrap().number, 5);
    }

    #[test]
    fn test_precedence_and_associativity() {
        // p2 + p3 * 2 => p2 + (p3 * 2)
        let e = expr("p2 + p3 * 2");
        let b = e.as_binary().unwrap();
        assert_eq!(b.operator, Operator::Plus);
        assert_eq!(b.right.as_binary().unwrap().operator, Operator::Times);

        // p2 - p3 - p4 => (p2 - p3) - p4
        let e = expr("p2 - p3 - p4");
        let b = e.as_binary().unwrap();
        assert_eq!(*b.right, Expr::pfield(4));
        assert_eq!(b.left.as_binary().unwrap().operator, Operator::Minus);

        // grouping overrides precedence
        let e = expr("(p2 + p3) * 2");
        assert_eq!(e.as_binary().unwrap().operator, Operator::Times);
    }

    #[test]
    fn test_negative_literal() {
        let e = expr("p2 * -1.5");
        let b = e.as_binary().unwrap();
        assert_eq!(b.right.as_constant(), Some(Number::Float(-1.5)));
        assert_eq!(expr("-3"), Expr::Constant(Number::Int(-3)));
    }

    #[test]
    fn test_most_negative_integer_literal() {
        assert_eq!(expr("-9223372036854775808"), Expr::Constant(Number::Int(i64::MIN)));
        assert!(parse("instr 1 do\n line 9223372036854775808, p3, p4, p5\nend").is_err());
        assert!(parse("instr 1 do\n line -9223372036854775809, p3, p4, p5\nend").is_err());
    }

    #[test]
    fn test_newlines_inside_parentheses() {
        assert_eq!(expr("(p3\n + 1)"), expr("p3 + 1"));
        assert_eq!(expr("(p3\n * 2\n - p4)"), expr("p3 * 2 - p4"));
        assert_eq!(expr("cpspch(p5\n + 1)"), expr("cpspch(p5 + 1)"));
        // Outside a group a newline still ends the statement
        assert!(parse("instr 1 do\n line p2, p3, p4, p5\n + 1\nend").is_err());
    }

    #[test]
    fn test_crlf_line_endings() {
        let crlf = "instr 1 do\r\n line p2, p3 \\\r\n + 1, p4, p5\r\nend\r\n";
        let lf = "instr 1 do\n line p2, p3 \\\n + 1, p4, p5\nend\n";
        assert_eq!(parse(crlf).unwrap(), parse(lf).unwrap());
    }

    #[test]
    fn test_coordinate_count_message() {
        let err = parse("instr 1 do\n line p2, p3, p4\nend").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error at line 2, column 2: 'line' expects 4 coordinates, got 3"
        );
        let err = parse("instr 1 do\n line p2, p3, p4, p5, p6\nend").unwrap_err();
        assert!(err.to_string().ends_with("'line' expects 4 coordinates, got 5"));
    }

    #[test]
    fn test_bare_option_name_and_brace_block() {
        let defs = parse("instr 7 { line p2, p3, 0, 1, thickness => 2, color => p6 }").unwrap();
        let line = first_line(&defs, "7");
        let names: Vec<_> = line.options.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["thickness", "color"]);
        assert_eq!(line.option("color"), Some(&Expr::pfield(6)));
    }

    #[test]
    fn test_multiple_features_and_blocks() {
        let source = "\
# two instruments
instr 2 do
  line p2, p2+p3, 0, 0
  line p2, p2, 0, p4; line p2+p3, p2+p3, 0, p4
end

instr 1 do
  line p2, p2 + p3,
       p4, p4
end
";
        let defs = parse(source).unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["2", "1"]);
        assert_eq!(defs.get("2").unwrap().features.len(), 3);
        assert_eq!(defs.get("1").unwrap().features.len(), 1);
    }

    #[test]
    fn test_multi_id_block_shares_features() {
        let defs = parse("instr 1, 2 do\n line p2, p3, p4, p5\nend").unwrap();
        assert_eq!(defs.get("1"), defs.get("2"));
    }

    #[test]
    fn test_instrument_keys_are_canonical() {
        let defs = parse("instr 01 do\n line p2, p3, p4, p5\nend").unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn test_empty_score() {
        let defs = parse("# nothing here\n\n").unwrap();
        assert!(defs.is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            "instr 1 do\n  line p2, p2+p3, 5, 5\n",          // unterminated
            "instr 1 do\nend\n",                             // no features
            "instr do\n line p2, p3, p4, p5\nend",           // missing id
            "instr 1\n line p2, p3, p4, p5\nend",            // missing do
            "instr 1 do\n line p2, p3, p4\nend",             // too few coordinates
            "instr 1 do\n line p2, p3, p4, p5, p6\nend",     // too many coordinates
            "instr 1 do\n circle p2, p3, p4, p5\nend",       // unknown feature
            "instr 1 do\n line p2, p3 +, p4, p5\nend",       // dangling operator
            "instr 1 do\n line p0, p3, p4, p5\nend",         // p0
            "instr 1 do\n line q2, p3, p4, p5\nend",         // unknown identifier
            "instr 1 do\n line p2, p3, (p4, p5\nend",        // unbalanced paren
            "instr 1 do\n line p2, :w => 1, p3, p4, p5\nend", // positional after option
            "instr 1 do\n line p2, p3, p4, p5, :w => 1, :w => 2\nend", // duplicate option
            "instr 1 do\n line p2, p3, p4, cpspch(5)\nend",  // converter on constant
            "instr 1 do\n line p2, p3, p4, p5(p2)\nend",     // p-field called
            "instr 1 do\n line p2, p3, p4, p5 p6\nend",      // missing separator
            "instr 1 do\n line p2, p3, p4, p5\nend instr 2", // junk after block
            "instr 1 do\n line p2, p3, p4, p5\nend\ninstr 1 do\n line p2, p3, p4, p5\nend", // duplicate id
            "instr 3, 3 do\n line p2, p3, p4, p5\nend",      // duplicate id in one block
            "line p2, p3, p4, p5",                           // feature outside a block
            "really wrong {{{",
        ];
        for source in cases {
            match parse(source) {
                Err(err) => assert!(err.is_syntax_error(), "{source:?}: {err}"),
                Ok(defs) => panic!("{source:?} parsed to {defs:?}"),
            }
        }
    }

    #[test]
    fn test_error_location() {
        let err = parse("instr 1 do\n  line p2, p3, p4, @\nend").unwrap_err();
        match err {
            CsgError::SyntaxError { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_converter_policy() {
        let source = "instr 1 do\n line p2, p3, p4, mtof(p5)\nend";

        let defs = parse(source).unwrap();
        assert_eq!(first_line(&defs, "1").yend.converters(), &[Converter::new("mtof")]);

        let strict = ParserConfig::new().strict();
        let err = super::super::parse_with_config(source, &strict).unwrap_err();
        assert!(err.to_string().contains("unknown converter 'mtof'"));

        let custom = ParserConfig::new()
            .with_converters(ConverterSet::new().with("mtof"))
            .strict();
        assert!(super::super::parse_with_config(source, &custom).is_ok());
    }
}
