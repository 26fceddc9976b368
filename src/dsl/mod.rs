//! DSL (Domain Specific Language) parser for graphic score definitions.
//!
//! The language borrows its vocabulary from Csound orchestras: an `instr`
//! block is declared for one or more instrument numbers, and each statement
//! inside it draws a feature whose coordinates are expressions over the
//! p-fields of the score events that will later play that instrument.
//!
//! # Grammar Overview
//!
//! ```text
//! score      = { separator } { block { separator } }
//! block      = "instr" id { "," id } ( "do" body "end" | "{" body "}" )
//! body       = { separator } { feature { separator } }
//! feature    = "line" expr "," expr "," expr "," expr { "," option }
//! option     = ( ":" name | name ) "=>" expr
//!
//! expr       = term { ("+" | "-") term }
//! term       = unary { ("*" | "/") unary }
//! unary      = "-" number | primary
//! primary    = number | pfield | converter "(" expr ")" | "(" expr ")"
//!
//! id         = digit+
//! pfield     = 'p' digit+
//! number     = digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! separator  = newline | ';'
//! comment    = '#' { any_char }
//! ```
//!
//! A newline directly after `,`, an operator, `=>` or `(` continues the
//! statement, as does a trailing `\` (before LF or CRLF). Inside parentheses
//! newlines are insignificant everywhere, including before an operator.
//!
//! # Converters
//!
//! A converter call such as `cpspch(p5)` does not create a node of its own:
//! the converter name is attached to the node it wraps. Nested calls are
//! recorded outermost first, so `ampdb(cpspch(p5))` yields a `p5` node with
//! converters `[ampdb, cpspch]`. Constants cannot carry converters.
//!
//! # Example
//!
//! ```text
//! instr 1, 2, 3, 4 do
//!   line p2, p2+p3, cpspch(p5), cpspch(p5), :thickness => ampdb(p4)*3
//! end
//! ```

mod ast;
mod format;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, ParserConfig};

use crate::definitions::Definitions;
use crate::error::Result;

/// Parse score DSL source into instrument definitions.
pub fn parse(input: &str) -> Result<Definitions> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse score DSL source with a custom parser configuration.
pub fn parse_with_config(input: &str, config: &ParserConfig) -> Result<Definitions> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::with_config(lexer, config.clone());
    parser.parse()
}

/// Read and parse a score file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path, config: &ParserConfig) -> Result<Definitions> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::CsgError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_with_config(&content, config)
}
