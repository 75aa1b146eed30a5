//! Token definitions

use crate::common::Span;
use logos::Logos;
use std::fmt;

/// Token with its source line and byte span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }

    /// Identifier text, if this is an identifier token
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// All token kinds of the language
///
/// Literal payloads live on the variant, so exactly one of
/// text/integer/float is ever present on a token. Keywords match in any
/// letter case; identifiers are folded to lower case.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // === Keywords ===
    #[token("program", ignore(ascii_case))]
    Program,
    #[token("is", ignore(ascii_case))]
    Is,
    #[token("begin", ignore(ascii_case))]
    Begin,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("global", ignore(ascii_case))]
    Global,
    #[token("procedure", ignore(ascii_case))]
    Procedure,
    #[token("variable", ignore(ascii_case))]
    Variable,
    #[token("type", ignore(ascii_case))]
    Type,
    #[token("integer", ignore(ascii_case))]
    Integer,
    #[token("float", ignore(ascii_case))]
    Float,
    #[token("string", ignore(ascii_case))]
    String,
    #[token("bool", ignore(ascii_case))]
    Bool,
    #[token("enum", ignore(ascii_case))]
    Enum,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    /// `not` is spelled like a keyword but acts as the logical negation operator
    #[token("not", ignore(ascii_case))]
    Not,

    // === Literals ===
    #[regex(r"\p{L}[\p{L}\p{Nd}_]*", |lex| lex.slice().to_lowercase())]
    Identifier(String),
    #[regex(r"[0-9][0-9_]*", priority = 2, callback = int_literal)]
    IntLiteral(i64),
    #[regex(r"[0-9][0-9_]*\.[0-9_]*", priority = 3, callback = float_literal)]
    FloatLiteral(f64),
    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    StringLiteral(String),

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // === Operators ===
    #[token(":=")]
    Assign,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    // === Comment markers ===
    // Consumed by the scanner, never handed to the parser
    #[token("/*")]
    CommentOpen,
    #[token("*/")]
    CommentClose,
}

/// Digits with `_` separators removed
fn strip_separators(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

fn int_literal(lex: &mut logos::Lexer<TokenKind>) -> Option<i64> {
    strip_separators(lex.slice()).parse().ok()
}

fn float_literal(lex: &mut logos::Lexer<TokenKind>) -> Option<f64> {
    strip_separators(lex.slice()).parse().ok()
}

impl TokenKind {
    pub fn is_relational_op(&self) -> bool {
        matches!(
            self,
            TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::EqEq
                | TokenKind::NotEq
        )
    }

    /// Source spelling of keywords and symbols
    pub fn spelling(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Program => "program",
            TokenKind::Is => "is",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::Global => "global",
            TokenKind::Procedure => "procedure",
            TokenKind::Variable => "variable",
            TokenKind::Type => "type",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Bool => "bool",
            TokenKind::Enum => "enum",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Not => "not",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Assign => ":=",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::CommentOpen => "/*",
            TokenKind::CommentClose => "*/",
            TokenKind::Identifier(_)
            | TokenKind::IntLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::StringLiteral(_) => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{s}'"),
            TokenKind::IntLiteral(v) => write!(f, "integer '{v}'"),
            TokenKind::FloatLiteral(v) => write!(f, "float '{v}'"),
            TokenKind::StringLiteral(s) => write!(f, "string \"{s}\""),
            other => match other.spelling() {
                Some(text) => write!(f, "'{text}'"),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

/// One line of the human-readable token dump: `Ln:<line> | <kind> | <value>`
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Identifier(s) => write!(f, "Ln:{} | IdentifierToken | {s}", self.line),
            TokenKind::IntLiteral(v) => write!(f, "Ln:{} | IntegerToken | {v}", self.line),
            TokenKind::FloatLiteral(v) => write!(f, "Ln:{} | FloatToken | {v}", self.line),
            TokenKind::StringLiteral(s) => write!(f, "Ln:{} | StringToken | {s}", self.line),
            other => write!(f, "Ln:{} | {} |", self.line, other.spelling().unwrap_or("?")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_one(text: &str) -> TokenKind {
        let mut lex = TokenKind::lexer(text);
        let kind = lex.next().unwrap().unwrap();
        assert_eq!(lex.next(), None, "{text:?} should be a single token");
        kind
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(lex_one("procedure"), TokenKind::Procedure);
        assert_eq!(lex_one("PROCEDURE"), TokenKind::Procedure);
        assert_eq!(lex_one("Not"), TokenKind::Not);
        assert_eq!(lex_one("proc"), TokenKind::Identifier("proc".into()));
        assert_eq!(lex_one("Procedures"), TokenKind::Identifier("procedures".into()));
        assert_eq!(lex_one("ENDE"), TokenKind::Identifier("ende".into()));
    }

    #[test]
    fn test_lone_equals_and_bang_do_not_lex() {
        assert_eq!(TokenKind::lexer("=").next(), Some(Err(())));
        assert_eq!(TokenKind::lexer("!").next(), Some(Err(())));
    }

    #[test]
    fn test_spelling_round_trips_through_lexer() {
        for text in [
            "program", "is", "begin", "end", "global", "if", "then", "true", "(", "]", ":=",
            "<=", ">=", "==", "!=", "&", "|",
        ] {
            assert_eq!(lex_one(text).spelling(), Some(text));
        }
    }

    #[test]
    fn test_literal_payloads() {
        assert_eq!(lex_one("1_024"), TokenKind::IntLiteral(1024));
        assert_eq!(lex_one("2.5"), TokenKind::FloatLiteral(2.5));
        assert_eq!(lex_one("\"a b\""), TokenKind::StringLiteral("a b".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Semi.to_string(), "';'");
        assert_eq!(TokenKind::Identifier("x".into()).to_string(), "identifier 'x'");
        assert_eq!(TokenKind::IntLiteral(42).to_string(), "integer '42'");
    }

    #[test]
    fn test_dump_line() {
        let token = Token::new(TokenKind::Identifier("count".into()), 4, Span::new(0, 5));
        assert_eq!(token.to_string(), "Ln:4 | IdentifierToken | count");
        let token = Token::new(TokenKind::Begin, 2, Span::new(0, 5));
        assert_eq!(token.to_string(), "Ln:2 | begin |");
    }
}
