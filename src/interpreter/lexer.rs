use std::fmt;

use logos::Logos;

use crate::error::LexError;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
///
/// Keywords are declared with `#[token]` so that they win over the identifier
/// pattern on equal length, while longer identifiers such as `iffy` or
/// `nullable` still lex as identifiers.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Whitespace, including newlines.
    #[regex(r"[ \t\r\n\f]+", |lex| {
        let text = lex.slice();
        if let Some(last) = text.rfind('\n') {
            lex.extras.line += text.matches('\n').count();
            lex.extras.line_start = lex.span().start + last + 1;
        }
        logos::Skip
    })]
    Whitespace,
    /// `// Comments.`
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    Comment,

    /// Boolean literal tokens, `true` or `false`.
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),
    /// `null`
    #[token("null")]
    Null,

    /// `&&`, also spelled `and`.
    #[token("&&")]
    #[token("and")]
    AndAnd,
    /// `||`, also spelled `or`.
    #[token("||")]
    #[token("or")]
    OrOr,
    /// `!`, also spelled `not`.
    #[token("!")]
    #[token("not")]
    Bang,

    /// `function`
    #[token("function")]
    Function,
    /// `return`
    #[token("return")]
    Return,
    /// `extern`
    #[token("extern")]
    Extern,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `while`
    #[token("while")]
    While,
    /// `for` is reserved but no statement uses it yet.
    #[token("for")]
    For,
    /// `break`
    #[token("break")]
    Break,
    /// `continue`
    #[token("continue")]
    Continue,
    /// `print`
    #[token("print")]
    Print,
    /// `import`
    #[token("import")]
    Import,
    /// `exit`
    #[token("exit")]
    Exit,
    /// `assert`
    #[token("assert")]
    Assert,

    /// Real literal tokens, such as `3.14`, `.5` or `2.`.
    #[regex(r"[0-9]+\.[0-9]*", parse_real)]
    #[regex(r"\.[0-9]+", parse_real)]
    Real(f64),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_integer)]
    Integer(i64),
    /// Double-quoted string literal tokens; only `\"` and `\\` are decoded.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()), allow_greedy = true)]
    Str(String),
    /// Identifier tokens; variable or function names such as `x` or `square`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `=`
    #[token("=")]
    Equals,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `|`
    #[token("|")]
    Pipe,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `.`
    #[token(".")]
    Dot,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,

    /// End-of-input sentinel appended by [`scan`]; never produced by the
    /// generated lexer itself.
    Eof,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line and the byte offset where it starts, so that
/// every token can be given a line and column for diagnostics.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// A token together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token itself.
    pub token:    Token,
    /// Byte offset of the token in the source.
    pub position: usize,
    /// Line (1-based) on which the token starts.
    pub line:     usize,
    /// Column (1-based, in characters) at which the token starts.
    pub column:   usize,
}

/// Converts source text into tokens, left to right.
///
/// Whitespace and `//` comments are discarded. The returned sequence always
/// ends with a [`Token::Eof`] lexeme positioned at the end of the input.
///
/// # Errors
/// Returns a [`LexError`] for the first character that no token pattern
/// accepts. Scanning stops there.
///
/// # Example
/// ```
/// use quill::interpreter::lexer::{Token, scan};
///
/// let tokens = scan("x = 1;").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.token.clone()).collect();
///
/// assert_eq!(kinds,
///            vec![Token::Identifier("x".into()),
///                 Token::Equals,
///                 Token::Integer(1),
///                 Token::Semicolon,
///                 Token::Eof]);
/// ```
pub fn scan(source: &str) -> Result<Vec<Lexeme>, LexError> {
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());
    let mut lexemes = Vec::new();

    while let Some(result) = lexer.next() {
        let position = lexer.span().start;
        let line = lexer.extras.line;
        let column = column_of(source, lexer.extras.line_start, position);

        let Ok(token) = result else {
            let character = lexer.slice().chars().next().unwrap_or_default();
            return Err(LexError::UnexpectedCharacter { character,
                                                       line,
                                                       column });
        };

        // String literals may span lines.
        let slice = lexer.slice();
        if let Some(last) = slice.rfind('\n') {
            lexer.extras.line += slice.matches('\n').count();
            lexer.extras.line_start = position + last + 1;
        }

        lexemes.push(Lexeme { token,
                              position,
                              line,
                              column });
    }

    lexemes.push(Lexeme { token:    Token::Eof,
                          position: source.len(),
                          line:     lexer.extras.line,
                          column:   column_of(source, lexer.extras.line_start, source.len()), });

    Ok(lexemes)
}

fn column_of(source: &str, line_start: usize, position: usize) -> usize {
    source.get(line_start..position)
          .map_or(1, |prefix| prefix.chars().count() + 1)
}

/// Parses a real literal from the current token slice.
///
/// # Returns
/// - `Some(f64)`: The parsed floating-point value if successful.
/// - `None`: If the token slice is not a valid float.
fn parse_real(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses an integer literal from the current token slice.
///
/// Literals that do not fit in an `i64` are rejected, which surfaces as a
/// lexical error on their first digit.
fn parse_integer(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Strips the quotes from a string literal and decodes `\"` and `\\`.
/// Any other backslash sequence is kept verbatim.
fn unescape(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                },
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }

    out
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Bool(b) => return write!(f, "'{b}'"),
            Self::Real(r) => return write!(f, "number {r:?}"),
            Self::Integer(n) => return write!(f, "number {n}"),
            Self::Str(s) => return write!(f, "string {s:?}"),
            Self::Identifier(name) => return write!(f, "identifier '{name}'"),
            Self::Eof => return write!(f, "end of input"),
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Null => "null",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::Function => "function",
            Self::Return => "return",
            Self::Extern => "extern",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Print => "print",
            Self::Import => "import",
            Self::Exit => "exit",
            Self::Assert => "assert",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Equals => "=",
            Self::Ampersand => "&",
            Self::Pipe => "|",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::Semicolon => ";",
        };
        write!(f, "'{symbol}'")
    }
}
