//! Lexer (tokenizer) for CDL source text.
//!
//! The lexer never fails: malformed input becomes a [`TokenKind::Error`]
//! token carrying a message, and tokenization resumes after the bad text.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::diagnostics::Position;
use crate::model::NcType;

/// Reserved words recognised by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `netcdf` header
    Netcdf,
    /// `dimensions:` (the colon is part of the keyword)
    Dimensions,
    /// `variables:`
    Variables,
    /// `data:`
    Data,
    /// A type keyword or one of its aliases
    Type(NcType),
    /// `unlimited` dimension size
    Unlimited,
}

impl Keyword {
    /// True for the three section keywords.
    pub fn is_section(&self) -> bool {
        matches!(self, Self::Dimensions | Self::Variables | Self::Data)
    }
}

/// Token types in CDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A dimension, variable or attribute name
    Identifier,
    Keyword(Keyword),
    /// An integer constant, possibly with a type suffix
    IntLiteral,
    /// A floating-point constant, possibly with a type suffix
    FloatLiteral,
    /// A double-quoted string
    StringLiteral,
    /// A single-quoted character constant
    CharLiteral,
    /// The `_` fill-value placeholder
    FillValue,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Equals,
    Comma,
    Colon,
    Semicolon,
    /// Malformed input; the message is in [`TokenValue::Error`]
    Error,
    /// End of input
    Eof,
}

impl TokenKind {
    /// True for tokens that can appear in a literal list.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::FloatLiteral
                | Self::StringLiteral
                | Self::CharLiteral
                | Self::FillValue
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Identifier => "name",
            Self::Keyword(Keyword::Netcdf) => "'netcdf'",
            Self::Keyword(Keyword::Dimensions) => "'dimensions:'",
            Self::Keyword(Keyword::Variables) => "'variables:'",
            Self::Keyword(Keyword::Data) => "'data:'",
            Self::Keyword(Keyword::Type(_)) => "type keyword",
            Self::Keyword(Keyword::Unlimited) => "'unlimited'",
            Self::IntLiteral => "integer constant",
            Self::FloatLiteral => "floating-point constant",
            Self::StringLiteral => "string",
            Self::CharLiteral => "character constant",
            Self::FillValue => "'_'",
            Self::OpenBrace => "'{'",
            Self::CloseBrace => "'}'",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::Equals => "'='",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Semicolon => "';'",
            Self::Error => "invalid token",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// Type suffix of a numeric constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    /// `b` / `B`
    Byte,
    /// `s` / `S`
    Short,
    /// `l` / `L`
    Long,
    /// `f` / `F`
    Float,
    /// `d` / `D`
    Double,
}

impl Suffix {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            'b' | 'B' => Some(Self::Byte),
            's' | 'S' => Some(Self::Short),
            'l' | 'L' => Some(Self::Long),
            'f' | 'F' => Some(Self::Float),
            'd' | 'D' => Some(Self::Double),
            _ => None,
        }
    }

    /// Storage type selected by the suffix.
    pub fn nc_type(&self) -> NcType {
        match self {
            Self::Byte => NcType::Byte,
            Self::Short => NcType::Short,
            Self::Long => NcType::Int,
            Self::Float => NcType::Float,
            Self::Double => NcType::Double,
        }
    }
}

/// Decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int { value: i64, suffix: Option<Suffix> },
    Float { value: f64, suffix: Option<Suffix> },
    /// Character constant
    Char(u8),
    /// String with escapes expanded
    Text(Vec<u8>),
    /// The `_` placeholder
    Fill,
}

/// Payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    /// Identifier with escapes removed
    Name(String),
    Literal(LiteralValue),
    /// Message of a lexical error
    Error(String),
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token
    pub text: String,
    pub value: TokenValue,
    /// Position of the first character
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, text: String, value: TokenValue, position: Position) -> Self {
        Self {
            kind,
            text,
            value,
            position,
        }
    }

    pub fn is_section_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(kw) if kw.is_section())
    }

    /// Name for identifiers (escapes removed), source text otherwise.
    pub fn name(&self) -> &str {
        match &self.value {
            TokenValue::Name(name) => name,
            _ => &self.text,
        }
    }

    pub fn literal(&self) -> Option<&LiteralValue> {
        match &self.value {
            TokenValue::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Error(message) => Some(message),
            _ => None,
        }
    }
}

type Lexed = (TokenKind, TokenValue);

fn lex_error(message: impl Into<String>) -> Lexed {
    (TokenKind::Error, TokenValue::Error(message.into()))
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '@' | '+' | '-') || !ch.is_ascii()
}

fn is_number_tail(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

const SPECIAL_FLOATS: [&str; 6] = ["NaN", "nan", "Infinity", "infinity", "Inf", "inf"];

fn special_float(word: &str) -> Option<(f64, Option<Suffix>)> {
    let value = |base: &str| {
        if base.eq_ignore_ascii_case("nan") {
            f64::NAN
        } else {
            f64::INFINITY
        }
    };
    if SPECIAL_FLOATS.contains(&word) {
        return Some((value(word), None));
    }
    let base = word.strip_suffix('f')?;
    SPECIAL_FLOATS
        .contains(&base)
        .then(|| (value(base), Some(Suffix::Float)))
}

/// Saved lexer state for backtracking.
#[derive(Debug, Clone)]
pub struct Checkpoint<'a> {
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    finished: bool,
}

/// Lexer for tokenizing CDL input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Save the current position.
    pub fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint {
            chars: self.chars.clone(),
            line: self.line,
            column: self.column,
            finished: self.finished,
        }
    }

    /// Rewind to a saved position.
    pub fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.chars = checkpoint.chars;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.finished = checkpoint.finished;
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Token {
        let saved = self.checkpoint();
        let token = self.next_token();
        self.restore(saved);
        token
    }

    /// Get the next token. Returns `Eof` repeatedly at the end of input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let position = Position::new(self.line, self.column);
        let start = self.offset();
        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, String::new(), TokenValue::None, position);
        };

        let (kind, value) = match ch {
            '{' => self.punctuation(TokenKind::OpenBrace),
            '}' => self.punctuation(TokenKind::CloseBrace),
            '(' => self.punctuation(TokenKind::OpenParen),
            ')' => self.punctuation(TokenKind::CloseParen),
            '=' => self.punctuation(TokenKind::Equals),
            ',' => self.punctuation(TokenKind::Comma),
            ':' => self.punctuation(TokenKind::Colon),
            ';' => self.punctuation(TokenKind::Semicolon),
            '"' => self.read_string(),
            '\'' => self.read_char_constant(),
            '0'..='9' => self.read_number(false),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(false),
            '+' | '-' => self.read_signed(ch == '-'),
            '\\' => self.read_word(),
            _ if is_name_start(ch) => self.read_word(),
            _ => {
                self.advance();
                lex_error(format!("unexpected character '{}'", ch.escape_default()))
            }
        };

        let end = self.offset();
        Token::new(kind, self.input[start..end].to_string(), value, position)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(pos, _)| pos)
            .unwrap_or(self.input.len())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_nth(1) == Some('/') {
                self.skip_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    fn punctuation(&mut self, kind: TokenKind) -> Lexed {
        self.advance();
        (kind, TokenValue::None)
    }

    /// Read a name, keyword, `_` or special float constant.
    fn read_word(&mut self) -> Lexed {
        let (word, escaped) = match self.read_name() {
            Ok(name) => name,
            Err(message) => return lex_error(message),
        };
        if escaped {
            return (TokenKind::Identifier, TokenValue::Name(word));
        }
        if word == "_" {
            return (TokenKind::FillValue, TokenValue::Literal(LiteralValue::Fill));
        }
        if matches!(word.as_str(), "netcdf" | "NETCDF" | "netCDF") {
            return (TokenKind::Keyword(Keyword::Netcdf), TokenValue::None);
        }
        if self.peek() == Some(':') {
            let section = match word.as_str() {
                "dimensions" | "DIMENSIONS" => Some(Keyword::Dimensions),
                "variables" | "VARIABLES" => Some(Keyword::Variables),
                "data" | "DATA" => Some(Keyword::Data),
                _ => None,
            };
            if let Some(section) = section {
                self.advance();
                return (TokenKind::Keyword(section), TokenValue::None);
            }
        }
        if let Some((value, suffix)) = special_float(&word) {
            return (
                TokenKind::FloatLiteral,
                TokenValue::Literal(LiteralValue::Float { value, suffix }),
            );
        }
        if let Some(nc_type) = NcType::from_keyword(&word) {
            return (TokenKind::Keyword(Keyword::Type(nc_type)), TokenValue::None);
        }
        if word.eq_ignore_ascii_case("unlimited") {
            return (TokenKind::Keyword(Keyword::Unlimited), TokenValue::None);
        }
        (TokenKind::Identifier, TokenValue::Name(word))
    }

    /// Read name characters, removing backslash escapes.
    fn read_name(&mut self) -> Result<(String, bool), String> {
        let mut name = String::new();
        let mut escaped = false;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.advance();
                match self.advance() {
                    Some(c) if c != '\n' => name.push(c),
                    _ => return Err("dangling '\\' in name".to_string()),
                }
                escaped = true;
            } else if is_name_char(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok((name, escaped))
    }

    /// A sign followed by a number or a signed special float (`-Infinity`).
    fn read_signed(&mut self, negative: bool) -> Lexed {
        self.advance();
        match self.peek() {
            Some(c) if c.is_ascii_digit() => self.read_number(negative),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(negative)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = match self.read_name() {
                    Ok((word, _)) => word,
                    Err(message) => return lex_error(message),
                };
                match special_float(&word) {
                    Some((value, suffix)) => {
                        let value = if negative { -value } else { value };
                        (
                            TokenKind::FloatLiteral,
                            TokenValue::Literal(LiteralValue::Float { value, suffix }),
                        )
                    }
                    None => lex_error(format!("malformed numeric constant near '{}'", word)),
                }
            }
            _ => lex_error("sign without a number"),
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    fn exponent_follows(&self) -> bool {
        match self.peek_nth(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Read a decimal, octal or hexadecimal constant. Any sign is already consumed.
    fn read_number(&mut self, negative: bool) -> Lexed {
        if self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X')) {
            return self.read_hex(negative);
        }

        let mut mantissa = String::new();
        if negative {
            mantissa.push('-');
        }
        let mut is_float = false;
        self.take_digits(&mut mantissa);
        if self.peek() == Some('.') {
            is_float = true;
            mantissa.push('.');
            self.advance();
            self.take_digits(&mut mantissa);
        }
        if matches!(self.peek(), Some('e' | 'E')) && self.exponent_follows() {
            is_float = true;
            mantissa.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                mantissa.push(sign);
                self.advance();
            }
            self.take_digits(&mut mantissa);
        }

        let suffix = self.peek().and_then(Suffix::from_char);
        if suffix.is_some() {
            self.advance();
        }
        if self.peek().is_some_and(is_number_tail) {
            self.skip_while(is_number_tail);
            return lex_error("malformed numeric constant");
        }

        if is_float {
            let suffix = match suffix {
                Some(Suffix::Byte | Suffix::Short) => {
                    return lex_error("integer type suffix on a floating-point constant")
                }
                Some(Suffix::Long) => Some(Suffix::Double),
                other => other,
            };
            return match mantissa.parse::<f64>() {
                Ok(value) => (
                    TokenKind::FloatLiteral,
                    TokenValue::Literal(LiteralValue::Float { value, suffix }),
                ),
                Err(_) => lex_error("malformed floating-point constant"),
            };
        }

        let digits = mantissa.trim_start_matches('-');
        let parsed = if digits.len() > 1 && digits.starts_with('0') {
            if digits.bytes().any(|b| b > b'7') {
                return lex_error("invalid digit in octal constant");
            }
            i64::from_str_radix(digits, 8).map(|v| if negative { -v } else { v })
        } else {
            mantissa.parse::<i64>()
        };
        match parsed {
            Ok(value) => (
                TokenKind::IntLiteral,
                TokenValue::Literal(LiteralValue::Int { value, suffix }),
            ),
            Err(_) => lex_error("integer constant out of range"),
        }
    }

    /// Hexadecimal constants take only the `s` and `l` suffixes.
    fn read_hex(&mut self, negative: bool) -> Lexed {
        self.advance();
        self.advance();
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_hexdigit() {
                break;
            }
            digits.push(ch);
            self.advance();
        }
        let suffix = match self.peek() {
            Some('s' | 'S') => Some(Suffix::Short),
            Some('l' | 'L') => Some(Suffix::Long),
            _ => None,
        };
        if suffix.is_some() {
            self.advance();
        }
        if digits.is_empty() || self.peek().is_some_and(is_number_tail) {
            self.skip_while(is_number_tail);
            return lex_error("malformed hexadecimal constant");
        }
        match i64::from_str_radix(&digits, 16) {
            Ok(value) => (
                TokenKind::IntLiteral,
                TokenValue::Literal(LiteralValue::Int {
                    value: if negative { -value } else { value },
                    suffix,
                }),
            ),
            Err(_) => lex_error("integer constant out of range"),
        }
    }

    /// Decode the escape after a consumed backslash.
    fn read_escape(&mut self) -> Result<u8, String> {
        let Some(ch) = self.peek() else {
            return Err("escape at end of input".to_string());
        };
        match ch {
            '0'..='7' => {
                let mut code = 0u32;
                for _ in 0..3 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.advance();
                        }
                        None => break,
                    }
                }
                u8::try_from(code).map_err(|_| format!("octal escape \\{:o} out of range", code))
            }
            'x' | 'X' => {
                self.advance();
                let mut code = 0u32;
                let mut count = 0;
                while count < 2 {
                    match self.peek().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            code = code * 16 + digit;
                            count += 1;
                            self.advance();
                        }
                        None => break,
                    }
                }
                if count == 0 {
                    return Err("\\x used with no following hex digits".to_string());
                }
                Ok(code as u8)
            }
            '\n' => Err("unterminated escape at end of line".to_string()),
            _ => {
                self.advance();
                let byte = match ch {
                    'n' => b'\n',
                    't' => b'\t',
                    'r' => b'\r',
                    'a' => 0x07,
                    'b' => 0x08,
                    'f' => 0x0c,
                    'v' => 0x0b,
                    c if c.is_ascii() => c as u8,
                    c => return Err(format!("invalid escape '\\{}'", c)),
                };
                Ok(byte)
            }
        }
    }

    /// Read a double-quoted string. A newline or end of input terminates it as an error.
    fn read_string(&mut self) -> Lexed {
        self.advance();
        let mut bytes = Vec::new();
        let mut problem = None;
        loop {
            match self.peek() {
                None | Some('\n') => return lex_error("unterminated string"),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.read_escape() {
                        Ok(byte) => bytes.push(byte),
                        Err(message) => {
                            problem.get_or_insert(message);
                        }
                    }
                }
                Some(ch) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    self.advance();
                }
            }
        }
        match problem {
            Some(message) => lex_error(message),
            None => (
                TokenKind::StringLiteral,
                TokenValue::Literal(LiteralValue::Text(bytes)),
            ),
        }
    }

    /// Read a single-quoted character constant such as `'a'` or `'\101'`.
    fn read_char_constant(&mut self) -> Lexed {
        self.advance();
        let byte = match self.peek() {
            None | Some('\n') | Some('\'') => Err("empty character constant".to_string()),
            Some('\\') => {
                self.advance();
                self.read_escape()
            }
            Some(ch) if ch.is_ascii() => {
                self.advance();
                Ok(ch as u8)
            }
            Some(_) => {
                self.advance();
                Err("character constant must be a single byte".to_string())
            }
        };
        if self.peek() != Some('\'') {
            self.skip_while(|c| c != '\'' && c != '\n');
            if self.peek() == Some('\'') {
                self.advance();
            }
            return lex_error("unterminated or over-long character constant");
        }
        self.advance();
        match byte {
            Ok(byte) => (
                TokenKind::CharLiteral,
                TokenValue::Literal(LiteralValue::Char(byte)),
            ),
            Err(message) => lex_error(message),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields tokens up to and including a single `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}
