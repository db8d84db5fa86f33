//! Recursive-descent parser for CDL with statement-level error recovery.
//!
//! The parser never aborts on bad input. A malformed statement becomes a
//! `Syntax` diagnostic, the tokens up to the next `;` (or the next section
//! keyword, `}` or end of input) are discarded, and parsing continues.
//! Lexical errors are reported once, when the bad token is reached.

use tracing::trace;

use super::ast::*;
use super::lexer::{Keyword, Lexer, Token, TokenKind, TokenValue};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Position};
use crate::model::NcType;

/// A statement that did not match the grammar.
#[derive(Debug)]
struct SyntaxFault {
    position: Position,
    message: String,
    /// Raised at a lexical error token, which is already reported
    lexical: bool,
}

type Parsed<T> = std::result::Result<T, SyntaxFault>;

/// Parser for CDL source.
pub struct Parser<'a, 'd> {
    lexer: Lexer<'a>,
    current: Token,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> Parser<'a, 'd> {
    /// Create a parser reporting into the given collector.
    pub fn new(mut lexer: Lexer<'a>, diagnostics: &'d mut Diagnostics) -> Self {
        let current = lexer.next_token();
        report_lexical(diagnostics, &current);
        Self {
            lexer,
            current,
            diagnostics,
        }
    }

    /// Parse the whole `netcdf <name> { ... }` block.
    pub fn parse(&mut self) -> CdlAst {
        let mut ast = CdlAst::new();
        ast.position = self.current.position;

        if let Err(fault) = self.parse_header(&mut ast) {
            self.recover_header(fault);
        }
        self.parse_sections(&mut ast);
        if !self.diagnostics.limit_reached() {
            self.parse_footer();
        }
        ast
    }

    /// Move to the next token, returning the previous one.
    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        report_lexical(self.diagnostics, &next);
        std::mem::replace(&mut self.current, next)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Parsed<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxFault {
        let found = match self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Identifier
            | TokenKind::Keyword(_)
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::Error => format!("{} '{}'", self.current.kind, self.current.text),
            kind => kind.to_string(),
        };
        SyntaxFault {
            position: self.current.position,
            message: format!("expected {}, found {}", expected, found),
            lexical: self.at(TokenKind::Error),
        }
    }

    /// A dimension, variable or dataset name.
    fn expect_name(&mut self, what: &str) -> Parsed<String> {
        if self.at(TokenKind::Identifier) {
            Ok(self.bump().name().to_string())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Attribute names may collide with type keywords (`x:long = 1`).
    fn expect_attribute_name(&mut self) -> Parsed<String> {
        match self.current.kind {
            TokenKind::Identifier
            | TokenKind::Keyword(Keyword::Type(_))
            | TokenKind::Keyword(Keyword::Unlimited) => Ok(self.bump().name().to_string()),
            _ => Err(self.unexpected("attribute name")),
        }
    }

    fn parse_header(&mut self, ast: &mut CdlAst) -> Parsed<()> {
        ast.position = self.current.position;
        self.expect(TokenKind::Keyword(Keyword::Netcdf))?;
        ast.name = self.expect_name("dataset name")?;
        self.expect(TokenKind::OpenBrace)?;
        Ok(())
    }

    /// Skip to the opening brace or the first section keyword.
    fn recover_header(&mut self, fault: SyntaxFault) {
        let mut skipped = 0;
        while !matches!(self.current.kind, TokenKind::OpenBrace | TokenKind::Eof)
            && !self.current.is_section_keyword()
        {
            self.bump();
            skipped += 1;
        }
        if self.at(TokenKind::OpenBrace) {
            self.bump();
            skipped += 1;
        }
        self.report_fault(fault, format!("skipped {} token(s) of the header", skipped));
    }

    fn parse_sections(&mut self, ast: &mut CdlAst) {
        while !self.diagnostics.limit_reached() {
            let kind = match self.current.kind {
                TokenKind::Eof | TokenKind::CloseBrace => break,
                TokenKind::Keyword(Keyword::Dimensions) => Some(SectionKind::Dimensions),
                TokenKind::Keyword(Keyword::Variables) => Some(SectionKind::Variables),
                TokenKind::Keyword(Keyword::Data) => Some(SectionKind::Data),
                _ => None,
            };
            if let Some(kind) = kind {
                let position = self.bump().position;
                trace!(?kind, %position, "section");
                ast.sections.push(Section {
                    kind,
                    position,
                    statements: Vec::new(),
                });
                continue;
            }

            let Some(section) = ast.sections.last_mut() else {
                let fault = self.unexpected("'dimensions:', 'variables:' or 'data:'");
                self.recover(fault);
                continue;
            };
            let result = match section.kind {
                SectionKind::Dimensions => self.parse_dimensions(&mut section.statements),
                SectionKind::Variables => self.parse_variables_statement(&mut section.statements),
                SectionKind::Data => self.parse_data(&mut section.statements),
            };
            if let Err(fault) = result {
                self.recover(fault);
            }
        }
    }

    /// Discard tokens through the next `;`, stopping early at a section
    /// keyword, `}` or end of input.
    fn recover(&mut self, fault: SyntaxFault) {
        let mut skipped = 0;
        let target = loop {
            match self.current.kind {
                TokenKind::Semicolon => {
                    self.bump();
                    skipped += 1;
                    break "through ';'";
                }
                TokenKind::Eof => break "to end of input",
                TokenKind::CloseBrace => break "to '}'",
                TokenKind::Keyword(kw) if kw.is_section() => break "to the next section",
                _ => {
                    self.bump();
                    skipped += 1;
                }
            }
        };
        self.report_fault(fault, format!("skipped {} token(s) {}", skipped, target));
    }

    fn report_fault(&mut self, fault: SyntaxFault, recovery: String) {
        if fault.lexical {
            return;
        }
        self.diagnostics.record(
            Diagnostic::error(DiagnosticKind::Syntax, fault.position, fault.message)
                .with_recovery(recovery),
        );
    }

    /// `name = size [, name = size]* ;`
    fn parse_dimensions(&mut self, out: &mut Vec<Statement>) -> Parsed<()> {
        loop {
            let position = self.current.position;
            let name = self.expect_name("dimension name")?;
            self.expect(TokenKind::Equals)?;
            let size = match self.current.kind {
                TokenKind::Keyword(Keyword::Unlimited) => {
                    self.bump();
                    DimensionSpec::Unlimited
                }
                TokenKind::IntLiteral | TokenKind::FloatLiteral => {
                    match to_literal(self.bump()) {
                        Some(literal) => DimensionSpec::Size(literal),
                        None => return Err(self.unexpected("dimension size")),
                    }
                }
                _ => return Err(self.unexpected("dimension size or 'unlimited'")),
            };
            out.push(Statement::Dimension(DimensionDecl {
                name,
                size,
                position,
            }));
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    /// A variable declaration list or an attribute assignment.
    fn parse_variables_statement(&mut self, out: &mut Vec<Statement>) -> Parsed<()> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Type(nc_type)) => {
                self.bump();
                self.parse_variable_list(nc_type, out)
            }
            TokenKind::Colon => {
                let position = self.bump().position;
                self.parse_attribute(None, position, out)
            }
            TokenKind::Identifier => {
                let token = self.bump();
                self.expect(TokenKind::Colon)?;
                self.parse_attribute(Some(token.name().to_string()), token.position, out)
            }
            _ => Err(self.unexpected("type keyword or attribute")),
        }
    }

    /// `name[(dim, ...)] [, name[(dim, ...)]]* ;` after the type keyword.
    fn parse_variable_list(&mut self, nc_type: NcType, out: &mut Vec<Statement>) -> Parsed<()> {
        loop {
            let position = self.current.position;
            let name = self.expect_name("variable name")?;
            let mut dimensions = Vec::new();
            if self.at(TokenKind::OpenParen) {
                self.bump();
                if !self.at(TokenKind::CloseParen) {
                    loop {
                        let position = self.current.position;
                        let name = self.expect_name("dimension name")?;
                        dimensions.push(DimensionRef { name, position });
                        if !self.at(TokenKind::Comma) {
                            break;
                        }
                        self.bump();
                    }
                }
                self.expect(TokenKind::CloseParen)?;
            }
            out.push(Statement::Variable(VariableDecl {
                name,
                nc_type,
                dimensions,
                position,
            }));
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    /// `name = constants ;` after `var:` or `:`.
    fn parse_attribute(
        &mut self,
        variable: Option<String>,
        position: Position,
        out: &mut Vec<Statement>,
    ) -> Parsed<()> {
        let name = self.expect_attribute_name()?;
        self.expect(TokenKind::Equals)?;
        let values = self.parse_literals()?;
        self.expect(TokenKind::Semicolon)?;
        if !values.is_empty() {
            out.push(Statement::Attribute(AttributeAssign {
                variable,
                name,
                values,
                position,
            }));
        }
        Ok(())
    }

    /// `name = constants ;`
    fn parse_data(&mut self, out: &mut Vec<Statement>) -> Parsed<()> {
        let position = self.current.position;
        let variable = self.expect_name("variable name")?;
        self.expect(TokenKind::Equals)?;
        let values = self.parse_literals()?;
        self.end_data_statement()?;
        if !values.is_empty() {
            out.push(Statement::Data(DataAssign {
                variable,
                values,
                position,
            }));
        }
        Ok(())
    }

    /// The `;` closing a data assignment. When it is missing and the next
    /// assignment (`name =`) follows directly, the `;` is assumed so that the
    /// next assignment is not lost.
    fn end_data_statement(&mut self) -> Parsed<()> {
        if self.at(TokenKind::Semicolon) {
            self.bump();
            return Ok(());
        }
        if self.at(TokenKind::Identifier) && self.lexer.peek_token().kind == TokenKind::Equals {
            let fault = self.unexpected("';'");
            self.report_fault(fault, "assumed a missing ';' before the next assignment".to_string());
            return Ok(());
        }
        Err(self.unexpected("';'"))
    }

    /// Comma-separated constants. Lexical error tokens are dropped, since
    /// they were reported when read.
    fn parse_literals(&mut self) -> Parsed<Vec<Literal>> {
        let mut values = Vec::new();
        loop {
            if self.at(TokenKind::Error) {
                self.bump();
            } else if self.current.kind.is_literal() {
                values.extend(to_literal(self.bump()));
            } else {
                return Err(self.unexpected("constant"));
            }
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        Ok(values)
    }

    fn parse_footer(&mut self) {
        if !self.at(TokenKind::CloseBrace) {
            let fault = self.unexpected("'}'");
            self.report_fault(fault, "closed the dataset at end of input".to_string());
            return;
        }
        self.bump();
        if self.at(TokenKind::Eof) {
            return;
        }
        let fault = SyntaxFault {
            position: self.current.position,
            message: "unexpected content after the closing '}'".to_string(),
            lexical: false,
        };
        let mut skipped = 0;
        while !self.at(TokenKind::Eof) {
            self.bump();
            skipped += 1;
        }
        self.report_fault(fault, format!("skipped {} token(s) to end of input", skipped));
    }
}

fn report_lexical(diagnostics: &mut Diagnostics, token: &Token) {
    if let Some(message) = token.error_message() {
        diagnostics.error(
            DiagnosticKind::Lexical,
            token.position,
            format!("{}: '{}'", message, token.text),
        );
    }
}

fn to_literal(token: Token) -> Option<Literal> {
    match token.value {
        TokenValue::Literal(value) => Some(Literal {
            value,
            text: token.text,
            position: token.position,
        }),
        _ => None,
    }
}
