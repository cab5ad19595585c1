use std::fmt::Display;

use thiserror::Error;

use crate::ast::{
    BinaryOperator, Expression, ForInStatement, FunctionDeclaration, Identifier, IfStatement,
    Program, ReturnStatement, Statement, VariableDeclaration,
};
use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, got '{got}'")]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: Expected },
    #[error("invalid number literal: {0}")]
    InvalidNumber(#[from] std::num::ParseFloatError),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "'{}'", kind),
            Expected::Identifier => write!(f, "an identifier"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

impl ParseError {
    fn unexpected(expected: Expected, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::UnexpectedEndOfInput { expected },
        }
    }
}

/// Recursive-descent parser with one token of lookahead. Fails on the first
/// mismatch; no partial `Program` is ever produced.
pub struct Parser {
    iter: std::iter::Peekable<std::vec::IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            iter: tokens.into_iter().peekable(),
        }
    }

    fn check(&mut self, kind: &TokenKind) -> bool {
        self.iter.peek().is_some_and(|token| &token.kind == kind)
    }

    fn expect_token(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        match self.iter.next() {
            Some(Token { kind: got, .. }) if got == kind => Ok(()),
            got => Err(ParseError::unexpected(Expected::Token(kind), got)),
        }
    }

    fn parse_ident(&mut self) -> Result<Identifier, ParseError> {
        match self.iter.next() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(Identifier { name }),
            got => Err(ParseError::unexpected(Expected::Identifier, got)),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while self.iter.peek().is_some() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.iter.peek().map(|token| &token.kind) {
            Some(TokenKind::Variable) => {
                self.iter.next();
                self.parse_variable_declaration()
            }
            Some(TokenKind::Fonction) => {
                self.iter.next();
                self.parse_function_declaration()
            }
            Some(TokenKind::Si) => {
                self.iter.next();
                self.parse_if_statement()
            }
            Some(TokenKind::Pour) => {
                self.iter.next();
                self.parse_for_statement()
            }
            Some(TokenKind::Retourner) => {
                self.iter.next();
                let value = self.parse_expression()?;
                Ok(Statement::Return(ReturnStatement { value }))
            }
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, ParseError> {
        let name = self.parse_ident()?;
        self.expect_token(TokenKind::Equals)?;
        let value = self.parse_expression()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            name,
            value,
        }))
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, ParseError> {
        let name = self.parse_ident()?;
        self.expect_token(TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_ident()?);
                if self.iter.next_if(|token| token.kind == TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_token(TokenKind::RParen)?;

        let body = self.parse_block(&[TokenKind::Fin])?;
        self.expect_token(TokenKind::Fin)?;

        Ok(Statement::FunctionDeclaration(FunctionDeclaration {
            name,
            params,
            body,
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let test = self.parse_expression()?;
        self.expect_token(TokenKind::Alors)?;

        let consequent = self.parse_block(&[TokenKind::Sinon, TokenKind::Fin])?;

        let mut alternate = Vec::new();
        if self.iter.next_if(|token| token.kind == TokenKind::Sinon).is_some() {
            alternate = self.parse_block(&[TokenKind::Fin])?;
        }
        self.expect_token(TokenKind::Fin)?;

        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let variable = self.parse_ident()?;
        self.expect_token(TokenKind::Dans)?;
        let iterable = self.parse_expression()?;
        self.expect_token(TokenKind::Faire)?;

        let body = self.parse_block(&[TokenKind::Fin])?;
        self.expect_token(TokenKind::Fin)?;

        Ok(Statement::ForIn(ForInStatement {
            variable,
            iterable,
            body,
        }))
    }

    /// Statements up to (not including) any of the terminator keywords. The
    /// caller consumes the terminator, so running out of tokens surfaces as
    /// its expected-token error.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        while let Some(token) = self.iter.peek() {
            if terminators.contains(&token.kind) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_comparison()
    }

    fn parse_left_associative(
        &mut self,
        operand: fn(&mut Parser) -> Result<Expression, ParseError>,
        operator: fn(&TokenKind) -> Option<BinaryOperator>,
    ) -> Result<Expression, ParseError> {
        let mut expression = operand(self)?;
        while let Some(op) = self.iter.peek().and_then(|token| operator(&token.kind)) {
            self.iter.next();
            let right = operand(self)?;
            expression = Expression::Binary {
                operator: op,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_associative(Self::parse_additive, |kind| match kind {
            TokenKind::GreaterThan => Some(BinaryOperator::GreaterThan),
            TokenKind::LessThan => Some(BinaryOperator::LessThan),
            TokenKind::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            TokenKind::LessEqual => Some(BinaryOperator::LessEqual),
            TokenKind::EqualsEquals => Some(BinaryOperator::Equal),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_associative(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOperator::Plus),
            TokenKind::Minus => Some(BinaryOperator::Minus),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_associative(Self::parse_primary, |kind| match kind {
            TokenKind::Asterisk => Some(BinaryOperator::Multiply),
            TokenKind::Slash => Some(BinaryOperator::Divide),
            _ => None,
        })
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.iter.next() {
            Some(Token {
                kind: TokenKind::Number(text),
                ..
            }) => Ok(Expression::NumberLiteral(text.parse()?)),
            Some(Token {
                kind: TokenKind::Str(text),
                ..
            }) => Ok(Expression::StringLiteral(text.as_ref().to_owned())),
            Some(Token {
                kind: TokenKind::Liste,
                ..
            }) => {
                self.expect_token(TokenKind::LParen)?;
                Ok(Expression::ListLiteral(self.parse_arguments()?))
            }
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => self.parse_identifier_suffixes(Identifier { name }),
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => {
                let expression = self.parse_expression()?;
                self.expect_token(TokenKind::RParen)?;
                Ok(expression)
            }
            got => Err(ParseError::unexpected(Expected::Expression, got)),
        }
    }

    /// A call only when `(` immediately follows the identifier; otherwise a
    /// plain reference with any number of `[index]` suffixes.
    fn parse_identifier_suffixes(
        &mut self,
        identifier: Identifier,
    ) -> Result<Expression, ParseError> {
        if self.iter.next_if(|token| token.kind == TokenKind::LParen).is_some() {
            return Ok(Expression::Call {
                callee: identifier,
                arguments: self.parse_arguments()?,
            });
        }

        let mut expression = Expression::Identifier(identifier);
        while self.iter.next_if(|token| token.kind == TokenKind::LBracket).is_some() {
            let index = self.parse_expression()?;
            self.expect_token(TokenKind::RBracket)?;
            expression = Expression::ListAccess {
                object: Box::new(expression),
                index: Box::new(index),
            };
        }
        Ok(expression)
    }

    /// Comma-separated expressions up to the closing `)`, which is consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut arguments = Vec::new();
        if self.iter.next_if(|token| token.kind == TokenKind::RParen).is_some() {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_expression()?);
            match self.iter.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(arguments),
                got => {
                    return Err(ParseError::unexpected(
                        Expected::Token(TokenKind::RParen),
                        got,
                    ))
                }
            }
        }
    }
}
