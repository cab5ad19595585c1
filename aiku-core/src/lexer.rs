use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Ident(Rc<str>),
    Number(Rc<str>),
    Str(Rc<str>),

    // Keywords
    Variable,
    Fonction,
    Si,
    Alors,
    Sinon,
    Pour,
    Dans,
    Faire,
    Fin,
    Retourner,
    Liste,
    Rien,

    // Operators
    Equals,
    EqualsEquals,
    Plus,
    Minus,
    Asterisk,
    Slash,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,

    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Number(text) => write!(f, "{}", text),
            TokenKind::Str(text) => write!(f, "\"{}\"", text),
            TokenKind::Variable => write!(f, "variable"),
            TokenKind::Fonction => write!(f, "fonction"),
            TokenKind::Si => write!(f, "si"),
            TokenKind::Alors => write!(f, "alors"),
            TokenKind::Sinon => write!(f, "sinon"),
            TokenKind::Pour => write!(f, "pour"),
            TokenKind::Dans => write!(f, "dans"),
            TokenKind::Faire => write!(f, "faire"),
            TokenKind::Fin => write!(f, "fin"),
            TokenKind::Retourner => write!(f, "retourner"),
            TokenKind::Liste => write!(f, "liste"),
            TokenKind::Rien => write!(f, "rien"),
            TokenKind::Equals => write!(f, "="),
            TokenKind::EqualsEquals => write!(f, "=="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Asterisk => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Comma => write!(f, ","),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {start}")]
    UnterminatedString { start: usize },
    #[error("unexpected character '{character}' at byte {position}")]
    UnexpectedCharacter { character: char, position: usize },
}

/// Keyword lookup. The membership test is case-insensitive (callers pass a
/// lowercased identifier); the token kind itself is the canonical form.
fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "variable" => Some(TokenKind::Variable),
        "fonction" => Some(TokenKind::Fonction),
        "si" => Some(TokenKind::Si),
        "alors" => Some(TokenKind::Alors),
        "sinon" => Some(TokenKind::Sinon),
        "pour" => Some(TokenKind::Pour),
        "dans" => Some(TokenKind::Dans),
        "faire" => Some(TokenKind::Faire),
        "fin" => Some(TokenKind::Fin),
        "retourner" => Some(TokenKind::Retourner),
        "liste" => Some(TokenKind::Liste),
        "rien" => Some(TokenKind::Rien),
        _ => None,
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_letter_or_digit(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter_or_digit(*ch))
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: keywords(&ident.to_lowercase())
                .unwrap_or_else(|| TokenKind::Ident(ident.into())),
            start,
            end,
        }
    }

    /// Digits with at most one dot; a second dot ends the number.
    fn read_number(&mut self, start: usize) -> Token {
        let mut seen_dot = false;
        loop {
            match self.iter.peek() {
                Some((_, ch)) if ch.is_ascii_digit() => {
                    self.iter.next();
                }
                Some((_, '.')) if !seen_dot => {
                    seen_dot = true;
                    self.iter.next();
                }
                _ => break,
            }
        }

        let end = self.next_idx();
        Token {
            kind: TokenKind::Number(self.input[start..end].into()),
            start,
            end,
        }
    }

    fn read_string(&mut self, start: usize, quote: char) -> Result<Token, LexError> {
        let mut text = String::new();
        loop {
            match self.iter.next() {
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => match self.iter.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, other)) => text.push(other),
                    None => return Err(LexError::UnterminatedString { start }),
                },
                Some((_, ch)) => text.push(ch),
                None => return Err(LexError::UnterminatedString { start }),
            }
        }

        let end = self.next_idx();
        Ok(Token {
            kind: TokenKind::Str(text.into()),
            start,
            end,
        })
    }

    fn two_char(&mut self, second: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            long
        } else {
            short
        }
    }

    /// Consumes the source in a single pass. Whitespace and `#` comments are
    /// skipped; everything else must form a token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some((idx, ch)) = self.iter.next() {
            if ch.is_whitespace() {
                continue;
            }
            if ch == '#' {
                while self.iter.next_if(|(_, ch)| *ch != '\n').is_some() {}
                continue;
            }

            let kind = match ch {
                '=' => self.two_char('=', TokenKind::EqualsEquals, TokenKind::Equals),
                '>' => self.two_char('=', TokenKind::GreaterEqual, TokenKind::GreaterThan),
                '<' => self.two_char('=', TokenKind::LessEqual, TokenKind::LessThan),
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Asterisk,
                '/' => TokenKind::Slash,
                ',' => TokenKind::Comma,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '"' | '\'' => {
                    tokens.push(self.read_string(idx, ch)?);
                    continue;
                }
                c if Self::is_letter(c) => {
                    tokens.push(self.read_identifier(idx));
                    continue;
                }
                c if c.is_ascii_digit() => {
                    tokens.push(self.read_number(idx));
                    continue;
                }
                _ => {
                    return Err(LexError::UnexpectedCharacter {
                        character: ch,
                        position: idx,
                    })
                }
            };
            let end = self.next_idx();
            tokens.push(Token {
                kind,
                start: idx,
                end,
            });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_variable_declaration() {
        let output = kinds("variable nom = \"Aladé\"");
        assert_eq!(
            output,
            vec![
                TokenKind::Variable,
                TokenKind::Ident("nom".into()),
                TokenKind::Equals,
                TokenKind::Str("Aladé".into()),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let output = Lexer::new("variable x = 5").tokenize().unwrap();
        assert_eq!(
            output,
            vec![
                Token {
                    kind: TokenKind::Variable,
                    start: 0,
                    end: 8
                },
                Token {
                    kind: TokenKind::Ident("x".into()),
                    start: 9,
                    end: 10
                },
                Token {
                    kind: TokenKind::Equals,
                    start: 11,
                    end: 12
                },
                Token {
                    kind: TokenKind::Number("5".into()),
                    start: 13,
                    end: 14
                },
            ]
        );
    }

    #[test]
    fn test_function_declaration() {
        let input = "fonction saluer(nom)
            afficher(\"Bonjour \" + nom + \"!\")
        fin";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Fonction,
                TokenKind::Ident("saluer".into()),
                TokenKind::LParen,
                TokenKind::Ident("nom".into()),
                TokenKind::RParen,
                TokenKind::Ident("afficher".into()),
                TokenKind::LParen,
                TokenKind::Str("Bonjour ".into()),
                TokenKind::Plus,
                TokenKind::Ident("nom".into()),
                TokenKind::Plus,
                TokenKind::Str("!".into()),
                TokenKind::RParen,
                TokenKind::Fin,
            ]
        );
    }

    #[test]
    fn test_loop_and_conditionals() {
        assert_eq!(
            kinds("pour fruit dans fruits faire fin"),
            vec![
                TokenKind::Pour,
                TokenKind::Ident("fruit".into()),
                TokenKind::Dans,
                TokenKind::Ident("fruits".into()),
                TokenKind::Faire,
                TokenKind::Fin,
            ]
        );
        assert_eq!(
            kinds("si x alors sinon fin rien"),
            vec![
                TokenKind::Si,
                TokenKind::Ident("x".into()),
                TokenKind::Alors,
                TokenKind::Sinon,
                TokenKind::Fin,
                TokenKind::Rien,
            ]
        );
    }

    #[test]
    fn test_operators_greedy() {
        assert_eq!(
            kinds("= == >= > <= < + - * /"),
            vec![
                TokenKind::Equals,
                TokenKind::EqualsEquals,
                TokenKind::GreaterEqual,
                TokenKind::GreaterThan,
                TokenKind::LessEqual,
                TokenKind::LessThan,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Asterisk,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn test_keyword_case_folding() {
        // Keywords match case-insensitively; identifiers keep their casing.
        assert_eq!(
            kinds("VARIABLE Nom = 'x'"),
            vec![
                TokenKind::Variable,
                TokenKind::Ident("Nom".into()),
                TokenKind::Equals,
                TokenKind::Str("x".into()),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("variable x = 1 # le commentaire\nvariable y = 2"),
            vec![
                TokenKind::Variable,
                TokenKind::Ident("x".into()),
                TokenKind::Equals,
                TokenKind::Number("1".into()),
                TokenKind::Variable,
                TokenKind::Ident("y".into()),
                TokenKind::Equals,
                TokenKind::Number("2".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("3.14 10 0.5"),
            vec![
                TokenKind::Number("3.14".into()),
                TokenKind::Number("10".into()),
                TokenKind::Number("0.5".into()),
            ]
        );
        // A second dot ends the number; the dangling dot is no token at all.
        assert_eq!(
            Lexer::new("1.2.3").tokenize(),
            Err(LexError::UnexpectedCharacter {
                character: '.',
                position: 3
            })
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\tc\rd\"e\\f""#),
            vec![TokenKind::Str("a\nb\tc\rd\"e\\f".into())]
        );
        assert_eq!(kinds("'deux \"styles\"'"), vec![TokenKind::Str("deux \"styles\"".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            Lexer::new("afficher(\"oops").tokenize(),
            Err(LexError::UnterminatedString { start: 9 })
        );
        assert_eq!(
            Lexer::new("'fin\\").tokenize(),
            Err(LexError::UnterminatedString { start: 0 })
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            Lexer::new("variable x = 5;").tokenize(),
            Err(LexError::UnexpectedCharacter {
                character: ';',
                position: 14
            })
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "pour f dans liste(1, 2) faire afficher(f) fin";
        assert_eq!(
            Lexer::new(input).tokenize().unwrap(),
            Lexer::new(input).tokenize().unwrap()
        );
    }
}
