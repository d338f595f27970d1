use std::fmt;

use crate::ast::Token;

/// Location of a character in the expression text.
///
/// `offset` counts characters from the start; `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated literal starting at {position}")]
    UnterminatedLiteral { position: Position },

    #[error("dangling escape at {position}: a backslash must be followed by a character")]
    DanglingEscape { position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Resolves a character offset to line and column.
    pub fn position_of(&self, offset: usize) -> Position {
        let mut line = 1;
        let mut column = 1;
        for &ch in self.input.iter().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            offset,
            line,
            column,
        }
    }

    /// Where the most recently returned token started.
    pub fn token_start(&self) -> Position {
        self.position_of(self.token_start)
    }

    fn is_delimiter(ch: char) -> bool {
        matches!(ch, '/' | '(' | ')' | '?') || ch.is_whitespace()
    }

    fn read_word(&mut self) -> Result<Token, LexError> {
        let mut text = String::new();
        let escaped = self.current_char() == Some('\\');

        while let Some(ch) = self.current_char() {
            if Self::is_delimiter(ch) {
                break;
            }
            if ch == '\\' {
                let escape_at = self.position;
                self.advance();
                match self.current_char() {
                    Some(next) => text.push(next),
                    None => {
                        return Err(LexError::DanglingEscape {
                            position: self.position_of(escape_at),
                        });
                    }
                }
            } else {
                text.push(ch);
            }
            self.advance();
        }

        Ok(Token::Word { text, escaped })
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        // kept as written so regex classes survive
                        Some(other) => {
                            result.push('\\');
                            result.push(other);
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedLiteral {
            position: self.position_of(start),
        })
    }

    fn read_verbatim(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // '@'
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '"' {
                if self.current_char() == Some('"') {
                    result.push('"');
                    self.advance();
                } else {
                    return Ok(result);
                }
            } else {
                result.push(ch);
            }
        }

        Err(LexError::UnterminatedLiteral {
            position: self.position_of(start),
        })
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('/') => {
                self.advance();
                Ok(Token::Slash)
            }
            Some('(') => {
                self.advance();
                Ok(Token::LParen)
            }
            Some(')') => {
                self.advance();
                Ok(Token::RParen)
            }
            Some('?') => {
                self.advance();
                let suffix: String = self.input[self.position..].iter().collect();
                self.position = self.input.len();
                Ok(Token::TypeSuffix(suffix.trim().to_string()))
            }
            Some('@') if self.peek_char(1) == Some('"') => {
                Ok(Token::Literal(self.read_verbatim()?))
            }
            Some('@') => {
                self.advance();
                Ok(Token::At)
            }
            Some('"') => Ok(Token::Literal(self.read_string()?)),
            Some(_) => self.read_word(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Token {
        Token::Word {
            text: text.to_string(),
            escaped: false,
        }
    }

    #[test]
    fn test_step_sequence() {
        let mut lexer = Lexer::new("@/*/..name/[1,3]?value.int");
        assert_eq!(lexer.next_token(), Ok(Token::At));
        assert_eq!(lexer.next_token(), Ok(Token::Slash));
        assert_eq!(lexer.next_token(), Ok(word("*")));
        assert_eq!(lexer.next_token(), Ok(Token::Slash));
        assert_eq!(lexer.next_token(), Ok(word("..name")));
        assert_eq!(lexer.next_token(), Ok(Token::Slash));
        assert_eq!(lexer.next_token(), Ok(word("[1,3]")));
        assert_eq!(
            lexer.next_token(),
            Ok(Token::TypeSuffix("value.int".to_string()))
        );
        assert_eq!(lexer.next_token(), Ok(Token::Eof));
    }

    #[test]
    fn test_position_tracks_lines() {
        let mut lexer = Lexer::new("@\n  /foo");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.token_start(),
            Position {
                offset: 4,
                line: 2,
                column: 3
            }
        );
    }
}
