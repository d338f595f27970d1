use crate::{
    ast::{
        Chain, Expression, IteratorKind, Logical, LogicalKind, MatchType, Pattern, Step, Token,
        ValueLiteral,
    },
    lexer::{LexError, Lexer, Position},
};
use std::mem;

/// Errors raised while compiling expression text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token stream does not form a valid expression
    #[error("syntax error at {position} near '{fragment}': {message}")]
    Syntax {
        fragment: String,
        message: String,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(LexError::UnterminatedLiteral { position })
            | ParseError::Lex(LexError::DanglingEscape { position })
            | ParseError::Syntax { position, .. } => *position,
        }
    }
}

/// What the previous token allows next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cursor {
    /// Start of the expression or of a group
    Start,
    /// Directly after a `/`
    Separator,
    /// After a step word or literal
    Step,
    /// After a closing `)`
    Group,
    /// After a logical operator
    Logical,
}

pub struct Parser {
    source: String,
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();
        Ok(Parser {
            source: input.to_string(),
            lexer,
            current_token,
            current_position,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_start();
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.error(format!("expected '{}'", expected.describe())));
        }
        self.advance()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            fragment: self.current_token.describe(),
            message: message.into(),
            position: self.current_position,
        }
    }

    /// Parses a complete expression, including the leading `@` and the type suffix.
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.expect(Token::At)?;

        let referenced = if self.check(&Token::At) {
            self.advance()?;
            if self.check(&Token::At) {
                return Err(self.error("an expression takes at most two leading '@'"));
            }
            true
        } else {
            false
        };

        let chain = self.parse_chain(false)?;

        let Token::TypeSuffix(suffix) = self.current_token.clone() else {
            return Err(self.error(
                "missing type suffix ('?name', '?value', '?count', '?path' or '?node')",
            ));
        };
        let (kind, convert) = self.parse_type_suffix(&suffix)?;
        self.advance()?;

        Ok(Expression {
            source: self.source.clone(),
            referenced,
            chain,
            kind,
            convert,
        })
    }

    fn parse_type_suffix(&self, suffix: &str) -> Result<(MatchType, Option<String>), ParseError> {
        let (kind_name, convert) = match suffix.split_once('.') {
            Some((kind, convert)) => (kind, Some(convert.trim())),
            None => (suffix, None),
        };

        let kind = MatchType::from_name(kind_name.trim()).ok_or_else(|| {
            self.error(format!(
                "unknown type '{}'; expected name, value, count, path or node",
                kind_name
            ))
        })?;

        match convert {
            Some("") => Err(self.error("empty type name after '.'")),
            Some(type_name) => Ok((kind, Some(type_name.to_string()))),
            None => Ok((kind, None)),
        }
    }

    /// Parses steps and logicals up to the type suffix, or up to the `)` closing a group.
    fn parse_chain(&mut self, in_group: bool) -> Result<Chain, ParseError> {
        let mut chain = Chain::default();
        let mut cursor = Cursor::Start;

        loop {
            match self.current_token.clone() {
                Token::Slash => {
                    self.advance()?;
                    cursor = Cursor::Separator;
                }
                Token::LParen => {
                    self.advance()?;
                    let group = self.parse_chain(true)?;
                    self.expect(Token::RParen)?;
                    push_step(&mut chain, Step::Group(group));
                    cursor = Cursor::Group;
                }
                Token::RParen if in_group => return Ok(chain),
                Token::RParen => return Err(self.error("')' without matching '('")),
                Token::TypeSuffix(_) | Token::Eof if in_group => {
                    return Err(self.error("unterminated group, expected ')'"));
                }
                Token::TypeSuffix(_) | Token::Eof => return Ok(chain),
                Token::At => return Err(self.error("'@' may only start an expression")),
                Token::Word { text, escaped } => {
                    let logical = if escaped {
                        None
                    } else {
                        LogicalKind::from_symbol(&text)
                    };

                    if let Some(kind) = logical {
                        chain.logicals.push(Logical {
                            kind,
                            operand: Vec::new(),
                        });
                        self.advance()?;
                        cursor = Cursor::Logical;
                        continue;
                    }

                    if cursor != Cursor::Separator {
                        return Err(self.error("expected '/' before step"));
                    }
                    let step = if escaped {
                        IteratorKind::Named(text)
                    } else {
                        self.classify(&text)?
                    };
                    push_step(&mut chain, Step::Iterator(step));
                    self.advance()?;
                    cursor = Cursor::Step;
                }
                Token::Literal(text) => {
                    if cursor != Cursor::Separator {
                        return Err(self.error("expected '/' before literal"));
                    }
                    let step = self.classify_literal(&text)?;
                    push_step(&mut chain, Step::Iterator(step));
                    self.advance()?;
                    cursor = Cursor::Step;
                }
            }
        }
    }

    /// Maps a quoted or verbatim literal to its step. Adds the regex forms to what a
    /// bare word can express.
    fn classify_literal(&self, text: &str) -> Result<IteratorKind, ParseError> {
        if let Some(name) = text.strip_prefix('\\') {
            return Ok(IteratorKind::Named(name.to_string()));
        }
        if let Some(rest) = text.strip_prefix('=') {
            if let Some((body, flags)) = split_regex(rest) {
                return self.pattern(body, flags).map(IteratorKind::ValueRegex);
            }
        }
        if let Some((body, flags)) = split_regex(text) {
            return self.pattern(body, flags).map(IteratorKind::NameRegex);
        }
        self.classify(text)
    }

    fn pattern(&self, body: &str, flags: &str) -> Result<Pattern, ParseError> {
        Pattern::new(body, flags).map_err(|e| self.error(format!("invalid regex: {}", e)))
    }

    /// Maps the text of an unescaped word to its step.
    fn classify(&self, text: &str) -> Result<IteratorKind, ParseError> {
        let step = match text {
            "*" => IteratorKind::Children,
            "**" => IteratorKind::Descendants,
            "." => IteratorKind::Parent,
            ".." => IteratorKind::Root,
            "+" => IteratorKind::Sibling(1),
            "-" => IteratorKind::Sibling(-1),
            "<" => IteratorKind::Previous,
            ">" => IteratorKind::Next,
            "#" => IteratorKind::Reference,
            _ => {
                if let Some(name) = text.strip_prefix("..") {
                    IteratorKind::Ancestor(name.to_string())
                } else if is_digits(text) {
                    IteratorKind::Numbered(self.number(text)?)
                } else if let Some(offset) = text.strip_prefix('+').filter(|s| is_digits(s)) {
                    IteratorKind::Sibling(self.offset(offset, 1)?)
                } else if let Some(offset) = text.strip_prefix('-').filter(|s| is_digits(s)) {
                    IteratorKind::Sibling(self.offset(offset, -1)?)
                } else if text.starts_with('[') {
                    self.range(text)?
                } else if let Some(step) = text.strip_prefix('%') {
                    match self.number(step)? {
                        0 => return Err(self.error("modulo step must be greater than zero")),
                        n => IteratorKind::Modulo(n),
                    }
                } else if let Some(literal) = text.strip_prefix('=') {
                    IteratorKind::ValueEquals(self.value_literal(literal)?)
                } else if text
                    .chars()
                    .next()
                    .and_then(|c| LogicalKind::from_symbol(&c.to_string()))
                    .is_some()
                {
                    return Err(self.error(format!(
                        "operator '{}' takes no operand here; put it in its own step, as in '/{}/'",
                        &text[..1],
                        &text[..1]
                    )));
                } else {
                    IteratorKind::Named(text.to_string())
                }
            }
        };
        Ok(step)
    }

    fn number(&self, text: &str) -> Result<usize, ParseError> {
        if !is_digits(text) {
            return Err(self.error(format!("expected a number, found '{}'", text)));
        }
        text.parse::<usize>()
            .map_err(|_| self.error(format!("number '{}' is too large", text)))
    }

    fn offset(&self, text: &str, sign: isize) -> Result<isize, ParseError> {
        text.parse::<isize>()
            .map(|n| n * sign)
            .map_err(|_| self.error(format!("offset '{}' is too large", text)))
    }

    fn range(&self, text: &str) -> Result<IteratorKind, ParseError> {
        let inner = text
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| self.error("malformed range, expected '[start,end]'"))?;
        let (start, end) = inner
            .split_once(',')
            .ok_or_else(|| self.error("malformed range, expected '[start,end]'"))?;

        let bound = |s: &str| -> Result<Option<usize>, ParseError> {
            match s.trim() {
                "" => Ok(None),
                n => self.number(n).map(Some),
            }
        };
        Ok(IteratorKind::Range {
            start: bound(start)?,
            end: bound(end)?,
        })
    }

    fn value_literal(&self, literal: &str) -> Result<ValueLiteral, ParseError> {
        let Some(typed) = literal.strip_prefix(':') else {
            return Ok(ValueLiteral::Plain(literal.to_string()));
        };
        match typed.split_once(':') {
            Some((type_name, text)) if !type_name.is_empty() => Ok(ValueLiteral::Typed {
                type_name: type_name.to_string(),
                text: text.to_string(),
            }),
            _ => Err(self.error("malformed typed literal, expected '=:type:value'")),
        }
    }
}

fn push_step(chain: &mut Chain, step: Step) {
    match chain.logicals.last_mut() {
        Some(logical) => logical.operand.push(step),
        None => chain.steps.push(step),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `/body/flags` into its parts.
fn split_regex(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    Some((&rest[..end], &rest[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(text: &str) -> Vec<Step> {
        Expression::compile(text).unwrap().chain.steps
    }

    #[test]
    fn test_empty_steps_are_dropped() {
        assert_eq!(steps("@//*?name"), vec![Step::Iterator(IteratorKind::Children)]);
        assert_eq!(steps("@/*//?name"), vec![Step::Iterator(IteratorKind::Children)]);
        assert!(steps("@?value").is_empty());
    }

    #[test]
    fn test_trailing_separator_after_sibling() {
        assert_eq!(steps("@/-/?node"), vec![Step::Iterator(IteratorKind::Sibling(-1))]);
    }

    #[test]
    fn test_logical_collects_following_steps() {
        let chain = Expression::compile("@/*/|/0/1?name").unwrap().chain;
        assert_eq!(chain.steps, vec![Step::Iterator(IteratorKind::Children)]);
        assert_eq!(chain.logicals.len(), 1);
        assert_eq!(chain.logicals[0].operand.len(), 2);
    }
}
