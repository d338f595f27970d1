/// Lexical tokens of the path expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Expression sentinel
    ///
    /// Opens every expression. A second `@` directly after the first marks a
    /// referenced expression.
    ///
    /// # Examples
    /// ```text
    /// @/*?name
    /// @@/0?value
    /// ```
    At,

    /// Step separator
    Slash,

    /// Group open
    ///
    /// # Examples
    /// ```text
    /// @/(/a/|/b/)/*?name
    /// ```
    LParen,

    /// Group close
    RParen,

    /// Bare word between separators
    ///
    /// Backslash escapes have already been resolved. `escaped` is set when the word
    /// began with a backslash, which forces it to be a literal name.
    ///
    /// # Examples
    /// ```text
    /// *
    /// ..name
    /// [1,3]
    /// \*
    /// ```
    Word { text: String, escaped: bool },

    /// Quoted or verbatim literal
    ///
    /// Quoted literals resolve `\n`, `\r`, `\t`, `\"` and `\\`. Verbatim literals keep
    /// everything as written and use `""` for a quote.
    ///
    /// # Examples
    /// ```text
    /// "/^su/i"
    /// "=/val/"
    /// @"=x
    /// y"
    /// ```
    Literal(String),

    /// Type suffix after `?`, trimmed
    ///
    /// # Examples
    /// ```text
    /// ?name
    /// ?value.int
    /// ```
    TypeSuffix(String),

    /// End of input
    Eof,
}

impl Token {
    /// Short rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::At => "@".to_string(),
            Token::Slash => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Word { text, escaped: false } => text.clone(),
            Token::Word { text, escaped: true } => format!("\\{}", text),
            Token::Literal(text) => format!("\"{}\"", text),
            Token::TypeSuffix(text) => format!("?{}", text),
            Token::Eof => "end of expression".to_string(),
        }
    }
}
