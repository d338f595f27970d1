use std::fmt;

use regex::{Regex, RegexBuilder};

/// A single step of a path chain.
///
/// Every step transforms the sequence produced by the step before it. Filters keep a
/// subset of their input, navigation steps map each input node to zero or more nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum IteratorKind {
    // Navigation
    /// Children of every input node
    ///
    /// # Example
    /// ```text
    /// @/*?name
    /// ```
    Children,

    /// All descendants of every input node, pre-order, excluding the node itself
    ///
    /// # Example
    /// ```text
    /// @/**/error?node
    /// ```
    Descendants,

    /// Parent of every input node. The root yields nothing.
    ///
    /// # Example
    /// ```text
    /// @/0/.?name
    /// ```
    Parent,

    /// Root of the tree each input node lives in
    ///
    /// # Example
    /// ```text
    /// @/0/0/..?name
    /// ```
    Root,

    /// Nearest node with the given name, walking upward from the input node itself
    ///
    /// # Example
    /// ```text
    /// @/0/0/..root?name
    /// ```
    Ancestor(String),

    /// The N-th child (0-based) of every input node
    ///
    /// # Example
    /// ```text
    /// @/1?value
    /// ```
    Numbered(usize),

    /// The sibling at a signed offset
    ///
    /// # Example
    /// ```text
    /// @/0/+?name
    /// @/2/-2?name
    /// ```
    Sibling(isize),

    /// Previous node in document order
    ///
    /// # Example
    /// ```text
    /// @/1/<?name
    /// ```
    Previous,

    /// Next node in document order
    ///
    /// # Example
    /// ```text
    /// @/>?name
    /// ```
    Next,

    /// Follows a node-valued value to the node it references
    ///
    /// # Example
    /// ```text
    /// @/1/#/*?value
    /// ```
    Reference,

    // Filters
    /// Input nodes whose name equals the given text
    ///
    /// # Example
    /// ```text
    /// @/*/success?value
    /// \*
    /// ```
    Named(String),

    /// Input nodes whose value equals a literal
    ///
    /// # Example
    /// ```text
    /// @/*/=query?name
    /// @/*/=:int:5?name
    /// ```
    ValueEquals(ValueLiteral),

    /// Input nodes whose name matches a regex
    ///
    /// # Example
    /// ```text
    /// @/*/"/^su/"?name
    /// ```
    NameRegex(Pattern),

    /// Input nodes whose value, as text, matches a regex
    ///
    /// # Example
    /// ```text
    /// @/*/"=/^val/"?name
    /// ```
    ValueRegex(Pattern),

    // Positional
    /// A slice of the previous step's output, end-exclusive
    ///
    /// # Example
    /// ```text
    /// @/*/[1,3]?name
    /// @/*/[2,]?name
    /// ```
    Range {
        start: Option<usize>,
        end: Option<usize>,
    },

    /// Every N-th node of the previous step's output
    ///
    /// # Example
    /// ```text
    /// @/*/%2?name
    /// ```
    Modulo(usize),
}

/// The literal of a value-equality filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueLiteral {
    /// Compared with string values only
    Plain(String),

    /// Converted to `type_name` when evaluated, then compared with typed equality
    Typed { type_name: String, text: String },
}

/// A compiled regex that remembers its source.
///
/// The pattern text uses the `/regex/flags` form with flags drawn from `imsx`.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `body` with the given flag letters.
    pub fn new(body: &str, flags: &str) -> Result<Self, String> {
        let mut builder = RegexBuilder::new(body);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => return Err(format!("unknown regex flag '{}'", other)),
            };
        }
        let regex = builder.build().map_err(|e| e.to_string())?;
        Ok(Pattern {
            source: format!("/{}/{}", body, flags),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({})", self.source)
    }
}
