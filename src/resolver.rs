//! Doc comment resolution — maps a class / method reference to its comment text.
//!
//! The parser never looks at source code itself. A [`DeclarationResolver`]
//! hands it the raw comment, which keeps parsing a pure string transform.
//! [`SourceIndex`] is the stock resolver for PHP-style sources; closures work
//! too.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_DOC_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*.*?\*/").unwrap());

static RE_CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[[:blank:]]*(?:(?:abstract|final|readonly)[[:blank:]]+)*(?:class|interface|trait|enum)[[:blank:]]+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});

static RE_FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[[:blank:]]*(?:(?:public|protected|private|static|abstract|final)[[:blank:]]+)*function[[:blank:]]+&?[[:blank:]]*([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});

// Closing brace in column zero ends the current class body
static RE_CLASS_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\}").unwrap());

// -- References ---------------------------------------------------------------

/// A class, or a method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub class: String,
    pub method: Option<String>,
}

impl Reference {
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: None,
        }
    }

    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: Some(method.into()),
        }
    }

    /// Parse `Class` or `Class::method`.
    pub fn parse(s: &str) -> Self {
        match s.split_once("::") {
            Some((class, method)) => Self::method(class.trim(), method.trim()),
            None => Self::class(s.trim()),
        }
    }

    /// `true` when there is nothing to resolve against.
    pub fn is_empty(&self) -> bool {
        self.class.is_empty() || self.method.as_deref() == Some("")
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}::{}", self.class, method),
            None => f.write_str(&self.class),
        }
    }
}

// -- Resolver trait -----------------------------------------------------------

/// Supplies the raw doc comment of a declaration.
///
/// Returns an empty string when the declaration has no comment or is unknown.
pub trait DeclarationResolver {
    fn doc_comment(&self, reference: &Reference) -> String;
}

impl<F> DeclarationResolver for F
where
    F: Fn(&Reference) -> String,
{
    fn doc_comment(&self, reference: &Reference) -> String {
        self(reference)
    }
}

// -- Source index -------------------------------------------------------------

/// Doc comments of the class and method declarations found in one source text.
///
/// A comment belongs to a declaration when only whitespace or `#[...]`
/// attribute lines separate them. Methods are attributed to the most recently
/// declared class; a `}` in column zero closes it, and functions outside any
/// class are not indexed.
///
/// The closing `*/` is dropped from every stored comment so a one-line
/// comment like `/** @var int */` does not leave `*/` in the last value.
#[derive(Debug, Default)]
pub struct SourceIndex {
    comments: HashMap<Reference, String>,
    order: Vec<Reference>,
}

enum Event<'a> {
    Class(&'a str),
    Function(&'a str),
    ClassEnd,
}

impl SourceIndex {
    pub fn parse(source: &str) -> Self {
        let doc_comments: Vec<(usize, &str)> = RE_DOC_COMMENT
            .find_iter(source)
            .map(|m| (m.end(), m.as_str()))
            .collect();

        let mut events: Vec<(usize, Event)> = Vec::new();
        for caps in RE_CLASS_DECL.captures_iter(source) {
            if let (Some(all), Some(name)) = (caps.get(0), caps.get(1)) {
                events.push((all.start(), Event::Class(name.as_str())));
            }
        }
        for caps in RE_FUNCTION_DECL.captures_iter(source) {
            if let (Some(all), Some(name)) = (caps.get(0), caps.get(1)) {
                events.push((all.start(), Event::Function(name.as_str())));
            }
        }
        for m in RE_CLASS_END.find_iter(source) {
            events.push((m.start(), Event::ClassEnd));
        }
        events.sort_by_key(|(pos, _)| *pos);

        let mut index = SourceIndex::default();
        let mut current_class: Option<&str> = None;

        for (pos, event) in events {
            let reference = match event {
                Event::Class(name) => {
                    current_class = Some(name);
                    Reference::class(name)
                }
                Event::Function(name) => match current_class {
                    Some(class) => Reference::method(class, name),
                    None => {
                        tracing::trace!(function = name, "skipping function outside a class");
                        continue;
                    }
                },
                Event::ClassEnd => {
                    current_class = None;
                    continue;
                }
            };

            let comment = attached_comment(source, &doc_comments, pos).unwrap_or_default();
            tracing::trace!(%reference, has_comment = !comment.is_empty(), "indexed declaration");
            if !index.comments.contains_key(&reference) {
                index.order.push(reference.clone());
            }
            index
                .comments
                .insert(reference, strip_closing(comment).to_string());
        }

        index
    }

    /// Indexed declarations in source order.
    pub fn references(&self) -> &[Reference] {
        &self.order
    }
}

impl DeclarationResolver for SourceIndex {
    fn doc_comment(&self, reference: &Reference) -> String {
        self.comments.get(reference).cloned().unwrap_or_default()
    }
}

/// `comment` without its closing `*/` and the blanks before it.
fn strip_closing(comment: &str) -> &str {
    comment
        .strip_suffix("*/")
        .map(str::trim_end)
        .unwrap_or(comment)
}

/// The doc comment directly above the declaration starting at `decl_start`, if any.
fn attached_comment<'a>(
    source: &str,
    doc_comments: &[(usize, &'a str)],
    decl_start: usize,
) -> Option<&'a str> {
    let (end, text) = doc_comments
        .iter()
        .rev()
        .find(|(end, _)| *end <= decl_start)?;
    let gap = &source[*end..decl_start];
    let attached = gap.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with("#[")
    });
    attached.then_some(*text)
}
