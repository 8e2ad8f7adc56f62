//! Annotation parser over a single doc comment.
//!
//! Two ways in: [`AnnotationParser::lookup`] answers one key without
//! reading the whole block, [`AnnotationParser::parameters`] parses
//! everything once and keeps the result. Both feed the same cache through
//! one insert-or-merge step.

use crate::declaration::{declaration_items, parse_variable_declaration, VariableDeclaration};
use crate::error::{Error, Result};
use crate::resolver::{DeclarationResolver, Reference};
use crate::scan::{self, Tag};
use crate::value::{parse_value, AnnotationValue};
use indexmap::IndexMap;
use serde_json::Map;

/// Every decoded occurrence of one key, in appearance order.
#[derive(Debug, Clone, Default)]
struct Occurrences(Vec<AnnotationValue>);

impl Occurrences {
    /// A single occurrence is its own value; several become a list.
    fn value(&self) -> AnnotationValue {
        match self.0.as_slice() {
            [single] => single.clone(),
            many => AnnotationValue::Array(many.to_vec()),
        }
    }
}

/// Parsed view of one doc comment.
///
/// Lookups fill a cache, so they take `&mut self`. A parser is cheap to build
/// and meant to live for one declaration; share it across threads only
/// behind your own lock.
#[derive(Debug, Clone, Default)]
pub struct AnnotationParser {
    raw: String,
    cache: IndexMap<String, Occurrences>,
    parsed_all: bool,
}

/// Record one more decoded occurrence of `key`.
fn insert_or_merge(cache: &mut IndexMap<String, Occurrences>, key: &str, value: AnnotationValue) {
    cache.entry(key.to_string()).or_default().0.push(value);
}

impl AnnotationParser {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Self::default()
        }
    }

    /// Build a parser from the doc comment `resolver` finds for `reference`.
    ///
    /// Fails before resolving anything when the reference names no class, or
    /// names an empty method.
    pub fn read<R>(resolver: &R, reference: &Reference) -> Result<Self>
    where
        R: DeclarationResolver + ?Sized,
    {
        if reference.is_empty() {
            return Err(Error::EmptyReference {
                method: reference.method.clone(),
            });
        }
        let raw = resolver.doc_comment(reference);
        tracing::debug!(%reference, bytes = raw.len(), "resolved doc comment");
        Ok(Self::new(raw))
    }

    /// Replace the comment text and drop everything derived from the old one.
    pub fn set_content(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
        self.cache.clear();
        self.parsed_all = false;
        tracing::trace!(bytes = self.raw.len(), "doc comment replaced");
    }

    /// The comment text currently being read.
    pub fn content(&self) -> &str {
        &self.raw
    }

    /// Value of `key`, without parsing the whole block.
    ///
    /// Returns `None` when the tag is absent. A tag that appears with
    /// nothing after it reads as `true`; that check runs before the value
    /// scan, so `@key` anywhere bare wins over `@key value` elsewhere.
    ///
    /// Keys outside `[A-Za-z0-9_-]+` are never scanned for; they only match
    /// a malformed tag already kept by [`parse_all`](Self::parse_all).
    pub fn lookup(&mut self, key: &str) -> Option<AnnotationValue> {
        if let Some(hit) = self.cache.get(key) {
            tracing::trace!(key, "annotation cache hit");
            return Some(hit.value());
        }

        if !scan::is_key(key) {
            return None;
        }

        if scan::has_bare(&self.raw, key) {
            return Some(AnnotationValue::Bool(true));
        }

        let mut values = scan::values_of(&self.raw, key).map(parse_value);
        let first = values.next()?;
        let Some(second) = values.next() else {
            return Some(first);
        };

        for value in [first, second].into_iter().chain(values) {
            insert_or_merge(&mut self.cache, key, value);
        }
        self.cache.get(key).map(Occurrences::value)
    }

    /// Alias of [`lookup`](Self::lookup).
    pub fn parameter(&mut self, key: &str) -> Option<AnnotationValue> {
        self.lookup(key)
    }

    /// Parse every tag in the block. Runs once per content.
    ///
    /// The result replaces whatever single-key lookups cached, so both paths
    /// agree afterwards.
    pub fn parse_all(&mut self) {
        if self.parsed_all {
            return;
        }

        let mut parsed = IndexMap::new();
        for segment in scan::segments(&self.raw) {
            match scan::classify(segment) {
                Tag::Valued { key, raw } => insert_or_merge(&mut parsed, key, parse_value(raw)),
                Tag::Bare(key) => insert_or_merge(&mut parsed, key, AnnotationValue::Bool(true)),
                Tag::Malformed(body) => {
                    tracing::trace!(body, "malformed tag kept as key");
                    insert_or_merge(&mut parsed, body, AnnotationValue::Null)
                }
            }
        }

        tracing::debug!(keys = parsed.len(), "parsed doc comment");
        self.cache = parsed;
        self.parsed_all = true;
    }

    /// Every annotation in the block, in first-appearance order.
    pub fn parameters(&mut self) -> Map<String, AnnotationValue> {
        self.parse_all();
        self.cache
            .iter()
            .map(|(key, occurrences)| (key.clone(), occurrences.value()))
            .collect()
    }

    /// Every annotation with each decoded occurrence kept apart.
    ///
    /// Same order as [`parameters`](Self::parameters), but a tag written once
    /// with a JSON list stays distinguishable from a repeated tag.
    pub fn occurrences(&mut self) -> Vec<(String, Vec<AnnotationValue>)> {
        self.parse_all();
        self.cache
            .iter()
            .map(|(key, occurrences)| (key.clone(), occurrences.0.clone()))
            .collect()
    }

    /// Parse the value(s) of `tag` as `type name` declarations.
    pub fn variable_declarations(&mut self, tag: &str) -> Result<Vec<VariableDeclaration>> {
        declaration_items(self.lookup(tag))
            .iter()
            .map(|item| parse_variable_declaration(item, tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROUTE_DOC: &str = r#"/**
 * Show a user.
 *
 * @route /users/{id}
 * @method GET
 * @auth
 * @timeout 30
 * @roles ["admin", "editor"]
 * @param int $id
 * @param bool $verbose
 */"#;

    #[test]
    fn no_tags_no_values() {
        let mut parser = AnnotationParser::new("/**\n * Nothing to see here.\n */");
        assert_eq!(parser.lookup("anything"), None);
        assert!(parser.parameters().is_empty());
    }

    #[test]
    fn bare_tag_is_true() {
        let mut parser = AnnotationParser::new("@flag");
        assert_eq!(parser.lookup("flag"), Some(json!(true)));
        let mut parser = AnnotationParser::new("@flag @other 1");
        assert_eq!(parser.lookup("flag"), Some(json!(true)));
    }

    #[test]
    fn json_number() {
        let mut parser = AnnotationParser::new("@count 3");
        assert_eq!(parser.lookup("count"), Some(json!(3)));
    }

    #[test]
    fn plain_string() {
        let mut parser = AnnotationParser::new("@name Alice");
        assert_eq!(parser.lookup("name"), Some(json!("Alice")));
    }

    #[test]
    fn null_literal_is_present_null() {
        let mut parser = AnnotationParser::new("@parent null\n");
        assert_eq!(parser.lookup("parent"), Some(json!(null)));
    }

    #[test]
    fn repeated_tag_is_ordered_list() {
        let mut parser = AnnotationParser::new("@tag a\n@tag b\n@tag c");
        assert_eq!(parser.lookup("tag"), Some(json!(["a", "b", "c"])));
    }

    #[test]
    fn repeated_lookup_served_from_cache() {
        let mut parser = AnnotationParser::new("@tag a\n@tag b");
        let first = parser.lookup("tag");
        assert_eq!(parser.lookup("tag"), first);
        assert_eq!(parser.cache.len(), 1);
    }

    #[test]
    fn single_lookup_not_cached() {
        let mut parser = AnnotationParser::new("@name Alice");
        parser.lookup("name");
        assert!(parser.cache.is_empty());
    }

    #[test]
    fn json_array_roundtrip() {
        let mut parser = AnnotationParser::new("@arr [1,2,3]");
        assert_eq!(parser.lookup("arr"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn bare_check_runs_before_value_scan() {
        let mut parser = AnnotationParser::new("@cache 60\n@cache\n");
        assert_eq!(parser.lookup("cache"), Some(json!(true)));
    }

    #[test]
    fn key_prefix_does_not_match() {
        let mut parser = AnnotationParser::new("@params x\n");
        assert_eq!(parser.lookup("param"), None);
    }

    #[test]
    fn invalid_key_not_scanned() {
        let mut parser = AnnotationParser::new("@a b c\n@ d\n");
        assert_eq!(parser.lookup("a b"), None);
        assert_eq!(parser.lookup(""), None);
        assert_eq!(parser.lookup("a"), Some(json!("b c")));

        let params = parser.parameters();
        assert_eq!(params.get("a"), Some(&json!("b c")));
        assert_eq!(parser.lookup("a b"), None);
    }

    #[test]
    fn malformed_key_from_full_parse_is_served() {
        let mut parser = AnnotationParser::new("mail admin@example.com\n");
        parser.parameters();
        assert_eq!(parser.lookup("example.com"), Some(json!(null)));
    }

    #[test]
    fn parameters_full_block() {
        let mut parser = AnnotationParser::new(ROUTE_DOC);
        let params = parser.parameters();
        assert_eq!(
            serde_json::Value::Object(params),
            json!({
                "route": "/users/{id}",
                "method": "GET",
                "auth": true,
                "timeout": 30,
                "roles": ["admin", "editor"],
                "param": ["int $id", "bool $verbose"],
            })
        );
    }

    #[test]
    fn parameters_keep_first_appearance_order() {
        let mut parser = AnnotationParser::new(ROUTE_DOC);
        let keys: Vec<String> = parser.parameters().keys().cloned().collect();
        assert_eq!(keys, vec!["route", "method", "auth", "timeout", "roles", "param"]);
    }

    #[test]
    fn malformed_body_kept_as_null_key() {
        let mut parser = AnnotationParser::new("Contact: admin@example.com\n@ok 1");
        let params = parser.parameters();
        assert_eq!(params.get("example.com"), Some(&json!(null)));
        assert_eq!(params.get("ok"), Some(&json!(1)));
    }

    #[test]
    fn merge_keeps_structured_first_value() {
        let mut parser = AnnotationParser::new("@arr [1,2]\n@arr [3]");
        assert_eq!(parser.parameters().get("arr"), Some(&json!([[1, 2], [3]])));
        assert_eq!(parser.lookup("arr"), Some(json!([[1, 2], [3]])));
    }

    #[test]
    fn occurrences_separate_list_value_from_repeats() {
        let mut parser = AnnotationParser::new("@roles [\"a\", \"b\"]\n@tag a\n@tag b");
        assert_eq!(
            parser.occurrences(),
            vec![
                ("roles".to_string(), vec![json!(["a", "b"])]),
                ("tag".to_string(), vec![json!("a"), json!("b")]),
            ]
        );
        let params = parser.parameters();
        assert_eq!(params.get("roles"), params.get("tag"));
    }

    #[test]
    fn parameters_idempotent() {
        let mut parser = AnnotationParser::new(ROUTE_DOC);
        let first = parser.parameters();
        let second = parser.parameters();
        assert_eq!(first, second);
    }

    #[test]
    fn full_parse_replaces_lookup_cache() {
        let mut parser = AnnotationParser::new("@tag 1\n@tag 2\n@tag 3");
        assert_eq!(parser.lookup("tag"), Some(json!([1, 2, 3])));
        assert_eq!(parser.parameters().get("tag"), Some(&json!([1, 2, 3])));
        assert_eq!(parser.lookup("tag"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn set_content_rederives() {
        let mut parser = AnnotationParser::new("@old 1\n@tag a\n@tag b");
        parser.lookup("tag");
        assert!(parser.parameters().contains_key("old"));

        parser.set_content("@new true");
        assert_eq!(parser.content(), "@new true");
        assert_eq!(parser.lookup("tag"), None);
        let params = parser.parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("new"), Some(&json!(true)));
    }

    #[test]
    fn declarations_from_repeated_tag() {
        let mut parser = AnnotationParser::new("@param string x\n@param int y");
        let decls = parser.variable_declarations("param").unwrap();
        assert_eq!(
            decls,
            vec![
                VariableDeclaration {
                    ty: "string".to_string(),
                    name: "x".to_string()
                },
                VariableDeclaration {
                    ty: "int".to_string(),
                    name: "y".to_string()
                },
            ]
        );
    }

    #[test]
    fn declaration_with_implied_type() {
        let mut parser = AnnotationParser::new("@flag onlyname");
        let decls = parser.variable_declarations("flag").unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].ty, "string");
        assert_eq!(decls[0].name, "onlyname");
    }

    #[test]
    fn declarations_absent_tag_is_empty() {
        let mut parser = AnnotationParser::new("@other x");
        assert!(parser.variable_declarations("param").unwrap().is_empty());
    }

    #[test]
    fn declaration_non_string_fails() {
        let mut parser = AnnotationParser::new("@param 5");
        let err = parser.variable_declarations("param").unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { ref tag, .. } if tag == "param"));
    }

    #[test]
    fn declaration_bare_tag_fails() {
        let mut parser = AnnotationParser::new("@param\n");
        assert!(parser.variable_declarations("param").is_err());
    }

    #[test]
    fn read_through_resolver() {
        let resolver = |r: &Reference| match r.method.as_deref() {
            Some("show") => "/**\n * @get\n */".to_string(),
            _ => String::new(),
        };
        let mut parser = AnnotationParser::read(&resolver, &Reference::method("Users", "show")).unwrap();
        assert_eq!(parser.lookup("get"), Some(json!(true)));

        let mut parser = AnnotationParser::read(&resolver, &Reference::class("Users")).unwrap();
        assert!(parser.parameters().is_empty());
    }

    #[test]
    fn read_rejects_empty_reference() {
        let resolver = |_: &Reference| -> String { panic!("must not resolve") };
        let err = AnnotationParser::read(&resolver, &Reference::class("")).unwrap_err();
        assert_eq!(err, Error::EmptyReference { method: None });
        let err = AnnotationParser::read(&resolver, &Reference::method("A", "")).unwrap_err();
        assert!(matches!(err, Error::EmptyReference { .. }));
    }
}
