//! Field-selective JSON tree walker
//!
//! The walker rebuilds a document value by value. At every string leaf it
//! asks a [`FieldClassifier`] whether `(ancestor path, field name)` is in
//! scope, and if so hands the text to a [`LeafTransform`]. Everything else is
//! copied unchanged, so object key order, array order and non-target fields
//! survive every walk.
//!
//! Arrays are transparent: their elements inherit the array's field name and
//! add no path segment. Descending from a named field into an object appends
//! that name to the path; the root has no name and adds nothing.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::types::is_blank;
use ktjson_rules::FieldClassifier;
use serde_json::{Map, Value};

/// A string leaf selected for transformation
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    /// RFC 6901 pointer to the leaf
    pub pointer: &'a str,
    /// Ancestor object keys
    pub path: &'a [String],
    /// Field name the leaf was classified under
    pub field: &'a str,
    /// Current text
    pub text: &'a str,
}

/// Per-string operation plugged into the walker
pub trait LeafTransform {
    /// Replacement text for an in-scope, non-blank leaf
    fn transform(&mut self, leaf: &Leaf<'_>) -> String;

    /// Whether the entry `key` of an object at `path` is removed.
    /// Only field deletion answers yes.
    fn prune(&mut self, _path: &[String], _key: &str) -> bool {
        false
    }
}

/// Leaves every string as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl LeafTransform for Identity {
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        leaf.text.to_string()
    }
}

impl<F> LeafTransform for F
where
    F: FnMut(&str) -> String,
{
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        self(leaf.text)
    }
}

/// Content of an array, resolved once by inspecting every element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayShape {
    /// Every element is a string
    Strings,
    /// At least one element is not a string (mixed arrays included)
    Structured,
    Empty,
}

impl ArrayShape {
    pub fn of(items: &[Value]) -> Self {
        if items.is_empty() {
            ArrayShape::Empty
        } else if items.iter().all(Value::is_string) {
            ArrayShape::Strings
        } else {
            ArrayShape::Structured
        }
    }
}

/// Emitted after each leaf the walker handed to the transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEvent {
    pub pointer: String,
    pub field: String,
    pub changed: bool,
}

/// Walks documents with a fixed classifier and optional progress observer
pub struct Walker<'a> {
    classifier: &'a dyn FieldClassifier,
    observer: Option<&'a mut dyn FnMut(&LeafEvent)>,
}

impl<'a> Walker<'a> {
    pub fn new(classifier: &'a dyn FieldClassifier) -> Self {
        Self {
            classifier,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a mut dyn FnMut(&LeafEvent)) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Walk `value` from the document root, returning a new value
    pub fn walk<T: LeafTransform + ?Sized>(&mut self, value: &Value, transform: &mut T) -> Value {
        let mut cursor = Cursor::default();
        self.walk_value(value, None, &mut cursor, transform)
    }

    fn walk_value<T: LeafTransform + ?Sized>(
        &mut self,
        value: &Value,
        field: Option<&str>,
        cursor: &mut Cursor,
        transform: &mut T,
    ) -> Value {
        match value {
            Value::String(text) => match field {
                Some(name) if self.classifier.classify(&cursor.path, name) => {
                    Value::String(self.apply(text, name, cursor, transform))
                }
                _ => value.clone(),
            },
            Value::Object(map) => self.walk_object(map, field, cursor, transform),
            Value::Array(items) => self.walk_array(items, field, cursor, transform),
            _ => value.clone(),
        }
    }

    fn walk_object<T: LeafTransform + ?Sized>(
        &mut self,
        map: &Map<String, Value>,
        field: Option<&str>,
        cursor: &mut Cursor,
        transform: &mut T,
    ) -> Value {
        if let Some(name) = field {
            cursor.path.push(name.to_string());
        }

        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            if transform.prune(&cursor.path, key) {
                continue;
            }
            let mark = cursor.enter(key);
            let walked = self.walk_value(child, Some(key.as_str()), cursor, transform);
            cursor.leave(mark);
            out.insert(key.clone(), walked);
        }

        if field.is_some() {
            cursor.path.pop();
        }
        Value::Object(out)
    }

    fn walk_array<T: LeafTransform + ?Sized>(
        &mut self,
        items: &[Value],
        field: Option<&str>,
        cursor: &mut Cursor,
        transform: &mut T,
    ) -> Value {
        match ArrayShape::of(items) {
            ArrayShape::Empty => Value::Array(Vec::new()),
            ArrayShape::Strings => {
                let in_scope = field
                    .map(|name| self.classifier.classify(&cursor.path, name))
                    .unwrap_or(false);
                if !in_scope {
                    return Value::Array(items.to_vec());
                }
                let name = field.unwrap_or_default();
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let text = item.as_str().unwrap_or_default();
                    let mark = cursor.enter(&index.to_string());
                    out.push(Value::String(self.apply(text, name, cursor, transform)));
                    cursor.leave(mark);
                }
                Value::Array(out)
            }
            ArrayShape::Structured => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mark = cursor.enter(&index.to_string());
                    out.push(self.walk_value(item, field, cursor, transform));
                    cursor.leave(mark);
                }
                Value::Array(out)
            }
        }
    }

    /// Transform one in-scope string; blank strings pass through
    fn apply<T: LeafTransform + ?Sized>(
        &mut self,
        text: &str,
        field: &str,
        cursor: &Cursor,
        transform: &mut T,
    ) -> String {
        if is_blank(text) {
            return text.to_string();
        }

        let leaf = Leaf {
            pointer: &cursor.pointer,
            path: &cursor.path,
            field,
            text,
        };
        let result = transform.transform(&leaf);

        if let Some(observer) = self.observer.as_deref_mut() {
            observer(&LeafEvent {
                pointer: cursor.pointer.clone(),
                field: field.to_string(),
                changed: result != text,
            });
        }
        result
    }
}

/// Walk `value` with `classifier` and `transform`, without an observer
pub fn walk<T: LeafTransform + ?Sized>(
    value: &Value,
    classifier: &dyn FieldClassifier,
    transform: &mut T,
) -> Value {
    Walker::new(classifier).walk(value, transform)
}

/// Ancestor path and JSON Pointer of the node being visited
#[derive(Debug, Default)]
struct Cursor {
    path: Vec<String>,
    pointer: String,
}

impl Cursor {
    /// Append a reference token, returning the pointer length to restore
    fn enter(&mut self, token: &str) -> usize {
        let mark = self.pointer.len();
        self.pointer.push('/');
        self.pointer.push_str(&escape_pointer_token(token));
        mark
    }

    fn leave(&mut self, mark: usize) {
        self.pointer.truncate(mark);
    }
}

/// Escape a key for use as an RFC 6901 reference token
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
