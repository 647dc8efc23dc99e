//! Field Schema
//!
//! Each step's schema is its default ("empty") document plus an item
//! template for every variable-length array. Incoming answers are conformed
//! to the shape of the addressed sub-tree before they reach the validator,
//! so a valid document never gains unknown keys or loses known ones.

use ob_onboarding_types::{FieldErrors, FieldPath, PathSegment};
use serde_json::{Map, Value};

use crate::document::Doc;

/// Default document and array item templates for one step.
#[derive(Debug, Clone)]
pub struct StepSchema {
    defaults: Value,
    items: Vec<(FieldPath, Value)>,
}

impl StepSchema {
    pub fn new(defaults: Value) -> Self {
        Self {
            defaults,
            items: Vec::new(),
        }
    }

    /// Register the element shape of the array at `dotted`.
    pub fn with_items(mut self, dotted: &str, item: Value) -> Self {
        self.items.push((FieldPath::parse(dotted), item));
        self
    }

    pub fn defaults(&self) -> &Value {
        &self.defaults
    }

    /// Element template for the array at `path`; indices in `path` are ignored.
    pub fn item_template(&self, path: &FieldPath) -> Option<&Value> {
        let keys = key_segments(path);
        self.items
            .iter()
            .find(|(p, _)| key_segments(p) == keys)
            .map(|(_, item)| item)
    }

    /// Template for the node at `path`, descending into array item templates.
    pub fn template_at(&self, path: &FieldPath) -> Option<Value> {
        let mut node = self.defaults.clone();
        let mut walked = FieldPath::root();
        for seg in path.segments() {
            node = match seg {
                PathSegment::Key(k) => node.get(k)?.clone(),
                PathSegment::Index(_) => self.item_template(&walked)?.clone(),
            };
            walked = match seg {
                PathSegment::Key(k) => walked.key(k),
                PathSegment::Index(i) => walked.index(*i),
            };
        }
        Some(node)
    }

    /// Conform `answer` to the shape of the node at `path`, merging object
    /// keys the answer omits from `fields`. Shape errors are keyed by the
    /// offending path relative to the step document.
    pub fn conform(
        &self,
        fields: &Value,
        path: &FieldPath,
        answer: Value,
    ) -> Result<Value, FieldErrors> {
        let Some(template) = self.template_at(path) else {
            return Err(FieldErrors::single(path.clone(), "Unknown field"));
        };
        let current = Doc::new(fields).node(path).cloned().unwrap_or(Value::Null);
        let mut errors = FieldErrors::new();
        let conformed = self.conform_node(path, &template, &current, answer, &mut errors);
        if errors.is_empty() {
            Ok(conformed)
        } else {
            Err(errors)
        }
    }

    fn conform_node(
        &self,
        path: &FieldPath,
        template: &Value,
        current: &Value,
        answer: Value,
        errors: &mut FieldErrors,
    ) -> Value {
        match (template, answer) {
            (Value::Object(shape), Value::Object(mut given)) => {
                for unknown in given.keys().filter(|k| !shape.contains_key(*k)) {
                    errors.insert(path.key(unknown), "Unknown field");
                }
                let mut out: Map<String, Value> = match current {
                    Value::Object(existing) => existing.clone(),
                    _ => Map::new(),
                };
                for (key, child_template) in shape {
                    let child_current = current.get(key).unwrap_or(child_template);
                    let child = match given.remove(key) {
                        Some(child_answer) => self.conform_node(
                            &path.key(key),
                            child_template,
                            child_current,
                            child_answer,
                            errors,
                        ),
                        None => child_current.clone(),
                    };
                    out.insert(key.clone(), child);
                }
                Value::Object(out)
            }
            (Value::Object(_), _) => {
                errors.insert(path.clone(), "Expected an object");
                current.clone()
            }
            (Value::Array(_), Value::Array(given)) => {
                let item_template = self.item_template(path).cloned();
                let items = given
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| match &item_template {
                        Some(t) => self.conform_node(&path.index(i), t, t, item, errors),
                        None => item,
                    })
                    .collect();
                Value::Array(items)
            }
            (Value::Array(_), _) => {
                errors.insert(path.clone(), "Expected a list");
                current.clone()
            }
            (Value::Bool(_), Value::Bool(b)) => Value::Bool(b),
            (Value::Bool(_), _) => {
                errors.insert(path.clone(), "Expected true or false");
                current.clone()
            }
            (Value::String(_), Value::String(s)) => Value::String(s),
            (Value::String(_), Value::Null) => Value::String(String::new()),
            (Value::String(_), _) => {
                errors.insert(path.clone(), "Expected text");
                current.clone()
            }
            (Value::Number(_), answer @ (Value::Number(_) | Value::Null)) => answer,
            (Value::Number(_), _) => {
                errors.insert(path.clone(), "Expected a number");
                current.clone()
            }
            // Nullable scalar (dates, years, counts).
            (Value::Null, answer @ (Value::Null | Value::String(_) | Value::Number(_))) => answer,
            (Value::Null, _) => {
                errors.insert(path.clone(), "Expected a single value");
                current.clone()
            }
        }
    }
}

fn key_segments(path: &FieldPath) -> Vec<&str> {
    path.segments()
        .iter()
        .filter_map(|s| match s {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::Index(_) => None,
        })
        .collect()
}
