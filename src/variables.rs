use crate::objects::ShellObject;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Session variables, iterated in the order they were first assigned.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, ShellObject>,
    order: Vec<String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, keeping its original position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: ShellObject) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.values.insert(name, value);
    }

    /// A copy of this store with `name` bound to `value`.
    pub fn with(&self, name: impl Into<String>, value: ShellObject) -> Self {
        let mut next = self.clone();
        next.set(name, value);
        next
    }

    pub fn get(&self, name: &str) -> Option<&ShellObject> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShellObject)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, ShellObject)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, ShellObject)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (name, value) in iter {
            vars.set(name, value);
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_reassignment() {
        let mut vars = Variables::new();
        vars.set("b", ShellObject::Integer(1));
        vars.set("a", ShellObject::Integer(2));
        vars.set("b", ShellObject::Integer(3));

        let names: Vec<&str> = vars.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(vars.get("b"), Some(&ShellObject::Integer(3)));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let vars = Variables::new();
        let next = vars.with("x", ShellObject::Boolean(true));
        assert!(vars.is_empty());
        assert!(next.contains("x"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let vars: Variables = vec![
            ("name", ShellObject::from("John")),
            ("age", ShellObject::Integer(25)),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"name":"John","age":25}"#);
    }
}
