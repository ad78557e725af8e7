use std::{ops::Index, slice};

use serde::{de, Deserialize};

use crate::de::BindingsDeserializer;

/// A named value captured by a parameter or wildcard segment.
///
/// Parameter bindings always hold exactly one value; wildcard bindings hold every segment they
/// consumed, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Parameter or wildcard name, without its sigil. Empty for anonymous segments.
    pub name: String,

    /// Consumed segment values.
    pub values: Vec<String>,
}

impl Binding {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Binding {
            name: name.into(),
            values,
        }
    }
}

/// Ordered bindings captured while matching one route, outermost segment first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bindings {
    items: Vec<Binding>,
}

impl Bindings {
    /// Constructs an empty binding list.
    pub fn new() -> Self {
        Bindings { items: Vec::new() }
    }

    /// Returns the values of the first binding called `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.items
            .iter()
            .find(|binding| binding.name == name)
            .map(|binding| binding.values.as_slice())
    }

    /// Returns the first value of the first binding called `name`.
    pub fn get_one(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(name, values)` pairs in binding order.
    pub fn iter(&self) -> BindingsIter<'_> {
        BindingsIter {
            inner: self.items.iter(),
        }
    }

    /// Returns the bindings as a slice.
    pub fn as_slice(&self) -> &[Binding] {
        &self.items
    }

    /// Deserializes the bindings into `U`.
    ///
    /// Structs and maps are filled by binding name; tuples and sequences by binding order. A
    /// wildcard binding can fill a `Vec<String>` field with every segment it consumed.
    ///
    /// # Errors
    /// Returns error when the bindings cannot be deserialized into a `U` type.
    pub fn load<'de, U: Deserialize<'de>>(&'de self) -> Result<U, de::value::Error> {
        Deserialize::deserialize(BindingsDeserializer::new(self))
    }

    pub(crate) fn push(&mut self, binding: Binding) {
        self.items.push(binding);
    }

    pub(crate) fn pop(&mut self) {
        self.items.pop();
    }
}

impl From<Vec<Binding>> for Bindings {
    fn from(items: Vec<Binding>) -> Self {
        Bindings { items }
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = (&'a str, &'a [String]);
    type IntoIter = BindingsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<&str> for Bindings {
    type Output = [String];

    fn index(&self, name: &str) -> &[String] {
        self.get(name)
            .expect("Value for binding is not available")
    }
}

/// Iterator over `(name, values)` pairs of [`Bindings`].
#[derive(Debug, Clone)]
pub struct BindingsIter<'a> {
    inner: slice::Iter<'a, Binding>,
}

impl<'a> Iterator for BindingsIter<'a> {
    type Item = (&'a str, &'a [String]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|binding| (binding.name.as_str(), binding.values.as_slice()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for BindingsIter<'_> {}

/// A route that matched a lookup: its handler and the values its dynamic segments captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<T> {
    pub handler: T,
    pub bindings: Bindings,
}

/// Every route matching a lookup, highest priority first.
pub type Routes<T> = Vec<Route<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bindings {
        Bindings::from(vec![
            Binding::new("id", vec!["123".to_owned()]),
            Binding::new("name", vec!["john".to_owned()]),
            Binding::new("path", vec!["a".to_owned(), "b.txt".to_owned()]),
            Binding::new("id", vec!["shadowed".to_owned()]),
        ])
    }

    #[test]
    fn get_first_match() {
        let bindings = sample();

        assert_eq!(bindings.get("id").unwrap(), ["123"]);
        assert_eq!(bindings.get_one("name"), Some("john"));
        assert_eq!(bindings.get("path").unwrap(), ["a", "b.txt"]);
        assert_eq!(bindings.get_one("path"), Some("a"));

        assert!(bindings.get("nonexistent").is_none());
        assert!(bindings.get_one("nonexistent").is_none());
    }

    #[test]
    fn index_and_iter() {
        let bindings = sample();
        assert_eq!(&bindings["name"], ["john"]);
        assert_eq!(bindings.len(), 4);

        let names = bindings.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, ["id", "name", "path", "id"]);

        let mut count = 0;
        for (_, values) in &bindings {
            count += values.len();
        }
        assert_eq!(count, 5);
    }

    #[test]
    #[should_panic = "Value for binding is not available"]
    fn index_missing() {
        let _ = &Bindings::new()["id"];
    }

    #[test]
    fn push_pop() {
        let mut bindings = Bindings::new();
        assert!(bindings.is_empty());

        bindings.push(Binding::new("", vec!["x".to_owned()]));
        assert_eq!(bindings.get_one(""), Some("x"));

        bindings.pop();
        assert!(bindings.is_empty());
    }
}
