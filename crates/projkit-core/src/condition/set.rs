//! Parsed condition values

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ConditionError;
use super::grammar::{
    check_condition, join_names, join_values, parse_conditions, serialize_conditions,
};

/// A single `(name, value)` pair from a condition expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    name: String,
    value: String,
}

impl Condition {
    /// Pair a variable name with the value it is compared against.
    ///
    /// Nothing is checked here; [`ConditionSet::new`] rejects pairs that
    /// cannot be written as condition text.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Variable name, without the `$(...)` wrapper
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value the variable must equal
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Condition {
    fn from((name, value): (K, V)) -> Self {
        Self::new(name, value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$({}) == {}", self.name, self.value)
    }
}

/// An ordered, uniquely keyed set of conditions
///
/// Holds two views built once from the same input: the ordered sequence
/// (used for equality, hashing, iteration and positional access) and a
/// name index for lookups. Equality is order-sensitive, so
/// `[(A,1),(B,2)]` and `[(B,2),(A,1)]` are different sets.
///
/// The joined name/value lists and the display text are computed on first
/// access and cached.
#[derive(Debug, Clone)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
    index: HashMap<String, usize>,
    names: OnceLock<String>,
    quoted_names: OnceLock<String>,
    values: OnceLock<String>,
    quoted_values: OnceLock<String>,
    text: OnceLock<String>,
}

impl ConditionSet {
    /// Build a set from conditions in order
    ///
    /// Fails on an empty set, a repeated name, or a pair the condition text
    /// cannot carry (a name that is not an identifier, a value with `'` or
    /// `|`), so every set writes text that parses back to itself.
    pub fn new<I>(conditions: I) -> Result<Self, ConditionError>
    where
        I: IntoIterator<Item = Condition>,
    {
        let conditions: Vec<Condition> = conditions.into_iter().collect();
        if conditions.is_empty() {
            return Err(ConditionError::EmptyConditionSet);
        }
        let mut index = HashMap::with_capacity(conditions.len());
        for (position, condition) in conditions.iter().enumerate() {
            check_condition(condition)?;
            if index.insert(condition.name.clone(), position).is_some() {
                return Err(ConditionError::DuplicateName(condition.name.clone()));
            }
        }

        Ok(Self {
            conditions,
            index,
            names: OnceLock::new(),
            quoted_names: OnceLock::new(),
            values: OnceLock::new(),
            quoted_values: OnceLock::new(),
            text: OnceLock::new(),
        })
    }

    /// Build a set from raw name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConditionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(Condition::from))
    }

    /// Parse condition text such as `'$(Configuration)' == 'Debug'`
    pub fn parse(text: &str) -> Result<Self, ConditionError> {
        Self::new(parse_conditions(text)?)
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&position| self.conditions[position].value())
    }

    /// Look up a value by name, failing if it is absent
    pub fn value(&self, name: &str) -> Result<&str, ConditionError> {
        self.get(name)
            .ok_or_else(|| ConditionError::KeyNotFound(name.to_string()))
    }

    /// Whether a condition with this name is present
    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Condition at a zero-based position in construction order
    pub fn get_index(&self, position: usize) -> Option<&Condition> {
        self.conditions.get(position)
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Always false for a set built through [`ConditionSet::new`]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate conditions in order
    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    /// Iterate `(name, value)` pairs in order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.conditions.iter().map(|c| (c.name(), c.value()))
    }

    /// Names joined as `$(A)|$(B)`, optionally quoted
    pub fn names(&self, quoted: bool) -> &str {
        let cell = if quoted {
            &self.quoted_names
        } else {
            &self.names
        };
        cell.get_or_init(|| join_names(&self.conditions, quoted))
    }

    /// Values joined as `x|y`, optionally quoted
    pub fn values(&self, quoted: bool) -> &str {
        let cell = if quoted {
            &self.quoted_values
        } else {
            &self.values
        };
        cell.get_or_init(|| join_values(&self.conditions, quoted))
    }

    /// Condition text, with one leading and one trailing space
    pub fn text(&self) -> &str {
        self.text
            .get_or_init(|| serialize_conditions(&self.conditions))
    }

    /// Conditions in order, as a slice
    pub fn as_slice(&self) -> &[Condition] {
        &self.conditions
    }
}

impl PartialEq for ConditionSet {
    fn eq(&self, other: &Self) -> bool {
        self.conditions == other.conditions
    }
}

impl Eq for ConditionSet {}

impl Hash for ConditionSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.conditions.hash(state);
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl FromStr for ConditionSet {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Index<usize> for ConditionSet {
    type Output = Condition;

    fn index(&self, position: usize) -> &Condition {
        &self.conditions[position]
    }
}

impl Index<&str> for ConditionSet {
    type Output = str;

    /// Panics if the name is absent, like `HashMap`'s indexer.
    /// Use [`ConditionSet::get`] or [`ConditionSet::value`] otherwise.
    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(value) => value,
            None => panic!("condition not found: {}", name),
        }
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

impl Serialize for ConditionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
