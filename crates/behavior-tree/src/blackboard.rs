//! String-keyed storage shared by the nodes of one tree.
//!
//! A [`Blackboard`] is a convenient context type for trees whose leaves need
//! loosely typed shared data. Values are stored type-erased and read back
//! with the type they were written with.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use crate::error::{BlackboardError, Result};

#[derive(Default)]
pub struct Blackboard {
    values: HashMap<String, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a blackboard from `(key, value)` pairs of one type.
    ///
    /// Fails on the first repeated key.
    pub fn from_pairs<K, T, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        T: Any,
        I: IntoIterator<Item = (K, T)>,
    {
        let mut board = Self::new();
        for (key, value) in pairs {
            board.add(key, value)?;
        }
        Ok(board)
    }

    /// Inserts a new entry. Fails if `key` is already present.
    pub fn add<T: Any>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(BlackboardError::DuplicateKey(key));
        }
        self.values.insert(key, Box::new(value));
        Ok(())
    }

    /// Inserts or replaces an entry, whatever type it held before.
    pub fn set<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Result<&T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| BlackboardError::MissingKey(key.to_owned()))?;

        value
            .downcast_ref::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
            })
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Result<&mut T> {
        let value = self
            .values
            .get_mut(key)
            .ok_or_else(|| BlackboardError::MissingKey(key.to_owned()))?;

        value
            .downcast_mut::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes an entry, returning whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Blackboard").field("keys", &keys).finish()
    }
}
