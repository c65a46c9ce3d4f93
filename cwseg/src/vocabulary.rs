use std::collections::HashMap;

use crate::corpus::TaggedCorpus;
use crate::errors::{CwsegError, Result};
use crate::feature::{FeatureKey, Templates};

/// Dense indices for the feature keys observed in a training corpus.
///
/// Indices are assigned in first-seen order, so the same corpus always yields
/// the same vocabulary.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    ids: HashMap<FeatureKey, usize>,
    keys: Vec<FeatureKey>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the vocabulary from every non-separator position of `corpus`.
    pub fn build(corpus: &TaggedCorpus, templates: &Templates) -> Self {
        let mut vocabulary = Self::new();
        for i in corpus.positions() {
            for key in templates.extract(corpus.chars(), i) {
                vocabulary.get_or_insert(key);
            }
        }
        vocabulary
    }

    /// Restores a vocabulary whose indices follow the order of `keys`.
    ///
    /// # Errors
    /// Returns an error if a key appears twice.
    pub fn from_keys(keys: Vec<FeatureKey>) -> Result<Self> {
        let mut ids = HashMap::with_capacity(keys.len());
        for (id, key) in keys.iter().enumerate() {
            if ids.insert(key.clone(), id).is_some() {
                return Err(CwsegError::invalid_format(
                    "keys",
                    format!("duplicate feature {}", key),
                ));
            }
        }
        Ok(Vocabulary { ids, keys })
    }

    /// Returns the index of `key`, inserting it at the end if it is new.
    pub fn get_or_insert(&mut self, key: FeatureKey) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            id
        } else {
            let id = self.keys.len();
            self.keys.push(key.clone());
            self.ids.insert(key, id);
            id
        }
    }

    /// Returns the index of `key`, or `None` if it was never observed.
    pub fn index_of(&self, key: &FeatureKey) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// Number of distinct features.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in index order.
    pub fn keys(&self) -> &[FeatureKey] {
        &self.keys
    }
}
