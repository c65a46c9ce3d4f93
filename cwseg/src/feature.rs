use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corpus::SEPARATOR;
use crate::errors::{CwsegError, Result};

/// Character offsets of the default templates: unigrams, bigrams and the trigram
/// around the current position.
const DEFAULT_TEMPLATES: [&[isize]; 7] = [
    &[-1],
    &[0],
    &[1],
    &[-1, 0],
    &[-1, 1],
    &[0, 1],
    &[-1, 0, 1],
];

/// Largest distance a template may look away from the current position.
///
/// Streams are padded with a single separator, so one character of context is
/// always available.
pub const MAX_OFFSET: isize = 1;

/// A feature instance: the template that produced it and the characters it saw.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey {
    pub template: u8,
    pub chars: String,
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.template)?;
        for c in self.chars.chars() {
            if c == SEPARATOR {
                write!(f, "$")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// An ordered set of feature templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<isize>>", into = "Vec<Vec<isize>>")]
pub struct Templates {
    offsets: Vec<Vec<isize>>,
}

impl Default for Templates {
    fn default() -> Self {
        Templates {
            offsets: DEFAULT_TEMPLATES.iter().map(|t| t.to_vec()).collect(),
        }
    }
}

impl Templates {
    /// Creates a template set from offset lists.
    ///
    /// # Errors
    /// Returns an error if the set or one of its templates is empty, if there are
    /// more than 256 templates, or if an offset exceeds [`MAX_OFFSET`].
    pub fn new(offsets: Vec<Vec<isize>>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(CwsegError::invalid_argument("offsets", "no template given"));
        }
        if offsets.len() > usize::from(u8::MAX) + 1 {
            return Err(CwsegError::invalid_argument(
                "offsets",
                format!("too many templates: {}", offsets.len()),
            ));
        }
        for template in &offsets {
            if template.is_empty() {
                return Err(CwsegError::invalid_argument("offsets", "empty template"));
            }
            if let Some(off) = template.iter().find(|off| off.abs() > MAX_OFFSET) {
                return Err(CwsegError::invalid_argument(
                    "offsets",
                    format!("offset {} is out of range [-{}, {}]", off, MAX_OFFSET, MAX_OFFSET),
                ));
            }
        }
        Ok(Templates { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offsets of the template with the given id.
    pub fn get(&self, template: u8) -> Option<&[isize]> {
        self.offsets.get(usize::from(template)).map(Vec::as_slice)
    }

    /// Extracts one feature key per template at position `i` of a padded stream.
    ///
    /// `stream[i - 1]` and `stream[i + 1]` must exist, which the separator
    /// padding guarantees for every real character.
    ///
    /// # Example
    /// ```
    /// use cwseg::feature::{FeatureKey, Templates};
    ///
    /// let stream: Vec<char> = "\0北京\0".chars().collect();
    /// let keys = Templates::default().extract(&stream, 1);
    /// assert_eq!(keys.len(), 7);
    /// assert_eq!(keys[5], FeatureKey { template: 5, chars: "北京".to_string() });
    /// ```
    pub fn extract(&self, stream: &[char], i: usize) -> Vec<FeatureKey> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(j, template)| FeatureKey {
                // at most 256 templates
                template: j as u8,
                chars: template
                    .iter()
                    .map(|&off| stream[i.wrapping_add_signed(off)])
                    .collect(),
            })
            .collect()
    }
}

impl TryFrom<Vec<Vec<isize>>> for Templates {
    type Error = CwsegError;

    fn try_from(offsets: Vec<Vec<isize>>) -> Result<Self> {
        Self::new(offsets)
    }
}

impl From<Templates> for Vec<Vec<isize>> {
    fn from(templates: Templates) -> Self {
        templates.offsets
    }
}
