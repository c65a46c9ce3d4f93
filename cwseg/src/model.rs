use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CwsegError, Result};
use crate::feature::{FeatureKey, Templates};
use crate::vocabulary::Vocabulary;

/// On-disk form of a feature and its learned weight.
#[derive(Debug, Serialize, Deserialize)]
struct FeatureWeight {
    template: u8,
    chars: String,
    weight: i64,
}

/// On-disk form of a [`Model`].
#[derive(Debug, Serialize, Deserialize)]
struct ModelRecord {
    templates: Templates,
    features: Vec<FeatureWeight>,
}

/// A trained segmentation model: the templates it was trained with, its
/// vocabulary and one weight per vocabulary entry.
#[derive(Clone, Debug)]
pub struct Model {
    templates: Templates,
    vocabulary: Vocabulary,
    weights: Vec<i64>,
}

impl Model {
    /// Creates a new model.
    ///
    /// # Errors
    /// Returns an error if the number of weights differs from the vocabulary size.
    pub fn new(templates: Templates, vocabulary: Vocabulary, weights: Vec<i64>) -> Result<Self> {
        if weights.len() != vocabulary.len() {
            return Err(CwsegError::invalid_argument(
                "weights",
                format!(
                    "{} weights given for a vocabulary of {} features",
                    weights.len(),
                    vocabulary.len()
                ),
            ));
        }
        Ok(Model {
            templates,
            vocabulary,
            weights,
        })
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    /// Returns the weight of `key`, or `None` if it is not in the vocabulary.
    pub fn weight_of(&self, key: &FeatureKey) -> Option<i64> {
        self.vocabulary.index_of(key).map(|id| self.weights[id])
    }

    /// Scores position `i` of a padded stream. Unknown features contribute nothing.
    pub fn score(&self, stream: &[char], i: usize) -> i64 {
        self.templates
            .extract(stream, i)
            .iter()
            .filter_map(|key| self.weight_of(key))
            .sum()
    }

    /// Writes the model as JSON.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let record = ModelRecord {
            templates: self.templates.clone(),
            features: self
                .vocabulary
                .keys()
                .iter()
                .zip(self.weights.iter())
                .map(|(key, &weight)| FeatureWeight {
                    template: key.template,
                    chars: key.chars.clone(),
                    weight,
                })
                .collect(),
        };
        serde_json::to_writer(writer, &record)?;
        Ok(())
    }

    /// Reads a model written by [`Model::write`].
    ///
    /// # Errors
    /// Returns an error if the data is not valid JSON, or if a feature refers to an
    /// unknown template, has the wrong number of characters, or appears twice.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let record: ModelRecord = serde_json::from_reader(reader)?;

        let mut keys = Vec::with_capacity(record.features.len());
        let mut weights = Vec::with_capacity(record.features.len());
        for feature in record.features {
            let arity = record
                .templates
                .get(feature.template)
                .ok_or_else(|| {
                    CwsegError::invalid_format(
                        "features",
                        format!("unknown template {}", feature.template),
                    )
                })?
                .len();
            if feature.chars.chars().count() != arity {
                return Err(CwsegError::invalid_format(
                    "features",
                    format!(
                        "template {} expects {} characters, found {:?}",
                        feature.template, arity, feature.chars
                    ),
                ));
            }
            keys.push(FeatureKey {
                template: feature.template,
                chars: feature.chars,
            });
            weights.push(feature.weight);
        }

        Self::new(record.templates, Vocabulary::from_keys(keys)?, weights)
    }

    /// Saves the model to a file.
    pub fn save_model(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a model from a file.
    pub fn load_model(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    use crate::corpus::SEPARATOR;

    fn key(template: u8, chars: &str) -> FeatureKey {
        FeatureKey {
            template,
            chars: chars.to_string(),
        }
    }

    fn unigram_model() -> Model {
        let templates = Templates::new(vec![vec![0], vec![-1, 0]]).unwrap();
        let vocabulary =
            Vocabulary::from_keys(vec![key(0, "A"), key(0, "B"), key(1, "AB")]).unwrap();
        Model::new(templates, vocabulary, vec![-2, 3, 4]).unwrap()
    }

    #[test]
    fn test_new_dim_mismatch() {
        let vocabulary = Vocabulary::from_keys(vec![key(0, "A")]).unwrap();
        let result = Model::new(Templates::default(), vocabulary, vec![1, 2]);
        assert!(matches!(result, Err(CwsegError::InvalidArgument { .. })));
    }

    #[test]
    fn test_score() {
        let model = unigram_model();
        let stream: Vec<char> = vec![SEPARATOR, 'A', 'B', 'C', SEPARATOR];

        assert_eq!(model.score(&stream, 1), -2);
        assert_eq!(model.score(&stream, 2), 3 + 4);
        // 'C' and "BC" are unknown
        assert_eq!(model.score(&stream, 3), 0);
        assert_eq!(model.weight_of(&key(0, "C")), None);
    }

    #[test]
    fn test_save_and_load() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let model = unigram_model();
        let model_file = NamedTempFile::new()?;
        model.save_model(model_file.path())?;

        let loaded = Model::load_model(model_file.path())?;
        assert_eq!(loaded.templates(), model.templates());
        assert_eq!(loaded.vocabulary().keys(), model.vocabulary().keys());
        assert_eq!(loaded.weights(), model.weights());
        Ok(())
    }

    #[test]
    fn test_read_separator_keys() -> Result<()> {
        let json = r#"{"templates":[[-1,0]],
            "features":[{"template":0,"chars":"\u0000A","weight":5}]}"#;
        let model = Model::read(json.as_bytes())?;
        assert_eq!(model.weight_of(&key(0, "\0A")), Some(5));
        Ok(())
    }

    #[test]
    fn test_read_invalid() {
        // unknown template
        let json = r#"{"templates":[[0]],"features":[{"template":1,"chars":"A","weight":1}]}"#;
        assert!(matches!(Model::read(json.as_bytes()), Err(CwsegError::InvalidFormat { .. })));

        // wrong arity
        let json = r#"{"templates":[[0]],"features":[{"template":0,"chars":"AB","weight":1}]}"#;
        assert!(matches!(Model::read(json.as_bytes()), Err(CwsegError::InvalidFormat { .. })));

        // duplicate key
        let json = r#"{"templates":[[0]],"features":[
            {"template":0,"chars":"A","weight":1},
            {"template":0,"chars":"A","weight":2}]}"#;
        assert!(matches!(Model::read(json.as_bytes()), Err(CwsegError::InvalidFormat { .. })));

        assert!(matches!(Model::read("not json".as_bytes()), Err(CwsegError::Json(_))));
    }
}
