use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::corpus::TaggedCorpus;
use crate::errors::{CwsegError, Result};
use crate::feature::Templates;
use crate::model::Model;
use crate::vocabulary::Vocabulary;

type Label = i8;

/// Classifies a score: only a strictly positive score starts a new word.
#[inline]
pub fn predict_label(score: i64) -> Label {
    if score > 0 {
        1
    } else {
        -1
    }
}

/// Progress of a single training epoch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub num_errors: usize,
    pub num_instances: usize,
    pub error_rate: f64,
}

/// Boundary classification results of the final weights on the training data.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub num_instances: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    /// Epochs actually run.
    pub epochs: usize,
    /// Epochs requested when the perceptron was created.
    pub num_epochs: usize,
}

impl Metrics {
    /// Returns `true` if training stopped before running every requested epoch.
    pub fn interrupted(&self) -> bool {
        self.epochs < self.num_epochs
    }
}

/// Online perceptron deciding, for each character, whether it starts a word.
///
/// Every active feature of a misclassified position receives the same `±1`
/// update, so a single mistake moves the score by the number of templates.
#[derive(Debug)]
pub struct Perceptron {
    pub num_epochs: usize,
    templates: Templates,
    vocabulary: Vocabulary,
    weights: Vec<i64>,
    labels: Vec<Label>,
    instances_buf: Vec<usize>, // feature ids, `templates.len()` per instance
    num_instances: usize,
    epochs_completed: usize,
}

impl Perceptron {
    /// Creates a new instance of [`Perceptron`].
    ///
    /// # Arguments
    /// * `num_epochs`: The number of passes over the training data.
    /// * `templates`: The feature templates to extract.
    pub fn new(num_epochs: usize, templates: Templates) -> Self {
        Perceptron {
            num_epochs,
            templates,
            vocabulary: Vocabulary::new(),
            weights: vec![],
            labels: vec![],
            instances_buf: vec![],
            num_instances: 0,
            epochs_completed: 0,
        }
    }

    /// Builds the vocabulary from `corpus` and caches the feature ids and label
    /// of every character. All weights start at zero.
    ///
    /// # Errors
    /// Returns an error if the corpus has no character to classify.
    pub fn initialize(&mut self, corpus: &TaggedCorpus) -> Result<()> {
        self.vocabulary = Vocabulary::build(corpus, &self.templates);
        self.labels.clear();
        self.instances_buf.clear();

        let num_templates = self.templates.len();
        self.labels.reserve(corpus.num_instances());
        self.instances_buf.reserve(corpus.num_instances() * num_templates);

        for i in corpus.positions() {
            self.labels.push(corpus.tags()[i].label());
            for key in self.templates.extract(corpus.chars(), i) {
                let id = self.vocabulary.index_of(&key).ok_or_else(|| {
                    CwsegError::invalid_argument(
                        "corpus",
                        format!("feature {} is missing from the vocabulary", key),
                    )
                })?;
                self.instances_buf.push(id);
            }
        }
        self.num_instances = self.labels.len();
        if self.num_instances == 0 || self.vocabulary.is_empty() {
            return Err(CwsegError::EmptyCorpus);
        }

        self.weights = vec![0; self.vocabulary.len()];
        self.epochs_completed = 0;

        log::info!(
            "{} instances, {} features",
            self.num_instances,
            self.vocabulary.len()
        );
        Ok(())
    }

    /// Trains the perceptron, logging the error rate of each epoch.
    ///
    /// # Arguments
    /// * `running`: Cleared to stop training. It is only checked between epochs.
    pub fn train(&mut self, running: Arc<AtomicBool>) {
        self.train_with_observer(running, |report| {
            log::info!(
                "epoch {} - error rate: {:.6} ({} / {})",
                report.epoch,
                report.error_rate,
                report.num_errors,
                report.num_instances
            );
        });
    }

    /// Trains the perceptron, calling `observer` after each completed epoch.
    ///
    /// Instances are visited in stream order; epochs always run to completion.
    /// [`Perceptron::initialize`] must be called first, otherwise nothing is trained.
    pub fn train_with_observer<F>(&mut self, running: Arc<AtomicBool>, mut observer: F)
    where
        F: FnMut(&EpochReport),
    {
        if self.num_instances == 0 {
            log::warn!("no training instances, initialize the perceptron first");
            return;
        }
        let num_templates = self.templates.len();

        for epoch in 0..self.num_epochs {
            if !running.load(Ordering::SeqCst) {
                log::warn!("training interrupted after {} epochs", epoch);
                break;
            }

            let mut num_errors = 0;
            for (&label, hs) in self
                .labels
                .iter()
                .zip(self.instances_buf.chunks_exact(num_templates))
            {
                let score: i64 = hs.iter().map(|&h| self.weights[h]).sum();
                if predict_label(score) != label {
                    num_errors += 1;
                    for &h in hs {
                        self.weights[h] += i64::from(label);
                    }
                }
            }
            self.epochs_completed = epoch + 1;

            observer(&EpochReport {
                epoch,
                num_errors,
                num_instances: self.num_instances,
                error_rate: num_errors as f64 / self.num_instances as f64,
            });
        }
    }

    /// Evaluates the current weights on the training instances.
    pub fn get_metrics(&self) -> Metrics {
        let num_templates = self.templates.len();
        let mut metrics = Metrics {
            num_instances: self.num_instances,
            epochs: self.epochs_completed,
            num_epochs: self.num_epochs,
            ..Default::default()
        };

        for (&label, hs) in self
            .labels
            .iter()
            .zip(self.instances_buf.chunks_exact(num_templates))
        {
            let score: i64 = hs.iter().map(|&h| self.weights[h]).sum();
            match (predict_label(score) > 0, label > 0) {
                (true, true) => metrics.true_positives += 1,
                (true, false) => metrics.false_positives += 1,
                (false, true) => metrics.false_negatives += 1,
                (false, false) => metrics.true_negatives += 1,
            }
        }

        let tp = metrics.true_positives as f64;
        metrics.accuracy = (metrics.true_positives + metrics.true_negatives) as f64
            / self.num_instances.max(1) as f64
            * 100.0;
        metrics.precision =
            tp / (metrics.true_positives + metrics.false_positives).max(1) as f64 * 100.0;
        metrics.recall =
            tp / (metrics.true_positives + metrics.false_negatives).max(1) as f64 * 100.0;
        metrics
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    /// Finishes training and returns the model.
    pub fn into_model(self) -> Result<Model> {
        Model::new(self.templates, self.vocabulary, self.weights)
    }
}
