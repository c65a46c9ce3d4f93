use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::corpus::TaggedCorpus;
use crate::errors::Result;
use crate::feature::Templates;
use crate::perceptron::{EpochReport, Metrics, Perceptron};

/// Trainer struct for managing the perceptron training process.
/// It loads a segmented corpus, trains the perceptron on it and saves the
/// trained model.
pub struct Trainer {
    learner: Perceptron,
}

impl Trainer {
    /// Creates a new instance of [`Trainer`].
    ///
    /// # Arguments
    /// * `num_epochs` - The number of passes over the corpus.
    /// * `templates` - The feature templates to train with.
    /// * `corpus_path` - The path to the segmented corpus file.
    ///
    /// # Errors
    /// Returns an error if the corpus cannot be read, is malformed or is empty.
    pub fn new(num_epochs: usize, templates: Templates, corpus_path: &Path) -> Result<Self> {
        let corpus = TaggedCorpus::from_path(corpus_path)?;
        Self::from_corpus(num_epochs, templates, &corpus)
    }

    /// Creates a new instance of [`Trainer`] from an already loaded corpus.
    pub fn from_corpus(
        num_epochs: usize,
        templates: Templates,
        corpus: &TaggedCorpus,
    ) -> Result<Self> {
        let mut learner = Perceptron::new(num_epochs, templates);
        learner.initialize(corpus)?;
        Ok(Trainer { learner })
    }

    /// Trains the perceptron and saves the model.
    ///
    /// # Arguments
    /// * `running` - Cleared to stop training at the next epoch boundary.
    /// * `model_path` - The path to save the trained model.
    ///
    /// # Returns
    /// The metrics of the trained model on the training corpus.
    pub fn train(self, running: Arc<AtomicBool>, model_path: &Path) -> Result<Metrics> {
        self.train_with_observer(running, model_path, |report| {
            log::info!("epoch {} - error rate: {:.6}", report.epoch, report.error_rate);
        })
    }

    /// Same as [`Trainer::train`], calling `observer` after every epoch.
    pub fn train_with_observer<F>(
        mut self,
        running: Arc<AtomicBool>,
        model_path: &Path,
        observer: F,
    ) -> Result<Metrics>
    where
        F: FnMut(&EpochReport),
    {
        self.learner.train_with_observer(running, observer);
        let metrics = self.learner.get_metrics();

        // Save the trained model to the specified file
        self.learner.into_model()?.save_model(model_path)?;

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::errors::CwsegError;
    use crate::model::Model;
    use crate::segmenter::Segmenter;

    fn create_corpus_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file for corpus");
        writeln!(file, "我 爱 北京").expect("Failed to write corpus");
        writeln!(file, "北京 是 首都").expect("Failed to write corpus");
        file
    }

    #[test]
    fn test_train() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let corpus_file = create_corpus_file();
        let trainer = Trainer::new(150, Templates::default(), corpus_file.path())?;

        let model_out = NamedTempFile::new()?;
        let mut epochs = 0;
        let metrics = trainer.train_with_observer(
            Arc::new(AtomicBool::new(true)),
            model_out.path(),
            |_| epochs += 1,
        )?;

        assert_eq!(epochs, 150);
        assert!(!metrics.interrupted());
        assert_eq!(metrics.num_instances, 9);
        assert_eq!(metrics.accuracy, 100.0);

        let segmenter = Segmenter::new(Model::load_model(model_out.path())?);
        assert_eq!(segmenter.segment("北京是首都"), vec!["北京", "是", "首都"]);
        Ok(())
    }

    #[test]
    fn test_train_interrupted_still_saves() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let corpus_file = create_corpus_file();
        let trainer = Trainer::new(10, Templates::default(), corpus_file.path())?;

        let model_out = NamedTempFile::new()?;
        let metrics = trainer.train(Arc::new(AtomicBool::new(false)), model_out.path())?;
        assert_eq!(metrics.epochs, 0);
        assert!(metrics.interrupted());

        let model = Model::load_model(model_out.path())?;
        assert!(model.weights().iter().all(|&w| w == 0));
        assert_eq!(model.vocabulary().len(), model.weights().len());
        Ok(())
    }

    #[test]
    fn test_new_empty_corpus() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let corpus_file = NamedTempFile::new()?;
        let result = Trainer::new(10, Templates::default(), corpus_file.path());
        assert!(matches!(result, Err(CwsegError::EmptyCorpus)));
        Ok(())
    }

    #[test]
    fn test_new_missing_corpus() {
        let result = Trainer::new(10, Templates::default(), Path::new("/nonexistent/corpus.txt"));
        assert!(matches!(result, Err(CwsegError::Io(_))));
    }
}
