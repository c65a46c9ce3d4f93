use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::corpus::TaggedCorpus;
use crate::errors::Result;
use crate::feature::Templates;

/// Extractor struct for dumping the training instances of a corpus.
/// It reads sentences from a segmented corpus file and writes, for every
/// character, its label followed by its feature keys.
pub struct Extractor {
    templates: Templates,
}

impl Default for Extractor {
    /// Creates a new instance of [`Extractor`] with the default templates.
    fn default() -> Self {
        Self::new(Templates::default())
    }
}

impl Extractor {
    /// Creates a new instance of [`Extractor`].
    ///
    /// # Arguments
    /// * `templates` - The feature templates to extract.
    pub fn new(templates: Templates) -> Self {
        Extractor { templates }
    }

    /// Writes the instances of `corpus` to `writer`, one line per character.
    ///
    /// Each line holds the label (`1` for a word start, `-1` otherwise) and the
    /// feature keys in template order, separated by tabs.
    ///
    /// # Returns
    /// The number of lines written.
    pub fn write_instances<W: Write>(
        &self,
        corpus: &TaggedCorpus,
        mut writer: W,
    ) -> io::Result<usize> {
        let mut count = 0;
        for i in corpus.positions() {
            write!(writer, "{}", corpus.tags()[i].label())?;
            for key in self.templates.extract(corpus.chars(), i) {
                write!(writer, "\t{}", key)?;
            }
            writeln!(writer)?;
            count += 1;
        }
        Ok(count)
    }

    /// Extracts features from a corpus file and writes them to a specified output file.
    ///
    /// # Arguments
    /// * `corpus_path` - The path to the input corpus file containing segmented sentences.
    /// * `features_path` - The path to the output file where extracted features will be written.
    ///
    /// # Returns
    /// The number of instances written.
    pub fn extract(&self, corpus_path: &Path, features_path: &Path) -> Result<usize> {
        let corpus = TaggedCorpus::from_path(corpus_path)?;

        let mut features = BufWriter::new(File::create(features_path)?);
        let count = self.write_instances(&corpus, &mut features)?;
        features.flush()?;

        log::info!("{} instances written to {}", count, features_path.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_write_instances() -> Result<()> {
        let corpus = TaggedCorpus::from_lines(["AB"])?;
        let extractor = Extractor::new(Templates::new(vec![vec![0], vec![-1, 0]])?);

        let mut out = Vec::new();
        let count = extractor.write_instances(&corpus, &mut out)?;

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8_lossy(&out), "1\t0:A\t1:$A\n-1\t0:B\t1:AB\n");
        Ok(())
    }

    #[test]
    fn test_extract() -> std::result::Result<(), Box<dyn std::error::Error>> {
        // Create a temporary file to simulate the corpus input
        let mut corpus_file = NamedTempFile::new()?;
        writeln!(corpus_file, "这 是 测试 。")?;
        writeln!(corpus_file, "另 一个 句子")?;
        corpus_file.as_file().sync_all()?;

        // Create a temporary file for the features output
        let features_file = NamedTempFile::new()?;

        let extractor = Extractor::default();
        let count = extractor.extract(corpus_file.path(), features_file.path())?;

        let output = fs::read_to_string(features_file.path())?;
        assert_eq!(count, 10);
        assert_eq!(output.lines().count(), 10);

        // label and seven features on every line
        for line in output.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 8);
            assert!(fields[0] == "1" || fields[0] == "-1");
        }
        Ok(())
    }
}
