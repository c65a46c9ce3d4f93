use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::corpus::split_words;
use crate::errors::Result;
use crate::segmenter::Segmenter;

/// Scores of a segmenter against a gold segmented corpus.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub num_sentences: usize,
    pub num_gold_words: usize,
    pub num_predicted_words: usize,
    pub num_correct_words: usize,
    pub num_boundaries: usize,
    pub num_correct_boundaries: usize,
}

impl Evaluation {
    /// Fraction of predicted words that are in the gold segmentation.
    pub fn precision(&self) -> f64 {
        self.num_correct_words as f64 / self.num_predicted_words.max(1) as f64
    }

    /// Fraction of gold words that were predicted.
    pub fn recall(&self) -> f64 {
        self.num_correct_words as f64 / self.num_gold_words.max(1) as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Fraction of boundary decisions that match the gold segmentation.
    ///
    /// The first character of a sentence is not a decision and is not counted.
    pub fn boundary_accuracy(&self) -> f64 {
        self.num_correct_boundaries as f64 / self.num_boundaries.max(1) as f64
    }
}

/// Evaluator comparing segmenter output with gold segmented sentences.
pub struct Evaluator<'a> {
    segmenter: &'a Segmenter,
}

impl<'a> Evaluator<'a> {
    pub fn new(segmenter: &'a Segmenter) -> Self {
        Evaluator { segmenter }
    }

    /// Removes the word-delimiting spaces of each gold sentence, segments the result and
    /// compares word spans. Lines without any word are skipped.
    pub fn evaluate<I, S>(&self, gold_lines: I) -> Evaluation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut evaluation = Evaluation::default();

        for line in gold_lines {
            let gold_words: Vec<&str> = split_words(line.as_ref()).collect();
            if gold_words.is_empty() {
                continue;
            }
            let sentence = gold_words.concat();

            let mut gold = vec![];
            for word in &gold_words {
                gold.push(true);
                gold.extend(std::iter::repeat(false).take(word.chars().count() - 1));
            }
            let predicted = self.segmenter.boundaries(&sentence);

            let gold_spans = spans(&gold);
            let predicted_spans = spans(&predicted);

            evaluation.num_sentences += 1;
            evaluation.num_gold_words += gold_spans.len();
            evaluation.num_predicted_words += predicted_spans.len();
            evaluation.num_correct_words += gold_spans.intersection(&predicted_spans).count();
            evaluation.num_boundaries += gold.len() - 1;
            evaluation.num_correct_boundaries += gold
                .iter()
                .zip(predicted.iter())
                .skip(1)
                .filter(|(g, p)| g == p)
                .count();
        }

        evaluation
    }

    /// Evaluates against a gold corpus file, one segmented sentence per line.
    pub fn evaluate_path(&self, gold_path: &Path) -> Result<Evaluation> {
        let reader = BufReader::new(File::open(gold_path)?);
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(self.evaluate(lines))
    }
}

/// Converts word-start flags into `(start, end)` character spans.
fn spans(boundaries: &[bool]) -> HashSet<(usize, usize)> {
    let mut result = HashSet::new();
    let mut start = 0;
    for (i, &b) in boundaries.iter().enumerate().skip(1) {
        if b {
            result.insert((start, i));
            start = i;
        }
    }
    if !boundaries.is_empty() {
        result.insert((start, boundaries.len()));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::feature::{FeatureKey, Templates};
    use crate::model::Model;
    use crate::vocabulary::Vocabulary;

    // splits in front of every 'A'
    fn segmenter() -> Segmenter {
        let keys = vec![FeatureKey {
            template: 0,
            chars: "A".to_string(),
        }];
        let model = Model::new(
            Templates::new(vec![vec![0]]).unwrap(),
            Vocabulary::from_keys(keys).unwrap(),
            vec![1],
        )
        .unwrap();
        Segmenter::new(model)
    }

    #[test]
    fn test_spans() {
        let expected: HashSet<(usize, usize)> = [(0, 2), (2, 3)].into_iter().collect();
        assert_eq!(spans(&[true, false, true]), expected);
        assert!(spans(&[]).is_empty());
    }

    #[test]
    fn test_evaluate_perfect() {
        let segmenter = segmenter();
        let evaluation = Evaluator::new(&segmenter).evaluate(["AB AB", "", "A"]);

        assert_eq!(evaluation.num_sentences, 2);
        assert_eq!(evaluation.num_gold_words, 3);
        assert_eq!(evaluation.num_correct_words, 3);
        assert_eq!(evaluation.f1(), 1.0);
        assert_eq!(evaluation.num_boundaries, 3);
        assert_eq!(evaluation.boundary_accuracy(), 1.0);
    }

    #[test]
    fn test_evaluate_partial() {
        let segmenter = segmenter();
        // predicted: "ABB" | "A"
        let evaluation = Evaluator::new(&segmenter).evaluate(["AB B A"]);

        assert_eq!(evaluation.num_gold_words, 3);
        assert_eq!(evaluation.num_predicted_words, 2);
        assert_eq!(evaluation.num_correct_words, 1);
        assert_eq!(evaluation.precision(), 0.5);
        assert!((evaluation.recall() - 1.0 / 3.0).abs() < 1e-9);
        assert!((evaluation.f1() - 0.4).abs() < 1e-9);
        // the second 'B' is the only missed split
        assert_eq!(evaluation.num_boundaries, 3);
        assert_eq!(evaluation.num_correct_boundaries, 2);
    }

    #[test]
    fn test_evaluate_ideographic_space_inside_word() {
        let segmenter = segmenter();
        // one gold word "B\u{3000}B" followed by "A"
        let evaluation = Evaluator::new(&segmenter).evaluate(["B\u{3000}B A"]);

        assert_eq!(evaluation.num_gold_words, 2);
        assert_eq!(evaluation.num_correct_words, 2);
        assert_eq!(evaluation.num_boundaries, 3);
        assert_eq!(evaluation.boundary_accuracy(), 1.0);
    }

    #[test]
    fn test_evaluate_path() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut gold_file = NamedTempFile::new()?;
        writeln!(gold_file, "AB A")?;
        gold_file.as_file().sync_all()?;

        let segmenter = segmenter();
        let evaluation = Evaluator::new(&segmenter).evaluate_path(gold_file.path())?;
        assert_eq!(evaluation.num_sentences, 1);
        assert_eq!(evaluation.f1(), 1.0);
        Ok(())
    }

    #[test]
    fn test_evaluate_empty() {
        let segmenter = segmenter();
        let evaluation = Evaluator::new(&segmenter).evaluate(Vec::<String>::new());
        assert_eq!(evaluation, Evaluation::default());
        assert_eq!(evaluation.f1(), 0.0);
    }
}
