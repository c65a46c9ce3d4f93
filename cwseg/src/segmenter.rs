use crate::corpus::SEPARATOR;
use crate::model::Model;
use crate::perceptron::predict_label;

/// Segmenter struct for word segmentation using a trained perceptron model.
/// Each character after the first is classified independently as the start
/// of a new word or the continuation of the current one.
pub struct Segmenter {
    pub model: Model,
}

impl Segmenter {
    /// Creates a new instance of [`Segmenter`].
    ///
    /// # Arguments
    /// * `model` - A trained model.
    ///
    /// # Returns
    /// A new Segmenter instance using the given model.
    pub fn new(model: Model) -> Self {
        Segmenter { model }
    }

    /// Predicts word boundaries of a sentence.
    ///
    /// # Arguments
    /// * `sentence` - A string slice representing the sentence to be segmented.
    ///
    /// # Returns
    /// One flag per character, `true` where the character starts a word.
    /// The first character always starts a word; an empty sentence yields no flags.
    ///
    /// # Note
    /// The sentence is padded with one separator on each side, so the first and
    /// last characters see the same context they saw at sentence boundaries
    /// during training. Features never observed in training contribute nothing.
    pub fn boundaries(&self, sentence: &str) -> Vec<bool> {
        let mut chars = vec![SEPARATOR];
        chars.extend(sentence.chars());
        chars.push(SEPARATOR);

        let n = chars.len() - 2;
        if n == 0 {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(n);
        result.push(true);
        for i in 2..=n {
            let score = self.model.score(&chars, i);
            result.push(predict_label(score) > 0);
        }
        result
    }

    /// Segments a sentence into words.
    ///
    /// # Arguments
    /// * `sentence` - A string slice representing the sentence to be segmented.
    ///
    /// # Returns
    /// A vector of strings, where each string is a segmented word from the sentence.
    /// If the sentence is empty, it returns an empty vector.
    ///
    /// # Example
    /// ```
    /// use std::sync::atomic::AtomicBool;
    /// use std::sync::Arc;
    ///
    /// use cwseg::corpus::TaggedCorpus;
    /// use cwseg::feature::Templates;
    /// use cwseg::perceptron::Perceptron;
    /// use cwseg::segmenter::Segmenter;
    ///
    /// let corpus = TaggedCorpus::from_lines(["我 爱 北京", "北京 欢迎 我"]).unwrap();
    /// let mut perceptron = Perceptron::new(150, Templates::default());
    /// perceptron.initialize(&corpus).unwrap();
    /// perceptron.train(Arc::new(AtomicBool::new(true)));
    ///
    /// let segmenter = Segmenter::new(perceptron.into_model().unwrap());
    /// assert_eq!(segmenter.segment("我爱北京"), vec!["我", "爱", "北京"]);
    /// ```
    pub fn segment(&self, sentence: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut word = String::new();
        for (c, starts_word) in sentence.chars().zip(self.boundaries(sentence)) {
            if starts_word && !word.is_empty() {
                result.push(std::mem::take(&mut word));
            }
            word.push(c);
        }
        if !word.is_empty() {
            result.push(word);
        }
        result
    }

    /// Segments a sentence and joins the words with `delimiter`.
    ///
    /// The delimiter is inserted in front of every character predicted to
    /// start a word, except the first one.
    pub fn segment_with_delimiter(&self, sentence: &str, delimiter: &str) -> String {
        let mut result = String::with_capacity(sentence.len());
        for (c, starts_word) in sentence.chars().zip(self.boundaries(sentence)) {
            if starts_word && !result.is_empty() {
                result.push_str(delimiter);
            }
            result.push(c);
        }
        result
    }
}
