use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{CwsegError, Result};

/// Padding character placed between sentences and at both ends of a stream.
pub const SEPARATOR: char = '\0';

/// Splits a segmented sentence into words.
///
/// Only the ASCII space delimits words; other whitespace such as tabs or the
/// ideographic space U+3000 stays inside the word it appears in.
pub fn split_words(line: &str) -> impl Iterator<Item = &str> {
    line.split(' ').filter(|word| !word.is_empty())
}

/// Position of a character inside its word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Begin,
    Middle,
    End,
    Single,
    Separator,
}

impl Tag {
    /// Returns `true` if a character with this tag opens a new word.
    pub fn starts_word(self) -> bool {
        matches!(self, Tag::Begin | Tag::Single)
    }

    /// Returns the perceptron label of this tag: `1` for a word start, `-1` otherwise.
    pub fn label(self) -> i8 {
        if self.starts_word() {
            1
        } else {
            -1
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            Tag::Begin => 'B',
            Tag::Middle => 'M',
            Tag::End => 'E',
            Tag::Single => 'S',
            Tag::Separator => '$',
        };
        write!(f, "{}", c)
    }
}

/// Padded character stream with one BMES tag per character.
#[derive(Clone, Debug)]
pub struct TaggedCorpus {
    chars: Vec<char>,
    tags: Vec<Tag>,
}

impl TaggedCorpus {
    /// Creates a corpus from parallel character and tag streams.
    ///
    /// # Errors
    /// Returns an error if the streams differ in length, are not padded with
    /// separators at both ends, disagree on separator positions, contain an
    /// invalid BMES run, or have no character to classify.
    pub fn new(chars: Vec<char>, tags: Vec<Tag>) -> Result<Self> {
        if chars.len() != tags.len() {
            return Err(CwsegError::invalid_argument(
                "tags",
                format!(
                    "length mismatch: {} characters but {} tags",
                    chars.len(),
                    tags.len()
                ),
            ));
        }
        if tags.iter().all(|&t| t == Tag::Separator) {
            return Err(CwsegError::EmptyCorpus);
        }
        if tags.first() != Some(&Tag::Separator) || tags.last() != Some(&Tag::Separator) {
            return Err(CwsegError::invalid_argument(
                "chars",
                "the stream must start and end with a separator",
            ));
        }

        // Tag of the previous position, used to check BMES runs.
        let mut prev = Tag::Separator;
        for (i, (&c, &t)) in chars.iter().zip(tags.iter()).enumerate() {
            if (c == SEPARATOR) != (t == Tag::Separator) {
                return Err(CwsegError::invalid_argument(
                    "tags",
                    format!("separator character and tag disagree at position {}", i),
                ));
            }
            let inside_word = matches!(prev, Tag::Begin | Tag::Middle);
            let continues = matches!(t, Tag::Middle | Tag::End);
            if inside_word != continues {
                return Err(CwsegError::invalid_argument(
                    "tags",
                    format!("invalid BMES run: {} followed by {} at position {}", prev, t, i),
                ));
            }
            prev = t;
        }

        Ok(TaggedCorpus { chars, tags })
    }

    /// Builds a corpus from sentences of space-delimited words.
    ///
    /// Words are delimited by ASCII spaces (see [`split_words`]); lines without
    /// any word are skipped. Each sentence is preceded by a separator and
    /// the whole stream is closed by one more.
    ///
    /// # Example
    /// ```
    /// use cwseg::corpus::{Tag, TaggedCorpus};
    ///
    /// let corpus = TaggedCorpus::from_lines(["我 喜欢 北京"]).unwrap();
    /// assert_eq!(corpus.tags()[1], Tag::Single);
    /// assert_eq!(corpus.tags()[2], Tag::Begin);
    /// assert_eq!(corpus.tags()[3], Tag::End);
    /// ```
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chars = vec![];
        let mut tags = vec![];

        for (lineno, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if split_words(line).next().is_none() {
                continue;
            }
            if line.contains(SEPARATOR) {
                return Err(CwsegError::invalid_format(
                    "corpus",
                    format!("line {} contains a NUL character", lineno + 1),
                ));
            }
            chars.push(SEPARATOR);
            tags.push(Tag::Separator);
            for word in split_words(line) {
                let len = word.chars().count();
                chars.extend(word.chars());
                if len == 1 {
                    tags.push(Tag::Single);
                } else {
                    tags.push(Tag::Begin);
                    tags.extend(std::iter::repeat(Tag::Middle).take(len - 2));
                    tags.push(Tag::End);
                }
            }
        }
        chars.push(SEPARATOR);
        tags.push(Tag::Separator);

        Self::new(chars, tags)
    }

    /// Reads a segmented corpus, one sentence per line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Self::from_lines(lines)
    }

    /// Reads a segmented corpus file, one sentence per line.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Length of the padded stream.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`: a corpus holds at least one separator.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Number of positions that are classified (all non-separator positions).
    pub fn num_instances(&self) -> usize {
        self.tags.iter().filter(|&&t| t != Tag::Separator).count()
    }

    /// Iterates over the indices of non-separator positions in stream order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, &t)| t != Tag::Separator)
            .map(|(i, _)| i)
    }
}
