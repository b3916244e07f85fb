use std::collections::HashSet;
use std::io::{self, BufRead};

/// Decides whether a word formed on a board is allowed
pub trait WordChecker: Send + Sync {
    fn check(&self, word: &str) -> bool;
}

/// Dictionary held in memory, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .filter_map(|w| normalize(w.as_ref()))
            .collect();
        Self { words }
    }

    /// Reads one word per line. Blank lines and entries with anything but
    /// ASCII letters (abbreviations, possessives) are skipped.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut words = HashSet::new();
        for line in reader.lines() {
            if let Some(word) = normalize(&line?) {
                words.insert(word);
            }
        }
        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordChecker for WordList {
    fn check(&self, word: &str) -> bool {
        self.words.contains(&word.to_ascii_uppercase())
    }
}

fn normalize(word: &str) -> Option<String> {
    let word = word.trim();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(word.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ignores_case() {
        let words = WordList::new(["ate", "Tea"]);
        assert!(words.check("ATE"));
        assert!(words.check("tea"));
        assert!(!words.check("ETA"));
    }

    #[test]
    fn test_from_reader_skips_junk() {
        let text = "apple\n\n  banana  \nit's\nU.S.A\ncherry\n";
        let words = WordList::from_reader(text.as_bytes()).unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.check("BANANA"));
        assert!(!words.check("ITS"));
    }
}
