use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 10;

/// A token and how many times it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

impl From<(&str, usize)> for WordCount {
    fn from((word, count): (&str, usize)) -> Self {
        Self {
            word: word.to_string(),
            count,
        }
    }
}

/// Token counts that remember the order tokens were first seen in.
///
/// Ranking is a stable sort over that order, so equal counts come out
/// first-encountered first.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    positions: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every analyzed token of every document
    pub fn from_documents<'a, I>(tokenizer: &Tokenizer, documents: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut table = Self::new();
        for doc in documents {
            table.add_tokens(tokenizer.analyze(doc));
        }
        table
    }

    pub fn add(&mut self, token: String) {
        match self.positions.get(&token) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.positions.insert(token.clone(), self.entries.len());
                self.entries.push((token, 1));
            }
        }
        self.total += 1;
    }

    pub fn add_tokens<I: IntoIterator<Item = String>>(&mut self, tokens: I) {
        for token in tokens {
            self.add(token);
        }
    }

    pub fn get(&self, token: &str) -> usize {
        self.positions
            .get(token)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Number of retained tokens counted, duplicates included
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in first-encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// The `n` most frequent tokens, ties broken by first encounter
    pub fn top_n(&self, n: usize) -> Vec<WordCount> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(word, count)| WordCount {
                word: word.clone(),
                count: *count,
            })
            .collect()
    }
}

/// Count tokens across `documents` and return the `top_n` most frequent
pub fn word_frequency<'a, I>(tokenizer: &Tokenizer, documents: I, top_n: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    FrequencyTable::from_documents(tokenizer, documents).top_n(top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_stopwords() -> Tokenizer {
        Tokenizer::with_stopwords(Vec::<String>::new())
    }

    #[test]
    fn test_counts_and_first_encounter_ties() {
        let docs = ["ótimo produto, recomendo!", "produto ótimo"];
        let table = FrequencyTable::from_documents(&no_stopwords(), docs.iter().map(|d| Some(*d)));

        assert_eq!(table.get("produto"), 2);
        assert_eq!(table.get("ótimo"), 2);
        assert_eq!(table.get("recomendo"), 1);
        assert_eq!(
            table.top_n(2),
            vec![WordCount::from(("ótimo", 2)), WordCount::from(("produto", 2))]
        );
    }

    #[test]
    fn test_tie_order_follows_accumulation_order() {
        let docs = ["produto ótimo", "ótimo produto, recomendo!"];
        let top = word_frequency(&no_stopwords(), docs.iter().map(|d| Some(*d)), 2);
        assert_eq!(
            top,
            vec![WordCount::from(("produto", 2)), WordCount::from(("ótimo", 2))]
        );
    }

    #[test]
    fn test_total_matches_sum_of_counts() {
        let tokenizer = Tokenizer::new();
        let docs = [
            Some("Entrega rápida, produto de qualidade"),
            None,
            Some("O produto chegou com defeito e a entrega atrasou"),
            Some("!!!"),
        ];
        let table = FrequencyTable::from_documents(&tokenizer, docs);
        let retained: usize = docs.iter().map(|d| tokenizer.analyze(*d).len()).sum();

        assert_eq!(table.iter().map(|(_, c)| c).sum::<usize>(), table.total());
        assert_eq!(table.total(), retained);
    }

    #[test]
    fn test_empty_collection() {
        let table = FrequencyTable::from_documents(&Tokenizer::new(), Vec::<Option<&str>>::new());
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert!(table.top_n(10).is_empty());
    }

    #[test]
    fn test_top_n_larger_than_table() {
        let docs = [Some("entrega rápida")];
        let top = word_frequency(&no_stopwords(), docs, 20);
        assert_eq!(top.len(), 2);
        assert!(word_frequency(&no_stopwords(), docs, 0).is_empty());
    }
}
