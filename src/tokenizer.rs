use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this (in characters) carry no signal in review text.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

lazy_static::lazy_static! {
    static ref PORTUGUESE_STOPWORDS: HashSet<&'static str> = {
        [
            "a", "o", "e", "é", "de", "do", "da", "em", "um", "para", "com", "não", "uma",
            "os", "as", "que", "se", "na", "por", "mais", "como", "mas", "foi", "ele",
            "das", "dos", "no", "tem", "à", "ao", "seu", "sua", "ou", "ser", "quando",
            "muito", "há", "nos", "já", "está", "eu", "também", "só", "pelo", "pela",
            "até", "isso", "ela", "entre", "era", "depois", "sem", "mesmo", "aos", "ter",
            "seus", "suas", "minha", "têm", "naquele", "essas", "esses", "pelos", "elas",
            "estava", "seja", "qual", "será", "nós", "tenho", "lhe", "deles", "pelas",
            "este", "fosse", "dele", "tu", "te", "você", "vocês", "lhes", "meu", "meus",
            "minhas", "teu", "tua", "teus", "tuas", "nosso", "nossa", "nossos", "nossas",
            "dela", "delas", "esta", "estes", "estas", "aquele", "aquela", "aqueles",
            "aquelas", "isto", "aquilo", "estou", "estamos", "estão", "estive", "esteve",
            "estivemos", "estiveram", "estávamos", "estavam", "estivera", "estivéramos",
            "esteja", "estejamos", "estejam", "estivesse", "estivéssemos", "estivessem",
            "estiver", "estivermos", "estiverem", "hei", "havemos", "hão", "houve",
            "houvemos", "houveram", "houvera", "houvéramos", "haja", "hajamos", "hajam",
            "houvesse", "houvéssemos", "houvessem", "houver", "houvermos", "houverem",
            "houverei", "houverá", "houveremos", "houverão", "houveria", "houveríamos",
            "houveriam", "sou", "somos", "são", "éramos", "eram", "fui", "fomos", "foram",
            "fora", "fôramos", "sejamos", "sejam", "fôssemos", "fossem", "for", "formos",
            "forem", "serei", "seremos", "serão", "seria", "seríamos", "seriam", "temos",
            "tinha", "tínhamos", "tinham", "tive", "teve", "tivemos", "tiveram", "tivera",
            "tivéramos", "tenha", "tenhamos", "tenham", "tivesse", "tivéssemos",
            "tivessem", "tiver", "tivermos", "tiverem", "terei", "terá", "teremos",
            "terão", "teria", "teríamos", "teriam", "numa", "eles", "essa", "após", "sob",
            "sobre", "contra", "desde", "durante", "perante", "segundo", "conforme",
            "mediante", "onde",
        ]
        .iter()
        .copied()
        .collect()
    };
}

/// Normalize free text for counting: NFC, lowercase, letters and whitespace
/// only, whitespace collapsed to single spaces.
///
/// Composition runs again after filtering, since dropping a character can
/// leave a base letter next to a combining mark it composes with.
///
/// `None` and the empty string both normalize to `""`.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let cleaned: String = text
        .nfc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .nfc()
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words, as shown in comment statistics.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Text analysis pipeline: normalize, split, drop stopwords and short tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    min_len: usize,
}

impl Tokenizer {
    /// Tokenizer with the built-in Portuguese stopword set.
    pub fn new() -> Self {
        Self::with_stopwords(PORTUGUESE_STOPWORDS.iter().copied())
    }

    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            min_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Split normalized text into tokens
    fn tokenize(&self, normalized: &str) -> Vec<String> {
        normalized.split_whitespace().map(str::to_string).collect()
    }

    /// Remove stopwords and tokens below the minimum length, keeping order
    pub fn stopword_filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| t.chars().count() >= self.min_len && !self.is_stopword(t))
            .collect()
    }

    /// Full analysis pipeline
    pub fn analyze(&self, text: Option<&str>) -> Vec<String> {
        let normalized = normalize(text);
        let tokens = self.tokenize(&normalized);
        self.stopword_filter(tokens)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Some("  Ótimo   PRODUTO, recomendo!! 10/10 ")),
            "ótimo produto recomendo"
        );
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for text in [
            "Chegou antes do prazo!!! Nota 10.",
            "produto   veio\tquebrado\n\n:(",
            "não recebi o pedido #1234",
            "α!\u{345}",
            "\u{9c7}-\u{9be}",
            "",
        ] {
            let once = normalize(Some(text));
            assert_eq!(normalize(Some(&once)), once);
        }
    }

    #[test]
    fn test_normalize_composes_across_removed_chars() {
        assert_eq!(normalize(Some("α!\u{345}")), "\u{1fb3}");
        assert_eq!(normalize(Some("\u{9c7}-\u{9be}")), "\u{9cb}");
    }

    #[test]
    fn test_normalize_punctuation_and_digits_only() {
        assert_eq!(normalize(Some("!!! 123 ... ?? 4,5")), "");
    }

    #[test]
    fn test_normalize_composes_accents() {
        // "o" followed by a combining acute accent
        assert_eq!(normalize(Some("o\u{301}timo")), "ótimo");
    }

    #[test]
    fn test_analyze_without_stopwords() {
        let tokenizer = Tokenizer::with_stopwords(Vec::<String>::new());
        assert_eq!(
            tokenizer.analyze(Some("ótimo produto, recomendo!")),
            vec!["ótimo", "produto", "recomendo"]
        );
    }

    #[test]
    fn test_analyze_portuguese() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.analyze(Some("Não recebi o produto e estou muito insatisfeito"));
        assert_eq!(tokens, vec!["recebi", "produto", "insatisfeito"]);
    }

    #[test]
    fn test_min_len_counts_characters() {
        let tokenizer = Tokenizer::with_stopwords(Vec::<String>::new());
        // "só" is two characters but three bytes
        assert_eq!(tokenizer.analyze(Some("só até boa")), vec!["até", "boa"]);

        let loose = tokenizer.with_min_len(1);
        assert_eq!(loose.analyze(Some("só até boa")), vec!["só", "até", "boa"]);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  chegou   rápido e bem embalado "), 5);
        assert_eq!(word_count(""), 0);
    }
}
