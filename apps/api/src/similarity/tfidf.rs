//! TF-IDF vectorisation shared by the similarity matcher and the pre-fitted role vectorizer.
//!
//! Tokenisation keeps runs of two or more word characters. Weights are raw term counts
//! times IDF, optionally log-scaled, then L2-normalised.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern should compile"));

pub static ENGLISH_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
        "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
        "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
        "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Turns text into terms (word n-grams).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalyzer {
    pub lowercase: bool,
    pub remove_stop_words: bool,
    pub ngram_range: (usize, usize),
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stop_words: false,
            ngram_range: (1, 1),
        }
    }
}

impl TextAnalyzer {
    pub fn english() -> Self {
        Self {
            remove_stop_words: true,
            ..Self::default()
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.remove_stop_words || !ENGLISH_STOP_WORDS.contains(t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let min_n = min_n.max(1);
        let mut terms = Vec::new();
        for n in min_n..=max_n.max(min_n) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

/// Sparse vector keyed by feature index, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, va) = self.entries[i];
            let (b, vb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += va * vb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; defined as 0 when either vector has zero norm.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            (self.dot(other) / denom).clamp(0.0, 1.0)
        }
    }
}

/// A fitted TF-IDF vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfModel {
    pub analyzer: TextAnalyzer,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub sublinear_tf: bool,
    pub normalize: bool,
}

impl TfidfModel {
    /// Fits on a corpus with smoothed IDF: `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit(docs: &[&str], analyzer: TextAnalyzer) -> Self {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let unique: HashSet<String> = analyzer.analyze(doc).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = docs.len() as f64;
        let mut vocabulary = HashMap::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        Self {
            analyzer,
            vocabulary,
            idf,
            sublinear_tf: false,
            normalize: true,
        }
    }

    pub fn num_features(&self) -> usize {
        self.idf.len()
    }

    /// Out-of-vocabulary terms are ignored.
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyzer.analyze(doc) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .filter_map(|(index, count)| {
                let idf = *self.idf.get(index)?;
                let tf = if self.sublinear_tf { count.ln() + 1.0 } else { count };
                Some((index, tf * idf))
            })
            .collect();

        if self.normalize {
            let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, v) in &mut entries {
                    *v /= norm;
                }
            }
        }

        SparseVector { entries }
    }
}
