//! TF-IDF weighting of movie feature text.
//!
//! ## Weighting
//! - tf: raw term count in the document
//! - idf: `ln((1 + n) / (1 + df)) + 1` (smoothed, never zero)
//! - each row is L2-normalized, so cosine similarity reduces to a dot product
//!
//! Vocabulary ids are assigned in lexical term order, so fitting the same
//! corpus twice yields identical vectors.

use crate::vector::SparseVector;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

/// English stop words, the same 318 terms scikit-learn ships as
/// `ENGLISH_STOP_WORDS`
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
    "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere",
    "are", "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co", "con",
    "could", "couldnt", "cry", "de", "describe", "detail", "do", "done", "down", "due", "during",
    "each", "eg", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc",
    "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
    "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty", "found",
    "four", "from", "front", "full", "further", "get", "give", "go", "had", "has", "hasnt", "have",
    "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself",
    "him", "himself", "his", "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed",
    "interest", "into", "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least",
    "less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more",
    "moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely",
    "neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming",
    "seems", "serious", "several", "she", "should", "show", "side", "since", "sincere", "six",
    "sixty", "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "system", "take", "ten", "than", "that", "the", "their", "them", "themselves",
    "then", "thence", "there", "thereafter", "thereby", "therefore", "therein", "thereupon",
    "these", "they", "thick", "thin", "third", "this", "those", "though", "three", "through",
    "throughout", "thru", "thus", "to", "together", "too", "top", "toward", "towards", "twelve",
    "twenty", "two", "un", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well",
    "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Split text into lowercase terms.
///
/// Terms are maximal runs of alphanumeric characters, at least two
/// characters long, with stop words removed.
///
/// Example: "Sci-Fi, Drama by Christopher Nolan" -> ["sci", "fi", "drama", "christopher", "nolan"]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(|token| token.to_lowercase())
        .filter(|token| !STOP_WORD_SET.contains(token.as_str()))
        .collect()
}

/// A fitted TF-IDF vector space
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights on a corpus and return the
    /// vectors of that corpus, one per document, in input order.
    pub fn fit_transform(documents: &[String]) -> (Self, Vec<SparseVector>) {
        let term_counts: Vec<HashMap<String, u32>> = documents
            .par_iter()
            .map(|doc| count_terms(doc))
            .collect();

        // Document frequency, keyed in lexical order for stable term ids
        let mut document_frequency: BTreeMap<&str, u32> = BTreeMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (term_id, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), term_id as u32);
            idf.push(((1.0 + n_documents) / (1.0 + df as f32)).ln() + 1.0);
        }

        let vectorizer = Self { vocabulary, idf };
        let vectors = term_counts
            .par_iter()
            .map(|counts| vectorizer.weigh(counts))
            .collect();
        (vectorizer, vectors)
    }

    /// Project new text into the fitted space; unknown terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        self.weigh(&count_terms(document))
    }

    /// Vocabulary size, i.e. the dimensionality of every vector
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|id| self.idf[id as usize])
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> SparseVector {
        let entries = counts.iter().filter_map(|(term, &count)| {
            let term_id = *self.vocabulary.get(term)?;
            Some((term_id, count as f32 * self.idf[term_id as usize]))
        });
        // every term id comes from the vocabulary, so it is always in range
        SparseVector::new(self.dim(), entries)
            .map(SparseVector::normalized)
            .unwrap_or_else(|_| SparseVector::zeros(self.dim()))
    }
}

fn count_terms(document: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize(document) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
