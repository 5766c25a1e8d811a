use crate::keywords::dedup_keywords;

/// Literal keyword containment test.
///
/// Keywords are deduplicated on construction (first occurrence wins) so that a
/// file can never be recorded twice under the same keyword. In
/// case-insensitive mode both the keywords and the scanned text are lowercased
/// before comparison; the original spelling is what gets reported.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    needles: Vec<String>,
    case_sensitive: bool,
}

impl KeywordMatcher {
    /// Creates a new KeywordMatcher for the given keywords
    pub fn new(keywords: Vec<String>, case_sensitive: bool) -> Self {
        let keywords = dedup_keywords(keywords);

        let needles = if case_sensitive {
            keywords.clone()
        } else {
            keywords.iter().map(|k| k.to_lowercase()).collect()
        };

        Self {
            keywords,
            needles,
            case_sensitive,
        }
    }

    /// The deduplicated keywords in input order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns the keywords that occur in `content`, in keyword order
    pub fn matching<'a>(&'a self, content: &str) -> Vec<&'a str> {
        if self.keywords.is_empty() {
            return Vec::new();
        }

        let folded;
        let haystack = if self.case_sensitive {
            content
        } else {
            folded = content.to_lowercase();
            folded.as_str()
        };

        self.keywords
            .iter()
            .zip(&self.needles)
            .filter(|(_, needle)| haystack.contains(needle.as_str()))
            .map(|(keyword, _)| keyword.as_str())
            .collect()
    }
}
