//! Word-boundary phrase matching over free text.

/// Lowercase, punctuation folded to single spaces, padded so every word is
/// surrounded by a space.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct Haystack {
    padded: String,
}

impl Haystack {
    pub fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", normalize(text)),
        }
    }

    fn needle(phrase: &str) -> String {
        format!(" {} ", normalize(phrase))
    }

    pub fn position(&self, phrase: &str) -> Option<usize> {
        self.padded.find(&Self::needle(phrase))
    }

    pub fn contains_any<T>(&self, table: &[(&str, T)]) -> bool {
        table.iter().any(|(phrase, _)| self.position(phrase).is_some())
    }

    /// Earliest occurrence wins; at the same offset the longer phrase wins.
    pub fn first_match<T: Copy>(&self, table: &[(&str, T)]) -> Option<T> {
        table
            .iter()
            .filter_map(|(phrase, value)| {
                self.position(phrase)
                    .map(|pos| (pos, Self::needle(phrase).len(), *value))
            })
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, _, value)| value)
    }

    /// Every distinct value mentioned, in order of appearance. A phrase
    /// nested inside a longer match ("crossbow" in "heavy crossbow") is
    /// not counted again.
    pub fn all_matches<T: Copy + PartialEq>(&self, table: &[(&str, T)]) -> Vec<T> {
        let mut hits: Vec<(usize, usize, T)> = Vec::new();
        for (phrase, value) in table {
            let needle = Self::needle(phrase);
            for (pos, _) in self.padded.match_indices(&needle) {
                hits.push((pos, needle.len(), *value));
            }
        }
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut found = Vec::new();
        let mut covered_until = 0;
        for (pos, len, value) in hits {
            if pos < covered_until {
                continue;
            }
            // The trailing space may open the next word
            covered_until = pos + len - 1;
            if !found.contains(&value) {
                found.push(value);
            }
        }
        found
    }
}
