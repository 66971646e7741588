use rustc_hash::FxHashMap;

use crate::token::TokenKind;

/// Case-folded longest-match keyword recognizer.
///
/// The trie maps keyword text to a token kind. It is the gate that separates
/// identifiers from keywords: after the lexer reads a maximal
/// letter/digit/underscore run, it asks the trie whether the run spells a
/// keyword. Lookup is O(length of the word). Dialects add or remove keywords
/// by rebuilding the trie, which amortizes build cost over the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct KeywordTrie {
    nodes: Vec<TrieNode>,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: FxHashMap<char, usize>,
    value: Option<TokenKind>,
}

impl KeywordTrie {
    /// Create an empty trie containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Build a trie from (keyword, kind) pairs. Keywords are case-folded.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, TokenKind)>) -> Self {
        let mut trie = Self::new();
        for (word, kind) in pairs {
            trie.insert(word, kind);
        }
        trie
    }

    /// Insert a keyword. Case-folded; re-inserting replaces the kind.
    pub fn insert(&mut self, word: &str, kind: TokenKind) {
        let mut node = 0usize;
        for c in word.chars().flat_map(char::to_lowercase) {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[node].value = Some(kind);
    }

    /// Remove a keyword. Nodes are left in place; only the value is cleared.
    pub fn remove(&mut self, word: &str) {
        let mut node = 0usize;
        for c in word.chars().flat_map(char::to_lowercase) {
            match self.nodes[node].children.get(&c) {
                Some(&next) => node = next,
                None => return,
            }
        }
        self.nodes[node].value = None;
    }

    /// Exact case-insensitive lookup of a whole word.
    pub fn get(&self, word: &str) -> Option<TokenKind> {
        let mut node = 0usize;
        for c in word.chars().flat_map(char::to_lowercase) {
            node = *self.nodes[node].children.get(&c)?;
        }
        self.nodes[node].value
    }

    /// Longest prefix of `text` that spells a keyword.
    ///
    /// Returns the byte length of the match (in the original text) and the
    /// matched kind. The walk stops as soon as the trie has no continuation.
    pub fn longest_match(&self, text: &str) -> Option<(usize, TokenKind)> {
        let mut node = 0usize;
        let mut best: Option<(usize, TokenKind)> = None;
        let mut consumed = 0usize;
        for c in text.chars() {
            let mut advanced = false;
            for folded in c.to_lowercase() {
                match self.nodes[node].children.get(&folded) {
                    Some(&next) => {
                        node = next;
                        advanced = true;
                    }
                    None => return best,
                }
            }
            if !advanced {
                return best;
            }
            consumed += c.len_utf8();
            if let Some(kind) = self.nodes[node].value {
                best = Some((consumed, kind));
            }
        }
        best
    }
}

impl Default for KeywordTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KeywordTrie {
        KeywordTrie::from_pairs([
            ("select", TokenKind::Select),
            ("set", TokenKind::Set),
            ("semi", TokenKind::Semi),
        ])
    }

    #[test]
    fn exact_lookup_is_case_insensitive() {
        let trie = sample();
        assert_eq!(trie.get("select"), Some(TokenKind::Select));
        assert_eq!(trie.get("SELECT"), Some(TokenKind::Select));
        assert_eq!(trie.get("SeLeCt"), Some(TokenKind::Select));
        assert_eq!(trie.get("selec"), None);
        assert_eq!(trie.get("selects"), None);
    }

    #[test]
    fn longest_match_prefers_longer_keyword() {
        let trie = sample();
        // "se" is a prefix of three keywords but not itself a keyword.
        assert_eq!(trie.longest_match("se"), None);
        assert_eq!(trie.longest_match("set x"), Some((3, TokenKind::Set)));
        assert_eq!(trie.longest_match("select"), Some((6, TokenKind::Select)));
    }

    #[test]
    fn insert_and_remove() {
        let mut trie = sample();
        trie.insert("qualify", TokenKind::Qualify);
        assert_eq!(trie.get("QUALIFY"), Some(TokenKind::Qualify));
        trie.remove("set");
        assert_eq!(trie.get("set"), None);
        // Removing a word never disturbs its siblings.
        assert_eq!(trie.get("semi"), Some(TokenKind::Semi));
    }

    #[test]
    fn default_table_round_trips() {
        let trie = KeywordTrie::from_pairs(crate::token::default_keywords());
        assert_eq!(trie.get("from"), Some(TokenKind::From));
        assert_eq!(trie.get("VARCHAR"), Some(TokenKind::VarcharType));
        assert_eq!(trie.get("count"), Some(TokenKind::Count));
        assert_eq!(trie.get("not_a_keyword"), None);
    }
}
