use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

/// A BIP-39 mnemonic recovery phrase.
///
/// Words are stored single-space separated. Whitespace in the input is
/// normalized, nothing else is; checking the words against the wordlist and
/// checksum is left to the provider that turns the phrase into a key.
///
/// The phrase is wiped on drop and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SeedPhrase(String);

impl SeedPhrase {
    pub fn new(phrase: &str) -> Self {
        Self(phrase.split_whitespace().join(" "))
    }

    pub fn from_words(words: &[String]) -> Self {
        Self(words.iter().map(|w| w.trim()).join(" "))
    }

    pub fn phrase(&self) -> &str {
        &self.0
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SeedPhrase({} words)", self.word_count())
    }
}
