use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    French,
    German,
    Italian,
    Spanish,
    Polish,
    Chinese,
    Russian,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Self::English,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Spanish,
        Self::Polish,
        Self::Chinese,
        Self::Russian,
        Self::Japanese,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::English => "english",
            Self::French => "french",
            Self::German => "german",
            Self::Italian => "italian",
            Self::Spanish => "spanish",
            Self::Polish => "polish",
            Self::Chinese => "chinese",
            Self::Russian => "russian",
            Self::Japanese => "japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown language {s:?}"))
    }
}

/// A localized string: one text per language the record carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedString {
    values: BTreeMap<Language, String>,
}

impl TranslatedString {
    /// Language a plain, non-localized string is stored under.
    pub const DEFAULT_LANGUAGE: Language = Language::English;

    pub fn new(language: Language, text: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(language, text.into());
        Self { values }
    }

    pub fn lookup(&self, language: Language) -> Option<&str> {
        self.values.get(&language).map(String::as_str)
    }

    pub fn set(&mut self, language: Language, text: impl Into<String>) {
        self.values.insert(language, text.into());
    }

    /// A string with no localization: the text under the default language only.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_LANGUAGE, text)
    }
}
