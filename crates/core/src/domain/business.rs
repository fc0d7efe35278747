use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Restaurant,
    Retail,
    Fitness,
    Beauty,
    Professional,
    Healthcare,
    Education,
}

// Matched against whole words (plural `s` allowed) after an exact match fails; first hit wins.
const SYNONYMS: &[(&str, BusinessType)] = &[
    ("food", BusinessType::Restaurant),
    ("dining", BusinessType::Restaurant),
    ("cafe", BusinessType::Restaurant),
    ("coffee", BusinessType::Restaurant),
    ("shop", BusinessType::Retail),
    ("store", BusinessType::Retail),
    ("boutique", BusinessType::Retail),
    ("gym", BusinessType::Fitness),
    ("health", BusinessType::Fitness),
    ("wellness", BusinessType::Fitness),
    ("salon", BusinessType::Beauty),
    ("spa", BusinessType::Beauty),
    ("barber", BusinessType::Beauty),
    ("office", BusinessType::Professional),
    ("service", BusinessType::Professional),
    ("clinic", BusinessType::Healthcare),
    ("medical", BusinessType::Healthcare),
    ("school", BusinessType::Education),
    ("training", BusinessType::Education),
];

impl BusinessType {
    pub const ALL: [BusinessType; 7] = [
        BusinessType::Restaurant,
        BusinessType::Retail,
        BusinessType::Fitness,
        BusinessType::Beauty,
        BusinessType::Professional,
        BusinessType::Healthcare,
        BusinessType::Education,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BusinessType::Restaurant => "restaurant",
            BusinessType::Retail => "retail",
            BusinessType::Fitness => "fitness",
            BusinessType::Beauty => "beauty",
            BusinessType::Professional => "professional",
            BusinessType::Healthcare => "healthcare",
            BusinessType::Education => "education",
        }
    }

    /// Free-text query sent to the places search for this category.
    pub fn search_query(self) -> &'static str {
        match self {
            BusinessType::Restaurant => "restaurant,cafe,food,dining,pizza,burger,coffee",
            BusinessType::Retail => "store,shop,boutique,market,clothing,electronics,retail",
            BusinessType::Fitness => "gym,fitness,yoga,studio,wellness,health",
            BusinessType::Beauty => "salon,spa,barber,nail,beauty,massage",
            BusinessType::Professional => "office,law,accounting,consulting,insurance",
            BusinessType::Healthcare => "clinic,doctor,dental,medical,pharmacy",
            BusinessType::Education => "school,college,training,education,tutoring",
        }
    }

    /// Maps user input onto the supported set. Returns `None` for anything unsupported.
    pub fn standardize(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if let Some(exact) = Self::ALL.iter().find(|t| t.as_str() == lower) {
            return Some(*exact);
        }

        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        SYNONYMS
            .iter()
            .find(|(keyword, _)| {
                words
                    .iter()
                    .any(|w| *w == *keyword || w.strip_suffix('s') == Some(*keyword))
            })
            .map(|(_, t)| *t)
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
