//! Category labels and the predefined category axis.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label used for transactions whose category or sub-category is absent.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Category label conventionally used for salary/income rows.
pub const DEFAULT_INCOME_LABEL: &str = "Revenus du travail";

/// A free-form classification label.
///
/// `Unknown` stands for a missing or blank label and renders as `"Unknown"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Known(String),
    #[default]
    Unknown,
}

/// How raw labels are cleaned up before they become a `Category`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPolicy {
    /// Strip leading/trailing whitespace, so `"Loisirs "` and `"Loisirs"` agree.
    #[default]
    Trim,
    /// Keep the raw string as is.
    Verbatim,
}

impl LabelPolicy {
    pub fn apply(self, raw: &str) -> &str {
        match self {
            LabelPolicy::Trim => raw.trim(),
            LabelPolicy::Verbatim => raw,
        }
    }
}

impl Category {
    /// Build a category from a raw cell value.
    pub fn from_raw(raw: Option<&str>, policy: LabelPolicy) -> Self {
        match raw {
            Some(raw) => Category::known(policy.apply(raw)),
            None => Category::Unknown,
        }
    }

    /// A known label; blank input and the `"Unknown"` label itself map to `Unknown`.
    pub fn known(label: impl Into<String>) -> Self {
        let label = label.into();
        if label.trim().is_empty() || label == UNKNOWN_LABEL {
            Category::Unknown
        } else {
            Category::Known(label)
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Known(label) => label,
            Category::Unknown => UNKNOWN_LABEL,
        }
    }

    /// Exact, case-sensitive label comparison.
    pub fn is(&self, label: &str) -> bool {
        self.label() == label
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Category::Unknown, Category::known))
    }
}

/// The fixed, ordered list of labels used as the category-total axis.
///
/// The axis is independent of the labels that actually occur in the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAxis(Vec<String>);

impl CategoryAxis {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategoryAxis {
    /// The expense categories of the bank export this tool was first written for.
    fn default() -> Self {
        Self::new([
            "Virement émis",
            "Loisirs",
            "Vie quotidienne",
            "Voyages et Transports",
            "Courses",
            "Loyer",
            "Transport",
            "Divertissement",
            "Santé",
            "Abonnement",
            "Abonnements et téléphonie",
            "Services financiers / professionnels",
            "Emprunts (hors immobilier)",
        ])
    }
}
