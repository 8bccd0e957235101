//! Presentation lookups: classification badges and colour classes.

/// Badge styling for a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStyle {
    /// Stable key used in CSS class names and statistics.
    pub key: &'static str,
    /// Short badge label.
    pub label: String,
    /// Tailwind classes for the badge.
    pub badge_class: &'static str,
}

struct KnownCategory {
    name: &'static str,
    key: &'static str,
    label: &'static str,
    badge_class: &'static str,
}

/// The classifications the upstream analysis produces, in display order.
const KNOWN_CATEGORIES: [KnownCategory; 5] = [
    KnownCategory {
        name: "Unsloppable + Beneficiary",
        key: "UnsloppableBeneficiary",
        label: "Unsloppable + Beneficiary",
        badge_class: "bg-green-100 text-green-800",
    },
    KnownCategory {
        name: "Unsloppable + High Transition Risk",
        key: "UnsloppableHighTransitionRisk",
        label: "High Transition",
        badge_class: "bg-blue-100 text-blue-800",
    },
    KnownCategory {
        name: "Unsloppable + Macro Exposed",
        key: "UnsloppableMacroExposed",
        label: "Macro Exposed",
        badge_class: "bg-yellow-100 text-yellow-800",
    },
    KnownCategory {
        name: "Sloppable + Beneficiary",
        key: "SloppableBeneficiary",
        label: "Sloppable + Beneficiary",
        badge_class: "bg-red-100 text-red-800",
    },
    KnownCategory {
        name: "Sloppable + Clankerable",
        key: "SloppableClankerable",
        label: "Sloppable + Clankerable",
        badge_class: "bg-red-200 text-red-900",
    },
];

/// Key used for classifications outside [`KNOWN_CATEGORIES`].
pub const OTHER_CATEGORY_KEY: &str = "Other";

const OTHER_BADGE_CLASS: &str = "bg-gray-100 text-gray-800";

/// Look up the badge for a classification (case- and whitespace-insensitive).
///
/// Unknown classifications get a grey badge labelled with their own text.
pub fn category_style(category: &str) -> CategoryStyle {
    let wanted = normalize(category);
    KNOWN_CATEGORIES
        .iter()
        .find(|c| normalize(c.name) == wanted)
        .map(|c| CategoryStyle {
            key: c.key,
            label: c.label.to_string(),
            badge_class: c.badge_class,
        })
        .unwrap_or_else(|| CategoryStyle {
            key: OTHER_CATEGORY_KEY,
            label: category.trim().to_string(),
            badge_class: OTHER_BADGE_CLASS,
        })
}

/// `(key, label)` of every known classification, in display order.
pub fn known_categories() -> impl Iterator<Item = (&'static str, &'static str)> {
    KNOWN_CATEGORIES.iter().map(|c| (c.key, c.label))
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Colour class for a 0–10 vulnerability score.
pub fn score_class(score: Option<u8>) -> &'static str {
    match score {
        Some(0..=3) => "text-green-600",
        Some(4..=6) => "text-yellow-600",
        Some(_) => "text-red-600",
        None => "text-gray-600",
    }
}

/// Display form of a score: `7/10` or `N/A`.
pub fn score_display(score: Option<u8>) -> String {
    score.map_or_else(|| "N/A".to_string(), |s| format!("{s}/10"))
}

/// Colour class for a macro contagion risk description.
pub fn macro_risk_class(risk: &str) -> &'static str {
    let lower = risk.trim().to_lowercase();
    if lower.is_empty() {
        "text-gray-600"
    } else if lower.contains("low") {
        "text-green-600"
    } else if lower.contains("medium") {
        "text-yellow-600"
    } else {
        "text-red-600"
    }
}

/// The level part of `Low - diversified demand`.
pub fn macro_risk_headline(risk: &str) -> &str {
    risk.split(" - ").next().unwrap_or(risk).trim()
}
