//! Query classification: domain qualification, routing flags and intent.
//!
//! Classification never fails. Every question yields a [`Classification`],
//! at worst with an [`Intent::Auto`] carrying no slots.

use paddock_facts::{extract_year, Intent, Slots, Team};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Lowercase substrings that mark a question as already about Formula 1.
const DOMAIN_HINTS: [&str; 9] = [
    "f1",
    "formula 1",
    "formula one",
    "grand prix",
    "fia",
    "constructor",
    "driver",
    "pit",
    "pole",
];

pub const DOMAIN_QUALIFIER: &str = "In Formula 1 context: ";

static YEAR_WINNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(who\s+won|winner)\s+in\s+(\d{4})\s*\??$")
        .expect("year winner regex is valid")
});

static STRUCTURED_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(wins?|points?|podiums?|poles?|qualifying|grid|fastest|laps?|",
        r"pit\s*stops?|constructor[s']?|driver standings?|positions?|",
        r"by race|per round|season|since \d{4}|in \d{4}|championship)\b",
    ))
    .expect("structured vocabulary regex is valid")
});

static LIVE_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(live|today|latest|news|update|upgrades?|package|penalt(?:y|ies)|",
        r"investigation|hearing|appeal|fia|stewards|press|statement|rumou?rs?)\b",
    ))
    .expect("live vocabulary regex is valid")
});

static WINS_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bwins\b").expect("wins regex is valid"));

/// Capitalized words that never start or end a driver name.
const NAME_STOPWORDS: &[&str] = &[
    "who", "what", "when", "where", "which", "why", "how", "did", "does", "do", "is", "was",
    "were", "are", "has", "have", "had", "can", "tell", "show", "list", "give", "in", "the", "for",
    "of", "and", "a", "an", "since", "formula", "grand", "prix", "f1", "fia", "championship",
    "drivers", "constructors", "driver", "constructor", "team", "season", "race", "points",
    "wins", "many", "much",
];

/// A question after domain qualification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuery {
    pub text: String,
    /// Try the structured backend first regardless of vocabulary.
    pub prefer_structured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub query: NormalizedQuery,
    pub intent: Intent,
    /// The raw question already named the domain.
    pub in_domain: bool,
    pub wants_structured: bool,
    pub wants_live: bool,
}

/// Classify a raw question.
pub fn classify(raw: &str) -> Classification {
    let in_domain = looks_in_domain(raw);
    let query = normalize(raw);
    let slots = extract_slots(raw);
    let intent = resolve_intent(&query.text.to_lowercase(), slots);

    let classification = Classification {
        wants_structured: wants_structured(&query.text),
        wants_live: wants_live(&query.text),
        in_domain,
        intent,
        query,
    };

    tracing::debug!(
        intent = classification.intent.name(),
        prefer_structured = classification.query.prefer_structured,
        wants_structured = classification.wants_structured,
        wants_live = classification.wants_live,
        in_domain = classification.in_domain,
        "Classified question"
    );

    classification
}

/// Rewrite the year-winner shortcut, qualify off-domain questions.
pub fn normalize(raw: &str) -> NormalizedQuery {
    if let Some(caps) = YEAR_WINNER.captures(raw) {
        return NormalizedQuery {
            text: format!(
                "In Formula 1, who won the Drivers' Championship in {}?",
                &caps[2]
            ),
            prefer_structured: true,
        };
    }

    let text = if looks_in_domain(raw) {
        raw.to_string()
    } else {
        format!("{}{}", DOMAIN_QUALIFIER, raw)
    };

    NormalizedQuery {
        prefer_structured: wants_structured(&text),
        text,
    }
}

pub fn looks_in_domain(text: &str) -> bool {
    let lower = text.to_lowercase();
    DOMAIN_HINTS.iter().any(|hint| lower.contains(hint))
}

pub fn wants_structured(text: &str) -> bool {
    STRUCTURED_VOCAB.is_match(text)
}

pub fn wants_live(text: &str) -> bool {
    LIVE_VOCAB.is_match(text)
}

/// Year, team and driver slots from the raw question.
pub fn extract_slots(raw: &str) -> Slots {
    Slots {
        team: Team::find_in(raw),
        driver: extract_driver(raw),
        year: extract_year(raw),
    }
}

/// First adjacent "Capitalized Capitalized" pair that is not a question
/// word or team name, scanning left to right.
pub fn extract_driver(raw: &str) -> Option<String> {
    let tokens: Vec<String> = raw.split_whitespace().map(clean_token).collect();

    tokens.windows(2).find_map(|pair| {
        let (first, second) = (&pair[0], &pair[1]);
        if !is_name_token(first) || !is_name_token(second) {
            return None;
        }
        let candidate = format!("{} {}", first, second);
        if Team::is_alias(&candidate) {
            return None;
        }
        Some(candidate)
    })
}

/// Strip surrounding punctuation and a possessive suffix.
fn clean_token(token: &str) -> String {
    let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
    let trimmed = trimmed
        .strip_suffix("'s")
        .or_else(|| trimmed.strip_suffix("\u{2019}s"))
        .unwrap_or(trimmed);
    trimmed.to_string()
}

fn is_name_token(token: &str) -> bool {
    let starts_upper = token.chars().next().is_some_and(|c| c.is_uppercase());
    starts_upper
        && token.chars().all(|c| c.is_alphabetic() || c == '-' || c == '.' || c == '\'')
        && !NAME_STOPWORDS.contains(&token.to_lowercase().as_str())
        && !Team::is_alias(token)
}

/// Map the lowercase normalized text plus slots to an intent.
///
/// Rules are tried in order and the first match wins.
pub fn resolve_intent(lower: &str, slots: Slots) -> Intent {
    let has = |needle: &str| lower.contains(needle);

    if (has("who drives for") || has("drives for") || has("drove for")) && slots.team.is_some() {
        return Intent::TeamDrivers(slots);
    }

    if WINS_WORD.is_match(lower) && slots.driver.is_some() {
        return Intent::DriverWins(slots);
    }

    let asks_driver_champion =
        (has("who won") && !has("constructor")) || (has("champion") && has("driver"));
    if asks_driver_champion && slots.year.is_some() {
        return Intent::ChampionDriver(slots);
    }

    if has("constructor") && has("champion") && slots.year.is_some() {
        return Intent::ChampionConstructor(slots);
    }

    let asks_points_breakdown =
        has("points by race") || (has("points") && (has("by race") || has("per round")));
    if asks_points_breakdown && slots.team.is_some() {
        return Intent::TeamPointsByRace(slots);
    }

    Intent::Auto(slots)
}
