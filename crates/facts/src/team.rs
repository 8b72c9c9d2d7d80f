//! Constructor enumeration with historical aliasing.
//!
//! A [`Team`] is the canonical identifier used in queries. Several names that
//! refer to one lineage (Toro Rosso, AlphaTauri) resolve to the same team and
//! expand to every constructor name the dataset uses for it.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    RedBull,
    Ferrari,
    Mercedes,
    McLaren,
    AstonMartin,
    Alpine,
    Williams,
    Haas,
    Sauber,
    AlfaRomeo,
    AlphaTauri,
    Rb,
    Renault,
    RacingPoint,
}

/// Lowercase aliases, single-spaced.
const ALIASES: &[(&str, Team)] = &[
    ("red bull racing", Team::RedBull),
    ("red bull", Team::RedBull),
    ("scuderia ferrari", Team::Ferrari),
    ("ferrari", Team::Ferrari),
    ("mercedes", Team::Mercedes),
    ("mclaren", Team::McLaren),
    ("aston martin", Team::AstonMartin),
    ("alpine", Team::Alpine),
    ("williams", Team::Williams),
    ("haas", Team::Haas),
    ("kick sauber", Team::Sauber),
    ("sauber", Team::Sauber),
    ("alfa romeo", Team::AlfaRomeo),
    ("toro rosso", Team::AlphaTauri),
    ("alphatauri", Team::AlphaTauri),
    ("alpha tauri", Team::AlphaTauri),
    ("racing bulls", Team::Rb),
    ("visa cash app rb", Team::Rb),
    ("rb", Team::Rb),
    ("renault", Team::Renault),
    ("racing point", Team::RacingPoint),
];

static TEAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut aliases: Vec<&str> = ALIASES.iter().map(|(alias, _)| *alias).collect();
    // Longest first so "red bull racing" wins over "red bull"
    aliases.sort_by_key(|alias| std::cmp::Reverse(alias.len()));
    let alternation = aliases
        .iter()
        .map(|alias| regex::escape(alias).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("team alias regex is valid")
});

impl Team {
    /// Resolve an alias (any casing, any internal spacing).
    pub fn from_alias(name: &str) -> Option<Team> {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, team)| *team)
    }

    /// First team mentioned in free text, scanning left to right.
    pub fn find_in(text: &str) -> Option<Team> {
        TEAM_RE
            .find(text)
            .and_then(|m| Team::from_alias(m.as_str()))
    }

    /// Whether the text is exactly a team alias.
    pub fn is_alias(text: &str) -> bool {
        Team::from_alias(text).is_some()
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Team::RedBull => "Red Bull",
            Team::Ferrari => "Ferrari",
            Team::Mercedes => "Mercedes",
            Team::McLaren => "McLaren",
            Team::AstonMartin => "Aston Martin",
            Team::Alpine => "Alpine",
            Team::Williams => "Williams",
            Team::Haas => "Haas",
            Team::Sauber => "Sauber",
            Team::AlfaRomeo => "Alfa Romeo",
            Team::AlphaTauri => "AlphaTauri",
            Team::Rb => "RB",
            Team::Renault => "Renault",
            Team::RacingPoint => "Racing Point",
        }
    }

    /// Every `constructors.name` value the dataset uses for this team.
    pub fn dataset_names(&self) -> &'static [&'static str] {
        match self {
            Team::RedBull => &["Red Bull"],
            Team::Ferrari => &["Ferrari"],
            Team::Mercedes => &["Mercedes"],
            Team::McLaren => &["McLaren"],
            Team::AstonMartin => &["Aston Martin"],
            Team::Alpine => &["Alpine F1 Team"],
            Team::Williams => &["Williams"],
            Team::Haas => &["Haas F1 Team"],
            Team::Sauber => &["Sauber"],
            Team::AlfaRomeo => &["Alfa Romeo"],
            Team::AlphaTauri => &["AlphaTauri", "Toro Rosso"],
            Team::Rb => &["RB F1 Team", "RB"],
            Team::Renault => &["Renault"],
            Team::RacingPoint => &["Racing Point"],
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toro_rosso_lineage_unifies() {
        let a = Team::from_alias("toro rosso");
        let b = Team::from_alias("alphatauri");
        let c = Team::from_alias("alpha tauri");
        assert_eq!(a, Some(Team::AlphaTauri));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(
            Team::AlphaTauri.dataset_names(),
            &["AlphaTauri", "Toro Rosso"]
        );
    }

    #[test]
    fn test_rb_casing_normalizes() {
        assert_eq!(Team::from_alias("rb"), Some(Team::Rb));
        assert_eq!(Team::from_alias("RB"), Some(Team::Rb));
        assert_eq!(Team::Rb.name(), "RB");
    }

    #[test]
    fn test_find_in_text() {
        assert_eq!(
            Team::find_in("Ferrari points by race in 2024"),
            Some(Team::Ferrari)
        );
        assert_eq!(
            Team::find_in("who drives for Red  Bull Racing?"),
            Some(Team::RedBull)
        );
        assert_eq!(Team::find_in("who drove for Toro Rosso in 2019"), Some(Team::AlphaTauri));
        assert_eq!(Team::find_in("is rb fast"), Some(Team::Rb));
    }

    #[test]
    fn test_find_in_requires_word_boundaries() {
        assert_eq!(Team::find_in("herb garden"), None);
        assert_eq!(Team::find_in("who won in 2021?"), None);
    }

    #[test]
    fn test_unknown_alias() {
        assert_eq!(Team::from_alias("Brawn"), None);
        assert!(!Team::is_alias("Max Verstappen"));
        assert!(Team::is_alias("Aston Martin"));
    }
}
