//! Structured query intents and their slot values.

use crate::team::Team;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex is valid"));

/// Optional parameters extracted from a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slots {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Slots {
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.team.is_none() && self.driver.is_none() && self.year.is_none()
    }
}

/// What a structured query should compute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", content = "slots", rename_all = "snake_case")]
pub enum Intent {
    /// Drivers of a team, optionally in one season.
    TeamDrivers(Slots),
    /// Race wins of a driver, optionally in one season.
    DriverWins(Slots),
    /// Drivers' champion of a season.
    ChampionDriver(Slots),
    /// Constructors' champion of a season.
    ChampionConstructor(Slots),
    /// Per-round points of a team in a season.
    TeamPointsByRace(Slots),
    /// No specific pattern matched; the store picks from available slots.
    Auto(Slots),
}

impl Intent {
    pub fn slots(&self) -> &Slots {
        match self {
            Intent::TeamDrivers(s)
            | Intent::DriverWins(s)
            | Intent::ChampionDriver(s)
            | Intent::ChampionConstructor(s)
            | Intent::TeamPointsByRace(s)
            | Intent::Auto(s) => s,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::TeamDrivers(_) => "team_drivers",
            Intent::DriverWins(_) => "driver_wins",
            Intent::ChampionDriver(_) => "champion_driver",
            Intent::ChampionConstructor(_) => "champion_constructor",
            Intent::TeamPointsByRace(_) => "team_points_by_race",
            Intent::Auto(_) => "auto",
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Intent::Auto(_))
    }

    /// Concrete intents to try, in order.
    ///
    /// A specific intent is its own chain. `Auto` expands from its slots:
    /// a team tries the roster, a year tries both champions, a driver tries
    /// wins. The order of those groups is fixed but not meaningful.
    pub fn fallback_chain(&self) -> Vec<Intent> {
        let slots = match self {
            Intent::Auto(slots) => slots,
            other => return vec![other.clone()],
        };

        let mut chain = Vec::new();
        if slots.team.is_some() {
            chain.push(Intent::TeamDrivers(slots.clone()));
        }
        if slots.year.is_some() {
            chain.push(Intent::ChampionDriver(slots.clone()));
            chain.push(Intent::ChampionConstructor(slots.clone()));
        }
        if slots.driver.is_some() {
            chain.push(Intent::DriverWins(slots.clone()));
        }
        chain
    }
}

/// First four-digit year (1900-2099) in the text.
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("who won in 2021?"), Some(2021));
        assert_eq!(extract_year("1950 British Grand Prix"), Some(1950));
        assert_eq!(extract_year("car number 33"), None);
        assert_eq!(extract_year("id 120245"), None);
    }

    #[test]
    fn test_specific_intent_chain_is_itself() {
        let intent = Intent::TeamPointsByRace(Slots::default().with_team(Team::Ferrari));
        assert_eq!(intent.fallback_chain(), vec![intent.clone()]);
    }

    #[test]
    fn test_auto_chain_from_slots() {
        let slots = Slots::default()
            .with_team(Team::Mercedes)
            .with_year(2021)
            .with_driver("Lewis Hamilton");
        let names: Vec<&str> = Intent::Auto(slots)
            .fallback_chain()
            .iter()
            .map(|i| i.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "team_drivers",
                "champion_driver",
                "champion_constructor",
                "driver_wins"
            ]
        );
    }

    #[test]
    fn test_auto_without_slots_is_empty_chain() {
        assert!(Intent::Auto(Slots::default()).fallback_chain().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let intent = Intent::ChampionDriver(Slots::default().with_year(2021));
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["intent"], "champion_driver");
        assert_eq!(json["slots"]["year"], 2021);
        assert!(json["slots"].get("team").is_none());
    }
}
