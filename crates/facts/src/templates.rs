//! Fixed, parameterized queries keyed by intent.

use crate::dataset::FactDatabase;
use crate::intent::{Intent, Slots};
use crate::result::StructuredResult;
use crate::store::{FactRequest, FactStore};
use crate::team::Team;
use async_trait::async_trait;
use paddock_core::AppResult;
use rusqlite::types::Value;
use std::sync::Arc;

const DRIVER_NAME: &str = "d.forename || ' ' || d.surname";

/// Fact store backed by hand-written SQL templates.
pub struct TemplateFactStore {
    db: Arc<FactDatabase>,
}

impl TemplateFactStore {
    pub fn new(db: Arc<FactDatabase>) -> Self {
        Self { db }
    }

    /// Run one concrete intent. Missing required slots yield an empty result.
    fn run(&self, intent: &Intent) -> AppResult<StructuredResult> {
        match intent {
            Intent::TeamDrivers(slots) => self.team_drivers(slots),
            Intent::DriverWins(slots) => self.driver_wins(slots),
            Intent::ChampionDriver(slots) => self.champion_driver(slots),
            Intent::ChampionConstructor(slots) => self.champion_constructor(slots),
            Intent::TeamPointsByRace(slots) => self.team_points_by_race(slots),
            Intent::Auto(_) => Ok(StructuredResult::empty()),
        }
    }

    fn year_or_latest(&self, slots: &Slots) -> AppResult<Option<i32>> {
        match slots.year {
            Some(year) => Ok(Some(year)),
            None => self.db.latest_year(),
        }
    }

    fn team_drivers(&self, slots: &Slots) -> AppResult<StructuredResult> {
        let (team, year) = match (slots.team, self.year_or_latest(slots)?) {
            (Some(team), Some(year)) => (team, year),
            _ => return Ok(StructuredResult::empty()),
        };

        let (placeholders, mut params) = team_params(team);
        params.push(Value::Integer(year.into()));
        let sql = format!(
            "SELECT DISTINCT {name} AS driver, c.name AS team, r.year AS year
             FROM results rs
             JOIN races r ON r.raceId = rs.raceId
             JOIN drivers d ON d.driverId = rs.driverId
             JOIN constructors c ON c.constructorId = rs.constructorId
             WHERE c.name IN ({placeholders}) AND r.year = ?
             ORDER BY driver",
            name = DRIVER_NAME,
            placeholders = placeholders,
        );
        self.db.query(&sql, &params)
    }

    fn driver_wins(&self, slots: &Slots) -> AppResult<StructuredResult> {
        let Some(driver) = slots.driver.as_deref() else {
            return Ok(StructuredResult::empty());
        };

        let mut params = vec![Value::Text(driver.to_string())];
        let year_filter = match slots.year {
            Some(year) => {
                params.push(Value::Integer(year.into()));
                " AND r.year = ?"
            }
            None => "",
        };

        let sql = format!(
            "SELECT {name} AS driver, COUNT(*) AS wins
             FROM results rs
             JOIN races r ON r.raceId = rs.raceId
             JOIN drivers d ON d.driverId = rs.driverId
             WHERE lower({name}) = lower(?) AND rs.positionText = '1'{year_filter}
             GROUP BY d.driverId",
            name = DRIVER_NAME,
            year_filter = year_filter,
        );
        self.db.query(&sql, &params)
    }

    fn champion_driver(&self, slots: &Slots) -> AppResult<StructuredResult> {
        let Some(year) = self.year_or_latest(slots)? else {
            return Ok(StructuredResult::empty());
        };

        let sql = format!(
            "SELECT r.year AS year, {name} AS driver, ds.points AS points
             FROM driver_standings ds
             JOIN races r ON r.raceId = ds.raceId
             JOIN drivers d ON d.driverId = ds.driverId
             WHERE r.year = ?1
               AND r.round = (SELECT MAX(round) FROM races WHERE year = ?1)
               AND ds.position = 1",
            name = DRIVER_NAME,
        );
        self.db.query(&sql, &[Value::Integer(year.into())])
    }

    fn champion_constructor(&self, slots: &Slots) -> AppResult<StructuredResult> {
        let Some(year) = self.year_or_latest(slots)? else {
            return Ok(StructuredResult::empty());
        };

        self.db.query(
            "SELECT r.year AS year, c.name AS constructor, cs.points AS points
             FROM constructor_standings cs
             JOIN races r ON r.raceId = cs.raceId
             JOIN constructors c ON c.constructorId = cs.constructorId
             WHERE r.year = ?1
               AND r.round = (SELECT MAX(round) FROM races WHERE year = ?1)
               AND cs.position = 1",
            &[Value::Integer(year.into())],
        )
    }

    fn team_points_by_race(&self, slots: &Slots) -> AppResult<StructuredResult> {
        let (team, year) = match (slots.team, self.year_or_latest(slots)?) {
            (Some(team), Some(year)) => (team, year),
            _ => return Ok(StructuredResult::empty()),
        };

        let (placeholders, mut params) = team_params(team);
        params.push(Value::Integer(year.into()));
        let sql = format!(
            "SELECT r.round AS round, r.name AS race, SUM(rs.points) AS points
             FROM results rs
             JOIN races r ON r.raceId = rs.raceId
             JOIN constructors c ON c.constructorId = rs.constructorId
             WHERE c.name IN ({placeholders}) AND r.year = ?
             GROUP BY r.raceId
             ORDER BY r.round",
            placeholders = placeholders,
        );
        self.db.query(&sql, &params)
    }
}

/// `?, ?` placeholders plus the bound dataset names of a team.
fn team_params(team: Team) -> (String, Vec<Value>) {
    let names = team.dataset_names();
    let placeholders = vec!["?"; names.len()].join(", ");
    let params = names.iter().map(|n| Value::Text(n.to_string())).collect();
    (placeholders, params)
}

#[async_trait]
impl FactStore for TemplateFactStore {
    fn name(&self) -> &str {
        "templates"
    }

    async fn execute(&self, request: &FactRequest<'_>) -> AppResult<StructuredResult> {
        if request.intent.is_auto() && request.intent.slots().is_empty() {
            tracing::debug!("No team, driver or year to query");
            return Ok(StructuredResult::empty());
        }

        for intent in request.intent.fallback_chain() {
            let result = self.run(&intent)?;
            tracing::debug!(
                intent = intent.name(),
                rows = result.row_count(),
                "Template query finished"
            );
            if !result.is_empty() {
                return Ok(result);
            }
        }
        Ok(StructuredResult::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Cell;
    use crate::testing::build_fixture;
    use tempfile::TempDir;

    fn store() -> (TempDir, TemplateFactStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f1.sqlite");
        build_fixture(&path).unwrap();
        let db = Arc::new(FactDatabase::open(&path).unwrap());
        (dir, TemplateFactStore::new(db))
    }

    async fn run(store: &TemplateFactStore, intent: Intent) -> StructuredResult {
        store
            .execute(&FactRequest::new("test question", &intent))
            .await
            .unwrap()
    }

    fn text(cell: &Cell) -> String {
        cell.to_string()
    }

    #[tokio::test]
    async fn test_team_points_by_race_ordered_by_round() {
        let (_dir, store) = store();
        let slots = Slots::default().with_team(Team::Ferrari).with_year(2024);
        let result = run(&store, Intent::TeamPointsByRace(slots)).await;

        assert_eq!(result.columns, vec!["round", "race", "points"]);
        let rounds: Vec<String> = result.rows.iter().map(|r| text(&r[0])).collect();
        assert_eq!(rounds, vec!["1", "2", "3"]);
        let points: Vec<String> = result.rows.iter().map(|r| text(&r[2])).collect();
        assert_eq!(points, vec!["27", "15", "44"]);
    }

    #[tokio::test]
    async fn test_team_points_defaults_to_latest_year() {
        let (_dir, store) = store();
        let slots = Slots::default().with_team(Team::Ferrari);
        let result = run(&store, Intent::TeamPointsByRace(slots)).await;
        assert_eq!(result.row_count(), 3);
    }

    #[tokio::test]
    async fn test_team_drivers_spans_lineage_names() {
        let (_dir, store) = store();
        let slots = Slots::default().with_team(Team::AlphaTauri).with_year(2019);
        let result = run(&store, Intent::TeamDrivers(slots)).await;

        let drivers: Vec<String> = result.rows.iter().map(|r| text(&r[0])).collect();
        assert_eq!(drivers, vec!["Daniil Kvyat", "Pierre Gasly"]);
        assert!(result.rows.iter().all(|r| text(&r[1]) == "Toro Rosso"));
    }

    #[tokio::test]
    async fn test_driver_wins_case_insensitive() {
        let (_dir, store) = store();
        let slots = Slots::default().with_driver("max verstappen").with_year(2024);
        let result = run(&store, Intent::DriverWins(slots)).await;
        assert_eq!(result.row_count(), 1);
        assert_eq!(text(&result.rows[0][1]), "2");
    }

    #[tokio::test]
    async fn test_champion_uses_final_round() {
        let (_dir, store) = store();
        let slots = Slots::default().with_year(2021);

        let drivers = run(&store, Intent::ChampionDriver(slots.clone())).await;
        assert_eq!(drivers.row_count(), 1);
        assert_eq!(drivers.row_summary(0).unwrap(), "year: 2021, driver: Max Verstappen, points: 395.5");

        let constructors = run(&store, Intent::ChampionConstructor(slots)).await;
        assert_eq!(text(&constructors.rows[0][1]), "Mercedes");
    }

    #[tokio::test]
    async fn test_auto_stops_at_first_non_empty() {
        let (_dir, store) = store();
        // No team; year only: the drivers' champion answers first
        let slots = Slots::default().with_year(2021).with_driver("Nobody Known");
        let result = run(&store, Intent::Auto(slots)).await;
        assert_eq!(text(&result.rows[0][1]), "Max Verstappen");
    }

    #[tokio::test]
    async fn test_auto_falls_through_to_driver_wins() {
        let (_dir, store) = store();
        let slots = Slots::default().with_year(1999).with_driver("Lewis Hamilton");
        let result = run(&store, Intent::Auto(slots)).await;
        // Every step of the chain is filtered to a season with no races
        assert!(result.is_empty());

        let slots = Slots::default().with_driver("Lewis Hamilton");
        let result = run(&store, Intent::Auto(slots)).await;
        assert_eq!(result.columns, vec!["driver", "wins"]);
        assert_eq!(text(&result.rows[0][1]), "2");
    }

    #[tokio::test]
    async fn test_missing_slots_is_no_data() {
        let (_dir, store) = store();
        let result = run(&store, Intent::Auto(Slots::default())).await;
        assert!(result.is_empty());
        let result = run(&store, Intent::TeamDrivers(Slots::default().with_year(2024))).await;
        assert!(result.is_empty());
    }
}
