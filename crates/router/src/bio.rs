//! Local "who is <name>" fallback over the drivers table.

use async_trait::async_trait;
use paddock_core::AppResult;
use paddock_facts::{Cell, FactDatabase};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static WHO_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)who\s+is\s+([a-z\s.\-']+)$").expect("who is regex is valid")
});

/// Largest edit distance accepted when no name contains the query.
pub const MAX_EDIT_DISTANCE: usize = 3;

/// Short biography for a person named in the question.
#[async_trait]
pub trait BiographyLookup: Send + Sync {
    /// `Ok(None)` when the question is not a "who is" question or nobody matches.
    async fn lookup(&self, question: &str) -> AppResult<Option<String>>;
}

/// Lowercased name from a "who is <name>" question.
pub fn who_is_name(question: &str) -> Option<String> {
    let trimmed = question.trim().trim_end_matches('?').trim_end();
    WHO_IS
        .captures(trimmed)
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Clone)]
struct DriverRow {
    forename: String,
    surname: String,
    nationality: String,
    dob: String,
    code: Option<String>,
    number: Option<String>,
    url: String,
}

impl DriverRow {
    fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
            .trim()
            .to_lowercase()
    }

    fn biography(&self) -> String {
        let code = self
            .code
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default();
        let number = self
            .number
            .as_deref()
            .map(|n| format!(" #{}", n))
            .unwrap_or_default();
        format!(
            "**{} {}**{}{}, {}, born {}. A Formula 1 driver. More: {}",
            self.forename, self.surname, code, number, self.nationality, self.dob, self.url
        )
    }
}

fn optional_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        Cell::Text(s) if s.is_empty() || s == "\\N" => None,
        other => Some(other.to_string()),
    }
}

pub struct SqliteBiographyLookup {
    db: Arc<FactDatabase>,
}

impl SqliteBiographyLookup {
    pub fn new(db: Arc<FactDatabase>) -> Self {
        Self { db }
    }

    fn drivers(&self) -> AppResult<Vec<DriverRow>> {
        let result = self.db.query(
            "SELECT forename, surname, nationality, dob, code, number, url FROM drivers",
            &[],
        )?;

        Ok(result
            .rows
            .iter()
            .map(|row| DriverRow {
                forename: row[0].to_string(),
                surname: row[1].to_string(),
                nationality: row[2].to_string(),
                dob: row[3].to_string(),
                code: optional_text(&row[4]),
                number: optional_text(&row[5]),
                url: row[6].to_string(),
            })
            .collect())
    }
}

/// Closest driver: names containing the query first (ranked by edit
/// distance), otherwise any name within [`MAX_EDIT_DISTANCE`].
fn best_match<'a>(candidate: &str, drivers: &'a [DriverRow]) -> Option<&'a DriverRow> {
    let scored: Vec<(usize, bool, &DriverRow)> = drivers
        .iter()
        .map(|d| {
            let name = d.full_name();
            (levenshtein(&name, candidate), name.contains(candidate), d)
        })
        .collect();

    let substring = scored
        .iter()
        .filter(|(_, contains, _)| *contains)
        .min_by_key(|(distance, _, _)| *distance);
    if let Some((_, _, driver)) = substring {
        return Some(*driver);
    }

    scored
        .iter()
        .filter(|(distance, _, _)| *distance <= MAX_EDIT_DISTANCE)
        .min_by_key(|(distance, _, _)| *distance)
        .map(|(_, _, driver)| *driver)
}

/// Character-level edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[async_trait]
impl BiographyLookup for SqliteBiographyLookup {
    async fn lookup(&self, question: &str) -> AppResult<Option<String>> {
        let Some(candidate) = who_is_name(question) else {
            return Ok(None);
        };

        let drivers = self.drivers()?;
        let found = best_match(&candidate, &drivers).map(DriverRow::biography);
        tracing::debug!(candidate = %candidate, found = found.is_some(), "Biography lookup");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_facts::testing::build_fixture;
    use tempfile::TempDir;

    fn lookup() -> (TempDir, SqliteBiographyLookup) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f1.sqlite");
        build_fixture(&path).unwrap();
        let db = Arc::new(FactDatabase::open(&path).unwrap());
        (dir, SqliteBiographyLookup::new(db))
    }

    #[test]
    fn test_who_is_name() {
        assert_eq!(who_is_name("Who is Lewis Hamilton?"), Some("lewis hamilton".into()));
        assert_eq!(who_is_name("who   is  max"), Some("max".into()));
        assert_eq!(who_is_name("what is DRS?"), None);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[tokio::test]
    async fn test_substring_match() {
        let (_dir, lookup) = lookup();
        let bio = lookup.lookup("who is verstappen?").await.unwrap().unwrap();
        assert_eq!(
            bio,
            "**Max Verstappen** (VER) #33, Dutch, born 1997-09-30. A Formula 1 driver. \
             More: http://en.wikipedia.org/wiki/Max_Verstappen"
        );
    }

    #[tokio::test]
    async fn test_misspelled_name_within_tolerance() {
        let (_dir, lookup) = lookup();
        let bio = lookup.lookup("Who is Lewis Hamiltn").await.unwrap().unwrap();
        assert!(bio.starts_with("**Lewis Hamilton** (HAM) #44"));
    }

    #[tokio::test]
    async fn test_missing_code_and_number_omitted() {
        let (_dir, lookup) = lookup();
        let bio = lookup.lookup("who is fangio").await.unwrap().unwrap();
        assert!(bio.starts_with("**Juan Fangio**, Argentine, born 1911-06-24."));
    }

    #[tokio::test]
    async fn test_no_match_or_wrong_shape() {
        let (_dir, lookup) = lookup();
        assert!(lookup.lookup("who is the safety car driver").await.unwrap().is_none());
        assert!(lookup.lookup("Ferrari points").await.unwrap().is_none());
    }
}
