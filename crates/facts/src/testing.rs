//! A small Ergast-shaped dataset for tests.
//!
//! Covers three seasons with just enough rows to exercise every template:
//! - 2019: Toro Rosso line-up (Kvyat, Gasly) for alias tests.
//! - 2021: the standings leader changes between round 1 and the final round,
//!   so champion queries must read the last round.
//! - 2024: Ferrari scores 27, 15 and 44 points over rounds 1 to 3.

use paddock_core::AppResult;
use rusqlite::Connection;
use std::path::Path;

const SCHEMA: &str = r#"
CREATE TABLE drivers (
    driverId INTEGER PRIMARY KEY,
    driverRef TEXT NOT NULL,
    number INTEGER,
    code TEXT,
    forename TEXT NOT NULL,
    surname TEXT NOT NULL,
    dob TEXT,
    nationality TEXT,
    url TEXT
);
CREATE TABLE constructors (
    constructorId INTEGER PRIMARY KEY,
    constructorRef TEXT NOT NULL,
    name TEXT NOT NULL,
    nationality TEXT,
    url TEXT
);
CREATE TABLE races (
    raceId INTEGER PRIMARY KEY,
    year INTEGER NOT NULL,
    round INTEGER NOT NULL,
    circuitId INTEGER,
    name TEXT NOT NULL,
    date TEXT
);
CREATE TABLE results (
    resultId INTEGER PRIMARY KEY,
    raceId INTEGER NOT NULL,
    driverId INTEGER NOT NULL,
    constructorId INTEGER NOT NULL,
    grid INTEGER,
    position INTEGER,
    positionText TEXT,
    positionOrder INTEGER,
    points REAL
);
CREATE TABLE driver_standings (
    driverStandingsId INTEGER PRIMARY KEY,
    raceId INTEGER NOT NULL,
    driverId INTEGER NOT NULL,
    points REAL,
    position INTEGER,
    positionText TEXT,
    wins INTEGER
);
CREATE TABLE constructor_standings (
    constructorStandingsId INTEGER PRIMARY KEY,
    raceId INTEGER NOT NULL,
    constructorId INTEGER NOT NULL,
    points REAL,
    position INTEGER,
    positionText TEXT,
    wins INTEGER
);
CREATE TABLE pit_stops (
    raceId INTEGER NOT NULL,
    driverId INTEGER NOT NULL,
    stop INTEGER NOT NULL,
    lap INTEGER,
    duration TEXT,
    milliseconds INTEGER
);
"#;

const ROWS: &str = r#"
INSERT INTO drivers VALUES
    (1, 'max_verstappen', 33, 'VER', 'Max', 'Verstappen', '1997-09-30', 'Dutch', 'http://en.wikipedia.org/wiki/Max_Verstappen'),
    (2, 'hamilton', 44, 'HAM', 'Lewis', 'Hamilton', '1985-01-07', 'British', 'http://en.wikipedia.org/wiki/Lewis_Hamilton'),
    (3, 'leclerc', 16, 'LEC', 'Charles', 'Leclerc', '1997-10-16', 'Monegasque', 'http://en.wikipedia.org/wiki/Charles_Leclerc'),
    (4, 'sainz', 55, 'SAI', 'Carlos', 'Sainz', '1994-09-01', 'Spanish', 'http://en.wikipedia.org/wiki/Carlos_Sainz_Jr.'),
    (5, 'gasly', 10, 'GAS', 'Pierre', 'Gasly', '1996-02-07', 'French', 'http://en.wikipedia.org/wiki/Pierre_Gasly'),
    (6, 'tsunoda', 22, 'TSU', 'Yuki', 'Tsunoda', '2000-05-11', 'Japanese', 'http://en.wikipedia.org/wiki/Yuki_Tsunoda'),
    (7, 'kvyat', 26, 'KVY', 'Daniil', 'Kvyat', '1994-04-26', 'Russian', 'http://en.wikipedia.org/wiki/Daniil_Kvyat'),
    (8, 'fangio', NULL, NULL, 'Juan', 'Fangio', '1911-06-24', 'Argentine', 'http://en.wikipedia.org/wiki/Juan_Manuel_Fangio');

INSERT INTO constructors VALUES
    (1, 'red_bull', 'Red Bull', 'Austrian', NULL),
    (2, 'mercedes', 'Mercedes', 'German', NULL),
    (3, 'ferrari', 'Ferrari', 'Italian', NULL),
    (4, 'alphatauri', 'AlphaTauri', 'Italian', NULL),
    (5, 'toro_rosso', 'Toro Rosso', 'Italian', NULL),
    (6, 'rb', 'RB F1 Team', 'Italian', NULL);

INSERT INTO races VALUES
    (101, 2019, 1, 1, 'Australian Grand Prix', '2019-03-17'),
    (102, 2019, 2, 2, 'Bahrain Grand Prix', '2019-03-31'),
    (201, 2021, 1, 2, 'Bahrain Grand Prix', '2021-03-28'),
    (202, 2021, 2, 9, 'Abu Dhabi Grand Prix', '2021-12-12'),
    (301, 2024, 1, 2, 'Bahrain Grand Prix', '2024-03-02'),
    (302, 2024, 2, 7, 'Saudi Arabian Grand Prix', '2024-03-09'),
    (303, 2024, 3, 1, 'Australian Grand Prix', '2024-03-24');

INSERT INTO results VALUES
    (1, 101, 2, 2, 4, 2, '2', 2, 18),
    (2, 101, 1, 1, 3, 3, '3', 3, 15),
    (3, 101, 7, 5, 15, 10, '10', 10, 1),
    (4, 101, 5, 1, 17, 11, '11', 11, 0),
    (5, 102, 2, 2, 3, 1, '1', 1, 25),
    (6, 102, 7, 5, 14, 12, '12', 12, 0),
    (7, 102, 5, 5, 13, 9, '9', 9, 2),
    (8, 201, 2, 2, 2, 1, '1', 1, 25),
    (9, 201, 1, 1, 1, 2, '2', 2, 18),
    (10, 201, 5, 4, 5, NULL, 'R', 19, 0),
    (11, 201, 6, 4, 13, 9, '9', 9, 2),
    (12, 202, 1, 1, 1, 1, '1', 1, 26),
    (13, 202, 2, 2, 2, 2, '2', 2, 18),
    (14, 301, 1, 1, 1, 1, '1', 1, 26),
    (15, 301, 4, 3, 4, 3, '3', 3, 15),
    (16, 301, 3, 3, 2, 4, '4', 4, 12),
    (17, 301, 6, 6, 11, 14, '14', 14, 0),
    (18, 302, 1, 1, 1, 1, '1', 1, 25),
    (19, 302, 3, 3, 2, 3, '3', 3, 15),
    (20, 302, 4, 3, 3, NULL, 'R', 18, 0),
    (21, 303, 3, 3, 2, 1, '1', 1, 26),
    (22, 303, 4, 3, 3, 2, '2', 2, 18),
    (23, 303, 1, 1, 1, NULL, 'R', 19, 0),
    (24, 303, 6, 6, 8, 7, '7', 7, 6);

INSERT INTO driver_standings VALUES
    (1, 201, 2, 25, 1, '1', 1),
    (2, 201, 1, 18, 2, '2', 0),
    (3, 202, 1, 395.5, 1, '1', 10),
    (4, 202, 2, 387.5, 2, '2', 8);

INSERT INTO constructor_standings VALUES
    (1, 201, 1, 18, 1, '1', 0),
    (2, 201, 2, 25, 2, '2', 1),
    (3, 202, 2, 613.5, 1, '1', 9),
    (4, 202, 1, 585.5, 2, '2', 11);

INSERT INTO pit_stops VALUES
    (301, 3, 1, 17, '22.512', 22512),
    (301, 4, 1, 18, '23.004', 23004),
    (302, 3, 1, 15, '24.310', 24310),
    (303, 3, 1, 20, '21.998', 21998),
    (303, 4, 1, 21, '22.450', 22450);
"#;

/// Create the fixture dataset at `path`.
pub fn build_fixture(path: &Path) -> AppResult<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(ROWS)?;
    Ok(())
}
