// SQLite persistence for athletes, contests, participants, rosters, points and standings.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::Result;
use crate::model::{
    Athlete, Contest, ContestStanding, FantasySurferLineup, LeagueType, Participant, PricedSlot,
    Stance, SurferPoints, WslLineup,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS surfers (
        id          TEXT PRIMARY KEY,
        first_name  TEXT NOT NULL,
        last_name   TEXT NOT NULL,
        country     TEXT,
        stance      TEXT CHECK (stance IN ('regular', 'goofy')),
        birth_date  TEXT
    );

    CREATE TABLE IF NOT EXISTS contests (
        id           TEXT PRIMARY KEY,
        name         TEXT NOT NULL,
        year         INTEGER NOT NULL,
        country      TEXT,
        start_date   TEXT NOT NULL,
        end_date     TEXT NOT NULL,
        is_active    INTEGER NOT NULL DEFAULT 0,
        is_completed INTEGER NOT NULL DEFAULT 0,
        stop_number  INTEGER
    );

    CREATE TABLE IF NOT EXISTS users (
        id                TEXT PRIMARY KEY,
        email             TEXT,
        first_name        TEXT,
        last_name         TEXT,
        wsl_id            TEXT,
        fantasy_surfer_id TEXT
    );

    CREATE TABLE IF NOT EXISTS world_surf_league_rosters (
        user_id         TEXT NOT NULL REFERENCES users(id),
        contest_id      TEXT NOT NULL REFERENCES contests(id),
        surfer_a1_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_a2_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_b1_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_b2_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_b3_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_b4_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_c1_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_c2_id    TEXT NOT NULL REFERENCES surfers(id),
        power_surfer_id TEXT NOT NULL REFERENCES surfers(id),
        updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        PRIMARY KEY (user_id, contest_id)
    );

    CREATE TABLE IF NOT EXISTS fantasy_surfer_rosters (
        user_id        TEXT NOT NULL REFERENCES users(id),
        contest_id     TEXT NOT NULL REFERENCES contests(id),
        surfer_1_id    TEXT NOT NULL REFERENCES surfers(id),
        surfer_1_price INTEGER NOT NULL,
        surfer_2_id    TEXT REFERENCES surfers(id),
        surfer_2_price INTEGER,
        surfer_3_id    TEXT REFERENCES surfers(id),
        surfer_3_price INTEGER,
        surfer_4_id    TEXT REFERENCES surfers(id),
        surfer_4_price INTEGER,
        surfer_5_id    TEXT REFERENCES surfers(id),
        surfer_5_price INTEGER,
        surfer_6_id    TEXT REFERENCES surfers(id),
        surfer_6_price INTEGER,
        surfer_7_id    TEXT REFERENCES surfers(id),
        surfer_7_price INTEGER,
        surfer_8_id    TEXT REFERENCES surfers(id),
        surfer_8_price INTEGER,
        updated_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        PRIMARY KEY (user_id, contest_id)
    );

    CREATE TABLE IF NOT EXISTS surfer_points (
        surfer_id   TEXT NOT NULL REFERENCES surfers(id),
        contest_id  TEXT NOT NULL REFERENCES contests(id),
        league_type TEXT NOT NULL CHECK (league_type IN ('wsl', 'fantasy_surfer')),
        points      REAL NOT NULL,
        PRIMARY KEY (surfer_id, contest_id, league_type)
    );

    CREATE TABLE IF NOT EXISTS contest_standings (
        user_id     TEXT NOT NULL REFERENCES users(id),
        contest_id  TEXT NOT NULL REFERENCES contests(id),
        league_type TEXT NOT NULL CHECK (league_type IN ('wsl', 'fantasy_surfer')),
        points      REAL NOT NULL,
        PRIMARY KEY (user_id, contest_id, league_type)
    );
";

/// The league datastore. Every write is a single upsert statement; there
/// are no transactions spanning tables.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database at `path` and ensure all tables exist.
    /// Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA)?;
        debug!(path, "opened league store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Athletes
    // ------------------------------------------------------------------

    pub fn insert_athlete(&self, athlete: &Athlete) -> Result<()> {
        self.conn().execute(
            "INSERT INTO surfers (id, first_name, last_name, country, stance, birth_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name  = excluded.last_name,
                country    = excluded.country,
                stance     = excluded.stance,
                birth_date = excluded.birth_date",
            params![
                athlete.id,
                athlete.first_name,
                athlete.last_name,
                athlete.country,
                athlete.stance.map(|s| s.to_string()),
                athlete.birth_date,
            ],
        )?;
        Ok(())
    }

    /// All athletes in insertion order.
    pub fn list_athletes(&self) -> Result<Vec<Athlete>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, country, stance, birth_date
             FROM surfers ORDER BY rowid",
        )?;
        let athletes = stmt
            .query_map([], |row| {
                let stance: Option<String> = row.get(4)?;
                Ok(Athlete {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    country: row.get(3)?,
                    stance: stance.and_then(|s| Stance::from_str(&s).ok()),
                    birth_date: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(athletes)
    }

    // ------------------------------------------------------------------
    // Contests
    // ------------------------------------------------------------------

    pub fn upsert_contest(&self, contest: &Contest) -> Result<()> {
        self.conn().execute(
            "INSERT INTO contests
                (id, name, year, country, start_date, end_date, is_active, is_completed, stop_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name         = excluded.name,
                year         = excluded.year,
                country      = excluded.country,
                start_date   = excluded.start_date,
                end_date     = excluded.end_date,
                is_active    = excluded.is_active,
                is_completed = excluded.is_completed,
                stop_number  = excluded.stop_number",
            params![
                contest.id,
                contest.name,
                contest.year,
                contest.country,
                contest.start_date,
                contest.end_date,
                contest.is_active,
                contest.is_completed,
                contest.stop_number,
            ],
        )?;
        Ok(())
    }

    pub fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>> {
        let contest = self
            .conn()
            .query_row(
                "SELECT id, name, year, country, start_date, end_date, is_active, is_completed, stop_number
                 FROM contests WHERE id = ?1",
                params![contest_id],
                contest_from_row,
            )
            .optional()?;
        Ok(contest)
    }

    /// All contests, earliest first.
    pub fn list_contests(&self) -> Result<Vec<Contest>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, year, country, start_date, end_date, is_active, is_completed, stop_number
             FROM contests ORDER BY start_date, rowid",
        )?;
        let contests = stmt
            .query_map([], contest_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contests)
    }

    // ------------------------------------------------------------------
    // Participants
    // ------------------------------------------------------------------

    pub fn upsert_participant(&self, participant: &Participant) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, email, first_name, last_name, wsl_id, fantasy_surfer_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                email             = excluded.email,
                first_name        = excluded.first_name,
                last_name         = excluded.last_name,
                wsl_id            = excluded.wsl_id,
                fantasy_surfer_id = excluded.fantasy_surfer_id",
            params![
                participant.id,
                participant.email,
                participant.first_name,
                participant.last_name,
                participant.wsl_id,
                participant.fantasy_surfer_id,
            ],
        )?;
        Ok(())
    }

    pub fn participants_with_wsl_id(&self) -> Result<Vec<Participant>> {
        self.query_participants(
            "SELECT id, email, first_name, last_name, wsl_id, fantasy_surfer_id
             FROM users WHERE wsl_id IS NOT NULL AND wsl_id <> '' ORDER BY rowid",
        )
    }

    pub fn participants_with_fantasy_surfer_id(&self) -> Result<Vec<Participant>> {
        self.query_participants(
            "SELECT id, email, first_name, last_name, wsl_id, fantasy_surfer_id
             FROM users WHERE fantasy_surfer_id IS NOT NULL AND fantasy_surfer_id <> '' ORDER BY rowid",
        )
    }

    fn query_participants(&self, sql: &str) -> Result<Vec<Participant>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let participants = stmt
            .query_map([], |row| {
                Ok(Participant {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                    wsl_id: row.get(4)?,
                    fantasy_surfer_id: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(participants)
    }

    // ------------------------------------------------------------------
    // Rosters
    // ------------------------------------------------------------------

    /// Write a WSL roster, replacing any previous roster for the same
    /// participant and contest.
    pub fn upsert_wsl_roster(&self, participant_id: &str, contest_id: &str, lineup: &WslLineup) -> Result<()> {
        self.conn().execute(
            "INSERT INTO world_surf_league_rosters
                (user_id, contest_id, surfer_a1_id, surfer_a2_id, surfer_b1_id, surfer_b2_id,
                 surfer_b3_id, surfer_b4_id, surfer_c1_id, surfer_c2_id, power_surfer_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(user_id, contest_id) DO UPDATE SET
                surfer_a1_id    = excluded.surfer_a1_id,
                surfer_a2_id    = excluded.surfer_a2_id,
                surfer_b1_id    = excluded.surfer_b1_id,
                surfer_b2_id    = excluded.surfer_b2_id,
                surfer_b3_id    = excluded.surfer_b3_id,
                surfer_b4_id    = excluded.surfer_b4_id,
                surfer_c1_id    = excluded.surfer_c1_id,
                surfer_c2_id    = excluded.surfer_c2_id,
                power_surfer_id = excluded.power_surfer_id,
                updated_at      = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![
                participant_id,
                contest_id,
                lineup.a1,
                lineup.a2,
                lineup.b1,
                lineup.b2,
                lineup.b3,
                lineup.b4,
                lineup.c1,
                lineup.c2,
                lineup.power_surfer,
            ],
        )?;
        Ok(())
    }

    pub fn get_wsl_roster(&self, participant_id: &str, contest_id: &str) -> Result<Option<WslLineup>> {
        let lineup = self
            .conn()
            .query_row(
                "SELECT surfer_a1_id, surfer_a2_id, surfer_b1_id, surfer_b2_id, surfer_b3_id,
                        surfer_b4_id, surfer_c1_id, surfer_c2_id, power_surfer_id
                 FROM world_surf_league_rosters WHERE user_id = ?1 AND contest_id = ?2",
                params![participant_id, contest_id],
                |row| {
                    Ok(WslLineup {
                        a1: row.get(0)?,
                        a2: row.get(1)?,
                        b1: row.get(2)?,
                        b2: row.get(3)?,
                        b3: row.get(4)?,
                        b4: row.get(5)?,
                        c1: row.get(6)?,
                        c2: row.get(7)?,
                        power_surfer: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(lineup)
    }

    /// Write a Fantasy Surfer roster. Slots the lineup does not fill are
    /// cleared rather than kept from an earlier run.
    pub fn upsert_fantasy_surfer_roster(
        &self,
        participant_id: &str,
        contest_id: &str,
        lineup: &FantasySurferLineup,
    ) -> Result<()> {
        let slot = |i: usize| lineup.slots.get(i);
        let id = |i: usize| slot(i).map(|s| s.athlete_id.as_str());
        let price = |i: usize| slot(i).map(|s| s.price);

        self.conn().execute(
            "INSERT INTO fantasy_surfer_rosters
                (user_id, contest_id,
                 surfer_1_id, surfer_1_price, surfer_2_id, surfer_2_price,
                 surfer_3_id, surfer_3_price, surfer_4_id, surfer_4_price,
                 surfer_5_id, surfer_5_price, surfer_6_id, surfer_6_price,
                 surfer_7_id, surfer_7_price, surfer_8_id, surfer_8_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
             ON CONFLICT(user_id, contest_id) DO UPDATE SET
                surfer_1_id = excluded.surfer_1_id, surfer_1_price = excluded.surfer_1_price,
                surfer_2_id = excluded.surfer_2_id, surfer_2_price = excluded.surfer_2_price,
                surfer_3_id = excluded.surfer_3_id, surfer_3_price = excluded.surfer_3_price,
                surfer_4_id = excluded.surfer_4_id, surfer_4_price = excluded.surfer_4_price,
                surfer_5_id = excluded.surfer_5_id, surfer_5_price = excluded.surfer_5_price,
                surfer_6_id = excluded.surfer_6_id, surfer_6_price = excluded.surfer_6_price,
                surfer_7_id = excluded.surfer_7_id, surfer_7_price = excluded.surfer_7_price,
                surfer_8_id = excluded.surfer_8_id, surfer_8_price = excluded.surfer_8_price,
                updated_at  = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![
                participant_id,
                contest_id,
                id(0),
                price(0),
                id(1),
                price(1),
                id(2),
                price(2),
                id(3),
                price(3),
                id(4),
                price(4),
                id(5),
                price(5),
                id(6),
                price(6),
                id(7),
                price(7),
            ],
        )?;
        Ok(())
    }

    /// Filled slots of a stored Fantasy Surfer roster. Per-slot points are
    /// not part of the roster row and read back as 0.
    pub fn get_fantasy_surfer_roster(
        &self,
        participant_id: &str,
        contest_id: &str,
    ) -> Result<Option<FantasySurferLineup>> {
        let lineup = self
            .conn()
            .query_row(
                "SELECT surfer_1_id, surfer_1_price, surfer_2_id, surfer_2_price,
                        surfer_3_id, surfer_3_price, surfer_4_id, surfer_4_price,
                        surfer_5_id, surfer_5_price, surfer_6_id, surfer_6_price,
                        surfer_7_id, surfer_7_price, surfer_8_id, surfer_8_price
                 FROM fantasy_surfer_rosters WHERE user_id = ?1 AND contest_id = ?2",
                params![participant_id, contest_id],
                |row| {
                    let mut slots = Vec::with_capacity(FantasySurferLineup::MAX_SLOTS);
                    for i in 0..FantasySurferLineup::MAX_SLOTS {
                        let athlete_id: Option<String> = row.get(i * 2)?;
                        let price: Option<i64> = row.get(i * 2 + 1)?;
                        if let Some(athlete_id) = athlete_id {
                            slots.push(PricedSlot {
                                athlete_id,
                                price: price.unwrap_or_default(),
                                points: 0,
                            });
                        }
                    }
                    Ok(FantasySurferLineup { slots })
                },
            )
            .optional()?;
        Ok(lineup)
    }

    // ------------------------------------------------------------------
    // Points and standings
    // ------------------------------------------------------------------

    pub fn upsert_surfer_points(&self, points: &SurferPoints) -> Result<()> {
        self.conn().execute(
            "INSERT INTO surfer_points (surfer_id, contest_id, league_type, points)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(surfer_id, contest_id, league_type) DO UPDATE SET
                points = excluded.points",
            params![
                points.athlete_id,
                points.contest_id,
                points.league.as_ref(),
                points.points
            ],
        )?;
        Ok(())
    }

    pub fn get_surfer_points(
        &self,
        athlete_id: &str,
        contest_id: &str,
        league: LeagueType,
    ) -> Result<Option<f64>> {
        let points = self
            .conn()
            .query_row(
                "SELECT points FROM surfer_points
                 WHERE surfer_id = ?1 AND contest_id = ?2 AND league_type = ?3",
                params![athlete_id, contest_id, league.as_ref()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(points)
    }

    pub fn upsert_contest_standing(&self, standing: &ContestStanding) -> Result<()> {
        self.conn().execute(
            "INSERT INTO contest_standings (user_id, contest_id, league_type, points)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, contest_id, league_type) DO UPDATE SET
                points = excluded.points",
            params![
                standing.participant_id,
                standing.contest_id,
                standing.league.as_ref(),
                standing.points
            ],
        )?;
        Ok(())
    }

    /// Standings for one contest on one fantasy game, highest points first.
    pub fn contest_standings(&self, contest_id: &str, league: LeagueType) -> Result<Vec<ContestStanding>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, points FROM contest_standings
             WHERE contest_id = ?1 AND league_type = ?2
             ORDER BY points DESC, rowid",
        )?;
        let standings = stmt
            .query_map(params![contest_id, league.as_ref()], |row| {
                Ok(ContestStanding {
                    participant_id: row.get(0)?,
                    contest_id: contest_id.to_string(),
                    league,
                    points: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(standings)
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn().execute_batch(sql)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn count_rows(&self, table: &str) -> Result<i64> {
        let count = self
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}

fn contest_from_row(row: &Row<'_>) -> rusqlite::Result<Contest> {
    Ok(Contest {
        id: row.get(0)?,
        name: row.get(1)?,
        year: row.get(2)?,
        country: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        is_active: row.get(6)?,
        is_completed: row.get(7)?,
        stop_number: row.get(8)?,
    })
}
