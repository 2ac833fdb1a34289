//! SQLite-backed sample store
//!
//! Timestamps are stored as integer epoch seconds (UTC). The schema is created
//! on first open in read-write mode; there are no migrations.

use super::{SampleStore, Snapshot};
use crate::model::{Game, Marathon, MarathonId, ViewerSample};
use crate::util::time::from_epoch;
use crate::Result;
use anyhow::Context;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use std::path::Path;
use tracing::{debug, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS marathons (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS games (
        ts INTEGER NOT NULL,
        name TEXT NOT NULL,
        marathon INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS viewers (
        ts INTEGER NOT NULL,
        viewers INTEGER,
        donations REAL,
        marathon INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_games_marathon_ts ON games(marathon, ts);
    CREATE INDEX IF NOT EXISTS idx_viewers_marathon_ts ON viewers(marathon, ts);
";

/// Sample store over a SQLite database file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an existing database for reading
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database read-only: {}", path.display()))?;

        Ok(Self { conn })
    }

    /// Open (or create) a database for reading and writing
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Fresh in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create database schema")?;
        Ok(Self { conn })
    }

    /// Look up a marathon by display name
    pub fn find_marathon(&self, name: &str) -> Result<Option<Marathon>> {
        find_marathon(&self.conn, name)
    }

    /// Create a marathon with the next free id
    pub fn create_marathon(&self, name: &str) -> Result<Marathon> {
        create_marathon(&self.conn, name)
    }

    /// Replace all samples and games of one marathon in a single transaction
    pub fn replace_marathon_data(
        &mut self,
        marathon: MarathonId,
        samples: &[ViewerSample],
        games: &[Game],
    ) -> Result<()> {
        let tx = self.begin_import()?;
        tx.replace_marathon_data(marathon, samples, games)?;
        tx.commit()
    }

    /// Start a write transaction for importing one marathon
    ///
    /// Nothing done through the returned handle is visible until
    /// [`ImportTransaction::commit`]; dropping it rolls everything back,
    /// including a marathon created inside it.
    pub fn begin_import(&mut self) -> Result<ImportTransaction<'_>> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin import transaction")?;
        Ok(ImportTransaction { tx })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// An open import transaction
pub struct ImportTransaction<'a> {
    tx: Transaction<'a>,
}

impl ImportTransaction<'_> {
    pub fn find_marathon(&self, name: &str) -> Result<Option<Marathon>> {
        find_marathon(&self.tx, name)
    }

    pub fn create_marathon(&self, name: &str) -> Result<Marathon> {
        create_marathon(&self.tx, name)
    }

    /// Delete the marathon's samples and games, then insert the given ones
    ///
    /// Records are written under `marathon` whatever their own `marathon` field says.
    pub fn replace_marathon_data(
        &self,
        marathon: MarathonId,
        samples: &[ViewerSample],
        games: &[Game],
    ) -> Result<()> {
        let removed_games = self
            .tx
            .execute("DELETE FROM games WHERE marathon = ?1", params![marathon])?;
        let removed_samples = self
            .tx
            .execute("DELETE FROM viewers WHERE marathon = ?1", params![marathon])?;
        debug!(marathon, removed_games, removed_samples, "cleared previous import");

        let mut stmt = self.tx.prepare(
            "INSERT INTO viewers (ts, viewers, donations, marathon) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for sample in samples {
            stmt.execute(params![
                sample.ts.timestamp(),
                sample.viewers,
                sample.donations,
                marathon
            ])?;
        }

        let mut stmt = self
            .tx
            .prepare("INSERT INTO games (ts, name, marathon) VALUES (?1, ?2, ?3)")?;
        for game in games {
            stmt.execute(params![game.ts.timestamp(), game.name, marathon])?;
        }

        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().context("Failed to commit import transaction")
    }
}

fn find_marathon(conn: &Connection, name: &str) -> Result<Option<Marathon>> {
    let marathon = conn
        .query_row(
            "SELECT id, name FROM marathons WHERE name = ?1",
            params![name],
            |row| Ok(Marathon::new(row.get(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .with_context(|| format!("Failed to look up marathon '{}'", name))?;

    Ok(marathon)
}

fn create_marathon(conn: &Connection, name: &str) -> Result<Marathon> {
    let id: MarathonId = conn
        .query_row("SELECT COALESCE(MAX(id) + 1, 0) FROM marathons", [], |row| row.get(0))
        .context("Failed to allocate marathon id")?;

    conn.execute(
        "INSERT INTO marathons (id, name) VALUES (?1, ?2)",
        params![id, name],
    )
    .with_context(|| format!("Failed to create marathon '{}'", name))?;

    debug!(id, name, "created marathon");
    Ok(Marathon::new(id, name))
}

impl SampleStore for SqliteStore {
    fn marathons(&self) -> Result<Vec<Marathon>> {
        read_marathons(&self.conn)
    }

    fn viewer_samples(&self) -> Result<Vec<ViewerSample>> {
        read_viewer_samples(&self.conn)
    }

    fn games(&self) -> Result<Vec<Game>> {
        read_games(&self.conn)
    }

    fn snapshot(&self) -> Result<Snapshot> {
        // One read transaction so all three tables come from the same view
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin snapshot transaction")?;

        let marathons = read_marathons(&tx)?;
        let samples = read_viewer_samples(&tx)?;
        let games = read_games(&tx)?;
        tx.finish().context("Failed to close snapshot transaction")?;

        Ok(Snapshot::new(marathons, samples, games))
    }
}

fn read_marathons(conn: &Connection) -> Result<Vec<Marathon>> {
    let mut stmt = conn.prepare("SELECT id, name FROM marathons ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok(Marathon::new(row.get(0)?, row.get::<_, String>(1)?)))?;

    let mut marathons = Vec::new();
    for row in rows {
        marathons.push(row.context("Failed to read marathon row")?);
    }
    Ok(marathons)
}

fn read_viewer_samples(conn: &Connection) -> Result<Vec<ViewerSample>> {
    let mut stmt = conn.prepare(
        "SELECT ts, viewers, donations, marathon FROM viewers ORDER BY ts, rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, MarathonId>(3)?,
        ))
    })?;

    let mut samples = Vec::new();
    for row in rows {
        let (epoch, viewers, donations, marathon) = row.context("Failed to read viewer row")?;
        match from_epoch(epoch) {
            Some(ts) => samples.push(ViewerSample::new(marathon, ts, viewers, donations)),
            None => warn!(epoch, marathon, "skipping viewer sample with unrepresentable timestamp"),
        }
    }
    Ok(samples)
}

fn read_games(conn: &Connection) -> Result<Vec<Game>> {
    let mut stmt = conn.prepare("SELECT ts, name, marathon FROM games ORDER BY ts, rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, MarathonId>(2)?,
        ))
    })?;

    let mut games = Vec::new();
    for row in rows {
        let (epoch, name, marathon) = row.context("Failed to read game row")?;
        match from_epoch(epoch) {
            Some(ts) => games.push(Game::new(marathon, ts, name)),
            None => warn!(epoch, marathon, "skipping game with unrepresentable timestamp"),
        }
    }
    Ok(games)
}
