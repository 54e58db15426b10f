//! Test fixtures: a migrated catalog connection plus a temp course tree.
//!
//! Reuses the authoritative schema initialization so tests never duplicate
//! DDL.

use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use tempfile::TempDir;

use crate::db::schema::run_migrations;

/// Test environment with a migrated catalog database and a `courses/`
/// directory to lay fake libraries into. Dropped with the tempdir.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Catalog connection with the full schema applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("catalog.db");
        let conn = Connection::open(&db_path)?;
        run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Root directory scans run against. Created on first use.
    pub fn courses_root(&self) -> PathBuf {
        let root = self.temp.path().join("courses");
        fs::create_dir_all(&root).ok();
        root
    }

    /// Create an empty stub video file (plus parent directories) below the
    /// courses root, e.g. `"CourseA/01 Intro/1 - Welcome.mp4"`.
    pub fn add_video(&self, rel: &str) -> PathBuf {
        let path = self.courses_root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create course directories");
        }
        fs::write(&path, b"").expect("failed to create stub video");
        path
    }
}
