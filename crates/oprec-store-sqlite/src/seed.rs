//! Seeding of the organisational hierarchy catalog.
//!
//! Safe to run repeatedly: rows are keyed by name and only inserted when
//! missing, so re-running against a live database changes nothing.

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{encode::encode_uuid, Result, SqliteStore};

/// The hierarchy tree seeded into a fresh database.
const HIERARCHY: &[(&str, &[(&str, &[&str])])] = &[
  ("Operational", &[
    ("Event Management", &["Production", "Program"]),
    ("Creative Media", &["Design", "Documentation"]),
    ("Logistics", &[]),
  ]),
  ("Organisational", &[
    ("Public Relations", &["Partnership", "Social Media"]),
    ("Human Resources", &[]),
  ]),
];

fn ensure_department(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<String> {
  if let Some(id) = conn
    .query_row(
      "SELECT department_id FROM departments WHERE name = ?1",
      rusqlite::params![name],
      |row| row.get::<_, String>(0),
    )
    .optional()?
  {
    return Ok(id);
  }
  let id = encode_uuid(Uuid::new_v4());
  conn.execute(
    "INSERT INTO departments (department_id, name) VALUES (?1, ?2)",
    rusqlite::params![id, name],
  )?;
  Ok(id)
}

fn ensure_division(
  conn:          &rusqlite::Connection,
  department_id: &str,
  name:          &str,
) -> rusqlite::Result<String> {
  if let Some(id) = conn
    .query_row(
      "SELECT division_id FROM divisions WHERE department_id = ?1 AND name = ?2",
      rusqlite::params![department_id, name],
      |row| row.get::<_, String>(0),
    )
    .optional()?
  {
    return Ok(id);
  }
  let id = encode_uuid(Uuid::new_v4());
  conn.execute(
    "INSERT INTO divisions (division_id, department_id, name) VALUES (?1, ?2, ?3)",
    rusqlite::params![id, department_id, name],
  )?;
  Ok(id)
}

fn ensure_sub_division(
  conn:        &rusqlite::Connection,
  division_id: &str,
  name:        &str,
) -> rusqlite::Result<()> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM sub_divisions WHERE division_id = ?1 AND name = ?2",
      rusqlite::params![division_id, name],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if exists {
    return Ok(());
  }
  conn.execute(
    "INSERT INTO sub_divisions (sub_division_id, division_id, name) VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(Uuid::new_v4()), division_id, name],
  )?;
  Ok(())
}

/// Insert the default department/division/sub-division tree.
pub async fn seed_hierarchy(store: &SqliteStore) -> Result<()> {
  store
    .connection()
    .call(|conn| {
      let tx = conn.transaction()?;
      for (department, divisions) in HIERARCHY {
        let department_id = ensure_department(&tx, department)?;
        for (division, sub_divisions) in *divisions {
          let division_id = ensure_division(&tx, &department_id, division)?;
          for sub_division in *sub_divisions {
            ensure_sub_division(&tx, &division_id, sub_division)?;
          }
        }
      }
      tx.commit()?;
      Ok(())
    })
    .await?;
  Ok(())
}
