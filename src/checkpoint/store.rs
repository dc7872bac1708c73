/*!
 * Durable batch checkpointing.
 *
 * Every successfully translated batch is written here keyed by
 * `(job_id, file_path, batch_index)` together with a hash of its source
 * texts. Interrupted jobs resume by skipping batches whose stored hash
 * still matches the current sources; editing a source file invalidates
 * only the checkpoints of the batches it touched.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::params;
use sha2::{Digest, Sha256};
use std::path::Path;

use super::connection::DatabaseConnection;

/// Checkpoint store backed by SQLite
#[derive(Clone)]
pub struct CheckpointStore {
    db: DatabaseConnection,
}

impl CheckpointStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: DatabaseConnection::new(path)?,
        })
    }

    /// Open the store at the default per-user location
    pub fn open_default() -> Result<Self> {
        Ok(Self {
            db: DatabaseConnection::new_default()?,
        })
    }

    /// In-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: DatabaseConnection::new_in_memory()?,
        })
    }

    /// Hash of a batch's source texts.
    ///
    /// Texts are fed through a separator byte so ["ab","c"] and ["a","bc"]
    /// hash differently.
    pub fn source_hash(texts: &[String]) -> String {
        let mut hasher = Sha256::new();
        for text in texts {
            hasher.update(text.as_bytes());
            hasher.update([0x1F]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Fetch a completed batch, if one exists with a matching source hash.
    ///
    /// A row whose hash differs from `source_hash` is treated as absent:
    /// the sources changed since it was written and it must be redone.
    pub async fn completed_batch(
        &self,
        job_id: &str,
        file_path: &str,
        batch_index: usize,
        source_hash: &str,
    ) -> Result<Option<Vec<String>>> {
        let job_id = job_id.to_string();
        let file_path = file_path.to_string();
        let source_hash = source_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let row: Option<(String, String)> = conn
                    .query_row(
                        "SELECT source_hash, translated_text FROM translated_batches
                         WHERE job_id = ?1 AND file_path = ?2 AND batch_index = ?3",
                        params![job_id, file_path, batch_index as i64],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;

                let Some((stored_hash, payload)) = row else {
                    return Ok(None);
                };

                if stored_hash != source_hash {
                    debug!(
                        "Checkpoint for batch {} of {} is stale, ignoring",
                        batch_index, file_path
                    );
                    return Ok(None);
                }

                let texts: Vec<String> = serde_json::from_str(&payload).with_context(|| {
                    format!("Corrupt checkpoint payload for batch {}", batch_index)
                })?;

                Ok(Some(texts))
            })
            .await
    }

    /// Record a completed batch, replacing any previous row
    pub async fn record_batch(
        &self,
        job_id: &str,
        file_path: &str,
        batch_index: usize,
        source_hash: &str,
        texts: &[String],
    ) -> Result<()> {
        let job_id = job_id.to_string();
        let file_path = file_path.to_string();
        let source_hash = source_hash.to_string();
        let payload = serde_json::to_string(texts).context("Failed to serialize batch payload")?;

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO translated_batches
                     (job_id, file_path, batch_index, source_hash, translated_text, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
                    params![job_id, file_path, batch_index as i64, source_hash, payload],
                )?;
                Ok(())
            })
            .await
    }

    /// Number of completed batches recorded for a job
    pub async fn completed_count(&self, job_id: &str) -> Result<usize> {
        let job_id = job_id.to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM translated_batches WHERE job_id = ?1",
                    params![job_id],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
    }

    /// All completed batches for a job: (file_path, batch_index, texts)
    pub async fn completed_for_job(
        &self,
        job_id: &str,
    ) -> Result<Vec<(String, usize, Vec<String>)>> {
        let job_id = job_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT file_path, batch_index, translated_text FROM translated_batches
                     WHERE job_id = ?1 ORDER BY file_path, batch_index",
                )?;

                let rows = stmt.query_map(params![job_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut result = Vec::new();
                for row in rows {
                    let (file_path, batch_index, payload) = row?;
                    let texts: Vec<String> = serde_json::from_str(&payload).with_context(|| {
                        format!("Corrupt checkpoint payload for batch {}", batch_index)
                    })?;
                    result.push((file_path, batch_index as usize, texts));
                }

                Ok(result)
            })
            .await
    }

    /// Most recently touched job id with the given prefix, if any.
    ///
    /// Job ids embed a timestamp, so a crashed run is resumed by looking up
    /// the latest job for its `{mod}-{lang}-` prefix instead of minting a
    /// fresh id.
    pub async fn latest_job_with_prefix(&self, prefix: &str) -> Result<Option<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));

        self.db
            .execute_async(move |conn| {
                let job_id: Option<String> = conn
                    .query_row(
                        "SELECT job_id FROM translated_batches
                         WHERE job_id LIKE ?1 ESCAPE '\\'
                         ORDER BY created_at DESC LIMIT 1",
                        params![pattern],
                        |row| row.get(0),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;
                Ok(job_id)
            })
            .await
    }

    /// Drop all checkpoint rows for a job.
    ///
    /// Called after a fully successful run; a failed run keeps its partition
    /// so the next invocation can resume.
    pub async fn cleanup_job(&self, job_id: &str) -> Result<()> {
        let job_id = job_id.to_string();

        self.db
            .execute_async(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM translated_batches WHERE job_id = ?1",
                    params![job_id],
                )?;
                info!("Removed {} checkpoint row(s) for job {}", removed, job_id);
                Ok(())
            })
            .await
    }
}
