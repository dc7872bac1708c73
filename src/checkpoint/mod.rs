/*!
 * Durable translation progress.
 *
 * - `connection`: SQLite connection wrapper with async-safe access
 * - `store`: completed-batch checkpointing keyed by job, file and batch
 */

pub mod connection;
pub mod store;

pub use connection::DatabaseConnection;
pub use store::CheckpointStore;
