/*!
 * Common test utilities for the modloc test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Re-export the mock providers module
pub mod mock_providers;

/// Route log output through env_logger for test debugging (RUST_LOG=debug)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample English localisation file content
pub fn sample_loc_content() -> &'static str {
    "l_english:\n # UI strings\n greeting:0 \"Hello there\"\n farewell:1 \"Goodbye for now\"\n\n title: \"Grand Admiral\"\n"
}

/// Creates a mod directory with a Stellaris-style localisation layout and
/// one English file. Returns the mod root.
pub fn create_test_mod(dir: &TempDir) -> Result<PathBuf> {
    let mod_root = dir.path().join("test_mod");
    let english = mod_root.join("localisation").join("english");
    fs::create_dir_all(&english)?;

    // Game files carry a UTF-8 BOM
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(sample_loc_content().as_bytes());
    fs::write(english.join("test_l_english.yml"), bytes)?;

    Ok(mod_root)
}
