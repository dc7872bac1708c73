use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::game_profile::{LanguageSpec, LANGUAGES};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Find a mod's localisation files for a source language.
    ///
    /// Walks `loc_dir` and returns every `.yml` whose filename carries the
    /// source language marker (`_l_english` for English), relative to
    /// `loc_dir`, sorted for deterministic scheduling.
    pub fn find_loc_files(loc_dir: &Path, source: &LanguageSpec) -> Result<Vec<PathBuf>> {
        let marker = format!("_l_{}", source.folder_name);
        let mut result = Vec::new();

        for entry in WalkDir::new(loc_dir).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let is_yml = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("yml"));
            if !is_yml {
                continue;
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if !stem.ends_with(&marker) {
                continue;
            }

            let rel = path
                .strip_prefix(loc_dir)
                .unwrap_or(path)
                .to_path_buf();
            result.push(rel);
        }

        result.sort();
        Ok(result)
    }

    /// Find a mod's scripted-localisation files.
    ///
    /// Walks a `customizable_localization` directory and returns every
    /// `.txt` relative to it, sorted. Files under a per-language subfolder
    /// are translated outputs of an earlier run, not sources, and are
    /// skipped.
    pub fn find_scripted_loc_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let is_txt = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("txt"));
            if !is_txt {
                continue;
            }

            let rel = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .to_path_buf();

            let under_language_folder = rel.components().any(|c| {
                let part = c.as_os_str().to_string_lossy();
                LANGUAGES.iter().any(|l| l.folder_name == part)
            });
            if under_language_folder {
                continue;
            }

            result.push(rel);
        }

        result.sort();
        Ok(result)
    }

    /// Map a source-language relative path to its target-language twin.
    ///
    /// Both the per-language folder component and the filename marker are
    /// rewritten: `english/ui_l_english.yml` becomes
    /// `simp_chinese/ui_l_simp_chinese.yml`.
    pub fn target_rel_path(
        rel: &Path,
        source: &LanguageSpec,
        target: &LanguageSpec,
    ) -> PathBuf {
        let mut out = PathBuf::new();

        for component in rel.components() {
            let part = component.as_os_str().to_string_lossy();
            if part == source.folder_name {
                out.push(target.folder_name);
            } else {
                let source_marker = format!("_l_{}", source.folder_name);
                let target_marker = format!("_l_{}", target.folder_name);
                out.push(part.replace(&source_marker, &target_marker));
            }
        }

        out
    }

    /// Write raw bytes to a file, creating parent directories as needed
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }
}
