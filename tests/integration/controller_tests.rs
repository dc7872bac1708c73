/*!
 * Controller-level runs against a stand-in CLI provider (`cat`). The tool
 * echoes every prompt back, so batches fall back to their source texts and
 * the whole file pipeline runs without any network.
 */

use std::fs;
use std::path::Path;

use crate::common;
use modloc::app_config::{Config, TranslationProvider};
use modloc::Controller;

fn cat_config(db_path: &Path) -> Config {
    let mut config = Config::default();
    config.target_languages = vec!["pl".to_string()];
    config.translation.provider = TranslationProvider::CliTool;
    if let Some(p) = config
        .translation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "clitool")
    {
        p.endpoint = "cat".to_string();
    }
    config.translation.common.max_retries = 0;
    config.translation.common.retry_backoff_secs = 0;
    config.checkpoint_db = Some(db_path.to_string_lossy().to_string());
    config
}

#[tokio::test]
async fn test_run_withScriptedLoc_shouldWriteTargetTwin() {
    let dir = common::create_temp_dir().unwrap();
    let mod_root = common::create_test_mod(&dir).unwrap();

    let cust = mod_root.join("customizable_localization");
    fs::create_dir_all(&cust).unwrap();
    fs::write(
        cust.join("names.txt"),
        "some_loc = {\n\tadd_custom_loc = \"Hello there\"\n}\n",
    )
    .unwrap();

    let db = dir.path().join("checkpoints.sqlite");
    let controller = Controller::with_config(cat_config(&db)).unwrap();
    let summaries = controller.run(mod_root.clone(), false).await.unwrap();

    assert_eq!(summaries.len(), 1);
    // One yml, one scripted txt
    assert_eq!(summaries[0].files_written, 2);
    assert_eq!(summaries[0].files_failed, 0);

    assert!(mod_root
        .join("localisation/polish/test_l_polish.yml")
        .is_file());

    let out = cust.join("polish").join("names.txt");
    let text = fs::read_to_string(&out).unwrap();
    // Echoed prompts mean fallback output: the source text survives
    assert!(text.contains("add_custom_loc = \"Hello there\""));
    // Scripted files never get a language header
    assert!(!text.contains("l_polish"));
}

#[tokio::test]
async fn test_run_withOneUnwritableFile_shouldFinishRemainingFiles() {
    let dir = common::create_temp_dir().unwrap();
    let mod_root = common::create_test_mod(&dir).unwrap();

    let english = mod_root.join("localisation").join("english");
    fs::write(
        english.join("extra_l_english.yml"),
        "l_english:\n other:0 \"More text\"\n",
    )
    .unwrap();

    // A directory squatting on the output path makes the write fail
    let blocked = mod_root
        .join("localisation")
        .join("polish")
        .join("extra_l_polish.yml");
    fs::create_dir_all(&blocked).unwrap();

    let db = dir.path().join("checkpoints.sqlite");
    let controller = Controller::with_config(cat_config(&db)).unwrap();
    let summaries = controller.run(mod_root.clone(), true).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].files_failed, 1);
    assert_eq!(summaries[0].files_written, 1);
    assert!(mod_root
        .join("localisation/polish/test_l_polish.yml")
        .is_file());
}
