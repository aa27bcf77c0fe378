//! Integration tests for the persisted preference store
//!
//! These tests verify that a preference written by one store instance is
//! visible to a fresh instance opened on the same file, as happens across
//! process restarts.

use common::preferences::{FilePreferenceStore, PreferenceStore, USER_OPTIMIZE_KEY, get_or};
use tokio_test::assert_ok;

/// A value written before "restart" is read back by a new store
#[tokio::test]
async fn test_preference_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("prefs.json");

    {
        let store = FilePreferenceStore::new(&path);
        assert_ok!(store.set_bool(USER_OPTIMIZE_KEY, true).await);
    }

    let reopened = FilePreferenceStore::new(&path);
    assert_eq!(reopened.get_bool(USER_OPTIMIZE_KEY).await?, Some(true));
    assert!(get_or(&reopened, USER_OPTIMIZE_KEY, false).await?);

    // Overwrite and reopen again
    assert_ok!(reopened.set_bool(USER_OPTIMIZE_KEY, false).await);
    let third = FilePreferenceStore::new(&path);
    assert_eq!(third.get_bool(USER_OPTIMIZE_KEY).await?, Some(false));

    Ok(())
}

/// Concurrent writers in one process leave a readable file behind
#[tokio::test]
async fn test_concurrent_writes_last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = std::sync::Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json")));

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.set_bool(USER_OPTIMIZE_KEY, i % 2 == 0).await
        }));
    }
    for handle in handles {
        assert_ok!(handle.await?);
    }

    let value = store.get_bool(USER_OPTIMIZE_KEY).await?;
    assert!(value.is_some(), "file must hold a boolean after concurrent writes");

    Ok(())
}
