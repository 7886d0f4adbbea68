//! Integration tests for env-file loading
//!
//! Loading mutates the process environment, so everything runs in one test.

use core_runtime::config::load_dotenv_from;
use core_runtime::{AppConfig, DatabaseBackend, Error};
use std::fs;

#[test]
fn test_env_file_fills_missing_settings() {
    let path = std::env::temp_dir().join(format!("dropbox-catalog-{}.env", std::process::id()));
    fs::write(
        &path,
        "# catalog settings\n\
         DROPBOX_ACCESS_TOKEN=file-token\n\
         DB_HOST=db.internal\n\
         DB_PORT=6543\n\
         DB_NAME=catalog\n\
         DB_USER=sync\n\
         DB_PASSWORD=\"s3cret\"\n\
         DB_BACKEND=sqlite\n",
    )
    .unwrap();

    // Already-exported variables win over the file
    std::env::set_var("DB_HOST", "db.from-env");

    let loaded = load_dotenv_from(&path);
    fs::remove_file(&path).unwrap();
    loaded.unwrap();

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.dropbox.access_token, "file-token");
    assert_eq!(config.database.host, "db.from-env");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.database.password, "s3cret");
    assert_eq!(config.database.backend, DatabaseBackend::Sqlite);

    let missing = load_dotenv_from(&path);
    assert!(matches!(missing, Err(Error::Config(_))));
}
