#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
}

#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(err) => err,
        }
    };
}

#[macro_export]
macro_rules! require_db {
    () => {
        match common::store() {
            Some(store) => store,
            None => {
                println!("Skipping test - database not available");
                return;
            }
        }
    };
}

use clipstore::core::shared::utils::new_id;
use clipstore::project::NewProject;
use clipstore::{AppConfig, Store};
use std::sync::OnceLock;

static STORE: OnceLock<Option<Store>> = OnceLock::new();

/// Shared store for the integration tests, migrated once. `None` when no
/// database is configured or reachable, in which case tests skip.
pub fn store() -> Option<Store> {
    STORE
        .get_or_init(|| {
            let _ = env_logger::builder().is_test(true).try_init();
            dotenvy::dotenv().ok();
            let url = std::env::var("TEST_DATABASE_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .ok()?;
            let config = AppConfig::from_lookup(|key| match key {
                "DATABASE_URL" => Some(url.clone()),
                "DATABASE_POOL_SIZE" => Some("4".to_string()),
                "DATABASE_CONNECT_TIMEOUT_SECS" => Some("3".to_string()),
                _ => None,
            })
            .ok()?;
            match Store::connect(&config) {
                Ok(store) => Some(store),
                Err(e) => {
                    println!("Database unavailable: {e}");
                    None
                }
            }
        })
        .clone()
}

/// Creates a project with a unique title; deleting it cascades to every
/// row the test hangs off it.
pub fn project(store: &Store) -> clipstore::project::Project {
    let title = format!("test-{}", new_id());
    assert_ok!(store.with_client(|client| {
        client
            .project()
            .create(NewProject::new(title, "/media/test.mp4").with_duration_ms(60_000))
    }))
}

pub fn cleanup(store: &Store, project_id: &str) {
    let _ = store.with_client(|client| client.project().delete(project_id));
}
