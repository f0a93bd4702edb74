use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

use clipstore::core::shared::utils::redact_database_url;
use clipstore::preferences::{SettingsFindMany, SettingsOrderBy};
use clipstore::{AppConfig, OrderBy, Store};

fn print_usage() {
    println!("Usage: clipstore <command>");
    println!();
    println!("Commands:");
    println!("  migrate                    Apply pending migrations");
    println!("  status                     Show migrations, row counts and job states");
    println!("  settings list              List all settings");
    println!("  settings get <key>         Print one setting");
    println!("  settings set <key> <value> Create or overwrite a setting");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || matches!(args[1].as_str(), "--help" | "-h" | "help") {
        print_usage();
        return Ok(());
    }

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    // `migrate` reports what it applied, so it does not migrate on connect.
    if args[1] == "migrate" {
        config.run_migrations = false;
    }
    let store = Store::connect(&config).with_context(|| {
        format!(
            "Failed to connect to {}",
            redact_database_url(&config.database.url)
        )
    })?;

    match args[1].as_str() {
        "migrate" => {
            let applied = store.migrate()?;
            if applied.is_empty() {
                println!("Database is up to date");
            }
            for version in applied {
                println!("✓ Applied {version}");
            }
        }
        "status" => status(&store).await?,
        "settings" => settings(&store, &args[2..])?,
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
    Ok(())
}

async fn status(store: &Store) -> Result<()> {
    let pending = store.pending_migrations()?;
    if pending.is_empty() {
        println!("Migrations: up to date");
    } else {
        println!("Migrations: {} pending", pending.len());
        for name in pending {
            println!("  - {name}");
        }
    }

    let (counts, jobs) = store
        .interact(|client| {
            let counts = vec![
                ("Project", client.project().count(&Default::default())?),
                ("Transcript", client.transcript().count(&Default::default())?),
                ("ClipCandidate", client.clip_candidate().count(&Default::default())?),
                ("Clip", client.clip().count(&Default::default())?),
                ("Asset", client.asset().count(&Default::default())?),
                ("Analytics", client.analytics().count(&Default::default())?),
                ("Job", client.job().count(&Default::default())?),
                ("ClipProfile", client.clip_profile().count(&Default::default())?),
                ("ThemePreset", client.theme_preset().count(&Default::default())?),
                ("Settings", client.settings().count(&Default::default())?),
                ("AutopilotConfig", client.autopilot_config().count(&Default::default())?),
            ];
            let jobs = client.job().group_by_status(&Default::default())?;
            Ok((counts, jobs))
        })
        .await?;

    println!("Rows:");
    for (model, count) in counts {
        println!("  {model:<16} {count}");
    }
    if !jobs.is_empty() {
        println!("Jobs:");
        for group in jobs {
            println!("  {:<16} {}", group.key, group.count);
        }
    }
    Ok(())
}

fn settings(store: &Store, args: &[String]) -> Result<()> {
    match args {
        [cmd] if cmd == "list" => {
            let rows = store.with_client(|client| {
                client
                    .settings()
                    .find_many(&SettingsFindMany::new().order_by(OrderBy::asc(SettingsOrderBy::Key)))
            })?;
            for row in rows {
                println!("{}={}", row.key, row.value);
            }
        }
        [cmd, key] if cmd == "get" => {
            match store.with_client(|client| client.settings().get_value(key))? {
                Some(value) => println!("{value}"),
                None => bail!("Setting '{key}' not found"),
            }
        }
        [cmd, key, value] if cmd == "set" => {
            store.with_client(|client| client.settings().set_value(key, value))?;
            println!("✓ {key}={value}");
        }
        _ => bail!("Usage: clipstore settings <list|get <key>|set <key> <value>>"),
    }
    Ok(())
}
