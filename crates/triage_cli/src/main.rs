//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `triage_core` linkage and store bootstrap from a shell.
//! - Print a deterministic lane and goal summary for one store file.
//!
//! Usage: `triage_cli [store-path]`; without an argument the path comes from
//! `TRIAGE_DB_PATH` or the default.

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use triage_core::insights::{daily_goal_progress, weekly_completions};
use triage_core::{
    db, init_from_config, BackupService, CoreConfig, SqliteBackupRepository,
    SqliteStateRepository, TaskService, TaskStatus,
};

fn main() -> ExitCode {
    println!("triage_core ping={}", triage_core::ping());
    println!("triage_core version={}", triage_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.db_path = path.into();
    }
    init_from_config(&config).map_err(|err| err.to_string())?;

    let now = epoch_ms_now();
    let conn = db::open_db(&config.db_path).map_err(|err| err.to_string())?;
    let service = TaskService::load(SqliteStateRepository::new(&conn), now)
        .map_err(|err| err.to_string())?
        .with_utc_offset(config.utc_offset);
    let backups = BackupService::new(SqliteBackupRepository::new(&conn), config.backup);
    let backup_id = backups
        .auto_backup_if_needed(now)
        .map_err(|err| err.to_string())?;

    println!("store={}", config.db_path.display());
    for status in TaskStatus::ALL {
        println!("lane.{}={}", status.as_str(), service.tasks().count(status));
    }
    match service.tasks().active() {
        Some(task) => println!("active={}", task.title),
        None => println!("active=<none>"),
    }
    let progress =
        daily_goal_progress(service.tasks(), service.settings(), now, config.utc_offset);
    println!("goal.today={}/{}", progress.done_today, progress.goal);
    let week: Vec<String> = weekly_completions(service.tasks(), now, config.utc_offset)
        .iter()
        .map(|day| day.count.to_string())
        .collect();
    println!("done.week={}", week.join(","));
    if let Some(id) = backup_id {
        println!("backup={id}");
    }
    log::info!("event=cli_probe module=cli status=ok task_count={}", service.tasks().len());
    Ok(())
}

fn epoch_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
