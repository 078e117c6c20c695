use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use reading_core::{
    milestone_message,
    plan::{plan_entry_for_day, TOTAL_DAYS},
    progress::DayStatus,
    reminder::{parse_reminder_time, ReminderSettings},
};
use reading_service::{
    leaderboard::{Leaderboard, DEFAULT_ACTIVITY_LIMIT, DEFAULT_REFRESH_INTERVAL_SECS},
    notifications::{NotificationKind, NotificationRequest, NotificationSink},
    JsonFileStore, ReadingService,
};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_path: PathBuf,
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) leaderboard_refresh_secs: i64,
    pub(crate) activity_limit: usize,
    pub(crate) reminder: ReminderSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("READING_DATA_PATH") {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path);
            }
        }
        if let Ok(user_id) = std::env::var("READING_USER_ID") {
            if !user_id.trim().is_empty() {
                config.user_id = user_id.trim().to_string();
            }
        }
        if let Ok(name) = std::env::var("READING_DISPLAY_NAME") {
            if !name.trim().is_empty() {
                config.display_name = name.trim().to_string();
            }
        }
        if let Ok(refresh) = std::env::var("READING_LEADERBOARD_REFRESH_SECS") {
            if let Ok(value) = refresh.trim().parse::<i64>() {
                if value > 0 {
                    config.leaderboard_refresh_secs = value;
                }
            }
        }
        if let Ok(limit) = std::env::var("READING_ACTIVITY_LIMIT") {
            if let Ok(value) = limit.trim().parse::<usize>() {
                config.activity_limit = value;
            }
        }
        if let Ok(time) = std::env::var("READING_REMINDER_TIME") {
            match parse_reminder_time(&time) {
                Ok(parsed) => config.reminder.time = parsed,
                Err(err) => tracing::warn!(%err, "ignoring reminder time"),
            }
        }
        if let Ok(enabled) = std::env::var("READING_REMINDER_ENABLED") {
            config.reminder.enabled = parse_flag(&enabled);
        }
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_user(mut self, user_id: &str, display_name: &str) -> Self {
        self.user_id = user_id.to_string();
        self.display_name = display_name.to_string();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("reading-data.json"),
            user_id: "local".to_string(),
            display_name: "Reader".to_string(),
            leaderboard_refresh_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
            reminder: ReminderSettings::default(),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[derive(Debug, Parser)]
#[command(name = "reading", about = "Track a 90-day Bible reading plan")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Progress, streak and the next reading.
    Status,
    /// Show the plan, or a single day of it.
    Plan { day: Option<u32> },
    /// Record a day as read.
    Save {
        day: u32,
        passage: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Backfill date (YYYY-MM-DD); defaults to now.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rewrite an existing reading.
    Edit {
        day: u32,
        passage: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete { day: u32 },
    /// Days already scheduled that have no reading yet.
    Missed,
    Calendar,
    Leaderboard,
    /// Schedule the daily reminder at HH:MM, or cancel it with --off.
    Reminder {
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        off: bool,
    },
}

/// Reports notifications through the log; a desktop adapter would post them instead.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn schedule(&self, notification: NotificationRequest) {
        info!(
            kind = ?notification.kind,
            at = %notification.scheduled_for,
            title = %notification.title,
            body = %notification.body,
            "notification scheduled"
        );
    }

    fn cancel(&self, kind: NotificationKind) {
        info!(?kind, "notification cancelled");
    }
}

pub fn run(config: AppConfig, command: Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&config, command, &mut out)
}

pub fn execute(config: &AppConfig, command: Command, out: &mut impl Write) -> Result<()> {
    let store = Arc::new(
        JsonFileStore::open(&config.data_path)
            .with_context(|| format!("unable to open {}", config.data_path.display()))?,
    );
    let service = ReadingService::builder()
        .user(config.user_id.clone(), config.display_name.clone())
        .store(store.clone())
        .with_notification_sink(Arc::new(LogNotificationSink))
        .build()?;

    match command {
        Command::Status => {
            let state = service.derived_state();
            writeln!(
                out,
                "Day {} of {} | {} completed ({:.0}%) | streak {}",
                state.current_day,
                TOTAL_DAYS,
                state.completed_count,
                state.progress_percentage(),
                state.current_streak
            )?;
            if let Some(plan) = service.current_plan_entry() {
                writeln!(out, "Next: {} ({})", plan.passage, plan.reading_url)?;
            }
            writeln!(out, "{}", milestone_message(state.completed_count))?;
        }
        Command::Plan { day: Some(day) } => match plan_entry_for_day(day) {
            Some(plan) => writeln!(
                out,
                "Day {}: {} on {} {}",
                plan.day,
                plan.passage,
                plan.scheduled_date_string(),
                plan.reading_url
            )?,
            None => writeln!(out, "Day {day} is not part of the plan")?,
        },
        Command::Plan { day: None } => {
            for plan in service.plan() {
                writeln!(
                    out,
                    "{:>2} {} {}",
                    plan.day,
                    plan.scheduled_date_string(),
                    plan.passage
                )?;
            }
        }
        Command::Save {
            day,
            passage,
            notes,
            date,
        } => {
            let recorded_at = date.map(|date| date.and_time(service.now().time()).and_utc());
            let state = service.save(day, &passage, &notes, recorded_at)?;
            writeln!(
                out,
                "Saved day {day}. {} completed, streak {}, next day {}",
                state.completed_count, state.current_streak, state.current_day
            )?;
        }
        Command::Edit {
            day,
            passage,
            notes,
        } => {
            let state = service.edit(day, &passage, &notes)?;
            writeln!(out, "Updated day {day}. {} completed", state.completed_count)?;
        }
        Command::Delete { day } => {
            let state = service.delete(day)?;
            writeln!(
                out,
                "Deleted day {day}. {} completed, next day {}",
                state.completed_count, state.current_day
            )?;
        }
        Command::Missed => {
            let missed = service.missed_days();
            if missed.is_empty() {
                writeln!(out, "All caught up")?;
            }
            for plan in missed {
                writeln!(
                    out,
                    "Day {} ({}): {}",
                    plan.day,
                    plan.scheduled_date_string(),
                    plan.passage
                )?;
            }
        }
        Command::Calendar => {
            let row: String = service
                .calendar()
                .iter()
                .map(|cell| match cell.status {
                    DayStatus::Completed => '#',
                    DayStatus::Current => '>',
                    DayStatus::Missed => '!',
                    DayStatus::Upcoming => '.',
                })
                .collect();
            for (week, chunk) in row.as_bytes().chunks(7).enumerate() {
                writeln!(out, "W{:>2} {}", week + 1, String::from_utf8_lossy(chunk))?;
            }
        }
        Command::Leaderboard => {
            let mut board = Leaderboard::new(
                Duration::seconds(config.leaderboard_refresh_secs),
                config.activity_limit,
            );
            board.refresh(store.as_ref(), service.now())?;
            for (index, participant) in board.participants().iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {} {} days, streak {}",
                    index + 1,
                    participant.identity,
                    participant.completed_count,
                    participant.current_streak
                )?;
            }
            let stats = board.stats(&config.display_name, &service.derived_state());
            if let Some(rank) = stats.rank {
                writeln!(out, "You are #{rank} of {}", stats.total_participants)?;
            }
            writeln!(out, "Group total: {} days", board.total_group_days())?;
            for activity in board.activities() {
                writeln!(
                    out,
                    "{} read day {} ({})",
                    activity.identity, activity.day, activity.passage
                )?;
            }
        }
        Command::Reminder { at, off } => {
            let mut settings = config.reminder;
            if let Some(time) = at {
                settings = ReminderSettings::at(&time)?;
            }
            if off {
                settings.enabled = false;
            }
            match service.schedule_reminder(&settings) {
                Some(request) => writeln!(out, "Reminder set for {}", request.scheduled_for)?,
                None => writeln!(out, "Reminder disabled")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_to_string(config: &AppConfig, command: Command) -> String {
        let mut buffer = Vec::new();
        execute(config, command, &mut buffer).expect("command succeeds");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn flag_parsing_accepts_common_truthy_values() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn cli_parses_backfill_save() {
        let cli = Cli::try_parse_from([
            "reading",
            "save",
            "3",
            "Hebrews 1-6",
            "--notes",
            "faith",
            "--date",
            "2026-01-03",
        ])
        .expect("parse");
        match cli.command {
            Command::Save { day, date, notes, .. } => {
                assert_eq!(day, 3);
                assert_eq!(notes, "faith");
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn save_and_status_share_the_data_file() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default()
            .with_data_path(temp.path().join("readings.json"))
            .with_user("uid-1", "Ana");

        let saved = run_to_string(
            &config,
            Command::Save {
                day: 1,
                passage: "Romans 1-8".into(),
                notes: String::new(),
                date: None,
            },
        );
        assert!(saved.contains("Saved day 1. 1 completed"));

        let status = run_to_string(&config, Command::Status);
        assert!(status.starts_with("Day 2 of 90 | 1 completed"));
        assert!(status.contains("Romans 9-16"));

        let board = run_to_string(&config, Command::Leaderboard);
        assert!(board.contains("1. Ana 1 days"));
        assert!(board.contains("You are #1 of 1"));
    }

    #[test]
    fn invalid_day_surfaces_validation_error() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default().with_data_path(temp.path().join("readings.json"));
        let mut buffer = Vec::new();
        let err = execute(
            &config,
            Command::Save {
                day: 95,
                passage: "Extra".into(),
                notes: String::new(),
                date: None,
            },
            &mut buffer,
        )
        .unwrap_err();
        assert!(err.to_string().contains("outside the reading plan"));
        assert!(!temp.path().join("readings.json").exists());
    }

    #[test]
    fn plan_lookup_reports_out_of_range_day() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default().with_data_path(temp.path().join("readings.json"));
        let output = run_to_string(&config, Command::Plan { day: Some(0) });
        assert_eq!(output.trim(), "Day 0 is not part of the plan");
        let first = run_to_string(&config, Command::Plan { day: Some(1) });
        assert!(first.contains("Romans 1-8 on 2026-01-01"));
    }
}
