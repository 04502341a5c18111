//! Daily tracker commands for CLI.

use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use habitroom_core::tracker::{
    build_grid, date_range, ChallengeKind, Entry, GoalDirection, TrackerChallenge, TrackerGrid,
    ViewMode,
};
use habitroom_core::validation::validate_entry_value;
use habitroom_core::{Config, CoreError, Database};

#[derive(Subcommand)]
pub enum TrackerAction {
    /// Add a tracker challenge
    Add {
        /// Tracker challenge ID
        id: String,
        /// Title shown in the grid
        title: String,
        /// BOOLEAN, NUMERIC or DURATION
        #[arg(long)]
        kind: ChallengeKind,
        /// Goal value (minutes for DURATION)
        #[arg(long)]
        goal: Option<f64>,
        /// minimize or maximize (default: maximize)
        #[arg(long, requires = "goal")]
        direction: Option<GoalDirection>,
    },
    /// Record today's (or another day's) value
    Log {
        /// Tracker challenge ID
        id: String,
        /// Value: 0/1 for BOOLEAN, minutes for DURATION
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the tracker grid
    Grid {
        /// daily, weekly or monthly (default: tracker.default_view from config)
        #[arg(long)]
        view: Option<ViewMode>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn print_grid(grid: &TrackerGrid) {
    let header: Vec<String> = grid.dates.iter().map(|d| d.format("%m-%d").to_string()).collect();
    println!("{:<24} {}", "", header.join("  "));
    for row in &grid.rows {
        let cells: Vec<String> = row.cells.iter().map(|c| format!("{:^5}", c.display)).collect();
        println!("{:<24} {}", row.title, cells.join(" "));
    }
    match grid.stats.success_rate {
        Some(rate) => println!("\nSuccess rate: {rate:.0}%"),
        None => println!("\nSuccess rate: -"),
    }
    println!(
        "Best current streak: {}  Active challenges: {}",
        grid.stats.max_current_streak, grid.stats.active_challenges
    );
}

pub fn run(action: TrackerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let user_id = config.challenges.user_id.as_str();
    let db = Database::open()?;
    let today = Local::now().date_naive();

    match action {
        TrackerAction::Add {
            id,
            title,
            kind,
            goal,
            direction,
        } => {
            let mut challenge = TrackerChallenge::new(id, title, kind);
            if let Some(goal) = goal {
                validate_entry_value(kind, goal)?;
                challenge = challenge.with_goal(goal, direction.unwrap_or_default());
            }
            db.save_tracker_challenge(user_id, &challenge, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&challenge)?);
        }
        TrackerAction::Log {
            id,
            value,
            date,
            notes,
        } => {
            let challenge =
                db.get_tracker_challenge(user_id, &id)?
                    .ok_or_else(|| CoreError::NotFound {
                        kind: "tracker challenge",
                        id: id.clone(),
                    })?;
            validate_entry_value(challenge.kind, value)?;

            let date = date.unwrap_or(today);
            let entry = Entry { value, notes };
            let streaks = db.upsert_entry(user_id, &id, date, &entry, today, Utc::now())?;
            println!("Logged {} for {} on {}", value, challenge.title, date);
            if let Some(streaks) = streaks {
                println!(
                    "Current streak: {}  Best streak: {}",
                    streaks.current_streak, streaks.best_streak
                );
            }
        }
        TrackerAction::Grid { view, json } => {
            let view = view.unwrap_or(config.tracker.default_view);
            let dates = date_range(view, today);
            let (Some(&start), Some(&end)) = (dates.first(), dates.last()) else {
                return Ok(());
            };
            let entries = db.entries_between(user_id, start, end)?;
            let challenges = db.list_tracker_challenges(user_id)?;
            let grid = build_grid(view, today, &challenges, &entries);

            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print_grid(&grid);
            }
        }
    }
    Ok(())
}
