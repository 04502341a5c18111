//! Challenge commands for CLI.

use chrono::Utc;
use clap::{ArgGroup, Subcommand};
use habitroom_core::validation::{
    validate_challenge_quota, validate_draft, validate_reset_amount, validate_reset_context,
};
use habitroom_core::{
    archive, custom_reset, full_reset_with_log, recompute, smart_display, Challenge,
    ChallengeDraft, Config, Database, Mood, ResetContext, ResetWrite, TimeUnit,
};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Create a new challenge starting now
    Create {
        /// Challenge name
        name: String,
        /// Time unit (seconds, minutes, hours, days, weeks, months)
        #[arg(long)]
        unit: Option<TimeUnit>,
        /// Units removed by a custom reset
        #[arg(long)]
        amount: Option<i64>,
        /// Owner (default: challenges.user_id from config)
        #[arg(long)]
        user: Option<String>,
    },
    /// List challenges with freshly computed values
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        #[arg(long)]
        user: Option<String>,
    },
    /// Show one challenge
    Show {
        /// Challenge ID
        id: Uuid,
    },
    /// Edit name, unit or reset amount
    Edit {
        /// Challenge ID
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        unit: Option<TimeUnit>,
        #[arg(long)]
        amount: Option<i64>,
    },
    /// Reset a challenge
    #[command(group(ArgGroup::new("mode").required(true).args(["full", "custom"])))]
    Reset {
        /// Challenge ID
        id: Uuid,
        /// Restart from zero
        #[arg(long)]
        full: bool,
        /// Remove the custom reset amount from the elapsed value
        #[arg(long)]
        custom: bool,
        /// One-off amount for this custom reset
        #[arg(long, requires = "custom")]
        amount: Option<i64>,
        /// Why the reset happened
        #[arg(long, default_value = "No reason given")]
        reason: String,
        /// Mood from 1 (worst) to 5 (best)
        #[arg(long, default_value_t = 3)]
        mood: u8,
        /// Operation ID; repeating a reset with the same ID records it once
        #[arg(long = "op-id")]
        op_id: Option<Uuid>,
    },
    /// Delete a challenge, keeping a snapshot and its history
    Delete {
        /// Challenge ID
        id: Uuid,
    },
    /// List deleted challenges
    Deleted {
        #[arg(long)]
        user: Option<String>,
    },
    /// Reset history of a challenge
    History {
        /// Challenge ID
        id: Uuid,
    },
    /// Record breaks of a challenge
    Records {
        /// Challenge ID
        id: Uuid,
    },
}

fn refresh(db: &Database, challenge: &Challenge) -> Result<Challenge, Box<dyn std::error::Error>> {
    let refreshed = recompute(challenge, Utc::now());
    if refreshed.record_broken {
        tracing::info!(
            challenge_id = %challenge.id,
            best_streak = refreshed.challenge.best_streak,
            "new best streak"
        );
    }
    db.save_challenge(&refreshed.challenge)?;
    Ok(refreshed.challenge)
}

fn print_row(challenge: &Challenge) {
    println!(
        "{}  {:<24} {:>24}  streak {} (best {})",
        challenge.id,
        challenge.name,
        smart_display(challenge.current_value, challenge.time_unit),
        challenge.current_streak,
        challenge.best_streak,
    );
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;

    match action {
        ChallengeAction::Create {
            name,
            unit,
            amount,
            user,
        } => {
            let user_id = user.unwrap_or(config.challenges.user_id);
            let draft = ChallengeDraft {
                name,
                time_unit: unit.unwrap_or(config.challenges.time_unit),
                custom_reset_amount: amount.unwrap_or(config.challenges.reset_amount),
            };
            validate_draft(&draft)?;
            validate_challenge_quota(db.count_challenges(&user_id)?)?;

            let challenge = Challenge::new(user_id, draft, Utc::now());
            db.save_challenge(&challenge)?;
            println!("Challenge created: {}", challenge.id);
            println!("{}", serde_json::to_string_pretty(&challenge)?);
        }
        ChallengeAction::List { json, user } => {
            let user_id = user.unwrap_or(config.challenges.user_id);
            let challenges = db
                .list_challenges(&user_id)?
                .iter()
                .map(|c| refresh(&db, c))
                .collect::<Result<Vec<_>, _>>()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&challenges)?);
            } else if challenges.is_empty() {
                println!("No challenges yet.");
            } else {
                challenges.iter().for_each(print_row);
            }
        }
        ChallengeAction::Show { id } => {
            let challenge = refresh(&db, &db.require_challenge(id)?)?;
            println!("{}", serde_json::to_string_pretty(&challenge)?);
        }
        ChallengeAction::Edit {
            id,
            name,
            unit,
            amount,
        } => {
            let challenge = db.require_challenge(id)?;
            let current = challenge.draft();
            let draft = ChallengeDraft {
                name: name.unwrap_or(current.name),
                time_unit: unit.unwrap_or(current.time_unit),
                custom_reset_amount: amount.unwrap_or(current.custom_reset_amount),
            };
            validate_draft(&draft)?;

            let edited = challenge.with_draft(draft, Utc::now());
            db.save_challenge(&edited)?;
            println!("{}", serde_json::to_string_pretty(&edited)?);
        }
        ChallengeAction::Reset {
            id,
            full,
            custom: _,
            amount,
            reason,
            mood,
            op_id,
        } => {
            let mut context = ResetContext::new(reason, Mood::new(mood)?);
            if let Some(op_id) = op_id {
                context = context.with_operation_id(op_id);
            }
            validate_reset_context(&context)?;

            let challenge = db.require_challenge(id)?;
            let now = Utc::now();

            let recorded = if full {
                let outcome = full_reset_with_log(&challenge, now, &context);
                let recorded = db.apply_reset(ResetWrite {
                    challenge: &outcome.challenge,
                    reset_log: &outcome.reset_log,
                    record_break: None,
                })?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                recorded
            } else {
                let basis = match amount {
                    Some(amount) => {
                        validate_reset_amount(amount)?;
                        challenge.with_reset_amount(amount)
                    }
                    None => challenge.clone(),
                };
                let outcome = custom_reset(&basis, now, &context);
                // A one-off amount does not replace the stored one.
                let updated = Challenge {
                    custom_reset_amount: challenge.custom_reset_amount,
                    ..outcome.challenge.clone()
                };
                let recorded = db.apply_reset(ResetWrite {
                    challenge: &updated,
                    reset_log: &outcome.reset_log,
                    record_break: outcome.record_break.as_ref(),
                })?;
                if let Some(record) = &outcome.record_break {
                    println!(
                        "New record: {} -> {} (+{})",
                        record.old_record, record.new_record, record.improvement
                    );
                }
                println!("{}", serde_json::to_string_pretty(&updated)?);
                recorded
            };

            if !recorded {
                println!("Reset {} was already recorded.", context.operation_id);
            }
        }
        ChallengeAction::Delete { id } => {
            let challenge = db.require_challenge(id)?;
            let deleted = archive(&challenge, Utc::now());
            db.delete_challenge(&deleted)?;
            println!(
                "Challenge deleted: {} (final value {})",
                id,
                smart_display(deleted.final_value, challenge.time_unit)
            );
        }
        ChallengeAction::Deleted { user } => {
            let user_id = user.unwrap_or(config.challenges.user_id);
            let deleted = db.list_deleted_challenges(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&deleted)?);
        }
        ChallengeAction::History { id } => {
            println!("{}", serde_json::to_string_pretty(&db.reset_logs(id)?)?);
        }
        ChallengeAction::Records { id } => {
            println!("{}", serde_json::to_string_pretty(&db.record_breaks(id)?)?);
        }
    }
    Ok(())
}
