mod engine;
mod ledger;
mod model;

pub use engine::{
    archive, custom_reset, full_reset, full_reset_with_log, recompute, CustomResetOutcome,
    FullResetOutcome, Recomputed,
};
pub use ledger::{ChallengeRecordBreak, ChallengeResetLog};
pub use model::{Challenge, ChallengeDraft, DeletedChallenge, Mood, ResetContext};
