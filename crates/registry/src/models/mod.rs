pub mod age_group;
pub mod category;
pub mod club;
pub mod event;
pub mod player;
pub mod race;
pub mod race_matrix;
pub mod schedule;

pub use age_group::AgeGroup;
pub use category::SkateCategory;
pub use club::{Club, District, State};
pub use event::Event;
pub use player::{Gender, Player, PlayerId};
pub use race::{GenderEligibility, Race};
pub use race_matrix::{DEFAULT_MAX_RACES_PER_PLAYER, MatrixKey, RaceMatrixEntry};
pub use schedule::{
    MAX_SCORE, Medal, ParticipantStatus, ROUND_COUNT, RoundScores, SCORE_DECIMAL_PLACES, Schedule,
    ScheduledPlayer,
};
