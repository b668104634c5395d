pub mod eligibility;
pub mod race_matrix;
pub mod results;
pub mod scheduling;
pub mod tally;

pub use eligibility::{EligibilityCriteria, eligible_players, is_eligible};
pub use race_matrix::RaceMatrix;
pub use results::{RankingOrder, calculate_ranks, standings, update_score, update_status};
pub use tally::{ClubMedalTally, medal_tally};
