mod leaderboard;
mod score;

pub use leaderboard::LeaderboardEntry;
pub use score::Score;
