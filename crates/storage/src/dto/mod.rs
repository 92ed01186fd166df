pub mod leaderboard;
pub mod score;
