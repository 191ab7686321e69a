pub mod leaderboard;
pub mod question_source;
pub mod storage;
