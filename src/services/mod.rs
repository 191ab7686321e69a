/// Chat and event log access.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Core game operations: registration, bidding, answering, hints.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Leaderboard submission and reading.
pub mod leaderboard_service;
