use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::register,
        crate::routes::game::heartbeat,
        crate::routes::game::state_snapshot,
        crate::routes::game::list_question_sets,
        crate::routes::game::select_question_set,
        crate::routes::game::place_bid,
        crate::routes::game::finish_bidding,
        crate::routes::game::submit_answer,
        crate::routes::game::buy_hint,
        crate::routes::game::advance,
        crate::routes::chat::post_message,
        crate::routes::chat::history,
        crate::routes::leaderboard::submit_score,
        crate::routes::leaderboard::leaderboard,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::PhaseDto,
            crate::state::game::BidKind,
            crate::state::game::HintKind,
            crate::dto::game::RegisterRequest,
            crate::dto::game::RegisterResponse,
            crate::dto::game::SelectSetRequest,
            crate::dto::game::SelectSetResponse,
            crate::dto::game::SetListResponse,
            crate::dto::game::BidRequest,
            crate::dto::game::FinishBiddingRequest,
            crate::dto::game::AnswerRequest,
            crate::dto::game::HintRequest,
            crate::dto::game::HintResponse,
            crate::dto::game::AdvanceRequest,
            crate::dto::game::AdvanceResponse,
            crate::dto::game::AckResponse,
            crate::dto::game::HeartbeatResponse,
            crate::dto::game::StateResponse,
            crate::dto::game::PlayerStateDto,
            crate::dto::game::QuestionDto,
            crate::dto::game::QuestionOptionDto,
            crate::dto::game::WinnerDto,
            crate::dto::chat::ChatMessageRequest,
            crate::dto::chat::ChatMessageDto,
            crate::dto::chat::ChatHistoryResponse,
            crate::dto::leaderboard::SubmitScoreRequest,
            crate::dto::leaderboard::LeaderboardEntryDto,
            crate::dto::leaderboard::LeaderboardResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Registration, auction and round control"),
        (name = "chat", description = "Shared chat and event log"),
        (name = "leaderboard", description = "Score submission and rankings"),
    )
)]
pub struct ApiDoc;
