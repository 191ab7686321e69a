use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        chat::ChatMessageDto,
        phase::PhaseDto,
        validation::{validate_answer_text, validate_display_name},
    },
    state::{
        Phase,
        game::{BidKind, GameTable, HintKind, Player},
    },
};

/// Entries of the event log included in a state snapshot.
const SNAPSHOT_CHAT_LEN: usize = 30;

/// Payload used to join the table.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Identity and wallet handed back after registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub money: i64,
    pub is_admin: bool,
    pub is_observer: bool,
}

impl From<&Player> for RegisterResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            money: player.money,
            is_admin: player.is_admin,
            is_observer: player.is_observer(),
        }
    }
}

/// Role flags confirmed with each liveness ping.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeartbeatResponse {
    pub is_admin: bool,
    pub is_observer: bool,
}

impl From<&Player> for HeartbeatResponse {
    fn from(player: &Player) -> Self {
        Self {
            is_admin: player.is_admin,
            is_observer: player.is_observer(),
        }
    }
}

/// Admin request to play a named question set.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectSetRequest {
    pub player_id: Uuid,
    #[validate(length(min = 1, max = 128))]
    pub set_name: String,
}

/// Outcome of selecting a question set.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectSetResponse {
    /// Whether the first round started right away.
    pub started: bool,
    /// Number of questions loaded from the set.
    pub questions: usize,
}

/// Names of the question sets available for selection.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetListResponse {
    pub sets: Vec<String>,
}

/// A bid placed in the open auction.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BidRequest {
    pub player_id: Uuid,
    pub kind: BidKind,
}

/// Request to close the auction (admin) or to pass (anyone else).
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishBiddingRequest {
    pub player_id: Uuid,
}

/// The auction winner's answer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub player_id: Uuid,
    pub text: String,
}

impl Validate for AnswerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_answer_text(&self.text) {
            errors.add("text", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// A hint purchase by the answering player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HintRequest {
    pub player_id: Uuid,
    pub kind: HintKind,
}

/// Receipt for a purchased hint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HintResponse {
    /// Price actually paid, drawn from the configured range.
    pub cost: i64,
    /// Pot after the purchase.
    pub pot: i64,
}

/// Admin request to move the game forward.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    pub player_id: Uuid,
}

/// Outcome of an advance request.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdvanceResponse {
    /// Whether a new round started.
    pub started: bool,
    pub phase: PhaseDto,
}

/// Plain acknowledgement for requests with nothing else to report.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    /// The usual "ok" acknowledgement.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// One player's slice of the state snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerStateDto {
    pub id: Uuid,
    pub name: String,
    pub money: i64,
    pub is_admin: bool,
    pub is_observer: bool,
    /// Running bid in the current auction; zero when not bidding.
    pub bid: i64,
    pub is_all_in: bool,
}

/// A candidate answer, possibly struck out by the eliminate hint.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionOptionDto {
    pub text: String,
    pub eliminated: bool,
}

/// The current question as players are allowed to see it.
///
/// Options stay hidden until the reveal hint is bought.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionDto {
    pub text: String,
    pub options: Option<Vec<QuestionOptionDto>>,
}

/// Winner details exposed once the game is over.
#[derive(Debug, Serialize, ToSchema)]
pub struct WinnerDto {
    pub id: Uuid,
    pub name: String,
    pub money: i64,
}

/// The canonical polled read model of the whole table.
#[derive(Debug, Serialize, ToSchema)]
pub struct StateResponse {
    pub round_id: u64,
    pub phase: PhaseDto,
    pub pot: i64,
    /// Seconds left in the current timed phase.
    pub time_left: f32,
    pub answering_player_id: Option<Uuid>,
    pub question: Option<QuestionDto>,
    pub players: Vec<PlayerStateDto>,
    pub winner: Option<WinnerDto>,
    /// Most recent chat and event entries, oldest first.
    pub chat: Vec<ChatMessageDto>,
}

impl StateResponse {
    /// Compose a snapshot of an already caught-up table.
    pub fn from_table(table: &GameTable, now: SystemTime) -> Self {
        let question = match table.phase() {
            Phase::Bidding | Phase::Answering | Phase::Discussion => {
                table.current_question().map(|question| {
                    let hints = &table.round().hints;
                    let options = hints.reveal_purchased.then(|| {
                        question
                            .options
                            .iter()
                            .enumerate()
                            .map(|(index, text)| QuestionOptionDto {
                                text: text.clone(),
                                eliminated: hints.eliminated.contains(&index),
                            })
                            .collect()
                    });
                    QuestionDto {
                        text: question.text.clone(),
                        options,
                    }
                })
            }
            _ => None,
        };

        let players = table
            .player_iter()
            .map(|player| {
                let bid = table.bid_for(player.id);
                PlayerStateDto {
                    id: player.id,
                    name: player.name.clone(),
                    money: player.money,
                    is_admin: player.is_admin,
                    is_observer: player.is_observer(),
                    bid: bid.map(|b| b.amount).unwrap_or(0),
                    is_all_in: bid.map(|b| b.all_in).unwrap_or(false),
                }
            })
            .collect();

        Self {
            round_id: table.round().id,
            phase: table.phase().into(),
            pot: table.round().pot,
            time_left: table.time_left(now),
            answering_player_id: table.round().answering,
            question,
            players,
            winner: table.winner().map(|winner| WinnerDto {
                id: winner.id,
                name: winner.name.clone(),
                money: winner.money,
            }),
            chat: table
                .recent_chat(SNAPSHOT_CHAT_LEN)
                .map(ChatMessageDto::from)
                .collect(),
        }
    }
}
