use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::state_machine::{IdleStatus, Phase};

/// Wire representation of the round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDto {
    AwaitingQuestionSet,
    BetweenRounds,
    Bidding,
    Answering,
    Discussion,
    Finished,
}

impl From<Phase> for PhaseDto {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle(IdleStatus::AwaitingQuestionSet) => PhaseDto::AwaitingQuestionSet,
            Phase::Idle(IdleStatus::BetweenRounds) => PhaseDto::BetweenRounds,
            Phase::Bidding => PhaseDto::Bidding,
            Phase::Answering => PhaseDto::Answering,
            Phase::Discussion => PhaseDto::Discussion,
            Phase::Finished => PhaseDto::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_serialize_in_snake_case() {
        let json = serde_json::to_string(&PhaseDto::from(Phase::Bidding)).unwrap();
        assert_eq!(json, "\"bidding\"");
        let json =
            serde_json::to_string(&PhaseDto::from(Phase::Idle(IdleStatus::AwaitingQuestionSet)))
                .unwrap();
        assert_eq!(json, "\"awaiting_question_set\"");
    }
}
