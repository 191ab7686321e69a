use thiserror::Error;

/// High-level phases a game table can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round is in progress.
    Idle(IdleStatus),
    /// Timed auction for the right to answer the current question.
    Bidding,
    /// The auction winner composes an answer within a time box.
    Answering,
    /// Answer locked in; grace window before the verdict is computed.
    Discussion,
    /// Game over; a winner has been declared and wallets are frozen.
    Finished,
}

/// Sub-state while no round is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStatus {
    /// No question set has been selected yet; rounds cannot start.
    AwaitingQuestionSet,
    /// A question set is loaded and the next round can begin.
    BetweenRounds,
}

/// Events that can be applied to the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// The admin selected a question set; the table is ready for rounds.
    SelectSet,
    /// Entry fees collected; the auction opens.
    StartRound,
    /// Auction closed by timer, all-in, or admin override.
    CloseBidding,
    /// The resolved winner submitted an answer.
    SubmitAnswer,
    /// The answer window elapsed without a submission.
    ExpireAnswer,
    /// The discussion window elapsed; verdict has been settled.
    CloseDiscussion,
    /// Game-over condition met; a winner is declared.
    FinishGame,
    /// A finished game is cleared so a new one can be set up.
    ResetGame,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event arrived.
    pub from: Phase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// State machine owning the authoritative phase of the single game table.
///
/// Transitions are applied synchronously under the table lock, so there is
/// no pending/planned stage: either an event is valid for the current phase
/// and is applied, or the machine is left untouched.
#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: Phase,
    version: u64,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self {
            phase: Phase::Idle(IdleStatus::AwaitingQuestionSet),
            version: 0,
        }
    }
}

impl RoundStateMachine {
    /// Create a new state machine awaiting a question set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply an event, moving the machine to the next phase.
    ///
    /// Invalid events leave the phase and version untouched.
    pub fn apply(&mut self, event: RoundEvent) -> Result<Phase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(self.phase)
    }

    fn compute_transition(&self, event: RoundEvent) -> Result<Phase, InvalidTransition> {
        use IdleStatus::*;
        use Phase::*;
        use RoundEvent::*;

        let next = match (self.phase, event) {
            (Idle(_), SelectSet) => Idle(BetweenRounds),
            (Idle(BetweenRounds), StartRound) => Bidding,
            (Bidding, CloseBidding) => Answering,
            (Answering, SubmitAnswer) => Discussion,
            (Answering, ExpireAnswer) => Discussion,
            (Discussion, CloseDiscussion) => Idle(BetweenRounds),
            (Finished, ResetGame) => Idle(AwaitingQuestionSet),
            // A game can be declared over from any live phase (failed round
            // start, post-verdict wealth check, question exhaustion).
            (from, FinishGame) if from != Finished => Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut RoundStateMachine, event: RoundEvent) -> Phase {
        sm.apply(event).unwrap()
    }

    #[test]
    fn initial_state_awaits_question_set() {
        let sm = RoundStateMachine::new();
        assert_eq!(sm.phase(), Phase::Idle(IdleStatus::AwaitingQuestionSet));
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn full_happy_path_through_round() {
        let mut sm = RoundStateMachine::new();

        assert_eq!(
            apply(&mut sm, RoundEvent::SelectSet),
            Phase::Idle(IdleStatus::BetweenRounds)
        );
        assert_eq!(apply(&mut sm, RoundEvent::StartRound), Phase::Bidding);
        assert_eq!(apply(&mut sm, RoundEvent::CloseBidding), Phase::Answering);
        assert_eq!(apply(&mut sm, RoundEvent::SubmitAnswer), Phase::Discussion);
        assert_eq!(
            apply(&mut sm, RoundEvent::CloseDiscussion),
            Phase::Idle(IdleStatus::BetweenRounds)
        );
        assert_eq!(sm.version(), 5);
    }

    #[test]
    fn answer_window_expiry_reaches_discussion() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::SelectSet);
        apply(&mut sm, RoundEvent::StartRound);
        apply(&mut sm, RoundEvent::CloseBidding);
        assert_eq!(apply(&mut sm, RoundEvent::ExpireAnswer), Phase::Discussion);
    }

    #[test]
    fn round_cannot_start_without_question_set() {
        let mut sm = RoundStateMachine::new();
        let err = sm.apply(RoundEvent::StartRound).unwrap_err();
        assert_eq!(err.from, Phase::Idle(IdleStatus::AwaitingQuestionSet));
        assert_eq!(err.event, RoundEvent::StartRound);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn game_can_finish_from_any_live_phase() {
        for path in [
            vec![],
            vec![RoundEvent::SelectSet],
            vec![RoundEvent::SelectSet, RoundEvent::StartRound],
            vec![
                RoundEvent::SelectSet,
                RoundEvent::StartRound,
                RoundEvent::CloseBidding,
            ],
            vec![
                RoundEvent::SelectSet,
                RoundEvent::StartRound,
                RoundEvent::CloseBidding,
                RoundEvent::SubmitAnswer,
            ],
        ] {
            let mut sm = RoundStateMachine::new();
            for event in path {
                apply(&mut sm, event);
            }
            assert_eq!(apply(&mut sm, RoundEvent::FinishGame), Phase::Finished);
        }
    }

    #[test]
    fn finished_game_only_accepts_reset() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::SelectSet);
        apply(&mut sm, RoundEvent::FinishGame);

        assert!(sm.apply(RoundEvent::StartRound).is_err());
        assert!(sm.apply(RoundEvent::FinishGame).is_err());
        assert_eq!(
            apply(&mut sm, RoundEvent::ResetGame),
            Phase::Idle(IdleStatus::AwaitingQuestionSet)
        );
    }

    #[test]
    fn selecting_a_new_set_between_rounds_is_allowed() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::SelectSet);
        assert_eq!(
            apply(&mut sm, RoundEvent::SelectSet),
            Phase::Idle(IdleStatus::BetweenRounds)
        );
    }

    #[test]
    fn bidding_rejects_out_of_order_events() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::SelectSet);
        apply(&mut sm, RoundEvent::StartRound);

        assert!(sm.apply(RoundEvent::SubmitAnswer).is_err());
        assert!(sm.apply(RoundEvent::CloseDiscussion).is_err());
        assert!(sm.apply(RoundEvent::StartRound).is_err());
        assert_eq!(sm.phase(), Phase::Bidding);
    }
}
