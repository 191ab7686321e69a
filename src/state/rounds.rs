//! Round lifecycle operations on the [`GameTable`].
//!
//! Rounds never advance on a timer thread. Every service entry point
//! first calls [`GameTable::catch_up`], which applies any transition
//! whose deadline has passed, using the deadline itself as the
//! effective time so a late poll lands in the same state as a punctual
//! one.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{
        answer,
        game::{Bid, GameTable, GameWinner, HintState, ObserverReason, Question, Round},
        state_machine::{IdleStatus, Phase, RoundEvent},
    },
};

impl GameTable {
    /// Load a question set and, when enough players are seated, start
    /// the first round right away. Returns whether a round started.
    ///
    /// Admin only. Permitted while idle, including between rounds to
    /// swap in a fresh set mid-game; the pot is untouched either way.
    pub fn select_question_set(
        &mut self,
        actor: Uuid,
        questions: Vec<Question>,
        now: SystemTime,
    ) -> Result<bool, ServiceError> {
        self.ensure_admin(actor)?;
        if questions.is_empty() {
            return Err(ServiceError::InvalidInput(
                "question set contains no questions".into(),
            ));
        }
        self.machine.apply(RoundEvent::SelectSet)?;
        info!(questions = questions.len(), "question set selected");
        self.questions = questions;
        self.round.question_index = 0;
        self.start_round(now)
    }

    /// Move the game forward from an idle or finished phase.
    ///
    /// Admin only. Between rounds this starts the next round; after a
    /// finished game it resets the table for a new one. Returns whether
    /// a round started.
    pub fn advance_round(&mut self, actor: Uuid, now: SystemTime) -> Result<bool, ServiceError> {
        self.ensure_admin(actor)?;
        match self.machine.phase() {
            Phase::Idle(IdleStatus::BetweenRounds) => self.start_round(now),
            Phase::Finished => {
                self.reset_game(now)?;
                Ok(false)
            }
            phase => Err(ServiceError::InvalidPhase(format!(
                "nothing to advance from {phase:?}"
            ))),
        }
    }

    /// Lock in the answering player's answer and open the discussion
    /// window. The verdict is computed when that window closes.
    pub fn submit_answer(
        &mut self,
        player_id: Uuid,
        text: &str,
        now: SystemTime,
    ) -> Result<(), ServiceError> {
        if self.machine.phase() != Phase::Answering {
            return Err(ServiceError::InvalidPhase(
                "no answer is being awaited right now".into(),
            ));
        }
        let player = self.player(player_id)?;
        if self.round.answering != Some(player_id) {
            return Err(ServiceError::Forbidden(
                "only the auction winner may answer".into(),
            ));
        }
        let name = player.name.clone();
        self.machine.apply(RoundEvent::SubmitAnswer)?;
        info!(player = %player_id, "answer submitted");
        self.round.answer = Some(text.to_owned());
        self.round.deadline = Some(now + self.config.discussion_duration);
        self.push_system(format!("{name} answers: {text}"), now);
        Ok(())
    }

    /// Apply every transition whose deadline has already passed.
    ///
    /// Each expired phase is advanced using its own deadline as the
    /// effective time, so a single late call walks through bidding,
    /// answering and discussion exactly as three punctual polls would
    /// have. Calling this twice in a row is a no-op the second time.
    pub fn catch_up(&mut self, now: SystemTime) -> Result<(), ServiceError> {
        self.evict_inactive(now);
        loop {
            let Some(deadline) = self.round.deadline else {
                return Ok(());
            };
            if now < deadline {
                return Ok(());
            }
            match self.machine.phase() {
                Phase::Bidding => self.close_bidding(deadline)?,
                Phase::Answering => {
                    self.machine.apply(RoundEvent::ExpireAnswer)?;
                    self.push_system("time is up, no answer recorded".into(), deadline);
                    self.round.deadline = Some(deadline + self.config.discussion_duration);
                }
                Phase::Discussion => self.settle_round(deadline)?,
                _ => {
                    // A deadline has no meaning in untimed phases.
                    self.round.deadline = None;
                }
            }
        }
    }

    fn ensure_admin(&self, actor: Uuid) -> Result<(), ServiceError> {
        if self.player(actor)?.is_admin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "only the admin may steer the game".into(),
            ))
        }
    }

    /// Start the next round: re-seat observers, collect entry fees as
    /// opening bids and open the auction.
    ///
    /// Returns `false` without starting when the game ends instead
    /// (question set exhausted, or fewer than two funded players after
    /// at least one round) or when the table is still waiting for a
    /// second player before the first round.
    fn start_round(&mut self, now: SystemTime) -> Result<bool, ServiceError> {
        self.refresh_observers();

        if self.round.question_index >= self.questions.len() {
            self.finish_game(now)?;
            return Ok(false);
        }

        let eligible: Vec<Uuid> = self
            .players
            .values()
            .filter(|p| !p.is_observer())
            .map(|p| p.id)
            .collect();
        if eligible.len() < 2 {
            if self.round.id == 0 {
                self.push_system("waiting for more players".into(), now);
                return Ok(false);
            }
            self.finish_game(now)?;
            return Ok(false);
        }

        self.machine.apply(RoundEvent::StartRound)?;
        self.bids.clear();
        self.round.id += 1;
        self.round.answering = None;
        self.round.answer = None;
        self.round.hints = HintState::default();

        let fee = self.config.entry_fee;
        for id in &eligible {
            if let Some(player) = self.players.get_mut(id) {
                player.money -= fee;
                self.round.pot += fee;
                self.bids.insert(
                    *id,
                    Bid {
                        amount: fee,
                        all_in: false,
                        placed_at: now,
                    },
                );
            }
        }
        self.round.deadline = Some(now + self.config.bidding_duration);
        info!(
            round = self.round.id,
            players = eligible.len(),
            pot = self.round.pot,
            "round started"
        );
        self.push_system(format!("round {} begins, place your bids", self.round.id), now);
        Ok(true)
    }

    /// Close the discussion window with a verdict and return to idle.
    ///
    /// A correct answer pays the whole pot to the answering player; an
    /// incorrect one (or no answer at all) rolls the pot into the next
    /// round. The game-over check runs right after the verdict.
    pub(crate) fn settle_round(&mut self, now: SystemTime) -> Result<(), ServiceError> {
        self.machine.apply(RoundEvent::CloseDiscussion)?;

        let verdict = match (&self.round.answer, self.current_question()) {
            (Some(text), Some(question)) => {
                answer::matches(text, &question.correct_answer, self.config.verdict_threshold)
            }
            _ => false,
        };

        // Eviction clears the answering pointer, so a winner who left
        // during discussion rolls the pot over like a wrong answer.
        let payee = self
            .round
            .answering
            .filter(|_| verdict)
            .and_then(|id| self.players.get_mut(&id));
        match payee {
            Some(player) => {
                let pot = self.round.pot;
                player.money += pot;
                let name = player.name.clone();
                info!(player = %player.id, pot, "correct answer, pot paid out");
                self.push_system(format!("correct! {name} takes {pot}"), now);
                self.round.pot = 0;
            }
            None => {
                let pot = self.round.pot;
                info!(pot, "no payout, pot rolls over");
                let message = match (&self.round.answer, self.round.answering) {
                    (None, _) => format!("no answer given, {pot} rolls into the next round"),
                    (Some(_), None) => {
                        format!("the answering player is gone, {pot} rolls into the next round")
                    }
                    _ => format!("wrong answer, {pot} rolls into the next round"),
                };
                self.push_system(message, now);
            }
        }

        self.round.question_index += 1;
        self.round.answering = None;
        self.round.answer = None;
        self.round.deadline = None;

        if self.funded_player_count() < 2 || self.round.question_index >= self.questions.len() {
            self.finish_game(now)?;
        }
        Ok(())
    }

    /// Declare the game over and record the winner.
    ///
    /// A sole remaining funded player collects the pot on top of their
    /// wallet. Otherwise the wealthiest player wins outright, ties
    /// going to table tenure.
    pub(crate) fn finish_game(&mut self, now: SystemTime) -> Result<(), ServiceError> {
        self.machine.apply(RoundEvent::FinishGame)?;
        self.round.deadline = None;

        let fee = self.config.entry_fee;
        let funded: Vec<Uuid> = self
            .players
            .values()
            .filter(|p| p.money >= fee)
            .map(|p| p.id)
            .collect();
        let champion = match funded.as_slice() {
            [sole] => {
                if let Some(player) = self.players.get_mut(sole) {
                    player.money += self.round.pot;
                    self.round.pot = 0;
                }
                Some(*sole)
            }
            _ => {
                // Strictly-greater comparison keeps the first (most
                // tenured) player on a wallet tie.
                let mut best: Option<(Uuid, i64)> = None;
                for p in self.players.values() {
                    if best.is_none_or(|(_, money)| p.money > money) {
                        best = Some((p.id, p.money));
                    }
                }
                best.map(|(id, _)| id)
            }
        };

        self.winner = champion.and_then(|id| self.players.get(&id)).map(|p| GameWinner {
            id: p.id,
            name: p.name.clone(),
            money: p.money,
        });
        match &self.winner {
            Some(winner) => {
                info!(player = %winner.id, money = winner.money, "game finished");
                self.push_system(format!("game over, {} wins with {}", winner.name, winner.money), now);
            }
            None => {
                info!("game finished with no players left");
                self.push_system("game over".into(), now);
            }
        }
        Ok(())
    }

    /// Wipe the table for a fresh game in the same session.
    fn reset_game(&mut self, now: SystemTime) -> Result<(), ServiceError> {
        self.machine.apply(RoundEvent::ResetGame)?;
        self.round = Round::new();
        self.bids.clear();
        self.questions.clear();
        self.winner = None;
        if self.config.reset_wallets_between_games {
            let max = self.config.max_active_players;
            for (seat, player) in self.players.values_mut().enumerate() {
                player.money = self.config.starting_stake;
                player.observer = (seat >= max).then_some(ObserverReason::Capacity);
            }
        } else {
            self.refresh_observers();
        }
        info!("table reset for a new game");
        self.push_system("new game, pick a question set".into(), now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        state::{
            game::{BidKind, GameTable},
            state_machine::{IdleStatus, Phase},
            tests::sample_questions,
        },
    };

    fn table_with(names: &[&str], now: SystemTime) -> (GameTable, Vec<Uuid>) {
        let mut table = GameTable::with_seed(AppConfig::default(), 11);
        let ids = names
            .iter()
            .map(|name| table.register_player(name, now).unwrap())
            .collect();
        (table, ids)
    }

    /// Sum of wallets and the pot, which no mid-game operation may change.
    fn total_money(table: &GameTable) -> i64 {
        table.players.values().map(|p| p.money).sum::<i64>() + table.round.pot
    }

    #[test]
    fn selecting_a_set_requires_admin() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        assert!(
            table
                .select_question_set(ids[1], sample_questions(2), now)
                .is_err()
        );
        assert!(
            table
                .select_question_set(ids[0], sample_questions(2), now)
                .unwrap()
        );
    }

    #[test]
    fn a_lone_player_waits_for_company() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala"], now);
        let started = table
            .select_question_set(ids[0], sample_questions(2), now)
            .unwrap();
        assert!(!started);
        assert_eq!(table.phase(), Phase::Idle(IdleStatus::BetweenRounds));

        table.register_player("ola", now).unwrap();
        assert!(table.advance_round(ids[0], now).unwrap());
        assert_eq!(table.phase(), Phase::Bidding);
    }

    #[test]
    fn correct_answer_pays_the_pot_exactly_once() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        let before = total_money(&table);
        table
            .select_question_set(ids[0], sample_questions(3), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::Increment, now).unwrap();
        table.finish_bidding(ids[0], now).unwrap();
        let pot = table.round.pot;
        table
            .submit_answer(ids[1], "answer 0", now + Duration::from_secs(5))
            .unwrap();

        let after_discussion =
            now + Duration::from_secs(5) + table.config().discussion_duration;
        table.catch_up(after_discussion).unwrap();

        assert_eq!(table.phase(), Phase::Idle(IdleStatus::BetweenRounds));
        assert_eq!(table.round.pot, 0);
        let expected = table.config().starting_stake - table.config().entry_fee
            - table.config().bid_increment
            + pot;
        assert_eq!(table.player(ids[1]).unwrap().money, expected);
        assert_eq!(total_money(&table), before);
    }

    #[test]
    fn wrong_answer_rolls_the_pot_into_the_next_round() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        table
            .select_question_set(ids[0], sample_questions(3), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::Increment, now).unwrap();
        table.finish_bidding(ids[0], now).unwrap();
        let pot = table.round.pot;
        table
            .submit_answer(ids[1], "definitely not it", now)
            .unwrap();
        table
            .catch_up(now + table.config().discussion_duration)
            .unwrap();
        assert_eq!(table.round.pot, pot);
        assert!(
            table
                .chat
                .iter()
                .any(|e| e.text.contains("wrong answer"))
        );

        table
            .advance_round(ids[0], now + Duration::from_secs(30))
            .unwrap();
        assert_eq!(
            table.round.pot,
            pot + 2 * table.config().entry_fee,
        );
    }

    #[test]
    fn one_late_poll_walks_through_every_expired_phase() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        table
            .select_question_set(ids[0], sample_questions(3), now)
            .unwrap();

        // Nobody bids beyond the entry fees, nobody answers. A single
        // poll long after the fact settles bidding, answering and
        // discussion in one go.
        let cfg = table.config().clone();
        let much_later = now
            + cfg.bidding_duration
            + cfg.no_bid_answer_duration
            + cfg.discussion_duration
            + Duration::from_secs(300);
        // Heartbeats so the poll does not also evict everyone.
        table.touch_player(ids[0], much_later).unwrap();
        table.touch_player(ids[1], much_later).unwrap();
        table.catch_up(much_later).unwrap();

        assert_eq!(table.phase(), Phase::Idle(IdleStatus::BetweenRounds));
        assert_eq!(table.round.pot, 2 * cfg.entry_fee);
        assert!(
            table
                .chat
                .iter()
                .any(|e| e.text.contains("no answer given"))
        );

        // Idempotent: a second identical poll changes nothing.
        let chat_len = table.chat.len();
        let version = table.machine.version();
        table.catch_up(much_later).unwrap();
        assert_eq!(table.chat.len(), chat_len);
        assert_eq!(table.machine.version(), version);
    }

    #[test]
    fn evicting_the_answering_player_expires_their_answer() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        table
            .select_question_set(ids[0], sample_questions(3), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::AllIn, now).unwrap();
        assert_eq!(table.round.answering, Some(ids[1]));

        let later = now + Duration::from_secs(2);
        table.touch_player(ids[0], later).unwrap();
        let beyond = later + table.config().inactivity_timeout + Duration::from_secs(1);
        table.touch_player(ids[0], beyond).unwrap();
        table.catch_up(beyond).unwrap();

        assert!(table.player(ids[1]).is_err());
        assert_eq!(table.round.answering, None);
        assert_ne!(table.phase(), Phase::Answering);
    }

    #[test]
    fn evicting_the_answerer_during_discussion_rolls_the_pot_over() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola", "ela"], now);
        table
            .select_question_set(ids[0], sample_questions(2), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::AllIn, now).unwrap();
        table.submit_answer(ids[1], "answer 0", now).unwrap();
        assert_eq!(table.phase(), Phase::Discussion);
        let pot = table.round.pot;

        let later = now + Duration::from_secs(2);
        table.touch_player(ids[0], later).unwrap();
        table.touch_player(ids[2], later).unwrap();
        let beyond = later + table.config().inactivity_timeout + Duration::from_secs(1);
        table.touch_player(ids[0], beyond).unwrap();
        table.touch_player(ids[2], beyond).unwrap();
        table.evict_inactive(beyond);
        assert_eq!(table.round.answering, None);

        table
            .catch_up(now + table.config().discussion_duration)
            .unwrap();
        // Correct answer or not, there is nobody left to pay.
        assert_eq!(table.round.pot, pot);
        assert!(
            table
                .chat
                .iter()
                .any(|e| e.text.contains("the answering player is gone"))
        );
    }

    #[test]
    fn exhausting_the_question_set_finishes_the_game() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        table
            .select_question_set(ids[0], sample_questions(1), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::Increment, now).unwrap();
        table.finish_bidding(ids[0], now).unwrap();
        assert_eq!(table.round.answering, Some(ids[1]));
        table.submit_answer(ids[1], "bogus", now).unwrap();
        table
            .catch_up(now + table.config().discussion_duration)
            .unwrap();
        assert_eq!(table.phase(), Phase::Finished);
        assert!(table.winner().is_some());
    }

    #[test]
    fn reset_after_a_finished_game_restores_wallets() {
        let now = SystemTime::now();
        let (mut table, ids) = table_with(&["ala", "ola"], now);
        table
            .select_question_set(ids[0], sample_questions(1), now)
            .unwrap();
        table.place_bid(ids[1], BidKind::AllIn, now).unwrap();
        table
            .submit_answer(ids[1], "answer 0", now)
            .unwrap();
        table
            .catch_up(now + table.config().discussion_duration)
            .unwrap();
        assert_eq!(table.phase(), Phase::Finished);

        table
            .advance_round(ids[0], now + Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            table.phase(),
            Phase::Idle(IdleStatus::AwaitingQuestionSet)
        );
        for id in &ids {
            assert_eq!(
                table.player(*id).unwrap().money,
                table.config().starting_stake
            );
        }
        assert_eq!(table.round.pot, 0);
        assert!(table.winner().is_none());
    }
}
