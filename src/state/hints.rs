//! Hint purchases on the [`GameTable`].
//!
//! Both hints are reserved for the player who won the auction, and each
//! can be bought once per round. Costs are drawn from configured ranges
//! and feed the pot, so hints raise the prize rather than sink money.

use std::time::SystemTime;

use rand::{Rng, seq::SliceRandom};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{
        answer,
        game::{GameTable, HintKind},
        state_machine::Phase,
    },
};

impl GameTable {
    /// Buy a hint for the current question and return the price paid.
    ///
    /// Eliminating two wrong options requires the reveal-all hint
    /// first, so the buyer knows what they are narrowing down.
    pub fn buy_hint(
        &mut self,
        player_id: Uuid,
        kind: HintKind,
        now: SystemTime,
    ) -> Result<i64, ServiceError> {
        let phase_allows = match self.machine.phase() {
            Phase::Answering => true,
            Phase::Discussion => self.config.hints_in_discussion,
            _ => false,
        };
        if !phase_allows {
            return Err(ServiceError::InvalidPhase(
                "hints are only sold while an answer is awaited".into(),
            ));
        }
        if self.round.answering != Some(player_id) {
            self.player(player_id)?;
            return Err(ServiceError::Forbidden(
                "only the answering player may buy hints".into(),
            ));
        }

        let (lo, hi) = match kind {
            HintKind::RevealAll => {
                if self.round.hints.reveal_purchased {
                    return Err(ServiceError::InvalidPhase(
                        "the options are already revealed this round".into(),
                    ));
                }
                self.config.reveal_cost
            }
            HintKind::EliminateTwo => {
                if !self.round.hints.reveal_purchased {
                    return Err(ServiceError::InvalidPhase(
                        "reveal the options before eliminating any".into(),
                    ));
                }
                if !self.round.hints.eliminated.is_empty() {
                    return Err(ServiceError::InvalidPhase(
                        "wrong options were already eliminated this round".into(),
                    ));
                }
                self.config.eliminate_cost
            }
        };

        let cost = self.rng.random_range(lo..=hi);
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {player_id}")))?;
        if player.money < cost {
            return Err(ServiceError::InsufficientFunds(format!(
                "this hint costs {cost}, wallet holds {}",
                player.money
            )));
        }
        player.money -= cost;
        let name = player.name.clone();
        self.round.pot += cost;

        match kind {
            HintKind::RevealAll => {
                self.round.hints.reveal_purchased = true;
                info!(player = %player_id, cost, "options revealed");
                self.push_system(format!("{name} pays {cost} to see the options"), now);
            }
            HintKind::EliminateTwo => {
                self.round.hints.eliminated = self.pick_wrong_options();
                info!(
                    player = %player_id,
                    cost,
                    eliminated = ?self.round.hints.eliminated,
                    "wrong options eliminated"
                );
                self.push_system(format!("{name} pays {cost} to drop two wrong options"), now);
            }
        }
        Ok(cost)
    }

    /// Pick up to two option indices that do not match the canonical
    /// answer. The fuzzy check keeps a reworded correct option safe
    /// from elimination.
    fn pick_wrong_options(&mut self) -> Vec<usize> {
        let Some(question) = self.questions.get(self.round.question_index) else {
            return Vec::new();
        };
        let threshold = self.config.verdict_threshold;
        let mut wrong: Vec<usize> = question
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| !answer::matches(option, &question.correct_answer, threshold))
            .map(|(index, _)| index)
            .collect();
        wrong.shuffle(&mut self.rng);
        wrong.truncate(2);
        wrong
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        state::{
            game::{BidKind, GameTable, HintKind},
            tests::sample_questions,
        },
    };

    fn answering_table() -> (GameTable, Uuid, Uuid, SystemTime) {
        let mut table = GameTable::with_seed(AppConfig::default(), 42);
        let now = SystemTime::now();
        let admin = table.register_player("ala", now).unwrap();
        let buyer = table.register_player("ola", now).unwrap();
        table
            .select_question_set(admin, sample_questions(2), now)
            .unwrap();
        table.place_bid(buyer, BidKind::Increment, now).unwrap();
        table.finish_bidding(admin, now).unwrap();
        (table, admin, buyer, now)
    }

    #[test]
    fn only_the_answering_player_may_buy() {
        let (mut table, admin, _, now) = answering_table();
        assert!(table.buy_hint(admin, HintKind::RevealAll, now).is_err());
    }

    #[test]
    fn reveal_cost_lands_in_range_and_feeds_the_pot() {
        let (mut table, _, buyer, now) = answering_table();
        let (lo, hi) = table.config().reveal_cost;
        let pot = table.round.pot;
        let wallet = table.player(buyer).unwrap().money;

        let cost = table.buy_hint(buyer, HintKind::RevealAll, now).unwrap();
        assert!((lo..=hi).contains(&cost));
        assert_eq!(table.round.pot, pot + cost);
        assert_eq!(table.player(buyer).unwrap().money, wallet - cost);
    }

    #[test]
    fn eliminate_requires_reveal_first() {
        let (mut table, _, buyer, now) = answering_table();
        assert!(table.buy_hint(buyer, HintKind::EliminateTwo, now).is_err());
        table.buy_hint(buyer, HintKind::RevealAll, now).unwrap();
        table.buy_hint(buyer, HintKind::EliminateTwo, now).unwrap();
    }

    #[test]
    fn eliminate_never_touches_the_correct_option() {
        let (mut table, _, buyer, now) = answering_table();
        table.buy_hint(buyer, HintKind::RevealAll, now).unwrap();
        table.buy_hint(buyer, HintKind::EliminateTwo, now).unwrap();

        let eliminated = table.round.hints.eliminated.clone();
        assert_eq!(eliminated.len(), 2);
        let question = table.current_question().unwrap();
        for index in eliminated {
            assert_ne!(question.options[index], question.correct_answer);
        }
    }

    #[test]
    fn each_hint_sells_once_per_round() {
        let (mut table, _, buyer, now) = answering_table();
        table.buy_hint(buyer, HintKind::RevealAll, now).unwrap();
        assert!(table.buy_hint(buyer, HintKind::RevealAll, now).is_err());
        table.buy_hint(buyer, HintKind::EliminateTwo, now).unwrap();
        assert!(table.buy_hint(buyer, HintKind::EliminateTwo, now).is_err());
    }

    #[test]
    fn hints_are_rejected_during_bidding() {
        let mut table = GameTable::with_seed(AppConfig::default(), 42);
        let now = SystemTime::now();
        let admin = table.register_player("ala", now).unwrap();
        let other = table.register_player("ola", now).unwrap();
        table
            .select_question_set(admin, sample_questions(2), now)
            .unwrap();
        assert!(table.buy_hint(other, HintKind::RevealAll, now).is_err());
    }
}
