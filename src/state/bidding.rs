//! Auction operations on the [`GameTable`].
//!
//! Every seated player opens the round with the entry fee as their bid.
//! Raises add the fixed increment; an all-in stakes the whole wallet and
//! settles the auction on the spot. Wallets are debited and the pot is
//! credited atomically at placement time, so the sum of all wallets and
//! the pot never changes mid-round.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{
        game::{BidKind, GameTable},
        state_machine::{Phase, RoundEvent},
    },
};

impl GameTable {
    /// Place a bid for the current auction.
    ///
    /// Only players dealt into the round (those holding an opening bid)
    /// may raise. An all-in closes the auction immediately.
    pub fn place_bid(
        &mut self,
        player_id: Uuid,
        kind: BidKind,
        now: SystemTime,
    ) -> Result<(), ServiceError> {
        if self.machine.phase() != Phase::Bidding {
            return Err(ServiceError::InvalidPhase(
                "bids are only accepted while the auction is open".into(),
            ));
        }
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {player_id}")))?;
        if !self.bids.contains_key(&player_id) {
            return Err(ServiceError::Forbidden(
                "player is not part of this round's auction".into(),
            ));
        }

        let stake = match kind {
            BidKind::Increment => {
                let increment = self.config.bid_increment;
                if player.money < increment {
                    return Err(ServiceError::InsufficientFunds(format!(
                        "raising costs {increment}, wallet holds {}",
                        player.money
                    )));
                }
                increment
            }
            BidKind::AllIn => {
                if player.money == 0 {
                    return Err(ServiceError::InsufficientFunds(
                        "nothing left to stake".into(),
                    ));
                }
                player.money
            }
        };

        player.money -= stake;
        self.round.pot += stake;
        let name = player.name.clone();
        let bid = self
            .bids
            .get_mut(&player_id)
            .ok_or_else(|| ServiceError::NotFound(format!("bid for player {player_id}")))?;
        bid.amount += stake;
        bid.placed_at = now;

        match kind {
            BidKind::Increment => {
                info!(player = %player_id, amount = bid.amount, "bid raised");
            }
            BidKind::AllIn => {
                bid.all_in = true;
                let amount = bid.amount;
                info!(player = %player_id, amount, "all-in, auction closes");
                self.push_system(format!("{name} goes all in for {amount}"), now);
                self.close_bidding(now)?;
            }
        }
        Ok(())
    }

    /// Close the auction early, or register a pass.
    ///
    /// The admin closes the auction for everyone. Any other player
    /// merely announces they are done raising; the auction runs on
    /// until its deadline.
    pub fn finish_bidding(&mut self, actor: Uuid, now: SystemTime) -> Result<(), ServiceError> {
        if self.machine.phase() != Phase::Bidding {
            return Err(ServiceError::InvalidPhase(
                "no auction is open right now".into(),
            ));
        }
        let player = self.player(actor)?;
        if player.is_admin {
            self.close_bidding(now)
        } else {
            let name = player.name.clone();
            self.push_system(format!("{name} passes"), now);
            Ok(())
        }
    }

    /// Settle the auction and seat the highest bidder for the answer.
    ///
    /// Opening entry fees are not adjudicated: only raises and all-ins
    /// compete for the answer seat, and an auction without any leaves
    /// nobody answering and runs a short answer window instead. Ties go
    /// to whoever reached the amount first, then to table tenure. Bid
    /// money is already in the pot at this point; the ledger itself is
    /// kept for the state snapshot and cleared when the next round
    /// starts.
    pub(crate) fn close_bidding(&mut self, now: SystemTime) -> Result<(), ServiceError> {
        self.machine.apply(RoundEvent::CloseBidding)?;

        let mut winner: Option<(Uuid, i64, SystemTime)> = None;
        // Iterating players rather than the bid map keeps the tenure
        // tie-break deterministic.
        for id in self.players.keys() {
            let Some(bid) = self.bids.get(id) else {
                continue;
            };
            if !bid.all_in && bid.amount <= self.config.entry_fee {
                continue;
            }
            let beats = match winner {
                None => true,
                Some((_, amount, placed_at)) => {
                    bid.amount > amount || (bid.amount == amount && bid.placed_at < placed_at)
                }
            };
            if beats {
                winner = Some((*id, bid.amount, bid.placed_at));
            }
        }

        match winner {
            Some((id, amount, _)) => {
                let name = self.players[&id].name.clone();
                info!(player = %id, amount, pot = self.round.pot, "auction won");
                self.push_system(format!("{name} wins the auction for the pot"), now);
                self.round.answering = Some(id);
                self.round.deadline = Some(now + self.config.answer_duration);
            }
            None => {
                info!(pot = self.round.pot, "auction closed without a raise");
                self.push_system("nobody raised, the question goes unanswered".into(), now);
                self.round.answering = None;
                self.round.deadline = Some(now + self.config.no_bid_answer_duration);
            }
        }
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
            state_machine::Phase,
        },
    };

    fn seated_table() -> (GameTable, Vec<Uuid>, SystemTime) {
        let mut table = GameTable::with_seed(AppConfig::default(), 3);
        let now = SystemTime::now();
        let a = table.register_player("ala", now).unwrap();
        let b = table.register_player("ola", now).unwrap();
        let started = table
            .select_question_set(a, crate::state::tests::sample_questions(3), now)
            .unwrap();
        assert!(started);
        (table, vec![a, b], now)
    }

    #[test]
    fn entry_fees_open_the_auction() {
        let (table, players, _) = seated_table();
        let fee = table.config().entry_fee;
        for id in &players {
            assert_eq!(table.bids[id].amount, fee);
            assert_eq!(
                table.player(*id).unwrap().money,
                table.config().starting_stake - fee
            );
        }
    }

    #[test]
    fn highest_total_bid_wins() {
        let (mut table, players, now) = seated_table();
        let (a, b) = (players[0], players[1]);
        table.place_bid(a, BidKind::Increment, now).unwrap();
        table.place_bid(b, BidKind::Increment, now).unwrap();
        table
            .place_bid(b, BidKind::Increment, now + Duration::from_secs(1))
            .unwrap();
        table.finish_bidding(a, now + Duration::from_secs(2)).unwrap();
        assert_eq!(table.round.answering, Some(b));
        assert_eq!(table.phase(), Phase::Answering);
    }

    #[test]
    fn ties_go_to_the_earlier_bid() {
        let (mut table, players, now) = seated_table();
        let (a, b) = (players[0], players[1]);
        table
            .place_bid(b, BidKind::Increment, now + Duration::from_secs(1))
            .unwrap();
        table
            .place_bid(a, BidKind::Increment, now + Duration::from_secs(2))
            .unwrap();
        table.finish_bidding(a, now + Duration::from_secs(3)).unwrap();
        assert_eq!(table.round.answering, Some(b));
    }

    #[test]
    fn all_in_closes_the_auction_immediately() {
        let (mut table, players, now) = seated_table();
        let b = players[1];
        table.place_bid(b, BidKind::AllIn, now).unwrap();
        assert_eq!(table.phase(), Phase::Answering);
        assert_eq!(table.round.answering, Some(b));
        assert_eq!(table.player(b).unwrap().money, 0);
    }

    #[test]
    fn pot_grows_with_every_placement() {
        let (mut table, players, now) = seated_table();
        let (a, b) = (players[0], players[1]);
        // Starting stakes 10000, entry fee 500: both wallets drop to
        // 9500 and the pot opens at 1000.
        assert_eq!(table.round.pot, 1000);
        table.place_bid(a, BidKind::Increment, now).unwrap();
        assert_eq!(table.player(a).unwrap().money, 9400);
        assert_eq!(table.round.pot, 1100);
        table.place_bid(b, BidKind::AllIn, now).unwrap();
        assert_eq!(table.player(b).unwrap().money, 0);
        assert_eq!(table.bids[&b].amount, 10000);
        assert_eq!(table.round.pot, 10600);
        assert_eq!(table.round.answering, Some(b));
    }

    #[test]
    fn three_way_auction_settles_on_the_all_in() {
        let mut table = GameTable::with_seed(AppConfig::default(), 3);
        let now = SystemTime::now();
        let a = table.register_player("ala", now).unwrap();
        let b = table.register_player("ola", now).unwrap();
        let c = table.register_player("ela", now).unwrap();
        table
            .select_question_set(a, crate::state::tests::sample_questions(3), now)
            .unwrap();
        assert_eq!(table.round.pot, 1500);
        table.place_bid(b, BidKind::Increment, now).unwrap();
        table.place_bid(c, BidKind::AllIn, now).unwrap();
        assert_eq!(table.player(a).unwrap().money, 9500);
        assert_eq!(table.player(b).unwrap().money, 9400);
        assert_eq!(table.player(c).unwrap().money, 0);
        assert_eq!(table.round.pot, 11100);
        assert_eq!(table.round.answering, Some(c));
    }

    #[test]
    fn bids_after_the_auction_closes_are_rejected() {
        let (mut table, players, now) = seated_table();
        let b = players[1];
        table.place_bid(b, BidKind::AllIn, now).unwrap();
        assert!(table.place_bid(b, BidKind::Increment, now).is_err());
    }

    #[test]
    fn raising_beyond_the_wallet_is_rejected() {
        let config = AppConfig {
            bid_increment: 20_000,
            ..AppConfig::default()
        };
        let mut table = GameTable::with_seed(config, 3);
        let now = SystemTime::now();
        let a = table.register_player("ala", now).unwrap();
        let b = table.register_player("ola", now).unwrap();
        table
            .select_question_set(a, crate::state::tests::sample_questions(2), now)
            .unwrap();
        let err = table.place_bid(b, BidKind::Increment, now).unwrap_err();
        assert!(matches!(err, crate::error::ServiceError::InsufficientFunds(_)));
    }

    #[test]
    fn fee_only_auction_leaves_nobody_answering() {
        let (mut table, players, now) = seated_table();
        let a = players[0];
        table.finish_bidding(a, now).unwrap();
        assert_eq!(table.phase(), Phase::Answering);
        assert_eq!(table.round.answering, None);
        assert_eq!(
            table.round.deadline,
            Some(now + table.config().no_bid_answer_duration)
        );
    }

    #[test]
    fn non_admin_finish_only_passes() {
        let (mut table, players, now) = seated_table();
        let b = players[1];
        table.finish_bidding(b, now).unwrap();
        assert_eq!(table.phase(), Phase::Bidding);
    }
}
