//! Player registry operations on the [`GameTable`].
//!
//! Players join at any time. The first joiner becomes the table admin;
//! when the admin leaves, the most tenured remaining player inherits the
//! role. Inactive players are evicted lazily whenever the table catches
//! up with the clock.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{
        game::{GameTable, ObserverReason, Player},
        state_machine::{Phase, RoundEvent},
    },
};

impl GameTable {
    /// Register a new player and return their identifier.
    ///
    /// Display names must be unique among connected players. When the
    /// table already seats the maximum number of active players, the
    /// newcomer joins as a capacity observer and is promoted once a
    /// seat frees up at a round start.
    pub fn register_player(&mut self, name: &str, now: SystemTime) -> Result<Uuid, ServiceError> {
        if self.players.values().any(|p| p.name == name) {
            return Err(ServiceError::InvalidInput(format!(
                "display name '{name}' is already taken"
            )));
        }

        let id = Uuid::new_v4();
        let is_admin = self.players.is_empty();
        let observer = (self.active_player_count() >= self.config.max_active_players)
            .then_some(ObserverReason::Capacity);

        info!(player = %id, name, is_admin, observer = observer.is_some(), "player joined");
        self.players.insert(
            id,
            Player {
                id,
                name: name.to_owned(),
                money: self.config.starting_stake,
                is_admin,
                observer,
                last_seen: now,
            },
        );
        self.push_system(format!("{name} joined the table"), now);
        Ok(id)
    }

    /// Record activity for a player, deferring their inactivity eviction.
    pub fn touch_player(&mut self, id: Uuid, now: SystemTime) -> Result<(), ServiceError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {id}")))?;
        player.last_seen = now;
        Ok(())
    }

    /// Look up a player, failing with `NotFound` for unknown ids.
    pub fn player(&self, id: Uuid) -> Result<&Player, ServiceError> {
        self.players
            .get(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {id}")))
    }

    /// Players currently holding a seat in the auction.
    pub(crate) fn active_player_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_observer()).count()
    }

    /// Drop players whose last activity predates the inactivity window.
    ///
    /// An evicted player's bid money stays in the pot. When the player
    /// slated to answer disappears, the round moves on as if their
    /// answer timer expired.
    pub(crate) fn evict_inactive(&mut self, now: SystemTime) {
        let timeout = self.config.inactivity_timeout;
        let evicted: Vec<Uuid> = self
            .players
            .values()
            .filter(|p| {
                now.duration_since(p.last_seen)
                    .map(|idle| idle > timeout)
                    .unwrap_or(false)
            })
            .map(|p| p.id)
            .collect();

        for id in evicted {
            self.remove_player(id, now);
        }
    }

    fn remove_player(&mut self, id: Uuid, now: SystemTime) {
        // shift_remove keeps insertion order intact for tenure.
        let Some(player) = self.players.shift_remove(&id) else {
            return;
        };
        info!(player = %id, name = %player.name, "player evicted for inactivity");
        self.push_system(format!("{} left the table", player.name), now);

        // Their bid money is already in the pot; only the ledger entry
        // goes away.
        self.bids.remove(&id);

        if player.is_admin {
            self.promote_admin();
        }

        if self.round.answering == Some(id) {
            self.round.answering = None;
            if self.machine.phase() == Phase::Answering {
                // Infallible: Answering always accepts ExpireAnswer.
                let _ = self.machine.apply(RoundEvent::ExpireAnswer);
                self.round.deadline = Some(now + self.config.discussion_duration);
                self.push_system("the answering player is gone, no answer recorded".into(), now);
            }
        }
    }

    /// Hand the admin role to the most tenured remaining player.
    fn promote_admin(&mut self) {
        if let Some(heir) = self.players.values_mut().next() {
            heir.is_admin = true;
            info!(player = %heir.id, name = %heir.name, "admin role inherited");
        }
    }

    /// Re-seat observers ahead of a round start.
    ///
    /// Funds observers return as soon as their wallet covers the entry
    /// fee again. Capacity observers fill freed seats in tenure order.
    pub(crate) fn refresh_observers(&mut self) {
        let entry_fee = self.config.entry_fee;
        for player in self.players.values_mut() {
            if player.observer == Some(ObserverReason::Funds) && player.money >= entry_fee {
                player.observer = None;
            }
        }

        let mut seats = self
            .config
            .max_active_players
            .saturating_sub(self.players.values().filter(|p| !p.is_observer()).count());
        for player in self.players.values_mut() {
            if seats == 0 {
                break;
            }
            if player.observer == Some(ObserverReason::Capacity) {
                player.observer = None;
                seats -= 1;
            }
        }

        // Anyone seated but broke sits the next round out.
        for player in self.players.values_mut() {
            if player.observer.is_none() && player.money < entry_fee {
                player.observer = Some(ObserverReason::Funds);
            }
        }
    }
}
