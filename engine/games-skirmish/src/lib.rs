//! A deliberately small two-player card game implementing the `rules-core`
//! facade.
//!
//! The pool is lands, vanilla creatures and a few sorceries; combat is
//! auto-resolved (every ready creature of the turn player attacks the
//! opposing face, unblocked) when the game advances through the combat
//! damage step. That is enough surface for the search, evaluator and
//! bridge crates to run end-to-end against a real `Game` implementation,
//! which is this crate's whole purpose.
//!
//! Design notes:
//! - Card ids are stamped on entry and preserved by `snapshot`, so
//!   `reverse_map` is a membership probe.
//! - The stack resolves immediately; `stack_size` is always 0.
//! - Candidate descriptions embed the host card id and therefore
//!   reproduce exactly in snapshots.

pub mod cards;
mod combat;

pub use combat::SkirmishCombat;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rules_core::{
    Action, ApiKind, Card, CardId, DeckStatistics, Game, Keyword, Outcome, Phase, PlayerId, Zone,
};

#[derive(Debug, Clone)]
struct PlayerState {
    life: i32,
    poison: u32,
    max_hand: usize,
    hand: Vec<Card>,
    library: Vec<Card>,
    graveyard: Vec<Card>,
    battlefield: Vec<Card>,
    land_played_this_turn: bool,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            life: 20,
            poison: 0,
            max_hand: 7,
            hand: Vec::new(),
            library: Vec::new(),
            graveyard: Vec::new(),
            battlefield: Vec::new(),
            land_played_this_turn: false,
        }
    }

    fn untapped_lands(&self) -> usize {
        self.battlefield
            .iter()
            .filter(|c| c.is_land() && !c.tapped)
            .count()
    }
}

/// The match state.
#[derive(Debug, Clone)]
pub struct SkirmishGame {
    players: [PlayerState; 2],
    turn: u32,
    phase: Phase,
    active: PlayerId,
    next_id: u32,
    outcome: Option<Outcome>,
}

impl SkirmishGame {
    fn other(p: PlayerId) -> PlayerId {
        PlayerId(1 - p.0)
    }

    fn player(&self, p: PlayerId) -> &PlayerState {
        &self.players[p.index()]
    }

    fn player_mut(&mut self, p: PlayerId) -> &mut PlayerState {
        &mut self.players[p.index()]
    }

    /// Public turn driver for tests and rollout scaffolding: move to the
    /// next player's turn, untap, lift summoning sickness, draw.
    pub fn next_turn(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.active = Self::other(self.active);
        self.turn += 1;
        self.phase = Phase::Untap;
        let active = self.active;
        for c in self.player_mut(active).battlefield.iter_mut() {
            c.tapped = false;
            c.sick = false;
        }
        self.player_mut(active).land_played_this_turn = false;
        self.draw_cards(active, 1);
    }

    /// Set the current phase directly (test setup only; no combat runs).
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    /// Build the combat declaration surface for the given attacking player.
    pub fn new_combat(&self, attacking: PlayerId) -> SkirmishCombat {
        let defending = Self::other(attacking);
        let pool = self
            .players
            .iter()
            .flat_map(|p| p.battlefield.iter())
            .filter(|c| c.is_creature())
            .map(|c| combat::Combatant {
                id: c.id,
                controller: c.controller,
                tapped: c.tapped,
                sick: c.sick,
                keywords: c.keywords,
                colors: c.colors,
                artifact: c.types.artifact,
            })
            .collect();
        SkirmishCombat::new(attacking, defending, pool)
    }

    fn draw_cards(&mut self, p: PlayerId, n: usize) {
        for _ in 0..n {
            match self.player_mut(p).library.pop() {
                Some(card) => self.player_mut(p).hand.push(card),
                None => {
                    // Drawing from an empty library loses the game.
                    let winner = Self::other(p);
                    self.finish(Some(winner), "Milled");
                    return;
                }
            }
        }
    }

    fn finish(&mut self, winner: Option<PlayerId>, condition: &str) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(Outcome {
            is_draw: winner.is_none(),
            winning_team: winner.map(|p| p.0),
            winning_player: winner,
            win_condition: condition.into(),
        });
    }

    fn check_life(&mut self) {
        for p in [PlayerId(0), PlayerId(1)] {
            if self.player(p).life <= 0 {
                self.finish(Some(Self::other(p)), "Life");
                return;
            }
        }
    }

    fn describe(card: &Card) -> String {
        if card.is_land() {
            format!("Play {} [{}]", card.name, card.id.0)
        } else {
            format!("Cast {} [{}]", card.name, card.id.0)
        }
    }

    fn api_for(card: &Card) -> ApiKind {
        if card.is_creature() {
            ApiKind::PermanentCreature
        } else if card.is_land() {
            ApiKind::Other
        } else {
            match card.name.as_str() {
                "Singe" | "Ember Lance" | "Wildfire Surge" => ApiKind::DealDamage,
                "Foresee" => ApiKind::Draw,
                _ => ApiKind::Other,
            }
        }
    }

    fn tap_lands(&mut self, p: PlayerId, amount: usize) -> bool {
        if self.player(p).untapped_lands() < amount {
            return false;
        }
        let mut remaining = amount;
        for c in self.player_mut(p).battlefield.iter_mut() {
            if remaining == 0 {
                break;
            }
            if c.is_land() && !c.tapped {
                c.tapped = true;
                remaining -= 1;
            }
        }
        remaining == 0
    }

    fn remove_from_hand(&mut self, p: PlayerId, id: CardId) -> Option<Card> {
        let hand = &mut self.player_mut(p).hand;
        let pos = hand.iter().position(|c| c.id == id)?;
        Some(hand.remove(pos))
    }

    fn resolve_sorcery(&mut self, p: PlayerId, card: Card, targets: &[CardId], x: u32) -> bool {
        let opponent = Self::other(p);
        match card.name.as_str() {
            "Singe" => {
                let target = match targets.first() {
                    Some(t) => *t,
                    None => return false,
                };
                let mut destroyed = None;
                for side in [PlayerId(0), PlayerId(1)] {
                    let bf = &mut self.player_mut(side).battlefield;
                    if let Some(pos) = bf
                        .iter()
                        .position(|c| c.id == target && c.is_creature())
                    {
                        if bf[pos].net_toughness() <= 2 {
                            destroyed = Some((side, bf.remove(pos)));
                        }
                        // Tougher creatures shrug the damage off; no
                        // persistent damage marking in this pool.
                        break;
                    }
                }
                if let Some((side, dead)) = destroyed {
                    self.player_mut(side).graveyard.push(dead);
                }
            }
            "Ember Lance" => {
                self.player_mut(opponent).life -= 3;
            }
            "Wildfire Surge" => {
                self.player_mut(opponent).life -= x as i32;
            }
            "Foresee" => {
                self.draw_cards(p, 2);
            }
            _ => return false,
        }
        self.player_mut(p).graveyard.push(card);
        self.check_life();
        true
    }

    fn auto_combat(&mut self) {
        let attacker = self.active;
        let defender = Self::other(attacker);
        let mut damage = 0;
        let mut lifegain = 0;
        for c in self.player_mut(attacker).battlefield.iter_mut() {
            if c.is_creature()
                && !c.tapped
                && !c.sick
                && !c.keywords.has(Keyword::Defender)
                && c.net_power() > 0
            {
                damage += c.net_power();
                if c.keywords.has(Keyword::Lifelink) {
                    lifegain += c.net_power();
                }
                if !c.keywords.has(Keyword::Vigilance) {
                    c.tapped = true;
                }
            }
        }
        self.player_mut(defender).life -= damage;
        self.player_mut(attacker).life += lifegain;
        self.check_life();
    }
}

impl Game for SkirmishGame {
    type Combat = SkirmishCombat;

    fn snapshot(&self) -> Self {
        self.clone()
    }

    fn reverse_map(&self, copied: CardId, original: &Self) -> Option<CardId> {
        // Ids are stable across snapshots, so an antecedent exists exactly
        // when the original game knows the id.
        if original.card(copied).is_some() {
            Some(copied)
        } else {
            None
        }
    }

    fn players(&self) -> Vec<PlayerId> {
        vec![PlayerId(0), PlayerId(1)]
    }

    fn opponents(&self, p: PlayerId) -> Vec<PlayerId> {
        vec![Self::other(p)]
    }

    fn team(&self, p: PlayerId) -> u8 {
        p.0
    }

    fn life(&self, p: PlayerId) -> i32 {
        self.player(p).life
    }

    fn poison_counters(&self, p: PlayerId) -> u32 {
        self.player(p).poison
    }

    fn max_hand_size(&self, p: PlayerId) -> usize {
        self.player(p).max_hand
    }

    fn zone_size(&self, p: PlayerId, zone: Zone) -> usize {
        match zone {
            Zone::Hand => self.player(p).hand.len(),
            Zone::Library => self.player(p).library.len(),
            Zone::Battlefield => self.player(p).battlefield.len(),
            Zone::Graveyard => self.player(p).graveyard.len(),
            Zone::Stack | Zone::Exile => 0,
        }
    }

    fn cards_in(&self, p: PlayerId, zone: Zone) -> Vec<&Card> {
        let cards = match zone {
            Zone::Hand => &self.player(p).hand,
            Zone::Library => &self.player(p).library,
            Zone::Battlefield => &self.player(p).battlefield,
            Zone::Graveyard => &self.player(p).graveyard,
            Zone::Stack | Zone::Exile => return Vec::new(),
        };
        cards.iter().collect()
    }

    fn battlefield(&self) -> Vec<&Card> {
        self.players
            .iter()
            .flat_map(|p| p.battlefield.iter())
            .collect()
    }

    fn creatures_in_play(&self, p: PlayerId) -> Vec<&Card> {
        self.player(p)
            .battlefield
            .iter()
            .filter(|c| c.is_creature())
            .collect()
    }

    fn card(&self, id: CardId) -> Option<&Card> {
        self.players.iter().find_map(|p| {
            p.hand
                .iter()
                .chain(p.library.iter())
                .chain(p.battlefield.iter())
                .chain(p.graveyard.iter())
                .find(|c| c.id == id)
        })
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_player_turn(&self, p: PlayerId) -> bool {
        self.active == p
    }

    fn stack_size(&self) -> usize {
        0
    }

    fn advance_to_phase(&mut self, phase: Phase) {
        while self.phase.is_before(phase) && self.outcome.is_none() {
            let next = Phase::ALL[self.phase.ordinal() + 1];
            self.phase = next;
            if next == Phase::CombatDamage {
                self.auto_combat();
            }
        }
    }

    fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn outcome(&self) -> Option<Outcome> {
        self.outcome.clone()
    }

    fn deck_statistics(&self, p: PlayerId) -> DeckStatistics {
        let mut stats = DeckStatistics::default();
        let ps = self.player(p);
        for c in ps
            .hand
            .iter()
            .chain(ps.library.iter())
            .chain(ps.battlefield.iter())
            .chain(ps.graveyard.iter())
        {
            if c.is_land() {
                continue;
            }
            // Every colored card in the pool has a single colored pip.
            for (i, has) in [
                c.colors.has_white(),
                c.colors.has_blue(),
                c.colors.has_black(),
                c.colors.has_red(),
                c.colors.has_green(),
            ]
            .into_iter()
            .enumerate()
            {
                if has {
                    stats.max_pips[i] = stats.max_pips[i].max(1);
                }
            }
            stats.max_cost = stats.max_cost.max(c.cmc);
        }
        stats
    }

    fn candidate_actions(&self, p: PlayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.outcome.is_some()
            || self.active != p
            || !matches!(self.phase, Phase::Main1 | Phase::Main2)
        {
            return actions;
        }
        let ps = self.player(p);
        let mana = ps.untapped_lands();
        for card in &ps.hand {
            if card.is_land() {
                if !ps.land_played_this_turn {
                    actions.push(Action {
                        description: Self::describe(card),
                        host: Some(card.id),
                        api: Self::api_for(card),
                        is_land_play: true,
                        requires_target: false,
                        x_range: None,
                        mode_mask: None,
                    });
                }
                continue;
            }
            if (card.cmc as usize) > mana {
                continue;
            }
            let requires_target = card.name == "Singe";
            if requires_target && !self.battlefield().iter().any(|c| c.is_creature()) {
                continue;
            }
            let x_range = if card.name == "Wildfire Surge" {
                Some((0, (mana - card.cmc as usize) as u32))
            } else {
                None
            };
            actions.push(Action {
                description: Self::describe(card),
                host: Some(card.id),
                api: Self::api_for(card),
                is_land_play: false,
                requires_target,
                x_range,
                mode_mask: None,
            });
        }
        actions
    }

    fn legal_targets(&self, _p: PlayerId, action: &Action) -> Vec<CardId> {
        if !action.requires_target {
            return Vec::new();
        }
        self.battlefield()
            .iter()
            .filter(|c| c.is_creature())
            .map(|c| c.id)
            .collect()
    }

    fn play_action(
        &mut self,
        p: PlayerId,
        action: &Action,
        targets: &[CardId],
        x: Option<u32>,
    ) -> bool {
        if self.outcome.is_some() || self.active != p {
            return false;
        }
        let host = match action.host {
            Some(h) => h,
            None => return false,
        };
        let in_hand = self.player(p).hand.iter().any(|c| c.id == host);
        if !in_hand {
            return false;
        }

        if action.is_land_play {
            if self.player(p).land_played_this_turn {
                return false;
            }
            let mut card = match self.remove_from_hand(p, host) {
                Some(c) if c.is_land() => c,
                _ => return false,
            };
            card.tapped = false;
            self.player_mut(p).battlefield.push(card);
            self.player_mut(p).land_played_this_turn = true;
            return true;
        }

        let card = match self.player(p).hand.iter().find(|c| c.id == host) {
            Some(c) => c.clone(),
            None => return false,
        };
        if action.requires_target {
            let valid = targets.first().is_some_and(|t| {
                self.battlefield()
                    .iter()
                    .any(|c| c.id == *t && c.is_creature())
            });
            if !valid {
                return false;
            }
        }
        let x = x.unwrap_or(0);
        let cost = card.cmc as usize + x as usize;
        if !self.tap_lands(p, cost) {
            return false;
        }
        let card = match self.remove_from_hand(p, host) {
            Some(c) => c,
            None => return false,
        };

        if card.is_creature() {
            let mut card = card;
            card.sick = !card.keywords.has(Keyword::Haste);
            self.player_mut(p).battlefield.push(card);
            return true;
        }
        self.resolve_sorcery(p, card, targets, x)
    }
}

/// Builder for test scenarios.
#[derive(Debug)]
pub struct SkirmishBuilder {
    game: SkirmishGame,
}

impl Default for SkirmishBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SkirmishBuilder {
    pub fn new() -> Self {
        Self {
            game: SkirmishGame {
                players: [PlayerState::new(), PlayerState::new()],
                turn: 1,
                phase: Phase::Untap,
                active: PlayerId(0),
                next_id: 1,
                outcome: None,
            },
        }
    }

    fn stamp(&mut self, mut card: Card) -> Card {
        card.id = CardId(self.game.next_id);
        self.game.next_id += 1;
        card
    }

    pub fn life(mut self, p: PlayerId, life: i32) -> Self {
        self.game.player_mut(p).life = life;
        self
    }

    pub fn hand(mut self, p: PlayerId, cards: Vec<Card>) -> Self {
        for card in cards {
            let card = self.stamp(card);
            self.game.player_mut(p).hand.push(card);
        }
        self
    }

    pub fn library(mut self, p: PlayerId, cards: Vec<Card>) -> Self {
        for card in cards {
            let card = self.stamp(card);
            self.game.player_mut(p).library.push(card);
        }
        self
    }

    /// Put cards onto the battlefield, untapped and not summoning sick.
    pub fn battlefield(mut self, p: PlayerId, cards: Vec<Card>) -> Self {
        for card in cards {
            let card = self.stamp(card);
            self.game.player_mut(p).battlefield.push(card);
        }
        self
    }

    pub fn turn(mut self, turn: u32) -> Self {
        self.game.turn = turn;
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.game.phase = phase;
        self
    }

    pub fn active(mut self, p: PlayerId) -> Self {
        self.game.active = p;
        self
    }

    pub fn build(self) -> SkirmishGame {
        self.game
    }

    /// Shuffle `deck` with the given seed and deal a 7-card opening hand to
    /// each player. Turn 1, untap step, player 0 active.
    pub fn standard_game(deck0: Vec<Card>, deck1: Vec<Card>, seed: u64) -> SkirmishGame {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut builder = Self::new();
        for (p, deck) in [(PlayerId(0), deck0), (PlayerId(1), deck1)] {
            let mut deck: Vec<Card> = deck;
            deck.shuffle(&mut rng);
            builder = builder.library(p, deck);
        }
        let mut game = builder.build();
        for p in [PlayerId(0), PlayerId(1)] {
            game.draw_cards(p, 7);
        }
        game
    }
}

#[cfg(test)]
mod tests;
