//! Static position evaluation.
//!
//! Produces a [`Score`] for `(game, player)`. Deterministic and pure apart
//! from an owned cache of non-creature card values; creature values depend
//! on the current board and are never cached.
//!
//! Non-terminal positions before the combat damage step are scored on a
//! snapshot fast-forwarded through combat, folding "imminent combat" into
//! the evaluation. This is why the minimax layer runs all-MAX: the
//! opponent's combat response is already priced in here.

use std::collections::HashMap;

use rules_core::{Card, CardId, Game, ManaColor, Phase, PlayerId, Zone};
use tracing::trace;

use crate::creature;
use crate::score::Score;
use crate::synergy;

#[derive(Debug, Default)]
pub struct GameStateEvaluator {
    /// Synergy bonus magnitude from the AI profile. 0 disables the scan.
    combo_state_bonus: i32,
    /// Cached values for non-creature permanents, keyed by identity and
    /// tapped state (the attributes their value can depend on).
    card_cache: HashMap<(CardId, bool), i32>,
}

impl GameStateEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combo_bonus(combo_state_bonus: i32) -> Self {
        Self {
            combo_state_bonus,
            card_cache: HashMap::new(),
        }
    }

    pub fn set_combo_state_bonus(&mut self, bonus: i32) {
        self.combo_state_bonus = bonus;
    }

    /// Score the game from `ai_player`'s perspective. Never fails: terminal
    /// states yield the `Score::WIN`/`Score::LOSS` sentinels, everything
    /// else a finite pair.
    pub fn score_for_game_state<G: Game>(&mut self, game: &G, ai_player: PlayerId) -> Score {
        if game.is_over() {
            return Self::score_for_game_over(game, ai_player);
        }

        if let Some(copy) = Self::simulate_upcoming_combat(game, ai_player) {
            if copy.is_over() {
                return Self::score_for_game_over(&copy, ai_player);
            }
            return self.score_impl(&copy, ai_player);
        }
        self.score_impl(game, ai_player)
    }

    fn score_for_game_over<G: Game>(game: &G, ai_player: PlayerId) -> Score {
        match game.outcome() {
            Some(outcome) => {
                let won = outcome.winning_team == Some(game.team(ai_player))
                    || outcome.winning_player == Some(ai_player);
                if won {
                    Score::WIN
                } else {
                    Score::LOSS
                }
            }
            // is_over without an outcome would be an engine bug; treat as lost.
            None => Score::LOSS,
        }
    }

    /// Fast-forward a snapshot to the combat damage step so the evaluation
    /// sees the attack that is already on the table. Skipped when combat is
    /// past, or when the turn player has no creatures (no combat possible,
    /// and the snapshot is not cheap).
    fn simulate_upcoming_combat<G: Game>(game: &G, _ai_player: PlayerId) -> Option<G> {
        let phase = game.phase();
        if phase.is_after(Phase::CombatDamage) || game.is_over() {
            return None;
        }
        let turn_player = game.players().into_iter().find(|p| game.is_player_turn(*p))?;
        if game.creatures_in_play(turn_player).is_empty() {
            return None;
        }

        let mut copy = game.snapshot();
        copy.advance_to_phase(Phase::CombatDamage);
        Some(copy)
    }

    fn score_impl<G: Game>(&mut self, game: &G, ai_player: PlayerId) -> Score {
        let mut score: i64 = 0;

        // Hand material, with excess over max hand size counted only 1x.
        let mut my_cards = game.zone_size(ai_player, Zone::Hand) as i64;
        let their_cards: i64 = game
            .opponents(ai_player)
            .iter()
            .map(|p| game.zone_size(*p, Zone::Hand) as i64)
            .sum();
        let max_hand = game.max_hand_size(ai_player) as i64;
        if !game.has_unlimited_hand_size(ai_player) && my_cards > max_hand {
            score += my_cards - max_hand;
            my_cards = max_hand;
        }
        score += 5 * my_cards - 4 * their_cards;

        // Life differential.
        score += 2 * game.life(ai_player) as i64;
        let opponents = game.opponents(ai_player);
        let opponent_life: i64 = opponents.iter().map(|p| game.life(*p) as i64).sum();
        score -= 2 * opponent_life / opponents.len().max(1) as i64;

        let combo_bonus = synergy::evaluate_combo_state(game, ai_player, self.combo_state_bonus);
        if combo_bonus > 0 {
            trace!(combo_bonus, "combo state bonus");
            score += combo_bonus as i64;
        }

        score += self.eval_mana_base(game, ai_player) as i64;

        // Shadow score treating the player's summoning-sick creatures as
        // worthless: before MAIN2 this discourages pre-combat creature
        // drops that buy nothing this turn.
        let mut summon_sick_score = score;
        let game_phase = game.phase();
        for c in game.battlefield() {
            let value = self.eval_card(game, ai_player, c) as i64;
            let mut summon_sick_value = value;
            if game_phase.is_before(Phase::Main2) && c.sick && c.controller == ai_player {
                summon_sick_value = 0;
            }
            trace!(card = %c.name, value, "battlefield");
            if c.controller == ai_player {
                score += value;
                summon_sick_score += summon_sick_value;
            } else {
                score -= value;
                summon_sick_score -= summon_sick_value;
            }
        }

        trace!(score, "evaluated position");
        Score::new(
            score.clamp(i32::MIN as i64 + 1, i32::MAX as i64 - 1) as i32,
            summon_sick_score.clamp(i32::MIN as i64 + 1, i32::MAX as i64 - 1) as i32,
        )
    }

    /// Mana base quality: colored-pip coverage and total producible mana,
    /// measured against what the deck actually asks for.
    pub fn eval_mana_base<G: Game>(&self, game: &G, player: PlayerId) -> i32 {
        let stats = game.deck_statistics(player);
        let mut value: i64 = 0;
        let mut max_total: i64 = 0;
        let mut counts = [0u32; ManaColor::COUNT];

        for c in game.cards_in(player, Zone::Battlefield) {
            let mut max_produced: i64 = 0;
            for m in &c.mana_abilities {
                max_produced = max_produced.max(m.net_produced());
                for color in &m.produces {
                    counts[color.index()] += 1;
                }
                // "Any color" production carries no specific pip.
            }
            max_total += max_produced;
        }

        for (i, &count) in counts.iter().enumerate() {
            value += count.min(stats.max_pips[i]) as i64 * 100;
        }
        // Being able to cast everything in the deck, with excess mana worth
        // far less than coverage.
        value += max_total.min(stats.max_cost as i64) * 100;
        value += (max_total - stats.max_cost as i64).max(0) * 5;

        value as i32
    }

    /// Value of a single card in play. Creatures are board-dependent and
    /// never cached; everything else caches on (identity, tapped).
    pub fn eval_card<G: Game>(&mut self, game: &G, _ai_player: PlayerId, c: &Card) -> i32 {
        if c.is_creature() {
            return creature::evaluate(game, c);
        }
        let key = (c.id, c.tapped);
        if let Some(&cached) = self.card_cache.get(&key) {
            return cached;
        }
        let value = if c.is_land() {
            Self::evaluate_land(c)
        } else if c.enchanting.is_some() {
            // An aura's value should show up in what it enchants; counting
            // it here double-charges recasting effects.
            0
        } else {
            let mut value = 50 + 30 * c.cmc as i32;
            if c.types.planeswalker {
                value += 2 * c.loyalty as i32;
            }
            value
        };
        self.card_cache.insert(key, value);
        value
    }

    pub fn evaluate_land(c: &Card) -> i32 {
        let mut value = 3;

        // Each point of free mana is worth a hundred; color flexibility a
        // little on top.
        let mut max_produced: i64 = 0;
        let mut colors = [false; ManaColor::COUNT];
        let mut any_color = false;
        for m in &c.mana_abilities {
            max_produced = max_produced.max(m.net_produced());
            for color in &m.produces {
                colors[color.index()] = true;
            }
            any_color |= m.any_color;
        }
        value += 100 * max_produced as i32;
        let distinct = colors.iter().filter(|&&b| b).count();
        let distinct = if any_color { distinct.max(5) } else { distinct };
        value += distinct as i32 * 3;

        // Non-mana activated abilities, rated by cost shape. Must beat the
        // value of a card in hand so an abilities-only land still gets
        // played.
        for ability in &c.activated_abilities {
            if !ability.tap_cost {
                // Probably a manland; better than a rainbow land.
                value += 25;
            } else if ability.sacrifice_cost {
                // One-shot effect.
                value += 10;
            } else {
                // Repeatable utility, gets you ahead over time.
                value += 50;
            }
        }

        value += 6 * c.static_ability_count as i32;

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_skirmish::{cards, SkirmishBuilder};
    use rules_core::{ActivatedAbility, Keyword, KeywordSet};

    #[test]
    fn test_terminal_scores() {
        let p = PlayerId(0);
        let mut game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::lava_spike(p)])
            .battlefield(p, vec![cards::mountain(p)])
            .phase(Phase::Main1)
            .build();
        let action = game.candidate_actions(p).pop().unwrap();
        assert!(game.play_action(p, &action, &[], None));
        assert!(game.is_over());

        let mut evaluator = GameStateEvaluator::new();
        assert_eq!(evaluator.score_for_game_state(&game, p), Score::WIN);
        assert_eq!(
            evaluator.score_for_game_state(&game, PlayerId(1)),
            Score::LOSS
        );
    }

    #[test]
    fn test_nonterminal_is_finite() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .battlefield(p, vec![cards::forest(p), cards::bear(p)])
            .phase(Phase::Main2)
            .build();
        let mut evaluator = GameStateEvaluator::new();
        let score = evaluator.score_for_game_state(&game, p);
        assert!(!score.is_terminal());
    }

    #[test]
    fn test_more_board_is_better() {
        let p = PlayerId(0);
        let empty = SkirmishBuilder::new().phase(Phase::Main2).build();
        let board = SkirmishBuilder::new()
            .battlefield(p, vec![cards::forest(p), cards::bear(p)])
            .phase(Phase::Main2)
            .build();

        let mut evaluator = GameStateEvaluator::new();
        let a = evaluator.score_for_game_state(&empty, p);
        let b = evaluator.score_for_game_state(&board, p);
        assert!(b.value > a.value);
    }

    #[test]
    fn test_hand_clamp() {
        let p = PlayerId(0);
        // Nine cards in hand: two over the limit count 1x instead of 5x.
        let nine: Vec<_> = (0..9).map(|_| cards::bear(p)).collect();
        let seven: Vec<_> = (0..7).map(|_| cards::bear(p)).collect();
        let over = SkirmishBuilder::new().hand(p, nine).phase(Phase::Main2).build();
        let full = SkirmishBuilder::new().hand(p, seven).phase(Phase::Main2).build();

        let mut evaluator = GameStateEvaluator::new();
        let over_score = evaluator.score_for_game_state(&over, p);
        let full_score = evaluator.score_for_game_state(&full, p);
        assert_eq!(over_score.value - full_score.value, 2);
    }

    #[test]
    fn test_summon_sick_shadow_score() {
        let p = PlayerId(0);
        let mut game = SkirmishBuilder::new()
            .hand(p, vec![cards::bear(p)])
            .battlefield(p, vec![cards::forest(p), cards::forest(p)])
            .phase(Phase::Main1)
            .build();
        let action = game
            .candidate_actions(p)
            .into_iter()
            .find(|a| !a.is_land_play)
            .unwrap();
        assert!(game.play_action(p, &action, &[], None));

        let mut evaluator = GameStateEvaluator::new();
        let score = evaluator.score_for_game_state(&game, p);
        // The fresh bear counts in value but not in the sick variant.
        assert!(score.value > score.summon_sick_value);
    }

    #[test]
    fn test_mana_base_rewards_coverage() {
        let p = PlayerId(0);
        // A red deck: a mountain in play covers the red pip and one mana
        // toward the deck's top cost.
        let game = SkirmishBuilder::new()
            .battlefield(p, vec![cards::mountain(p)])
            .library(p, vec![cards::hill_giant(p)])
            .build();
        let evaluator = GameStateEvaluator::new();
        // 100 (red pip covered) + 100 (1 producible vs max cost 3).
        assert_eq!(evaluator.eval_mana_base(&game, p), 200);
    }

    #[test]
    fn test_land_value_shapes() {
        let p = PlayerId(0);
        let plain = cards::forest(p);
        // Repeatable utility plus a static ability.
        let utility = cards::watchtower(p);
        assert_eq!(GameStateEvaluator::evaluate_land(&plain), 3 + 100 + 3);
        assert_eq!(
            GameStateEvaluator::evaluate_land(&utility),
            3 + 100 + 3 + 50 + 6
        );

        let mut sac_land = cards::forest(p);
        sac_land.activated_abilities = vec![ActivatedAbility {
            tap_cost: true,
            sacrifice_cost: true,
        }];
        assert_eq!(GameStateEvaluator::evaluate_land(&sac_land), 3 + 100 + 3 + 10);
    }

    #[test]
    fn test_combo_bonus_low_life() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .phase(Phase::Main2)
            .build();

        let mut plain = GameStateEvaluator::new();
        let mut combo = GameStateEvaluator::with_combo_bonus(200);
        let base = plain.score_for_game_state(&game, p);
        let boosted = combo.score_for_game_state(&game, p);
        // <= 5 life gives half the bonus, <= 3 the full bonus on top.
        assert_eq!(boosted.value - base.value, 300);
    }

    #[test]
    fn test_keyword_creature_worth_more_in_play() {
        let p = PlayerId(0);
        let vanilla = SkirmishBuilder::new()
            .battlefield(p, vec![cards::bear(p)])
            .phase(Phase::Main2)
            .build();
        let mut lifelinker = cards::bear(p);
        lifelinker.keywords = KeywordSet::EMPTY.with(Keyword::Lifelink);
        let linked = SkirmishBuilder::new()
            .battlefield(p, vec![lifelinker])
            .phase(Phase::Main2)
            .build();

        let mut evaluator = GameStateEvaluator::new();
        assert!(
            evaluator.score_for_game_state(&linked, p).value
                > evaluator.score_for_game_state(&vanilla, p).value
        );
    }
}
