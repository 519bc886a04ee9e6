//! Combat declaration surface.

use rules_core::{CardId, ColorSet, Combat, Keyword, KeywordSet, PlayerId};

#[derive(Debug, Clone)]
pub(crate) struct Combatant {
    pub id: CardId,
    pub controller: PlayerId,
    pub tapped: bool,
    pub sick: bool,
    pub keywords: KeywordSet,
    pub colors: ColorSet,
    pub artifact: bool,
}

/// One combat's attack/block declarations. Built from a game snapshot of
/// the creatures in play; mutating it never touches the game, the engine
/// applies the declarations afterwards.
#[derive(Debug, Clone)]
pub struct SkirmishCombat {
    attacking_player: PlayerId,
    defending_player: PlayerId,
    pool: Vec<Combatant>,
    attackers: Vec<(CardId, PlayerId)>,
    blocks: Vec<(CardId, CardId)>,
}

impl SkirmishCombat {
    pub(crate) fn new(
        attacking_player: PlayerId,
        defending_player: PlayerId,
        pool: Vec<Combatant>,
    ) -> Self {
        Self {
            attacking_player,
            defending_player,
            pool,
            attackers: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn combatant(&self, id: CardId) -> Option<&Combatant> {
        self.pool.iter().find(|c| c.id == id)
    }

    pub fn blocks(&self) -> &[(CardId, CardId)] {
        &self.blocks
    }

    fn shares_color(a: ColorSet, b: ColorSet) -> bool {
        (a.has_white() && b.has_white())
            || (a.has_blue() && b.has_blue())
            || (a.has_black() && b.has_black())
            || (a.has_red() && b.has_red())
            || (a.has_green() && b.has_green())
    }
}

impl Combat for SkirmishCombat {
    fn attackers(&self) -> Vec<CardId> {
        self.attackers.iter().map(|(id, _)| *id).collect()
    }

    fn defenders(&self) -> Vec<PlayerId> {
        vec![self.defending_player]
    }

    fn can_attack(&self, attacker: CardId, defender: PlayerId) -> bool {
        if defender != self.defending_player {
            return false;
        }
        match self.combatant(attacker) {
            Some(c) => {
                c.controller == self.attacking_player
                    && !c.tapped
                    && !c.sick
                    && !c.keywords.has(Keyword::Defender)
            }
            None => false,
        }
    }

    fn can_block(&self, blocker: CardId) -> bool {
        match self.combatant(blocker) {
            Some(c) => c.controller == self.defending_player && !c.tapped,
            None => false,
        }
    }

    fn can_block_attacker(&self, attacker: CardId, blocker: CardId) -> bool {
        if !self.can_block(blocker) {
            return false;
        }
        let (att, blk) = match (self.combatant(attacker), self.combatant(blocker)) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        if att.keywords.has(Keyword::Flying)
            && !(blk.keywords.has(Keyword::Flying) || blk.keywords.has(Keyword::Reach))
        {
            return false;
        }
        if att.keywords.has(Keyword::Horsemanship) && !blk.keywords.has(Keyword::Horsemanship) {
            return false;
        }
        if att.keywords.has(Keyword::Shadow) != blk.keywords.has(Keyword::Shadow) {
            return false;
        }
        if att.keywords.has(Keyword::Fear) && !(blk.artifact || blk.colors.has_black()) {
            return false;
        }
        if att.keywords.has(Keyword::Intimidate)
            && !(blk.artifact || Self::shares_color(att.colors, blk.colors))
        {
            return false;
        }
        true
    }

    fn add_attacker(&mut self, attacker: CardId, defender: PlayerId) {
        if !self.attackers.iter().any(|(id, _)| *id == attacker) {
            self.attackers.push((attacker, defender));
        }
    }

    fn add_blocker(&mut self, attacker: CardId, blocker: CardId) {
        self.blocks.push((attacker, blocker));
    }

    fn clear_attackers(&mut self) {
        self.attackers.clear();
        self.blocks.clear();
    }

    fn validate_attackers(&self) -> bool {
        self.attackers
            .iter()
            .all(|(id, def)| self.can_attack(*id, *def))
    }
}
