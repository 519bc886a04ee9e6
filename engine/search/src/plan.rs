//! Plans: the best line the search found, as a flat list of decisions.
//!
//! During the search, decisions form a tree of parent-linked nodes (an
//! action choice, a target set, a mode mask, chosen cards, an announced X
//! each get their own node). The final plan is the root-to-leaf sequence
//! of the best line with the ancillary nodes merged into their owning
//! action entry.

use rules_core::{Action, CardId, Game};

use crate::score::Score;

/// Serializable handle identifying an action across game copies.
///
/// Resolution policy: try the stored candidate index if the description
/// there matches; otherwise fall back to the first candidate with the same
/// description; otherwise not found (the search abandons the branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
    index: usize,
    description: String,
    host_card_name: String,
}

impl ActionRef {
    pub fn new<G: Game>(game: &G, candidates: &[Action], index: usize) -> Self {
        let action = &candidates[index];
        let host_card_name = action
            .host
            .and_then(|id| game.card(id))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        ActionRef {
            index,
            description: action.description.clone(),
            host_card_name,
        }
    }

    /// Re-resolve against an equivalent game copy's candidate list.
    pub fn find_in<'a>(&self, candidates: &'a [Action]) -> Option<&'a Action> {
        if let Some(action) = candidates.get(self.index) {
            if action.description == self.description {
                return Some(action);
            }
        }
        candidates
            .iter()
            .find(|a| a.description == self.description)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn host_card_name(&self) -> &str {
        &self.host_card_name
    }
}

/// One recorded choice while descending the search tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionKind {
    Action(ActionRef),
    Targets(Vec<CardId>),
    Modes(u32, String),
    Cards(Vec<String>),
    XValue(u32),
}

/// Internal tree node; nodes live in the controller's arena and link to
/// their parent by index.
#[derive(Debug, Clone)]
pub(crate) struct DecisionNode {
    pub initial_score: Score,
    pub prev: Option<usize>,
    pub kind: DecisionKind,
}

/// One action of a finished plan, with its merged sub-decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDecision {
    pub initial_score: Score,
    pub action: ActionRef,
    pub targets: Option<Vec<CardId>>,
    pub modes: Option<(u32, String)>,
    pub choices: Option<Vec<String>>,
    pub x_value: Option<u32>,
}

impl PlanDecision {
    fn new(initial_score: Score, action: ActionRef) -> Self {
        PlanDecision {
            initial_score,
            action,
            targets: None,
            modes: None,
            choices: None,
            x_value: None,
        }
    }
}

/// The best line found by a search.
#[derive(Debug, Clone)]
pub struct Plan {
    decisions: Vec<PlanDecision>,
    final_score: Score,
}

impl Plan {
    /// Build a plan from the root-to-leaf node sequence, merging target,
    /// mode, card and X nodes into the preceding action entry.
    pub(crate) fn from_sequence(sequence: Vec<DecisionNode>, final_score: Score) -> Plan {
        let mut decisions: Vec<PlanDecision> = Vec::new();
        for node in sequence {
            match node.kind {
                DecisionKind::Action(action) => {
                    decisions.push(PlanDecision::new(node.initial_score, action));
                }
                DecisionKind::Targets(targets) => {
                    if let Some(last) = decisions.last_mut() {
                        last.targets = Some(targets);
                    }
                }
                DecisionKind::Modes(mask, text) => {
                    if let Some(last) = decisions.last_mut() {
                        last.modes = Some((mask, text));
                    }
                }
                DecisionKind::Cards(cards) => {
                    if let Some(last) = decisions.last_mut() {
                        last.choices.get_or_insert_with(Vec::new).extend(cards);
                    }
                }
                DecisionKind::XValue(x) => {
                    if let Some(last) = decisions.last_mut() {
                        last.x_value = Some(x);
                    }
                }
            }
        }
        Plan {
            decisions,
            final_score,
        }
    }

    pub fn decisions(&self) -> &[PlanDecision] {
        &self.decisions
    }

    pub fn final_score(&self) -> Score {
        self.final_score
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
