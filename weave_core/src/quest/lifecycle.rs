//! Quest lifecycle: states, actions and the transition function.

use serde::{Deserialize, Serialize};

use super::QuestId;

/// Lifecycle state of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QuestState {
    /// Registered but not yet taken up.
    #[default]
    Inactive,
    Active,
    Succeeded,
    Failed,
    Cancelled,
}

impl QuestState {
    /// Terminal states absorb every action.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestState::Succeeded | QuestState::Failed | QuestState::Cancelled)
    }

    /// State after `action` is applied. Inapplicable actions leave the state unchanged.
    pub fn apply(self, action: QuestActionType) -> QuestState {
        use QuestActionType as A;
        use QuestState as S;

        match (self, action) {
            (state, A::Keep) => state,
            (state, _) if state.is_terminal() => state,
            (S::Inactive, A::Activate) => S::Active,
            (S::Active, A::Succeed) => S::Succeeded,
            (S::Active, A::Fail) => S::Failed,
            (S::Inactive | S::Active, A::Cancel) => S::Cancelled,
            (state, _) => state,
        }
    }
}

/// Requested lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestActionType {
    /// No-op.
    Keep,
    Activate,
    Succeed,
    Fail,
    Cancel,
}

/// A lifecycle action addressed to one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestModelAction {
    pub action_type: QuestActionType,
    pub quest_id: QuestId,
}

impl QuestModelAction {
    pub fn new(action_type: QuestActionType, quest_id: QuestId) -> Self {
        Self { action_type, quest_id }
    }

    pub fn keep(quest_id: QuestId) -> Self {
        Self::new(QuestActionType::Keep, quest_id)
    }
}
