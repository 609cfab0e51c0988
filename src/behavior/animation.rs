use super::AgentState;

/// Animation clip the host should play for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Animation {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Roar,
    Unconscious,
    Captured,
}

impl Animation {
    /// Clip for a state.
    pub fn for_state(state: AgentState) -> Self {
        match state {
            AgentState::Idle => Self::Idle,
            AgentState::Wandering => Self::Walk,
            AgentState::Fleeing | AgentState::Chasing => Self::Run,
            AgentState::Attacking => Self::Attack,
            AgentState::Defending => Self::Roar,
            AgentState::Unconscious => Self::Unconscious,
            AgentState::Captured => Self::Captured,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Attack => "attack",
            Self::Roar => "roar",
            Self::Unconscious => "unconscious",
            Self::Captured => "captured",
        }
    }
}
