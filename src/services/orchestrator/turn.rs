//! Turn State Machine
//!
//! Tracks the lifecycle of one conversation turn and rejects overlapping
//! turns on the same orchestrator.

use std::sync::{Arc, Mutex};

use crate::utils::{AppError, AppResult};

/// Lifecycle of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Streaming,
    Completing,
    Erroring,
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::Idle
    }
}

impl TurnState {
    /// Legal transitions. Every non-idle state may fall back to `Idle`
    /// when the turn is torn down.
    fn can_transition_to(self, next: TurnState) -> bool {
        matches!(
            (self, next),
            (TurnState::Idle, TurnState::Sending)
                | (TurnState::Sending, TurnState::Streaming)
                | (TurnState::Sending, TurnState::Erroring)
                | (TurnState::Streaming, TurnState::Completing)
                | (TurnState::Streaming, TurnState::Erroring)
                | (TurnState::Completing, TurnState::Idle)
                | (TurnState::Erroring, TurnState::Idle)
        )
    }
}

/// Shared gate enforcing one turn at a time.
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    state: Arc<Mutex<TurnState>>,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TurnState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Claim the gate for a new turn. Fails while another turn is active.
    pub fn begin(&self) -> AppResult<()> {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard != TurnState::Idle {
            return Err(AppError::TurnInProgress);
        }
        *guard = TurnState::Sending;
        Ok(())
    }

    /// Advance to `next`; illegal transitions are ignored with the state
    /// left unchanged (the turn task drives a straight-line path).
    pub fn advance(&self, next: TurnState) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.can_transition_to(next) {
            *guard = next;
        }
    }

    /// Return the gate to `Idle` unconditionally. Called on every turn
    /// exit path so a failed turn never wedges the orchestrator.
    pub fn release(&self) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = TurnState::Idle;
    }
}
