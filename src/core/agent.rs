use serde::{Deserialize, Serialize};

/// Lifecycle state of a simulated agent within one generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Active,
    /// Landed
    TerminalSuccess,
    /// Crashed or left the world
    TerminalFailure,
}

impl AgentState {
    pub fn is_active(self) -> bool {
        self == AgentState::Active
    }

    pub fn is_success(self) -> bool {
        self == AgentState::TerminalSuccess
    }
}

/// A simulated individual driven by an evaluable brain.
///
/// The physics, rendering and forward pass all live behind this trait. The
/// population store only resets agents, reads their state and fitness, and
/// swaps their brains between generations.
pub trait Agent: Send {
    /// Evaluable form of a genome, built by a `GenomeCodec`
    type Brain;

    /// Return to the spawn state and clear fitness and state
    fn reset(&mut self);

    fn state(&self) -> AgentState;

    /// May be negative
    fn fitness(&self) -> f64;

    /// Attach a new brain, dropping any prior one
    fn register_brain(&mut self, brain: Self::Brain);

    /// Advance the simulation by one tick. Only called while `Active`.
    fn update(&mut self, delta: f64);

    /// Cosmetic hook for the fittest agent of the current tick
    fn notify_as_best(&mut self) {}
}
