use crate::error::{Error, Result};

/// Phase of the oracle cycle.
///
/// Normal flow is `Idle -> Sampling -> Aggregating -> Relaying -> Idle`.
/// Aggregating and Relaying may also fall straight back to Idle when the
/// consensus is invalid or the price update could not be submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Sampling,
    Aggregating,
    Relaying,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Sampling => "sampling",
            CyclePhase::Aggregating => "aggregating",
            CyclePhase::Relaying => "relaying",
        }
    }

    fn can_transition_to(self, next: CyclePhase) -> bool {
        use CyclePhase::*;
        matches!(
            (self, next),
            (Idle, Sampling)
                | (Sampling, Aggregating)
                | (Aggregating, Relaying)
                | (Aggregating, Idle)
                | (Relaying, Idle)
        )
    }
}

pub struct CycleStateMachine {
    phase: CyclePhase,
}

impl CycleStateMachine {
    pub fn new() -> Self {
        CycleStateMachine {
            phase: CyclePhase::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn advance(&mut self, next: CyclePhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!(from = self.phase.as_str(), to = next.as_str(), "Cycle phase change");
        self.phase = next;
        Ok(())
    }
}

impl Default for CycleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_returns_to_idle() {
        let mut machine = CycleStateMachine::new();
        machine.advance(CyclePhase::Sampling).unwrap();
        machine.advance(CyclePhase::Aggregating).unwrap();
        machine.advance(CyclePhase::Relaying).unwrap();
        machine.advance(CyclePhase::Idle).unwrap();
        assert_eq!(machine.phase(), CyclePhase::Idle);
    }

    #[test]
    fn test_abort_paths() {
        let mut machine = CycleStateMachine::new();
        machine.advance(CyclePhase::Sampling).unwrap();
        machine.advance(CyclePhase::Aggregating).unwrap();
        assert!(machine.advance(CyclePhase::Idle).is_ok());
    }

    #[test]
    fn test_sampling_cannot_skip_to_relaying() {
        let mut machine = CycleStateMachine::new();
        machine.advance(CyclePhase::Sampling).unwrap();
        let err = machine.advance(CyclePhase::Relaying).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: CyclePhase::Sampling,
                to: CyclePhase::Relaying
            }
        ));
        assert_eq!(machine.phase(), CyclePhase::Sampling);
    }
}
