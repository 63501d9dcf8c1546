//! Scan-and-manage phases.
//!
//! PREPARE → SWEEPING → (per stop) CAPTURE → CLASSIFY → {CONTINUE | REMOVE}
//! → SWEEPING → … → FINALIZE. Any live phase may jump to FINALIZE.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// Gripper open, R retracted, base rotation started.
    Prepare,
    /// Moving Z between stops.
    Sweeping,
    /// Taking the still at a stop.
    Capture,
    /// Herb and disease classification of the still.
    Classify,
    /// Healthy verdict; on to the next stop.
    Continue,
    /// Diseased verdict; cutting the leaf.
    Remove,
    /// Safe resting configuration. Terminal.
    Finalize,
}

impl ScanPhase {
    /// Transition table.
    pub const fn can_transition_to(self, next: ScanPhase) -> bool {
        use ScanPhase::*;

        match (self, next) {
            (Finalize, _) => false,
            (_, Finalize) => true,
            (Prepare, Sweeping)
            | (Sweeping, Capture)
            | (Capture, Classify)
            | (Classify, Continue)
            | (Classify, Remove)
            | (Continue, Sweeping)
            | (Remove, Sweeping) => true,
            _ => false,
        }
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, ScanPhase::Finalize)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScanPhase::Prepare => "PREPARE",
            ScanPhase::Sweeping => "SWEEPING",
            ScanPhase::Capture => "CAPTURE",
            ScanPhase::Classify => "CLASSIFY",
            ScanPhase::Continue => "CONTINUE",
            ScanPhase::Remove => "REMOVE",
            ScanPhase::Finalize => "FINALIZE",
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScanPhase::*;

    const ALL: [ScanPhase; 7] = [
        Prepare, Sweeping, Capture, Classify, Continue, Remove, Finalize,
    ];

    #[test]
    fn per_stop_cycle() {
        let cycle = [
            Sweeping, Capture, Classify, Remove, Sweeping, Capture, Classify, Continue, Sweeping,
        ];
        assert!(Prepare.can_transition_to(Sweeping));
        for pair in cycle.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn every_live_phase_can_finalize() {
        for phase in ALL {
            assert_eq!(phase.can_transition_to(Finalize), !phase.is_terminal());
        }
    }

    #[test]
    fn finalize_is_terminal() {
        for phase in ALL {
            assert!(!Finalize.can_transition_to(phase));
        }
    }

    #[test]
    fn no_shortcuts() {
        assert!(!Prepare.can_transition_to(Capture));
        assert!(!Sweeping.can_transition_to(Classify));
        assert!(!Capture.can_transition_to(Remove));
        assert!(!Continue.can_transition_to(Remove));
        assert!(!Remove.can_transition_to(Capture));
    }
}
