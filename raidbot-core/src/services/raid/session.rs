// File: raidbot-core/src/services/raid/session.rs

/// Where the current raid is in its sequence.
///
/// Each accepted raid gets a fresh generation so results that arrive after a
/// cancel (or after a newer raid started) can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving { generation: u64 },
    Transitioning { generation: u64 },
}

/// Owner of the "raid in progress" flag. At most one generation is live.
#[derive(Debug)]
pub struct RaidSession {
    state: SessionState,
    next_generation: u64,
}

impl Default for RaidSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RaidSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            next_generation: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Idle -> Resolving. Returns `None` if a session is already active.
    pub fn begin(&mut self) -> Option<u64> {
        if self.is_active() {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.state = SessionState::Resolving { generation };
        Some(generation)
    }

    /// Any state -> Idle. The live generation, if any, becomes stale.
    pub fn cancel(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Whether `generation` is the raid currently resolving.
    pub fn is_resolving(&self, generation: u64) -> bool {
        self.state == SessionState::Resolving { generation }
    }

    /// Resolving(g) -> Transitioning(g). False if `g` is stale.
    pub fn start_transition(&mut self, generation: u64) -> bool {
        if !self.is_resolving(generation) {
            return false;
        }
        self.state = SessionState::Transitioning { generation };
        true
    }

    /// Resolving(g) | Transitioning(g) -> Idle. Stale generations leave the state alone.
    pub fn finish(&mut self, generation: u64) -> bool {
        match self.state {
            SessionState::Resolving { generation: g } | SessionState::Transitioning { generation: g }
                if g == generation =>
            {
                self.state = SessionState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut s = RaidSession::new();
        let g = s.begin().unwrap();
        assert_eq!(s.state(), SessionState::Resolving { generation: g });
        assert!(s.start_transition(g));
        assert_eq!(s.state(), SessionState::Transitioning { generation: g });
        assert!(s.finish(g));
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn second_begin_while_active_is_refused() {
        let mut s = RaidSession::new();
        s.begin().unwrap();
        assert_eq!(s.begin(), None);
    }

    #[test]
    fn cancel_from_every_state() {
        let mut s = RaidSession::new();
        s.cancel();
        assert_eq!(s.state(), SessionState::Idle);

        let g = s.begin().unwrap();
        s.cancel();
        assert!(!s.is_active());

        let g2 = s.begin().unwrap();
        assert_ne!(g, g2);
        s.start_transition(g2);
        s.cancel();
        assert!(!s.is_active());
    }

    #[test]
    fn stale_generation_cannot_advance_or_finish_new_session() {
        let mut s = RaidSession::new();
        let old = s.begin().unwrap();
        s.cancel();
        let new = s.begin().unwrap();

        assert!(!s.start_transition(old));
        assert!(!s.finish(old));
        assert_eq!(s.state(), SessionState::Resolving { generation: new });
    }
}
