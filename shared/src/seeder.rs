use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-session record of whether demo data has been requested.
///
/// Lives in the model rather than in a global so a fresh session (or a test)
/// starts unseeded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSession {
    seeded: bool,
}

impl SeedSession {
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn reset(&mut self) {
        self.seeded = false;
    }
}

/// Ensures demo content is requested at most once per session.
pub struct Seeder<'a> {
    session: &'a mut SeedSession,
}

impl<'a> Seeder<'a> {
    pub fn new(session: &'a mut SeedSession) -> Self {
        Self { session }
    }

    /// Runs `seed` unless this session already did. The side effect is
    /// fire-and-forget: its outcome never un-marks the session.
    ///
    /// Returns whether `seed` ran.
    pub fn seed_if_needed(&mut self, seed: impl FnOnce()) -> bool {
        if self.session.seeded {
            debug!("demo data already seeded this session");
            return false;
        }
        self.session.seeded = true;
        info!("seeding demo data");
        seed();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_once_per_session() {
        let mut session = SeedSession::default();
        let mut calls = 0;

        assert!(Seeder::new(&mut session).seed_if_needed(|| calls += 1));
        assert!(!Seeder::new(&mut session).seed_if_needed(|| calls += 1));

        assert_eq!(calls, 1);
        assert!(session.is_seeded());
    }

    #[test]
    fn reset_allows_a_new_session_to_seed() {
        let mut session = SeedSession::default();
        let mut calls = 0;

        Seeder::new(&mut session).seed_if_needed(|| calls += 1);
        session.reset();
        Seeder::new(&mut session).seed_if_needed(|| calls += 1);

        assert_eq!(calls, 2);
    }

    #[test]
    fn separate_sessions_are_independent() {
        let mut first = SeedSession::default();
        let mut second = SeedSession::default();
        let mut calls = 0;

        Seeder::new(&mut first).seed_if_needed(|| calls += 1);
        Seeder::new(&mut second).seed_if_needed(|| calls += 1);

        assert_eq!(calls, 2);
    }
}
