//! Star rating prompt shown on the last step.
//!
//! A click locks the prompt for [`RATING_LOCK`] while the stars animate; the
//! rating is committed once the lock expires and the prompt then thanks the
//! cook. Time is passed in so the lock can be driven by any clock.

use std::time::{Duration, Instant};

pub const RATING_LOCK: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingState {
    /// Waiting for a click
    Idle,
    /// Stars animating; further clicks are ignored
    Animating { stars: u8, until: Instant },
    /// Committed; the prompt shows the thank-you state
    Rated { stars: u8 },
}

#[derive(Debug, Clone)]
pub struct RatingCapture {
    state: RatingState,
}

impl Default for RatingCapture {
    fn default() -> Self {
        Self {
            state: RatingState::Idle,
        }
    }
}

impl RatingCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RatingState {
        self.state
    }

    /// Stars currently highlighted
    pub fn selected(&self) -> u8 {
        match self.state {
            RatingState::Idle => 0,
            RatingState::Animating { stars, .. } | RatingState::Rated { stars } => stars,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, RatingState::Animating { .. })
    }

    pub fn has_rated(&self) -> bool {
        matches!(self.state, RatingState::Rated { .. })
    }

    /// Click star `stars`. Rejected while locked, after rating, or out of 1..=5.
    pub fn select(&mut self, stars: u8, now: Instant) -> bool {
        if !(1..=5).contains(&stars) || !matches!(self.state, RatingState::Idle) {
            return false;
        }
        self.state = RatingState::Animating {
            stars,
            until: now + RATING_LOCK,
        };
        true
    }

    /// Advance the clock. Returns the rating to persist exactly once, when the lock expires.
    pub fn poll(&mut self, now: Instant) -> Option<u8> {
        match self.state {
            RatingState::Animating { stars, until } if now >= until => {
                self.state = RatingState::Rated { stars };
                Some(stars)
            }
            _ => None,
        }
    }
}
