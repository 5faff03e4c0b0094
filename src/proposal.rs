//! "Will you be my valentine?" flow.
//!
//! The "No" button hops away whenever the pointer reaches it; after enough hops
//! it gives up and is replaced by a plea. "Yes" is accepted once, which is the
//! moment the host fires the confetti burst.

use rand::Rng;

use crate::config::DateIdea;

/// The "No" button moves up to this far on each axis.
pub const DODGE_RANGE_PX: f64 = 100.0;
pub const DODGES_BEFORE_PLEA: u32 = 10;
pub const PLEA_TEXT: &str = "Okay okay 😭 I'll ask nicely... please?";
const NO_DATE_CHOICE: &str = "anything you like";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProposalState {
    no_offset: (f64, f64),
    dodges: u32,
    accepted: bool,
    selected: Option<DateIdea>,
}

impl ProposalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer reached the "No" button: move it. Returns the new offset, or
    /// None once the button is gone or the proposal is settled.
    pub fn dodge<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(f64, f64)> {
        if self.accepted || !self.no_button_visible() {
            return None;
        }
        self.no_offset = (
            rng.gen_range(-DODGE_RANGE_PX..DODGE_RANGE_PX),
            rng.gen_range(-DODGE_RANGE_PX..DODGE_RANGE_PX),
        );
        self.dodges += 1;
        Some(self.no_offset)
    }

    /// "Yes". True only the first time, when the celebration should fire.
    pub fn accept(&mut self) -> bool {
        if self.accepted {
            return false;
        }
        self.accepted = true;
        tracing::info!(dodges = self.dodges, "proposal accepted");
        true
    }

    pub fn select_date(&mut self, idea: DateIdea) {
        self.selected = Some(idea);
    }

    pub fn no_button_visible(&self) -> bool {
        self.dodges < DODGES_BEFORE_PLEA
    }
    pub fn no_offset(&self) -> (f64, f64) {
        self.no_offset
    }
    pub fn dodges(&self) -> u32 {
        self.dodges
    }
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
    pub fn selected_date(&self) -> Option<&DateIdea> {
        self.selected.as_ref()
    }

    /// Reply sent back to `sender` once accepted.
    pub fn share_message(&self, sender: &str) -> String {
        let (choice, icon) = match &self.selected {
            Some(idea) => (idea.title.as_str(), idea.icon.as_str()),
            None => (NO_DATE_CHOICE, ""),
        };
        format!("Hey {sender}! I said YES! 💖\n\nI'm so excited! For our date, I pick: {choice} {icon}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_date_ideas;
    use crate::rng::seeded_rng;

    #[test]
    fn test_dodge_stays_in_range_and_gives_up() {
        let mut rng = seeded_rng(21);
        let mut p = ProposalState::new();
        for _ in 0..DODGES_BEFORE_PLEA {
            let (x, y) = p.dodge(&mut rng).expect("button still visible");
            assert!((-DODGE_RANGE_PX..DODGE_RANGE_PX).contains(&x));
            assert!((-DODGE_RANGE_PX..DODGE_RANGE_PX).contains(&y));
        }
        assert!(!p.no_button_visible());
        assert_eq!(p.dodge(&mut rng), None);
        assert_eq!(p.dodges(), DODGES_BEFORE_PLEA);
    }

    #[test]
    fn test_accept_fires_once() {
        let mut p = ProposalState::new();
        assert!(p.accept());
        assert!(!p.accept());
        assert!(p.is_accepted());
    }

    #[test]
    fn test_share_message() {
        let mut p = ProposalState::new();
        assert_eq!(
            p.share_message("Sam"),
            "Hey Sam! I said YES! 💖\n\nI'm so excited! For our date, I pick: anything you like "
        );
        p.select_date(default_date_ideas()[1].clone());
        assert!(p.share_message("Sam").ends_with("I pick: Pizza Picnic 🍕"));
    }
}
