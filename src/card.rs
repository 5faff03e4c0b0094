//! Top-level card state: has it been opened, what does it say, and how far
//! along the letter and the proposal are.

use rand::Rng;

use crate::config::CardConfig;
use crate::proposal::ProposalState;
use crate::typewriter::Typewriter;

#[derive(Clone, Debug)]
pub struct Card {
    config: CardConfig,
    opened: bool,
    letter: Typewriter,
    proposal: ProposalState,
}

impl Card {
    pub fn new(config: CardConfig) -> Self {
        let letter = Typewriter::new(&config.letter_text());
        Self { config, opened: false, letter, proposal: ProposalState::new() }
    }

    /// Open the envelope. Returns true on the first call only.
    pub fn open(&mut self) -> bool {
        let first = !self.opened;
        self.opened = true;
        first
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }
    pub fn config(&self) -> &CardConfig {
        &self.config
    }
    pub fn letter(&self) -> &Typewriter {
        &self.letter
    }
    pub fn letter_mut(&mut self) -> &mut Typewriter {
        &mut self.letter
    }
    pub fn proposal(&self) -> &ProposalState {
        &self.proposal
    }

    /// Swap in edited content. The letter restarts from a blank page.
    pub fn set_config(&mut self, config: CardConfig) {
        self.letter = Typewriter::new(&config.letter_text());
        self.config = config;
    }

    pub fn dodge_no<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(f64, f64)> {
        self.proposal.dodge(rng)
    }

    /// "Yes" pressed. True when the celebration (confetti) should fire.
    pub fn accept_proposal(&mut self) -> bool {
        self.proposal.accept()
    }

    /// Pick a date idea by id. Unknown ids are ignored.
    pub fn select_date(&mut self, id: &str) -> bool {
        match self.config.date_ideas.iter().find(|d| d.id == id) {
            Some(idea) => {
                self.proposal.select_date(idea.clone());
                true
            }
            None => false,
        }
    }

    pub fn share_message(&self) -> String {
        self.proposal.share_message(&self.config.sender_name)
    }

    pub fn greeting(&self) -> String {
        format!("Hey {}...", self.config.recipient_name)
    }

    pub fn footer(&self) -> String {
        format!("Made with ♥ for {}", self.config.recipient_name)
    }
}

impl Default for Card {
    fn default() -> Self {
        Self::new(CardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn test_open_once() {
        let mut card = Card::default();
        assert!(!card.is_opened());
        assert!(card.open());
        assert!(!card.open());
        assert!(card.is_opened());
    }

    #[test]
    fn test_accept_triggers_celebration_once() {
        let mut card = Card::default();
        let mut rng = seeded_rng(31);
        card.dodge_no(&mut rng);
        assert!(card.accept_proposal());
        assert!(!card.accept_proposal());
        assert_eq!(card.dodge_no(&mut rng), None);
    }

    #[test]
    fn test_select_date_by_id() {
        let mut card = Card::default();
        assert!(!card.select_date("42"));
        assert!(card.select_date("4"));
        assert!(card.share_message().contains("I pick: Movie 🎬"));
    }

    #[test]
    fn test_set_config_resets_letter() {
        let mut card = Card::default();
        card.letter_mut().start();
        card.letter_mut().step();
        let cfg = CardConfig { sender_name: "Alex".into(), ..CardConfig::default() };
        card.set_config(cfg);
        assert_eq!(card.letter().visible(), "");
        assert!(card.letter().full_text().ends_with("— Alex"));
        assert_eq!(card.greeting(), "Hey Heliiiii...");
    }
}
