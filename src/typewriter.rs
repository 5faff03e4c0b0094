//! Typewriter reveal for the love letter.

pub const CHAR_INTERVAL_MS: i32 = 30;

/// Compose the letter body: paragraphs separated by blank lines, then the signature.
pub fn compose_letter(paragraphs: &[String], sender: &str) -> String {
    format!("{}\n\n— {}", paragraphs.join("\n\n"), sender)
}

#[derive(Clone, Debug, Default)]
pub struct Typewriter {
    text: Vec<char>,
    revealed: usize,
    writing: bool,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self { text: text.chars().collect(), revealed: 0, writing: false }
    }

    /// Begin (or re-begin) writing from an empty page. Ignored mid-write.
    pub fn start(&mut self) -> bool {
        if self.writing {
            return false;
        }
        self.revealed = 0;
        self.writing = !self.text.is_empty();
        true
    }

    /// Reveal one more character. Returns false once there is nothing left to type.
    pub fn step(&mut self) -> bool {
        if !self.writing {
            return false;
        }
        self.revealed = (self.revealed + 1).min(self.text.len());
        if self.revealed == self.text.len() {
            self.writing = false;
        }
        true
    }

    /// Put the pen down where it is. The next `start` begins afresh.
    pub fn halt(&mut self) {
        self.writing = false;
    }

    pub fn is_writing(&self) -> bool {
        self.writing
    }
    pub fn visible(&self) -> String {
        self.text[..self.revealed].iter().collect()
    }
    pub fn full_text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn button_label(&self) -> &'static str {
        if self.revealed == 0 { "Write Letter" } else { "Rewrite" }
    }

    /// Copying is offered once a letter is on the page and the pen has stopped.
    pub fn can_copy(&self) -> bool {
        self.revealed > 0 && !self.writing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_letter() {
        let paras = vec!["Dear you,".to_string(), "Always.".to_string()];
        assert_eq!(compose_letter(&paras, "Me"), "Dear you,\n\nAlways.\n\n— Me");
    }

    #[test]
    fn test_reveals_all_chars_then_stops() {
        let mut tw = Typewriter::new("hé♥");
        assert_eq!(tw.button_label(), "Write Letter");
        assert!(tw.start());
        assert!(tw.step());
        assert_eq!(tw.visible(), "h");
        assert!(!tw.can_copy());
        tw.step();
        tw.step();
        assert_eq!(tw.visible(), "hé♥");
        assert!(!tw.is_writing());
        assert!(!tw.step());
        assert!(tw.can_copy());
        assert_eq!(tw.button_label(), "Rewrite");
    }

    #[test]
    fn test_start_ignored_while_writing() {
        let mut tw = Typewriter::new("abc");
        tw.start();
        tw.step();
        assert!(!tw.start());
        assert_eq!(tw.visible(), "a");
    }

    #[test]
    fn test_rewrite_clears_page() {
        let mut tw = Typewriter::new("ab");
        tw.start();
        while tw.step() {}
        assert!(tw.start());
        assert_eq!(tw.visible(), "");
        assert!(tw.is_writing());
    }

    #[test]
    fn test_halt_allows_a_fresh_start() {
        let mut tw = Typewriter::new("abc");
        assert!(tw.start());
        assert!(!tw.start());
        tw.halt();
        assert!(!tw.is_writing());
        assert!(!tw.step());
        assert!(tw.start());
        assert!(tw.is_writing());
        assert_eq!(tw.visible(), "");
    }
}
