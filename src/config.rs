//! Card content: names, timeline, reasons, letter, proposal and date ideas.
//!
//! The page keeps one JSON blob of these settings. Loading overlays the blob on
//! top of [`CardConfig::default`], so fields added in newer versions fall back
//! to their defaults, and date ideas always come from the built-in list (they
//! are not user-editable).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimelineIcon {
    #[default]
    Heart,
    Star,
    Music,
    Camera,
    Plane,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimelineEvent {
    pub id: String,
    pub date: String,
    pub title: String,
    pub description: String,
    pub icon: TimelineIcon,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reason {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateIdea {
    pub id: String,
    pub title: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct CardConfig {
    pub sender_name: String,
    pub recipient_name: String,
    pub whatsapp_number: String,
    pub timeline: Vec<TimelineEvent>,
    pub reasons: Vec<Reason>,
    pub love_letter: Vec<String>,
    pub proposal_message: String,
    pub date_ideas: Vec<DateIdea>,
}

pub const DEFAULT_WHATSAPP_NUMBER: &str = "94772245080";

fn event(id: &str, date: &str, title: &str, description: &str) -> TimelineEvent {
    TimelineEvent {
        id: id.into(),
        date: date.into(),
        title: title.into(),
        description: description.into(),
        icon: TimelineIcon::Heart,
    }
}

fn reason(id: &str, text: &str) -> Reason {
    Reason { id: id.into(), text: text.into() }
}

fn idea(id: &str, title: &str, icon: &str) -> DateIdea {
    DateIdea { id: id.into(), title: title.into(), icon: icon.into() }
}

pub fn default_date_ideas() -> Vec<DateIdea> {
    vec![
        idea("1", "Candle Lit Dinner", "🕯️"),
        idea("2", "Pizza Picnic", "🍕"),
        idea("3", "Musical Show", "🎭"),
        idea("4", "Movie", "🎬"),
        idea("5", "All of the above", "✨"),
    ]
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            sender_name: "Sansikehhh".into(),
            recipient_name: "Heliiiii".into(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.into(),
            timeline: vec![
                event("1", "2018-01-31", "The Beginning ✨", "The day my world changed forever."),
                event("2", "2023", "First Date 🍕", "Pizza while holding hands!"),
                event("3", "2024", "First Kiss 💋", "I have no words!"),
                event("4", "Today", "Growing Stronger ❤️", "Every day with you is a gift."),
            ],
            reasons: vec![
                reason("1", "Your kindness!"),
                reason("2", "The way you laugh at my bad jokes."),
                reason("3", "Your support when I am down."),
                reason("4", "The way you care for me!"),
                reason("5", "The way you make me feel so special!"),
                reason("6", "Simply being you."),
            ],
            love_letter: vec![
                "To my favorite person,".into(),
                "I sit here thinking about how lucky I am to have you in my life. You bring so much light, laughter, and warmth into my world. Every moment we share becomes a cherished memory.".into(),
                "Forever yours,".into(),
            ],
            proposal_message: "You make me the happiest person alive. Let's make this official!".into(),
            date_ideas: default_date_ideas(),
        }
    }
}

impl CardConfig {
    /// Overlay a saved JSON blob on the defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, crate::error::CardError> {
        let mut cfg: CardConfig = serde_json::from_str(json)?;
        cfg.date_ideas = default_date_ideas();
        Ok(cfg)
    }

    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String, crate::error::CardError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number used for the share link; an empty setting falls back to the default.
    pub fn share_number(&self) -> &str {
        if self.whatsapp_number.trim().is_empty() {
            DEFAULT_WHATSAPP_NUMBER
        } else {
            &self.whatsapp_number
        }
    }

    pub fn letter_text(&self) -> String {
        crate::typewriter::compose_letter(&self.love_letter, &self.sender_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CardConfig::default();
        assert_eq!(cfg.reasons.len(), 6);
        assert_eq!(cfg.date_ideas.len(), 5);
        assert!(cfg.letter_text().ends_with("\n\n— Sansikehhh"));
    }

    #[test]
    fn test_share_number_fallback() {
        let cfg = CardConfig { whatsapp_number: "  ".into(), ..CardConfig::default() };
        assert_eq!(cfg.share_number(), DEFAULT_WHATSAPP_NUMBER);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_overlay_keeps_missing_fields() {
        let cfg = CardConfig::from_json(r#"{"recipientName":"Sam","loveLetter":["Hi"]}"#).unwrap();
        assert_eq!(cfg.recipient_name, "Sam");
        assert_eq!(cfg.love_letter, vec!["Hi".to_string()]);
        assert_eq!(cfg.sender_name, CardConfig::default().sender_name);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_overlay_forces_default_date_ideas() {
        let cfg = CardConfig::from_json(r#"{"dateIdeas":[{"id":"9","title":"Bowling","icon":"🎳"}]}"#)
            .unwrap();
        assert_eq!(cfg.date_ideas, default_date_ideas());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_bad_json_is_reported() {
        let err = CardConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::CardError::InvalidConfig(_)));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_timeline_icon_lowercase() {
        let json = CardConfig::default().to_json().unwrap();
        assert!(json.contains(r#""icon":"heart""#));
        assert!(json.contains(r#""whatsappNumber""#));
    }
}
