//! Page-level card object handed to the host script.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use super::confetti::fire_confetti;
use super::{Interval, document, now_ms, window};
use crate::card::Card;
use crate::config::CardConfig;
use crate::error::CardError;
use crate::rng::{CardRng, entropy_rng};
use crate::typewriter::CHAR_INTERVAL_MS;

#[wasm_bindgen]
pub struct ValentineCard {
    card: Rc<RefCell<Card>>,
    rng: CardRng,
    letter_timer: Option<Interval>,
}

#[cfg(feature = "serde_json")]
fn load_config(json: Option<String>) -> CardConfig {
    match json.as_deref().map(CardConfig::from_json) {
        Some(Ok(cfg)) => cfg,
        Some(Err(err)) => {
            super::report("Failed to load config", &err);
            CardConfig::default()
        }
        None => CardConfig::default(),
    }
}

#[cfg(not(feature = "serde_json"))]
fn load_config(_json: Option<String>) -> CardConfig {
    CardConfig::default()
}

#[wasm_bindgen]
impl ValentineCard {
    /// Build the card from the saved configuration blob, if any. A blob that
    /// does not parse is reported and the defaults are used.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> ValentineCard {
        ValentineCard {
            card: Rc::new(RefCell::new(Card::new(load_config(config_json)))),
            rng: entropy_rng(now_ms().to_bits()),
            letter_timer: None,
        }
    }

    pub fn open(&mut self) -> bool {
        self.card.borrow_mut().open()
    }

    #[wasm_bindgen(js_name = isOpened)]
    pub fn is_opened(&self) -> bool {
        self.card.borrow().is_opened()
    }

    pub fn greeting(&self) -> String {
        self.card.borrow().greeting()
    }

    pub fn footer(&self) -> String {
        self.card.borrow().footer()
    }

    /// Type the letter into `#target_id`, one character every 30ms.
    #[wasm_bindgen(js_name = writeLetter)]
    pub fn write_letter(&mut self, target_id: &str) -> Result<(), JsValue> {
        Ok(self.start_letter(target_id)?)
    }

    /// Full letter text, for copying to the clipboard.
    #[wasm_bindgen(js_name = letterText)]
    pub fn letter_text(&self) -> String {
        self.card.borrow().letter().full_text()
    }

    #[wasm_bindgen(js_name = isWriting)]
    pub fn is_writing(&self) -> bool {
        self.card.borrow().letter().is_writing()
    }

    #[wasm_bindgen(js_name = letterButtonLabel)]
    pub fn letter_button_label(&self) -> String {
        self.card.borrow().letter().button_label().to_string()
    }

    #[wasm_bindgen(js_name = canCopyLetter)]
    pub fn can_copy_letter(&self) -> bool {
        self.card.borrow().letter().can_copy()
    }

    /// Pointer reached the "No" button. Returns its new `[x, y]` offset, or
    /// nothing once the button has given up.
    #[wasm_bindgen(js_name = dodgeNo)]
    pub fn dodge_no(&mut self) -> Option<Vec<f64>> {
        self.card.borrow_mut().dodge_no(&mut self.rng).map(|(x, y)| vec![x, y])
    }

    #[wasm_bindgen(js_name = noButtonVisible)]
    pub fn no_button_visible(&self) -> bool {
        self.card.borrow().proposal().no_button_visible()
    }

    /// "Yes" pressed: fires the confetti the first time.
    #[wasm_bindgen(js_name = acceptProposal)]
    pub fn accept_proposal(&mut self) -> bool {
        let first = self.card.borrow_mut().accept_proposal();
        if first {
            fire_confetti();
        }
        first
    }

    #[wasm_bindgen(js_name = selectDate)]
    pub fn select_date(&mut self, id: &str) -> bool {
        self.card.borrow_mut().select_date(id)
    }

    #[wasm_bindgen(js_name = shareUrl)]
    pub fn share_url(&self) -> String {
        let card = self.card.borrow();
        let text = String::from(js_sys::encode_uri_component(&card.share_message()));
        format!("https://wa.me/{}?text={}", card.config().share_number(), text)
    }

    #[wasm_bindgen(js_name = openShare)]
    pub fn open_share(&self) -> Result<(), JsValue> {
        window()?.open_with_url_and_target(&self.share_url(), "_blank")?;
        Ok(())
    }
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
impl ValentineCard {
    /// Current configuration as JSON, for the host to persist.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        Ok(self.card.borrow().config().to_json()?)
    }

    /// Replace the configuration with an edited blob.
    #[wasm_bindgen(js_name = setConfigJson)]
    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        let cfg = CardConfig::from_json(json)?;
        self.letter_timer = None;
        self.card.borrow_mut().set_config(cfg);
        Ok(())
    }
}

impl ValentineCard {
    fn start_letter(&mut self, target_id: &str) -> Result<(), CardError> {
        let el = document()?
            .get_element_by_id(target_id)
            .ok_or_else(|| CardError::ElementNotFound(target_id.to_string()))?;
        if !self.card.borrow_mut().letter_mut().start() {
            return Ok(());
        }
        el.set_text_content(Some(""));
        let card = self.card.clone();
        let timer = Interval::start(CHAR_INTERVAL_MS, move || {
            let Ok(mut card) = card.try_borrow_mut() else {
                return true;
            };
            let letter = card.letter_mut();
            letter.step();
            el.set_text_content(Some(letter.visible().as_str()));
            letter.is_writing()
        });
        match timer {
            Ok(timer) => {
                self.letter_timer = Some(timer);
                Ok(())
            }
            Err(err) => {
                self.card.borrow_mut().letter_mut().halt();
                Err(err)
            }
        }
    }
}
