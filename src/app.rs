//! Terminal client state and key handling

use crate::session::{Session, SubmitError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const BACK_CHIP: &str = "← Back to main topics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Chips,
    History,
}

pub struct App {
    pub session: Session,
    pub input: String,
    pub focus: Focus,
    pub chip_cursor: usize,
    pub history_cursor: usize,
    /// Advances on every tick; drives the thinking animation
    pub animation_frame: u8,
    /// Last refusal shown in the footer
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            input: String::new(),
            focus: Focus::Input,
            chip_cursor: 0,
            history_cursor: 0,
            animation_frame: 0,
            notice: None,
            should_quit: false,
        }
    }

    /// Chip labels for the current navigator level
    pub fn chips(&self) -> Vec<String> {
        let navigator = self.session.navigator();
        let mut chips: Vec<String> = navigator
            .visible_level()
            .iter()
            .map(|n| n.label.clone())
            .collect();
        if navigator.is_active() {
            chips.push(BACK_CHIP.to_string());
        }
        chips
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('h') => {
                    self.toggle_history();
                    return;
                }
                _ => {}
            }
        }
        // Many terminals send Ctrl-H as Backspace, so Alt-H and F2 also work
        if key.modifiers.contains(KeyModifiers::ALT) && key.code == KeyCode::Char('h') {
            self.toggle_history();
            return;
        }

        match key.code {
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::F(2) => self.toggle_history(),
            KeyCode::Esc => {
                if !self.session.back_to_topics() {
                    self.focus = Focus::Input;
                }
                self.chip_cursor = 0;
            }
            _ => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::Chips => self.handle_chip_key(key),
                Focus::History => self.handle_history_key(key),
            },
        }
    }

    fn toggle_history(&mut self) {
        self.focus = if self.focus == Focus::History {
            Focus::Input
        } else {
            Focus::History
        };
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Chips,
            Focus::Chips | Focus::History => Focus::Input,
        };
        self.chip_cursor = 0;
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                match self.session.submit_text(&text) {
                    Ok(()) => self.notice = None,
                    Err(SubmitError::Empty) => {}
                    Err(e) => {
                        // Keep what was typed
                        self.input = text;
                        self.refused(&e);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn handle_chip_key(&mut self, key: KeyEvent) {
        let chips = self.chips();
        match key.code {
            KeyCode::Left | KeyCode::Up => {
                self.chip_cursor = self.chip_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Down => {
                if self.chip_cursor + 1 < chips.len() {
                    self.chip_cursor += 1;
                }
            }
            KeyCode::Enter => {
                let Some(label) = chips.get(self.chip_cursor) else {
                    return;
                };
                if label == BACK_CHIP {
                    self.session.back_to_topics();
                } else {
                    match self.session.activate_chip(label) {
                        Ok(_) => {
                            self.input.clear();
                            self.notice = None;
                        }
                        Err(e) => self.refused(&e),
                    }
                }
                self.chip_cursor = 0;
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let len = self.session.history().len();
        match key.code {
            KeyCode::Up => self.history_cursor = self.history_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.history_cursor + 1 < len {
                    self.history_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(entry) = self.session.history().entries().get(self.history_cursor) {
                    let id = entry.id.clone();
                    self.session.select_history(&id);
                }
            }
            _ => {}
        }
    }

    fn refused(&mut self, error: &SubmitError) {
        tracing::debug!(error = %error, "Submit refused");
        self.notice = Some(error.to_string());
    }
}
