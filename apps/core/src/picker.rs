//! Type-to-filter picker over a fixed list of [`FileRecord`]s.
//!
//! The picker owns its candidates for its whole life, re-ranks them on every
//! query change, and keeps `selected_index` clamped to the ranked list. While
//! open it holds a [`KeyListenerGuard`] so platform-modifier+Enter is seen even
//! though the built-in Enter binding ignores modifiers. Every path to
//! `Closed` drops that guard, including dropping the picker itself.

use crate::keyboard::{
    default_binding, modifier_confirm_listener, KeyCommand, KeyEvent, KeyListenerGuard,
    KeyboardHub, Platform,
};
use crate::model::FileRecord;
use crate::overlay_state::{CloseReason, OverlayState};
use crate::search;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub record: FileRecord,
    pub modifier_held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Pending,
    Selected(Selection),
    Dismissed,
    /// The event arrived after the picker had already closed.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub command: String,
    pub purpose: String,
}

impl Instruction {
    fn new(command: &str, purpose: &str) -> Self {
        Self {
            command: command.to_string(),
            purpose: purpose.to_string(),
        }
    }
}

pub struct FuzzyPicker {
    candidates: Vec<FileRecord>,
    query: String,
    ranked: Vec<FileRecord>,
    selected_index: usize,
    hint: String,
    modifier_purpose: String,
    platform: Platform,
    state: OverlayState,
    keyboard: KeyboardHub,
    listener: Option<KeyListenerGuard>,
}

impl FuzzyPicker {
    pub fn new(candidates: Vec<FileRecord>, hint: &str, platform: Platform, keyboard: KeyboardHub) -> Self {
        let ranked = candidates.clone();
        Self {
            candidates,
            query: String::new(),
            ranked,
            selected_index: 0,
            hint: hint.to_string(),
            modifier_purpose: "to open in a new tab".to_string(),
            platform,
            state: OverlayState::default(),
            keyboard,
            listener: None,
        }
    }

    pub fn with_modifier_purpose(mut self, purpose: &str) -> Self {
        self.modifier_purpose = purpose.to_string();
        self
    }

    pub fn open(&mut self) {
        if !self.state.on_open() {
            return;
        }
        self.listener = Some(
            self.keyboard
                .subscribe(modifier_confirm_listener(self.platform)),
        );
        self.rerank();
        tracing::debug!(
            target: "recentpick::picker",
            hint = %self.hint,
            candidates = self.candidates.len(),
            "picker opened"
        );
    }

    /// Closes without a selection. Safe to call in any state.
    pub fn close(&mut self, reason: CloseReason) {
        self.listener = None;
        if let Some(reason) = self.state.on_close(reason) {
            tracing::debug!(target: "recentpick::picker", ?reason, "picker closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn candidates(&self) -> &[FileRecord] {
        &self.candidates
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.rerank();
    }

    pub fn ranked_matches(&self) -> &[FileRecord] {
        &self.ranked
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&FileRecord> {
        self.ranked.get(self.selected_index)
    }

    pub fn placeholder(&self) -> String {
        format!("Search recently {} files...", self.hint)
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        let modifier_enter = format!("{}+↵", self.platform.modifier_label());
        vec![
            Instruction::new("↑↓", "to navigate"),
            Instruction::new("↵", "to open the selected file"),
            Instruction::new(&modifier_enter, &self.modifier_purpose),
            Instruction::new("esc", "to dismiss"),
        ]
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> PickerOutcome {
        if !self.is_open() {
            return PickerOutcome::Closed;
        }
        let command = self
            .keyboard
            .dispatch(event)
            .unwrap_or_else(|| default_binding(event));
        self.apply(command)
    }

    pub fn apply(&mut self, command: KeyCommand) -> PickerOutcome {
        if !self.is_open() {
            return PickerOutcome::Closed;
        }

        match command {
            KeyCommand::MoveUp => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCommand::MoveDown => {
                let max = self.ranked.len().saturating_sub(1);
                self.selected_index = (self.selected_index + 1).min(max);
            }
            KeyCommand::Insert(ch) => {
                self.query.push(ch);
                self.rerank();
            }
            KeyCommand::DeleteBack => {
                if self.query.pop().is_some() {
                    self.rerank();
                }
            }
            KeyCommand::Confirm { modifier_held } => {
                // Nothing to choose: stay open so the user can edit the query.
                let Some(record) = self.selected().cloned() else {
                    return PickerOutcome::Pending;
                };
                self.close(CloseReason::Confirmed);
                return PickerOutcome::Selected(Selection {
                    record,
                    modifier_held,
                });
            }
            KeyCommand::Dismiss => {
                self.close(CloseReason::Dismissed);
                return PickerOutcome::Dismissed;
            }
            KeyCommand::Ignore => {}
        }
        PickerOutcome::Pending
    }

    fn rerank(&mut self) {
        self.ranked = search::rank(&self.candidates, &self.query);
        self.selected_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{FuzzyPicker, PickerOutcome};
    use crate::keyboard::{KeyCommand, KeyEvent, KeyboardHub, Platform};
    use crate::model::FileRecord;

    fn picker(names: &[&str]) -> FuzzyPicker {
        let records = names.iter().map(|name| FileRecord::new(name, name)).collect();
        FuzzyPicker::new(records, "modified", Platform::Linux, KeyboardHub::new())
    }

    #[test]
    fn ignores_input_until_opened() {
        let mut picker = picker(&["a.md"]);
        assert_eq!(picker.handle_key(&KeyEvent::char('a')), PickerOutcome::Closed);
        assert_eq!(picker.query(), "");
    }

    #[test]
    fn typing_resets_selection_to_top() {
        let mut picker = picker(&["alpha.md", "beta.md", "gamma.md"]);
        picker.open();
        picker.apply(KeyCommand::MoveDown);
        picker.apply(KeyCommand::MoveDown);
        assert_eq!(picker.selected_index(), 2);

        picker.apply(KeyCommand::Insert('a'));
        assert_eq!(picker.selected_index(), 0);
    }

    #[test]
    fn backspace_on_empty_query_is_noop() {
        let mut picker = picker(&["a.md", "b.md"]);
        picker.open();
        picker.apply(KeyCommand::MoveDown);
        picker.apply(KeyCommand::DeleteBack);
        assert_eq!(picker.selected_index(), 1);
    }

    #[test]
    fn confirm_on_empty_list_stays_open() {
        let mut picker = picker(&[]);
        picker.open();
        let outcome = picker.apply(KeyCommand::Confirm {
            modifier_held: false,
        });
        assert_eq!(outcome, PickerOutcome::Pending);
        assert!(picker.is_open());
    }

    #[test]
    fn placeholder_carries_category_hint() {
        let picker = picker(&[]);
        assert_eq!(picker.placeholder(), "Search recently modified files...");
    }
}
