//! Keyboard and pointer selection over the suggestion dropdown.

use crate::suggest::engine::Suggestion;

/// Dropdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Closed,
    /// `selected` is `None` until the user moves into the list
    Open { selected: Option<usize> },
}

/// Input the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    /// Pointer over item `i`
    Hover(usize),
    /// Interaction outside the control
    Dismiss,
}

/// Selection state machine for the current suggestion list
#[derive(Debug, Clone, Default)]
pub struct SuggestionNav {
    state: NavState,
    items: Vec<Suggestion>,
}

impl SuggestionNav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, NavState::Open { .. })
    }

    /// Visible suggestions (empty while closed)
    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            NavState::Open { selected } => selected,
            NavState::Closed => None,
        }
    }

    pub fn selected_item(&self) -> Option<&Suggestion> {
        self.selected().and_then(|i| self.items.get(i))
    }

    /// Show a fresh suggestion list. An empty list closes the dropdown.
    pub fn replace(&mut self, items: Vec<Suggestion>) {
        if items.is_empty() {
            self.close();
        } else {
            self.items = items;
            self.state = NavState::Open { selected: None };
        }
    }

    pub fn close(&mut self) {
        self.items.clear();
        self.state = NavState::Closed;
    }

    /// Feed one event. Returns the suggestion to commit when Enter picks one.
    pub fn handle(&mut self, event: NavEvent) -> Option<Suggestion> {
        let NavState::Open { selected } = self.state else {
            return None;
        };
        let last = self.items.len().saturating_sub(1);

        match event {
            NavEvent::ArrowDown => {
                let next = match selected {
                    None => 0,
                    Some(i) => (i + 1).min(last),
                };
                self.state = NavState::Open {
                    selected: Some(next),
                };
                None
            }
            NavEvent::ArrowUp => {
                let prev = match selected {
                    None | Some(0) => None,
                    Some(i) => Some(i - 1),
                };
                self.state = NavState::Open { selected: prev };
                None
            }
            NavEvent::Hover(i) => {
                if i < self.items.len() {
                    self.state = NavState::Open { selected: Some(i) };
                }
                None
            }
            NavEvent::Enter => {
                let picked = selected.and_then(|i| self.items.get(i).cloned());
                if picked.is_some() {
                    self.close();
                }
                picked
            }
            NavEvent::Escape | NavEvent::Dismiss => {
                self.close();
                None
            }
        }
    }
}
