//! Interaction models that should be available on both wasm and native.
//!
//! The islands keep their state in these plain types and only mirror them
//! into signals, so the interaction rules can be unit-tested on the host.

use crawltest::catalog::fixtures::{Panel, ACCORDIONS, MODALS, TABS};

/// Exactly one tab is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStrip {
    panels: &'static [Panel],
    active: usize,
}

impl TabStrip {
    pub fn new(panels: &'static [Panel]) -> Self {
        Self { panels, active: 0 }
    }

    pub fn panels(&self) -> &'static [Panel] {
        self.panels
    }

    pub fn active(&self) -> Option<&'static Panel> {
        self.panels.get(self.active)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active().is_some_and(|p| p.id == id)
    }

    /// Switch to the tab with `id`. Unknown ids leave the selection alone.
    pub fn select(&mut self, id: &str) -> bool {
        match self.panels.iter().position(|p| p.id == id) {
            Some(i) => {
                self.active = i;
                true
            }
            None => false,
        }
    }
}

impl Default for TabStrip {
    fn default() -> Self {
        Self::new(&TABS)
    }
}

/// Any number of sections may be open at once. Open order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionSet {
    panels: &'static [Panel],
    open: Vec<&'static str>,
}

impl AccordionSet {
    pub fn new(panels: &'static [Panel]) -> Self {
        Self {
            panels,
            open: Vec::new(),
        }
    }

    pub fn panels(&self) -> &'static [Panel] {
        self.panels
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.iter().any(|o| *o == id)
    }

    pub fn open_ids(&self) -> &[&'static str] {
        &self.open
    }

    /// Flip one section. Returns the new open state, or `None` for an
    /// unknown id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let panel = self.panels.iter().find(|p| p.id == id)?;
        if self.is_open(id) {
            self.open.retain(|o| *o != id);
            Some(false)
        } else {
            self.open.push(panel.id);
            Some(true)
        }
    }
}

impl Default for AccordionSet {
    fn default() -> Self {
        Self::new(&ACCORDIONS)
    }
}

/// Which modal is selected and whether the overlay is up.
///
/// Closing keeps the selection so the next open of the same kind is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    panels: &'static [Panel],
    selected: usize,
    open: bool,
}

impl ModalState {
    pub fn new(panels: &'static [Panel]) -> Self {
        Self {
            panels,
            selected: 0,
            open: false,
        }
    }

    pub fn panels(&self) -> &'static [Panel] {
        self.panels
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The panel shown while open.
    pub fn visible(&self) -> Option<&'static Panel> {
        if self.open {
            self.panels.get(self.selected)
        } else {
            None
        }
    }

    pub fn open(&mut self, id: &str) -> bool {
        match self.panels.iter().position(|p| p.id == id) {
            Some(i) => {
                self.selected = i;
                self.open = true;
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

impl Default for ModalState {
    fn default() -> Self {
        Self::new(&MODALS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealToggle {
    shown: bool,
}

impl RevealToggle {
    pub fn is_shown(self) -> bool {
        self.shown
    }

    pub fn toggle(&mut self) {
        self.shown = !self.shown;
    }

    pub fn set(&mut self, shown: bool) {
        self.shown = shown;
    }

    pub fn button_label(self) -> &'static str {
        if self.shown {
            "Hide Content"
        } else {
            "Show Content"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    value: i64,
}

impl Counter {
    pub fn value(self) -> i64 {
        self.value
    }

    pub fn increment(&mut self) {
        self.value = self.value.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
    }
}
