//! Durable banner UI state.
//!
//! The only piece of state the banner keeps across re-renders is whether the
//! contact-details panel is expanded. It is owned here, mutated by exactly
//! one operation, and never influenced by external data.

use serde::Serialize;

/// Direction of the chevron on the details toggle button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChevronDirection {
    /// Panel collapsed; clicking expands.
    Down,
    /// Panel expanded; clicking collapses.
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContactDetails {
    Collapsed,
    Expanded,
}

/// Visibility state of the contact-details panel.
///
/// Two states, `Collapsed` (initial) and `Expanded`; the only transition is
/// [`toggle_contact_details`](Self::toggle_contact_details), symmetric in
/// both directions. The state persists for the lifetime of the banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerViewState {
    contact_details: ContactDetails,
}

impl Default for BannerViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl BannerViewState {
    /// Starts collapsed.
    pub fn new() -> Self {
        Self {
            contact_details: ContactDetails::Collapsed,
        }
    }

    /// Pure read of the panel visibility.
    pub fn contact_details_visible(&self) -> bool {
        self.contact_details == ContactDetails::Expanded
    }

    /// Flip the panel visibility. Two calls restore the original state.
    pub fn toggle_contact_details(&mut self) {
        self.contact_details = match self.contact_details {
            ContactDetails::Collapsed => ContactDetails::Expanded,
            ContactDetails::Expanded => ContactDetails::Collapsed,
        };
    }

    /// Label for the details toggle button.
    pub fn toggle_label(&self) -> &'static str {
        match self.contact_details {
            ContactDetails::Collapsed => "Show all details",
            ContactDetails::Expanded => "Hide all details",
        }
    }

    /// Chevron direction for the details toggle button.
    pub fn chevron(&self) -> ChevronDirection {
        match self.contact_details {
            ContactDetails::Collapsed => ChevronDirection::Down,
            ContactDetails::Expanded => ChevronDirection::Up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_collapsed() {
        let state = BannerViewState::new();
        assert!(!state.contact_details_visible());
        assert_eq!(state.toggle_label(), "Show all details");
        assert_eq!(state.chevron(), ChevronDirection::Down);
    }

    #[test]
    fn toggle_expands_then_collapses() {
        let mut state = BannerViewState::new();

        state.toggle_contact_details();
        assert!(state.contact_details_visible());
        assert_eq!(state.toggle_label(), "Hide all details");
        assert_eq!(state.chevron(), ChevronDirection::Up);

        state.toggle_contact_details();
        assert!(!state.contact_details_visible());
        assert_eq!(state.toggle_label(), "Show all details");
        assert_eq!(state.chevron(), ChevronDirection::Down);
    }

    #[test]
    fn toggle_pairs_are_identity() {
        let mut state = BannerViewState::new();
        let initial = state.clone();
        state.toggle_contact_details();
        state.toggle_contact_details();
        assert_eq!(state, initial);
    }
}
