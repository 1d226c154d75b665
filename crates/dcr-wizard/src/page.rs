//! Wizard pages and the linear transition graph
//!
//! `Login → Upload → ManualAnnotation → AiAnnotation → Comparison`, plus
//! the revisit edge `ManualAnnotation → Upload`. Logout and professional
//! menu navigation bypass this graph and are gated by the controller.

use crate::error::WizardError;
use serde::{Deserialize, Serialize};

/// Wizard page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Role selection and credentials
    Login,
    /// Image upload
    Upload,
    /// Clinician entry per tooth
    ManualAnnotation,
    /// Oracle findings per tooth
    AiAnnotation,
    /// Manual vs AI report
    Comparison,
}

impl Page {
    /// Every page in wizard order
    pub const ALL: [Page; 5] = [
        Page::Login,
        Page::Upload,
        Page::ManualAnnotation,
        Page::AiAnnotation,
        Page::Comparison,
    ];

    /// Page reached by `Next`, if any
    #[must_use]
    pub fn next(self) -> Option<Page> {
        match self {
            Page::Login => None,
            Page::Upload => Some(Page::ManualAnnotation),
            Page::ManualAnnotation => Some(Page::AiAnnotation),
            Page::AiAnnotation => Some(Page::Comparison),
            Page::Comparison => None,
        }
    }

    /// Title shown in the menu
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Upload => "Upload",
            Page::ManualAnnotation => "Manual",
            Page::AiAnnotation => "AI",
            Page::Comparison => "Comparison",
        }
    }

    /// True for pages reachable from the professional menu
    #[inline]
    #[must_use]
    pub fn is_navigable(self) -> bool {
        self != Page::Login
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Validates a wizard transition
///
/// # Errors
/// - `WizardError::IllegalTransition` for an edge outside the wizard graph
pub fn validate_transition(from: Page, to: Page) -> Result<(), WizardError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(WizardError::IllegalTransition { from, to })
    }
}

/// Pages reachable from `from` through wizard actions
#[must_use]
pub fn allowed_transitions(from: Page) -> Vec<Page> {
    use Page::{AiAnnotation, Comparison, Login, ManualAnnotation, Upload};
    match from {
        Login => vec![Upload],
        Upload => vec![ManualAnnotation],
        ManualAnnotation => vec![AiAnnotation, Upload],
        AiAnnotation => vec![Comparison],
        Comparison => vec![],
    }
}

fn allowed(from: Page, to: Page) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn page() -> impl Strategy<Value = Page> {
        prop_oneof![
            Just(Page::Login),
            Just(Page::Upload),
            Just(Page::ManualAnnotation),
            Just(Page::AiAnnotation),
            Just(Page::Comparison),
        ]
    }

    #[test]
    fn next_follows_graph() {
        for from in Page::ALL {
            if let Some(to) = from.next() {
                assert!(validate_transition(from, to).is_ok(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn revisit_edge_exists() {
        assert!(validate_transition(Page::ManualAnnotation, Page::Upload).is_ok());
        assert!(validate_transition(Page::AiAnnotation, Page::Upload).is_err());
    }

    #[test]
    fn comparison_is_terminal() {
        assert!(allowed_transitions(Page::Comparison).is_empty());
    }

    proptest! {
        #[test]
        fn prop_validate_matches_allowed(from in page(), to in page()) {
            let listed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(validate_transition(from, to).is_ok(), listed);
        }

        #[test]
        fn prop_login_never_reentered(from in page()) {
            prop_assert!(validate_transition(from, Page::Login).is_err());
        }
    }
}
