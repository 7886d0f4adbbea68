//! # Traversal State Machine
//!
//! Tracks where a single `process_tree` run is:
//!
//! ```text
//! Init ──start──▶ Listing { cursor: None } ──advance──▶ Listing { cursor: Some(..) }
//!                        │                                     │
//!                        └──────────── advance ────────────────┴──▶ Done
//!  any non-terminal ──fail──▶ Failed
//! ```

use bridge_traits::ListingPage;

use crate::{Result, SyncError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TraversalState {
    /// Created, nothing fetched yet
    #[default]
    Init,
    /// Fetching pages; `cursor` is `None` until the first page arrived
    Listing { cursor: Option<String> },
    /// Last page processed
    Done,
    Failed,
}

impl TraversalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalState::Init => "init",
            TraversalState::Listing { .. } => "listing",
            TraversalState::Done => "done",
            TraversalState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TraversalState::Done | TraversalState::Failed)
    }

    /// Cursor of the next page to fetch, `None` for the initial listing call
    pub fn cursor(&self) -> Option<&str> {
        match self {
            TraversalState::Listing { cursor } => cursor.as_deref(),
            _ => None,
        }
    }

    /// Enter the listing phase
    pub fn start(self) -> Result<Self> {
        let next = TraversalState::Listing { cursor: None };
        self.validate_transition(&next)?;
        Ok(next)
    }

    /// Move past a processed page
    ///
    /// Stays in `Listing` with the page's cursor while the provider reports
    /// more entries and finishes otherwise.
    pub fn advance(self, page: &ListingPage) -> Result<Self> {
        let next = if page.has_more {
            let cursor = page.next_cursor().ok_or(SyncError::MissingCursor)?;
            TraversalState::Listing {
                cursor: Some(cursor.to_string()),
            }
        } else {
            TraversalState::Done
        };

        self.validate_transition(&next)?;
        Ok(next)
    }

    pub fn fail(self) -> Result<Self> {
        let next = TraversalState::Failed;
        self.validate_transition(&next)?;
        Ok(next)
    }

    fn validate_transition(&self, to: &TraversalState) -> Result<()> {
        let valid = match (self, to) {
            (TraversalState::Init, TraversalState::Listing { cursor: None }) => true,
            (TraversalState::Init, TraversalState::Failed) => true,

            (TraversalState::Listing { .. }, TraversalState::Listing { cursor: Some(_) }) => true,
            (TraversalState::Listing { .. }, TraversalState::Done) => true,
            (TraversalState::Listing { .. }, TraversalState::Failed) => true,

            // Terminal states cannot transition
            (TraversalState::Done, _) | (TraversalState::Failed, _) => false,

            _ => false,
        };

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!("Cannot transition from {} to {}", self.as_str(), to.as_str()),
            });
        }

        Ok(())
    }
}

impl std::fmt::Display for TraversalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(has_more: bool, cursor: Option<&str>) -> ListingPage {
        ListingPage {
            entries: vec![],
            has_more,
            cursor: cursor.map(str::to_string),
        }
    }

    #[test]
    fn test_happy_path() {
        let state = TraversalState::default().start().unwrap();
        assert_eq!(state, TraversalState::Listing { cursor: None });
        assert_eq!(state.cursor(), None);

        let state = state.advance(&page(true, Some("c1"))).unwrap();
        assert_eq!(state.cursor(), Some("c1"));
        assert!(!state.is_terminal());

        let state = state.advance(&page(true, Some("c2"))).unwrap();
        assert_eq!(state.cursor(), Some("c2"));

        let state = state.advance(&page(false, Some("c3"))).unwrap();
        assert_eq!(state, TraversalState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_more_without_cursor() {
        let state = TraversalState::Init.start().unwrap();
        let result = state.advance(&page(true, None));
        assert!(matches!(result, Err(SyncError::MissingCursor)));
    }

    #[test]
    fn test_advance_requires_listing() {
        let result = TraversalState::Init.advance(&page(false, None));
        assert!(matches!(
            result,
            Err(SyncError::InvalidStateTransition { .. })
        ));

        let result = TraversalState::Done.advance(&page(true, Some("c1")));
        assert!(matches!(
            result,
            Err(SyncError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(TraversalState::Done.fail().is_err());
        assert!(TraversalState::Failed.fail().is_err());
        assert!(TraversalState::Failed.start().is_err());
    }

    #[test]
    fn test_fail_from_active_states() {
        assert_eq!(TraversalState::Init.fail().unwrap(), TraversalState::Failed);
        let listing = TraversalState::Listing {
            cursor: Some("c1".to_string()),
        };
        assert_eq!(listing.fail().unwrap(), TraversalState::Failed);
    }
}
