//! Embedded-page health state machine.
//!
//! ```text
//! Loading ──load end──────▶ Ready
//!    │  ▲                     │
//!    │  └──load start─────────┘
//!    │
//!    ├──load error / http error──▶ Error { msg }
//!    │                               │
//!    └──◀─ manual reload / retry ────┘
//!              elapsed / load start
//! ```
//!
//! The one non-obvious rule: a late `LoadEnd` that arrives while the machine
//! is in `Error` is dropped. The error overlay (and the pending retry) must
//! not be cancelled by a success signal from the load attempt that already
//! failed.

use statig::prelude::*;

use crate::display::UiState;
use crate::panel::PageEvent;

/// Shared storage for the page-health machine. The diagnostic message lives
/// in the `Error` state itself, so there is nothing to persist across
/// transitions.
#[derive(Debug, Default)]
pub struct PageHealth;

impl PageHealth {
    /// Snapshot the machine state as the `(ui_state, last_error)` pair stored
    /// in `DisplayConfig`.
    pub fn ui_state(state: &State) -> (UiState, Option<String>) {
        match state {
            State::Loading {} => (UiState::Loading, None),
            State::Ready {} => (UiState::Ready, None),
            State::Error { msg } => (UiState::Error, Some(msg.clone())),
        }
    }
}

#[state_machine(
    initial = "State::loading()",
    state(derive(Debug, Clone, PartialEq))
)]
impl PageHealth {
    /// A load attempt is in flight (also the initial state).
    #[state]
    fn loading(&mut self, event: &PageEvent) -> Outcome<State> {
        match event {
            PageEvent::LoadEnd => Transition(State::ready()),
            PageEvent::LoadError(desc) => Transition(State::error(desc.clone())),
            PageEvent::HttpError(code) => Transition(State::error(format!("HTTP_{code}"))),
            PageEvent::ManualReload => Transition(State::loading()),
            _ => Handled,
        }
    }

    /// The page is up. A new load start (remount or navigation) goes back to
    /// `Loading`; a runtime error goes straight to `Error`.
    #[state]
    fn ready(&mut self, event: &PageEvent) -> Outcome<State> {
        match event {
            PageEvent::LoadStart => Transition(State::loading()),
            PageEvent::ManualReload => Transition(State::loading()),
            PageEvent::LoadError(desc) => Transition(State::error(desc.clone())),
            PageEvent::HttpError(code) => Transition(State::error(format!("HTTP_{code}"))),
            _ => Handled,
        }
    }

    /// The page failed; `msg` carries the diagnostic shown on the overlay.
    #[state]
    fn error(&mut self, event: &PageEvent, msg: &String) -> Outcome<State> {
        let _ = msg; // read via ui_state()
        match event {
            PageEvent::ManualReload => Transition(State::loading()),
            PageEvent::RetryElapsed => Transition(State::loading()),
            // A remount (e.g. the hard-refresh timer) starts a fresh attempt.
            PageEvent::LoadStart => Transition(State::loading()),
            // Refresh the diagnostic, stay in Error.
            PageEvent::LoadError(desc) => Transition(State::error(desc.clone())),
            PageEvent::HttpError(code) => Transition(State::error(format!("HTTP_{code}"))),
            // Late success from the attempt that already failed: dropped.
            PageEvent::LoadEnd => Handled,
        }
    }
}
