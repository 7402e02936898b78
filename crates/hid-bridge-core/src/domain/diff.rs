//! Keyboard report differencing.
//!
//! Given the previously observed report and a new one, [`diff_reports`]
//! derives the minimal ordered list of [`SemanticEvent`]s that turns the
//! first into the second:
//!
//! 1. one `ModifierChanged` carrying the **full** new modifier byte, if the
//!    byte differs;
//! 2. one `KeyReleased` per code of `previous` no longer held, in the slot
//!    order of `previous`;
//! 3. one `KeyPressed` per code of `current` not held before, in the slot
//!    order of `current`.
//!
//! # Duplicate slots (for beginners)
//!
//! Some keyboards briefly report the same key code in two slots.  With
//! [`Membership::Presence`] (the default) the differ only asks "is this code
//! anywhere in the other report?", so `[A, A]` → `[A]` produces nothing and
//! `[A]` → `[A, A]` produces no second press.  A partial release of a
//! duplicated code is therefore invisible.  [`Membership::Counted`] compares
//! occurrence counts instead and reports each lost or gained copy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::report::{KeyboardReport, ModifierMask, KEY_SLOTS};
use crate::keymap::hid::KeyName;

/// Upper bound on events a single diff can produce: one modifier change,
/// six releases and six presses.
pub const MAX_EVENTS_PER_DIFF: usize = 1 + 2 * KEY_SLOTS;

/// One discrete change between two keyboard reports.
///
/// Key codes are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticEvent {
    /// The modifier byte changed; `new_mask` replaces the receiver's state.
    ModifierChanged { new_mask: ModifierMask },
    /// A key became held.
    KeyPressed { code: u8 },
    /// A key is no longer held.
    KeyReleased { code: u8 },
}

impl SemanticEvent {
    /// Returns the press/release mirror of a key event; modifier events are
    /// returned unchanged.
    pub fn mirrored(self) -> Self {
        match self {
            SemanticEvent::KeyPressed { code } => SemanticEvent::KeyReleased { code },
            SemanticEvent::KeyReleased { code } => SemanticEvent::KeyPressed { code },
            other => other,
        }
    }
}

impl fmt::Display for SemanticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticEvent::ModifierChanged { new_mask } => {
                write!(f, "modifiers 0x{:02X} ({new_mask})", new_mask.bits())
            }
            SemanticEvent::KeyPressed { code } => write!(f, "pressed {}", KeyName(*code)),
            SemanticEvent::KeyReleased { code } => write!(f, "released {}", KeyName(*code)),
        }
    }
}

/// How the differ decides whether a code is "still held".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// A code is held if it appears in any slot.  Duplicates collapse.
    #[default]
    Presence,
    /// Each occurrence of a code is tracked separately.
    Counted,
}

/// Computes the ordered events separating `previous` from `current`.
///
/// Total over all inputs: zero slots are ignored and there is no failure path.
pub fn diff_reports(
    previous: &KeyboardReport,
    current: &KeyboardReport,
    membership: Membership,
) -> Vec<SemanticEvent> {
    let mut events = Vec::with_capacity(MAX_EVENTS_PER_DIFF);

    if previous.modifiers != current.modifiers {
        events.push(SemanticEvent::ModifierChanged {
            new_mask: current.modifiers,
        });
    }

    events.extend(
        vanished(previous, current, membership).map(|code| SemanticEvent::KeyReleased { code }),
    );
    events.extend(
        vanished(current, previous, membership).map(|code| SemanticEvent::KeyPressed { code }),
    );

    events
}

/// Yields the code of every non-zero slot of `from` that is absent from
/// `to`, in slot order.
fn vanished<'a>(
    from: &'a KeyboardReport,
    to: &'a KeyboardReport,
    membership: Membership,
) -> impl Iterator<Item = u8> + 'a {
    from.keycodes
        .iter()
        .copied()
        .enumerate()
        .filter(move |&(slot, code)| {
            if code == 0 {
                return false;
            }
            match membership {
                Membership::Presence => !to.contains(code),
                Membership::Counted => {
                    // k-th copy of `code` in `from` (1-based)
                    let nth = from.keycodes[..=slot].iter().filter(|&&c| c == code).count();
                    to.occurrences(code) < nth
                }
            }
        })
        .map(|(_, code)| code)
}

/// Per-device differ holding the most recently observed report.
///
/// Each physical keyboard must own its own instance; retained state is
/// never shared between devices.
///
/// # Examples
///
/// ```rust
/// use hid_bridge_core::{KeyboardReport, ReportDiffer, SemanticEvent};
///
/// let mut differ = ReportDiffer::new();
/// let events = differ.observe(KeyboardReport::new(0, [0x04, 0, 0, 0, 0, 0]));
/// assert_eq!(events, vec![SemanticEvent::KeyPressed { code: 0x04 }]);
/// assert_eq!(differ.retained().keycodes[0], 0x04);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReportDiffer {
    retained: KeyboardReport,
    membership: Membership,
}

impl ReportDiffer {
    /// Creates a differ whose retained report is all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a differ that starts from `initial` instead of all zero.
    pub fn with_initial(initial: KeyboardReport) -> Self {
        Self {
            retained: initial,
            membership: Membership::default(),
        }
    }

    /// Selects the membership semantics used by subsequent diffs.
    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }

    /// The report the next diff will compare against.
    pub fn retained(&self) -> &KeyboardReport {
        &self.retained
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    /// Diffs `current` against the retained report, then retains `current`.
    ///
    /// The retained report is replaced unconditionally, including when no
    /// events are produced and regardless of what the caller later does with
    /// the events.
    pub fn observe(&mut self, current: KeyboardReport) -> Vec<SemanticEvent> {
        let events = diff_reports(&self.retained, &current, self.membership);
        self.retained = current;
        events
    }

    /// Forgets the retained report (back to all zero).
    pub fn reset(&mut self) {
        self.retained = KeyboardReport::default();
    }
}
