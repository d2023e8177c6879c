// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input vocabulary delivered by the host.
//!
//! These types describe *what happened* in host terms (a key went down on the
//! input, a candidate was clicked, the input lost focus). They carry no
//! combobox semantics; [`classify`](crate::classify) turns them into
//! [`Action`](crate::Action)s.

use alloc::string::String;

use bitflags::bitflags;
use kurbo::Point;

bitflags! {
    /// Keyboard modifiers held while a key event was delivered.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 1 << 0;
        /// Alt / Option key.
        const ALT = 1 << 1;
        /// Control key.
        const CTRL = 1 << 2;
        /// Meta / Command / Super key.
        const META = 1 << 3;
    }
}

/// Logical key, already resolved from the host's keyboard layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Down arrow.
    ArrowDown,
    /// Up arrow.
    ArrowUp,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab (Shift+Tab is reported through [`Modifiers::SHIFT`]).
    Tab,
    /// Backspace.
    Backspace,
    /// A printable character.
    Character(char),
    /// Any other key.
    Other,
}

/// Interactive part of the widget an event was delivered to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// The label describing the input.
    Label,
    /// The button that opens and closes the candidate list.
    ToggleButton,
    /// The text input.
    Input,
    /// The candidate list container.
    Menu,
    /// The candidate at the given position in the current list.
    Item(usize),
}

/// Where an event landed, as far as the host can tell.
///
/// Hosts that track widget parts report [`EventTarget::Region`]; hosts that
/// only have pointer coordinates report [`EventTarget::Point`] and let the
/// [`Environment`](crate::Environment) decide containment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventTarget {
    /// A part of this widget.
    Region(Region),
    /// A position in the environment's coordinate space.
    Point(Point),
    /// Something the host cannot relate to this widget (another window, nothing).
    Detached,
}

/// An event delivered to one of the widget's [`Region`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    /// A key went down while the region had focus.
    KeyDown {
        /// The key.
        key: Key,
        /// Modifiers held.
        modifiers: Modifiers,
        /// Whether an IME composition session is in progress.
        composing: bool,
    },
    /// The text content of the input changed.
    Change {
        /// The new text.
        value: String,
    },
    /// Primary-button click.
    Click,
    /// The pointer moved within the region.
    MouseMove,
    /// The pointer left the region.
    MouseLeave,
    /// The region gained focus.
    Focus,
    /// The region lost focus.
    Blur {
        /// Where focus went, if known.
        related_target: Option<EventTarget>,
    },
}

impl RawEvent {
    /// A key press without modifiers.
    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::empty(),
            composing: false,
        }
    }

    /// A key press with modifiers.
    pub fn key_with(key: Key, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key,
            modifiers,
            composing: false,
        }
    }

    /// A text change on the input.
    pub fn change(value: impl Into<String>) -> Self {
        Self::Change {
            value: value.into(),
        }
    }
}

/// A [`RawEvent`] on its way through a caller-supplied handler.
///
/// The caller's handler runs before the combobox's own logic. Calling
/// [`HostEvent::suppress_default`] skips the combobox step for this event.
#[derive(Clone, Debug, PartialEq)]
pub struct HostEvent {
    /// The wrapped event.
    pub event: RawEvent,
    default_suppressed: bool,
}

impl HostEvent {
    /// Wrap a raw event.
    pub fn new(event: RawEvent) -> Self {
        Self {
            event,
            default_suppressed: false,
        }
    }

    /// Ask the combobox not to process this event.
    pub fn suppress_default(&mut self) {
        self.default_suppressed = true;
    }

    /// Whether [`HostEvent::suppress_default`] was called.
    pub fn is_default_suppressed(&self) -> bool {
        self.default_suppressed
    }
}

/// Document-level event kinds the widget listens to for outside interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocumentEventKind {
    /// Pointer button pressed anywhere.
    MouseDown,
    /// Pointer button released anywhere.
    MouseUp,
    /// Touch started anywhere.
    TouchStart,
    /// Touch moved anywhere.
    TouchMove,
    /// Touch ended anywhere.
    TouchEnd,
}

impl DocumentEventKind {
    /// Every kind the combobox subscribes to, in registration order.
    pub const ALL: [Self; 5] = [
        Self::MouseDown,
        Self::MouseUp,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
    ];
}

/// A document-level event, forwarded by the host for a registered listener.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DocumentEvent {
    /// Which listener fired.
    pub kind: DocumentEventKind,
    /// Where it landed.
    pub target: EventTarget,
}

impl DocumentEvent {
    /// Create a document event.
    pub fn new(kind: DocumentEventKind, target: EventTarget) -> Self {
        Self { kind, target }
    }
}
