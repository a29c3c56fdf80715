//! Mouse controllers attached to views.
//!
//! Device input handling lives outside the grid core; the core only routes an
//! already-translated [`MouseEvent`] to the controllers of the view under the
//! pointer. A controller claims an event by returning `true`.
//!
//! A view holds at most one controller slot, a [`ViewController`]. Adding a
//! second controller turns the slot into a [`ControllerMouseMultiple`], which
//! offers each event to its controllers in registration order until one
//! claims it.

use std::fmt;
use std::sync::Arc;

use crate::geometry::{Point, Rect};
use crate::item::ItemID;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Primary button (usually left).
    #[default]
    Left,
    /// Secondary button (usually right).
    Right,
    /// Middle button (scroll wheel click).
    Middle,
}

/// The kind of a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Press,
    Release,
    DoubleClick,
    Move,
    Enter,
    Leave,
}

/// A mouse event in space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub position: Point,
}

impl MouseEvent {
    /// Create a new mouse event.
    pub fn new(kind: MouseEventKind, button: MouseButton, position: Point) -> Self {
        Self {
            kind,
            button,
            position,
        }
    }
}

/// Where the event landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerContext {
    /// The cell under the pointer.
    pub item: ItemID,
    /// The rectangle of the view that received the event.
    pub view_rect: Rect,
}

/// Handles mouse events for a view.
pub trait ControllerMouse: Send + Sync {
    /// Process an event; returns `true` if the controller claims it.
    fn process_event(&self, event: &MouseEvent, ctx: &ControllerContext) -> bool;
}

/// Offers each event to several controllers in registration order.
///
/// The first controller that claims the event stops the dispatch.
#[derive(Clone, Default)]
pub struct ControllerMouseMultiple {
    controllers: Vec<Arc<dyn ControllerMouse>>,
}

impl ControllerMouseMultiple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_controller(&mut self, controller: Arc<dyn ControllerMouse>) {
        self.controllers.push(controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl ControllerMouse for ControllerMouseMultiple {
    fn process_event(&self, event: &MouseEvent, ctx: &ControllerContext) -> bool {
        self.controllers
            .iter()
            .any(|controller| controller.process_event(event, ctx))
    }
}

impl fmt::Debug for ControllerMouseMultiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerMouseMultiple")
            .field("controllers", &self.controllers.len())
            .finish()
    }
}

/// The controller slot of a view.
#[derive(Clone)]
pub enum ViewController {
    /// One controller.
    Single(Arc<dyn ControllerMouse>),
    /// Several controllers, dispatched first-claim-wins.
    Multiple(ControllerMouseMultiple),
}

impl ViewController {
    /// Returns the slot extended with `controller`.
    ///
    /// A single controller is upgraded to a multiplexer holding the previous
    /// controller first.
    pub fn with_added(self, controller: Arc<dyn ControllerMouse>) -> Self {
        match self {
            Self::Single(previous) => {
                let mut multiple = ControllerMouseMultiple::new();
                multiple.add_controller(previous);
                multiple.add_controller(controller);
                Self::Multiple(multiple)
            }
            Self::Multiple(mut multiple) => {
                multiple.add_controller(controller);
                Self::Multiple(multiple)
            }
        }
    }

    /// Number of controllers in the slot.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(multiple) => multiple.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ControllerMouse for ViewController {
    fn process_event(&self, event: &MouseEvent, ctx: &ControllerContext) -> bool {
        match self {
            Self::Single(controller) => controller.process_event(event, ctx),
            Self::Multiple(multiple) => multiple.process_event(event, ctx),
        }
    }
}

impl fmt::Debug for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("ViewController::Single"),
            Self::Multiple(multiple) => f
                .debug_tuple("ViewController::Multiple")
                .field(&multiple.len())
                .finish(),
        }
    }
}
