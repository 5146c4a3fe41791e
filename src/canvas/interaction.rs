use tracing::debug;

use crate::board::{ItemId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Drag,
    Link,
}

impl InteractionMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::Link => "link",
        }
    }
}

/// Pointer interaction in progress. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        item_id: ItemId,
        /// `pointer_start - original_position`, fixed for the whole drag.
        grab_offset: Point,
    },
    Linking {
        source_id: ItemId,
        anchor: Point,
        pointer: Point,
    },
}

impl Interaction {
    pub fn mode(&self) -> Option<InteractionMode> {
        match self {
            Self::Idle => None,
            Self::Dragging { .. } => Some(InteractionMode::Drag),
            Self::Linking { .. } => Some(InteractionMode::Link),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Transient line drawn while linking. Never stored on an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPreview {
    pub source_id: ItemId,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Connected { source_id: ItemId, target_id: ItemId },
    AlreadyConnected { source_id: ItemId, target_id: ItemId },
    Cancelled,
}

/// Host-side resources held for the duration of a drag or link, such as
/// suppressing text selection or capturing the pointer.
pub trait InteractionHost: Send {
    fn acquire(&mut self, mode: InteractionMode);
    fn release(&mut self, mode: InteractionMode);
}

#[derive(Debug, Default)]
pub struct LoggingHost;

impl InteractionHost for LoggingHost {
    fn acquire(&mut self, mode: InteractionMode) {
        debug!(mode = mode.label(), "interaction scope acquired");
    }

    fn release(&mut self, mode: InteractionMode) {
        debug!(mode = mode.label(), "interaction scope released");
    }
}
