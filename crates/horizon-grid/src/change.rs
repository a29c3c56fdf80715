//! Change reasons and view application masks.
//!
//! Every mutable entity announces its mutations with a [`ChangeReason`]. The
//! reasons combine freely; consumers test for the bits they care about. The
//! two `SPACE_ITEMS_*` bits are added by a space when it re-emits the change
//! of one of its schemas:
//!
//! - [`ChangeReason::SPACE_ITEMS_STRUCTURE`]: which schemas apply to which
//!   cells, or where they are placed, may have changed. Caches must drop the
//!   resolved items.
//! - [`ChangeReason::SPACE_ITEMS_CONTENT`]: only the rendered appearance
//!   changed. Caches keep their items and only repaint.

bitflags::bitflags! {
    /// Why an entity changed.
    ///
    /// Combine with bitwise OR: `ChangeReason::VIEW_SIZE | ChangeReason::VIEW_CONTENT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeReason: u32 {
        const NONE = 0;
        /// A view's mouse controller was replaced or extended.
        const VIEW_CONTROLLER = 1 << 0;
        /// A view's size hint changed.
        const VIEW_SIZE = 1 << 1;
        /// A view's appearance changed.
        const VIEW_CONTENT = 1 << 2;
        /// A view's application exclude mask changed.
        const VIEW_APPLICATION = 1 << 3;
        /// A range's membership changed.
        const RANGE = 1 << 4;
        /// A layout's geometry changed.
        const LAYOUT = 1 << 5;
        /// A model value changed.
        const MODEL = 1 << 6;
        /// Schema membership or placement in a space changed.
        const SPACE_ITEMS_STRUCTURE = 1 << 7;
        /// Only the rendered content of a space changed.
        const SPACE_ITEMS_CONTENT = 1 << 8;
    }
}

impl ChangeReason {
    /// Returns `true` if cached item resolutions must be dropped.
    #[inline]
    pub fn is_structural(self) -> bool {
        self.contains(Self::SPACE_ITEMS_STRUCTURE)
    }
}

bitflags::bitflags! {
    /// What a view is being resolved for.
    ///
    /// A cache resolves views for one or more applications; a view can opt out
    /// of applications through its exclude mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewApplicationMask: u32 {
        const NONE = 0;
        const DRAW = 1 << 0;
        const MOUSE = 1 << 1;
        const TOOLTIP = 1 << 2;
        const SIZE = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_combine() {
        let reason = ChangeReason::VIEW_SIZE | ChangeReason::SPACE_ITEMS_STRUCTURE;

        assert!(reason.is_structural());
        assert!(reason.contains(ChangeReason::VIEW_SIZE));
        assert!(!reason.contains(ChangeReason::VIEW_CONTENT));
        assert!(!ChangeReason::SPACE_ITEMS_CONTENT.is_structural());
    }
}
