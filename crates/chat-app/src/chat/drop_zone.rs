use gpui::{Pixels, Point};

/// Shell regions that independently report drag containment.
///
/// Overlapping regions generate the same unordered enter/leave pairs that
/// nested elements produce in a browser, which is exactly what the depth
/// counter exists to absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRegion {
    Window,
    Surface,
}

const REGION_COUNT: usize = 2;

impl DropRegion {
    const fn index(self) -> usize {
        match self {
            Self::Window => 0,
            Self::Surface => 1,
        }
    }
}

/// Reentrant bookkeeping behind the "Drop to attach" overlay.
///
/// The counter increments on region enter and decrements on region leave,
/// never going negative; the overlay is visible if and only if the depth is
/// non-zero. A drop (or a cancelled drag) resets everything at once.
#[derive(Debug, Default)]
pub struct DragState {
    inside: [bool; REGION_COUNT],
    depth: u32,
    cursor: Option<Point<Pixels>>,
    file_name: Option<String>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn overlay_visible(&self) -> bool {
        self.depth > 0
    }

    pub fn cursor(&self) -> Option<Point<Pixels>> {
        self.cursor
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Records the name shown in the floating cursor chip.
    pub fn set_file_name(&mut self, name: Option<String>) {
        self.file_name = name;
    }

    /// Feeds one containment sample for a region.
    ///
    /// Returns true when the observable overlay state changed. Repeated
    /// samples with the same containment only move the cursor.
    pub fn update_region(
        &mut self,
        region: DropRegion,
        contains: bool,
        position: Point<Pixels>,
    ) -> bool {
        let slot = &mut self.inside[region.index()];
        let mut changed = false;

        if contains && !*slot {
            *slot = true;
            self.depth += 1;
            changed = self.depth == 1;
        } else if !contains && *slot {
            *slot = false;
            self.depth = self.depth.saturating_sub(1);
            changed = self.depth == 0;
        }

        if self.depth > 0 {
            self.cursor = Some(position);
        } else {
            self.clear_pointer_state();
        }

        changed
    }

    /// Resets after a completed drop.
    pub fn finish_drop(&mut self) {
        self.reset();
    }

    /// Resets after a drag that ended without a drop (left the window).
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.inside = [false; REGION_COUNT];
        self.depth = 0;
        self.clear_pointer_state();
    }

    fn clear_pointer_state(&mut self) {
        self.cursor = None;
        self.file_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::{point, px};

    fn at(x: f32, y: f32) -> Point<Pixels> {
        point(px(x), px(y))
    }

    #[test]
    fn overlay_is_visible_iff_depth_is_nonzero() {
        let mut drag = DragState::new();
        assert!(!drag.overlay_visible());

        drag.update_region(DropRegion::Window, true, at(10., 10.));
        assert_eq!(drag.depth(), 1);
        assert!(drag.overlay_visible());

        drag.update_region(DropRegion::Window, false, at(10., 10.));
        assert_eq!(drag.depth(), 0);
        assert!(!drag.overlay_visible());
    }

    #[test]
    fn nested_region_transitions_do_not_flicker() {
        let mut drag = DragState::new();
        drag.update_region(DropRegion::Window, true, at(5., 5.));
        drag.update_region(DropRegion::Surface, true, at(6., 6.));
        assert_eq!(drag.depth(), 2);

        // Leaving the inner region while still inside the window keeps the
        // overlay up; this is the browser enter/leave pair being absorbed.
        let changed = drag.update_region(DropRegion::Surface, false, at(7., 7.));
        assert!(!changed);
        assert!(drag.overlay_visible());

        drag.update_region(DropRegion::Window, false, at(8., 8.));
        assert!(!drag.overlay_visible());
    }

    #[test]
    fn depth_never_goes_negative() {
        let mut drag = DragState::new();
        drag.update_region(DropRegion::Window, false, at(0., 0.));
        drag.update_region(DropRegion::Surface, false, at(0., 0.));
        assert_eq!(drag.depth(), 0);

        // A stale leave after a reset must also be harmless.
        drag.update_region(DropRegion::Window, true, at(0., 0.));
        drag.finish_drop();
        drag.update_region(DropRegion::Window, false, at(0., 0.));
        assert_eq!(drag.depth(), 0);
    }

    #[test]
    fn repeated_containment_samples_do_not_double_count() {
        let mut drag = DragState::new();
        drag.update_region(DropRegion::Window, true, at(1., 1.));
        drag.update_region(DropRegion::Window, true, at(2., 2.));
        drag.update_region(DropRegion::Window, true, at(3., 3.));
        assert_eq!(drag.depth(), 1);
        assert_eq!(drag.cursor(), Some(at(3., 3.)));
    }

    #[test]
    fn drop_resets_everything() {
        let mut drag = DragState::new();
        drag.update_region(DropRegion::Window, true, at(1., 1.));
        drag.update_region(DropRegion::Surface, true, at(2., 2.));
        drag.set_file_name(Some("report.pdf".to_string()));

        drag.finish_drop();
        assert_eq!(drag.depth(), 0);
        assert!(!drag.overlay_visible());
        assert!(drag.cursor().is_none());
        assert!(drag.file_name().is_none());
    }

    #[test]
    fn pointer_state_clears_when_the_drag_leaves() {
        let mut drag = DragState::new();
        drag.update_region(DropRegion::Window, true, at(1., 1.));
        drag.set_file_name(Some("photo.png".to_string()));
        assert!(drag.cursor().is_some());

        drag.update_region(DropRegion::Window, false, at(1., 1.));
        assert!(drag.cursor().is_none());
        assert!(drag.file_name().is_none());
    }
}
