use gpui::{Bounds, Pixels, point, px};
use gpui_component::VirtualListScrollHandle;

/// Distance from the tail within which follow mode resumes.
const FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Delta below which scroll movement is treated as floating-point jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Follow-bottom behavior for the transcript's virtual list.
///
/// New turns keep the view pinned to the tail until the user scrolls away;
/// scrolling back near the bottom resumes following.
pub struct ScrollManager {
    scroll_handle: VirtualListScrollHandle,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: Pixels,
    last_max_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: VirtualListScrollHandle::new(),
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.scroll_handle
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.follow_bottom = true;
    }

    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.follow_bottom || self.near_bottom(self.last_scroll_offset, self.last_max_offset) {
            self.pending_scroll_to_bottom = true;
        }
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = Pixels::ZERO;
        self.last_max_offset = Pixels::ZERO;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    /// Classifies the latest scroll movement and updates follow mode.
    /// Called once per frame before `apply_pending_scroll`.
    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let offset_delta = f32::from(offset) - f32::from(self.last_scroll_offset);
        let max_delta = (f32::from(max_offset) - f32::from(self.last_max_offset)).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let user_scrolled_up = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;
        let user_scrolled_down = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;

        if self.pending_scroll_to_bottom
            || (content_size_changed
                && self.near_bottom(self.last_scroll_offset, self.last_max_offset))
        {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            // Only an explicit scroll away from the tail pauses following.
            if user_scrolled_up {
                self.follow_bottom = false;
            }
        } else if user_scrolled_down && self.near_bottom(offset, max_offset) {
            self.follow_bottom = true;
        }

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            let max_offset = self.scroll_handle.max_offset().height;
            let current_x = self.scroll_handle.offset().x;
            let target_y = if max_offset > Pixels::ZERO {
                -max_offset
            } else {
                Pixels::ZERO
            };
            self.scroll_handle.set_offset(point(current_x, target_y));
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }

    pub fn bounds(&self) -> Bounds<Pixels> {
        self.scroll_handle.bounds()
    }

    fn near_bottom(&self, offset: Pixels, max_offset: Pixels) -> bool {
        if max_offset <= Pixels::ZERO {
            return true;
        }

        // Scroll offsets grow negative toward the tail, so `offset + max`
        // approaches zero at the bottom.
        (offset + max_offset).abs() <= FOLLOW_RESUME_THRESHOLD
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}
