use crate::dashboard::widget_id::WidgetId;

/// Drag gesture over widget cards.
///
/// ```text
/// Idle -> Dragging -> HoveringTarget -> Idle (drop on other card: commit)
///    any state -> Idle (drag end without drop, drop on self: abort)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        dragged: WidgetId,
    },
    HoveringTarget {
        dragged: WidgetId,
        over: WidgetId,
    },
}

/// A committed drop, to be applied with `LayoutStore::reorder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub from: WidgetId,
    pub to: WidgetId,
}

#[derive(Debug, Default)]
pub struct DragReorderController {
    state: DragState,
    reorder_mode: bool,
}

impl DragReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn reorder_mode(&self) -> bool {
        self.reorder_mode
    }

    /// Leaving reorder mode drops any gesture in flight.
    pub fn set_reorder_mode(&mut self, enabled: bool) {
        if !enabled && self.state != DragState::Idle {
            tracing::debug!("reorder mode disabled mid-drag; drag aborted");
            self.state = DragState::Idle;
        }
        self.reorder_mode = enabled;
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn dragged(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { dragged } | DragState::HoveringTarget { dragged, .. } => {
                Some(dragged)
            }
        }
    }

    pub fn hovered(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::HoveringTarget { over, .. } => Some(over),
            _ => None,
        }
    }

    /// Begin dragging `id`. Refused outside reorder mode or while another
    /// drag is active.
    pub fn drag_start(&mut self, id: &WidgetId) -> bool {
        if !self.reorder_mode || self.state != DragState::Idle {
            return false;
        }
        tracing::debug!(widget = %id, "drag started");
        self.state = DragState::Dragging {
            dragged: id.clone(),
        };
        true
    }

    pub fn drag_enter(&mut self, id: &WidgetId) {
        let Some(dragged) = self.dragged().cloned() else {
            return;
        };
        self.state = if &dragged == id {
            DragState::Dragging { dragged }
        } else {
            DragState::HoveringTarget {
                dragged,
                over: id.clone(),
            }
        };
    }

    /// Release over card `id`. Returns the reorder to apply, or `None` when
    /// the drop is on the dragged card itself or no drag is active.
    pub fn drop_on(&mut self, id: &WidgetId) -> Option<ReorderRequest> {
        let state = std::mem::take(&mut self.state);
        let dragged = match state {
            DragState::Idle => return None,
            DragState::Dragging { dragged } | DragState::HoveringTarget { dragged, .. } => dragged,
        };
        if &dragged == id {
            tracing::debug!(widget = %id, "dropped on itself; drag aborted");
            return None;
        }
        Some(ReorderRequest {
            from: dragged,
            to: id.clone(),
        })
    }

    /// Gesture ended without a drop target.
    pub fn drag_end(&mut self) {
        if self.state != DragState::Idle {
            tracing::debug!("drag ended without drop");
        }
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> WidgetId {
        WidgetId::from(s)
    }

    fn active() -> DragReorderController {
        let mut c = DragReorderController::new();
        c.set_reorder_mode(true);
        c
    }

    #[test]
    fn drag_requires_reorder_mode() {
        let mut c = DragReorderController::new();
        assert!(!c.drag_start(&id("leads")));
        assert_eq!(c.state(), &DragState::Idle);
    }

    #[test]
    fn full_gesture_commits_reorder() {
        let mut c = active();
        assert!(c.drag_start(&id("funnel")));
        c.drag_enter(&id("tasks"));
        assert_eq!(c.hovered(), Some(&id("tasks")));
        let req = c.drop_on(&id("tasks")).unwrap();
        assert_eq!(
            req,
            ReorderRequest {
                from: id("funnel"),
                to: id("tasks")
            }
        );
        assert_eq!(c.state(), &DragState::Idle);
    }

    #[test]
    fn drop_on_self_aborts() {
        let mut c = active();
        c.drag_start(&id("funnel"));
        c.drag_enter(&id("leads"));
        c.drag_enter(&id("funnel"));
        assert_eq!(
            c.state(),
            &DragState::Dragging {
                dragged: id("funnel")
            }
        );
        assert_eq!(c.drop_on(&id("funnel")), None);
        assert!(!c.is_dragging());
    }

    #[test]
    fn second_drag_is_refused_while_one_is_active() {
        let mut c = active();
        assert!(c.drag_start(&id("funnel")));
        assert!(!c.drag_start(&id("leads")));
        assert_eq!(c.dragged(), Some(&id("funnel")));
    }

    #[test]
    fn drag_end_and_mode_toggle_abort() {
        let mut c = active();
        c.drag_start(&id("funnel"));
        c.drag_end();
        assert_eq!(c.state(), &DragState::Idle);

        c.drag_start(&id("funnel"));
        c.drag_enter(&id("leads"));
        c.set_reorder_mode(false);
        assert_eq!(c.state(), &DragState::Idle);
        assert_eq!(c.drop_on(&id("leads")), None);
    }
}
