/// Height bounds differ between the list panel and the detail bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelClass {
    List,
    Detail,
}

impl PanelClass {
    pub fn bounds(self) -> (u32, u32) {
        match self {
            PanelClass::List => (400, 800),
            PanelClass::Detail => (150, 400),
        }
    }

    pub fn default_height(self) -> u32 {
        match self {
            PanelClass::List => 500,
            PanelClass::Detail => 200,
        }
    }

    pub fn clamp(self, height: f32) -> u32 {
        let (min, max) = self.bounds();
        height.round().clamp(min as f32, max as f32) as u32
    }
}

/// Which edge the grip sits on. A bottom-anchored panel grows when its top
/// edge is dragged upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    Top,
    Bottom,
}

/// The four resizable panels of the two list widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKey {
    LeadsList,
    LeadsDetail,
    DealsList,
    DealsDetail,
}

impl PanelKey {
    pub fn class(self) -> PanelClass {
        match self {
            PanelKey::LeadsList | PanelKey::DealsList => PanelClass::List,
            PanelKey::LeadsDetail | PanelKey::DealsDetail => PanelClass::Detail,
        }
    }

    pub fn anchor(self) -> ResizeAnchor {
        match self.class() {
            PanelClass::List => ResizeAnchor::Top,
            PanelClass::Detail => ResizeAnchor::Bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeState {
    Idle,
    Resizing { start_y: f32, start_height: u32 },
}

/// Turns a vertical pointer drag on a grip into a bounded panel height.
/// Heights live only in memory and start at the class default.
#[derive(Debug, Clone)]
pub struct ResizeController {
    panel: PanelKey,
    height: u32,
    state: ResizeState,
}

impl ResizeController {
    pub fn new(panel: PanelKey) -> Self {
        Self {
            panel,
            height: panel.class().default_height(),
            state: ResizeState::Idle,
        }
    }

    pub fn panel(&self) -> PanelKey {
        self.panel
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn state(&self) -> ResizeState {
        self.state
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    /// Grip pressed at vertical position `y`. Ignored while already resizing.
    pub fn pointer_down(&mut self, y: f32) -> bool {
        if self.is_resizing() {
            return false;
        }
        tracing::debug!(panel = ?self.panel, y, height = self.height, "resize started");
        self.state = ResizeState::Resizing {
            start_y: y,
            start_height: self.height,
        };
        true
    }

    /// Pointer moved to `y`. Returns the new height while resizing.
    pub fn pointer_move(&mut self, y: f32) -> Option<u32> {
        let ResizeState::Resizing {
            start_y,
            start_height,
        } = self.state
        else {
            return None;
        };
        let delta = match self.panel.anchor() {
            ResizeAnchor::Top => y - start_y,
            ResizeAnchor::Bottom => start_y - y,
        };
        self.height = self.panel.class().clamp(start_height as f32 + delta);
        Some(self.height)
    }

    pub fn pointer_up(&mut self) {
        if self.is_resizing() {
            tracing::debug!(panel = ?self.panel, height = self.height, "resize finished");
        }
        self.state = ResizeState::Idle;
    }

    /// Abandon the gesture and restore the height it started from.
    pub fn cancel(&mut self) {
        if let ResizeState::Resizing { start_height, .. } = self.state {
            self.height = start_height;
        }
        self.state = ResizeState::Idle;
    }
}
