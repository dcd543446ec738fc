/*
 * Turns the two gesture modalities of the gallery (pointer drag-and-drop and
 * touch drag) into a single logical operation: move one arrangement item to the
 * position just before another.
 *
 * Both trackers here are pure state machines over gesture events. They never
 * touch `SessionState` themselves; a finished gesture yields a `MoveRequest`
 * which the app logic resolves with `move_before` and commits through
 * `SessionState::reorder`. A gesture that ends without a valid, different
 * target yields `Cancelled` and changes nothing.
 */

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    // Half-open on the right/bottom edge so adjacent cards never both claim a point.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn centered_on(center: Point, width: f32, height: f32) -> Self {
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

/// Screen bounds of one gallery card and of its delete control.
#[derive(Debug, Clone, PartialEq)]
pub struct CardBounds {
    pub work_id: String,
    pub card: Rect,
    pub delete_control: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Card(String),
    DeleteControl(String),
    Proxy,
}

impl HitTarget {
    // The arrangement item a hit belongs to, the way a hit inside a card's
    // children resolves to the enclosing card.
    pub fn card_id(&self) -> Option<&str> {
        match self {
            HitTarget::Card(id) | HitTarget::DeleteControl(id) => Some(id),
            HitTarget::Proxy => None,
        }
    }
}

/// The floating copy of a card that follows a touch drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragProxy {
    pub bounds: Rect,
    pub visible: bool,
}

// Last layout reported by the platform for the gallery grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryLayout {
    cards: Vec<CardBounds>,
}

impl GalleryLayout {
    pub fn new(cards: Vec<CardBounds>) -> Self {
        GalleryLayout { cards }
    }

    pub fn bounds_of(&self, work_id: &str) -> Option<Rect> {
        self.cards
            .iter()
            .find(|c| c.work_id == work_id)
            .map(|c| c.card)
    }

    /*
     * Topmost element at `point`. A visible proxy sits above every card, so it
     * must be hidden by the caller before asking what lies underneath it.
     */
    pub fn hit_test(&self, point: Point, proxy: Option<&DragProxy>) -> Option<HitTarget> {
        if let Some(proxy) = proxy {
            if proxy.visible && proxy.bounds.contains(point) {
                return Some(HitTarget::Proxy);
            }
        }
        // Later cards paint over earlier ones.
        self.cards.iter().rev().find_map(|c| {
            if c.delete_control.is_some_and(|r| r.contains(point)) {
                Some(HitTarget::DeleteControl(c.work_id.clone()))
            } else if c.card.contains(point) {
                Some(HitTarget::Card(c.work_id.clone()))
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub source_id: String,
    pub target_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    Commit(MoveRequest),
    Cancelled,
    // Event did not belong to a gesture in progress.
    Ignored,
}

/*
 * Computes the order after moving `source_id` to the position immediately
 * before `target_id`. The target's index is taken after the source has been
 * removed. Returns `None` only when there is no move: same ids, or an id not
 * in the order. A drop onto the card right after the source still counts as a
 * move even though the resulting order equals the current one.
 */
pub fn move_before(order: &[String], source_id: &str, target_id: &str) -> Option<Vec<String>> {
    if source_id == target_id {
        return None;
    }
    let from = order.iter().position(|id| id == source_id)?;
    let mut next = order.to_vec();
    let moved = next.remove(from);
    let to = next.iter().position(|id| id == target_id)?;
    next.insert(to, moved);
    Some(next)
}

// --- Pointer drag-and-drop ---

/// Visual feedback the platform should apply while a pointer drag is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerFeedback {
    Highlight(String),
    ClearHighlight(String),
}

#[derive(Debug, Default)]
pub struct PointerDragTracker {
    source_id: Option<String>,
    highlighted: Option<String>,
}

impl PointerDragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn start(&mut self, source_id: &str) {
        log::trace!("PointerDragTracker: drag started on '{source_id}'");
        self.source_id = Some(source_id.to_string());
        self.highlighted = None;
    }

    // Pure feedback; the arrangement is not touched until the drop.
    pub fn enter(&mut self, work_id: &str) -> Vec<PointerFeedback> {
        if self.source_id.is_none() {
            return Vec::new();
        }
        let mut feedback = Vec::new();
        if let Some(previous) = self.highlighted.take() {
            if previous != work_id {
                feedback.push(PointerFeedback::ClearHighlight(previous));
            }
        }
        self.highlighted = Some(work_id.to_string());
        feedback.push(PointerFeedback::Highlight(work_id.to_string()));
        feedback
    }

    pub fn leave(&mut self, work_id: &str) -> Vec<PointerFeedback> {
        if self.highlighted.as_deref() == Some(work_id) {
            self.highlighted = None;
        }
        if self.source_id.is_none() {
            return Vec::new();
        }
        vec![PointerFeedback::ClearHighlight(work_id.to_string())]
    }

    pub fn drop_on(&mut self, target_id: &str) -> GestureOutcome {
        self.highlighted = None;
        match self.source_id.take() {
            Some(source_id) if source_id != target_id => GestureOutcome::Commit(MoveRequest {
                source_id,
                target_id: target_id.to_string(),
            }),
            Some(_) => GestureOutcome::Cancelled,
            None => GestureOutcome::Ignored,
        }
    }

    /// End of the drag. If no drop happened first, the gesture is cancelled.
    pub fn end(&mut self) -> GestureOutcome {
        self.highlighted = None;
        match self.source_id.take() {
            Some(source_id) => {
                log::trace!("PointerDragTracker: drag of '{source_id}' ended without a drop");
                GestureOutcome::Cancelled
            }
            None => GestureOutcome::Ignored,
        }
    }
}

// --- Touch drag ---

#[derive(Debug, Clone, PartialEq)]
pub enum TouchUpdate {
    // Finger moved but not far enough to count as a drag yet.
    Pending,
    ProxyCreated { source_id: String, bounds: Rect },
    ProxyMoved { bounds: Rect },
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TouchRelease {
    // Released before a drag was confirmed; the touch was a tap.
    Tap,
    Dragged {
        source_id: String,
        outcome: GestureOutcome,
    },
    Ignored,
}

#[derive(Debug)]
struct TouchSession {
    source_id: String,
    origin: Point,
    card_size: (f32, f32),
    proxy: Option<DragProxy>,
}

#[derive(Debug)]
pub struct TouchDragTracker {
    threshold: f32,
    session: Option<TouchSession>,
}

impl TouchDragTracker {
    pub fn new(threshold: f32) -> Self {
        TouchDragTracker {
            threshold: threshold.max(0.0),
            session: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.proxy.is_some())
    }

    #[cfg(test)]
    pub fn proxy(&self) -> Option<&DragProxy> {
        self.session.as_ref().and_then(|s| s.proxy.as_ref())
    }

    /*
     * Captures the source and the starting point only. Nothing is committed to
     * being a drag yet, so a tap aimed at the card's delete control still
     * reaches that control.
     */
    pub fn start(&mut self, source_id: &str, point: Point, card_bounds: Option<Rect>) {
        let card_size = card_bounds.map_or((0.0, 0.0), |r| (r.width, r.height));
        self.session = Some(TouchSession {
            source_id: source_id.to_string(),
            origin: point,
            card_size,
            proxy: None,
        });
    }

    pub fn move_to(&mut self, point: Point) -> TouchUpdate {
        let threshold = self.threshold;
        let Some(session) = self.session.as_mut() else {
            return TouchUpdate::Ignored;
        };
        let (width, height) = session.card_size;
        let bounds = Rect::centered_on(point, width, height);
        match session.proxy.as_mut() {
            Some(proxy) => {
                proxy.bounds = bounds;
                TouchUpdate::ProxyMoved { bounds }
            }
            None if session.origin.distance_to(point) >= threshold => {
                log::trace!(
                    "TouchDragTracker: drag of '{}' confirmed",
                    session.source_id
                );
                session.proxy = Some(DragProxy {
                    bounds,
                    visible: true,
                });
                TouchUpdate::ProxyCreated {
                    source_id: session.source_id.clone(),
                    bounds,
                }
            }
            None => TouchUpdate::Pending,
        }
    }

    /*
     * Ends the touch. For a confirmed drag the proxy is hidden while hit-testing
     * the release point, so the card under the finger is found rather than the
     * proxy itself. A hit on another card (or inside it) commits; anything else
     * cancels.
     */
    pub fn release(&mut self, point: Point, layout: &GalleryLayout) -> TouchRelease {
        let Some(session) = self.session.take() else {
            return TouchRelease::Ignored;
        };
        let Some(mut proxy) = session.proxy else {
            return TouchRelease::Tap;
        };

        proxy.visible = false;
        let hit = layout.hit_test(point, Some(&proxy));

        let outcome = match hit.as_ref().and_then(HitTarget::card_id) {
            Some(target_id) if target_id != session.source_id => {
                GestureOutcome::Commit(MoveRequest {
                    source_id: session.source_id.clone(),
                    target_id: target_id.to_string(),
                })
            }
            _ => GestureOutcome::Cancelled,
        };
        TouchRelease::Dragged {
            source_id: session.source_id,
            outcome,
        }
    }

    pub fn cancel(&mut self) -> Option<String> {
        self.session.take().map(|s| s.source_id)
    }
}
