/*
 * This module defines the data exchanged between the application logic and the
 * platform layer: platform-agnostic events coming in (`AppEvent`), commands
 * going out (`PlatformCommand`), the read-only screen descriptions the render
 * side paints from (`ScreenView`), message severities, and the
 * `PlatformEventHandler` trait the application logic implements.
 */

use crate::core::{CardBounds, Point, Rect};
use std::path::PathBuf;

// --- Read-only render snapshots ---

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationView {
    pub title: String,
    pub statement: String,
    // False when the content failed to load; the begin control should be inert.
    pub content_available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramingView {
    pub section_header: String,
    pub counter: String,
    pub framing_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkView {
    pub image_ref: String,
    pub alt_text: String,
    pub context_text: String,
    pub included: bool,
    pub next_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryCardView {
    pub work_id: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrangementView {
    pub cards: Vec<GalleryCardView>,
    // Shown instead of the grid when no work was kept.
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView {
    Orientation(OrientationView),
    Framing(FramingView),
    Artwork(ArtworkView),
    Arrangement(ArrangementView),
    Export,
}

// --- Events from Platform to App Logic ---

/*
 * Represents platform-agnostic UI events. The platform translates native
 * clicks, drag-and-drop callbacks and touch callbacks into these and hands them
 * to the application logic one at a time.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    BeginClicked,
    BackClicked,
    NextClicked,
    IncludeToggled,
    RemoveFromGalleryClicked {
        work_id: String,
    },
    ExportClicked,
    // Result of a `RasterizeGallery` command: where the artifact went, or why it failed.
    ExportCompleted {
        result: Result<PathBuf, String>,
    },
    StartOverClicked,
    BackToGalleryClicked,
    NewViewerClicked,
    // Sent by the platform whenever the gallery grid has been laid out.
    GalleryLayoutUpdated {
        cards: Vec<CardBounds>,
    },
    PointerDragStarted {
        work_id: String,
    },
    PointerDragEntered {
        work_id: String,
    },
    PointerDragLeft {
        work_id: String,
    },
    PointerDropped {
        target_work_id: String,
    },
    PointerDragEnded,
    TouchStarted {
        work_id: String,
        point: Point,
    },
    TouchMoved {
        point: Point,
    },
    TouchEnded {
        point: Point,
    },
}

// Only failures are surfaced to the visitor; everything else goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Error,
}

// --- Commands from App Logic to Platform ---

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    RenderScreen {
        view: ScreenView,
    },
    /// Asks the export collaborator to rasterize the given works, in order, into
    /// a downloadable artifact. The platform answers with `AppEvent::ExportCompleted`.
    RasterizeGallery {
        file_stem: String,
        works: Vec<GalleryCardView>,
    },
    ShowMessage {
        severity: MessageSeverity,
        text: String,
    },
    SetDropHighlight {
        work_id: String,
        highlighted: bool,
    },
    SetItemDragging {
        work_id: String,
        dragging: bool,
    },
    ShowDragProxy {
        work_id: String,
        bounds: Rect,
    },
    MoveDragProxy {
        bounds: Rect,
    },
    RemoveDragProxy,
}

// --- Trait for App Logic to Handle Events ---

/*
 * Implemented by the application logic. The platform calls `on_startup` once,
 * then `handle_event` for every event, draining `try_dequeue_command` after
 * each call. Handlers run to completion; they never call back into the
 * platform's dispatch loop.
 */
pub trait PlatformEventHandler: Send + Sync + 'static {
    fn on_startup(&mut self);

    fn handle_event(&mut self, event: AppEvent);

    fn on_quit(&mut self) {}

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
