use crate::app_logic::ui_constants;
use crate::core::{
    Catalog, CatalogLoaderOperations, GalleryLayout, GestureOutcome, MoveRequest, NavTrigger,
    NavigationError, PersistenceManager, Phase, PointerDragTracker, PointerFeedback,
    RestoreOutcome, SessionState, SessionStoreOperations, TouchDragTracker, TouchRelease,
    TouchUpdate, navigation, reorder_engine,
};
use crate::platform_layer::{AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler};
use crate::ui_description_layer;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

// Made pub(crate) for access from handler_tests.rs
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PendingAction {
    Exporting,
}

/*
 * Drives one installation session in a platform-agnostic manner. It receives
 * `AppEvent`s from the platform, routes navigation triggers through the state
 * machine, decision and arrangement edits through `SessionState`, and gestures
 * through the reorder engine. After every committed change it saves a snapshot
 * (fail-open) and queues a `RenderScreen` command describing the new screen.
 * Collaborators that touch the outside world (`CatalogLoaderOperations`,
 * `SessionStoreOperations`) are injected so tests can replace them.
 */
pub struct InstallationLogic {
    pub(crate) catalog: Catalog,
    pub(crate) state: SessionState,
    pub(crate) persistence: PersistenceManager,
    pub(crate) catalog_loader: Arc<dyn CatalogLoaderOperations>,
    pub(crate) gallery_layout: GalleryLayout,
    pub(crate) pointer_drag: PointerDragTracker,
    pub(crate) touch_drag: TouchDragTracker,
    pub(crate) pending_action: Option<PendingAction>,
    command_queue: VecDeque<PlatformCommand>,
}

impl InstallationLogic {
    pub fn new(
        catalog_loader: Arc<dyn CatalogLoaderOperations>,
        session_store: Arc<dyn SessionStoreOperations>,
        touch_drag_threshold: f32,
    ) -> Self {
        InstallationLogic {
            catalog: Catalog::default(),
            state: SessionState::new(),
            persistence: PersistenceManager::new(session_store),
            catalog_loader,
            gallery_layout: GalleryLayout::default(),
            pointer_drag: PointerDragTracker::new(),
            touch_drag: TouchDragTracker::new(touch_drag_threshold),
            pending_action: None,
            command_queue: VecDeque::new(),
        }
    }

    fn enqueue(&mut self, command: PlatformCommand) {
        self.command_queue.push_back(command);
    }

    fn show_message(&mut self, severity: MessageSeverity, text: &str) {
        self.enqueue(PlatformCommand::ShowMessage {
            severity,
            text: text.to_string(),
        });
    }

    fn render(&mut self) {
        let view = ui_description_layer::describe_screen(&self.state, &self.catalog);
        self.enqueue(PlatformCommand::RenderScreen { view });
    }

    fn persist(&self) {
        self.persistence.save(&self.state.to_snapshot());
    }

    fn persist_and_render(&mut self) {
        self.persist();
        self.render();
    }

    /*
     * Loads the catalog, then tries to resume the previous visitor's session.
     * A failed load leaves the installation on the Orientation placeholder with
     * navigation disabled; the stored snapshot is left alone so a later start
     * with working content can still resume it.
     */
    fn start_session(&mut self) {
        match self.catalog_loader.load_catalog() {
            Ok(catalog) if !catalog.is_empty() => {
                log::info!("AppLogic: Loaded catalog with {} works.", catalog.len());
                self.catalog = catalog;
            }
            Ok(_) => {
                log::error!("AppLogic: Catalog contains no works.");
                self.content_unavailable();
                return;
            }
            Err(e) => {
                log::error!("AppLogic: Failed to load catalog: {e}");
                self.content_unavailable();
                return;
            }
        }

        match self.persistence.load() {
            Some(snapshot) => {
                match navigation::restore(&mut self.state, &self.catalog, snapshot) {
                    RestoreOutcome::Resumed(phase) => {
                        log::info!("AppLogic: Resumed previous session in {phase:?}.");
                        self.persist();
                    }
                    RestoreOutcome::StartedFresh => {
                        log::info!("AppLogic: Stored session not resumable, starting fresh.");
                    }
                }
            }
            None => log::debug!("AppLogic: No stored session, starting fresh."),
        }
        self.render();
    }

    fn content_unavailable(&mut self) {
        self.catalog = Catalog::default();
        self.show_message(
            MessageSeverity::Error,
            ui_constants::CONTENT_UNAVAILABLE_MESSAGE,
        );
        self.render();
    }

    /*
     * Applies one navigation trigger. Illegal triggers (a stray double click,
     * Begin without content) are logged and dropped without touching state.
     */
    fn commit_transition(&mut self, trigger: NavTrigger) {
        let phase_before = self.state.phase();
        match navigation::apply(&mut self.state, &self.catalog, trigger) {
            Ok(phase) => {
                if phase_before == Phase::Arrangement && phase != Phase::Arrangement {
                    self.reset_gestures();
                }
                self.persist_and_render();
            }
            Err(NavigationError::CatalogUnavailable) => {
                log::warn!("AppLogic: Ignoring {trigger:?}, no content loaded.");
            }
            Err(e) => log::debug!("AppLogic: Ignoring trigger: {e}"),
        }
    }

    // Full reset: the stored session is dropped before the fresh one is saved.
    fn restart(&mut self, trigger: NavTrigger) {
        let phase_before = self.state.phase();
        match navigation::apply(&mut self.state, &self.catalog, trigger) {
            Ok(_) => {
                log::info!("AppLogic: Session restarted from {phase_before:?}.");
                self.pending_action = None;
                self.reset_gestures();
                self.persistence.clear();
                self.persist_and_render();
            }
            Err(e) => log::debug!("AppLogic: Ignoring restart: {e}"),
        }
    }

    fn reset_gestures(&mut self) {
        self.pointer_drag.end();
        self.touch_drag.cancel();
        self.gallery_layout = GalleryLayout::default();
    }

    fn toggle_include(&mut self) {
        if self.state.phase() != Phase::Artwork {
            log::debug!(
                "AppLogic: Include toggle ignored in {:?}.",
                self.state.phase()
            );
            return;
        }
        let Some(work_id) = self
            .catalog
            .work_at(self.state.current_index())
            .map(|w| w.id.clone())
        else {
            log::warn!("AppLogic: Include toggle with no current work.");
            return;
        };
        let included = !self.state.is_included(&work_id);
        self.state.set_decision(&work_id, included);
        log::debug!("AppLogic: '{work_id}' included = {included}");
        self.persist_and_render();
    }

    fn remove_from_gallery(&mut self, work_id: &str) {
        if self.state.phase() != Phase::Arrangement {
            log::debug!("AppLogic: Remove of '{work_id}' ignored outside the gallery.");
            return;
        }
        if self.state.remove_from_arrangement(work_id) {
            self.persist_and_render();
        } else {
            log::debug!("AppLogic: '{work_id}' is not in the arrangement.");
        }
    }

    fn request_export(&mut self) {
        if self.state.phase() != Phase::Arrangement {
            log::debug!("AppLogic: Export ignored in {:?}.", self.state.phase());
            return;
        }
        if self.pending_action.is_some() {
            log::debug!("AppLogic: Export already in progress.");
            return;
        }
        let works = ui_description_layer::gallery_cards(&self.state, &self.catalog);
        if works.is_empty() {
            log::info!("AppLogic: Nothing to export, arrangement is empty.");
            return;
        }
        self.pending_action = Some(PendingAction::Exporting);
        self.enqueue(PlatformCommand::RasterizeGallery {
            file_stem: ui_constants::EXPORT_FILE_STEM.to_string(),
            works,
        });
    }

    fn export_completed(&mut self, result: Result<PathBuf, String>) {
        match self.pending_action.take() {
            Some(PendingAction::Exporting) => match result {
                Ok(path) => {
                    log::info!("AppLogic: Exported installation to {path:?}.");
                    self.commit_transition(NavTrigger::ExportSucceeded);
                }
                Err(e) => {
                    log::error!("AppLogic: Export failed: {e}");
                    self.show_message(MessageSeverity::Error, ui_constants::EXPORT_FAILED_MESSAGE);
                }
            },
            None => {
                log::warn!("AppLogic: ExportCompleted received but no export was pending.");
            }
        }
    }

    /*
     * Single commit path for both gesture families. Every committed move is
     * written once and re-rendered, including a drop onto the card right after
     * the source, which leaves the order as it was.
     */
    fn apply_gesture_outcome(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Commit(MoveRequest {
                source_id,
                target_id,
            }) => {
                let Some(new_order) = reorder_engine::move_before(
                    self.state.arrangement_order(),
                    &source_id,
                    &target_id,
                ) else {
                    log::debug!(
                        "AppLogic: Move of '{source_id}' before '{target_id}' has no target in the arrangement."
                    );
                    return;
                };
                match self.state.reorder(new_order) {
                    Ok(()) => {
                        log::debug!("AppLogic: Moved '{source_id}' before '{target_id}'.");
                        self.persist_and_render();
                    }
                    Err(e) => log::warn!("AppLogic: Rejected reorder: {e}"),
                }
            }
            GestureOutcome::Cancelled => log::trace!("AppLogic: Gesture cancelled."),
            GestureOutcome::Ignored => {}
        }
    }

    fn apply_pointer_feedback(&mut self, feedback: Vec<PointerFeedback>) {
        for item in feedback {
            let (work_id, highlighted) = match item {
                PointerFeedback::Highlight(id) => (id, true),
                PointerFeedback::ClearHighlight(id) => (id, false),
            };
            self.enqueue(PlatformCommand::SetDropHighlight {
                work_id,
                highlighted,
            });
        }
    }

    // Clears the dragging mark and any live highlight before the tracker forgets them.
    fn clear_pointer_visuals(&mut self) {
        if let Some(highlighted) = self.pointer_drag.highlighted().map(str::to_string) {
            self.enqueue(PlatformCommand::SetDropHighlight {
                work_id: highlighted,
                highlighted: false,
            });
        }
        if let Some(source_id) = self.pointer_drag.source_id().map(str::to_string) {
            self.enqueue(PlatformCommand::SetItemDragging {
                work_id: source_id,
                dragging: false,
            });
        }
    }

    // A new touch replaces any live drag; its proxy and dragging mark go with it.
    fn abandon_touch_drag(&mut self) {
        let was_dragging = self.touch_drag.is_dragging();
        if let Some(source_id) = self.touch_drag.cancel() {
            if was_dragging {
                log::debug!("AppLogic: Touch drag of '{source_id}' abandoned by a new touch.");
                self.enqueue(PlatformCommand::RemoveDragProxy);
                self.enqueue(PlatformCommand::SetItemDragging {
                    work_id: source_id,
                    dragging: false,
                });
            }
        }
    }

    fn handle_gesture(&mut self, event: AppEvent) {
        if self.state.phase() != Phase::Arrangement {
            log::trace!(
                "AppLogic: Gesture ignored in {:?}: {event:?}",
                self.state.phase()
            );
            return;
        }
        match event {
            AppEvent::GalleryLayoutUpdated { cards } => {
                self.gallery_layout = GalleryLayout::new(cards);
            }
            AppEvent::PointerDragStarted { work_id } => {
                self.pointer_drag.start(&work_id);
                self.enqueue(PlatformCommand::SetItemDragging {
                    work_id,
                    dragging: true,
                });
            }
            AppEvent::PointerDragEntered { work_id } => {
                let feedback = self.pointer_drag.enter(&work_id);
                self.apply_pointer_feedback(feedback);
            }
            AppEvent::PointerDragLeft { work_id } => {
                let feedback = self.pointer_drag.leave(&work_id);
                self.apply_pointer_feedback(feedback);
            }
            AppEvent::PointerDropped { target_work_id } => {
                self.clear_pointer_visuals();
                let outcome = self.pointer_drag.drop_on(&target_work_id);
                self.apply_gesture_outcome(outcome);
            }
            AppEvent::PointerDragEnded => {
                self.clear_pointer_visuals();
                let outcome = self.pointer_drag.end();
                self.apply_gesture_outcome(outcome);
            }
            AppEvent::TouchStarted { work_id, point } => {
                self.abandon_touch_drag();
                let card_bounds = self.gallery_layout.bounds_of(&work_id);
                self.touch_drag.start(&work_id, point, card_bounds);
            }
            AppEvent::TouchMoved { point } => match self.touch_drag.move_to(point) {
                TouchUpdate::ProxyCreated { source_id, bounds } => {
                    self.enqueue(PlatformCommand::ShowDragProxy {
                        work_id: source_id.clone(),
                        bounds,
                    });
                    self.enqueue(PlatformCommand::SetItemDragging {
                        work_id: source_id,
                        dragging: true,
                    });
                }
                TouchUpdate::ProxyMoved { bounds } => {
                    self.enqueue(PlatformCommand::MoveDragProxy { bounds });
                }
                TouchUpdate::Pending | TouchUpdate::Ignored => {}
            },
            AppEvent::TouchEnded { point } => {
                match self.touch_drag.release(point, &self.gallery_layout) {
                    TouchRelease::Dragged { source_id, outcome } => {
                        self.enqueue(PlatformCommand::RemoveDragProxy);
                        self.enqueue(PlatformCommand::SetItemDragging {
                            work_id: source_id,
                            dragging: false,
                        });
                        self.apply_gesture_outcome(outcome);
                    }
                    // The platform delivers the tap to whatever control was under it.
                    TouchRelease::Tap | TouchRelease::Ignored => {}
                }
            }
            other => log::warn!("AppLogic: Not a gesture event: {other:?}"),
        }
    }
}

impl PlatformEventHandler for InstallationLogic {
    fn on_startup(&mut self) {
        log::debug!("AppLogic: on_startup called.");
        self.start_session();
    }

    fn handle_event(&mut self, event: AppEvent) {
        log::trace!("AppLogic: handle_event {event:?}");
        match event {
            AppEvent::BeginClicked => self.commit_transition(NavTrigger::Begin),
            AppEvent::BackClicked => self.commit_transition(NavTrigger::Back),
            AppEvent::NextClicked => self.commit_transition(NavTrigger::Next),
            AppEvent::IncludeToggled => self.toggle_include(),
            AppEvent::RemoveFromGalleryClicked { work_id } => self.remove_from_gallery(&work_id),
            AppEvent::ExportClicked => self.request_export(),
            AppEvent::ExportCompleted { result } => self.export_completed(result),
            AppEvent::StartOverClicked => self.restart(NavTrigger::Restart),
            AppEvent::NewViewerClicked => self.restart(NavTrigger::NewSession),
            AppEvent::BackToGalleryClicked => self.commit_transition(NavTrigger::BackToGallery),
            gesture @ (AppEvent::GalleryLayoutUpdated { .. }
            | AppEvent::PointerDragStarted { .. }
            | AppEvent::PointerDragEntered { .. }
            | AppEvent::PointerDragLeft { .. }
            | AppEvent::PointerDropped { .. }
            | AppEvent::PointerDragEnded
            | AppEvent::TouchStarted { .. }
            | AppEvent::TouchMoved { .. }
            | AppEvent::TouchEnded { .. }) => self.handle_gesture(gesture),
        }
    }

    fn on_quit(&mut self) {
        log::info!(
            "AppLogic: on_quit called by platform, session left in {:?}.",
            self.state.phase()
        );
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.command_queue.pop_front()
    }
}
