/*
 * The navigation state machine. It is the only code that writes
 * `SessionState::phase` and `SessionState::current_index`.
 *
 *   Orientation --begin--> Framing(0)
 *   Framing(i)  --back-->  Orientation (i = 0) | Artwork(i-1)
 *   Framing(i)  --next-->  Artwork(i)
 *   Artwork(i)  --back-->  Framing(i)
 *   Artwork(i)  --next-->  Framing(i+1) | Arrangement (i = last, arrangement rebuilt)
 *   Arrangement --export succeeded--> Export
 *   Arrangement --restart--> Orientation (full reset)
 *   Export      --back to gallery--> Arrangement (arrangement kept)
 *   Export      --new session--> Orientation (full reset)
 *
 * Restoring a snapshot replays the same entry functions, so a restored session
 * goes through exactly the checks a live one does.
 */
use super::models::Catalog;
use super::persistence::SessionSnapshot;
use super::session_state::{Phase, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTrigger {
    Begin,
    Back,
    Next,
    ExportSucceeded,
    Restart,
    BackToGallery,
    NewSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    IllegalTransition { phase: Phase, trigger: NavTrigger },
    // No artworks loaded; only Orientation is reachable.
    CatalogUnavailable,
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::IllegalTransition { phase, trigger } => {
                write!(f, "Trigger {trigger:?} is not allowed in phase {phase:?}")
            }
            NavigationError::CatalogUnavailable => {
                write!(f, "No content loaded; the session cannot leave Orientation")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

pub type Result<T> = std::result::Result<T, NavigationError>;

/// Whether a restore actually moved the session out of Orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Resumed(Phase),
    StartedFresh,
}

/*
 * Applies one trigger. On error the state is untouched. On success the new
 * phase is returned; the caller is expected to persist and re-render.
 */
pub fn apply(state: &mut SessionState, catalog: &Catalog, trigger: NavTrigger) -> Result<Phase> {
    let phase_before = state.phase;
    let Some(last) = catalog.last_index() else {
        // Without content the visitor can only sit on Orientation.
        return match trigger {
            NavTrigger::Restart | NavTrigger::NewSession
                if matches!(state.phase, Phase::Arrangement | Phase::Export) =>
            {
                reset(state);
                Ok(Phase::Orientation)
            }
            _ => Err(NavigationError::CatalogUnavailable),
        };
    };

    let index = state.current_index;
    let entered = match (phase_before, trigger) {
        (Phase::Orientation, NavTrigger::Begin) => enter_framing(state, 0),
        (Phase::Framing, NavTrigger::Back) if index == 0 => enter_orientation(state),
        (Phase::Framing, NavTrigger::Back) => enter_artwork(state, index - 1),
        (Phase::Framing, NavTrigger::Next) => enter_artwork(state, index),
        (Phase::Artwork, NavTrigger::Back) => enter_framing(state, index),
        (Phase::Artwork, NavTrigger::Next) if index < last => enter_framing(state, index + 1),
        (Phase::Artwork, NavTrigger::Next) => {
            state.materialize_arrangement(catalog);
            enter_arrangement(state)
        }
        (Phase::Arrangement, NavTrigger::ExportSucceeded) => {
            state.phase = Phase::Export;
            Phase::Export
        }
        (Phase::Arrangement, NavTrigger::Restart) | (Phase::Export, NavTrigger::NewSession) => {
            reset(state);
            Phase::Orientation
        }
        (Phase::Export, NavTrigger::BackToGallery) => enter_arrangement(state),
        _ => {
            return Err(NavigationError::IllegalTransition {
                phase: phase_before,
                trigger,
            });
        }
    };
    log::debug!(
        "Navigation: {trigger:?} -> {entered:?} (index {})",
        state.current_index
    );
    Ok(entered)
}

/*
 * Re-enters the phase recorded in a snapshot. The persisted arrangement is
 * taken as is (minus ids the catalog no longer has) instead of being rebuilt
 * from the decisions. A saved Export phase resumes in Arrangement since the
 * exported artifact belongs to the previous run. A Framing/Artwork snapshot
 * pointing outside the catalog is discarded.
 */
pub fn restore(
    state: &mut SessionState,
    catalog: &Catalog,
    snapshot: SessionSnapshot,
) -> RestoreOutcome {
    if snapshot.phase == Phase::Orientation || catalog.is_empty() {
        return RestoreOutcome::StartedFresh;
    }
    if snapshot.phase.has_current_work() && snapshot.current_work_index >= catalog.len() {
        log::warn!(
            "Navigation: Discarding snapshot with index {} for a catalog of {}",
            snapshot.current_work_index,
            catalog.len()
        );
        return RestoreOutcome::StartedFresh;
    }

    let index = snapshot.current_work_index;
    state.restore_collections(snapshot.decisions, snapshot.arrangement_order, catalog);
    let phase = match snapshot.phase {
        Phase::Framing => enter_framing(state, index),
        Phase::Artwork => enter_artwork(state, index),
        Phase::Arrangement | Phase::Export => {
            // Kept for the next snapshot; only meaningful in Framing/Artwork.
            state.current_index = index.min(catalog.len() - 1);
            enter_arrangement(state)
        }
        Phase::Orientation => enter_orientation(state),
    };
    log::info!("Navigation: Restored session into {phase:?}");
    RestoreOutcome::Resumed(phase)
}

pub fn reset(state: &mut SessionState) {
    state.reset();
}

fn enter_orientation(state: &mut SessionState) -> Phase {
    state.phase = Phase::Orientation;
    Phase::Orientation
}

fn enter_framing(state: &mut SessionState, index: usize) -> Phase {
    state.current_index = index;
    state.phase = Phase::Framing;
    Phase::Framing
}

fn enter_artwork(state: &mut SessionState, index: usize) -> Phase {
    state.current_index = index;
    state.phase = Phase::Artwork;
    Phase::Artwork
}

fn enter_arrangement(state: &mut SessionState) -> Phase {
    state.phase = Phase::Arrangement;
    Phase::Arrangement
}
