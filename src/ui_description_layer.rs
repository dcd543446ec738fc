/*
 * This module is responsible for describing what each screen shows. It turns
 * the current `SessionState` plus catalog lookups into a `ScreenView`, a plain
 * read-only value the platform's render side paints from. Nothing here mutates
 * state, so the render collaborator can be handed a view after every committed
 * transition or arrangement change without risk.
 */
use crate::app_logic::ui_constants;
use crate::core::{Catalog, Phase, SessionState};
use crate::platform_layer::types::{
    ArrangementView, ArtworkView, FramingView, GalleryCardView, OrientationView, ScreenView,
};

pub fn describe_screen(state: &SessionState, catalog: &Catalog) -> ScreenView {
    log::trace!(
        "ui_description_layer: describing {:?} at index {}",
        state.phase(),
        state.current_index()
    );
    match state.phase() {
        Phase::Orientation => ScreenView::Orientation(describe_orientation(catalog)),
        Phase::Framing => describe_framing(state, catalog)
            .map(ScreenView::Framing)
            .unwrap_or_else(|| ScreenView::Orientation(describe_orientation(catalog))),
        Phase::Artwork => describe_artwork(state, catalog)
            .map(ScreenView::Artwork)
            .unwrap_or_else(|| ScreenView::Orientation(describe_orientation(catalog))),
        Phase::Arrangement => ScreenView::Arrangement(describe_arrangement(state, catalog)),
        Phase::Export => ScreenView::Export,
    }
}

fn describe_orientation(catalog: &Catalog) -> OrientationView {
    if catalog.is_empty() {
        return OrientationView {
            title: ui_constants::CONTENT_UNAVAILABLE_TITLE.to_string(),
            statement: ui_constants::CONTENT_UNAVAILABLE_MESSAGE.to_string(),
            content_available: false,
        };
    }
    OrientationView {
        title: catalog.orientation().title.clone(),
        statement: catalog.orientation().statement.clone(),
        content_available: true,
    }
}

fn describe_framing(state: &SessionState, catalog: &Catalog) -> Option<FramingView> {
    let index = state.current_index();
    let work = catalog.work_at(index)?;
    Some(FramingView {
        section_header: work.section_header.clone(),
        counter: format!("{} of {}", index + 1, catalog.len()),
        framing_text: work.framing_text.clone(),
    })
}

fn describe_artwork(state: &SessionState, catalog: &Catalog) -> Option<ArtworkView> {
    let index = state.current_index();
    let work = catalog.work_at(index)?;
    let is_last = catalog.last_index() == Some(index);
    Some(ArtworkView {
        image_ref: work.image_ref.clone(),
        alt_text: format!("Work {}", index + 1),
        context_text: work.context_text.clone(),
        included: state.is_included(&work.id),
        next_label: if is_last {
            ui_constants::FINISH_LABEL
        } else {
            ui_constants::NEXT_LABEL
        }
        .to_string(),
    })
}

pub fn gallery_cards(state: &SessionState, catalog: &Catalog) -> Vec<GalleryCardView> {
    state
        .arrangement_order()
        .iter()
        .filter_map(|id| catalog.work_by_id(id))
        .map(|work| GalleryCardView {
            work_id: work.id.clone(),
            image_ref: work.image_ref.clone(),
        })
        .collect()
}

fn describe_arrangement(state: &SessionState, catalog: &Catalog) -> ArrangementView {
    let cards = gallery_cards(state, catalog);
    let empty_message = cards
        .is_empty()
        .then(|| ui_constants::EMPTY_GALLERY_MESSAGE.to_string());
    ArrangementView {
        cards,
        empty_message,
    }
}
