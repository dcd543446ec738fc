/*
 * Immutable content of one installation session: the artworks the visitor walks
 * through and the orientation text shown before the first one. A `Catalog` is
 * built once per session by the catalog loader and is never mutated afterwards;
 * everything else in the core refers to artworks by their stable string id.
 */

// One artwork as the visitor sees it on the framing and artwork screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkDescriptor {
    pub id: String,
    pub display_order: i64,
    pub section_header: String,
    pub framing_text: String,
    pub context_text: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrientationContent {
    pub title: String,
    pub statement: String,
}

/*
 * The ordered list of artworks plus the orientation text.
 * Works are kept sorted by `display_order` ascending; the position of a work in
 * `works()` is its catalog index, which is what navigation talks about.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    orientation: OrientationContent,
    works: Vec<ArtworkDescriptor>,
}

impl Catalog {
    /// Builds a catalog, sorting `works` by `display_order`. The sort is stable,
    /// so works sharing an order keep their source sequence.
    pub fn new(orientation: OrientationContent, mut works: Vec<ArtworkDescriptor>) -> Self {
        works.sort_by_key(|w| w.display_order);
        Catalog { orientation, works }
    }

    pub fn orientation(&self) -> &OrientationContent {
        &self.orientation
    }

    pub fn works(&self) -> &[ArtworkDescriptor] {
        &self.works
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }

    pub fn work_at(&self, index: usize) -> Option<&ArtworkDescriptor> {
        self.works.get(index)
    }

    pub fn work_by_id(&self, id: &str) -> Option<&ArtworkDescriptor> {
        self.works.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.work_by_id(id).is_some()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.works.len().checked_sub(1)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn work(id: &str, display_order: i64) -> ArtworkDescriptor {
        ArtworkDescriptor {
            id: id.to_string(),
            display_order,
            section_header: format!("Section for {id}"),
            framing_text: format!("Framing for {id}"),
            context_text: format!("Context for {id}"),
            image_ref: format!("images/{id}.jpg"),
        }
    }

    // Catalog with works W1..Wn in display order.
    pub(crate) fn catalog_of(count: usize) -> Catalog {
        let works = (1..=count).map(|i| work(&format!("W{i}"), i as i64)).collect();
        Catalog::new(
            OrientationContent {
                title: "Your Installation".to_string(),
                statement: "Walk through the works and keep the ones you want.".to_string(),
            },
            works,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::work;
    use super::*;

    #[test]
    fn test_catalog_sorts_by_display_order() {
        let catalog = Catalog::new(
            OrientationContent::default(),
            vec![work("C", 30), work("A", 10), work("B", 20)],
        );
        let ids: Vec<&str> = catalog.works().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(catalog.last_index(), Some(2));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::new(OrientationContent::default(), vec![work("A", 1)]);
        assert!(catalog.contains("A"));
        assert!(!catalog.contains("Z"));
        assert_eq!(catalog.work_at(0).map(|w| w.id.as_str()), Some("A"));
        assert!(catalog.work_at(1).is_none());
    }

    #[test]
    fn test_empty_catalog_has_no_last_index() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.last_index(), None);
    }
}
