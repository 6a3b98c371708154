//! Filter/group engine and browse-page state
//!
//! `BrowseState` owns everything a browse page view accumulates: the loaded
//! image sequence, the set of tags seen, and the current tag selection. It
//! lives for one page view and is passed by reference to the renderer.

use photosite_common::{Image, LoadedImage, MetadataDocument};
use std::collections::BTreeSet;

/// Page-view state for the multi-collection browse view
#[derive(Debug, Default, Clone)]
pub struct BrowseState {
    images: Vec<LoadedImage>,
    tags: BTreeSet<String>,
    selected: BTreeSet<String>,
}

impl BrowseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from loaded documents, in load order
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a MetadataDocument>,
    {
        let mut state = Self::new();
        for document in documents {
            state.absorb(document);
        }
        state
    }

    /// Append one collection's images, stamped with the collection, and
    /// union their tags into the tag set
    pub fn absorb(&mut self, document: &MetadataDocument) {
        for loaded in document.stamped_images() {
            self.tags.extend(loaded.image.tags.iter().cloned());
            self.images.push(loaded);
        }
    }

    /// Replace the selection
    pub fn select_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = tags.into_iter().map(Into::into).collect();
    }

    /// Add the tag if absent, remove it if present
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.selected.remove(tag) {
            self.selected.insert(tag.to_string());
        }
    }

    /// Clear the selection ("All Images")
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn images(&self) -> &[LoadedImage] {
        &self.images
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Images matching the current selection
    pub fn filtered(&self) -> Vec<&LoadedImage> {
        filter_images(&self.images, &self.selected)
    }

    /// Filtered images grouped by collection
    pub fn grouped(&self) -> Vec<CollectionGroup<'_>> {
        group_by_collection(self.filtered())
    }
}

/// Union-membership filter
///
/// An empty selection means "no filter" and returns every image. Otherwise an
/// image is kept when at least one of its tags is selected. Order is kept.
pub fn filter_images<'a>(images: &'a [LoadedImage], selected: &BTreeSet<String>) -> Vec<&'a LoadedImage> {
    if selected.is_empty() {
        return images.iter().collect();
    }

    images
        .iter()
        .filter(|loaded| loaded.image.has_tag_in(selected))
        .collect()
}

/// Images of one collection within a filtered result
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGroup<'a> {
    pub collection_id: &'a str,
    pub collection_title: &'a str,
    pub images: Vec<&'a LoadedImage>,
}

/// Partition images by owning collection
///
/// Groups appear in first-seen order; images keep their relative order.
pub fn group_by_collection<'a, I>(images: I) -> Vec<CollectionGroup<'a>>
where
    I: IntoIterator<Item = &'a LoadedImage>,
{
    let mut groups: Vec<CollectionGroup<'a>> = Vec::new();

    for loaded in images {
        match groups
            .iter_mut()
            .find(|g| g.collection_id == loaded.collection_id)
        {
            Some(group) => group.images.push(loaded),
            None => groups.push(CollectionGroup {
                collection_id: &loaded.collection_id,
                collection_title: &loaded.collection_title,
                images: vec![loaded],
            }),
        }
    }

    groups
}

/// Curated homepage subset of one collection
///
/// All images flagged `featured`; when none are flagged, the first
/// `fallback` images.
pub fn select_featured(images: &[Image], fallback: usize) -> Vec<&Image> {
    let featured: Vec<&Image> = images.iter().filter(|i| i.featured).collect();
    if !featured.is_empty() {
        return featured;
    }
    images.iter().take(fallback).collect()
}

/// Parse a comma-separated `tags` query value into a selection
///
/// Blank entries are dropped, so an empty value selects nothing (show all).
pub fn parse_tag_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosite_common::Collection;

    fn image(filename: &str, tags: &[&str], featured: bool) -> Image {
        Image {
            id: None,
            filename: filename.to_string(),
            title: filename.to_string(),
            description: String::new(),
            location: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            featured,
            print_available: false,
            print_sizes: vec![],
        }
    }

    fn document(id: &str, images: Vec<Image>) -> MetadataDocument {
        MetadataDocument {
            collection: Collection {
                id: id.to_string(),
                title: format!("{} title", id),
                slug: id.to_string(),
                location: String::new(),
                date: String::new(),
                description: String::new(),
                display_category: None,
                cover_image: None,
                featured: false,
                print_available: false,
            },
            images,
        }
    }

    fn sample_state() -> BrowseState {
        let a = document(
            "a",
            vec![
                image("a1", &["travel", "city"], false),
                image("a2", &["portrait"], false),
                image("a3", &["landscape"], false),
            ],
        );
        let b = document(
            "b",
            vec![
                image("b1", &["nature"], false),
                image("b2", &[], false),
                image("b3", &["city", "night"], false),
            ],
        );
        BrowseState::from_documents([&a, &b])
    }

    fn names(images: &[&LoadedImage]) -> Vec<String> {
        images.iter().map(|i| i.image.filename.clone()).collect()
    }

    fn selection(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_set_is_union_of_image_tags() {
        let state = sample_state();
        let expected = selection(&["city", "landscape", "nature", "night", "portrait", "travel"]);
        assert_eq!(state.tags(), &expected);

        let union: BTreeSet<String> = state
            .images()
            .iter()
            .flat_map(|i| i.image.tags.iter().cloned())
            .collect();
        assert_eq!(state.tags(), &union);
    }

    #[test]
    fn test_empty_selection_is_identity() {
        let state = sample_state();
        let filtered = filter_images(state.images(), &BTreeSet::new());
        assert_eq!(filtered.len(), state.images().len());
        assert!(filtered
            .iter()
            .zip(state.images())
            .all(|(f, i)| std::ptr::eq(*f, i)));
    }

    #[test]
    fn test_union_semantics_not_intersection() {
        let state = sample_state();
        let filtered = filter_images(state.images(), &selection(&["city", "nature"]));
        assert_eq!(names(&filtered), vec!["a1", "b1", "b3"]);
    }

    #[test]
    fn test_filter_has_no_false_positives_or_negatives() {
        let state = sample_state();
        let selected = selection(&["landscape", "night", "unknown"]);
        let filtered = filter_images(state.images(), &selected);

        for loaded in state.images() {
            let matches = loaded.image.tags.iter().any(|t| selected.contains(t));
            let kept = filtered.iter().any(|f| std::ptr::eq(*f, loaded));
            assert_eq!(matches, kept, "{}", loaded.image.filename);
        }
    }

    #[test]
    fn test_selection_matching_nothing_is_empty() {
        let state = sample_state();
        assert!(filter_images(state.images(), &selection(&["astro"])).is_empty());
    }

    #[test]
    fn test_grouping_is_order_preserving_partition() {
        let state = sample_state();
        let filtered = filter_images(state.images(), &selection(&["city", "portrait", "nature"]));
        let groups = group_by_collection(filtered.iter().copied());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].collection_id, "a");
        assert_eq!(groups[0].collection_title, "a title");
        assert_eq!(names(&groups[0].images), vec!["a1", "a2"]);
        assert_eq!(names(&groups[1].images), vec!["b1", "b3"]);

        let rejoined: Vec<&LoadedImage> = groups.iter().flat_map(|g| g.images.iter().copied()).collect();
        assert_eq!(names(&rejoined), names(&filtered));
    }

    #[test]
    fn test_grouping_uses_first_seen_order_for_interleaved_input() {
        let state = sample_state();
        let images = state.images();
        let interleaved = vec![&images[3], &images[0], &images[4], &images[1]];
        let groups = group_by_collection(interleaved);

        assert_eq!(groups[0].collection_id, "b");
        assert_eq!(names(&groups[0].images), vec!["b1", "b2"]);
        assert_eq!(names(&groups[1].images), vec!["a1", "a2"]);
    }

    #[test]
    fn test_toggle_and_clear_selection() {
        let mut state = sample_state();
        state.select_tags(["travel"]);
        state.toggle_tag("night");
        assert_eq!(state.selected(), &selection(&["night", "travel"]));
        assert_eq!(names(&state.filtered()), vec!["a1", "b3"]);

        state.toggle_tag("travel");
        assert_eq!(state.selected(), &selection(&["night"]));

        state.clear_selection();
        assert_eq!(state.filtered().len(), 6);
        assert_eq!(state.grouped().len(), 2);
    }

    #[test]
    fn test_select_featured_prefers_flagged_images() {
        let images = vec![
            image("1", &[], false),
            image("2", &[], true),
            image("3", &[], false),
            image("4", &[], true),
        ];
        let picked: Vec<_> = select_featured(&images, 6).iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(picked, vec!["2", "4"]);
    }

    #[test]
    fn test_select_featured_falls_back_to_first_n() {
        let images: Vec<_> = (0..9).map(|i| image(&i.to_string(), &[], false)).collect();
        let picked = select_featured(&images, 6);
        assert_eq!(picked.len(), 6);
        assert_eq!(picked[0].filename, "0");
        assert_eq!(picked[5].filename, "5");

        assert_eq!(select_featured(&images[..2], 6).len(), 2);
        assert!(select_featured(&[], 6).is_empty());
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("city, night,,"), selection(&["city", "night"]));
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list(" , ").is_empty());
    }
}
