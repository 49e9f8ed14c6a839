use crate::deck::NavigationMap;

/// Browsing progress as a ratio in [0,1] over the curated navigation map.
///
/// Unknown ids and single-entry maps degrade to 0 rather than dividing by
/// zero. The first entry maps to 0.0 and the last to 1.0; the ratio is
/// monotone in the active index.
pub fn compute_ratio(map: &NavigationMap, active_id: &str) -> f32 {
    if map.len() <= 1 {
        return 0.0;
    }
    let index = map.index_of(active_id).unwrap_or(0);
    index as f32 / (map.len() - 1) as f32
}

/// Progress as a percentage, for rendering.
pub fn compute_percentage(map: &NavigationMap, active_id: &str) -> f32 {
    compute_ratio(map, active_id) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{NavigationMap, SlideDescriptor};

    fn map(ids: &[&str]) -> NavigationMap {
        NavigationMap::new(
            ids.iter()
                .map(|id| SlideDescriptor {
                    id: id.to_string(),
                    display_name: id.to_string(),
                    icon_ref: String::new(),
                })
                .collect(),
        )
    }

    fn five_entry_map() -> NavigationMap {
        map(&["title", "homepage", "profile", "gallery", "termfolio"])
    }

    #[test]
    fn first_is_zero_and_last_is_one_hundred_percent() {
        let m = five_entry_map();
        assert_eq!(compute_percentage(&m, "title"), 0.0);
        assert_eq!(compute_percentage(&m, "termfolio"), 100.0);
    }

    #[test]
    fn homepage_in_five_entry_map_is_twenty_five_percent() {
        let m = five_entry_map();
        assert_eq!(compute_percentage(&m, "homepage"), 25.0);
    }

    #[test]
    fn ratio_is_monotone_in_the_active_index() {
        let m = five_entry_map();
        let mut last = -1.0f32;
        for entry in m.entries() {
            let r = compute_ratio(&m, &entry.id);
            assert!(r > last, "ratio not increasing at {}", entry.id);
            last = r;
        }
    }

    #[test]
    fn unknown_id_clamps_to_zero() {
        let m = five_entry_map();
        assert_eq!(compute_ratio(&m, "nope"), 0.0);
    }

    #[test]
    fn single_entry_map_is_well_defined() {
        let m = map(&["only"]);
        let r = compute_ratio(&m, "only");
        assert_eq!(r, 0.0);
        assert!(!r.is_nan());
    }

    #[test]
    fn empty_map_is_well_defined() {
        let m = map(&[]);
        assert_eq!(compute_ratio(&m, "anything"), 0.0);
    }
}
