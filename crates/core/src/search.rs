use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::cache::{Cell, RectCache};

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default();
    m.fuzzy_match(hay, needle)
}

/// Cells whose label fuzzily matches `needle`, best first. Ties keep the
/// shallower cell first.
pub fn search<'a>(cache: &'a RectCache, needle: &str) -> Vec<(i64, usize, &'a Cell)> {
    let mut hits: Vec<(i64, usize, &Cell)> = cache
        .iter()
        .filter_map(|(depth, cell)| fuzzy_score(needle, &cell.label).map(|s| (s, depth, cell)))
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Rgba;
    use crate::treemap::Rect;

    fn cell(label: &str) -> Cell {
        Cell {
            label: label.into(),
            path: vec![label.into()],
            rect: Rect::new(0, 0, 1, 1),
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn exact_beats_scattered() {
        assert!(fuzzy_score("fra", "France") > fuzzy_score("fra", "fjord rapids"));
        assert_eq!(fuzzy_score("xyz", "France"), None);
    }

    #[test]
    fn search_ranks_cells() {
        let mut cache = RectCache::default();
        cache.push_group(1, vec![cell("Europe"), cell("Asia")]);
        cache.push_group(2, vec![cell("France"), cell("Japan")]);
        let hits = search(&cache, "fran");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, 2);
        assert_eq!(hits[0].2.label, "France");
        assert!(search(&cache, "qq").is_empty());
    }
}
