use serde::Serialize;
use std::collections::BTreeMap;

use crate::colormap::Rgba;
use crate::treemap::Rect;

/// One laid-out group member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub label: String,
    /// Keys from the top level down to and including `label`.
    pub path: Vec<String>,
    pub rect: Rect,
    pub color: Rgba,
}

/// Layout results by depth. Each depth holds the groups laid out at that
/// level, one group per parent rectangle, in layout order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectCache {
    levels: BTreeMap<usize, Vec<Vec<Cell>>>,
}

impl RectCache {
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    pub fn push_group(&mut self, depth: usize, group: Vec<Cell>) {
        self.levels.entry(depth).or_default().push(group);
    }

    pub fn depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.keys().copied()
    }

    pub fn max_depth(&self) -> usize {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    pub fn groups(&self, depth: usize) -> &[Vec<Cell>] {
        self.levels.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cells(&self, depth: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.groups(depth).iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Cell)> + '_ {
        self.levels
            .iter()
            .flat_map(|(&d, groups)| groups.iter().flatten().map(move |c| (d, c)))
    }

    /// Total number of cells across all depths.
    pub fn len(&self) -> usize {
        self.levels.values().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_at(&self, depth: usize, x: i32, y: i32) -> Option<&Cell> {
        self.cells(depth).find(|c| c.rect.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str, rect: Rect) -> Cell {
        Cell {
            label: label.into(),
            path: vec![label.into()],
            rect,
            color: Rgba::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    #[test]
    fn groups_accumulate_per_depth() {
        let mut cache = RectCache::default();
        assert!(cache.is_empty());
        cache.push_group(1, vec![cell("a", Rect::new(0, 0, 5, 10)), cell("b", Rect::new(5, 0, 5, 10))]);
        cache.push_group(2, vec![cell("c", Rect::new(0, 0, 5, 10))]);
        cache.push_group(2, vec![cell("d", Rect::new(5, 0, 5, 10))]);

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.depths().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(cache.max_depth(), 2);
        assert_eq!(cache.groups(2).len(), 2);
        assert!(cache.groups(7).is_empty());
        assert_eq!(cache.iter().next().map(|(d, c)| (d, c.label.as_str())), Some((1, "a")));

        assert_eq!(cache.cell_at(1, 6, 3).map(|c| c.label.as_str()), Some("b"));
        assert_eq!(cache.cell_at(2, 2, 9).map(|c| c.label.as_str()), Some("c"));
        assert!(cache.cell_at(1, 10, 3).is_none());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.max_depth(), 0);
    }
}
