use std::collections::HashMap;
use thiserror::Error;

use crate::cache::{Cell, RectCache};
use crate::colormap::{ColorMap, Diverging, Rgba};
use crate::config::{TreemapStyle, ViewConfig};
use crate::model::WeightedItem;
use crate::pivot::{PivotError, PivotSource, Sort};
use crate::treemap::{squarify_layout, LayoutError, Rect};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no engine set")]
    NoEngine,
    #[error("render depth {depth} exceeds engine depth {max}")]
    DepthOutOfRange { depth: usize, max: usize },
    #[error(transparent)]
    Pivot(#[from] PivotError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Treemap over a pivot engine. Every change to the engine, style or size
/// rebuilds the rect cache from scratch.
pub struct TreemapView<E> {
    config: ViewConfig,
    colormap: Diverging,
    engine: Option<E>,
    style: TreemapStyle,
    depth: usize,
    width: i32,
    height: i32,
    cache: RectCache,
}

impl<E: PivotSource> TreemapView<E> {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            colormap: Diverging::new(config.color_low, config.color_high),
            style: config.style,
            config,
            engine: None,
            depth: 0,
            width: 0,
            height: 0,
            cache: RectCache::default(),
        }
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Replace the engine; the render depth resets to its full depth.
    pub fn set_engine(&mut self, engine: E) -> Result<(), ViewError> {
        self.depth = engine.max_depth();
        self.engine = Some(engine);
        self.layout()
    }

    pub fn style(&self) -> TreemapStyle {
        self.style
    }

    pub fn set_style(&mut self, style: TreemapStyle) -> Result<(), ViewError> {
        self.style = style;
        self.layout()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Change which depth is drawn. The cache already holds every level, so
    /// no relayout happens.
    pub fn set_depth(&mut self, depth: usize) -> Result<(), ViewError> {
        let max = self.engine.as_ref().ok_or(ViewError::NoEngine)?.max_depth();
        if depth > max {
            return Err(ViewError::DepthOutOfRange { depth, max });
        }
        self.depth = depth;
        Ok(())
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Store the new size and relayout. Before an engine is set only the
    /// size is kept.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), ViewError> {
        self.width = width.max(0);
        self.height = height.max(0);
        if self.engine.is_none() {
            return Ok(());
        }
        self.layout()
    }

    pub fn cache(&self) -> &RectCache {
        &self.cache
    }

    /// Recompute every level into a fresh cache. On error the cache is left
    /// empty rather than half built.
    pub fn layout(&mut self) -> Result<(), ViewError> {
        self.cache.clear();
        let engine = self.engine.as_ref().ok_or(ViewError::NoEngine)?;
        if engine.aggregates().is_empty() {
            return Err(PivotError::UnknownAggregate(0).into());
        }

        let bounds = Rect::new(0, 0, self.width, self.height).adjusted(1, 1, -1, -1);
        let pass = LayoutPass {
            engine,
            config: &self.config,
            colormap: &self.colormap,
            style: self.style,
        };
        let mut cache = RectCache::default();
        if engine.max_depth() > 0 {
            pass.level(bounds, 1, &mut Vec::new(), &mut cache)?;
        }
        tracing::info!(
            cells = cache.len(),
            levels = cache.max_depth(),
            style = %self.style,
            width = self.width,
            height = self.height,
            "treemap layout"
        );
        self.cache = cache;
        Ok(())
    }

    /// What a renderer should draw, in paint order.
    pub fn draw_plan(&self) -> Vec<DrawItem<'_>> {
        let render_depth = self.depth;
        let cluster = self.style == TreemapStyle::Cluster;
        let depths: Vec<usize> = if cluster {
            (0..=render_depth).collect()
        } else {
            (1..=render_depth).rev().collect()
        };
        let min_label_width = self.config.char_width * 2;

        let mut items = Vec::new();
        for depth in depths {
            for group in self.cache.groups(depth) {
                for (i, cell) in group.iter().enumerate() {
                    let fill = (cluster || depth == render_depth).then(|| Fill::from_color(cell.color));

                    let mut label = None;
                    let mut text_rect = cell.rect.adjusted(3, 2, -5, 0);
                    if text_rect.w > min_label_width
                        && (cluster || depth == 1 || depth == render_depth)
                    {
                        if depth != 1 && i == 0 && !cluster {
                            text_rect = text_rect.adjusted(0, self.config.top_line_height, 0, 0);
                        }
                        label = Some(text_rect);
                    }

                    items.push(DrawItem {
                        depth,
                        cell,
                        fill,
                        label,
                    });
                }
            }
        }
        items
    }
}

struct LayoutPass<'a, E> {
    engine: &'a E,
    config: &'a ViewConfig,
    colormap: &'a Diverging,
    style: TreemapStyle,
}

impl<E: PivotSource> LayoutPass<'_, E> {
    fn level(
        &self,
        bounds: Rect,
        depth: usize,
        path: &mut Vec<String>,
        cache: &mut RectCache,
    ) -> Result<(), ViewError> {
        if bounds.is_empty() {
            tracing::debug!(depth, ?path, "no room left, branch skipped");
            return Ok(());
        }

        let items: Vec<WeightedItem> = self
            .engine
            .pivot_table(0, depth, path.as_slice(), Sort::Descending)?
            .into_iter()
            .map(|(label, weight)| WeightedItem { label, weight })
            .collect();
        if items.iter().all(|i| i.weight == 0.0) {
            tracing::debug!(depth, ?path, groups = items.len(), "nothing to lay out");
            return Ok(());
        }

        let weights: Vec<f64> = items.iter().map(|i| i.weight).collect();
        let rects = squarify_layout(&weights, bounds)?;
        let colors = self.colors(&items, depth, path.as_slice())?;

        let group = items
            .iter()
            .zip(&rects)
            .zip(colors)
            .map(|((item, &rect), color)| {
                let mut cell_path = path.clone();
                cell_path.push(item.label.clone());
                Cell {
                    label: item.label.clone(),
                    path: cell_path,
                    rect,
                    color,
                }
            })
            .collect();
        cache.push_group(depth, group);
        tracing::debug!(depth, ?path, cells = items.len(), "level laid out");

        if depth >= self.engine.max_depth() {
            return Ok(());
        }

        for (item, rect) in items.iter().zip(rects) {
            let rect = match self.style {
                TreemapStyle::Cluster => {
                    rect.adjusted(5, self.config.line_height(depth) + 6, -5, -5)
                }
                TreemapStyle::Classic => rect,
            };
            path.push(item.label.clone());
            let result = self.level(rect, depth + 1, path, cache);
            path.pop();
            result?;
        }
        Ok(())
    }

    fn colors(
        &self,
        items: &[WeightedItem],
        depth: usize,
        path: &[String],
    ) -> Result<Vec<Rgba>, ViewError> {
        let values: Vec<f64> = if self.engine.aggregates().len() > 1 {
            let table: HashMap<String, f64> = self
                .engine
                .pivot_table(1, depth, path, Sort::Insertion)?
                .into_iter()
                .collect();
            items
                .iter()
                .map(|i| table.get(&i.label).copied().unwrap_or(f64::NAN))
                .collect()
        } else {
            vec![f64::NAN; items.len()]
        };
        Ok(self.colormap.map(&values))
    }
}

/// Background fill with the two-tone bevel drawn around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub color: Rgba,
    pub top_border: Rgba,
    pub bottom_border: Rgba,
    pub text: Rgba,
}

impl Fill {
    fn from_color(color: Rgba) -> Self {
        Self {
            color,
            top_border: color.lighter(1.3),
            bottom_border: color.darker(1.3),
            text: color.darker(2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem<'a> {
    pub depth: usize,
    pub cell: &'a Cell,
    /// `None` means outline only.
    pub fill: Option<Fill>,
    /// Where the label goes, if there is room for one.
    pub label: Option<Rect>,
}
