//! End-to-end: CSV rows through the pivot engine into a laid-out treemap.

use pivotmap_core::export::to_json;
use pivotmap_core::search::search;
use pivotmap_core::*;
use pretty_assertions::assert_eq;

const CITIES: &str = "\
region,country,city,pop,growth
Europe,France,Paris,11,0.004
Europe,France,Lyon,2,0.009
Europe,Germany,Berlin,4,0.006
Europe,Germany,Hamburg,2,0.003
Europe,Germany,Munich,1.5,0.011
Asia,Japan,Tokyo,37,-0.002
Asia,Japan,Osaka,19,-0.004
Asia,India,Mumbai,21,0.021
Asia,India,Delhi,31,0.029
Americas,Brazil,Sao Paulo,22,0.007
Americas,Canada,Toronto,6,0.013
";

fn engine() -> PivotEngine {
    let dims: Vec<String> = ["region", "country", "city"].map(String::from).to_vec();
    let measures: Vec<String> = ["pop", "growth"].map(String::from).to_vec();
    let data = Dataset::from_csv_reader(CITIES.as_bytes(), &dims, &measures).unwrap();
    PivotEngine::new(
        &data,
        vec!["pop".parse().unwrap(), "growth:mean".parse().unwrap()],
    )
    .unwrap()
}

fn laid_out(style: TreemapStyle, w: i32, h: i32) -> TreemapView<PivotEngine> {
    let mut view = TreemapView::new(ViewConfig {
        style,
        ..ViewConfig::default()
    });
    view.resize(w, h).unwrap();
    view.set_engine(engine()).unwrap();
    view
}

fn assert_partitions(cells: &[Cell], bounds: Rect) {
    let area: i64 = cells.iter().map(|c| c.rect.area()).sum();
    assert_eq!(area, bounds.area(), "cells do not cover {bounds:?}");
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            assert!(!a.rect.intersects(&b.rect), "{} overlaps {}", a.label, b.label);
        }
    }
}

#[test]
fn classic_levels_each_tile_the_view() {
    let view = laid_out(TreemapStyle::Classic, 642, 482);
    let cache = view.cache();
    let bounds = Rect::new(1, 1, 640, 480);

    assert_eq!(cache.depths().collect::<Vec<_>>(), vec![1, 2, 3]);
    for depth in 1..=3 {
        let cells: Vec<Cell> = cache.cells(depth).cloned().collect();
        assert_partitions(&cells, bounds);
    }
    assert_eq!(cache.cells(3).count(), 11);
    assert_eq!(cache.groups(3).len(), 6);

    let top: Vec<&str> = cache.cells(1).map(|c| c.label.as_str()).collect();
    assert_eq!(top, vec!["Asia", "Americas", "Europe"]);
}

#[test]
fn children_stay_inside_parents() {
    let view = laid_out(TreemapStyle::Cluster, 800, 600);
    let cache = view.cache();
    for depth in 2..=3 {
        for cell in cache.cells(depth) {
            let parent_path = &cell.path[..cell.path.len() - 1];
            let parent = cache
                .cells(depth - 1)
                .find(|p| p.path == parent_path)
                .unwrap();
            let r = cell.rect;
            assert!(r.x >= parent.rect.x && r.right() <= parent.rect.right());
            assert!(r.y >= parent.rect.y && r.bottom() <= parent.rect.bottom());
        }
    }
}

#[test]
fn hit_test_and_search_agree() {
    let view = laid_out(TreemapStyle::Classic, 642, 482);
    let hits = search(view.cache(), "tokyo");
    let (_, depth, tokyo) = hits[0];
    assert_eq!(depth, 3);
    assert_eq!(tokyo.path, vec!["Asia", "Japan", "Tokyo"]);

    let (cx, cy) = (tokyo.rect.x + tokyo.rect.w / 2, tokyo.rect.y + tokyo.rect.h / 2);
    assert_eq!(view.cache().cell_at(3, cx, cy).map(|c| c.label.as_str()), Some("Tokyo"));
    assert_eq!(view.cache().cell_at(1, cx, cy).map(|c| c.label.as_str()), Some("Asia"));
}

#[test]
fn style_switch_relayouts_and_json_reflects_it() {
    let mut view = laid_out(TreemapStyle::Classic, 642, 482);
    let classic = to_json(view.cache());
    view.set_style(TreemapStyle::Cluster).unwrap();
    let cluster = to_json(view.cache());

    assert_eq!(classic["levels"][0], cluster["levels"][0]);
    assert_ne!(classic["levels"][1], cluster["levels"][1]);
    assert_eq!(view.draw_plan().len(), view.cache().len());
}

#[test]
fn tiny_views_skip_branches_without_failing() {
    let view = laid_out(TreemapStyle::Cluster, 20, 20);
    assert_eq!(view.cache().cells(1).count(), 3);
    assert!(view.cache().cells(3).count() < 11);
}
