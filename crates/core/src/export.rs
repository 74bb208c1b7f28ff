use crate::cache::RectCache;

pub fn to_csv(cache: &RectCache, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "depth", "group", "index", "label", "path", "x", "y", "width", "height", "r", "g", "b", "a",
    ])?;
    for depth in cache.depths() {
        for (g, group) in cache.groups(depth).iter().enumerate() {
            for (i, cell) in group.iter().enumerate() {
                let [r, gr, b, a] = cell.color.to_rgba8();
                writer.write_record([
                    depth.to_string(),
                    g.to_string(),
                    i.to_string(),
                    cell.label.clone(),
                    cell.path.join("/"),
                    cell.rect.x.to_string(),
                    cell.rect.y.to_string(),
                    cell.rect.w.to_string(),
                    cell.rect.h.to_string(),
                    r.to_string(),
                    gr.to_string(),
                    b.to_string(),
                    a.to_string(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(cache: &RectCache) -> serde_json::Value {
    serde_json::json!({
        "depth": cache.max_depth(),
        "levels": cache.depths().map(|d| serde_json::json!({
            "depth": d,
            "groups": cache.groups(d).iter().map(|group| group.iter().map(|c| serde_json::json!({
                "label": c.label,
                "path": c.path,
                "rect": [c.rect.x, c.rect.y, c.rect.w, c.rect.h],
                "color": c.color.to_rgba8(),
            })).collect::<Vec<_>>()).collect::<Vec<_>>()
        })).collect::<Vec<_>>()
    })
}
