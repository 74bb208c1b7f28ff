use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classic draws only the deepest level filled; cluster fills every level
/// and leaves a label band at the top of each parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreemapStyle {
    #[default]
    Classic,
    Cluster,
}

impl FromStr for TreemapStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(TreemapStyle::Classic),
            "cluster" => Ok(TreemapStyle::Cluster),
            other => Err(format!("unknown style `{other}` (expected classic or cluster)")),
        }
    }
}

impl fmt::Display for TreemapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreemapStyle::Classic => f.write_str("classic"),
            TreemapStyle::Cluster => f.write_str("cluster"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub style: TreemapStyle,
    /// Label line height for the top two levels (large bold font).
    pub top_line_height: i32,
    /// Label line height below that.
    pub line_height: i32,
    /// Average character width; labels need room for two of them.
    pub char_width: i32,
    pub color_low: f64,
    pub color_high: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            style: TreemapStyle::Classic,
            top_line_height: 18,
            line_height: 12,
            char_width: 6,
            color_low: -0.1,
            color_high: 0.1,
        }
    }
}

impl ViewConfig {
    pub fn line_height(&self, depth: usize) -> i32 {
        if depth <= 1 {
            self.top_line_height
        } else {
            self.line_height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ViewConfig = serde_json::from_str(r#"{"style":"cluster","line_height":10}"#).unwrap();
        assert_eq!(cfg.style, TreemapStyle::Cluster);
        assert_eq!(cfg.line_height, 10);
        assert_eq!(cfg.top_line_height, 18);
        assert_eq!(cfg.line_height(1), 18);
        assert_eq!(cfg.line_height(2), 10);
    }

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("Cluster".parse::<TreemapStyle>(), Ok(TreemapStyle::Cluster));
        assert!("nested".parse::<TreemapStyle>().is_err());
    }
}
