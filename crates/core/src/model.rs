use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(0)
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("column `{0}` not found")]
    MissingColumn(String),
    #[error("row {row}: column `{column}` has non-numeric value `{value}`")]
    ParseNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("record has {found} {what}, expected {expected}")]
    Arity {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("unknown aggregate function `{0}`")]
    UnknownFunc(String),
}

/// How the records under one aggregation node are folded into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl FromStr for AggFunc {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggFunc::Sum),
            "mean" | "avg" => Ok(AggFunc::Mean),
            "count" => Ok(AggFunc::Count),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            _ => Err(DatasetError::UnknownFunc(s.to_string())),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Count => "count",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
        };
        f.write_str(name)
    }
}

/// A measure column paired with the function that aggregates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub column: String,
    pub func: AggFunc,
}

impl Aggregate {
    pub fn new(column: impl Into<String>, func: AggFunc) -> Self {
        Self {
            column: column.into(),
            func,
        }
    }
}

/// Parses `column` or `column:func`; the function defaults to `sum`.
impl FromStr for Aggregate {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((column, func)) => Ok(Aggregate::new(column, func.parse()?)),
            None => Ok(Aggregate::new(s, AggFunc::Sum)),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.func)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub keys: Vec<String>,
    pub measures: Vec<f64>,
}

/// Flat table of records: one group-by value per dimension and one number per
/// measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(dimensions: Vec<String>, measures: Vec<String>) -> Self {
        Self {
            dimensions,
            measures,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, keys: Vec<String>, measures: Vec<f64>) -> Result<(), DatasetError> {
        if keys.len() != self.dimensions.len() {
            return Err(DatasetError::Arity {
                what: "keys",
                expected: self.dimensions.len(),
                found: keys.len(),
            });
        }
        if measures.len() != self.measures.len() {
            return Err(DatasetError::Arity {
                what: "measures",
                expected: self.measures.len(),
                found: measures.len(),
            });
        }
        self.records.push(Record { keys, measures });
        Ok(())
    }

    pub fn measure_index(&self, name: &str) -> Option<usize> {
        self.measures.iter().position(|m| m == name)
    }

    /// Read a CSV with a header row, keeping only the named columns.
    /// Empty measure cells count as zero.
    pub fn from_csv_reader<R: std::io::Read>(
        reader: R,
        dimensions: &[String],
        measures: &[String],
    ) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &String| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.clone()))
        };
        let dim_cols = dimensions.iter().map(column).collect::<Result<Vec<_>, _>>()?;
        let measure_cols = measures.iter().map(column).collect::<Result<Vec<_>, _>>()?;

        let mut data = Dataset::new(dimensions.to_vec(), measures.to_vec());
        for (row, result) in rdr.records().enumerate() {
            let rec = result?;
            let keys = dim_cols
                .iter()
                .map(|&c| rec.get(c).unwrap_or("").to_string())
                .collect();
            let mut values = Vec::with_capacity(measure_cols.len());
            for (&c, name) in measure_cols.iter().zip(measures) {
                let raw = rec.get(c).unwrap_or("");
                let value = if raw.is_empty() {
                    0.0
                } else {
                    raw.parse::<f64>().map_err(|_| DatasetError::ParseNumber {
                        row: row + 1,
                        column: name.clone(),
                        value: raw.to_string(),
                    })?
                };
                values.push(value);
            }
            data.push(keys, values)?;
        }
        tracing::debug!(
            records = data.records.len(),
            dimensions = data.dimensions.len(),
            "loaded dataset"
        );
        Ok(data)
    }
}

/// One node of the aggregation hierarchy. Depth 0 is the grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub path: Vec<String>,
    pub key: String,
    /// One value per aggregate, in the engine's aggregate order.
    pub values: Vec<f64>,
    pub records: u64,
    pub children: Vec<NodeId>,
}

impl AggregationNode {
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AggregationTree {
    pub root: NodeId,
    pub nodes: Vec<AggregationNode>,
}

impl AggregationTree {
    pub fn get(&self, id: NodeId) -> Option<&AggregationNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &AggregationNode> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|&c| self.get(c))
    }

    /// Walk from the root following one key per level.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        let mut cur = self.root;
        for key in path {
            cur = self.children(cur).find(|n| n.key == key.as_ref())?.id;
        }
        Some(cur)
    }
}

/// A label with the non-negative weight that sizes its rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub label: String,
    pub weight: f64,
}
