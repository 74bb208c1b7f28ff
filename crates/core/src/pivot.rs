use std::collections::HashMap;
use thiserror::Error;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PivotError {
    #[error("depth {depth} is outside 1..={max}")]
    DepthOutOfRange { depth: usize, max: usize },
    #[error("path has {found} keys, depth {depth} needs {expected}")]
    PathDepth {
        depth: usize,
        expected: usize,
        found: usize,
    },
    #[error("no group at path `{0}`")]
    UnknownPath(String),
    #[error("aggregate #{0} is not configured")]
    UnknownAggregate(usize),
    #[error("measure column `{0}` not in dataset")]
    UnknownColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    #[default]
    Insertion,
    Descending,
}

/// The data engine a treemap view reads from.
pub trait PivotSource {
    /// Number of grouping levels below the grand total.
    fn max_depth(&self) -> usize;

    /// Configured aggregates: the first sizes cells, the second (if any) colors them.
    fn aggregates(&self) -> &[Aggregate];

    /// `(key, value)` rows for the groups at `depth` under `path`, where
    /// `path` holds one key for each level above `depth`.
    fn pivot_table(
        &self,
        aggregate: usize,
        depth: usize,
        path: &[String],
        sort: Sort,
    ) -> Result<Vec<(String, f64)>, PivotError>;
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: u64,
    min: f64,
    max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    fn add(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn finish(&self, func: AggFunc) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match func {
            AggFunc::Sum => self.sum,
            AggFunc::Mean => self.sum / self.count as f64,
            AggFunc::Count => self.count as f64,
            AggFunc::Min => self.min,
            AggFunc::Max => self.max,
        }
    }
}

/// In-memory pivot over a [`Dataset`]: every aggregate is precomputed for
/// every group at every level.
#[derive(Debug, Clone)]
pub struct PivotEngine {
    aggregates: Vec<Aggregate>,
    max_depth: usize,
    tree: AggregationTree,
}

impl PivotEngine {
    pub fn new(data: &Dataset, aggregates: Vec<Aggregate>) -> Result<Self, PivotError> {
        let columns = aggregates
            .iter()
            .map(|a| {
                data.measure_index(&a.column)
                    .ok_or_else(|| PivotError::UnknownColumn(a.column.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let tree = build_tree(data, &aggregates, &columns);
        tracing::debug!(
            groups = tree.nodes.len(),
            levels = data.dimensions.len(),
            "built aggregation tree"
        );
        Ok(Self {
            max_depth: data.dimensions.len(),
            aggregates,
            tree,
        })
    }

    pub fn tree(&self) -> &AggregationTree {
        &self.tree
    }
}

impl PivotSource for PivotEngine {
    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    fn pivot_table(
        &self,
        aggregate: usize,
        depth: usize,
        path: &[String],
        sort: Sort,
    ) -> Result<Vec<(String, f64)>, PivotError> {
        if aggregate >= self.aggregates.len() {
            return Err(PivotError::UnknownAggregate(aggregate));
        }
        if depth == 0 || depth > self.max_depth {
            return Err(PivotError::DepthOutOfRange {
                depth,
                max: self.max_depth,
            });
        }
        if path.len() != depth - 1 {
            return Err(PivotError::PathDepth {
                depth,
                expected: depth - 1,
                found: path.len(),
            });
        }
        let parent = self
            .tree
            .find(path)
            .ok_or_else(|| PivotError::UnknownPath(path.join("/")))?;

        let mut rows: Vec<(String, f64)> = self
            .tree
            .children(parent)
            .map(|n| (n.key.clone(), n.values[aggregate]))
            .collect();
        if sort == Sort::Descending {
            rows.sort_by(|a, b| b.1.total_cmp(&a.1));
        }
        Ok(rows)
    }
}

fn build_tree(data: &Dataset, aggregates: &[Aggregate], columns: &[usize]) -> AggregationTree {
    let mut nodes: Vec<AggregationNode> = Vec::with_capacity(64);
    let mut accs: Vec<Vec<Accumulator>> = Vec::with_capacity(64);
    let mut id_by_path: HashMap<Vec<String>, NodeId> = HashMap::new();

    let root = NodeId(0);
    nodes.push(AggregationNode {
        id: root,
        parent: None,
        path: Vec::new(),
        key: String::new(),
        values: Vec::new(),
        records: 0,
        children: Vec::new(),
    });
    accs.push(vec![Accumulator::default(); columns.len()]);
    id_by_path.insert(Vec::new(), root);

    for rec in &data.records {
        // Ensure every prefix of the record's key path exists, then fold the
        // record into each of them.
        let mut chain = Vec::with_capacity(rec.keys.len() + 1);
        chain.push(root);
        for depth in 1..=rec.keys.len() {
            let prefix = &rec.keys[..depth];
            let id = match id_by_path.get(prefix) {
                Some(&id) => id,
                None => {
                    let id = NodeId(nodes.len() as u64);
                    let parent = chain[depth - 1];
                    nodes.push(AggregationNode {
                        id,
                        parent: Some(parent),
                        path: prefix.to_vec(),
                        key: prefix[depth - 1].clone(),
                        values: Vec::new(),
                        records: 0,
                        children: Vec::new(),
                    });
                    accs.push(vec![Accumulator::default(); columns.len()]);
                    nodes[parent.0 as usize].children.push(id);
                    id_by_path.insert(prefix.to_vec(), id);
                    id
                }
            };
            chain.push(id);
        }

        for id in chain {
            let i = id.0 as usize;
            nodes[i].records += 1;
            for (acc, &col) in accs[i].iter_mut().zip(columns) {
                acc.add(rec.measures[col]);
            }
        }
    }

    for (node, acc) in nodes.iter_mut().zip(&accs) {
        node.values = acc
            .iter()
            .zip(aggregates)
            .map(|(a, agg)| a.finish(agg.func))
            .collect();
    }

    AggregationTree { root, nodes }
}
