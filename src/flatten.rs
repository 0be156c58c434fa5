//! Level flattening: projecting extracted paths into (sheet, column) buckets

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::arena::NodeTree;
use crate::extract::ExtractedPaths;

/// Reserved bucket for leaves with no traversable ancestry beyond the root.
pub const LEVEL1_BUCKET: &str = "level1";
/// Reserved sheet holding the shared objective index.
pub const OBJECTIVES_SHEET: &str = "Learning Objectives";
/// Default column for paths without an intermediate level.
pub const DEFAULT_COLUMN: &str = "Values";
/// Legacy spreadsheet sheet-name limit.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// One flattened row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Leaf display title
    pub value: String,
    /// Intermediate ancestors joined with " > ", when the path is deep enough
    pub grouping: Option<String>,
    /// Comma-joined indices into the shared objective list
    pub learning_objectives: Option<String>,
}

/// A bottom-level column bucket and its rows, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBucket {
    pub name: String,
    pub rows: Vec<RowRecord>,
}

/// A top-level sheet bucket and its columns, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetBucket {
    pub name: String,
    pub columns: Vec<ColumnBucket>,
}

impl SheetBucket {
    fn column_mut(&mut self, name: &str) -> &mut ColumnBucket {
        if let Some(pos) = self.columns.iter().position(|c| c.name == name) {
            return &mut self.columns[pos];
        }
        self.columns.push(ColumnBucket {
            name: name.to_string(),
            rows: Vec::new(),
        });
        self.columns.last_mut().unwrap()
    }
}

/// The flattened two-level schema plus the two reserved buckets.
///
/// All ordering is insertion order (= leaf-discovery pre-order), so
/// flattening an unchanged extraction twice yields identical contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedSheet {
    sheets: Vec<SheetBucket>,
    /// Flat list, not nested under any column
    pub level1: Vec<String>,
    /// Shared objective display strings, referenced by row index
    pub objectives: Vec<String>,
}

impl FlattenedSheet {
    fn sheet_mut(&mut self, name: &str) -> &mut SheetBucket {
        if let Some(pos) = self.sheets.iter().position(|s| s.name == name) {
            return &mut self.sheets[pos];
        }
        self.sheets.push(SheetBucket {
            name: name.to_string(),
            columns: Vec::new(),
        });
        self.sheets.last_mut().unwrap()
    }

    pub fn sheets(&self) -> impl Iterator<Item = &SheetBucket> {
        self.sheets.iter()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetBucket> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty() && self.level1.is_empty() && self.objectives.is_empty()
    }
}

/// Converts each unique path into a flat record keyed by (sheet, column).
///
/// Length-1 paths land in the `level1` bucket. Otherwise the first node
/// names the sheet (truncated to the 31-char sheet-name limit), the last
/// node supplies the row value, the second node names the column when there
/// is an intermediate level, and any deeper ancestors collapse into the
/// `grouping` string. Objective entries are appended to the shared index and
/// referenced from the row by position.
#[instrument(level = "debug", skip_all)]
pub fn flatten(tree: &NodeTree, paths: &ExtractedPaths) -> FlattenedSheet {
    let mut flattened = FlattenedSheet::default();

    let display = |idx| {
        tree.get_node(idx)
            .map(|node| node.data.record.display_title().to_string())
            .unwrap_or_default()
    };

    for entry in paths.iter() {
        match entry.path.len() {
            // A boundary directly above the leaf leaves nothing to place.
            0 => continue,
            1 => {
                flattened.level1.push(display(entry.path[0]));
                continue;
            }
            _ => {}
        }

        let top = truncate_name(&display(entry.path[0]), MAX_SHEET_NAME_LEN);
        let value = display(*entry.path.last().unwrap());
        let bottom = if entry.path.len() >= 3 {
            display(entry.path[1])
        } else {
            DEFAULT_COLUMN.to_string()
        };
        let grouping = if entry.path.len() >= 4 {
            Some(
                entry.path[2..entry.path.len() - 1]
                    .iter()
                    .map(|&idx| display(idx))
                    .join(" > "),
            )
        } else {
            None
        };

        let learning_objectives = if entry.aux_path.is_empty() {
            None
        } else {
            let refs = entry
                .aux_path
                .iter()
                .map(|&idx| {
                    flattened.objectives.push(display(idx));
                    (flattened.objectives.len() - 1).to_string()
                })
                .join(", ");
            Some(refs)
        };

        flattened
            .sheet_mut(&top)
            .column_mut(&bottom)
            .rows
            .push(RowRecord {
                value,
                grouping: grouping.filter(|g| !g.is_empty()),
                learning_objectives,
            });
    }

    debug!(
        sheets = flattened.sheets.len(),
        level1 = flattened.level1.len(),
        objectives = flattened.objectives.len(),
        "flattening finished"
    );
    flattened
}

/// Truncates to at most `max` characters, leaving shorter names untouched.
pub fn truncate_name(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}
