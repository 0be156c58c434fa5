//! Sheet emission: logical table layout, naming rules, CSV and workbook writers

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tracing::{debug, instrument, warn};

use crate::errors::EmitResult;
use crate::flatten::{ColumnBucket, FlattenedSheet, DEFAULT_COLUMN, MAX_SHEET_NAME_LEN, OBJECTIVES_SHEET};

/// Global row ordering directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parses a directive string, failing closed to `None` with a logged
    /// diagnostic on unrecognized input.
    pub fn from_directive(directive: &str) -> Self {
        match directive {
            "none" => Self::None,
            "asc" | "ascending" => Self::Ascending,
            "desc" | "descending" => Self::Descending,
            other => {
                warn!("unrecognized sort directive {other:?}, falling back to \"none\"");
                Self::None
            }
        }
    }
}

/// Output artifact shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One CSV file per sheet inside a directory
    #[default]
    CsvDirectory,
    /// One worksheet per sheet in a single .xlsx workbook
    Workbook,
}

impl OutputFormat {
    /// Parses a directive string, failing closed to `CsvDirectory` with a
    /// logged diagnostic on unrecognized input.
    pub fn from_directive(directive: &str) -> Self {
        match directive {
            "csv" | "csv-directory" => Self::CsvDirectory,
            "workbook" | "xlsx" => Self::Workbook,
            other => {
                warn!("unrecognized format directive {other:?}, falling back to \"csv-directory\"");
                Self::CsvDirectory
            }
        }
    }
}

/// A fully laid out table, ready for a writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Renders the flattened structure into ordered tables.
///
/// Emission order is explicit: the `level1` single-column table first, then
/// the indexed objectives table (unless excluded), then ordinary sheets in
/// ascending name order. Within an ordinary sheet the `"Values"` bucket
/// comes first; the remaining buckets follow in ascending key order under a
/// global sort, else in discovery order. Sheet names are sanitized and
/// de-collided before they become artifact names.
#[instrument(level = "debug", skip(flattened))]
pub fn build_tables(
    flattened: &FlattenedSheet,
    sort: SortOrder,
    include_objectives: bool,
) -> Vec<SheetTable> {
    let mut registry = SheetNameRegistry::default();
    let mut tables = Vec::new();

    if !flattened.level1.is_empty() {
        let mut values = flattened.level1.clone();
        sort_values(&mut values, sort);
        tables.push(SheetTable {
            name: registry.assign("level1"),
            columns: vec![DEFAULT_COLUMN.to_string()],
            rows: values.into_iter().map(|v| vec![v]).collect(),
        });
    }

    if include_objectives && !flattened.objectives.is_empty() {
        // Row index doubles as the reference used by ordinary rows; never
        // reordered.
        tables.push(SheetTable {
            name: registry.assign(OBJECTIVES_SHEET),
            columns: vec!["Index".to_string(), "Learning Objective".to_string()],
            rows: flattened
                .objectives
                .iter()
                .enumerate()
                .map(|(i, text)| vec![i.to_string(), text.clone()])
                .collect(),
        });
    }

    let mut ordered: Vec<_> = flattened.sheets().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    for sheet in ordered {
        let mut buckets: Vec<&ColumnBucket> = sheet.columns.iter().collect();
        if sort != SortOrder::None {
            buckets.sort_by(|a, b| a.name.cmp(&b.name));
        }
        // The default bucket always leads.
        if let Some(pos) = buckets.iter().position(|b| b.name == DEFAULT_COLUMN) {
            let values = buckets.remove(pos);
            buckets.insert(0, values);
        }

        tables.push(layout_sheet(
            registry.assign(&sheet.name),
            &buckets,
            sort,
            include_objectives,
        ));
    }

    debug!(tables = tables.len(), "logical layout built");
    tables
}

/// Lays one sheet's buckets out side by side, padding shorter buckets with
/// empty cells.
fn layout_sheet(
    name: String,
    buckets: &[&ColumnBucket],
    sort: SortOrder,
    include_objectives: bool,
) -> SheetTable {
    struct BucketLayout<'a> {
        rows: Vec<&'a crate::flatten::RowRecord>,
        with_grouping: bool,
        with_objectives: bool,
    }

    let mut columns = Vec::new();
    let mut layouts = Vec::new();
    for bucket in buckets {
        let mut rows: Vec<_> = bucket.rows.iter().collect();
        match sort {
            SortOrder::None => {}
            SortOrder::Ascending => rows.sort_by(|a, b| a.value.cmp(&b.value)),
            SortOrder::Descending => rows.sort_by(|a, b| b.value.cmp(&a.value)),
        }
        let with_grouping = rows.iter().any(|r| r.grouping.is_some());
        let with_objectives =
            include_objectives && rows.iter().any(|r| r.learning_objectives.is_some());

        columns.push(bucket.name.clone());
        if with_grouping {
            columns.push("Grouping".to_string());
        }
        if with_objectives {
            columns.push(OBJECTIVES_SHEET.to_string());
        }
        layouts.push(BucketLayout {
            rows,
            with_grouping,
            with_objectives,
        });
    }

    let height = layouts.iter().map(|l| l.rows.len()).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(height);
    for i in 0..height {
        let mut cells = Vec::with_capacity(columns.len());
        for layout in &layouts {
            let row = layout.rows.get(i);
            cells.push(row.map(|r| r.value.clone()).unwrap_or_default());
            if layout.with_grouping {
                cells.push(
                    row.and_then(|r| r.grouping.clone()).unwrap_or_default(),
                );
            }
            if layout.with_objectives {
                cells.push(
                    row.and_then(|r| r.learning_objectives.clone())
                        .unwrap_or_default(),
                );
            }
        }
        rows.push(cells);
    }

    SheetTable {
        name,
        columns,
        rows,
    }
}

fn sort_values(values: &mut [String], sort: SortOrder) {
    match sort {
        SortOrder::None => {}
        SortOrder::Ascending => values.sort(),
        SortOrder::Descending => {
            values.sort();
            values.reverse();
        }
    }
}

/// Replaces filesystem/spreadsheet-unsafe characters (`<>:"/\|?*`, control
/// characters, whitespace) with underscores, collapsing runs into a single
/// one.
pub fn sanitize_name(raw: &str) -> String {
    const UNSAFE: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let mut sanitized = String::with_capacity(raw.len());
    let mut pending_underscore = false;
    for ch in raw.chars() {
        if UNSAFE.contains(&ch) || ch.is_control() || ch.is_whitespace() {
            pending_underscore = !sanitized.is_empty();
        } else {
            if pending_underscore {
                sanitized.push('_');
                pending_underscore = false;
            }
            sanitized.push(ch);
        }
    }

    if sanitized.is_empty() {
        "Sheet".to_string()
    } else {
        sanitized
    }
}

/// Hands out unique sanitized sheet names, resolving collisions after
/// truncation with a numeric suffix.
#[derive(Debug, Default)]
struct SheetNameRegistry {
    used: HashSet<String>,
}

impl SheetNameRegistry {
    fn assign(&mut self, raw: &str) -> String {
        let base = crate::flatten::truncate_name(&sanitize_name(raw), MAX_SHEET_NAME_LEN);
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            let candidate = format!("{}{suffix}", crate::flatten::truncate_name(&base, keep));
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Writes one CSV file per table into `dir`, creating it as needed.
#[instrument(level = "debug", skip(tables))]
pub fn write_csv_directory(dir: &Path, tables: &[SheetTable]) -> EmitResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{}.csv", table.name));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        written.push(path);
    }
    Ok(written)
}

/// Writes all tables as worksheets of a single workbook at `path`.
#[instrument(level = "debug", skip(tables))]
pub fn write_workbook(path: &Path, tables: &[SheetTable]) -> EmitResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }
        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Emits the flattened structure under `out_dir`, named after the subtree
/// root's display title. Returns the artifact path (directory in CSV mode,
/// file in workbook mode).
#[instrument(level = "debug", skip(flattened))]
pub fn emit(
    out_dir: &Path,
    artifact_name: &str,
    flattened: &FlattenedSheet,
    sort: SortOrder,
    include_objectives: bool,
    format: OutputFormat,
) -> EmitResult<PathBuf> {
    let tables = build_tables(flattened, sort, include_objectives);
    let name = sanitize_name(artifact_name);

    match format {
        OutputFormat::CsvDirectory => {
            let dir = out_dir.join(name);
            write_csv_directory(&dir, &tables)?;
            Ok(dir)
        }
        OutputFormat::Workbook => {
            let path = out_dir.join(format!("{name}.xlsx"));
            write_workbook(&path, &tables)?;
            Ok(path)
        }
    }
}
