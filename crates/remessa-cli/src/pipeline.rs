//! Batch pipeline with explicit stages.
//!
//! Both converters follow the same stages:
//! 1. **Ingest**: Read the input table and resolve canonical columns
//! 2. **Allocate**: Reserve sequence numbers for the whole batch (deposit only)
//! 3. **Build**: Turn every row into a fixed-width record
//! 4. **Output**: Write header and records in one go
//!
//! Every record is built in memory before anything is written, so a failing
//! row leaves no output file behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, info_span, trace};

use remessa_format::deposit::columns as deposit_col;
use remessa_format::nc::columns as nc_col;
use remessa_format::{
    DepositRecordBuilder, IssuerProfile, NcLayout, NcRecordBuilder, ParticipantRole, RecordFamily,
    RecordRow, build_deposit_header, count_records,
};
use remessa_ingest::{ColumnMap, FieldAliases, ReadOptions, deposit_fields, nc_fields, read_table};
use remessa_sequence::{AllocatorOptions, SequenceAllocator, SequenceError};

use crate::logging::redact_value;
use crate::types::{BatchKind, BatchResult, OutputSummary};

// ============================================================================
// Output encoding
// ============================================================================

/// Line separator written between records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Crlf,
    Lf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }
}

/// Join lines for output.
///
/// NC files end every line, the last included; deposit files only separate
/// lines and have no trailing terminator.
#[must_use]
pub fn render_lines(lines: &[String], ending: LineEnding, terminate_last: bool) -> String {
    let mut out = lines.join(ending.as_str());
    if terminate_last && !lines.is_empty() {
        out.push_str(ending.as_str());
    }
    out
}

/// Output file name stem: the input stem with spaces replaced by underscores.
fn clean_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_default()
}

/// `NC_<stem>.txt` next to the input.
#[must_use]
pub fn default_nc_output(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let dir = output_dir.map_or_else(|| parent_dir(input), Path::to_path_buf);
    dir.join(format!("NC_{}.txt", clean_stem(input)))
}

/// `DEP_<stem>_<ROLE>.txt` in `output_dir`.
#[must_use]
pub fn deposit_output(input: &Path, output_dir: &Path, role: ParticipantRole) -> PathBuf {
    output_dir.join(format!(
        "DEP_{}_{}.txt",
        clean_stem(input),
        role.label().to_uppercase()
    ))
}

/// Directory holding `input`, or the current directory for a bare file name.
#[must_use]
pub fn parent_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Read the input and return canonical rows.
pub fn ingest(input: &Path, read: ReadOptions, fields: &[FieldAliases]) -> Result<Vec<RecordRow>> {
    let table = read_table(input, read).with_context(|| format!("read {}", input.display()))?;
    let map = ColumnMap::resolve(&table, fields)?;
    debug!(resolved = map.len(), "columns resolved");
    Ok(table.records(&map))
}

// ============================================================================
// NC batch
// ============================================================================

/// Settings for one NC batch.
#[derive(Debug, Clone)]
pub struct NcOptions {
    pub layout: NcLayout,
    pub read: ReadOptions,
    /// Header file date and per-record registration date.
    pub date: NaiveDate,
    pub line_ending: LineEnding,
    pub profile: IssuerProfile,
}

impl NcOptions {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            layout: NcLayout::default(),
            read: ReadOptions::default(),
            date,
            line_ending: LineEnding::Crlf,
            profile: IssuerProfile::default(),
        }
    }
}

/// Convert an NC input sheet into `output`.
pub fn run_nc(input: &Path, output: &Path, options: &NcOptions) -> Result<BatchResult> {
    let span = info_span!("nc", input = %input.display(), layout = %options.layout);
    let _guard = span.enter();

    let rows = ingest(input, options.read, &nc_fields(options.layout))?;
    info!(rows = rows.len(), "building NC records");

    let builder = NcRecordBuilder::new(options.layout, options.profile.clone(), options.date);
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(builder.header(options.date).context("build NC header")?);
    for row in &rows {
        let record = builder
            .build(row)
            .with_context(|| format!("row {}", row.line()))?;
        trace!(
            line = row.line(),
            issuer = %redact_value(&row.get(nc_col::ISSUER_NAME).as_text()),
            cnpj = %redact_value(&row.get(nc_col::ISSUER_CNPJ).as_text()),
            "NC record built"
        );
        lines.push(record);
    }

    write_output(output, &render_lines(&lines, options.line_ending, true))?;
    info!(output = %output.display(), records = rows.len(), "NC file written");

    Ok(BatchResult {
        kind: BatchKind::Nc,
        input: input.to_path_buf(),
        rows: rows.len(),
        outputs: vec![OutputSummary {
            path: output.to_path_buf(),
            variant: options.layout.to_string(),
            records: rows.len(),
            sequence: None,
        }],
    })
}

// ============================================================================
// Deposit batch
// ============================================================================

/// Settings for one deposit batch.
#[derive(Debug, Clone)]
pub struct DepositOptions {
    /// One output file per role, numbered in this order.
    pub roles: Vec<ParticipantRole>,
    pub read: ReadOptions,
    /// Header date and sequence day.
    pub date: NaiveDate,
    pub line_ending: LineEnding,
    pub allocator: AllocatorOptions,
}

impl DepositOptions {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            roles: vec![ParticipantRole::Issuer],
            read: ReadOptions::default(),
            date,
            line_ending: LineEnding::Lf,
            allocator: AllocatorOptions::default(),
        }
    }
}

/// Convert a deposit input sheet into one file per role in `output_dir`.
///
/// Sequence state lives in `output_dir`. Each role reserves its numbers in a
/// single allocation, so a batch run for both roles gets two contiguous ranges.
pub fn run_deposit(input: &Path, output_dir: &Path, options: &DepositOptions) -> Result<BatchResult> {
    let span = info_span!("deposit", input = %input.display());
    let _guard = span.enter();

    let rows: Vec<RecordRow> = ingest(input, options.read, &deposit_fields())?
        .into_iter()
        .filter(|row| {
            let keep = !row.get(deposit_col::ASSET_CODE).is_blank();
            if !keep {
                debug!(line = row.line(), "skipping row without asset code");
            }
            keep
        })
        .collect();
    info!(rows = rows.len(), roles = options.roles.len(), "building deposit records");

    let allocator = SequenceAllocator::with_options(output_dir, options.allocator)
        .with_context(|| format!("open sequence state in {}", output_dir.display()))?;
    let day = options.date.format("%Y%m%d").to_string();
    let header = build_deposit_header(options.date).context("build deposit header")?;
    let count = u64::try_from(rows.len()).context("batch too large")?;

    let mut files = Vec::with_capacity(options.roles.len());
    for &role in &options.roles {
        let numbers = allocator
            .allocate(&day, count)
            .map_err(explain_sequence_error)
            .with_context(|| format!("allocate sequence numbers for {}", role.label()))?;
        let builder = DepositRecordBuilder::new(role);
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(header.clone());
        for (row, number) in rows.iter().zip(&numbers) {
            let record = builder
                .build(number, row)
                .with_context(|| format!("row {}", row.line()))?;
            lines.push(record);
        }
        let sequence = numbers.first().cloned().zip(numbers.last().cloned());
        files.push((role, lines, sequence));
    }

    let mut outputs = Vec::with_capacity(files.len());
    for (role, lines, sequence) in files {
        let path = deposit_output(input, output_dir, role);
        write_output(&path, &render_lines(&lines, options.line_ending, false))?;
        info!(
            output = %path.display(),
            role = role.label(),
            records = lines.len() - 1,
            "deposit file written"
        );
        outputs.push(OutputSummary {
            path,
            variant: role.label().to_string(),
            records: lines.len() - 1,
            sequence,
        });
    }

    Ok(BatchResult {
        kind: BatchKind::Deposit,
        input: input.to_path_buf(),
        rows: rows.len(),
        outputs,
    })
}

// ============================================================================
// Output
// ============================================================================

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("write {}", path.display()))
}

/// Attach the operator hint to an allocator error.
#[must_use]
pub fn explain_sequence_error(error: SequenceError) -> anyhow::Error {
    match error.suggestion() {
        Some(hint) => anyhow::anyhow!("{error}. {hint}"),
        None => error.into(),
    }
}

/// Count the records of `family` in a generated file.
pub fn count_file(path: &Path, family: RecordFamily) -> Result<usize> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(count_records(&String::from_utf8_lossy(&bytes), family))
}
