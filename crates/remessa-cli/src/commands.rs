use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

use remessa_cli::config::load_profile;
use remessa_cli::pipeline::{
    DepositOptions, LineEnding, NcOptions, count_file, default_nc_output, explain_sequence_error,
    parent_dir, run_deposit as deposit_batch, run_nc as nc_batch,
};
use remessa_cli::rewrite::rewrite_sale_file;
use remessa_cli::types::BatchResult;
use remessa_format::{NcLayout, ParticipantRole, RecordFamily};
use remessa_ingest::ReadOptions;
use remessa_sequence::{AllocatorOptions, SequenceAllocator};

use crate::cli::{
    CountArgs, DepositArgs, FamilyArg, InputArgs, LayoutArg, LineEndingArg, NcArgs, RewriteArgs,
    RoleArg, SequenceAction, SequenceArgs,
};
use crate::summary::print_sequence_state;

pub fn run_nc(args: &NcArgs) -> Result<BatchResult> {
    let input = &args.input.input;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_nc_output(input, None));
    let mut options = NcOptions::new(operation_date(&args.input));
    options.layout = match args.layout {
        LayoutArg::Legacy => NcLayout::Legacy,
        LayoutArg::Extended => NcLayout::Extended,
    };
    options.read = read_options(&args.input);
    options.line_ending = line_ending(args.input.line_ending, LineEnding::Crlf);
    options.profile = load_profile(args.config.as_deref())?;
    nc_batch(input, &output, &options)
}

pub fn run_deposit(args: &DepositArgs) -> Result<BatchResult> {
    let input = &args.input.input;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| parent_dir(input));
    let mut options = DepositOptions::new(operation_date(&args.input));
    options.roles = match args.role {
        RoleArg::Issuer => vec![ParticipantRole::Issuer],
        RoleArg::Distributor => vec![ParticipantRole::Distributor],
        RoleArg::Both => vec![ParticipantRole::Issuer, ParticipantRole::Distributor],
    };
    options.read = read_options(&args.input);
    options.line_ending = line_ending(args.input.line_ending, LineEnding::Lf);
    options.allocator = allocator_options(args.lock_timeout);
    deposit_batch(input, &output_dir, &options)
}

pub fn run_sequence(args: &SequenceArgs) -> Result<()> {
    let allocator =
        SequenceAllocator::with_options(&args.state_dir, allocator_options(args.lock_timeout))
            .map_err(explain_sequence_error)?;
    match &args.action {
        SequenceAction::Allocate { day, count } => {
            for number in allocator
                .allocate(day, *count)
                .map_err(explain_sequence_error)?
            {
                println!("{number}");
            }
        }
        SequenceAction::Reset { day } => {
            allocator.reset(day).map_err(explain_sequence_error)?;
            println!("Counter for {day} reset.");
        }
        SequenceAction::Show { day: Some(day) } => {
            let last = allocator
                .last_issued(day)
                .map_err(explain_sequence_error)?;
            println!("{day}: {last}");
        }
        SequenceAction::Show { day: None } => {
            let state = allocator.snapshot().map_err(explain_sequence_error)?;
            print_sequence_state(&state);
        }
        SequenceAction::Clear => {
            allocator.clear().map_err(explain_sequence_error)?;
            println!("Sequence state cleared in {}.", args.state_dir.display());
        }
    }
    Ok(())
}

pub fn run_count(args: &CountArgs) -> Result<()> {
    let family = match args.family {
        FamilyArg::Nc => RecordFamily::Nc,
        FamilyArg::Mda => RecordFamily::Mda,
    };
    let count = count_file(&args.file, family)?;
    info!(file = %args.file.display(), count, "records counted");
    println!("{count}");
    Ok(())
}

pub fn run_rewrite(args: &RewriteArgs) -> Result<()> {
    let output = rewrite_sale_file(&args.file, args.output.as_deref())
        .with_context(|| format!("rewrite {}", args.file.display()))?;
    println!("Purchase file: {}", output.display());
    Ok(())
}

fn operation_date(args: &InputArgs) -> NaiveDate {
    args.date.unwrap_or_else(|| Local::now().date_naive())
}

fn read_options(args: &InputArgs) -> ReadOptions {
    ReadOptions {
        sheet_index: args.sheet,
    }
}

fn line_ending(arg: Option<LineEndingArg>, default: LineEnding) -> LineEnding {
    match arg {
        Some(LineEndingArg::Crlf) => LineEnding::Crlf,
        Some(LineEndingArg::Lf) => LineEnding::Lf,
        None => default,
    }
}

fn allocator_options(lock_timeout_secs: u64) -> AllocatorOptions {
    AllocatorOptions {
        lock_timeout: Duration::from_secs(lock_timeout_secs),
        ..AllocatorOptions::default()
    }
}
