use std::time::Instant;

use anyhow::Result;
use tracing::{info, info_span, warn};

use bids_model::ConvertOptions;
use bids_validate::write_validation_report_json;

use crate::bids_validator::run_bids_validator;
use crate::cli::ConvertArgs;
use crate::pipeline::{emit, normalize, parse_study, validate};
use crate::types::{ConvertResult, TaskSummary};
use crate::writer::write_artifacts;

/// The BIDS dataset itself lives under this subdirectory of the output
/// folder, next to the validation report.
pub const DATASET_SUBDIR: &str = "rawdata";

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertResult> {
    let start = Instant::now();
    let options = ConvertOptions::new()
        .with_missing_value_text(args.missing_value.clone())
        .with_missing_value_code(args.missing_code)
        .with_anonymize(args.anonymize);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.study_folder.join("bids"));

    let convert_span = info_span!("convert", study_folder = %args.study_folder.display());
    let _convert_guard = convert_span.enter();

    let parsed = parse_study(&args.study_folder)?;
    let mut report = validate(&parsed, &options);

    let normalized = normalize(&parsed, &options);
    report.extend(normalized.issues.iter().cloned());

    let mut artifact_count = 0;
    let mut validator = None;
    let emitted = !report.has_errors();
    if emitted {
        let mut emit_result = emit(&parsed, &normalized, &options);
        report.extend(emit_result.issues.drain(..));
        artifact_count = emit_result.artifacts.len();
        if !args.dry_run {
            let dataset_root = output_dir.join(DATASET_SUBDIR);
            write_artifacts(&dataset_root, &emit_result.artifacts)?;
            if !args.skip_bids_validator {
                validator = Some(run_bids_validator(&dataset_root));
            }
        }
    } else {
        warn!(
            error_count = report.error_count(),
            "validation errors found; no output emitted"
        );
    }

    let report_path = if args.dry_run {
        None
    } else {
        Some(write_validation_report_json(
            &output_dir,
            &parsed.dataset.study_name,
            &report,
        )?)
    };

    let tasks = parsed
        .dataset
        .tasks
        .iter()
        .zip(&normalized.task_rows)
        .map(|(task, rows)| TaskSummary {
            name: task.name.as_str().to_string(),
            item_count: task.items.len(),
            row_count: rows.len(),
        })
        .collect();

    info!(
        emitted,
        artifact_count,
        error_count = report.error_count(),
        warning_count = report.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "conversion finished"
    );
    Ok(ConvertResult {
        study_name: parsed.dataset.study_name,
        output_dir,
        emitted,
        dry_run: args.dry_run,
        artifact_count,
        tasks,
        report,
        report_path,
        validator,
    })
}
