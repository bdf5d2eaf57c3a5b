//! `bilancio classify`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use bilancio_core::{ClassificationPipeline, ClassificationReport, PipelineOptions};
use bilancio_import::{CsvOptions, load_taxonomy, read_path};
use bilancio_shared::{AppConfig, AppError};
use rust_decimal::Decimal;

/// Arguments of the classify command.
#[derive(Debug, Clone)]
pub struct ClassifyArgs {
    pub input: PathBuf,
    pub schema: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub compact: bool,
    pub tolerance: Option<Decimal>,
}

pub fn run(config: &AppConfig, args: &ClassifyArgs) -> anyhow::Result<()> {
    let schema = args
        .schema
        .as_deref()
        .or(config.classifier.schema_path.as_deref());
    let taxonomy = load_taxonomy(schema).map_err(AppError::from)?;
    let batch = read_path(&args.input, &CsvOptions::from(&config.import)).map_err(AppError::from)?;

    for skipped in &batch.skipped {
        eprintln!("warning: line {}: {}", skipped.line, skipped.reason);
    }

    let mut options = PipelineOptions::from(&config.classifier);
    if let Some(tolerance) = args.tolerance {
        options.tolerance = tolerance;
    }
    let report = ClassificationPipeline::new(options).run(&taxonomy, &batch.records);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            write_report(BufWriter::new(file), &report, args.compact)?;
        }
        None => write_report(io::stdout().lock(), &report, args.compact)?,
    }

    eprint!("{}", summary(&report));
    Ok(())
}

fn write_report<W: Write>(
    mut writer: W,
    report: &ClassificationReport,
    compact: bool,
) -> anyhow::Result<()> {
    if compact {
        serde_json::to_writer(&mut writer, report)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, report)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn summary(report: &ClassificationReport) -> String {
    let s = report.summary();
    let mut lines = vec![
        format!("Taxonomy:     {}", report.taxonomy()),
        format!(
            "Records:      {} processed, {} unmatched, {} rejected",
            s.records_processed, s.records_unmatched, s.records_rejected
        ),
        format!("Assets:       {}", s.total_assets),
        format!("Liabilities:  {}", s.total_liabilities),
        format!("Equity:       {}", s.total_equity),
    ];
    if let Some(net) = s.net_result {
        lines.push(format!("Net result:   {net}"));
    }
    lines.push(format!(
        "Balanced:     {}",
        if s.is_balanced { "yes" } else { "no" }
    ));
    for issue in report.issues() {
        lines.push(format!(
            "  [{}] {}: expected {}, actual {} (delta {})",
            issue.severity, issue.rule, issue.expected, issue.actual, issue.delta
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
