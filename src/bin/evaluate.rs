use anyhow::Context;
use clap::Parser;
use shipmail_etl::core::evaluate::{evaluate, EvaluationReport};
use shipmail_etl::utils::logger;

#[derive(Parser)]
#[command(name = "evaluate")]
#[command(about = "Scores extraction output against a ground-truth file")]
struct Args {
    /// Path to the extraction output JSON array
    #[arg(long, default_value = "./output/output.json")]
    output: String,

    /// Path to the ground-truth JSON array
    #[arg(long, default_value = "./ground_truth.json")]
    truth: String,

    /// Write the per-field report to this CSV file as well
    #[arg(long)]
    report_csv: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let output = load_records(&args.output)?;
    let truth = load_records(&args.truth)?;
    tracing::info!(
        "📊 Scoring {} output records against {} truth records",
        output.len(),
        truth.len()
    );

    let report = evaluate(&output, &truth);
    tracing::debug!("Report generated at {}", report.generated_at);
    print_report(&report);

    if let Some(path) = &args.report_csv {
        write_csv_report(path, &report)?;
        println!("📁 CSV report saved to: {}", path);
    }

    Ok(())
}

fn load_records(path: &str) -> anyhow::Result<Vec<serde_json::Value>> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {} as a JSON array", path))
}

fn print_report(report: &EvaluationReport) {
    println!("Per-field accuracy:");
    for field in &report.fields {
        println!(
            "- {}: {:.2}% ({}/{})",
            field.field,
            field.percent(),
            field.correct,
            field.total
        );
    }
    println!(
        "Overall accuracy: {:.2}% ({}/{})",
        report.overall_percent(),
        report.correct_values,
        report.total_values
    );
}

fn write_csv_report(path: &str, report: &EvaluationReport) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path))?;
    writer.write_record(["field", "correct", "total", "accuracy_percent"])?;
    for field in &report.fields {
        let correct = field.correct.to_string();
        let total = field.total.to_string();
        let percent = format!("{:.2}", field.percent());
        writer.write_record([
            field.field.as_str(),
            correct.as_str(),
            total.as_str(),
            percent.as_str(),
        ])?;
    }
    let correct = report.correct_values.to_string();
    let total = report.total_values.to_string();
    let percent = format!("{:.2}", report.overall_percent());
    writer.write_record(["overall", correct.as_str(), total.as_str(), percent.as_str()])?;
    writer.flush()?;
    Ok(())
}
