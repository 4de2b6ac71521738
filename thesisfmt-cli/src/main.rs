use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// Import from thesisfmt-core
use thesisfmt_core::fingerprint::{calculate_config_hash, calculate_package_hash};
use thesisfmt_core::{Analyzer, PipelineStages, Report, ReportEnvelope, StepProfiler, StyleGuideConfig};

// Import CLI utilities
use thesisfmt::{check_inputs, output_path_for, render, OutputFormat};

/// Exit code when a score falls below --fail-under
const EXIT_BELOW_THRESHOLD: i32 = 2;

#[derive(Parser)]
#[command(name = "thesisfmt")]
#[command(about = "Check .docx theses against an institutional formatting guide")]
struct Args {
    /// Path(s) to the .docx file(s) to check
    #[arg(short, long, num_args = 1.., required_unless_present = "show_config")]
    input: Vec<String>,

    /// Path to custom style guide config (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path, or directory when checking several inputs
    /// (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the effective style guide as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: package parts, Document, Segmentation, Evaluation and final result
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output (default: test_outputs/stages)
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Exit with status 2 when any compliance score is below this value
    #[arg(long)]
    fail_under: Option<f64>,

    /// Log pipeline progress (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("🎓 Thesis Format Checker");

    let config = StyleGuideConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default style guide");
    }

    if args.show_config {
        println!("\n{}", config.to_yaml()?);
        return Ok(());
    }

    let analyzer = Analyzer::new(config).context("Invalid style guide configuration")?;
    let config_hash = calculate_config_hash(analyzer.config())?;

    for input in &args.input {
        if !analyzer.loader().supports_file_type(Path::new(input)) {
            warn!("{input} does not look like a .docx file, trying anyway");
        }
    }

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        for input in &args.input {
            let bytes = std::fs::read(input).with_context(|| format!("Failed to read {input}"))?;
            match analyzer.capture_stages(&bytes) {
                Ok(stages) => {
                    let dir = stage_dir_for(&args.stages_dir, input, args.input.len());
                    save_stages(&stages, input, &dir)?;
                    println!("\n✅ All stages dumped to: {}", dir);
                }
                Err(e) => {
                    eprintln!("❌ Stage dump failed for {input}: {e}");
                    std::process::exit(1);
                }
            }
        }
        return Ok(());
    }

    // Profiling output is per stage, so keep it readable by running inputs in order
    let outcomes = check_inputs(&args.input, args.profile, |input| {
        check_one(&analyzer, input, &config_hash, args.profile)
    });

    let mut failed = false;
    let mut below_threshold = false;
    for (input, outcome) in outcomes {
        match outcome {
            Ok(envelope) => {
                let result = &envelope.report.result;
                println!(
                    "✅ {}: score {:.1} ({} violations in {} checks)",
                    input, result.compliance_score, result.violations, result.total_checks
                );
                if args
                    .fail_under
                    .is_some_and(|threshold| result.compliance_score < threshold)
                {
                    below_threshold = true;
                }
                save_report(&envelope, &input, &args)?;
            }
            Err(e) => {
                eprintln!("❌ Checking {input} failed: {e:#}");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    if below_threshold {
        println!(
            "⚠️  Score below --fail-under {:.1}",
            args.fail_under.unwrap_or_default()
        );
        std::process::exit(EXIT_BELOW_THRESHOLD);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn check_one(
    analyzer: &Analyzer,
    input: &str,
    config_hash: &str,
    profile: bool,
) -> Result<ReportEnvelope> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {input}"))?;
    let package_sha256 = calculate_package_hash(&bytes);

    let result = if profile {
        println!("📄 Profiling: {}", input);
        let mut profiler = StepProfiler::new(true);
        let result = analyzer.analyze_bytes_with_profiler(&bytes, &mut profiler)?;
        profiler.print_summary();
        result
    } else {
        analyzer.analyze_bytes(&bytes)?
    };

    Ok(ReportEnvelope::new(
        input,
        package_sha256,
        config_hash.to_string(),
        Report::new(result),
    ))
}

fn save_report(envelope: &ReportEnvelope, input: &str, args: &Args) -> Result<()> {
    let path = output_path_for(input, args.output.as_deref(), args.input.len(), args.format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, render(envelope, args.format)?)?;
    println!("💾 Report saved to: {}", path.display());
    Ok(())
}

fn stage_dir_for(stages_dir: &str, input: &str, input_count: usize) -> String {
    if input_count == 1 {
        return stages_dir.to_string();
    }
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    format!("{stages_dir}/{stem}")
}

fn save_stages(stages: &PipelineStages, input: &str, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1a: Raw package parts
    let parts_path = format!("{}/stage1a_parts.json", output_dir);
    fs::write(&parts_path, serde_json::to_string_pretty(&stages.parts)?)?;
    println!("  💾 {}", parts_path);

    // Stage 1b: Resolved document
    let doc_path = format!("{}/stage1b_document.json", output_dir);
    fs::write(&doc_path, serde_json::to_string_pretty(&stages.document)?)?;
    println!("  💾 {} ({} paragraphs)", doc_path, stages.document.paragraphs.len());

    // Stage 2: Zones and boundaries
    let seg_path = format!("{}/stage2_segmentation.json", output_dir);
    fs::write(&seg_path, serde_json::to_string_pretty(&stages.segmentation)?)?;
    println!("  💾 {} ({} boundaries)", seg_path, stages.segmentation.boundaries.len());

    // Stage 3: Raw evaluation
    let eval_path = format!("{}/stage3_evaluation.json", output_dir);
    fs::write(&eval_path, serde_json::to_string_pretty(&stages.evaluation)?)?;
    println!("  💾 {} ({} findings)", eval_path, stages.evaluation.findings.len());

    // Stage 4: Final result
    let result_path = format!("{}/stage4_result.json", output_dir);
    fs::write(&result_path, serde_json::to_string_pretty(&stages.result)?)?;
    println!("  💾 {} (score {:.1})", result_path, stages.result.compliance_score);

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "document_xml_bytes": stages.parts.document.len(),
            "paragraphs": stages.document.paragraphs.len(),
            "boundaries": stages.segmentation.boundaries.len(),
            "checks": stages.evaluation.checks_performed,
            "findings": stages.evaluation.findings.len(),
        },
        "compliance_score": stages.result.compliance_score,
    });
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}
