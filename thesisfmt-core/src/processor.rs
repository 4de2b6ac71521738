use crate::config::StyleGuideConfig;
use crate::error::{AnalyzeError, ConfigError};
use crate::loader::{DocxLoader, Loader, PackageParts};
use crate::rules::engine::{Evaluation, RuleEngine};
use crate::scoring::{aggregate, collect_statistics};
use crate::segmentation::{Segmentation, Segmenter};
use crate::types::*;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics: lets you inspect each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub parts: PackageParts,
    pub document: Document,
    pub segmentation: Segmentation,
    pub evaluation: Evaluation,
    pub result: AnalysisResult,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Loader → Segmenter → Evaluator → Aggregator
///
/// Holds no mutable state; one analyzer can serve several threads.
pub struct Analyzer {
    loader: Box<dyn Loader>,
    segmenter: Segmenter,
    engine: RuleEngine,
    config: StyleGuideConfig,
}

impl Analyzer {
    pub fn new(config: StyleGuideConfig) -> Result<Self, ConfigError> {
        Self::new_with_loader(Box::new(DocxLoader::new()), config)
    }

    /// Create Analyzer with an injected loader
    pub fn new_with_loader(
        loader: Box<dyn Loader>,
        config: StyleGuideConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            loader,
            segmenter: Segmenter::new(&config)?,
            engine: RuleEngine::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &StyleGuideConfig {
        &self.config
    }

    pub fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Check an already loaded document. Cannot fail: everything wrong with
    /// the document becomes a finding.
    pub fn analyze_document(&self, document: &Document) -> AnalysisResult {
        let segmentation = self.segmenter.segment(document);
        let evaluation = self.engine.evaluate(document, &segmentation);
        self.finish(document, segmentation, evaluation)
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisResult, AnalyzeError> {
        let document = self.loader.load(bytes)?;
        Ok(self.analyze_document(&document))
    }

    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisResult, AnalyzeError> {
        info!("Analyzing {} with {} loader", path.display(), self.loader.name());
        let document = self.loader.load_file(path)?;
        Ok(self.analyze_document(&document))
    }

    /// Same as [`Analyzer::analyze_bytes`], timing each stage
    pub fn analyze_bytes_with_profiler(
        &self,
        bytes: &[u8],
        profiler: &mut StepProfiler,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let parts = profiler.time_step("1. Package → Parts", || self.loader.read_package(bytes))?;
        let document = profiler.time_step("2. Parts → Document", || self.loader.parse_parts(&parts))?;
        let segmentation =
            profiler.time_step("3. Segmentation", || self.segmenter.segment(&document));
        let evaluation = profiler.time_step("4. Rule Evaluation", || {
            self.engine.evaluate(&document, &segmentation)
        });
        let result = profiler.time_step("5. Aggregation", || {
            self.finish(&document, segmentation, evaluation)
        });
        Ok(result)
    }

    /// Run the pipeline and capture all intermediate stage outputs
    /// Used for pipeline diagnostics and testing stage boundaries
    pub fn capture_stages(&self, bytes: &[u8]) -> Result<PipelineStages, AnalyzeError> {
        let parts = self.loader.read_package(bytes)?;
        println!(
            "📋 Stage 1a: package parts captured ({} bytes of document XML, {} footers)",
            parts.document.len(),
            parts.footers.len()
        );

        let document = self.loader.parse_parts(&parts)?;
        println!("📋 Stage 1b: {} paragraphs captured", document.paragraphs.len());

        let segmentation = self.segmenter.segment(&document);
        println!(
            "📋 Stage 2: zones captured ({} section boundaries)",
            segmentation.boundaries.len()
        );

        let evaluation = self.engine.evaluate(&document, &segmentation);
        println!(
            "📋 Stage 3: {} checks, {} findings captured",
            evaluation.checks_performed,
            evaluation.findings.len()
        );

        let result = self.finish(&document, segmentation.clone(), evaluation.clone());
        println!("📋 Stage 4: score {:.1}", result.compliance_score);

        Ok(PipelineStages {
            parts,
            document,
            segmentation,
            evaluation,
            result,
        })
    }

    fn finish(
        &self,
        document: &Document,
        segmentation: Segmentation,
        evaluation: Evaluation,
    ) -> AnalysisResult {
        let statistics = collect_statistics(document, &segmentation, self.engine.structural());
        let zone_counts = segmentation.zone_counts();
        aggregate(evaluation, segmentation.coverage, zone_counts, statistics)
    }
}
