//! Recovery driver: an ordered list of stages iterated until one succeeds.

use std::rc::Rc;

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::barcode::BarcodeReader;
use crate::models::config::RecoveryConfig;
use crate::ocr::{upscale, GlyphReader};
use crate::pdf::PageSource;

/// Where a tax identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    /// Labeled field in the document text.
    Label,
    /// Decoded barcode symbol.
    Barcode,
    /// Classified printed glyphs.
    Glyph,
    /// Digit run in the extracted text.
    Text,
    /// Digit pattern in the undecoded document bytes.
    RawBytes,
}

/// Result of running one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// A validated identifier.
    Found(String),
    /// Nothing found; continue with the next stage.
    Skip(String),
    /// Abandon the remaining stages.
    Stop(String),
}

/// Status recorded for a finished stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Found,
    Skipped,
    Stopped,
}

/// Diagnostic record of one stage run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub status: StageStatus,
    pub attempts: usize,
    pub detail: String,
}

/// Upper bound on decode attempts for one recovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    limit: usize,
    used: usize,
}

impl AttemptBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Consume one attempt; false once the budget is spent.
    pub fn try_take(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// What the pipeline searches.
#[derive(Clone, Copy)]
pub enum RecoveryInput<'a> {
    /// A loaded document.
    Document(&'a dyn PageSource),
    /// A standalone raster, e.g. a scan or a photo.
    Raster(&'a DynamicImage),
    /// Extracted text only.
    Text,
}

/// Shared state handed to each stage.
pub struct RecoveryContext<'a> {
    input: RecoveryInput<'a>,
    text: &'a str,
    config: &'a RecoveryConfig,
    barcode: &'a dyn BarcodeReader,
    glyphs: &'a GlyphReader,
    pub budget: AttemptBudget,
    page_image: Option<Option<Rc<DynamicImage>>>,
    artifacts: Option<Vec<(String, DynamicImage)>>,
}

impl<'a> RecoveryContext<'a> {
    pub fn new(
        input: RecoveryInput<'a>,
        config: &'a RecoveryConfig,
        barcode: &'a dyn BarcodeReader,
        glyphs: &'a GlyphReader,
    ) -> Self {
        Self {
            input,
            text: "",
            config,
            barcode,
            glyphs,
            budget: AttemptBudget::new(config.max_decode_attempts),
            page_image: None,
            artifacts: None,
        }
    }

    /// Text already extracted from the document.
    pub fn with_text(mut self, text: &'a str) -> Self {
        self.text = text;
        self
    }

    /// Keep intermediate rasters for inspection.
    pub fn with_artifacts(mut self, enabled: bool) -> Self {
        self.artifacts = enabled.then(Vec::new);
        self
    }

    pub fn input(&self) -> RecoveryInput<'a> {
        self.input
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn config(&self) -> &'a RecoveryConfig {
        self.config
    }

    pub fn barcode(&self) -> &'a dyn BarcodeReader {
        self.barcode
    }

    pub fn glyphs(&self) -> &'a GlyphReader {
        self.glyphs
    }

    /// Page raster prepared for scanning, upscaled when small.
    ///
    /// Computed once and shared by the page and glyph stages.
    pub fn page_image(&mut self) -> Option<Rc<DynamicImage>> {
        if self.page_image.is_none() {
            let prepared = self.load_page_image().map(Rc::new);
            if let Some(image) = &prepared {
                self.record_artifact("page_raster", image);
            }
            self.page_image = Some(prepared);
        }
        self.page_image.clone().flatten()
    }

    fn load_page_image(&self) -> Option<DynamicImage> {
        let raster = match self.input {
            RecoveryInput::Document(source) => source.page_raster()?,
            RecoveryInput::Raster(image) => image.clone(),
            RecoveryInput::Text => return None,
        };

        let (width, height) = raster.dimensions();
        if width < self.config.page_min_side || height < self.config.page_min_side {
            if let Some(upscaled) = upscale(
                &raster,
                self.config.page_upscale_factor,
                self.config.max_upscaled_pixels,
            ) {
                debug!(
                    "Upscaled page raster {}x{} to {}x{}",
                    width,
                    height,
                    upscaled.width(),
                    upscaled.height()
                );
                return Some(upscaled);
            }
        }
        Some(raster)
    }

    /// Keep a copy of an intermediate raster when artifacts are enabled.
    pub fn record_artifact(&mut self, name: impl Into<String>, image: &DynamicImage) {
        if let Some(artifacts) = &mut self.artifacts {
            artifacts.push((name.into(), image.clone()));
        }
    }

    pub fn take_artifacts(&mut self) -> Vec<(String, DynamicImage)> {
        self.artifacts.take().unwrap_or_default()
    }
}

/// One recovery stage.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Source tag for identifiers this stage finds.
    fn source(&self) -> IdentifierSource;

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome;
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryOutcome {
    pub identifier: Option<String>,
    pub source: Option<IdentifierSource>,
    pub reports: Vec<StageReport>,
    pub attempts: usize,
}

impl RecoveryOutcome {
    pub fn found(&self) -> bool {
        self.identifier.is_some()
    }
}

/// Ordered stage list with a single driver loop.
pub struct RecoveryPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl RecoveryPipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run stages in order until one finds an identifier or stops.
    pub fn run(&self, ctx: &mut RecoveryContext<'_>) -> RecoveryOutcome {
        let mut outcome = RecoveryOutcome::default();

        for stage in &self.stages {
            if ctx.budget.is_exhausted() {
                outcome.reports.push(StageReport {
                    stage: stage.name().to_string(),
                    status: StageStatus::Stopped,
                    attempts: 0,
                    detail: "attempt budget exhausted".to_string(),
                });
                break;
            }

            let before = ctx.budget.used();
            let result = stage.run(ctx);
            let attempts = ctx.budget.used() - before;

            let (status, detail) = match &result {
                StageOutcome::Found(id) => (StageStatus::Found, id.clone()),
                StageOutcome::Skip(reason) => (StageStatus::Skipped, reason.clone()),
                StageOutcome::Stop(reason) => (StageStatus::Stopped, reason.clone()),
            };
            debug!(stage = stage.name(), attempts, "{:?}: {}", status, detail);
            outcome.reports.push(StageReport {
                stage: stage.name().to_string(),
                status,
                attempts,
                detail,
            });

            match result {
                StageOutcome::Found(id) => {
                    info!("Recovered tax identifier via {}", stage.name());
                    outcome.identifier = Some(id);
                    outcome.source = Some(stage.source());
                    break;
                }
                StageOutcome::Skip(_) => continue,
                StageOutcome::Stop(_) => break,
            }
        }

        outcome.attempts = ctx.budget.used();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::barcode::Symbology;
    use image::GrayImage;
    use pretty_assertions::assert_eq;

    struct NoBarcode;

    impl BarcodeReader for NoBarcode {
        fn decode(&self, _: &GrayImage, _: Symbology) -> Option<String> {
            None
        }
    }

    struct Fixed(&'static str, StageOutcome, usize);

    impl Stage for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn source(&self) -> IdentifierSource {
            IdentifierSource::Text
        }

        fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
            for _ in 0..self.2 {
                ctx.budget.try_take();
            }
            self.1.clone()
        }
    }

    fn run(pipeline: &RecoveryPipeline, max_attempts: usize) -> RecoveryOutcome {
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        let config = RecoveryConfig {
            max_decode_attempts: max_attempts,
            ..Default::default()
        };
        let glyphs = GlyphReader::default();
        let mut ctx = RecoveryContext::new(RecoveryInput::Raster(&image), &config, &NoBarcode, &glyphs);
        pipeline.run(&mut ctx)
    }

    #[test]
    fn test_first_found_short_circuits() {
        let pipeline = RecoveryPipeline::new(vec![
            Box::new(Fixed("a", StageOutcome::Skip("none".into()), 2)),
            Box::new(Fixed("b", StageOutcome::Found("1222153986".into()), 1)),
            Box::new(Fixed("c", StageOutcome::Found("8589706200".into()), 1)),
        ]);
        let outcome = run(&pipeline, 100);

        assert_eq!(outcome.identifier.as_deref(), Some("1222153986"));
        assert_eq!(outcome.source, Some(IdentifierSource::Text));
        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.reports[0].attempts, 2);
        assert_eq!(outcome.attempts, 3);
    }

    #[test]
    fn test_stop_ends_the_run() {
        let pipeline = RecoveryPipeline::new(vec![
            Box::new(Fixed("a", StageOutcome::Stop("broken".into()), 0)),
            Box::new(Fixed("b", StageOutcome::Found("1222153986".into()), 0)),
        ]);
        let outcome = run(&pipeline, 100);

        assert!(!outcome.found());
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].status, StageStatus::Stopped);
    }

    #[test]
    fn test_exhausted_budget_stops_before_next_stage() {
        let pipeline = RecoveryPipeline::new(vec![
            Box::new(Fixed("a", StageOutcome::Skip("none".into()), 5)),
            Box::new(Fixed("b", StageOutcome::Found("1222153986".into()), 0)),
        ]);
        let outcome = run(&pipeline, 3);

        assert!(!outcome.found());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.reports[1].status, StageStatus::Stopped);
        assert_eq!(outcome.reports[1].stage, "b");
    }

    #[test]
    fn test_budget_counts_attempts() {
        let mut budget = AttemptBudget::new(2);
        assert!(budget.try_take());
        assert!(budget.try_take());
        assert!(!budget.try_take());
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 2);
    }
}
