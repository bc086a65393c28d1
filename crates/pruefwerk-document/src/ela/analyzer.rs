// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-level manipulation detection: ELA → threshold → opening → regions,
// with the colour-band detector run over the ELA map as a second opinion.

use image::RgbImage;
use pruefwerk_core::cancel::CancellationToken;
use pruefwerk_core::config::AnalysisConfig;
use pruefwerk_core::error::{ForensicsError, Result};
use pruefwerk_core::{ManipulationSummary, PageVerdict, SuspiciousRegion};
use tracing::{debug, info, instrument, warn};

use super::engine::{ElaMap, compute_ela};
use super::highlight::detect_highlighted_areas;
use super::mask::{DeviationMask, clean, threshold};
use super::regions::extract_regions;
use crate::image::compose::side_by_side;
use crate::image::processor::encode_png;
use crate::render::{PageRasterizer, RenderedPage};

/// Everything the detector produced for one page.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub regions: Vec<SuspiciousRegion>,
    /// Regions flagged by the colour-band detector on the ELA map.
    pub highlight_regions: Vec<SuspiciousRegion>,
    pub ela: ElaMap,
    pub deviation_mask: DeviationMask,
    pub cleaned_mask: DeviationMask,
    /// Copy of the page with every region outlined.
    pub annotated: RgbImage,
}

impl PageAnalysis {
    pub fn verdict(&self, page: usize) -> PageVerdict {
        PageVerdict::Analyzed {
            page,
            regions: self.regions.clone(),
            highlight_regions: self.highlight_regions.clone(),
            max_error_level: self.ela.max_diff(),
        }
    }

    /// `original | annotated` preview at a common height.
    pub fn comparison(&self, original: &RgbImage) -> Result<RgbImage> {
        side_by_side(original, &self.annotated)
    }

    /// The annotated page as PNG bytes, for the request layer to serve.
    pub fn annotated_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.annotated)
    }
}

/// Result for one page of a document.
#[derive(Debug)]
pub enum PageOutcome {
    Analyzed { page: usize, analysis: PageAnalysis },
    /// The page could not be analysed; other pages are unaffected.
    Failed { page: usize, error: ForensicsError },
}

impl PageOutcome {
    pub fn page(&self) -> usize {
        match self {
            Self::Analyzed { page, .. } | Self::Failed { page, .. } => *page,
        }
    }

    pub fn verdict(&self) -> PageVerdict {
        match self {
            Self::Analyzed { page, analysis } => analysis.verdict(*page),
            Self::Failed { page, error } => PageVerdict::Failed {
                page: *page,
                reason: error.to_string(),
            },
        }
    }
}

/// Manipulation-detection result for a whole document, pages in order.
#[derive(Debug, Default)]
pub struct ManipulationReport {
    pub pages: Vec<PageOutcome>,
}

impl ManipulationReport {
    /// Every page was analysed and none has a suspicious region.
    pub fn is_clean(&self) -> bool {
        self.pages.iter().all(|outcome| match outcome {
            PageOutcome::Analyzed { analysis, .. } => analysis.regions.is_empty(),
            PageOutcome::Failed { .. } => false,
        })
    }

    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|outcome| matches!(outcome, PageOutcome::Failed { .. }))
            .map(PageOutcome::page)
            .collect()
    }

    pub fn suspicious_region_count(&self) -> usize {
        self.pages
            .iter()
            .map(|outcome| match outcome {
                PageOutcome::Analyzed { analysis, .. } => analysis.regions.len(),
                PageOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Serialisable form, without the images.
    pub fn summary(&self) -> ManipulationSummary {
        ManipulationSummary {
            pages: self.pages.iter().map(PageOutcome::verdict).collect(),
        }
    }
}

/// Runs the manipulation detector with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ForensicAnalyzer {
    config: AnalysisConfig,
}

impl ForensicAnalyzer {
    /// Validate `config` and build an analyser around it.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// A token carrying the configured request budget, if any.
    pub fn request_token(&self) -> CancellationToken {
        CancellationToken::from_timeout(self.config.timeout())
    }

    /// Analyse a single page image.
    #[instrument(skip(self, page), fields(width = page.width(), height = page.height()))]
    pub fn analyze_page(&self, page: &RgbImage) -> Result<PageAnalysis> {
        let config = &self.config;
        let ela = compute_ela(page, config.ela_quality)?;
        let deviation_mask = threshold(&ela, config.deviation_threshold);
        let cleaned_mask = clean(&deviation_mask, config.kernel_radius);
        let (regions, annotated) = extract_regions(page, &cleaned_mask, config.min_area)?;

        let (highlight_regions, _) = detect_highlighted_areas(
            ela.as_rgb(),
            &config.highlight,
            config.kernel_radius,
            config.min_area,
        )?;
        debug!(
            deviation_coverage = deviation_mask.coverage(),
            cleaned_coverage = cleaned_mask.coverage(),
            highlights = highlight_regions.len(),
            "Page masks built"
        );

        Ok(PageAnalysis {
            regions,
            highlight_regions,
            ela,
            deviation_mask,
            cleaned_mask,
            annotated,
        })
    }

    /// Analyse already rasterised pages. A page that failed to rasterise or
    /// to analyse is recorded and the rest still run; cancellation aborts
    /// the whole batch.
    pub fn analyze_pages(
        &self,
        pages: Vec<RenderedPage>,
        cancel: &CancellationToken,
    ) -> Result<ManipulationReport> {
        let mut outcomes = Vec::with_capacity(pages.len());
        for RenderedPage { index, image } in pages {
            cancel.check()?;
            let outcome = match image.and_then(|image| self.analyze_page(&image)) {
                Ok(analysis) => PageOutcome::Analyzed {
                    page: index,
                    analysis,
                },
                Err(error) => {
                    warn!(page = index, %error, "Page analysis failed");
                    PageOutcome::Failed { page: index, error }
                }
            };
            outcomes.push(outcome);
        }
        Ok(ManipulationReport { pages: outcomes })
    }

    /// Rasterise `pdf_bytes` and analyse every page.
    ///
    /// Rasterisation failure and cancellation are errors; per-page failures
    /// are reported inside the returned report.
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len(), dpi = self.config.render.dpi))]
    pub fn analyze_pdf(
        &self,
        pdf_bytes: &[u8],
        rasterizer: &dyn PageRasterizer,
        cancel: &CancellationToken,
    ) -> Result<ManipulationReport> {
        cancel.check()?;
        let pages = rasterizer.render_pages(pdf_bytes, &self.config.render, cancel)?;
        debug!(pages = pages.len(), "Document rasterised");

        let report = self.analyze_pages(pages, cancel)?;
        info!(
            pages = report.pages.len(),
            failed = report.failed_pages().len(),
            regions = report.suspicious_region_count(),
            "Manipulation analysis complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pruefwerk_core::RenderOptions;

    use crate::render::EmbeddedImageRasterizer;
    use crate::render::tests::{jpeg_xobject, paged_pdf};

    /// Hands back a fixed set of pages, or a fixed error.
    struct StubRasterizer(std::result::Result<Vec<RgbImage>, String>);

    impl PageRasterizer for StubRasterizer {
        fn render_pages(
            &self,
            _pdf_bytes: &[u8],
            _options: &RenderOptions,
            _cancel: &CancellationToken,
        ) -> Result<Vec<RenderedPage>> {
            match &self.0 {
                Ok(images) => Ok(images
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, image)| RenderedPage::rendered(index, image))
                    .collect()),
                Err(reason) => Err(ForensicsError::Rasterization(reason.clone())),
            }
        }
    }

    /// Mid-grey survives JPEG exactly, so a flat grey page has zero error.
    fn flat_page() -> RgbImage {
        RgbImage::from_pixel(64, 64, Rgb([128, 128, 128]))
    }

    fn noisy_page() -> RgbImage {
        let mut page = RgbImage::from_pixel(96, 96, Rgb([128, 128, 128]));
        let mut state = 0x2545_f491u32;
        for y in 30..70 {
            for x in 20..60 {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let [r, g, b, _] = state.to_le_bytes();
                page.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
        page
    }

    #[test]
    fn flat_page_has_no_regions() {
        let analysis = ForensicAnalyzer::default().analyze_page(&flat_page()).unwrap();
        assert_eq!(analysis.ela.max_diff(), 0);
        assert!(analysis.regions.is_empty());
        assert!(analysis.highlight_regions.is_empty());
        assert_eq!(analysis.annotated, flat_page());
        assert_eq!(analysis.deviation_mask.foreground_count(), 0);
    }

    #[test]
    fn page_artifacts_share_dimensions() {
        let page = noisy_page();
        let analysis = ForensicAnalyzer::default().analyze_page(&page).unwrap();
        assert_eq!(analysis.ela.as_rgb().dimensions(), page.dimensions());
        assert_eq!(analysis.deviation_mask.dimensions(), page.dimensions());
        assert_eq!(analysis.cleaned_mask.dimensions(), page.dimensions());
        assert_eq!(analysis.annotated.dimensions(), page.dimensions());
        assert!(analysis.ela.max_diff() > 0);
        for region in analysis.regions.iter().chain(&analysis.highlight_regions) {
            assert!(region.fits_within(page.width(), page.height()));
            assert!(region.area > 50);
        }
        assert_eq!(analysis.regions.is_empty(), analysis.annotated == page);
    }

    #[test]
    fn comparison_is_twice_as_wide() {
        let page = flat_page();
        let analysis = ForensicAnalyzer::default().analyze_page(&page).unwrap();
        let preview = analysis.comparison(&page).unwrap();
        assert_eq!(preview.dimensions(), (128, 64));
    }

    #[test]
    fn annotated_png_decodes_back() {
        let page = flat_page();
        let analysis = ForensicAnalyzer::default().analyze_page(&page).unwrap();
        let png = analysis.annotated_png().unwrap();
        assert_eq!(crate::image::processor::decode_rgb(&png).unwrap(), page);
    }

    #[test]
    fn page_without_image_is_not_clean() {
        let pdf = paged_pdf(vec![Some(jpeg_xobject(64, 48)), None]);
        let report = ForensicAnalyzer::default()
            .analyze_pdf(&pdf, &EmbeddedImageRasterizer, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.pages.len(), 2);
        assert!(matches!(report.pages[0], PageOutcome::Analyzed { page: 0, .. }));
        assert_eq!(report.failed_pages(), vec![1]);
        assert!(!report.is_clean());
        assert!(matches!(
            &report.summary().pages[1],
            PageVerdict::Failed { page: 1, .. }
        ));
    }

    #[test]
    fn empty_page_is_an_invalid_image() {
        let err = ForensicAnalyzer::default()
            .analyze_page(&RgbImage::new(0, 10))
            .unwrap_err();
        assert!(matches!(err, ForensicsError::InvalidImage { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AnalysisConfig {
            ela_quality: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            ForensicAnalyzer::new(config),
            Err(ForensicsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn failing_page_does_not_sink_the_document() {
        let rasterizer = StubRasterizer(Ok(vec![flat_page(), RgbImage::new(0, 0), flat_page()]));
        let report = ForensicAnalyzer::default()
            .analyze_pdf(b"%PDF", &rasterizer, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.pages.len(), 3);
        assert_eq!(report.failed_pages(), vec![1]);
        assert!(matches!(report.pages[0], PageOutcome::Analyzed { page: 0, .. }));
        assert!(matches!(report.pages[2], PageOutcome::Analyzed { page: 2, .. }));
        assert!(!report.is_clean());

        let summary = report.summary();
        assert_eq!(summary.suspicious_region_count(), 0);
        assert!(matches!(&summary.pages[1], PageVerdict::Failed { page: 1, reason } if reason.contains("invalid image")));
    }

    #[test]
    fn clean_document_is_clean() {
        let rasterizer = StubRasterizer(Ok(vec![flat_page(), flat_page()]));
        let report = ForensicAnalyzer::default()
            .analyze_pdf(b"%PDF", &rasterizer, &CancellationToken::new())
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.suspicious_region_count(), 0);
    }

    #[test]
    fn rasterization_failure_is_fatal() {
        let rasterizer = StubRasterizer(Err("no pages".into()));
        let err = ForensicAnalyzer::default()
            .analyze_pdf(b"%PDF", &rasterizer, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ForensicsError::Rasterization(_)));
    }

    #[test]
    fn cancelled_request_stops() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rasterizer = StubRasterizer(Ok(vec![flat_page()]));
        let err = ForensicAnalyzer::default()
            .analyze_pdf(b"%PDF", &rasterizer, &cancel)
            .unwrap_err();
        assert!(matches!(err, ForensicsError::Cancelled));
    }

    #[test]
    fn request_token_follows_timeout() {
        let analyzer = ForensicAnalyzer::new(AnalysisConfig {
            timeout_secs: Some(60),
            ..AnalysisConfig::default()
        })
        .unwrap();
        assert!(analyzer.request_token().remaining().is_some());
        assert!(ForensicAnalyzer::default().request_token().remaining().is_none());
    }
}
