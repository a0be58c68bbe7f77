//! Character-level transformation pipeline
//!
//! Each non-blank run of a paragraph is replaced by one run per character.
//! Every character gets a typeface that can render it, and, depending on
//! the settings, a jittered size and a vertical offset combining the
//! handwriting tilt with a small random-walk displacement. Line spacing
//! and indentation are decided once per paragraph.
//!
//! Generator state never crosses a paragraph boundary: each paragraph or
//! table-cell paragraph starts from a fresh [`ParagraphState`].

pub mod error;
pub mod report;
pub mod settings;

pub use error::{ConversionError, MIN_TYPEFACES};
pub use report::ConversionReport;
pub use settings::RandomizationSettings;

use crate::document::{apply_best_effort, Document, Paragraph, Run};
use crate::fonts::GlyphCoverageIndex;
use crate::jitter::indent::MIN_INDENT_SPACES;
use crate::jitter::{
    CharacterPositionJitter, CharacterSizeJitter, HandwritingTiltSimulator, IndentGenerator,
    LineSpacingGenerator,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, info};

/// Offsets smaller than this (in points) are not worth applying
pub const MIN_VISIBLE_OFFSET_PT: f64 = 0.1;

/// Generators whose state lives for exactly one paragraph
#[derive(Debug, Clone)]
pub struct ParagraphState {
    pub tilt: HandwritingTiltSimulator,
    pub size: CharacterSizeJitter,
    pub position: CharacterPositionJitter,
}

impl ParagraphState {
    pub fn new(settings: &RandomizationSettings) -> Self {
        Self {
            tilt: HandwritingTiltSimulator::new(),
            size: CharacterSizeJitter::new(settings.char_size_strength),
            position: CharacterPositionJitter::new(),
        }
    }
}

/// Applies the randomization effects to documents using one typeface pool
/// and one random source
pub struct Transformer<'a, R = StdRng> {
    index: &'a GlyphCoverageIndex,
    settings: RandomizationSettings,
    rng: R,
}

impl<'a> Transformer<'a, StdRng> {
    /// Reproducible when `seed` is given, otherwise seeded from entropy
    pub fn seeded(
        index: &'a GlyphCoverageIndex,
        settings: RandomizationSettings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(index, settings, rng)
    }
}

impl<'a, R: Rng> Transformer<'a, R> {
    pub fn new(index: &'a GlyphCoverageIndex, settings: RandomizationSettings, rng: R) -> Self {
        Self {
            index,
            settings,
            rng,
        }
    }

    /// Refuse to run with fewer than [`MIN_TYPEFACES`] typefaces
    pub fn check_preconditions(&self) -> Result<(), ConversionError> {
        let loaded = self.index.typeface_count();
        if loaded < MIN_TYPEFACES {
            return Err(ConversionError::InsufficientTypefaces { loaded });
        }
        Ok(())
    }

    /// Transform every paragraph of `document` in place
    pub fn transform(&mut self, document: &mut Document) -> Result<ConversionReport, ConversionError> {
        self.transform_with_progress(document, |_| {})
    }

    /// Like [`Transformer::transform`], calling `on_paragraph` with the
    /// ordinal of each paragraph once it is done
    pub fn transform_with_progress<F>(
        &mut self,
        document: &mut Document,
        mut on_paragraph: F,
    ) -> Result<ConversionReport, ConversionError>
    where
        F: FnMut(usize),
    {
        self.check_preconditions()?;

        let mut report = ConversionReport::new(self.settings);
        let mut spacing = LineSpacingGenerator::new(self.settings.line_spacing_strength);
        let indent = IndentGenerator::new(self.settings.indent_strength);
        if self.settings.line_spacing_enabled {
            let (min, max) = spacing.bounds();
            debug!("Line spacing between {:.2} and {:.2}", min, max);
        }
        if self.settings.indent_enabled {
            debug!(
                "Indentation of {} to {} spaces",
                MIN_INDENT_SPACES,
                indent.max_spaces()
            );
        }

        for (ordinal, paragraph) in document.paragraphs_mut().into_iter().enumerate() {
            self.transform_paragraph(paragraph, ordinal, &mut spacing, &indent, &mut report);
            on_paragraph(ordinal);
        }
        debug!("Line spacing assigned to {} paragraphs", spacing.assigned());

        info!(
            "Processed {} characters: {} with a typeface, {} without, {} typefaces used",
            report.total_chars,
            report.chars_with_typeface,
            report.chars_without_typeface,
            report.distinct_typefaces()
        );
        Ok(report)
    }

    fn transform_paragraph(
        &mut self,
        paragraph: &mut Paragraph,
        ordinal: usize,
        spacing: &mut LineSpacingGenerator,
        indent: &IndentGenerator,
        report: &mut ConversionReport,
    ) {
        if !paragraph.is_blank() {
            if self.settings.line_spacing_enabled {
                paragraph.set_line_spacing(spacing.spacing_for(&mut self.rng, ordinal));
                report.paragraphs_with_random_spacing += 1;
            }
            if self.settings.indent_enabled {
                paragraph.prepend_text(&indent.next_indent(&mut self.rng));
                report.paragraphs_with_random_indent += 1;
            }
        }

        let mut state = ParagraphState::new(&self.settings);
        let mut position = 0;
        while position < paragraph.runs.len() {
            if paragraph.runs[position].is_blank() {
                position += 1;
                continue;
            }
            let source = std::mem::take(&mut paragraph.runs[position]);
            let characters: Vec<Run> = source
                .text
                .chars()
                .map(|character| self.style_character(&source, character, &mut state, report))
                .collect();
            position = paragraph.splice_run(position, characters);
        }

        report.handwriting_trends += state.tilt.trends_started();
        debug!(
            "Paragraph {} done ({} runs, {} tilt trends)",
            ordinal,
            paragraph.runs.len(),
            state.tilt.trends_started()
        );
    }

    /// Build the single-character run for `character` taken from `source`
    fn style_character(
        &mut self,
        source: &Run,
        character: char,
        state: &mut ParagraphState,
        report: &mut ConversionReport,
    ) -> Run {
        let mut run = Run::with_emphasis_of(source, character);

        match self.index.random_supporting_typeface(&mut self.rng, character) {
            Some(name) => {
                run.font_name = Some(name.to_string());
                report.record_typeface(name);
            }
            None => report.chars_without_typeface += 1,
        }

        if let Some(base_size) = source.font_size_pt {
            if self.settings.char_size_enabled {
                run.font_size_pt = Some(state.size.next(&mut self.rng, base_size));
                report.chars_with_random_size += 1;
            } else {
                run.font_size_pt = Some(base_size);
            }
        }

        let mut offset = 0.0;
        if self.settings.handwriting_enabled {
            let tilt = state.tilt.next_tilt(&mut self.rng)
                * self.settings.handwriting_strength.tilt_multiplier();
            if tilt.abs() >= MIN_VISIBLE_OFFSET_PT {
                offset += tilt;
            }
        }
        let displacement = state.position.next(&mut self.rng);
        if displacement.abs() >= MIN_VISIBLE_OFFSET_PT {
            offset += displacement;
        }
        apply_best_effort(&mut run, |run| run.try_set_vertical_offset(offset));

        report.total_chars += 1;
        run
    }
}

/// Load `input`, transform it and save the result to `output`.
///
/// The typeface precondition is checked before the document is touched.
/// Nothing is written when loading or transforming fails.
pub fn convert_file<F>(
    index: &GlyphCoverageIndex,
    settings: RandomizationSettings,
    seed: Option<u64>,
    input: &Path,
    output: &Path,
    on_paragraph: F,
) -> Result<ConversionReport, ConversionError>
where
    F: FnMut(usize),
{
    let mut transformer = Transformer::seeded(index, settings, seed);
    transformer.check_preconditions()?;

    info!("Converting {:?} -> {:?}", input, output);
    for line in settings.describe() {
        debug!("Effect enabled: {}", line);
    }

    let mut document = Document::load(input)?;
    let mut report = transformer.transform_with_progress(&mut document, on_paragraph)?;
    document.save(output)?;

    report.output_path = Some(output.to_path_buf());
    report.finished_at = Some(chrono::Utc::now());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Cell, Row, Table};
    use crate::fonts::coverage::test_support::record;
    use crate::jitter::walk::{SIZE_HARD_MIN_PT, SIZE_MAX_STEP_PT};
    use crate::jitter::Strength;

    fn two_fonts() -> GlyphCoverageIndex {
        GlyphCoverageIndex::from_records([record("Font1", "Hi "), record("Font2", "i!")])
    }

    fn single_paragraph(runs: Vec<Run>) -> Document {
        Document {
            body: vec![Block::Paragraph(Paragraph::new(runs))],
        }
    }

    #[test]
    fn test_runs_become_single_characters_in_order() {
        let index = two_fonts();
        let mut document = single_paragraph(vec![
            Run::new("Hi"),
            Run::new("  "),
            Run {
                bold: Some(true),
                ..Run::new("i!")
            },
        ]);

        let mut transformer = Transformer::seeded(&index, RandomizationSettings::fonts_only(), Some(1));
        let report = transformer.transform(&mut document).unwrap();

        let paragraph = &document.paragraphs()[0];
        let texts: Vec<&str> = paragraph.runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(texts, vec!["H", "i", "  ", "i", "!"]);
        assert_eq!(paragraph.runs[3].bold, Some(true));
        assert_eq!(paragraph.runs[4].bold, Some(true));
        assert_eq!(paragraph.runs[0].bold, None);
        // The whitespace-only run is left untouched
        assert_eq!(paragraph.runs[2].font_name, None);
        assert_eq!(report.total_chars, 4);
        assert_eq!(paragraph.line_spacing, None);
    }

    #[test]
    fn test_missing_coverage_is_counted_not_fatal() {
        let index = two_fonts();
        let mut document = single_paragraph(vec![Run::new("H码")]);

        let mut transformer = Transformer::seeded(&index, RandomizationSettings::fonts_only(), Some(2));
        let report = transformer.transform(&mut document).unwrap();

        let runs = &document.paragraphs()[0].runs;
        assert_eq!(runs[0].font_name.as_deref(), Some("Font1"));
        assert_eq!(runs[1].text, "码");
        assert_eq!(runs[1].font_name, None);
        assert_eq!(report.chars_with_typeface, 1);
        assert_eq!(report.chars_without_typeface, 1);
    }

    #[test]
    fn test_insufficient_typefaces_leaves_document_untouched() {
        for index in [
            GlyphCoverageIndex::new(),
            GlyphCoverageIndex::from_records([record("Solo", "abc")]),
        ] {
            let mut document = single_paragraph(vec![Run::new("abc")]);
            let original = document.clone();
            let mut transformer = Transformer::seeded(&index, RandomizationSettings::default(), Some(3));

            let result = transformer.transform(&mut document);
            assert!(matches!(
                result,
                Err(ConversionError::InsufficientTypefaces { loaded }) if loaded == index.typeface_count()
            ));
            assert_eq!(document, original);
        }
    }

    #[test]
    fn test_size_jitter_respects_adjacency_across_runs() {
        let index = two_fonts();
        let sized = |text: &str, size: f64| Run {
            font_size_pt: Some(size),
            ..Run::new(text)
        };
        let mut document = single_paragraph(vec![
            sized("HiHiHiHiHiHiHiHiHiHi", 12.0),
            sized("iiiiiiiiiiiiiiiiiiii", 7.0),
        ]);
        let settings = RandomizationSettings {
            char_size_enabled: true,
            char_size_strength: Strength::new(3).unwrap(),
            ..RandomizationSettings::fonts_only()
        };

        let mut transformer = Transformer::seeded(&index, settings, Some(4));
        let report = transformer.transform(&mut document).unwrap();
        assert_eq!(report.chars_with_random_size, 40);

        let sizes: Vec<f64> = document.paragraphs()[0]
            .runs
            .iter()
            .map(|run| run.font_size_pt.unwrap())
            .collect();
        for pair in sizes.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= SIZE_MAX_STEP_PT + 1e-9);
        }
        assert!(sizes.iter().all(|size| *size >= SIZE_HARD_MIN_PT));
        assert!(sizes[..20].iter().all(|size| (10.8 - 1e-9..=13.2 + 1e-9).contains(size)));
    }

    #[test]
    fn test_generator_state_restarts_every_paragraph() {
        let index = two_fonts();
        let sized = |text: &str, size: f64| {
            Block::Paragraph(Paragraph::new(vec![Run {
                font_size_pt: Some(size),
                ..Run::new(text)
            }]))
        };
        let mut document = Document {
            body: vec![sized("HiH", 20.0), sized("iHi", 10.0)],
        };
        let settings = RandomizationSettings {
            handwriting_enabled: true,
            char_size_enabled: true,
            char_size_strength: Strength::new(3).unwrap(),
            ..RandomizationSettings::fonts_only()
        };

        let mut transformer = Transformer::seeded(&index, settings, Some(8));
        let report = transformer.transform(&mut document).unwrap();

        // A carried-over walk would pin the second paragraph near 19.5pt
        let range = Strength::new(3).unwrap().size_range_pt();
        let paragraphs = document.paragraphs();
        for run in &paragraphs[1].runs {
            let size = run.font_size_pt.unwrap();
            assert!(
                (10.0 - range - 1e-9..=10.0 + range + 1e-9).contains(&size),
                "size {size} outside the second paragraph's window"
            );
        }
        assert!(paragraphs[0]
            .runs
            .iter()
            .all(|run| (20.0 - range - 1e-9..=20.0 + range + 1e-9).contains(&run.font_size_pt.unwrap())));

        // Three characters never exhaust a trend, so each paragraph starts exactly one
        assert_eq!(report.handwriting_trends, 2);
    }

    #[test]
    fn test_disabled_size_jitter_copies_size() {
        let index = two_fonts();
        let mut document = single_paragraph(vec![Run {
            font_size_pt: Some(10.5),
            ..Run::new("Hi")
        }]);
        let mut transformer = Transformer::seeded(&index, RandomizationSettings::fonts_only(), Some(5));
        transformer.transform(&mut document).unwrap();

        for run in &document.paragraphs()[0].runs {
            assert_eq!(run.font_size_pt, Some(10.5));
        }
    }

    #[test]
    fn test_vertical_offsets_stay_within_combined_bounds() {
        let index = two_fonts();
        let text = "Hi!".repeat(100);
        let mut document = single_paragraph(vec![Run::new(text)]);
        let settings = RandomizationSettings {
            handwriting_enabled: true,
            handwriting_strength: Strength::new(5).unwrap(),
            ..RandomizationSettings::fonts_only()
        };

        let mut transformer = Transformer::seeded(&index, settings, Some(6));
        let report = transformer.transform(&mut document).unwrap();
        assert!(report.handwriting_trends > 0);

        // Tilt is at most (1.5 + 0.2) * 2.0 points, displacement 2.5 points
        let limit = ((1.7 * 2.0 + 2.5) * 2.0) as i32;
        let runs = &document.paragraphs()[0].runs;
        assert!(runs.iter().any(|run| run.vertical_position.is_some()));
        for run in runs {
            if let Some(half_points) = run.vertical_position {
                assert!(half_points != 0 && half_points.abs() <= limit);
            }
        }
    }

    #[test]
    fn test_paragraph_effects_and_cells() {
        let index = two_fonts();
        let cell = Cell {
            paragraphs: vec![
                Paragraph::new(vec![Run::new("Hi")]),
                Paragraph::new(vec![Run::new(" ")]),
            ],
        };
        let mut document = Document {
            body: vec![
                Block::Table(Table {
                    rows: vec![Row { cells: vec![cell] }],
                }),
                Block::Paragraph(Paragraph::new(vec![Run::new("Hi!")])),
            ],
        };
        let settings = RandomizationSettings {
            line_spacing_enabled: true,
            indent_enabled: true,
            indent_strength: Strength::new(1).unwrap(),
            ..RandomizationSettings::fonts_only()
        };

        let mut seen = Vec::new();
        let mut transformer = Transformer::seeded(&index, settings, Some(7));
        let report = transformer
            .transform_with_progress(&mut document, |ordinal| seen.push(ordinal))
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(report.paragraphs_with_random_spacing, 2);
        assert_eq!(report.paragraphs_with_random_indent, 2);

        let (min, max) = Strength::default().line_spacing_bounds();
        let paragraphs = document.paragraphs();
        for paragraph in [paragraphs[0], paragraphs[1]] {
            let spacing = paragraph.line_spacing.unwrap();
            assert!((min..=max).contains(&spacing));
            let text = paragraph.text();
            let leading = text.len() - text.trim_start().len();
            assert!((1..=2).contains(&leading), "indent of {leading}");
            // Indentation spaces are split into their own runs too
            assert!(paragraph.runs.iter().all(|run| run.text.chars().count() == 1));
        }
        // The blank cell paragraph gets neither spacing nor indentation
        assert_eq!(paragraphs[2].line_spacing, None);
        assert_eq!(paragraphs[2].text(), " ");
    }

    #[test]
    fn test_same_seed_same_output() {
        let index = two_fonts();
        let make = || {
            single_paragraph(vec![Run {
                font_size_pt: Some(12.0),
                ..Run::new("Hi! Hi! Hi!")
            }])
        };

        let mut first = make();
        let mut second = make();
        Transformer::seeded(&index, RandomizationSettings::default(), Some(99))
            .transform(&mut first)
            .unwrap();
        Transformer::seeded(&index, RandomizationSettings::default(), Some(99))
            .transform(&mut second)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_convert_file_checks_typefaces_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let result = convert_file(
            &GlyphCoverageIndex::new(),
            RandomizationSettings::default(),
            None,
            &dir.path().join("missing.json"),
            &output,
            |_| {},
        );
        assert!(matches!(result, Err(ConversionError::InsufficientTypefaces { loaded: 0 })));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_file_reports_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let result = convert_file(
            &two_fonts(),
            RandomizationSettings::default(),
            Some(1),
            &dir.path().join("missing.json"),
            &output,
            |_| {},
        );
        assert!(matches!(result, Err(ConversionError::Document(_))));
        assert!(!output.exists());
    }
}
