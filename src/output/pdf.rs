//! Plain PDF documents: the match report and the ATS résumé

use crate::error::Result;
use crate::output::formatter::preview;
use crate::processing::evidence::Snippet;
use crate::processing::gaps::GapReport;
use crate::processing::scoring::MatchResult;
use crate::processing::text_processor::TextProcessor;
use crate::profile::ResumeProfile;
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;

const REPORT_SNIPPETS: usize = 5;
const SNIPPET_CHARS: usize = 120;

/// Everything the match report shows.
pub struct MatchReportInput<'a> {
    pub candidate: String,
    pub match_result: &'a MatchResult,
    pub snippets: &'a [Snippet],
    pub gaps: Option<&'a GapReport>,
    pub generated: NaiveDate,
}

pub struct PdfRenderer {
    text_processor: TextProcessor,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self {
            text_processor: TextProcessor::new(),
        }
    }

    pub fn render_match_report(&self, input: &MatchReportInput) -> Result<Vec<u8>> {
        let mut writer = PageWriter::new("Resume Match Report", self)?;
        let result = input.match_result;

        writer.title("Resume Match Report");
        writer.line(&format!("Candidate: {}", input.candidate), BODY_SIZE, false);
        writer.line(
            &format!("Generated: {}", input.generated.format("%B %d, %Y")),
            BODY_SIZE,
            false,
        );
        writer.space(4.0);

        writer.heading("Score");
        writer.line(&format!("Match score: {:.1}%", result.score), BODY_SIZE, true);
        writer.line(
            &format!("Confidence: {:.0}%", result.confidence * 100.0),
            BODY_SIZE,
            false,
        );
        writer.paragraph(&result.explanation, BODY_SIZE);

        writer.heading("Missing Skills");
        if result.missing_skills.is_empty() {
            writer.line("None", BODY_SIZE, false);
        } else {
            writer.paragraph(&result.missing_skills.join(", "), BODY_SIZE);
        }

        if let Some(gaps) = input.gaps {
            writer.gap_section(gaps);
        }

        writer.heading("Top Matching Snippets");
        if input.snippets.is_empty() {
            writer.line("No evidence spans found.", BODY_SIZE, false);
        }
        for snippet in input.snippets.iter().take(REPORT_SNIPPETS) {
            writer.bullet(&format!(
                "[{:.2}] {}",
                snippet.similarity,
                preview(&snippet.text, SNIPPET_CHARS)
            ));
        }

        writer.finish()
    }

    /// Gap analysis on its own, for profiles built without a match run.
    pub fn render_gap_report(
        &self,
        candidate: &str,
        gaps: &GapReport,
        generated: NaiveDate,
    ) -> Result<Vec<u8>> {
        let mut writer = PageWriter::new("Gap Analysis Report", self)?;
        writer.title("Gap Analysis Report");
        writer.line(&format!("Candidate: {}", candidate), BODY_SIZE, false);
        writer.line(
            &format!("Generated: {}", generated.format("%B %d, %Y")),
            BODY_SIZE,
            false,
        );
        writer.gap_section(gaps);
        writer.finish()
    }

    pub fn render_ats_resume(&self, profile: &ResumeProfile) -> Result<Vec<u8>> {
        let title = if profile.name.trim().is_empty() {
            "Resume"
        } else {
            profile.name.trim()
        };
        let mut writer = PageWriter::new(title, self)?;

        writer.title(title);
        let contact: Vec<&str> = [
            profile.email.as_str(),
            profile.phone.as_str(),
            profile.location.as_str(),
        ]
        .into_iter()
        .chain(profile.links.iter().map(String::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
        if !contact.is_empty() {
            writer.paragraph(&contact.join(" | "), BODY_SIZE);
        }

        if !profile.summary.trim().is_empty() {
            writer.heading("Summary");
            writer.paragraph(profile.summary.trim(), BODY_SIZE);
        }

        let groups = profile.skill_groups();
        if !groups.is_empty() {
            writer.heading("Skills");
            for group in groups {
                let items = group.items.join(", ");
                match group.category {
                    Some(category) => writer.bullet(&format!("{}: {}", category, items)),
                    None => writer.bullet(&items),
                }
            }
        }

        if !profile.experience.is_empty() {
            writer.heading("Experience");
            for job in profile.experience.values() {
                let header = join_present(&[&job.title, &job.company, &job.location], ", ");
                writer.line(&header, BODY_SIZE, true);
                let dates = join_present(&[&job.start, &job.end], " - ");
                if !dates.is_empty() {
                    writer.line(&dates, BODY_SIZE, false);
                }
                for bullet in job.bullets.iter().filter(|b| !b.trim().is_empty()) {
                    writer.bullet(bullet.trim());
                }
                writer.space(2.0);
            }
        }

        if !profile.education.is_empty() {
            writer.heading("Education");
            for entry in profile.education.values() {
                let header = join_present(&[&entry.degree, &entry.school, &entry.location], ", ");
                writer.line(&header, BODY_SIZE, true);
                if !entry.year.trim().is_empty() {
                    writer.line(entry.year.trim(), BODY_SIZE, false);
                }
                for detail in entry.details.iter().filter(|d| !d.trim().is_empty()) {
                    writer.bullet(detail.trim());
                }
                writer.space(2.0);
            }
        }

        if !profile.projects.is_empty() {
            writer.heading("Projects");
            for project in profile.projects.values() {
                writer.line(project.name.trim(), BODY_SIZE, true);
                if !project.description.trim().is_empty() {
                    writer.paragraph(project.description.trim(), BODY_SIZE);
                }
                if !project.tech.is_empty() {
                    writer.line(&format!("Technologies: {}", project.tech.join(", ")), BODY_SIZE, false);
                }
                writer.space(2.0);
            }
        }

        let certifications: Vec<&str> = profile
            .certifications
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if !certifications.is_empty() {
            writer.heading("Certifications");
            for cert in certifications {
                writer.bullet(cert);
            }
        }

        writer.finish()
    }

    /// Reduce text to what the built-in fonts can draw.
    fn sanitize(&self, text: &str) -> String {
        self.text_processor
            .normalize_unicode(text)
            .chars()
            .map(|c| match c {
                '\t' => ' ',
                c if c.is_ascii() && !c.is_ascii_control() => c,
                _ => '?',
            })
            .collect()
    }
}

fn join_present(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Greedy word wrap on an estimated glyph width.
fn wrap(text: &str, font_size: f32, width_mm: f32) -> Vec<String> {
    let max_chars = ((width_mm / (font_size * AVG_GLYPH_WIDTH * PT_TO_MM)) as usize).max(10);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if word.len() > max_chars {
            // Break words that cannot fit on any line.
            let mut rest = word;
            while rest.len() > max_chars {
                let (head, tail) = rest.split_at(max_chars);
                lines.push(head.to_string());
                rest = tail;
            }
            current = rest.to_string();
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct PageWriter<'r> {
    renderer: &'r PdfRenderer,
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl<'r> PageWriter<'r> {
    fn new(title: &str, renderer: &'r PdfRenderer) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            renderer.sanitize(title),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            renderer,
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn line_height(font_size: f32) -> f32 {
        font_size * PT_TO_MM * 1.4
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn draw(&mut self, text: &str, font_size: f32, bold: bool, indent: f32) {
        let height = Self::line_height(font_size);
        self.ensure_space(height);
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, font_size, Mm(MARGIN + indent), Mm(self.y), font);
    }

    fn title(&mut self, text: &str) {
        let text = self.renderer.sanitize(text);
        self.draw(&text, TITLE_SIZE, true, 0.0);
        self.space(2.0);
    }

    fn heading(&mut self, text: &str) {
        self.space(3.0);
        let text = self.renderer.sanitize(text);
        self.draw(&text, HEADING_SIZE, true, 0.0);
        self.space(1.0);
    }

    fn line(&mut self, text: &str, font_size: f32, bold: bool) {
        let text = self.renderer.sanitize(text);
        for line in wrap(&text, font_size, PAGE_WIDTH - 2.0 * MARGIN) {
            self.draw(&line, font_size, bold, 0.0);
        }
    }

    fn paragraph(&mut self, text: &str, font_size: f32) {
        self.line(text, font_size, false);
    }

    fn bullet(&mut self, text: &str) {
        let text = self.renderer.sanitize(text);
        let indent = 4.0;
        for (i, line) in wrap(&text, BODY_SIZE, PAGE_WIDTH - 2.0 * MARGIN - indent)
            .into_iter()
            .enumerate()
        {
            let line = if i == 0 {
                format!("- {}", line)
            } else {
                format!("  {}", line)
            };
            self.draw(&line, BODY_SIZE, false, indent);
        }
    }

    fn gap_section(&mut self, gaps: &GapReport) {
        self.heading("Gap Analysis");
        if gaps.total() == 0 {
            self.line("No gaps found.", BODY_SIZE, false);
        }
        for gap in &gaps.experience_gaps {
            self.bullet(&format!(
                "Employment gap, {} to {} ({} months): {}",
                gap.from, gap.to, gap.duration_months, gap.description
            ));
        }
        for finding in gaps.education_gaps.iter().chain(gaps.skill_gaps.iter()) {
            self.bullet(&format!(
                "{} ({:?}): {}",
                finding.kind.label(),
                finding.severity,
                finding.description
            ));
        }
        self.paragraph(&format!("Assessment: {}", gaps.assessment.description), BODY_SIZE);
    }

    fn space(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.doc.save_to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::text_extractor::{PdfExtractor, TextExtractor};
    use crate::processing::gaps::GapAnalyzer;
    use crate::profile::{Education, Experience};

    fn match_result() -> MatchResult {
        MatchResult {
            similarity: 0.82,
            jaccard: 0.5,
            score: 72.4,
            confidence: 0.91,
            missing_skills: vec!["aws".to_string()],
            skill_overlap: 2,
            skill_union: 4,
            explanation: "Semantic similarity: 0.82. Skill overlap: 2/4. Combined score: 72.4%."
                .to_string(),
        }
    }

    fn profile() -> ResumeProfile {
        ResumeProfile {
            name: "Jos\u{e9} Garc\u{ed}a".to_string(),
            email: "jose@example.com".to_string(),
            summary: "Backend engineer focused on data platforms.".to_string(),
            skills: vec!["Languages: Python, Rust".to_string(), "Docker".to_string()],
            experience: vec![Experience {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                start: "2020-01".to_string(),
                end: "present".to_string(),
                bullets: vec!["Built \u{201C}fast\u{201D} ingestion services".to_string()],
                ..Experience::default()
            }]
            .into_iter()
            .collect(),
            education: vec![Education {
                degree: "BSc Computer Science".to_string(),
                year: "2019".to_string(),
                ..Education::default()
            }]
            .into_iter()
            .collect(),
            ..ResumeProfile::default()
        }
    }

    #[test]
    fn test_match_report_is_a_pdf_with_candidate() {
        let result = match_result();
        let snippets = vec![Snippet {
            text: "Built data pipelines with Python and SQL".to_string(),
            similarity: 0.77,
        }];
        let input = MatchReportInput {
            candidate: "Jane Doe".to_string(),
            match_result: &result,
            snippets: &snippets,
            gaps: None,
            generated: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        };
        let bytes = PdfRenderer::new().render_match_report(&input).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        let text = PdfExtractor.extract(&bytes).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("72.4"));
    }

    #[test]
    fn test_match_report_with_gaps_and_many_snippets() {
        let result = match_result();
        let snippets: Vec<Snippet> = (0..40)
            .map(|i| Snippet {
                text: format!("Evidence line number {} ", i).repeat(20),
                similarity: 0.5,
            })
            .collect();
        let gaps = GapAnalyzer::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .analyze(&profile(), None);
        let input = MatchReportInput {
            candidate: "Jane Doe".to_string(),
            match_result: &result,
            snippets: &snippets,
            gaps: Some(&gaps),
            generated: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        };
        let bytes = PdfRenderer::new().render_match_report(&input).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_gap_report_lists_findings() {
        let mut p = profile();
        p.education = Default::default();
        let gaps = GapAnalyzer::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()).analyze(&p, None);
        let bytes = PdfRenderer::new()
            .render_gap_report("Jane Doe", &gaps, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .unwrap();

        let text = PdfExtractor.extract(&bytes).unwrap();
        assert!(text.contains("Gap Analysis"));
        assert!(text.contains("Education Missing"));
    }

    #[test]
    fn test_ats_resume_sanitizes_text() {
        let bytes = PdfRenderer::new().render_ats_resume(&profile()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let text = PdfExtractor.extract(&bytes).unwrap();
        assert!(text.contains("Garc"));
        assert!(!text.contains('\u{ed}'));
        assert!(text.contains("Languages: Python, Rust"));
    }

    #[test]
    fn test_long_resume_spans_pages() {
        let mut p = profile();
        let bullets: Vec<String> = (0..120)
            .map(|i| format!("Delivered project {} on time and under budget", i))
            .collect();
        let first_id = p.experience.iter().next().map(|(id, _)| id);
        if let Some(id) = first_id {
            if let Some(job) = p.experience.get_mut(id) {
                job.bullets = bullets;
            }
        }
        let bytes = PdfRenderer::new().render_ats_resume(&p).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap() {
        let lines = wrap(&"word ".repeat(100), BODY_SIZE, 40.0);
        assert!(lines.len() > 1);
        let max = ((40.0 / (BODY_SIZE * AVG_GLYPH_WIDTH * PT_TO_MM)) as usize).max(10);
        assert!(lines.iter().all(|l| l.len() <= max));

        let long = wrap(&"x".repeat(50), BODY_SIZE, 20.0);
        assert!(long.len() > 1);
        assert!(wrap("", BODY_SIZE, 100.0).is_empty());
    }
}
