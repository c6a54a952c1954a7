//! The analysis report: which sections appear, in what order, in what colours.

use chrono::{DateTime, Utc};

use super::layout::{Color, LayoutEngine, MARGIN, Page, PageGeometry, TextStyle, palette};
use super::metrics::TextMeasurer;
use crate::frameworks::scoring::{format_score, format_thousands};
use crate::frameworks::{AnalysisResult, BcgCategory, ScoreBand};

const TITLE_BAND_HEIGHT: f64 = 80.0;
const CANVAS_ITEMS_PER_BLOCK: usize = 3;

pub fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Success => palette::SUCCESS,
        ScoreBand::Warning => palette::WARNING,
        ScoreBand::Danger => palette::DANGER,
    }
}

pub fn category_color(category: BcgCategory) -> Color {
    match category {
        BcgCategory::Star => palette::WARNING,
        BcgCategory::CashCow => palette::SUCCESS,
        BcgCategory::QuestionMark => palette::SECONDARY,
        BcgCategory::Dog => palette::DANGER,
    }
}

/// Lay out the whole report. Pure: the same inputs give the same pages.
pub fn compose(
    result: &AnalysisResult,
    title: &str,
    geometry: PageGeometry,
    measurer: &dyn TextMeasurer,
    generated_at: DateTime<Utc>,
) -> Vec<Page> {
    let mut layout = LayoutEngine::new(geometry, measurer, title);

    title_page(&mut layout, result, title, generated_at);
    executive_summary(&mut layout, result);
    key_metrics(&mut layout, result);
    bcg_matrix(&mut layout, result);
    swot(&mut layout, result);
    budget(&mut layout, result);
    recommendations(&mut layout, result);
    strengths_and_challenges(&mut layout, result);
    business_model(&mut layout, result);
    footer(&mut layout, generated_at);

    layout.into_pages()
}

fn title_page(
    layout: &mut LayoutEngine<'_>,
    result: &AnalysisResult,
    title: &str,
    generated_at: DateTime<Utc>,
) {
    let geometry = layout.geometry();
    layout.fill_rect(0.0, 0.0, geometry.width, TITLE_BAND_HEIGHT, palette::PRIMARY);

    let title_style = TextStyle::bold(22.0, palette::WHITE);
    let mut title_y = 35.0;
    for line in layout.wrap(title, title_style, geometry.content_width()) {
        layout.text_at(MARGIN, title_y, line, title_style);
        title_y += 10.0;
    }
    layout.text_at(
        MARGIN,
        title_y + 8.0,
        "Business Idea Analysis Report",
        TextStyle::regular(14.0, palette::WHITE),
    );
    layout.line(
        MARGIN,
        title_y + 15.0,
        geometry.width - MARGIN,
        title_y + 15.0,
        0.5,
        palette::WHITE,
    );

    layout.set_y(100.0);
    let y = layout.cursor().y;
    layout.text_at(
        MARGIN,
        y,
        format!(
            "Generated: {}",
            generated_at.format("%B %-d, %Y at %I:%M %p")
        ),
        TextStyle::regular(10.0, palette::TEXT),
    );
    layout.advance(8.0);

    let score = result.quality_score;
    let color = band_color(ScoreBand::for_score(score));
    let y = layout.cursor().y;
    layout.text_at(
        MARGIN,
        y,
        format!("Quality Score: {}/10", format_score(score)),
        TextStyle::bold(10.0, color),
    );
    let bar_y = y - 2.0;
    layout.line(MARGIN + 50.0, bar_y, MARGIN + 100.0, bar_y, 3.0, palette::LIGHT);
    layout.line(MARGIN + 50.0, bar_y, MARGIN + 50.0 + score * 5.0, bar_y, 3.0, color);
    layout.advance(20.0);
}

fn executive_summary(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    layout.section("Executive Summary", palette::PRIMARY);
    layout.paragraph(&result.summary, 10.0, 5.0);
    layout.advance(10.0);
}

fn key_metrics(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    layout.section("Key Metrics", palette::PRIMARY);
    for (name, value) in result.frameworks.metrics.named() {
        let y = layout.ensure(10.0).y;
        let color = band_color(ScoreBand::for_score(value));
        layout.text_at(
            MARGIN + 5.0,
            y,
            format!("{}:", name),
            TextStyle::regular(10.0, palette::TEXT),
        );
        layout.text_at(
            MARGIN + 50.0,
            y,
            format!("{}/10", format_score(value)),
            TextStyle::bold(10.0, color),
        );
        let bar_y = y - 1.0;
        layout.line(MARGIN + 70.0, bar_y, MARGIN + 120.0, bar_y, 2.0, palette::LIGHT);
        layout.line(MARGIN + 70.0, bar_y, MARGIN + 70.0 + value * 5.0, bar_y, 2.0, color);
        layout.advance(8.0);
    }
    layout.advance(10.0);
}

fn bcg_matrix(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    let bcg = &result.frameworks.bcg;
    let color = category_color(bcg.category);
    layout.section("BCG Matrix Analysis", palette::PRIMARY);

    layout.subsection("Category Classification", color);
    let y = layout.cursor().y;
    layout.text_at(MARGIN + 5.0, y, bcg.category.label(), TextStyle::bold(11.0, color));
    layout.advance(10.0);

    layout.subsection("Market Data", palette::SECONDARY);
    let data = TextStyle::regular(9.0, palette::TEXT);
    let y = layout.cursor().y;
    layout.text_at(
        MARGIN + 5.0,
        y,
        format!("Market Growth: {}%", format_score(bcg.market_growth)),
        data,
    );
    layout.advance(6.0);
    let y = layout.cursor().y;
    layout.text_at(
        MARGIN + 5.0,
        y,
        format!("Market Share: {}%", format_score(bcg.market_share)),
        data,
    );
    layout.advance(10.0);

    layout.subsection("Strategic Analysis", palette::SECONDARY);
    layout.paragraph(&bcg.reasoning, 9.0, 5.0);
    layout.advance(10.0);
}

fn swot(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    let swot = &result.frameworks.swot;
    layout.section("SWOT Analysis", palette::PRIMARY);
    let blocks = [
        ("Strengths", &swot.strengths, palette::SUCCESS),
        ("Weaknesses", &swot.weaknesses, palette::WARNING),
        ("Opportunities", &swot.opportunities, palette::SECONDARY),
        ("Threats", &swot.threats, palette::DANGER),
    ];
    for (title, items, color) in blocks {
        layout.subsection(title, color);
        for item in items {
            layout.bullet(item, color, 5.0);
        }
        layout.advance(5.0);
    }
}

fn budget(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    let budget = &result.budget_estimate;
    let geometry = layout.geometry();
    layout.section("Budget Estimate", palette::PRIMARY);

    let y = layout.ensure(15.0).y;
    layout.fill_rect(MARGIN, y - 3.0, geometry.content_width(), 10.0, palette::PRIMARY);
    layout.text_at(
        MARGIN + 5.0,
        y + 3.0,
        format!("Total Budget: ${}", format_thousands(budget.total)),
        TextStyle::bold(12.0, palette::WHITE),
    );
    layout.advance(15.0);

    let y = layout.cursor().y;
    layout.text_at(
        MARGIN + 5.0,
        y,
        format!("Timeline: {}", budget.timeline),
        TextStyle::regular(9.0, palette::TEXT),
    );
    layout.advance(15.0);

    layout.subsection("Cost Breakdown", palette::SECONDARY);
    let items = [
        ("Development", budget.breakdown.development, palette::PRIMARY),
        ("Marketing", budget.breakdown.marketing, palette::SECONDARY),
        ("Operations", budget.breakdown.operations, palette::SUCCESS),
        ("Legal", budget.breakdown.legal, palette::WARNING),
    ];
    let row = TextStyle::regular(9.0, palette::TEXT);
    for (name, amount, color) in items {
        let y = layout.ensure(8.0).y;
        layout.fill_rect(MARGIN + 5.0, y - 3.0, 3.0, 3.0, color);
        layout.text_at(MARGIN + 12.0, y, format!("{}:", name), row);
        layout.text_at(
            MARGIN + 60.0,
            y,
            format!("${}", format_thousands(amount)),
            row,
        );
        layout.text_at(
            MARGIN + 110.0,
            y,
            format!("({}%)", budget.percent_of_total(amount)),
            TextStyle::regular(9.0, palette::MUTED),
        );
        layout.advance(7.0);
    }
    layout.advance(10.0);
}

fn recommendations(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    let recs = &result.recommendations;
    layout.section("Recommendations", palette::PRIMARY);

    layout.subsection("Suggested Names", palette::SECONDARY);
    layout.paragraph(&recs.startup_names.join(" \u{2022} "), 9.0, 5.0);
    layout.advance(8.0);

    layout.subsection("Elevator Pitch", palette::SECONDARY);
    layout.paragraph(&format!("\"{}\"", recs.elevator_pitch), 9.0, 5.0);
    layout.advance(10.0);

    layout.subsection("100-Day Action Plan", palette::SECONDARY);
    for (i, step) in recs.action_plan.iter().enumerate() {
        layout.bullet(&format!("{}. {}", i + 1, step), palette::SECONDARY, 5.0);
    }
    layout.advance(8.0);

    layout.subsection("Key Improvements", palette::SECONDARY);
    for improvement in &recs.improvements {
        layout.bullet(improvement, palette::WARNING, 5.0);
    }
    layout.advance(10.0);
}

fn strengths_and_challenges(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    layout.section("Strengths & Challenges", palette::PRIMARY);

    layout.subsection("Strengths", palette::SUCCESS);
    for pro in &result.pros {
        layout.bullet(pro, palette::SUCCESS, 5.0);
    }
    layout.advance(8.0);

    layout.subsection("Challenges", palette::DANGER);
    for con in &result.cons {
        layout.bullet(con, palette::DANGER, 5.0);
    }
    layout.advance(10.0);
}

fn business_model(layout: &mut LayoutEngine<'_>, result: &AnalysisResult) {
    layout.section("Business Model Canvas", palette::PRIMARY);
    for (title, items) in result.frameworks.business_model.sections() {
        layout.subsection(title, palette::SECONDARY);
        for item in items.iter().take(CANVAS_ITEMS_PER_BLOCK) {
            layout.bullet(item, palette::SECONDARY, 5.0);
        }
        layout.advance(5.0);
    }
}

fn footer(layout: &mut LayoutEngine<'_>, generated_at: DateTime<Utc>) {
    layout.ensure(20.0);
    let geometry = layout.geometry();
    let y = geometry.max_y() + 10.0;
    let style = TextStyle::regular(8.0, palette::MUTED);
    layout.text_at(
        MARGIN,
        y,
        "Generated by IdeaLyzer - AI-Powered Business Analysis",
        style,
    );
    layout.text_at(
        geometry.width - MARGIN - 50.0,
        y,
        format!("Report Date: {}", generated_at.format("%-m/%-d/%Y")),
        style,
    );
}
