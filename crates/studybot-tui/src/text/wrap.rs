//! Wrapping of styled ratatui lines.

use super::visual_width;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Wrap every line to `width` columns, keeping span styles intact.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let total: usize = line.spans.iter().map(|s| visual_width(&s.content)).sum();
    if total <= width {
        return vec![line];
    }

    let styled: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain: String = styled.iter().map(|(ch, _)| ch).collect();

    let mut result = Vec::new();
    let mut idx = 0;

    for piece in textwrap::wrap(&plain, width) {
        // textwrap drops the whitespace it breaks on
        while idx < styled.len()
            && styled[idx].0.is_whitespace()
            && !piece.starts_with(styled[idx].0)
        {
            idx += 1;
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;

        for expected in piece.chars() {
            let Some(&(ch, style)) = styled.get(idx) else {
                run.push(expected);
                continue;
            };
            idx += 1;
            if run_style.is_some_and(|s| s != style) {
                if let Some(s) = run_style {
                    spans.push(Span::styled(std::mem::take(&mut run), s));
                }
            }
            run_style = Some(style);
            run.push(ch);
        }

        if !run.is_empty() {
            spans.push(Span::styled(run, run_style.unwrap_or_default()));
        }
        if !spans.is_empty() {
            result.push(Line::from(spans));
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }
    result
}
