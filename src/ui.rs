use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use placeguess::view::TextView;

use crate::{App, Focus};

const HORIZONTAL_MARGIN: u16 = 2;
const MIN_LIST_WIDTH: u16 = 18;

const HINT: &str = "Pick a start letter and an optional time limit in seconds (0 or empty = untimed), \
then start the round. Type place names beginning with that letter; separate several with commas. \
Each place counts once. Use the sample key if you are stuck.";

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.controller.view();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let hint_height = if view.hint_visible { 4 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),           // title
                Constraint::Length(3),           // setup fields
                Constraint::Length(3),           // guess input
                Constraint::Length(1),           // message
                Constraint::Length(1),           // timer
                Constraint::Min(3),              // guessed + sample
                Constraint::Length(hint_height), // hint
                Constraint::Length(1),           // legend
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("placeguess", bold_style.fg(Color::Cyan)),
            Span::styled(
                format!("  {} places loaded", self.controller.places().len()),
                dim_style,
            ),
        ]))
        .alignment(Alignment::Center);
        title.render(chunks[0], buf);

        let setup = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        input_box(
            "Start letter",
            &view.form.start_letter,
            None,
            self.focus == Focus::StartLetter,
        )
        .render(setup[0], buf);
        input_box(
            "Time limit (s)",
            &view.form.time_limit,
            Some("untimed"),
            self.focus == Focus::TimeLimit,
        )
        .render(setup[1], buf);

        input_box(
            "Guess",
            &view.guess_input,
            Some(view.placeholder.as_str()),
            self.focus == Focus::Guess,
        )
        .render(chunks[2], buf);

        if let Some(notice) = &view.message {
            let color = if notice.is_error() { Color::Red } else { Color::Green };
            Paragraph::new(Span::styled(notice.to_string(), bold_style.fg(color)))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        if let Some(time_left) = &view.timer {
            Paragraph::new(Span::styled(time_left.to_string(), bold_style))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        render_lists(view, chunks[5], buf);

        if view.hint_visible {
            Paragraph::new(HINT)
                .style(italic_style.fg(Color::Gray))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::TOP).title("How to play"))
                .render(chunks[6], buf);
        }

        Paragraph::new(Span::styled(
            "(tab) field / (enter) submit / (^s)tart / (^r)eset / (^d) sample / (f1) hint / (esc)ape",
            italic_style,
        ))
        .render(chunks[7], buf);
    }
}

fn input_box<'a>(title: &'a str, value: &'a str, placeholder: Option<&'a str>, focused: bool) -> Paragraph<'a> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let content = match (value.is_empty(), placeholder) {
        (true, Some(p)) => Span::styled(p, Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC)),
        _ if focused => Span::styled(format!("{value}_"), Style::default().add_modifier(Modifier::BOLD)),
        _ => Span::raw(value),
    };

    Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    )
}

fn render_lists(view: &TextView, area: Rect, buf: &mut Buffer) {
    let guessed: &[String] = view.guessed.as_deref().unwrap_or(&[]);

    let widest = guessed
        .iter()
        .chain(view.sample.iter())
        .map(|n| u16::try_from(n.width()).unwrap_or(u16::MAX))
        .max()
        .unwrap_or(0);
    let list_width = widest
        .saturating_add(4)
        .max(MIN_LIST_WIDTH)
        .min(area.width / 2);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(list_width), Constraint::Length(list_width)])
        .split(area);

    let title = match view.correct_count {
        Some(n) => format!("Places named  |  Correct Guesses: {n}"),
        None => "Places named".to_string(),
    };

    let lines: Vec<Line> = if guessed.is_empty() {
        vec![Line::from(Span::styled(
            "None",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        guessed.iter().map(|n| Line::from(n.as_str())).collect()
    };

    // newest guesses stay visible when the list outgrows the panel
    let visible = columns[0].height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);

    Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(columns[0], buf);

    let sample: Vec<Line> = view
        .sample
        .iter()
        .map(|n| Line::from(Span::styled(n.as_str(), Style::default().fg(Color::Cyan))))
        .collect();

    Paragraph::new(sample)
        .block(Block::default().borders(Borders::ALL).title("Sample"))
        .render(columns[1], buf);
}
