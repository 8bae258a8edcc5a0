use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::fmt::money;
use crate::reports::{AlertLevel, UsageLevel};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);
pub const CAUTION_STYLE: Style = Style::new().fg(Color::Yellow);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Format an amount as a colored Span (green for inflow, red for outflow).
/// Shows the absolute value; color carries the sign.
pub fn money_span(amount: Decimal) -> Span<'static> {
    let style = if amount.is_sign_negative() && !amount.is_zero() {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount.abs()), style)
}

pub fn alert_style(level: AlertLevel) -> Style {
    match level {
        AlertLevel::Ok => AMOUNT_POS_STYLE,
        AlertLevel::Warning => CAUTION_STYLE,
        AlertLevel::Exceeded => AMOUNT_NEG_STYLE,
    }
}

pub fn usage_style(level: UsageLevel) -> Style {
    match level {
        UsageLevel::Ok => AMOUNT_POS_STYLE,
        UsageLevel::Caution => CAUTION_STYLE,
        UsageLevel::Over => AMOUNT_NEG_STYLE,
    }
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

// ---------------------------------------------------------------------------
// Screen infrastructure
// ---------------------------------------------------------------------------

pub enum ScreenAction {
    Continue,
    Close,
}

pub trait Screen {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ScreenAction;
}

/// Run an interactive ratatui screen. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_screen(screen: &mut dyn Screen) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| screen.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match screen.handle_key(key.code) {
                    ScreenAction::Close => break Ok(()),
                    ScreenAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_span_colors() {
        let neg = money_span(Decimal::new(-1250, 2));
        assert_eq!(neg.content, "$12.50");
        assert_eq!(neg.style, AMOUNT_NEG_STYLE);
        assert_eq!(money_span(Decimal::ZERO).style, AMOUNT_POS_STYLE);
    }

    #[test]
    fn test_wrap_text() {
        let (wrapped, lines) = wrap_text("markets rally on rate cut hopes", 10);
        assert!(lines >= 3);
        assert!(wrapped.lines().all(|l| l.len() <= 10));
        assert_eq!(wrap_text("abc", 0).1, 1);
    }
}
