use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Gauge, Paragraph, Row, Sparkline, Table, Tabs},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::currency::{ConversionError, RateTable};
use crate::error::Result;
use crate::fmt::{compact, money, percent};
use crate::news::{Article, NO_NEWS};
use crate::reports::{DailyFlow, RankedItem, SavingsPoint};
use crate::sources::{load_articles, load_rates};
use crate::tui::{
    alert_style, money_span, run_screen, usage_style, wrap_text, Screen, ScreenAction,
    AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, TITLE_STYLE,
};
use crate::views::{self, BudgetTrackerData, DashboardData, Inputs, View, ViewData};

use super::Context;

const BORDER_STYLE: Style = Style::new().fg(Color::DarkGray);

// ---------------------------------------------------------------------------
// Currency converter state
// ---------------------------------------------------------------------------

struct Converter {
    currencies: Vec<String>,
    base: usize,
    target: usize,
    amount: String,
}

impl Converter {
    fn new(currencies: Vec<String>) -> Self {
        let target = if currencies.len() > 1 { 1 } else { 0 };
        Self {
            currencies,
            base: 0,
            target,
            amount: "100".to_string(),
        }
    }

    fn cycle_base(&mut self) {
        if !self.currencies.is_empty() {
            self.base = (self.base + 1) % self.currencies.len();
        }
    }

    fn cycle_target(&mut self) {
        if !self.currencies.is_empty() {
            self.target = (self.target + 1) % self.currencies.len();
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.base, &mut self.target);
    }

    fn push(&mut self, c: char) {
        if self.amount.len() < 12 {
            self.amount.push(c);
        }
    }

    fn pop(&mut self) {
        self.amount.pop();
    }

    fn pair(&self) -> Option<(&str, &str)> {
        Some((
            self.currencies.get(self.base)?.as_str(),
            self.currencies.get(self.target)?.as_str(),
        ))
    }

    fn result(&self, rates: &RateTable) -> String {
        let Some((base, target)) = self.pair() else {
            return "No currencies configured.".to_string();
        };
        let outcome = self
            .amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| ConversionError::InvalidAmount(self.amount.clone()))
            .and_then(|amount| rates.convert(amount, base, target));
        match outcome {
            Ok(conversion) => conversion.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

struct Dashboard<'a> {
    inputs: &'a Inputs,
    view: View,
    data: ViewData,
    articles: Vec<Article>,
    article: usize,
    rates: RateTable,
    converter: Converter,
}

impl<'a> Dashboard<'a> {
    fn new(inputs: &'a Inputs, articles: Vec<Article>, rates: RateTable, currencies: Vec<String>) -> Self {
        let view = View::Dashboard;
        Self {
            inputs,
            view,
            data: views::build(view, inputs),
            articles,
            article: 0,
            rates,
            converter: Converter::new(currencies),
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.data = views::build(view, self.inputs);
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<&str> = View::ALL.iter().map(View::label).collect();
        let selected = View::ALL.iter().position(|v| *v == self.view).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(FOOTER_STYLE)
            .highlight_style(HEADER_STYLE)
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let [cards_area, charts_area, tops_area, bottom_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Length(padded_len(self.inputs.top_n)),
            Constraint::Fill(1),
        ])
        .areas(area);

        // Summary cards
        let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(cards_area);
        let s = &data.summary;
        let net_style = if s.net_savings < Decimal::ZERO {
            AMOUNT_NEG_STYLE
        } else {
            AMOUNT_POS_STYLE
        };
        let card_values = [
            ("Total Income", Span::styled(money(s.total_income), AMOUNT_POS_STYLE)),
            ("Expenses", Span::styled(money(s.total_expenses), AMOUNT_NEG_STYLE)),
            ("Savings", Span::styled(money(s.net_savings), net_style)),
            (
                "Budget Used",
                Span::styled(percent(s.budget_used_pct), usage_style(s.usage_level)),
            ),
        ];
        for ((title, value), area) in card_values.into_iter().zip(cards.iter()) {
            let card = Paragraph::new(Line::from(value)).block(
                Block::default()
                    .title(title)
                    .title_style(TITLE_STYLE)
                    .borders(Borders::ALL)
                    .border_style(BORDER_STYLE),
            );
            frame.render_widget(card, *area);
        }

        let [flow_area, breakdown_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(charts_area);
        draw_daily_flows(frame, flow_area, &data.daily_flows);
        self.draw_breakdown(frame, breakdown_area, data);

        let tops = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(tops_area);
        draw_ranked(frame, tops[0], "Top Transactions", &data.top_transactions);
        draw_ranked(frame, tops[1], "Top Categories", &data.top_categories);
        draw_ranked(frame, tops[2], "Top Merchants", &data.top_merchants);

        let [trend_area, side_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom_area);
        draw_savings_trend(frame, trend_area, &data.savings_trend);
        let [news_area, fx_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(4)]).areas(side_area);
        self.draw_news(frame, news_area);
        self.draw_converter(frame, fx_area);
    }

    fn draw_breakdown(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let block = Block::default()
            .title("Expenses by Category")
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE);
        if data.breakdown.is_empty() {
            frame.render_widget(Paragraph::new(" No expenses").style(FOOTER_STYLE).block(block), area);
            return;
        }
        let name_width = data.breakdown.iter().map(|c| c.category.len()).max().unwrap_or(10);
        let lines: Vec<Line> = data
            .breakdown
            .iter()
            .map(|c| {
                Line::from(vec![
                    Span::raw(format!(" {:<width$}  ", c.category, width = name_width)),
                    Span::styled(money(c.total), AMOUNT_NEG_STYLE),
                    Span::styled(format!("  {:>6}", percent(c.pct)), FOOTER_STYLE),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_news(&self, frame: &mut Frame, area: Rect) {
        let title = if self.articles.is_empty() {
            "News".to_string()
        } else {
            format!("News {}/{}", self.article + 1, self.articles.len())
        };
        let block = Block::default()
            .title(title)
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE);
        let Some(article) = self.articles.get(self.article) else {
            frame.render_widget(Paragraph::new(NO_NEWS).style(FOOTER_STYLE).block(block), area);
            return;
        };
        let width = area.width.saturating_sub(2) as usize;
        let (description, _) = wrap_text(&article.description, width);
        let mut lines = vec![Line::from(Span::styled(article.title.clone(), HEADER_STYLE))];
        lines.extend(description.lines().map(|l| Line::from(l.to_string())));
        if !article.url.is_empty() {
            lines.push(Line::from(Span::styled(article.url.clone(), FOOTER_STYLE)));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_converter(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Currency")
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE);
        let pair = match self.converter.pair() {
            Some((base, target)) => format!(" {} {base} -> {target}", self.converter.amount),
            None => String::new(),
        };
        let lines = vec![
            Line::from(Span::styled(pair, SELECTED_STYLE)),
            Line::from(format!(" {}", self.converter.result(&self.rates))),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_budget_tracker(&self, frame: &mut Frame, area: Rect, data: &BudgetTrackerData) {
        let [budget_area, alert_area, goals_area] = Layout::vertical([
            Constraint::Length(padded_len(data.budgets.len())),
            Constraint::Length(padded_len(data.alerts.len().max(1))),
            Constraint::Fill(1),
        ])
        .areas(area);

        let block = Block::default()
            .title("Budget Tracking")
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE);
        let inner = block.inner(budget_area);
        frame.render_widget(block, budget_area);
        let rows = Layout::vertical(vec![Constraint::Length(1); data.budgets.len()]).split(inner);
        let name_width = padded_len(data.budgets.iter().map(|b| b.category.len()).max().unwrap_or(10));
        for (b, row) in data.budgets.iter().zip(rows.iter()) {
            let [label_area, gauge_area] =
                Layout::horizontal([Constraint::Length(name_width), Constraint::Fill(1)]).areas(*row);
            frame.render_widget(Paragraph::new(format!(" {}", b.category)), label_area);
            let gauge = Gauge::default()
                .gauge_style(alert_style(b.alert))
                .ratio(gauge_ratio(b.display_pct))
                .label(format!(
                    "{} / {} ({})",
                    money(b.spent),
                    money(b.limit),
                    percent(b.progress_pct)
                ));
            frame.render_widget(gauge, gauge_area);
        }

        let alert_block = Block::default()
            .title("Alerts")
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE);
        let alert_lines: Vec<Line> = if data.alerts.is_empty() {
            vec![Line::from(Span::styled(" All categories within budget", AMOUNT_POS_STYLE))]
        } else {
            data.alerts
                .iter()
                .map(|a| Line::from(Span::styled(format!(" {a}"), AMOUNT_NEG_STYLE)))
                .collect()
        };
        frame.render_widget(Paragraph::new(alert_lines).block(alert_block), alert_area);

        let header = Row::new(["Term", "Goal", "Allocated", "Target", "Progress"]).style(HEADER_STYLE);
        let rows: Vec<Row> = data
            .savings
            .iter()
            .map(|g| {
                let style = if g.progress_pct >= 100.0 {
                    AMOUNT_POS_STYLE
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(g.term.label()),
                    Cell::from(g.goal.clone()),
                    Cell::from(money(g.allocated)),
                    Cell::from(money(g.target)),
                    Cell::from(Span::styled(percent(g.progress_pct), style)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!("Savings Goals (income {})", money(data.savings_income)))
                .title_style(TITLE_STYLE)
                .borders(Borders::ALL)
                .border_style(BORDER_STYLE),
        );
        frame.render_widget(table, goals_area);
    }
}

impl Screen for Dashboard<'_> {
    fn draw(&mut self, frame: &mut Frame) {
        let [tabs_area, sep, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_tabs(frame, tabs_area);
        let sep_line = "━".repeat(sep.width as usize);
        frame.render_widget(Paragraph::new(sep_line).style(BORDER_STYLE), sep);

        let hints = match &self.data {
            ViewData::Dashboard(data) => {
                self.draw_dashboard(frame, body_area, data);
                " Tab=switch view  n=next article  b/t=currency  s=swap  0-9=amount  q=quit"
            }
            ViewData::BudgetTracker(data) => {
                self.draw_budget_tracker(frame, body_area, data);
                " Tab=switch view  q=quit"
            }
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Close,
            KeyCode::Tab | KeyCode::Right | KeyCode::Left | KeyCode::BackTab => {
                self.switch_view(self.view.next());
            }
            _ if self.view != View::Dashboard => {}
            KeyCode::Char('n') if !self.articles.is_empty() => {
                self.article = (self.article + 1) % self.articles.len();
            }
            KeyCode::Char('b') => self.converter.cycle_base(),
            KeyCode::Char('t') => self.converter.cycle_target(),
            KeyCode::Char('s') => self.converter.swap(),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.converter.push(c),
            KeyCode::Backspace => self.converter.pop(),
            _ => {}
        }
        ScreenAction::Continue
    }
}

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

fn draw_ranked(frame: &mut Frame, area: Rect, title: &str, items: &[RankedItem]) {
    let block = Block::default()
        .title(title.to_string())
        .title_style(TITLE_STYLE)
        .borders(Borders::ALL)
        .border_style(BORDER_STYLE);
    let inner_width = area.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            let amount = money(item.amount);
            let name_width = inner_width.saturating_sub(amount.len() + 2);
            let name: String = item.name.chars().take(name_width).collect();
            Line::from(vec![
                Span::raw(format!(" {:<width$}", name, width = name_width)),
                money_span(-item.amount),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_daily_flows(frame: &mut Frame, area: Rect, flows: &[DailyFlow]) {
    let block = Block::default()
        .title("Daily Income vs Expenses")
        .title_style(TITLE_STYLE)
        .borders(Borders::ALL)
        .border_style(BORDER_STYLE);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if flows.is_empty() {
        frame.render_widget(Paragraph::new(" No transactions").style(FOOTER_STYLE), inner);
        return;
    }

    let income: Vec<u64> = flows.iter().map(|f| whole_units(f.income)).collect();
    let expenses: Vec<u64> = flows.iter().map(|f| whole_units(f.expenses)).collect();
    let max_val = income.iter().chain(&expenses).copied().max().unwrap_or(1) as f64;

    let (top_tick, mid_tick) = y_axis_ticks(max_val);
    let top_label = compact(top_tick);
    let mid_label = compact(mid_tick);
    let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

    let [y_axis_area, bar_area] =
        Layout::horizontal([Constraint::Length(y_label_width), Constraint::Fill(1)]).areas(inner);

    let inner_height = bar_area.height.saturating_sub(1);
    let mid_row = inner_height / 2;
    let y_lines: Vec<Line> = (0..inner_height)
        .map(|row| {
            let label = if row == 0 {
                top_label.as_str()
            } else if row == mid_row {
                mid_label.as_str()
            } else {
                ""
            };
            Line::from(Span::styled(
                format!("{:>width$}", label, width = y_label_width as usize),
                FOOTER_STYLE,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(y_lines), y_axis_area);

    // Only as many days as fit, most recent last.
    let fits = (bar_area.width / 5).max(1) as usize;
    let skip = flows.len().saturating_sub(fits);
    let mut chart = BarChart::default()
        .bar_width(2)
        .bar_gap(0)
        .group_gap(1)
        .max(top_tick as u64);
    for (i, flow) in flows.iter().enumerate().skip(skip) {
        let bars = [
            Bar::default().value(income[i]).style(AMOUNT_POS_STYLE).text_value(String::new()),
            Bar::default().value(expenses[i]).style(AMOUNT_NEG_STYLE).text_value(String::new()),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(flow.date.format("%d").to_string()))
                .bars(&bars),
        );
    }
    frame.render_widget(chart, bar_area);
}

fn draw_savings_trend(frame: &mut Frame, area: Rect, series: &[SavingsPoint]) {
    let latest = series.last().map(|p| p.cumulative).unwrap_or(Decimal::ZERO);
    let title = Line::from(vec![
        Span::styled("Cumulative Savings  ", TITLE_STYLE),
        money_span(latest),
    ]);
    let style = if latest < Decimal::ZERO {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    let values = sparkline_values(series);
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(BORDER_STYLE),
        )
        .data(&values)
        .style(style);
    frame.render_widget(sparkline, area);
}

/// `n` plus two cells of border or padding, clamped to u16.
fn padded_len(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX).saturating_add(2)
}

fn whole_units(amount: Decimal) -> u64 {
    amount.round().to_u64().unwrap_or(0)
}

/// Pick round y-axis tick values (top and mid) given a max data value.
fn y_axis_ticks(max_val: f64) -> (f64, f64) {
    let steps = [
        100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0, 100000.0,
        250000.0, 500000.0, 1000000.0, 2500000.0, 5000000.0, 10000000.0,
    ];
    let top = steps
        .iter()
        .copied()
        .find(|&s| s >= max_val)
        .unwrap_or(max_val);
    (top, top / 2.0)
}

/// Cumulative savings shifted so the lowest point sits at zero.
fn sparkline_values(series: &[SavingsPoint]) -> Vec<u64> {
    let floor = series
        .iter()
        .map(|p| p.cumulative)
        .min()
        .unwrap_or(Decimal::ZERO)
        .min(Decimal::ZERO);
    series
        .iter()
        .map(|p| whole_units(p.cumulative.saturating_sub(floor)))
        .collect()
}

fn gauge_ratio(display_pct: f64) -> f64 {
    (display_pct / 100.0).clamp(0.0, 1.0)
}

pub fn run(ctx: &Context) -> Result<()> {
    let articles = load_articles(&ctx.settings.news_path());
    let rates = load_rates(&ctx.settings.rates_path());
    let mut currencies = ctx.settings.currencies.clone();
    if currencies.is_empty() {
        currencies = rates.codes().map(String::from).collect();
    }
    let mut dashboard = Dashboard::new(&ctx.inputs, articles, rates, currencies);
    run_screen(&mut dashboard)
}
