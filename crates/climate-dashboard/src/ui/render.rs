use climate_types::{HorizonChange, RegionImpact};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, List, ListItem, Paragraph, Row, Table, Wrap,
};

use super::app::AppState;
use super::theme::{Theme, ValueStyle};
use crate::snapshot::{format_alert, AlertsView, PredictionsView};

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[1]);

    draw_header(frame, app, &theme, chunks[0]);

    let region_items = if app.regions.is_empty() {
        vec![ListItem::new(Line::styled(
            "loading regions...",
            theme.value_style(ValueStyle::Dim),
        ))]
    } else {
        app.regions
            .iter()
            .map(|region| ListItem::new(Line::from(region.as_str())))
            .collect::<Vec<_>>()
    };
    let region_list = List::new(region_items)
        .block(theme.block("Regions"))
        .style(theme.value_style(ValueStyle::Normal))
        .highlight_style(theme.highlight_style())
        .highlight_symbol(">> ");
    frame.render_stateful_widget(region_list, body[0], &mut app.list_state);

    match &app.predictions {
        Some(PredictionsView::Loaded(impact)) => draw_predictions(frame, impact, &theme, body[1]),
        Some(PredictionsView::Failed(message)) => {
            let widget = Paragraph::new(Line::styled(message.as_str(), theme.error_style()))
                .block(theme.block("Predictions"))
                .wrap(Wrap { trim: true });
            frame.render_widget(widget, body[1]);
        }
        None => {
            let widget = Paragraph::new(Line::styled(
                "waiting for first refresh...",
                theme.value_style(ValueStyle::Dim),
            ))
            .block(theme.block("Predictions"));
            frame.render_widget(widget, body[1]);
        }
    }

    draw_alerts(frame, app, &theme, chunks[2]);

    let mut footer_spans = vec![Span::styled(
        "↑/↓=select  R=refresh  Q=quit  ",
        theme.help_style(),
    )];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "Press Q again to quit / Esc to cancel  ",
            theme.warn_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controls"));
    frame.render_widget(footer, chunks[3]);
}

fn draw_header(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let updated = app
        .fetched_at
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let mut spans = vec![
        Span::styled("API: ", theme.key_style()),
        Span::styled(app.api_url.as_str(), theme.value_style(ValueStyle::Important)),
        Span::styled("  Status: ", theme.key_style()),
        Span::styled(app.api_status.label(), theme.api_status_style(&app.api_status)),
        Span::styled("  Region: ", theme.key_style()),
        Span::styled(
            app.shown_region.as_deref().unwrap_or("-"),
            theme.value_style(ValueStyle::Important),
        ),
        Span::styled("  Refreshed: ", theme.key_style()),
        Span::styled(updated, theme.value_style(ValueStyle::Normal)),
    ];
    if app.loading {
        spans.push(Span::styled("  loading...", theme.value_style(ValueStyle::Dim)));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(theme.block("Climate Change Impact Predictor"))
        .style(theme.value_style(ValueStyle::Normal));
    frame.render_widget(header, area);
}

fn draw_predictions(frame: &mut ratatui::Frame, impact: &RegionImpact, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);
    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let temperature_title = format!("Temperature Change (°C) - {}", impact.region_name);
    frame.render_widget(
        horizon_table(
            &impact.predicted_temp_change,
            theme,
            theme.temperature_style(),
            &temperature_title,
        ),
        tables[0],
    );
    frame.render_widget(
        horizon_table(
            &impact.precipitation_change,
            theme,
            theme.precipitation_style(),
            "Precipitation Change (mm)",
        ),
        tables[1],
    );

    let bars = impact
        .extreme_event_probabilities
        .iter()
        .map(|(event, probability)| {
            let percent = (probability * 100.0).round().clamp(0.0, 100.0);
            Bar::default()
                .value(percent as u64)
                .label(Line::from(event.label()))
                .text_value(format!("{percent:.0}%"))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(theme.block("Extreme Event Probabilities"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(3)
        .max(100)
        .bar_style(theme.warn_style())
        .value_style(theme.highlight_style());
    frame.render_widget(chart, rows[1]);

    let info = Paragraph::new(Line::from(vec![
        Span::styled("Last updated: ", theme.key_style()),
        Span::styled(
            impact.last_updated.as_str(),
            theme.value_style(ValueStyle::Normal),
        ),
        Span::styled("  Current temperature: ", theme.key_style()),
        Span::styled(
            format!("{:.1} °C", impact.current_temp),
            theme.value_style(ValueStyle::Important),
        ),
    ]))
    .block(theme.block("Info"));
    frame.render_widget(info, rows[2]);
}

fn horizon_table<'a>(
    change: &HorizonChange,
    theme: &Theme,
    value_style: ratatui::style::Style,
    title: &'a str,
) -> Table<'a> {
    let rows = change
        .labelled()
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![label.to_string(), format!("{value:+.1}")]).style(value_style)
        })
        .collect::<Vec<_>>();
    Table::new(rows, [Constraint::Length(10), Constraint::Min(8)])
        .header(Row::new(vec!["Horizon", "Change"]).style(theme.key_style()))
        .block(theme.block(title))
}

fn draw_alerts(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let items = match &app.alerts {
        Some(AlertsView::Loaded(alerts)) if alerts.is_empty() => vec![ListItem::new(
            Line::styled("No active climate alerts", theme.value_style(ValueStyle::Important)),
        )],
        Some(AlertsView::Loaded(alerts)) => alerts
            .iter()
            .map(|alert| {
                ListItem::new(Line::styled(
                    format_alert(alert),
                    theme.severity_style(alert.severity),
                ))
            })
            .collect::<Vec<_>>(),
        Some(AlertsView::Failed(message)) => vec![ListItem::new(Line::styled(
            message.as_str(),
            theme.warn_style(),
        ))],
        None => vec![ListItem::new(Line::styled(
            "no alerts fetched yet",
            theme.value_style(ValueStyle::Dim),
        ))],
    };
    let list = List::new(items).block(theme.block("Active Climate Alerts"));
    frame.render_widget(list, area);
}
