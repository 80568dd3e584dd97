use climate_types::RegionImpact;
use std::fmt::Write;

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

pub(crate) fn map_page(regions: &[String]) -> String {
    let mut body = String::from(
        "<h1>Climate Impact Map</h1>\n<p>Interactive map showing climate predictions by region</p>\n",
    );
    if regions.is_empty() {
        body.push_str("<p>No refresh run loaded yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for region in regions {
            let _ = writeln!(
                body,
                "<li><a href=\"/dashboard/{}\">{}</a></li>",
                escape_html(&urlencoding::encode(region)),
                escape_html(region)
            );
        }
        body.push_str("</ul>\n");
    }
    page("Climate Impact Map", &body)
}

pub(crate) fn dashboard_page(region_name: &str, impact: Option<&RegionImpact>) -> String {
    let name = escape_html(region_name);
    let mut body = format!(
        "<h1>Climate Dashboard: {name}</h1>\n<p>Interactive charts showing climate trends and predictions</p>\n"
    );
    if let Some(impact) = impact {
        body.push_str("<table>\n<tr><th>Horizon</th><th>Temperature change (&deg;C)</th><th>Precipitation change (mm)</th></tr>\n");
        let temperature = impact.predicted_temp_change.labelled();
        let precipitation = impact.precipitation_change.labelled();
        for ((label, temp), (_, precip)) in temperature.iter().zip(precipitation.iter()) {
            let _ = writeln!(
                body,
                "<tr><td>{label}</td><td>{temp:+.1}</td><td>{precip:+.1}</td></tr>"
            );
        }
        body.push_str("</table>\n<ul>\n");
        for (event, probability) in impact.extreme_event_probabilities.iter() {
            let _ = writeln!(
                body,
                "<li>{}: {:.0}%</li>",
                event.label(),
                probability * 100.0
            );
        }
        let _ = writeln!(
            body,
            "</ul>\n<p>Last updated: {}</p>",
            escape_html(&impact.last_updated)
        );
    }
    page(&format!("Climate Dashboard - {name}"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_region_impact;

    #[test]
    fn dashboard_escapes_region_name() {
        let html = dashboard_page("<script>alert(1)</script>", None);
        assert!(html.contains("<title>Climate Dashboard - &lt;script&gt;alert(1)&lt;/script&gt;</title>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn dashboard_renders_forecast_rows() {
        let impact = mock_region_impact("Austin, TX");
        let html = dashboard_page("Austin, TX", Some(&impact));
        assert!(html.contains("<td>10 Years</td><td>+3.2</td><td>-15.0</td>"));
        assert!(html.contains("Heatwave: 15%"));
        assert!(html.contains("Last updated: mock-data"));
    }

    #[test]
    fn map_links_each_region() {
        let html = map_page(&["Austin, TX".to_string()]);
        assert!(html.contains("<a href=\"/dashboard/Austin%2C%20TX\">Austin, TX</a>"));
        assert!(map_page(&[]).contains("No refresh run loaded yet."));
    }
}
