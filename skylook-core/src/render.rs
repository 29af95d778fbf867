//! Turning lookups into something to show.
//!
//! Everything here is pure: input data in, a `String` out.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::{
    model::{CurrentWeather, WeatherSnapshot},
    ui::RecentView,
};

const DASH: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            _ => Err(anyhow::anyhow!(
                "Unknown output format '{s}'. Supported formats: text, html."
            )),
        }
    }
}

/// Replace `&`, `<` and `>` with their HTML entities.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn render_weather(
    snapshot: Option<&WeatherSnapshot>,
    place: &str,
    format: OutputFormat,
) -> String {
    let Some(snapshot) = snapshot else {
        return placeholder("No data available.", format);
    };

    let card = Card::from_snapshot(snapshot, place);
    match format {
        OutputFormat::Text => card.to_text(),
        OutputFormat::Html => card.to_html(),
    }
}

/// Shown in place of weather after a failed lookup.
pub fn render_no_results(format: OutputFormat) -> String {
    placeholder("No results.", format)
}

pub fn render_recent(view: &RecentView, format: OutputFormat) -> String {
    let items = match view {
        RecentView::Empty => {
            return match format {
                OutputFormat::Text => "No recent searches".to_string(),
                OutputFormat::Html => r#"<li class="small">No recent searches</li>"#.to_string(),
            };
        }
        RecentView::Items(items) => items,
    };

    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        match format {
            OutputFormat::Text => {
                let _ = writeln!(out, "{}. {}", i + 1, item);
            }
            OutputFormat::Html => {
                let item = escape_html(item.as_str());
                let _ = writeln!(out, r#"<li title="Click to search {item}">{item}</li>"#);
            }
        }
    }
    out.truncate(out.trim_end().len());
    out
}

fn placeholder(text: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => text.to_string(),
        OutputFormat::Html => format!(r#"<p class="small">{text}</p>"#),
    }
}

/// Display-ready fields of a weather card.
struct Card {
    temperature: String,
    place: String,
    timezone: String,
    wind_speed: String,
    wind_direction: String,
    observed: String,
    raw: String,
}

impl Card {
    fn from_snapshot(snapshot: &WeatherSnapshot, place: &str) -> Self {
        let cw = snapshot.current_weather();
        let field = |f: fn(&CurrentWeather) -> String| {
            cw.as_ref().map(f).unwrap_or_else(|| DASH.to_string())
        };

        Self {
            temperature: field(|c| format!("{}°C", round_half_up(c.temperature))),
            place: place.to_string(),
            timezone: snapshot.timezone().to_string(),
            wind_speed: field(|c| format!("{} km/h", c.windspeed)),
            wind_direction: field(|c| format!("{}°", c.winddirection)),
            observed: field(|c| local_time(&c.time)),
            raw: escape_html(&pretty_json(snapshot)),
        }
    }

    fn to_text(&self) -> String {
        format!(
            "{temp}\n{place} · {tz}\nWind: {ws}\nWind dir: {wd}\nAs of: {at}\n\nRaw response (trimmed)\n{raw}",
            temp = self.temperature,
            place = self.place,
            tz = self.timezone,
            ws = self.wind_speed,
            wd = self.wind_direction,
            at = self.observed,
            raw = self.raw,
        )
    }

    fn to_html(&self) -> String {
        format!(
            r#"<div class="current">
  <div>
    <div class="temp">{temp}</div>
    <div class="meta">{place} · {tz}</div>
  </div>
  <div class="details">
    <div class="small">Wind: {ws}</div>
    <div class="small">Wind dir: {wd}</div>
    <div class="small">As of: {at}</div>
  </div>
</div>
<section>
  <div class="small">Raw response (trimmed)</div>
  <pre>{raw}</pre>
</section>"#,
            temp = self.temperature,
            place = escape_html(&self.place),
            tz = escape_html(&self.timezone),
            ws = self.wind_speed,
            wd = self.wind_direction,
            at = escape_html(&self.observed),
            raw = self.raw,
        )
    }
}

/// Halves round towards positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        (floor + 1.0) as i64
    } else {
        floor as i64
    }
}

fn pretty_json(snapshot: &WeatherSnapshot) -> String {
    serde_json::to_string_pretty(snapshot.raw()).unwrap_or_else(|_| snapshot.raw().to_string())
}

/// Format an observation time in the viewer's locale convention.
///
/// Offset-less timestamps (what the forecast API returns) are read as
/// viewer-local time. Anything unparseable is shown as received.
fn local_time(time: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return format_local(&dt.with_timezone(&Local));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| format_local(&dt))
        .unwrap_or_else(|| time.to_string())
}

fn format_local(dt: &DateTime<Local>) -> String {
    dt.format("%x %X").to_string()
}
