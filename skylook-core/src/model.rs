use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Label recorded when the weather was looked up by position.
pub const MY_LOCATION: &str = "My Location";

/// A display string naming a place, e.g. "Paris, Île-de-France, France".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceLabel(String);

impl PlaceLabel {
    /// Returns `None` for blank input: an empty label is the same as no label.
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            None
        } else {
            Some(Self(label))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison on the full string.
    pub fn same_place(&self, other: &PlaceLabel) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl fmt::Display for PlaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlaceLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// "Lat 48.857, Lon 2.352"
    pub fn label(&self) -> String {
        format!("Lat {:.3}, Lon {:.3}", self.latitude, self.longitude)
    }
}

/// First-ranked candidate from the geocoding service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoResult {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl GeoResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "name, country", the form kept in the recent list.
    pub fn recent_label(&self) -> String {
        join_parts(&self.name, &[self.country.as_deref()])
    }

    /// "name, admin1, country", the form shown next to the weather.
    pub fn display_label(&self) -> String {
        join_parts(&self.name, &[self.admin1.as_deref(), self.country.as_deref()])
    }
}

fn join_parts(head: &str, rest: &[Option<&str>]) -> String {
    let mut out = head.to_string();
    for part in rest.iter().flatten().filter(|p| !p.is_empty()) {
        out.push_str(", ");
        out.push_str(part);
    }
    out
}

/// The `current_weather` block of a forecast response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub time: String,
}

/// Raw forecast response, kept as decoded so it can be shown verbatim.
///
/// Nothing about its shape is guaranteed; accessors return `None` rather
/// than failing when a field is missing or has the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    raw: Value,
}

impl WeatherSnapshot {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn current_weather(&self) -> Option<CurrentWeather> {
        let block = self.raw.get("current_weather")?;
        serde_json::from_value(block.clone()).ok()
    }

    /// Timezone reported by the service, "UTC" when absent.
    pub fn timezone(&self) -> &str {
        self.raw.get("timezone").and_then(Value::as_str).unwrap_or("UTC")
    }
}

impl From<Value> for WeatherSnapshot {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}
