use crate::NOT_AVAILABLE;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use thiserror::Error;

const ROOT_ELEMENT: &str = "buienradarnl";

/// Current readings of one weather station, as text straight from the feed.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Observation {
    #[serde(rename = "stationcode", default)]
    pub code: String,
    #[serde(rename = "stationnaam", default)]
    pub station: StationName,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
    #[serde(rename = "luchtvochtigheid", default)]
    pub humidity: String,
    #[serde(rename = "temperatuurGC", default)]
    pub temperature_ground: String,
    #[serde(rename = "temperatuur10cm", default)]
    pub temperature_10cm: String,
    #[serde(rename = "windsnelheidMS", default)]
    pub wind_speed: String,
    #[serde(rename = "windstotenMS", default)]
    pub gust_speed: String,
    #[serde(rename = "luchtdruk", default)]
    pub air_pressure: String,
    #[serde(rename = "zichtmeters", default)]
    pub sight_range: String,
    #[serde(rename = "regenMMPU", default)]
    pub rain: String,
}

/// `<stationnaam regio="...">name</stationnaam>`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StationName {
    #[serde(rename = "@regio", default)]
    pub region: String,
    #[serde(rename = "$text", default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    weergegevens: WeatherData,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherData {
    #[serde(default)]
    actueel_weer: CurrentWeather,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    weerstations: Stations,
}

#[derive(Debug, Default, Deserialize)]
struct Stations {
    #[serde(rename = "weerstation", default)]
    stations: Vec<Observation>,
}

#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("malformed feed document: {0}")]
    Malformed(#[from] quick_xml::DeError),

    #[error("unreadable feed document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected root element `{0}`, expected `buienradarnl`")]
    UnexpectedRoot(String),

    #[error("feed document has no root element")]
    MissingRoot,
}

impl Observation {
    /// Region name lower-cased with spaces turned into hyphens.
    pub fn normalized_region(&self) -> String {
        normalize_region(&self.station.region)
    }

    pub fn in_region(&self, target_region: &str) -> bool {
        self.normalized_region() == target_region
    }
}

/// Parses the feed body into its stations, keeping feed order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<Observation>, FeedParseError> {
    check_root(body)?;
    let document: FeedDocument = quick_xml::de::from_reader(body)?;
    Ok(document.weergegevens.actueel_weer.weerstations.stations)
}

/// The deserializer accepts any root element, so the name is checked up front.
fn check_root(body: &[u8]) -> Result<(), FeedParseError> {
    let mut reader = Reader::from_reader(body);
    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                let name = element.name();
                if name.as_ref() == ROOT_ELEMENT.as_bytes() {
                    return Ok(());
                }
                let name = String::from_utf8_lossy(name.as_ref()).into_owned();
                return Err(FeedParseError::UnexpectedRoot(name));
            }
            Event::Eof => return Err(FeedParseError::MissingRoot),
            _ => {}
        }
    }
}

/// Maps the feed's not-available sentinel to an empty string.
pub fn normalize_value(value: &str) -> &str {
    if value == NOT_AVAILABLE { "" } else { value }
}

pub fn normalize_region(region: &str) -> String {
    region.to_lowercase().replace(' ', "-")
}
