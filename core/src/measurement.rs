use crate::observation::Observation;

/// The readings republished for every matching station, in publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    Humidity,
    TemperatureGround,
    Temperature10cm,
    WindSpeed,
    GustSpeed,
    AirPressure,
    Rain,
    SightRange,
}

impl Measurement {
    pub const ALL: [Measurement; 8] = [
        Measurement::Humidity,
        Measurement::TemperatureGround,
        Measurement::Temperature10cm,
        Measurement::WindSpeed,
        Measurement::GustSpeed,
        Measurement::AirPressure,
        Measurement::Rain,
        Measurement::SightRange,
    ];

    /// Last topic segment the measurement is published under.
    pub fn topic(self) -> &'static str {
        match self {
            Measurement::Humidity => "humidity",
            Measurement::TemperatureGround => "temperature.ground",
            Measurement::Temperature10cm => "temperature.10cm",
            Measurement::WindSpeed => "wind",
            Measurement::GustSpeed => "gust",
            Measurement::AirPressure => "pressure",
            Measurement::Rain => "rain",
            Measurement::SightRange => "sight",
        }
    }

    /// Raw feed value of this measurement for `observation`.
    pub fn value(self, observation: &Observation) -> &str {
        match self {
            Measurement::Humidity => &observation.humidity,
            Measurement::TemperatureGround => &observation.temperature_ground,
            Measurement::Temperature10cm => &observation.temperature_10cm,
            Measurement::WindSpeed => &observation.wind_speed,
            Measurement::GustSpeed => &observation.gust_speed,
            Measurement::AirPressure => &observation.air_pressure,
            Measurement::Rain => &observation.rain,
            Measurement::SightRange => &observation.sight_range,
        }
    }
}
