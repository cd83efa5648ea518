//! Environmental sensor readings.

pub mod reading;

pub use reading::{
    CURRENT_SCHEMA_VERSION, EnvironmentalReading, MarineObservation, ReadingPayload,
    WeatherObservation,
};
