use crate::config::Config;
use crate::datasources::{OpenWeatherMapClient, TideClient};
use crate::logic::{self, poller, ProviderHandle};
use crate::models::{FishingConditions, ProviderState, TideDay, WeatherSnapshot};
use chrono::NaiveDate;
use std::fmt::Write;
use std::future::Future;

/// The two running providers plus the conditions derived from them
pub struct App {
    pub weather: ProviderHandle<WeatherSnapshot>,
    pub tides: ProviderHandle<Vec<TideDay>>,
}

impl App {
    /// Start both providers from configuration. Must run inside a tokio runtime.
    pub fn start(config: &Config) -> Self {
        let weather_client = OpenWeatherMapClient::new(
            config.openweathermap.clone(),
            config.location.coordinates(),
        );
        if config.location.coordinates().is_none() {
            tracing::warn!("No coordinates configured - weather uses the default location");
        }

        let weather = poller::start(weather_client, config.openweathermap.refresh_interval());
        let tides = poller::start(
            TideClient::from_config(config),
            config.tides.refresh_interval(),
        );

        Self::from_handles(weather, tides)
    }

    pub fn from_handles(
        weather: ProviderHandle<WeatherSnapshot>,
        tides: ProviderHandle<Vec<TideDay>>,
    ) -> Self {
        Self { weather, tides }
    }

    pub fn conditions(&self) -> FishingConditions {
        let weather = self.weather.state();
        let tides = self.tides.state();
        logic::derive(weather.data.as_ref(), tides_or_empty(&tides))
    }

    pub fn conditions_on(&self, today: NaiveDate) -> FishingConditions {
        let weather = self.weather.state();
        let tides = self.tides.state();
        logic::derive_on(today, weather.data.as_ref(), tides_or_empty(&tides))
    }

    /// Both providers still waiting on their first result. A refresh over
    /// cached data does not count.
    pub fn is_loading(&self) -> bool {
        awaiting_first(&self.weather.state()) && awaiting_first(&self.tides.state())
    }

    pub fn stop(&self) {
        self.weather.stop();
        self.tides.stop();
    }

    /// Emit a report now and again whenever either provider changes, until
    /// `shutdown` completes.
    pub async fn run_until<F: Future>(&self, shutdown: F, mut emit: impl FnMut(String)) {
        let mut weather_rx = self.weather.subscribe();
        let mut tides_rx = self.tides.subscribe();
        tokio::pin!(shutdown);

        emit(self.report());

        loop {
            tokio::select! {
                changed = weather_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = tides_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
            }

            // Both cells may have moved; consume both so we emit once
            weather_rx.borrow_and_update();
            tides_rx.borrow_and_update();
            emit(self.report());
        }
    }

    /// Plain-text status block for the terminal
    pub fn report(&self) -> String {
        let mut out = String::new();
        if self.is_loading() {
            out.push_str("Loading...\n");
            return out;
        }

        let weather = self.weather.state();
        let tides = self.tides.state();
        let conditions = self.conditions();
        let _ = writeln!(
            out,
            "Fishing: {} ({})",
            conditions.rating, conditions.moon_phase
        );
        let _ = writeln!(out, "  Moon:      {}", conditions.factors.moon);
        let _ = writeln!(out, "  Weather:   {}", conditions.factors.weather);
        let _ = writeln!(out, "  Barometer: {} (estimated)", conditions.factors.barometer);
        let _ = writeln!(out, "  Tides:     {}", conditions.factors.tides);

        write_weather(&mut out, &weather);
        write_tides(&mut out, &tides);
        out
    }
}

fn awaiting_first<T>(state: &ProviderState<T>) -> bool {
    state.loading && state.data.is_none()
}

fn tides_or_empty(state: &ProviderState<Vec<TideDay>>) -> &[TideDay] {
    state.data.as_deref().unwrap_or(&[])
}

fn write_weather(out: &mut String, state: &ProviderState<WeatherSnapshot>) {
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Weather error: {}", error);
        if state.is_stale() {
            let _ = writeln!(out, "  (showing last good data)");
        }
    }
    if let Some(snapshot) = &state.data {
        let current = &snapshot.current;
        let _ = writeln!(
            out,
            "Now: {:.0}°F (feels {:.0}°F), {}, humidity {:.0}%, wind {:.0} mph",
            current.temp_f,
            current.feels_like_f,
            current.primary().map_or("-", |c| c.description.as_str()),
            current.humidity_percent,
            current.wind_speed_mph
        );
        for day in snapshot.daily.iter().take(7) {
            let label = day
                .conditions
                .first()
                .map(|c| c.main.as_str())
                .unwrap_or("-");
            let date = chrono::DateTime::from_timestamp(day.dt, 0)
                .map(|d| d.format("%a %d").to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {}  {:>3.0}/{:<3.0} {:<12} {:>3.0}%",
                date,
                day.max_temp_f,
                day.min_temp_f,
                label,
                day.precipitation_prob * 100.0
            );
        }
    }
}

fn write_tides(out: &mut String, state: &ProviderState<Vec<TideDay>>) {
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Tide error: {}", error);
        if state.is_stale() {
            let _ = writeln!(out, "  (showing last good data)");
        }
    }
    if let Some(days) = &state.data {
        for day in days.iter().take(2) {
            let events: Vec<String> = day
                .tides
                .iter()
                .map(|t| format!("{} {} {:.1}ft", t.tide_type, t.time, t.height_ft))
                .collect();
            let _ = writeln!(out, "Tides {}: {}", day.date, events.join(", "));
        }
    }
}
