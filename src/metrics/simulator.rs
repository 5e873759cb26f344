// Simulated polling: random-walk latency samples for the mock services
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{MetricSample, Service, ServiceStatus};

/// Samples kept per service (four hours at five-minute resolution)
pub const MAX_HISTORY: usize = 48;

const STARTING_LATENCY_MS: f64 = 100.0;
const MIN_LATENCY_MS: f64 = 20.0;
const MAX_LATENCY_MS: f64 = 2_000.0;

/// Largest step between two samples; anything wider would only pin the walk
/// to the latency bounds
pub const MAX_JITTER_MS: f64 = MAX_LATENCY_MS;

#[derive(Debug)]
pub struct MetricSimulator {
    rng: StdRng,
    jitter_ms: f64,
}

impl MetricSimulator {
    pub fn new(seed: Option<u64>, jitter_ms: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let jitter_ms = if jitter_ms.is_finite() {
            jitter_ms.abs().min(MAX_JITTER_MS)
        } else {
            tracing::warn!(jitter_ms, "Ignoring non-finite simulation jitter");
            0.0
        };
        Self { rng, jitter_ms }
    }

    /// Append one latency sample to every polled service.
    ///
    /// Services that are down or in maintenance are not polled; their status
    /// is left to whoever set it.
    pub fn advance(&mut self, services: &mut [Service], now: DateTime<Utc>) -> usize {
        let label = now.format("%H:%M").to_string();
        let mut sampled = 0;

        for service in services.iter_mut() {
            if matches!(service.status, ServiceStatus::Down | ServiceStatus::Maintenance) {
                continue;
            }

            let previous = service.latest_latency().unwrap_or(STARTING_LATENCY_MS);
            let drift = if service.status == ServiceStatus::Degraded {
                self.jitter_ms / 4.0
            } else {
                0.0
            };
            let delta = if self.jitter_ms > 0.0 {
                self.rng.gen_range(-self.jitter_ms..=self.jitter_ms)
            } else {
                0.0
            };
            let latency = (previous + delta + drift).clamp(MIN_LATENCY_MS, MAX_LATENCY_MS);

            service.history.push(MetricSample::new(label.clone(), latency.round()));
            if service.history.len() > MAX_HISTORY {
                let excess = service.history.len() - MAX_HISTORY;
                service.history.drain(..excess);
            }
            service.last_checked = now.to_rfc3339();
            sampled += 1;
        }

        sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> Vec<Service> {
        vec![
            Service::new("up", "Up", "https://up.example.com"),
            Service::new("down", "Down", "https://down.example.com").with_status(ServiceStatus::Down),
            Service::new("maint", "Maint", "https://maint.example.com")
                .with_status(ServiceStatus::Maintenance),
        ]
    }

    #[test]
    fn test_only_polled_services_get_samples() {
        let mut services = services();
        let mut simulator = MetricSimulator::new(Some(7), 25.0);

        let sampled = simulator.advance(&mut services, Utc::now());

        assert_eq!(sampled, 1);
        assert_eq!(services[0].history.len(), 1);
        assert!(services[1].history.is_empty());
        assert!(services[2].history.is_empty());
        assert!(!services[0].last_checked.is_empty());
    }

    #[test]
    fn test_latency_stays_in_bounds() {
        let mut services = services();
        let mut simulator = MetricSimulator::new(Some(42), 5_000.0);

        for _ in 0..200 {
            simulator.advance(&mut services, Utc::now());
        }

        assert_eq!(services[0].history.len(), MAX_HISTORY);
        for sample in &services[0].history {
            assert!(sample.latency >= MIN_LATENCY_MS && sample.latency <= MAX_LATENCY_MS);
        }
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mut a = services();
        let mut b = services();
        let now = Utc::now();
        MetricSimulator::new(Some(9), 30.0).advance(&mut a, now);
        MetricSimulator::new(Some(9), 30.0).advance(&mut b, now);
        assert_eq!(a[0].history, b[0].history);
    }

    #[test]
    fn test_huge_jitter_is_capped() {
        let mut services = services();
        let mut simulator = MetricSimulator::new(Some(1), 1e308);
        assert_eq!(simulator.jitter_ms, MAX_JITTER_MS);

        for _ in 0..20 {
            assert_eq!(simulator.advance(&mut services, Utc::now()), 1);
        }
        let latest = services[0].latest_latency().unwrap();
        assert!((MIN_LATENCY_MS..=MAX_LATENCY_MS).contains(&latest));
    }

    #[test]
    fn test_non_finite_jitter_means_no_jitter() {
        for jitter in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut services = vec![Service::new("up", "Up", "https://up.example.com")
                .with_history(vec![MetricSample::new("09:00", 250.0)])];
            let mut simulator = MetricSimulator::new(Some(3), jitter);
            assert_eq!(simulator.jitter_ms, 0.0);
            simulator.advance(&mut services, Utc::now());
            assert_eq!(services[0].latest_latency(), Some(250.0));
        }
    }

    #[test]
    fn test_zero_jitter_holds_latency() {
        let mut services = vec![Service::new("up", "Up", "https://up.example.com")
            .with_history(vec![MetricSample::new("09:00", 250.0)])];
        let mut simulator = MetricSimulator::new(Some(1), 0.0);
        simulator.advance(&mut services, Utc::now());
        assert_eq!(services[0].latest_latency(), Some(250.0));
    }
}
