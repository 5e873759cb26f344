// Mock services written on first start when nothing is stored yet
use crate::models::service::{MetricSample, Service, ServiceStatus};
use crate::models::threshold::{ComparisonOperator, MetricKind, Threshold};

fn samples(latencies: &[f64]) -> Vec<MetricSample> {
    latencies
        .iter()
        .enumerate()
        .map(|(i, latency)| MetricSample::new(format!("{:02}:{:02}", 9 + i / 12, (i % 12) * 5), *latency))
        .collect()
}

pub fn default_services() -> Vec<Service> {
    let mut website = Service::new("svc-website", "Harsh Website", "https://harsh.example.com")
        .with_status(ServiceStatus::Down)
        .with_uptime(98.45)
        .with_history(samples(&[180.0, 210.0, 0.0]))
        .with_thresholds(vec![Threshold::new(
            "th-website-uptime",
            MetricKind::Uptime,
            ComparisonOperator::LessThan,
            99.9,
        )]);
    website.region = "eu-west-1".to_string();
    website.tags = Some(vec!["production".to_string(), "web".to_string()]);

    let mut payments = Service::new("svc-payments", "Payment Gateway", "https://pay.example.com/health")
        .with_status(ServiceStatus::Degraded)
        .with_uptime(99.95)
        .with_history(samples(&[190.0, 240.0, 320.0, 450.0]))
        .with_thresholds(vec![
            Threshold::new(
                "th-payments-latency",
                MetricKind::Latency,
                ComparisonOperator::GreaterThan,
                200.0,
            ),
            Threshold::new(
                "th-payments-errors",
                MetricKind::ErrorRate,
                ComparisonOperator::GreaterThan,
                10.0,
            ),
        ]);
    payments.region = "us-east-1".to_string();
    payments.tags = Some(vec!["production".to_string(), "payments".to_string()]);

    let mut auth = Service::new("svc-auth", "Auth Service", "https://auth.example.com/ping")
        .with_uptime(100.0)
        .with_history(samples(&[85.0, 92.0, 78.0]))
        .with_thresholds(vec![Threshold::with_defaults("th-auth-latency")]);
    auth.region = "us-east-1".to_string();

    let mut search = Service::new("svc-search", "Search API", "https://search.example.com/status")
        .with_uptime(99.99)
        .with_history(samples(&[140.0, 155.0, 149.0]));
    search.region = "ap-southeast-2".to_string();

    vec![website, payments, auth, search]
}
