//! Prometheus registry and exposition for the server binaries.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

use lectern_core::metrics::register_core_metrics;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_core_metrics(&registry);
    registry
});

/// Render all registered metrics in the text exposition format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exposition_format() {
        lectern_core::metrics::JOBS_PROCESSED
            .with_label_values(&["completed"])
            .inc();
        let output = render();
        assert!(output.contains("lectern_jobs_processed_total"));
    }
}
