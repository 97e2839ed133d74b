use clap::ValueEnum;
use lead_research::config::MAX_WORKERS;
use lead_research::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// How single-lead commands print their result when no output file is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Json,
    #[default]
    Summary,
}

pub(crate) fn parse_worker_count(raw: &str) -> Result<usize, String> {
    let workers: usize = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a worker count ({err})"))?;
    if !(1..=MAX_WORKERS).contains(&workers) {
        return Err(format!("--parallel must be between 1 and {MAX_WORKERS}"));
    }
    Ok(workers)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, payload)?;
    Ok(())
}

pub(crate) fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_must_be_within_pool_bounds() {
        assert_eq!(parse_worker_count("4"), Ok(4));
        assert_eq!(parse_worker_count(" 10 "), Ok(10));
        assert!(parse_worker_count("0").is_err());
        assert!(parse_worker_count("11").is_err());
        assert!(parse_worker_count("many").is_err());
    }

    #[test]
    fn write_json_pretty_prints_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.json");
        write_json(&path, &serde_json::json!({"status": "ok"})).expect("write");

        let raw = std::fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("\"status\": \"ok\""));
    }
}
