//! Result files: JSON, CSV or plain text.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde_json::json;
use subdomain_finder_core::VerificationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// `results_<domain>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name(domain: &str, format: OutputFormat, now: DateTime<Local>) -> String {
    let safe_domain = domain.replace(['/', '\\'], "_");
    format!(
        "results_{safe_domain}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Where to write results.
///
/// No path gives the timestamped default name. A directory gets the default name
/// inside it. Anything else gets the format's extension.
pub fn resolve_output_path(
    requested: Option<&Path>,
    domain: &str,
    format: OutputFormat,
    now: DateTime<Local>,
) -> PathBuf {
    let Some(path) = requested else {
        return PathBuf::from(default_file_name(domain, format, now));
    };
    let looks_like_dir = path.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR);
    if looks_like_dir || path.is_dir() {
        return path.join(default_file_name(domain, format, now));
    }
    path.with_extension(format.extension())
}

/// Sibling file for verification records: `<stem>_verified.json`.
pub fn verification_path(results_path: &Path) -> PathBuf {
    let stem = results_path
        .file_stem()
        .map_or_else(|| String::from("results"), |s| s.to_string_lossy().into_owned());
    results_path.with_file_name(format!("{stem}_verified.json"))
}

/// Serialize canonical subdomains.
pub fn render_subdomains(domain: &str, subdomains: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let doc = json!({
                "domain": domain,
                "count": subdomains.len(),
                "subdomains": subdomains,
            });
            Ok(serde_json::to_string_pretty(&doc)?)
        }
        OutputFormat::Csv => {
            let mut out = String::from("subdomain\n");
            for host in subdomains {
                writeln!(out, "{host}")?;
            }
            Ok(out)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for host in subdomains {
                writeln!(out, "{host}")?;
            }
            Ok(out)
        }
    }
}

/// Serialize verification records as `{count, results}`.
pub fn render_verification(records: &[VerificationRecord]) -> Result<String> {
    let doc = json!({
        "count": records.len(),
        "results": records,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write `contents` to `path`, creating parent directories.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn hosts() -> Vec<String> {
        vec!["a.example.com".into(), "b.example.com".into()]
    }

    #[test]
    fn default_name_is_timestamped() {
        assert_eq!(
            default_file_name("example.com", OutputFormat::Json, fixed_now()),
            "results_example.com_20240309_140507.json"
        );
    }

    #[test]
    fn explicit_path_gets_extension() {
        let path = resolve_output_path(
            Some(Path::new("out/scan.txt")),
            "example.com",
            OutputFormat::Csv,
            fixed_now(),
        );
        assert_eq!(path, PathBuf::from("out/scan.csv"));
    }

    #[test]
    fn directory_gets_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output_path(
            Some(dir.path()),
            "example.com",
            OutputFormat::Text,
            fixed_now(),
        );
        assert_eq!(
            path,
            dir.path().join("results_example.com_20240309_140507.txt")
        );
    }

    #[test]
    fn verification_sibling() {
        assert_eq!(
            verification_path(Path::new("out/results_x.json")),
            PathBuf::from("out/results_x_verified.json")
        );
    }

    #[test]
    fn renders_json() {
        let text = render_subdomains("example.com", &hosts(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["subdomains"][1], "b.example.com");
        assert_eq!(value["domain"], "example.com");
    }

    #[test]
    fn renders_csv_with_header() {
        let text = render_subdomains("example.com", &hosts(), OutputFormat::Csv).unwrap();
        assert_eq!(text, "subdomain\na.example.com\nb.example.com\n");
    }

    #[test]
    fn renders_text() {
        let text = render_subdomains("example.com", &hosts(), OutputFormat::Text).unwrap();
        assert_eq!(text, "a.example.com\nb.example.com\n");
    }

    #[test]
    fn renders_verification() {
        let records = vec![VerificationRecord {
            host: "a.example.com".into(),
            ips: vec!["10.0.0.1".parse().unwrap()],
            http_ok: true,
            http_status: Some(200),
            final_url: Some("https://a.example.com/".into()),
            error: None,
        }];
        let value: serde_json::Value =
            serde_json::from_str(&render_verification(&records).unwrap()).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"][0]["httpStatus"], 200);
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        write_file(&path, "x\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x\n");
    }
}
