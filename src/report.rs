//! Parsers for dokku's report formats.
//!
//! Three of these reports cover all applications at once and are correlated
//! with the `apps:list` order purely by position. Every parser that relies
//! on that correlation checks it: line counts must match the app count and
//! each domains block must name the app it is assigned to. A mismatch is an
//! [`IntegrityError`], never a best-effort guess.

use crate::IntegrityError;
use crate::models::{Config, Metadata};

/// Lines per application in `domains:report`.
pub const DOMAINS_BLOCK_LINES: usize = 5;

/// Index of the `app vhosts:` line inside a domains block.
const VHOSTS_LINE: usize = 2;

const APPS_REPORT: &str = "apps:report";
const DOMAINS_REPORT: &str = "domains:report";
const CONFIG_EXPORT: &str = "config:export";

/// Parse `apps:list`: a header line, then one app name per line.
///
/// ```
/// use lazydokku::report::parse_app_list;
/// let names = parse_app_list("=====> My Apps\n  api\nweb\n");
/// assert_eq!(names, vec!["api", "web"]);
/// ```
pub fn parse_app_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `apps:report --format json`: one JSON object per app, in
/// `apps:list` order.
pub fn parse_apps_report(
    output: &str,
    names: &[String],
) -> Result<Vec<Metadata>, IntegrityError> {
    let lines: Vec<&str> = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() != names.len() {
        return Err(IntegrityError::LineCount {
            report: APPS_REPORT,
            expected: names.len(),
            found: lines.len(),
        });
    }

    lines
        .iter()
        .zip(names)
        .map(|(line, name)| {
            serde_json::from_str::<Metadata>(line).map_err(|e| IntegrityError::InvalidJson {
                report: APPS_REPORT,
                app: name.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Parse `domains:report` for all apps.
///
/// The report is a sequence of fixed five-line blocks in `apps:list` order:
///
/// ```text
/// =====> web domains information
/// Domains app enabled:           true
/// Domains app vhosts:            web.example.com www.example.com
/// Domains global enabled:        false
/// Domains global vhosts:
/// ```
pub fn parse_domains_report(
    output: &str,
    names: &[String],
) -> Result<Vec<Vec<String>>, IntegrityError> {
    let mut lines: Vec<&str> = output.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let expected = names.len() * DOMAINS_BLOCK_LINES;
    if lines.len() != expected {
        return Err(IntegrityError::LineCount {
            report: DOMAINS_REPORT,
            expected,
            found: lines.len(),
        });
    }

    lines
        .chunks(DOMAINS_BLOCK_LINES)
        .zip(names)
        .map(|(block, name)| {
            let header = block[0];
            if !header.contains(name.as_str()) {
                return Err(IntegrityError::AppMismatch {
                    expected: name.clone(),
                    header: header.trim().to_string(),
                });
            }
            parse_vhosts_line(block[VHOSTS_LINE])
        })
        .collect()
}

/// Parse a `<label>: <host> <host> ...` line into its hostnames.
///
/// ```
/// use lazydokku::report::parse_vhosts_line;
/// let hosts = parse_vhosts_line("Domains app vhosts:   a.example.com b.example.com").unwrap();
/// assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
/// ```
pub fn parse_vhosts_line(line: &str) -> Result<Vec<String>, IntegrityError> {
    let (_, hosts) = line
        .split_once(':')
        .ok_or_else(|| IntegrityError::MalformedLine {
            report: DOMAINS_REPORT,
            line: line.trim().to_string(),
        })?;
    Ok(hosts.split_whitespace().map(str::to_string).collect())
}

/// Parse `config:export --format=json <app>`: a flat object of strings.
pub fn parse_config_export(output: &str, app: &str) -> Result<Config, IntegrityError> {
    serde_json::from_str::<Config>(output.trim()).map_err(|e| IntegrityError::InvalidJson {
        report: CONFIG_EXPORT,
        app: app.to_string(),
        reason: e.to_string(),
    })
}
