//! Config validation.
//!
//! Checks run in order: syntax, unknown keys (with "did you mean" hints),
//! types, then semantic checks on the parsed config.

use std::{
    collections::HashSet,
    fmt,
    net::IpAddr,
    path::{Path, PathBuf},
};

use {
    jabberfeed_xmpp::{Address, RoomAddress, StreamSecurity},
    secrecy::ExposeSecret,
};

use crate::{
    loader::{Format, parse_config, parse_config_value, read_config},
    schema::JabberfeedConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// One finding about a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// "io", "syntax", "unknown-field", "type-error", "required", "invalid",
    /// "deprecated", "duplicate"
    pub category: &'static str,
    /// Dotted path, e.g. `xmpp.rooms[1]`. Empty for whole-file problems.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Keys accepted in each section. `decorate.add_field` is free-form.
const SECTIONS: &[(&str, &[&str])] = &[
    ("xmpp", &[
        "user",
        "password",
        "rooms",
        "host",
        "port",
        "use_tls",
        "allow_plaintext",
        "connect_timeout_secs",
        "debug",
    ]),
    ("codec", &["kind"]),
    ("decorate", &["type", "tags", "add_field"]),
    ("output", &["queue_capacity", "pretty"]),
    ("metrics", &["enabled", "listen"]),
];

/// Validate the config file at `path`.
pub fn validate(path: &Path) -> ValidationResult {
    let mut result = match (read_config(path), Format::from_path(path)) {
        (Ok(raw), Ok(format)) => validate_str(&raw, format),
        (Err(e), _) | (_, Err(e)) => ValidationResult {
            diagnostics: vec![Diagnostic::error("io", "", format!("{e:#}"))],
            config_path: None,
        },
    };
    result.config_path = Some(path.to_path_buf());
    result
}

/// Validate raw config text, already env-substituted.
pub fn validate_str(raw: &str, format: Format) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let value = match parse_config_value(raw, format) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(Diagnostic::error("syntax", "", format!("{e}")));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };
    check_unknown_keys(&value, &mut diagnostics);

    match parse_config(raw, format) {
        Ok(config) => diagnostics.extend(check_config(&config)),
        Err(e) => diagnostics.push(Diagnostic::error("type-error", "", format!("{e}"))),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_keys(value: &serde_json::Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(root) = value.as_object() else {
        return;
    };
    let section_names: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();

    for (key, section) in root {
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            diagnostics.push(unknown_key(key.clone(), key, &section_names));
            continue;
        };
        let Some(table) = section.as_object() else {
            continue;
        };
        for field in table.keys() {
            if !fields.contains(&field.as_str()) {
                diagnostics.push(unknown_key(format!("{key}.{field}"), field, fields));
            }
        }
    }
}

fn unknown_key(path: String, key: &str, candidates: &[&str]) -> Diagnostic {
    let message = match suggest(key, candidates) {
        Some(hint) => format!("unknown field (did you mean \"{hint}\"?)"),
        None => "unknown field".to_string(),
    };
    Diagnostic::error("unknown-field", path, message)
}

/// Semantic checks on a parsed config.
pub fn check_config(config: &JabberfeedConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let xmpp = &config.xmpp;

    if xmpp.user.trim().is_empty() {
        out.push(Diagnostic::error("required", "xmpp.user", "is required"));
    } else {
        match Address::parse(&xmpp.user) {
            Ok(address) if address.node.is_none() => out.push(Diagnostic::error(
                "invalid",
                "xmpp.user",
                format!("{:?} has no node; expected user@domain", xmpp.user),
            )),
            Ok(_) => {},
            Err(e) => out.push(Diagnostic::error("invalid", "xmpp.user", e.to_string())),
        }
    }

    if xmpp.password.expose_secret().is_empty() {
        out.push(Diagnostic::error("required", "xmpp.password", "is required"));
    }

    let mut seen = HashSet::new();
    for (i, room) in xmpp.rooms.iter().enumerate() {
        let path = format!("xmpp.rooms[{i}]");
        match RoomAddress::parse(room) {
            Ok(address) => {
                if !seen.insert(address.room()) {
                    out.push(Diagnostic::warning(
                        "duplicate",
                        path,
                        format!("room {} is listed more than once", address.room()),
                    ));
                }
            },
            Err(e) => out.push(Diagnostic::error("invalid", path, e.to_string())),
        }
    }

    if xmpp.port == 0 {
        out.push(Diagnostic::error("invalid", "xmpp.port", "must be non-zero"));
    }

    if xmpp.allow_plaintext && xmpp.use_tls {
        out.push(Diagnostic::warning(
            "conflict",
            "xmpp.allow_plaintext",
            "ignored while xmpp.use_tls is true",
        ));
    }
    let security = StreamSecurity::from_flags(xmpp.use_tls, xmpp.allow_plaintext);
    if security == StreamSecurity::Plaintext {
        let target = xmpp
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .or_else(|| Address::parse(&xmpp.user).ok().map(|a| a.domain));
        if let Some(target) = target
            && !is_loopback(&target)
        {
            out.push(Diagnostic::warning(
                "insecure",
                "xmpp.allow_plaintext",
                format!("the password is sent unencrypted to {target}"),
            ));
        }
    }

    if xmpp.connect_timeout_secs == 0 {
        out.push(Diagnostic::warning(
            "invalid",
            "xmpp.connect_timeout_secs",
            "0 is treated as 1 second",
        ));
    }

    if xmpp.debug {
        out.push(Diagnostic::warning(
            "deprecated",
            "xmpp.debug",
            "deprecated; use --log-level or RUST_LOG instead",
        ));
    }

    if config.output.queue_capacity == 0 {
        out.push(Diagnostic::error(
            "invalid",
            "output.queue_capacity",
            "must be at least 1",
        ));
    }

    match (config.metrics.enabled, config.metrics.listen) {
        (false, Some(_)) => out.push(Diagnostic::warning(
            "invalid",
            "metrics.listen",
            "ignored while metrics.enabled is false",
        )),
        (true, None) => out.push(Diagnostic::warning(
            "invalid",
            "metrics.listen",
            "metrics are enabled but not exported without a listen address",
        )),
        _ => {},
    }

    out
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

fn suggest<'a>(needle: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (edit_distance(needle, c), *c))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diag
            } else {
                1 + diag.min(above).min(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}
