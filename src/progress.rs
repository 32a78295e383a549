//! Fetch progress reporting.
//!
//! Reports what a view is loading so users of `proteus` see each request
//! phase, including the second, expanded request of a two-phase fetch.
//! Progress is emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;
use std::str::FromStr;

use proteus_core::chart::format_count;

/// A single progress event for one view's load.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchProgressEvent {
    /// First-phase request with the default page size.
    Requesting { view: String, rows: usize },
    /// More matches than the page holds; re-requesting all of them.
    Expanding { view: String, num_found: u64 },
    /// Documents received and handed to the view.
    Loaded { view: String, docs: usize },
}

/// Reports fetch progress. Implementations write to stderr (human or JSON).
pub trait FetchProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the fetch coordinator.
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "fetch licenses  expanding to 1,234 rows".
pub struct StderrProgress;

fn human_line(event: &FetchProgressEvent) -> String {
    match event {
        FetchProgressEvent::Requesting { view, rows } => {
            format!("fetch {}  requesting {} rows\n", view, rows)
        }
        FetchProgressEvent::Expanding { view, num_found } => {
            format!(
                "fetch {}  expanding to {} rows\n",
                view,
                format_count(*num_found as f64)
            )
        }
        FetchProgressEvent::Loaded { view, docs } => {
            format!("fetch {}  loaded {} docs\n", view, format_count(*docs as f64))
        }
    }
}

impl FetchProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = human_line(&event);
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

fn json_line(event: &FetchProgressEvent) -> serde_json::Value {
    match event {
        FetchProgressEvent::Requesting { view, rows } => serde_json::json!({
            "event": "progress",
            "view": view,
            "phase": "requesting",
            "rows": rows
        }),
        FetchProgressEvent::Expanding { view, num_found } => serde_json::json!({
            "event": "progress",
            "view": view,
            "phase": "expanding",
            "num_found": num_found
        }),
        FetchProgressEvent::Loaded { view, docs } => serde_json::json!({
            "event": "progress",
            "view": view,
            "phase": "loaded",
            "docs": docs
        }),
    }
}

impl FetchProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        if let Ok(line) = serde_json::to_string(&json_line(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl FetchProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn FetchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "unknown progress mode '{}'. Use off, human, or json.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_lines_group_thousands() {
        let line = human_line(&FetchProgressEvent::Expanding {
            view: "audit".into(),
            num_found: 12_345,
        });
        assert_eq!(line, "fetch audit  expanding to 12,345 rows\n");

        let line = human_line(&FetchProgressEvent::Requesting {
            view: "licenses".into(),
            rows: 10,
        });
        assert_eq!(line, "fetch licenses  requesting 10 rows\n");
    }

    #[test]
    fn json_lines_carry_phase() {
        let obj = json_line(&FetchProgressEvent::Loaded {
            view: "mime-top".into(),
            docs: 3,
        });
        assert_eq!(obj["phase"], "loaded");
        assert_eq!(obj["docs"], 3);
        assert_eq!(obj["view"], "mime-top");
    }

    #[test]
    fn progress_mode_parses() {
        assert_eq!("json".parse::<ProgressMode>(), Ok(ProgressMode::Json));
        assert!("loud".parse::<ProgressMode>().is_err());
    }
}
