use crate::constants::filter::{PREFIXES, SENTINELS};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\r|\n").expect("line break regex"));

/// Keeps only result lines the external program emits on purpose and drops
/// loader and driver noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFilter {
    sentinels: Vec<String>,
    prefixes: Vec<String>,
}

impl OutputFilter {
    pub fn new(sentinels: Vec<String>, prefixes: Vec<String>) -> Self {
        Self {
            sentinels: sentinels
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            prefixes: prefixes
                .iter()
                .map(|p| p.trim_start())
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_result_line(&self, line: &str) -> bool {
        self.sentinels.iter().any(|s| s == line)
            || self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    pub fn apply(&self, raw: &str) -> String {
        LINE_BREAK_RE
            .split(raw)
            .map(str::trim)
            .filter(|line| !line.is_empty() && self.is_result_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for OutputFilter {
    fn default() -> Self {
        Self::new(
            SENTINELS.iter().map(|s| s.to_string()).collect(),
            PREFIXES.iter().map(|p| p.to_string()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_native_noise() {
        let filter = OutputFilter::default();
        assert_eq!(
            filter.apply("WRITTEN=E200001A\n[native] loaded driver v1\n"),
            "WRITTEN=E200001A"
        );
    }

    #[test]
    fn handles_every_line_terminator() {
        let filter = OutputFilter::default();
        let raw = "  OK  \r\nWARNING: restricted method\rDETECTED=E1\n\nNO_TAG\r\n";
        assert_eq!(filter.apply(raw), "OK\nDETECTED=E1\nNO_TAG");
    }

    #[test]
    fn sentinels_match_exactly_prefixes_match_start() {
        let filter = OutputFilter::default();
        assert_eq!(
            filter.apply("OK power=30\nOKAY\nNO_TAGS\nERROR=DEVICE_NOT_FOUND"),
            "ERROR=DEVICE_NOT_FOUND"
        );
        assert_eq!(filter.apply("xERROR=1"), "");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(OutputFilter::default().apply(""), "");
        assert_eq!(OutputFilter::default().apply("\r\n\n  \r"), "");
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = OutputFilter::default();
        let samples = [
            "OK\n junk \nEPC=3000\r\n\tDETECTED=A B \n",
            "Tag detectado: E2\nWRITTEN=E2\r\rERROR=x\n",
            "",
        ];
        for raw in samples {
            let once = filter.apply(raw);
            assert_eq!(filter.apply(&once), once);
        }
    }

    #[test]
    fn every_kept_line_is_in_vocabulary() {
        let filter = OutputFilter::default();
        let raw = "a\nOK\n\nDETECTED=1\n  NO_TAG  \nb=c\nEPC=\n";
        for line in filter.apply(raw).split('\n') {
            assert!(!line.is_empty());
            assert!(filter.is_result_line(line), "unexpected line {:?}", line);
        }
    }

    #[test]
    fn custom_vocabulary_ignores_blank_entries() {
        let filter = OutputFilter::new(
            vec!["DONE".into(), " ".into()],
            vec!["POWER=".into(), String::new()],
        );
        assert_eq!(filter.apply("DONE\nPOWER=30\nOK\nanything"), "DONE\nPOWER=30");
    }

    #[test]
    fn default_vocabulary_misses_reader_status_lines_until_extended() {
        let raw = "WARNING: restricted method\nOK power=30\nOK limpiado USER\n";
        assert_eq!(OutputFilter::default().apply(raw), "");

        let extended = OutputFilter::new(
            vec!["OK".into(), "NO_TAG".into(), "OK limpiado USER".into()],
            vec!["EPC=".into(), "ERROR=".into(), "OK power=".into()],
        );
        assert_eq!(extended.apply(raw), "OK power=30\nOK limpiado USER");
    }
}
