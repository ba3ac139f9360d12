use std::fmt;

use crate::{params::Resolved, source::ParameterSource};

/// A duration in seconds split into hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

impl Hms {
    pub fn from_seconds(total: i32) -> Self {
        Self {
            hours: total / 3600,
            minutes: total % 3600 / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

pub fn describe_duration(seconds: i32) -> String {
    format!("{seconds} sec ({})", Hms::from_seconds(seconds))
}

/// The request parameters shown before asking for the MFA code.
#[derive(Debug, Default)]
pub struct ParamTable {
    rows: Vec<(String, String, Option<ParameterSource>)>,
    show_source: bool,
}

impl ParamTable {
    pub fn new(show_source: bool) -> Self {
        Self {
            rows: Vec::new(),
            show_source,
        }
    }

    pub fn row(&mut self, name: &str, value: impl Into<String>, source: Option<ParameterSource>) {
        self.rows.push((name.to_string(), value.into(), source));
    }

    pub fn resolved<T: fmt::Display>(&mut self, name: &str, resolved: &Resolved<T>) {
        self.row(name, resolved.value.to_string(), Some(resolved.source));
    }

    fn cells(&self) -> Vec<Vec<String>> {
        let mut cells = vec![header(self.show_source)];
        cells.extend(self.rows.iter().map(|(name, value, source)| {
            let mut row = vec![name.clone(), value.clone()];
            if self.show_source {
                row.push(source.map(|s| s.to_string()).unwrap_or_default());
            }
            row
        }));
        cells
    }
}

fn header(show_source: bool) -> Vec<String> {
    let mut header = vec!["PARAMETER".to_string(), "VALUE".to_string()];
    if show_source {
        header.push("SOURCE".to_string());
    }
    header
}

impl fmt::Display for ParamTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.cells();
        let widths: Vec<usize> = (0..cells[0].len())
            .map(|col| cells.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
            .collect();

        let border: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .collect::<String>()
            + "+";

        writeln!(f, "{border}")?;
        for (i, row) in cells.iter().enumerate() {
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "| {cell:<width$} ")?;
            }
            writeln!(f, "|")?;
            if i == 0 {
                writeln!(f, "{border}")?;
            }
        }
        writeln!(f, "{border}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hms() {
        let cases = [
            (40000, (11, 6, 40)),
            (3600, (1, 0, 0)),
            (43200, (12, 0, 0)),
            (900, (0, 15, 0)),
            (0, (0, 0, 0)),
        ];
        for (seconds, (hours, minutes, secs)) in cases {
            assert_eq!(
                Hms::from_seconds(seconds),
                Hms {
                    hours,
                    minutes,
                    seconds: secs
                },
                "{seconds} seconds"
            );
        }
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(40000), "40000 sec (11h 6m 40s)");
    }

    #[test]
    fn test_table_with_sources() {
        let mut table = ParamTable::new(true);
        table.resolved(
            "Region",
            &Resolved::new("us-east-1".to_string(), ParameterSource::CliOption),
        );
        table.row("API Type", "AWS STS GetSessionToken", None);

        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("SOURCE"));
        assert!(lines[3].contains("us-east-1") && lines[3].contains("cli option"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_table_without_sources() {
        let mut table = ParamTable::new(false);
        table.resolved(
            "Region",
            &Resolved::new("us-east-1".to_string(), ParameterSource::CliOption),
        );

        let rendered = table.to_string();
        assert!(!rendered.contains("SOURCE"));
        assert!(!rendered.contains("cli option"));
    }
}
