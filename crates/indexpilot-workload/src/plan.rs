//! EXPLAIN output model

use indexpilot_common::{Error, Result};
use std::time::Duration;

/// Tabular rows of an `EXPLAIN` result.
///
/// TiDB's verbose layout is
/// `| id | estRows | estCost | task | access object | operator info |`;
/// executed plans (EXPLAIN ANALYZE) widen to ten columns:
/// `| id | estRows | estCost | actRows | task | access object |
///  execution info | operator info | memory | disk |`.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub rows: Vec<Vec<String>>,
}

impl Plan {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Plan { rows }
    }

    /// Estimated cost of the whole plan: the root operator's cost column.
    pub fn plan_cost(&self) -> Result<f64> {
        let cell = self
            .rows
            .first()
            .and_then(|row| row.get(2))
            .ok_or_else(|| Error::InvalidPlan("plan has no cost column".to_string()))?;
        cell.parse::<f64>()
            .map_err(|_| Error::InvalidPlan(format!("cost {:?} is not numeric", cell)))
    }

    /// Whether this plan came from an executed statement.
    pub fn is_executed(&self) -> bool {
        self.rows.first().map(|row| row.len() == 10).unwrap_or(false)
    }

    /// Wall time of the root operator of an executed plan. `None` for
    /// unexecuted plans or when the execution info cannot be parsed.
    pub fn exec_time(&self) -> Option<Duration> {
        if !self.is_executed() {
            return None;
        }
        // execution info looks like `time:3.15ms, loops:1, ...`
        let info = self.rows.first()?.get(6)?;
        let start = info.find("time:")? + "time:".len();
        let end = info[start..].find(',')? + start;
        parse_duration(&info[start..end])
    }
}

/// Parse durations of the form `<float><unit>` as TiDB prints them
/// (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`).
fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let split = text.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let value: f64 = text[..split].parse().ok()?;
    let seconds = match &text[split..] {
        "ns" => value / 1e9,
        "us" | "µs" => value / 1e6,
        "ms" => value / 1e3,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return None,
    };
    Some(Duration::from_secs_f64(seconds))
}
