use serde::Deserialize;

/// Options for trip aggregation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOptions {
    /// How trip totals are rounded (default: per day, then again for the total)
    #[serde(default)]
    pub totals_rounding: TotalsRounding,

    /// Keep failed days in the returned day list (default: true)
    #[serde(default = "default_true")]
    pub include_failed_days: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            totals_rounding: TotalsRounding::default(),
            include_failed_days: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TotalsRounding {
    /// Sum the rounded per-day values, then round the sum.
    #[default]
    PerDay,
    /// Sum unrounded per-day values and round once.
    Once,
}

fn default_true() -> bool {
    true
}
