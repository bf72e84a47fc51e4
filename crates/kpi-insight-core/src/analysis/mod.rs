pub mod chart;
pub mod group_report;

pub use chart::{build_chart, ChartSeries};
pub use group_report::{
    analyze_group, trend_report, GroupAnalysis, GroupSummary, RowAnalysis, TrendReport,
};
