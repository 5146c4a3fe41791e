use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::board::{ItemData, Record, RelatedInsight};
use crate::registry::ChartKind;

mod extract;
mod followups;

pub use self::extract::parse_response;
pub use self::followups::FollowUpCategory;

pub const DEFAULT_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_INSIGHT_SOURCE: &str = "AI analysis";
const UNTITLED_VISUALIZATION: &str = "Untitled visualization";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResearchError {
    #[error("malformed assistant response: {reason}")]
    MalformedResponse { reason: String },

    #[error("assistant response violates schema: {reason}")]
    SchemaViolation { reason: String },
}

/// AI-facing visualization type tag. Richer than the canvas kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualType {
    LineChart,
    AreaChart,
    BarChart,
    PieChart,
    DonutChart,
    Treemap,
    ScatterPlot,
    RadarChart,
    ComposedChart,
    Comparison,
    Heatmap,
    Table,
    Text,
    SourceInfo,
    Other(String),
}

impl VisualType {
    /// Matching ignores case, `_` and `-`; anything else is `Other`.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-' && !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "linechart" => Self::LineChart,
            "areachart" => Self::AreaChart,
            "barchart" => Self::BarChart,
            "piechart" => Self::PieChart,
            "donutchart" => Self::DonutChart,
            "treemap" => Self::Treemap,
            "scatterplot" => Self::ScatterPlot,
            "radarchart" => Self::RadarChart,
            "composedchart" => Self::ComposedChart,
            "comparison" => Self::Comparison,
            "heatmap" => Self::Heatmap,
            "table" => Self::Table,
            "text" => Self::Text,
            "sourceinfo" => Self::SourceInfo,
            _ => Self::Other(tag.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LineChart => "lineChart",
            Self::AreaChart => "areaChart",
            Self::BarChart => "barChart",
            Self::PieChart => "pieChart",
            Self::DonutChart => "donutChart",
            Self::Treemap => "treemap",
            Self::ScatterPlot => "scatterPlot",
            Self::RadarChart => "radarChart",
            Self::ComposedChart => "composedChart",
            Self::Comparison => "comparison",
            Self::Heatmap => "heatmap",
            Self::Table => "table",
            Self::Text => "text",
            Self::SourceInfo => "sourceInfo",
            Self::Other(tag) => tag,
        }
    }

    /// Total remapping onto canvas kinds; unmapped tags fall back to the trend kind.
    pub fn canvas_kind(&self) -> ChartKind {
        match self {
            Self::PieChart | Self::DonutChart | Self::Treemap => ChartKind::TopSectors,
            Self::ComposedChart | Self::Comparison => ChartKind::DealVolumeAndSize,
            Self::Heatmap => ChartKind::DealSizeBreakdown,
            Self::Table => ChartKind::Table,
            Self::Text | Self::SourceInfo => ChartKind::Text,
            Self::LineChart
            | Self::AreaChart
            | Self::BarChart
            | Self::ScatterPlot
            | Self::RadarChart
            | Self::Other(_) => ChartKind::InvestmentTrend,
        }
    }
}

impl Display for VisualType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VisualType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub content: String,
    pub confidence: f64,
    pub source: String,
}

/// Board-item-shaped result of normalizing one AI visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationDraft {
    pub kind: ChartKind,
    pub visual_type: VisualType,
    pub category: FollowUpCategory,
    pub title: String,
    pub data: ItemData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub related_insights: Vec<RelatedInsight>,
}

impl VisualizationDraft {
    /// A standalone text-note draft carrying one insight.
    pub fn from_insight(insight: &Insight) -> Self {
        Self {
            kind: ChartKind::Text,
            visual_type: VisualType::Text,
            category: FollowUpCategory::Informational,
            title: "Insight".to_owned(),
            data: ItemData::Text {
                content: with_source_line(&insight.content, Some(&insight.source)),
            },
            description: None,
            source: Some(insight.source.clone()),
            source_url: None,
            related_insights: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResearch {
    pub insights: Vec<Insight>,
    pub drafts: Vec<VisualizationDraft>,
}

pub fn normalize_response(raw: &str) -> Result<NormalizedResearch, ResearchError> {
    let value = parse_response(raw)?;
    normalize_value(&value)
}

pub fn normalize_value(value: &Value) -> Result<NormalizedResearch, ResearchError> {
    let Some(object) = value.as_object() else {
        return Err(ResearchError::SchemaViolation {
            reason: "response is not a JSON object".to_owned(),
        });
    };
    let raw_insights = required_array(object, "insights")?;
    let raw_visualizations = required_array(object, "visualizations")?;

    let insights = raw_insights
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| normalize_insight(index, entry))
        .collect::<Vec<_>>();
    let drafts = raw_visualizations
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| normalize_visualization(index, entry))
        .collect::<Vec<_>>();

    info!(
        insight_count = insights.len(),
        draft_count = drafts.len(),
        "normalized assistant response"
    );

    Ok(NormalizedResearch { insights, drafts })
}

fn required_array<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Vec<Value>, ResearchError> {
    match object.get(key) {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(ResearchError::SchemaViolation {
            reason: format!("`{key}` must be an array"),
        }),
        None => Err(ResearchError::SchemaViolation {
            reason: format!("missing `{key}` array"),
        }),
    }
}

fn normalize_insight(index: usize, entry: &Value) -> Option<Insight> {
    let Some(content) = entry.get("content").and_then(Value::as_str) else {
        warn!(index, "skipping insight without string content");
        return None;
    };

    let confidence = entry
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
        .unwrap_or(DEFAULT_CONFIDENCE);
    let source = optional_string(entry, "source").unwrap_or_else(|| DEFAULT_INSIGHT_SOURCE.to_owned());

    Some(Insight {
        content: content.to_owned(),
        confidence,
        source,
    })
}

fn normalize_visualization(index: usize, entry: &Value) -> Option<VisualizationDraft> {
    if !entry.is_object() {
        warn!(index, "skipping visualization that is not an object");
        return None;
    }

    let visual_type = entry
        .get("visualType")
        .or_else(|| entry.get("type"))
        .and_then(Value::as_str)
        .map(VisualType::from_tag)
        .unwrap_or_else(|| VisualType::Other(String::new()));
    if let VisualType::Other(tag) = &visual_type {
        warn!(index, tag = %tag, "unmapped visualization type; using trend kind");
    }

    let kind = visual_type.canvas_kind();
    let category = FollowUpCategory::for_visual_type(&visual_type);
    let title = optional_string(entry, "title").unwrap_or_else(|| UNTITLED_VISUALIZATION.to_owned());
    let description = optional_string(entry, "description");
    let source = optional_string(entry, "source");
    let source_url = optional_string(entry, "sourceUrl");

    let data = match kind {
        ChartKind::Table => table_payload(entry),
        ChartKind::Text => {
            let content = optional_string(entry, "content")
                .or_else(|| description.clone())
                .unwrap_or_default();
            ItemData::Text {
                content: with_source_line(&content, source.as_deref()),
            }
        }
        _ => ItemData::Records(records_payload(entry.get("data"))),
    };

    debug!(
        index,
        visual_type = %visual_type,
        kind = %kind,
        records = data.record_count(),
        "normalized visualization"
    );

    Some(VisualizationDraft {
        kind,
        related_insights: category.follow_ups(&title),
        visual_type,
        category,
        title,
        data,
        description,
        source,
        source_url,
    })
}

fn optional_string(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn with_source_line(content: &str, source: Option<&str>) -> String {
    match source {
        Some(source) if content.is_empty() => format!("Source: {source}"),
        Some(source) => format!("{content}\n\nSource: {source}"),
        None => content.to_owned(),
    }
}

fn records_payload(data: Option<&Value>) -> Vec<Record> {
    match data {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect(),
        Some(Value::Object(record)) => vec![record.clone()],
        _ => Vec::new(),
    }
}

fn table_payload(entry: &Value) -> ItemData {
    let explicit_headers = entry.get("headers").and_then(Value::as_array).map(|headers| {
        headers.iter().map(cell_text).collect::<Vec<_>>()
    });
    let explicit_rows = entry.get("rows").and_then(Value::as_array).map(|rows| {
        rows.iter()
            .map(|row| match row {
                Value::Array(cells) => cells.iter().map(cell_text).collect(),
                other => vec![cell_text(other)],
            })
            .collect::<Vec<Vec<String>>>()
    });

    if let (Some(headers), Some(rows)) = (&explicit_headers, &explicit_rows) {
        return ItemData::Table {
            headers: headers.clone(),
            rows: rows.clone(),
        };
    }

    let records = records_payload(entry.get("data"));
    let headers = explicit_headers.unwrap_or_else(|| {
        records
            .first()
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default()
    });
    let rows = explicit_rows.unwrap_or_else(|| {
        records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|header| record.get(header).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect()
    });

    ItemData::Table { headers, rows }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
