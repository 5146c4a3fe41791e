use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::ItemData;

/// Canvas item kind. Every board item carries exactly one of these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    InvestmentTrend,
    TopSectors,
    DealVolumeAndSize,
    DealSizeBreakdown,
    YoyGrowth,
    RegionalBarChart,
    DealSizeChart,
    TotalByRegion,
    RegionRadar,
    TopRegions,
    Text,
    Table,
    #[serde(other)]
    Unknown,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvestmentTrend => "investmentTrend",
            Self::TopSectors => "topSectors",
            Self::DealVolumeAndSize => "dealVolumeAndSize",
            Self::DealSizeBreakdown => "dealSizeBreakdown",
            Self::YoyGrowth => "yoyGrowth",
            Self::RegionalBarChart => "regionalBarChart",
            Self::DealSizeChart => "dealSizeChart",
            Self::TotalByRegion => "totalByRegion",
            Self::RegionRadar => "regionRadar",
            Self::TopRegions => "topRegions",
            Self::Text => "text",
            Self::Table => "table",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing primitive handed to the charting backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPrimitive {
    Area,
    Pie,
    ComposedBarLine,
    StackedBar,
    SignedBar,
    GroupedBar,
    Bar,
    HorizontalBar,
    Radar,
    TextNote,
    Table,
    Placeholder,
}

/// Record shape a strategy expects in its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DataShape {
    /// Every record carries all of these keys.
    Fields { keys: &'static [&'static str] },
    /// A category key plus any number of numeric columns.
    CategoryColumns { category_key: &'static str },
    Table,
    Text,
    Any,
}

impl DataShape {
    pub fn accepts(self, data: &ItemData) -> bool {
        match (self, data) {
            (Self::Any, _) => true,
            (Self::Table, ItemData::Table { .. }) => true,
            (Self::Text, ItemData::Text { .. }) => true,
            (Self::Fields { keys }, ItemData::Records(records)) => records
                .iter()
                .all(|record| keys.iter().all(|key| record.contains_key(*key))),
            (Self::CategoryColumns { category_key }, ItemData::Records(records)) => {
                records.iter().all(|record| {
                    record.contains_key(category_key)
                        && record
                            .iter()
                            .filter(|(key, _)| key.as_str() != category_key)
                            .all(|(_, value)| value.is_number())
                })
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderStrategy {
    pub kind: ChartKind,
    pub primitive: ChartPrimitive,
    pub shape: DataShape,
    pub label: &'static str,
}

impl RenderStrategy {
    pub fn is_placeholder(&self) -> bool {
        self.primitive == ChartPrimitive::Placeholder
    }
}

const UNKNOWN_STRATEGY: RenderStrategy = RenderStrategy {
    kind: ChartKind::Unknown,
    primitive: ChartPrimitive::Placeholder,
    shape: DataShape::Any,
    label: "Unknown visualization type",
};

pub fn resolve(kind: ChartKind) -> RenderStrategy {
    let (primitive, shape, label) = match kind {
        ChartKind::InvestmentTrend => (
            ChartPrimitive::Area,
            DataShape::Fields {
                keys: &["year", "total"],
            },
            "Investment trend (area)",
        ),
        ChartKind::TopSectors => (
            ChartPrimitive::Pie,
            DataShape::Fields {
                keys: &["sector", "value"],
            },
            "Sector share (pie)",
        ),
        ChartKind::DealVolumeAndSize => (
            ChartPrimitive::ComposedBarLine,
            DataShape::Fields {
                keys: &["year", "volume", "avgSize"],
            },
            "Deal volume vs. size (bar + line)",
        ),
        ChartKind::DealSizeBreakdown => (
            ChartPrimitive::StackedBar,
            DataShape::CategoryColumns {
                category_key: "year",
            },
            "Deal size breakdown (stacked bar)",
        ),
        ChartKind::YoyGrowth => (
            ChartPrimitive::SignedBar,
            DataShape::Fields {
                keys: &["year", "growthRate"],
            },
            "Year-over-year growth (bar)",
        ),
        ChartKind::RegionalBarChart => (
            ChartPrimitive::GroupedBar,
            DataShape::CategoryColumns {
                category_key: "region",
            },
            "Regional sectors (grouped bar)",
        ),
        ChartKind::DealSizeChart => (
            ChartPrimitive::StackedBar,
            DataShape::CategoryColumns {
                category_key: "year",
            },
            "Deal size amounts (stacked bar)",
        ),
        ChartKind::TotalByRegion => (
            ChartPrimitive::Bar,
            DataShape::Fields {
                keys: &["region", "total"],
            },
            "Total by region (bar)",
        ),
        ChartKind::RegionRadar => (
            ChartPrimitive::Radar,
            DataShape::CategoryColumns {
                category_key: "sector",
            },
            "Regional specialization (radar)",
        ),
        ChartKind::TopRegions => (
            ChartPrimitive::HorizontalBar,
            DataShape::Fields {
                keys: &["sector", "region", "amount"],
            },
            "Leading region per sector (bar)",
        ),
        ChartKind::Text => (ChartPrimitive::TextNote, DataShape::Text, "Note"),
        ChartKind::Table => (ChartPrimitive::Table, DataShape::Table, "Table"),
        ChartKind::Unknown => {
            debug!("unknown item kind; rendering placeholder");
            return UNKNOWN_STRATEGY;
        }
    };

    RenderStrategy {
        kind,
        primitive,
        shape,
        label,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracing::Level;

    use super::{ChartKind, ChartPrimitive, DataShape, resolve};
    use crate::board::{ItemData, Record};
    use crate::test_support::CapturedLogs;

    const KNOWN_KINDS: [ChartKind; 12] = [
        ChartKind::InvestmentTrend,
        ChartKind::TopSectors,
        ChartKind::DealVolumeAndSize,
        ChartKind::DealSizeBreakdown,
        ChartKind::YoyGrowth,
        ChartKind::RegionalBarChart,
        ChartKind::DealSizeChart,
        ChartKind::TotalByRegion,
        ChartKind::RegionRadar,
        ChartKind::TopRegions,
        ChartKind::Text,
        ChartKind::Table,
    ];

    #[test]
    fn every_known_kind_resolves_to_a_real_strategy() {
        for kind in KNOWN_KINDS {
            let strategy = resolve(kind);
            assert_eq!(strategy.kind, kind);
            assert!(!strategy.is_placeholder(), "{kind} resolved to placeholder");
        }
    }

    #[test]
    fn unknown_tags_resolve_to_placeholder() {
        let kind: ChartKind =
            serde_json::from_value(json!("sankeyDiagram")).expect("unknown tag should deserialize");
        let strategy = resolve(kind);
        assert!(strategy.is_placeholder());
        assert_eq!(strategy.kind, ChartKind::Unknown);
        assert_eq!(strategy.shape, DataShape::Any);
    }

    #[test]
    fn resolving_unknown_kind_repeatedly_stays_below_warn() {
        let logs = CapturedLogs::default();
        logs.capture(Level::WARN, || {
            for _ in 0..10 {
                assert!(resolve(ChartKind::Unknown).is_placeholder());
            }
        });
        assert_eq!(logs.contents(), "");
    }

    #[test]
    fn tags_round_trip_through_serde() {
        let kind: ChartKind = serde_json::from_value(json!("dealVolumeAndSize"))
            .expect("known tag should deserialize");
        assert_eq!(kind, ChartKind::DealVolumeAndSize);
        for known in KNOWN_KINDS {
            assert_eq!(serde_json::to_value(known).ok(), Some(json!(known.as_str())));
        }

        let unknown: ChartKind =
            serde_json::from_value(json!("hologram")).expect("unknown tag should deserialize");
        assert_eq!(unknown, ChartKind::Unknown);
    }

    #[test]
    fn trend_shape_checks_year_and_total() {
        let shape = resolve(ChartKind::InvestmentTrend).shape;
        assert_eq!(resolve(ChartKind::InvestmentTrend).primitive, ChartPrimitive::Area);
        assert!(shape.accepts(&records(json!([{"year": 2020, "total": 5}]))));
        assert!(!shape.accepts(&records(json!([{"year": 2020}]))));
        assert!(!shape.accepts(&ItemData::Text {
            content: "note".to_owned()
        }));
    }

    #[test]
    fn category_column_shape_requires_numeric_columns() {
        let shape = resolve(ChartKind::RegionalBarChart).shape;
        assert!(shape.accepts(&records(json!([
            {"region": "Toronto", "AI & Big Data": 31.24, "Health & Biotech": 11.29}
        ]))));
        assert!(!shape.accepts(&records(json!([
            {"region": "Toronto", "AI & Big Data": "lots"}
        ]))));
    }

    fn records(value: serde_json::Value) -> ItemData {
        let records = value
            .as_array()
            .expect("fixture should be an array")
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect::<Vec<Record>>();
        ItemData::Records(records)
    }
}
