use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{BoardItem, ItemData, ItemId, Point, Record, RelatedInsight};
use crate::registry::ChartKind;

pub mod datasets;
pub mod transforms;

use self::transforms::{InvestmentSeries, RegionalSeries};

pub const INVESTMENT_TRENDS: DashboardSelection = DashboardSelection {
    folder_id: 1,
    dashboard_id: 1,
};
pub const REGIONAL_BREAKDOWN: DashboardSelection = DashboardSelection {
    folder_id: 3,
    dashboard_id: 5,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSelection {
    pub folder_id: u32,
    pub dashboard_id: u32,
}

impl DashboardSelection {
    pub const fn new(folder_id: u32, dashboard_id: u32) -> Self {
        Self {
            folder_id,
            dashboard_id,
        }
    }
}

impl Default for DashboardSelection {
    fn default() -> Self {
        INVESTMENT_TRENDS
    }
}

impl Display for DashboardSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.folder_id, self.dashboard_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardEntry {
    pub id: u32,
    pub name: String,
    pub starred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub id: u32,
    pub name: String,
    pub dashboards: Vec<DashboardEntry>,
}

/// Built-in folder tree shown in the sidebar. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCatalog {
    pub folders: Vec<Folder>,
}

impl Default for DashboardCatalog {
    fn default() -> Self {
        let folder = |id: u32, name: &str, dashboards: &[(u32, &str, bool)]| Folder {
            id,
            name: name.to_owned(),
            dashboards: dashboards
                .iter()
                .map(|(id, name, starred)| DashboardEntry {
                    id: *id,
                    name: (*name).to_owned(),
                    starred: *starred,
                })
                .collect(),
        };

        Self {
            folders: vec![
                folder(
                    1,
                    "Investment Analysis",
                    &[(1, "Investment Trends 2024", true), (2, "Series A Analysis", false)],
                ),
                folder(
                    2,
                    "Sector Deep Dives",
                    &[(3, "AI/ML Sector Overview", true), (4, "FinTech Momentum", false)],
                ),
                folder(
                    3,
                    "Regional Analysis",
                    &[(5, "Regional Investment Breakdown", true)],
                ),
            ],
        }
    }
}

impl DashboardCatalog {
    pub fn find(&self, selection: DashboardSelection) -> Option<(&Folder, &DashboardEntry)> {
        let folder = self
            .folders
            .iter()
            .find(|folder| folder.id == selection.folder_id)?;
        let dashboard = folder
            .dashboards
            .iter()
            .find(|dashboard| dashboard.id == selection.dashboard_id)?;
        Some((folder, dashboard))
    }

    pub fn dashboard_name(&self, selection: DashboardSelection) -> Option<&str> {
        self.find(selection)
            .map(|(_, dashboard)| dashboard.name.as_str())
    }
}

/// Fresh items for `selection`. Only the investment trends and regional
/// breakdown dashboards have content; every other selection is empty.
pub fn items_for(selection: DashboardSelection) -> Vec<BoardItem> {
    let items = match selection {
        INVESTMENT_TRENDS => investment_items(),
        REGIONAL_BREAKDOWN => regional_items(),
        _ => Vec::new(),
    };
    debug!(%selection, item_count = items.len(), "built dashboard items");
    items
}

fn chart(
    id: u64,
    kind: ChartKind,
    title: &str,
    (x, y): (f32, f32),
    data: Vec<Record>,
    insights: [(&str, &str); 2],
) -> BoardItem {
    BoardItem::chart(
        ItemId(id),
        kind,
        title,
        Point::new(x, y),
        ItemData::Records(data),
        insights
            .into_iter()
            .map(|(text, question)| RelatedInsight::new(text, question))
            .collect(),
    )
}

fn investment_items() -> Vec<BoardItem> {
    let series = InvestmentSeries::from_datasets();
    vec![
        chart(
            1,
            ChartKind::InvestmentTrend,
            "Total Investment by Year (Millions USD)",
            (100.0, 100.0),
            series.trend,
            [
                (
                    "Investment increased by 58.1% in 2024 compared to 2023",
                    "What factors drove the 2024 investment growth?",
                ),
                (
                    "2021 had the highest investment at $14.03B",
                    "Why was 2021 such a strong year for investment?",
                ),
            ],
        ),
        chart(
            2,
            ChartKind::TopSectors,
            "Top 5 Sectors by Investment (Billions USD)",
            (700.0, 100.0),
            series.top_sectors,
            [
                (
                    "Software & Cloud leads with $8.96B in investments",
                    "What's driving growth in the Software & Cloud sector?",
                ),
                (
                    "Health & Biotech is the second highest sector with $5.73B",
                    "How does Health & Biotech compare to other sectors?",
                ),
            ],
        ),
        chart(
            3,
            ChartKind::DealVolumeAndSize,
            "Deal Volume vs. Average Deal Size",
            (100.0, 450.0),
            series.deal_volume_and_size,
            [
                (
                    "Average deal size increased while volume decreased after 2021",
                    "Why are deals getting larger but fewer in number?",
                ),
                (
                    "2024 average deal size reached $35.8M, the highest in the dataset",
                    "What's causing the shift toward larger deals in 2024?",
                ),
            ],
        ),
        chart(
            4,
            ChartKind::DealSizeBreakdown,
            "Investment Distribution by Deal Size (%)",
            (700.0, 450.0),
            series.deal_size_breakdown,
            [
                (
                    "Mega deals ($100M+) reached 69.1% of all investment in 2024",
                    "What's driving the concentration of capital in mega deals?",
                ),
                (
                    "Small deals ($100K-$1M) decreased from 0.84% in 2019 to 0.03% in 2024",
                    "Why are small deals becoming less common?",
                ),
            ],
        ),
        chart(
            5,
            ChartKind::YoyGrowth,
            "Year-over-Year Investment Growth (%)",
            (400.0, 800.0),
            series.yoy_growth,
            [
                (
                    "Investment growth has been volatile, with a sharp 222% increase in 2021",
                    "What caused the dramatic investment surge in 2021?",
                ),
                (
                    "2023 saw a decline of 41.1% before recovering in 2024",
                    "What market factors led to the 2023 investment decline?",
                ),
            ],
        ),
    ]
}

fn regional_items() -> Vec<BoardItem> {
    let series = RegionalSeries::from_datasets();
    vec![
        chart(
            101,
            ChartKind::RegionalBarChart,
            "Average Deal Size by Region for Top 5 Sectors (Millions $)",
            (50.0, 100.0),
            series.regional_bar_chart,
            [
                (
                    "Waterloo leads in Robotics & Advanced Tech with $59.8M average investment",
                    "What factors drive Waterloo's leadership in Robotics & Advanced Tech?",
                ),
                (
                    "British Columbia has the highest Finance & Payments investment at $46.1M",
                    "Why is British Columbia a hub for Finance & Payments investment?",
                ),
            ],
        ),
        chart(
            102,
            ChartKind::DealSizeChart,
            "Tech Investment Amount in Canada by Deal Size (2019-2024)",
            (650.0, 100.0),
            series.deal_size_chart,
            [
                (
                    "Mega deals ($100M+) peaked in 2021 at $8.5B, comprising 60.5% of total investment",
                    "What caused the surge in mega deals during 2021?",
                ),
                (
                    "Mid-size deals ($5M-$100M) have remained consistently important across all years",
                    "Why are mid-size deals more stable than other categories?",
                ),
            ],
        ),
        chart(
            103,
            ChartKind::TotalByRegion,
            "Total Tech Investment by Region (Millions $)",
            (50.0, 450.0),
            series.total_by_region,
            [
                (
                    "British Columbia leads with $121.9M in total tech investment",
                    "What makes British Columbia attractive for tech investment?",
                ),
                (
                    "Waterloo shows strong investment despite its smaller size",
                    "How has Waterloo positioned itself as a tech hub?",
                ),
            ],
        ),
        chart(
            104,
            ChartKind::RegionRadar,
            "Regional Specialization Across Sectors (Relative Strength)",
            (650.0, 450.0),
            series.region_radar,
            [
                (
                    "Each region shows distinct specialization patterns across sectors",
                    "How do regional specializations affect startup ecosystems?",
                ),
                (
                    "Toronto dominates in AI & Big Data investment",
                    "What factors make Toronto attractive for AI companies?",
                ),
            ],
        ),
        chart(
            105,
            ChartKind::TopRegions,
            "Leading Regions by Tech Sector (Millions $)",
            (350.0, 800.0),
            series.top_regions,
            [
                (
                    "British Columbia leads in 3 of 5 top tech sectors",
                    "What makes British Columbia a diverse tech investment hub?",
                ),
                (
                    "Regional specialization shows distinct patterns across Canada",
                    "How does regional policy affect tech investment focus?",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        DashboardCatalog, DashboardSelection, INVESTMENT_TRENDS, REGIONAL_BREAKDOWN, items_for,
    };
    use crate::board::{ItemId, Point};
    use crate::registry::{ChartKind, resolve};

    #[test]
    fn only_two_dashboards_have_content() {
        let catalog = DashboardCatalog::default();
        let populated = catalog
            .folders
            .iter()
            .flat_map(|folder| {
                folder
                    .dashboards
                    .iter()
                    .map(move |dashboard| DashboardSelection::new(folder.id, dashboard.id))
            })
            .filter(|selection| !items_for(*selection).is_empty())
            .collect::<Vec<_>>();
        assert_eq!(populated, vec![INVESTMENT_TRENDS, REGIONAL_BREAKDOWN]);

        assert!(items_for(DashboardSelection::new(2, 5)).is_empty());
        assert!(items_for(DashboardSelection::new(42, 1)).is_empty());
    }

    #[test]
    fn investment_items_have_fixed_ids_kinds_and_positions() {
        let items = items_for(INVESTMENT_TRENDS);
        let layout = items
            .iter()
            .map(|item| (item.id, item.kind, item.position))
            .collect::<Vec<_>>();
        assert_eq!(
            layout,
            vec![
                (ItemId(1), ChartKind::InvestmentTrend, Point::new(100.0, 100.0)),
                (ItemId(2), ChartKind::TopSectors, Point::new(700.0, 100.0)),
                (ItemId(3), ChartKind::DealVolumeAndSize, Point::new(100.0, 450.0)),
                (ItemId(4), ChartKind::DealSizeBreakdown, Point::new(700.0, 450.0)),
                (ItemId(5), ChartKind::YoyGrowth, Point::new(400.0, 800.0)),
            ]
        );
        for item in &items {
            assert_eq!(item.related_insights.len(), 2, "{}", item.title);
            assert!(item.connections.is_empty());
        }
    }

    #[test]
    fn generated_data_fits_registered_shapes() {
        for selection in [INVESTMENT_TRENDS, REGIONAL_BREAKDOWN] {
            for item in items_for(selection) {
                let strategy = resolve(item.kind);
                assert!(!strategy.is_placeholder(), "{}", item.kind);
                assert!(strategy.shape.accepts(&item.data), "{}", item.kind);
            }
        }
    }

    #[test]
    fn regional_ids_start_at_101() {
        let ids = items_for(REGIONAL_BREAKDOWN)
            .iter()
            .map(|item| item.id.0)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![101, 102, 103, 104, 105]);
    }

    #[test]
    fn catalog_names_dashboards() {
        let catalog = DashboardCatalog::default();
        assert_eq!(
            catalog.dashboard_name(REGIONAL_BREAKDOWN),
            Some("Regional Investment Breakdown")
        );
        assert_eq!(catalog.dashboard_name(DashboardSelection::new(1, 5)), None);
        let dashboards = catalog
            .folders
            .iter()
            .map(|folder| folder.dashboards.len())
            .sum::<usize>();
        assert_eq!(dashboards, 5);
    }

    #[test]
    fn every_call_builds_an_independent_collection() {
        let mut first = items_for(INVESTMENT_TRENDS);
        first[0].title.push_str(" (edited)");
        assert_eq!(items_for(INVESTMENT_TRENDS)[0].title, "Total Investment by Year (Millions USD)");
    }
}
