use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, Rect, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text};
use serde_json::Value;

use crate::board::{ItemData, ItemId, Record};
use crate::registry::{ChartPrimitive, DataShape, RenderStrategy};

const SERIES_COLORS: [Color32; 5] = [
    Color32::from_rgb(0, 136, 254),
    Color32::from_rgb(0, 196, 159),
    Color32::from_rgb(255, 187, 40),
    Color32::from_rgb(255, 128, 66),
    Color32::from_rgb(136, 132, 216),
];
const NEGATIVE_COLOR: Color32 = Color32::from_rgb(214, 69, 65);
const LABEL_COLOR: Color32 = Color32::DARK_GRAY;
const BAR_WIDTH: f64 = 0.7;
const PIE_SEGMENTS: usize = 96;
const RADAR_LABEL_RADIUS: f64 = 1.15;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Category labels along one axis plus one value per category for each series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Splits record payloads into categories and numeric series.
///
/// The category comes from the strategy's label key. Series come from the
/// strategy's value keys when the records carry them, otherwise from every
/// numeric column in first-seen order. Records without any series value are
/// skipped; `None` means nothing is plottable.
pub fn chart_data(strategy: &RenderStrategy, data: &ItemData) -> Option<ChartData> {
    let ItemData::Records(records) = data else {
        return None;
    };

    let label_key = match strategy.shape {
        DataShape::Fields { keys } => keys.first().copied(),
        DataShape::CategoryColumns { category_key } => Some(category_key),
        DataShape::Table | DataShape::Text | DataShape::Any => None,
    };
    let declared = match strategy.shape {
        DataShape::Fields { keys } => keys
            .iter()
            .skip(1)
            .filter(|key| records.iter().any(|record| is_number_at(record, key)))
            .map(|key| (*key).to_owned())
            .collect(),
        _ => Vec::new(),
    };
    let series_keys = if declared.is_empty() {
        numeric_keys(records, label_key)
    } else {
        declared
    };

    let rows = records
        .iter()
        .filter(|record| series_keys.iter().any(|key| is_number_at(record, key)))
        .collect::<Vec<_>>();
    if rows.is_empty() {
        return None;
    }

    let categories = rows
        .iter()
        .enumerate()
        .map(|(index, record)| category_label(record, label_key, index))
        .collect();
    let series = series_keys
        .into_iter()
        .map(|key| ChartSeries {
            values: rows
                .iter()
                .map(|record| record.get(&key).and_then(Value::as_f64).unwrap_or(0.0))
                .collect(),
            name: key,
        })
        .collect();

    Some(ChartData { categories, series })
}

fn is_number_at(record: &Record, key: &str) -> bool {
    record.get(key).is_some_and(Value::is_number)
}

fn numeric_keys(records: &[Record], skip: Option<&str>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for (key, value) in record {
            if value.is_number() && Some(key.as_str()) != skip && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn category_label(record: &Record, label_key: Option<&str>, index: usize) -> String {
    label_key
        .and_then(|key| record.get(key))
        .or_else(|| record.values().find(|value| !value.is_number()))
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Closed wedge from the origin, sweeping counter-clockwise from `start`.
pub fn pie_slice(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * PIE_SEGMENTS as f64).ceil().max(1.0) as usize;
    std::iter::once([0.0, 0.0])
        .chain((0..=steps).map(|step| {
            let angle = start + sweep * step as f64 / steps as f64;
            [angle.cos(), angle.sin()]
        }))
        .collect()
}

/// Closed outline with one spoke per value, the first spoke pointing up.
pub fn radar_outline(values: &[f64], max: f64) -> Vec<[f64; 2]> {
    let count = values.len();
    values
        .iter()
        .chain(values.first())
        .enumerate()
        .map(|(index, value)| radar_point(index % count, count, value / max))
        .collect()
}

fn radar_point(index: usize, count: usize, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - TAU * index as f64 / count as f64;
    [radius * angle.cos(), radius * angle.sin()]
}

fn series_color(index: usize) -> Color32 {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Shows `chart` inside `body` as a static plot keyed on `item_id`.
pub fn show_chart(
    ui: &mut egui::Ui,
    body: Rect,
    item_id: ItemId,
    primitive: ChartPrimitive,
    chart: &ChartData,
) {
    let plot = Plot::new(("board_chart", item_id.0))
        .width(body.width())
        .height(body.height())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show_grid(false)
        .legend(Legend::default());
    let plot = match primitive {
        ChartPrimitive::Pie | ChartPrimitive::Radar => plot.data_aspect(1.0).show_axes(false),
        _ => plot.show_axes([false, true]),
    };

    ui.put(body, |ui: &mut egui::Ui| {
        plot.show(ui, |plot_ui| draw_chart(plot_ui, primitive, chart))
            .response
    });
}

fn draw_chart<'a>(plot_ui: &mut PlotUi<'a>, primitive: ChartPrimitive, chart: &'a ChartData) {
    match primitive {
        ChartPrimitive::Area => {
            for (index, series) in chart.series.iter().enumerate() {
                plot_ui.line(
                    Line::new(line_points(&series.values))
                        .name(&series.name)
                        .color(series_color(index))
                        .fill(0.0),
                );
            }
        }
        ChartPrimitive::ComposedBarLine => {
            if let Some((bars, lines)) = chart.series.split_first() {
                plot_ui.bar_chart(bar_chart(bars, 0, 0.0, BAR_WIDTH));
                for (offset, series) in lines.iter().enumerate() {
                    plot_ui.line(
                        Line::new(line_points(&series.values))
                            .name(&series.name)
                            .color(series_color(offset + 1))
                            .width(2.0),
                    );
                }
            }
        }
        ChartPrimitive::StackedBar => {
            let mut stacked: Vec<BarChart> = Vec::with_capacity(chart.series.len());
            for (index, series) in chart.series.iter().enumerate() {
                let layer = {
                    let below = stacked.iter().collect::<Vec<_>>();
                    bar_chart(series, index, 0.0, BAR_WIDTH).stack_on(&below)
                };
                stacked.push(layer);
            }
            for layer in stacked {
                plot_ui.bar_chart(layer);
            }
        }
        ChartPrimitive::SignedBar => {
            for series in &chart.series {
                let bars = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let color = if *value < 0.0 {
                            NEGATIVE_COLOR
                        } else {
                            series_color(0)
                        };
                        Bar::new(index as f64, *value)
                            .width(BAR_WIDTH)
                            .fill(color)
                            .stroke(Stroke::new(1.0, color))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&series.name));
            }
        }
        ChartPrimitive::HorizontalBar => {
            for (index, series) in chart.series.iter().enumerate() {
                plot_ui.bar_chart(bar_chart(series, index, 0.0, BAR_WIDTH).horizontal());
            }
        }
        ChartPrimitive::Pie => draw_pie(plot_ui, chart),
        ChartPrimitive::Radar => draw_radar(plot_ui, chart),
        ChartPrimitive::Bar
        | ChartPrimitive::GroupedBar
        | ChartPrimitive::TextNote
        | ChartPrimitive::Table
        | ChartPrimitive::Placeholder => {
            let count = chart.series.len().max(1) as f64;
            let width = BAR_WIDTH / count;
            for (index, series) in chart.series.iter().enumerate() {
                let offset = (index as f64 - (count - 1.0) / 2.0) * width;
                plot_ui.bar_chart(bar_chart(series, index, offset, width));
            }
        }
    }

    match primitive {
        ChartPrimitive::Pie | ChartPrimitive::Radar => {}
        ChartPrimitive::HorizontalBar => {
            for (index, label) in chart.categories.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(0.0, index as f64), format!("{label} "))
                        .anchor(Align2::RIGHT_CENTER)
                        .color(LABEL_COLOR),
                );
            }
        }
        _ => {
            for (index, label) in chart.categories.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(index as f64, 0.0), label.as_str())
                        .anchor(Align2::CENTER_TOP)
                        .color(LABEL_COLOR),
                );
            }
        }
    }
}

fn line_points(values: &[f64]) -> PlotPoints {
    PlotPoints::from(
        values
            .iter()
            .enumerate()
            .map(|(index, value)| [index as f64, *value])
            .collect::<Vec<_>>(),
    )
}

fn bar_chart(series: &ChartSeries, color_index: usize, offset: f64, width: f64) -> BarChart {
    let bars = series
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| Bar::new(index as f64 + offset, *value).width(width))
        .collect();
    BarChart::new(bars)
        .name(&series.name)
        .color(series_color(color_index))
}

fn draw_pie(plot_ui: &mut PlotUi, chart: &ChartData) {
    let Some(series) = chart.series.first() else {
        return;
    };
    let total = series
        .values
        .iter()
        .filter(|value| **value > 0.0)
        .sum::<f64>();
    if total <= 0.0 {
        return;
    }

    let mut start = 0.0;
    for (index, (label, value)) in chart.categories.iter().zip(&series.values).enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let sweep = value / total * TAU;
        plot_ui.polygon(
            Polygon::new(PlotPoints::from(pie_slice(start, sweep)))
                .name(label)
                .fill_color(series_color(index))
                .stroke(Stroke::new(1.0, Color32::WHITE)),
        );
        start += sweep;
    }
}

fn draw_radar(plot_ui: &mut PlotUi, chart: &ChartData) {
    let spokes = chart.categories.len();
    let max = chart
        .series
        .iter()
        .flat_map(|series| series.values.iter().copied())
        .fold(0.0_f64, f64::max);
    if spokes < 3 || max <= 0.0 {
        return;
    }

    for index in 0..spokes {
        let [x, y] = radar_point(index, spokes, 1.0);
        plot_ui.line(
            Line::new(PlotPoints::from(vec![[0.0, 0.0], [x, y]]))
                .color(Color32::LIGHT_GRAY)
                .width(0.5),
        );
    }
    for (index, series) in chart.series.iter().enumerate() {
        plot_ui.line(
            Line::new(PlotPoints::from(radar_outline(&series.values, max)))
                .name(&series.name)
                .color(series_color(index))
                .width(1.5),
        );
    }
    for (index, label) in chart.categories.iter().enumerate() {
        let [x, y] = radar_point(index, spokes, RADAR_LABEL_RADIUS);
        plot_ui.text(Text::new(PlotPoint::new(x, y), label.as_str()).color(LABEL_COLOR));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChartSeries, chart_data, pie_slice, radar_outline};
    use crate::board::ItemData;
    use crate::dashboards::{INVESTMENT_TRENDS, REGIONAL_BREAKDOWN, items_for};
    use crate::registry::{ChartKind, resolve};

    #[test]
    fn trend_uses_year_categories_and_total_series() {
        let items = items_for(INVESTMENT_TRENDS);
        let trend = &items[0];
        let chart = chart_data(&resolve(trend.kind), &trend.data).expect("trend should plot");
        assert_eq!(chart.categories.len(), 7);
        assert_eq!(chart.categories[2], "2021");
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "total");
        assert_eq!(chart.series[0].values[2], 14026.0);

        let composed = &items[2];
        let chart = chart_data(&resolve(composed.kind), &composed.data).expect("composed");
        let names = chart
            .series
            .iter()
            .map(|series| series.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["volume", "avgSize"]);
    }

    #[test]
    fn stacked_series_keep_column_order() {
        let items = items_for(INVESTMENT_TRENDS);
        let breakdown = &items[3];
        let chart = chart_data(&resolve(breakdown.kind), &breakdown.data).expect("breakdown");
        assert_eq!(chart.series.len(), 5);
        assert_eq!(chart.series[0].name, "Mega Deals ($100M+)");
        assert_eq!(chart.series[4].name, "Micro (<$100K)");
    }

    #[test]
    fn leaders_plot_amount_per_sector() {
        let regional = items_for(REGIONAL_BREAKDOWN);
        let leaders = &regional[4];
        let chart = chart_data(&resolve(leaders.kind), &leaders.data).expect("leaders");
        assert_eq!(chart.categories[0], "Software & Cloud");
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "amount");
        assert_eq!(chart.series[0].values[0], 29.3);
    }

    #[test]
    fn foreign_record_shapes_fall_back_to_numeric_columns() {
        let data = ItemData::Records(vec![
            json!({"quarter": "Q1", "deals": 12}).as_object().cloned().unwrap_or_default(),
            json!({"quarter": "Q2"}).as_object().cloned().unwrap_or_default(),
        ]);
        let chart = chart_data(&resolve(ChartKind::InvestmentTrend), &data).expect("fallback");
        assert_eq!(chart.categories, vec!["Q1".to_owned()]);
        assert_eq!(
            chart.series,
            vec![ChartSeries {
                name: "deals".to_owned(),
                values: vec![12.0],
            }]
        );

        let text = ItemData::Text {
            content: "hi".to_owned(),
        };
        assert_eq!(chart_data(&resolve(ChartKind::Text), &text), None);
        let empty = ItemData::Records(vec![
            json!({"quarter": "Q1"}).as_object().cloned().unwrap_or_default(),
        ]);
        assert_eq!(chart_data(&resolve(ChartKind::TopSectors), &empty), None);
    }

    #[test]
    fn pie_slice_runs_from_center_across_the_sweep() {
        let slice = pie_slice(0.0, std::f64::consts::FRAC_PI_2);
        assert_eq!(slice[0], [0.0, 0.0]);
        assert_eq!(slice[1], [1.0, 0.0]);
        let [x, y] = slice[slice.len() - 1];
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn radar_outline_closes_on_first_spoke() {
        let outline = radar_outline(&[100.0, 50.0, 25.0, 100.0], 100.0);
        assert_eq!(outline.len(), 5);
        assert_eq!(outline[0], outline[4]);
        let [x, y] = outline[0];
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
    }
}
