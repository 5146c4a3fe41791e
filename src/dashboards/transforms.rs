use serde_json::{Map, Value, json};

use crate::board::Record;

use super::datasets::{
    DEAL_SIZE_BUCKETS, DealSizeSplit, INVESTMENT_AMOUNT_BY_CATEGORY, INVESTMENT_AVG_BY_YEAR,
    INVESTMENT_PERCENTAGE_BY_CATEGORY, INVESTMENT_VOLUME_BY_YEAR, REGION_DATA, REGION_SECTORS,
    RegionSectorAmounts, SectorAmount, TOTAL_INVESTMENT_BY_SECTOR, TOTAL_INVESTMENT_BY_YEAR,
    YearAmount,
};

const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const TOP_SECTOR_COUNT: usize = 5;

/// Deal-size breakdown labels, largest bucket first, paired with the
/// [`DEAL_SIZE_BUCKETS`] index they read from.
const BREAKDOWN_LABELS: [(&str, usize); 5] = [
    ("Mega Deals ($100M+)", 4),
    ("Large ($5M-$100M)", 3),
    ("Medium ($1M-$5M)", 2),
    ("Small ($100K-$1M)", 1),
    ("Micro (<$100K)", 0),
];

/// Half-up rounding at `decimals` places, matching `Math.round(x * 10^d) / 10^d`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn investment_trend(years: &[YearAmount]) -> Vec<Record> {
    years
        .iter()
        .map(|entry| {
            record(json!({
                "year": entry.year,
                "total": round_to(entry.amount / MILLION, 0) as i64,
            }))
        })
        .collect()
}

pub fn top_sectors(sectors: &[SectorAmount]) -> Vec<Record> {
    let mut ranked = sectors.to_vec();
    ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    ranked
        .into_iter()
        .take(TOP_SECTOR_COUNT)
        .map(|entry| {
            record(json!({
                "sector": entry.sector,
                "value": round_to(entry.amount / BILLION, 2),
            }))
        })
        .collect()
}

/// Joins counts with averages by year; a year with no average gets 0.
pub fn deal_volume_and_size(volumes: &[YearAmount], averages: &[YearAmount]) -> Vec<Record> {
    volumes
        .iter()
        .map(|volume| {
            let avg_size = averages
                .iter()
                .find(|avg| avg.year == volume.year)
                .map(|avg| round_to(avg.amount / MILLION, 1))
                .unwrap_or(0.0);
            record(json!({
                "year": volume.year,
                "volume": volume.amount as u64,
                "avgSize": avg_size,
            }))
        })
        .collect()
}

pub fn deal_size_breakdown(splits: &[DealSizeSplit]) -> Vec<Record> {
    splits
        .iter()
        .map(|split| {
            let mut row = Map::new();
            row.insert("year".to_owned(), json!(split.year));
            for (label, bucket) in BREAKDOWN_LABELS {
                row.insert(label.to_owned(), json!(split.buckets[bucket]));
            }
            row
        })
        .collect()
}

/// `(current - previous) / previous * 100`, one decimal. The first year has
/// no predecessor and is left out; a zero predecessor yields 0.
pub fn yoy_growth(years: &[YearAmount]) -> Vec<Record> {
    years
        .windows(2)
        .map(|pair| {
            let (previous, current) = (pair[0].amount, pair[1].amount);
            let growth_rate = if previous == 0.0 {
                0.0
            } else {
                (current - previous) / previous * 100.0
            };
            record(json!({
                "year": pair[1].year,
                "growthRate": round_to(growth_rate, 1),
            }))
        })
        .collect()
}

pub fn regional_bar_chart(regions: &[RegionSectorAmounts]) -> Vec<Record> {
    regions
        .iter()
        .map(|region| {
            let mut row = Map::new();
            row.insert("region".to_owned(), json!(region.region));
            for (sector, amount) in REGION_SECTORS.iter().zip(region.amounts) {
                row.insert((*sector).to_owned(), json!(round_to(amount / MILLION, 2)));
            }
            row
        })
        .collect()
}

/// Bucket amounts in billions, unrounded, with the year as a string label.
pub fn deal_size_chart(splits: &[DealSizeSplit]) -> Vec<Record> {
    splits
        .iter()
        .map(|split| {
            let mut row = Map::new();
            row.insert("year".to_owned(), json!(split.year.to_string()));
            for (bucket, amount) in DEAL_SIZE_BUCKETS.iter().zip(split.buckets) {
                row.insert((*bucket).to_owned(), json!(amount / BILLION));
            }
            row
        })
        .collect()
}

pub fn total_by_region(regions: &[RegionSectorAmounts]) -> Vec<Record> {
    regions
        .iter()
        .map(|region| {
            let total: f64 = region.amounts.iter().sum();
            record(json!({
                "region": region.region,
                "total": round_to(total / MILLION, 1),
            }))
        })
        .collect()
}

/// Each region's amount as a percentage of the sector's best region.
pub fn region_radar(regions: &[RegionSectorAmounts]) -> Vec<Record> {
    REGION_SECTORS
        .iter()
        .enumerate()
        .map(|(index, sector)| {
            let max = regions
                .iter()
                .map(|region| region.amounts[index])
                .fold(f64::NEG_INFINITY, f64::max);
            let mut row = Map::new();
            row.insert("sector".to_owned(), json!(sector));
            for region in regions {
                let relative = if max > 0.0 {
                    round_to(region.amounts[index] / max * 100.0, 0) as i64
                } else {
                    0
                };
                row.insert(region.region.to_owned(), json!(relative));
            }
            row
        })
        .collect()
}

/// Highest-amount region per sector; ties keep the earlier region.
pub fn top_regions(regions: &[RegionSectorAmounts]) -> Vec<Record> {
    REGION_SECTORS
        .iter()
        .enumerate()
        .map(|(index, sector)| {
            let mut leader: Option<(&str, f64)> = None;
            for region in regions {
                let amount = region.amounts[index];
                if amount > leader.map_or(0.0, |(_, best)| best) {
                    leader = Some((region.region, amount));
                }
            }
            let (region, amount) = match leader {
                Some((region, amount)) => (Value::from(region), amount),
                None => (Value::Null, 0.0),
            };
            record(json!({
                "sector": sector,
                "region": region,
                "amount": round_to(amount / MILLION, 1),
            }))
        })
        .collect()
}

pub struct InvestmentSeries {
    pub trend: Vec<Record>,
    pub top_sectors: Vec<Record>,
    pub deal_volume_and_size: Vec<Record>,
    pub deal_size_breakdown: Vec<Record>,
    pub yoy_growth: Vec<Record>,
}

impl InvestmentSeries {
    pub fn from_datasets() -> Self {
        Self {
            trend: investment_trend(&TOTAL_INVESTMENT_BY_YEAR),
            top_sectors: top_sectors(&TOTAL_INVESTMENT_BY_SECTOR),
            deal_volume_and_size: deal_volume_and_size(
                &INVESTMENT_VOLUME_BY_YEAR,
                &INVESTMENT_AVG_BY_YEAR,
            ),
            deal_size_breakdown: deal_size_breakdown(&INVESTMENT_PERCENTAGE_BY_CATEGORY),
            yoy_growth: yoy_growth(&TOTAL_INVESTMENT_BY_YEAR),
        }
    }
}

pub struct RegionalSeries {
    pub regional_bar_chart: Vec<Record>,
    pub deal_size_chart: Vec<Record>,
    pub total_by_region: Vec<Record>,
    pub region_radar: Vec<Record>,
    pub top_regions: Vec<Record>,
}

impl RegionalSeries {
    pub fn from_datasets() -> Self {
        Self {
            regional_bar_chart: regional_bar_chart(&REGION_DATA),
            deal_size_chart: deal_size_chart(&INVESTMENT_AMOUNT_BY_CATEGORY),
            total_by_region: total_by_region(&REGION_DATA),
            region_radar: region_radar(&REGION_DATA),
            top_regions: top_regions(&REGION_DATA),
        }
    }
}
