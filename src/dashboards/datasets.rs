//! Static Canadian tech investment tables behind the built-in dashboards.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearAmount {
    pub year: u16,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorAmount {
    pub sector: &'static str,
    pub amount: f64,
}

/// One value per entry of [`DEAL_SIZE_BUCKETS`], same order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealSizeSplit {
    pub year: u16,
    pub buckets: [f64; 5],
}

/// One value per entry of [`REGION_SECTORS`], same order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSectorAmounts {
    pub region: &'static str,
    pub amounts: [f64; 5],
}

const fn year(year: u16, amount: f64) -> YearAmount {
    YearAmount { year, amount }
}

const fn sector(sector: &'static str, amount: f64) -> SectorAmount {
    SectorAmount { sector, amount }
}

const fn split(year: u16, buckets: [f64; 5]) -> DealSizeSplit {
    DealSizeSplit { year, buckets }
}

const fn region(region: &'static str, amounts: [f64; 5]) -> RegionSectorAmounts {
    RegionSectorAmounts { region, amounts }
}

pub const DEAL_SIZE_BUCKETS: [&str; 5] = ["<$100K", "$100K-$1M", "$1M-$5M", "$5M-$100M", "$100M+"];

pub const REGION_SECTORS: [&str; 5] = [
    "Software & Cloud",
    "Finance & Payments",
    "Robotics & Advanced Tech",
    "AI & Big Data",
    "Health & Biotech",
];

pub const TOTAL_INVESTMENT_BY_YEAR: [YearAmount; 7] = [
    year(2019, 4_978_962_662.0),
    year(2020, 4_354_614_836.0),
    year(2021, 14_026_053_396.0),
    year(2022, 9_749_292_441.0),
    year(2023, 5_742_746_272.0),
    year(2024, 9_081_673_276.0),
    year(2025, 5_911_679_857.127_659_797_7),
];

pub const TOTAL_INVESTMENT_BY_SECTOR: [SectorAmount; 20] = [
    sector("AI & Big Data", 5_662_169_689.0),
    sector("Aerospace & Space", 187_734_800.0),
    sector("Agriculture & Food", 674_844_906.0),
    sector("Automotive & Mobility", 464_912_250.0),
    sector("Business & HR", 436_073_547.0),
    sector("Cyber & Blockchain", 3_591_219_520.0),
    sector("Education & Learning", 1_554_298_650.0),
    sector("Energy & Environment", 3_435_636_064.0),
    sector("Entertainment & Media", 168_392_292.0),
    sector("Finance & Payments", 7_741_899_328.0),
    sector("Health & Biotech", 5_726_027_398.0),
    sector("Logistics & Transportation", 1_327_350_431.0),
    sector("Manufacturing & Industrial", 121_400_000.0),
    sector("Marketing & Advertising", 582_066_952.0),
    sector("Real Estate & Construction", 699_583_961.0),
    sector("Retail & eCommerce", 923_532_651.0),
    sector("Robotics & Advanced Tech", 6_121_116_393.0),
    sector("Social & Communication", 4_814_139.0),
    sector("Software & Cloud", 8_963_562_345.0),
    sector("Wearables, AR/VR & Devices", 307_937_576.0),
];

/// Deal counts per year.
pub const INVESTMENT_VOLUME_BY_YEAR: [YearAmount; 6] = [
    year(2019, 558.0),
    year(2020, 543.0),
    year(2021, 701.0),
    year(2022, 417.0),
    year(2023, 249.0),
    year(2024, 254.0),
];

pub const INVESTMENT_AVG_BY_YEAR: [YearAmount; 6] = [
    year(2019, 8_922_872.154_121_865),
    year(2020, 8_019_548.500_920_811),
    year(2021, 20_008_635.372_325_25),
    year(2022, 23_379_598.179_856_114),
    year(2023, 23_063_238.040_160_64),
    year(2024, 35_754_619.196_850_4),
];

/// Share of yearly investment per deal-size bucket, in percent.
pub const INVESTMENT_PERCENTAGE_BY_CATEGORY: [DealSizeSplit; 6] = [
    split(2019, [0.04, 0.84, 7.23, 57.46, 34.44]),
    split(2020, [0.03, 0.97, 7.79, 64.42, 26.8]),
    split(2021, [0.01, 0.29, 3.44, 35.74, 60.52]),
    split(2022, [0.0, 0.23, 3.59, 46.32, 49.86]),
    split(2023, [0.0, 0.04, 3.31, 54.96, 41.7]),
    split(2024, [0.0, 0.03, 2.4, 28.5, 69.08]),
];

/// Dollar amount per deal-size bucket.
pub const INVESTMENT_AMOUNT_BY_CATEGORY: [DealSizeSplit; 6] = [
    split(
        2019,
        [1_792_785.0, 41_597_186.0, 359_955_620.0, 2_860_894_121.0, 1_714_722_950.0],
    ),
    split(
        2020,
        [1_099_590.0, 42_345_244.0, 339_050_952.0, 2_805_094_050.0, 1_167_025_000.0],
    ),
    split(
        2021,
        [1_052_465.0, 40_534_414.0, 483_156_590.0, 5_012_902_902.0, 8_488_407_025.0],
    ),
    split(
        2022,
        [27.0, 22_295_297.0, 349_999_264.0, 4_516_023_653.0, 4_860_974_200.0],
    ),
    split(
        2023,
        [0.0, 2_426_192.0, 189_879_364.0, 3_155_998_116.0, 2_394_442_600.0],
    ),
    split(
        2024,
        [70.0, 2_390_000.0, 217_820_894.0, 2_588_088_062.0, 6_273_374_250.0],
    ),
];

/// Average deal size per region for the sectors in [`REGION_SECTORS`].
pub const REGION_DATA: [RegionSectorAmounts; 6] = [
    region(
        "Alberta",
        [12_069_670.0, 31_599_790.0, 12_508_130.0, 4_769_894.0, 3_274_709.0],
    ),
    region(
        "British Columbia",
        [29_319_550.0, 46_082_940.0, 13_984_610.0, 11_632_960.0, 20_905_960.0],
    ),
    region(
        "Ottawa",
        [20_628_000.0, 23_873_490.0, 13_085_710.0, 20_919_360.0, 2_380_842.0],
    ),
    region(
        "Quebec",
        [10_854_740.0, 14_729_420.0, 16_598_490.0, 10_291_920.0, 16_655_270.0],
    ),
    region(
        "Toronto",
        [18_054_230.0, 22_665_870.0, 9_527_082.0, 31_237_190.0, 11_288_200.0],
    ),
    region(
        "Waterloo",
        [17_356_940.0, 3_769_709.0, 59_804_180.0, 20_045_230.0, 5_053_557.0],
    ),
];
