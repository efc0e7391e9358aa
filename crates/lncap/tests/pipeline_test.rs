//! End-to-end: CSV tables in, evaluation out.

use approx::assert_relative_eq;
use lncap::data::store::read_records_from;
use lncap::data::{ConstituentRecord, MarketCapRecord, PriceRecord, compute_forward_returns};
use lncap::output::{DailyRecord, ExportFormat, Exporter};
use lncap::{FactorPipeline, IndexUniverse, Universe};

const CONSTITUENTS: &str = "\
date,instrument
2019-04-01,000001.SZ
2019-04-01,000002.SZ
2019-04-01,600000.SH
2019-04-02,000001.SZ
2019-04-02,000002.SZ
2019-04-02,600000.SH
";

// Older files name the cap column market_cap_float and use compact dates
const CAPS: &str = "\
date,instrument,market_cap_float
20190401,000001.SZ,1000000000
20190401,000002.SZ,3000000000
20190401,600000.SH,9000000000
20190402,000001.SZ,1100000000
20190402,000002.SZ,2900000000
20190402,600000.SH,9500000000
";

const CLOSES: &str = "\
date,instrument,close_price
2019-04-01,000001.SZ,10.0
2019-04-01,000002.SZ,20.0
2019-04-01,600000.SH,30.0
2019-04-02,000001.SZ,10.5
2019-04-02,000002.SZ,20.2
2019-04-02,600000.SH,29.7
2019-04-03,000001.SZ,11.0
2019-04-03,000002.SZ,20.4
2019-04-03,600000.SH,29.4
";

#[test]
fn test_csv_tables_through_pipeline() {
    let constituents: Vec<ConstituentRecord> = read_records_from(CONSTITUENTS.as_bytes()).unwrap();
    let universe = IndexUniverse::from_records("399300.SZ", &constituents);
    assert_eq!(universe.size(), 3);

    let caps: Vec<MarketCapRecord> = read_records_from(CAPS.as_bytes()).unwrap();
    assert!(caps.iter().all(|c| universe.contains(&c.instrument)));

    let closes: Vec<PriceRecord> = read_records_from(CLOSES.as_bytes()).unwrap();
    let prices = compute_forward_returns(closes);
    assert_eq!(prices.iter().filter(|p| p.future_return.is_none()).count(), 3);

    let output = FactorPipeline::new().run(&caps, &prices).unwrap();
    assert_eq!(output.daily.len(), 2);
    assert_eq!(output.observations.len(), 6);

    // Day one: small cap +5%, mid +1%, large -1%
    let first = &output.daily[0];
    assert_eq!(first.n, 3);
    assert_relative_eq!(first.ic.unwrap(), -1.0, epsilon = 1e-12);
    assert_relative_eq!(first.mean_return, (0.05 + 0.01 - 0.01) / 3.0, epsilon = 1e-12);

    let records = DailyRecord::from_daily(&output.daily);
    let csv = records.export_to_string(ExportFormat::Csv).unwrap();
    assert!(csv.starts_with("date,n,ic,cumulative_ic"));
    assert!(csv.contains("2019-04-01,3,-1.0,-1.0"));

    let report = output.report().unwrap().to_ascii_table();
    assert!(report.contains("2019-04-01 to 2019-04-02"));
}
