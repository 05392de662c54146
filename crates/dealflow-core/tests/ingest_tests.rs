use chrono::{TimeZone, Utc};
use dealflow_core::ingest::{ingest_csv, IngestInput};
use dealflow_core::screening::metrics::deal_metrics;
use dealflow_core::screening::DealStage;
use dealflow_core::DealflowError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const BROKER_FILE: &str = "\
Company,Sector,Sub_Sector,Country,LTM_Revenue,LTM_EBITDA,Enterprise_Value,Multiple,Revenue_Growth,Debt
Acme Logistics,Industrials,3PL,US,250,37.5,300,,0.08,40
CloudHealth SaaS,Healthcare IT,SaaS,US,80,18,360,,0.25,0
Euro Med Devices,Healthcare,Devices,EU,150,42,504,11.5,0.06,60
Broken Co,Industrials,,US,abc,10,100,,0.02,0
,Retail,,UK,100,10,80,,0.01,0
";

fn input(csv: &str) -> IngestInput {
    IngestInput {
        csv: csv.into(),
        source: None,
        default_ev_multiple: None,
    }
}

#[test]
fn test_broker_file_with_aliased_headers() {
    let at = Utc.with_ymd_and_hms(2025, 6, 30, 9, 0, 0).unwrap();
    let out = ingest_csv(&input(BROKER_FILE), at).unwrap();
    let report = &out.result;

    assert_eq!(report.accepted_count, 3);
    assert_eq!(report.rejected_count, 2);

    let acme = &report.accepted[0];
    assert_eq!(acme.name, "Acme Logistics");
    assert_eq!(acme.subsector.as_deref(), Some("3PL"));
    assert_eq!(acme.geography, "US");
    assert_eq!(acme.ev_ebitda, Some(dec!(8)));
    assert_eq!(acme.growth_rate, dec!(0.08));
    assert_eq!(acme.net_debt, dec!(40));
    assert_eq!(acme.deal_stage, DealStage::Sourced);
    assert_eq!(acme.updated_at, Some(at));

    // Stated multiple is kept even when EV / EBITDA differs
    assert_eq!(report.accepted[2].ev_ebitda, Some(dec!(11.5)));

    let lines: Vec<u64> = report.rejected.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![5, 6]);
    assert!(report.rejected[0].reason.contains("revenue"));
    assert!(report.rejected[1].reason.contains("name"));
    assert_eq!(out.warnings, vec!["2 row(s) rejected".to_string()]);
}

#[test]
fn test_imported_deals_feed_metrics() {
    let at = Utc.with_ymd_and_hms(2025, 6, 30, 9, 0, 0).unwrap();
    let report = ingest_csv(&input(BROKER_FILE), at).unwrap().result;
    let metrics = deal_metrics(&report.accepted);
    assert_eq!(metrics.count, 3);
    assert_eq!(metrics.by_sector.len(), 3);
    // Multiples 8, 20, 11.5
    assert_eq!(metrics.median_multiple, Some(dec!(11.5)));
    assert_eq!(metrics.avg_multiple, Some(dec!(13.17)));
}

#[test]
fn test_header_only_file() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let out = ingest_csv(&input("name,sector,geography,revenue,ebitda,ev\n"), at).unwrap();
    assert_eq!(out.result.accepted_count, 0);
    assert_eq!(out.result.rejected_count, 0);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_missing_required_column_names_it() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    match ingest_csv(&input("name,sector,geography,ebitda\nA,B,C,1\n"), at) {
        Err(DealflowError::InvalidInput { field, .. }) => assert_eq!(field, "revenue"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_short_row_rejected_not_dropped() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let csv = "name,sector,geography,revenue,ebitda\nAcme,Industrials,US,250\n";
    let report = ingest_csv(&input(csv), at).unwrap().result;
    assert_eq!(report.accepted_count, 0);
    assert_eq!(report.rejected_count, 1);
    assert!(report.rejected[0].reason.contains("ebitda"));
}

#[test]
fn test_scientific_notation_accepted() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let csv = "name,sector,geography,revenue,ebitda\nBig,Tech,US,1.2e3,3e2\n";
    let report = ingest_csv(&input(csv), at).unwrap().result;
    assert_eq!(report.accepted[0].revenue, dec!(1200));
    assert_eq!(report.accepted[0].ebitda, dec!(300));
    assert_eq!(report.accepted[0].ebitda_margin, dec!(0.25));
    assert!(report.accepted[0].ev > Decimal::ZERO);
}
