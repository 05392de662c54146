use dealflow_core::lbo::{run_lbo, LboAssumptions};
use dealflow_core::screening::metrics::{deal_metrics, run_deal_metrics};
use dealflow_core::screening::screener::{run_screen, screen_deals, ScreenInput, ScreenerFilters};
use dealflow_core::screening::{compute_ev_ebitda, score_deal, screening_score, Deal, DealStage};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn deal(name: &str, sector: &str, geo: &str, revenue: Decimal, ebitda: Decimal, ev: Decimal) -> Deal {
    Deal {
        id: None,
        name: name.into(),
        sector: sector.into(),
        subsector: None,
        geography: geo.into(),
        revenue,
        ebitda,
        ebitda_margin: ebitda / revenue,
        ev,
        ev_ebitda: None,
        growth_rate: dec!(0.05),
        net_debt: Decimal::ZERO,
        deal_stage: DealStage::Sourced,
        source: None,
        created_at: None,
        updated_at: None,
    }
}

fn pipeline() -> Vec<Deal> {
    vec![
        // 8.0x, 15% margin
        deal("Acme Logistics", "Industrials", "US", dec!(250), dec!(37.5), dec!(300)),
        // 20.0x, 22.5% margin
        deal("CloudHealth SaaS", "Healthcare IT", "US", dec!(80), dec!(18), dec!(360)),
        // 12.0x, 28% margin
        deal("Euro Med Devices", "Healthcare", "EU", dec!(150), dec!(42), dec!(504)),
        // 4.0x, 10% margin
        deal("Value Parts", "Industrials", "EU", dec!(100), dec!(10), dec!(40)),
    ]
}

// ===========================================================================
// Score
// ===========================================================================

#[test]
fn test_score_boundary_at_and_below_five_times() {
    for multiple in [dec!(5), dec!(4.99), dec!(1), Decimal::ZERO, dec!(-3)] {
        let b = screening_score(dec!(0.2), dec!(0.1), multiple);
        assert_eq!(b.multiple_component, dec!(20), "multiple {multiple}");
    }
}

#[test]
fn test_score_multiple_term_vanishes_for_large_multiples() {
    let mut previous = dec!(20);
    for multiple in [dec!(6), dec!(15), dec!(105), dec!(10005)] {
        let b = screening_score(Decimal::ZERO, Decimal::ZERO, multiple);
        assert!(b.multiple_component < previous);
        previous = b.multiple_component;
    }
    assert!(previous < dec!(0.01));
}

#[test]
fn test_score_closed_form() {
    // 100 * (0.4*0.25 + 0.4*0.10 + 0.2/(1+2)) = 10 + 4 + 6.666...
    let b = screening_score(dec!(0.25), dec!(0.10), dec!(7));
    assert_eq!(b.margin_component, dec!(10));
    assert_eq!(b.growth_component, dec!(4));
    assert_eq!(
        b.score,
        b.margin_component + b.growth_component + b.multiple_component
    );
    assert!((b.score - dec!(20.6667)).abs() < dec!(0.0001));
}

#[test]
fn test_score_deal_prefers_stored_multiple() {
    let mut d = deal("Acme", "Industrials", "US", dec!(250), dec!(37.5), dec!(300));
    assert_eq!(d.effective_ev_ebitda(), dec!(8));
    d.ev_ebitda = Some(dec!(5));
    assert_eq!(score_deal(&d).multiple_component, dec!(20));
    // A stored zero falls back to EV / EBITDA
    d.ev_ebitda = Some(Decimal::ZERO);
    assert_eq!(d.effective_ev_ebitda(), dec!(8));
}

#[test]
fn test_compute_ev_ebitda_rounds_and_guards_zero() {
    assert_eq!(compute_ev_ebitda(dec!(100), dec!(3)), dec!(33.33));
    assert_eq!(compute_ev_ebitda(dec!(100), Decimal::ZERO), Decimal::ZERO);
}

// ===========================================================================
// Screener
// ===========================================================================

#[test]
fn test_screen_ranks_by_score() {
    let ranked = screen_deals(&pipeline(), &ScreenerFilters::default()).unwrap();
    assert_eq!(ranked.len(), 4);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // The only sub-5x deal earns the full multiple component and wins
    assert_eq!(ranked[0].deal.name, "Value Parts");
}

#[test]
fn test_screen_filters_are_inclusive() {
    let filters = ScreenerFilters {
        ev_ebitda_min: Some(dec!(8)),
        ev_ebitda_max: Some(dec!(12)),
        ..ScreenerFilters::default()
    };
    let names: Vec<String> = screen_deals(&pipeline(), &filters)
        .unwrap()
        .into_iter()
        .map(|d| d.deal.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Acme Logistics".to_string()));
    assert!(names.contains(&"Euro Med Devices".to_string()));
}

#[test]
fn test_screen_sector_geo_and_limit() {
    let filters = ScreenerFilters {
        sector: Some("Industrials".into()),
        geography: Some("EU".into()),
        ..ScreenerFilters::default()
    };
    let ranked = screen_deals(&pipeline(), &filters).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].deal.name, "Value Parts");

    let limited = ScreenerFilters {
        limit: 2,
        ..ScreenerFilters::default()
    };
    let top = screen_deals(&pipeline(), &limited).unwrap();
    let all = screen_deals(&pipeline(), &ScreenerFilters::default()).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].deal.name, all[0].deal.name);
    assert_eq!(top[1].deal.name, all[1].deal.name);
}

#[test]
fn test_screen_rejects_inverted_bounds() {
    let filters = ScreenerFilters {
        revenue_min: Some(dec!(500)),
        revenue_max: Some(dec!(100)),
        ..ScreenerFilters::default()
    };
    assert!(screen_deals(&pipeline(), &filters).is_err());
}

#[test]
fn test_run_screen_from_json() {
    let json = serde_json::json!({
        "deals": pipeline(),
        "filters": { "geography": "US" }
    });
    let input: ScreenInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.filters.limit, 200);
    let out = run_screen(&input).unwrap();
    assert_eq!(out.result.matched, 2);
    assert!(out.warnings.is_empty());
}

// ===========================================================================
// Metrics
// ===========================================================================

#[test]
fn test_metrics_over_pipeline() {
    let m = deal_metrics(&pipeline());
    assert_eq!(m.count, 4);
    // Multiples 4, 8, 12, 20
    assert_eq!(m.avg_multiple, Some(dec!(11)));
    assert_eq!(m.median_multiple, Some(dec!(10)));
    assert_eq!(m.by_sector["Industrials"], 2);
    assert_eq!(m.by_geo["US"], 2);
    assert_eq!(m.by_geo["EU"], 2);
}

#[test]
fn test_metrics_exclude_non_positive_multiples() {
    let mut deals = pipeline();
    deals.push(deal("LossCo", "Retail", "UK", dec!(100), dec!(-5), dec!(50)));
    let out = run_deal_metrics(&deals).unwrap();
    assert_eq!(out.result.count, 5);
    assert_eq!(out.result.avg_multiple, Some(dec!(11)));
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_metrics_empty_pipeline() {
    let m = deal_metrics(&[]);
    assert_eq!(m.count, 0);
    assert_eq!(m.avg_multiple, None);
    assert_eq!(m.median_multiple, None);
    assert!(m.by_sector.is_empty());
}

// ===========================================================================
// Deal -> LBO defaults
// ===========================================================================

#[test]
fn test_deal_prepopulates_lbo() {
    let acme = &pipeline()[0];
    let base = LboAssumptions {
        entry_ebitda: dec!(1),
        entry_multiple: dec!(1),
        revenue_growth: dec!(0.05),
        ebitda_margin: dec!(0.5),
        capex_pct_revenue: dec!(0.03),
        nwc_pct_revenue: dec!(0.01),
        interest_rate: dec!(0.09),
        leverage_multiple: dec!(4),
        exit_multiple: dec!(8),
        years: 5,
        tax_rate: dec!(0.25),
    };
    let input = acme.lbo_defaults().apply(base);
    assert_eq!(input.entry_ebitda, dec!(37.5));
    assert_eq!(input.entry_multiple, dec!(8));
    assert_eq!(input.ebitda_margin, dec!(0.15));

    let out = run_lbo(&input).unwrap();
    assert_eq!(out.entry_ev, dec!(300));
    assert_eq!(out.entry_debt, dec!(150));
}

#[test]
fn test_unusable_deal_values_are_not_offered() {
    let loss = deal("LossCo", "Retail", "UK", dec!(100), dec!(-5), dec!(50));
    let defaults = loss.lbo_defaults();
    assert_eq!(defaults.entry_ebitda, None);
    assert_eq!(defaults.entry_multiple, None);
    assert_eq!(defaults.ebitda_margin, None);
}

#[test]
fn test_deal_stage_wire_names() {
    assert_eq!(
        serde_json::to_string(&DealStage::InvestmentCommittee).unwrap(),
        "\"IC\""
    );
    assert_eq!(
        serde_json::from_str::<DealStage>("\"diligence\"").unwrap(),
        DealStage::Diligence
    );
}
