use dealflow_core::lbo::{run_lbo, LboAssumptions};
use dealflow_core::scenarios::{run_lbo_sensitivity, LboMetric, LboSensitivityInput};
use dealflow_core::SensitivityVariable;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference() -> LboAssumptions {
    LboAssumptions {
        entry_ebitda: dec!(50),
        entry_multiple: dec!(10),
        revenue_growth: dec!(0.08),
        ebitda_margin: dec!(0.20),
        capex_pct_revenue: dec!(0.04),
        nwc_pct_revenue: dec!(0.02),
        interest_rate: dec!(0.08),
        leverage_multiple: dec!(4.0),
        exit_multiple: dec!(9),
        years: 5,
        tax_rate: dec!(0.25),
    }
}

fn var(name: &str, min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
    SensitivityVariable {
        name: name.into(),
        min,
        max,
        step,
    }
}

#[test]
fn test_grid_cells_match_direct_runs() {
    let input = LboSensitivityInput {
        base: reference(),
        variable_1: var("revenue_growth", dec!(0.04), dec!(0.12), dec!(0.04)),
        variable_2: var("interest_rate", dec!(0.06), dec!(0.10), dec!(0.02)),
        output_metric: LboMetric::Irr,
    };
    let grid = run_lbo_sensitivity(&input).unwrap().result;

    assert_eq!(grid.variable_1_values, vec![dec!(0.04), dec!(0.08), dec!(0.12)]);
    assert_eq!(grid.variable_2_values, vec![dec!(0.06), dec!(0.08), dec!(0.10)]);
    assert_eq!(grid.base_case_position, (1, 1));

    for (i, growth) in grid.variable_1_values.iter().enumerate() {
        for (j, rate) in grid.variable_2_values.iter().enumerate() {
            let mut direct = reference();
            direct.revenue_growth = *growth;
            direct.interest_rate = *rate;
            assert_eq!(grid.matrix[i][j], Some(run_lbo(&direct).unwrap().irr));
        }
    }
}

#[test]
fn test_irr_rises_with_growth_and_falls_with_rate() {
    let input = LboSensitivityInput {
        base: reference(),
        variable_1: var("revenue_growth", dec!(0.00), dec!(0.10), dec!(0.05)),
        variable_2: var("interest_rate", dec!(0.05), dec!(0.11), dec!(0.03)),
        output_metric: LboMetric::Irr,
    };
    let grid = run_lbo_sensitivity(&input).unwrap().result;
    let m = &grid.matrix;
    for i in 0..m.len() {
        for j in 0..m[i].len() {
            if i + 1 < m.len() {
                assert!(m[i + 1][j] > m[i][j]);
            }
            if j + 1 < m[i].len() {
                assert!(m[i][j + 1] < m[i][j]);
            }
        }
    }
}

#[test]
fn test_years_axis() {
    let input = LboSensitivityInput {
        base: reference(),
        variable_1: var("years", dec!(3), dec!(7), dec!(2)),
        variable_2: var("exit_multiple", dec!(8), dec!(10), dec!(2)),
        output_metric: LboMetric::ExitDebt,
    };
    let grid = run_lbo_sensitivity(&input).unwrap().result;
    assert_eq!(grid.variable_1_values, vec![dec!(3), dec!(5), dec!(7)]);
    // Longer holds pay down more debt; exit multiple has no effect on debt
    for j in 0..2 {
        assert!(grid.matrix[0][j] > grid.matrix[1][j]);
        assert!(grid.matrix[1][j] > grid.matrix[2][j]);
    }
    assert_eq!(grid.matrix[1][0], grid.matrix[1][1]);
}

#[test]
fn test_fractional_years_cell_is_infeasible() {
    let input = LboSensitivityInput {
        base: reference(),
        variable_1: var("years", dec!(4), dec!(5), dec!(0.5)),
        variable_2: var("exit_multiple", dec!(9), dec!(9), dec!(1)),
        output_metric: LboMetric::Moic,
    };
    let out = run_lbo_sensitivity(&input).unwrap();
    assert!(out.result.matrix[0][0].is_some());
    assert!(out.result.matrix[1][0].is_none());
    assert!(out.result.matrix[2][0].is_some());
    assert_eq!(out.warnings.len(), 1);
}
