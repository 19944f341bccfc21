//! Built-in additive decomposer.
//!
//! The dependent variable is regressed jointly on:
//!
//! - trend: intercept + slope + hinge terms at evenly spaced changepoints
//! - season: yearly Fourier series (period 365.25 days)
//! - monthly: Fourier series (period 30.5 days)
//! - weekday: Fourier series (period 7 days)
//! - holiday: one indicator per event label
//!
//! and each component's values are its columns times its coefficients.
//!
//! Fourier orders are capped at half the samples per period, so coarse series
//! (monthly rows against a yearly wave) get no aliased columns.
//!
//! Sign constraints:
//! - `zero` removes the component from the design (its values are all zero)
//! - `positive`/`negative` bound the trend slope/hinge coefficients and the
//!   holiday coefficients; violating coefficients are pinned to zero and the
//!   model is refit until none violate
//! - on Fourier components the sign has no coefficient-level meaning and is
//!   left to the downstream model

use std::collections::BTreeSet;

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decomp::{ComponentSeries, Decomposer, DecompositionError, detect_interval};
use crate::domain::{ComponentKind, HolidayEvent, SignConstraint};
use crate::math::{epoch_days, fill_fourier, hinge, solve_least_squares};

const YEARLY_PERIOD: f64 = 365.25;
const MONTHLY_PERIOD: f64 = 30.5;
const WEEKLY_PERIOD: f64 = 7.0;

/// Tuning knobs of the regression decomposer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecomposerOptions {
    /// Number of trend changepoints.
    pub changepoints: usize,
    /// Share of history (from the start) in which changepoints are placed.
    pub changepoint_range: f64,
    pub yearly_order: usize,
    pub monthly_order: usize,
    pub weekly_order: usize,
}

impl Default for DecomposerOptions {
    fn default() -> Self {
        Self {
            changepoints: 3,
            changepoint_range: 0.8,
            yearly_order: 10,
            monthly_order: 5,
            weekly_order: 3,
        }
    }
}

/// Joint least squares decomposition.
#[derive(Debug, Clone, Default)]
pub struct RegressionDecomposer {
    options: DecomposerOptions,
}

/// Design columns owned by one component.
#[derive(Debug, Clone)]
struct Block {
    kind: Option<ComponentKind>,
    cols: Vec<usize>,
    /// Columns whose coefficient sign is bounded by `sign`.
    bounded: Vec<usize>,
    sign: SignConstraint,
}

impl RegressionDecomposer {
    pub fn new(options: DecomposerOptions) -> Self {
        Self { options }
    }

    fn build_design(
        &self,
        dates: &[NaiveDate],
        calendar: &[HolidayEvent],
        components: &[ComponentKind],
        signs: &[SignConstraint],
    ) -> Result<(Vec<Vec<f64>>, Vec<Block>), DecompositionError> {
        let opts = &self.options;
        if !(opts.changepoint_range.is_finite() && opts.changepoint_range > 0.0 && opts.changepoint_range <= 1.0) {
            return Err(DecompositionError::Model(format!(
                "changepoint_range must lie in (0, 1], got {}",
                opts.changepoint_range
            )));
        }

        let sign_of = |kind: ComponentKind| {
            components
                .iter()
                .position(|&k| k == kind)
                .map(|i| signs.get(i).copied().unwrap_or_default())
        };
        let wants = |kind: ComponentKind| matches!(sign_of(kind), Some(s) if s != SignConstraint::Zero);

        let t0 = dates.first().map(|&d| epoch_days(d)).unwrap_or(0.0);
        let t1 = dates.last().map(|&d| epoch_days(d)).unwrap_or(0.0);
        let span = (t1 - t0).max(1.0);
        let step = detect_interval(dates).map_or(1.0, |interval| interval.days() as f64);

        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();

        // Level + trend. The intercept belongs to the trend when one is requested.
        let intercept = vec![1.0; dates.len()];
        if wants(ComponentKind::Trend) {
            let u: Vec<f64> = dates.iter().map(|&d| (epoch_days(d) - t0) / span).collect();
            let mut cols = vec![intercept, u.clone()];
            for j in 1..=opts.changepoints {
                let knot = opts.changepoint_range * j as f64 / (opts.changepoints as f64 + 1.0);
                cols.push(u.iter().map(|&x| hinge(x, knot)).collect());
            }
            let sign = sign_of(ComponentKind::Trend).unwrap_or_default();
            push_block(&mut columns, &mut blocks, Some(ComponentKind::Trend), cols, Some(1), sign);
        } else {
            push_block(&mut columns, &mut blocks, None, vec![intercept], None, SignConstraint::Default);
        }

        for (kind, period, order) in [
            (ComponentKind::Season, YEARLY_PERIOD, opts.yearly_order),
            (ComponentKind::Monthly, MONTHLY_PERIOD, opts.monthly_order),
            (ComponentKind::Weekday, WEEKLY_PERIOD, opts.weekly_order),
        ] {
            let order = resolvable_order(order, period, step);
            if !wants(kind) || order == 0 {
                continue;
            }
            let sign = sign_of(kind).unwrap_or_default();
            if matches!(sign, SignConstraint::Positive | SignConstraint::Negative) {
                debug!(component = %kind, sign = sign.as_str(), "sign on a Fourier component is left to the downstream model");
            }
            let mut cols = vec![Vec::with_capacity(dates.len()); 2 * order];
            let mut row = vec![0.0; 2 * order];
            for &d in dates {
                fill_fourier(epoch_days(d), period, order, &mut row);
                for (col, &v) in cols.iter_mut().zip(row.iter()) {
                    col.push(v);
                }
            }
            push_block(&mut columns, &mut blocks, Some(kind), cols, None, sign);
        }

        if wants(ComponentKind::Holiday) {
            let cols = holiday_indicators(dates, calendar);
            if cols.is_empty() {
                debug!("no calendar events fall inside the series; holiday component is zero");
            }
            let sign = sign_of(ComponentKind::Holiday).unwrap_or_default();
            push_block(&mut columns, &mut blocks, Some(ComponentKind::Holiday), cols, Some(0), sign);
        }

        Ok((columns, blocks))
    }
}

impl Decomposer for RegressionDecomposer {
    fn decompose(
        &self,
        series: &[(NaiveDate, f64)],
        calendar: &[HolidayEvent],
        region: &str,
        components: &[ComponentKind],
        signs: &[SignConstraint],
    ) -> Result<ComponentSeries, DecompositionError> {
        let dates: Vec<NaiveDate> = series.iter().map(|(d, _)| *d).collect();
        let y: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        if y.iter().any(|v| !v.is_finite()) {
            return Err(DecompositionError::Model("series contains non-finite values".to_string()));
        }

        let (columns, blocks) = self.build_design(&dates, calendar, components, signs)?;
        let n = y.len();
        let p = columns.len();
        if n <= p {
            return Err(DecompositionError::InsufficientData { needed: p + 1, got: n });
        }
        debug!(region, rows = n, params = p, "regression decomposition");

        let beta = solve_with_signs(&columns, &y, &blocks)?;

        let mut out = ComponentSeries::new();
        for &kind in components {
            let mut values = vec![0.0; n];
            if let Some(block) = blocks.iter().find(|b| b.kind == Some(kind)) {
                for &j in &block.cols {
                    for (v, &x) in values.iter_mut().zip(columns[j].iter()) {
                        *v += x * beta[j];
                    }
                }
            }
            out.insert(kind, values);
        }
        Ok(out)
    }
}

/// Highest Fourier order a series sampled every `step` days can resolve.
fn resolvable_order(order: usize, period: f64, step: f64) -> usize {
    let nyquist = (period / step / 2.0).floor().max(0.0) as usize;
    order.min(nyquist)
}

/// Append `cols` to the design as one block.
///
/// `bounded_from` is the offset within the block from which coefficients obey `sign`.
fn push_block(
    columns: &mut Vec<Vec<f64>>,
    blocks: &mut Vec<Block>,
    kind: Option<ComponentKind>,
    cols: Vec<Vec<f64>>,
    bounded_from: Option<usize>,
    sign: SignConstraint,
) {
    let start = columns.len();
    let idx: Vec<usize> = (start..start + cols.len()).collect();
    columns.extend(cols);
    let bounded = bounded_from
        .map(|skip| idx.get(skip..).map(<[usize]>::to_vec).unwrap_or_default())
        .unwrap_or_default();
    blocks.push(Block {
        kind,
        cols: idx,
        bounded,
        sign,
    });
}

/// One indicator column per event label with at least one hit.
///
/// Row `i` covers `[date_i, date_{i+1})`; the last row covers as many days as
/// the gap before it.
fn holiday_indicators(dates: &[NaiveDate], calendar: &[HolidayEvent]) -> Vec<Vec<f64>> {
    let n = dates.len();
    if n == 0 {
        return Vec::new();
    }
    let last_gap = if n >= 2 { dates[n - 1] - dates[n - 2] } else { chrono::Duration::days(1) };
    let period_end = |i: usize| if i + 1 < n { dates[i + 1] } else { dates[i] + last_gap };

    let labels: BTreeSet<&str> = calendar.iter().map(|e| e.holiday.as_str()).collect();
    let mut out = Vec::new();
    for label in labels {
        let mut col = vec![0.0; n];
        for event in calendar.iter().filter(|e| e.holiday == label) {
            // First row whose period ends after the event.
            let i = dates.partition_point(|&d| d <= event.ds);
            if i == 0 {
                continue;
            }
            let row = i - 1;
            if event.ds < period_end(row) {
                col[row] = 1.0;
            }
        }
        if col.iter().any(|&v| v != 0.0) {
            out.push(col);
        }
    }
    out
}

fn solve_with_signs(columns: &[Vec<f64>], y: &[f64], blocks: &[Block]) -> Result<Vec<f64>, DecompositionError> {
    let n = y.len();
    let p = columns.len();
    let yv = DVector::from_column_slice(y);
    let mut pinned = vec![false; p];

    // Each pass pins at least one more coefficient, so this terminates.
    for _ in 0..=p {
        let free: Vec<usize> = (0..p).filter(|&j| !pinned[j]).collect();
        let mut x = DMatrix::<f64>::zeros(n, free.len());
        for (k, &j) in free.iter().enumerate() {
            for i in 0..n {
                x[(i, k)] = columns[j][i];
            }
        }
        let solved = solve_least_squares(&x, &yv)
            .ok_or_else(|| DecompositionError::NonConvergence("least squares solve failed".to_string()))?;

        let mut beta = vec![0.0; p];
        for (k, &j) in free.iter().enumerate() {
            beta[j] = solved[k];
        }

        let mut violated = false;
        for block in blocks {
            for &j in &block.bounded {
                if !pinned[j] && !block.sign.admits(beta[j]) {
                    pinned[j] = true;
                    violated = true;
                }
            }
        }
        if !violated {
            return Ok(beta);
        }
    }

    Err(DecompositionError::NonConvergence(
        "sign-constrained refit did not settle".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::f64::consts::PI;

    fn weekly(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        (0..n).map(|i| start + Duration::days(7 * i as i64)).collect()
    }

    fn event(d: NaiveDate, label: &str) -> HolidayEvent {
        HolidayEvent::new(d, label, "US")
    }

    #[test]
    fn holiday_indicator_lands_in_the_covering_week() {
        let dates = weekly(4);
        let cal = vec![
            event(dates[1] + Duration::days(3), "mid_week"),
            event(dates[0] - Duration::days(1), "before_start"),
        ];
        let cols = holiday_indicators(&dates, &cal);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0], vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn recovers_linear_trend_and_zero_season() {
        let dates = weekly(156);
        let series: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, 1000.0 + 2.0 * i as f64))
            .collect();

        let dec = RegressionDecomposer::default();
        let out = dec
            .decompose(
                &series,
                &[],
                "US",
                &[ComponentKind::Trend, ComponentKind::Season],
                &[SignConstraint::Default, SignConstraint::Default],
            )
            .unwrap();

        let trend = &out[&ComponentKind::Trend];
        let season = &out[&ComponentKind::Season];
        for (i, (&(_, y), (&t, &s))) in series.iter().zip(trend.iter().zip(season.iter())).enumerate() {
            assert!((t + s - y).abs() < 1e-6, "row {i}: {t} + {s} != {y}");
            assert!(s.abs() < 1e-6, "row {i}: season {s}");
        }
    }

    #[test]
    fn yearly_wave_goes_to_season() {
        let dates = weekly(156);
        let series: Vec<(NaiveDate, f64)> = dates
            .iter()
            .map(|&d| (d, 500.0 + 50.0 * (2.0 * PI * epoch_days(d) / YEARLY_PERIOD).sin()))
            .collect();

        let out = RegressionDecomposer::default()
            .decompose(
                &series,
                &[],
                "US",
                &[ComponentKind::Season],
                &[SignConstraint::Default],
            )
            .unwrap();
        let season = &out[&ComponentKind::Season];
        let max = season.iter().fold(f64::MIN, |a, &b| a.max(b));
        assert!((max - 50.0).abs() < 1.0, "season amplitude {max}");
    }

    #[test]
    fn zero_sign_yields_zero_component() {
        let dates = weekly(60);
        let series: Vec<(NaiveDate, f64)> = dates.iter().enumerate().map(|(i, &d)| (d, i as f64)).collect();
        let out = RegressionDecomposer::default()
            .decompose(
                &series,
                &[],
                "US",
                &[ComponentKind::Trend, ComponentKind::Holiday],
                &[SignConstraint::Zero, SignConstraint::Default],
            )
            .unwrap();
        assert!(out[&ComponentKind::Trend].iter().all(|&v| v == 0.0));
        assert!(out[&ComponentKind::Holiday].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn positive_holiday_sign_pins_negative_effect() {
        let dates = weekly(80);
        let holiday_rows = [5usize, 20, 40, 60];
        let cal: Vec<HolidayEvent> = holiday_rows.iter().map(|&i| event(dates[i], "sale")).collect();
        let series: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, if holiday_rows.contains(&i) { 80.0 } else { 100.0 }))
            .collect();

        let dec = RegressionDecomposer::default();
        let free = dec
            .decompose(&series, &cal, "US", &[ComponentKind::Holiday], &[SignConstraint::Default])
            .unwrap();
        assert!(free[&ComponentKind::Holiday][5] < -10.0);

        let bounded = dec
            .decompose(&series, &cal, "US", &[ComponentKind::Holiday], &[SignConstraint::Positive])
            .unwrap();
        assert!(bounded[&ComponentKind::Holiday].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn fourier_orders_are_capped_by_cadence() {
        assert_eq!(resolvable_order(10, YEARLY_PERIOD, 30.0), 6);
        assert_eq!(resolvable_order(10, YEARLY_PERIOD, 7.0), 10);
        assert_eq!(resolvable_order(5, MONTHLY_PERIOD, 7.0), 2);
        assert_eq!(resolvable_order(5, MONTHLY_PERIOD, 30.0), 0);
        assert_eq!(resolvable_order(3, WEEKLY_PERIOD, 1.0), 3);
    }

    #[test]
    fn two_years_of_monthly_rows_decompose() {
        let dates: Vec<NaiveDate> = (2021..=2022)
            .flat_map(|y| (1..=12).map(move |m| NaiveDate::from_ymd_opt(y, m, 1).unwrap()))
            .collect();
        let series: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, 1000.0 + 5.0 * i as f64 + 40.0 * (2.0 * PI * epoch_days(d) / YEARLY_PERIOD).sin()))
            .collect();
        let cal = vec![event(NaiveDate::from_ymd_opt(2021, 11, 25).unwrap(), "thanksgiving")];
        let components = [ComponentKind::Trend, ComponentKind::Season, ComponentKind::Holiday];

        let out = RegressionDecomposer::default()
            .decompose(&series, &cal, "US", &components, &[SignConstraint::Default; 3])
            .unwrap();
        for kind in components {
            assert_eq!(out[&kind].len(), 24, "{kind}");
            assert!(out[&kind].iter().all(|v| v.is_finite()), "{kind}");
        }
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let series: Vec<(NaiveDate, f64)> = weekly(10).into_iter().map(|d| (d, 1.0)).collect();
        let err = RegressionDecomposer::default()
            .decompose(&series, &[], "US", &[ComponentKind::Season], &[SignConstraint::Default])
            .unwrap_err();
        assert!(matches!(err, DecompositionError::InsufficientData { .. }));
    }
}
