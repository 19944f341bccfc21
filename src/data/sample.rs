//! Synthetic weekly MMM dataset.
//!
//! Produces a seeded dataset shaped like a typical marketing-mix input:
//! two paid channels (one with a separate exposure metric), one organic
//! channel, one numeric context variable, and revenue built from a trend, a
//! yearly wave, monthly calendar events and the channel contributions.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    AdstockType, ChannelHyperparameters, Column, DataSpec, DepVarType, Frame, HolidayEvent, Hyperparameters, MmmData,
    ParamRange,
};
use crate::error::FeatureError;

/// Region code of the sample calendar.
pub const SAMPLE_REGION: &str = "US";

/// Label of the monthly sample event.
pub const SAMPLE_HOLIDAY: &str = "test_holiday";

const FACEBOOK_VMAX: f64 = 2.0e6;
const FACEBOOK_KM: f64 = 4_000.0;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub mmm_data: MmmData,
    pub holidays: Vec<HolidayEvent>,
    pub hyperparameters: Hyperparameters,
}

/// First and last (inclusive) Monday of the sample.
pub fn sample_range() -> Result<(NaiveDate, NaiveDate), FeatureError> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 6);
    let end = NaiveDate::from_ymd_opt(2022, 12, 26);
    start
        .zip(end)
        .ok_or_else(|| FeatureError::data("Invalid sample date range."))
}

pub fn generate_sample(seed: u64) -> Result<SampleData, FeatureError> {
    let (start, end) = sample_range()?;
    let dates: Vec<NaiveDate> = std::iter::successors(Some(start), |d| Some(*d + Duration::weeks(1)))
        .take_while(|d| *d <= end)
        .collect();
    let holidays = sample_holidays(start, end);

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = |sd: f64| {
        Normal::new(0.0, sd).map_err(|e| FeatureError::data(format!("Noise distribution error: {e}")))
    };
    let unit = noise(1.0)?;
    let revenue_noise = noise(2_500.0)?;
    let exposure_noise = noise(0.03)?;

    let n = dates.len();
    let mut revenue = Vec::with_capacity(n);
    let mut tv = Vec::with_capacity(n);
    let mut facebook = Vec::with_capacity(n);
    let mut facebook_impressions = Vec::with_capacity(n);
    let mut context = Vec::with_capacity(n);
    let mut newsletter = Vec::with_capacity(n);

    for (i, date) in dates.iter().enumerate() {
        // TV runs in flights: roughly one week in four is dark.
        let tv_spend = if rng.gen_bool(0.25) {
            0.0
        } else {
            (6_000.0 + 2_000.0 * unit.sample(&mut rng)).max(0.0)
        };
        let fb_spend = (3_000.0 + 900.0 * unit.sample(&mut rng)).max(0.0);
        let fb_impressions =
            (FACEBOOK_VMAX * fb_spend / (FACEBOOK_KM + fb_spend) * (1.0 + exposure_noise.sample(&mut rng))).max(0.0);
        let letters = (20_000.0 + 5_000.0 * unit.sample(&mut rng)).max(0.0);
        let ctx = unit.sample(&mut rng);

        let doy = f64::from(date.ordinal());
        let season = 8_000.0 * (2.0 * std::f64::consts::PI * doy / 365.25).sin();
        let trend = 100_000.0 + 150.0 * i as f64;
        let week_end = *date + Duration::weeks(1);
        let event = if holidays
            .iter()
            .any(|h| h.country == SAMPLE_REGION && h.ds >= *date && h.ds < week_end)
        {
            5_000.0
        } else {
            0.0
        };
        let media = 1.5 * tv_spend + 2.0 * fb_spend + 0.3 * letters + 1_000.0 * ctx;
        let y = (trend + season + event + media + revenue_noise.sample(&mut rng)).max(0.0);

        revenue.push(y);
        tv.push(tv_spend);
        facebook.push(fb_spend);
        facebook_impressions.push(fb_impressions);
        context.push(ctx);
        newsletter.push(letters);
    }

    let frame = Frame::new(vec![
        Column::dates("DATE", dates),
        Column::numeric("revenue", revenue),
        Column::numeric("tv_S", tv),
        Column::numeric("facebook_S", facebook),
        Column::numeric("facebook_I", facebook_impressions),
        Column::numeric("custom_context", context),
        Column::numeric("newsletter", newsletter),
    ])?;

    Ok(SampleData {
        mmm_data: MmmData::new(frame, sample_spec()),
        holidays,
        hyperparameters: sample_hyperparameters()?,
    })
}

pub fn sample_spec() -> DataSpec {
    DataSpec {
        dep_var: "revenue".to_string(),
        dep_var_type: DepVarType::Revenue,
        date_var: "DATE".to_string(),
        context_vars: vec!["custom_context".to_string()],
        paid_media_spends: vec!["tv_S".to_string(), "facebook_S".to_string()],
        paid_media_vars: vec!["tv_S".to_string(), "facebook_I".to_string()],
        organic_vars: vec!["newsletter".to_string()],
        window_start: NaiveDate::from_ymd_opt(2020, 7, 6),
        window_end: NaiveDate::from_ymd_opt(2022, 6, 27),
    }
}

/// One event on the first of every month, plus a few events for another
/// region that must be filtered out.
pub fn sample_holidays(start: NaiveDate, end: NaiveDate) -> Vec<HolidayEvent> {
    let mut events = Vec::new();
    for year in start.year()..=end.year() {
        for month in 1..=12 {
            if let Some(ds) = NaiveDate::from_ymd_opt(year, month, 1) {
                events.push(HolidayEvent::new(ds, SAMPLE_HOLIDAY, SAMPLE_REGION));
            }
        }
        if let Some(ds) = NaiveDate::from_ymd_opt(year, 10, 3) {
            events.push(HolidayEvent::new(ds, "Tag der Deutschen Einheit", "DE"));
        }
    }
    events
}

pub fn sample_hyperparameters() -> Result<Hyperparameters, FeatureError> {
    let mut channels = BTreeMap::new();
    for (name, theta_hi) in [("tv_S", 0.8), ("facebook_S", 0.3), ("newsletter", 0.4)] {
        channels.insert(
            name.to_string(),
            ChannelHyperparameters::geometric(
                ParamRange::new(0.5, 3.0)?,
                ParamRange::new(0.3, 1.0)?,
                ParamRange::new(0.0, theta_hi)?,
            ),
        );
    }
    Ok(Hyperparameters {
        channels,
        adstock: AdstockType::Geometric,
        lambda: ParamRange::new(0.0, 1.0)?,
        train_size: ParamRange::new(0.5, 0.8)?,
    })
}
