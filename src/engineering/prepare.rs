//! Canonical working frame.
//!
//! Turns the raw dataset into a frame with:
//! - `ds`: parsed dates, ascending, no duplicates
//! - `dep_var`: copy of the dependent variable (the original column is kept too)
//! - every declared covariate under its original name
//!
//! Nothing is windowed here; the frame covers the full input date range.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Column, ColumnData, ColumnRole, DATE_KEY, DEP_VAR_KEY, Frame, RawDataset};
use crate::engineering::schema::Schema;
use crate::error::FeatureError;
use crate::io::parse_date;

/// Build the canonical frame from a resolved schema.
pub fn prepare_frame(data: &RawDataset, schema: &Schema) -> Result<Frame, FeatureError> {
    let date_name = &schema.date().name;
    let date_column = data.column(date_name).ok_or_else(|| FeatureError::MissingColumn {
        column: date_name.clone(),
        role: ColumnRole::Date,
    })?;
    let dates = parse_dates(date_name, &date_column.data)?;

    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| dates[i]);
    for w in order.windows(2) {
        if dates[w[0]] == dates[w[1]] {
            return Err(FeatureError::DuplicateDate { date: dates[w[0]] });
        }
    }
    let sorted_dates: Vec<NaiveDate> = order.iter().map(|&i| dates[i]).collect();
    let sorted = data.take(&order);

    let mut frame = Frame::default();
    frame.push_column(Column::dates(DATE_KEY, sorted_dates))?;

    let dep = &schema.dep_var().name;
    let dep_values = numeric_values(&sorted, dep, ColumnRole::DependentVariable)?;
    frame.push_column(Column::numeric(DEP_VAR_KEY, dep_values.to_vec()))?;
    if dep != DEP_VAR_KEY {
        frame.push_column(Column::numeric(dep.clone(), dep_values.to_vec()))?;
    }

    for covariate in schema.covariates() {
        let column = match covariate.role {
            ColumnRole::Context => sorted
                .column(&covariate.name)
                .cloned()
                .ok_or_else(|| FeatureError::MissingColumn {
                    column: covariate.name.clone(),
                    role: covariate.role,
                })?,
            role => {
                let values = numeric_values(&sorted, &covariate.name, role)?;
                if let Some(v) = values.iter().find(|v| **v < 0.0) {
                    return Err(FeatureError::data(format!(
                        "{role} `{}` contains negative values (e.g. {v}).",
                        covariate.name
                    )));
                }
                Column::numeric(covariate.name.clone(), values.to_vec())
            }
        };
        frame.push_column(column)?;
    }

    debug!(rows = frame.n_rows(), cols = frame.n_cols(), "prepared canonical frame");
    Ok(frame)
}

fn parse_dates(name: &str, data: &ColumnData) -> Result<Vec<NaiveDate>, FeatureError> {
    match data {
        ColumnData::Date(values) => Ok(values.clone()),
        ColumnData::Text(values) => values
            .iter()
            .map(|s| {
                parse_date(s.trim())
                    .map_err(|e| FeatureError::data(format!("Date column `{name}`: {e}")))
            })
            .collect(),
        ColumnData::Numeric(_) => Err(FeatureError::data(format!(
            "Date column `{name}` must hold dates or date strings, found numbers."
        ))),
    }
}

fn numeric_values<'a>(frame: &'a Frame, name: &str, role: ColumnRole) -> Result<&'a [f64], FeatureError> {
    let column = frame.column(name).ok_or_else(|| FeatureError::MissingColumn {
        column: name.to_string(),
        role,
    })?;
    let values = column.as_numeric().ok_or_else(|| {
        FeatureError::data(format!(
            "{role} `{name}` must be numeric, found {}.",
            column.data.type_name()
        ))
    })?;
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(FeatureError::data(format!(
            "{role} `{name}` has a missing or non-finite value at row {}.",
            i + 1
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSpec, DepVarType};
    use crate::engineering::schema::resolve_schema;

    fn spec() -> DataSpec {
        DataSpec {
            dep_var: "revenue".to_string(),
            dep_var_type: DepVarType::Revenue,
            date_var: "DATE".to_string(),
            context_vars: vec!["promo".to_string()],
            paid_media_spends: vec!["tv_S".to_string()],
            paid_media_vars: vec![],
            organic_vars: vec![],
            window_start: None,
            window_end: None,
        }
    }

    fn raw(dates: &[&str], tv: Vec<f64>) -> Frame {
        let n = dates.len();
        Frame::new(vec![
            Column::text("DATE", dates.iter().map(|s| s.to_string()).collect()),
            Column::numeric("revenue", (0..n).map(|i| 100.0 + i as f64).collect()),
            Column::numeric("tv_S", tv),
            Column::text("promo", (0..n).map(|i| format!("p{i}")).collect()),
            Column::numeric("unused", vec![0.0; n]),
        ])
        .unwrap()
    }

    #[test]
    fn sorts_by_date_and_keeps_rows_aligned() {
        let data = raw(&["2020-01-13", "2020-01-06", "2020-01-20"], vec![2.0, 1.0, 3.0]);
        let schema = resolve_schema(&data, &spec()).unwrap();
        let frame = prepare_frame(&data, &schema).unwrap();

        assert_eq!(frame.column_names(), vec!["ds", "dep_var", "revenue", "promo", "tv_S"]);
        let ds = frame.dates(DATE_KEY).unwrap();
        assert!(ds.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frame.numeric("tv_S").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(frame.numeric("dep_var").unwrap(), &[101.0, 100.0, 102.0]);
        assert_eq!(frame.numeric("dep_var"), frame.numeric("revenue"));
        assert!(!frame.has_column("unused"));
        assert!(!frame.has_column("DATE"));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let data = raw(&["2020-01-06", "2020-01-13", "2020-01-06"], vec![1.0, 2.0, 3.0]);
        let schema = resolve_schema(&data, &spec()).unwrap();
        let err = prepare_frame(&data, &schema).unwrap_err();
        assert_eq!(
            err,
            FeatureError::DuplicateDate {
                date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap()
            }
        );
    }

    #[test]
    fn negative_media_and_bad_dates_are_invalid_data() {
        let data = raw(&["2020-01-06", "2020-01-13"], vec![1.0, -2.0]);
        let schema = resolve_schema(&data, &spec()).unwrap();
        assert!(matches!(prepare_frame(&data, &schema), Err(FeatureError::InvalidData(_))));

        let data = raw(&["2020-01-06", "not a date"], vec![1.0, 2.0]);
        let schema = resolve_schema(&data, &spec()).unwrap();
        assert!(matches!(prepare_frame(&data, &schema), Err(FeatureError::InvalidData(_))));
    }
}
