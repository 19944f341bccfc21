//! Formatted terminal output for a feature engineering run.
//!
//! Formatting lives here so the pipeline code stays free of presentation
//! concerns and output changes stay localized.

use crate::domain::{DataSpec, Frame};
use crate::engineering::FeaturizedMmmData;
use crate::fit::ExposureFit;

/// Format the run summary: frames, cadence, window, components, exposure fits.
pub fn format_run_summary(result: &FeaturizedMmmData, spec: &DataSpec) -> String {
    let mut out = String::new();

    out.push_str("=== mmmfe - MMM Feature Engineering ===\n");
    out.push_str(&format!(
        "Dependent variable: {} ({:?})\n",
        spec.dep_var, spec.dep_var_type
    ));
    out.push_str(&format!("Interval: {}\n", result.interval.label()));
    out.push_str(&format!("dt_mod:           {}\n", frame_shape(&result.dt_mod)));
    out.push_str(&format!("dt_mod_roll_wind: {}\n", frame_shape(&result.dt_mod_roll_wind)));
    out.push_str(&format!(
        "Window: {} .. {} (rows {}..={}, n={})\n",
        result.window.start,
        result.window.end,
        result.window.start_index,
        result.window.end_index,
        result.window.length
    ));

    if result.components.is_empty() {
        out.push_str("Decomposition: disabled\n");
    } else {
        let names: Vec<&str> = result.components.iter().map(|c| c.as_str()).collect();
        out.push_str(&format!("Decomposition: {}\n", names.join(", ")));
    }

    out.push_str(&format!("Columns: {}\n", result.dt_mod.column_names().join(", ")));

    if !result.exposure_fits.is_empty() {
        out.push('\n');
        out.push_str(&format_exposure_fits(&result.exposure_fits));
    }

    out
}

/// Format the spend → exposure fits as a table.
pub fn format_exposure_fits(fits: &[ExposureFit]) -> String {
    let mut out = String::new();
    out.push_str("Spend -> exposure fits:\n");
    out.push_str(
        format!(
            "{:<16} {:<16} {:<18} {:>8} {:>8} {:>14}\n",
            "spend", "exposure", "selected", "r2_lin", "r2_mm", "km"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<16} {:-<18} {:-<8} {:-<8} {:-<14}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for fit in fits {
        let (mm_rsq, km) = match &fit.michaelis_menten {
            Some(mm) => (
                format!("{:.4}", mm.rsq),
                mm.km.map(|k| format!("{k:.2}")).unwrap_or_default(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(
            format!(
                "{:<16} {:<16} {:<18} {:>8.4} {:>8} {:>14}\n",
                truncate(&fit.spend_var, 16),
                truncate(&fit.exposure_var, 16),
                fit.selected.display_name(),
                fit.linear.rsq,
                mm_rsq,
                km
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn frame_shape(frame: &Frame) -> String {
    let dates = frame.dates(crate::domain::DATE_KEY).unwrap_or_default();
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => format!(
            "{} rows x {} cols, {first} .. {last}",
            frame.n_rows(),
            frame.n_cols()
        ),
        _ => format!("{} rows x {} cols", frame.n_rows(), frame.n_cols()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_sample;
    use crate::engineering::FeatureEngineering;

    #[test]
    fn summary_mentions_window_and_fits() {
        let sample = generate_sample(3).unwrap();
        let result = FeatureEngineering::new(&sample.mmm_data, &sample.hyperparameters, None)
            .unwrap()
            .perform_feature_engineering()
            .unwrap();

        let text = format_run_summary(&result, sample.mmm_data.spec());
        assert!(text.contains("Interval: weekly"));
        assert!(text.contains("Decomposition: disabled"));
        assert!(text.contains("Window: 2020-07-06 .. 2022-06-27"));
        assert!(text.contains("facebook_I"));
        assert_eq!(result.exposure_fits.len(), 1);
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("newsletter", 16), "newsletter");
        assert_eq!(truncate("a_very_long_channel_name", 8), "a_very_.");
    }
}
