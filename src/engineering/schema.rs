//! Role → column resolution.
//!
//! Every name in the data specification is looked up once against the raw
//! dataset's column index. A missing name is a typed `MissingColumn` error
//! carrying the role it was declared under.

use crate::domain::{ColumnRole, DataSpec, RawDataset};
use crate::error::FeatureError;

/// A declared column that exists in the raw dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub role: ColumnRole,
}

/// All declared columns, resolved, in canonical frame order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    date: ResolvedColumn,
    dep_var: ResolvedColumn,
    covariates: Vec<ResolvedColumn>,
}

impl Schema {
    pub fn date(&self) -> &ResolvedColumn {
        &self.date
    }

    pub fn dep_var(&self) -> &ResolvedColumn {
        &self.dep_var
    }

    /// Context, paid spend, distinct paid exposure and organic columns.
    pub fn covariates(&self) -> &[ResolvedColumn] {
        &self.covariates
    }
}

/// Resolve every declared name against `data`.
pub fn resolve_schema(data: &RawDataset, spec: &DataSpec) -> Result<Schema, FeatureError> {
    let mut resolved = Vec::new();
    for (name, role) in spec.declared_columns() {
        if !data.has_column(name) {
            return Err(FeatureError::MissingColumn {
                column: name.to_string(),
                role,
            });
        }
        resolved.push(ResolvedColumn {
            name: name.to_string(),
            role,
        });
    }

    let mut iter = resolved.into_iter();
    let (Some(date), Some(dep_var)) = (iter.next(), iter.next()) else {
        return Err(FeatureError::spec("Data spec must declare a date and a dependent variable."));
    };
    Ok(Schema {
        date,
        dep_var,
        covariates: iter.collect(),
    })
}
