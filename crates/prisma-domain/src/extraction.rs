//! Extraction rows - per-study numeric data for meta-analysis
//!
//! Values are either a number or explicitly absent. Raw form input is
//! parsed at this boundary and anything that is not an acceptable number
//! is rejected; nothing is coerced to zero.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column of an extraction row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionField {
    /// Intervention arm sample size
    NIntervention,
    /// Intervention arm mean
    MeanIntervention,
    /// Intervention arm standard deviation
    SdIntervention,
    /// Control arm sample size
    NControl,
    /// Control arm mean
    MeanControl,
    /// Control arm standard deviation
    SdControl,
}

impl ExtractionField {
    /// Field name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionField::NIntervention => "n_intervention",
            ExtractionField::MeanIntervention => "mean_intervention",
            ExtractionField::SdIntervention => "sd_intervention",
            ExtractionField::NControl => "n_control",
            ExtractionField::MeanControl => "mean_control",
            ExtractionField::SdControl => "sd_control",
        }
    }
}

impl fmt::Display for ExtractionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric extraction data for one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRow {
    /// Intervention arm sample size
    pub n_intervention: Option<u32>,
    /// Intervention arm mean
    pub mean_intervention: Option<f64>,
    /// Intervention arm standard deviation
    pub sd_intervention: Option<f64>,
    /// Control arm sample size
    pub n_control: Option<u32>,
    /// Control arm mean
    pub mean_control: Option<f64>,
    /// Control arm standard deviation
    pub sd_control: Option<f64>,
}

impl ExtractionRow {
    /// Parse raw text input
    ///
    /// # Examples
    ///
    /// ```
    /// use prisma_domain::{ExtractionRow, RawExtractionRow};
    ///
    /// let raw = RawExtractionRow {
    ///     n_intervention: "120".into(),
    ///     mean_intervention: "7.1".into(),
    ///     sd_intervention: "".into(),
    ///     ..Default::default()
    /// };
    /// let row = ExtractionRow::parse(&raw).unwrap();
    /// assert_eq!(row.n_intervention, Some(120));
    /// assert_eq!(row.sd_intervention, None);
    ///
    /// let bad = RawExtractionRow { mean_control: "n/a".into(), ..Default::default() };
    /// assert!(ExtractionRow::parse(&bad).is_err());
    /// ```
    pub fn parse(raw: &RawExtractionRow) -> Result<Self, DomainError> {
        let row = Self {
            n_intervention: parse_count(ExtractionField::NIntervention, &raw.n_intervention)?,
            mean_intervention: parse_real(ExtractionField::MeanIntervention, &raw.mean_intervention)?,
            sd_intervention: parse_real(ExtractionField::SdIntervention, &raw.sd_intervention)?,
            n_control: parse_count(ExtractionField::NControl, &raw.n_control)?,
            mean_control: parse_real(ExtractionField::MeanControl, &raw.mean_control)?,
            sd_control: parse_real(ExtractionField::SdControl, &raw.sd_control)?,
        };
        row.validate()?;
        Ok(row)
    }

    /// Check values that arrived already typed
    ///
    /// Means must be finite; standard deviations finite and non-negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        let reals = [
            (ExtractionField::MeanIntervention, self.mean_intervention, false),
            (ExtractionField::SdIntervention, self.sd_intervention, true),
            (ExtractionField::MeanControl, self.mean_control, false),
            (ExtractionField::SdControl, self.sd_control, true),
        ];

        for (field, value, non_negative) in reals {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(invalid(field, &value.to_string(), "not a finite number"));
            }
            if non_negative && value < 0.0 {
                return Err(invalid(field, &value.to_string(), "must not be negative"));
            }
        }
        Ok(())
    }

    /// All six values present
    pub fn is_complete(&self) -> bool {
        self.n_intervention.is_some()
            && self.mean_intervention.is_some()
            && self.sd_intervention.is_some()
            && self.n_control.is_some()
            && self.mean_control.is_some()
            && self.sd_control.is_some()
    }
}

/// Extraction values as typed into a form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtractionRow {
    /// Intervention arm sample size
    pub n_intervention: String,
    /// Intervention arm mean
    pub mean_intervention: String,
    /// Intervention arm standard deviation
    pub sd_intervention: String,
    /// Control arm sample size
    pub n_control: String,
    /// Control arm mean
    pub mean_control: String,
    /// Control arm standard deviation
    pub sd_control: String,
}

fn invalid(field: ExtractionField, value: &str, reason: &str) -> DomainError {
    DomainError::InvalidExtractionValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_real(field: ExtractionField, raw: &str) -> Result<Option<f64>, DomainError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| invalid(field, raw, "not a number"))?;
    if !value.is_finite() {
        return Err(invalid(field, raw, "not a finite number"));
    }
    Ok(Some(value))
}

fn parse_count(field: ExtractionField, raw: &str) -> Result<Option<u32>, DomainError> {
    let Some(value) = parse_real(field, raw)? else {
        return Ok(None);
    };
    if value < 0.0 {
        return Err(invalid(field, raw, "sample size must not be negative"));
    }
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(invalid(field, raw, "sample size must be a whole number"));
    }
    Ok(Some(value as u32))
}
