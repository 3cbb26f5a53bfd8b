use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Raw manual-entry form state: everything optional until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryDraft {
    pub time: Option<NaiveDateTime>,
    pub quantity: Option<f64>,
    pub pump: Option<String>,
    pub revenue: Option<f64>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// A manual entry that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    pub time: NaiveDateTime,
    pub quantity: f64,
    pub pump: String,
    pub revenue: f64,
    pub unit_price: f64,
}

/// The form's auto-fill rule: revenue is quantity × unit price, rounded to
/// the nearest đồng.
pub fn expected_revenue(quantity: f64, unit_price: f64) -> f64 {
    (quantity * unit_price).round()
}

fn check_positive_number(
    value: Option<f64>,
    field: &'static str,
    required_msg: &'static str,
    numeric_msg: &'static str,
    positive_msg: &'static str,
    errors: &mut Vec<EntryFieldError>,
) -> Option<f64> {
    match value {
        None => {
            errors.push(EntryFieldError {
                field,
                message: required_msg,
            });
            None
        }
        Some(v) if !v.is_finite() => {
            errors.push(EntryFieldError {
                field,
                message: numeric_msg,
            });
            None
        }
        Some(v) if v <= 0.0 => {
            errors.push(EntryFieldError {
                field,
                message: positive_msg,
            });
            None
        }
        Some(v) => Some(v),
    }
}

/// Validate a draft, collecting every field problem instead of stopping at
/// the first. Messages are the ones the form shows.
pub fn validate_entry(draft: &EntryDraft) -> Result<ManualEntry, Vec<EntryFieldError>> {
    let mut errors = Vec::new();

    let time = draft.time;
    if time.is_none() {
        errors.push(EntryFieldError {
            field: "time",
            message: "Thời gian là bắt buộc",
        });
    }

    let quantity = check_positive_number(
        draft.quantity,
        "quantity",
        "Số lượng là bắt buộc",
        "Số lượng phải là số",
        "Số lượng phải lớn hơn 0",
        &mut errors,
    );

    let pump = draft
        .pump
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if pump.is_none() {
        errors.push(EntryFieldError {
            field: "pump",
            message: "Trụ là bắt buộc",
        });
    }

    let revenue = check_positive_number(
        draft.revenue,
        "revenue",
        "Doanh thu là bắt buộc",
        "Doanh thu phải là số",
        "Doanh thu phải lớn hơn 0",
        &mut errors,
    );

    let unit_price = check_positive_number(
        draft.unit_price,
        "unitPrice",
        "Đơn giá là bắt buộc",
        "Đơn giá phải là số",
        "Đơn giá phải lớn hơn 0",
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }
    // All None cases were reported above.
    match (time, quantity, pump, revenue, unit_price) {
        (Some(time), Some(quantity), Some(pump), Some(revenue), Some(unit_price)) => {
            Ok(ManualEntry {
                time,
                quantity,
                pump: pump.to_string(),
                revenue,
                unit_price,
            })
        }
        _ => Err(errors),
    }
}
