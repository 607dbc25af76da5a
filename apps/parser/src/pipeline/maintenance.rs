//! One-off repair of stored location columns that still carry `NULL` fragments.

use serde::Serialize;
use tracing::{info, warn};

use crate::extraction::catalogue::Catalogue;
use crate::extraction::fields::FieldValue;
use crate::extraction::location::strip_null_tokens;
use crate::records::{RecordStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFix {
    pub userid: i64,
    pub column: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationFixReport {
    pub columns_scanned: usize,
    pub entries_checked: usize,
    pub fixes: Vec<LocationFix>,
}

/// Rewrites every location value whose cleaned form differs, e.g.
/// `"Toronto, NULL"` → `"Toronto"`. A value that is nothing but `NULL`
/// fragments is stored as the absent token. Idempotent.
pub async fn fix_location_entries(
    store: &dyn RecordStore,
    catalogue: &Catalogue,
) -> Result<LocationFixReport, StoreError> {
    let mut report = LocationFixReport::default();

    for column in catalogue.location_columns() {
        report.columns_scanned += 1;
        let entries = store.column_values(column).await?;
        report.entries_checked += entries.len();

        for (userid, before) in entries {
            let cleaned = FieldValue::from_raw(&strip_null_tokens(&before));
            let after = cleaned.as_persisted();
            if after == before {
                continue;
            }
            store.update_column(userid, column, &cleaned).await?;
            info!("Fixed {column} for user {userid}: '{before}' -> '{after}'");
            report.fixes.push(LocationFix {
                userid,
                column: column.to_string(),
                after: after.to_string(),
                before,
            });
        }
    }

    if report.fixes.is_empty() {
        info!("No location entries needed fixing");
    } else {
        warn!(
            "Fixed {} location entries across {} columns",
            report.fixes.len(),
            report.columns_scanned
        );
    }
    Ok(report)
}
