//! Contact list export.

use crate::error::{Result, StoreError};
use leadscan_core::normalize::{is_valid_phone, normalize_phone};
use leadscan_core::types::LEAD_COLUMNS;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Header of the exported contacts file.
pub const CONTACT_COLUMN: &str = "Contact";

/// Write every distinct 10-digit contact number in `leads_path` to
/// `out_path` as a single `Contact` column, prefixed with `country_code`.
///
/// Rows whose number does not normalize to exactly 10 digits are dropped.
/// Returns the number of contacts written. `out_path` is overwritten.
pub fn export_contacts(leads_path: &Path, out_path: &Path, country_code: &str) -> Result<usize> {
    if !leads_path.exists() {
        return Err(StoreError::MissingInput {
            path: leads_path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(leads_path)?;
    let contact_col = LEAD_COLUMNS[5];
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == contact_col)
        .ok_or_else(|| StoreError::MissingColumn {
            path: leads_path.display().to_string(),
            column: contact_col.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut contacts = Vec::new();
    for row in reader.records() {
        let row = row?;
        let phone = normalize_phone(row.get(idx).unwrap_or_default());
        if is_valid_phone(&phone) && seen.insert(phone.clone()) {
            contacts.push(phone);
        }
    }

    if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut writer = csv::Writer::from_path(out_path)?;
    writer.write_record([CONTACT_COLUMN])?;
    for phone in &contacts {
        writer.write_record([format!("{country_code}{phone}")])?;
    }
    writer.flush()?;

    info!(
        count = contacts.len(),
        "wrote contacts to {}",
        out_path.display()
    );
    Ok(contacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_normalizes_and_dedups() {
        let tmp = TempDir::new().expect("create temp dir");
        let leads = tmp.path().join("leads.csv");
        let out = tmp.path().join("out").join("contacts.csv");
        fs::write(
            &leads,
            "Name,Category,Address,Location,Pincode,Contact_Number\n\
             A,Bakery,N/A,N/A,576101,9876543210\n\
             B,Bakery,N/A,N/A,576101,Not Found\n\
             C,Bakery,N/A,N/A,576101,+91 99887 76655\n\
             D,Bakery,N/A,N/A,576101,12345\n\
             E,Bakery,N/A,N/A,576101,098765 43210\n",
        )
        .expect("write leads");

        let count = export_contacts(&leads, &out, "+91").expect("export");
        assert_eq!(count, 2);

        let contents = fs::read_to_string(&out).expect("read contacts");
        assert_eq!(contents, "Contact\n+919876543210\n+919988776655\n");
    }

    #[test]
    fn test_missing_leads_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let err = export_contacts(
            &tmp.path().join("absent.csv"),
            &tmp.path().join("contacts.csv"),
            "+91",
        )
        .expect_err("missing input");
        assert!(matches!(err, StoreError::MissingInput { .. }));
    }

    #[test]
    fn test_missing_contact_column() {
        let tmp = TempDir::new().expect("create temp dir");
        let leads = tmp.path().join("leads.csv");
        fs::write(&leads, "Name,Phone\nA,9876543210\n").expect("write leads");

        let err = export_contacts(&leads, &tmp.path().join("contacts.csv"), "+91")
            .expect_err("missing column");
        assert!(matches!(err, StoreError::MissingColumn { .. }));
    }
}
