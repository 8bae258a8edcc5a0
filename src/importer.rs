use std::path::Path;

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::error::{Result, SpendError};
use crate::models::{Transaction, TransactionType};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money cell: `$1,234.56`, `"50.00"`, `(12.00)` for negatives.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<Decimal>().ok().map(|d| -d);
    }
    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Accepts ISO dates (optionally followed by a time), and US `MM/DD/YYYY`.
pub fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    if let Ok(d) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(d);
    }
    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(y, m, d)
}

pub fn excel_serial_to_date(serial: f64) -> Option<chrono::NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::TimeDelta::try_days(serial.trunc() as i64)?)
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    kind: usize,
}

impl Columns {
    fn locate(headers: &[String], file: &Path) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| SpendError::MissingColumn {
                    column: names[0].to_string(),
                    file: file.display().to_string(),
                })
        };
        Ok(Self {
            date: find(&["Date"])?,
            description: find(&["Description"])?,
            amount: find(&["Amount"])?,
            kind: find(&["Transaction Type", "Type"])?,
        })
    }
}

/// One row as text, with the date column already normalized.
fn build_transaction(cells: &[String], cols: &Columns, line: usize) -> Option<Transaction> {
    let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

    let Some(date) = parse_date(cell(cols.date)) else {
        warn!("row {line}: unreadable date '{}', skipped", cell(cols.date));
        return None;
    };
    let Some(amount) = parse_amount(cell(cols.amount)) else {
        warn!("row {line}: unreadable amount '{}', skipped", cell(cols.amount));
        return None;
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        warn!("row {line}: negative amount {amount}, skipped");
        return None;
    }
    let Some(transaction_type) = TransactionType::parse(cell(cols.kind)) else {
        warn!("row {line}: unknown transaction type '{}', skipped", cell(cols.kind));
        return None;
    };

    Some(Transaction {
        date,
        description: cell(cols.description).trim().to_string(),
        amount,
        transaction_type,
    })
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetKind {
    Csv,
    #[cfg(feature = "xlsx")]
    Workbook,
}

impl SheetKind {
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Workbook),
            #[cfg(not(feature = "xlsx"))]
            "xlsx" | "xlsm" | "xls" | "ods" => Err(SpendError::UnknownFormat(format!(
                "{} (spreadsheet support requires the 'xlsx' feature)",
                path.display()
            ))),
            _ => Err(SpendError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn parse(&self, path: &Path) -> Result<Vec<Transaction>> {
        match self {
            Self::Csv => parse_csv(path),
            #[cfg(feature = "xlsx")]
            Self::Workbook => parse_workbook(path),
        }
    }
}

fn parse_csv(path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let cols = Columns::locate(&headers, path)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("row {line}: {e}, skipped");
                continue;
            }
        };
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if let Some(txn) = build_transaction(&cells, &cols, line) {
            rows.push(txn);
        }
    }
    Ok(rows)
}

#[cfg(feature = "xlsx")]
fn parse_workbook(path: &Path) -> Result<Vec<Transaction>> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| SpendError::Workbook(format!("Failed to open {}: {e}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SpendError::Workbook(format!("{} has no worksheets", path.display())))?
        .map_err(|e| SpendError::Workbook(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();
    let cols = Columns::locate(&headers, path)?;

    let mut rows = Vec::new();
    for (i, row) in sheet_rows.enumerate() {
        let line = i + 2;
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, c)| match c {
                Data::Float(f) if col == cols.date => excel_serial_to_date(*f)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                Data::Int(n) if col == cols.date => excel_serial_to_date(*n as f64)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect();
        if let Some(txn) = build_transaction(&cells, &cols, line) {
            rows.push(txn);
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// load_transactions
// ---------------------------------------------------------------------------

/// Load the transaction table. A missing file yields an empty table;
/// rows that cannot be read are skipped with a warning.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    if !path.exists() {
        warn!("transaction file {} not found, using an empty table", path.display());
        return Ok(Vec::new());
    }
    let kind = SheetKind::for_path(path)?;
    debug!("reading {} as {kind:?}", path.display());
    let rows = kind.parse(path)?;
    info!("loaded {} transactions from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("$50.00"), Some(Decimal::new(5000, 2)));
        assert_eq!(parse_amount("(12.00)"), Some(Decimal::new(-1200, 2)));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 15);
        assert_eq!(parse_date("2024-09-15"), expected);
        assert_eq!(parse_date("2024-09-15 00:00:00"), expected);
        assert_eq!(parse_date("09/15/2024"), expected);
        assert_eq!(parse_date("13/01/2024"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(1e300), None);
        assert_eq!(excel_serial_to_date(-1e18), None);
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "txns.csv",
            "Date,Description,Amount,Transaction Type\n\
             2024-09-01,Salary,3000.00,Credit\n\
             09/02/2024,\"STARBUCKS #4521\",\"1,005.50\",Debit\n",
        );
        let rows = load_transactions(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transaction_type, TransactionType::Credit);
        assert_eq!(rows[1].description, "STARBUCKS #4521");
        assert_eq!(rows[1].amount, Decimal::new(100550, 2));
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
    }

    #[test]
    fn test_columns_found_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "txns.csv",
            "transaction type,amount,description,date\nDebit,12.00,Uber,2024-09-03\n",
        );
        let rows = load_transactions(&path).unwrap();
        assert_eq!(rows[0].description, "Uber");
    }

    #[test]
    fn test_bad_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "txns.csv",
            "Date,Description,Amount,Transaction Type\n\
             not-a-date,Broken,10.00,Debit\n\
             2024-09-01,Refund,-5.00,Credit\n\
             2024-09-01,Mystery,5.00,Transfer\n\
             ,,,\n\
             2024-09-02,Rent,1200,Debit\n",
        );
        let rows = load_transactions(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Rent");
    }

    #[test]
    fn test_missing_column_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "txns.csv", "Date,Description,Amount\n2024-09-01,x,1\n");
        let err = load_transactions(&path).unwrap_err();
        assert!(matches!(err, SpendError::MissingColumn { ref column, .. } if column == "Transaction Type"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rows = load_transactions(&dir.path().join("nope.xlsx")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "txns.txt", "whatever");
        assert!(matches!(
            load_transactions(&path),
            Err(SpendError::UnknownFormat(_))
        ));
    }
}
