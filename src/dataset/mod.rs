//! Procurement dataset loading.
//!
//! This module reads the input CSV, checks that the required columns are
//! present and turns every row into a [`Record`]. It also renders the short
//! dataset description that is sent to the answer provider as context.

use crate::errors::InsightError;
use crate::models::Record;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A loaded dataset: the parsed records plus the original header row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    /// Raw rows, kept for the context preview.
    rows: Vec<StringRecord>,
}

/// Column positions of the required fields within a row.
struct ColumnIndex {
    supplier: usize,
    item_category: usize,
    quantity: usize,
    unit_price: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self, InsightError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| InsightError::Data(format!("missing required column '{}'", name)))
        };

        Ok(Self {
            supplier: find("Supplier")?,
            item_category: find("Item_Category")?,
            quantity: find("Quantity")?,
            unit_price: find("Unit_Price")?,
        })
    }
}

/// Load and validate the dataset at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, InsightError> {
    info!("Loading dataset from {}", path.display());

    let file = std::fs::File::open(path).map_err(|e| {
        InsightError::Data(format!("cannot open dataset {}: {}", path.display(), e))
    })?;

    let dataset = load_dataset_from_reader(file)?;
    info!(
        "Loaded {} records ({} columns)",
        dataset.records.len(),
        dataset.headers.len()
    );

    Ok(dataset)
}

/// Load and validate a dataset from any CSV source.
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset, InsightError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| InsightError::Data(format!("cannot read header row: {}", e)))?
        .iter()
        // Spreadsheet exports often start with a UTF-8 BOM.
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    debug!("CSV headers: {:?}", headers);

    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let row = result.map_err(|e| InsightError::Data(format!("line {}: {}", line, e)))?;

        records.push(Record {
            supplier: cell(&row, columns.supplier).to_string(),
            item_category: cell(&row, columns.item_category).to_string(),
            quantity: parse_number(&row, columns.quantity, "Quantity", line)?,
            unit_price: parse_number(&row, columns.unit_price, "Unit_Price", line)?,
        });
        rows.push(row);
    }

    if records.is_empty() {
        return Err(InsightError::Data("dataset has no data rows".to_string()));
    }

    Ok(Dataset {
        headers,
        records,
        rows,
    })
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn parse_number(
    row: &StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> Result<f64, InsightError> {
    let raw = cell(row, idx);
    raw.parse::<f64>().map_err(|_| {
        InsightError::Data(format!(
            "line {}: column '{}' is not a number: '{}'",
            line, column, raw
        ))
    })
}

impl Dataset {
    /// Describe the dataset for the answer provider: columns, row count and
    /// the first `sample_rows` rows as CSV.
    pub fn context(&self, sample_rows: usize) -> String {
        let mut context = String::new();

        context.push_str(&format!("Columns: {}\n", self.headers.join(", ")));
        context.push_str(&format!("Rows: {}\n", self.records.len()));

        if sample_rows > 0 {
            let shown = sample_rows.min(self.rows.len());
            context.push_str(&format!("First {} rows:\n", shown));
            context.push_str(&self.headers.join(","));
            context.push('\n');
            for row in self.rows.iter().take(shown) {
                context.push_str(&row.iter().collect::<Vec<_>>().join(","));
                context.push('\n');
            }
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
PO_ID,Supplier,Item_Category,Quantity,Unit_Price
PO-1,SupplierA,CatX,2,10.0
PO-2,SupplierB,CatX,1,20.0
PO-3,SupplierA,CatY,1,5.0
";

    #[test]
    fn test_load_sample() {
        let dataset = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.headers.len(), 5);
        assert_eq!(dataset.records[0].supplier, "SupplierA");
        assert_eq!(dataset.records[2].item_category, "CatY");
        assert_eq!(dataset.records[1].unit_price, 20.0);
    }

    #[test]
    fn test_missing_column() {
        let csv = "Supplier,Item_Category,Quantity\nA,X,1\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, InsightError::Data(_)));
        assert!(err.to_string().contains("Unit_Price"));
    }

    #[test]
    fn test_non_numeric_quantity() {
        let csv = "Supplier,Item_Category,Quantity,Unit_Price\nA,X,1,2.0\nB,Y,lots,3.0\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("line 3"));
        assert!(message.contains("Quantity"));
    }

    #[test]
    fn test_ragged_row_is_data_error() {
        let csv = "Supplier,Item_Category,Quantity,Unit_Price\nA,X,1,2.0\nB,Y,3\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, InsightError::Data(_)));
        let message = err.to_string();
        assert!(message.starts_with("Data error: line 3: "));
        assert!(!message.contains("CSV error"));
    }

    #[test]
    fn test_invalid_utf8_header_is_data_error() {
        let bytes: &[u8] = b"Supplier,Item_\xFF\xFE,Quantity,Unit_Price
A,X,1,2.0
";
        let err = load_dataset_from_reader(bytes).unwrap_err();
        assert!(matches!(err, InsightError::Data(_)));
    }

    #[test]
    fn test_header_only_is_empty() {
        let csv = "Supplier,Item_Category,Quantity,Unit_Price\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InsightError::Data(_)));
    }

    #[test]
    fn test_bom_header() {
        let csv = "\u{feff}Supplier,Item_Category,Quantity,Unit_Price\nA,X,1,2.0\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.headers[0], "Supplier");
    }

    #[test]
    fn test_context_preview() {
        let dataset = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();
        let context = dataset.context(2);

        assert!(
            context.contains("Columns: PO_ID, Supplier, Item_Category, Quantity, Unit_Price")
        );
        assert!(context.contains("Rows: 3"));
        assert!(context.contains("PO-2,SupplierB,CatX,1,20.0"));
        assert!(!context.contains("PO-3"));
    }

    #[test]
    fn test_load_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/procurement_sample.csv");
        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.records.len(), 8);
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, InsightError::Data(_)));
    }
}
