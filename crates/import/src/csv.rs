//! Delimited trial-balance reader.
//!
//! Columns are located by header keyword, so exports from different ledger
//! packages load without a per-package profile. Rows whose amount cannot be
//! read are skipped and reported with their line number.

use std::io::Read;

use bilancio_core::InputRecord;
use bilancio_shared::ImportConfig;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::amount::parse_amount;
use crate::error::ImportError;
use crate::{ImportBatch, SkippedRow};

const DESCRIPTION_HEADERS: &[&str] = &["descr", "intestaz"];
const CODE_HEADERS: &[&str] = &["codice", "conto", "code"];
const AMOUNT_HEADERS: &[&str] = &["saldo", "importo", "valore", "amount"];
const DEBIT_HEADERS: &[&str] = &["dare", "debit"];
const CREDIT_HEADERS: &[&str] = &["avere", "credit"];

/// CSV reader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Amounts use the Italian decimal comma.
    pub decimal_comma: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal_comma: true,
        }
    }
}

impl From<&ImportConfig> for CsvOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            delimiter: u8::try_from(config.csv_delimiter)
                .ok()
                .filter(u8::is_ascii)
                .unwrap_or(b';'),
            decimal_comma: config.decimal_comma,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AmountColumns {
    Balance(usize),
    DebitCredit { debit: usize, credit: usize },
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    code: Option<usize>,
    description: Option<usize>,
    amount: AmountColumns,
}

impl Columns {
    /// Assigns each header to the first role whose keywords it contains.
    /// Description keywords are checked first so that "Descrizione conto"
    /// is not taken for the code column, and dare/avere keywords before the
    /// balance ones so that "Importo Dare" and "Importo Avere" form a pair.
    /// A dare/avere pair wins over a balance column.
    fn detect(headers: &StringRecord) -> Result<Self, ImportError> {
        let mut code = None;
        let mut description = None;
        let mut balance = None;
        let mut debit = None;
        let mut credit = None;

        for (index, header) in headers.iter().enumerate() {
            let header = header.to_lowercase();
            let slot = if contains_any(&header, DESCRIPTION_HEADERS) {
                &mut description
            } else if contains_any(&header, CODE_HEADERS) {
                &mut code
            } else if contains_any(&header, DEBIT_HEADERS) {
                &mut debit
            } else if contains_any(&header, CREDIT_HEADERS) {
                &mut credit
            } else if contains_any(&header, AMOUNT_HEADERS) {
                &mut balance
            } else {
                continue;
            };
            slot.get_or_insert(index);
        }

        let amount = match (balance, debit, credit) {
            (_, Some(debit), Some(credit)) => AmountColumns::DebitCredit { debit, credit },
            (Some(column), _, _) => AmountColumns::Balance(column),
            _ => return Err(ImportError::MissingColumn("amount")),
        };
        if code.is_none() && description.is_none() {
            return Err(ImportError::MissingColumn("code or description"));
        }

        Ok(Self {
            code,
            description,
            amount,
        })
    }

    fn code<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        self.code
            .and_then(|column| row.get(column))
            .filter(|code| !code.is_empty())
    }

    fn description<'r>(&self, row: &'r StringRecord) -> &'r str {
        self.description
            .and_then(|column| row.get(column))
            .unwrap_or_default()
    }

    fn amount(&self, row: &StringRecord, decimal_comma: bool) -> Result<Decimal, String> {
        match self.amount {
            AmountColumns::Balance(column) => {
                optional_amount(row, column, decimal_comma)?.ok_or_else(|| "missing amount".into())
            }
            AmountColumns::DebitCredit { debit, credit } => {
                match (
                    optional_amount(row, debit, decimal_comma)?,
                    optional_amount(row, credit, decimal_comma)?,
                ) {
                    (None, None) => Err("missing amount".into()),
                    (debit, credit) => debit
                        .unwrap_or_default()
                        .checked_sub(credit.unwrap_or_default())
                        .ok_or_else(|| "amount out of range".into()),
                }
            }
        }
    }
}

fn contains_any(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| header.contains(keyword))
}

fn optional_amount(
    row: &StringRecord,
    column: usize,
    decimal_comma: bool,
) -> Result<Option<Decimal>, String> {
    let field = row.get(column).unwrap_or_default();
    if field.is_empty() {
        return Ok(None);
    }
    parse_amount(field, decimal_comma)
        .map(Some)
        .ok_or_else(|| format!("non-numeric amount '{field}'"))
}

/// Reads a delimited trial balance with a header row.
///
/// # Errors
///
/// Returns [`ImportError::MissingColumn`] when no amount column (or dare and
/// avere pair) can be found, [`ImportError::NoRecords`] when no row yields a
/// record, and [`ImportError::Csv`] for malformed input.
pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<ImportBatch, ImportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::detect(reader.headers()?)?;
    debug!(?columns, "Detected CSV columns");

    let mut batch = ImportBatch::default();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map_or(0, csv::Position::line);

        match columns.amount(&row, options.decimal_comma) {
            Ok(amount) => batch.records.push(InputRecord::new(
                columns.code(&row),
                columns.description(&row),
                amount,
            )),
            Err(reason) => {
                warn!(line, reason = %reason, "Skipping CSV row");
                batch.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if batch.records.is_empty() {
        return Err(ImportError::NoRecords);
    }
    debug!(
        records = batch.records.len(),
        skipped = batch.skipped.len(),
        "CSV read complete"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn read(input: &str) -> Result<ImportBatch, ImportError> {
        read_csv(input.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn test_reads_italian_export() {
        let batch = read(
            "Codice;Descrizione conto;Saldo\n\
             1-6-10;Fabbricati;1.250.000,00\n\
             2.9.1;Fondo ammortamento fabbricati;(125.000,00)\n\
             2/13/1;Capitale sociale;50.000,00 A\n",
        )
        .unwrap();

        assert!(batch.skipped.is_empty());
        assert_eq!(
            batch.records,
            vec![
                InputRecord::new(Some("1-6-10"), "Fabbricati", dec!(1250000.00)),
                InputRecord::new(Some("2.9.1"), "Fondo ammortamento fabbricati", dec!(-125000.00)),
                InputRecord::new(Some("2/13/1"), "Capitale sociale", dec!(-50000.00)),
            ]
        );
    }

    #[test]
    fn test_bad_rows_are_skipped_with_line_numbers() {
        let batch = read(
            "conto;descrizione;importo\n\
             1.1;Cassa;100\n\
             1.2;Banca;\n\
             1.3;Posta;n/d\n\
             1.4;Assegni;5,5\n",
        )
        .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1].amount, dec!(5.5));
        assert_eq!(
            batch.skipped,
            vec![
                SkippedRow {
                    line: 3,
                    reason: "missing amount".to_string()
                },
                SkippedRow {
                    line: 4,
                    reason: "non-numeric amount 'n/d'".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_dare_avere_columns() {
        let batch = read(
            "Conto;Descrizione;Dare;Avere\n\
             1.1;Cassa;1.000,00;\n\
             2.2;Fornitori;;300,00\n\
             1.3;Clienti;500,00;200,00\n",
        )
        .unwrap();

        let amounts: Vec<_> = batch.records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![dec!(1000), dec!(-300), dec!(300)]);
    }

    #[rstest]
    #[case("Codice;Descrizione;Importo Dare;Importo Avere")]
    #[case("Codice;Descrizione;Saldo Dare;Saldo Avere")]
    #[case("Codice;Descrizione;Saldo;Dare;Avere")]
    fn test_dare_avere_pair_wins_over_balance_keywords(#[case] header: &str) {
        let rows = if header.ends_with(";Saldo;Dare;Avere") {
            "1.1;Cassa;999;100,00;\n2.1;Fornitori;999;;80,00\n3.1;Clienti;999;50,00;20,00\n"
        } else {
            "1.1;Cassa;100,00;\n2.1;Fornitori;;80,00\n3.1;Clienti;50,00;20,00\n"
        };
        let batch = read(&format!("{header}\n{rows}")).unwrap();

        assert!(batch.skipped.is_empty());
        let amounts: Vec<_> = batch
            .records
            .iter()
            .map(|r| (r.code.as_deref().unwrap_or_default(), r.amount))
            .collect();
        assert_eq!(
            amounts,
            vec![("1.1", dec!(100)), ("2.1", dec!(-80)), ("3.1", dec!(30))]
        );
    }

    #[test]
    fn test_dare_avere_overflow_is_skipped() {
        let max = Decimal::MAX.to_string();
        let batch = read(&format!(
            "Conto;Descrizione;Dare;Avere\n1.1;Cassa;10;\n2.1;Anomalia;{max};-{max}\n"
        ))
        .unwrap();

        assert_eq!(batch.records.len(), 1);
        assert_eq!(
            batch.skipped,
            vec![SkippedRow {
                line: 3,
                reason: "amount out of range".to_string()
            }]
        );
    }

    #[test]
    fn test_comma_delimited_with_dot_decimals() {
        let options = CsvOptions {
            delimiter: b',',
            decimal_comma: false,
        };
        let batch = read_csv(
            "code,description,amount\nA10,Cash,\"1,234.50\"\n".as_bytes(),
            &options,
        )
        .unwrap();
        assert_eq!(batch.records[0].amount, dec!(1234.50));
        assert_eq!(batch.records[0].code.as_deref(), Some("A10"));
    }

    #[test]
    fn test_description_only_file() {
        let batch = read("Descrizione;Valore\nCassa;10\n").unwrap();
        assert_eq!(batch.records[0].code, None);
        assert_eq!(batch.records[0].description, "Cassa");
    }

    #[test]
    fn test_missing_amount_column() {
        let result = read("codice;descrizione\n1.1;Cassa\n");
        assert!(matches!(result, Err(ImportError::MissingColumn("amount"))));
    }

    #[test]
    fn test_no_valid_rows() {
        let result = read("codice;descrizione;saldo\n1.1;Cassa;abc\n");
        assert!(matches!(result, Err(ImportError::NoRecords)));
    }

    #[test]
    fn test_options_from_config() {
        let options = CsvOptions::from(&ImportConfig {
            csv_delimiter: '\t',
            decimal_comma: false,
        });
        assert_eq!(options.delimiter, b'\t');
        assert!(!options.decimal_comma);

        let fallback = CsvOptions::from(&ImportConfig {
            csv_delimiter: '§',
            decimal_comma: true,
        });
        assert_eq!(fallback.delimiter, b';');
    }
}
