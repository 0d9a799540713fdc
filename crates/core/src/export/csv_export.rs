//! Writes accounts and the portfolio aggregate as CSV files.
//!
//! One file per table, named `<asset>-<exchange>-<table>.csv`
//! (`portfolio-aggregate.csv` for the aggregate), so a snapshot of a
//! three-account portfolio is a flat directory of small spreadsheets.

use std::path::{Path, PathBuf};

use log::info;

use crate::accounts::Account;
use crate::errors::{ExportError, Result};
use crate::portfolio::Portfolio;
use crate::series::DailySeries;

pub struct SnapshotExporter {
    dir: PathBuf,
}

impl SnapshotExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes every account table plus the aggregate. Returns the paths
    /// written.
    pub fn export_portfolio(&self, portfolio: &Portfolio) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir).map_err(ExportError::Io)?;
        let mut written = Vec::new();
        for account in &portfolio.accounts {
            written.extend(self.export_account(account)?);
        }

        let path = self.dir.join("portfolio-aggregate.csv");
        let mut writer = csv::Writer::from_path(&path).map_err(ExportError::Csv)?;
        write_row(&mut writer, &["date", "usd_deposits", "coin_usd_value", "performance"])?;
        for (day, value) in portfolio.aggregate.coin_usd_value.iter() {
            write_row(
                &mut writer,
                &[
                    day.to_string(),
                    render(portfolio.aggregate.usd_deposits.value_on(day)),
                    value.to_string(),
                    render(portfolio.aggregate.performance.value_on(day)),
                ],
            )?;
        }
        writer.flush().map_err(ExportError::Io)?;
        written.push(path);

        info!("Wrote {} snapshot files to {}", written.len(), self.dir.display());
        Ok(written)
    }

    /// Writes one account's tables: ledger, fills, deposits,
    /// balance_sheet, and performance (when priced).
    pub fn export_account(&self, account: &Account) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir).map_err(ExportError::Io)?;
        let mut written = Vec::new();

        let path = self.table_path(account, "ledger");
        let mut writer = csv::Writer::from_path(&path).map_err(ExportError::Csv)?;
        write_row(
            &mut writer,
            &["id", "timestamp", "asset", "amount", "balance", "type"],
        )?;
        for entry in &account.ledger {
            write_row(
                &mut writer,
                &[
                    entry.id.clone(),
                    entry.timestamp.to_string(),
                    entry.asset.clone(),
                    entry.amount.to_string(),
                    entry.balance.to_string(),
                    entry.entry_type.to_string(),
                ],
            )?;
        }
        writer.flush().map_err(ExportError::Io)?;
        written.push(path);

        if !account.fills.is_empty() {
            let path = self.table_path(account, "fills");
            let mut writer = csv::Writer::from_path(&path).map_err(ExportError::Csv)?;
            write_row(
                &mut writer,
                &["timestamp", "side", "price", "size", "fee", "quote_volume"],
            )?;
            for fill in &account.fills {
                write_row(
                    &mut writer,
                    &[
                        fill.timestamp.to_string(),
                        fill.side.to_string(),
                        fill.price.to_string(),
                        fill.size.to_string(),
                        fill.fee.to_string(),
                        fill.quote_volume.to_string(),
                    ],
                )?;
            }
            writer.flush().map_err(ExportError::Io)?;
            written.push(path);
        }

        written.push(self.write_series(account, "deposits", "usd_deposits", &account.deposits)?);
        written.push(self.write_series(
            account,
            "balance_sheet",
            "balance",
            &account.balance_sheet,
        )?);

        if let Some(report) = &account.performance {
            let path = self.table_path(account, "performance");
            let mut writer = csv::Writer::from_path(&path).map_err(ExportError::Csv)?;
            write_row(
                &mut writer,
                &[
                    "date",
                    "usd_deposits",
                    "coin_price",
                    "coin_usd_value",
                    "performance",
                ],
            )?;
            for (day, price) in report.coin_price.iter() {
                write_row(
                    &mut writer,
                    &[
                        day.to_string(),
                        render(report.usd_deposits.value_as_of(day)),
                        price.to_string(),
                        render(report.coin_usd_value.value_on(day)),
                        render(report.performance.value_on(day)),
                    ],
                )?;
            }
            writer.flush().map_err(ExportError::Io)?;
            written.push(path);
        }

        Ok(written)
    }

    fn write_series(
        &self,
        account: &Account,
        table: &str,
        column: &str,
        series: &DailySeries,
    ) -> Result<PathBuf> {
        let path = self.table_path(account, table);
        let mut writer = csv::Writer::from_path(&path).map_err(ExportError::Csv)?;
        write_row(&mut writer, &["date", column])?;
        for (day, value) in series.iter() {
            write_row(&mut writer, &[day.to_string(), value.to_string()])?;
        }
        writer.flush().map_err(ExportError::Io)?;
        Ok(path)
    }

    fn table_path(&self, account: &Account, table: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}-{}.csv", account.asset, account.exchange, table))
    }
}

fn write_row<W, I, T>(writer: &mut csv::Writer<W>, row: I) -> Result<()>
where
    W: std::io::Write,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer.write_record(row).map_err(ExportError::Csv)?;
    Ok(())
}

/// Empty cell for days where a series is undefined.
fn render(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Account;
    use crate::portfolio::{aggregate_portfolio, PerformanceReport};
    use chrono::NaiveDate;
    use coinfolio_exchange::ExchangeId;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
    }

    fn priced_account() -> Account {
        let deposits: DailySeries = [(d(1), dec!(100))].into_iter().collect();
        let prices: DailySeries = [(d(1), dec!(200))].into_iter().collect();
        let value: DailySeries = [(d(1), dec!(200))].into_iter().collect();
        let performance: DailySeries = [(d(1), dec!(2))].into_iter().collect();
        Account {
            asset: "RNDR".to_string(),
            exchange: ExchangeId::Kucoin,
            ledger: Vec::new(),
            fills: Vec::new(),
            deposits: deposits.clone(),
            balance_sheet: [(d(1), dec!(1))].into_iter().collect(),
            performance: Some(PerformanceReport {
                usd_deposits: deposits,
                coin_price: prices,
                coin_usd_value: value,
                performance,
            }),
        }
    }

    #[test]
    fn test_account_export_writes_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(dir.path());

        let written = exporter.export_account(&priced_account()).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names.contains(&"RNDR-KUCOIN-ledger.csv".to_string()));
        assert!(names.contains(&"RNDR-KUCOIN-deposits.csv".to_string()));
        assert!(names.contains(&"RNDR-KUCOIN-balance_sheet.csv".to_string()));
        assert!(names.contains(&"RNDR-KUCOIN-performance.csv".to_string()));
    }

    #[test]
    fn test_performance_table_contents() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(dir.path());
        exporter.export_account(&priced_account()).unwrap();

        let text =
            std::fs::read_to_string(dir.path().join("RNDR-KUCOIN-performance.csv")).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,usd_deposits,coin_price,coin_usd_value,performance"
        );
        assert_eq!(lines.next().unwrap(), "2021-11-01,100,200,200,2");
    }

    #[test]
    fn test_portfolio_export_includes_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(dir.path());
        let portfolio = aggregate_portfolio(vec![priced_account()]);

        let written = exporter.export_portfolio(&portfolio).unwrap();

        assert!(written
            .iter()
            .any(|p| p.ends_with("portfolio-aggregate.csv")));
        let text = std::fs::read_to_string(dir.path().join("portfolio-aggregate.csv")).unwrap();
        assert!(text.contains("2021-11-01,100,200,2"));
    }
}
