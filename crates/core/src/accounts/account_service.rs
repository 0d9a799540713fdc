//! One-account orchestration: fetch, normalize, derive.

use chrono::NaiveDateTime;
use log::{info, warn};

use coinfolio_exchange::{AccountRef, ExchangeConnector, FetchOutcome};

use crate::errors::Result;
use crate::ledger::LedgerNormalizer;
use crate::portfolio::{
    balance_sheet, compute_performance, daily_open_prices, extract_deposits, DepositPolicy,
};
use super::{Account, AccountBuild, FetchIssue};

/// Candle granularity for the price series.
const DAILY_CANDLE_SECS: u32 = 86_400;

/// Assets treated as cash: no USD pair to price them against.
const CASH_ASSETS: &[&str] = &["USD", "USDT", "USDC"];

/// Builds [`Account`]s from an [`ExchangeConnector`].
#[derive(Default)]
pub struct AccountService {
    normalizer: LedgerNormalizer,
}

impl AccountService {
    pub fn new() -> Self {
        Self {
            normalizer: LedgerNormalizer::new(),
        }
    }

    /// Reconstructs one account over `[start, end]`.
    ///
    /// A ledger fetch that fails before producing any records is an
    /// error; a fetch that fails partway through still builds the
    /// account from what arrived, with the failed window recorded in
    /// `fetch_issues`. An account with no activity at all comes back
    /// with empty series and no issues.
    ///
    /// `policy` overrides the deposit source; `None` picks the
    /// exchange's default (or the cash-account ledger policy).
    pub async fn build_account(
        &self,
        connector: &dyn ExchangeConnector,
        account_ref: &AccountRef,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: Option<DepositPolicy>,
    ) -> Result<AccountBuild> {
        let asset = account_ref.asset.as_str();
        let span_end = end.date();
        let mut fetch_issues = Vec::new();

        let FetchOutcome {
            records: ledger_records,
            failure: ledger_failure,
        } = connector.fetch_ledger(account_ref, start, end).await;
        if let Some(failure) = ledger_failure {
            if ledger_records.is_empty() {
                return Err(failure.error.into());
            }
            warn!(
                "Ledger fetch for {} on {} incomplete from {}: {}",
                asset,
                connector.id(),
                failure.window.start,
                failure.error
            );
            fetch_issues.push(FetchIssue::from_failure("ledger", &failure));
        }

        if ledger_records.is_empty() {
            info!("No {} activity on {} in range", asset, connector.id());
            return Ok(AccountBuild {
                account: Account::empty(asset, connector.id()),
                fetch_issues,
            });
        }

        let ledger = self.normalizer.normalize_ledger(&ledger_records, asset)?;
        let balances = balance_sheet(&ledger, span_end);

        if CASH_ASSETS.contains(&asset) {
            let policy = policy.unwrap_or_else(DepositPolicy::for_usd_account);
            let deposits = extract_deposits(&policy, &ledger, &[], span_end);
            return Ok(AccountBuild {
                account: Account {
                    asset: asset.to_string(),
                    exchange: connector.id(),
                    ledger,
                    fills: Vec::new(),
                    deposits,
                    balance_sheet: balances,
                    performance: None,
                },
                fetch_issues,
            });
        }

        let fills_outcome = connector.fetch_fills(asset, start, end).await;
        if let Some(failure) = &fills_outcome.failure {
            warn!(
                "Fill fetch for {} on {} incomplete: {}",
                asset,
                connector.id(),
                failure.error
            );
            fetch_issues.push(FetchIssue::from_failure("fills", failure));
        }
        let fills = self.normalizer.normalize_fills(&fills_outcome.records)?;

        let policy = policy.unwrap_or_else(|| DepositPolicy::default_for(connector.id()));
        let deposits = extract_deposits(&policy, &ledger, &fills, span_end);

        let pair = connector.usd_pair(asset);
        let candles_outcome = connector
            .fetch_candles(&pair, start, end, DAILY_CANDLE_SECS)
            .await;
        if let Some(failure) = &candles_outcome.failure {
            warn!("Candle fetch for {} incomplete: {}", pair, failure.error);
            fetch_issues.push(FetchIssue::from_failure("candles", failure));
        }
        let prices = daily_open_prices(&candles_outcome.records);

        let performance = if prices.is_empty() {
            warn!("No price series for {}; skipping performance", pair);
            None
        } else {
            Some(compute_performance(&balances, &deposits, &prices))
        };

        Ok(AccountBuild {
            account: Account {
                asset: asset.to_string(),
                exchange: connector.id(),
                ledger,
                fills,
                deposits,
                balance_sheet: balances,
                performance,
            },
            fetch_issues,
        })
    }
}
