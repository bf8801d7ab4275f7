//! Boundary validation: raw backend trades in, well-formed `Trade`s out.
//!
//! The report aggregator assumes every trade it sees is well formed. This is
//! the only place malformed records are detected: missing fields, negative or
//! non-finite volume, non-finite price/profit, unknown direction, unparseable
//! timestamp.
//! Order is preserved; rejected records are dropped and reported.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Direction, RawTrade, Trade};

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Absent, null or of the wrong JSON type.
    MissingField(String),
    NegativeVolume(f64),
    NonFiniteVolume,
    NonFinitePrice,
    NonFiniteProfit,
    UnknownDirection(String),
    BadTimestamp(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingField(name) => write!(f, "missing or invalid field '{name}'"),
            RejectReason::NegativeVolume(v) => write!(f, "negative volume {v}"),
            RejectReason::NonFiniteVolume => f.write_str("volume is not a finite number"),
            RejectReason::NonFinitePrice => f.write_str("open price is not a finite number"),
            RejectReason::NonFiniteProfit => f.write_str("profit is not a finite number"),
            RejectReason::UnknownDirection(d) => write!(f, "unknown direction '{d}'"),
            RejectReason::BadTimestamp(t) => write!(f, "unparseable timestamp '{t}'"),
        }
    }
}

/// A rejected record: its position in the batch and its ticket, if it had one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub index: usize,
    pub ticket: Option<i64>,
    pub reason: RejectReason,
}

impl Rejection {
    /// `ticket 42`, or `record #3` when the ticket itself was missing.
    pub fn label(&self) -> String {
        match self.ticket {
            Some(ticket) => format!("ticket {ticket}"),
            None => format!("record #{}", self.index),
        }
    }
}

/// Strict ingestion failed because at least one record was malformed.
#[derive(Debug, Error)]
#[error("{} of {total} trade record(s) rejected{}", .rejections.len(), first_rejection(.rejections))]
pub struct IngestError {
    pub total: usize,
    pub rejections: Vec<Rejection>,
}

fn first_rejection(rejections: &[Rejection]) -> String {
    rejections
        .first()
        .map(|r| format!(" (first: {}: {})", r.label(), r.reason))
        .unwrap_or_default()
}

/// Result of validating a batch.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub trades: Vec<Trade>,
    pub rejected: Vec<Rejection>,
}

impl IngestOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Fail if any record was rejected; otherwise hand back the trades.
    pub fn into_strict(self) -> Result<Vec<Trade>, IngestError> {
        if self.rejected.is_empty() {
            Ok(self.trades)
        } else {
            Err(IngestError {
                total: self.trades.len() + self.rejected.len(),
                rejections: self.rejected,
            })
        }
    }
}

/// Validate a batch of backend trades, preserving input order.
pub fn ingest_trades(raw: &[RawTrade]) -> IngestOutcome {
    let mut outcome = IngestOutcome {
        trades: Vec::with_capacity(raw.len()),
        rejected: Vec::new(),
    };

    for (index, record) in raw.iter().enumerate() {
        match validate(record) {
            Ok(trade) => outcome.trades.push(trade),
            Err(reason) => {
                tracing::warn!(index, ticket = ?record.ticket, %reason, "rejecting trade record");
                outcome.rejected.push(Rejection {
                    index,
                    ticket: record.ticket,
                    reason,
                });
            }
        }
    }

    if !outcome.rejected.is_empty() {
        tracing::info!(
            accepted = outcome.trades.len(),
            rejected = outcome.rejected.len(),
            "ingestion finished with rejections"
        );
    }

    outcome
}

fn required<T: Clone>(value: &Option<T>, name: &str) -> Result<T, RejectReason> {
    value
        .clone()
        .ok_or_else(|| RejectReason::MissingField(name.to_string()))
}

fn validate(raw: &RawTrade) -> Result<Trade, RejectReason> {
    let ticket = required(&raw.ticket, "ticket")?;
    let symbol = required(&raw.symbol, "symbol")?;
    if symbol.trim().is_empty() {
        return Err(RejectReason::MissingField("symbol".into()));
    }
    let kind = required(&raw.kind, "type")?;
    let volume = required(&raw.volume, "volume")?;
    let price_open = required(&raw.price_open, "price_open")?;
    let profit = required(&raw.profit, "profit")?;
    let time = required(&raw.time, "time")?;

    if !volume.is_finite() {
        return Err(RejectReason::NonFiniteVolume);
    }
    if volume < 0.0 {
        return Err(RejectReason::NegativeVolume(volume));
    }
    if !price_open.is_finite() {
        return Err(RejectReason::NonFinitePrice);
    }
    if !profit.is_finite() {
        return Err(RejectReason::NonFiniteProfit);
    }
    let direction = Direction::parse(&kind).ok_or(RejectReason::UnknownDirection(kind))?;
    let time = parse_timestamp(&time).ok_or(RejectReason::BadTimestamp(time))?;

    Ok(Trade {
        ticket,
        symbol: symbol.trim().to_string(),
        direction,
        volume,
        price_open,
        profit,
        time,
    })
}

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (space separator also accepted), which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn raw(ticket: i64, kind: &str, volume: f64, profit: f64, time: &str) -> RawTrade {
        RawTrade::new(ticket, "EURUSD", kind, volume, 1.1, profit, time)
    }

    #[test]
    fn parses_naive_and_offset_timestamps() {
        let naive = parse_timestamp("2024-01-05T10:15:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 1, 5, 10, 15, 0).unwrap());

        let frac = parse_timestamp("2024-01-05 10:15:00.250").unwrap();
        assert_eq!(frac.nanosecond(), 250_000_000);

        let offset = parse_timestamp("2024-01-05T12:15:00+02:00").unwrap();
        assert_eq!(offset, naive);

        let zulu = parse_timestamp("2024-01-05T10:15:00.000Z").unwrap();
        assert_eq!(zulu, naive);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn accepts_well_formed_batch_in_order() {
        let batch = vec![
            raw(1, "BUY", 0.1, 10.0, "2024-01-05T10:00:00"),
            raw(2, "sell", 0.2, -5.0, "2024-01-05T11:00:00"),
        ];
        let outcome = ingest_trades(&batch);
        assert!(outcome.is_clean());
        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.trades[0].ticket, 1);
        assert_eq!(outcome.trades[1].direction, Direction::Sell);
    }

    #[test]
    fn rejects_malformed_records() {
        let batch = vec![
            raw(1, "BUY", -0.1, 1.0, "2024-01-05T10:00:00"),
            raw(2, "HOLD", 0.1, 1.0, "2024-01-05T10:00:00"),
            raw(3, "BUY", 0.1, f64::NAN, "2024-01-05T10:00:00"),
            raw(4, "BUY", 0.1, 1.0, "not a date"),
            raw(5, "BUY", 0.1, 1.0, "2024-01-05T10:00:00"),
        ];
        let outcome = ingest_trades(&batch);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].ticket, 5);
        assert_eq!(outcome.rejected.len(), 4);
        assert_eq!(outcome.rejected[0].reason, RejectReason::NegativeVolume(-0.1));
        assert!(matches!(outcome.rejected[1].reason, RejectReason::UnknownDirection(_)));
        assert_eq!(outcome.rejected[2].reason, RejectReason::NonFiniteProfit);
        assert!(matches!(outcome.rejected[3].reason, RejectReason::BadTimestamp(_)));
        assert_eq!(outcome.rejected[3].index, 3);
    }

    #[test]
    fn missing_fields_reject_only_that_record() {
        let mut no_volume = raw(1, "BUY", 0.1, 1.0, "2024-01-05T10:00:00");
        no_volume.volume = None;
        let mut no_ticket = raw(2, "BUY", 0.1, 1.0, "2024-01-05T10:00:00");
        no_ticket.ticket = None;
        let mut blank_symbol = raw(3, "BUY", 0.1, 1.0, "2024-01-05T10:00:00");
        blank_symbol.symbol = Some("  ".into());
        let batch = vec![no_volume, no_ticket, blank_symbol, raw(4, "BUY", 0.1, 1.0, "2024-01-05T10:00:00")];

        let outcome = ingest_trades(&batch);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].ticket, 4);
        assert_eq!(outcome.rejected[0].reason, RejectReason::MissingField("volume".into()));
        assert_eq!(outcome.rejected[1].ticket, None);
        assert_eq!(outcome.rejected[1].label(), "record #1");
        assert_eq!(outcome.rejected[2].reason, RejectReason::MissingField("symbol".into()));
    }

    #[test]
    fn zero_volume_is_allowed() {
        let outcome = ingest_trades(&[raw(1, "BUY", 0.0, 0.0, "2024-01-05T10:00:00")]);
        assert!(outcome.is_clean());
    }

    #[test]
    fn strict_mode_fails_on_any_rejection() {
        let batch = vec![
            raw(1, "BUY", 0.1, 1.0, "2024-01-05T10:00:00"),
            raw(2, "BUY", 0.1, 1.0, "garbage"),
        ];
        let err = ingest_trades(&batch).into_strict().unwrap_err();
        assert_eq!(err.total, 2);
        assert_eq!(err.rejections.len(), 1);
        assert!(err.to_string().contains("ticket 2"));
        assert_eq!(err.rejections[0].ticket, Some(2));

        let ok = ingest_trades(&batch[..1]).into_strict().unwrap();
        assert_eq!(ok.len(), 1);
    }
}
