//! Account transaction history: console lines and the JSON export.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::DateTime;
use std::{fs, path::Path};
use tracing::info;

use crate::core::api::ApiTransaction;
use crate::error::Result;

/// `NNNN. YYYY-MM-DD HH:MM:SS Hash: h Value:v Data:d`, timestamps in UTC.
pub fn format_line(counter: usize, tx: &ApiTransaction) -> String {
    let when = DateTime::from_timestamp(tx.timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("@{}", tx.timestamp));
    format!(
        "{:04}. {} Hash: {} Value:{} Data:{}",
        counter,
        when,
        tx.tx_hash,
        tx.value,
        decode_data(tx.data.as_deref())
    )
}

/// Numbered lines for a whole history, starting at 1.
pub fn render(transactions: &[ApiTransaction]) -> Vec<String> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| format_line(i + 1, tx))
        .collect()
}

/// The API ships `data` base64-encoded; show it as text when it is text.
fn decode_data(data: Option<&str>) -> String {
    match data {
        None => String::new(),
        Some(encoded) => match BASE64.decode(encoded) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| encoded.to_string()),
            Err(_) => encoded.to_string(),
        },
    }
}

pub fn save(path: &Path, transactions: &[ApiTransaction]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(transactions)?)?;
    info!("💾 Transactions saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, timestamp: i64, data: Option<&str>) -> ApiTransaction {
        ApiTransaction {
            tx_hash: hash.into(),
            timestamp,
            value: "0".into(),
            data: data.map(str::to_string),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn line_layout() {
        let line = format_line(7, &tx("ab12", 1_700_000_000, Some("aGVsbG8=")));
        assert_eq!(line, "0007. 2023-11-14 22:13:20 Hash: ab12 Value:0 Data:hello");
    }

    #[test]
    fn missing_or_binary_data() {
        assert!(format_line(1, &tx("h", 0, None)).ends_with("Data:"));
        assert!(format_line(1, &tx("h", 0, Some("//79"))).ends_with("Data://79"));
    }

    #[test]
    fn numbering_starts_at_one() {
        let lines = render(&[tx("a", 0, None), tx("b", 0, None)]);
        assert!(lines[0].starts_with("0001. 1970-01-01 00:00:00 Hash: a"));
        assert!(lines[1].starts_with("0002."));
    }

    #[test]
    fn save_writes_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        save(&path, &[tx("a", 1, None)]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let back: Vec<ApiTransaction> = serde_json::from_str(&written).unwrap();
        assert_eq!(back[0].tx_hash, "a");
    }
}
