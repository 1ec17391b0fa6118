//! # Leaderboard Aggregator
//!
//! Groups token holder records by token, ranks each group and renders the
//! fixed-width report. Pure: no I/O, same input and options give the same
//! text.
//!
//! ## Ordering
//!
//! - Groups: most holders first, then token name ascending, then token id.
//! - Holders: balance descending, compared as arbitrary-precision integers.
//!   Equal balances keep their input order.

use num_bigint::BigUint;
use std::collections::HashMap;

use crate::config::LeaderboardConfig;
use crate::model::TokenHolder;

const SEPARATOR_WIDTH: usize = 112;

/// All holders of one token, ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderGroup {
    pub token_id: String,
    pub token_name: String,
    pub holders: Vec<TokenHolder>,
}

impl HolderGroup {
    pub fn total(&self) -> usize {
        self.holders.len()
    }

    pub fn top(&self, k: usize) -> &[TokenHolder] {
        &self.holders[..k.min(self.holders.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardOptions {
    pub top_holders: usize,
    pub decimals: u32,
}

impl From<&LeaderboardConfig> for LeaderboardOptions {
    fn from(config: &LeaderboardConfig) -> Self {
        Self {
            top_holders: config.top_holders,
            decimals: config.decimals,
        }
    }
}

/// Partitions `holders` by token and orders groups and members.
pub fn aggregate(holders: &[TokenHolder]) -> Vec<HolderGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<HolderGroup> = Vec::new();

    for holder in holders {
        let slot = *index.entry(holder.token_id.as_str()).or_insert_with(|| {
            groups.push(HolderGroup {
                token_id: holder.token_id.clone(),
                token_name: holder.token_name.clone(),
                holders: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].holders.push(holder.clone());
    }

    for group in &mut groups {
        group.holders.sort_by(|a, b| b.balance.cmp(&a.balance));
    }
    groups.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then_with(|| a.token_name.cmp(&b.token_name))
            .then_with(|| a.token_id.cmp(&b.token_id))
    });
    groups
}

/// Renders the report lines for already aggregated groups.
pub fn render(groups: &[HolderGroup], options: LeaderboardOptions) -> Vec<String> {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = Vec::new();

    for (i, group) in groups.iter().enumerate() {
        let top = group.top(options.top_holders);
        lines.push(format!(
            "\nToken {}/{}: Top {} out of {} holders",
            i + 1,
            groups.len(),
            top.len(),
            with_thousands(&group.total().to_string())
        ));
        lines.push(format!("Token ID: {} Name: {}", group.token_id, group.token_name));
        lines.push(separator.clone());
        lines.push(format!("{:<4} | {:<62} | {:<30}", "Rank", "Address", "Balance"));
        lines.push(separator.clone());
        for (rank, holder) in top.iter().enumerate() {
            lines.push(format!(
                "{:<4} | {:<62} | {:>40}",
                rank + 1,
                holder.address,
                format_balance(&holder.balance, options.decimals)
            ));
        }
        lines.push(separator.clone());
    }
    lines
}

/// Aggregates and renders in one go; the lines joined with `\n`.
pub fn build_report(holders: &[TokenHolder], options: LeaderboardOptions) -> String {
    render(&aggregate(holders), options).join("\n")
}

/// `raw / 10^decimals` with comma thousands separators and exactly
/// `decimals` fractional digits. Exact, no float rounding.
pub fn format_balance(raw: &BigUint, decimals: u32) -> String {
    if decimals == 0 {
        return with_thousands(&raw.to_string());
    }
    let scale = BigUint::from(10u32).pow(decimals);
    let whole = raw / &scale;
    let fraction = raw % &scale;
    format!(
        "{}.{:0>width$}",
        with_thousands(&whole.to_string()),
        fraction.to_string(),
        width = decimals as usize
    )
}

fn with_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
