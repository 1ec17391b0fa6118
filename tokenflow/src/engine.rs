//! # Workflow Engine - The Brain of the Operation
//!
//! Wires the pipeline components into the five end-to-end workflows the
//! binary exposes. Each workflow walks its accounts (or tokens) one at a
//! time and treats each as an independent unit of work: a failure is logged,
//! counted in the [`WorkflowSummary`], and the loop moves on.
//!
//! ## Workflows
//!
//! 1.  **Issue:** sequencer → factory → sign → submit → confirm → extract the
//!     issued identifier from the `issue` event → write a `.token` file.
//! 2.  **Transfer:** per owned token, sign one ESDT transfer per receiver and
//!     distribute them in batches. A batch that exhausts its retries stops
//!     that token only.
//! 3.  **Claim:** one contract call per account.
//! 4.  **Transactions:** count, page through the history, print and
//!     optionally save it.
//! 5.  **Leaderboard:** cache gate → catalogue + holder fetch → aggregate →
//!     print and write the report.

use anyhow::{Context, Result};
use std::{fs, path::Path, sync::Arc};
use tracing::{error, info, warn};

use crate::{
    cache::BulkCache,
    config::Config,
    core::{
        api::{ApiClient, ApiToken, ApiTokenAccount, ApiTransaction},
        confirmation::{issued_token_identifier, ConfirmationOutcome, ConfirmationTracker},
        nonce_sequencer::NonceSequencer,
        provider::NetworkProvider,
        retry::Sleeper,
        submitter::{BatchReport, TransactionSubmitter},
    },
    fetcher::{PageSource, PaginatedFetcher},
    history, leaderboard,
    model::{Address, TokenHolder, Transaction},
    tx_builder::{scale_amount, CallArg, TransactionFactory},
    wallet::Signer,
};

const TOKEN_FILE_EXTENSION: &str = "token";

/// Units of work that succeeded and failed in one workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSummary {
    pub workflow: &'static str,
    pub ok: usize,
    pub failed: usize,
}

impl WorkflowSummary {
    fn new(workflow: &'static str) -> Self {
        Self { workflow, ok: 0, failed: 0 }
    }

    fn record(&mut self, success: bool) {
        if success {
            self.ok += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn log(&self) {
        info!("🏁 {} finished: {} ok, {} failed", self.workflow, self.ok, self.failed);
    }
}

/// The workflow driver.
pub struct Engine {
    config: Config,
    provider: Arc<dyn NetworkProvider>,
    sleeper: Arc<dyn Sleeper>,
    submitter: TransactionSubmitter,
    tracker: ConfirmationTracker,
    factory: TransactionFactory,
}

impl Engine {
    pub fn new(
        config: Config,
        provider: Arc<dyn NetworkProvider>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let submitter =
            TransactionSubmitter::new(provider.clone(), sleeper.clone(), &config.submission);
        let tracker =
            ConfirmationTracker::new(provider.clone(), sleeper.clone(), &config.confirmation);
        let factory = TransactionFactory::from_config(&config.network);
        Self {
            config,
            provider,
            sleeper,
            submitter,
            tracker,
            factory,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- Issue ---

    pub async fn issue<W: Signer>(&self, wallets: &[W]) -> WorkflowSummary {
        let mut summary = WorkflowSummary::new("issue");
        for wallet in wallets {
            info!("🪙 Creating tokens for account: {}", wallet.address());
            match self.issue_for_account(wallet).await {
                Ok(results) => {
                    for result in results {
                        summary.record(result.is_some());
                    }
                }
                Err(e) => {
                    error!("Error for address {}: {:#}", wallet.address(), e);
                    summary.record(false);
                }
            }
        }
        summary.log();
        summary
    }

    /// Issues `tokens_per_account` tokens. One entry per attempted token:
    /// the identifier on success, `None` otherwise.
    pub async fn issue_for_account(&self, signer: &dyn Signer) -> Result<Vec<Option<String>>> {
        let owner = signer.address();
        let mut sequencer = NonceSequencer::for_account(self.provider.as_ref(), owner).await?;
        let mut results = Vec::new();

        for _ in 0..self.config.token.tokens_per_account {
            let unsigned = self.factory.issue_fungible(owner, &self.config.token)?;
            let tx = TransactionSubmitter::sign(unsigned, &mut sequencer, signer)?;
            info!("📤 Sending issue transaction...");
            let hash = match self.submitter.submit(&tx).await {
                Ok(hash) => hash,
                Err(e) => {
                    error!("❌ Issue transaction for {} not sent: {}", owner, e);
                    results.push(None);
                    continue;
                }
            };
            results.push(self.process_issue_result(&hash, owner).await);
        }
        Ok(results)
    }

    async fn process_issue_result(&self, hash: &str, owner: &Address) -> Option<String> {
        match self.tracker.await_outcome(hash).await {
            ConfirmationOutcome::Successful { tx, .. } => match issued_token_identifier(&tx) {
                Some(identifier) => {
                    info!("✅ Successfully issued token {}", identifier);
                    match write_token_file(&self.config.paths.tokens_dir, &identifier, owner) {
                        Ok(()) => Some(identifier),
                        Err(e) => {
                            error!("Token {} issued but not recorded: {:#}", identifier, e);
                            None
                        }
                    }
                }
                None => {
                    warn!("⚠️ Cannot find issue event in transaction {}", hash);
                    None
                }
            },
            outcome => {
                if let Err(e) = outcome.into_result() {
                    error!("❌ Issue transaction {}: {}", hash, e);
                }
                None
            }
        }
    }

    // --- Transfer ---

    pub async fn transfer<W: Signer>(
        &self,
        wallets: &[W],
        receivers: &[Address],
    ) -> WorkflowSummary {
        let mut summary = WorkflowSummary::new("transfer");
        for wallet in wallets {
            let owner = wallet.address();
            let tokens = match find_owned_tokens(&self.config.paths.tokens_dir, owner) {
                Ok(tokens) => tokens,
                Err(e) => {
                    error!("Cannot list tokens of {}: {:#}", owner, e);
                    summary.record(false);
                    continue;
                }
            };
            if tokens.is_empty() {
                warn!("⚠️ No tokens found for {}", owner);
                continue;
            }
            info!("Found {} tokens owned by {}", tokens.len(), owner);

            let seeded = NonceSequencer::for_account(self.provider.as_ref(), owner).await;
            let mut sequencer = match seeded {
                Ok(seq) => seq,
                Err(e) => {
                    error!("Cannot read nonce of {}: {}", owner, e);
                    summary.record(false);
                    continue;
                }
            };

            for token_id in &tokens {
                let distributed = self
                    .distribute_token(wallet, &mut sequencer, token_id, receivers)
                    .await;
                let complete = matches!(&distributed, Ok(report) if report.is_complete());
                if !complete {
                    // Nonces of unsent batches are lost; start the next token from the chain.
                    match NonceSequencer::for_account(self.provider.as_ref(), owner).await {
                        Ok(seq) => sequencer = seq,
                        Err(e) => {
                            error!("Cannot re-read nonce of {}: {}", owner, e);
                            summary.record(false);
                            break;
                        }
                    }
                }
                summary.record(complete);
            }
        }
        summary.log();
        summary
    }

    /// Signs one transfer of the configured amount per receiver and sends
    /// them batch by batch.
    pub async fn distribute_token(
        &self,
        signer: &dyn Signer,
        sequencer: &mut NonceSequencer,
        token_id: &str,
        receivers: &[Address],
    ) -> Result<BatchReport> {
        let amount = scale_amount(self.config.transfer.amount, self.config.token.decimals);
        info!(
            "Transferring {} {} from {} to {} receivers...",
            self.config.transfer.amount,
            token_id,
            signer.address(),
            receivers.len()
        );

        let signed = receivers
            .iter()
            .map(|receiver| {
                let unsigned =
                    self.factory.esdt_transfer(signer.address(), receiver, token_id, &amount);
                TransactionSubmitter::sign(unsigned, &mut *sequencer, signer)
            })
            .collect::<crate::Result<Vec<Transaction>>>()?;

        let report = self.submitter.submit_all(&signed).await;
        match &report.failure {
            None => info!(
                "✅ Sent {} {} to {} receivers",
                self.config.transfer.amount, token_id, report.transactions_sent
            ),
            Some(e) => error!(
                "❌ Distribution of {} stopped after {} receivers: {}",
                token_id, report.transactions_sent, e
            ),
        }
        Ok(report)
    }

    // --- Claim ---

    pub async fn claim<W: Signer>(&self, wallets: &[W]) -> WorkflowSummary {
        let mut summary = WorkflowSummary::new("claim");
        for wallet in wallets {
            match self.claim_for_account(wallet).await {
                Ok(hash) => {
                    info!("🎁 Claim transaction sent for {}: {}", wallet.address(), hash);
                    summary.record(true);
                }
                Err(e) => {
                    error!("❌ Claim for {} failed: {:#}", wallet.address(), e);
                    summary.record(false);
                }
            }
        }
        summary.log();
        summary
    }

    pub async fn claim_for_account(&self, signer: &dyn Signer) -> Result<String> {
        let claim = &self.config.claim;
        let mut sequencer =
            NonceSequencer::for_account(self.provider.as_ref(), signer.address()).await?;
        let args = [
            CallArg::from(claim.token_id.as_str()),
            CallArg::Uint(scale_amount(claim.amount, claim.decimals)),
        ];
        let unsigned = self.factory.contract_call(
            signer.address(),
            &Address::new(claim.contract.clone()),
            &claim.function,
            &args,
            claim.gas_limit,
        );
        let tx = TransactionSubmitter::sign(unsigned, &mut sequencer, signer)?;
        Ok(self.submitter.submit(&tx).await?)
    }

    // --- Transactions ---

    pub async fn transactions<W: Signer>(
        &self,
        api: &ApiClient,
        wallets: &[W],
        save: bool,
    ) -> WorkflowSummary {
        let mut summary = WorkflowSummary::new("transactions");
        let fetcher = PaginatedFetcher::for_transactions(&self.config.fetch, self.sleeper.clone());
        let mut all = Vec::new();

        for wallet in wallets {
            let address = wallet.address();
            info!("Processing account: {}", address);
            let count = match api.transactions_count(address).await {
                Ok(count) => count,
                Err(e) => {
                    warn!("⚠️ Error fetching transaction count: {}", e);
                    0
                }
            };
            info!("Transaction count: {}", count);

            let source = api.account_transactions(address);
            let fetched = fetcher
                .fetch_all_with(&source, |n| info!("Retrieved {} / {} transactions...", n, count))
                .await;
            match fetched {
                Ok(transactions) => {
                    print_history(&transactions);
                    all.extend(transactions);
                    summary.record(true);
                }
                Err(e) => {
                    error!("❌ History of {} not fetched: {}", address, e);
                    summary.record(false);
                }
            }
        }

        if save && !all.is_empty() {
            if let Err(e) = history::save(&self.config.paths.transactions_file, &all) {
                error!("Failed to save transactions: {}", e);
            }
        }
        summary.log();
        summary
    }

    // --- Leaderboard ---

    /// Builds the holder leaderboard, prints it and writes it to the
    /// configured output file. Returns the report text.
    pub async fn leaderboard(&self, api: &ApiClient, use_cache: bool) -> Result<String> {
        let cache = BulkCache::new(&self.config.paths.holders_cache);
        let fetcher = PaginatedFetcher::for_collections(&self.config.fetch, self.sleeper.clone());
        let prefix = &self.config.leaderboard.token_prefix;

        let catalogue = api.fungible_tokens();

        let holders = load_or_fetch(&cache, use_cache, || {
            collect_holders(&fetcher, &catalogue, |id| api.token_accounts(id), prefix)
        })
        .await?;

        let report = leaderboard::build_report(&holders, (&self.config.leaderboard).into());
        println!("{report}");
        let output = &self.config.paths.leaderboard_output;
        fs::write(output, &report)
            .with_context(|| format!("Failed to write leaderboard to '{}'", output.display()))?;
        info!("📊 Leaderboard saved to: {}", output.display());
        WorkflowSummary { workflow: "leaderboard", ok: 1, failed: 0 }.log();
        Ok(report)
    }
}

/// Serves holders from the cache when allowed and present; otherwise calls
/// `fetch` and overwrites the cache with the result.
pub async fn load_or_fetch<F, Fut>(
    cache: &BulkCache,
    use_cache: bool,
    fetch: F,
) -> Result<Vec<TokenHolder>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = crate::Result<Vec<TokenHolder>>>,
{
    if use_cache && cache.exists() {
        info!("Reading token holders data from cache...");
        return Ok(cache.load()?);
    }
    info!("Reading token holders data from API...");
    let holders = fetch().await?;
    cache.save(&holders)?;
    Ok(holders)
}

/// Fetches the token catalogue, keeps tokens whose identifier starts with
/// `prefix`, and collects every holder of each.
pub async fn collect_holders<C, H, F>(
    fetcher: &PaginatedFetcher,
    catalogue: &C,
    holders_of: F,
    prefix: &str,
) -> crate::Result<Vec<TokenHolder>>
where
    C: PageSource<Item = ApiToken> + ?Sized,
    H: PageSource<Item = ApiTokenAccount>,
    F: Fn(&str) -> H,
{
    let tokens: Vec<ApiToken> = fetcher
        .fetch_all(catalogue)
        .await?
        .into_iter()
        .filter(|t| t.identifier.starts_with(prefix))
        .collect();
    info!("Found {} tokens with identifier '{}'", tokens.len(), prefix);

    let mut holders = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let accounts = fetcher.fetch_all(&holders_of(&token.identifier)).await?;
        info!(
            "{}/{} Token ID: {}, Name: {}, Ticker: {} Token holders: {}",
            i + 1,
            tokens.len(),
            token.identifier,
            token.name,
            token.ticker,
            accounts.len()
        );
        holders.extend(accounts.into_iter().map(|a| TokenHolder {
            token_id: token.identifier.clone(),
            token_name: token.name.clone(),
            address: a.address,
            balance: a.balance,
        }));
    }
    Ok(holders)
}

fn print_history(transactions: &[ApiTransaction]) {
    if transactions.is_empty() {
        println!("No transactions found");
        return;
    }
    println!("\nTransaction History:");
    println!("{}", "-".repeat(80));
    for line in history::render(transactions) {
        println!("{line}");
    }
    println!("{}", "-".repeat(80));
}

/// Records `owner` as the owner of `identifier`.
pub fn write_token_file(dir: &Path, identifier: &str, owner: &Address) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create '{}'", dir.display()))?;
    let path = dir.join(format!("{identifier}.{TOKEN_FILE_EXTENSION}"));
    fs::write(&path, owner.as_str())
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}

/// Identifiers of the `.token` files in `dir` whose content is `owner`,
/// sorted. A missing directory means no tokens.
pub fn find_owned_tokens(dir: &Path, owner: &Address) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut tokens = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list '{}'", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(TOKEN_FILE_EXTENSION) {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        if content.trim() == owner.as_str() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tokens.push(stem.to_string());
            }
        }
    }
    tokens.sort();
    Ok(tokens)
}

/// Reads up to `limit` receiver addresses, one per line. Blank lines are
/// skipped. Fewer than `limit` is logged, not an error.
pub fn read_receivers(path: &Path, limit: usize) -> Result<Vec<Address>> {
    let content =
        fs::read_to_string(path).with_context(|| {
            format!("Failed to read receivers file '{}'", path.display())
        })?;
    let receivers: Vec<Address> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(limit)
        .map(Address::from)
        .collect();
    if receivers.len() < limit {
        warn!(
            "⚠️ {} holds {} receivers, {} requested. Using the available ones.",
            path.display(),
            receivers.len(),
            limit
        );
    }
    Ok(receivers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionStatus;
    use crate::testing::{issue_result, MockPages, MockProvider, RecordingSleeper, StaticSigner};
    use num_bigint::BigUint;
    use std::cell::Cell;

    fn engine_in(dir: &Path, provider: Arc<MockProvider>) -> Engine {
        let mut config = Config::default();
        config.paths.tokens_dir = dir.join("_tokens");
        config.paths.holders_cache = dir.join("cache.json");
        config.submission.batch_size = 2;
        Engine::new(config, provider, Arc::new(RecordingSleeper::default()))
    }

    #[test]
    fn token_files_are_found_by_owner() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Address::new("erd1alice");
        write_token_file(dir.path(), "WINTER-000002", &alice).unwrap();
        write_token_file(dir.path(), "WINTER-000001", &alice).unwrap();
        write_token_file(dir.path(), "WINTER-000003", &Address::new("erd1bob")).unwrap();
        fs::write(dir.path().join("README.md"), "erd1alice").unwrap();

        let owned = find_owned_tokens(dir.path(), &alice).unwrap();
        assert_eq!(owned, vec!["WINTER-000001", "WINTER-000002"]);
        assert!(find_owned_tokens(&dir.path().join("absent"), &alice).unwrap().is_empty());
    }

    #[test]
    fn receivers_file_is_capped_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receivers.txt");
        fs::write(&path, "erd1a\n\n  erd1b  \nerd1c\n").unwrap();

        assert_eq!(
            read_receivers(&path, 2).unwrap(),
            vec![Address::new("erd1a"), Address::new("erd1b")]
        );
        assert_eq!(read_receivers(&path, 10).unwrap().len(), 3);
        assert!(read_receivers(&dir.path().join("missing.txt"), 1).is_err());
    }

    #[tokio::test]
    async fn issue_records_token_file_from_event() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let owner = Address::new("erd1owner");
        provider.set_account(&owner, 3);
        provider.push_transaction(issue_result("erd1owner:3", "WINTER-abcdef"));

        let engine = engine_in(dir.path(), provider.clone());
        let summary = engine.issue(&[StaticSigner::new(owner.clone())]).await;

        assert_eq!((summary.ok, summary.failed), (1, 0));
        let written = fs::read_to_string(dir.path().join("_tokens/WINTER-abcdef.token")).unwrap();
        assert_eq!(written, "erd1owner");
        assert_eq!(provider.sent()[0].nonce, 3);
    }

    #[tokio::test]
    async fn issue_failure_does_not_stop_next_account() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let (a, b) = (Address::new("erd1a"), Address::new("erd1b"));
        provider.set_account(&a, 0);
        provider.set_account(&b, 0);
        provider.push_status("erd1a:0", Some(TransactionStatus::Failed));
        provider.push_transaction(issue_result("erd1b:0", "WINTER-bbbbbb"));

        let engine = engine_in(dir.path(), provider);
        let summary = engine.issue(&[StaticSigner::new(a), StaticSigner::new(b.clone())]).await;

        assert_eq!((summary.ok, summary.failed), (1, 1));
        let owned = find_owned_tokens(&dir.path().join("_tokens"), &b).unwrap();
        assert_eq!(owned, vec!["WINTER-bbbbbb"]);
    }

    #[tokio::test]
    async fn transfer_batches_every_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let owner = Address::new("erd1owner");
        provider.set_account(&owner, 10);
        let engine = engine_in(dir.path(), provider.clone());
        write_token_file(&engine.config().paths.tokens_dir, "WINTER-abcdef", &owner).unwrap();
        let receivers: Vec<Address> = (0..5).map(|i| Address::new(format!("erd1r{i}"))).collect();

        let summary = engine.transfer(&[StaticSigner::new(owner)], &receivers).await;

        assert_eq!((summary.ok, summary.failed), (1, 0));
        assert_eq!(provider.batch_sizes(), vec![2, 2, 1]);
        let nonces: Vec<u64> = provider.sent().iter().map(|t| t.nonce).collect();
        assert_eq!(nonces, vec![10, 11, 12, 13, 14]);
    }

    #[tokio::test]
    async fn failed_token_distribution_resumes_next_token_from_chain_nonce() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let owner = Address::new("erd1owner");
        provider.set_account(&owner, 10);
        // First batch lands, the next one exhausts every retry.
        provider.fail_batches_after(1, 10);
        let engine = engine_in(dir.path(), provider.clone());
        let tokens_dir = engine.config().paths.tokens_dir.clone();
        write_token_file(&tokens_dir, "WINTER-000001", &owner).unwrap();
        write_token_file(&tokens_dir, "WINTER-000002", &owner).unwrap();
        let receivers: Vec<Address> = (0..3).map(|i| Address::new(format!("erd1r{i}"))).collect();

        let summary = engine.transfer(&[StaticSigner::new(owner)], &receivers).await;

        assert_eq!((summary.ok, summary.failed), (1, 1));
        assert_eq!(provider.batch_sizes(), vec![2, 2, 1]);
        let sent = provider.sent();
        let nonces: Vec<u64> = sent.iter().map(|t| t.nonce).collect();
        // Nonce 12 was signed for the failed batch, then reused after the re-read.
        assert_eq!(nonces, vec![10, 11, 12, 13, 14]);
        let second_token = hex::encode("WINTER-000002");
        let carries_second =
            |t: &Transaction| String::from_utf8_lossy(&t.data).contains(&second_token);
        assert!(sent[2..].iter().all(carries_second));
        assert!(!sent[..2].iter().any(carries_second));
    }

    #[tokio::test]
    async fn claim_calls_configured_contract() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let owner = Address::new("erd1owner");
        provider.set_account(&owner, 1);
        let engine = engine_in(dir.path(), provider.clone());

        let summary = engine.claim(&[StaticSigner::new(owner)]).await;

        assert_eq!(summary.ok, 1);
        let sent = &provider.sent()[0];
        assert_eq!(sent.receiver.as_str(), engine.config().claim.contract);
        assert!(String::from_utf8(sent.data.clone()).unwrap().starts_with("claim_tokens@"));
        assert_eq!(sent.gas_limit, 10_000_000);
    }

    #[tokio::test]
    async fn holders_are_collected_for_matching_tokens_only() {
        let policy = crate::core::retry::RetryPolicy::none();
        let fetcher = PaginatedFetcher::new(10, policy, Arc::new(RecordingSleeper::default()));
        let catalogue = MockPages::new(vec![vec![
            ApiToken {
                identifier: "WINTER-1".into(),
                name: "Winter".into(),
                ticker: "WINTER".into(),
            },
            ApiToken {
                identifier: "SNOW-1".into(),
                name: "Snow".into(),
                ticker: "SNOW".into(),
            },
        ]]);
        let holders = collect_holders(
            &fetcher,
            &catalogue,
            |id| {
                assert_eq!(id, "WINTER-1");
                MockPages::new(vec![vec![ApiTokenAccount {
                    address: "erd1h".into(),
                    balance: BigUint::from(9u32),
                }]])
            },
            "WINTER",
        )
        .await
        .unwrap();

        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].token_name, "Winter");
        assert_eq!(holders[0].balance, BigUint::from(9u32));
    }

    #[tokio::test]
    async fn cache_gate_skips_fetch_when_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BulkCache::new(dir.path().join("holders.json"));
        let cached = vec![TokenHolder {
            token_id: "T".into(),
            token_name: "T".into(),
            address: "erd1cached".into(),
            balance: BigUint::from(1u32),
        }];
        cache.save(&cached).unwrap();

        let fetched = Cell::new(0);
        let fetch = || async {
            fetched.set(fetched.get() + 1);
            Ok::<Vec<TokenHolder>, crate::Error>(Vec::new())
        };

        let loaded = load_or_fetch(&cache, true, fetch).await.unwrap();
        assert_eq!(loaded, cached);
        assert_eq!(fetched.get(), 0);

        let refreshed = load_or_fetch(&cache, false, fetch).await.unwrap();
        assert!(refreshed.is_empty());
        assert_eq!(fetched.get(), 1);
        assert!(cache.load::<TokenHolder>().unwrap().is_empty());
    }
}
