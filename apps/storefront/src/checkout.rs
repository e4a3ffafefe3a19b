//! # Payment QR Workflow
//!
//! Drives one checkout modal: runs the commands emitted by
//! [`QrCheckout`] against the backend and feeds the results back.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(amount) ──► bank_directory() ──► banks_loaded ──┐                 │
//! │                                                       │ GenerateQr(#1)  │
//! │  select_bank("tbank") ───────────────────────────────┤ GenerateQr(#2)  │
//! │  retry() ────────────────────────────────────────────┤ GenerateQr(#3)  │
//! │                                                       ▼                 │
//! │                                  tokio::spawn(timeout(generate_qr))     │
//! │                                                       │                 │
//! │                                     (token, result) ──┘ mpsc            │
//! │                                                       │                 │
//! │  next_update() ◄── qr_resolved(token, result) ◄───────┘                 │
//! │                     latest token → Applied                              │
//! │                     anything else → Stale (dropped)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Issuing a new request aborts the superseded one. `close` aborts
//! everything still in flight.

use std::sync::Arc;
use std::time::Duration;

use storefront_api::{ApiGateway, CheckoutSettings};
use storefront_core::checkout::QrResolution;
use storefront_core::{
    Bank, BankDirectory, CheckoutCommand, CheckoutState, CoreError, CoreResult, QrCheckout,
    QrPayment, QrRequest, RequestToken,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::AppResult;

type QrOutcome = (RequestToken, CoreResult<QrPayment>);

/// One open checkout modal.
pub struct PaymentQrWorkflow {
    checkout: QrCheckout,
    gateway: Arc<dyn ApiGateway>,
    qr_timeout: Duration,
    qr_image_size: u32,
    outcomes_tx: mpsc::UnboundedSender<QrOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<QrOutcome>,
    in_flight: Option<JoinHandle<()>>,
}

impl PaymentQrWorkflow {
    /// Opens the checkout for a fixed `amount`: loads the bank directory
    /// and, for a payable amount, requests the first QR code.
    pub async fn open(
        gateway: Arc<dyn ApiGateway>,
        amount: i64,
        settings: &CheckoutSettings,
    ) -> AppResult<Self> {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let mut workflow = PaymentQrWorkflow {
            checkout: QrCheckout::new(amount),
            gateway,
            qr_timeout: settings.qr_timeout(),
            qr_image_size: settings.qr_image_size,
            outcomes_tx,
            outcomes_rx,
            in_flight: None,
        };

        info!(amount, "Opening QR checkout");
        let command = workflow.checkout.start()?;
        workflow.execute(command).await?;
        Ok(workflow)
    }

    pub fn state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    pub fn amount(&self) -> i64 {
        self.checkout.amount()
    }

    pub fn banks(&self) -> &BankDirectory {
        self.checkout.directory()
    }

    pub fn selected_bank(&self) -> Option<&Bank> {
        self.checkout.selected_bank()
    }

    /// Why the fallback bank is shown, if it is.
    pub fn bank_load_error(&self) -> Option<&str> {
        self.checkout.bank_load_error()
    }

    /// External image URL of the ready QR code.
    pub fn qr_image_url(&self) -> Option<String> {
        match self.checkout.state() {
            CheckoutState::QrReady { payment } => Some(payment.image_url(self.qr_image_size)),
            _ => None,
        }
    }

    pub async fn select_bank(&mut self, key: &str) -> AppResult<()> {
        if let Some(command) = self.checkout.select_bank(key)? {
            self.execute(command).await?;
        }
        Ok(())
    }

    pub async fn retry(&mut self) -> AppResult<()> {
        let command = self.checkout.retry()?;
        self.execute(command).await
    }

    /// Waits for the awaited QR response and applies it.
    ///
    /// Returns `None` when nothing is awaited (including after `close`).
    /// Stale responses are skipped.
    pub async fn next_update(&mut self) -> Option<&CheckoutState> {
        loop {
            if self.checkout.pending_request().is_none() {
                return None;
            }

            let (token, result) = self.outcomes_rx.recv().await?;
            match self.checkout.qr_resolved(token, result) {
                QrResolution::Applied => return Some(self.checkout.state()),
                QrResolution::Stale => debug!(%token, "Skipped stale QR outcome"),
            }
        }
    }

    /// Applies outcomes until no request is awaited.
    pub async fn settle(&mut self) -> &CheckoutState {
        while self.next_update().await.is_some() {}
        self.checkout.state()
    }

    /// Dismisses the modal. Terminal.
    pub fn close(&mut self) {
        self.abort_in_flight();
        self.checkout.close();
        info!("QR checkout closed");
    }

    async fn execute(&mut self, command: CheckoutCommand) -> AppResult<()> {
        let request = match command {
            CheckoutCommand::FetchBanks => {
                let directory = self.fetch_banks().await;
                match self.checkout.banks_loaded(directory)? {
                    Some(CheckoutCommand::GenerateQr(request)) => request,
                    _ => return Ok(()),
                }
            }
            CheckoutCommand::GenerateQr(request) => request,
        };

        self.spawn_qr(request);
        Ok(())
    }

    async fn fetch_banks(&self) -> CoreResult<BankDirectory> {
        match tokio::time::timeout(self.qr_timeout, self.gateway.bank_directory()).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::Network(format!(
                "bank directory timed out after {:?}",
                self.qr_timeout
            ))),
        }
    }

    fn spawn_qr(&mut self, request: QrRequest) {
        self.abort_in_flight();

        let gateway = Arc::clone(&self.gateway);
        let outcomes = self.outcomes_tx.clone();
        let timeout = self.qr_timeout;

        self.in_flight = Some(tokio::spawn(async move {
            let call = gateway.generate_qr(&request.bank, request.amount);
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result.map_err(CoreError::from),
                Err(_) => Err(CoreError::Network(format!(
                    "QR request timed out after {timeout:?}"
                ))),
            };
            // The receiver lives as long as the workflow.
            let _ = outcomes.send((request.token, result));
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for PaymentQrWorkflow {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

impl std::fmt::Debug for PaymentQrWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentQrWorkflow")
            .field("checkout", &self.checkout)
            .field("qr_timeout", &self.qr_timeout)
            .finish_non_exhaustive()
    }
}
