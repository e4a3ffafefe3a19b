//! # QR Checkout State Machine
//!
//! The pure part of the bank-QR checkout modal. It performs no I/O: every
//! transition that needs the backend returns a [`CheckoutCommand`] for the
//! caller to execute, and the caller feeds the outcome back in.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Init ──start──► LoadingBanks ──banks_loaded──► BankReady              │
//! │                        │  (failure/empty → fallback bank)   │           │
//! │                        │                                    │ amount>0  │
//! │                        │                                    ▼           │
//! │                        │         ┌────────────────► GeneratingQr ◄──┐   │
//! │                        │         │ select_bank          │           │   │
//! │                        │         │                      │ qr_resolved   │
//! │                        │         │               ┌──────┴──────┐    │   │
//! │                        │         │               ▼             ▼    │   │
//! │                        │         └─────────── QrReady       QrError ┘   │
//! │                        │                                  (retry)       │
//! │                                                                         │
//! │   any state ──close──► Closed (terminal)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Tokens
//! Every QR request carries a [`RequestToken`] taken from a strictly
//! increasing counter. Only the response whose token equals the latest issued
//! one may change the state; anything else is reported as
//! [`QrResolution::Stale`] and dropped. A slow answer for a bank the user has
//! already switched away from can therefore never overwrite the newer one.

use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::pricing::Price;
use crate::types::{Bank, BankDirectory, QrPayment};

/// Message shown when a QR request fails for any reason other than
/// "not configured".
pub const QR_UNAVAILABLE_MESSAGE: &str = "Ошибка загрузки QR-кода";

// =============================================================================
// Tokens & Commands
// =============================================================================

/// Monotonically increasing QR request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A QR generation request for exactly one `(bank, amount)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    pub token: RequestToken,
    pub bank: String,
    pub amount: i64,
}

/// Backend work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCommand {
    /// Fetch the bank directory and report it via `banks_loaded`.
    FetchBanks,
    /// Generate a QR payment and report it via `qr_resolved`.
    GenerateQr(QrRequest),
}

/// Outcome of feeding a QR response into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrResolution {
    /// The response belonged to the latest request and updated the state.
    Applied,
    /// The response was superseded (or the modal is closed) and was dropped.
    Stale,
}

// =============================================================================
// State
// =============================================================================

/// Why the last QR request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QrFailure {
    /// No QR is configured for this bank + amount.
    NotConfigured,
    /// Transport failure, timeout or an unusable response.
    Unavailable,
}

/// Observable checkout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum CheckoutState {
    Init,
    LoadingBanks,
    /// A bank is selected but no QR was requested (amount is not payable).
    BankReady { bank: String },
    GeneratingQr { bank: String },
    QrReady { payment: QrPayment },
    QrError {
        bank: String,
        failure: QrFailure,
        message: String,
    },
    Closed,
}

impl CheckoutState {
    /// Human-readable state name used in IllegalState errors.
    pub fn label(&self) -> &'static str {
        match self {
            CheckoutState::Init => "initializing",
            CheckoutState::LoadingBanks => "loading banks",
            CheckoutState::BankReady { .. } => "waiting for a bank",
            CheckoutState::GeneratingQr { .. } => "generating a QR code",
            CheckoutState::QrReady { .. } => "showing a QR code",
            CheckoutState::QrError { .. } => "showing a QR error",
            CheckoutState::Closed => "closed",
        }
    }

    /// True once a bank has been selected (BankReady and later, not Closed).
    fn accepts_bank_selection(&self) -> bool {
        matches!(
            self,
            CheckoutState::BankReady { .. }
                | CheckoutState::GeneratingQr { .. }
                | CheckoutState::QrReady { .. }
                | CheckoutState::QrError { .. }
        )
    }
}

// =============================================================================
// Machine
// =============================================================================

/// One checkout modal instance. `amount` is fixed at construction.
#[derive(Debug, Clone)]
pub struct QrCheckout {
    amount: i64,
    state: CheckoutState,
    directory: BankDirectory,
    selected_bank: Option<String>,
    last_token: u64,
    pending: Option<QrRequest>,
    bank_load_error: Option<String>,
}

impl QrCheckout {
    pub fn new(amount: i64) -> Self {
        QrCheckout {
            amount,
            state: CheckoutState::Init,
            directory: BankDirectory::default(),
            selected_bank: None,
            last_token: 0,
            pending: None,
            bank_load_error: None,
        }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn directory(&self) -> &BankDirectory {
        &self.directory
    }

    pub fn selected_bank(&self) -> Option<&Bank> {
        self.selected_bank
            .as_deref()
            .and_then(|key| self.directory.get(key))
    }

    /// Why the bank directory fell back to the default entry, if it did.
    pub fn bank_load_error(&self) -> Option<&str> {
        self.bank_load_error.as_deref()
    }

    /// The request whose response is currently awaited.
    pub fn pending_request(&self) -> Option<&QrRequest> {
        self.pending.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.state == CheckoutState::Closed
    }

    /// Init → LoadingBanks.
    pub fn start(&mut self) -> CoreResult<CheckoutCommand> {
        if self.state != CheckoutState::Init {
            return Err(self.reject("open the checkout"));
        }

        self.state = CheckoutState::LoadingBanks;
        Ok(CheckoutCommand::FetchBanks)
    }

    /// LoadingBanks → BankReady, then straight to GeneratingQr when the
    /// amount is payable.
    ///
    /// A failed or empty directory never dead-ends the checkout: the fallback
    /// bank is used and the failure is kept for diagnostics.
    pub fn banks_loaded(
        &mut self,
        result: CoreResult<BankDirectory>,
    ) -> CoreResult<Option<CheckoutCommand>> {
        if self.state != CheckoutState::LoadingBanks {
            return Err(self.reject("accept a bank directory"));
        }

        self.directory = match result {
            Ok(directory) if !directory.is_empty() => directory,
            Ok(_) => {
                tracing::warn!("Bank directory is empty, using fallback bank");
                self.bank_load_error = Some("bank directory is empty".to_string());
                BankDirectory::fallback()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Bank directory unavailable, using fallback bank");
                self.bank_load_error = Some(err.to_string());
                BankDirectory::fallback()
            }
        };

        self.selected_bank = self.directory.first().map(|bank| bank.key.clone());
        Ok(self.request_for_selection())
    }

    /// Changes the selected bank and requests a QR for it.
    ///
    /// Re-selecting the bank that is already generating or showing a QR is a
    /// no-op.
    pub fn select_bank(&mut self, key: &str) -> CoreResult<Option<CheckoutCommand>> {
        if !self.state.accepts_bank_selection() {
            return Err(self.reject("select a bank"));
        }

        if !self.directory.contains(key) {
            return Err(ValidationError::NotAllowed {
                field: "bank".to_string(),
                allowed: self.directory.keys().into_iter().map(String::from).collect(),
            }
            .into());
        }

        let unchanged = self.selected_bank.as_deref() == Some(key);
        if unchanged
            && matches!(
                self.state,
                CheckoutState::GeneratingQr { .. } | CheckoutState::QrReady { .. }
            )
        {
            return Ok(None);
        }

        tracing::debug!(bank = key, amount = self.amount, "Bank selected");
        self.selected_bank = Some(key.to_string());
        Ok(self.request_for_selection())
    }

    /// QrError → GeneratingQr for the same bank and amount.
    pub fn retry(&mut self) -> CoreResult<CheckoutCommand> {
        if !matches!(self.state, CheckoutState::QrError { .. }) {
            return Err(self.reject("retry QR generation"));
        }

        self.request_for_selection()
            .ok_or_else(|| self.reject("retry QR generation"))
    }

    /// Applies a QR response if `token` is the latest issued one.
    pub fn qr_resolved(
        &mut self,
        token: RequestToken,
        result: CoreResult<QrPayment>,
    ) -> QrResolution {
        let request = match &self.pending {
            Some(request) if request.token == token => request.clone(),
            _ => {
                tracing::warn!(%token, state = self.state.label(), "Dropping stale QR response");
                return QrResolution::Stale;
            }
        };
        self.pending = None;

        self.state = match result {
            Ok(payment) if payment.bank == request.bank && payment.amount == request.amount => {
                tracing::info!(bank = %payment.bank, amount = payment.amount, %token, "QR code ready");
                CheckoutState::QrReady { payment }
            }
            Ok(payment) => {
                tracing::warn!(
                    requested_bank = %request.bank,
                    requested_amount = request.amount,
                    bank = %payment.bank,
                    amount = payment.amount,
                    "QR response does not match the request"
                );
                self.unavailable(&request)
            }
            Err(err) if err.is_not_found() => CheckoutState::QrError {
                message: format!(
                    "QR-код для банка \"{}\" на сумму {} не найден",
                    self.bank_name(&request.bank),
                    Price::new(request.amount)
                ),
                bank: request.bank,
                failure: QrFailure::NotConfigured,
            },
            Err(err) => {
                tracing::warn!(bank = %request.bank, error = %err, "QR generation failed");
                self.unavailable(&request)
            }
        };

        QrResolution::Applied
    }

    /// Any state → Closed. In-flight responses are dropped from now on.
    pub fn close(&mut self) {
        self.pending = None;
        self.state = CheckoutState::Closed;
    }

    fn request_for_selection(&mut self) -> Option<CheckoutCommand> {
        let bank = self.selected_bank.clone()?;

        if self.amount <= 0 {
            self.pending = None;
            self.state = CheckoutState::BankReady { bank };
            return None;
        }

        self.last_token += 1;
        let request = QrRequest {
            token: RequestToken(self.last_token),
            bank: bank.clone(),
            amount: self.amount,
        };
        tracing::debug!(bank = %bank, amount = self.amount, token = %request.token, "Requesting QR code");

        self.pending = Some(request.clone());
        self.state = CheckoutState::GeneratingQr { bank };
        Some(CheckoutCommand::GenerateQr(request))
    }

    fn unavailable(&self, request: &QrRequest) -> CheckoutState {
        CheckoutState::QrError {
            bank: request.bank.clone(),
            failure: QrFailure::Unavailable,
            message: QR_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    fn bank_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.directory.get(key).map_or(key, |bank| bank.name.as_str())
    }

    fn reject(&self, operation: &str) -> CoreError {
        tracing::debug!(operation, state = self.state.label(), "Rejected checkout transition");
        CoreError::illegal_state(operation, self.state.label())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> BankDirectory {
        BankDirectory::new([
            Bank {
                key: "sovcombank".to_string(),
                name: "Совкомбанк".to_string(),
                icon: "🏦".to_string(),
            },
            Bank {
                key: "tbank".to_string(),
                name: "Т-Банк".to_string(),
                icon: "⚡".to_string(),
            },
        ])
    }

    fn payment(bank: &str, amount: i64) -> QrPayment {
        QrPayment {
            payment_url: format!("https://qr.nspk.ru/{bank}/{amount}"),
            bank: bank.to_string(),
            amount,
        }
    }

    fn expect_request(command: Option<CheckoutCommand>) -> QrRequest {
        match command {
            Some(CheckoutCommand::GenerateQr(request)) => request,
            other => panic!("expected a QR request, got {other:?}"),
        }
    }

    fn ready_checkout(amount: i64) -> (QrCheckout, Option<CheckoutCommand>) {
        let mut checkout = QrCheckout::new(amount);
        assert_eq!(checkout.start().unwrap(), CheckoutCommand::FetchBanks);
        let command = checkout.banks_loaded(Ok(directory())).unwrap();
        (checkout, command)
    }

    #[test]
    fn test_first_bank_is_default_and_qr_requested() {
        let (checkout, command) = ready_checkout(5000);
        let request = expect_request(command);

        assert_eq!(checkout.selected_bank().unwrap().key, "sovcombank");
        assert_eq!(request.bank, "sovcombank");
        assert_eq!(request.amount, 5000);
        assert_eq!(
            checkout.state(),
            &CheckoutState::GeneratingQr {
                bank: "sovcombank".to_string()
            }
        );
    }

    #[test]
    fn test_bank_failure_falls_back() {
        let mut checkout = QrCheckout::new(5000);
        checkout.start().unwrap();
        let command = checkout
            .banks_loaded(Err(CoreError::Network("connection refused".to_string())))
            .unwrap();

        assert_eq!(expect_request(command).bank, "sovcombank");
        assert!(checkout.bank_load_error().unwrap().contains("connection refused"));
        assert_eq!(checkout.directory().len(), 1);
    }

    #[test]
    fn test_empty_directory_falls_back() {
        let mut checkout = QrCheckout::new(5000);
        checkout.start().unwrap();
        checkout.banks_loaded(Ok(BankDirectory::default())).unwrap();

        assert_eq!(checkout.selected_bank().unwrap().key, "sovcombank");
        assert!(checkout.bank_load_error().is_some());
    }

    #[test]
    fn test_zero_amount_stops_at_bank_ready() {
        let (checkout, command) = ready_checkout(0);
        assert!(command.is_none());
        assert_eq!(
            checkout.state(),
            &CheckoutState::BankReady {
                bank: "sovcombank".to_string()
            }
        );
    }

    #[test]
    fn test_qr_success() {
        let (mut checkout, command) = ready_checkout(5000);
        let request = expect_request(command);

        let resolution = checkout.qr_resolved(request.token, Ok(payment("sovcombank", 5000)));
        assert_eq!(resolution, QrResolution::Applied);
        assert_eq!(
            checkout.state(),
            &CheckoutState::QrReady {
                payment: payment("sovcombank", 5000)
            }
        );
    }

    #[test]
    fn test_stale_response_after_bank_switch_is_dropped() {
        let (mut checkout, command) = ready_checkout(5000);
        let sovcombank = expect_request(command);
        let tbank = expect_request(checkout.select_bank("tbank").unwrap());
        assert!(tbank.token > sovcombank.token);

        // tbank answers first, then the slow sovcombank response arrives
        assert_eq!(
            checkout.qr_resolved(tbank.token, Ok(payment("tbank", 5000))),
            QrResolution::Applied
        );
        assert_eq!(
            checkout.qr_resolved(sovcombank.token, Ok(payment("sovcombank", 5000))),
            QrResolution::Stale
        );

        assert_eq!(
            checkout.state(),
            &CheckoutState::QrReady {
                payment: payment("tbank", 5000)
            }
        );
    }

    #[test]
    fn test_stale_response_before_new_one_is_dropped() {
        let (mut checkout, command) = ready_checkout(5000);
        let sovcombank = expect_request(command);
        let tbank = expect_request(checkout.select_bank("tbank").unwrap());

        assert_eq!(
            checkout.qr_resolved(sovcombank.token, Ok(payment("sovcombank", 5000))),
            QrResolution::Stale
        );
        assert_eq!(
            checkout.state(),
            &CheckoutState::GeneratingQr {
                bank: "tbank".to_string()
            }
        );

        checkout.qr_resolved(tbank.token, Ok(payment("tbank", 5000)));
        assert!(matches!(checkout.state(), CheckoutState::QrReady { payment } if payment.bank == "tbank"));
    }

    #[test]
    fn test_not_found_names_bank_and_amount() {
        let (mut checkout, _) = ready_checkout(5000);
        let request = expect_request(checkout.select_bank("tbank").unwrap());

        checkout.qr_resolved(request.token, Err(CoreError::not_found("QR code", "tbank/5000")));

        match checkout.state() {
            CheckoutState::QrError {
                bank,
                failure,
                message,
            } => {
                assert_eq!(bank, "tbank");
                assert_eq!(*failure, QrFailure::NotConfigured);
                assert!(message.contains("Т-Банк"));
                assert!(message.contains(&Price::new(5000).to_string()));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_network_failure_then_retry() {
        let (mut checkout, command) = ready_checkout(5000);
        let first = expect_request(command);

        checkout.qr_resolved(first.token, Err(CoreError::Network("timed out".to_string())));
        assert!(matches!(
            checkout.state(),
            CheckoutState::QrError {
                failure: QrFailure::Unavailable,
                ..
            }
        ));

        let retry = match checkout.retry().unwrap() {
            CheckoutCommand::GenerateQr(request) => request,
            other => panic!("unexpected command {other:?}"),
        };
        assert_eq!(retry.bank, first.bank);
        assert_eq!(retry.amount, first.amount);
        assert!(retry.token > first.token);
    }

    #[test]
    fn test_mismatched_echo_is_an_error() {
        let (mut checkout, command) = ready_checkout(5000);
        let request = expect_request(command);

        checkout.qr_resolved(request.token, Ok(payment("sovcombank", 4000)));
        assert!(matches!(checkout.state(), CheckoutState::QrError { .. }));
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut checkout = QrCheckout::new(5000);
        assert!(matches!(
            checkout.select_bank("tbank"),
            Err(CoreError::IllegalState { .. })
        ));
        assert!(checkout.retry().is_err());
        assert!(checkout.banks_loaded(Ok(directory())).is_err());

        let (mut checkout, _) = ready_checkout(5000);
        assert!(checkout.start().is_err());
        assert!(checkout.retry().is_err());
        assert!(matches!(
            checkout.select_bank("unknown"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_reselecting_same_bank_is_noop() {
        let (mut checkout, command) = ready_checkout(5000);
        let request = expect_request(command);

        assert_eq!(checkout.select_bank("sovcombank").unwrap(), None);
        assert_eq!(checkout.pending_request().unwrap().token, request.token);
    }

    #[test]
    fn test_close_is_terminal() {
        let (mut checkout, command) = ready_checkout(5000);
        let request = expect_request(command);

        checkout.close();
        assert!(checkout.is_closed());
        assert_eq!(
            checkout.qr_resolved(request.token, Ok(payment("sovcombank", 5000))),
            QrResolution::Stale
        );
        assert!(checkout.select_bank("tbank").is_err());
        assert!(checkout.retry().is_err());
        assert_eq!(checkout.state(), &CheckoutState::Closed);
    }

    #[test]
    fn test_state_wire_format() {
        let state = CheckoutState::GeneratingQr {
            bank: "tbank".to_string(),
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["status"], "generating_qr");
        assert_eq!(value["bank"], "tbank");
    }
}
