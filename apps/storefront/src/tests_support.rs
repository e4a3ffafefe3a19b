//! In-memory [`ApiGateway`] for the app crate's tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use storefront_api::{ApiGateway, ClientError, ClientResult, RemoteCartItem, SaveCartAck};
use storefront_core::{Bank, BankDirectory, Product, QrPayment, SessionId};

pub(crate) fn product(id: &str, price: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        category: "Веб-разработка".to_string(),
        price,
        short_description: "short".to_string(),
        full_description: "full".to_string(),
        delivery_time: "3-5 дней".to_string(),
        icon: "💼".to_string(),
        image_url: None,
        features: Vec::new(),
        technologies: Vec::new(),
    }
}

pub(crate) fn banks() -> BankDirectory {
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

fn unavailable() -> ClientError {
    ClientError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    }
}

/// Scriptable backend.
pub(crate) struct FakeGateway {
    products: Vec<Product>,
    product_failures: AtomicU32,
    banks: Option<BankDirectory>,
    qr_delays: HashMap<String, Duration>,
    missing_qr: HashSet<String>,
    hanging_qr: HashSet<String>,
    qr_failures: AtomicU32,
    qr_calls: Mutex<Vec<(String, i64)>>,
    carts: Mutex<HashMap<SessionId, Vec<RemoteCartItem>>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        FakeGateway {
            products: Vec::new(),
            product_failures: AtomicU32::new(0),
            banks: Some(banks()),
            qr_delays: HashMap::new(),
            missing_qr: HashSet::new(),
            hanging_qr: HashSet::new(),
            qr_failures: AtomicU32::new(0),
            qr_calls: Mutex::new(Vec::new()),
            carts: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeGateway {
    pub(crate) fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    /// The first `n` product list calls fail with a 502.
    pub(crate) fn with_product_failures(self, n: u32) -> Self {
        self.product_failures.store(n, Ordering::SeqCst);
        self
    }

    /// `None` makes the bank directory call fail.
    pub(crate) fn with_banks(mut self, banks: Option<BankDirectory>) -> Self {
        self.banks = banks;
        self
    }

    pub(crate) fn with_qr_delay(mut self, bank: &str, delay: Duration) -> Self {
        self.qr_delays.insert(bank.to_string(), delay);
        self
    }

    pub(crate) fn with_missing_qr(mut self, bank: &str) -> Self {
        self.missing_qr.insert(bank.to_string());
        self
    }

    /// QR requests for `bank` never complete.
    pub(crate) fn with_hanging_qr(mut self, bank: &str) -> Self {
        self.hanging_qr.insert(bank.to_string());
        self
    }

    /// The first `n` QR calls fail with a 502.
    pub(crate) fn with_qr_failures(self, n: u32) -> Self {
        self.qr_failures.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn qr_calls(&self) -> Vec<(String, i64)> {
        self.qr_calls.lock().unwrap().clone()
    }

    pub(crate) fn put_remote_cart(&self, session_id: &SessionId, items: Vec<RemoteCartItem>) {
        self.carts.lock().unwrap().insert(session_id.clone(), items);
    }

    pub(crate) fn saved_cart(&self, session_id: &SessionId) -> Vec<RemoteCartItem> {
        self.carts
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        if Self::take_failure(&self.product_failures) {
            return Err(unavailable());
        }
        Ok(self.products.clone())
    }

    async fn get_product(&self, product_id: &str) -> ClientResult<Product> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("products/{product_id}"),
            })
    }

    async fn save_cart(
        &self,
        session_id: &SessionId,
        items: &[RemoteCartItem],
    ) -> ClientResult<SaveCartAck> {
        self.put_remote_cart(session_id, items.to_vec());
        Ok(SaveCartAck {
            status: "success".to_string(),
            session_id: session_id.to_string(),
        })
    }

    async fn load_cart(&self, session_id: &SessionId) -> ClientResult<Vec<RemoteCartItem>> {
        Ok(self.saved_cart(session_id))
    }

    async fn bank_directory(&self) -> ClientResult<BankDirectory> {
        self.banks.clone().ok_or_else(unavailable)
    }

    async fn generate_qr(&self, bank: &str, amount: i64) -> ClientResult<QrPayment> {
        self.qr_calls
            .lock()
            .unwrap()
            .push((bank.to_string(), amount));

        if let Some(delay) = self.qr_delays.get(bank) {
            tokio::time::sleep(*delay).await;
        }
        if self.hanging_qr.contains(bank) {
            std::future::pending::<()>().await;
        }
        if Self::take_failure(&self.qr_failures) {
            return Err(unavailable());
        }
        if self.missing_qr.contains(bank) {
            return Err(ClientError::NotFound {
                resource: format!("qr-code/{bank}/{amount}"),
            });
        }

        Ok(QrPayment {
            payment_url: format!("https://qr.nspk.ru/{bank}?sum={amount}"),
            bank: bank.to_string(),
            amount,
        })
    }
}
