//! Lager public API façade (in-process).
//!
//! Defines the async trait frontends depend on, a simulated backend
//! (`SimApi`) standing in for the real service, and a `MockApi` for
//! tests. Nothing here persists or leaves memory.

#![forbid(unsafe_code)]

use std::time::Instant;

use lager_core::Product;
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod catalog;
pub mod service;

pub use lager_resource::{Generation, Phase, Resource};
pub use service::{InventoryService, MutationOutcome};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

/// Authenticated identity; the payload of the auth resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Payload of the standalone demo fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoProfile {
    pub name: String,
    pub role: String,
}

/// API errors suitable for surfacing as failure states, never thrown
/// across the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum LagerError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("auth: {0}")]
    Auth(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type LagerResult<T> = Result<T, LagerError>;

/// Per-resource state machines; independent instances, never shared.
pub type AuthResource = Resource<User>;
pub type LoadResource = Resource<Vec<Product>>;
pub type DemoResource = Resource<DemoProfile>;

/// Declarative Lager API surface.
#[async_trait::async_trait]
pub trait InventoryApi: Send + Sync {
    /// Validate a credential pair and return the session identity.
    async fn login(&self, email: &str, password: &str) -> LagerResult<User>;

    /// Bulk-load the full product catalog.
    async fn fetch_inventory(&self) -> LagerResult<Vec<Product>>;

    /// Standalone demo fetch used to exercise the resource lifecycle;
    /// fails intermittently on purpose.
    async fn fetch_profile(&self) -> LagerResult<DemoProfile>;
}

// ----------------- Simulated backend -----------------

/// In-process simulated backend. Latencies, catalog size, seed and demo
/// failure rate come from LAGER_* env vars with reference defaults.
pub struct SimApi {
    catalog_size: usize,
    seed: u64,
    login_delay_ms: u64,
    fetch_delay_ms: u64,
    demo_fail_rate: f64,
    demo_attempts: std::sync::atomic::AtomicU64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
}

impl Default for SimApi {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SimApi {
    pub fn from_env() -> Self {
        Self {
            catalog_size: env_parse("LAGER_CATALOG_SIZE", 5000),
            seed: env_parse("LAGER_SEED", 0x1a6e2),
            login_delay_ms: env_parse("LAGER_LOGIN_DELAY_MS", 1500),
            fetch_delay_ms: env_parse("LAGER_FETCH_DELAY_MS", 2000),
            demo_fail_rate: env_parse("LAGER_DEMO_FAIL_RATE", 0.3_f64).clamp(0.0, 1.0),
            demo_attempts: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Deterministic instance for tests: no latency, fixed seed.
    pub fn instant(catalog_size: usize, seed: u64) -> Self {
        Self {
            catalog_size,
            seed,
            login_delay_ms: 0,
            fetch_delay_ms: 0,
            demo_fail_rate: 0.0,
            demo_attempts: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn with_demo_fail_rate(mut self, rate: f64) -> Self {
        self.demo_fail_rate = rate.clamp(0.0, 1.0);
        self
    }

    async fn simulate_latency(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait::async_trait]
impl InventoryApi for SimApi {
    async fn login(&self, email: &str, password: &str) -> LagerResult<User> {
        let t0 = Instant::now();
        info!(email = %email, "api: login start");
        self.simulate_latency(self.login_delay_ms).await;

        if email == "admin@lager.dev" && password == "admin123" {
            info!(took_ms = %t0.elapsed().as_millis(), role = "admin", "api: login ok");
            return Ok(User {
                id: "1".into(),
                email: email.into(),
                name: "Alex Johnson".into(),
                role: Role::Admin,
            });
        }
        if !email.is_empty() && password.len() >= 6 {
            let name = email.split('@').next().unwrap_or(email).to_string();
            info!(took_ms = %t0.elapsed().as_millis(), role = "analyst", "api: login ok");
            return Ok(User { id: "2".into(), email: email.into(), name, role: Role::Analyst });
        }
        info!(took_ms = %t0.elapsed().as_millis(), "api: login rejected");
        Err(LagerError::Auth(
            "Invalid credentials. Try admin@lager.dev / admin123".into(),
        ))
    }

    async fn fetch_inventory(&self) -> LagerResult<Vec<Product>> {
        let t0 = Instant::now();
        info!(size = self.catalog_size, "api: fetch_inventory start");
        self.simulate_latency(self.fetch_delay_ms).await;
        let records = catalog::generate(self.catalog_size, self.seed);
        info!(
            count = records.len(),
            took_ms = %t0.elapsed().as_millis(),
            "api: fetch_inventory ok"
        );
        Ok(records)
    }

    async fn fetch_profile(&self) -> LagerResult<DemoProfile> {
        use rand::{Rng, SeedableRng};
        let t0 = Instant::now();
        self.simulate_latency(self.login_delay_ms).await;
        let attempt = self
            .demo_attempts
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed.wrapping_add(attempt));
        if rng.gen_bool(self.demo_fail_rate) {
            info!(attempt, took_ms = %t0.elapsed().as_millis(), "api: fetch_profile failed (simulated)");
            return Err(LagerError::Internal("Simulated network error (try again)".into()));
        }
        info!(attempt, took_ms = %t0.elapsed().as_millis(), "api: fetch_profile ok");
        Ok(DemoProfile { name: "Sam Rivera".into(), role: "Inventory Analyst".into() })
    }
}

// ----------------- Mock implementation -----------------

/// Configurable in-memory mock for tests.
#[derive(Default)]
pub struct MockApi {
    pub user: Option<User>,
    pub inventory: Vec<Product>,
    pub profile: Option<DemoProfile>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl InventoryApi for MockApi {
    async fn login(&self, _email: &str, _password: &str) -> LagerResult<User> {
        self.user
            .clone()
            .ok_or_else(|| LagerError::Auth("Invalid credentials. Try admin@lager.dev / admin123".into()))
    }

    async fn fetch_inventory(&self) -> LagerResult<Vec<Product>> {
        Ok(self.inventory.clone())
    }

    async fn fetch_profile(&self) -> LagerResult<DemoProfile> {
        self.profile
            .clone()
            .ok_or_else(|| LagerError::Internal("no profile configured".into()))
    }
}
