//! Font readiness gate
//!
//! Fonts load concurrently at startup. Drawing is refused until every face
//! has arrived; one failure fails the gate for the rest of the process.

use crate::assets::{AssetKey, AssetResolver, FontSpec};
use crate::error::{PlateError, PlateResult};
use crate::traits::AssetLoader;
use futures::future::{self, LocalBoxFuture};
use std::cell::RefCell;
use tracing::{debug, error, info};

/// Readiness of the configured font set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontReadiness {
    #[default]
    Pending,
    Loading,
    Ready,
    Failed(String),
}

/// One-way readiness latch
#[derive(Debug, Default)]
pub struct FontGate {
    readiness: RefCell<FontReadiness>,
}

impl FontGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(&self) -> FontReadiness {
        self.readiness.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.readiness.borrow() == FontReadiness::Ready
    }

    /// Claim the load; false if a load already started or settled
    pub fn begin(&self) -> bool {
        let mut readiness = self.readiness.borrow_mut();
        if *readiness != FontReadiness::Pending {
            return false;
        }
        *readiness = FontReadiness::Loading;
        true
    }

    /// Flip to ready; only the first settle takes effect
    pub fn mark_ready(&self) -> bool {
        self.settle(FontReadiness::Ready)
    }

    pub fn mark_failed(&self, reason: &str) -> bool {
        self.settle(FontReadiness::Failed(reason.to_string()))
    }

    fn settle(&self, outcome: FontReadiness) -> bool {
        let mut readiness = self.readiness.borrow_mut();
        match *readiness {
            FontReadiness::Pending | FontReadiness::Loading => {
                *readiness = outcome;
                true
            }
            FontReadiness::Ready | FontReadiness::Failed(_) => false,
        }
    }

    /// Ok only when drawing is permitted
    pub fn check(&self) -> PlateResult<()> {
        match &*self.readiness.borrow() {
            FontReadiness::Ready => Ok(()),
            FontReadiness::Pending | FontReadiness::Loading => Err(PlateError::FontsLoading),
            FontReadiness::Failed(reason) => Err(PlateError::FontsUnavailable { reason: reason.clone() }),
        }
    }
}

/// Fetch every font concurrently, waiting at least as long as `floor`.
///
/// Returns `(family, bytes)` in configuration order. The first failure
/// fails the whole set.
pub async fn fetch_fonts(
    specs: &[FontSpec],
    resolver: &AssetResolver,
    loader: &dyn AssetLoader,
    floor: LocalBoxFuture<'static, ()>,
) -> PlateResult<Vec<(String, Vec<u8>)>> {
    let loads = specs.iter().map(|spec| {
        let url = resolver.resolve(&AssetKey::Font(spec));
        let family = spec.logical_name.clone();
        debug!("Loading font {} from {}", family, url);
        let load = loader.load_font(&url);
        async move {
            match load.await {
                Ok(bytes) => Ok((family, bytes)),
                Err(e) => Err(PlateError::FontLoad { family, message: e.to_string() }),
            }
        }
    });

    let (fonts, ()) = future::join(future::try_join_all(loads), floor).await;
    match &fonts {
        Ok(fonts) => info!("Fetched {} fonts", fonts.len()),
        Err(e) => error!("Font loading failed: {}", e),
    }
    fonts
}
