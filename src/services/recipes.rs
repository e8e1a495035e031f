use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::client::HttpClient;
use crate::errors::ServiceError;
use crate::models::recipe::{RecipeDto, ResolvedRecipe};

/// Raw recipe lookup transport. The HTTP fetcher and the demo fetcher both
/// sit behind this seam so the memoization layer is shared.
#[async_trait]
pub trait RecipeFetch: Send + Sync {
    async fn fetch(&self, sku: &str) -> Result<ResolvedRecipe, ServiceError>;
}

/// `GET /v1/recipes/{sku}` fetcher.
pub struct HttpRecipeFetcher {
    client: HttpClient,
}

impl HttpRecipeFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecipeFetch for HttpRecipeFetcher {
    async fn fetch(&self, sku: &str) -> Result<ResolvedRecipe, ServiceError> {
        let dto: RecipeDto = self
            .client
            .get_json(&format!("v1/recipes/{sku}"))
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => {
                    ServiceError::NotFound(format!("No existe receta para el SKU {sku}"))
                }
                other => other,
            })?;
        Ok(dto.into())
    }
}

/// Recipe resolver with a session-lifetime memoization map.
///
/// On a successful lookup the recipe is stored under every known identifier
/// (input SKU, the recipe's own SKU, the recipe code) so later lookups by any
/// alias are cache hits. There is no eviction; concurrent resolvers may race
/// but writes are additive and idempotent, so they only race to the same
/// value.
pub struct RecipeService {
    fetcher: Arc<dyn RecipeFetch>,
    cache: DashMap<String, Arc<ResolvedRecipe>>,
}

impl RecipeService {
    pub fn new(fetcher: Arc<dyn RecipeFetch>) -> Self {
        Self {
            fetcher,
            cache: DashMap::new(),
        }
    }

    fn normalize(sku: &str) -> String {
        sku.trim().to_uppercase()
    }

    /// Resolves the recipe for a product SKU, serving from cache when
    /// possible. Exactly one network request is issued per distinct recipe
    /// per session.
    #[instrument(skip(self))]
    pub async fn resolve(&self, sku: &str) -> Result<Arc<ResolvedRecipe>, ServiceError> {
        let key = Self::normalize(sku);
        if key.is_empty() {
            return Err(ServiceError::InvalidInput("SKU vacío".to_string()));
        }
        if let Some(hit) = self.cache.get(&key) {
            debug!(sku = %key, "recipe cache hit");
            return Ok(hit.clone());
        }

        let recipe = Arc::new(self.fetcher.fetch(&key).await?);
        for alias in [
            key.as_str(),
            recipe.product_sku.as_str(),
            recipe.recipe_code.as_str(),
        ] {
            let alias = Self::normalize(alias);
            if !alias.is_empty() {
                self.cache.insert(alias, recipe.clone());
            }
        }
        Ok(recipe)
    }

    /// Cache-only lookup by any known alias.
    pub fn cached(&self, key: &str) -> Option<Arc<ResolvedRecipe>> {
        self.cache.get(&Self::normalize(key)).map(|r| r.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecipeFetch for CountingFetcher {
        async fn fetch(&self, sku: &str) -> Result<ResolvedRecipe, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if sku == "PT-404" {
                return Err(ServiceError::NotFound(format!(
                    "No existe receta para el SKU {sku}"
                )));
            }
            Ok(ResolvedRecipe {
                product_sku: sku.to_string(),
                recipe_code: format!("REC-{sku}"),
                description: "Producto terminado".to_string(),
                base_quantity: dec!(100),
                materials: vec![],
            })
        }
    }

    fn service() -> (RecipeService, Arc<CountingFetcher>) {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        (RecipeService::new(fetcher.clone()), fetcher)
    }

    #[tokio::test]
    async fn second_resolution_is_a_cache_hit() {
        let (service, fetcher) = service();
        service.resolve("PT-001").await.unwrap();
        service.resolve("PT-001").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn aliases_hit_the_same_entry() {
        let (service, fetcher) = service();
        service.resolve("pt-001 ").await.unwrap();
        // Lookup by recipe code and by the normalized SKU are both hits.
        assert!(service.cached("REC-PT-001").is_some());
        service.resolve("PT-001").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_recipe_maps_to_not_found() {
        let (service, _) = service();
        let err = service.resolve("PT-404").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_lookups_are_not_cached() {
        let (service, fetcher) = service();
        let _ = service.resolve("PT-404").await;
        let _ = service.resolve("PT-404").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
