// src/db/catalog_repo.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::state_storage::StateStorage,
    models::state::{Entity, PricingState},
};

/// Tabelas normalizadas em memória, gravadas por inteiro no armazenamento a cada mudança.
///
/// Mutações trabalham sobre um rascunho: só viram estado visível depois que a gravação deu certo.
#[derive(Clone)]
pub struct CatalogRepository {
    state: Arc<RwLock<PricingState>>,
    storage: Arc<dyn StateStorage>,
}

impl CatalogRepository {
    /// Carrega o documento salvo, ou começa vazio se ainda não existir.
    pub async fn load(storage: Arc<dyn StateStorage>) -> Result<Self, AppError> {
        let state = match storage.load().await? {
            Some(state) => {
                tracing::info!(
                    "✅ Estado carregado: {} insumos, {} receitas, {} itens de cardápio",
                    state.ingredients.len(),
                    state.recipes.len(),
                    state.menu_items.len()
                );
                state
            }
            None => {
                tracing::info!("Nenhum estado salvo encontrado, começando vazio");
                PricingState::default()
            }
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            storage,
        })
    }

    pub async fn snapshot(&self) -> PricingState {
        self.state.read().await.clone()
    }

    /// Leitura sem clonar o documento inteiro.
    pub async fn read<R>(&self, f: impl FnOnce(&PricingState) -> R) -> R {
        let guard = self.state.read().await;
        f(&guard)
    }

    pub async fn list<T: Entity>(&self) -> Vec<T> {
        self.read(|state| T::table(state).clone()).await
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, AppError> {
        self.read(|state| state.find::<T>(id).cloned())
            .await
            .ok_or_else(|| AppError::not_found(T::KIND, id))
    }

    /// Remove o registro. Quem o referencia passa a contar custo zero para ele.
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<T, AppError> {
        self.mutate(|state| {
            let removed = state
                .remove::<T>(id)
                .ok_or_else(|| AppError::not_found(T::KIND, id))?;
            tracing::info!("{} '{}' removido", T::KIND, id);
            Ok(removed)
        })
        .await
    }

    /// Aplica `f` ao documento inteiro e grava. Se `f` ou a gravação falharem, nada muda.
    pub async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut PricingState) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut guard = self.state.write().await;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        self.storage.save(&draft).await?;
        *guard = draft;
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;

    /// Armazenamento em memória para testes, com contagem de gravações e falha sob demanda.
    #[derive(Default)]
    pub struct MemoryStateStorage {
        pub saved: Mutex<Option<PricingState>>,
        pub saves: AtomicUsize,
        pub fail_next: AtomicBool,
    }

    #[async_trait]
    impl StateStorage for MemoryStateStorage {
        async fn load(&self) -> Result<Option<PricingState>, AppError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, state: &PricingState) -> Result<(), AppError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(AppError::IoError(std::io::Error::other("disco cheio")));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.saved.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    pub async fn repository() -> (CatalogRepository, Arc<MemoryStateStorage>) {
        let storage = Arc::new(MemoryStateStorage::default());
        let repo = CatalogRepository::load(storage.clone()).await.unwrap();
        (repo, storage)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::memory::repository;
    use super::*;
    use crate::models::catalog::Supplier;

    fn supplier(id: &str, name: &str) -> Supplier {
        Supplier {
            id: id.into(),
            name: name.into(),
            contact_name: None,
            phone: None,
            email: None,
            active: true,
            created_at: chrono::Utc::now(),
        }
    }

    async fn put(repo: &CatalogRepository, s: Supplier) -> Result<(), AppError> {
        repo.mutate(|state| {
            state.upsert(s);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn every_mutation_persists_the_document() {
        let (repo, storage) = repository().await;
        put(&repo, supplier("s1", "Polpas do Pará")).await.unwrap();
        put(&repo, supplier("s2", "Embalagens BH")).await.unwrap();
        repo.delete::<Supplier>("s1").await.unwrap();

        assert_eq!(storage.saves.load(Ordering::SeqCst), 3);
        let saved = storage.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.suppliers.len(), 1);
        assert_eq!(saved.suppliers[0].id, "s2");
    }

    #[tokio::test]
    async fn failed_save_leaves_state_untouched() {
        let (repo, storage) = repository().await;
        put(&repo, supplier("s1", "Polpas do Pará")).await.unwrap();

        storage.fail_next.store(true, Ordering::SeqCst);
        assert!(put(&repo, supplier("s2", "Embalagens BH")).await.is_err());
        assert_eq!(repo.list::<Supplier>().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let (repo, storage) = repository().await;
        assert!(matches!(
            repo.get::<Supplier>("nope").await,
            Err(AppError::NotFound { entity: "supplier", .. })
        ));
        assert!(repo.delete::<Supplier>("nope").await.is_err());
        assert_eq!(storage.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reload_restores_saved_document() {
        let (repo, storage) = repository().await;
        put(&repo, supplier("s1", "Polpas do Pará")).await.unwrap();

        let reloaded = CatalogRepository::load(storage).await.unwrap();
        assert_eq!(reloaded.get::<Supplier>("s1").await.unwrap().name, "Polpas do Pará");
    }
}
