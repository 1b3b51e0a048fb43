use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{Beer, BeerDto, BeerFilter, BeerId, BeerStyle, PageRequest};
use crate::db::repository::{BeerRepository, RepositoryResult};
use crate::db::LocalRepository;
use crate::services::BeerService;

/// Repository decorator that counts read queries, for asserting that cache
/// hits bypass the repository entirely.
struct CountingRepository {
    inner: LocalRepository,
    reads: AtomicUsize,
}

impl CountingRepository {
    fn new() -> Self {
        Self {
            inner: LocalRepository::new(),
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BeerRepository for CountingRepository {
    async fn find_by_id(&self, beer_id: BeerId) -> RepositoryResult<Option<Beer>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(beer_id).await
    }

    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<Beer>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_upc(upc).await
    }

    async fn find_all(
        &self,
        filter: &BeerFilter,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Beer>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all(filter, page).await
    }

    async fn save(&self, beer: Beer) -> RepositoryResult<Beer> {
        self.inner.save(beer).await
    }

    async fn delete_by_id(&self, beer_id: BeerId) -> RepositoryResult<()> {
        self.inner.delete_by_id(beer_id).await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }
}

fn service() -> BeerService {
    BeerService::new(Arc::new(LocalRepository::new()))
}

fn payload(name: &str, style: &str, upc: &str, price: &str) -> BeerDto {
    BeerDto {
        beer_name: Some(name.to_string()),
        beer_style: Some(style.to_string()),
        upc: Some(upc.to_string()),
        price: Some(price.parse().expect("valid decimal")),
        quantity_on_hand: Some(120),
        ..BeerDto::default()
    }
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let service = service();

    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.expect("server-assigned id");

    let fetched = service.get_by_id(id, false).await.unwrap().unwrap();
    assert_eq!(fetched.beer_name.as_deref(), Some("Mango Bobs"));
    assert_eq!(fetched.beer_style.as_deref(), Some("ALE"));
    assert_eq!(fetched.upc.as_deref(), Some("0631234200036"));
    assert_eq!(fetched.price, Some("12.95".parse().unwrap()));
    assert!(fetched.created_date.is_some());
}

#[tokio::test]
async fn test_create_rejects_incomplete_payload() {
    let service = service();
    let err = service.save_new_beer(BeerDto::default()).await.unwrap_err();
    assert!(err.to_string().contains("beerName is required"));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let service = service();
    assert!(service
        .get_by_id(BeerId::new(404), false)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_inventory_shown_only_on_request() {
    let service = service();
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    let plain = service.get_by_id(id, false).await.unwrap().unwrap();
    assert!(plain.quantity_on_hand.is_none());

    let with_inventory = service.get_by_id(id, true).await.unwrap().unwrap();
    assert_eq!(with_inventory.quantity_on_hand, Some(120));
}

#[tokio::test]
async fn test_update_overwrites_and_preserves_identity() {
    let service = service();
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();
    let created_date = service
        .get_by_id(id, false)
        .await
        .unwrap()
        .unwrap()
        .created_date;

    let updated = service
        .update_beer(id, payload("Mango Bobs Reserve", "STOUT", "0631234200099", "14.50"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.beer_name.as_deref(), Some("Mango Bobs Reserve"));
    assert_eq!(updated.beer_style.as_deref(), Some("STOUT"));

    let fetched = service.get_by_id(id, false).await.unwrap().unwrap();
    assert_eq!(fetched.beer_name.as_deref(), Some("Mango Bobs Reserve"));
    assert_eq!(fetched.upc.as_deref(), Some("0631234200099"));
    assert_eq!(fetched.price, Some("14.50".parse().unwrap()));
    assert_eq!(fetched.created_date, created_date);
}

#[tokio::test]
async fn test_update_missing_id_is_none_and_persists_nothing() {
    let service = service();
    let missing = BeerId::new(200);

    let outcome = service
        .update_beer(missing, payload("Ghost", "ALE", "0000000000000", "1.00"))
        .await
        .unwrap();
    assert!(outcome.is_none());

    // Nothing was created by the failed update.
    assert!(service.get_by_id(missing, false).await.unwrap().is_none());
    let list = service
        .list_beers(None, None, PageRequest::new(0, 25), false)
        .await
        .unwrap();
    assert!(list.content.is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let service = service();
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    service.delete_beer_by_id(id).await.unwrap();
    assert!(service.get_by_id(id, false).await.unwrap().is_none());

    // Second delete of the same id must still succeed.
    service.delete_beer_by_id(id).await.unwrap();
}

#[tokio::test]
async fn test_list_pages_and_reports_page_count() {
    let service = service();
    for i in 0..30 {
        service
            .save_new_beer(payload(
                &format!("Beer {:02}", i),
                "LAGER",
                &format!("upc-{:02}", i),
                "8.00",
            ))
            .await
            .unwrap();
    }

    let first = service
        .list_beers(None, None, PageRequest::new(0, 25), false)
        .await
        .unwrap();
    assert_eq!(first.content.len(), 25);
    assert_eq!(first.page_number, 0);
    assert_eq!(first.page_size, 25);
    // total_elements is the page's own row count, not the catalog total.
    assert_eq!(first.total_elements, 25);

    let second = service
        .list_beers(None, None, PageRequest::new(1, 25), false)
        .await
        .unwrap();
    assert_eq!(second.content.len(), 5);
    assert_eq!(second.total_elements, 5);
    assert_eq!(second.content[0].beer_name.as_deref(), Some("Beer 25"));
}

#[tokio::test]
async fn test_list_filters_are_conjunctive() {
    let service = service();
    service
        .save_new_beer(payload("Mango Bobs", "ALE", "upc-1", "12.95"))
        .await
        .unwrap();
    service
        .save_new_beer(payload("Mango Bobs", "STOUT", "upc-2", "13.95"))
        .await
        .unwrap();
    service
        .save_new_beer(payload("Galaxy Cat", "ALE", "upc-3", "11.95"))
        .await
        .unwrap();

    let page = PageRequest::new(0, 25);
    let both = service
        .list_beers(
            Some("Mango Bobs".to_string()),
            Some(BeerStyle::Ale),
            page,
            false,
        )
        .await
        .unwrap();
    assert_eq!(both.content.len(), 1);
    assert_eq!(both.content[0].upc.as_deref(), Some("upc-1"));

    let by_name = service
        .list_beers(Some("Mango Bobs".to_string()), None, page, false)
        .await
        .unwrap();
    assert_eq!(by_name.content.len(), 2);

    let by_style = service
        .list_beers(None, Some(BeerStyle::Ale), page, false)
        .await
        .unwrap();
    assert_eq!(by_style.content.len(), 2);

    let empty = service
        .list_beers(Some("Nobody".to_string()), None, page, false)
        .await
        .unwrap();
    assert!(empty.content.is_empty());
    assert_eq!(empty.total_elements, 0);
}

#[tokio::test]
async fn test_upc_lookup_and_miss() {
    let service = service();
    service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();

    let found = service.get_by_upc("0631234200036").await.unwrap().unwrap();
    assert_eq!(found.beer_name.as_deref(), Some("Mango Bobs"));

    assert!(service.get_by_upc("doesntexistUpc").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upc_cache_serves_repeat_reads() {
    let repo = Arc::new(CountingRepository::new());
    let service = BeerService::new(repo.clone());
    service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();

    let first = service.get_by_upc("0631234200036").await.unwrap();
    let reads_after_first = repo.reads();
    let second = service.get_by_upc("0631234200036").await.unwrap();

    assert_eq!(first, second);
    // The second read was served from the cache.
    assert_eq!(repo.reads(), reads_after_first);
}

#[tokio::test]
async fn test_get_by_id_cached_only_without_inventory() {
    let repo = Arc::new(CountingRepository::new());
    let service = BeerService::new(repo.clone());
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    service.get_by_id(id, false).await.unwrap();
    let baseline = repo.reads();
    service.get_by_id(id, false).await.unwrap();
    assert_eq!(repo.reads(), baseline);

    // Inventory requests bypass the cache in both directions.
    service.get_by_id(id, true).await.unwrap();
    assert_eq!(repo.reads(), baseline + 1);
    service.get_by_id(id, true).await.unwrap();
    assert_eq!(repo.reads(), baseline + 2);
}

#[tokio::test]
async fn test_list_cached_only_without_inventory() {
    let repo = Arc::new(CountingRepository::new());
    let service = BeerService::new(repo.clone());
    service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();

    let page = PageRequest::new(0, 25);
    service.list_beers(None, None, page, false).await.unwrap();
    let baseline = repo.reads();
    service.list_beers(None, None, page, false).await.unwrap();
    assert_eq!(repo.reads(), baseline);

    // A different parameter tuple is a different key.
    service
        .list_beers(None, None, PageRequest::new(1, 25), false)
        .await
        .unwrap();
    assert_eq!(repo.reads(), baseline + 1);

    service.list_beers(None, None, page, true).await.unwrap();
    assert_eq!(repo.reads(), baseline + 2);
}

#[tokio::test]
async fn test_update_invalidates_cached_reads() {
    let service = service();
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    // Prime every cache.
    service.get_by_id(id, false).await.unwrap();
    service.get_by_upc("0631234200036").await.unwrap();
    service
        .list_beers(None, None, PageRequest::new(0, 25), false)
        .await
        .unwrap();

    service
        .update_beer(id, payload("Renamed", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap()
        .unwrap();

    let fetched = service.get_by_id(id, false).await.unwrap().unwrap();
    assert_eq!(fetched.beer_name.as_deref(), Some("Renamed"));
    let by_upc = service.get_by_upc("0631234200036").await.unwrap().unwrap();
    assert_eq!(by_upc.beer_name.as_deref(), Some("Renamed"));
    let list = service
        .list_beers(None, None, PageRequest::new(0, 25), false)
        .await
        .unwrap();
    assert_eq!(list.content[0].beer_name.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn test_delete_invalidates_cached_reads() {
    let service = service();
    let created = service
        .save_new_beer(payload("Mango Bobs", "ALE", "0631234200036", "12.95"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    service.get_by_id(id, false).await.unwrap();
    service.get_by_upc("0631234200036").await.unwrap();

    service.delete_beer_by_id(id).await.unwrap();

    assert!(service.get_by_id(id, false).await.unwrap().is_none());
    assert!(service.get_by_upc("0631234200036").await.unwrap().is_none());
    let list = service
        .list_beers(None, None, PageRequest::new(0, 25), false)
        .await
        .unwrap();
    assert!(list.content.is_empty());
}

#[tokio::test]
async fn test_health_check_delegates_to_repository() {
    let service = service();
    assert!(service.health_check().await.unwrap());
}
