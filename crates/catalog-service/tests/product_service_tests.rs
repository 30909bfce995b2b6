mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use catalog_service::model::{EntityRef, QR_PREFIX, UpdateProductRequest};
use catalog_service::store::MemoryProductStore;
use catalog_service::{CatalogError, ProductService, RemoteTopicLookup, RequestContext};
use common::*;
use mockito::{Server, ServerGuard};
use service_registry::{PeerBinding, ServiceInfo, ServiceStatus};

fn ctx() -> RequestContext {
    RequestContext::with_credential("secret")
}

fn binding_for(server: &ServerGuard) -> Arc<PeerBinding> {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.split_once(':').unwrap();
    let instance = ServiceInfo::new("media-service", "m1", host, port.parse().unwrap()).with_status(ServiceStatus::Healthy);
    Arc::new(PeerBinding::resolved(instance, gateway()))
}

#[tokio::test]
async fn test_create_then_read_round_trip() {
    let topics = Arc::new(StaticTopics::default().with(TOPIC_ID, "Sale"));
    let service = service_with(topics, Arc::new(FakeImages::default())).await;

    let id = service.create(create_request()).await.unwrap();
    let view = service.get(&ctx(), &id).await.unwrap();

    assert_eq!(view.id, id);
    assert_eq!(view.qrcode, format!("{}{}", QR_PREFIX, id));
    assert_eq!(view.product_name, "Jasmine tea");
    assert_eq!(view.original_price_store, 12.5);
    assert_eq!(view.original_price_service, 15.0);
    assert_eq!(view.product_description, "loose leaf");
    assert_eq!(view.topic, EntityRef::new(TOPIC_ID, "Sale"));
    assert_eq!(view.folder, EntityRef::new(FOLDER_ID, "Drinks"));
    assert_eq!(view.cover_image, "https://cdn.test/IMG1");
    assert_eq!(view.created_at, view.updated_at);
}

#[tokio::test]
async fn test_create_validation() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;

    let mut req = create_request();
    req.product_name = String::new();
    assert!(matches!(service.create(req).await, Err(CatalogError::Validation(_))));

    let mut req = create_request();
    req.original_price_store = 0.0;
    assert!(matches!(service.create(req).await, Err(CatalogError::Validation(_))));

    let mut req = create_request();
    req.original_price_service = 0.0;
    assert!(matches!(service.create(req).await, Err(CatalogError::Validation(_))));

    let mut req = create_request();
    req.cover_image = " ".to_string();
    assert!(matches!(service.create(req).await, Err(CatalogError::Validation(_))));

    let mut req = create_request();
    req.topic_id = String::new();
    assert!(matches!(service.create(req).await, Err(CatalogError::Validation(_))));

    let mut req = create_request();
    req.folder_id = "F1".to_string();
    assert!(matches!(service.create(req).await, Err(CatalogError::InvalidId(id)) if id == "F1"));

    let mut req = create_request();
    req.topic_id = "T1".to_string();
    assert!(matches!(service.create(req).await, Err(CatalogError::InvalidId(_))));

    assert!(service.list(&ctx()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_merges_only_non_empty_fields() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();
    let before = service.get(&ctx(), &id).await.unwrap();

    service
        .update(
            &id,
            UpdateProductRequest {
                original_price_service: 20.0,
                product_description: "first flush".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = service.get(&ctx(), &id).await.unwrap();
    assert_eq!(after.product_name, before.product_name);
    assert_eq!(after.original_price_store, before.original_price_store);
    assert_eq!(after.original_price_service, 20.0);
    assert_eq!(after.product_description, "first flush");
    assert_eq!(after.cover_image, before.cover_image);
    assert_eq!(after.qrcode, before.qrcode);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_update_rejects_bad_foreign_key_and_missing_product() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let bad = UpdateProductRequest {
        folder_id: "not-an-id".to_string(),
        ..Default::default()
    };
    assert!(matches!(service.update(&id, bad).await, Err(CatalogError::InvalidId(_))));

    let missing = "65f1000000000000000000ff";
    let err = service.update(missing, UpdateProductRequest::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_absent_topic_renders_empty_ref() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&ctx(), &id).await.unwrap();
    assert_eq!(view.topic, EntityRef::default());
    assert_eq!(view.folder.name, "Drinks");
}

#[tokio::test]
async fn test_every_enrichment_failing_still_returns_view() {
    let service = ProductService::new(
        Arc::new(MemoryProductStore::new()),
        Arc::new(BrokenFolderStore),
        Arc::new(UnreachableTopics),
        Arc::new(FakeImages::broken(&["IMG1"])),
    );
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&ctx(), &id).await.unwrap();
    assert_eq!(view.topic, EntityRef::default());
    assert_eq!(view.folder, EntityRef::default());
    assert_eq!(view.cover_image, "IMG1");
    assert_eq!(view.product_name, "Jasmine tea");
}

#[tokio::test]
async fn test_missing_credential_degrades_topic_only() {
    let topics = Arc::new(StaticTopics::default().with(TOPIC_ID, "Sale"));
    let service = service_with(topics, Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&RequestContext::anonymous(), &id).await.unwrap();
    assert_eq!(view.topic, EntityRef::default());
    assert_eq!(view.folder.name, "Drinks");
}

#[tokio::test]
async fn test_list_enriches_every_product_in_order() {
    let topics = Arc::new(StaticTopics::default().with(TOPIC_ID, "Sale"));
    let service = service_with(topics.clone(), Arc::new(FakeImages::default()))
        .await
        .with_concurrency(2);

    let mut ids = Vec::new();
    for n in 0..5 {
        let mut req = create_request();
        req.product_name = format!("tea {}", n);
        ids.push(service.create(req).await.unwrap());
    }

    let views = service.list(&ctx()).await.unwrap();
    assert_eq!(views.iter().map(|v| v.id.clone()).collect::<Vec<_>>(), ids);
    assert!(views.iter().all(|v| v.topic.name == "Sale"));
    assert_eq!(topics.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_list_empty_store() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;
    assert_eq!(service.list(&ctx()).await.unwrap(), Vec::new());
}

#[tokio::test]
async fn test_get_errors() {
    let service = service_with(Arc::new(StaticTopics::default()), Arc::new(FakeImages::default())).await;
    assert!(matches!(service.get(&ctx(), "xyz").await, Err(CatalogError::InvalidId(_))));
    assert!(matches!(
        service.get(&ctx(), "65f1000000000000000000ff").await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_malformed_id_never_reaches_store() {
    let store = Arc::new(CountingProductStore::default());
    let service = ProductService::new(
        store.clone(),
        folder_store_with("Drinks").await,
        Arc::new(StaticTopics::default()),
        Arc::new(FakeImages::default()),
    );

    assert!(matches!(service.delete("F1").await, Err(CatalogError::InvalidId(_))));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);

    let id = service.create(create_request()).await.unwrap();
    service.delete(&id).await.unwrap();
    assert!(matches!(service.delete(&id).await, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_remote_topic_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/api/v2/gateway/topics/{}", TOPIC_ID).as_str())
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body(format!(r#"{{"status":200,"data":{{"id":"{}","topic_name":"Sale"}}}}"#, TOPIC_ID))
        .create_async()
        .await;

    let topics = Arc::new(RemoteTopicLookup::new(binding_for(&server)));
    let service = service_with(topics, Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&ctx(), &id).await.unwrap();

    mock.assert_async().await;
    assert_eq!(view.topic, EntityRef::new(TOPIC_ID, "Sale"));
    assert_eq!(view.cover_image, "https://cdn.test/IMG1");
}

#[tokio::test]
async fn test_remote_topic_not_found_is_success_with_empty_topic() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("/api/v2/gateway/topics/{}", TOPIC_ID).as_str())
        .with_status(404)
        .with_body(r#"{"status_code":404}"#)
        .create_async()
        .await;

    let topics = Arc::new(RemoteTopicLookup::new(binding_for(&server)));
    let service = service_with(topics, Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&ctx(), &id).await.unwrap();
    assert_eq!(view.topic, EntityRef::new("", ""));
}

#[tokio::test]
async fn test_unresolved_binding_degrades_topic() {
    let binding = Arc::new(PeerBinding::unresolved("media-service", gateway()));
    let topics = Arc::new(RemoteTopicLookup::new(binding));
    let service = service_with(topics, Arc::new(FakeImages::default())).await;
    let id = service.create(create_request()).await.unwrap();

    let view = service.get(&ctx(), &id).await.unwrap();
    assert_eq!(view.topic, EntityRef::default());
    assert_eq!(view.folder.name, "Drinks");
}
