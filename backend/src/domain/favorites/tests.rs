//! Behaviour of the favourites synchronizer against scripted backends.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tokio::sync::watch;

use super::*;
use crate::domain::ports::MockMarketplaceApi;
use crate::domain::{Gig, GigCategory, NewGig, Price, Profile, UserName};
use crate::test_support::{HeldCall, Release, ScriptedMarketplace, yield_until};

fn gig(raw: &str) -> GigId {
    GigId::new(raw).expect("valid gig id")
}

fn user_id(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

fn user(raw_id: &str, name: &str) -> User {
    User::new(
        user_id(raw_id),
        UserName::new(name).expect("valid name"),
        Profile::Customer,
    )
}

#[fixture]
fn samuel() -> UserId {
    user_id("user-3")
}

async fn ready_sync(
    backend: ScriptedMarketplace,
    user: &UserId,
) -> (Arc<ScriptedMarketplace>, Arc<FavoritesSynchronizer<ScriptedMarketplace>>) {
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));
    sync.activate(Some(user.clone())).await;
    assert_eq!(sync.phase(), FavoritesPhase::Ready);
    (backend, sync)
}

#[rstest]
#[tokio::test]
async fn activation_loads_the_users_favourites(samuel: UserId) {
    let backend = ScriptedMarketplace::new().with_favorites(&samuel, &[gig("gig-2")]);
    let (_backend, sync) = ready_sync(backend, &samuel).await;

    assert!(sync.is_favorite(&gig("gig-2")));
    assert!(!sync.is_favorite(&gig("gig-1")));
    assert_eq!(sync.user_id(), Some(samuel));
}

#[rstest]
#[tokio::test]
async fn signed_out_session_is_empty_and_ignores_commands() {
    let backend = Arc::new(ScriptedMarketplace::new());
    let sync = FavoritesSynchronizer::new(Arc::clone(&backend));
    assert_eq!(sync.phase(), FavoritesPhase::Uninitialized);

    sync.activate(None).await;
    sync.add(&gig("gig-1")).await;

    assert_eq!(sync.phase(), FavoritesPhase::Empty);
    assert!(sync.favorite_ids().is_empty());
}

#[rstest]
#[tokio::test]
async fn add_is_visible_before_the_call_resolves(samuel: UserId) {
    let backend = ScriptedMarketplace::new().holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let loading = tokio::spawn({
        let sync = Arc::clone(&sync);
        let samuel = samuel.clone();
        async move { sync.activate(Some(samuel)).await }
    });
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    assert!(sync.is_loading());
    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    loading.await.expect("load task");

    let adding = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.add(&gig("gig-1")).await }
    });
    let call = HeldCall::Add(samuel.clone(), gig("gig-1"));
    backend.wait_for(&call).await;

    assert!(sync.is_favorite(&gig("gig-1")));
    assert!(backend.server_favorites(&samuel).is_empty());

    backend.release(&call, Release::Succeed);
    adding.await.expect("add task");
    assert!(sync.is_favorite(&gig("gig-1")));
    assert_eq!(backend.server_favorites(&samuel), vec![gig("gig-1")]);
}

#[rstest]
#[tokio::test]
async fn failed_add_rolls_back(samuel: UserId) {
    let (backend, sync) = ready_sync(ScriptedMarketplace::new(), &samuel).await;
    backend.fail_writes_for(&gig("gig-1"));

    sync.add(&gig("gig-1")).await;

    assert!(!sync.is_favorite(&gig("gig-1")));
    assert!(backend.server_favorites(&samuel).is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_remove_restores_the_favourite(samuel: UserId) {
    let backend = ScriptedMarketplace::new().with_favorites(&samuel, &[gig("gig-4")]);
    let (backend, sync) = ready_sync(backend, &samuel).await;
    backend.fail_writes_for(&gig("gig-4"));

    sync.remove(&gig("gig-4")).await;

    assert!(sync.is_favorite(&gig("gig-4")));
}

#[rstest]
#[tokio::test]
async fn add_then_remove_leaves_the_set_unchanged(samuel: UserId) {
    let backend = ScriptedMarketplace::new().with_favorites(&samuel, &[gig("gig-2")]);
    let (backend, sync) = ready_sync(backend, &samuel).await;
    let before = sync.favorite_ids();

    sync.add(&gig("gig-1")).await;
    sync.remove(&gig("gig-1")).await;

    assert_eq!(sync.favorite_ids(), before);
    assert_eq!(backend.server_favorites(&samuel), before);
}

#[rstest]
#[tokio::test]
async fn repeated_add_does_not_duplicate(samuel: UserId) {
    let (backend, sync) = ready_sync(ScriptedMarketplace::new(), &samuel).await;

    sync.add(&gig("gig-1")).await;
    sync.add(&gig("gig-1")).await;

    assert_eq!(sync.favorite_ids(), vec![gig("gig-1")]);
    assert_eq!(backend.server_favorites(&samuel), vec![gig("gig-1")]);
}

#[rstest]
#[tokio::test]
async fn racing_toggles_keep_the_latest_intent(samuel: UserId) {
    let backend = ScriptedMarketplace::new().holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let loading = tokio::spawn({
        let sync = Arc::clone(&sync);
        let samuel = samuel.clone();
        async move { sync.activate(Some(samuel)).await }
    });
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    loading.await.expect("load task");

    let add = HeldCall::Add(samuel.clone(), gig("gig-1"));
    let remove = HeldCall::Remove(samuel.clone(), gig("gig-1"));
    let first = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.add(&gig("gig-1")).await }
    });
    backend.wait_for(&add).await;
    let second = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.remove(&gig("gig-1")).await }
    });
    backend.wait_for(&remove).await;
    let third = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.add(&gig("gig-1")).await }
    });
    yield_until(|| sync.is_favorite(&gig("gig-1"))).await;

    // The first add fails after the user has already toggled twice more.
    backend.release(&add, Release::Fail);
    first.await.expect("first toggle");
    assert!(sync.is_favorite(&gig("gig-1")));

    backend.release(&remove, Release::Succeed);
    second.await.expect("second toggle");
    backend.wait_for(&add).await;
    backend.release(&add, Release::Succeed);
    third.await.expect("third toggle");

    assert!(sync.is_favorite(&gig("gig-1")));
    assert_eq!(backend.server_favorites(&samuel), vec![gig("gig-1")]);
}

#[rstest]
#[tokio::test]
async fn stale_load_never_populates_the_next_session() {
    let alice = user_id("user-a");
    let bruno = user_id("user-b");
    let backend = ScriptedMarketplace::new()
        .with_favorites(&alice, &[gig("gig-1")])
        .with_favorites(&bruno, &[gig("gig-3")])
        .holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let first = tokio::spawn({
        let sync = Arc::clone(&sync);
        let alice = alice.clone();
        async move { sync.activate(Some(alice)).await }
    });
    backend.wait_for(&HeldCall::Load(alice.clone())).await;
    let second = tokio::spawn({
        let sync = Arc::clone(&sync);
        let bruno = bruno.clone();
        async move { sync.activate(Some(bruno)).await }
    });
    backend.wait_for(&HeldCall::Load(bruno.clone())).await;

    backend.release(&HeldCall::Load(bruno.clone()), Release::Succeed);
    second.await.expect("second load");
    backend.release(&HeldCall::Load(alice.clone()), Release::Succeed);
    first.await.expect("first load");

    assert_eq!(sync.favorite_ids(), vec![gig("gig-3")]);
    assert!(!sync.is_favorite(&gig("gig-1")));
}

#[rstest]
#[tokio::test]
async fn sign_out_during_load_stays_empty(samuel: UserId) {
    let backend = ScriptedMarketplace::new()
        .with_favorites(&samuel, &[gig("gig-2")])
        .holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let loading = tokio::spawn({
        let sync = Arc::clone(&sync);
        let samuel = samuel.clone();
        async move { sync.activate(Some(samuel)).await }
    });
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    assert!(sync.is_loading());

    sync.activate(None).await;
    assert_eq!(sync.phase(), FavoritesPhase::Empty);

    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    loading.await.expect("load task");

    assert_eq!(sync.phase(), FavoritesPhase::Empty);
    assert!(sync.favorite_ids().is_empty());
    assert_eq!(sync.user_id(), None);
}

#[rstest]
#[tokio::test]
async fn abandoned_add_rolls_back(samuel: UserId) {
    let backend = ScriptedMarketplace::new().holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let loading = tokio::spawn({
        let sync = Arc::clone(&sync);
        let samuel = samuel.clone();
        async move { sync.activate(Some(samuel)).await }
    });
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    loading.await.expect("load task");

    let adding = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.add(&gig("gig-1")).await }
    });
    backend
        .wait_for(&HeldCall::Add(samuel.clone(), gig("gig-1")))
        .await;
    assert!(sync.is_favorite(&gig("gig-1")));

    adding.abort();
    let joined = adding.await;
    assert!(joined.is_err_and(|error| error.is_cancelled()));

    assert!(!sync.is_favorite(&gig("gig-1")));
    assert!(backend.server_favorites(&samuel).is_empty());
}

#[rstest]
#[tokio::test]
async fn write_from_previous_session_does_not_leak(samuel: UserId) {
    let other = user_id("user-9");
    let backend = ScriptedMarketplace::new().holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));

    let loading = tokio::spawn({
        let sync = Arc::clone(&sync);
        let samuel = samuel.clone();
        async move { sync.activate(Some(samuel)).await }
    });
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    loading.await.expect("load task");

    let add = HeldCall::Add(samuel.clone(), gig("gig-1"));
    let adding = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.add(&gig("gig-1")).await }
    });
    backend.wait_for(&add).await;

    let switching = tokio::spawn({
        let sync = Arc::clone(&sync);
        let other = other.clone();
        async move { sync.activate(Some(other)).await }
    });
    backend.wait_for(&HeldCall::Load(other.clone())).await;
    backend.release(&HeldCall::Load(other.clone()), Release::Succeed);
    switching.await.expect("switch task");

    backend.release(&add, Release::Fail);
    adding.await.expect("add task");

    assert_eq!(sync.user_id(), Some(other));
    assert!(sync.favorite_ids().is_empty());
}

#[rstest]
#[tokio::test]
async fn follow_tracks_session_changes(samuel: UserId) {
    let other = user_id("user-9");
    let backend = ScriptedMarketplace::new()
        .with_favorites(&samuel, &[gig("gig-1")])
        .with_favorites(&other, &[gig("gig-2")])
        .holding();
    let backend = Arc::new(backend);
    let sync = Arc::new(FavoritesSynchronizer::new(Arc::clone(&backend)));
    let (session, receiver) = watch::channel(Some(user("user-3", "Samuel")));

    let following = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.follow(receiver).await }
    });

    // Switch users while the first load is still parked.
    backend.wait_for(&HeldCall::Load(samuel.clone())).await;
    session.send_replace(Some(user("user-9", "Nadia")));
    backend.wait_for(&HeldCall::Load(other.clone())).await;
    backend.release(&HeldCall::Load(other.clone()), Release::Succeed);
    yield_until(|| sync.phase() == FavoritesPhase::Ready).await;
    assert_eq!(sync.favorite_ids(), vec![gig("gig-2")]);

    // The abandoned load resolving late changes nothing.
    backend.release(&HeldCall::Load(samuel.clone()), Release::Succeed);
    tokio::task::yield_now().await;
    assert_eq!(sync.favorite_ids(), vec![gig("gig-2")]);

    session.send_replace(None);
    yield_until(|| sync.phase() == FavoritesPhase::Empty).await;
    assert!(sync.favorite_ids().is_empty());

    drop(session);
    following.await.expect("follow task ends with the session");
}

#[rstest]
#[tokio::test]
async fn favourite_gigs_resolve_through_the_api(samuel: UserId) {
    let mut api = MockMarketplaceApi::new();
    api.expect_favorites()
        .returning(|_| Ok(vec![GigId::new("gig-4").expect("valid gig id")]));
    api.expect_gigs_by_ids()
        .withf(|ids| ids.len() == 1 && ids[0].as_str() == "gig-4")
        .times(1)
        .returning(|ids| {
            let new_gig = NewGig {
                title: "Authentic Haitian Cuisine Catering".to_owned(),
                category: GigCategory::Cooking,
                price: Price::new(rust_decimal_macros::dec!(150)).expect("valid price"),
                description: "Catering".to_owned(),
                eta: "1 day notice".to_owned(),
                distance: "5km away".to_owned(),
                image: "https://picsum.photos/seed/cooking/400/300".to_owned(),
            };
            let gig = Gig::from_new(
                ids[0].clone(),
                UserId::new("user-2").expect("valid user id"),
                new_gig,
            );
            Ok(vec![GigListing { gig, worker: None }])
        });
    let sync = FavoritesSynchronizer::new(Arc::new(api));
    sync.activate(Some(samuel)).await;

    let listings = sync.favorite_gigs().await;

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].gig.id.as_str(), "gig-4");
}

#[rstest]
#[tokio::test]
async fn favourite_gigs_skip_the_lookup_when_empty(samuel: UserId) {
    let mut api = MockMarketplaceApi::new();
    api.expect_favorites().returning(|_| Ok(Vec::new()));
    api.expect_gigs_by_ids().times(0);
    let sync = FavoritesSynchronizer::new(Arc::new(api));
    sync.activate(Some(samuel)).await;

    assert!(sync.favorite_gigs().await.is_empty());
}
