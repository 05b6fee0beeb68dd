use lunchpick_core::db::open_db_in_memory;
use lunchpick_core::{
    AdminCapability, AdminGate, LunchError, PickerConfig, RepoError, RepoResult, Restaurant,
    RestaurantId, RestaurantRepository, SelectionService, SqliteRestaurantRepository, StateError,
    MS_PER_DAY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use std::collections::HashSet;

const NOW: i64 = 1_760_000_000_000;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn admin() -> AdminCapability {
    AdminGate::new(Some("test-admin".to_string()))
        .unlock("test-admin")
        .unwrap()
}

fn insert(conn: &Connection, name: &str, last_selected_at: Option<i64>) -> Restaurant {
    let repo = SqliteRestaurantRepository::try_new(conn).unwrap();
    let mut restaurant = Restaurant::new(name, NOW - 100 * MS_PER_DAY);
    restaurant.last_selected_at = last_selected_at;
    repo.create_restaurant(&restaurant).unwrap();
    restaurant
}

fn selection(conn: &Connection) -> SelectionService<SqliteRestaurantRepository<'_>> {
    SelectionService::new(SqliteRestaurantRepository::try_new(conn).unwrap())
}

#[test]
fn selects_only_restaurants_out_of_cooldown() {
    let conn = setup();
    let old = insert(&conn, "Forty Days", Some(NOW - 40 * MS_PER_DAY));
    insert(&conn, "Twenty Days", Some(NOW - 20 * MS_PER_DAY));
    let service = selection(&conn);
    let admin = admin();

    let mut rng = StdRng::seed_from_u64(1);
    let winner = service
        .select_random_at(&admin, 30, NOW, &mut rng)
        .unwrap()
        .expect("one restaurant is eligible");
    assert_eq!(winner.id, old.id);
    assert_eq!(winner.last_selected_at, Some(NOW));
}

#[test]
fn selection_is_persisted_before_returning() {
    let conn = setup();
    let restaurant = insert(&conn, "Never Picked", None);
    let service = selection(&conn);

    let mut rng = StdRng::seed_from_u64(2);
    service
        .select_random_at(&admin(), 30, NOW, &mut rng)
        .unwrap()
        .expect("never-picked restaurant is eligible");

    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();
    let stored = repo.get_restaurant(restaurant.id).unwrap().unwrap();
    assert_eq!(stored.last_selected_at, Some(NOW));
}

#[test]
fn all_ineligible_returns_none_and_writes_nothing() {
    let conn = setup();
    let a = insert(&conn, "A", Some(NOW - MS_PER_DAY));
    let b = insert(&conn, "B", Some(NOW - 29 * MS_PER_DAY));
    let service = selection(&conn);

    let mut rng = StdRng::seed_from_u64(3);
    let result = service.select_random_at(&admin(), 30, NOW, &mut rng).unwrap();
    assert!(result.is_none());

    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.get_restaurant(a.id).unwrap().unwrap().last_selected_at,
        a.last_selected_at
    );
    assert_eq!(
        repo.get_restaurant(b.id).unwrap().unwrap().last_selected_at,
        b.last_selected_at
    );
}

#[test]
fn empty_list_returns_none() {
    let conn = setup();
    let service = selection(&conn);
    let mut rng = StdRng::seed_from_u64(4);
    assert!(service
        .select_random_at(&admin(), 30, NOW, &mut rng)
        .unwrap()
        .is_none());
}

#[test]
fn pick_lunch_reports_no_eligible_candidates() {
    let conn = setup();
    insert(&conn, "Just Picked", Some(lunchpick_core::model::now_epoch_ms()));
    let service = selection(&conn);

    let mut rng = StdRng::seed_from_u64(5);
    let err = service.pick_lunch(&admin(), 30, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        LunchError::State(StateError::NoEligibleCandidates)
    ));
}

#[test]
fn inactive_restaurants_are_still_candidates() {
    let conn = setup();
    let mut inactive = Restaurant::new("Inactive", NOW);
    inactive.is_active = false;
    SqliteRestaurantRepository::try_new(&conn)
        .unwrap()
        .create_restaurant(&inactive)
        .unwrap();
    let service = selection(&conn);

    let mut rng = StdRng::seed_from_u64(6);
    let winner = service
        .select_random_at(&admin(), 30, NOW, &mut rng)
        .unwrap()
        .expect("inactive restaurant is not filtered by selection");
    assert_eq!(winner.id, inactive.id);
}

#[test]
fn repeated_selection_rotates_through_every_restaurant() {
    let conn = setup();
    let ids: HashSet<RestaurantId> = ["A", "B", "C", "D"]
        .iter()
        .map(|name| insert(&conn, name, None).id)
        .collect();
    let service = selection(&conn);
    let admin = admin();
    let mut rng = StdRng::seed_from_u64(7);

    let mut picked = HashSet::new();
    for day in 0..4 {
        let winner = service
            .select_random_at(&admin, 30, NOW + day * MS_PER_DAY, &mut rng)
            .unwrap()
            .expect("an unpicked restaurant remains");
        assert!(picked.insert(winner.id), "restaurant picked twice in cooldown");
    }
    assert_eq!(picked, ids);

    assert!(service
        .select_random_at(&admin, 30, NOW + 4 * MS_PER_DAY, &mut rng)
        .unwrap()
        .is_none());
}

#[test]
fn reset_cooldown_makes_restaurant_eligible_again() {
    let conn = setup();
    let restaurant = insert(&conn, "Recent", Some(NOW - MS_PER_DAY));
    let service = selection(&conn);
    let admin = admin();
    let mut rng = StdRng::seed_from_u64(8);

    assert!(service
        .select_random_at(&admin, 30, NOW, &mut rng)
        .unwrap()
        .is_none());

    service.reset_cooldown(&admin, restaurant.id).unwrap();
    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();
    assert!(repo
        .get_restaurant(restaurant.id)
        .unwrap()
        .unwrap()
        .last_selected_at
        .is_none());

    let winner = service
        .select_random_at(&admin, 30, NOW, &mut rng)
        .unwrap()
        .expect("reset restaurant is eligible");
    assert_eq!(winner.id, restaurant.id);
}

#[test]
fn reset_cooldown_on_missing_restaurant_is_not_found() {
    let conn = setup();
    let service = selection(&conn);
    let err = service
        .reset_cooldown(&admin(), uuid::Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, LunchError::NotFound(_)));
}

#[test]
fn default_cooldown_comes_from_config() {
    let conn = setup();
    let restaurant = insert(
        &conn,
        "Two Days Ago",
        Some(lunchpick_core::model::now_epoch_ms() - 2 * MS_PER_DAY),
    );
    let config = PickerConfig {
        cooldown_days: 1,
        ..PickerConfig::default()
    };
    let service =
        SelectionService::with_config(SqliteRestaurantRepository::try_new(&conn).unwrap(), &config);

    let mut rng = StdRng::seed_from_u64(9);
    let winner = service
        .select_with_default_cooldown(&admin(), &mut rng)
        .unwrap()
        .expect("one-day cooldown has elapsed");
    assert_eq!(winner.id, restaurant.id);
}

#[test]
fn compare_and_swap_rejects_stale_expectation() {
    let conn = setup();
    let restaurant = insert(&conn, "Contested", None);
    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();

    assert!(repo.mark_selected(restaurant.id, None, NOW).unwrap());
    assert!(!repo.mark_selected(restaurant.id, None, NOW + 1).unwrap());
    assert!(repo
        .mark_selected(restaurant.id, Some(NOW), NOW + 2)
        .unwrap());
}

/// Serves a list snapshot taken before another session's write.
struct StaleListRepository<'conn> {
    inner: SqliteRestaurantRepository<'conn>,
    snapshot: Vec<Restaurant>,
}

impl RestaurantRepository for StaleListRepository<'_> {
    fn create_restaurant(&self, restaurant: &Restaurant) -> RepoResult<RestaurantId> {
        self.inner.create_restaurant(restaurant)
    }
    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>> {
        self.inner.get_restaurant(id)
    }
    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        Ok(self.snapshot.clone())
    }
    fn update_note(&self, id: RestaurantId, note: Option<&str>) -> RepoResult<()> {
        self.inner.update_note(id, note)
    }
    fn set_active(&self, id: RestaurantId, is_active: bool) -> RepoResult<()> {
        self.inner.set_active(id, is_active)
    }
    fn mark_selected(
        &self,
        id: RestaurantId,
        expected: Option<i64>,
        selected_at: i64,
    ) -> RepoResult<bool> {
        self.inner.mark_selected(id, expected, selected_at)
    }
    fn clear_last_selected(&self, id: RestaurantId) -> RepoResult<()> {
        self.inner.clear_last_selected(id)
    }
    fn rating_count(&self, id: RestaurantId) -> RepoResult<u64> {
        self.inner.rating_count(id)
    }
    fn delete_restaurant(&self, id: RestaurantId) -> RepoResult<u64> {
        self.inner.delete_restaurant(id)
    }
}

#[test]
fn concurrent_selection_of_same_restaurant_is_a_conflict() {
    let conn = setup();
    let restaurant = insert(&conn, "Only Option", None);
    let snapshot = SqliteRestaurantRepository::try_new(&conn)
        .unwrap()
        .list_restaurants()
        .unwrap();

    let mut rng = StdRng::seed_from_u64(10);
    let winner = selection(&conn)
        .select_random_at(&admin(), 30, NOW, &mut rng)
        .unwrap()
        .expect("first session wins");
    assert_eq!(winner.id, restaurant.id);

    let stale = SelectionService::new(StaleListRepository {
        inner: SqliteRestaurantRepository::try_new(&conn).unwrap(),
        snapshot,
    });
    let err = stale
        .select_random_at(&admin(), 30, NOW + 5, &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        LunchError::State(StateError::SelectionConflict(id)) if id == restaurant.id
    ));

    let stored = SqliteRestaurantRepository::try_new(&conn)
        .unwrap()
        .get_restaurant(restaurant.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.last_selected_at, Some(NOW));
}

/// Reads succeed, every write fails.
struct ReadOnlyRepository {
    restaurants: Vec<Restaurant>,
}

impl RestaurantRepository for ReadOnlyRepository {
    fn create_restaurant(&self, _restaurant: &Restaurant) -> RepoResult<RestaurantId> {
        Err(read_only())
    }
    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>> {
        Ok(self.restaurants.iter().find(|r| r.id == id).cloned())
    }
    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        Ok(self.restaurants.clone())
    }
    fn update_note(&self, _id: RestaurantId, _note: Option<&str>) -> RepoResult<()> {
        Err(read_only())
    }
    fn set_active(&self, _id: RestaurantId, _is_active: bool) -> RepoResult<()> {
        Err(read_only())
    }
    fn mark_selected(
        &self,
        _id: RestaurantId,
        _expected: Option<i64>,
        _selected_at: i64,
    ) -> RepoResult<bool> {
        Err(read_only())
    }
    fn clear_last_selected(&self, _id: RestaurantId) -> RepoResult<()> {
        Err(read_only())
    }
    fn rating_count(&self, _id: RestaurantId) -> RepoResult<u64> {
        Ok(0)
    }
    fn delete_restaurant(&self, _id: RestaurantId) -> RepoResult<u64> {
        Err(read_only())
    }
}

fn read_only() -> RepoError {
    RepoError::InvalidData("store is read-only".to_string())
}

#[test]
fn failed_write_reports_no_winner() {
    let service = SelectionService::new(ReadOnlyRepository {
        restaurants: vec![Restaurant::new("Unwritable", NOW)],
    });

    let mut rng = StdRng::seed_from_u64(11);
    let err = service
        .select_random_at(&admin(), 30, NOW, &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        LunchError::Store(RepoError::InvalidData(ref message)) if message == "store is read-only"
    ));
}
