use std::sync::Arc;

use booking::domain::{Booking, BookingRequest, BookingStatus};
use booking::errors::BookingError;
use booking::repository::mock::MockBookingRepository;
use booking::service::BookingService;
use chrono::{DateTime, Duration, Utc};

fn setup() -> (Arc<MockBookingRepository>, BookingService<MockBookingRepository>) {
    let repo = Arc::new(MockBookingRepository::default());
    let svc = BookingService::new(repo.clone());
    (repo, svc)
}

fn window(start_h: i64, end_h: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    (now + Duration::hours(start_h), now + Duration::hours(end_h))
}

async fn make_booking(
    svc: &BookingService<MockBookingRepository>,
    booker_id: i64,
    item_id: i64,
    start_h: i64,
    end_h: i64,
) -> Booking {
    let (start, end) = window(start_h, end_h);
    svc.add_booking(
        booker_id,
        BookingRequest {
            item_id,
            start,
            end,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn booking_an_available_item_starts_waiting() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);

    let booking = make_booking(&svc, booker.id, drill.id, 1, 24).await;
    assert!(booking.id > 0);
    assert_eq!(booking.status, BookingStatus::Waiting);
    assert_eq!(booking.item_id, drill.id);
    assert_eq!(booking.booker_id, booker.id);
}

#[tokio::test]
async fn degenerate_intervals_are_rejected() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);

    let (start, end) = window(24, 1);
    let err = svc
        .add_booking(booker.id, BookingRequest { item_id: drill.id, start, end })
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::InvalidInterval);

    // equal timestamps are rejected too, not merely inverted ones
    let (start, _) = window(1, 24);
    let err = svc
        .add_booking(booker.id, BookingRequest { item_id: drill.id, start, end: start })
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::InvalidInterval);
}

#[tokio::test]
async fn booking_your_own_item_is_forbidden() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let drill = repo.add_item(owner.id, "drill", true);

    let (start, end) = window(1, 24);
    let err = svc
        .add_booking(owner.id, BookingRequest { item_id: drill.id, start, end })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Forbidden(_)));
}

#[tokio::test]
async fn booking_an_unavailable_item_fails() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let broken_saw = repo.add_item(owner.id, "saw", false);

    let (start, end) = window(1, 24);
    let err = svc
        .add_booking(booker.id, BookingRequest { item_id: broken_saw.id, start, end })
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::ItemUnavailable);
}

#[tokio::test]
async fn missing_user_or_item_is_not_found() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);

    let (start, end) = window(1, 24);
    let err = svc
        .add_booking(9999, BookingRequest { item_id: drill.id, start, end })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    let err = svc
        .add_booking(booker.id, BookingRequest { item_id: 9999, start, end })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn owner_approves_once_second_approval_fails() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);
    let booking = make_booking(&svc, booker.id, drill.id, 1, 24).await;

    let approved = svc.decide(booking.id, owner.id, true).await.unwrap();
    assert_eq!(approved.status, BookingStatus::Approved);

    let err = svc.decide(booking.id, owner.id, true).await.unwrap_err();
    assert_eq!(err, BookingError::InvalidTransition);
}

#[tokio::test]
async fn rejection_overwrites_any_prior_status() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);
    let booking = make_booking(&svc, booker.id, drill.id, 1, 24).await;

    let approved = svc.decide(booking.id, owner.id, true).await.unwrap();
    assert_eq!(approved.status, BookingStatus::Approved);

    // rejection carries no duplicate guard, even against APPROVED
    let rejected = svc.decide(booking.id, owner.id, false).await.unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);

    let rejected_again = svc.decide(booking.id, owner.id, false).await.unwrap();
    assert_eq!(rejected_again.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn only_the_owner_may_decide() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let stranger = repo.add_user("clara@example.com", "Clara");
    let drill = repo.add_item(owner.id, "drill", true);
    let booking = make_booking(&svc, booker.id, drill.id, 1, 24).await;

    for user in [booker.id, stranger.id] {
        let err = svc.decide(booking.id, user, true).await.unwrap_err();
        assert!(matches!(err, BookingError::Forbidden(_)));
    }
    // still undecided afterwards
    let fetched = svc.get_booking(booking.id, owner.id).await.unwrap();
    assert_eq!(fetched.status, BookingStatus::Waiting);
}

#[tokio::test]
async fn booking_is_visible_to_its_parties_only() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let stranger = repo.add_user("clara@example.com", "Clara");
    let drill = repo.add_item(owner.id, "drill", true);
    let booking = make_booking(&svc, booker.id, drill.id, 1, 24).await;

    assert!(svc.get_booking(booking.id, booker.id).await.is_ok());
    assert!(svc.get_booking(booking.id, owner.id).await.is_ok());
    let err = svc.get_booking(booking.id, stranger.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Forbidden(_)));

    let err = svc.get_booking(booking.id, 9999).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
    let err = svc.get_booking(9999, booker.id).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn temporal_buckets_partition_a_bookers_history() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);

    // add_booking validates against "now", so seed the past booking
    // directly through the repository
    use booking::domain::NewBooking;
    use booking::repository::BookingRepository;
    let (past_start, past_end) = window(-48, -24);
    let past = repo
        .insert_booking(NewBooking {
            item_id: drill.id,
            booker_id: booker.id,
            start: past_start,
            end: past_end,
        })
        .await
        .unwrap();
    let (cur_start, cur_end) = window(-1, 3);
    let current = repo
        .insert_booking(NewBooking {
            item_id: drill.id,
            booker_id: booker.id,
            start: cur_start,
            end: cur_end,
        })
        .await
        .unwrap();
    let future = make_booking(&svc, booker.id, drill.id, 24, 48).await;

    let past_list = svc.list_for_booker(booker.id, "PAST", 1, 20).await.unwrap();
    assert_eq!(past_list.iter().map(|b| b.id).collect::<Vec<_>>(), vec![past.id]);

    let current_list = svc.list_for_booker(booker.id, "CURRENT", 1, 20).await.unwrap();
    assert_eq!(
        current_list.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![current.id]
    );

    let future_list = svc.list_for_booker(booker.id, "FUTURE", 1, 20).await.unwrap();
    assert_eq!(
        future_list.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![future.id]
    );

    let all = svc.list_for_booker(booker.id, "ALL", 1, 20).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn status_buckets_select_waiting_and_rejected() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);
    let saw = repo.add_item(owner.id, "saw", true);

    let waiting = make_booking(&svc, booker.id, drill.id, 1, 4).await;
    let rejected = make_booking(&svc, booker.id, saw.id, 5, 8).await;
    svc.decide(rejected.id, owner.id, false).await.unwrap();

    let waiting_list = svc.list_for_booker(booker.id, "WAITING", 1, 20).await.unwrap();
    assert_eq!(
        waiting_list.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![waiting.id]
    );

    let rejected_list = svc.list_for_booker(booker.id, "REJECTED", 1, 20).await.unwrap();
    assert_eq!(
        rejected_list.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![rejected.id]
    );
}

#[tokio::test]
async fn owner_listing_covers_all_owned_items() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let other = repo.add_user("dmitri@example.com", "Dmitri");
    let drill = repo.add_item(owner.id, "drill", true);
    let saw = repo.add_item(other.id, "saw", true);

    make_booking(&svc, booker.id, drill.id, 1, 4).await;
    make_booking(&svc, booker.id, saw.id, 1, 4).await;

    let owned = svc.list_for_owner(owner.id, "ALL", 1, 20).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].item_id, drill.id);

    // the booker side sees both
    let booked = svc.list_for_booker(booker.id, "ALL", 1, 20).await.unwrap();
    assert_eq!(booked.len(), 2);
}

#[tokio::test]
async fn unknown_state_string_is_an_error() {
    let (repo, svc) = setup();
    let booker = repo.add_user("boris@example.com", "Boris");

    let err = svc
        .list_for_booker(booker.id, "UNSUPPORTED_STATUS", 1, 20)
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::InvalidState("UNSUPPORTED_STATUS".into()));

    let err = svc.list_for_owner(booker.id, "current", 1, 20).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));
}

#[tokio::test]
async fn listing_for_a_missing_user_is_not_found() {
    let (_repo, svc) = setup();
    let err = svc.list_for_booker(9999, "ALL", 1, 20).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
    let err = svc.list_for_owner(9999, "ALL", 1, 20).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn item_timeline_and_comment_gate_lookups() {
    let (repo, svc) = setup();
    let owner = repo.add_user("anna@example.com", "Anna");
    let booker = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(owner.id, "drill", true);

    use booking::domain::NewBooking;
    use booking::repository::BookingRepository;
    let (past_start, past_end) = window(-72, -48);
    let past = repo
        .insert_booking(NewBooking {
            item_id: drill.id,
            booker_id: booker.id,
            start: past_start,
            end: past_end,
        })
        .await
        .unwrap();
    let upcoming = make_booking(&svc, booker.id, drill.id, 24, 48).await;

    let last = svc.last_booking_for_item(drill.id).await.unwrap().unwrap();
    assert_eq!(last.id, past.id);
    let next = svc.next_booking_for_item(drill.id).await.unwrap().unwrap();
    assert_eq!(next.id, upcoming.id);

    // only a finished booking unlocks commenting
    let gate = svc
        .last_completed_booking(booker.id, drill.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gate.id, past.id);
    assert!(svc
        .last_completed_booking(owner.id, drill.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn full_lifecycle_scenario() {
    // Anna owns a drill; Boris books it for tomorrow; Anna approves once,
    // a second approval is refused.
    let (repo, svc) = setup();
    let anna = repo.add_user("anna@example.com", "Anna");
    let boris = repo.add_user("boris@example.com", "Boris");
    let drill = repo.add_item(anna.id, "drill", true);

    let booking = make_booking(&svc, boris.id, drill.id, 1, 24).await;
    assert_eq!(booking.status, BookingStatus::Waiting);

    let approved = svc.decide(booking.id, anna.id, true).await.unwrap();
    assert_eq!(approved.status, BookingStatus::Approved);

    let err = svc.decide(booking.id, anna.id, true).await.unwrap_err();
    assert_eq!(err, BookingError::InvalidTransition);
}
