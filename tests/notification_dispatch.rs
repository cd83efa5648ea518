//! Multi-channel delivery, bulk batching and the notification inbox.

mod helpers;

use std::time::Instant;

use tidewatch_core::error::ErrorKind;
use tidewatch_core::types::UserId;
use tidewatch_entity::notification::{NotificationKind, NotificationPriority, OutboundMessage};
use tidewatch_entity::user::NotificationPreferences;

use helpers::{TestApp, coast, ctx, drain, events_of, north_of_coast};

fn bulletin() -> OutboundMessage {
    OutboundMessage::new(
        NotificationKind::System,
        "Harbour closed",
        "The fishing harbour is closed until further notice.",
    )
}

#[tokio::test]
async fn test_failed_push_does_not_block_email() {
    let app = TestApp::new().await;
    let user = app.resident("mixed@example.com", coast()).await;
    *app.gateway.fail_push.lock().unwrap() = true;

    let notification = app.services.dispatcher.send_to_user(&user, &bulletin()).await.unwrap();

    assert!(notification.channels.push.requested);
    assert!(!notification.channels.push.sent);
    assert!(notification.channels.push.error.is_some());
    assert!(notification.channels.email.sent);
    assert!(notification.channels.email.sent_at.is_some());
    assert!(!notification.channels.sms.requested);

    assert_eq!(app.gateway.calls("push"), 1);
    assert_eq!(app.gateway.calls("email"), 1);
    assert_eq!(app.gateway.calls("sms"), 0);
}

#[tokio::test]
async fn test_sms_only_for_opted_in_users_at_high_priority() {
    let app = TestApp::new().await;
    let user = app.resident("sms@example.com", coast()).await;
    app.services
        .users
        .update_preferences(
            &ctx(&user),
            NotificationPreferences {
                sms: true,
                ..NotificationPreferences::default()
            },
        )
        .await
        .unwrap();

    let routine = app
        .services
        .dispatcher
        .send_to_user_id(&user.id, &bulletin())
        .await
        .unwrap();
    assert!(!routine.channels.sms.requested);

    let urgent = bulletin().with_priority(NotificationPriority::Emergency);
    let urgent = app.services.dispatcher.send_to_user_id(&user.id, &urgent).await.unwrap();
    assert!(urgent.channels.sms.sent);
    assert_eq!(app.gateway.calls("sms"), 1);
}

#[tokio::test]
async fn test_bulk_send_runs_in_batches_and_skips_unknown_users() {
    let app = TestApp::new().await;
    let mut ids = Vec::new();
    for i in 0..250 {
        let user = app
            .resident(&format!("bulk-{i}@example.com"), north_of_coast(i as f64 * 0.1))
            .await;
        ids.push(user.id);
    }

    let began = Instant::now();
    let outcome = app.services.dispatcher.send_bulk(&ids, &bulletin()).await.unwrap();
    assert_eq!(outcome.attempted, 250);
    assert_eq!(outcome.persisted, 250);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.batches, 3);
    assert!(began.elapsed().as_millis() >= 10);

    let outcome = app
        .services
        .dispatcher
        .send_bulk(&[ids[0], UserId::new()], &bulletin())
        .await
        .unwrap();
    assert_eq!(outcome.persisted, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.batches, 1);
}

#[tokio::test]
async fn test_send_to_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .services
        .dispatcher
        .send_to_user_id(&UserId::new(), &bulletin())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_notification_event_reaches_user_room_and_inbox() {
    let app = TestApp::new().await;
    let user = app.resident("inbox@example.com", coast()).await;
    let other = app.resident("other@example.com", coast()).await;
    let (_conn, mut rx) = app.listen(&user, &[]);

    let first = app.services.dispatcher.send_to_user(&user, &bulletin()).await.unwrap();
    app.services.dispatcher.send_to_user(&user, &bulletin()).await.unwrap();

    let frames = drain(&mut rx);
    let events = events_of(&frames, "notification");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["room"], format!("user:{}", user.id));
    assert_eq!(events[0]["payload"]["id"], first.id.to_string());

    let inbox = &app.services.notifications;
    assert_eq!(inbox.unread_count(&ctx(&user)).await.unwrap(), 2);
    let read = inbox.mark_read(&ctx(&user), &first.id).await.unwrap();
    assert!(read.is_read);
    assert_eq!(inbox.unread_count(&ctx(&user)).await.unwrap(), 1);

    let err = inbox.mark_read(&ctx(&other), &first.id).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound | ErrorKind::Authorization));

    assert_eq!(inbox.mark_all_read(&ctx(&user)).await.unwrap(), 1);
    assert_eq!(inbox.unread_count(&ctx(&user)).await.unwrap(), 0);
    assert_eq!(inbox.list(&ctx(&user), 10).await.unwrap().len(), 2);
}
