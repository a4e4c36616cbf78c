//! Reference semantics of the in-memory transport.

use bytes::Bytes;

use bungee_channel::{create_memory_transport, Error, Transport};

#[tokio::test]
async fn test_sent_frames_arrive_in_order() {
    // ---
    let (transport, mut remote) = create_memory_transport().await.unwrap();

    for frame in [b"one".as_slice(), b"two".as_slice(), b"three".as_slice()] {
        transport.send(Bytes::copy_from_slice(frame)).await.unwrap();
    }

    assert_eq!(remote.next_sent().await.unwrap(), Bytes::from_static(b"one"));
    assert_eq!(remote.next_sent().await.unwrap(), Bytes::from_static(b"two"));
    assert_eq!(
        remote.next_sent().await.unwrap(),
        Bytes::from_static(b"three")
    );
    assert!(remote.sent_now().is_none());
}

#[tokio::test]
async fn test_offline_send_fails_with_no_route() {
    // ---
    let (transport, mut remote) = create_memory_transport().await.unwrap();

    remote.set_online(false);
    let err = transport.send(Bytes::from_static(b"x")).await.unwrap_err();
    assert!(matches!(err, Error::NoRoute));
    assert!(remote.sent_now().is_none());

    remote.set_online(true);
    transport.send(Bytes::from_static(b"x")).await.unwrap();
    assert!(remote.sent_now().is_some());
}

#[tokio::test]
async fn test_delivery_reaches_every_subscriber() {
    // ---
    let (transport, remote) = create_memory_transport().await.unwrap();

    let mut sub_a = transport.subscribe(4).await.unwrap();
    let mut sub_b = transport.subscribe(4).await.unwrap();

    remote.deliver("carrier-1", Bytes::from_static(b"frame")).await;

    let got_a = sub_a.inbox.recv().await.unwrap();
    let got_b = sub_b.inbox.recv().await.unwrap();
    assert_eq!(&*got_a.sender, "carrier-1");
    assert_eq!(got_a.frame, Bytes::from_static(b"frame"));
    assert_eq!(got_b.frame, Bytes::from_static(b"frame"));
}

#[tokio::test]
async fn test_dropped_handle_does_not_block_delivery() {
    // ---
    let (transport, remote) = create_memory_transport().await.unwrap();

    let dropped = transport.subscribe(4).await.unwrap();
    let mut live = transport.subscribe(4).await.unwrap();
    drop(dropped);

    remote.deliver("carrier-1", Bytes::from_static(b"frame")).await;

    let got = live.inbox.recv().await.unwrap();
    assert_eq!(got.frame, Bytes::from_static(b"frame"));
}

#[tokio::test]
async fn test_close_ends_subscriptions() {
    // ---
    let (transport, _remote) = create_memory_transport().await.unwrap();

    let mut sub = transport.subscribe(4).await.unwrap();
    transport.close().await.unwrap();

    assert!(sub.inbox.recv().await.is_none());
}
