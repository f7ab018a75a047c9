//! Property tests for the conversation sync client.
//!
//! Random interleavings of sends, acks, broadcast deliveries (with
//! duplicates), and read-status events are applied against a simple
//! reference model of the expected list and markers.

#![allow(clippy::unwrap_used)]

use parlor_client::{
    Client, ClientAction, ClientEvent, FetchKind, LocalIdentity, MessageId, Role, Seq,
};
use parlor_core::env::test_utils::MockEnv;
use parlor_proto::{
    BroadcastEvent, ConversationPage, ConversationRecord, MessageRecord, Pagination,
    ParticipantRecord,
};
use proptest::prelude::*;

/// One step of an interleaved session.
#[derive(Debug, Clone)]
enum Op {
    /// Peer message delivered over the broadcast channel.
    PeerMessage,
    /// Redelivery of an already-delivered peer broadcast.
    Duplicate(usize),
    /// Local optimistic send.
    Send,
    /// Store acknowledgment for the oldest outstanding send.
    Ack,
    /// Peer read-status broadcast with an arbitrary marker.
    ReadStatus(u64),
}

/// Expected list entry in arrival order.
#[derive(Debug, Clone)]
enum Expected {
    /// Peer message with a known server id.
    Server(String),
    /// Own send, acked with this id once the ack arrives.
    Own(Option<String>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::PeerMessage),
        2 => (0usize..16).prop_map(Op::Duplicate),
        2 => Just(Op::Send),
        2 => Just(Op::Ack),
        2 => (0u64..50).prop_map(Op::ReadStatus),
    ]
}

fn opened_client() -> Client<MockEnv> {
    let me = LocalIdentity {
        user_id: "u1".into(),
        name: "Ana".into(),
        photo: None,
        role: Role::Parent,
    };
    let mut client = Client::new(MockEnv::new(), me, "c1");
    client.handle(ClientEvent::Open).unwrap();
    client
        .handle(ClientEvent::PageFetched {
            kind: FetchKind::Initial,
            result: Ok(empty_page()),
        })
        .unwrap();
    client
}

fn empty_page() -> ConversationPage {
    ConversationPage {
        conversation: ConversationRecord {
            id: "c1".into(),
            created_at: 0,
            participants: vec![
                ParticipantRecord {
                    id: "u1".into(),
                    name: "Ana".into(),
                    photo: None,
                    role: Role::Parent,
                    last_read_seq: None,
                    online: true,
                },
                ParticipantRecord {
                    id: "u2".into(),
                    name: "Bea".into(),
                    photo: None,
                    role: Role::Sitter,
                    last_read_seq: None,
                    online: true,
                },
            ],
        },
        messages: vec![],
        pagination: Pagination { has_more: false, next_cursor: None },
    }
}

fn peer_broadcast(id: &str, seq: u64) -> BroadcastEvent {
    BroadcastEvent::NewMessage {
        id: id.into(),
        body: format!("peer {seq}"),
        sender_id: "u2".into(),
        sender_name: "Bea".into(),
        sender_photo: None,
        sender_role: Role::Sitter,
        seq: Seq::from(seq),
        created_at: seq as i64,
    }
}

fn ack_record(id: &str, seq: u64, body: &str) -> MessageRecord {
    MessageRecord {
        id: id.into(),
        body: body.into(),
        sender_id: "u1".into(),
        sender_name: "Ana".into(),
        sender_photo: None,
        sender_role: Role::Parent,
        seq: Seq::from(seq),
        created_at: seq as i64,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any interleaving of sends, acks, duplicated broadcasts, and read
    /// markers leaves the list duplicate-free, in arrival order, with a
    /// monotone peer marker.
    #[test]
    fn interleavings_preserve_order_dedup_and_monotonicity(
        ops in proptest::collection::vec(op_strategy(), 1..60)
    ) {
        let mut client = opened_client();

        let mut expected: Vec<Expected> = Vec::new();
        let mut delivered: Vec<BroadcastEvent> = Vec::new();
        // Arrival-order positions of sends still awaiting their ack.
        let mut outstanding: Vec<usize> = Vec::new();
        let mut next_seq: u64 = 0;
        let mut send_counter: u64 = 0;
        let mut expected_marker: Option<u64> = None;

        for op in ops {
            match op {
                Op::PeerMessage => {
                    next_seq += 1;
                    let id = format!("m{next_seq}");
                    let event = peer_broadcast(&id, next_seq);
                    delivered.push(event.clone());
                    client.handle(ClientEvent::BroadcastReceived(event)).unwrap();
                    expected.push(Expected::Server(id));
                },
                Op::Duplicate(i) => {
                    if delivered.is_empty() {
                        continue;
                    }
                    let event = delivered[i % delivered.len()].clone();
                    let before = client.messages().len();
                    client.handle(ClientEvent::BroadcastReceived(event)).unwrap();
                    prop_assert_eq!(client.messages().len(), before);
                },
                Op::Send => {
                    send_counter += 1;
                    client
                        .handle(ClientEvent::SendMessage { body: format!("own {send_counter}") })
                        .unwrap();
                    outstanding.push(expected.len());
                    expected.push(Expected::Own(None));
                },
                Op::Ack => {
                    if outstanding.is_empty() {
                        continue;
                    }
                    let position = outstanding.remove(0);
                    let temp_id = match &client.messages()[position].id {
                        MessageId::Temp(t) => *t,
                        MessageId::Server(_) => {
                            return Err(TestCaseError::fail("expected pending at position"));
                        },
                    };
                    next_seq += 1;
                    let id = format!("m{next_seq}");
                    let body = client.messages()[position].body.clone();
                    client
                        .handle(ClientEvent::PostCompleted {
                            temp_id,
                            result: Ok(ack_record(&id, next_seq, &body)),
                        })
                        .unwrap();
                    expected[position] = Expected::Own(Some(id));
                },
                Op::ReadStatus(seq) => {
                    let actions = client
                        .handle(ClientEvent::BroadcastReceived(BroadcastEvent::ReadStatus {
                            reader_id: "u2".into(),
                            last_read_seq: Seq::from(seq),
                        }))
                        .unwrap();
                    // A pure render update: no gateway traffic ever.
                    prop_assert!(actions
                        .iter()
                        .all(|a| !matches!(a, ClientAction::Request(_))));
                    if expected_marker.is_none_or(|m| seq > m) {
                        expected_marker = Some(seq);
                    }
                },
            }
        }

        // Arrival order, acked ids in place, pending sends still pending.
        prop_assert_eq!(client.messages().len(), expected.len());
        for (message, want) in client.messages().iter().zip(&expected) {
            match want {
                Expected::Server(id) | Expected::Own(Some(id)) => {
                    prop_assert_eq!(message.id.server(), Some(id.as_str()));
                },
                Expected::Own(None) => prop_assert!(message.is_pending()),
            }
        }

        // No duplicate server ids.
        let mut ids: Vec<&str> =
            client.messages().iter().filter_map(|m| m.id.server()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);

        // Peer marker is the maximum of everything delivered.
        prop_assert_eq!(
            client.peer_last_read().cloned(),
            expected_marker.map(Seq::from)
        );
    }

    /// Repeatedly paging older history always keeps chronological order and
    /// terminates exactly when the store says there is no more.
    #[test]
    fn backward_paging_preserves_chronology(
        page_sizes in proptest::collection::vec(1usize..10, 1..6)
    ) {
        // Total history, newest page loaded first.
        let total: usize = page_sizes.iter().sum::<usize>() + 3;
        let records: Vec<MessageRecord> = (1..=total)
            .map(|n| ack_record(&format!("m{n}"), n as u64, "body"))
            .collect();

        let mut remaining = total - 3;
        let mut client = {
            let me = LocalIdentity {
                user_id: "u1".into(),
                name: "Ana".into(),
                photo: None,
                role: Role::Parent,
            };
            let mut client = Client::new(MockEnv::new(), me, "c1");
            client.handle(ClientEvent::Open).unwrap();
            let mut page = empty_page();
            page.messages = records[remaining..].to_vec();
            page.pagination = Pagination {
                has_more: true,
                next_cursor: Some(format!("cur{remaining}")),
            };
            client
                .handle(ClientEvent::PageFetched { kind: FetchKind::Initial, result: Ok(page) })
                .unwrap();
            client
        };

        for size in page_sizes {
            if remaining == 0 {
                break;
            }
            let actions = client.handle(ClientEvent::NearTop).unwrap();
            prop_assert!(!actions.is_empty());

            let take = size.min(remaining);
            let start = remaining - take;
            let mut page = empty_page();
            page.messages = records[start..remaining].to_vec();
            page.pagination = Pagination {
                has_more: start > 0,
                next_cursor: (start > 0).then(|| format!("cur{start}")),
            };
            client
                .handle(ClientEvent::PageFetched { kind: FetchKind::Older, result: Ok(page) })
                .unwrap();
            remaining = start;

            let seqs: Vec<u64> = client
                .messages()
                .iter()
                .filter_map(|m| m.seq())
                .map(|s| s.to_string().parse::<u64>().unwrap())
                .collect();
            let mut sorted = seqs.clone();
            sorted.sort_unstable();
            prop_assert_eq!(seqs, sorted);
        }

        if remaining == 0 {
            prop_assert!(!client.has_more());
            prop_assert!(client.handle(ClientEvent::NearTop).unwrap().is_empty());
        }
    }
}
