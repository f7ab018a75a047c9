//! Fuzz target for the sync client state machine
//!
//! Arbitrary event sequences, including nonsensical orderings the transport
//! could never produce, must leave the client in a coherent state.
//!
//! # Invariants
//!
//! - `handle` never panics; protocol misuse returns an error
//! - No duplicate server ids in the transcript after any sequence
//! - Read-status events never produce a gateway request

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parlor_client::{Client, ClientAction, ClientEvent, FetchKind, LocalIdentity, TempId};
use parlor_core::env::test_utils::MockEnv;
use parlor_proto::{
    BroadcastEvent, ChannelStatus, ConversationPage, ConversationRecord, GatewayError,
    MarkReadResponse, MessageRecord, Pagination, ParticipantRecord, Role, Seq,
};

#[derive(Debug, Arbitrary)]
enum FuzzEvent {
    Open,
    Send { body_len: u16 },
    NearTop,
    ViewedBottom,
    InitialPage { count: u8, has_more: bool },
    InitialError { status: u16, terminal: bool },
    OlderPage { count: u8 },
    PostOk { temp_index: u8, seq: u32 },
    PostErr { temp_index: u8, status: u16, gated: bool },
    MarkReadOk { seq: u32 },
    MarkReadErr,
    PeerMessage { seq: u32 },
    DuplicatePeerMessage { seq: u32 },
    OwnEcho { seq: u32 },
    ReadStatus { seq: u32, own: bool },
    Channel { status_index: u8 },
}

fn record(id: &str, seq: u32, sender_id: &str) -> MessageRecord {
    MessageRecord {
        id: id.to_string(),
        body: format!("body {seq}"),
        sender_id: sender_id.to_string(),
        sender_name: "fuzz".to_string(),
        sender_photo: None,
        sender_role: Role::Sitter,
        seq: Seq::from(u64::from(seq)),
        created_at: i64::from(seq),
    }
}

fn page(count: u8, has_more: bool) -> ConversationPage {
    ConversationPage {
        conversation: ConversationRecord {
            id: "c1".to_string(),
            created_at: 0,
            participants: vec![
                ParticipantRecord {
                    id: "u1".to_string(),
                    name: "a".to_string(),
                    photo: None,
                    role: Role::Parent,
                    last_read_seq: None,
                    online: true,
                },
                ParticipantRecord {
                    id: "u2".to_string(),
                    name: "b".to_string(),
                    photo: None,
                    role: Role::Sitter,
                    last_read_seq: None,
                    online: false,
                },
            ],
        },
        messages: (0..count).map(|n| record(&format!("p{n}"), u32::from(n), "u2")).collect(),
        pagination: Pagination {
            has_more,
            next_cursor: has_more.then(|| "cursor".to_string()),
        },
    }
}

fn error(status: u16, code: Option<&str>) -> GatewayError {
    GatewayError {
        status,
        error: "fuzz".to_string(),
        code: code.map(str::to_string),
    }
}

fn broadcast(id: &str, seq: u32, sender_id: &str) -> BroadcastEvent {
    BroadcastEvent::NewMessage {
        id: id.to_string(),
        body: "fuzz".to_string(),
        sender_id: sender_id.to_string(),
        sender_name: "fuzz".to_string(),
        sender_photo: None,
        sender_role: Role::Sitter,
        seq: Seq::from(u64::from(seq)),
        created_at: 0,
    }
}

fuzz_target!(|events: Vec<FuzzEvent>| {
    let me = LocalIdentity {
        user_id: "u1".to_string(),
        name: "a".to_string(),
        photo: None,
        role: Role::Parent,
    };
    let mut client = Client::new(MockEnv::new(), me, "c1");
    let mut temp_ids: Vec<TempId> = Vec::new();

    for event in events {
        let (client_event, was_read_status) = match event {
            FuzzEvent::Open => (ClientEvent::Open, false),
            FuzzEvent::Send { body_len } => {
                let body = "x".repeat(usize::from(body_len));
                (ClientEvent::SendMessage { body }, false)
            },
            FuzzEvent::NearTop => (ClientEvent::NearTop, false),
            FuzzEvent::ViewedBottom => (ClientEvent::ViewedBottom, false),
            FuzzEvent::InitialPage { count, has_more } => (
                ClientEvent::PageFetched {
                    kind: FetchKind::Initial,
                    result: Ok(page(count % 32, has_more)),
                },
                false,
            ),
            FuzzEvent::InitialError { status, terminal } => (
                ClientEvent::PageFetched {
                    kind: FetchKind::Initial,
                    result: Err(error(status, terminal.then_some("NOT_FOUND"))),
                },
                false,
            ),
            FuzzEvent::OlderPage { count } => (
                ClientEvent::PageFetched {
                    kind: FetchKind::Older,
                    result: Ok(page(count % 32, false)),
                },
                false,
            ),
            FuzzEvent::PostOk { temp_index, seq } => {
                let Some(temp_id) = pick(&temp_ids, temp_index) else { continue };
                (
                    ClientEvent::PostCompleted {
                        temp_id,
                        result: Ok(record(&format!("ack{seq}"), seq, "u1")),
                    },
                    false,
                )
            },
            FuzzEvent::PostErr { temp_index, status, gated } => {
                let Some(temp_id) = pick(&temp_ids, temp_index) else { continue };
                (
                    ClientEvent::PostCompleted {
                        temp_id,
                        result: Err(error(
                            if gated { 403 } else { status },
                            gated.then_some("PREMIUM_REQUIRED"),
                        )),
                    },
                    false,
                )
            },
            FuzzEvent::MarkReadOk { seq } => (
                ClientEvent::MarkReadCompleted {
                    result: Ok(MarkReadResponse { last_read_seq: Seq::from(u64::from(seq)) }),
                },
                false,
            ),
            FuzzEvent::MarkReadErr => (
                ClientEvent::MarkReadCompleted { result: Err(error(500, None)) },
                false,
            ),
            FuzzEvent::PeerMessage { seq } => (
                ClientEvent::BroadcastReceived(broadcast(&format!("m{seq}"), seq, "u2")),
                false,
            ),
            FuzzEvent::DuplicatePeerMessage { seq } => (
                ClientEvent::BroadcastReceived(broadcast(&format!("m{seq}"), seq, "u2")),
                false,
            ),
            FuzzEvent::OwnEcho { seq } => (
                ClientEvent::BroadcastReceived(broadcast(&format!("m{seq}"), seq, "u1")),
                false,
            ),
            FuzzEvent::ReadStatus { seq, own } => (
                ClientEvent::BroadcastReceived(BroadcastEvent::ReadStatus {
                    reader_id: if own { "u1".to_string() } else { "u2".to_string() },
                    last_read_seq: Seq::from(u64::from(seq)),
                }),
                true,
            ),
            FuzzEvent::Channel { status_index } => {
                let status = match status_index % 4 {
                    0 => ChannelStatus::Subscribed,
                    1 => ChannelStatus::ChannelError,
                    2 => ChannelStatus::TimedOut,
                    _ => ChannelStatus::Closed,
                };
                (ClientEvent::ChannelStatusChanged(status), false)
            },
        };

        // Errors are legal outcomes; panics are not.
        let Ok(actions) = client.handle(client_event) else { continue };

        for action in &actions {
            if let ClientAction::Request(parlor_client::GatewayRequest::Post {
                temp_id, ..
            }) = action
            {
                temp_ids.push(*temp_id);
            }
            if was_read_status {
                assert!(
                    !matches!(action, ClientAction::Request(_)),
                    "read status must never trigger a request"
                );
            }
        }

        // Transcript holds no duplicate server ids.
        let mut seen = HashSet::new();
        for message in client.messages() {
            if let Some(id) = message.id.server() {
                assert!(seen.insert(id.to_string()), "duplicate id {id}");
            }
        }
    }
});

fn pick(temp_ids: &[TempId], index: u8) -> Option<TempId> {
    if temp_ids.is_empty() {
        None
    } else {
        Some(temp_ids[usize::from(index) % temp_ids.len()])
    }
}
