use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use tankbattle::net::{self, Relay};
use tankbattle::sim::{Command, EntityId, GameObject, MatchGenerator, Stage, StageLayout, Team};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

async fn start_relay(max_connections: usize) -> String {
    let relay = Relay::bind("127.0.0.1:0", max_connections)
        .await
        .expect("bind relay");
    let addr = relay.local_addr().expect("relay addr").to_string();
    relay.spawn();
    addr
}

fn match_stage() -> (Arc<Stage>, StageLayout) {
    let (stage, layout) = Stage::with_generator(&MatchGenerator::default(), 11);
    (Arc::new(stage), layout)
}

fn position(stage: &Stage, tank: EntityId) -> Vec2 {
    stage.with_tank(tank, |t| t.position()).expect("tank")
}

/// Poll until `check` holds or give up after ~2s
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_handshake_assigns_numbers_and_colors() {
    let addr = start_relay(4).await;
    let a = net::connect(&addr, "alice").await.expect("alice connects");
    let b = net::connect(&addr, "bob").await.expect("bob connects");
    assert_eq!((a.client_number(), a.team()), (0, Team::Red));
    assert_eq!((b.client_number(), b.team()), (1, Team::Blue));
}

#[tokio::test]
async fn test_commands_reach_other_peer() {
    let addr = start_relay(4).await;
    let a = net::connect(&addr, "alice").await.expect("alice connects");
    let b = net::connect(&addr, "bob").await.expect("bob connects");

    let (stage_a, layout_a) = match_stage();
    let (stage_b, layout_b) = match_stage();
    let tank_a = layout_a.tank_for_client(a.client_number()).expect("tank");
    let tank_b = layout_b.tank_for_client(b.client_number()).expect("tank");
    assert_eq!(layout_a.tanks, layout_b.tanks);

    let (sender_a, _) = a.start(Arc::clone(&stage_a), Some(tank_a));
    let (_sender_b, _) = b.start(Arc::clone(&stage_b), Some(tank_b));

    let target = Vec2::new(640.0, 222.0);
    sender_a
        .send(Command::Locate {
            tank: tank_a,
            position: target,
        })
        .expect("send locate");
    sender_a.send(Command::Shoot { tank: tank_a }).expect("send shoot");

    assert!(eventually(|| position(&stage_b, tank_a) == target).await);
    assert!(eventually(|| stage_b.len() == stage_a.len() + 1).await);
    // The sender's own stage is not touched by its outgoing commands
    assert_ne!(position(&stage_a, tank_a), target);
}

#[tokio::test]
async fn test_malformed_lines_do_not_break_connection() {
    let addr = start_relay(4).await;
    let mut raw = TcpStream::connect(&addr).await.expect("raw connect");
    let b = net::connect(&addr, "bob").await.expect("bob connects");

    let (stage_b, layout) = match_stage();
    let tank = layout.tanks[0];
    let (_sender, _) = b.start(Arc::clone(&stage_b), Some(layout.tanks[1]));

    raw.write_all(b"mallory\nFLY 1 2\nLOCATE 1 x y\n\nLOCATE ")
        .await
        .expect("raw write");
    raw.write_all(format!("{tank} 300 301\n").as_bytes())
        .await
        .expect("raw write");

    assert!(eventually(|| position(&stage_b, tank) == Vec2::new(300.0, 301.0)).await);
}

#[tokio::test]
async fn test_commands_for_local_tank_are_ignored() {
    let addr = start_relay(4).await;
    let a = net::connect(&addr, "alice").await.expect("alice connects");
    let b = net::connect(&addr, "bob").await.expect("bob connects");

    let (stage_b, layout) = match_stage();
    let local = layout.tank_for_client(b.client_number()).expect("tank");
    let other = layout.tank_for_client(a.client_number()).expect("tank");
    let home = position(&stage_b, local);

    let (sender_a, _) = a.start(match_stage().0, None);
    let (_sender_b, _) = b.start(Arc::clone(&stage_b), Some(local));

    sender_a
        .send(Command::Locate {
            tank: local,
            position: Vec2::new(10.0, 10.0),
        })
        .expect("send");
    sender_a
        .send(Command::Locate {
            tank: other,
            position: Vec2::new(20.0, 20.0),
        })
        .expect("send");

    // Lines arrive in order, so once the second landed the first was processed
    assert!(eventually(|| position(&stage_b, other) == Vec2::new(20.0, 20.0)).await);
    assert_eq!(position(&stage_b, local), home);
}

#[tokio::test]
async fn test_relay_refuses_when_full() {
    let addr = start_relay(1).await;
    let _a = net::connect(&addr, "alice").await.expect("alice connects");
    assert!(net::connect(&addr, "bob").await.is_err());
}

#[tokio::test]
async fn test_slot_frees_after_disconnect() {
    let addr = start_relay(1).await;
    let a = net::connect(&addr, "alice").await.expect("alice connects");
    drop(a);
    let mut joined = None;
    for _ in 0..100 {
        if let Ok(conn) = net::connect(&addr, "bob").await {
            joined = Some(conn);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(joined.map(|c| c.client_number()), Some(1));
}
