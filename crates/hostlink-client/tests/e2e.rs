//! End-to-end tests against an in-process server.

use std::sync::Arc;
use std::time::Duration;

use hostlink_client::{
    ClientConfig, Computer, ConnectionManager, ConnectionState, Dispatcher, RestTransport,
    WsTransport,
};
use hostlink_core::auth::ApiCredentials;
use hostlink_core::coords::Size;
use hostlink_core::protocol::CommandEnvelope;
use hostlink_core::Error;
use hostlink_server::{AuthConfig, LocalShell, Platform};
use hostlink_test_utils::{mock_platform, StalledWsServer, TestServer};

const WAIT: Duration = Duration::from_secs(10);

fn test_config(host: String, port: u16) -> ClientConfig {
    let mut config = ClientConfig::direct(host, port);
    config.connect_timeout = Duration::from_secs(2);
    config.command_timeout = Duration::from_secs(5);
    config.ping_interval = Duration::from_millis(500);
    config.reconnect_initial_delay = Duration::from_millis(50);
    config.reconnect_max_delay = Duration::from_millis(200);
    config
}

async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(WAIT, fut).await.expect("test timed out")
}

#[tokio::test]
async fn version_round_trip() {
    let server = TestServer::start(&Platform::new(), None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    let version = within(computer.version()).await.unwrap();
    assert_eq!(version, env!("CARGO_PKG_VERSION"));

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn unknown_command_reports_protocol_mismatch() {
    let server = TestServer::start(&Platform::new(), None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    let result = within(computer.send_raw(&CommandEnvelope::new("explode")))
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("unknown command"));

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn missing_capability_names_the_capability() {
    // No filesystem on this platform.
    let server = TestServer::start(&Platform::new(), None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    let err = within(computer.file_exists("/etc/hosts")).await.unwrap_err();
    match err {
        Error::Command { message } => {
            assert!(message.contains("not supported"), "{message}");
            assert!(message.contains("filesystem"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn input_commands_are_recorded_in_order() {
    let (platform, input) = mock_platform();
    let server = TestServer::start(&platform, None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    within(async {
        computer.move_cursor(10, 20).await?;
        computer.left_click(None, None).await?;
        computer.type_text("hello").await?;
        computer.hotkey(&["ctrl", "s"]).await?;
        computer.scroll_down(2).await
    })
    .await
    .unwrap();

    assert_eq!(
        input.take_events(),
        vec![
            "move_cursor 10 20",
            "click - - left",
            "type_text hello",
            "hotkey ctrl+s",
            "scroll_down 2",
        ]
    );

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn screenshot_and_geometry() {
    let (platform, _input) = mock_platform();
    let server = TestServer::start(&platform, None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    let image = within(computer.screenshot()).await.unwrap();
    assert_eq!(image, b"\x89PNG-not-really");

    let (width, height) = within(computer.screen_size()).await.unwrap();
    assert_eq!((width, height), (1920, 1080));

    let pos = within(computer.cursor_position()).await.unwrap();
    assert_eq!(pos, (640, 360));

    // Target picked from a 2x screenshot maps back to screen space.
    let (x, y) = within(computer.screenshot_to_screen(1920.0, 1080.0, Size::new(3840, 2160)))
        .await
        .unwrap();
    assert_eq!((x, y), (960, 540));

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn clipboard_and_accessibility() {
    let (platform, _input) = mock_platform();
    let server = TestServer::start(&platform, None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    within(computer.set_clipboard("copied")).await.unwrap();
    assert_eq!(within(computer.get_clipboard()).await.unwrap(), "copied");

    let tree = within(computer.accessibility_tree()).await.unwrap();
    assert_eq!(tree["role"], "window");

    let element = within(computer.find_element(Some("button"), None))
        .await
        .unwrap();
    assert_eq!(element["title"], "OK");

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn run_command_round_trip() {
    let platform = Platform::new().with_process(Arc::new(LocalShell::new()));
    let server = TestServer::start(&platform, None).await.unwrap();
    let computer = Computer::connect(test_config(server.host(), server.port())).unwrap();

    let output = within(computer.run_command("echo over the wire", None))
        .await
        .unwrap();
    assert_eq!(output.stdout.trim(), "over the wire");
    assert_eq!(output.return_code, 0);

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn rest_auth_rejects_wrong_credentials() {
    let auth = AuthConfig::new("secret", "vm-1");
    let server = TestServer::start(&Platform::new(), Some(auth)).await.unwrap();

    let mut config = test_config(server.host(), server.port());
    config.credentials = Some(ApiCredentials::new("wrong", "vm-1"));
    let computer = Computer::connect(config).unwrap();

    let err = within(computer.version()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed));

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn authenticated_session_works_end_to_end() {
    let auth = AuthConfig::new("secret", "vm-1");
    let server = TestServer::start(&Platform::new(), Some(auth)).await.unwrap();

    let mut config = test_config(server.host(), server.port());
    config.credentials = Some(ApiCredentials::new("secret", "vm-1"));
    let computer = Computer::connect(config).unwrap();

    within(computer.wait_connected()).await.unwrap();
    assert_eq!(computer.state(), ConnectionState::Connected);
    let version = within(computer.version()).await.unwrap();
    assert!(!version.is_empty());

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn ws_handshake_rejection_stops_reconnecting() {
    let auth = AuthConfig::new("secret", "vm-1");
    let server = TestServer::start(&Platform::new(), Some(auth)).await.unwrap();

    let mut config = test_config(server.host(), server.port());
    config.credentials = Some(ApiCredentials::new("wrong", "vm-1"));
    let manager = ConnectionManager::spawn(config);

    // Rejected credentials are fatal: the manager gives up instead of
    // retrying into the same rejection.
    let err = within(manager.wait_connected()).await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
    assert_eq!(manager.state(), ConnectionState::Closed);

    let err = within(manager.send(CommandEnvelope::new("version")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::AuthenticationFailed | Error::ConnectionClosed
    ));

    server.stop().await;
}

#[tokio::test]
async fn ws_reconnects_after_server_restart() {
    let server = TestServer::start(&Platform::new(), None).await.unwrap();
    let addr = server.addr();

    let manager = ConnectionManager::spawn(test_config(server.host(), server.port()));
    within(manager.wait_connected()).await.unwrap();

    server.stop().await;

    // The manager notices the drop and starts cycling.
    within(async {
        let mut watch = manager.state_watch();
        loop {
            if *watch.borrow_and_update() != ConnectionState::Connected {
                break;
            }
            watch.changed().await.unwrap();
        }
    })
    .await;

    let server = TestServer::start_on(addr, &Platform::new(), None).await.unwrap();
    within(manager.wait_connected()).await.unwrap();
    assert!(manager.metrics().reconnect_count >= 1);

    // Commands flow again on the new session.
    let result = within(manager.send(CommandEnvelope::new("version")))
        .await
        .unwrap();
    assert!(result.success);

    manager.close();
    server.stop().await;
}

#[tokio::test]
async fn missed_keepalive_pong_drops_the_session() {
    let server = StalledWsServer::start().await.unwrap();

    let mut config = test_config(server.host(), server.port());
    config.ping_interval = Duration::from_millis(100);
    let manager = ConnectionManager::spawn(config);
    within(manager.wait_connected()).await.unwrap();

    // The endpoint never answers pings; by the second tick the manager
    // must declare the session dead and reconnect. The TCP link stays
    // open the whole time, so only the missed pong can trigger this.
    within(async {
        while manager.metrics().reconnect_count == 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;

    manager.close();
    server.stop();
}

#[tokio::test]
async fn dispatcher_falls_back_to_websocket() {
    let server = TestServer::start(&Platform::new(), None).await.unwrap();
    let config = test_config(server.host(), server.port());

    // REST pointed at a dead port; only the WebSocket path can succeed.
    let mut dead_rest = config.clone();
    dead_rest.port = 1;
    let rest = RestTransport::new(&dead_rest).unwrap();

    let manager = Arc::new(ConnectionManager::spawn(config.clone()));
    within(manager.wait_connected()).await.unwrap();
    let ws = WsTransport::new(Arc::clone(&manager));

    let dispatcher = Dispatcher::new(Box::new(rest), Some(Box::new(ws)), config.command_timeout);
    let computer = Computer::from_parts(config, dispatcher, Arc::clone(&manager));

    let version = within(computer.version()).await.unwrap();
    assert!(!version.is_empty());

    computer.close();
    server.stop().await;
}
