use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::timeout,
};

use timer_card::{
    serve,
    services::LocalTimerBackend,
    state::{AppState, CardConfig, TimerEntity},
    TimerDuration,
};

fn state() -> Arc<AppState> {
    let backend = LocalTimerBackend::new().with_entity(TimerEntity::idle(
        "timer.rice",
        Some("Rice".to_string()),
        TimerDuration::new(0, 18, 0),
    ));
    let config = CardConfig::new("Kitchen", "timer.rice");
    Arc::new(AppState::new(0, "127.0.0.1".to_string(), config, Arc::new(backend)))
}

async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn serves_until_signal_then_returns() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, state(), Duration::from_millis(20), async move {
        let _ = stop_rx.await;
    }));

    let response = get(addr, "/card").await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{}", response);
    assert!(response.contains("\"display\":\"00:18:00\""), "{}", response);

    stop_tx.send(()).unwrap();
    let result = timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(result.is_ok());

    assert!(TcpStream::connect(addr).await.is_err());
}
