use super::prompt::Strategy;
use super::testutil::{MockChannel, MockDescriber};
use super::Gateway;
use async_trait::async_trait;
use doorman_core::{
    config::ChatConfig,
    counter::CounterStore,
    error::DoormanError,
    member::Member,
    runtime::{RuntimeConfig, RuntimeSettings},
    traits::ImageGenerator,
};
use doorman_media::{MediaPipeline, RetryPolicy};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct UnusedGenerator;

#[async_trait]
impl ImageGenerator for UnusedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DoormanError> {
        Err(DoormanError::Generation {
            message: "not under test".into(),
            transient: false,
        })
    }
}

fn settings(wildcard_chance: u8) -> RuntimeSettings {
    RuntimeSettings {
        wildcard_chance,
        pfp_anyone: false,
        gender_sensitive: false,
        posting_delay_secs: 0,
    }
}

fn member(avatar_url: Option<&str>) -> Member {
    Member {
        id: 42,
        display_name: "Ada".into(),
        avatar_url: avatar_url.map(str::to_string),
        account_created_at: None,
    }
}

fn gateway(
    channel: Arc<MockChannel>,
    describer: Arc<MockDescriber>,
    chats: ChatConfig,
    data_dir: &std::path::Path,
) -> Gateway {
    let media = MediaPipeline::new(
        Arc::new(UnusedGenerator),
        data_dir.to_path_buf(),
        None,
        RetryPolicy::default(),
    );
    let runtime = Arc::new(RuntimeConfig::from_config(&Default::default()));
    let counter = Arc::new(CounterStore::new(data_dir));
    Gateway::new(
        channel,
        describer,
        media,
        runtime,
        counter,
        chats,
        "Welcome {username}: {avatar-description}".to_string(),
    )
}

/// Serve one HTTP response with the given body on a random local port,
/// returning a URL for it.
async fn serve_once(body: Vec<u8>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = sock.write_all(head.as_bytes()).await;
            let _ = sock.write_all(&body).await;
        }
    });
    format!("http://{addr}/avatar.jpg")
}

#[tokio::test]
async fn test_prompt_without_avatar_skips_description() {
    let dir = tempfile::tempdir().unwrap();
    let describer = Arc::new(MockDescriber::with_description("unused"));
    let gw = gateway(
        Arc::new(MockChannel::default()),
        describer.clone(),
        ChatConfig::default(),
        dir.path(),
    );

    let (prompt, strategy) = gw.build_prompt(&member(None), &settings(0), false).await;

    assert_eq!(strategy, Strategy::NoAvatar);
    assert!(prompt.contains("Ada"));
    assert!(prompt.contains("profile picture"));
    assert_eq!(describer.call_count(), 0);
}

#[tokio::test]
async fn test_forced_profile_pic_ignores_existing_avatar() {
    let dir = tempfile::tempdir().unwrap();
    let describer = Arc::new(MockDescriber::with_description("unused"));
    let gw = gateway(
        Arc::new(MockChannel::default()),
        describer.clone(),
        ChatConfig::default(),
        dir.path(),
    );

    let (_, strategy) = gw
        .build_prompt(&member(Some("http://example.invalid/a.jpg")), &settings(0), true)
        .await;

    assert_eq!(strategy, Strategy::NoAvatar);
    assert_eq!(describer.call_count(), 0);
}

#[tokio::test]
async fn test_avatar_prompt_describes_once_and_renders_template() {
    let dir = tempfile::tempdir().unwrap();
    let url = serve_once(b"jpeg-bytes".to_vec()).await;
    let describer = Arc::new(MockDescriber::with_description("a red fox"));
    let gw = gateway(
        Arc::new(MockChannel::default()),
        describer.clone(),
        ChatConfig::default(),
        dir.path(),
    );

    let (prompt, strategy) = gw
        .build_prompt(&member(Some(&url)), &settings(0), false)
        .await;

    assert_eq!(strategy, Strategy::AvatarDerived);
    assert_eq!(prompt, "Welcome Ada: a red fox");
    assert_eq!(describer.call_count(), 1);
}

#[tokio::test]
async fn test_description_failure_degrades_to_wildcard() {
    let dir = tempfile::tempdir().unwrap();
    let url = serve_once(b"jpeg-bytes".to_vec()).await;
    let describer = Arc::new(MockDescriber::failing());
    let gw = gateway(
        Arc::new(MockChannel::default()),
        describer.clone(),
        ChatConfig::default(),
        dir.path(),
    );

    let (prompt, strategy) = gw
        .build_prompt(&member(Some(&url)), &settings(0), false)
        .await;

    assert_eq!(strategy, Strategy::Wildcard);
    assert!(prompt.contains("welcome image"));
    assert_eq!(describer.call_count(), 1);
}

#[tokio::test]
async fn test_avatar_fetch_failure_degrades_to_wildcard() {
    let dir = tempfile::tempdir().unwrap();
    let describer = Arc::new(MockDescriber::with_description("unused"));
    let gw = gateway(
        Arc::new(MockChannel::default()),
        describer.clone(),
        ChatConfig::default(),
        dir.path(),
    );

    // Nothing listens on port 1.
    let (prompt, strategy) = gw
        .build_prompt(
            &member(Some("http://127.0.0.1:1/avatar.jpg")),
            &settings(0),
            false,
        )
        .await;

    assert_eq!(strategy, Strategy::Wildcard);
    assert!(prompt.contains("Ada"));
    assert_eq!(describer.call_count(), 0);
}

#[tokio::test]
async fn test_in_flight_member_is_not_welcomed_twice() {
    let dir = tempfile::tempdir().unwrap();
    let channel = Arc::new(MockChannel::default());
    let chats = ChatConfig {
        admin_chat_id: 99,
        ..ChatConfig::default()
    };
    let gw = gateway(
        channel.clone(),
        Arc::new(MockDescriber::with_description("unused")),
        chats,
        dir.path(),
    );

    assert!(gw.begin_invocation(42).await);
    gw.handle_join(member(None), false).await;

    // The second trigger was skipped before any pipeline work.
    assert!(channel.photos.lock().await.is_empty());
    let texts = channel.texts.lock().await;
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, 99);
    assert!(texts[0].1.contains("already in progress"));
    // The original invocation still holds the slot.
    assert!(!gw.begin_invocation(42).await);
}
