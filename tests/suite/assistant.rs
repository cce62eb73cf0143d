//! Assistant relay and onboarding dialogue tests

use clara_core::{ASSISTANT_FALLBACK, AssistantChat, Dialogue, Screen, Transition};

use crate::common::{client_for, mount_chat_response, start_backend_mock};

#[tokio::test]
async fn chat_round_trip_through_backend() {
    let server = start_backend_mock().await;
    mount_chat_response(&server, "Your daughter visits on Sundays.").await;
    let client = client_for(&server);

    let mut chat = AssistantChat::new("user_123");
    let request = chat.begin("When does my family visit?").unwrap();
    let reply = chat.complete(client.chat(&request).await);

    assert_eq!(
        chat.transcript().get(reply).unwrap().text,
        "Your daughter visits on Sundays."
    );
}

#[tokio::test]
async fn unreachable_backend_yields_fallback() {
    let client =
        clara_api::ApiClient::new("http://127.0.0.1:9", clara_api::ClientOptions::default())
            .unwrap();

    let mut chat = AssistantChat::new("user_123");
    let request = chat.begin("hello").unwrap();
    let reply = chat.complete(client.chat(&request).await);
    assert_eq!(chat.transcript().get(reply).unwrap().text, ASSISTANT_FALLBACK);
}

#[test]
fn patient_can_reach_every_screen() {
    for (option, screen) in [
        ("location", Screen::Geofence),
        ("family", Screen::Family),
        ("emergency", Screen::Contacts),
        ("assistance", Screen::Assistant),
    ] {
        let mut dialogue = Dialogue::new();
        let welcome = dialogue.active_prompt().unwrap();
        dialogue.select(welcome, "patient").unwrap();
        let menu = dialogue.active_prompt().unwrap();
        assert_eq!(
            dialogue.select(menu, option).unwrap(),
            Transition::Navigate(screen)
        );
    }
}
