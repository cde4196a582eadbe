use super::types::*;

#[test]
fn test_join_update_parsing() {
    let json = r#"{
        "ok": true,
        "result": [{
            "update_id": 77,
            "message": {
                "message_id": 5,
                "chat": {"id": -100123, "type": "supergroup"},
                "from": {"id": 999, "first_name": "Admin"},
                "new_chat_members": [
                    {"id": 42, "is_bot": false, "first_name": "Ada", "last_name": "Lovelace"},
                    {"id": 43, "is_bot": true, "first_name": "SomeBot"}
                ]
            }
        }]
    }"#;
    let resp: TgResponse<Vec<TgUpdate>> = serde_json::from_str(json).unwrap();
    assert!(resp.ok);
    let updates = resp.result.unwrap();
    assert_eq!(updates[0].update_id, 77);
    let msg = updates[0].message.as_ref().unwrap();
    assert_eq!(msg.chat.id, -100123);
    let joined = msg.new_chat_members.as_ref().unwrap();
    assert_eq!(joined.len(), 2);
    assert!(!joined[0].is_bot);
    assert!(joined[1].is_bot);
    assert_eq!(joined[0].display_name(), "Ada Lovelace");
}

#[test]
fn test_command_update_parsing() {
    let json = r#"{
        "update_id": 78,
        "message": {
            "message_id": 6,
            "chat": {"id": -200, "type": "group"},
            "from": {"id": 1, "first_name": "Op", "username": "op"},
            "text": "!wildcard 30"
        }
    }"#;
    let update: TgUpdate = serde_json::from_str(json).unwrap();
    let msg = update.message.unwrap();
    assert_eq!(msg.text.as_deref(), Some("!wildcard 30"));
    assert!(msg.new_chat_members.is_none());
}

#[test]
fn test_display_name_fallbacks() {
    let full: TgUser = serde_json::from_str(
        r#"{"id":1,"first_name":"Ada","last_name":"Lovelace","username":"ada"}"#,
    )
    .unwrap();
    assert_eq!(full.display_name(), "Ada Lovelace");

    let first_only: TgUser = serde_json::from_str(r#"{"id":1,"first_name":"Ada"}"#).unwrap();
    assert_eq!(first_only.display_name(), "Ada");
}

#[test]
fn test_profile_photos_largest_size_last() {
    let json = r#"{
        "total_count": 1,
        "photos": [[
            {"file_id": "small", "width": 160, "height": 160},
            {"file_id": "big", "width": 640, "height": 640}
        ]]
    }"#;
    let photos: TgUserProfilePhotos = serde_json::from_str(json).unwrap();
    assert_eq!(photos.total_count, 1);
    let largest = photos.photos.first().and_then(|s| s.last()).unwrap();
    assert_eq!(largest.file_id, "big");
}

#[test]
fn test_chat_member_status_parsing() {
    let json = r#"{"status": "administrator", "user": {"id": 9, "first_name": "Op"}}"#;
    let member: TgChatMember = serde_json::from_str(json).unwrap();
    assert_eq!(member.status, "administrator");
    assert_eq!(member.user.id, 9);
}
