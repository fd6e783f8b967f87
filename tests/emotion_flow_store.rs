use reminisce_flow::db::{Conversation, Speaker, Turn};
use reminisce_flow::flow::SENTINEL_HASH;
use reminisce_flow::{Database, EmotionLabel, FlowAnalyzer, FlowPattern, FlowStoreError};
use tempfile::TempDir;

fn open_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("flows.sqlite3")).unwrap();
    (dir, db)
}

fn text_payload(label: &str) -> String {
    format!(r#"{{"probabilities":{{"{label}":0.9,"embarrassment":0.1}},"confidence":0.9}}"#)
}

async fn seed_conversation(db: &Database, labels: &[&str]) -> (Conversation, Vec<Turn>) {
    let conversation = Conversation::new("user-1", Some("childhood home".to_string()));
    db.insert_conversation(&conversation).await.unwrap();

    let mut user_turns = Vec::new();
    for (index, label) in labels.iter().enumerate() {
        let ordinal = (index as u64) * 2;

        let prompt = Turn::new(
            &conversation.id,
            ordinal,
            Speaker::Assistant,
            Some("What do you remember?".to_string()),
        );
        db.insert_turn(&prompt).await.unwrap();

        let mut answer = Turn::new(&conversation.id, ordinal + 1, Speaker::User, None);
        answer.text_payload = Some(text_payload(label));
        db.insert_turn(&answer).await.unwrap();
        user_turns.push(answer);
    }

    (conversation, user_turns)
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let (_dir, db) = open_database();
    let err = FlowAnalyzer::default()
        .recompute(&db, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, FlowStoreError::NotFound(id) if id == "missing"));
    assert!(db.get_emotion_flow("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn conversation_without_payloads_stores_the_empty_flow() {
    let (_dir, db) = open_database();
    let conversation = Conversation::new("user-1", None);
    db.insert_conversation(&conversation).await.unwrap();
    db.insert_turn(&Turn::new(&conversation.id, 0, Speaker::User, None))
        .await
        .unwrap();

    let flow = FlowAnalyzer::default()
        .recompute(&db, &conversation.id)
        .await
        .unwrap();
    assert!(flow.segments.is_empty());
    assert_eq!(flow.metrics.pattern, FlowPattern::Stable);
    assert_eq!(flow.input_hash, SENTINEL_HASH);

    let stored = db.get_emotion_flow(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.input_hash, SENTINEL_HASH);
}

#[tokio::test]
async fn analysis_is_persisted_for_user_turns_only() {
    let (_dir, db) = open_database();
    let (conversation, user_turns) =
        seed_conversation(&db, &["sadness", "sadness", "sadness", "joy", "joy", "joy"]).await;

    let flow = FlowAnalyzer::default()
        .recompute(&db, &conversation.id)
        .await
        .unwrap();
    assert_eq!(flow.segments.len(), 2);
    assert_eq!(flow.segments[1].end_turn, 5);
    assert_eq!(flow.metrics.pattern, FlowPattern::UShape);

    let stored = db.get_emotion_flow(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.input_hash, flow.input_hash);
    assert_eq!(stored.segments, flow.segments);
    assert_eq!(stored.metrics, flow.metrics);

    let fusions = db.get_turn_fusions(&conversation.id).await.unwrap();
    let fused_ids: Vec<&str> = fusions.iter().map(|f| f.turn_id.as_str()).collect();
    let user_ids: Vec<&str> = user_turns.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(fused_ids, user_ids);
    assert_eq!(fusions[0].label, EmotionLabel::Sadness);
    assert_eq!(fusions[5].label, EmotionLabel::Joy);
    assert!(fusions.iter().all(|f| f.confidence > 0.0 && f.confidence <= 1.0));
}

#[tokio::test]
async fn refresh_leaves_a_current_flow_untouched() {
    let (_dir, db) = open_database();
    let (conversation, _) = seed_conversation(&db, &["anger", "anger", "hurt"]).await;
    let analyzer = FlowAnalyzer::default();

    let first = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(first.was_recomputed());

    let second = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(!second.was_recomputed());
    assert_eq!(second.flow().input_hash, first.flow().input_hash);
    assert_eq!(second.flow().generated_at, first.flow().generated_at);
}

#[tokio::test]
async fn new_payload_clears_stale_fusion_and_changes_the_hash() {
    let (_dir, db) = open_database();
    let (conversation, user_turns) = seed_conversation(&db, &["joy", "joy", "joy"]).await;
    let analyzer = FlowAnalyzer::default();

    let before = analyzer.recompute(&db, &conversation.id).await.unwrap();
    assert_eq!(db.get_turn_fusions(&conversation.id).await.unwrap().len(), 3);

    db.attach_text_payload(&user_turns[2].id, &text_payload("anxiety"))
        .await
        .unwrap();
    let fusions = db.get_turn_fusions(&conversation.id).await.unwrap();
    assert_eq!(fusions.len(), 2);
    assert!(fusions.iter().all(|f| f.turn_id != user_turns[2].id));

    let after = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(after.was_recomputed());
    assert_ne!(after.flow().input_hash, before.input_hash);
    assert_eq!(db.get_turn_fusions(&conversation.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn refresh_restores_fusion_cleared_by_an_attach_with_unchanged_inputs() {
    let (_dir, db) = open_database();
    let conversation = Conversation::new("user-1", None);
    db.insert_conversation(&conversation).await.unwrap();
    let mut answer = Turn::new(&conversation.id, 0, Speaker::User, None);
    answer.text_payload = Some(r#"{"label":"joy","confidence":0.9}"#.to_string());
    db.insert_turn(&answer).await.unwrap();

    let analyzer = FlowAnalyzer::default();
    let before = analyzer.recompute(&db, &conversation.id).await.unwrap();
    assert_eq!(db.get_turn_fusions(&conversation.id).await.unwrap().len(), 1);

    // every frame is below the confidence floor, so the fused input is unchanged
    db.attach_facial_payload(
        &answer.id,
        r#"{"frames":[{"label":"anger","confidence":0.3}]}"#,
    )
    .await
    .unwrap();
    assert!(db.get_turn_fusions(&conversation.id).await.unwrap().is_empty());

    let after = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(after.was_recomputed());
    assert_eq!(after.flow().input_hash, before.input_hash);

    let fusions = db.get_turn_fusions(&conversation.id).await.unwrap();
    assert_eq!(fusions.len(), 1);
    assert_eq!(fusions[0].turn_id, answer.id);
    assert_eq!(fusions[0].label, EmotionLabel::Joy);

    // a classifier re-sending the same text payload behaves the same way
    db.attach_text_payload(&answer.id, r#"{"label":"joy","confidence":0.9}"#)
        .await
        .unwrap();
    let resent = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(resent.was_recomputed());
    assert_eq!(resent.flow().input_hash, before.input_hash);
    assert_eq!(db.get_turn_fusions(&conversation.id).await.unwrap().len(), 1);

    let settled = analyzer.refresh(&db, &conversation.id).await.unwrap();
    assert!(!settled.was_recomputed());
}

#[tokio::test]
async fn facial_payload_is_attached_to_existing_turns_only() {
    let (_dir, db) = open_database();
    let (conversation, user_turns) = seed_conversation(&db, &["hurt"]).await;

    let facial = r#"{"frames":[{"label":"sadness","confidence":0.9},{"label":"neutral","confidence":0.8}]}"#;
    db.attach_facial_payload(&user_turns[0].id, facial)
        .await
        .unwrap();
    assert!(db.attach_facial_payload("no-such-turn", facial).await.is_err());

    let turns = db.get_turns(&conversation.id).await.unwrap();
    let answer = turns.iter().find(|t| t.id == user_turns[0].id).unwrap();
    assert_eq!(answer.facial_payload.as_deref(), Some(facial));
    assert_eq!(answer.speaker, Speaker::User);
}
