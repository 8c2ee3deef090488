#[cfg(test)]
mod tests {
    use crate::dto::*;
    use crate::http::backend_message;
    use crate::memory::{title_from, MemoryBackend, MemoryDocument};
    use crate::scopes::segment;
    use crate::timer::clamp_delay;
    use chat_core::ports::ScopeAdapter;
    use chat_types::citation::ContentType;
    use chat_types::exchange::*;
    use chat_types::filter::RetrievalFilter;
    use chat_types::message::*;
    use chat_types::scope::ChatScope;
    use chat_types::session::*;
    use chat_types::tags::TagSet;
    use chat_types::ChatError;
    use futures::executor::block_on;
    use serde_json::json;

    // ─── Session DTO Tests ───────────────────────────────────

    #[test]
    fn test_session_dto_meeting_scope() {
        let dto: SessionDto = serde_json::from_value(json!({
            "id": 42,
            "title": "  Budget review ",
            "tags": "finance, q3",
            "filter_folder": "Archive",
            "message_count": 4,
            "updated_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        let session = dto.into_session(ChatScope::Meeting);
        assert_eq!(session.id, "42");
        assert_eq!(session.title, "Budget review");
        assert_eq!(session.tags, TagSet::parse_csv("q3,finance"));
        assert!(session.filter_folder.is_none(), "meeting sessions carry no filter");
        assert_eq!(session.message_count, 4);
        assert!(session.updated_at.is_some());
    }

    #[test]
    fn test_session_dto_global_filter() {
        let dto: SessionDto = serde_json::from_value(json!({
            "id": "g-1",
            "title": "Research",
            "tags": null,
            "filter_folder": "  ",
            "filter_tags": ["urgent", " legal "]
        }))
        .unwrap();

        let session = dto.into_session(ChatScope::Global);
        assert!(session.tags.is_empty());
        assert!(session.filter_folder.is_none());
        assert_eq!(session.filter_tags, TagSet::parse_csv("legal,urgent"));
    }

    #[test]
    fn test_session_dto_project_drops_tags() {
        let dto: SessionDto =
            serde_json::from_value(json!({ "id": "p1", "title": "Kickoff", "tags": "a,b" })).unwrap();
        let session = dto.into_session(ChatScope::Project);
        assert!(session.tags.is_empty());
        assert_eq!(session.message_count, 0);
    }

    #[test]
    fn test_session_dto_missing_title_is_placeholder() {
        let dto: SessionDto = serde_json::from_value(json!({ "id": "m1", "title": "" })).unwrap();
        assert!(dto.into_session(ChatScope::Meeting).is_unrefreshed());

        let dto: SessionDto = serde_json::from_value(json!({ "id": "m2" })).unwrap();
        assert_eq!(dto.into_session(ChatScope::Meeting).title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_session_dto_rejects_bad_id() {
        let result: Result<SessionDto, _> = serde_json::from_value(json!({ "id": [1] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_dto_embedded_messages() {
        let mut dto: SessionDto = serde_json::from_value(json!({
            "id": "m1",
            "title": "Standup",
            "messages": [
                { "role": "user", "content": "What was decided?" },
                {
                    "role": "assistant",
                    "content": "Ship on Friday.",
                    "sources": [{ "content_type": "summary", "meeting_name": "Standup", "similarity": 0.8 }],
                    "follow_up_suggestions": null
                }
            ]
        }))
        .unwrap();

        let messages = dto.take_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("What was decided?"));
        assert!(messages[1].is_assistant());
        assert_eq!(messages[1].format, ContentFormat::Markdown);
        assert_eq!(messages[1].sources[0].content_type, ContentType::Summary);
        assert!(messages[1].follow_up_suggestions.is_empty());

        let session = dto.into_session(ChatScope::Meeting);
        assert_eq!(session.message_count, 0, "messages were taken before conversion");
    }

    #[test]
    fn test_message_count_falls_back_to_embedded_len() {
        let dto: SessionDto = serde_json::from_value(json!({
            "id": "m1",
            "messages": [{ "role": "user", "content": "hi" }]
        }))
        .unwrap();
        assert_eq!(dto.into_session(ChatScope::Meeting).message_count, 1);
    }

    // ─── Body Tests ──────────────────────────────────────────

    #[test]
    fn test_patch_body_rename_with_tags() {
        let patch = SessionPatch::rename("Budget", Some(TagSet::parse_csv("q3,finance")));
        let body = patch_body(&patch, ChatScope::Meeting);
        assert_eq!(body, json!({ "title": "Budget", "tags": "finance,q3" }));

        let body = patch_body(&patch, ChatScope::Project);
        assert_eq!(body, json!({ "title": "Budget" }));
    }

    #[test]
    fn test_patch_body_clear_filter_sends_nulls() {
        let patch = SessionPatch::filter(RetrievalFilter::default());
        let body = patch_body(&patch, ChatScope::Global);
        assert_eq!(body, json!({ "filter_folder": null, "filter_tags": [] }));
    }

    #[test]
    fn test_patch_body_apply_filter() {
        let filter = RetrievalFilter::new(Some("ProjectX"), TagSet::parse_csv("urgent,q3"));
        let body = patch_body(&SessionPatch::filter(filter), ChatScope::Global);
        assert_eq!(body["filter_folder"], "ProjectX");
        assert_eq!(body["filter_tags"], json!(["q3", "urgent"]));
    }

    #[test]
    fn test_ask_body() {
        let req = SendRequest {
            text: "What changed?".to_string(),
            history: vec![
                HistoryTurn { role: Role::User, content: "hi".to_string() },
                HistoryTurn { role: Role::Assistant, content: "hello".to_string() },
            ],
            top_k: 5,
            filter: Some(RetrievalFilter::new(Some("ProjectX"), TagSet::new())),
        };

        let body = ask_body(Some("g1"), &req, ChatScope::Global);
        assert_eq!(body["question"], "What changed?");
        assert_eq!(body["session_id"], "g1");
        assert_eq!(body["top_k"], 5);
        assert_eq!(body["chat_history"][1]["role"], "assistant");
        assert_eq!(body["filter_folder"], "ProjectX");
        assert!(body.get("filter_tags").is_none());

        let body = ask_body(None, &req, ChatScope::Project);
        assert!(body.get("session_id").is_none());
        assert!(body.get("filter_folder").is_none());
    }

    #[test]
    fn test_create_body() {
        assert_eq!(create_body("New chat"), json!({ "title": "New chat" }));
    }

    // ─── Reply Tests ─────────────────────────────────────────

    #[test]
    fn test_ask_reply_aliases() {
        for key in ["content", "answer", "response"] {
            let raw = format!(r#"{{"{}": "Done."}}"#, key);
            let dto: AskReplyDto = serde_json::from_str(&raw).unwrap();
            let response = SendResponse::from(dto);
            assert_eq!(response.content, "Done.");
            assert!(response.sources.is_none());
            assert!(response.session_id.is_none());
        }
    }

    #[test]
    fn test_ask_reply_numeric_session_id() {
        let dto: AskReplyDto = serde_json::from_value(json!({
            "answer": "ok",
            "session_id": 17,
            "follow_up_suggestions": ["Next?"]
        }))
        .unwrap();
        let response = SendResponse::from(dto);
        assert_eq!(response.session_id.as_deref(), Some("17"));
        assert_eq!(response.into_message().follow_up_suggestions, vec!["Next?".to_string()]);
    }

    #[test]
    fn test_ask_reply_blank_session_id() {
        let dto: AskReplyDto =
            serde_json::from_value(json!({ "answer": "ok", "session_id": "" })).unwrap();
        assert!(dto.session_id.is_none());
    }

    #[test]
    fn test_vocabulary_shapes() {
        let plain: VocabularyDto = serde_json::from_value(json!(["a", " b ", "a", ""])).unwrap();
        assert_eq!(plain.into_items(), vec!["a".to_string(), "b".to_string()]);

        let tags: VocabularyDto = serde_json::from_value(json!({ "tags": ["x"] })).unwrap();
        assert_eq!(tags.into_items(), vec!["x".to_string()]);

        let folders: VocabularyDto = serde_json::from_value(json!({ "folders": ["Archive"] })).unwrap();
        assert_eq!(folders.into_items(), vec!["Archive".to_string()]);
    }

    // ─── HTTP Helper Tests ───────────────────────────────────

    #[test]
    fn test_backend_message() {
        assert_eq!(backend_message(r#"{"detail":"Session not found"}"#), "Session not found");
        assert_eq!(backend_message(r#"{"error":"bad"}"#), "bad");
        assert_eq!(backend_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(backend_message("  "), "empty response");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
        assert_eq!(segment("q3+q4?x=1#top"), "q3%2Bq4%3Fx%3D1%23top");
        assert_eq!(segment("réunion"), "r%C3%A9union");
    }

    #[test]
    fn test_timer_delay_stays_in_set_timeout_range() {
        assert_eq!(clamp_delay(120_000), 120_000);
        assert_eq!(clamp_delay(i32::MAX as u64), i32::MAX as u32);
        assert_eq!(clamp_delay(u32::MAX as u64 + 5), i32::MAX as u32);
        assert_eq!(clamp_delay(u64::MAX), i32::MAX as u32);
    }

    // ─── MemoryBackend Tests ─────────────────────────────────

    fn corpus(scope: ChatScope) -> MemoryBackend {
        let backend = MemoryBackend::new(scope);
        backend.add_document(
            MemoryDocument::transcript("1", "Kickoff sync", "We agreed the launch date is Friday.")
                .in_folder("ProjectX")
                .tagged("launch"),
        );
        backend.add_document(
            MemoryDocument::transcript("2", "Budget review", "The budget for launch marketing doubled.")
                .in_folder("Archive")
                .tagged("finance"),
        );
        backend
    }

    fn ask(text: &str, filter: Option<RetrievalFilter>) -> SendRequest {
        SendRequest {
            text: text.to_string(),
            history: Vec::new(),
            top_k: 5,
            filter,
        }
    }

    #[test]
    fn test_memory_send_creates_and_retitles() {
        let backend = corpus(ChatScope::Global);
        let response = block_on(backend.send_message(None, ask("When is the launch date?", None))).unwrap();

        let id = response.session_id.clone().unwrap();
        let sessions = block_on(backend.list_sessions()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].title, "When is the launch date?");
        assert_eq!(sessions[0].message_count, 2);

        let sources = response.sources.unwrap();
        assert_eq!(sources[0].title(), "Kickoff sync");
        assert_eq!(block_on(backend.get_messages(&id)).unwrap().len(), 2);
    }

    #[test]
    fn test_memory_keeps_explicit_title() {
        let backend = corpus(ChatScope::Meeting);
        let session = block_on(backend.create_session("Launch questions")).unwrap();
        block_on(backend.send_message(Some(&session.id), ask("launch?", None))).unwrap();
        assert_eq!(block_on(backend.list_sessions()).unwrap()[0].title, "Launch questions");
    }

    #[test]
    fn test_memory_filter_narrows_sources() {
        let backend = corpus(ChatScope::Global);
        let filter = RetrievalFilter::new(Some("Archive"), TagSet::new());
        let response = block_on(backend.send_message(None, ask("launch budget", Some(filter)))).unwrap();
        let sources = response.sources.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title(), "Budget review");

        let filter = RetrievalFilter::new(None, TagSet::parse_csv("nothing"));
        let response = block_on(backend.send_message(None, ask("launch", Some(filter)))).unwrap();
        assert!(response.sources.unwrap().is_empty());
        assert!(response.follow_up_suggestions.unwrap().is_empty());
    }

    #[test]
    fn test_memory_unknown_session() {
        let backend = corpus(ChatScope::Project);
        let err = block_on(backend.send_message(Some("nope"), ask("launch", None))).unwrap_err();
        assert_eq!(err, ChatError::SessionNotFound("nope".to_string()));
        assert!(block_on(backend.delete_session("nope")).is_err());
    }

    #[test]
    fn test_memory_update_respects_scope() {
        let backend = corpus(ChatScope::Project);
        let session = block_on(backend.create_session("Plan")).unwrap();
        let patch = SessionPatch::rename("Roadmap", Some(TagSet::parse_csv("x")));
        let updated = block_on(backend.update_session(&session.id, patch)).unwrap();
        assert_eq!(updated.title, "Roadmap");
        assert!(updated.tags.is_empty());
    }

    #[test]
    fn test_memory_vocabularies() {
        let backend = corpus(ChatScope::Global);
        assert_eq!(
            block_on(backend.filter_folders()).unwrap(),
            vec!["Archive".to_string(), "ProjectX".to_string()]
        );
        assert_eq!(
            block_on(backend.known_tags()).unwrap(),
            vec!["finance".to_string(), "launch".to_string()]
        );
    }

    #[test]
    fn test_title_from_question() {
        assert_eq!(title_from("  what   was decided? "), "what was decided?");
        assert_eq!(title_from(""), PLACEHOLDER_TITLE);
        let long = title_from("one two three four five six seven eight");
        assert_eq!(long, "one two three four five six");
    }
}
