use std::sync::Arc;
use std::time::Duration;

use action_primitives::{
    ActionError, ActionExecutor, DefaultActionExecutor, ExecCtx, Glitch, MemoryDocument,
    MemoryElement, OverlayMarker,
};
use steadyhand_core_types::{
    ActionKind, ActionRequest, Capability, ElementHandle, ResolutionSource, ResolvedElement,
    SemanticAttributes, SnapshotId, TargetDescriptor,
};

fn resolved(index: u32, handle: &str, attributes: SemanticAttributes) -> ResolvedElement {
    ResolvedElement {
        index,
        handle: ElementHandle::new(handle),
        source: ResolutionSource::Index,
        confidence: 1.0,
        snapshot_id: SnapshotId::new(),
        attributes,
    }
}

fn search_page() -> Arc<MemoryDocument> {
    Arc::new(MemoryDocument::with_elements(
        Some("https://example.test/search".into()),
        vec![
            MemoryElement::new("query", Capability::TextInput).with_attributes(
                SemanticAttributes::default()
                    .with_aria_label("Search")
                    .with_role("combobox"),
            ),
            MemoryElement::new("country", Capability::Selectable)
                .with_options(["Austria", "Germany", "New Zealand"]),
            MemoryElement::new("submit", Capability::Clickable)
                .with_attributes(SemanticAttributes::default().with_text("Go")),
        ],
    ))
}

#[tokio::test]
async fn type_text_reports_autocomplete_overlay() {
    let doc = search_page();
    doc.glitch(Glitch::RevealOnInput {
        handle: ElementHandle::new("query"),
        elements: vec![MemoryElement::new("suggestion-0", Capability::Clickable)],
        markers: vec![OverlayMarker {
            role: Some("listbox".into()),
            aria_expanded: true,
            text: "rust lang".into(),
        }],
    });
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(0, "query", SemanticAttributes::default().with_role("combobox"));
    let action = ActionRequest::type_text(TargetDescriptor::at(0, Capability::TextInput), "rust");

    let result = executor.execute(&ctx, &action, &element).await.unwrap();

    assert_eq!(result.primitive, "type_text");
    assert!(result.signals.autocomplete_detected);
    assert!(result.signals.dom_changed);
    assert_eq!(doc.value_of(&element.handle).as_deref(), Some("rust"));
    // The suggestion pushed the country select one index down.
    let snapshot = doc.snapshot().unwrap();
    assert_eq!(snapshot.get(2).unwrap().handle.0, "country");
}

#[tokio::test]
async fn hidden_element_is_not_interactable_until_revealed() {
    let doc = search_page();
    let handle = ElementHandle::new("submit");
    doc.set_visible(&handle, false);
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(2, "submit", SemanticAttributes::default());
    let action = ActionRequest::click(TargetDescriptor::at(2, Capability::Clickable));

    let err = executor.execute(&ctx, &action, &element).await.unwrap_err();
    assert!(matches!(err, ActionError::NotInteractable(_)));
    assert!(err.is_retryable());
    assert_eq!(doc.calls().clicks, 0);

    executor.reveal(&ctx, &element).await.unwrap();
    executor.execute(&ctx, &action, &element).await.unwrap();
    assert_eq!(doc.calls().clicks, 1);
}

#[tokio::test]
async fn detached_element_asks_for_reresolution() {
    let doc = search_page();
    doc.detach(&ElementHandle::new("submit"));
    let executor = DefaultActionExecutor::new(doc);
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(2, "submit", SemanticAttributes::default());
    let action = ActionRequest::click(TargetDescriptor::at(2, Capability::Clickable));

    let err = executor.execute(&ctx, &action, &element).await.unwrap_err();
    assert!(err.needs_reresolve());
}

#[tokio::test]
async fn select_matches_option_case_insensitively() {
    let doc = search_page();
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(1, "country", SemanticAttributes::default());

    let action = ActionRequest::select(TargetDescriptor::at(1, Capability::Selectable), "germany");
    executor.execute(&ctx, &action, &element).await.unwrap();
    assert_eq!(doc.value_of(&element.handle).as_deref(), Some("Germany"));

    let missing = ActionRequest::select(TargetDescriptor::at(1, Capability::Selectable), "France");
    let err = executor.execute(&ctx, &missing, &element).await.unwrap_err();
    assert!(matches!(err, ActionError::OptionNotFound(_)));
}

#[tokio::test]
async fn reapply_recovers_swallowed_input() {
    let doc = search_page();
    let handle = ElementHandle::new("query");
    doc.glitch(Glitch::SwallowInputs {
        handle: handle.clone(),
        count: 1,
    });
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(0, "query", SemanticAttributes::default());
    let action = ActionRequest::type_text(TargetDescriptor::at(0, Capability::TextInput), "rust");

    executor.execute(&ctx, &action, &element).await.unwrap();
    assert_eq!(executor.observe(&ctx, &element).await.unwrap(), None);

    executor.reapply(&ctx, &action, &element, None).await.unwrap();
    assert_eq!(
        executor.observe(&ctx, &element).await.unwrap().as_deref(),
        Some("rust")
    );
    assert_eq!(doc.calls().clicks, 1);
}

#[tokio::test]
async fn appending_keeps_existing_content_across_reapply() {
    let doc = search_page();
    let handle = ElementHandle::new("query");
    doc.set_value(&handle, Some("Dear Bob, ".to_string()));
    doc.glitch(Glitch::SwallowInputs {
        handle: handle.clone(),
        count: 1,
    });
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    let element = resolved(0, "query", SemanticAttributes::default());
    let action = ActionRequest::new(ActionKind::TypeText {
        text: "thanks".into(),
        clear: false,
    })
    .with_target(TargetDescriptor::at(0, Capability::TextInput));

    let raw = executor.execute(&ctx, &action, &element).await.unwrap();
    assert_eq!(raw.prior_value.as_deref(), Some("Dear Bob, "));
    assert_eq!(doc.value_of(&handle).as_deref(), Some("Dear Bob, "));

    executor
        .reapply(&ctx, &action, &element, raw.prior_value.as_deref())
        .await
        .unwrap();
    assert_eq!(doc.value_of(&handle).as_deref(), Some("Dear Bob, thanks"));
}

#[tokio::test]
async fn untargeted_actions_go_through_perform() {
    let doc = search_page();
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));

    executor
        .perform(&ctx, &ActionRequest::new(ActionKind::Scroll { delta_y: 400 }))
        .await
        .unwrap();
    executor
        .perform(
            &ctx,
            &ActionRequest::new(ActionKind::Navigate {
                url: "https://example.test/next".into(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(doc.scroll_y(), 400);
    assert_eq!(doc.url().as_deref(), Some("https://example.test/next"));

    let click = ActionRequest::click(TargetDescriptor::at(2, Capability::Clickable));
    let err = executor.perform(&ctx, &click).await.unwrap_err();
    assert!(matches!(err, ActionError::InvalidRequest(_)));
}

#[tokio::test]
async fn cancelled_context_stops_before_side_effects() {
    let doc = search_page();
    let executor = DefaultActionExecutor::new(doc.clone());
    let ctx = ExecCtx::detached(Duration::from_secs(5));
    ctx.cancel_token.cancel();
    let element = resolved(2, "submit", SemanticAttributes::default());
    let action = ActionRequest::click(TargetDescriptor::at(2, Capability::Clickable));

    let err = executor.execute(&ctx, &action, &element).await.unwrap_err();
    assert!(matches!(err, ActionError::Interrupted(_)));
    assert_eq!(doc.calls().clicks, 0);
}
