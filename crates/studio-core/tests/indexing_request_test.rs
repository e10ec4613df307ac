//! Payload shapes for the dataset indexing endpoints.

use serde_json::json;
use studio_core::wizard::{reduce, WizardAction, WizardContext, WizardState};
use studio_core::{
    build_indexing_request, DataSourceSelection, DocForm, IndexingContext, IndexingOperation,
    IndexingRequest, IndexingTechnique, NotionPage, NotionPageIcon, PreProcessingRule,
    ProcessRule, Rules, Segmentation, SegmentationMode,
};

fn notion(id: &str, ws: &str) -> NotionPage {
    NotionPage {
        page_id: id.to_string(),
        page_name: format!("Doc {id}"),
        page_icon: Some(NotionPageIcon {
            icon_type: "emoji".to_string(),
            url: None,
            emoji: Some("📄".to_string()),
        }),
        page_type: "page".to_string(),
        workspace_id: ws.to_string(),
        parent_id: Some("root".to_string()),
    }
}

fn context(operation: IndexingOperation) -> IndexingContext {
    IndexingContext {
        operation,
        fixed_technique: None,
        selected_technique: None,
        has_api_key: false,
        process_rule: ProcessRule::Automatic,
        doc_form: DocForm::Text,
        doc_language: "English".to_string(),
    }
}

#[test]
fn test_reconfiguration_never_carries_data_source() {
    let mut ctx = context(IndexingOperation::Reconfigure {
        document_id: "doc-1".to_string(),
    });
    ctx.fixed_technique = Some(IndexingTechnique::HighQuality);
    let json = serde_json::to_value(build_indexing_request(&ctx)).unwrap();
    assert!(json.get("data_source").is_none());
    assert!(json.get("indexing_technique").is_none());
    assert_eq!(json["original_document_id"], "doc-1");
}

#[test]
fn test_creation_carries_exactly_one_info_list() {
    let sources = [
        DataSourceSelection::Files(vec!["a".into(), "b".into()]),
        DataSourceSelection::NotionPages(vec![notion("1", "A")]),
    ];
    for source in sources {
        let json =
            serde_json::to_value(build_indexing_request(&context(IndexingOperation::Create(source))))
                .unwrap();
        let info = &json["data_source"]["info_list"];
        let has_files = info.get("file_info_list").is_some();
        let has_notion = info.get("notion_info_list").is_some();
        assert!(has_files ^ has_notion, "exactly one info list: {info}");
        assert_eq!(json["data_source"]["type"], info["data_source_type"]);
    }
}

#[test]
fn test_notion_grouping_in_payload() {
    let source = DataSourceSelection::NotionPages(vec![
        notion("1", "A"),
        notion("2", "B"),
        notion("3", "A"),
    ]);
    let json =
        serde_json::to_value(build_indexing_request(&context(IndexingOperation::Create(source))))
            .unwrap();
    let icon = json!({"type": "emoji", "url": null, "emoji": "📄"});
    assert_eq!(
        json["data_source"]["info_list"]["notion_info_list"],
        json!([
            {"workspace_id": "A", "pages": [
                {"page_id": "1", "page_name": "Doc 1", "page_icon": icon, "type": "page"},
                {"page_id": "3", "page_name": "Doc 3", "page_icon": icon, "type": "page"}
            ]},
            {"workspace_id": "B", "pages": [
                {"page_id": "2", "page_name": "Doc 2", "page_icon": icon, "type": "page"}
            ]}
        ])
    );
}

#[test]
fn test_technique_resolution_in_payload() {
    let cases = [
        (None, false, "economy"),
        (None, true, "high_quality"),
        (Some(IndexingTechnique::Economy), true, "economy"),
    ];
    for (fixed, has_api_key, expected) in cases {
        let mut ctx = context(IndexingOperation::Create(DataSourceSelection::Files(vec![
            "f".into(),
        ])));
        ctx.fixed_technique = fixed;
        ctx.has_api_key = has_api_key;
        let json = serde_json::to_value(build_indexing_request(&ctx)).unwrap();
        assert_eq!(json["indexing_technique"], expected);
    }
}

#[test]
fn test_wizard_flow_to_custom_creation_payload() {
    let mut ctx = WizardContext::create(DataSourceSelection::Files(vec!["file-7".into()]));
    ctx.has_api_key = true;
    let defaults = Rules {
        pre_processing_rules: vec![
            PreProcessingRule::new("remove_extra_spaces", true),
            PreProcessingRule::new("remove_urls_emails", false),
        ],
        segmentation: Segmentation {
            separator: "\n".to_string(),
            max_tokens: 1000,
        },
    };

    let actions = [
        WizardAction::LoadDefaultRules(defaults),
        WizardAction::SetSegmentationMode(SegmentationMode::Custom),
        WizardAction::SetMaxTokens(512),
        WizardAction::ToggleRule("remove_urls_emails".to_string()),
        WizardAction::SetDocForm(DocForm::Qa),
        WizardAction::SetDocLanguage("Chinese".to_string()),
    ];
    let state = actions
        .into_iter()
        .fold(WizardState::new(ctx), reduce);

    let request = state.indexing_request();
    assert!(matches!(request, IndexingRequest::Create(_)));
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "data_source": {
                "type": "upload_file",
                "info_list": {
                    "data_source_type": "upload_file",
                    "file_info_list": {"file_ids": ["file-7"]}
                }
            },
            "indexing_technique": "high_quality",
            "process_rule": {
                "mode": "custom",
                "rules": {
                    "pre_processing_rules": [
                        {"id": "remove_extra_spaces", "enabled": true},
                        {"id": "remove_urls_emails", "enabled": true}
                    ],
                    "segmentation": {"separator": "\n", "max_tokens": 512}
                }
            },
            "doc_form": "qa",
            "doc_language": "Chinese"
        })
    );
}

#[test]
fn test_estimate_never_carries_original_document_id() {
    let state = WizardState::new(WizardContext::create(DataSourceSelection::NotionPages(vec![
        notion("1", "A"),
    ])));
    let json = serde_json::to_value(state.estimate_request(DocForm::Text)).unwrap();
    assert!(json.get("original_document_id").is_none());
    assert_eq!(json["dataset_id"], serde_json::Value::Null);
    assert_eq!(json["info_list"]["data_source_type"], "notion_import");
    assert_eq!(json["indexing_technique"], "economy");
}
