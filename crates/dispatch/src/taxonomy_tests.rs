//! Tests for [`TaxonomyBuilder`] and [`Taxonomy`].

use super::*;
use crate::test_support;
use serde_json::json;

mod declaration {
    use super::*;

    #[test]
    fn test_builder_starts_with_base_event_only() {
        let taxonomy = TaxonomyBuilder::new().build();

        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.node(taxonomy.base()).name(), BASE_EVENT_NAME);
        assert!(taxonomy.is_leaf(taxonomy.base()));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = TaxonomyBuilder::new();
        builder.declare_root("PushEvent", "push", &[]).unwrap();

        let err = builder.declare_root("PushEvent", "push_again", &[]).unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::DuplicateName {
                name: "PushEvent".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_criteria_at_same_depth_rejected() {
        let mut builder = TaxonomyBuilder::new();
        let root = builder.declare_root("IssuesEvent", "issues", &[]).unwrap();
        builder
            .declare_action(root, "IssuesOpenedEvent", "opened", &[])
            .unwrap();

        let err = builder
            .declare_action(root, "IssuesOpenedAgainEvent", "opened", &[])
            .unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::DuplicateCriteria {
                name: "IssuesOpenedAgainEvent".to_string(),
                existing: "IssuesOpenedEvent".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_root_event_header_rejected() {
        let mut builder = TaxonomyBuilder::new();
        builder.declare_root("PushEvent", "push", &[]).unwrap();

        assert!(matches!(
            builder.declare_root("OtherPushEvent", "push", &[]),
            Err(TaxonomyError::DuplicateCriteria { .. })
        ));
    }

    #[test]
    fn test_same_action_under_different_roots_allowed() {
        let mut builder = TaxonomyBuilder::new();
        let issues = builder.declare_root("IssuesEvent", "issues", &[]).unwrap();
        let prs = builder
            .declare_root("PullRequestEvent", "pull_request", &[])
            .unwrap();

        assert!(builder
            .declare_action(issues, "IssuesOpenedEvent", "opened", &[])
            .is_ok());
        assert!(builder
            .declare_action(prs, "PullRequestOpenedEvent", "opened", &[])
            .is_ok());
    }

    #[test]
    fn test_root_without_event_header_rejected() {
        let mut builder = TaxonomyBuilder::new();
        let base = builder.base();

        let err = builder
            .declare(base, "Orphan", vec![Criterion::action("created")], &[])
            .unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::MissingEventHeader {
                name: "Orphan".to_string()
            }
        );
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let mut builder = TaxonomyBuilder::new();
        let root = builder.declare_root("PushEvent", "push", &[]).unwrap();

        assert!(matches!(
            builder.declare(root, "Anything", Vec::new(), &[]),
            Err(TaxonomyError::EmptyCriteria { .. })
        ));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let (_, ids) = test_support::taxonomy();
        let mut builder = TaxonomyBuilder::new();

        assert!(matches!(
            builder.declare(ids.create_tag, "Foreign", vec![Criterion::action("x")], &[]),
            Err(TaxonomyError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut builder = TaxonomyBuilder::new();

        assert_eq!(
            builder.declare_root("", "push", &[]).unwrap_err(),
            TaxonomyError::EmptyName
        );
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_parent_child_links_and_depths() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(taxonomy.parent(ids.created), Some(ids.issue_comment));
        assert_eq!(taxonomy.parent(ids.issue_comment), Some(ids.base));
        assert_eq!(taxonomy.parent(ids.base), None);
        assert_eq!(
            taxonomy.children(ids.issue_comment),
            &[ids.created, ids.deleted, ids.edited]
        );
        assert_eq!(taxonomy.depth(ids.base), 0);
        assert_eq!(taxonomy.depth(ids.push), 1);
        assert_eq!(taxonomy.depth(ids.edited), 2);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(taxonomy.ancestors(ids.edited), vec![ids.issue_comment, ids.base]);
        assert!(taxonomy.ancestors(ids.base).is_empty());
        assert!(taxonomy.is_same_or_descendant(ids.edited, ids.base));
        assert!(!taxonomy.is_same_or_descendant(ids.edited, ids.create));
    }

    #[test]
    fn test_leaf_descendants_in_declaration_order() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(
            taxonomy.leaf_descendants(ids.base),
            vec![
                ids.created,
                ids.deleted,
                ids.edited,
                ids.create_branch,
                ids.create_tag,
                ids.push
            ]
        );
        assert_eq!(
            taxonomy.leaf_descendants(ids.create),
            vec![ids.create_branch, ids.create_tag]
        );
        assert_eq!(taxonomy.leaf_descendants(ids.push), vec![ids.push]);
    }

    #[test]
    fn test_effective_criteria_accumulate_from_base() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(
            taxonomy.effective_criteria(ids.deleted),
            vec![
                Criterion::header("X-GitHub-Event", "issue_comment"),
                Criterion::action("deleted"),
            ]
        );
        assert!(taxonomy.effective_criteria(ids.base).is_empty());
    }

    #[test]
    fn test_effective_required_fields_accumulate() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(
            taxonomy.effective_required_fields(ids.edited),
            vec!["issue".to_string(), "comment".to_string(), "changes".to_string()]
        );
        assert_eq!(
            taxonomy.effective_required_fields(ids.created),
            vec!["issue".to_string(), "comment".to_string()]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let (taxonomy, ids) = test_support::taxonomy();

        assert_eq!(taxonomy.by_name("CreateTagEvent"), Some(ids.create_tag));
        assert_eq!(taxonomy.by_name("Event"), Some(ids.base));
        assert_eq!(taxonomy.by_name("Nope"), None);
    }
}

mod criteria {
    use super::*;

    #[test]
    fn test_header_criterion_matches_case_insensitive_name() {
        let criterion = Criterion::header("X-GitHub-Event", "push");
        let mut headers = RawHeaders::new();
        headers.insert("x-github-event", "push");

        assert!(criterion.matches(&headers, &json!({})));
    }

    #[test]
    fn test_body_criterion_requires_exact_value() {
        let criterion = Criterion::body("pull_request.merged", true);

        assert!(criterion.matches(&RawHeaders::new(), &json!({ "pull_request": { "merged": true } })));
        assert!(!criterion.matches(&RawHeaders::new(), &json!({ "pull_request": { "merged": "true" } })));
        assert!(!criterion.matches(&RawHeaders::new(), &json!({ "pull_request": {} })));
    }

    #[test]
    fn test_resolve_json_path() {
        let value = json!({ "installation": { "id": 5 } });

        assert_eq!(resolve_json_path(&value, "installation.id"), Some(&json!(5)));
        assert_eq!(resolve_json_path(&value, "installation.missing"), None);
        assert_eq!(resolve_json_path(&value, "installation.id.deeper"), None);
    }

    #[test]
    fn test_criterion_display() {
        assert_eq!(
            Criterion::action("created").to_string(),
            "body action = \"created\""
        );
    }
}
