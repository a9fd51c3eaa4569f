pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use lineage_core::AncestorOrder;
    use lineage_manifest::*;
    use serde_json::json;

    #[test]
    fn test_toml_manifest_builds_hierarchy() {
        let (_dir, path) = write_manifest("blog.toml", BLOG);
        let hierarchy = build_hierarchy(&path).unwrap();

        let post = hierarchy.unit("Post").unwrap();
        let record = hierarchy.unit("Record").unwrap();
        let publishable = hierarchy.unit("Publishable").unwrap();

        assert_eq!(hierarchy.direct_ancestors(post).unwrap(), vec![publishable, record]);
        assert_eq!(hierarchy.ancestors(post).unwrap(), vec![publishable, record]);
        assert_eq!(
            &*hierarchy.inherited(post, "validations").unwrap(),
            &[json!("published_at"), json!("id")]
        );
        assert_eq!(
            hierarchy.effective(post, "validations").unwrap(),
            vec![json!("title"), json!("published_at"), json!("id")]
        );
    }

    #[test]
    fn test_required_capabilities_are_attached_first() {
        let (_dir, path) = write_manifest("blog.toml", BLOG);
        let hierarchy = build_hierarchy(&path).unwrap();
        let publishable = hierarchy.unit("Publishable").unwrap();

        let carried: Vec<_> = hierarchy
            .capabilities_of(publishable)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(carried, ["validations", "callbacks"]);
    }

    #[test]
    fn test_dependents_are_extended_on_first_call() {
        let (_dir, path) = write_manifest("blog.toml", BLOG);
        let hierarchy = build_hierarchy(&path).unwrap();
        let post = hierarchy.unit("Post").unwrap();

        assert!(hierarchy.capabilities_of(post).unwrap().is_empty());
        assert_eq!(hierarchy.invoke(post, "callbacks", &[]).unwrap(), json!(["notify"]));
        assert_eq!(hierarchy.capabilities_of(post).unwrap().len(), 2);
    }

    #[test]
    fn test_env_overrides_settings() {
        let (_dir, path) = write_manifest("blog.toml", BLOG);
        let manifest =
            load_manifest_with_env(&path, [("LINEAGE__SETTINGS__ORDER", "farthest_first")])
                .unwrap();
        assert_eq!(manifest.settings.order, AncestorOrder::FarthestFirst);

        let hierarchy = manifest.build().unwrap();
        let post = hierarchy.unit("Post").unwrap();
        assert_eq!(
            &*hierarchy.inherited(post, "validations").unwrap(),
            &[json!("id"), json!("published_at")]
        );
    }

    #[test]
    fn test_json_manifest_is_accepted() {
        let (_dir, path) = write_manifest(
            "tiny.json",
            r#"{ "units": [ { "name": "A", "declarations": { "x": 1 } }, { "name": "B", "composes": ["A"] } ] }"#,
        );
        let hierarchy = build_hierarchy(&path).unwrap();
        let b = hierarchy.unit("B").unwrap();
        assert_eq!(&*hierarchy.inherited(b, "x").unwrap(), &[json!(1)]);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Config { .. }));
        assert!(err.to_string().contains("Failed to build manifest"), "{err}");
    }

    #[test]
    fn test_cyclic_manifest_is_rejected() {
        let (_dir, path) = write_manifest(
            "cycle.toml",
            r#"
            [[units]]
            name = "A"
            composes = ["B"]

            [[units]]
            name = "B"
            composes = ["A"]
            "#,
        );
        let err = build_hierarchy(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Lineage { .. }));
    }
}
