pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use assert_cmd::prelude::*;
    use predicates::prelude::*;

    #[test]
    fn test_ancestors_are_printed_nearest_first() {
        let (_dir, path) = shop_manifest();
        lineage(&path)
            .args(["ancestors", "Order"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""Archivable",
  "Record""#));
    }

    #[test]
    fn test_inherited_and_effective_views() {
        let (_dir, path) = shop_manifest();
        lineage(&path)
            .args(["inherited", "Order", "scopes"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("archived").and(predicate::str::contains("recent").not()),
            );

        lineage(&path)
            .args(["inherited", "Order", "scopes", "--effective"])
            .assert()
            .success()
            .stdout(predicate::str::contains("recent"));
    }

    #[test]
    fn test_invoke_extends_the_unit() {
        let (_dir, path) = shop_manifest();
        lineage(&path)
            .args(["invoke", "Order", "scopes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"all\""));
    }

    #[test]
    fn test_capabilities_after_propagation() {
        let (_dir, path) = shop_manifest();
        lineage(&path).args(["capabilities", "Order"]).assert().success().stdout("[]\n");
        lineage(&path)
            .args(["capabilities", "Order", "--propagate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("scopes"));
    }

    #[test]
    fn test_unknown_unit_fails() {
        let (_dir, path) = shop_manifest();
        lineage(&path)
            .args(["ancestors", "Ghost"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown unit `Ghost`"));
    }

    #[test]
    fn test_unknown_method_fails() {
        let (_dir, path) = shop_manifest();
        lineage(&path)
            .args(["invoke", "Record", "missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to invoke `missing`"));
    }

    #[test]
    fn test_missing_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        lineage(&dir.path().join("absent.toml"))
            .arg("units")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load"));
    }
}
