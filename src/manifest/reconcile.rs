use crate::app;
use crate::engine::ContainerRecord;

use super::Manifest;

/// Builds the manifest for one container snapshot.
///
/// Containers are visited in snapshot order; each contributes the descriptor
/// extracted from its labels unless that descriptor is empty. Identical
/// descriptors from different containers are all kept.
pub fn reconcile(containers: &[ContainerRecord]) -> Manifest {
    let apps = containers
        .iter()
        .filter_map(|container| {
            log::debug!(
                "Parsing labels from container `{}`",
                container.display_name()
            );
            let app = app::extract(container.labels());
            if app.is_empty() {
                log::debug!(
                    "Container `{}` has no sui labels",
                    container.display_name()
                );
                None
            } else {
                Some(app)
            }
        })
        .collect();

    Manifest::new(apps)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::app::AppDescriptor;

    fn container(name: &str, labels: &[(&str, &str)]) -> ContainerRecord {
        ContainerRecord::new(
            format!("{name}-id"),
            vec![format!("/{name}")],
            labels
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn test_reconcile_labeled_container() {
        let snapshot = vec![container(
            "MyApp",
            &[
                ("sui.app.name", "MyApp"),
                ("sui.app.url", "MyApp.url.xyz"),
                ("sui.app.icon", "Mine"),
            ],
        )];
        assert_eq!(
            reconcile(&snapshot).apps(),
            [AppDescriptor::new("MyApp", "MyApp.url.xyz", "Mine")]
        );
    }

    #[test]
    fn test_reconcile_ignores_unlabeled_container() {
        let snapshot = vec![container("NoLabelApp", &[("some.random.label", "x")])];
        assert!(reconcile(&snapshot).is_empty());
    }

    #[test]
    fn test_reconcile_empty_snapshot() {
        assert_eq!(reconcile(&[]), Manifest::default());
    }

    #[test]
    fn test_reconcile_keeps_snapshot_order_and_duplicates() {
        let snapshot = vec![
            container("b", &[("sui.app.name", "B")]),
            container("skip", &[]),
            container("a", &[("sui.app.name", "A"), ("other", "1")]),
            container("url-only", &[("sui.app.url", "u.example")]),
            container("b2", &[("sui.app.name", "B")]),
        ];
        let manifest = reconcile(&snapshot);
        assert_eq!(
            manifest.apps(),
            [
                AppDescriptor::new("B", "", ""),
                AppDescriptor::new("A", "", ""),
                AppDescriptor::new("", "u.example", ""),
                AppDescriptor::new("B", "", ""),
            ]
        );
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let snapshot: Vec<ContainerRecord> = (0..20)
            .map(|i| {
                let name = format!("app{i}");
                container(
                    &name,
                    &[
                        ("sui.app.name", name.as_str()),
                        ("sui.app.icon", "icon"),
                        ("unrelated", "value"),
                    ],
                )
            })
            .collect();
        let first = reconcile(&snapshot);
        let second = reconcile(&snapshot);
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
