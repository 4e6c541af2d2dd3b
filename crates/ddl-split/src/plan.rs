//! Dependency ordering over the foreign-key reference graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::ConstraintSpec;

/// Outcome of ordering a set of tables by their FK references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOrder {
    /// Topological order: referenced tables before referencing tables,
    /// ties broken by name.
    Ordered(Vec<String>),
    /// The reference graph contains a cycle; no topological order exists.
    Cyclic,
}

/// Order tables so that every FK's referenced table precedes the table
/// that declares the FK.
///
/// Self-references and references to tables outside the given set carry no
/// ordering obligation and are ignored. The result is deterministic: among
/// tables that become ready at the same time, name order wins.
pub fn dependency_order(constraints: &BTreeMap<String, Vec<ConstraintSpec>>) -> DependencyOrder {
    let tables: BTreeSet<&str> = constraints.keys().map(String::as_str).collect();

    // edges[referenced] -> referencing tables
    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut in_degree: BTreeMap<&str, usize> = tables.iter().map(|t| (*t, 0)).collect();

    for (table, specs) in constraints {
        for spec in specs {
            let Some(referenced) = spec.referenced_table() else {
                continue;
            };
            if referenced == table || !tables.contains(referenced) {
                continue;
            }
            if edges.entry(referenced).or_default().insert(table.as_str()) {
                *in_degree.entry(table.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(t, _)| *t)
        .collect();

    let mut order = Vec::with_capacity(tables.len());
    while let Some(&next) = ready.iter().next() {
        ready.remove(next);
        order.push(next.to_string());

        if let Some(dependents) = edges.get(next) {
            for dep in dependents {
                if let Some(deg) = in_degree.get_mut(dep) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(dep);
                    }
                }
            }
        }
    }

    if order.len() == tables.len() {
        DependencyOrder::Ordered(order)
    } else {
        DependencyOrder::Cyclic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ConstraintKind;

    fn fk(table: &str, ref_table: &str) -> ConstraintSpec {
        ConstraintSpec::new(
            table,
            vec!["ref_id".to_string()],
            ConstraintKind::ForeignKey {
                ref_table: ref_table.to_string(),
                ref_columns: vec!["id".to_string()],
                on_delete: "NO_ACTION".to_string(),
                on_update: "NO_ACTION".to_string(),
            },
        )
    }

    fn table_set(entries: Vec<(&str, Vec<ConstraintSpec>)>) -> BTreeMap<String, Vec<ConstraintSpec>> {
        entries
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect()
    }

    #[test]
    fn test_referenced_before_referencing() {
        let constraints = table_set(vec![
            ("order_items", vec![fk("order_items", "orders")]),
            ("orders", vec![]),
        ]);
        assert_eq!(
            dependency_order(&constraints),
            DependencyOrder::Ordered(vec!["orders".to_string(), "order_items".to_string()])
        );
    }

    #[test]
    fn test_independent_tables_in_name_order() {
        let constraints = table_set(vec![("zebra", vec![]), ("apple", vec![]), ("mango", vec![])]);
        assert_eq!(
            dependency_order(&constraints),
            DependencyOrder::Ordered(vec![
                "apple".to_string(),
                "mango".to_string(),
                "zebra".to_string()
            ])
        );
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let constraints = table_set(vec![("users", vec![fk("users", "users")])]);
        assert_eq!(
            dependency_order(&constraints),
            DependencyOrder::Ordered(vec!["users".to_string()])
        );
    }

    #[test]
    fn test_reference_outside_set_ignored() {
        let constraints = table_set(vec![("orders", vec![fk("orders", "customers")])]);
        assert_eq!(
            dependency_order(&constraints),
            DependencyOrder::Ordered(vec!["orders".to_string()])
        );
    }

    #[test]
    fn test_mutual_reference_is_cyclic() {
        let constraints = table_set(vec![
            ("a", vec![fk("a", "b")]),
            ("b", vec![fk("b", "a")]),
        ]);
        assert_eq!(dependency_order(&constraints), DependencyOrder::Cyclic);
    }

    #[test]
    fn test_diamond_is_ordered() {
        let constraints = table_set(vec![
            ("root", vec![]),
            ("left", vec![fk("left", "root")]),
            ("right", vec![fk("right", "root")]),
            ("leaf", vec![fk("leaf", "left"), fk("leaf", "right")]),
        ]);
        let DependencyOrder::Ordered(order) = dependency_order(&constraints) else {
            panic!("expected an ordered result");
        };
        let pos = |t: &str| order.iter().position(|x| x == t).unwrap();
        assert!(pos("root") < pos("left"));
        assert!(pos("root") < pos("right"));
        assert!(pos("left") < pos("leaf"));
        assert!(pos("right") < pos("leaf"));
    }
}
