//! Navigation tree builder
//!
//! Pure functions: flat category list in, one-level tree out.

use shared::models::{Category, CategoryChildCount, CategoryNode, CategoryNodeWithCount};
use std::collections::HashMap;

/// Group active categories into roots and their direct children.
///
/// Roots and children are ordered by `order` ascending; ties keep input
/// order. Inactive categories are dropped, and so are children whose
/// parent is missing or inactive. Grandchildren are never attached.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let mut roots: Vec<&Category> = Vec::new();
    let mut children: HashMap<i64, Vec<&Category>> = HashMap::new();

    for c in categories.iter().filter(|c| c.is_active) {
        match c.parent_id {
            None => roots.push(c),
            Some(parent) => children.entry(parent).or_default().push(c),
        }
    }

    roots.sort_by_key(|c| c.order);

    roots
        .into_iter()
        .map(|root| {
            let mut kids = children.remove(&root.id).unwrap_or_default();
            kids.sort_by_key(|c| c.order);
            CategoryNode {
                category: root.clone(),
                children: kids.into_iter().cloned().collect(),
            }
        })
        .collect()
}

/// Layer product counts (keyed by effective category) onto a tree.
///
/// A root's count is its own products plus its children's.
pub fn annotate_counts(
    tree: &[CategoryNode],
    counts: &HashMap<i64, usize>,
) -> Vec<CategoryNodeWithCount> {
    let count_of = |id: i64| counts.get(&id).copied().unwrap_or(0);

    tree.iter()
        .map(|node| {
            let children: Vec<CategoryChildCount> = node
                .children
                .iter()
                .map(|c| CategoryChildCount {
                    category: c.clone(),
                    count: count_of(c.id),
                })
                .collect();
            let total = count_of(node.category.id) + children.iter().map(|c| c.count).sum::<usize>();
            CategoryNodeWithCount {
                category: node.category.clone(),
                count: total,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SeoMeta;

    fn cat(id: i64, name: &str, parent_id: Option<i64>, order: i32, is_active: bool) -> Category {
        let now = chrono::Utc::now();
        Category {
            id,
            name: name.into(),
            slug: None,
            description: None,
            image: None,
            parent_id,
            order,
            is_active,
            product_count: 0,
            seo: SeoMeta::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn roots_and_children_sorted_by_order() {
        let cats = vec![
            cat(2, "B", None, 2, true),
            cat(1, "A", None, 1, true),
            cat(4, "A2", Some(1), 2, true),
            cat(3, "A1", Some(1), 1, true),
        ];
        let tree = build_tree(&cats);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name, "A");
        assert_eq!(
            tree[0].children.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["A1", "A2"]
        );
        assert_eq!(tree[1].category.name, "B");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn inactive_and_deep_records_are_hidden() {
        let cats = vec![
            cat(1, "A", None, 1, true),
            cat(2, "Hidden root", None, 0, false),
            cat(3, "Under hidden", Some(2), 0, true),
            cat(4, "Inactive child", Some(1), 0, false),
            cat(5, "Child", Some(1), 1, true),
            cat(6, "Grandchild", Some(5), 0, true),
        ];
        let tree = build_tree(&cats);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].name, "Child");
    }

    #[test]
    fn equal_order_keeps_input_order() {
        let cats = vec![
            cat(10, "first", None, 0, true),
            cat(11, "second", None, 0, true),
            cat(12, "third", None, 0, true),
        ];
        let names: Vec<_> = build_tree(&cats).into_iter().map(|n| n.category.name).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn counts_roll_up_into_roots() {
        let cats = vec![
            cat(1, "Engine", None, 0, true),
            cat(2, "Filters", Some(1), 0, true),
            cat(3, "Belts", Some(1), 1, true),
        ];
        let tree = build_tree(&cats);
        let counts = HashMap::from([(1, 2), (2, 5)]);
        let annotated = annotate_counts(&tree, &counts);

        assert_eq!(annotated[0].count, 7);
        assert_eq!(annotated[0].children[0].count, 5);
        assert_eq!(annotated[0].children[1].count, 0);
    }
}
