use crate::models::{CategoryField, CategoryFieldWithMeta, CategorySchema};

/// Resolve the effective field list for `category_name`.
///
/// The forest is searched depth-first (roots in order, children in order);
/// the first node with a matching name is the target. Fields are collected
/// from the root of its lineage down to the target. A field whose key was
/// already seen replaces the earlier entry **in place**, so a descendant's
/// override keeps the ancestor's position. This ordering is relied on by
/// existing listing forms and is kept as is, even though "override moves to
/// the end" would arguably read better.
///
/// Returns an empty list when no node has that name.
pub fn resolve_fields(tree: &[CategorySchema], category_name: &str) -> Vec<CategoryFieldWithMeta> {
    let mut lineage = Vec::new();
    if !find_lineage(tree, category_name, &mut lineage) {
        return Vec::new();
    }
    merge_lineage(&lineage)
}

/// Resolve fields for a schema node the caller already holds.
///
/// When the node is part of `tree` this is [`resolve_fields`] by its name.
/// Otherwise its own fields are returned with `inherited = false`.
pub fn resolve_for_schema(
    tree: &[CategorySchema],
    schema: &CategorySchema,
) -> Vec<CategoryFieldWithMeta> {
    let mut lineage = Vec::new();
    if find_lineage(tree, &schema.name, &mut lineage) {
        return merge_lineage(&lineage);
    }
    merge_lineage(&[schema])
}

fn find_lineage<'a>(
    nodes: &'a [CategorySchema],
    name: &str,
    lineage: &mut Vec<&'a CategorySchema>,
) -> bool {
    for node in nodes {
        lineage.push(node);
        if node.name == name || find_lineage(&node.subcategories, name, lineage) {
            return true;
        }
        lineage.pop();
    }
    false
}

fn merge_lineage(lineage: &[&CategorySchema]) -> Vec<CategoryFieldWithMeta> {
    let Some(target) = lineage.last() else {
        return Vec::new();
    };
    let target_depth = lineage.len() - 1;

    let mut merged: Vec<CategoryFieldWithMeta> = Vec::new();
    for (depth, node) in lineage.iter().enumerate() {
        let inherited = depth != target_depth;
        for field in &node.fields {
            upsert(&mut merged, field, &node.name, inherited);
        }
    }
    tracing::trace!(
        category = %target.name,
        depth = lineage.len(),
        fields = merged.len(),
        "Resolved category fields"
    );
    merged
}

fn upsert(
    merged: &mut Vec<CategoryFieldWithMeta>,
    field: &CategoryField,
    source: &str,
    inherited: bool,
) {
    let resolved = CategoryFieldWithMeta::from_field(field, source, inherited);
    match merged.iter_mut().find(|f| f.name == resolved.name) {
        Some(slot) => *slot = resolved,
        None => merged.push(resolved),
    }
}
