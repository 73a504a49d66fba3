//! Category seeding from a YAML file.
//!
//! The file is a list of categories; `slug` and `description` are optional:
//!
//! ```yaml
//! - name: Электроника
//!   slug: electronics
//! - name: Home Goods
//!   description: Furniture and decor
//! ```
//!
//! Categories whose slug already exists are skipped, so the command can be
//! run repeatedly.

use std::collections::HashSet;
use std::path::Path;

use bazaar_admin::backend::AdminBackend;
use bazaar_core::models::NewCategory;
use serde::Deserialize;

use super::CliError;

#[derive(Debug, Deserialize)]
struct SeedCategory {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Categories to insert and slugs skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub insert: Vec<NewCategory>,
    pub skipped: Vec<String>,
}

/// Parse a seed file into categories with derived slugs.
///
/// # Errors
///
/// Returns an error for invalid YAML, a blank name or a slug listed twice.
pub fn parse_seed_file(content: &str) -> Result<Vec<NewCategory>, CliError> {
    let entries: Vec<SeedCategory> = serde_yaml::from_str(content)?;

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name.trim().is_empty() {
            return Err(CliError::InvalidSeed("category name cannot be empty".to_string()));
        }
        let category = NewCategory::new(&entry.name, entry.slug.as_deref(), entry.description);
        if !seen.insert(category.slug.clone()) {
            return Err(CliError::InvalidSeed(format!(
                "slug '{}' is listed more than once",
                category.slug
            )));
        }
        categories.push(category);
    }
    Ok(categories)
}

/// Split categories into those to insert and those whose slug exists.
#[must_use]
pub fn plan(categories: Vec<NewCategory>, existing_slugs: &HashSet<String>) -> SeedPlan {
    let mut plan = SeedPlan::default();
    for category in categories {
        if existing_slugs.contains(&category.slug) {
            plan.skipped.push(category.slug);
        } else {
            plan.insert.push(category);
        }
    }
    plan
}

/// Seed categories from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the backend
/// rejects a request. Categories inserted before a failure stay inserted.
pub async fn seed(backend: &dyn AdminBackend, file_path: &str) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let categories = parse_seed_file(&content)?;
    tracing::info!(count = categories.len(), "Parsed seed file");

    let existing: HashSet<String> = backend
        .categories()
        .await?
        .into_iter()
        .map(|c| c.slug)
        .collect();
    let plan = plan(categories, &existing);

    for category in &plan.insert {
        let created = backend.create_category(category).await?;
        tracing::info!("  + {} ({})", created.name, created.slug);
    }
    for slug in &plan.skipped {
        tracing::info!("  = {slug} (already exists)");
    }

    tracing::info!(
        "Seeding complete: {} inserted, {} skipped",
        plan.insert.len(),
        plan.skipped.len()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
- name: Электроника
  slug: electronics
- name: Home Goods
  description: Furniture and decor
- name: Books
";

    #[test]
    fn test_parse_seed_file_derives_slugs() {
        let categories = parse_seed_file(SEED).unwrap();
        let slugs: Vec<_> = categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["electronics", "home-goods", "books"]);
        assert_eq!(
            categories[1].description.as_deref(),
            Some("Furniture and decor")
        );
    }

    #[test]
    fn test_parse_seed_file_rejects_duplicate_slugs() {
        let err = parse_seed_file("- name: Books\n- name: books\n").unwrap_err();
        assert!(matches!(err, CliError::InvalidSeed(_)));
    }

    #[test]
    fn test_parse_seed_file_rejects_blank_name() {
        let err = parse_seed_file("- name: '  '\n").unwrap_err();
        assert!(matches!(err, CliError::InvalidSeed(_)));
    }

    #[test]
    fn test_parse_seed_file_rejects_bad_yaml() {
        assert!(matches!(
            parse_seed_file("name: [unclosed").unwrap_err(),
            CliError::Yaml(_)
        ));
    }

    #[test]
    fn test_plan_skips_existing_slugs() {
        let categories = parse_seed_file(SEED).unwrap();
        let existing = HashSet::from(["books".to_string()]);

        let plan = plan(categories, &existing);

        assert_eq!(plan.skipped, ["books"]);
        let inserted: Vec<_> = plan.insert.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(inserted, ["electronics", "home-goods"]);
    }
}
