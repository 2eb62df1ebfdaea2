//! Example-data seeding
//!
//! A fresh install gets two example snippets so the list view is not
//! empty on first launch. Seeding is keyed off `count()`: any existing
//! data, including previously seeded rows the user has since edited or
//! partially deleted, suppresses it.

use crate::store::SnippetStore;
use snipvault_core::{Result, Snippet};
use uuid::Uuid;

/// Insert the example snippets if the store is empty
///
/// Returns the number of snippets inserted (zero when the store already
/// holds data).
pub fn seed_if_empty(store: &SnippetStore) -> Result<usize> {
    if store.count()? > 0 {
        return Ok(0);
    }

    let examples = example_snippets();
    for snippet in &examples {
        store.add(snippet)?;
    }
    tracing::info!(count = examples.len(), "seeded example snippets");
    Ok(examples.len())
}

fn example_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new(
            Uuid::new_v4().to_string(),
            "React Component Example".to_string(),
            "typescript".to_string(),
            r#"import React from 'react';

const MyComponent = () => {
  return <div>Hello, World!</div>;
};

export default MyComponent;"#
                .to_string(),
        ),
        Snippet::new(
            Uuid::new_v4().to_string(),
            "Simple Fetch Function".to_string(),
            "javascript".to_string(),
            r#"async function fetchData(url) {
  try {
    const response = await fetch(url);
    if (!response.ok) {
      throw new Error('Network response was not ok');
    }
    return await response.json();
  } catch (error) {
    console.error('Fetch error:', error);
  }
}"#
            .to_string(),
        ),
    ]
}
